//! # Batical CLI Application
//!
//! Command-line host for the calculation engine. Calculations are described
//! by tagged JSON files (see `batical example <kind>`) and results are
//! printed as a one-line summary followed by the full JSON result.
//!
//! Exit codes: `0` success, `1` error, `2` the design is inadequate.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use batical_core::calculations::CalculationItem;
use batical_core::errors::{CalcError, CalcResult};
use batical_core::file_io::JsonFileStore;
use batical_core::materials::{MaterialFamily, MaterialSpec};
use batical_core::settings::{default_settings_path, load_settings, Settings};
use batical_core::simulation::{Simulation, SimulationStore};
use batical_core::tables::reference_tables;

/// Building engineering calculations from JSON input files.
#[derive(Parser, Debug)]
#[command(name = "batical")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a settings file (TOML)
    #[arg(long, global = true, value_name = "SETTINGS_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a calculation from a JSON file
    Run {
        /// Calculation input (tagged JSON)
        input: PathBuf,

        /// Save the simulation into this directory
        #[arg(long, value_name = "DIR")]
        save: Option<PathBuf>,

        /// Label for the saved simulation
        #[arg(long)]
        label: Option<String>,
    },

    /// Print a sample input for a calculation type
    Example {
        /// Calculation type (beam, slab, column, foundation, timber,
        /// acoustic_wall, reverberation, dpe, surface, cost)
        kind: String,
    },

    /// List reference tables and material families, or the keys of one
    Keys {
        table: Option<String>,
    },

    /// List simulations saved in a directory
    List {
        dir: PathBuf,
    },
}

/// Determines the log level from CLI arguments and settings.
fn get_log_level(verbose: u8, quiet: bool, settings_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match settings_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(CalcError::serialization)?;
    println!("{json}");
    Ok(())
}

fn read_input(path: &Path) -> CalcResult<CalculationItem> {
    let text = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    CalculationItem::from_json(&text).map_err(|e| match e {
        CalcError::SerializationError { reason } => {
            CalcError::serialization(format!("Invalid input in {}: {}", path.display(), reason))
        }
        other => other,
    })
}

/// Run a calculation file; `Ok(false)` when the design is inadequate.
fn run_command(settings: &Settings, input: &Path, save: Option<&Path>, label: Option<String>) -> CalcResult<bool> {
    let item = read_input(input)?;
    info!(calc_type = item.calc_type(), label = item.label(), "Running calculation");

    let mut simulation = Simulation::run(item, settings)?;
    if let Some(label) = label {
        simulation = simulation.with_label(label);
    }

    let adequate = simulation.outcome.verdict().map_or(true, |v| v.is_adequate());
    println!("{}: {}", simulation.calc_type(), simulation.outcome.summary());
    println!();
    print_json(&simulation.outcome)?;

    if let Some(dir) = save {
        let store = JsonFileStore::open(dir)?;
        store.save(&simulation)?;
        info!(id = %simulation.id, dir = %dir.display(), "Simulation saved");
        println!();
        println!("Saved {} to {}", simulation.id, store.path_for(simulation.id).display());
    }

    Ok(adequate)
}

/// Lines printed by `keys`: material classes come with their governing
/// characteristic strength.
fn key_lines(table: Option<&str>) -> CalcResult<Vec<String>> {
    let tables = reference_tables()?;
    let Some(name) = table else {
        let mut names = tables.table_names();
        names.extend(MaterialFamily::ALL.iter().map(|f| f.field_name().to_string()));
        return Ok(names);
    };

    match MaterialFamily::from_str_flexible(name) {
        Ok(family) => family
            .class_names()
            .iter()
            .map(|class| -> CalcResult<String> {
                let spec = MaterialSpec::lookup(family, class)?;
                Ok(format!("{:<16}{:>8.2} MPa  {}", class, spec.characteristic_strength_mpa(), spec))
            })
            .collect(),
        Err(_) => tables.keys(name),
    }
}

fn keys_command(table: Option<&str>) -> CalcResult<()> {
    for line in key_lines(table)? {
        println!("{line}");
    }
    Ok(())
}

fn list_command(dir: &Path) -> CalcResult<()> {
    let store = JsonFileStore::open(dir)?;
    for summary in store.list()? {
        println!(
            "{}  {}  {:<13}  {}",
            summary.id,
            summary.created.format("%Y-%m-%d %H:%M"),
            summary.calc_type,
            summary.label
        );
    }
    Ok(())
}

fn report_error(e: &CalcError) {
    eprintln!("Error: {e}");
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{json}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match load_settings(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Settings error: {e}");
            if args.config.is_none() {
                if let Some(default_path) = default_settings_path() {
                    eprintln!("\nSettings read from: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    init_tracing(get_log_level(args.verbose, args.quiet, &settings.log_level));

    let result = match &args.command {
        Command::Run { input, save, label } => run_command(&settings, input, save.as_deref(), label.clone()),
        Command::Example { kind } => CalculationItem::example(kind).and_then(|item| print_json(&item)).map(|_| true),
        Command::Keys { table } => keys_command(table.as_deref()).map(|_| true),
        Command::List { dir } => list_command(dir).map(|_| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            report_error(&e);
            if let CalcError::UnknownKey { table, .. } = &e {
                if table == "calculation_types" {
                    eprintln!("\nKnown types: {}", CalculationItem::TYPES.join(", "));
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_log_level() {
        assert_eq!(get_log_level(0, true, "debug"), Level::ERROR);
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "nonsense"), Level::WARN);
        assert_eq!(get_log_level(2, false, "warn"), Level::DEBUG);
        assert_eq!(get_log_level(5, false, "warn"), Level::TRACE);
    }

    #[test]
    fn test_material_keys() {
        let all = key_lines(None).unwrap();
        assert!(all.iter().any(|name| name == "concrete"));
        assert!(all.iter().any(|name| name == "soil"));

        let concrete = key_lines(Some("concrete")).unwrap();
        assert!(concrete.iter().any(|line| line.starts_with("C25/30") && line.contains("25.00 MPa")));
        let timber = key_lines(Some("wood")).unwrap();
        assert!(timber.iter().any(|line| line.contains("Glulam GL24h")));
        let soil = key_lines(Some("soil")).unwrap();
        assert!(soil.iter().any(|line| line.starts_with("dense_sand")));

        let err = key_lines(Some("no_such_table")).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_KEY");
    }

    #[test]
    fn test_read_input_reports_material() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beam.json");
        let mut beam = serde_json::to_value(CalculationItem::example("beam").unwrap()).unwrap();
        beam["concrete"] = serde_json::Value::String("C99/115".to_string());
        fs::write(&path, beam.to_string()).unwrap();
        let err = read_input(&path).unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");

        fs::write(&path, "{ not json").unwrap();
        let err = read_input(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        assert!(err.to_string().contains("beam.json"));
    }

    #[test]
    fn test_parse_run() {
        let args = Args::parse_from(["batical", "-v", "run", "beam.json", "--save", "out", "--label", "B-2"]);
        assert_eq!(args.verbose, 1);
        match args.command {
            Command::Run { input, save, label } => {
                assert_eq!(input, PathBuf::from("beam.json"));
                assert_eq!(save, Some(PathBuf::from("out")));
                assert_eq!(label.as_deref(), Some("B-2"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
