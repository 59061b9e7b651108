//! # Settings
//!
//! User-level configuration shared by every calculation: partial safety
//! factors, default concrete covers, surface rounding and the default
//! region for cost estimates.
//!
//! Settings are read from a TOML file. Every field has a default, so an
//! empty file (or no file at all) gives the standard Eurocode values.
//!
//! # File Location
//!
//! 1. Path passed explicitly (`--config` on the command line)
//! 2. `<config_dir>/batical/settings.toml` where `config_dir` is the
//!    platform configuration directory (`~/.config` on Linux)
//!
//! A missing default file is not an error. A missing explicit file is.
//!
//! # Example
//!
//! ```toml
//! log_level = "debug"
//! surface_decimals = 2
//! default_region = "bretagne"
//!
//! [safety]
//! gamma_c = 1.5
//! gamma_s = 1.15
//!
//! [covers]
//! slab_mm = 20.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calculations::surface::MAX_DECIMALS;
use crate::errors::{ensure_positive, CalcError, CalcResult};
use crate::safety::SafetyFactors;

/// Default concrete covers (mm) applied when an input leaves `cover_mm` unset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultCovers {
    pub beam_mm: f64,
    pub slab_mm: f64,
    pub column_mm: f64,
    pub foundation_mm: f64,
}

impl Default for DefaultCovers {
    fn default() -> Self {
        DefaultCovers {
            beam_mm: 30.0,
            slab_mm: 25.0,
            column_mm: 30.0,
            foundation_mm: 50.0,
        }
    }
}

/// Calculation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Partial safety factors for the structural calculators
    pub safety: SafetyFactors,

    /// Default concrete covers
    pub covers: DefaultCovers,

    /// Decimal places kept on room and total surfaces
    pub surface_decimals: u32,

    /// Region key used by cost estimates that do not name one
    pub default_region: String,

    /// Log filter directive (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            safety: SafetyFactors::default(),
            covers: DefaultCovers::default(),
            surface_decimals: 2,
            default_region: "occitanie".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml(text: &str) -> CalcResult<Self> {
        let settings: Settings = toml::from_str(text).map_err(CalcError::serialization)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject non-positive factors and covers.
    pub fn validate(&self) -> CalcResult<()> {
        self.safety.validate()?;
        ensure_positive("covers.beam_mm", self.covers.beam_mm)?;
        ensure_positive("covers.slab_mm", self.covers.slab_mm)?;
        ensure_positive("covers.column_mm", self.covers.column_mm)?;
        ensure_positive("covers.foundation_mm", self.covers.foundation_mm)?;
        if self.surface_decimals > MAX_DECIMALS {
            return Err(CalcError::invalid_input(
                "surface_decimals",
                self.surface_decimals.to_string(),
                format!("At most {MAX_DECIMALS} decimal places"),
            ));
        }
        if self.default_region.trim().is_empty() {
            return Err(CalcError::missing_field("default_region"));
        }
        Ok(())
    }
}

/// Platform default settings path: `<config_dir>/batical/settings.toml`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("batical").join("settings.toml"))
}

/// Load settings from `path`, or from the default location when `None`.
///
/// # Errors
///
/// - `FileError` if an explicit path does not exist or cannot be read
/// - `SerializationError` if the TOML is malformed or has unknown fields
/// - `InvalidInput` if a value fails validation
pub fn load_settings(path: Option<&Path>) -> CalcResult<Settings> {
    let settings_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CalcError::file_error("open", p.display().to_string(), "Settings file not found"));
            }
            p.to_path_buf()
        }
        None => match default_settings_path() {
            Some(p) if p.exists() => p,
            _ => {
                tracing::debug!("No settings file, using defaults");
                return Ok(Settings::default());
            }
        },
    };

    let contents = std::fs::read_to_string(&settings_path)
        .map_err(|e| CalcError::file_error("read", settings_path.display().to_string(), e.to_string()))?;

    let settings = Settings::from_toml(&contents)?;
    tracing::debug!(path = %settings_path.display(), "Loaded settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.safety.gamma_c, 1.5);
        assert_eq!(settings.covers.foundation_mm, 50.0);
    }

    #[test]
    fn test_partial_override() {
        let settings = Settings::from_toml(
            r#"
            surface_decimals = 1

            [safety]
            gamma_s = 1.0

            [covers]
            slab_mm = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(settings.surface_decimals, 1);
        assert_eq!(settings.safety.gamma_s, 1.0);
        assert_eq!(settings.safety.gamma_c, 1.5);
        assert_eq!(settings.covers.slab_mm, 20.0);
        assert_eq!(settings.covers.beam_mm, 30.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Settings::from_toml("[safety]\ngamma_c = 0.0").is_err());
        assert!(Settings::from_toml("[covers]\nbeam_mm = -5.0").is_err());
        assert!(Settings::from_toml("unknown_field = 3").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();
        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_default_path_location() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with("batical/settings.toml"));
        }
    }
}
