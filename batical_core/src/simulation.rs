//! # Simulations
//!
//! A [`Simulation`] pairs a calculation input with the outcome it produced,
//! stamped with an id and a UTC timestamp. Storage is the host's concern:
//! calculators never touch a [`SimulationStore`].
//!
//! ```rust
//! use batical_core::calculations::CalculationItem;
//! use batical_core::settings::Settings;
//! use batical_core::simulation::Simulation;
//!
//! let item = CalculationItem::example("surface").unwrap();
//! let simulation = Simulation::run(item, &Settings::default()).unwrap();
//! assert_eq!(simulation.label, "Flat");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{run, CalculationItem, CalculationOutcome};
use crate::errors::CalcResult;
use crate::settings::Settings;

/// Current schema version for saved simulations
pub const SCHEMA_VERSION: &str = "0.1.0";

/// A calculation input and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub id: Uuid,
    /// Defaults to the input's label
    pub label: String,
    pub created: DateTime<Utc>,
    /// Schema version the record was written with
    pub version: String,
    pub input: CalculationItem,
    pub outcome: CalculationOutcome,
}

impl Simulation {
    /// Wrap an already computed outcome.
    pub fn new(input: CalculationItem, outcome: CalculationOutcome) -> Self {
        Simulation {
            id: Uuid::new_v4(),
            label: input.label().to_string(),
            created: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
            input,
            outcome,
        }
    }

    /// Run `input` with `settings` and record the outcome.
    pub fn run(input: CalculationItem, settings: &Settings) -> CalcResult<Self> {
        let outcome = run(&input, settings)?;
        Ok(Simulation::new(input, outcome))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn calc_type(&self) -> &'static str {
        self.input.calc_type()
    }
}

/// Summary row returned by [`SimulationStore::list`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub id: Uuid,
    pub label: String,
    pub calc_type: String,
    pub created: DateTime<Utc>,
}

impl From<&Simulation> for SimulationSummary {
    fn from(simulation: &Simulation) -> Self {
        SimulationSummary {
            id: simulation.id,
            label: simulation.label.clone(),
            calc_type: simulation.calc_type().to_string(),
            created: simulation.created,
        }
    }
}

/// Persistence collaborator for simulation records.
pub trait SimulationStore {
    /// Persist a simulation, replacing any record with the same id.
    fn save(&self, simulation: &Simulation) -> CalcResult<()>;

    /// Load a simulation by id.
    fn load(&self, id: Uuid) -> CalcResult<Simulation>;

    /// List stored simulations, oldest first.
    fn list(&self) -> CalcResult<Vec<SimulationSummary>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_run() {
        let item = CalculationItem::example("beam").unwrap();
        let simulation = Simulation::run(item.clone(), &Settings::default()).unwrap();

        assert_eq!(simulation.label, "B-1");
        assert_eq!(simulation.calc_type(), "Beam");
        assert_eq!(simulation.version, SCHEMA_VERSION);
        assert_eq!(simulation.input, item);
        assert!(simulation.outcome.verdict().is_some());
    }

    #[test]
    fn test_ids_are_unique() {
        let item = CalculationItem::example("dpe").unwrap();
        let a = Simulation::run(item.clone(), &Settings::default()).unwrap();
        let b = Simulation::run(item, &Settings::default()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.outcome, b.outcome);
    }

    #[test]
    fn test_invalid_input_gives_no_simulation() {
        let mut item = CalculationItem::example("surface").unwrap();
        if let CalculationItem::Surface(s) = &mut item {
            s.rooms[0].width_m = -1.0;
        }
        assert!(Simulation::run(item, &Settings::default()).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let simulation = Simulation::run(CalculationItem::example("cost").unwrap(), &Settings::default())
            .unwrap()
            .with_label("Estimate v2");
        let json = serde_json::to_string_pretty(&simulation).unwrap();
        let back: Simulation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, simulation.id);
        assert_eq!(back.created, simulation.created);
        assert_eq!(back.input, simulation.input);
        assert_eq!(back.outcome.summary(), simulation.outcome.summary());
        assert_eq!(SimulationSummary::from(&back).label, "Estimate v2");
    }
}
