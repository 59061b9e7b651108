//! # batical_core - Building Engineering Calculation Engine
//!
//! `batical_core` provides the building calculations behind Batical:
//! Eurocode structural checks (concrete beams, slabs, columns, pad footings
//! and timber members), acoustic estimates, an energy performance rating,
//! floor surface aggregation and construction cost estimates. All inputs and
//! outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Typed Verdicts**: A failing design is a result, not an error
//!
//! ## Quick Start
//!
//! ```rust
//! use batical_core::calculations::beam::{calculate, BeamInput};
//! use batical_core::materials::{ConcreteClass, SteelGrade};
//! use batical_core::safety::SafetyFactors;
//!
//! let input = BeamInput {
//!     label: "B-1".to_string(),
//!     width_cm: 30.0,
//!     height_cm: 60.0,
//!     cover_mm: None,
//!     bar_diameter_mm: 16.0,
//!     concrete: ConcreteClass::C25_30,
//!     steel: SteelGrade::S500,
//!     moment_knm: 150.0,
//!     shear_kn: None,
//! };
//! let result = calculate(&input, &SafetyFactors::default()).unwrap();
//! assert!(result.verdict.is_adequate());
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - All calculators and the [`run`] dispatcher
//! - [`equations`] - Shared section and reinforced concrete formulas
//! - [`materials`] - Concrete, steel, timber and soil classes
//! - [`tables`] - Embedded reference tables (acoustic, thermal, cost)
//! - [`safety`] - Partial safety factors and timber modification factors
//! - [`loads`] - Load combinations and design forces
//! - [`verdict`] - Design verdicts and warnings
//! - [`units`] - Type-safe unit wrappers
//! - [`settings`] - User settings loaded from TOML
//! - [`simulation`] - Simulation records and the storage trait
//! - [`file_io`] - JSON file store with atomic saves and locking
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod loads;
pub mod materials;
pub mod safety;
pub mod settings;
pub mod simulation;
pub mod tables;
pub mod units;
pub mod verdict;

// Re-export commonly used types at crate root for convenience
pub use calculations::{run, CalculationItem, CalculationOutcome};
pub use errors::{CalcError, CalcResult};
pub use file_io::{FileLock, JsonFileStore};
pub use safety::SafetyFactors;
pub use settings::Settings;
pub use simulation::{Simulation, SimulationStore};
pub use tables::{reference_tables, ReferenceTables};
pub use verdict::{DesignWarning, FailureReason, Verdict};
