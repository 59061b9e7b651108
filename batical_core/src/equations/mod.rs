//! # Structural Engineering Equations
//!
//! Closed-form formulas shared by the structural calculators. Keeping them
//! in one place makes each one easy to check against the code clause it
//! comes from.
//!
//! ## Modules
//!
//! - [`section`] - Rectangular cross-section properties and simple-span formulas
//! - [`reinforced_concrete`] - EC2 simplified flexure, minimum steel and bar layouts
//!
//! ## Sign Conventions
//!
//! - **Moment**: design uses |M|; sagging and hogging are designed alike
//! - **Axial**: compression positive
//!
//! ## References
//!
//! - EN 1992-1-1: Design of concrete structures
//! - EN 1995-1-1: Design of timber structures
//! - EN 1990: Basis of structural design

pub mod reinforced_concrete;
pub mod section;

pub use reinforced_concrete::{
    design_flexure, effective_depth, lever_arm, minimum_reinforcement, reduced_moment, select_bars, BarLayout,
    BarSelection, FlexuralDesign, MU_LIMIT,
};

pub use section::{
    rectangular_area, rectangular_moment_of_inertia, rectangular_section_modulus, uniform_load_deflection,
    uniform_load_moment, weak_axis_radius_of_gyration,
};
