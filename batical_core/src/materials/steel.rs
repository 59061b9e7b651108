//! Reinforcing Steel (EN 1992-1-1 3.2, Annex C)
//!
//! Steel grades for high-bond reinforcing bars and the standard bar
//! diameters stocked on French sites (HA6 to HA40).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Modulus of elasticity of reinforcing steel E_s (MPa)
pub const STEEL_MODULUS_MPA: f64 = 200_000.0;

/// Standard high-bond bar diameters (mm), smallest to largest
pub const STANDARD_BAR_DIAMETERS_MM: [f64; 10] = [6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 20.0, 25.0, 32.0, 40.0];

/// Reinforcing steel grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SteelGrade {
    /// Fe E400 high-bond bars (f_yk = 400 MPa)
    S400,
    /// B500 / Fe E500 high-bond bars (f_yk = 500 MPa)
    S500,
}

impl SteelGrade {
    /// All steel grades for UI selection
    pub const ALL: [SteelGrade; 2] = [SteelGrade::S400, SteelGrade::S500];

    /// Get the grade designation
    pub fn code(&self) -> &'static str {
        match self {
            SteelGrade::S400 => "S400",
            SteelGrade::S500 => "S500",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_uppercase().replace([' ', '-', '_'], "").as_str() {
            "S400" | "FEE400" | "HA400" | "B400" => Ok(SteelGrade::S400),
            "S500" | "FEE500" | "HA500" | "B500" | "B500A" | "B500B" | "B500C" => Ok(SteelGrade::S500),
            _ => Err(CalcError::material_not_found(s)),
        }
    }

    /// Characteristic yield strength f_yk (MPa)
    pub fn fyk_mpa(&self) -> f64 {
        match self {
            SteelGrade::S400 => 400.0,
            SteelGrade::S500 => 500.0,
        }
    }

    /// Design yield strain ε_yd = f_yd / E_s
    pub fn yield_strain(&self, fyd_mpa: f64) -> f64 {
        fyd_mpa / STEEL_MODULUS_MPA
    }
}

impl TryFrom<String> for SteelGrade {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str_flexible(&value)
    }
}

impl std::fmt::Display for SteelGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Cross-sectional area of one bar (mm²)
#[inline]
pub fn bar_area_mm2(diameter_mm: f64) -> f64 {
    PI * diameter_mm.powi(2) / 4.0
}

/// Standard diameters within `[min, max]`, largest first.
pub fn diameters_between(min_mm: f64, max_mm: f64) -> Vec<f64> {
    STANDARD_BAR_DIAMETERS_MM
        .iter()
        .rev()
        .copied()
        .filter(|d| *d >= min_mm && *d <= max_mm)
        .collect()
}
