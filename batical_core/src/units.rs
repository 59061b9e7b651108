//! # Unit Types
//!
//! Type-safe wrappers for the SI units used across the calculators. They are
//! plain `f64` newtypes that serialize as bare numbers.
//!
//! ## Conventions
//!
//! - Length: millimetres (bars, covers), centimetres (section sizes), metres (spans, rooms)
//! - Force: kilonewtons (kN)
//! - Moment: kilonewton-metres (kN·m)
//! - Stress: megapascals (MPa = N/mm²)
//! - Area: square centimetres (reinforcement), square metres (floors, walls)
//!
//! Inside the structural calculators everything is converted to N and mm
//! before any formula runs, so MPa stays consistent with N/mm².
//!
//! ## Example
//!
//! ```rust
//! use batical_core::units::{to_meters, to_millimeters, Meters, Millimeters};
//!
//! let cover = Millimeters(30.0);
//! assert_eq!(to_meters(cover), Meters(0.03));
//! assert_eq!(to_millimeters(Meters(2.5)), Millimeters(2500.0));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in centimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Centimeters> for Millimeters {
    fn from(cm: Centimeters) -> Self {
        Millimeters(cm.0 * 10.0)
    }
}

impl From<Millimeters> for Centimeters {
    fn from(mm: Millimeters) -> Self {
        Centimeters(mm.0 / 10.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

/// Convert millimetres to metres.
pub fn to_meters(mm: Millimeters) -> Meters {
    mm.into()
}

/// Convert metres to millimetres.
pub fn to_millimeters(m: Meters) -> Millimeters {
    m.into()
}

// ============================================================================
// Force and Moment Units
// ============================================================================

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtons(pub f64);

/// Moment in kilonewton-metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtonMeters(pub f64);

impl KiloNewtons {
    /// Force in newtons
    pub fn to_newtons(self) -> f64 {
        self.0 * 1.0e3
    }

    /// Build from a force in newtons
    pub fn from_newtons(n: f64) -> Self {
        KiloNewtons(n / 1.0e3)
    }
}

impl KiloNewtonMeters {
    /// Moment in newton-millimetres
    pub fn to_newton_mm(self) -> f64 {
        self.0 * 1.0e6
    }

    /// Build from a moment in newton-millimetres
    pub fn from_newton_mm(nmm: f64) -> Self {
        KiloNewtonMeters(nmm / 1.0e6)
    }
}

// ============================================================================
// Stress Units
// ============================================================================

/// Stress in megapascals (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Megapascals(pub f64);

impl Megapascals {
    /// From kN/m² (1 MPa = 1000 kN/m²)
    pub fn from_kn_per_m2(kpa: f64) -> Self {
        Megapascals(kpa / 1000.0)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square centimetres (reinforcement sections)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareCentimeters(pub f64);

/// Area in square metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

impl SquareCentimeters {
    /// Build from an area in mm²
    pub fn from_mm2(mm2: f64) -> Self {
        SquareCentimeters(mm2 / 100.0)
    }

    /// Area in mm²
    pub fn to_mm2(self) -> f64 {
        self.0 * 100.0
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Millimeters);
impl_arithmetic!(Centimeters);
impl_arithmetic!(Meters);
impl_arithmetic!(KiloNewtons);
impl_arithmetic!(KiloNewtonMeters);
impl_arithmetic!(Megapascals);
impl_arithmetic!(SquareCentimeters);
impl_arithmetic!(SquareMeters);

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
