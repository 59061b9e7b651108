//! # Partial Safety Factors
//!
//! Characteristic material strengths are turned into design strengths the
//! same way in every structural calculator:
//!
//! ```text
//! f_d = kmod × f_k / γM
//! ```
//!
//! For concrete `kmod` is the long-term coefficient αcc, for reinforcing
//! steel it is 1.0, and for timber it is the EC5 modification factor that
//! depends on the service class and the load duration class.
//!
//! ## Factor Summary
//!
//! | Factor   | Description                         | Default |
//! |----------|-------------------------------------|---------|
//! | γc       | Concrete (EC2 2.4.2.4)              | 1.50    |
//! | γs       | Reinforcing steel (EC2 2.4.2.4)     | 1.15    |
//! | αcc      | Long-term effects on concrete       | 1.00    |
//! | γM       | Solid timber (EC5 Table 2.3)        | 1.30    |
//! | γM       | Glued laminated timber              | 1.25    |

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Apply a partial safety factor: `kmod × characteristic / gamma_m`.
///
/// # Example
///
/// ```rust
/// use batical_core::safety::design_value;
///
/// // C25/30 with αcc = 1.0 and γc = 1.5
/// let fcd = design_value(25.0, 1.0, 1.5);
/// assert!((fcd - 16.667).abs() < 0.001);
/// ```
#[inline]
pub fn design_value(characteristic_value: f64, kmod: f64, gamma_m: f64) -> f64 {
    kmod * characteristic_value / gamma_m
}

/// Partial safety factors injected into every structural calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyFactors {
    /// Concrete partial factor γc
    pub gamma_c: f64,
    /// Reinforcing steel partial factor γs
    pub gamma_s: f64,
    /// Long-term coefficient αcc on concrete compressive strength
    pub alpha_cc: f64,
    /// Partial factor γM for solid timber
    pub gamma_m_solid_timber: f64,
    /// Partial factor γM for glued laminated timber
    pub gamma_m_glulam: f64,
}

impl Default for SafetyFactors {
    fn default() -> Self {
        SafetyFactors {
            gamma_c: 1.5,
            gamma_s: 1.15,
            alpha_cc: 1.0,
            gamma_m_solid_timber: 1.3,
            gamma_m_glulam: 1.25,
        }
    }
}

impl SafetyFactors {
    /// Reject non-positive or non-finite factors.
    pub fn validate(&self) -> CalcResult<()> {
        let fields = [
            ("gamma_c", self.gamma_c),
            ("gamma_s", self.gamma_s),
            ("alpha_cc", self.alpha_cc),
            ("gamma_m_solid_timber", self.gamma_m_solid_timber),
            ("gamma_m_glulam", self.gamma_m_glulam),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Safety factor must be positive"));
            }
        }
        Ok(())
    }

    /// Design compressive strength of concrete f_cd (MPa)
    pub fn fcd(&self, fck: f64) -> f64 {
        design_value(fck, self.alpha_cc, self.gamma_c)
    }

    /// Design yield strength of reinforcement f_yd (MPa)
    pub fn fyd(&self, fyk: f64) -> f64 {
        design_value(fyk, 1.0, self.gamma_s)
    }
}

// ============================================================================
// Timber modification factors (EC5)
// ============================================================================

/// Load duration class per EC5 Table 2.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoadDurationClass {
    /// More than 10 years (self weight)
    Permanent,
    /// 6 months to 10 years (storage)
    LongTerm,
    /// 1 week to 6 months (imposed floor load, snow)
    #[default]
    MediumTerm,
    /// Less than one week (snow in some regions)
    ShortTerm,
    /// Wind, accidental load
    Instantaneous,
}

impl LoadDurationClass {
    /// All load duration classes for UI selection
    pub const ALL: [LoadDurationClass; 5] = [
        LoadDurationClass::Permanent,
        LoadDurationClass::LongTerm,
        LoadDurationClass::MediumTerm,
        LoadDurationClass::ShortTerm,
        LoadDurationClass::Instantaneous,
    ];

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            LoadDurationClass::Permanent => "Permanent",
            LoadDurationClass::LongTerm => "Long term",
            LoadDurationClass::MediumTerm => "Medium term",
            LoadDurationClass::ShortTerm => "Short term",
            LoadDurationClass::Instantaneous => "Instantaneous",
        }
    }
}

/// Service class per EC5 2.3.1.3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ServiceClass {
    /// Heated interior (moisture content ≤ 12 %)
    #[default]
    #[serde(rename = "1")]
    Class1,
    /// Covered, unheated (moisture content ≤ 20 %)
    #[serde(rename = "2")]
    Class2,
    /// Exposed to weather
    #[serde(rename = "3")]
    Class3,
}

impl ServiceClass {
    /// Modification factor kmod (EC5 Table 3.1, solid and glued laminated timber)
    pub fn kmod(&self, duration: LoadDurationClass) -> f64 {
        use LoadDurationClass::*;
        match self {
            ServiceClass::Class1 | ServiceClass::Class2 => match duration {
                Permanent => 0.60,
                LongTerm => 0.70,
                MediumTerm => 0.80,
                ShortTerm => 0.90,
                Instantaneous => 1.10,
            },
            ServiceClass::Class3 => match duration {
                Permanent => 0.50,
                LongTerm => 0.55,
                MediumTerm => 0.65,
                ShortTerm => 0.70,
                Instantaneous => 0.90,
            },
        }
    }

    /// Creep factor kdef (EC5 Table 3.2, solid and glued laminated timber)
    pub fn kdef(&self) -> f64 {
        match self {
            ServiceClass::Class1 => 0.6,
            ServiceClass::Class2 => 0.8,
            ServiceClass::Class3 => 2.0,
        }
    }
}
