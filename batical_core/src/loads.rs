//! # Loads and Load Combinations
//!
//! Design forces carried by the structural calculators and the Eurocode 0
//! combinations used to build them from characteristic actions.
//!
//! ## Sign Convention
//!
//! Forces keep the sign the user entered. Only finiteness is validated here;
//! each calculator decides whether a sign is meaningful (e.g. columns only
//! accept compression).
//!
//! ## Combinations (EN 1990 6.4.3.2 / 6.5.3)
//!
//! | Name | Equation       | Use                     |
//! |------|----------------|-------------------------|
//! | ELU  | 1.35 G + 1.5 Q | Strength (ULS)          |
//! | ELS  | G + Q          | Deflection, cracking    |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_finite, CalcResult};

/// Limit state a force set was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LimitState {
    /// Ultimate limit state (ELU)
    #[default]
    #[serde(rename = "ELU")]
    Ultimate,
    /// Serviceability limit state (ELS)
    #[serde(rename = "ELS")]
    Serviceability,
}

/// Design forces at a section.
///
/// ## JSON Example
///
/// ```json
/// { "axial_kn": 850.0, "moment_knm": 42.0, "shear_kn": 0.0, "limit_state": "ELU" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LoadSpec {
    /// Axial force N (kN)
    pub axial_kn: f64,
    /// Bending moment M (kN·m)
    pub moment_knm: f64,
    /// Shear force V (kN)
    pub shear_kn: f64,
    pub limit_state: LimitState,
}

impl LoadSpec {
    /// Forces at the ultimate limit state
    pub fn ultimate(axial_kn: f64, moment_knm: f64, shear_kn: f64) -> Self {
        LoadSpec {
            axial_kn,
            moment_knm,
            shear_kn,
            limit_state: LimitState::Ultimate,
        }
    }

    /// Reject NaN and infinities; signs are preserved.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_finite("axial_kn", self.axial_kn)?;
        ensure_finite("moment_knm", self.moment_knm)?;
        ensure_finite("shear_kn", self.shear_kn)?;
        Ok(())
    }
}

/// Kind of characteristic action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionType {
    /// Self weight and finishes (G)
    Permanent,
    /// Imposed load (Q)
    Variable,
}

/// Characteristic actions in any consistent unit (kN, kN/m, kN/m²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Actions {
    pub permanent: f64,
    pub variable: f64,
}

impl Actions {
    pub fn new(permanent: f64, variable: f64) -> Self {
        Actions { permanent, variable }
    }

    pub fn get(&self, action: ActionType) -> f64 {
        match action {
            ActionType::Permanent => self.permanent,
            ActionType::Variable => self.variable,
        }
    }
}

/// A load combination with a factor per action type
///
/// # Example
///
/// ```
/// use batical_core::loads::{Actions, LoadCombination};
///
/// let g_q = Actions::new(5.0, 2.5);
/// assert!((LoadCombination::elu().apply(&g_q) - 10.5).abs() < 1e-12);
/// assert_eq!(LoadCombination::els().apply(&g_q), 7.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Combination identifier ("ELU", "ELS")
    pub name: String,
    /// Human-readable equation for display
    pub equation: String,
    pub factors: BTreeMap<ActionType, f64>,
}

impl LoadCombination {
    pub fn new(name: impl Into<String>, equation: impl Into<String>) -> Self {
        LoadCombination {
            name: name.into(),
            equation: equation.into(),
            factors: BTreeMap::new(),
        }
    }

    /// Add a factor (builder pattern)
    pub fn with_factor(mut self, action: ActionType, factor: f64) -> Self {
        self.factors.insert(action, factor);
        self
    }

    /// Fundamental ULS combination 1.35 G + 1.5 Q
    pub fn elu() -> Self {
        LoadCombination::new("ELU", "1.35G + 1.5Q")
            .with_factor(ActionType::Permanent, 1.35)
            .with_factor(ActionType::Variable, 1.5)
    }

    /// Characteristic SLS combination G + Q
    pub fn els() -> Self {
        LoadCombination::new("ELS", "G + Q")
            .with_factor(ActionType::Permanent, 1.0)
            .with_factor(ActionType::Variable, 1.0)
    }

    /// Factored total. Action types absent from the combination count as 0.
    pub fn apply(&self, actions: &Actions) -> f64 {
        self.factors
            .iter()
            .map(|(action, factor)| factor * actions.get(*action))
            .sum()
    }

    /// Factor for one action type (0.0 if not in the combination)
    pub fn factor(&self, action: ActionType) -> f64 {
        self.factors.get(&action).copied().unwrap_or(0.0)
    }
}
