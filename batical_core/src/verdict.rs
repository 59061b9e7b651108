//! # Design Verdicts and Warnings
//!
//! Structural calculators never return an error because a member is too
//! weak. They return a result whose [`Verdict`] says whether the design is
//! adequate, and if not, which check failed and by how much.
//!
//! Out-of-range conditions that do not invalidate the design are collected
//! as [`DesignWarning`]s next to the verdict.
//!
//! ## JSON Serialization
//!
//! ```json
//! { "status": "Adequate" }
//! { "status": "Inadequate", "failure": "OverCapacity", "ratio": 1.12 }
//! ```

use serde::{Deserialize, Serialize};

/// Check that made a design inadequate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// Section cannot carry the moment (μ > μ_lim, or As > As_max for columns)
    OverCapacity,
    /// Design shear exceeds the strut crushing resistance V_Rd,max
    ShearCapacityExceeded,
    /// Soil pressure exceeds the bearing resistance
    BearingCapacityExceeded,
    /// Eccentricity leaves no compressed footing width
    Overturning,
    /// Slenderness beyond the simplified method's range
    ExcessiveSlenderness,
    /// No standard bar layout fits in one layer
    ReinforcementDoesNotFit,
    /// Timber stress or deflection ratio above 1
    UtilizationExceeded,
}

impl FailureReason {
    /// Stable code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::OverCapacity => "OVER_CAPACITY",
            FailureReason::ShearCapacityExceeded => "SHEAR_CAPACITY_EXCEEDED",
            FailureReason::BearingCapacityExceeded => "BEARING_CAPACITY_EXCEEDED",
            FailureReason::Overturning => "OVERTURNING",
            FailureReason::ExcessiveSlenderness => "EXCESSIVE_SLENDERNESS",
            FailureReason::ReinforcementDoesNotFit => "REINFORCEMENT_DOES_NOT_FIT",
            FailureReason::UtilizationExceeded => "UTILIZATION_EXCEEDED",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FailureReason::OverCapacity => "Section capacity exceeded",
            FailureReason::ShearCapacityExceeded => "Shear strut capacity exceeded",
            FailureReason::BearingCapacityExceeded => "Soil bearing capacity exceeded",
            FailureReason::Overturning => "Footing overturns under eccentric load",
            FailureReason::ExcessiveSlenderness => "Slenderness beyond simplified method",
            FailureReason::ReinforcementDoesNotFit => "Reinforcement does not fit in one layer",
            FailureReason::UtilizationExceeded => "Utilization exceeds 100 %",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Outcome of the design checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Verdict {
    Adequate,
    Inadequate {
        failure: FailureReason,
        /// Demand over capacity for the failing check (> 1 when meaningful)
        ratio: f64,
    },
}

impl Verdict {
    pub fn inadequate(failure: FailureReason, ratio: f64) -> Self {
        Verdict::Inadequate { failure, ratio }
    }

    pub fn is_adequate(&self) -> bool {
        matches!(self, Verdict::Adequate)
    }

    /// Failure reason, if any
    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Verdict::Adequate => None,
            Verdict::Inadequate { failure, .. } => Some(*failure),
        }
    }

    /// Keep the first failure found: an already inadequate verdict wins.
    pub fn or(self, other: Verdict) -> Verdict {
        match self {
            Verdict::Adequate => other,
            failed => failed,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Adequate => write!(f, "ADEQUATE"),
            Verdict::Inadequate { failure, ratio } => {
                write!(f, "INADEQUATE - {} (ratio {:.2})", failure, ratio)
            }
        }
    }
}

/// Non-fatal out-of-range condition attached to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignWarning {
    /// Second-order effects are not negligible
    BucklingSignificant,
    /// Required steel above 4 % of the concrete section
    AboveMaximumReinforcement,
    /// Span/depth ratio above the limit; a deflection calculation is needed
    DeflectionCheckRequired,
    /// Resultant outside the kern, part of the footing lifts off
    PartialUplift,
    /// Footing too thin to be treated as rigid
    FlexibleFooting,
    /// Minimum reinforcement governs over the strength requirement
    MinimumReinforcementGoverns,
}

impl DesignWarning {
    /// Stable code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            DesignWarning::BucklingSignificant => "BUCKLING_SIGNIFICANT",
            DesignWarning::AboveMaximumReinforcement => "ABOVE_MAXIMUM_REINFORCEMENT",
            DesignWarning::DeflectionCheckRequired => "DEFLECTION_CHECK_REQUIRED",
            DesignWarning::PartialUplift => "PARTIAL_UPLIFT",
            DesignWarning::FlexibleFooting => "FLEXIBLE_FOOTING",
            DesignWarning::MinimumReinforcementGoverns => "MINIMUM_REINFORCEMENT_GOVERNS",
        }
    }
}

impl std::fmt::Display for DesignWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
