//! # Reinforced Concrete Slab
//!
//! Solid slab under uniform load, designed per metre strip in both
//! directions with the shared flexure procedure.
//!
//! ## Method
//!
//! - Self weight 25 kN/m³ × h, ULS load `p_u = 1.35·(g + g_self) + 1.5·q`
//! - `α = lx/ly < 0.4`: one-way slab, distribution steel = 20 % of main
//! - otherwise two-way with the simplified panel coefficients
//!   `μx = 1/(8·(1 + 2.4·α³))`, `μy = α³·(1.9 − 0.9·α)`
//! - Support condition scales the span moment (1/8, 1/10, 1/12, 1/2)
//! - Span/depth ratio checked per EC2 7.4.2 (no compression steel)
//!
//! The spans are swapped when `lx_m > ly_m` so `lx` is always the short span.

use serde::{Deserialize, Serialize};

use crate::equations::reinforced_concrete::{
    design_flexure, effective_depth, select_bars, BarLayout, BarSelection, DesignStrengths, FlexuralDesign, Placement,
};
use crate::errors::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::loads::{Actions, LoadCombination};
use crate::materials::{ConcreteClass, SteelGrade};
use crate::safety::SafetyFactors;
use crate::units::{to_millimeters, Centimeters, KiloNewtonMeters, Meters, Millimeters, SquareCentimeters};
use crate::verdict::{DesignWarning, FailureReason, Verdict};

/// Cover used when `cover_mm` is not given (mm)
pub const DEFAULT_COVER_MM: f64 = 25.0;

/// Unit weight of reinforced concrete (kN/m³)
pub const CONCRETE_UNIT_WEIGHT_KN_M3: f64 = 25.0;

/// Bar diameter assumed for the effective depths (mm)
const ASSUMED_BAR_DIAMETER_MM: f64 = 10.0;

/// Slabs with lx/ly below this span one way
const ONE_WAY_RATIO: f64 = 0.4;

/// Design strip width (mm)
const STRIP_WIDTH_MM: f64 = 1000.0;

/// Distribution steel as a fraction of the main steel in one-way slabs
const DISTRIBUTION_RATIO: f64 = 0.2;

/// Support condition of the short span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SupportCondition {
    #[default]
    SimplySupported,
    /// Continuous on one side
    EndSpan,
    /// Continuous on both sides
    InteriorSpan,
    Cantilever,
}

impl SupportCondition {
    pub const ALL: [SupportCondition; 4] = [
        SupportCondition::SimplySupported,
        SupportCondition::EndSpan,
        SupportCondition::InteriorSpan,
        SupportCondition::Cantilever,
    ];

    /// Span moment coefficient c in M = c·p·l²
    pub fn moment_coefficient(&self) -> f64 {
        match self {
            SupportCondition::SimplySupported => 1.0 / 8.0,
            SupportCondition::EndSpan => 1.0 / 10.0,
            SupportCondition::InteriorSpan => 1.0 / 12.0,
            SupportCondition::Cantilever => 1.0 / 2.0,
        }
    }

    /// Structural system factor K (EC2 Table 7.4N)
    pub fn span_depth_factor(&self) -> f64 {
        match self {
            SupportCondition::SimplySupported => 1.0,
            SupportCondition::EndSpan => 1.3,
            SupportCondition::InteriorSpan => 1.5,
            SupportCondition::Cantilever => 0.4,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SupportCondition::SimplySupported => "Simply supported",
            SupportCondition::EndSpan => "End span",
            SupportCondition::InteriorSpan => "Interior span",
            SupportCondition::Cantilever => "Cantilever",
        }
    }
}

/// Input parameters for a slab panel.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Ground floor slab",
///   "thickness_cm": 20.0,
///   "lx_m": 4.5,
///   "ly_m": 6.0,
///   "concrete": "C25/30",
///   "steel": "S500",
///   "dead_load_kn_m2": 1.5,
///   "live_load_kn_m2": 2.5,
///   "support": "simply_supported"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabInput {
    #[serde(default)]
    pub label: String,

    /// Slab thickness h (cm)
    pub thickness_cm: f64,

    /// Short span lx (m)
    pub lx_m: f64,

    /// Long span ly (m)
    pub ly_m: f64,

    /// Concrete cover (mm); settings default when absent
    #[serde(default)]
    pub cover_mm: Option<f64>,

    pub concrete: ConcreteClass,

    pub steel: SteelGrade,

    /// Superimposed dead load, excluding self weight (kN/m²)
    pub dead_load_kn_m2: f64,

    /// Imposed load (kN/m²)
    pub live_load_kn_m2: f64,

    #[serde(default)]
    pub support: SupportCondition,
}

impl SlabInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("thickness_cm", self.thickness_cm)?;
        ensure_positive("lx_m", self.lx_m)?;
        ensure_positive("ly_m", self.ly_m)?;
        ensure_positive("cover_mm", self.cover())?;
        ensure_non_negative("dead_load_kn_m2", self.dead_load_kn_m2)?;
        ensure_non_negative("live_load_kn_m2", self.live_load_kn_m2)?;
        if self.secondary_depth_mm() <= 0.0 {
            return Err(CalcError::invalid_input(
                "thickness_cm",
                self.thickness_cm.to_string(),
                "Slab too thin for the cover and two bar layers",
            ));
        }
        Ok(())
    }

    pub fn cover(&self) -> f64 {
        self.cover_mm.unwrap_or(DEFAULT_COVER_MM)
    }

    pub fn thickness_mm(&self) -> f64 {
        Millimeters::from(Centimeters(self.thickness_cm)).value()
    }

    /// (short, long) spans in metres
    pub fn spans_m(&self) -> (f64, f64) {
        if self.lx_m <= self.ly_m {
            (self.lx_m, self.ly_m)
        } else {
            (self.ly_m, self.lx_m)
        }
    }

    /// Self weight g_self = 25·h (kN/m²)
    pub fn self_weight_kn_m2(&self) -> f64 {
        CONCRETE_UNIT_WEIGHT_KN_M3 * Meters::from(Centimeters(self.thickness_cm)).value()
    }

    /// Effective depth of the outer (short-span) layer (mm)
    pub fn main_depth_mm(&self) -> f64 {
        effective_depth(self.thickness_mm(), self.cover(), ASSUMED_BAR_DIAMETER_MM)
    }

    /// Effective depth of the inner (long-span) layer (mm)
    pub fn secondary_depth_mm(&self) -> f64 {
        self.main_depth_mm() - ASSUMED_BAR_DIAMETER_MM
    }
}

/// One-way or two-way behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spanning {
    OneWay,
    TwoWay,
}

/// Reinforcement in one direction of the slab (per metre width)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlabDirection {
    /// Design moment (kN·m/m)
    pub moment_knm_m: f64,
    /// Flexural design; `None` for one-way distribution steel
    pub flexure: Option<FlexuralDesign>,
    /// Required steel (cm²/m)
    pub as_required_cm2_m: f64,
    pub bars: Option<BarLayout>,
}

/// Results from the slab design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabResult {
    pub self_weight_kn_m2: f64,
    /// ULS design load p_u (kN/m²)
    pub design_load_kn_m2: f64,
    /// Combination used for p_u
    pub load_combination: String,
    /// Span ratio α = lx/ly
    pub alpha: f64,
    pub spanning: Spanning,
    /// Panel coefficients (μx, μy) for two-way slabs
    pub panel_coefficients: Option<(f64, f64)>,
    /// Short span reinforcement
    pub main: SlabDirection,
    /// Long span (or distribution) reinforcement
    pub secondary: SlabDirection,
    /// Actual span/effective depth ratio l/d
    pub span_depth_ratio: f64,
    /// Limiting l/d (EC2 7.4.2)
    pub span_depth_limit: f64,
    pub verdict: Verdict,
    pub warnings: Vec<DesignWarning>,
}

impl SlabResult {
    pub fn passes(&self) -> bool {
        self.verdict.is_adequate()
    }
}

/// Limiting span/depth ratio per EC2 (7.16a/b) with ρ' = 0.
pub fn span_depth_limit(k: f64, fck: f64, rho: f64) -> f64 {
    let rho0 = fck.sqrt() * 1.0e-3;
    let sqrt_fck = fck.sqrt();
    if rho <= rho0 {
        k * (11.0 + 1.5 * sqrt_fck * rho0 / rho + 3.2 * sqrt_fck * (rho0 / rho - 1.0).powf(1.5))
    } else {
        k * (11.0 + 1.5 * sqrt_fck * rho0 / rho)
    }
}

fn strip_selection(max_spacing_mm: f64) -> BarSelection {
    BarSelection {
        width_mm: STRIP_WIDTH_MM,
        min_bars: 0,
        max_spacing_mm: Some(max_spacing_mm),
        min_diameter_mm: 6.0,
        max_diameter_mm: 16.0,
        even_count: false,
        placement: Placement::Distributed,
    }
}

/// Design a slab panel.
pub fn calculate(input: &SlabInput, factors: &SafetyFactors) -> CalcResult<SlabResult> {
    input.validate()?;
    factors.validate()?;

    let strengths = DesignStrengths::new(input.concrete, input.steel, factors);
    let h = input.thickness_mm();
    let (lx, ly) = input.spans_m();

    let combination = LoadCombination::elu();
    let self_weight = input.self_weight_kn_m2();
    let p_u = combination.apply(&Actions::new(
        input.dead_load_kn_m2 + self_weight,
        input.live_load_kn_m2,
    ));

    let alpha = lx / ly;
    let c_support = input.support.moment_coefficient();
    let (spanning, panel_coefficients, m_x, m_y) = if alpha < ONE_WAY_RATIO {
        (Spanning::OneWay, None, p_u * lx.powi(2) * c_support, 0.0)
    } else {
        let mu_x = 1.0 / (8.0 * (1.0 + 2.4 * alpha.powi(3)));
        let mu_y = alpha.powi(3) * (1.9 - 0.9 * alpha);
        let m_x = mu_x * p_u * lx.powi(2) * 8.0 * c_support;
        (Spanning::TwoWay, Some((mu_x, mu_y)), m_x, mu_y * m_x)
    };

    let d_x = input.main_depth_mm();
    let d_y = input.secondary_depth_mm();

    let main_flexure = design_flexure(STRIP_WIDTH_MM, d_x, KiloNewtonMeters(m_x).to_newton_mm(), &strengths);
    let main_selection = strip_selection((3.0 * h).min(400.0));
    let main_bars = select_bars(main_flexure.as_required_mm2, &main_selection);

    let secondary_selection = strip_selection((3.5 * h).min(450.0));
    let (secondary_flexure, secondary_required) = match spanning {
        Spanning::OneWay => (None, DISTRIBUTION_RATIO * main_flexure.as_required_mm2),
        Spanning::TwoWay => {
            let f = design_flexure(STRIP_WIDTH_MM, d_y, KiloNewtonMeters(m_y).to_newton_mm(), &strengths);
            (Some(f), f.as_required_mm2)
        }
    };
    let secondary_bars = select_bars(secondary_required, &secondary_selection);

    // Deflection control on the short span
    let rho = main_flexure.as_required_mm2 / (STRIP_WIDTH_MM * d_x);
    let span_depth_ratio = to_millimeters(Meters(lx)).value() / d_x;
    let limit = span_depth_limit(input.support.span_depth_factor(), strengths.fck, rho);

    let mut verdict = Verdict::Adequate;
    if main_flexure.is_over_capacity() {
        verdict = verdict.or(Verdict::inadequate(FailureReason::OverCapacity, main_flexure.capacity_ratio()));
    }
    if let Some(f) = secondary_flexure.filter(FlexuralDesign::is_over_capacity) {
        verdict = verdict.or(Verdict::inadequate(FailureReason::OverCapacity, f.capacity_ratio()));
    }
    if main_bars.is_none() {
        verdict = verdict.or(Verdict::inadequate(
            FailureReason::ReinforcementDoesNotFit,
            main_selection.fit_ratio(main_flexure.as_required_mm2),
        ));
    }
    if secondary_bars.is_none() {
        verdict = verdict.or(Verdict::inadequate(
            FailureReason::ReinforcementDoesNotFit,
            secondary_selection.fit_ratio(secondary_required),
        ));
    }

    let mut warnings = Vec::new();
    if span_depth_ratio > limit {
        warnings.push(DesignWarning::DeflectionCheckRequired);
    }
    if main_flexure.minimum_governs() {
        warnings.push(DesignWarning::MinimumReinforcementGoverns);
    }

    tracing::debug!(
        label = %input.label,
        p_u,
        alpha,
        m_x,
        m_y,
        span_depth_ratio,
        limit,
        "Slab design"
    );
    if !verdict.is_adequate() {
        tracing::warn!(label = %input.label, %verdict, "Slab design inadequate");
    }

    Ok(SlabResult {
        self_weight_kn_m2: self_weight,
        design_load_kn_m2: p_u,
        load_combination: combination.equation,
        alpha,
        spanning,
        panel_coefficients,
        main: SlabDirection {
            moment_knm_m: m_x,
            flexure: Some(main_flexure),
            as_required_cm2_m: SquareCentimeters::from_mm2(main_flexure.as_required_mm2).value(),
            bars: main_bars,
        },
        secondary: SlabDirection {
            moment_knm_m: m_y,
            flexure: secondary_flexure,
            as_required_cm2_m: SquareCentimeters::from_mm2(secondary_required).value(),
            bars: secondary_bars,
        },
        span_depth_ratio,
        span_depth_limit: limit,
        verdict,
        warnings,
    })
}
