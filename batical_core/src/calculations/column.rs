//! # Reinforced Concrete Column (simplified method)
//!
//! Rectangular column with symmetric reinforcement under axial compression
//! and uniaxial bending. The slenderness treatment is a simplified method
//! (nominal curvature with a fixed λ_lim coefficient set and a tabulated
//! buckling reduction), not a certified second-order analysis.
//!
//! ## Method
//!
//! ```text
//! l0 = k·L          i = min(b,h)/√12          λ = l0/i
//! kc = 0.86/(1 + (λ/62)²)     λ ≤ 60
//!    = (32/λ)^1.3             60 < λ ≤ 120
//! λ_lim = 20·0.7·1.1·0.7/√n   n = N/(Ac·fcd)
//! e2 = (fyd/Es)/(0.45·d) · l0²/10      (only when λ > λ_lim)
//! M0 = max(|M| + N·l0/400, N·max(h/30, 20 mm))
//! N/N_Rd + M/M_Rd ≤ 1
//!   N_Rd = kc·(Ac·fcd + As·fyd),  M_Rd = (As/2)·fyd·(d − d')
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::reinforced_concrete::{select_bars, BarLayout, BarSelection, DesignStrengths, Placement};
use crate::equations::section::{rectangular_area, weak_axis_radius_of_gyration};
use crate::errors::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::loads::LoadSpec;
use crate::materials::{ConcreteClass, SteelGrade, STANDARD_BAR_DIAMETERS_MM, STEEL_MODULUS_MPA};
use crate::safety::SafetyFactors;
use crate::units::{to_meters, to_millimeters, Centimeters, KiloNewtonMeters, KiloNewtons, Meters, Millimeters, SquareCentimeters};
use crate::verdict::{DesignWarning, FailureReason, Verdict};

/// Cover used when `cover_mm` is not given (mm)
pub const DEFAULT_COVER_MM: f64 = 30.0;

/// Maximum longitudinal steel ratio As,max / Ac
pub const MAX_STEEL_RATIO: f64 = 0.04;

/// Slenderness above which the simplified method does not apply
pub const MAX_SLENDERNESS: f64 = 120.0;

/// Largest accepted effective length coefficient
pub const MAX_BUCKLING_FACTOR: f64 = 2.5;

/// Longitudinal bar diameter assumed for d (mm)
const ASSUMED_BAR_DIAMETER_MM: f64 = 16.0;

/// 20·A·B·C with A = 0.7, B = 1.1, C = 0.7
const SLENDERNESS_LIMIT_COEFFICIENT: f64 = 20.0 * 0.7 * 1.1 * 0.7;

/// Input parameters for a rectangular column.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "C-3",
///   "width_cm": 30.0,
///   "depth_cm": 30.0,
///   "length_m": 3.0,
///   "buckling_factor": 0.7,
///   "concrete": "C25/30",
///   "steel": "S500",
///   "axial_kn": 1000.0,
///   "moment_knm": 20.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInput {
    #[serde(default)]
    pub label: String,

    /// Section width b (cm)
    pub width_cm: f64,

    /// Section depth h in the bending direction (cm)
    pub depth_cm: f64,

    /// Storey height L (m)
    pub length_m: f64,

    /// Effective length coefficient k (l0 = k·L)
    pub buckling_factor: f64,

    #[serde(default)]
    pub cover_mm: Option<f64>,

    pub concrete: ConcreteClass,

    pub steel: SteelGrade,

    /// Design axial compression N_Ed (kN)
    pub axial_kn: f64,

    /// First-order design moment M_Ed (kN·m)
    #[serde(default)]
    pub moment_knm: f64,
}

impl ColumnInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("width_cm", self.width_cm)?;
        ensure_positive("depth_cm", self.depth_cm)?;
        ensure_positive("length_m", self.length_m)?;
        ensure_positive("buckling_factor", self.buckling_factor)?;
        ensure_positive("cover_mm", self.cover())?;
        ensure_non_negative("axial_kn", self.axial_kn)?;
        self.design_forces().validate()?;
        if self.buckling_factor > MAX_BUCKLING_FACTOR {
            return Err(CalcError::invalid_input(
                "buckling_factor",
                self.buckling_factor.to_string(),
                format!("Effective length coefficient must not exceed {}", MAX_BUCKLING_FACTOR),
            ));
        }
        if self.effective_depth_mm() <= self.compression_depth_mm() {
            return Err(CalcError::invalid_input(
                "depth_cm",
                self.depth_cm.to_string(),
                "Section too small for the cover on both faces",
            ));
        }
        Ok(())
    }

    pub fn cover(&self) -> f64 {
        self.cover_mm.unwrap_or(DEFAULT_COVER_MM)
    }

    pub fn width_mm(&self) -> f64 {
        Millimeters::from(Centimeters(self.width_cm)).value()
    }

    pub fn depth_mm(&self) -> f64 {
        Millimeters::from(Centimeters(self.depth_cm)).value()
    }

    /// d (mm)
    pub fn effective_depth_mm(&self) -> f64 {
        self.depth_mm() - self.cover() - ASSUMED_BAR_DIAMETER_MM / 2.0
    }

    /// d' = h − d (mm)
    pub fn compression_depth_mm(&self) -> f64 {
        self.depth_mm() - self.effective_depth_mm()
    }

    /// l0 = k·L (mm)
    pub fn effective_length_mm(&self) -> f64 {
        to_millimeters(Meters(self.buckling_factor * self.length_m)).value()
    }

    pub fn design_forces(&self) -> LoadSpec {
        LoadSpec::ultimate(self.axial_kn, self.moment_knm, 0.0)
    }
}

/// Buckling reduction factor kc for a slenderness λ
pub fn buckling_reduction(slenderness: f64) -> f64 {
    if slenderness <= 60.0 {
        0.86 / (1.0 + (slenderness / 62.0).powi(2))
    } else {
        (32.0 / slenderness).powf(1.3)
    }
}

/// Slenderness limit λ_lim; `None` without axial load
pub fn slenderness_limit(relative_axial_force: f64) -> Option<f64> {
    (relative_axial_force > 0.0).then(|| SLENDERNESS_LIMIT_COEFFICIENT / relative_axial_force.sqrt())
}

/// Coefficients of the linear N-M interaction, N in N, M in N·mm, As in mm².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    /// kc·Ac·fcd
    pub concrete_capacity_n: f64,
    /// kc·fyd, axial capacity per mm² of steel
    pub steel_axial_n_mm2: f64,
    /// fyd·(d − d')/2, moment capacity per mm² of steel
    pub steel_moment_nmm_mm2: f64,
}

impl Interaction {
    pub fn axial_resistance(&self, as_mm2: f64) -> f64 {
        self.concrete_capacity_n + self.steel_axial_n_mm2 * as_mm2
    }

    pub fn moment_resistance(&self, as_mm2: f64) -> f64 {
        self.steel_moment_nmm_mm2 * as_mm2
    }

    /// N/N_Rd + M/M_Rd for a given steel area
    pub fn value(&self, n: f64, m: f64, as_mm2: f64) -> f64 {
        let axial = if n > 0.0 { n / self.axial_resistance(as_mm2) } else { 0.0 };
        let bending = if m > 0.0 {
            let m_rd = self.moment_resistance(as_mm2);
            if m_rd > 0.0 {
                m / m_rd
            } else {
                f64::INFINITY
            }
        } else {
            0.0
        };
        axial + bending
    }

    /// Steel area that brings the interaction exactly to 1.
    ///
    /// Positive root of `c·s·x² + (c·a − N·c − M·s)·x − M·a = 0`.
    pub fn required_steel(&self, n: f64, m: f64) -> f64 {
        let a = self.concrete_capacity_n;
        let s = self.steel_axial_n_mm2;
        let c = self.steel_moment_nmm_mm2;

        if m <= 0.0 {
            return ((n - a) / s).max(0.0);
        }
        let qa = c * s;
        let qb = c * a - n * c - m * s;
        let qc = -m * a;
        (-qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    }
}

/// Slenderness quantities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlendernessCheck {
    /// l0 (m)
    pub effective_length_m: f64,
    /// i (mm)
    pub radius_of_gyration_mm: f64,
    /// λ
    pub slenderness: f64,
    /// λ_lim, absent without axial load
    pub slenderness_limit: Option<f64>,
    /// kc
    pub buckling_reduction: f64,
    /// e2 (mm), zero unless λ > λ_lim
    pub second_order_eccentricity_mm: f64,
}

/// Transverse ties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TieLayout {
    pub diameter_mm: f64,
    /// Maximum spacing along the column (mm)
    pub spacing_mm: f64,
}

/// Results from the column design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnResult {
    pub effective_depth_mm: f64,
    pub fcd_mpa: f64,
    pub fyd_mpa: f64,
    pub slenderness: SlendernessCheck,

    /// M0 including imperfection and minimum eccentricity (kN·m)
    pub first_order_moment_knm: f64,
    /// M2 = N·e2 (kN·m)
    pub second_order_moment_knm: f64,
    /// M0 + M2 (kN·m)
    pub total_moment_knm: f64,
    /// kc·(Ac·fcd) without steel (kN)
    pub concrete_resistance_kn: f64,

    pub as_strength_cm2: f64,
    pub as_min_cm2: f64,
    pub as_max_cm2: f64,
    pub as_required_cm2: f64,

    pub bars: Option<BarLayout>,
    pub ties: Option<TieLayout>,

    /// Interaction value with the provided steel, capped at 1
    pub utilization: f64,

    pub design_forces: LoadSpec,
    pub verdict: Verdict,
    pub warnings: Vec<DesignWarning>,
}

impl ColumnResult {
    pub fn passes(&self) -> bool {
        self.verdict.is_adequate()
    }
}

fn tie_layout(bars: &BarLayout, b: f64, h: f64) -> Option<TieLayout> {
    let min_diameter = (bars.diameter_mm / 4.0).max(6.0);
    STANDARD_BAR_DIAMETERS_MM
        .iter()
        .copied()
        .find(|d| *d >= min_diameter)
        .map(|diameter_mm| TieLayout {
            diameter_mm,
            spacing_mm: (20.0 * bars.diameter_mm).min(b.min(h)).min(400.0),
        })
}

/// Design a rectangular column.
pub fn calculate(input: &ColumnInput, factors: &SafetyFactors) -> CalcResult<ColumnResult> {
    input.validate()?;
    factors.validate()?;

    let strengths = DesignStrengths::new(input.concrete, input.steel, factors);
    let b = input.width_mm();
    let h = input.depth_mm();
    let d = input.effective_depth_mm();
    let d2 = input.compression_depth_mm();
    let ac = rectangular_area(b, h);
    let n_ed = KiloNewtons(input.axial_kn).to_newtons();

    // Slenderness
    let l0 = input.effective_length_mm();
    let i = weak_axis_radius_of_gyration(b, h);
    let lambda = l0 / i;
    let kc = buckling_reduction(lambda);
    let lambda_lim = slenderness_limit(n_ed / (ac * strengths.fcd));
    let second_order = lambda_lim.is_some_and(|limit| lambda > limit);
    let e2 = if second_order {
        (strengths.fyd / STEEL_MODULUS_MPA) / (0.45 * d) * l0.powi(2) / 10.0
    } else {
        0.0
    };

    // Moments (N·mm)
    let e_i = l0 / 400.0;
    let e0 = (h / 30.0).max(20.0);
    let m_first = KiloNewtonMeters(input.moment_knm).to_newton_mm().abs();
    let m0 = (m_first + n_ed * e_i).max(n_ed * e0);
    let m2 = n_ed * e2;
    let m_total = m0 + m2;

    let interaction = Interaction {
        concrete_capacity_n: kc * ac * strengths.fcd,
        steel_axial_n_mm2: kc * strengths.fyd,
        steel_moment_nmm_mm2: strengths.fyd * (d - d2) / 2.0,
    };

    let as_strength = interaction.required_steel(n_ed, m_total);
    let as_min = (0.10 * n_ed / strengths.fyd).max(0.002 * ac);
    let as_max = MAX_STEEL_RATIO * ac;
    let as_required = as_strength.max(as_min);

    let selection = BarSelection {
        width_mm: b,
        min_bars: 4,
        max_spacing_mm: None,
        min_diameter_mm: 12.0,
        max_diameter_mm: 25.0,
        even_count: true,
        placement: Placement::Rows {
            side_cover_mm: input.cover(),
            rows: 2,
        },
    };
    let bars = if as_required <= as_max {
        select_bars(as_required, &selection)
    } else {
        None
    };
    let ties = bars.as_ref().and_then(|layout| tie_layout(layout, b, h));

    let as_provided = bars.map(|l| l.area_mm2).unwrap_or(as_required);
    let utilization = interaction.value(n_ed, m_total, as_provided).min(1.0);

    let mut verdict = Verdict::Adequate;
    if lambda > MAX_SLENDERNESS {
        verdict = verdict.or(Verdict::inadequate(
            FailureReason::ExcessiveSlenderness,
            lambda / MAX_SLENDERNESS,
        ));
    }
    if as_required > as_max {
        verdict = verdict.or(Verdict::inadequate(FailureReason::OverCapacity, as_required / as_max));
    } else if bars.is_none() {
        verdict = verdict.or(Verdict::inadequate(
            FailureReason::ReinforcementDoesNotFit,
            selection.fit_ratio(as_required),
        ));
    }

    let mut warnings = Vec::new();
    if second_order {
        warnings.push(DesignWarning::BucklingSignificant);
    }
    if as_strength < as_min {
        warnings.push(DesignWarning::MinimumReinforcementGoverns);
    }

    tracing::debug!(
        label = %input.label,
        lambda,
        lambda_lim = ?lambda_lim,
        kc,
        m_total_nmm = m_total,
        as_required_mm2 = as_required,
        "Column design"
    );
    if !verdict.is_adequate() {
        tracing::warn!(label = %input.label, %verdict, "Column design inadequate");
    }

    Ok(ColumnResult {
        effective_depth_mm: d,
        fcd_mpa: strengths.fcd,
        fyd_mpa: strengths.fyd,
        slenderness: SlendernessCheck {
            effective_length_m: to_meters(Millimeters(l0)).value(),
            radius_of_gyration_mm: i,
            slenderness: lambda,
            slenderness_limit: lambda_lim,
            buckling_reduction: kc,
            second_order_eccentricity_mm: e2,
        },
        first_order_moment_knm: KiloNewtonMeters::from_newton_mm(m0).value(),
        second_order_moment_knm: KiloNewtonMeters::from_newton_mm(m2).value(),
        total_moment_knm: KiloNewtonMeters::from_newton_mm(m_total).value(),
        concrete_resistance_kn: KiloNewtons::from_newtons(interaction.concrete_capacity_n).value(),
        as_strength_cm2: SquareCentimeters::from_mm2(as_strength).value(),
        as_min_cm2: SquareCentimeters::from_mm2(as_min).value(),
        as_max_cm2: SquareCentimeters::from_mm2(as_max).value(),
        as_required_cm2: SquareCentimeters::from_mm2(as_required).value(),
        bars,
        ties,
        utilization,
        design_forces: input.design_forces(),
        verdict,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_column() -> ColumnInput {
        ColumnInput {
            label: "C-1".to_string(),
            width_cm: 30.0,
            depth_cm: 30.0,
            length_m: 3.0,
            buckling_factor: 0.7,
            cover_mm: None,
            concrete: ConcreteClass::C25_30,
            steel: SteelGrade::S500,
            axial_kn: 1000.0,
            moment_knm: 20.0,
        }
    }

    #[test]
    fn test_reference_column() {
        let result = calculate(&test_column(), &SafetyFactors::default()).unwrap();

        // l0 = 2.1 m, i = 86.6 mm, λ ≈ 24.2
        assert!((result.slenderness.slenderness - 24.25).abs() < 0.05);
        assert!(result.slenderness.slenderness_limit.unwrap() < result.slenderness.slenderness);
        assert!(result.warnings.contains(&DesignWarning::BucklingSignificant));
        assert!(result.second_order_moment_knm > 0.0);

        let bars = result.bars.unwrap();
        assert_eq!(bars.count % 2, 0);
        assert!(bars.count >= 4);
        assert!(SquareCentimeters::from_mm2(bars.area_mm2).value() >= result.as_required_cm2);
        assert!(result.passes());
        assert!(result.utilization > 0.0 && result.utilization <= 1.0);
    }

    #[test]
    fn test_required_steel_closes_interaction() {
        let interaction = Interaction {
            concrete_capacity_n: 1.1e6,
            steel_axial_n_mm2: 320.0,
            steel_moment_nmm_mm2: 48_000.0,
        };
        let (n, m) = (1.0e6, 35.0e6);
        let as_req = interaction.required_steel(n, m);
        assert!(as_req > 0.0);
        assert!((interaction.value(n, m, as_req) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pure_axial_with_spare_concrete() {
        let interaction = Interaction {
            concrete_capacity_n: 2.0e6,
            steel_axial_n_mm2: 320.0,
            steel_moment_nmm_mm2: 48_000.0,
        };
        assert_eq!(interaction.required_steel(1.0e6, 0.0), 0.0);
        assert!((interaction.required_steel(2.32e6, 0.0) - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_buckling_reduction_is_continuous() {
        let below = buckling_reduction(60.0);
        let above = buckling_reduction(60.0 + 1e-9);
        assert!((below - above).abs() < 0.005);
        assert!(buckling_reduction(20.0) > buckling_reduction(80.0));
    }

    #[test]
    fn test_no_axial_load() {
        let mut column = test_column();
        column.axial_kn = 0.0;
        column.moment_knm = 0.0;
        let result = calculate(&column, &SafetyFactors::default()).unwrap();
        assert!(result.slenderness.slenderness_limit.is_none());
        assert!(!result.warnings.contains(&DesignWarning::BucklingSignificant));
        // 0.2 % of 900 cm²
        assert!((result.as_required_cm2 - 1.8).abs() < 1e-9);
        assert!(result.warnings.contains(&DesignWarning::MinimumReinforcementGoverns));
    }

    #[test]
    fn test_excessive_slenderness() {
        let mut column = test_column();
        column.width_cm = 20.0;
        column.depth_cm = 20.0;
        column.length_m = 10.0;
        column.buckling_factor = 2.0;
        column.axial_kn = 100.0;
        let result = calculate(&column, &SafetyFactors::default()).unwrap();
        assert!(result.slenderness.slenderness > MAX_SLENDERNESS);
        assert_eq!(result.verdict.failure(), Some(FailureReason::ExcessiveSlenderness));
    }

    #[test]
    fn test_over_capacity() {
        let mut column = test_column();
        column.axial_kn = 5000.0;
        let result = calculate(&column, &SafetyFactors::default()).unwrap();
        assert_eq!(result.verdict.failure(), Some(FailureReason::OverCapacity));
        assert!(result.as_required_cm2 > result.as_max_cm2);
        assert!(result.bars.is_none());
    }

    #[test]
    fn test_ties() {
        let result = calculate(&test_column(), &SafetyFactors::default()).unwrap();
        let bars = result.bars.unwrap();
        let ties = result.ties.unwrap();
        assert!(ties.diameter_mm >= 6.0);
        assert!(ties.diameter_mm >= bars.diameter_mm / 4.0);
        assert!(ties.spacing_mm <= 300.0);
    }

    #[test]
    fn test_moment_sign_does_not_matter() {
        let mut hogging = test_column();
        hogging.moment_knm = -20.0;
        let a = calculate(&test_column(), &SafetyFactors::default()).unwrap();
        let b = calculate(&hogging, &SafetyFactors::default()).unwrap();
        assert_eq!(a.as_required_cm2, b.as_required_cm2);
        assert_eq!(b.design_forces.moment_knm, -20.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut tension = test_column();
        tension.axial_kn = -10.0;
        assert!(calculate(&tension, &SafetyFactors::default()).is_err());

        let mut k = test_column();
        k.buckling_factor = 3.0;
        assert!(calculate(&k, &SafetyFactors::default()).is_err());

        let mut tiny = test_column();
        tiny.depth_cm = 7.0;
        assert!(calculate(&tiny, &SafetyFactors::default()).is_err());
    }
}
