//! # Isolated Pad Footing (simplified method)
//!
//! Rectangular pad under a single column, with a uniaxial moment acting
//! across the footing width B.
//!
//! - Soil bearing on the eccentricity-reduced width `B' = B − 2e`
//!   (Meyerhof), banded into a stability class
//! - Bottom reinforcement in both directions from the cantilever moment at
//!   `0.15·a` inside the column face
//! - Rigid footing criterion `d ≥ (B − a)/4`
//!
//! The pressure distribution and cantilever model are preliminary sizing
//! shortcuts, not a certified geotechnical verification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::equations::reinforced_concrete::{
    design_flexure, effective_depth, select_bars, BarLayout, BarSelection, DesignStrengths, FlexuralDesign, Placement,
};
use crate::errors::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::loads::LoadSpec;
use crate::materials::{ConcreteClass, SoilClass, SteelGrade};
use crate::safety::SafetyFactors;
use crate::tables::ClassificationBand;
use crate::units::{
    to_meters, to_millimeters, Centimeters, KiloNewtonMeters, Megapascals, Meters, Millimeters, SquareCentimeters,
};
use crate::verdict::{DesignWarning, FailureReason, Verdict};

/// Cover used when `cover_mm` is not given (mm)
pub const DEFAULT_COVER_MM: f64 = 50.0;

/// Unit weight of reinforced concrete (kN/m³)
const CONCRETE_UNIT_WEIGHT_KN_M3: f64 = 25.0;

/// Load factor on the footing self weight
const SELF_WEIGHT_FACTOR: f64 = 1.35;

/// Bar diameter assumed for the effective depths (mm)
const ASSUMED_BAR_DIAMETER_MM: f64 = 12.0;

/// Maximum bar spacing in the footing (mm)
const MAX_BAR_SPACING_MM: f64 = 250.0;

/// Soil stress ratio classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StabilityClass {
    Excellent,
    Good,
    Acceptable,
    Insufficient,
}

impl StabilityClass {
    /// Bands on σ/q, bounds inclusive
    pub fn band() -> CalcResult<ClassificationBand<StabilityClass>> {
        ClassificationBand::at_most(
            vec![
                (0.5, StabilityClass::Excellent),
                (0.75, StabilityClass::Good),
                (1.0, StabilityClass::Acceptable),
            ],
            StabilityClass::Insufficient,
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StabilityClass::Excellent => "Excellent",
            StabilityClass::Good => "Good",
            StabilityClass::Acceptable => "Acceptable",
            StabilityClass::Insufficient => "Insufficient",
        }
    }
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Input parameters for a pad footing.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "F-1",
///   "column_width_cm": 30.0,
///   "column_depth_cm": 30.0,
///   "width_m": 2.0,
///   "length_m": 2.0,
///   "thickness_cm": 50.0,
///   "concrete": "C25/30",
///   "steel": "S500",
///   "soil": "dense_sand",
///   "axial_kn": 800.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundationInput {
    #[serde(default)]
    pub label: String,

    /// Column dimension a, parallel to B (cm)
    pub column_width_cm: f64,

    /// Column dimension b, parallel to L (cm)
    pub column_depth_cm: f64,

    /// Footing width B, in the moment direction (m)
    pub width_m: f64,

    /// Footing length L (m)
    pub length_m: f64,

    /// Footing thickness h (cm)
    pub thickness_cm: f64,

    #[serde(default)]
    pub cover_mm: Option<f64>,

    pub concrete: ConcreteClass,

    pub steel: SteelGrade,

    /// Presumed soil class
    #[serde(default)]
    pub soil: Option<SoilClass>,

    /// Design bearing resistance q (MPa); overrides `soil`
    #[serde(default)]
    pub bearing_capacity_mpa: Option<f64>,

    /// Column axial load N_Ed (kN)
    pub axial_kn: f64,

    /// Column base moment M_Ed about the L axis (kN·m)
    #[serde(default)]
    pub moment_knm: f64,
}

impl FoundationInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("column_width_cm", self.column_width_cm)?;
        ensure_positive("column_depth_cm", self.column_depth_cm)?;
        ensure_positive("width_m", self.width_m)?;
        ensure_positive("length_m", self.length_m)?;
        ensure_positive("thickness_cm", self.thickness_cm)?;
        ensure_positive("cover_mm", self.cover())?;
        ensure_non_negative("axial_kn", self.axial_kn)?;
        self.design_forces().validate()?;
        self.bearing_capacity()?;

        if self.column_width_m() > self.width_m {
            return Err(CalcError::invalid_input(
                "column_width_cm",
                self.column_width_cm.to_string(),
                "Column is wider than the footing",
            ));
        }
        if self.column_depth_m() > self.length_m {
            return Err(CalcError::invalid_input(
                "column_depth_cm",
                self.column_depth_cm.to_string(),
                "Column is longer than the footing",
            ));
        }
        if self.inner_depth_mm() <= 0.0 {
            return Err(CalcError::invalid_input(
                "thickness_cm",
                self.thickness_cm.to_string(),
                "Footing too thin for the cover and two bar layers",
            ));
        }
        Ok(())
    }

    pub fn cover(&self) -> f64 {
        self.cover_mm.unwrap_or(DEFAULT_COVER_MM)
    }

    /// Design bearing resistance q (MPa)
    pub fn bearing_capacity(&self) -> CalcResult<f64> {
        match (self.bearing_capacity_mpa, self.soil) {
            (Some(q), _) => {
                ensure_positive("bearing_capacity_mpa", q)?;
                Ok(q)
            }
            (None, Some(soil)) => Ok(soil.bearing_capacity_mpa()),
            (None, None) => Err(CalcError::missing_field("soil")),
        }
    }

    pub fn column_width_m(&self) -> f64 {
        Meters::from(Centimeters(self.column_width_cm)).value()
    }

    pub fn column_depth_m(&self) -> f64 {
        Meters::from(Centimeters(self.column_depth_cm)).value()
    }

    pub fn thickness_mm(&self) -> f64 {
        Millimeters::from(Centimeters(self.thickness_cm)).value()
    }

    /// Effective depth of the bottom layer, bars along B (mm)
    pub fn outer_depth_mm(&self) -> f64 {
        effective_depth(self.thickness_mm(), self.cover(), ASSUMED_BAR_DIAMETER_MM)
    }

    /// Effective depth of the second layer, bars along L (mm)
    pub fn inner_depth_mm(&self) -> f64 {
        self.outer_depth_mm() - ASSUMED_BAR_DIAMETER_MM
    }

    /// Factored self weight 1.35·25·B·L·h (kN)
    pub fn self_weight_kn(&self) -> f64 {
        let h_m = Meters::from(Centimeters(self.thickness_cm)).value();
        SELF_WEIGHT_FACTOR * CONCRETE_UNIT_WEIGHT_KN_M3 * self.width_m * self.length_m * h_m
    }

    pub fn design_forces(&self) -> LoadSpec {
        LoadSpec::ultimate(self.axial_kn, self.moment_knm, 0.0)
    }
}

/// Soil bearing check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingCheck {
    /// σ = N_tot/(B'·L) (MPa)
    pub soil_pressure_mpa: f64,
    /// q (MPa)
    pub bearing_capacity_mpa: f64,
    /// σ/q
    pub ratio: f64,
    pub stability: StabilityClass,
}

/// Bottom reinforcement in one direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootingDirection {
    /// Cantilever l_c from the critical section (m)
    pub cantilever_m: f64,
    /// Design moment over the full width (kN·m)
    pub moment_knm: f64,
    pub flexure: FlexuralDesign,
    pub as_required_cm2: f64,
    pub bars: Option<BarLayout>,
}

/// Results from the footing design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundationResult {
    pub self_weight_kn: f64,
    /// N_Ed + self weight (kN)
    pub total_axial_kn: f64,
    /// e = |M|/N_tot (m)
    pub eccentricity_m: f64,
    /// B' = B − 2e (m); not positive when the footing overturns
    pub effective_width_m: f64,
    /// `None` when the footing overturns
    pub bearing: Option<BearingCheck>,
    /// Bars parallel to B; `None` when the footing overturns
    pub width_direction: Option<FootingDirection>,
    /// Bars parallel to L; `None` when the footing overturns
    pub length_direction: Option<FootingDirection>,
    pub design_forces: LoadSpec,
    pub verdict: Verdict,
    pub warnings: Vec<DesignWarning>,
}

impl FoundationResult {
    pub fn passes(&self) -> bool {
        self.verdict.is_adequate()
    }
}

fn footing_selection(width_mm: f64) -> BarSelection {
    BarSelection {
        width_mm,
        min_bars: 0,
        max_spacing_mm: Some(MAX_BAR_SPACING_MM),
        min_diameter_mm: 8.0,
        max_diameter_mm: 25.0,
        even_count: false,
        placement: Placement::Distributed,
    }
}

/// Design one direction: cantilever `(span − column)/2 + 0.15·column`
/// loaded by `net_pressure` over `orthogonal_width` (m, kN/m²).
fn design_direction(
    span_m: f64,
    column_m: f64,
    orthogonal_width_m: f64,
    net_pressure_kn_m2: f64,
    depth_mm: f64,
    strengths: &DesignStrengths,
) -> (FootingDirection, BarSelection) {
    let cantilever_m = (span_m - column_m) / 2.0 + 0.15 * column_m;
    let moment_knm = net_pressure_kn_m2 * orthogonal_width_m * cantilever_m.powi(2) / 2.0;
    let width_mm = to_millimeters(Meters(orthogonal_width_m)).value();

    let flexure = design_flexure(width_mm, depth_mm, KiloNewtonMeters(moment_knm).to_newton_mm(), strengths);
    let selection = footing_selection(width_mm);
    let bars = select_bars(flexure.as_required_mm2, &selection);

    (
        FootingDirection {
            cantilever_m,
            moment_knm,
            flexure,
            as_required_cm2: SquareCentimeters::from_mm2(flexure.as_required_mm2).value(),
            bars,
        },
        selection,
    )
}

fn direction_verdict(verdict: Verdict, direction: &FootingDirection, selection: &BarSelection) -> Verdict {
    let mut verdict = verdict;
    if direction.flexure.is_over_capacity() {
        verdict = verdict.or(Verdict::inadequate(
            FailureReason::OverCapacity,
            direction.flexure.capacity_ratio(),
        ));
    }
    if direction.bars.is_none() {
        verdict = verdict.or(Verdict::inadequate(
            FailureReason::ReinforcementDoesNotFit,
            selection.fit_ratio(direction.flexure.as_required_mm2),
        ));
    }
    verdict
}

/// Design an isolated pad footing.
pub fn calculate(input: &FoundationInput, factors: &SafetyFactors) -> CalcResult<FoundationResult> {
    input.validate()?;
    factors.validate()?;

    let strengths = DesignStrengths::new(input.concrete, input.steel, factors);
    let q = input.bearing_capacity()?;
    let (b_m, l_m) = (input.width_m, input.length_m);

    let self_weight = input.self_weight_kn();
    let n_tot = input.axial_kn + self_weight;
    let eccentricity = input.moment_knm.abs() / n_tot;
    let effective_width = b_m - 2.0 * eccentricity;

    let mut warnings = Vec::new();
    if eccentricity > b_m / 6.0 {
        warnings.push(DesignWarning::PartialUplift);
    }

    let d_outer = input.outer_depth_mm();
    let rigid_limit_m = ((b_m - input.column_width_m()) / 4.0).max((l_m - input.column_depth_m()) / 4.0);
    if d_outer < to_millimeters(Meters(rigid_limit_m)).value() {
        warnings.push(DesignWarning::FlexibleFooting);
    }

    if effective_width <= 0.0 {
        let verdict = Verdict::inadequate(FailureReason::Overturning, 2.0 * eccentricity / b_m);
        tracing::warn!(label = %input.label, eccentricity, %verdict, "Footing overturns");
        return Ok(FoundationResult {
            self_weight_kn: self_weight,
            total_axial_kn: n_tot,
            eccentricity_m: eccentricity,
            effective_width_m: effective_width,
            bearing: None,
            width_direction: None,
            length_direction: None,
            design_forces: input.design_forces(),
            verdict,
            warnings,
        });
    }

    let soil_pressure = Megapascals::from_kn_per_m2(n_tot / (effective_width * l_m)).value();
    let ratio = soil_pressure / q;
    let stability = StabilityClass::band()?.classify(ratio);

    let net_pressure = input.axial_kn / (effective_width * l_m);
    let (width_direction, width_selection) =
        design_direction(b_m, input.column_width_m(), l_m, net_pressure, d_outer, &strengths);
    let (length_direction, length_selection) = design_direction(
        l_m,
        input.column_depth_m(),
        b_m,
        net_pressure,
        input.inner_depth_mm(),
        &strengths,
    );

    let mut verdict = Verdict::Adequate;
    if stability == StabilityClass::Insufficient {
        verdict = verdict.or(Verdict::inadequate(FailureReason::BearingCapacityExceeded, ratio));
    }
    verdict = direction_verdict(verdict, &width_direction, &width_selection);
    verdict = direction_verdict(verdict, &length_direction, &length_selection);

    tracing::debug!(
        label = %input.label,
        n_tot,
        eccentricity,
        effective_width,
        soil_pressure,
        ratio,
        %stability,
        d_outer_m = to_meters(Millimeters(d_outer)).value(),
        "Footing design"
    );
    if !verdict.is_adequate() {
        tracing::warn!(label = %input.label, %verdict, "Footing design inadequate");
    }

    Ok(FoundationResult {
        self_weight_kn: self_weight,
        total_axial_kn: n_tot,
        eccentricity_m: eccentricity,
        effective_width_m: effective_width,
        bearing: Some(BearingCheck {
            soil_pressure_mpa: soil_pressure,
            bearing_capacity_mpa: q,
            ratio,
            stability,
        }),
        width_direction: Some(width_direction),
        length_direction: Some(length_direction),
        design_forces: input.design_forces(),
        verdict,
        warnings,
    })
}
