//! # Reinforced Concrete Flexure (EC2 simplified method)
//!
//! Singly reinforced rectangular section, rectangular stress block with
//! λ = 0.8 and η = 1.0:
//!
//! ```text
//! d  = h − cover − φ/2
//! μ  = M_Ed / (b·d²·f_cd)              μ ≤ μ_lim = 0.372
//! z  = d·(0.5 + √(0.25 − 0.5·μ))
//! As = M_Ed / (f_yd·z)
//! As,min = max(0.26·f_ctm/f_yk·b·d, 0.0013·b·d)     (EC2 9.2.1.1)
//! ```
//!
//! Everything here works in N, mm and MPa.

use serde::{Deserialize, Serialize};

use crate::materials::{bar_area_mm2, diameters_between, ConcreteClass, SteelGrade};
use crate::safety::SafetyFactors;

/// Limiting reduced moment for a singly reinforced section (S500, x/d = 0.617)
pub const MU_LIMIT: f64 = 0.372;

/// Relative slack on μ_lim so a moment sized exactly at the limit is not
/// rejected by unit conversion rounding
const MU_LIMIT_TOLERANCE: f64 = 1e-9;

/// Smallest clear spacing allowed between bars regardless of diameter (mm)
pub const MIN_CLEAR_SPACING_MM: f64 = 20.0;

/// Design strengths of a concrete/steel pair (MPa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignStrengths {
    pub fck: f64,
    pub fcd: f64,
    pub fctm: f64,
    pub fyk: f64,
    pub fyd: f64,
}

impl DesignStrengths {
    pub fn new(concrete: ConcreteClass, steel: SteelGrade, factors: &SafetyFactors) -> Self {
        let props = concrete.properties();
        DesignStrengths {
            fck: props.fck_mpa,
            fcd: factors.fcd(props.fck_mpa),
            fctm: props.fctm_mpa,
            fyk: steel.fyk_mpa(),
            fyd: factors.fyd(steel.fyk_mpa()),
        }
    }
}

/// Effective depth d = h − cover − φ/2 (mm)
#[inline]
pub fn effective_depth(height_mm: f64, cover_mm: f64, bar_diameter_mm: f64) -> f64 {
    height_mm - cover_mm - bar_diameter_mm / 2.0
}

/// Reduced moment μ = M / (b·d²·f_cd)
#[inline]
pub fn reduced_moment(moment_nmm: f64, width_mm: f64, depth_mm: f64, fcd: f64) -> f64 {
    moment_nmm.abs() / (width_mm * depth_mm.powi(2) * fcd)
}

/// Lever arm z = d·(0.5 + √(0.25 − 0.5·μ))
///
/// μ is clamped to μ_lim so the root stays real.
#[inline]
pub fn lever_arm(depth_mm: f64, mu: f64) -> f64 {
    let mu = mu.clamp(0.0, MU_LIMIT);
    depth_mm * (0.5 + (0.25 - 0.5 * mu).sqrt())
}

/// Minimum tension reinforcement As,min (mm²), EC2 9.2.1.1 (9.1N)
#[inline]
pub fn minimum_reinforcement(width_mm: f64, depth_mm: f64, fctm: f64, fyk: f64) -> f64 {
    (0.26 * fctm / fyk * width_mm * depth_mm).max(0.0013 * width_mm * depth_mm)
}

/// Outcome of the flexural design of one section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlexuralDesign {
    /// Effective depth d (mm)
    pub effective_depth_mm: f64,
    /// Reduced moment μ
    pub mu: f64,
    /// Limiting reduced moment μ_lim
    pub mu_limit: f64,
    /// Lever arm z (mm); evaluated at μ_lim when the section is over capacity
    pub lever_arm_mm: f64,
    /// Strength requirement As (mm²)
    pub as_strength_mm2: f64,
    /// Minimum reinforcement As,min (mm²)
    pub as_min_mm2: f64,
    /// max(As, As,min) (mm²)
    pub as_required_mm2: f64,
    /// min(μ/μ_lim, 1)
    pub utilization: f64,
}

impl FlexuralDesign {
    /// μ strictly above μ_lim. μ = μ_lim is still adequate.
    pub fn is_over_capacity(&self) -> bool {
        self.mu > self.mu_limit * (1.0 + MU_LIMIT_TOLERANCE)
    }

    /// Demand ratio μ/μ_lim (uncapped)
    pub fn capacity_ratio(&self) -> f64 {
        self.mu / self.mu_limit
    }

    pub fn minimum_governs(&self) -> bool {
        self.as_min_mm2 > self.as_strength_mm2
    }
}

/// Run the shared flexure procedure on a `b × d` section.
///
/// # Example
///
/// ```rust
/// use batical_core::equations::reinforced_concrete::{design_flexure, DesignStrengths};
/// use batical_core::materials::{ConcreteClass, SteelGrade};
/// use batical_core::safety::SafetyFactors;
///
/// let strengths = DesignStrengths::new(ConcreteClass::C25_30, SteelGrade::S500, &SafetyFactors::default());
/// let design = design_flexure(300.0, 562.0, 150.0e6, &strengths);
/// assert!(!design.is_over_capacity());
/// assert!(design.as_required_mm2 > 600.0);
/// ```
pub fn design_flexure(width_mm: f64, depth_mm: f64, moment_nmm: f64, strengths: &DesignStrengths) -> FlexuralDesign {
    let mu = reduced_moment(moment_nmm, width_mm, depth_mm, strengths.fcd);
    let z = lever_arm(depth_mm, mu);
    let as_strength = moment_nmm.abs() / (strengths.fyd * z);
    let as_min = minimum_reinforcement(width_mm, depth_mm, strengths.fctm, strengths.fyk);

    FlexuralDesign {
        effective_depth_mm: depth_mm,
        mu,
        mu_limit: MU_LIMIT,
        lever_arm_mm: z,
        as_strength_mm2: as_strength,
        as_min_mm2: as_min,
        as_required_mm2: as_strength.max(as_min),
        utilization: (mu / MU_LIMIT).min(1.0),
    }
}

// =============================================================================
// BAR SELECTION
// =============================================================================

/// How bars are laid out across the section width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    /// Bars in rows between side covers (beams, columns).
    /// `rows` is the number of faces sharing the bar count.
    Rows { side_cover_mm: f64, rows: u32 },
    /// Bars evenly distributed over the width (slabs, footings)
    Distributed,
}

/// Constraints for choosing a bar layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarSelection {
    /// Width the bars are spread over (mm)
    pub width_mm: f64,
    pub min_bars: u32,
    /// Maximum centre-to-centre spacing (mm)
    pub max_spacing_mm: Option<f64>,
    pub min_diameter_mm: f64,
    pub max_diameter_mm: f64,
    /// Round the bar count up to an even number
    pub even_count: bool,
    pub placement: Placement,
}

/// A chosen set of bars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarLayout {
    pub diameter_mm: f64,
    pub count: u32,
    /// Provided steel area (mm²)
    pub area_mm2: f64,
    /// Centre-to-centre spacing (mm)
    pub spacing_mm: f64,
    /// Clear spacing between adjacent bars (mm)
    pub clear_spacing_mm: f64,
}

impl BarLayout {
    /// Designation in site notation, e.g. "4 HA16"
    pub fn designation(&self) -> String {
        format!("{} HA{}", self.count, self.diameter_mm)
    }
}

impl BarSelection {
    fn layout(&self, diameter_mm: f64, required_mm2: f64) -> BarLayout {
        let bar_area = bar_area_mm2(diameter_mm);
        let mut count = self.min_bars.max(1).max((required_mm2 / bar_area).ceil() as u32);
        if let Some(s_max) = self.max_spacing_mm {
            count = count.max((self.width_mm / s_max).ceil() as u32);
        }
        if self.even_count && count % 2 == 1 {
            count += 1;
        }

        let spacing_mm = match self.placement {
            Placement::Rows { side_cover_mm, rows } => {
                let per_row = (count / rows.max(1)).max(1);
                if per_row > 1 {
                    (self.width_mm - 2.0 * side_cover_mm - diameter_mm) / f64::from(per_row - 1)
                } else {
                    self.width_mm - 2.0 * side_cover_mm
                }
            }
            Placement::Distributed => self.width_mm / f64::from(count),
        };

        BarLayout {
            diameter_mm,
            count,
            area_mm2: f64::from(count) * bar_area,
            spacing_mm,
            clear_spacing_mm: spacing_mm - diameter_mm,
        }
    }
}

impl BarSelection {
    /// Largest steel area any single standard diameter can provide while
    /// keeping the minimum clear spacing (mm²).
    pub fn max_area_mm2(&self) -> f64 {
        diameters_between(self.min_diameter_mm, self.max_diameter_mm)
            .into_iter()
            .map(|d| {
                let pitch = d + d.max(MIN_CLEAR_SPACING_MM);
                let count = match self.placement {
                    Placement::Rows { side_cover_mm, rows } => {
                        let free = self.width_mm - 2.0 * side_cover_mm - d;
                        if free < 0.0 {
                            0.0
                        } else {
                            ((free / pitch).floor() + 1.0) * f64::from(rows.max(1))
                        }
                    }
                    Placement::Distributed => (self.width_mm / pitch).floor(),
                };
                count * bar_area_mm2(d)
            })
            .fold(0.0, f64::max)
    }

    /// Required area over the largest area that fits; 1.0 when not even one bar fits.
    pub fn fit_ratio(&self, required_mm2: f64) -> f64 {
        let capacity = self.max_area_mm2();
        if capacity > 0.0 {
            required_mm2 / capacity
        } else {
            1.0
        }
    }
}

/// Pick the layout with the fewest bars that provides `required_mm2` and
/// respects the minimum clear spacing `max(φ, 20 mm)`.
///
/// Diameters are tried largest to smallest; ties in bar count go to the
/// smaller provided area. `None` when no standard diameter fits.
pub fn select_bars(required_mm2: f64, selection: &BarSelection) -> Option<BarLayout> {
    diameters_between(selection.min_diameter_mm, selection.max_diameter_mm)
        .into_iter()
        .map(|d| selection.layout(d, required_mm2))
        .filter(|layout| layout.clear_spacing_mm >= layout.diameter_mm.max(MIN_CLEAR_SPACING_MM))
        .fold(None, |best: Option<BarLayout>, candidate| match best {
            Some(b) if b.count < candidate.count || (b.count == candidate.count && b.area_mm2 <= candidate.area_mm2) => {
                Some(b)
            }
            _ => Some(candidate),
        })
}
