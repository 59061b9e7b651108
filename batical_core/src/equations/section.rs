//! # Cross-Section Property Formulas
//!
//! Geometric properties of solid rectangular sections, used by the timber
//! stress checks and the column slenderness calculation.
//!
//! ## Notation
//!
//! - `A` = Cross-sectional area
//! - `I` = Moment of inertia (second moment of area)
//! - `W` = Elastic section modulus (I/c, c = distance to extreme fibre)
//! - `i` = Radius of gyration (√(I/A))
//! - `b` = Width of section
//! - `h` = Height of section (parallel to bending)
//!
//! All functions are unit-agnostic; the callers work in millimetres.

// =============================================================================
// RECTANGULAR SECTION PROPERTIES
// =============================================================================

/// Cross-sectional area of a rectangle
///
/// # Formula
/// A = b × h
///
/// # Example
/// ```rust
/// use batical_core::equations::section::rectangular_area;
///
/// // 75 × 200 mm joist
/// assert_eq!(rectangular_area(75.0, 200.0), 15_000.0);
/// ```
#[inline]
pub fn rectangular_area(b: f64, h: f64) -> f64 {
    b * h
}

/// Moment of inertia about the centroidal axis parallel to `b`
///
/// ```text
///     ┌─────────┐
///     │         │
///   h │ ════════│ ← neutral axis at h/2
///     │         │
///     └─────────┘
///          b
/// ```
///
/// # Formula
/// I = b·h³/12
///
/// # Example
/// ```rust
/// use batical_core::equations::section::rectangular_moment_of_inertia;
///
/// let i = rectangular_moment_of_inertia(100.0, 200.0);
/// assert!((i - 66_666_666.7).abs() < 1.0);
/// ```
#[inline]
pub fn rectangular_moment_of_inertia(b: f64, h: f64) -> f64 {
    b * h.powi(3) / 12.0
}

/// Elastic section modulus
///
/// σ = M / W
///
/// # Formula
/// W = I/c = b·h²/6
#[inline]
pub fn rectangular_section_modulus(b: f64, h: f64) -> f64 {
    b * h.powi(2) / 6.0
}

/// Radius of gyration about the weak axis
///
/// # Formula
/// i = min(b, h) / √12
///
/// Buckling of a rectangular section always governs about the smaller
/// dimension, so this is the value used for slenderness λ = l₀ / i.
///
/// # Example
/// ```rust
/// use batical_core::equations::section::weak_axis_radius_of_gyration;
///
/// let i = weak_axis_radius_of_gyration(300.0, 400.0);
/// assert!((i - 86.60).abs() < 0.01);
/// ```
#[inline]
pub fn weak_axis_radius_of_gyration(b: f64, h: f64) -> f64 {
    b.min(h) / 12.0_f64.sqrt()
}

// =============================================================================
// SIMPLY-SUPPORTED SPAN UNDER UNIFORM LOAD
// =============================================================================

/// Maximum moment M = q·L²/8
#[inline]
pub fn uniform_load_moment(q: f64, span: f64) -> f64 {
    q * span.powi(2) / 8.0
}

/// Midspan deflection δ = 5·q·L⁴ / (384·E·I)
///
/// # Example
/// ```rust
/// use batical_core::equations::section::uniform_load_deflection;
///
/// // q = 2 N/mm, L = 4000 mm, E = 11000 MPa, I = 1e8 mm⁴
/// let delta = uniform_load_deflection(2.0, 4000.0, 11_000.0, 1.0e8);
/// assert!((delta - 6.06).abs() < 0.01);
/// ```
#[inline]
pub fn uniform_load_deflection(q: f64, span: f64, e: f64, i: f64) -> f64 {
    5.0 * q * span.powi(4) / (384.0 * e * i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_modulus_matches_inertia() {
        let (b, h) = (75.0, 225.0);
        let w = rectangular_section_modulus(b, h);
        let i = rectangular_moment_of_inertia(b, h);
        assert!((w - i / (h / 2.0)).abs() < 1e-6);
    }

    #[test]
    fn test_radius_of_gyration_uses_smaller_side() {
        assert_eq!(weak_axis_radius_of_gyration(200.0, 400.0), weak_axis_radius_of_gyration(400.0, 200.0));
        let i = rectangular_moment_of_inertia(400.0, 200.0);
        let a = rectangular_area(400.0, 200.0);
        assert!((weak_axis_radius_of_gyration(200.0, 400.0) - (i / a).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_moment() {
        // 10 kN/m over 5 m: 31.25 kN·m
        assert!((uniform_load_moment(10.0, 5.0) - 31.25).abs() < 1e-12);
    }
}
