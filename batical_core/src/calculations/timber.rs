//! # Timber Member (EC5)
//!
//! Rectangular solid or glulam member under bending, shear and axial
//! compression, with optional deflection check.
//!
//! ## Checks
//!
//! | Check      | Ratio                                   | Reference     |
//! |------------|-----------------------------------------|---------------|
//! | Bending    | σm,d / fm,d                             | EC5 6.1.6     |
//! | Shear      | τd / fv,d, with kcr = 0.67               | EC5 6.1.7     |
//! | Combined   | σc,0,d/(kc·fc,0,d) + σm,d/fm,d          | EC5 6.3.2     |
//! | Deflection | w_fin / (L/300)                         | EC5 7.2       |
//!
//! Buckling is checked about the weak axis of the section.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::equations::section::{
    rectangular_area, rectangular_moment_of_inertia, rectangular_section_modulus, uniform_load_deflection,
    weak_axis_radius_of_gyration,
};
use crate::errors::{ensure_non_negative, ensure_positive, CalcResult};
use crate::loads::LoadSpec;
use crate::materials::TimberClass;
use crate::safety::{design_value, LoadDurationClass, SafetyFactors, ServiceClass};
use crate::units::{to_millimeters, KiloNewtonMeters, KiloNewtons, Meters};
use crate::verdict::{DesignWarning, FailureReason, Verdict};

/// Crack factor for shear (EC5 6.1.7(2))
pub const CRACK_FACTOR: f64 = 0.67;

/// Deflection limit L / 300
pub const DEFLECTION_LIMIT_RATIO: f64 = 300.0;

/// Relative slenderness below which buckling is ignored
const BUCKLING_THRESHOLD: f64 = 0.3;

fn default_buckling_factor() -> f64 {
    1.0
}

/// Input parameters for a timber member.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Floor joist",
///   "width_mm": 75.0,
///   "height_mm": 225.0,
///   "length_m": 4.0,
///   "timber": "C24",
///   "service_class": "1",
///   "load_duration": "MediumTerm",
///   "moment_knm": 8.0,
///   "shear_kn": 8.0,
///   "service_load_kn_m": 1.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimberInput {
    #[serde(default)]
    pub label: String,

    /// Section width b (mm)
    pub width_mm: f64,

    /// Section height h, in the bending plane (mm)
    pub height_mm: f64,

    /// Member length L (m)
    pub length_m: f64,

    pub timber: TimberClass,

    #[serde(default)]
    pub service_class: ServiceClass,

    #[serde(default)]
    pub load_duration: LoadDurationClass,

    /// Buckling length coefficient (l_ef = k·L)
    #[serde(default = "default_buckling_factor")]
    pub buckling_factor: f64,

    /// Design moment M_d (kN·m)
    #[serde(default)]
    pub moment_knm: f64,

    /// Design shear V_d (kN)
    #[serde(default)]
    pub shear_kn: f64,

    /// Design axial compression N_d (kN)
    #[serde(default)]
    pub axial_kn: f64,

    /// Characteristic uniform load for the deflection check (kN/m)
    #[serde(default)]
    pub service_load_kn_m: Option<f64>,
}

impl TimberInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("width_mm", self.width_mm)?;
        ensure_positive("height_mm", self.height_mm)?;
        ensure_positive("length_m", self.length_m)?;
        ensure_positive("buckling_factor", self.buckling_factor)?;
        ensure_non_negative("axial_kn", self.axial_kn)?;
        if let Some(q) = self.service_load_kn_m {
            ensure_non_negative("service_load_kn_m", q)?;
        }
        self.design_forces().validate()
    }

    pub fn length_mm(&self) -> f64 {
        to_millimeters(Meters(self.length_m)).value()
    }

    pub fn design_forces(&self) -> LoadSpec {
        LoadSpec::ultimate(self.axial_kn, self.moment_knm, self.shear_kn)
    }
}

/// Depth factor kh on bending strength (EC5 3.2(3), 3.3(3))
pub fn depth_factor(timber: TimberClass, height_mm: f64) -> f64 {
    if timber.is_glulam() {
        if height_mm < 600.0 {
            (600.0 / height_mm).powf(0.1).min(1.1)
        } else {
            1.0
        }
    } else if height_mm < 150.0 {
        (150.0 / height_mm).powf(0.2).min(1.3)
    } else {
        1.0
    }
}

/// Instability factor kc for a relative slenderness (EC5 6.25-6.27)
pub fn instability_factor(relative_slenderness: f64, beta_c: f64) -> f64 {
    if relative_slenderness <= BUCKLING_THRESHOLD {
        return 1.0;
    }
    let k = 0.5 * (1.0 + beta_c * (relative_slenderness - BUCKLING_THRESHOLD) + relative_slenderness.powi(2));
    1.0 / (k + (k.powi(2) - relative_slenderness.powi(2)).sqrt())
}

/// Individual verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimberCheck {
    Bending,
    Shear,
    Combined,
    Deflection,
}

impl fmt::Display for TimberCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimberCheck::Bending => "Bending",
            TimberCheck::Shear => "Shear",
            TimberCheck::Combined => "Combined compression and bending",
            TimberCheck::Deflection => "Deflection",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckRatio {
    pub check: TimberCheck,
    pub ratio: f64,
}

/// Serviceability deflection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeflectionCheck {
    /// Instantaneous deflection (mm)
    pub w_inst_mm: f64,
    /// Final deflection w_inst·(1 + kdef) (mm)
    pub w_fin_mm: f64,
    /// L/300 (mm)
    pub limit_mm: f64,
}

/// Results from the timber member check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimberResult {
    pub kmod: f64,
    pub gamma_m: f64,
    pub kh: f64,
    pub kdef: f64,

    /// fm,d (MPa)
    pub fm_d_mpa: f64,
    /// fv,d (MPa)
    pub fv_d_mpa: f64,
    /// fc,0,d (MPa)
    pub fc0_d_mpa: f64,

    /// σm,d (MPa)
    pub bending_stress_mpa: f64,
    /// τd (MPa)
    pub shear_stress_mpa: f64,
    /// σc,0,d (MPa)
    pub compression_stress_mpa: f64,

    /// λ about the weak axis
    pub slenderness: f64,
    /// λrel
    pub relative_slenderness: f64,
    /// kc
    pub instability_factor: f64,

    pub deflection: Option<DeflectionCheck>,

    pub checks: Vec<CheckRatio>,
    pub governing_check: TimberCheck,
    /// Largest check ratio
    pub utilization: f64,

    pub design_forces: LoadSpec,
    pub verdict: Verdict,
    pub warnings: Vec<DesignWarning>,
}

impl TimberResult {
    pub fn passes(&self) -> bool {
        self.verdict.is_adequate()
    }

    pub fn ratio(&self, check: TimberCheck) -> Option<f64> {
        self.checks.iter().find(|c| c.check == check).map(|c| c.ratio)
    }
}

/// Check a timber member.
pub fn calculate(input: &TimberInput, factors: &SafetyFactors) -> CalcResult<TimberResult> {
    input.validate()?;
    factors.validate()?;

    let props = input.timber.properties();
    let kmod = input.service_class.kmod(input.load_duration);
    let gamma_m = input.timber.gamma_m(factors);
    let kdef = input.service_class.kdef();
    let kh = depth_factor(input.timber, input.height_mm);

    let fm_d = kh * design_value(props.fm_k_mpa, kmod, gamma_m);
    let fv_d = design_value(props.fv_k_mpa, kmod, gamma_m);
    let fc0_d = design_value(props.fc0_k_mpa, kmod, gamma_m);

    let (b, h) = (input.width_mm, input.height_mm);
    let area = rectangular_area(b, h);

    let sigma_m = KiloNewtonMeters(input.moment_knm).to_newton_mm().abs() / rectangular_section_modulus(b, h);
    let tau = 1.5 * KiloNewtons(input.shear_kn).to_newtons().abs() / (CRACK_FACTOR * area);
    let sigma_c = KiloNewtons(input.axial_kn).to_newtons() / area;

    let l_ef = input.buckling_factor * input.length_mm();
    let slenderness = l_ef / weak_axis_radius_of_gyration(b, h);
    let relative_slenderness = slenderness / PI * (props.fc0_k_mpa / props.e0_05_mpa).sqrt();
    let kc = instability_factor(relative_slenderness, input.timber.beta_c());

    let mut checks = vec![
        CheckRatio {
            check: TimberCheck::Bending,
            ratio: sigma_m / fm_d,
        },
        CheckRatio {
            check: TimberCheck::Shear,
            ratio: tau / fv_d,
        },
        CheckRatio {
            check: TimberCheck::Combined,
            ratio: sigma_c / (kc * fc0_d) + sigma_m / fm_d,
        },
    ];

    let deflection = input.service_load_kn_m.map(|q| {
        let span = input.length_mm();
        // kN/m == N/mm
        let w_inst = uniform_load_deflection(q, span, props.e0_mean_mpa, rectangular_moment_of_inertia(b, h));
        DeflectionCheck {
            w_inst_mm: w_inst,
            w_fin_mm: w_inst * (1.0 + kdef),
            limit_mm: span / DEFLECTION_LIMIT_RATIO,
        }
    });
    if let Some(w) = deflection {
        checks.push(CheckRatio {
            check: TimberCheck::Deflection,
            ratio: w.w_fin_mm / w.limit_mm,
        });
    }

    let governing = checks
        .iter()
        .copied()
        .fold(checks[0], |best, c| if c.ratio > best.ratio { c } else { best });

    let verdict = if governing.ratio > 1.0 {
        Verdict::inadequate(FailureReason::UtilizationExceeded, governing.ratio)
    } else {
        Verdict::Adequate
    };

    let mut warnings = Vec::new();
    if input.axial_kn > 0.0 && relative_slenderness > BUCKLING_THRESHOLD {
        warnings.push(DesignWarning::BucklingSignificant);
    }

    tracing::debug!(
        label = %input.label,
        timber = %input.timber,
        kmod,
        kh,
        sigma_m,
        tau,
        sigma_c,
        relative_slenderness,
        kc,
        governing = %governing.check,
        "Timber member check"
    );
    if !verdict.is_adequate() {
        tracing::warn!(label = %input.label, %verdict, "Timber member inadequate");
    }

    Ok(TimberResult {
        kmod,
        gamma_m,
        kh,
        kdef,
        fm_d_mpa: fm_d,
        fv_d_mpa: fv_d,
        fc0_d_mpa: fc0_d,
        bending_stress_mpa: sigma_m,
        shear_stress_mpa: tau,
        compression_stress_mpa: sigma_c,
        slenderness,
        relative_slenderness,
        instability_factor: kc,
        deflection,
        checks,
        governing_check: governing.check,
        utilization: governing.ratio.min(1.0),
        design_forces: input.design_forces(),
        verdict,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_joist() -> TimberInput {
        TimberInput {
            label: "J-1".to_string(),
            width_mm: 75.0,
            height_mm: 225.0,
            length_m: 4.0,
            timber: TimberClass::C24,
            service_class: ServiceClass::Class1,
            load_duration: LoadDurationClass::MediumTerm,
            buckling_factor: 1.0,
            moment_knm: 8.0,
            shear_kn: 8.0,
            axial_kn: 0.0,
            service_load_kn_m: Some(1.5),
        }
    }

    fn test_post() -> TimberInput {
        TimberInput {
            label: "P-1".to_string(),
            width_mm: 100.0,
            height_mm: 100.0,
            length_m: 3.0,
            moment_knm: 0.0,
            shear_kn: 0.0,
            axial_kn: 30.0,
            service_load_kn_m: None,
            ..test_joist()
        }
    }

    #[test]
    fn test_joist_in_bending() {
        let result = calculate(&test_joist(), &SafetyFactors::default()).unwrap();

        assert_eq!(result.kmod, 0.8);
        assert_eq!(result.gamma_m, 1.3);
        assert_eq!(result.kh, 1.0);
        // W = 632 812.5 mm³
        assert!((result.bending_stress_mpa - 12.642).abs() < 0.01);
        assert!((result.fm_d_mpa - 14.769).abs() < 0.01);
        assert_eq!(result.governing_check, TimberCheck::Bending);
        assert!((result.utilization - 0.856).abs() < 0.005);
        assert!(result.passes());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_deflection() {
        let result = calculate(&test_joist(), &SafetyFactors::default()).unwrap();
        let w = result.deflection.unwrap();
        assert!((w.limit_mm - 13.333).abs() < 0.01);
        assert!((w.w_fin_mm - w.w_inst_mm * 1.6).abs() < 1e-9);
        assert!(w.w_fin_mm < w.limit_mm);

        let mut heavy = test_joist();
        heavy.service_load_kn_m = Some(3.0);
        let result = calculate(&heavy, &SafetyFactors::default()).unwrap();
        assert_eq!(result.governing_check, TimberCheck::Deflection);
        assert_eq!(result.verdict.failure(), Some(FailureReason::UtilizationExceeded));
    }

    #[test]
    fn test_no_deflection_without_service_load() {
        let mut joist = test_joist();
        joist.service_load_kn_m = None;
        let result = calculate(&joist, &SafetyFactors::default()).unwrap();
        assert!(result.deflection.is_none());
        assert!(result.ratio(TimberCheck::Deflection).is_none());
    }

    #[test]
    fn test_post_buckling() {
        let result = calculate(&test_post(), &SafetyFactors::default()).unwrap();
        assert!((result.relative_slenderness - 1.762).abs() < 0.01);
        assert!((result.instability_factor - 0.285).abs() < 0.005);
        assert!(result.warnings.contains(&DesignWarning::BucklingSignificant));
        assert_eq!(result.governing_check, TimberCheck::Combined);
        assert!(result.passes());
    }

    #[test]
    fn test_overloaded_beam() {
        let mut joist = test_joist();
        joist.moment_knm = 12.0;
        let result = calculate(&joist, &SafetyFactors::default()).unwrap();
        assert!(!result.passes());
        assert!(matches!(
            result.verdict,
            Verdict::Inadequate {
                failure: FailureReason::UtilizationExceeded,
                ratio
            } if ratio > 1.0
        ));
    }

    #[test]
    fn test_utilization_is_capped() {
        let mut joist = test_joist();
        joist.moment_knm = 30.0;
        let result = calculate(&joist, &SafetyFactors::default()).unwrap();

        assert_eq!(result.utilization, 1.0);
        let bending = result.ratio(TimberCheck::Bending).unwrap();
        assert!(bending > 3.0);
        assert_eq!(
            result.verdict,
            Verdict::inadequate(FailureReason::UtilizationExceeded, bending)
        );
    }

    #[test]
    fn test_depth_factor() {
        assert_eq!(depth_factor(TimberClass::C24, 200.0), 1.0);
        assert!((depth_factor(TimberClass::C24, 100.0) - 1.0845).abs() < 0.001);
        assert_eq!(depth_factor(TimberClass::C24, 20.0), 1.3);
        assert!((depth_factor(TimberClass::Gl24h, 300.0) - 1.0718).abs() < 0.001);
    }

    #[test]
    fn test_instability_factor() {
        assert_eq!(instability_factor(0.2, 0.2), 1.0);
        assert!(instability_factor(1.0, 0.1) > instability_factor(1.0, 0.2));
        assert!(instability_factor(2.0, 0.2) < instability_factor(1.0, 0.2));
    }

    #[test]
    fn test_service_class_reduces_strength() {
        let mut wet = test_joist();
        wet.service_class = ServiceClass::Class3;
        let dry = calculate(&test_joist(), &SafetyFactors::default()).unwrap();
        let wet = calculate(&wet, &SafetyFactors::default()).unwrap();
        assert!(wet.fm_d_mpa < dry.fm_d_mpa);
        assert!(wet.utilization > dry.utilization);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut tension = test_joist();
        tension.axial_kn = -5.0;
        assert!(calculate(&tension, &SafetyFactors::default()).is_err());

        let mut flat = test_joist();
        flat.height_mm = 0.0;
        assert!(calculate(&flat, &SafetyFactors::default()).is_err());
    }

    #[test]
    fn test_json_input() {
        let json = r#"{
            "width_mm": 75.0,
            "height_mm": 225.0,
            "length_m": 4.0,
            "timber": "C24",
            "service_class": "2",
            "moment_knm": 5.0
        }"#;
        let input: TimberInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.service_class, ServiceClass::Class2);
        assert_eq!(input.buckling_factor, 1.0);
        assert!(calculate(&input, &SafetyFactors::default()).is_ok());
    }
}
