//! Structural Timber Classes (EN 338 and EN 14080)
//!
//! Characteristic values for softwood strength classes C14 to C40 and
//! homogeneous glued laminated timber GL24h to GL32h.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::safety::SafetyFactors;

/// Timber strength class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TimberClass {
    C14,
    C16,
    C18,
    C20,
    C22,
    C24,
    C27,
    C30,
    C35,
    C40,
    #[serde(rename = "GL24h")]
    Gl24h,
    #[serde(rename = "GL28h")]
    Gl28h,
    #[serde(rename = "GL32h")]
    Gl32h,
}

impl TimberClass {
    /// All timber classes for UI selection
    pub const ALL: [TimberClass; 13] = [
        TimberClass::C14,
        TimberClass::C16,
        TimberClass::C18,
        TimberClass::C20,
        TimberClass::C22,
        TimberClass::C24,
        TimberClass::C27,
        TimberClass::C30,
        TimberClass::C35,
        TimberClass::C40,
        TimberClass::Gl24h,
        TimberClass::Gl28h,
        TimberClass::Gl32h,
    ];

    /// Get the class designation (e.g., "C24", "GL28h")
    pub fn code(&self) -> &'static str {
        match self {
            TimberClass::C14 => "C14",
            TimberClass::C16 => "C16",
            TimberClass::C18 => "C18",
            TimberClass::C20 => "C20",
            TimberClass::C22 => "C22",
            TimberClass::C24 => "C24",
            TimberClass::C27 => "C27",
            TimberClass::C30 => "C30",
            TimberClass::C35 => "C35",
            TimberClass::C40 => "C40",
            TimberClass::Gl24h => "GL24h",
            TimberClass::Gl28h => "GL28h",
            TimberClass::Gl32h => "GL32h",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-', '_'], "");
        TimberClass::ALL
            .iter()
            .copied()
            .find(|class| class.code().to_uppercase() == normalized)
            .ok_or_else(|| CalcError::material_not_found(s))
    }

    /// Glued laminated timber (GL classes)
    pub fn is_glulam(&self) -> bool {
        matches!(self, TimberClass::Gl24h | TimberClass::Gl28h | TimberClass::Gl32h)
    }

    /// Partial factor γM for this product family
    pub fn gamma_m(&self, factors: &SafetyFactors) -> f64 {
        if self.is_glulam() {
            factors.gamma_m_glulam
        } else {
            factors.gamma_m_solid_timber
        }
    }

    /// Straightness factor βc for buckling (EC5 6.29)
    pub fn beta_c(&self) -> f64 {
        if self.is_glulam() {
            0.1
        } else {
            0.2
        }
    }

    /// Characteristic values (MPa, kg/m³)
    pub fn properties(&self) -> TimberProperties {
        // (fm,k, ft,0,k, fc,0,k, fv,k, E0,mean, E0,05, ρk)
        let (fm, ft0, fc0, fv, e_mean, e_05, rho) = match self {
            TimberClass::C14 => (14.0, 8.0, 16.0, 3.0, 7_000.0, 4_700.0, 290.0),
            TimberClass::C16 => (16.0, 10.0, 17.0, 3.2, 8_000.0, 5_400.0, 310.0),
            TimberClass::C18 => (18.0, 11.0, 18.0, 3.4, 9_000.0, 6_000.0, 320.0),
            TimberClass::C20 => (20.0, 12.0, 19.0, 3.6, 9_500.0, 6_400.0, 330.0),
            TimberClass::C22 => (22.0, 13.0, 20.0, 3.8, 10_000.0, 6_700.0, 340.0),
            TimberClass::C24 => (24.0, 14.0, 21.0, 4.0, 11_000.0, 7_400.0, 350.0),
            TimberClass::C27 => (27.0, 16.0, 22.0, 4.0, 11_500.0, 7_700.0, 370.0),
            TimberClass::C30 => (30.0, 18.0, 23.0, 4.0, 12_000.0, 8_000.0, 380.0),
            TimberClass::C35 => (35.0, 21.0, 25.0, 4.0, 13_000.0, 8_700.0, 400.0),
            TimberClass::C40 => (40.0, 24.0, 26.0, 4.0, 14_000.0, 9_400.0, 420.0),
            TimberClass::Gl24h => (24.0, 19.2, 24.0, 3.5, 11_500.0, 9_600.0, 385.0),
            TimberClass::Gl28h => (28.0, 22.3, 28.0, 3.5, 12_600.0, 10_500.0, 425.0),
            TimberClass::Gl32h => (32.0, 25.6, 32.0, 3.5, 14_200.0, 11_800.0, 440.0),
        };
        TimberProperties {
            class: *self,
            fm_k_mpa: fm,
            ft0_k_mpa: ft0,
            fc0_k_mpa: fc0,
            fv_k_mpa: fv,
            e0_mean_mpa: e_mean,
            e0_05_mpa: e_05,
            density_kg_m3: rho,
        }
    }
}

impl TryFrom<String> for TimberClass {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str_flexible(&value)
    }
}

impl std::fmt::Display for TimberClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Characteristic values of a timber class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimberProperties {
    pub class: TimberClass,
    /// Bending strength f_m,k (MPa)
    pub fm_k_mpa: f64,
    /// Tension parallel to grain f_t,0,k (MPa)
    pub ft0_k_mpa: f64,
    /// Compression parallel to grain f_c,0,k (MPa)
    pub fc0_k_mpa: f64,
    /// Shear strength f_v,k (MPa)
    pub fv_k_mpa: f64,
    /// Mean modulus of elasticity E_0,mean (MPa)
    pub e0_mean_mpa: f64,
    /// 5 % modulus of elasticity E_0,05 (MPa)
    pub e0_05_mpa: f64,
    /// Characteristic density ρ_k (kg/m³)
    pub density_kg_m3: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c24_properties() {
        let props = TimberClass::C24.properties();
        assert_eq!(props.fm_k_mpa, 24.0);
        assert_eq!(props.e0_mean_mpa, 11_000.0);
    }

    #[test]
    fn test_parsing() {
        assert_eq!(TimberClass::from_str_flexible("c24").unwrap(), TimberClass::C24);
        assert_eq!(TimberClass::from_str_flexible("GL 28h").unwrap(), TimberClass::Gl28h);
        assert!(TimberClass::from_str_flexible("D70").is_err());
    }

    #[test]
    fn test_glulam_factors() {
        let factors = SafetyFactors::default();
        assert_eq!(TimberClass::Gl24h.gamma_m(&factors), 1.25);
        assert_eq!(TimberClass::C24.gamma_m(&factors), 1.3);
        assert_eq!(TimberClass::Gl24h.beta_c(), 0.1);
    }

    #[test]
    fn test_lookup_is_total() {
        for class in TimberClass::ALL {
            let props = class.properties();
            assert!(props.e0_05_mpa < props.e0_mean_mpa);
            assert_eq!(TimberClass::from_str_flexible(class.code()).unwrap(), class);
        }
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&TimberClass::Gl32h).unwrap();
        assert_eq!(json, "\"GL32h\"");
        let parsed: TimberClass = serde_json::from_str("\"C30\"").unwrap();
        assert_eq!(parsed, TimberClass::C30);
    }
}
