//! Concrete Strength Classes (EN 1992-1-1 Table 3.1)
//!
//! Characteristic cylinder strengths and the derived mean tensile strength
//! and secant modulus used by the reinforced concrete calculators.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Concrete strength class per EC2 (cylinder/cube strength in MPa)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ConcreteClass {
    #[serde(rename = "C20/25")]
    C20_25,
    #[serde(rename = "C25/30")]
    C25_30,
    #[serde(rename = "C30/37")]
    C30_37,
    #[serde(rename = "C35/45")]
    C35_45,
    #[serde(rename = "C40/50")]
    C40_50,
    #[serde(rename = "C45/55")]
    C45_55,
    #[serde(rename = "C50/60")]
    C50_60,
}

impl ConcreteClass {
    /// All concrete classes for UI selection
    pub const ALL: [ConcreteClass; 7] = [
        ConcreteClass::C20_25,
        ConcreteClass::C25_30,
        ConcreteClass::C30_37,
        ConcreteClass::C35_45,
        ConcreteClass::C40_50,
        ConcreteClass::C45_55,
        ConcreteClass::C50_60,
    ];

    /// Get the class designation (e.g., "C25/30")
    pub fn code(&self) -> &'static str {
        match self {
            ConcreteClass::C20_25 => "C20/25",
            ConcreteClass::C25_30 => "C25/30",
            ConcreteClass::C30_37 => "C30/37",
            ConcreteClass::C35_45 => "C35/45",
            ConcreteClass::C40_50 => "C40/50",
            ConcreteClass::C45_55 => "C45/55",
            ConcreteClass::C50_60 => "C50/60",
        }
    }

    /// Parse from common string representations ("C25/30", "c25-30", "C25")
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_uppercase().replace(['-', '_', ' '], "/").as_str() {
            "C20/25" | "C20" => Ok(ConcreteClass::C20_25),
            "C25/30" | "C25" => Ok(ConcreteClass::C25_30),
            "C30/37" | "C30" => Ok(ConcreteClass::C30_37),
            "C35/45" | "C35" => Ok(ConcreteClass::C35_45),
            "C40/50" | "C40" => Ok(ConcreteClass::C40_50),
            "C45/55" | "C45" => Ok(ConcreteClass::C45_55),
            "C50/60" | "C50" => Ok(ConcreteClass::C50_60),
            _ => Err(CalcError::material_not_found(s)),
        }
    }

    /// Characteristic compressive cylinder strength f_ck (MPa)
    pub fn fck_mpa(&self) -> f64 {
        match self {
            ConcreteClass::C20_25 => 20.0,
            ConcreteClass::C25_30 => 25.0,
            ConcreteClass::C30_37 => 30.0,
            ConcreteClass::C35_45 => 35.0,
            ConcreteClass::C40_50 => 40.0,
            ConcreteClass::C45_55 => 45.0,
            ConcreteClass::C50_60 => 50.0,
        }
    }

    /// Get the full property set for this class
    pub fn properties(&self) -> ConcreteProperties {
        let fck = self.fck_mpa();
        let fcm = fck + 8.0;
        ConcreteProperties {
            class: *self,
            fck_mpa: fck,
            fcm_mpa: fcm,
            fctm_mpa: 0.30 * fck.powf(2.0 / 3.0),
            ecm_mpa: 22_000.0 * (fcm / 10.0).powf(0.3),
        }
    }
}

impl TryFrom<String> for ConcreteClass {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str_flexible(&value)
    }
}

impl std::fmt::Display for ConcreteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Mechanical properties of a concrete class (MPa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteProperties {
    pub class: ConcreteClass,
    /// Characteristic compressive strength f_ck
    pub fck_mpa: f64,
    /// Mean compressive strength f_cm = f_ck + 8
    pub fcm_mpa: f64,
    /// Mean axial tensile strength f_ctm = 0.30·f_ck^(2/3)
    pub fctm_mpa: f64,
    /// Secant modulus E_cm = 22·(f_cm/10)^0.3 GPa
    pub ecm_mpa: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c25_properties() {
        let props = ConcreteClass::C25_30.properties();
        assert_eq!(props.fck_mpa, 25.0);
        // EC2 Table 3.1: fctm = 2.6 MPa, Ecm = 31 GPa
        assert!((props.fctm_mpa - 2.565).abs() < 0.01);
        assert!((props.ecm_mpa - 31_476.0).abs() < 10.0);
    }

    #[test]
    fn test_parsing() {
        assert_eq!(ConcreteClass::from_str_flexible("C25/30").unwrap(), ConcreteClass::C25_30);
        assert_eq!(ConcreteClass::from_str_flexible("c30-37").unwrap(), ConcreteClass::C30_37);
        assert_eq!(ConcreteClass::from_str_flexible("C40").unwrap(), ConcreteClass::C40_50);
    }

    #[test]
    fn test_unknown_class_is_reported() {
        let err = ConcreteClass::from_str_flexible("C99/110").unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");
    }

    #[test]
    fn test_lookup_is_total() {
        for class in ConcreteClass::ALL {
            assert_eq!(ConcreteClass::from_str_flexible(class.code()).unwrap(), class);
            assert!(class.properties().fctm_mpa > 0.0);
        }
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ConcreteClass::C25_30).unwrap();
        assert_eq!(json, "\"C25/30\"");
        let parsed: ConcreteClass = serde_json::from_str("\"C35/45\"").unwrap();
        assert_eq!(parsed, ConcreteClass::C35_45);
        assert!(serde_json::from_str::<ConcreteClass>("\"C12/15\"").is_err());
    }
}
