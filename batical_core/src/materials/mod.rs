//! # Materials Database
//!
//! Material classes and characteristic property lookups.
//!
//! ## Material Families
//!
//! - **Concrete**: strength classes C20/25 to C50/60 (EC2 Table 3.1)
//! - **Reinforcing steel**: S400 and S500 high-bond bars
//! - **Timber**: solid softwood C14 to C40 and glulam GL24h to GL32h
//! - **Soil**: presumed bearing classes for pad footings
//!
//! Every family is a closed enumeration, so a property lookup on a parsed
//! class can never fail. Parsing a name is where unknown classes are
//! rejected with [`CalcError::MaterialNotFound`].
//!
//! ## Example
//!
//! ```rust
//! use batical_core::materials::{MaterialSpec, MaterialFamily};
//!
//! let concrete = MaterialSpec::lookup(MaterialFamily::Concrete, "C25/30").unwrap();
//! assert_eq!(concrete.display_name(), "Concrete C25/30");
//!
//! assert!(MaterialSpec::lookup(MaterialFamily::Timber, "C99").is_err());
//! ```

pub mod concrete;
pub mod soil;
pub mod steel;
pub mod timber;

pub use concrete::{ConcreteClass, ConcreteProperties};
pub use soil::SoilClass;
pub use steel::{bar_area_mm2, diameters_between, SteelGrade, STANDARD_BAR_DIAMETERS_MM, STEEL_MODULUS_MPA};
pub use timber::{TimberClass, TimberProperties};

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Material family used to route a name lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialFamily {
    Concrete,
    Steel,
    Timber,
    Soil,
}

impl MaterialFamily {
    /// All families
    pub const ALL: [MaterialFamily; 4] = [
        MaterialFamily::Concrete,
        MaterialFamily::Steel,
        MaterialFamily::Timber,
        MaterialFamily::Soil,
    ];

    /// Parse a family name
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "concrete" | "beton" => Ok(MaterialFamily::Concrete),
            "steel" | "rebar" | "acier" => Ok(MaterialFamily::Steel),
            "timber" | "wood" | "bois" => Ok(MaterialFamily::Timber),
            "soil" | "sol" => Ok(MaterialFamily::Soil),
            _ => Err(CalcError::unknown_key("material_families", s)),
        }
    }

    /// Input field that carries a class of this family
    pub fn field_name(&self) -> &'static str {
        match self {
            MaterialFamily::Concrete => "concrete",
            MaterialFamily::Steel => "steel",
            MaterialFamily::Timber => "timber",
            MaterialFamily::Soil => "soil",
        }
    }

    /// Names of every class in this family
    pub fn class_names(&self) -> Vec<String> {
        match self {
            MaterialFamily::Concrete => ConcreteClass::ALL.iter().map(|c| c.code().to_string()).collect(),
            MaterialFamily::Steel => SteelGrade::ALL.iter().map(|s| s.code().to_string()).collect(),
            MaterialFamily::Timber => TimberClass::ALL.iter().map(|t| t.code().to_string()).collect(),
            MaterialFamily::Soil => SoilClass::ALL.iter().map(|s| s.identifier().to_string()).collect(),
        }
    }
}

/// A named material class from any family
///
/// ## JSON Serialization
///
/// ```json
/// { "family": "Concrete", "class": "C25/30" }
/// { "family": "Timber", "class": "GL24h" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", content = "class")]
pub enum MaterialSpec {
    Concrete(ConcreteClass),
    Steel(SteelGrade),
    Timber(TimberClass),
    Soil(SoilClass),
}

impl MaterialSpec {
    /// Look up a material class by family and name.
    pub fn lookup(family: MaterialFamily, name: &str) -> CalcResult<Self> {
        Ok(match family {
            MaterialFamily::Concrete => MaterialSpec::Concrete(ConcreteClass::from_str_flexible(name)?),
            MaterialFamily::Steel => MaterialSpec::Steel(SteelGrade::from_str_flexible(name)?),
            MaterialFamily::Timber => MaterialSpec::Timber(TimberClass::from_str_flexible(name)?),
            MaterialFamily::Soil => MaterialSpec::Soil(SoilClass::from_str_flexible(name)?),
        })
    }

    /// Get display name for this material
    pub fn display_name(&self) -> String {
        match self {
            MaterialSpec::Concrete(c) => format!("Concrete {}", c.code()),
            MaterialSpec::Steel(s) => format!("Reinforcing steel {}", s.code()),
            MaterialSpec::Timber(t) if t.is_glulam() => format!("Glulam {}", t.code()),
            MaterialSpec::Timber(t) => format!("Solid timber {}", t.code()),
            MaterialSpec::Soil(s) => format!("Soil: {}", s.display_name()),
        }
    }

    /// Characteristic strength governing the class (MPa)
    ///
    /// f_ck for concrete, f_yk for steel, f_m,k for timber and the design
    /// bearing resistance for soil.
    pub fn characteristic_strength_mpa(&self) -> f64 {
        match self {
            MaterialSpec::Concrete(c) => c.fck_mpa(),
            MaterialSpec::Steel(s) => s.fyk_mpa(),
            MaterialSpec::Timber(t) => t.properties().fm_k_mpa,
            MaterialSpec::Soil(s) => s.bearing_capacity_mpa(),
        }
    }
}

impl std::fmt::Display for MaterialSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
