//! Soil Bearing Classes
//!
//! Presumed design bearing resistances at ULS for preliminary pad footing
//! sizing. Site-specific geotechnical values should be entered directly
//! through `bearing_capacity_mpa` on the foundation input.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Soil class for presumed bearing resistance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SoilClass {
    SoftClay,
    FirmClay,
    StiffClay,
    LooseSand,
    DenseSand,
    Gravel,
    WeatheredRock,
    SoundRock,
}

impl SoilClass {
    /// All soil classes for UI selection
    pub const ALL: [SoilClass; 8] = [
        SoilClass::SoftClay,
        SoilClass::FirmClay,
        SoilClass::StiffClay,
        SoilClass::LooseSand,
        SoilClass::DenseSand,
        SoilClass::Gravel,
        SoilClass::WeatheredRock,
        SoilClass::SoundRock,
    ];

    /// Design bearing resistance q (MPa)
    pub fn bearing_capacity_mpa(&self) -> f64 {
        match self {
            SoilClass::SoftClay => 0.10,
            SoilClass::FirmClay => 0.20,
            SoilClass::StiffClay => 0.30,
            SoilClass::LooseSand => 0.15,
            SoilClass::DenseSand => 0.35,
            SoilClass::Gravel => 0.45,
            SoilClass::WeatheredRock => 0.80,
            SoilClass::SoundRock => 2.00,
        }
    }

    /// Snake_case identifier used in JSON
    pub fn identifier(&self) -> &'static str {
        match self {
            SoilClass::SoftClay => "soft_clay",
            SoilClass::FirmClay => "firm_clay",
            SoilClass::StiffClay => "stiff_clay",
            SoilClass::LooseSand => "loose_sand",
            SoilClass::DenseSand => "dense_sand",
            SoilClass::Gravel => "gravel",
            SoilClass::WeatheredRock => "weathered_rock",
            SoilClass::SoundRock => "sound_rock",
        }
    }

    /// Parse from the identifier, ignoring case and accepting spaces or hyphens
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|soil| soil.identifier() == normalized)
            .ok_or_else(|| CalcError::material_not_found(s))
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SoilClass::SoftClay => "Soft clay",
            SoilClass::FirmClay => "Firm clay",
            SoilClass::StiffClay => "Stiff clay",
            SoilClass::LooseSand => "Loose sand",
            SoilClass::DenseSand => "Dense sand",
            SoilClass::Gravel => "Gravel",
            SoilClass::WeatheredRock => "Weathered rock",
            SoilClass::SoundRock => "Sound rock",
        }
    }
}

impl TryFrom<String> for SoilClass {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str_flexible(&value)
    }
}

impl std::fmt::Display for SoilClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
