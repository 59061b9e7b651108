//! # Wall Sound Insulation Estimate
//!
//! Additive estimate of the weighted sound reduction index Rw of a wall
//! assembly:
//!
//! ```text
//! Rw = base(material) + per_cm(material)·t
//!    + insulation.base + insulation.per_cm·t_ins     (skipped for "none" or t_ins = 0)
//!    + finish bonus
//! ```
//!
//! The coefficients come from the `acoustic` reference tables. This is a
//! preliminary estimate, not a laboratory or in-situ Rw.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_non_negative, ensure_positive, CalcResult};
use crate::tables::{ClassificationBand, ReferenceTables};

/// Insulation / finish key meaning "no layer"
pub const NO_LAYER: &str = "none";

fn no_layer() -> String {
    NO_LAYER.to_string()
}

/// Qualitative performance tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AcousticTier {
    Low,
    Standard,
    Performant,
    VeryPerformant,
}

impl AcousticTier {
    /// Lower bounds inclusive: ≥ 55 VeryPerformant, ≥ 45 Performant, ≥ 35 Standard
    pub fn band() -> CalcResult<ClassificationBand<AcousticTier>> {
        ClassificationBand::below(
            vec![
                (35.0, AcousticTier::Low),
                (45.0, AcousticTier::Standard),
                (55.0, AcousticTier::Performant),
            ],
            AcousticTier::VeryPerformant,
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AcousticTier::Low => "Low",
            AcousticTier::Standard => "Standard",
            AcousticTier::Performant => "Performant",
            AcousticTier::VeryPerformant => "Very performant",
        }
    }
}

impl fmt::Display for AcousticTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Wall assembly.
///
/// ## JSON Example
///
/// ```json
/// {
///   "material": "hollow_brick",
///   "thickness_cm": 20.0,
///   "insulation": "glass_wool",
///   "insulation_thickness_cm": 10.0,
///   "finish": "plasterboard"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcousticWallInput {
    #[serde(default)]
    pub label: String,

    /// Key into `wall_materials`
    pub material: String,

    /// Principal layer thickness (cm)
    pub thickness_cm: f64,

    /// Key into `insulations`
    #[serde(default = "no_layer")]
    pub insulation: String,

    #[serde(default)]
    pub insulation_thickness_cm: f64,

    /// Key into `finishes`
    #[serde(default = "no_layer")]
    pub finish: String,
}

impl AcousticWallInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("thickness_cm", self.thickness_cm)?;
        ensure_non_negative("insulation_thickness_cm", self.insulation_thickness_cm)
    }

    fn has_insulation(&self) -> bool {
        self.insulation != NO_LAYER && self.insulation_thickness_cm > 0.0
    }
}

/// Rw breakdown and tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcousticWallResult {
    /// Display name of the principal material
    pub material_label: String,
    /// Principal layer contribution (dB)
    pub material_db: f64,
    /// Insulation contribution (dB)
    pub insulation_db: f64,
    /// Finish bonus (dB)
    pub finish_db: f64,
    /// Estimated Rw (dB)
    pub rw_db: f64,
    pub tier: AcousticTier,
}

/// Estimate the sound reduction index of a wall.
pub fn calculate(input: &AcousticWallInput, tables: &ReferenceTables) -> CalcResult<AcousticWallResult> {
    input.validate()?;
    let acoustic = &tables.acoustic;

    let material = acoustic.wall_materials.get("wall_materials", &input.material)?;
    let insulation = acoustic.insulations.get("insulations", &input.insulation)?;
    let finish_db = acoustic.finishes.coefficient("finishes", &input.finish)?;

    let material_db = material.base_db + material.db_per_cm * input.thickness_cm;
    let insulation_db = if input.has_insulation() {
        insulation.base_db + insulation.db_per_cm * input.insulation_thickness_cm
    } else {
        0.0
    };

    let rw_db = material_db + insulation_db + finish_db;
    let tier = AcousticTier::band()?.classify(rw_db);

    tracing::debug!(
        label = %input.label,
        material = %input.material,
        material_db,
        insulation_db,
        finish_db,
        rw_db,
        %tier,
        "Wall transmission loss"
    );

    Ok(AcousticWallResult {
        material_label: material.label.clone(),
        material_db,
        insulation_db,
        finish_db,
        rw_db,
        tier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::reference_tables;

    fn wall(material: &str, thickness_cm: f64) -> AcousticWallInput {
        AcousticWallInput {
            label: String::new(),
            material: material.to_string(),
            thickness_cm,
            insulation: NO_LAYER.to_string(),
            insulation_thickness_cm: 0.0,
            finish: NO_LAYER.to_string(),
        }
    }

    #[test]
    fn test_bare_hollow_brick() {
        let result = calculate(&wall("hollow_brick", 20.0), reference_tables().unwrap()).unwrap();
        // 30 + 0.6 × 20
        assert!((result.rw_db - 42.0).abs() < 1e-9);
        assert_eq!(result.tier, AcousticTier::Standard);
        assert_eq!(result.insulation_db, 0.0);
    }

    #[test]
    fn test_full_assembly() {
        let mut input = wall("hollow_brick", 20.0);
        input.insulation = "glass_wool".to_string();
        input.insulation_thickness_cm = 10.0;
        input.finish = "plasterboard".to_string();

        let result = calculate(&input, reference_tables().unwrap()).unwrap();
        // 42 + (4 + 5) + 3
        assert!((result.insulation_db - 9.0).abs() < 1e-9);
        assert!((result.rw_db - 54.0).abs() < 1e-9);
        assert_eq!(result.tier, AcousticTier::Performant);
    }

    #[test]
    fn test_zero_thickness_insulation_is_skipped() {
        let mut input = wall("concrete", 20.0);
        input.insulation = "rock_wool".to_string();
        let result = calculate(&input, reference_tables().unwrap()).unwrap();
        assert_eq!(result.insulation_db, 0.0);
        assert_eq!(result.tier, AcousticTier::VeryPerformant);
    }

    #[test]
    fn test_light_partition_is_low() {
        let result = calculate(&wall("timber_frame", 10.0), reference_tables().unwrap()).unwrap();
        assert_eq!(result.tier, AcousticTier::Low);
    }

    #[test]
    fn test_tier_thresholds() {
        let band = AcousticTier::band().unwrap();
        assert_eq!(band.classify(34.99), AcousticTier::Low);
        assert_eq!(band.classify(35.0), AcousticTier::Standard);
        assert_eq!(band.classify(45.0), AcousticTier::Performant);
        assert_eq!(band.classify(55.0), AcousticTier::VeryPerformant);
    }

    #[test]
    fn test_unknown_keys_fail() {
        let tables = reference_tables().unwrap();
        let err = calculate(&wall("adobe", 20.0), tables).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_KEY");

        let mut input = wall("concrete", 20.0);
        input.finish = "gold_leaf".to_string();
        assert!(calculate(&input, tables).is_err());
    }

    #[test]
    fn test_rw_grows_with_thickness() {
        let tables = reference_tables().unwrap();
        let thin = calculate(&wall("solid_brick", 10.0), tables).unwrap();
        let thick = calculate(&wall("solid_brick", 20.0), tables).unwrap();
        assert!(thick.rw_db > thin.rw_db);
    }
}
