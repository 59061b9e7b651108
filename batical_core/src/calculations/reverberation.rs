//! # Room Reverberation Time (Sabine)
//!
//! ```text
//! A = Σ area_i·α_i        V = L·W·H        T = 0.161·V/A
//! ```
//!
//! T is compared with the recommended value for the room usage; the ratio
//! T/T_rec is classified and the absorption needed to reach T_rec is
//! reported.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_positive, CalcError, CalcResult};
use crate::tables::ReferenceTables;

/// Sabine constant (s/m)
pub const SABINE_CONSTANT: f64 = 0.161;

/// Ratio T/T_rec below which the room is over-damped
pub const LOWER_RATIO: f64 = 0.8;

/// Ratio T/T_rec above which the room is too reverberant
pub const UPPER_RATIO: f64 = 1.2;

/// One bounding surface of the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSurface {
    pub name: String,
    pub area_m2: f64,
    /// Key into `absorption`
    pub material: String,
}

impl RoomSurface {
    pub fn new(name: impl Into<String>, area_m2: f64, material: impl Into<String>) -> Self {
        RoomSurface {
            name: name.into(),
            area_m2,
            material: material.into(),
        }
    }
}

/// Surfaces of the reference 5 × 4 × 2.5 m room
pub fn default_surfaces() -> Vec<RoomSurface> {
    vec![
        RoomSurface::new("Walls", 56.0, "plaster"),
        RoomSurface::new("Floor", 20.0, "concrete"),
        RoomSurface::new("Ceiling", 20.0, "plaster"),
        RoomSurface::new("Window", 3.0, "glass"),
        RoomSurface::new("Door", 1.8, "wood"),
    ]
}

/// Room geometry and finishes.
///
/// ## JSON Example
///
/// ```json
/// {
///   "length_m": 5.0,
///   "width_m": 4.0,
///   "height_m": 2.5,
///   "usage": "living_room",
///   "surfaces": [
///     { "name": "Walls", "area_m2": 56.0, "material": "plaster" },
///     { "name": "Floor", "area_m2": 20.0, "material": "carpet" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverberationInput {
    #[serde(default)]
    pub label: String,
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    /// Key into `room_usages`
    pub usage: String,
    #[serde(default = "default_surfaces")]
    pub surfaces: Vec<RoomSurface>,
}

impl ReverberationInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("length_m", self.length_m)?;
        ensure_positive("width_m", self.width_m)?;
        ensure_positive("height_m", self.height_m)?;
        if self.surfaces.is_empty() {
            return Err(CalcError::missing_field("surfaces"));
        }
        for surface in &self.surfaces {
            ensure_positive(&format!("surfaces.{}.area_m2", surface.name), surface.area_m2)?;
        }
        Ok(())
    }

    pub fn volume_m3(&self) -> f64 {
        self.length_m * self.width_m * self.height_m
    }
}

/// Reverberation assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReverberationClass {
    ExcessiveAbsorption,
    Conforms,
    ExcessiveReverberation,
}

impl ReverberationClass {
    /// Classify T/T_rec; both bounds of the conforming range are inclusive.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < LOWER_RATIO {
            ReverberationClass::ExcessiveAbsorption
        } else if ratio <= UPPER_RATIO {
            ReverberationClass::Conforms
        } else {
            ReverberationClass::ExcessiveReverberation
        }
    }
}

impl fmt::Display for ReverberationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReverberationClass::ExcessiveAbsorption => "Excessive absorption",
            ReverberationClass::Conforms => "Conforms",
            ReverberationClass::ExcessiveReverberation => "Excessive reverberation",
        };
        write!(f, "{}", text)
    }
}

/// Absorption of one surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceAbsorption {
    pub name: String,
    pub area_m2: f64,
    pub coefficient: f64,
    /// area·α (m² Sabine)
    pub absorption_m2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverberationResult {
    pub volume_m3: f64,
    pub surfaces: Vec<SurfaceAbsorption>,
    /// A (m² Sabine)
    pub total_absorption_m2: f64,
    /// T (s)
    pub reverberation_time_s: f64,
    /// T_rec (s)
    pub recommended_time_s: f64,
    /// T/T_rec
    pub ratio: f64,
    pub classification: ReverberationClass,
    /// Absorption giving exactly T_rec (m²)
    pub target_absorption_m2: f64,
    /// Target minus current; positive means absorption must be added (m²)
    pub absorption_delta_m2: f64,
}

/// Compute the reverberation time of a room.
pub fn calculate(input: &ReverberationInput, tables: &ReferenceTables) -> CalcResult<ReverberationResult> {
    input.validate()?;
    let acoustic = &tables.acoustic;

    let recommended = acoustic.room_usages.coefficient("room_usages", &input.usage)?;
    let surfaces = input
        .surfaces
        .iter()
        .map(|s| {
            let coefficient = acoustic.absorption.coefficient("absorption", &s.material)?;
            Ok(SurfaceAbsorption {
                name: s.name.clone(),
                area_m2: s.area_m2,
                coefficient,
                absorption_m2: s.area_m2 * coefficient,
            })
        })
        .collect::<CalcResult<Vec<_>>>()?;

    let total_absorption: f64 = surfaces.iter().map(|s| s.absorption_m2).sum();
    if total_absorption <= 0.0 {
        return Err(CalcError::invalid_input(
            "surfaces",
            total_absorption.to_string(),
            "Total absorption must be positive",
        ));
    }

    let volume = input.volume_m3();
    let t = SABINE_CONSTANT * volume / total_absorption;
    let ratio = t / recommended;
    let classification = ReverberationClass::from_ratio(ratio);
    let target = SABINE_CONSTANT * volume / recommended;

    tracing::debug!(
        label = %input.label,
        volume,
        total_absorption,
        t,
        recommended,
        %classification,
        "Reverberation time"
    );

    Ok(ReverberationResult {
        volume_m3: volume,
        surfaces,
        total_absorption_m2: total_absorption,
        reverberation_time_s: t,
        recommended_time_s: recommended,
        ratio,
        classification,
        target_absorption_m2: target,
        absorption_delta_m2: target - total_absorption,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::reference_tables;

    fn reference_room() -> ReverberationInput {
        ReverberationInput {
            label: "Living room".to_string(),
            length_m: 5.0,
            width_m: 4.0,
            height_m: 2.5,
            usage: "living_room".to_string(),
            surfaces: default_surfaces(),
        }
    }

    #[test]
    fn test_reference_room() {
        let result = calculate(&reference_room(), reference_tables().unwrap()).unwrap();

        assert!((result.volume_m3 - 50.0).abs() < 1e-12);
        // 56×0.03 + 20×0.02 + 20×0.03 + 3×0.04 + 1.8×0.10
        assert!((result.total_absorption_m2 - 2.98).abs() < 1e-9);
        let expected = 0.161 * result.volume_m3 / result.total_absorption_m2;
        assert!((result.reverberation_time_s - expected).abs() < 1e-12);
        assert!((result.reverberation_time_s - 2.701).abs() < 0.001);
        assert_eq!(result.classification, ReverberationClass::ExcessiveReverberation);
        assert!(result.absorption_delta_m2 > 0.0);
    }

    #[test]
    fn test_target_absorption_reaches_recommendation() {
        let result = calculate(&reference_room(), reference_tables().unwrap()).unwrap();
        let t_at_target = SABINE_CONSTANT * result.volume_m3 / result.target_absorption_m2;
        assert!((t_at_target - result.recommended_time_s).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_classes() {
        assert_eq!(ReverberationClass::from_ratio(0.79), ReverberationClass::ExcessiveAbsorption);
        assert_eq!(ReverberationClass::from_ratio(0.8), ReverberationClass::Conforms);
        assert_eq!(ReverberationClass::from_ratio(1.2), ReverberationClass::Conforms);
        assert_eq!(ReverberationClass::from_ratio(1.21), ReverberationClass::ExcessiveReverberation);
    }

    #[test]
    fn test_treated_room_conforms() {
        let mut room = reference_room();
        room.surfaces = vec![
            RoomSurface::new("Walls", 56.0, "plaster"),
            RoomSurface::new("Floor", 20.0, "carpet"),
            RoomSurface::new("Ceiling", 20.0, "acoustic_tile"),
        ];
        // A = 1.68 + 6 + 14 = 21.68, T = 0.371 s
        let result = calculate(&room, reference_tables().unwrap()).unwrap();
        assert_eq!(result.classification, ReverberationClass::ExcessiveAbsorption);
        assert!(result.absorption_delta_m2 < 0.0);
    }

    #[test]
    fn test_unknown_material_and_usage() {
        let tables = reference_tables().unwrap();
        let mut room = reference_room();
        room.surfaces.push(RoomSurface::new("Rug", 4.0, "fur"));
        assert_eq!(calculate(&room, tables).unwrap_err().error_code(), "UNKNOWN_KEY");

        let mut room = reference_room();
        room.usage = "cathedral".to_string();
        assert!(calculate(&room, tables).is_err());
    }

    #[test]
    fn test_empty_surfaces() {
        let mut room = reference_room();
        room.surfaces.clear();
        assert!(calculate(&room, reference_tables().unwrap()).is_err());
    }

    #[test]
    fn test_surfaces_default_in_json() {
        let json = r#"{ "length_m": 5.0, "width_m": 4.0, "height_m": 2.5, "usage": "office" }"#;
        let input: ReverberationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.surfaces.len(), 5);
    }
}
