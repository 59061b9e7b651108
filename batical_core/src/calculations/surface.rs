//! # Floor Surface Aggregation
//!
//! Sums room areas under an area-counting convention:
//!
//! - **Habitable** (SHAB): living floor area
//! - **Gross** (SHON): gross floor area including annexes
//!
//! Each room counts `width × length × coefficient`, rounded to the configured
//! precision. The coefficient is either given explicitly (any finite value)
//! or derived from the room category under the chosen convention.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_finite, ensure_positive, CalcError, CalcResult};
use crate::units::{round_to, SquareMeters};

/// Default number of decimals for room and total areas
pub const DEFAULT_DECIMALS: u32 = 2;

/// Most decimals an area may be rounded to
pub const MAX_DECIMALS: u32 = 6;

/// Area-counting convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SurfaceConvention {
    /// Surface habitable (SHAB)
    #[default]
    Habitable,
    /// Surface hors œuvre nette (SHON)
    Gross,
}

/// Kind of room, used to derive a counting coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
    /// Rooms with full ceiling height (bedrooms, kitchen, bathroom)
    LivingSpace,
    /// Floor under 1.80 m of headroom
    LowCeiling,
    /// Verandas and unheated conservatories
    Veranda,
    /// Cellars, garages, lofts
    Annex,
    /// Balconies, terraces, loggias
    Exterior,
}

impl SurfaceConvention {
    /// Canonical coefficient (1, 0.5 or 0) for a room category.
    pub fn coefficient_for(&self, category: RoomCategory) -> f64 {
        match (self, category) {
            (_, RoomCategory::LivingSpace) => 1.0,
            (_, RoomCategory::Exterior) => 0.0,
            (SurfaceConvention::Habitable, RoomCategory::Veranda) => 0.5,
            (SurfaceConvention::Habitable, RoomCategory::LowCeiling | RoomCategory::Annex) => 0.0,
            (SurfaceConvention::Gross, RoomCategory::LowCeiling | RoomCategory::Veranda) => 1.0,
            (SurfaceConvention::Gross, RoomCategory::Annex) => 0.5,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            SurfaceConvention::Habitable => "SHAB",
            SurfaceConvention::Gross => "SHON",
        }
    }
}

impl fmt::Display for SurfaceConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// A rectangular room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub width_m: f64,
    pub length_m: f64,
    /// Explicit counting coefficient; overrides `category`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RoomCategory>,
}

impl Room {
    pub fn new(name: impl Into<String>, width_m: f64, length_m: f64, coefficient: f64) -> Self {
        Room {
            name: name.into(),
            width_m,
            length_m,
            coefficient: Some(coefficient),
            category: None,
        }
    }

    pub fn with_category(name: impl Into<String>, width_m: f64, length_m: f64, category: RoomCategory) -> Self {
        Room {
            name: name.into(),
            width_m,
            length_m,
            coefficient: None,
            category: Some(category),
        }
    }

    /// Coefficient in effect: explicit, else from the category, else 1.
    pub fn effective_coefficient(&self, convention: SurfaceConvention) -> f64 {
        self.coefficient
            .or_else(|| self.category.map(|c| convention.coefficient_for(c)))
            .unwrap_or(1.0)
    }

    fn validate(&self) -> CalcResult<()> {
        ensure_positive(&format!("{}.width_m", self.name), self.width_m)?;
        ensure_positive(&format!("{}.length_m", self.name), self.length_m)?;
        if let Some(c) = self.coefficient {
            ensure_finite(&format!("{}.coefficient", self.name), c)?;
        }
        Ok(())
    }
}

/// List of rooms.
///
/// ## JSON Example
///
/// ```json
/// {
///   "convention": "Habitable",
///   "rooms": [
///     { "name": "Living room", "width_m": 5.0, "length_m": 6.0 },
///     { "name": "Veranda", "width_m": 3.0, "length_m": 4.0, "category": "veranda" },
///     { "name": "Attic", "width_m": 4.0, "length_m": 8.0, "coefficient": 0.5 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceInput {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub convention: SurfaceConvention,
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomArea {
    pub name: String,
    /// width × length (m²)
    pub floor_area_m2: f64,
    pub coefficient: f64,
    /// Counted area, rounded (m²)
    pub counted_area_m2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceResult {
    pub convention: SurfaceConvention,
    pub rooms: Vec<RoomArea>,
    /// Σ counted areas, rounded (m²)
    pub total_m2: f64,
}

/// Aggregate the counted floor area, rounding to `decimals`.
pub fn calculate(input: &SurfaceInput, decimals: u32) -> CalcResult<SurfaceResult> {
    if decimals > MAX_DECIMALS {
        return Err(CalcError::invalid_input(
            "decimals",
            decimals.to_string(),
            format!("At most {MAX_DECIMALS} decimal places"),
        ));
    }

    let rooms = input
        .rooms
        .iter()
        .map(|room| {
            room.validate()?;
            let floor = SquareMeters(room.width_m * room.length_m);
            let coefficient = room.effective_coefficient(input.convention);
            Ok(RoomArea {
                name: room.name.clone(),
                floor_area_m2: floor.value(),
                coefficient,
                counted_area_m2: round_to((floor * coefficient).value(), decimals),
            })
        })
        .collect::<CalcResult<Vec<_>>>()?;

    // Summing in sorted order keeps the total independent of room order.
    let mut counted: Vec<f64> = rooms.iter().map(|r| r.counted_area_m2).collect();
    counted.sort_by(f64::total_cmp);
    let total = round_to(counted.iter().sum(), decimals);

    tracing::debug!(
        label = %input.label,
        convention = %input.convention,
        rooms = rooms.len(),
        total,
        "Surface aggregation"
    );

    Ok(SurfaceResult {
        convention: input.convention,
        rooms,
        total_m2: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_flat() -> SurfaceInput {
        SurfaceInput {
            label: "Flat".to_string(),
            convention: SurfaceConvention::Habitable,
            rooms: vec![
                Room::new("Living room", 5.0, 6.0, 1.0),
                Room::new("Bedroom", 3.2, 3.55, 1.0),
                Room::new("Loft", 4.0, 5.0, 0.5),
                Room::new("Garage", 3.0, 6.0, 0.0),
            ],
        }
    }

    #[test]
    fn test_total() {
        let result = calculate(&test_flat(), DEFAULT_DECIMALS).unwrap();
        // 30 + 11.36 + 10 + 0
        assert_eq!(result.rooms[1].counted_area_m2, 11.36);
        assert!((result.total_m2 - 51.36).abs() < 1e-9);
    }

    #[test]
    fn test_decimals_out_of_range() {
        let err = calculate(&test_flat(), MAX_DECIMALS + 1).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        let err = calculate(&test_flat(), u32::MAX).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let result = calculate(&test_flat(), MAX_DECIMALS).unwrap();
        assert!((result.total_m2 - 51.36).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_precision() {
        let input = SurfaceInput {
            label: String::new(),
            convention: SurfaceConvention::Habitable,
            rooms: vec![Room::new("Odd", 1.234, 2.345, 1.0)],
        };
        assert_eq!(calculate(&input, 2).unwrap().total_m2, 2.89);
        assert_eq!(calculate(&input, 0).unwrap().total_m2, 3.0);
    }

    #[test]
    fn test_category_coefficients() {
        let rooms = vec![
            Room::with_category("Living", 5.0, 4.0, RoomCategory::LivingSpace),
            Room::with_category("Veranda", 3.0, 4.0, RoomCategory::Veranda),
            Room::with_category("Cellar", 4.0, 5.0, RoomCategory::Annex),
            Room::with_category("Balcony", 1.5, 4.0, RoomCategory::Exterior),
        ];
        let habitable = SurfaceInput {
            label: String::new(),
            convention: SurfaceConvention::Habitable,
            rooms: rooms.clone(),
        };
        let gross = SurfaceInput {
            convention: SurfaceConvention::Gross,
            ..habitable.clone()
        };

        // 20 + 6 + 0 + 0
        assert_eq!(calculate(&habitable, 2).unwrap().total_m2, 26.0);
        // 20 + 12 + 10 + 0
        assert_eq!(calculate(&gross, 2).unwrap().total_m2, 42.0);
    }

    #[test]
    fn test_explicit_coefficient_wins() {
        let mut room = Room::with_category("Loft", 4.0, 5.0, RoomCategory::Annex);
        room.coefficient = Some(0.75);
        assert_eq!(room.effective_coefficient(SurfaceConvention::Habitable), 0.75);
        let plain = Room {
            coefficient: None,
            category: None,
            ..room
        };
        assert_eq!(plain.effective_coefficient(SurfaceConvention::Gross), 1.0);
    }

    #[test]
    fn test_empty_list() {
        let input = SurfaceInput {
            label: String::new(),
            convention: SurfaceConvention::Gross,
            rooms: Vec::new(),
        };
        assert_eq!(calculate(&input, 2).unwrap().total_m2, 0.0);
    }

    #[test]
    fn test_invalid_room() {
        let mut input = test_flat();
        input.rooms.push(Room::new("Ghost", -2.0, 3.0, 1.0));
        assert!(calculate(&input, 2).is_err());

        let mut input = test_flat();
        input.rooms.push(Room::new("Weird", 2.0, 3.0, f64::NAN));
        assert!(calculate(&input, 2).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn rooms_strategy() -> impl Strategy<Value = Vec<Room>> {
            prop::collection::vec((0.5f64..20.0, 0.5f64..20.0), 1..12).prop_map(|dims| {
                dims.into_iter()
                    .enumerate()
                    .map(|(i, (w, l))| Room::new(format!("R{i}"), w, l, 1.0))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn total_is_order_invariant(rooms in rooms_strategy()) {
                let forward = SurfaceInput { label: String::new(), convention: SurfaceConvention::Habitable, rooms: rooms.clone() };
                let mut reversed_rooms = rooms;
                reversed_rooms.reverse();
                let reversed = SurfaceInput { rooms: reversed_rooms, ..forward.clone() };
                prop_assert_eq!(
                    calculate(&forward, 2).unwrap().total_m2,
                    calculate(&reversed, 2).unwrap().total_m2
                );
            }

            #[test]
            fn total_scales_with_uniform_coefficient(rooms in rooms_strategy(), c in 0.0f64..1.0) {
                let full = SurfaceInput { label: String::new(), convention: SurfaceConvention::Habitable, rooms: rooms.clone() };
                let scaled_rooms: Vec<Room> = rooms.into_iter().map(|r| Room { coefficient: Some(c), ..r }).collect();
                let scaled = SurfaceInput { rooms: scaled_rooms.clone(), ..full.clone() };
                // Each room is rounded to 0.005 at most, the total once more.
                let tolerance = 0.005 * (scaled_rooms.len() as f64 + 1.0) * 2.0;
                let full_total = calculate(&full, 2).unwrap().total_m2;
                let scaled_total = calculate(&scaled, 2).unwrap().total_m2;
                prop_assert!((scaled_total - c * full_total).abs() <= tolerance);
            }
        }
    }
}
