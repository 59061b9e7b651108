//! # Reference Tables
//!
//! Static lookup data shared by the calculators: acoustic coefficients,
//! heating-system factors, cost coefficients and regional indices.
//!
//! The data lives in `data/reference_tables.toml`, is embedded at compile
//! time, and is parsed once per process on first access. After that the
//! tables are immutable and can be read from any thread.
//!
//! Lookups are total over the keys a form can present. An unknown key is
//! reported as [`CalcError::UnknownKey`]; there is no fallback value.
//!
//! ## Example
//!
//! ```rust
//! use batical_core::tables::reference_tables;
//!
//! let tables = reference_tables().unwrap();
//! let alpha = tables.lookup("absorption", "carpet").unwrap();
//! assert_eq!(alpha, 0.30);
//!
//! assert!(tables.lookup("absorption", "unobtainium").is_err());
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

const REFERENCE_TABLES_TOML: &str = include_str!("../data/reference_tables.toml");

static REFERENCE_TABLES: Lazy<CalcResult<ReferenceTables>> = Lazy::new(|| {
    let tables: ReferenceTables = toml::from_str(REFERENCE_TABLES_TOML).map_err(|e| CalcError::Internal {
        message: format!("embedded reference tables are invalid: {e}"),
    })?;
    tables.validate()?;
    tracing::debug!(tables = tables.table_names().len(), "Loaded reference tables");
    Ok(tables)
});

/// Get the process-wide reference tables.
pub fn reference_tables() -> CalcResult<&'static ReferenceTables> {
    REFERENCE_TABLES.as_ref().map_err(Clone::clone)
}

// ============================================================================
// Keyed tables
// ============================================================================

/// Immutable map from a finite key set to a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedTable<T> {
    entries: BTreeMap<String, T>,
}

/// Table of numeric multipliers or base values.
pub type CoefficientTable = KeyedTable<f64>;

impl<T> KeyedTable<T> {
    /// Look up `key`, reporting `table` in the error when it is missing.
    pub fn get(&self, table: &str, key: &str) -> CalcResult<&T> {
        self.entries.get(key).ok_or_else(|| CalcError::unknown_key(table, key))
    }

    /// All keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<(String, T)> for KeyedTable<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        KeyedTable {
            entries: iter.into_iter().collect(),
        }
    }
}

impl CoefficientTable {
    /// Look up a coefficient by value.
    pub fn coefficient(&self, table: &str, key: &str) -> CalcResult<f64> {
        self.get(table, key).copied()
    }
}

// ============================================================================
// Table records
// ============================================================================

/// Principal wall material (or insulation layer) in the transmission-loss model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcousticLayer {
    pub label: String,
    /// Constant part of the contribution (dB)
    pub base_db: f64,
    /// Thickness-proportional part (dB per cm)
    pub db_per_cm: f64,
}

/// Heating system factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatingSystem {
    pub label: String,
    /// Seasonal efficiency (COP for heat pumps)
    pub efficiency: f64,
    /// Final to primary energy conversion factor
    pub primary_energy_factor: f64,
    /// Greenhouse gas emissions (kgCO2eq per kWh final)
    pub carbon_factor: f64,
}

/// Finish level multiplier range for cost estimates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishLevelRange {
    pub min_factor: f64,
    pub max_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcousticTables {
    pub wall_materials: KeyedTable<AcousticLayer>,
    pub insulations: KeyedTable<AcousticLayer>,
    pub finishes: CoefficientTable,
    pub absorption: CoefficientTable,
    pub room_usages: CoefficientTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalTables {
    pub insulation_u_values: CoefficientTable,
    pub heating_systems: KeyedTable<HeatingSystem>,
    pub ventilation: CoefficientTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTables {
    pub base_price_per_m2: CoefficientTable,
    pub client_types: CoefficientTable,
    pub regions: CoefficientTable,
    pub categories: KeyedTable<CoefficientTable>,
    pub finish_levels: KeyedTable<FinishLevelRange>,
}

/// The complete set of reference tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub acoustic: AcousticTables,
    pub thermal: ThermalTables,
    pub cost: CostTables,
}

impl ReferenceTables {
    /// Parse a reference table set from TOML text.
    pub fn from_toml(text: &str) -> CalcResult<Self> {
        let tables: ReferenceTables = toml::from_str(text).map_err(CalcError::serialization)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Flat numeric lookup: `lookup(table_name, key) -> value`.
    ///
    /// Category coefficient tables are addressed as `cost.<category>`
    /// (e.g. `cost.roof`).
    pub fn lookup(&self, table_name: &str, key: &str) -> CalcResult<f64> {
        self.coefficient_table(table_name)?.coefficient(table_name, key)
    }

    /// Resolve a flat coefficient table by name.
    pub fn coefficient_table(&self, table_name: &str) -> CalcResult<&CoefficientTable> {
        match table_name {
            "finishes" => Ok(&self.acoustic.finishes),
            "absorption" => Ok(&self.acoustic.absorption),
            "room_usages" => Ok(&self.acoustic.room_usages),
            "insulation_u_values" => Ok(&self.thermal.insulation_u_values),
            "ventilation" => Ok(&self.thermal.ventilation),
            "base_price_per_m2" => Ok(&self.cost.base_price_per_m2),
            "client_types" => Ok(&self.cost.client_types),
            "regions" => Ok(&self.cost.regions),
            other => match other.strip_prefix("cost.") {
                Some(category) => self.cost.categories.get("cost_categories", category),
                None => Err(CalcError::unknown_key("tables", other)),
            },
        }
    }

    /// Names of every table, flat and structured.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [
            "wall_materials",
            "insulations",
            "finishes",
            "absorption",
            "room_usages",
            "insulation_u_values",
            "heating_systems",
            "ventilation",
            "base_price_per_m2",
            "client_types",
            "regions",
            "finish_levels",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        names.extend(self.cost.categories.keys().map(|c| format!("cost.{c}")));
        names
    }

    /// Keys of any table listed by [`table_names`](Self::table_names).
    pub fn keys(&self, table_name: &str) -> CalcResult<Vec<String>> {
        let keys: Vec<String> = match table_name {
            "wall_materials" => self.acoustic.wall_materials.keys().map(str::to_string).collect(),
            "insulations" => self.acoustic.insulations.keys().map(str::to_string).collect(),
            "heating_systems" => self.thermal.heating_systems.keys().map(str::to_string).collect(),
            "finish_levels" => self.cost.finish_levels.keys().map(str::to_string).collect(),
            other => self.coefficient_table(other)?.keys().map(str::to_string).collect(),
        };
        Ok(keys)
    }

    /// Check table invariants: no empty table, all numbers finite and
    /// multipliers strictly positive.
    pub fn validate(&self) -> CalcResult<()> {
        let positive_tables = [
            ("room_usages", &self.acoustic.room_usages),
            ("insulation_u_values", &self.thermal.insulation_u_values),
            ("ventilation", &self.thermal.ventilation),
            ("base_price_per_m2", &self.cost.base_price_per_m2),
            ("client_types", &self.cost.client_types),
            ("regions", &self.cost.regions),
        ];
        for (name, table) in positive_tables {
            check_table(name, table, |v| v > 0.0)?;
        }
        check_table("absorption", &self.acoustic.absorption, |v| v > 0.0 && v <= 1.0)?;
        check_table("finishes", &self.acoustic.finishes, |v| v >= 0.0)?;

        for (category, table) in self.cost.categories.iter() {
            check_table(&format!("cost.{category}"), table, |v| v > 0.0)?;
        }
        for (key, system) in self.thermal.heating_systems.iter() {
            if !(system.efficiency > 0.0 && system.primary_energy_factor > 0.0 && system.carbon_factor >= 0.0) {
                return Err(invalid_entry("heating_systems", key));
            }
        }
        for (key, range) in self.cost.finish_levels.iter() {
            if !(range.min_factor > 0.0 && range.min_factor <= range.max_factor) {
                return Err(invalid_entry("finish_levels", key));
            }
        }
        for (key, layer) in self.acoustic.wall_materials.iter().chain(self.acoustic.insulations.iter()) {
            if !(layer.base_db.is_finite() && layer.db_per_cm.is_finite() && layer.db_per_cm >= 0.0) {
                return Err(invalid_entry("acoustic_layers", key));
            }
        }
        Ok(())
    }
}

fn check_table(name: &str, table: &CoefficientTable, valid: impl Fn(f64) -> bool) -> CalcResult<()> {
    if table.is_empty() {
        return Err(CalcError::Internal {
            message: format!("reference table '{name}' is empty"),
        });
    }
    for (key, value) in table.iter() {
        if !value.is_finite() || !valid(*value) {
            return Err(invalid_entry(name, key));
        }
    }
    Ok(())
}

fn invalid_entry(table: &str, key: &str) -> CalcError {
    CalcError::Internal {
        message: format!("reference table '{table}' has an out-of-range entry for '{key}'"),
    }
}

// ============================================================================
// Classification bands
// ============================================================================

/// How a value is compared against a band's upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundKind {
    /// `value <= bound` falls in the band
    Inclusive,
    /// `value < bound` falls in the band
    Exclusive,
}

/// Ordered `(upper_bound, label)` pairs mapping a score to a discrete class.
///
/// Bounds are finite and strictly increasing; values above the last bound
/// fall into the catch-all label (the `+∞` band).
///
/// # Example
///
/// ```rust
/// use batical_core::tables::ClassificationBand;
///
/// let band = ClassificationBand::at_most(vec![(10.0, "low"), (20.0, "mid")], "high").unwrap();
/// assert_eq!(band.classify(10.0), "low");
/// assert_eq!(band.classify(15.0), "mid");
/// assert_eq!(band.classify(1e9), "high");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawClassificationBand<L>",
    bound(deserialize = "L: Deserialize<'de> + Clone")
)]
pub struct ClassificationBand<L> {
    bounded: Vec<(f64, L)>,
    catch_all: L,
    bound_kind: BoundKind,
}

/// Unchecked wire form of [`ClassificationBand`]
#[derive(Deserialize)]
struct RawClassificationBand<L> {
    bounded: Vec<(f64, L)>,
    catch_all: L,
    bound_kind: BoundKind,
}

impl<L: Clone> TryFrom<RawClassificationBand<L>> for ClassificationBand<L> {
    type Error = CalcError;

    fn try_from(raw: RawClassificationBand<L>) -> Result<Self, Self::Error> {
        Self::new(raw.bounded, raw.catch_all, raw.bound_kind)
    }
}

impl<L: Clone> ClassificationBand<L> {
    /// Build a band where each upper bound is inclusive.
    pub fn at_most(bounded: Vec<(f64, L)>, catch_all: L) -> CalcResult<Self> {
        Self::new(bounded, catch_all, BoundKind::Inclusive)
    }

    /// Build a band where each upper bound is exclusive.
    pub fn below(bounded: Vec<(f64, L)>, catch_all: L) -> CalcResult<Self> {
        Self::new(bounded, catch_all, BoundKind::Exclusive)
    }

    pub fn new(bounded: Vec<(f64, L)>, catch_all: L, bound_kind: BoundKind) -> CalcResult<Self> {
        for (i, (bound, _)) in bounded.iter().enumerate() {
            if !bound.is_finite() {
                return Err(CalcError::invalid_input(
                    "band_bounds",
                    bound.to_string(),
                    "Bounded classes must have a finite upper bound; use the catch-all for +inf",
                ));
            }
            if i > 0 && *bound <= bounded[i - 1].0 {
                return Err(CalcError::invalid_input(
                    "band_bounds",
                    bound.to_string(),
                    "Band bounds must be strictly increasing",
                ));
            }
        }
        Ok(ClassificationBand {
            bounded,
            catch_all,
            bound_kind,
        })
    }

    /// Map a value to its class label.
    pub fn classify(&self, value: f64) -> L {
        self.bounded
            .iter()
            .find(|(bound, _)| match self.bound_kind {
                BoundKind::Inclusive => value <= *bound,
                BoundKind::Exclusive => value < *bound,
            })
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| self.catch_all.clone())
    }

    /// Finite upper bounds in ascending order
    pub fn bounds(&self) -> Vec<f64> {
        self.bounded.iter().map(|(b, _)| *b).collect()
    }
}
