//! # Construction Cost Estimate
//!
//! Multiplicative pricing model:
//!
//! ```text
//! unit_price = base(project_type) · client(client_type)
//!            · Π coefficient(category, option) · region_index(region)
//! estimate   = unit_price · area
//! range      = estimate · [min_factor, max_factor](finish level)
//! ```
//!
//! Categories left unselected do not change the price. Every key must be
//! present in the `cost` reference tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_positive, CalcResult};
use crate::tables::ReferenceTables;

fn default_client_type() -> String {
    "individual".to_string()
}

/// Project description.
///
/// ## JSON Example
///
/// ```json
/// {
///   "project_type": "new_house",
///   "area_m2": 120.0,
///   "region": "ile_de_france",
///   "selections": { "walls": "brick", "roof": "slate" },
///   "finish_level": "standard"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostInput {
    #[serde(default)]
    pub label: String,
    /// Key into `base_price_per_m2`
    pub project_type: String,
    /// Key into `client_types`
    #[serde(default = "default_client_type")]
    pub client_type: String,
    /// Category → option, keys into `cost.<category>`
    #[serde(default)]
    pub selections: BTreeMap<String, String>,
    pub area_m2: f64,
    /// Key into `regions`; the configured default region when absent
    #[serde(default)]
    pub region: Option<String>,
    /// Key into `finish_levels`
    #[serde(default)]
    pub finish_level: Option<String>,
}

/// Coefficient applied for one selected attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoefficient {
    pub category: String,
    pub option: String,
    pub coefficient: f64,
}

/// Price range for one finish level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub finish_level: String,
    pub min_eur: f64,
    pub max_eur: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    pub base_price_per_m2: f64,
    pub client_factor: f64,
    pub coefficients: Vec<AppliedCoefficient>,
    /// Region actually used
    pub region: String,
    pub region_index: f64,
    /// Unit price after all multipliers (EUR/m²)
    pub unit_price_per_m2: f64,
    /// Point estimate (EUR)
    pub estimate_eur: f64,
    /// One range per finish level, cheapest finish first
    pub ranges: Vec<PriceRange>,
    /// Range for the requested finish level
    pub selected_range: Option<PriceRange>,
}

/// Estimate the construction cost of a project.
pub fn calculate(input: &CostInput, tables: &ReferenceTables, default_region: &str) -> CalcResult<CostResult> {
    ensure_positive("area_m2", input.area_m2)?;
    let cost = &tables.cost;

    let base = cost.base_price_per_m2.coefficient("base_price_per_m2", &input.project_type)?;
    let client_factor = cost.client_types.coefficient("client_types", &input.client_type)?;

    let coefficients = input
        .selections
        .iter()
        .map(|(category, option)| {
            let table = cost.categories.get("cost_categories", category)?;
            Ok(AppliedCoefficient {
                category: category.clone(),
                option: option.clone(),
                coefficient: table.coefficient(&format!("cost.{category}"), option)?,
            })
        })
        .collect::<CalcResult<Vec<_>>>()?;
    let attribute_factor: f64 = coefficients.iter().map(|c| c.coefficient).product();

    let region = input.region.as_deref().unwrap_or(default_region);
    let region_index = cost.regions.coefficient("regions", region)?;

    let unit_price = base * client_factor * attribute_factor * region_index;
    let estimate = unit_price * input.area_m2;

    let mut levels: Vec<_> = cost.finish_levels.iter().collect();
    levels.sort_by(|(_, a), (_, b)| a.min_factor.total_cmp(&b.min_factor));
    let ranges: Vec<PriceRange> = levels
        .into_iter()
        .map(|(level, range)| PriceRange {
            finish_level: level.to_string(),
            min_eur: estimate * range.min_factor,
            max_eur: estimate * range.max_factor,
        })
        .collect();

    let selected_range = match &input.finish_level {
        Some(level) => {
            cost.finish_levels.get("finish_levels", level)?;
            ranges.iter().find(|r| &r.finish_level == level).cloned()
        }
        None => None,
    };

    tracing::debug!(
        label = %input.label,
        project_type = %input.project_type,
        region,
        unit_price,
        estimate,
        "Cost estimate"
    );

    Ok(CostResult {
        base_price_per_m2: base,
        client_factor,
        coefficients,
        region: region.to_string(),
        region_index,
        unit_price_per_m2: unit_price,
        estimate_eur: estimate,
        ranges,
        selected_range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::reference_tables;

    fn test_project() -> CostInput {
        CostInput {
            label: "House".to_string(),
            project_type: "new_house".to_string(),
            client_type: "individual".to_string(),
            selections: BTreeMap::from([
                ("walls".to_string(), "brick".to_string()),
                ("roof".to_string(), "slate".to_string()),
            ]),
            area_m2: 120.0,
            region: Some("ile_de_france".to_string()),
            finish_level: Some("standard".to_string()),
        }
    }

    #[test]
    fn test_estimate() {
        let result = calculate(&test_project(), reference_tables().unwrap(), "occitanie").unwrap();

        // 1800 × 1.05 × 1.12 × 1.25
        let unit = 1800.0 * 1.05 * 1.12 * 1.25;
        assert!((result.unit_price_per_m2 - unit).abs() < 1e-9);
        assert!((result.estimate_eur - unit * 120.0).abs() < 1e-6);

        let selected = result.selected_range.unwrap();
        assert_eq!(selected.finish_level, "standard");
        assert!((selected.min_eur - result.estimate_eur * 0.95).abs() < 1e-6);
        assert!((selected.max_eur - result.estimate_eur * 1.10).abs() < 1e-6);
        assert_eq!(result.ranges.len(), 3);
    }

    #[test]
    fn test_default_region_and_no_selection() {
        let input = CostInput {
            selections: BTreeMap::new(),
            region: None,
            finish_level: None,
            ..test_project()
        };
        let result = calculate(&input, reference_tables().unwrap(), "occitanie").unwrap();
        assert_eq!(result.region, "occitanie");
        assert!((result.unit_price_per_m2 - 1800.0).abs() < 1e-9);
        assert!(result.selected_range.is_none());
        assert!(result.coefficients.is_empty());
    }

    #[test]
    fn test_ranges_are_ordered() {
        let result = calculate(&test_project(), reference_tables().unwrap(), "occitanie").unwrap();
        for range in &result.ranges {
            assert!(range.min_eur <= range.max_eur);
        }
        let levels: Vec<&str> = result.ranges.iter().map(|r| r.finish_level.as_str()).collect();
        assert_eq!(levels, ["economic", "standard", "premium"]);
        assert!(result.ranges.windows(2).all(|w| w[0].min_eur <= w[1].min_eur));
    }

    #[test]
    fn test_unknown_keys() {
        let tables = reference_tables().unwrap();

        let mut input = test_project();
        input.selections.insert("pool".to_string(), "infinity".to_string());
        let err = calculate(&input, tables, "occitanie").unwrap_err();
        assert_eq!(
            err,
            crate::errors::CalcError::unknown_key("cost_categories", "pool")
        );

        let mut input = test_project();
        input.selections.insert("roof".to_string(), "thatch".to_string());
        let err = calculate(&input, tables, "occitanie").unwrap_err();
        assert_eq!(err, crate::errors::CalcError::unknown_key("cost.roof", "thatch"));

        let mut input = test_project();
        input.region = Some("atlantis".to_string());
        assert!(calculate(&input, tables, "occitanie").is_err());

        let mut input = test_project();
        input.finish_level = Some("palatial".to_string());
        assert!(calculate(&input, tables, "occitanie").is_err());

        let mut input = test_project();
        input.project_type = "castle".to_string();
        assert!(calculate(&input, tables, "occitanie").is_err());
    }

    #[test]
    fn test_invalid_area() {
        let mut input = test_project();
        input.area_m2 = 0.0;
        assert!(calculate(&input, reference_tables().unwrap(), "occitanie").is_err());
    }
}
