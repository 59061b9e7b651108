//! # Energy Performance Rating (DPE)
//!
//! Simplified envelope heat-loss model rated on the A–G energy and GHG
//! scales.
//!
//! ```text
//! base      = U(insulation) · surface · 80
//! adjusted  = base · f_year · (h/2.5) · (1 + glazing − 0.15) · f_ventilation
//! final     = adjusted / efficiency(system)                  kWh/yr
//! primary   = final/surface · pef(system)                    kWh/m²/yr
//! ghg       = final/surface · carbon(system)                 kgCO2eq/m²/yr
//! bill      = final · price                                  EUR/yr
//! ```
//!
//! The overall class is the worse of the energy and GHG letters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_finite, ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::tables::{ClassificationBand, ReferenceTables};

/// Annual heat-loss factor applied to U·A (kWh/yr per W/K)
pub const HEAT_LOSS_FACTOR: f64 = 80.0;

/// Ceiling height of the reference dwelling (m)
pub const REFERENCE_CEILING_HEIGHT_M: f64 = 2.5;

/// Glazing ratio of the reference dwelling
pub const REFERENCE_GLAZING_RATIO: f64 = 0.15;

fn default_ceiling_height() -> f64 {
    REFERENCE_CEILING_HEIGHT_M
}

fn default_glazing_ratio() -> f64 {
    REFERENCE_GLAZING_RATIO
}

fn default_ventilation() -> String {
    "single_flow".to_string()
}

/// DPE letter, A best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DpeClass {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl DpeClass {
    pub const ALL: [DpeClass; 7] = [
        DpeClass::A,
        DpeClass::B,
        DpeClass::C,
        DpeClass::D,
        DpeClass::E,
        DpeClass::F,
        DpeClass::G,
    ];

    fn scale(bounds: [f64; 6]) -> CalcResult<ClassificationBand<DpeClass>> {
        ClassificationBand::at_most(bounds.into_iter().zip(DpeClass::ALL).collect(), DpeClass::G)
    }

    /// Primary energy scale (kWh/m²/yr, upper bounds inclusive)
    pub fn energy_band() -> CalcResult<ClassificationBand<DpeClass>> {
        Self::scale([70.0, 110.0, 180.0, 250.0, 330.0, 420.0])
    }

    /// Emissions scale (kgCO2eq/m²/yr, upper bounds inclusive)
    pub fn ghg_band() -> CalcResult<ClassificationBand<DpeClass>> {
        Self::scale([6.0, 11.0, 30.0, 50.0, 70.0, 100.0])
    }

    pub fn letter(&self) -> char {
        match self {
            DpeClass::A => 'A',
            DpeClass::B => 'B',
            DpeClass::C => 'C',
            DpeClass::D => 'D',
            DpeClass::E => 'E',
            DpeClass::F => 'F',
            DpeClass::G => 'G',
        }
    }
}

impl fmt::Display for DpeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Construction period multiplier on heat loss
pub fn construction_year_factor(year: i32) -> CalcResult<f64> {
    let band = ClassificationBand::at_most(
        vec![(1947.0, 1.20), (1974.0, 1.30), (1988.0, 1.15), (2000.0, 1.05), (2012.0, 0.95)],
        0.85,
    )?;
    Ok(band.classify(f64::from(year)))
}

/// Dwelling description.
///
/// ## JSON Example
///
/// ```json
/// {
///   "surface_m2": 100.0,
///   "construction_year": 1985,
///   "heating_system": "gas_condensing",
///   "insulation_level": "average",
///   "energy_price_eur_kwh": 0.12
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpeInput {
    #[serde(default)]
    pub label: String,
    /// Heated floor area (m²)
    pub surface_m2: f64,
    pub construction_year: i32,
    /// Key into `heating_systems`
    pub heating_system: String,
    /// Key into `insulation_u_values`
    pub insulation_level: String,
    #[serde(default = "default_ceiling_height")]
    pub ceiling_height_m: f64,
    /// Glazed share of the facade (0–1)
    #[serde(default = "default_glazing_ratio")]
    pub glazing_ratio: f64,
    /// Key into `ventilation`
    #[serde(default = "default_ventilation")]
    pub ventilation: String,
    /// Energy unit price (EUR/kWh)
    pub energy_price_eur_kwh: f64,
}

impl DpeInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("surface_m2", self.surface_m2)?;
        ensure_positive("ceiling_height_m", self.ceiling_height_m)?;
        ensure_finite("glazing_ratio", self.glazing_ratio)?;
        ensure_non_negative("energy_price_eur_kwh", self.energy_price_eur_kwh)?;
        if !(0.0..=1.0).contains(&self.glazing_ratio) {
            return Err(CalcError::invalid_input(
                "glazing_ratio",
                self.glazing_ratio.to_string(),
                "Glazing ratio must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpeResult {
    /// U·A·80 (kWh/yr)
    pub base_heat_loss_kwh: f64,
    pub year_factor: f64,
    pub height_factor: f64,
    pub glazing_factor: f64,
    pub ventilation_factor: f64,
    /// Heat loss after all factors (kWh/yr)
    pub adjusted_heat_loss_kwh: f64,
    /// Delivered energy (kWh/yr)
    pub final_energy_kwh: f64,
    /// Delivered energy intensity (kWh/m²/yr)
    pub final_energy_kwh_m2: f64,
    /// Primary energy intensity (kWh/m²/yr)
    pub primary_energy_kwh_m2: f64,
    /// Emissions intensity (kgCO2eq/m²/yr)
    pub ghg_kg_m2: f64,
    /// Estimated annual heating bill (EUR)
    pub annual_bill_eur: f64,
    pub energy_class: DpeClass,
    pub ghg_class: DpeClass,
    /// Worse of the two letters
    pub overall_class: DpeClass,
}

/// Rate a dwelling.
pub fn calculate(input: &DpeInput, tables: &ReferenceTables) -> CalcResult<DpeResult> {
    input.validate()?;
    let thermal = &tables.thermal;

    let u_value = thermal
        .insulation_u_values
        .coefficient("insulation_u_values", &input.insulation_level)?;
    let system = thermal.heating_systems.get("heating_systems", &input.heating_system)?;
    let ventilation_factor = thermal.ventilation.coefficient("ventilation", &input.ventilation)?;

    let base = u_value * input.surface_m2 * HEAT_LOSS_FACTOR;
    let year_factor = construction_year_factor(input.construction_year)?;
    let height_factor = input.ceiling_height_m / REFERENCE_CEILING_HEIGHT_M;
    let glazing_factor = 1.0 + (input.glazing_ratio - REFERENCE_GLAZING_RATIO);
    let adjusted = base * year_factor * height_factor * glazing_factor * ventilation_factor;

    let final_energy = adjusted / system.efficiency;
    let final_intensity = final_energy / input.surface_m2;
    let primary = final_intensity * system.primary_energy_factor;
    let ghg = final_intensity * system.carbon_factor;
    let bill = final_intensity * input.surface_m2 * input.energy_price_eur_kwh;

    let energy_class = DpeClass::energy_band()?.classify(primary);
    let ghg_class = DpeClass::ghg_band()?.classify(ghg);
    let overall_class = energy_class.max(ghg_class);

    tracing::debug!(
        label = %input.label,
        base,
        adjusted,
        final_energy,
        primary,
        ghg,
        %energy_class,
        %ghg_class,
        "DPE rating"
    );

    Ok(DpeResult {
        base_heat_loss_kwh: base,
        year_factor,
        height_factor,
        glazing_factor,
        ventilation_factor,
        adjusted_heat_loss_kwh: adjusted,
        final_energy_kwh: final_energy,
        final_energy_kwh_m2: final_intensity,
        primary_energy_kwh_m2: primary,
        ghg_kg_m2: ghg,
        annual_bill_eur: bill,
        energy_class,
        ghg_class,
        overall_class,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::reference_tables;

    fn test_house() -> DpeInput {
        DpeInput {
            label: "House".to_string(),
            surface_m2: 100.0,
            construction_year: 1985,
            heating_system: "gas_boiler".to_string(),
            insulation_level: "average".to_string(),
            ceiling_height_m: 2.5,
            glazing_ratio: 0.15,
            ventilation: "single_flow".to_string(),
            energy_price_eur_kwh: 0.12,
        }
    }

    #[test]
    fn test_reference_house() {
        let result = calculate(&test_house(), reference_tables().unwrap()).unwrap();

        // 0.8 × 100 × 80 = 6400, × 1.15 (1975–1988) = 7360, / 0.80 = 9200
        assert!((result.base_heat_loss_kwh - 6400.0).abs() < 1e-9);
        assert_eq!(result.year_factor, 1.15);
        assert!((result.final_energy_kwh - 9200.0).abs() < 1e-6);
        assert!((result.primary_energy_kwh_m2 - 92.0).abs() < 1e-9);
        assert!((result.ghg_kg_m2 - 20.884).abs() < 1e-9);
        assert!((result.annual_bill_eur - 1104.0).abs() < 1e-6);

        assert_eq!(result.energy_class, DpeClass::B);
        assert_eq!(result.ghg_class, DpeClass::C);
        assert_eq!(result.overall_class, DpeClass::C);
    }

    #[test]
    fn test_year_bands() {
        assert_eq!(construction_year_factor(1900).unwrap(), 1.20);
        assert_eq!(construction_year_factor(1947).unwrap(), 1.20);
        assert_eq!(construction_year_factor(1948).unwrap(), 1.30);
        assert_eq!(construction_year_factor(2012).unwrap(), 0.95);
        assert_eq!(construction_year_factor(2013).unwrap(), 0.85);
    }

    #[test]
    fn test_letter_bounds() {
        let band = DpeClass::energy_band().unwrap();
        assert_eq!(band.classify(70.0), DpeClass::A);
        assert_eq!(band.classify(70.1), DpeClass::B);
        assert_eq!(band.classify(420.0), DpeClass::F);
        assert_eq!(band.classify(421.0), DpeClass::G);
        let ghg = DpeClass::ghg_band().unwrap();
        assert_eq!(ghg.classify(6.0), DpeClass::A);
        assert_eq!(ghg.classify(100.5), DpeClass::G);
    }

    #[test]
    fn test_heat_pump_low_carbon() {
        let mut house = test_house();
        house.heating_system = "heat_pump".to_string();
        let result = calculate(&house, reference_tables().unwrap()).unwrap();
        assert_eq!(result.ghg_class, DpeClass::A);
        assert!(result.primary_energy_kwh_m2 < 92.0);
    }

    #[test]
    fn test_glazing_and_ventilation_factors() {
        let mut house = test_house();
        house.glazing_ratio = 0.35;
        house.ventilation = "double_flow".to_string();
        let result = calculate(&house, reference_tables().unwrap()).unwrap();
        assert!((result.glazing_factor - 1.2).abs() < 1e-12);
        assert_eq!(result.ventilation_factor, 0.75);
    }

    #[test]
    fn test_invalid_inputs() {
        let tables = reference_tables().unwrap();

        let mut house = test_house();
        house.glazing_ratio = 1.5;
        assert!(calculate(&house, tables).is_err());

        let mut house = test_house();
        house.heating_system = "nuclear".to_string();
        assert_eq!(calculate(&house, tables).unwrap_err().error_code(), "UNKNOWN_KEY");

        let mut house = test_house();
        house.surface_m2 = 0.0;
        assert!(calculate(&house, tables).is_err());
    }

    #[test]
    fn test_defaults_from_json() {
        let json = r#"{
            "surface_m2": 80.0,
            "construction_year": 2020,
            "heating_system": "heat_pump",
            "insulation_level": "good",
            "energy_price_eur_kwh": 0.2
        }"#;
        let input: DpeInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.ceiling_height_m, 2.5);
        assert_eq!(input.glazing_ratio, 0.15);
        assert_eq!(input.ventilation, "single_flow");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn energy_letter_is_monotonic(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
                let band = DpeClass::energy_band().unwrap();
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(band.classify(low) <= band.classify(high));
            }

            #[test]
            fn higher_ceilings_never_improve_the_letter(h1 in 2.0f64..5.0, h2 in 2.0f64..5.0) {
                let tables = reference_tables().unwrap();
                let (low, high) = if h1 <= h2 { (h1, h2) } else { (h2, h1) };
                let mut house = test_house();
                house.ceiling_height_m = low;
                let a = calculate(&house, tables).unwrap();
                house.ceiling_height_m = high;
                let b = calculate(&house, tables).unwrap();
                prop_assert!(a.primary_energy_kwh_m2 <= b.primary_energy_kwh_m2);
                prop_assert!(a.energy_class <= b.energy_class);
            }
        }
    }
}
