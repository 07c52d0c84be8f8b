//! Agronomic reference tables
//!
//! A `KnowledgeBase` is built once (from the built-in tables or a JSON
//! override) and shared read-only between services behind an `Arc`.
//! Fields missing from an override keep their built-in values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::{ApplicationType, CropParameters, CropSummary, FieldSizeTier};

/// Equipment per field size tier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquipmentTiers {
    pub small: String,
    pub medium: String,
    pub large: String,
}

impl EquipmentTiers {
    fn new(small: &str, medium: &str, large: &str) -> Self {
        Self {
            small: small.to_string(),
            medium: medium.to_string(),
            large: large.to_string(),
        }
    }

    pub fn for_tier(&self, tier: FieldSizeTier) -> &str {
        match tier {
            FieldSizeTier::Small => &self.small,
            FieldSizeTier::Medium => &self.medium,
            FieldSizeTier::Large => &self.large,
        }
    }
}

/// NDVI class boundaries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NdviThresholds {
    /// Below this a reading is severely stressed
    pub severe: f64,
    pub poor: f64,
    pub fair: f64,
    pub good: f64,
}

impl Default for NdviThresholds {
    fn default() -> Self {
        Self {
            severe: 0.2,
            poor: 0.3,
            fair: 0.5,
            good: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnowledgeBase {
    /// Crop-level forecast parameters keyed by lowercase crop name
    pub crops: BTreeMap<String, CropParameters>,
    /// Zone-level base yields, kg/ha
    pub zone_base_yields: BTreeMap<String, f64>,
    pub default_zone_base_yield: f64,
    /// Application type -> crop -> base rate
    pub application_rates: BTreeMap<String, BTreeMap<String, f64>>,
    pub application_units: BTreeMap<String, String>,
    pub default_unit: String,
    /// Product cost per unit
    pub unit_costs: BTreeMap<String, f64>,
    pub default_unit_cost: f64,
    /// Application type -> crop -> stage -> timing
    pub application_timing: BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>,
    pub equipment: BTreeMap<String, EquipmentTiers>,
    pub default_equipment: String,
    pub ndvi_thresholds: NdviThresholds,
}

impl KnowledgeBase {
    pub fn crop(&self, name: &str) -> Option<&CropParameters> {
        self.crops.get(name)
    }

    /// Supported crops in alphabetical order
    pub fn supported_crops(&self) -> Vec<CropSummary> {
        self.crops
            .iter()
            .map(|(name, params)| CropSummary::from_parameters(name, params))
            .collect()
    }

    pub fn zone_base_yield(&self, crop: &str) -> f64 {
        self.zone_base_yields
            .get(crop)
            .copied()
            .unwrap_or(self.default_zone_base_yield)
    }

    /// Reference rate, if the pair is in the table
    pub fn base_rate(&self, application_type: &ApplicationType, crop: &str) -> Option<f64> {
        self.application_rates
            .get(application_type.as_str())
            .and_then(|rates| rates.get(crop))
            .copied()
    }

    pub fn unit(&self, application_type: &ApplicationType) -> &str {
        self.application_units
            .get(application_type.as_str())
            .map(String::as_str)
            .unwrap_or(&self.default_unit)
    }

    pub fn unit_cost(&self, application_type: &ApplicationType) -> f64 {
        self.unit_costs
            .get(application_type.as_str())
            .copied()
            .unwrap_or(self.default_unit_cost)
    }

    pub fn timing(&self, application_type: &ApplicationType, crop: &str) -> BTreeMap<String, String> {
        self.application_timing
            .get(application_type.as_str())
            .and_then(|by_crop| by_crop.get(crop))
            .cloned()
            .unwrap_or_else(|| stages(&[("general", "consult agronomist")]))
    }

    pub fn equipment(&self, application_type: &ApplicationType, tier: FieldSizeTier) -> &str {
        self.equipment
            .get(application_type.as_str())
            .map(|tiers| tiers.for_tier(tier))
            .unwrap_or(&self.default_equipment)
    }
}

fn stages(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(stage, when)| (stage.to_string(), when.to_string()))
        .collect()
}

fn by_crop(corn: f64, soybean: f64, wheat: f64) -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("corn".to_string(), corn),
        ("soybean".to_string(), soybean),
        ("wheat".to_string(), wheat),
    ])
}

#[allow(clippy::too_many_arguments)]
fn crop(
    temp: (f64, f64),
    humidity: (f64, f64),
    growing_days: u32,
    water: f64,
    base_yield: f64,
    temp_sensitivity: f64,
    humidity_sensitivity: f64,
    ph: (f64, f64),
) -> CropParameters {
    CropParameters {
        optimal_temp_range: temp,
        optimal_humidity_range: humidity,
        growing_days,
        water_requirement: water,
        base_yield_per_hectare: base_yield,
        temp_sensitivity,
        humidity_sensitivity,
        soil_ph_optimal: ph,
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        let crops = BTreeMap::from([
            ("wheat".to_string(), crop((15.0, 25.0), (60.0, 80.0), 120, 450.0, 3000.0, 0.8, 0.6, (6.0, 7.5))),
            ("rice".to_string(), crop((20.0, 30.0), (70.0, 90.0), 150, 1200.0, 4000.0, 0.9, 0.8, (5.5, 7.0))),
            ("corn".to_string(), crop((18.0, 27.0), (65.0, 85.0), 100, 500.0, 5000.0, 0.7, 0.5, (6.0, 7.0))),
            ("soybeans".to_string(), crop((20.0, 30.0), (60.0, 80.0), 110, 450.0, 2500.0, 0.6, 0.7, (6.0, 7.5))),
            ("tomatoes".to_string(), crop((18.0, 26.0), (65.0, 85.0), 80, 400.0, 40000.0, 0.9, 0.8, (6.0, 7.0))),
        ]);

        let application_rates = BTreeMap::from([
            ("fertilizer".to_string(), by_crop(150.0, 100.0, 120.0)),
            ("pesticide".to_string(), by_crop(2.5, 2.0, 2.2)),
            ("seed".to_string(), by_crop(75_000.0, 350_000.0, 4_500_000.0)),
            ("water".to_string(), by_crop(25.0, 20.0, 22.0)),
        ]);

        let application_units = BTreeMap::from([
            ("fertilizer".to_string(), "kg/ha".to_string()),
            ("pesticide".to_string(), "L/ha".to_string()),
            ("seed".to_string(), "seeds/ha".to_string()),
            ("water".to_string(), "mm".to_string()),
        ]);

        let unit_costs = BTreeMap::from([
            ("fertilizer".to_string(), 0.50),
            ("pesticide".to_string(), 15.00),
            ("seed".to_string(), 0.003),
            ("water".to_string(), 0.10),
        ]);

        let application_timing = BTreeMap::from([
            (
                "fertilizer".to_string(),
                BTreeMap::from([
                    (
                        "corn".to_string(),
                        stages(&[
                            ("pre_plant", "2-3 weeks before planting"),
                            ("side_dress", "V6-V8 growth stage"),
                        ]),
                    ),
                    ("soybean".to_string(), stages(&[("pre_plant", "1-2 weeks before planting")])),
                    (
                        "wheat".to_string(),
                        stages(&[("fall", "at planting"), ("spring", "early spring growth")]),
                    ),
                ]),
            ),
            (
                "pesticide".to_string(),
                BTreeMap::from([
                    (
                        "corn".to_string(),
                        stages(&[
                            ("pre_emerge", "within 3 days of planting"),
                            ("post_emerge", "V3-V6 stage"),
                        ]),
                    ),
                    (
                        "soybean".to_string(),
                        stages(&[
                            ("pre_emerge", "within 2 days of planting"),
                            ("post_emerge", "V2-V4 stage"),
                        ]),
                    ),
                    (
                        "wheat".to_string(),
                        stages(&[("fall", "4-6 weeks after emergence"), ("spring", "early spring")]),
                    ),
                ]),
            ),
        ]);

        let equipment = BTreeMap::from([
            (
                "fertilizer".to_string(),
                EquipmentTiers::new(
                    "Broadcast spreader with GPS guidance",
                    "Self-propelled applicator with variable rate",
                    "High-capacity applicator with precision guidance",
                ),
            ),
            (
                "pesticide".to_string(),
                EquipmentTiers::new(
                    "ATV-mounted sprayer",
                    "Self-propelled sprayer with boom",
                    "High-clearance sprayer with GPS",
                ),
            ),
            (
                "seed".to_string(),
                EquipmentTiers::new(
                    "Precision planter",
                    "Multi-row planter with GPS",
                    "Large planter with variable rate seeding",
                ),
            ),
        ]);

        Self {
            crops,
            zone_base_yields: by_crop(10_000.0, 3_000.0, 5_000.0),
            default_zone_base_yield: 5_000.0,
            application_rates,
            application_units,
            default_unit: "units/ha".to_string(),
            unit_costs,
            default_unit_cost: 1.0,
            application_timing,
            equipment,
            default_equipment: "Standard equipment".to_string(),
            ndvi_thresholds: NdviThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_fall_back_to_defaults() {
        let kb = KnowledgeBase::default();
        let custom = ApplicationType::Custom("lime".into());
        assert_eq!(kb.base_rate(&ApplicationType::Fertilizer, "corn"), Some(150.0));
        assert_eq!(kb.base_rate(&custom, "corn"), None);
        assert_eq!(kb.unit(&custom), "units/ha");
        assert_eq!(kb.unit_cost(&custom), 1.0);
        assert_eq!(kb.zone_base_yield("barley"), 5_000.0);
        assert_eq!(kb.equipment(&ApplicationType::Water, FieldSizeTier::Large), "Standard equipment");
        assert_eq!(
            kb.timing(&ApplicationType::Seed, "corn").get("general").map(String::as_str),
            Some("consult agronomist")
        );
    }

    #[test]
    fn test_supported_crops_alphabetical() {
        let names: Vec<String> = KnowledgeBase::default()
            .supported_crops()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["corn", "rice", "soybeans", "tomatoes", "wheat"]);
    }

    #[test]
    fn test_partial_override_keeps_builtin_tables() {
        let kb: KnowledgeBase =
            serde_json::from_str(r#"{"default_zone_base_yield": 4200.0}"#).unwrap();
        assert_eq!(kb.default_zone_base_yield, 4200.0);
        assert_eq!(kb.crops.len(), 5);
        assert_eq!(kb.zone_base_yield("corn"), 10_000.0);
    }
}
