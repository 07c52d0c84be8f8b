//! Yield forecast models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{FieldBoundary, ManagementZone, NutrientLevel, SeasonConditions, SoilConditions};
use crate::types::{GpsCoordinates, Provenance};

/// Field size given directly or derived from the boundary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FieldSize {
    Hectares(f64),
    Boundary(FieldBoundary),
}

/// Input for a crop-level yield forecast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropYieldRequest {
    pub crop_type: String,
    pub field_size: FieldSize,
    pub planting_date: NaiveDate,
    pub location: GpsCoordinates,
    /// Fetched from the conditions source, or defaulted, when absent
    #[serde(default)]
    pub soil_data: Option<SoilConditions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherFactors {
    pub average_temperature: f64,
    pub average_humidity: f64,
    pub temperature_suitability: f64,
    pub humidity_suitability: f64,
    pub growing_days: u32,
    pub weather_stress_days: f64,
    pub rainfall_adequacy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilFactors {
    pub provenance: Provenance,
    pub ph_level: f64,
    pub ph_suitability: f64,
    pub nitrogen_level: NutrientLevel,
    pub phosphorus_level: NutrientLevel,
    pub potassium_level: NutrientLevel,
    pub moisture_content: f64,
    pub soil_fertility_score: f64,
    pub drainage_quality: f64,
}

/// Crop-level yield forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YieldPrediction {
    pub crop_type: String,
    pub field_size_hectares: f64,
    pub planting_date: NaiveDate,
    pub expected_harvest_date: NaiveDate,
    pub predicted_yield_kg: f64,
    pub predicted_yield_per_hectare: f64,
    pub confidence_score: f64,
    pub weather_impact_factor: f64,
    pub soil_impact_factor: f64,
    pub weather_factors: WeatherFactors,
    pub soil_factors: SoilFactors,
    pub recommendations: Vec<String>,
    pub analysis_date: DateTime<Utc>,
}

/// A past season's yield for the field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalYield {
    pub season: i32,
    pub yield_kg_ha: f64,
}

/// Input for a zone-level yield map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldYieldRequest {
    #[serde(default)]
    pub management_zones: Vec<ManagementZone>,
    #[serde(default)]
    pub historical_yields: Vec<HistoricalYield>,
    #[serde(default)]
    pub current_season: SeasonConditions,
    #[serde(default = "default_crop")]
    pub crop_type: String,
}

fn default_crop() -> String {
    "corn".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneYieldFactors {
    pub base_yield: f64,
    /// Characteristic modifier times weather impact
    pub zone_modifier: f64,
    pub weather_impact: f64,
}

/// Yield forecast for one management zone
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneYieldPrediction {
    pub zone_id: String,
    pub predicted_yield_kg_ha: f64,
    pub confidence: f64,
    pub yield_factors: ZoneYieldFactors,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YieldStatistics {
    pub average_yield_kg_ha: f64,
    pub min_yield_kg_ha: f64,
    pub max_yield_kg_ha: f64,
    /// Standard deviation across zones
    pub yield_variability: f64,
    pub coefficient_of_variation: f64,
    pub total_zones: usize,
    pub high_yield_zones: usize,
    pub low_yield_zones: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum YieldCategory {
    HighYield,
    AboveAverage,
    BelowAverage,
    LowYield,
}

impl YieldCategory {
    /// Classify a z-score: >1 high, (0,1] above, (-1,0] below, <=-1 low
    pub fn from_deviation(deviation: f64) -> Self {
        if deviation > 1.0 {
            YieldCategory::HighYield
        } else if deviation > 0.0 {
            YieldCategory::AboveAverage
        } else if deviation > -1.0 {
            YieldCategory::BelowAverage
        } else {
            YieldCategory::LowYield
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariabilityZone {
    pub zone_id: String,
    pub yield_category: YieldCategory,
    pub deviation_from_mean: f64,
    pub predicted_yield: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariabilityMap {
    pub zones: Vec<VariabilityZone>,
    pub field_mean: f64,
    pub field_std: f64,
    pub variability_coefficient: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RiskAssessment {
    pub weather_risks: Vec<String>,
    pub pest_disease_risks: Vec<String>,
    pub management_risks: Vec<String>,
    pub market_risks: Vec<String>,
}

impl RiskAssessment {
    pub fn is_empty(&self) -> bool {
        self.weather_risks.is_empty()
            && self.pest_disease_risks.is_empty()
            && self.management_risks.is_empty()
            && self.market_risks.is_empty()
    }
}

/// Zone-level yield map for a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldYieldMap {
    pub crop_type: String,
    pub prediction_date: DateTime<Utc>,
    pub zone_predictions: Vec<ZoneYieldPrediction>,
    pub field_statistics: Option<YieldStatistics>,
    pub variability_map: Option<VariabilityMap>,
    pub risk_assessment: RiskAssessment,
    pub confidence_level: f64,
    pub factors_considered: Vec<String>,
}
