//! Variable-rate application models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ManagementZone;
use crate::types::Provenance;

/// Input applied at variable rate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(from = "String", into = "String")]
pub enum ApplicationType {
    #[default]
    Fertilizer,
    Pesticide,
    Seed,
    Water,
    /// Input with no reference data
    Custom(String),
}

impl ApplicationType {
    pub fn as_str(&self) -> &str {
        match self {
            ApplicationType::Fertilizer => "fertilizer",
            ApplicationType::Pesticide => "pesticide",
            ApplicationType::Seed => "seed",
            ApplicationType::Water => "water",
            ApplicationType::Custom(name) => name,
        }
    }
}

impl std::str::FromStr for ApplicationType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "fertilizer" => ApplicationType::Fertilizer,
            "pesticide" => ApplicationType::Pesticide,
            "seed" => ApplicationType::Seed,
            "water" => ApplicationType::Water,
            other => ApplicationType::Custom(other.to_string()),
        })
    }
}

impl From<String> for ApplicationType {
    fn from(s: String) -> Self {
        s.parse()
            .unwrap_or_else(|_| ApplicationType::Custom(s.trim().to_lowercase()))
    }
}

impl From<ApplicationType> for String {
    fn from(application_type: ApplicationType) -> Self {
        application_type.as_str().to_string()
    }
}

impl std::fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for planning a variable-rate application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRequest {
    #[serde(default)]
    pub field_zones: Vec<ManagementZone>,
    #[serde(rename = "type", default)]
    pub application_type: ApplicationType,
    #[serde(default = "default_crop")]
    pub crop_type: String,
    /// Sizes the equipment recommendation; the zone count is used when absent
    #[serde(default)]
    pub field_size_hectares: Option<f64>,
}

fn default_crop() -> String {
    "corn".to_string()
}

/// Rate for one zone
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationRateEntry {
    pub zone_id: String,
    pub application_rate: f64,
    pub unit: String,
    pub justification: String,
}

/// Rates for all zones and whether the base rate came from the reference table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateMap {
    pub provenance: Provenance,
    pub default_rate_used: bool,
    pub base_rate: f64,
    pub entries: Vec<ApplicationRateEntry>,
}

impl RateMap {
    pub fn rates(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.application_rate).collect()
    }
}

/// Totals across the rate map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationQuantities {
    /// Number of zones; zone areas are not weighted
    pub total_area: f64,
    pub average_rate: f64,
    pub total_quantity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquipmentRecommendation {
    pub recommended_equipment: String,
    pub features_needed: Vec<String>,
    pub calibration_notes: String,
}

/// Currency amounts rounded to cents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationCost {
    pub product_cost: Decimal,
    pub application_cost: Decimal,
    pub total_cost: Decimal,
    pub cost_per_hectare: Decimal,
}

/// Complete variable-rate application plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationPlan {
    #[serde(rename = "type")]
    pub application_type: ApplicationType,
    pub crop: String,
    pub rate_map: RateMap,
    pub total_quantities: ApplicationQuantities,
    /// Stage name to timing advice
    pub timing: BTreeMap<String, String>,
    pub equipment: EquipmentRecommendation,
    pub estimated_cost: ApplicationCost,
    pub optimization_notes: Vec<String>,
    pub created_at: DateTime<Utc>,
}
