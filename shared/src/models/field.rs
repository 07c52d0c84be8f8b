//! Field geometry, management zone and soil zone models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DataStatus, GpsCoordinates, Provenance};

/// Ordered field boundary vertices. The polygon closes implicitly from the
/// last vertex back to the first; self-intersection is not checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct FieldBoundary(pub Vec<GpsCoordinates>);

impl FieldBoundary {
    pub fn new(vertices: Vec<GpsCoordinates>) -> Self {
        Self(vertices)
    }

    pub fn vertices(&self) -> &[GpsCoordinates] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A polygon needs at least three vertices to enclose an area
    pub fn is_polygon(&self) -> bool {
        self.0.len() >= 3
    }
}

impl From<Vec<(f64, f64)>> for FieldBoundary {
    fn from(points: Vec<(f64, f64)>) -> Self {
        Self(points.into_iter().map(GpsCoordinates::from).collect())
    }
}

/// A surveyed elevation point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElevationSample {
    pub location: GpsCoordinates,
    pub elevation: f64,
}

/// A laboratory soil sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilSample {
    pub location: GpsCoordinates,
    #[serde(default = "default_soil_type")]
    pub soil_type: String,
    #[serde(default = "default_ph")]
    pub ph: f64,
    /// Organic matter percentage
    #[serde(default = "default_organic_matter")]
    pub organic_matter: f64,
    /// ppm
    #[serde(default = "default_nitrogen")]
    pub nitrogen: f64,
    /// ppm
    #[serde(default = "default_phosphorus")]
    pub phosphorus: f64,
    /// ppm
    #[serde(default = "default_potassium")]
    pub potassium: f64,
}

fn default_soil_type() -> String {
    "loamy".to_string()
}

fn default_ph() -> f64 {
    6.5
}

fn default_organic_matter() -> f64 {
    3.0
}

fn default_nitrogen() -> f64 {
    20.0
}

fn default_phosphorus() -> f64 {
    15.0
}

fn default_potassium() -> f64 {
    150.0
}

/// Qualitative zone tags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub enum ZoneCharacteristic {
    GoodDrainage,
    ModerateDrainage,
    PoorDrainage,
    LowerWaterRetention,
    MediumWaterRetention,
    GoodWaterRetention,
    HighWaterRetention,
    HighOrganicMatter,
    LowOrganicMatter,
    SteepSlope,
    StandardConditions,
    /// Caller-supplied tag with no built-in modifier
    Custom(String),
}

impl std::str::FromStr for ZoneCharacteristic {
    type Err = std::convert::Infallible;

    /// Unrecognised tags are kept as caller-supplied
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Ok(match tag.to_lowercase().as_str() {
            "good_drainage" => ZoneCharacteristic::GoodDrainage,
            "moderate_drainage" => ZoneCharacteristic::ModerateDrainage,
            "poor_drainage" => ZoneCharacteristic::PoorDrainage,
            "lower_water_retention" => ZoneCharacteristic::LowerWaterRetention,
            "medium_water_retention" => ZoneCharacteristic::MediumWaterRetention,
            "good_water_retention" => ZoneCharacteristic::GoodWaterRetention,
            "high_water_retention" => ZoneCharacteristic::HighWaterRetention,
            "high_organic_matter" => ZoneCharacteristic::HighOrganicMatter,
            "low_organic_matter" => ZoneCharacteristic::LowOrganicMatter,
            "steep_slope" => ZoneCharacteristic::SteepSlope,
            "standard_conditions" => ZoneCharacteristic::StandardConditions,
            _ => ZoneCharacteristic::Custom(tag.to_string()),
        })
    }
}

impl From<String> for ZoneCharacteristic {
    fn from(s: String) -> Self {
        s.parse()
            .unwrap_or_else(|_| ZoneCharacteristic::Custom(s.trim().to_string()))
    }
}

impl From<ZoneCharacteristic> for String {
    fn from(characteristic: ZoneCharacteristic) -> Self {
        characteristic.to_string()
    }
}

impl std::fmt::Display for ZoneCharacteristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneCharacteristic::GoodDrainage => write!(f, "good_drainage"),
            ZoneCharacteristic::ModerateDrainage => write!(f, "moderate_drainage"),
            ZoneCharacteristic::PoorDrainage => write!(f, "poor_drainage"),
            ZoneCharacteristic::LowerWaterRetention => write!(f, "lower_water_retention"),
            ZoneCharacteristic::MediumWaterRetention => write!(f, "medium_water_retention"),
            ZoneCharacteristic::GoodWaterRetention => write!(f, "good_water_retention"),
            ZoneCharacteristic::HighWaterRetention => write!(f, "high_water_retention"),
            ZoneCharacteristic::HighOrganicMatter => write!(f, "high_organic_matter"),
            ZoneCharacteristic::LowOrganicMatter => write!(f, "low_organic_matter"),
            ZoneCharacteristic::SteepSlope => write!(f, "steep_slope"),
            ZoneCharacteristic::StandardConditions => write!(f, "standard_conditions"),
            ZoneCharacteristic::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// A sub-region of a field managed as one unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManagementZone {
    pub zone_id: String,
    pub name: String,
    /// (min, max) elevation in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_range: Option<(f64, f64)>,
    #[serde(default)]
    pub characteristics: Vec<ZoneCharacteristic>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl ManagementZone {
    pub fn has(&self, characteristic: &ZoneCharacteristic) -> bool {
        self.characteristics.contains(characteristic)
    }
}

/// Management zones together with how they were produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneSet {
    pub provenance: Provenance,
    pub zones: Vec<ManagementZone>,
}

/// Nutrient readings of a soil zone, ppm
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilNutrientReadings {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

/// Soil management zone derived from one soil sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilZone {
    pub zone_id: String,
    pub location: GpsCoordinates,
    pub soil_type: String,
    pub ph_level: f64,
    pub organic_matter: f64,
    pub nutrients: SoilNutrientReadings,
    pub recommendations: Vec<String>,
}

/// Risk level of a drainage or erosion area
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Medium,
    High,
}

/// Low-lying area prone to water accumulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowArea {
    pub location: GpsCoordinates,
    pub elevation: f64,
    pub risk_level: RiskLevel,
}

/// Elevated area prone to erosion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SteepArea {
    pub location: GpsCoordinates,
    pub elevation: f64,
    pub erosion_risk: RiskLevel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrainageQuality {
    Good,
    Poor,
}

/// Drainage and erosion analysis of a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrainageReport {
    pub status: DataStatus,
    pub overall_slope: Option<f64>,
    pub drainage_quality: Option<DrainageQuality>,
    pub water_accumulation_areas: Vec<LowArea>,
    pub erosion_risk_areas: Vec<SteepArea>,
    pub recommendations: Vec<String>,
}

impl DrainageReport {
    pub fn no_data() -> Self {
        Self {
            status: DataStatus::NoData,
            overall_slope: None,
            drainage_quality: None,
            water_accumulation_areas: Vec::new(),
            erosion_risk_areas: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Counts of samples by deviation from the mean elevation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SlopeAnalysis {
    pub gentle_slopes: usize,
    pub moderate_slopes: usize,
    pub steep_slopes: usize,
}

/// Summary of the elevation survey
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElevationAnalysis {
    pub status: DataStatus,
    pub min_elevation: Option<f64>,
    pub max_elevation: Option<f64>,
    pub average_elevation: Option<f64>,
    pub elevation_variance: Option<f64>,
    pub slope_analysis: SlopeAnalysis,
}

/// Input for building a field map
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FieldMapRequest {
    #[serde(default)]
    pub boundaries: FieldBoundary,
    #[serde(default)]
    pub elevation_data: Vec<ElevationSample>,
    #[serde(default)]
    pub soil_samples: Vec<SoilSample>,
}

/// Complete map of a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMap {
    pub boundaries: FieldBoundary,
    pub area_hectares: f64,
    pub management_zones: ZoneSet,
    pub soil_zones: Vec<SoilZone>,
    pub drainage_patterns: DrainageReport,
    pub elevation_analysis: ElevationAnalysis,
    pub created_at: DateTime<Utc>,
}

/// Field map plus field-level advice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMapReport {
    pub field_map: FieldMap,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_tags_from_json() {
        let tags: Vec<ZoneCharacteristic> =
            serde_json::from_str(r#"["good_drainage", "Steep_Slope", "clay_soil"]"#).unwrap();
        assert_eq!(
            tags,
            vec![
                ZoneCharacteristic::GoodDrainage,
                ZoneCharacteristic::SteepSlope,
                ZoneCharacteristic::Custom("clay_soil".to_string()),
            ]
        );
    }

    #[test]
    fn test_zone_tags_serialize_as_bare_strings() {
        let tags = vec![
            ZoneCharacteristic::PoorDrainage,
            ZoneCharacteristic::Custom("clay_soil".to_string()),
        ];
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"["poor_drainage","clay_soil"]"#);

        let back: Vec<ZoneCharacteristic> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tags);
    }
}
