//! Field monitoring models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DataStatus, GpsCoordinates};

/// Modality of a monitoring data set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum MonitoringType {
    #[default]
    Ndvi,
    SoilMoisture,
    Temperature,
    GrowthStage,
    Generic,
}

impl MonitoringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitoringType::Ndvi => "ndvi",
            MonitoringType::SoilMoisture => "soil_moisture",
            MonitoringType::Temperature => "temperature",
            MonitoringType::GrowthStage => "growth_stage",
            MonitoringType::Generic => "generic",
        }
    }

    /// Days until the next reading of this modality is due
    pub fn cadence_days(&self) -> i64 {
        match self {
            MonitoringType::Ndvi => 14,
            MonitoringType::SoilMoisture => 7,
            MonitoringType::Temperature => 3,
            MonitoringType::GrowthStage => 10,
            MonitoringType::Generic => 7,
        }
    }
}

impl std::str::FromStr for MonitoringType {
    type Err = std::convert::Infallible;

    /// Unknown modalities are analysed as generic data
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "ndvi" => MonitoringType::Ndvi,
            "soil_moisture" => MonitoringType::SoilMoisture,
            "temperature" => MonitoringType::Temperature,
            "growth_stage" => MonitoringType::GrowthStage,
            _ => MonitoringType::Generic,
        })
    }
}

impl From<String> for MonitoringType {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(MonitoringType::Generic)
    }
}

impl From<MonitoringType> for String {
    fn from(data_type: MonitoringType) -> Self {
        data_type.as_str().to_string()
    }
}

impl std::fmt::Display for MonitoringType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single spatial reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringDataPoint {
    pub location: GpsCoordinates,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Management zone the reading was taken in, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

impl MonitoringDataPoint {
    pub fn new(location: GpsCoordinates, value: f64) -> Self {
        Self {
            location,
            value,
            timestamp: None,
            zone_id: None,
        }
    }

    pub fn in_zone(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }
}

/// Input for a monitoring analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringRequest {
    #[serde(rename = "type", default)]
    pub data_type: MonitoringType,
    #[serde(default)]
    pub data_points: Vec<MonitoringDataPoint>,
    /// Defaults to the time of analysis
    #[serde(default)]
    pub measurement_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    #[default]
    Outlier,
}

/// A reading more than two standard deviations from the field mean
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnomalyRecord {
    pub location: GpsCoordinates,
    pub value: f64,
    pub expected_range: (f64, f64),
    pub severity: AnomalySeverity,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
}

/// NDVI bucket counts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NdviDistribution {
    pub poor: usize,
    pub fair: usize,
    pub good: usize,
    pub excellent: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    Moderate,
    Severe,
}

/// A low-NDVI location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StressArea {
    pub location: GpsCoordinates,
    pub ndvi_value: f64,
    pub stress_level: StressLevel,
    pub possible_causes: Vec<String>,
}

/// Qualitative label for a 0-100 score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityTier {
    /// excellent > 80, good > 60, fair > 40, otherwise poor
    pub fn from_score(score: f64) -> Self {
        if score > 80.0 {
            QualityTier::Excellent
        } else if score > 60.0 {
            QualityTier::Good
        } else if score > 40.0 {
            QualityTier::Fair
        } else {
            QualityTier::Poor
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthUniformity {
    pub uniformity_score: f64,
    pub coefficient_of_variation: f64,
    pub assessment: QualityTier,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NdviAnalysis {
    pub average_ndvi: f64,
    pub ndvi_distribution: NdviDistribution,
    pub field_health_score: f64,
    pub stress_indicators: Vec<StressArea>,
    pub growth_uniformity: GrowthUniformity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilMoistureAnalysis {
    pub average_moisture: f64,
    pub moisture_variability: f64,
    pub dry_areas: usize,
    pub optimal_areas: usize,
    pub wet_areas: usize,
    pub irrigation_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperatureAnalysis {
    pub average_temperature: f64,
    pub temperature_range: f64,
    pub heat_stress_areas: usize,
    pub cold_stress_areas: usize,
    pub optimal_areas: usize,
    pub thermal_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthStageAnalysis {
    pub average_growth_stage: f64,
    /// Standard deviation of growth stages
    pub growth_uniformity: f64,
    pub advanced_areas: usize,
    pub delayed_areas: usize,
    pub management_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenericAnalysis {
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub standard_deviation: f64,
    pub data_quality: DataStatus,
}

/// Modality-specific analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResults {
    Ndvi(NdviAnalysis),
    SoilMoisture(SoilMoistureAnalysis),
    Temperature(TemperatureAnalysis),
    GrowthStage(GrowthStageAnalysis),
    Generic(GenericAnalysis),
    NoData,
}

/// Descriptive statistics of a set of readings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub coefficient_of_variation: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradientDirection {
    NorthHigher,
    SouthHigher,
    EastHigher,
    WestHigher,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Gradient {
    pub detected: bool,
    pub direction: GradientDirection,
    pub magnitude: f64,
}

/// Directional gradients across the field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpatialPatterns {
    pub status: DataStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub north_south_gradient: Option<Gradient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub east_west_gradient: Option<Gradient>,
}

impl SpatialPatterns {
    pub fn insufficient_data() -> Self {
        Self {
            status: DataStatus::InsufficientData,
            north_south_gradient: None,
            east_west_gradient: None,
        }
    }
}

/// Full monitoring analysis record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringAnalysis {
    #[serde(rename = "type")]
    pub data_type: MonitoringType,
    pub status: DataStatus,
    pub measurement_date: DateTime<Utc>,
    pub analysis_results: AnalysisResults,
    pub anomalies_detected: Vec<AnomalyRecord>,
    pub field_statistics: Option<FieldStatistics>,
    /// Per-zone statistics for readings tagged with a zone id
    pub zone_statistics: BTreeMap<String, FieldStatistics>,
    pub spatial_patterns: SpatialPatterns,
    pub recommendations: Vec<String>,
    pub next_monitoring_date: DateTime<Utc>,
    pub analyzed_at: DateTime<Utc>,
}
