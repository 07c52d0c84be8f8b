//! Weather and soil snapshots consumed by the analytics

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Weather alert attached to a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherAlert {
    pub alert_type: String,
    pub message: String,
}

/// Current weather at a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherConditions {
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    #[serde(default)]
    pub wind_speed_kmh: f64,
    /// 0-1 adequacy of rainfall over the growing period, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall_adequacy: Option<f64>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

impl WeatherConditions {
    pub fn new(temperature_celsius: f64, humidity_percent: f64) -> Self {
        Self {
            temperature_celsius,
            humidity_percent,
            wind_speed_kmh: 0.0,
            rainfall_adequacy: None,
            alerts: Vec::new(),
        }
    }
}

/// Categorical nutrient level reported by soil tests
///
/// Deserializes from a case-insensitive label or a 0-1 score. Unrecognised
/// labels read as `Medium`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
pub enum NutrientLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl NutrientLevel {
    /// Fertility score of the level
    pub fn score(&self) -> f64 {
        match self {
            NutrientLevel::Low => 0.6,
            NutrientLevel::Medium => 0.8,
            NutrientLevel::High => 1.0,
        }
    }

    /// Nearest level to a numeric score
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() {
            NutrientLevel::Medium
        } else if score < 0.7 {
            NutrientLevel::Low
        } else if score < 0.9 {
            NutrientLevel::Medium
        } else {
            NutrientLevel::High
        }
    }
}

impl<'de> Deserialize<'de> for NutrientLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Reported {
            Label(String),
            Score(f64),
        }

        Ok(match Reported::deserialize(deserializer)? {
            Reported::Label(label) => label.parse().unwrap_or_default(),
            Reported::Score(score) => NutrientLevel::from_score(score),
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown nutrient level: {0}")]
pub struct UnknownNutrientLevel(pub String);

impl std::str::FromStr for NutrientLevel {
    type Err = UnknownNutrientLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(NutrientLevel::Low),
            "medium" => Ok(NutrientLevel::Medium),
            "high" => Ok(NutrientLevel::High),
            _ => Err(UnknownNutrientLevel(s.to_string())),
        }
    }
}

impl std::fmt::Display for NutrientLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NutrientLevel::Low => write!(f, "Low"),
            NutrientLevel::Medium => write!(f, "Medium"),
            NutrientLevel::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SoilNutrients {
    #[serde(default)]
    pub nitrogen: NutrientLevel,
    #[serde(default)]
    pub phosphorus: NutrientLevel,
    #[serde(default)]
    pub potassium: NutrientLevel,
}

impl SoilNutrients {
    pub fn uniform(level: NutrientLevel) -> Self {
        Self {
            nitrogen: level,
            phosphorus: level,
            potassium: level,
        }
    }

    /// Mean score of the three nutrients, to four decimals so that uniform
    /// levels score exactly their level score
    pub fn fertility_score(&self) -> f64 {
        let mean = (self.nitrogen.score() + self.phosphorus.score() + self.potassium.score()) / 3.0;
        (mean * 10_000.0).round() / 10_000.0
    }
}

/// Soil composition at a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilConditions {
    pub ph_level: f64,
    /// Percent
    #[serde(default = "default_moisture")]
    pub moisture_content: f64,
    #[serde(default)]
    pub nutrients: SoilNutrients,
    /// 0-1 drainage quality, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drainage_quality: Option<f64>,
}

fn default_moisture() -> f64 {
    50.0
}

impl Default for SoilConditions {
    fn default() -> Self {
        Self {
            ph_level: 6.5,
            moisture_content: default_moisture(),
            nutrients: SoilNutrients::default(),
            drainage_quality: None,
        }
    }
}

/// Season-wide weather assessment for zone-level forecasts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SeasonWeatherRisk {
    /// 0-1
    #[serde(default)]
    pub drought_risk: f64,
    /// 0-1
    #[serde(default)]
    pub excess_moisture: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SeasonConditions {
    /// Multiplier applied to every zone; defaults to 1.0
    #[serde(default)]
    pub weather_impact: Option<f64>,
    #[serde(default)]
    pub weather_conditions: SeasonWeatherRisk,
    /// Free-text risks appended to every zone
    #[serde(default)]
    pub weather_risks: Vec<String>,
    /// 0-1 certainty of the season forecast
    #[serde(default)]
    pub weather_certainty: Option<f64>,
}
