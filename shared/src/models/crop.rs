//! Crop reference parameters

use serde::{Deserialize, Serialize};

/// Agronomic parameters of a crop used by the crop-level forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropParameters {
    /// (min, max) °C
    pub optimal_temp_range: (f64, f64),
    /// (min, max) %
    pub optimal_humidity_range: (f64, f64),
    pub growing_days: u32,
    /// mm over the season
    pub water_requirement: f64,
    /// kg/ha
    pub base_yield_per_hectare: f64,
    pub temp_sensitivity: f64,
    pub humidity_sensitivity: f64,
    pub soil_ph_optimal: (f64, f64),
}

/// Display summary of a supported crop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropSummary {
    pub name: String,
    pub display_name: String,
    pub growing_days: u32,
    pub optimal_temperature: String,
    pub water_requirement: String,
    pub base_yield: String,
}

impl CropSummary {
    pub fn from_parameters(name: &str, params: &CropParameters) -> Self {
        Self {
            name: name.to_string(),
            display_name: title_case(name),
            growing_days: params.growing_days,
            optimal_temperature: format!(
                "{}-{}°C",
                params.optimal_temp_range.0, params.optimal_temp_range.1
            ),
            water_requirement: format!("{} mm", params.water_requirement),
            base_yield: format!("{} kg/hectare", params.base_yield_per_hectare),
        }
    }
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_formatting() {
        let params = CropParameters {
            optimal_temp_range: (18.0, 27.0),
            optimal_humidity_range: (65.0, 85.0),
            growing_days: 100,
            water_requirement: 500.0,
            base_yield_per_hectare: 5000.0,
            temp_sensitivity: 0.7,
            humidity_sensitivity: 0.5,
            soil_ph_optimal: (6.0, 7.0),
        };
        let summary = CropSummary::from_parameters("corn", &params);
        assert_eq!(summary.display_name, "Corn");
        assert_eq!(summary.optimal_temperature, "18-27°C");
        assert_eq!(summary.water_requirement, "500 mm");
        assert_eq!(summary.base_yield, "5000 kg/hectare");
    }
}
