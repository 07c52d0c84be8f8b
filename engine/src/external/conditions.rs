//! Weather and soil snapshot sources

use std::future::Future;

use shared::{GpsCoordinates, SoilConditions, WeatherConditions};

use crate::error::AnalyticsResult;

/// Provider of the current weather and soil snapshots at a location.
///
/// Implementations wrap whatever upstream supplies the data; failures
/// should be reported as `AnalyticsError::ConditionsUnavailable`.
pub trait ConditionsSource: Send + Sync + 'static {
    fn current_weather(
        &self,
        location: GpsCoordinates,
    ) -> impl Future<Output = AnalyticsResult<WeatherConditions>> + Send;

    /// `None` when no soil survey exists for the location
    fn soil_conditions(
        &self,
        location: GpsCoordinates,
    ) -> impl Future<Output = AnalyticsResult<Option<SoilConditions>>> + Send;
}

/// Fixed snapshots, for batch runs and tests
#[derive(Debug, Clone)]
pub struct StaticConditions {
    weather: WeatherConditions,
    soil: Option<SoilConditions>,
}

impl StaticConditions {
    pub fn new(weather: WeatherConditions, soil: Option<SoilConditions>) -> Self {
        Self { weather, soil }
    }
}

impl Default for StaticConditions {
    /// Mild growing weather (20 °C, 70 %) and no soil survey
    fn default() -> Self {
        Self::new(WeatherConditions::new(20.0, 70.0), None)
    }
}

impl ConditionsSource for StaticConditions {
    async fn current_weather(&self, _location: GpsCoordinates) -> AnalyticsResult<WeatherConditions> {
        Ok(self.weather.clone())
    }

    async fn soil_conditions(
        &self,
        _location: GpsCoordinates,
    ) -> AnalyticsResult<Option<SoilConditions>> {
        Ok(self.soil.clone())
    }
}
