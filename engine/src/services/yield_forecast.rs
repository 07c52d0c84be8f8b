//! Crop-level and zone-level yield forecasting

use std::sync::Arc;

use chrono::{Duration, Utc};
use shared::{
    validate_boundary, validate_coordinates, validate_field_size, validate_soil,
    validate_unit_factor, validate_weather, CropParameters, CropSummary, CropYieldRequest, FieldSize, FieldYieldMap,
    FieldYieldRequest, HistoricalYield, ManagementZone, Provenance, RiskAssessment,
    SeasonConditions, SoilConditions, SoilFactors, VariabilityMap, VariabilityZone,
    WeatherConditions, WeatherFactors, YieldCategory, YieldPrediction, YieldStatistics,
    ZoneCharacteristic, ZoneYieldFactors, ZoneYieldPrediction,
};

use super::field_mapping::require_field_area;
use crate::config::ForecastConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::knowledge::KnowledgeBase;
use crate::parallel::ordered_map;
use crate::stats::{self, round_to};

pub const WEATHER_IMPACT_BOUNDS: (f64, f64) = (0.3, 1.5);
pub const SOIL_IMPACT_BOUNDS: (f64, f64) = (0.4, 1.3);
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Zone yield modifiers, composed multiplicatively
const ZONE_YIELD_MODIFIERS: [(ZoneCharacteristic, f64); 3] = [
    (ZoneCharacteristic::GoodDrainage, 1.1),
    (ZoneCharacteristic::PoorDrainage, 0.9),
    (ZoneCharacteristic::HighOrganicMatter, 1.05),
];

/// 1 inside `[min, max]`, falling linearly to 0 relative to the nearest bound
pub fn range_suitability(value: f64, min: f64, max: f64) -> f64 {
    if (min..=max).contains(&value) {
        1.0
    } else if value < min {
        (1.0 - (min - value) / min).max(0.0)
    } else {
        (1.0 - (value - max) / max).max(0.0)
    }
}

/// Yield forecasting service
#[derive(Debug, Clone)]
pub struct YieldForecastService {
    knowledge: Arc<KnowledgeBase>,
    config: ForecastConfig,
}

impl YieldForecastService {
    pub fn new(knowledge: Arc<KnowledgeBase>, config: ForecastConfig) -> Self {
        Self { knowledge, config }
    }

    pub fn supported_crops(&self) -> Vec<CropSummary> {
        self.knowledge.supported_crops()
    }

    fn crop_parameters(&self, crop_type: &str) -> AnalyticsResult<(String, &CropParameters)> {
        let name = crop_type.trim().to_lowercase();
        match self.knowledge.crop(&name) {
            Some(params) => Ok((name, params)),
            None => Err(AnalyticsError::UnsupportedCrop(name)),
        }
    }

    /// Forecast total and per-hectare yield of one crop on one field
    pub fn predict_crop_yield(
        &self,
        request: &CropYieldRequest,
        weather: &WeatherConditions,
    ) -> AnalyticsResult<YieldPrediction> {
        let (crop_type, params) = self.crop_parameters(&request.crop_type)?;

        let field_size_hectares = match &request.field_size {
            FieldSize::Hectares(hectares) => {
                validate_field_size(*hectares)
                    .map_err(|msg| AnalyticsError::validation("field_size", msg))?;
                *hectares
            }
            FieldSize::Boundary(boundary) => {
                validate_boundary(boundary)
                    .map_err(|msg| AnalyticsError::InvalidGeometry(msg.to_string()))?;
                require_field_area(boundary)?
            }
        };
        validate_coordinates(&request.location)
            .map_err(|msg| AnalyticsError::validation("location", msg))?;
        validate_weather(weather).map_err(|msg| AnalyticsError::validation("weather", msg))?;
        if let Some(soil) = &request.soil_data {
            validate_soil(soil).map_err(|msg| AnalyticsError::validation("soil_data", msg))?;
        }

        let expected_harvest_date =
            request.planting_date + Duration::days(i64::from(params.growing_days));

        let weather_factors = self.analyze_weather_factors(weather, params);
        let soil_factors = self.analyze_soil_factors(request.soil_data.as_ref(), params);
        if soil_factors.provenance.is_defaulted() {
            tracing::warn!(crop = %crop_type, "No soil snapshot, using default soil conditions");
        }

        let weather_impact = calculate_weather_impact(&weather_factors, params);
        let soil_impact = calculate_soil_impact(&soil_factors);
        let predicted_yield =
            params.base_yield_per_hectare * field_size_hectares * weather_impact * soil_impact;
        let confidence = calculate_confidence_score(&weather_factors, &soil_factors);
        let recommendations = generate_yield_recommendations(&weather_factors, &soil_factors, params);

        tracing::debug!(
            crop = %crop_type,
            field_size_hectares,
            weather_impact,
            soil_impact,
            predicted_yield,
            "Crop yield predicted"
        );

        Ok(YieldPrediction {
            crop_type,
            field_size_hectares,
            planting_date: request.planting_date,
            expected_harvest_date,
            predicted_yield_kg: round_to(predicted_yield, 2),
            predicted_yield_per_hectare: round_to(predicted_yield / field_size_hectares, 2),
            confidence_score: round_to(confidence, 2),
            weather_impact_factor: round_to(weather_impact, 2),
            soil_impact_factor: round_to(soil_impact, 2),
            weather_factors,
            soil_factors,
            recommendations,
            analysis_date: Utc::now(),
        })
    }

    pub fn analyze_weather_factors(
        &self,
        weather: &WeatherConditions,
        params: &CropParameters,
    ) -> WeatherFactors {
        let (temp_min, temp_max) = params.optimal_temp_range;
        let (humidity_min, humidity_max) = params.optimal_humidity_range;
        let temperature_suitability =
            range_suitability(weather.temperature_celsius, temp_min, temp_max);

        WeatherFactors {
            average_temperature: weather.temperature_celsius,
            average_humidity: weather.humidity_percent,
            temperature_suitability,
            humidity_suitability: range_suitability(
                weather.humidity_percent,
                humidity_min,
                humidity_max,
            ),
            growing_days: params.growing_days,
            weather_stress_days: (10.0 - temperature_suitability * 10.0).max(0.0),
            rainfall_adequacy: weather
                .rainfall_adequacy
                .unwrap_or(self.config.default_rainfall_adequacy),
        }
    }

    pub fn analyze_soil_factors(
        &self,
        soil: Option<&SoilConditions>,
        params: &CropParameters,
    ) -> SoilFactors {
        let (soil, provenance) = match soil {
            Some(soil) => (soil.clone(), Provenance::Computed),
            None => (SoilConditions::default(), Provenance::Defaulted),
        };
        let (ph_min, ph_max) = params.soil_ph_optimal;

        SoilFactors {
            provenance,
            ph_level: soil.ph_level,
            ph_suitability: range_suitability(soil.ph_level, ph_min, ph_max),
            nitrogen_level: soil.nutrients.nitrogen,
            phosphorus_level: soil.nutrients.phosphorus,
            potassium_level: soil.nutrients.potassium,
            moisture_content: soil.moisture_content,
            soil_fertility_score: soil.nutrients.fertility_score(),
            drainage_quality: soil
                .drainage_quality
                .unwrap_or(self.config.default_drainage_quality),
        }
    }

    /// Yield map across management zones
    pub fn generate_yield_prediction_map(
        &self,
        request: &FieldYieldRequest,
    ) -> AnalyticsResult<FieldYieldMap> {
        validate_season(&request.current_season)?;

        let crop_type = request.crop_type.trim().to_lowercase();
        let zone_predictions = ordered_map(&request.management_zones, |zone| {
            self.predict_zone_yield(
                zone,
                &request.historical_yields,
                &request.current_season,
                &crop_type,
            )
        });

        let field_statistics = calculate_yield_statistics(&zone_predictions);
        let variability_map = create_yield_variability_map(&zone_predictions);
        let risk_assessment = assess_yield_risks(&zone_predictions, &request.current_season);
        let confidence_level =
            self.calculate_prediction_confidence(&request.historical_yields, &request.current_season);

        tracing::debug!(
            crop = %crop_type,
            zones = zone_predictions.len(),
            confidence_level,
            "Yield prediction map created"
        );

        Ok(FieldYieldMap {
            crop_type,
            prediction_date: Utc::now(),
            zone_predictions,
            field_statistics,
            variability_map,
            risk_assessment,
            confidence_level,
            factors_considered: [
                "soil_quality",
                "weather_patterns",
                "management_practices",
                "historical_performance",
                "current_crop_health",
            ]
            .map(String::from)
            .to_vec(),
        })
    }

    pub fn predict_zone_yield(
        &self,
        zone: &ManagementZone,
        history: &[HistoricalYield],
        season: &SeasonConditions,
        crop_type: &str,
    ) -> ZoneYieldPrediction {
        let base_yield = self.knowledge.zone_base_yield(crop_type);
        let weather_impact = season
            .weather_impact
            .unwrap_or(1.0)
            .clamp(WEATHER_IMPACT_BOUNDS.0, WEATHER_IMPACT_BOUNDS.1);

        let characteristic_modifier: f64 = ZONE_YIELD_MODIFIERS
            .iter()
            .filter(|(tag, _)| zone.has(tag))
            .map(|(_, factor)| factor)
            .product();
        let zone_modifier = characteristic_modifier * weather_impact;

        ZoneYieldPrediction {
            zone_id: zone.zone_id.clone(),
            predicted_yield_kg_ha: base_yield * zone_modifier,
            confidence: if history.is_empty() { 0.5 } else { 0.7 },
            yield_factors: ZoneYieldFactors {
                base_yield,
                zone_modifier,
                weather_impact,
            },
            risk_factors: assess_zone_yield_risks(zone, season),
        }
    }

    pub fn calculate_prediction_confidence(
        &self,
        history: &[HistoricalYield],
        season: &SeasonConditions,
    ) -> f64 {
        let history_bonus = match history.len() {
            n if n > 3 => 0.2,
            n if n > 1 => 0.1,
            _ => 0.0,
        };
        let certainty = season
            .weather_certainty
            .unwrap_or(self.config.default_weather_certainty);

        ((0.6 + history_bonus) * certainty).min(MAX_CONFIDENCE)
    }
}

fn calculate_weather_impact(factors: &WeatherFactors, params: &CropParameters) -> f64 {
    let impact = factors.temperature_suitability * params.temp_sensitivity * 0.4
        + factors.humidity_suitability * params.humidity_sensitivity * 0.3
        + factors.rainfall_adequacy * 0.3;
    impact.clamp(WEATHER_IMPACT_BOUNDS.0, WEATHER_IMPACT_BOUNDS.1)
}

fn calculate_soil_impact(factors: &SoilFactors) -> f64 {
    let impact = factors.ph_suitability * 0.3
        + factors.soil_fertility_score * 0.5
        + factors.drainage_quality * 0.2;
    impact.clamp(SOIL_IMPACT_BOUNDS.0, SOIL_IMPACT_BOUNDS.1)
}

fn calculate_confidence_score(weather: &WeatherFactors, soil: &SoilFactors) -> f64 {
    let supporting = [
        weather.temperature_suitability,
        soil.ph_suitability,
        soil.soil_fertility_score,
    ]
    .iter()
    .filter(|&&score| score > 0.8)
    .count();

    (0.7 + 0.1 * supporting as f64).min(MAX_CONFIDENCE)
}

fn generate_yield_recommendations(
    weather: &WeatherFactors,
    soil: &SoilFactors,
    params: &CropParameters,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if weather.temperature_suitability < 0.7 {
        recommendations.push(
            "Consider using shade nets or greenhouse cultivation to optimize temperature"
                .to_string(),
        );
    }
    if weather.humidity_suitability < 0.7 {
        recommendations.push(
            "Implement proper irrigation and mulching to maintain optimal humidity".to_string(),
        );
    }
    if soil.ph_suitability < 0.7 {
        if soil.ph_level < params.soil_ph_optimal.0 {
            recommendations
                .push("Apply lime to increase soil pH for better nutrient availability".to_string());
        } else {
            recommendations.push("Apply sulfur or organic matter to decrease soil pH".to_string());
        }
    }
    if soil.soil_fertility_score < 0.8 {
        recommendations
            .push("Apply balanced fertilizer to improve soil nutrient levels".to_string());
    }

    recommendations.extend(
        [
            "Monitor crop regularly for pests and diseases",
            "Ensure adequate water supply during critical growth stages",
            "Consider crop rotation to maintain soil health",
        ]
        .map(String::from),
    );
    recommendations
}

fn assess_zone_yield_risks(zone: &ManagementZone, season: &SeasonConditions) -> Vec<String> {
    let mut risks = Vec::new();

    if zone.has(&ZoneCharacteristic::PoorDrainage) {
        risks.push("Waterlogging risk in wet conditions".to_string());
    }
    if zone.has(&ZoneCharacteristic::LowOrganicMatter) {
        risks.push("Nutrient deficiency risk".to_string());
    }
    if zone.has(&ZoneCharacteristic::SteepSlope) {
        risks.push("Erosion risk during heavy rainfall".to_string());
    }

    risks.extend(season.weather_risks.iter().cloned());
    risks
}

fn zone_yields(predictions: &[ZoneYieldPrediction]) -> Vec<f64> {
    predictions.iter().map(|p| p.predicted_yield_kg_ha).collect()
}

fn calculate_yield_statistics(predictions: &[ZoneYieldPrediction]) -> Option<YieldStatistics> {
    let yields = zone_yields(predictions);
    let mean = stats::mean(&yields)?;
    let std = stats::std_dev(&yields)?;

    Some(YieldStatistics {
        average_yield_kg_ha: mean,
        min_yield_kg_ha: stats::min(&yields)?,
        max_yield_kg_ha: stats::max(&yields)?,
        yield_variability: std,
        coefficient_of_variation: stats::coefficient_of_variation(&yields)?,
        total_zones: yields.len(),
        high_yield_zones: yields.iter().filter(|&&y| y > mean + std).count(),
        low_yield_zones: yields.iter().filter(|&&y| y < mean - std).count(),
    })
}

fn create_yield_variability_map(predictions: &[ZoneYieldPrediction]) -> Option<VariabilityMap> {
    let yields = zone_yields(predictions);
    let field_mean = stats::mean(&yields)?;
    let field_std = stats::std_dev(&yields)?;

    let zones = predictions
        .iter()
        .map(|p| {
            let deviation = if field_std > 0.0 {
                (p.predicted_yield_kg_ha - field_mean) / field_std
            } else {
                0.0
            };
            VariabilityZone {
                zone_id: p.zone_id.clone(),
                yield_category: YieldCategory::from_deviation(deviation),
                deviation_from_mean: deviation,
                predicted_yield: p.predicted_yield_kg_ha,
            }
        })
        .collect();

    Some(VariabilityMap {
        zones,
        field_mean,
        field_std,
        variability_coefficient: if field_mean > 0.0 {
            field_std / field_mean
        } else {
            0.0
        },
    })
}

fn assess_yield_risks(
    predictions: &[ZoneYieldPrediction],
    season: &SeasonConditions,
) -> RiskAssessment {
    let mut risks = RiskAssessment::default();
    let conditions = &season.weather_conditions;

    if conditions.drought_risk > 0.5 {
        risks
            .weather_risks
            .push("High drought risk may reduce yields".to_string());
    }
    if conditions.excess_moisture > 0.5 {
        risks
            .weather_risks
            .push("Excess moisture may cause disease and reduce yields".to_string());
    }

    let yields = zone_yields(predictions);
    if let (Some(mean), Some(cv)) = (
        stats::mean(&yields),
        stats::coefficient_of_variation(&yields),
    ) {
        if mean > 0.0 && cv > 0.3 {
            risks.management_risks.push(
                "High yield variability indicates management optimization opportunities"
                    .to_string(),
            );
        }
    }

    risks
}

fn validate_season(season: &SeasonConditions) -> AnalyticsResult<()> {
    let check = |field: &str, value: f64| {
        validate_unit_factor(value).map_err(|msg| AnalyticsError::validation(field, msg))
    };

    check("drought_risk", season.weather_conditions.drought_risk)?;
    check("excess_moisture", season.weather_conditions.excess_moisture)?;
    if let Some(certainty) = season.weather_certainty {
        check("weather_certainty", certainty)?;
    }
    if let Some(impact) = season.weather_impact {
        if !impact.is_finite() || impact < 0.0 {
            return Err(AnalyticsError::validation(
                "weather_impact",
                "Weather impact must be a non-negative number",
            ));
        }
    }
    Ok(())
}
