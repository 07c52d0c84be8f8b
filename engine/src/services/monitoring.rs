//! Monitoring data analysis, anomaly detection and spatial patterns

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use shared::{
    validate_coordinates, validate_ndvi, AnalysisResults, AnomalyKind, AnomalyRecord,
    AnomalySeverity, DataStatus, FieldStatistics, GenericAnalysis, Gradient, GradientDirection,
    GrowthStageAnalysis, GrowthUniformity, MonitoringAnalysis, MonitoringDataPoint,
    MonitoringRequest, MonitoringType, NdviAnalysis, NdviDistribution, QualityTier,
    SoilMoistureAnalysis, SpatialPatterns, StressArea, StressLevel, TemperatureAnalysis,
};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::knowledge::KnowledgeBase;
use crate::parallel::ordered_map;
use crate::stats;

/// Below this many readings generic data is flagged as limited
const MIN_GENERIC_POINTS: usize = 10;
/// Spatial gradients need at least this many readings
const MIN_SPATIAL_POINTS: usize = 4;

const DRY_MOISTURE: f64 = 20.0;
const WET_MOISTURE: f64 = 80.0;
const HEAT_STRESS_TEMP: f64 = 35.0;
const COLD_STRESS_TEMP: f64 = 10.0;

fn values_of(points: &[MonitoringDataPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Monitoring analysis service
#[derive(Debug, Clone)]
pub struct MonitoringService {
    knowledge: Arc<KnowledgeBase>,
}

impl MonitoringService {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Analyze one monitoring data set
    pub fn analyze(&self, request: &MonitoringRequest) -> AnalyticsResult<MonitoringAnalysis> {
        for point in &request.data_points {
            validate_coordinates(&point.location)
                .map_err(|msg| AnalyticsError::validation("data_points", msg))?;
            if !point.value.is_finite() {
                return Err(AnalyticsError::validation(
                    "data_points",
                    "Reading values must be finite numbers",
                ));
            }
            if request.data_type == MonitoringType::Ndvi {
                validate_ndvi(point.value)
                    .map_err(|msg| AnalyticsError::validation("data_points", msg))?;
            }
        }

        let points = &request.data_points;
        let data_type = request.data_type;
        let measurement_date = request.measurement_date.unwrap_or_else(Utc::now);

        let analysis_results = self.analyze_by_type(data_type, points);
        let anomalies_detected = self.detect_anomalies(points);
        let recommendations =
            self.generate_monitoring_recommendations(&analysis_results, &anomalies_detected);

        let status = match &analysis_results {
            AnalysisResults::NoData => DataStatus::NoData,
            AnalysisResults::Generic(generic) => generic.data_quality,
            _ => DataStatus::Ok,
        };

        if !status.is_ok() {
            tracing::warn!(
                data_type = %data_type,
                points = points.len(),
                status = ?status,
                "Monitoring data is sparse"
            );
        }
        tracing::debug!(
            data_type = %data_type,
            points = points.len(),
            anomalies = anomalies_detected.len(),
            "Monitoring data analyzed"
        );

        Ok(MonitoringAnalysis {
            data_type,
            status,
            measurement_date,
            analysis_results,
            anomalies_detected,
            field_statistics: self.calculate_field_statistics(points),
            zone_statistics: self.zone_statistics(points),
            spatial_patterns: self.identify_spatial_patterns(points),
            recommendations,
            next_monitoring_date: self.suggest_next_monitoring_date(data_type, measurement_date),
            analyzed_at: Utc::now(),
        })
    }

    pub fn analyze_by_type(
        &self,
        data_type: MonitoringType,
        points: &[MonitoringDataPoint],
    ) -> AnalysisResults {
        if points.is_empty() {
            return AnalysisResults::NoData;
        }
        match data_type {
            MonitoringType::Ndvi => AnalysisResults::Ndvi(self.analyze_ndvi(points)),
            MonitoringType::SoilMoisture => {
                AnalysisResults::SoilMoisture(self.analyze_soil_moisture(points))
            }
            MonitoringType::Temperature => {
                AnalysisResults::Temperature(self.analyze_temperature(points))
            }
            MonitoringType::GrowthStage => {
                AnalysisResults::GrowthStage(self.analyze_growth_stage(points))
            }
            MonitoringType::Generic => AnalysisResults::Generic(self.analyze_generic(points)),
        }
    }

    fn analyze_ndvi(&self, points: &[MonitoringDataPoint]) -> NdviAnalysis {
        let thresholds = self.knowledge.ndvi_thresholds;
        let values = values_of(points);
        let average_ndvi = stats::mean(&values).unwrap_or(0.0);

        let ndvi_distribution =
            values
                .iter()
                .fold(NdviDistribution::default(), |mut dist, &v| {
                    if v < thresholds.poor {
                        dist.poor += 1;
                    } else if v < thresholds.fair {
                        dist.fair += 1;
                    } else if v < thresholds.good {
                        dist.good += 1;
                    } else {
                        dist.excellent += 1;
                    }
                    dist
                });

        let stress_indicators = points
            .iter()
            .filter(|p| p.value < thresholds.poor)
            .map(|p| StressArea {
                location: p.location,
                ndvi_value: p.value,
                stress_level: if p.value < thresholds.severe {
                    StressLevel::Severe
                } else {
                    StressLevel::Moderate
                },
                possible_causes: strings(&["drought", "disease", "nutrient_deficiency", "pest_damage"]),
            })
            .collect();

        NdviAnalysis {
            average_ndvi,
            ndvi_distribution,
            // 0.8 NDVI maps to a perfect score
            field_health_score: (average_ndvi * 125.0).min(100.0),
            stress_indicators,
            growth_uniformity: assess_growth_uniformity(&values),
        }
    }

    fn analyze_soil_moisture(&self, points: &[MonitoringDataPoint]) -> SoilMoistureAnalysis {
        let values = values_of(points);
        let average_moisture = stats::mean(&values).unwrap_or(0.0);
        let dry_areas = values.iter().filter(|&&v| v < DRY_MOISTURE).count();

        let mut irrigation_recommendations = Vec::new();
        if average_moisture < 20.0 {
            irrigation_recommendations.push("Immediate irrigation required".to_string());
            irrigation_recommendations.push("Increase irrigation frequency".to_string());
        } else if average_moisture < 40.0 {
            irrigation_recommendations.push("Schedule irrigation within 2-3 days".to_string());
        } else if average_moisture > 80.0 {
            irrigation_recommendations.push("Reduce irrigation frequency".to_string());
            irrigation_recommendations.push("Check drainage systems".to_string());
        }
        if dry_areas as f64 > values.len() as f64 * 0.3 {
            irrigation_recommendations.push("Consider variable rate irrigation".to_string());
        }

        SoilMoistureAnalysis {
            average_moisture,
            moisture_variability: stats::variance(&values).unwrap_or(0.0),
            dry_areas,
            optimal_areas: values
                .iter()
                .filter(|&&v| (DRY_MOISTURE..=WET_MOISTURE).contains(&v))
                .count(),
            wet_areas: values.iter().filter(|&&v| v > WET_MOISTURE).count(),
            irrigation_recommendations,
        }
    }

    fn analyze_temperature(&self, points: &[MonitoringDataPoint]) -> TemperatureAnalysis {
        let values = values_of(points);
        let average_temperature = stats::mean(&values).unwrap_or(0.0);
        let heat_stress_areas = values.iter().filter(|&&v| v > HEAT_STRESS_TEMP).count();
        let cold_stress_areas = values.iter().filter(|&&v| v < COLD_STRESS_TEMP).count();

        let mut thermal_recommendations = Vec::new();
        if average_temperature > 30.0 {
            thermal_recommendations.push("Monitor for heat stress symptoms".to_string());
            thermal_recommendations.push("Ensure adequate irrigation".to_string());
        }
        if heat_stress_areas > 0 {
            thermal_recommendations.push("Implement heat stress mitigation in hot spots".to_string());
            thermal_recommendations.push("Consider shade structures or cooling systems".to_string());
        }
        if cold_stress_areas > 0 {
            thermal_recommendations
                .push("Monitor for cold stress in low temperature areas".to_string());
            thermal_recommendations.push("Consider frost protection measures".to_string());
        }

        TemperatureAnalysis {
            average_temperature,
            temperature_range: stats::max(&values).unwrap_or(0.0) - stats::min(&values).unwrap_or(0.0),
            heat_stress_areas,
            cold_stress_areas,
            optimal_areas: values.iter().filter(|&&v| (15.0..=30.0).contains(&v)).count(),
            thermal_recommendations,
        }
    }

    fn analyze_growth_stage(&self, points: &[MonitoringDataPoint]) -> GrowthStageAnalysis {
        let values = values_of(points);
        let average = stats::mean(&values).unwrap_or(0.0);
        let spread = stats::std_dev(&values).unwrap_or(0.0);
        let advanced_areas = values.iter().filter(|&&s| s > average + spread).count();
        let delayed_areas = values.iter().filter(|&&s| s < average - spread).count();

        let mut management_recommendations = Vec::new();
        if spread > 1.0 {
            management_recommendations
                .push("Address growth variability with targeted management".to_string());
            management_recommendations.push("Investigate causes of uneven development".to_string());
        }
        if advanced_areas > 0 {
            management_recommendations.push("Monitor advanced areas for early maturity".to_string());
        }
        if delayed_areas > 0 {
            management_recommendations.push("Provide additional support to delayed areas".to_string());
            management_recommendations
                .push("Consider supplemental fertilization in slow-growing zones".to_string());
        }

        GrowthStageAnalysis {
            average_growth_stage: average,
            growth_uniformity: spread,
            advanced_areas,
            delayed_areas,
            management_recommendations,
        }
    }

    fn analyze_generic(&self, points: &[MonitoringDataPoint]) -> GenericAnalysis {
        let values = values_of(points);
        GenericAnalysis {
            average_value: stats::mean(&values).unwrap_or(0.0),
            min_value: stats::min(&values).unwrap_or(0.0),
            max_value: stats::max(&values).unwrap_or(0.0),
            standard_deviation: stats::std_dev(&values).unwrap_or(0.0),
            data_quality: if values.len() < MIN_GENERIC_POINTS {
                DataStatus::Limited
            } else {
                DataStatus::Ok
            },
        }
    }

    /// Readings further than two standard deviations from the mean
    pub fn detect_anomalies(&self, points: &[MonitoringDataPoint]) -> Vec<AnomalyRecord> {
        let values = values_of(points);
        let (Some(mean), Some(std)) = (stats::mean(&values), stats::std_dev(&values)) else {
            return Vec::new();
        };

        ordered_map(points, |point| {
            let deviation = (point.value - mean).abs();
            (deviation > 2.0 * std).then(|| AnomalyRecord {
                location: point.location,
                value: point.value,
                expected_range: (mean - std, mean + std),
                severity: if deviation > 3.0 * std {
                    AnomalySeverity::High
                } else {
                    AnomalySeverity::Medium
                },
                kind: AnomalyKind::Outlier,
            })
        })
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn identify_spatial_patterns(&self, points: &[MonitoringDataPoint]) -> SpatialPatterns {
        if points.len() < MIN_SPATIAL_POINTS {
            return SpatialPatterns::insufficient_data();
        }

        let values = values_of(points);
        let std = stats::std_dev(&values).unwrap_or(0.0);
        let latitudes: Vec<f64> = points.iter().map(|p| p.location.latitude).collect();
        let longitudes: Vec<f64> = points.iter().map(|p| p.location.longitude).collect();
        let mean_lat = stats::mean(&latitudes).unwrap_or(0.0);
        let mean_lng = stats::mean(&longitudes).unwrap_or(0.0);

        let north_south = gradient(
            points,
            |p| p.location.latitude > mean_lat,
            std,
            (GradientDirection::NorthHigher, GradientDirection::SouthHigher),
        );
        let east_west = gradient(
            points,
            |p| p.location.longitude > mean_lng,
            std,
            (GradientDirection::EastHigher, GradientDirection::WestHigher),
        );

        SpatialPatterns {
            status: DataStatus::Ok,
            north_south_gradient: north_south,
            east_west_gradient: east_west,
        }
    }

    pub fn suggest_next_monitoring_date(
        &self,
        data_type: MonitoringType,
        from: DateTime<Utc>,
    ) -> DateTime<Utc> {
        from + Duration::days(data_type.cadence_days())
    }

    pub fn calculate_field_statistics(
        &self,
        points: &[MonitoringDataPoint],
    ) -> Option<FieldStatistics> {
        field_statistics(&values_of(points))
    }

    /// Statistics per zone for readings tagged with a zone id
    pub fn zone_statistics(
        &self,
        points: &[MonitoringDataPoint],
    ) -> BTreeMap<String, FieldStatistics> {
        let mut by_zone: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for point in points {
            if let Some(zone_id) = point.zone_id.as_deref() {
                by_zone.entry(zone_id).or_default().push(point.value);
            }
        }

        let groups: Vec<(&str, Vec<f64>)> = by_zone.into_iter().collect();
        ordered_map(&groups, |(zone_id, values)| {
            field_statistics(values).map(|s| (zone_id.to_string(), s))
        })
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn generate_monitoring_recommendations(
        &self,
        results: &AnalysisResults,
        anomalies: &[AnomalyRecord],
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        match results {
            AnalysisResults::Ndvi(ndvi) => {
                if ndvi.field_health_score < 70.0 {
                    recommendations
                        .push("Field health below optimal - investigate stress factors".to_string());
                }
                if !anomalies.is_empty() {
                    recommendations
                        .push("Address anomalous areas with targeted interventions".to_string());
                }
            }
            AnalysisResults::SoilMoisture(moisture) => {
                if moisture.dry_areas > 0 {
                    recommendations.push("Increase irrigation in dry areas".to_string());
                }
                if moisture.wet_areas > 0 {
                    recommendations.push("Improve drainage in waterlogged areas".to_string());
                }
            }
            AnalysisResults::Temperature(temperature) => {
                if temperature.heat_stress_areas > 0 {
                    recommendations.push("Implement heat stress mitigation strategies".to_string());
                }
            }
            _ => {}
        }

        recommendations.extend(strings(&[
            "Continue regular monitoring for trend analysis",
            "Document any management interventions",
            "Compare with historical data for context",
        ]));
        recommendations
    }
}

fn field_statistics(values: &[f64]) -> Option<FieldStatistics> {
    let mean = stats::mean(values)?;
    let min = stats::min(values)?;
    let max = stats::max(values)?;
    Some(FieldStatistics {
        count: values.len(),
        mean,
        median: stats::median(values)?,
        std_dev: stats::std_dev(values)?,
        min,
        max,
        range: max - min,
        coefficient_of_variation: stats::coefficient_of_variation(values)?,
    })
}

fn assess_growth_uniformity(values: &[f64]) -> GrowthUniformity {
    let mean = stats::mean(values).unwrap_or(0.0);
    let std = stats::std_dev(values).unwrap_or(0.0);
    let cv = if mean > 0.0 { std / mean } else { 0.0 };
    let uniformity_score = (100.0 - cv * 100.0).max(0.0);
    let assessment = QualityTier::from_score(uniformity_score);

    let recommendations = match assessment {
        QualityTier::Excellent => {
            strings(&["Maintain current management practices", "Continue monitoring"])
        }
        QualityTier::Good => strings(&[
            "Minor adjustments to management zones",
            "Monitor variable areas closely",
        ]),
        QualityTier::Fair => strings(&[
            "Implement variable rate applications",
            "Investigate causes of variability",
        ]),
        QualityTier::Poor => strings(&[
            "Major management zone revision needed",
            "Detailed soil and plant tissue testing",
            "Consider field renovation",
        ]),
    };

    GrowthUniformity {
        uniformity_score,
        coefficient_of_variation: cv,
        assessment,
        recommendations,
    }
}

/// Compare the mean of readings on either side of a split; detected when
/// the difference exceeds the field standard deviation
fn gradient(
    points: &[MonitoringDataPoint],
    is_first_side: impl Fn(&MonitoringDataPoint) -> bool,
    std: f64,
    (first_higher, second_higher): (GradientDirection, GradientDirection),
) -> Option<Gradient> {
    let (first, second): (Vec<&MonitoringDataPoint>, Vec<&MonitoringDataPoint>) =
        points.iter().partition(|p| is_first_side(p));
    let first_mean = stats::mean(&first.iter().map(|p| p.value).collect::<Vec<_>>())?;
    let second_mean = stats::mean(&second.iter().map(|p| p.value).collect::<Vec<_>>())?;

    let magnitude = (first_mean - second_mean).abs();
    (magnitude > std).then_some(Gradient {
        detected: true,
        direction: if first_mean > second_mean {
            first_higher
        } else {
            second_higher
        },
        magnitude,
    })
}
