//! Field geometry, management zoning and drainage analysis

use chrono::Utc;
use shared::{
    validate_coordinates, DataStatus, DrainageQuality, DrainageReport, ElevationAnalysis,
    ElevationSample, FieldBoundary, FieldMap, FieldMapReport, FieldMapRequest, GpsCoordinates,
    LowArea, ManagementZone, Provenance, RiskLevel, SlopeAnalysis, SoilNutrientReadings,
    SoilSample, SoilZone, SteepArea, ZoneCharacteristic, ZoneSet,
};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::parallel::ordered_map;
use crate::stats;

/// Meters per degree of longitude at the equator
const METERS_PER_DEGREE_LNG: f64 = 111_320.0;
/// Meters per degree of latitude
const METERS_PER_DEGREE_LAT: f64 = 110_540.0;
const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Elevation range above which a field drains well, meters
const GOOD_DRAINAGE_RELIEF: f64 = 5.0;

/// Field area in hectares from an equirectangular projection and the
/// shoelace formula. Returns 0 for fewer than three vertices.
pub fn compute_field_area(boundary: &FieldBoundary) -> f64 {
    if !boundary.is_polygon() {
        return 0.0;
    }

    let project = |p: &GpsCoordinates| {
        (
            p.longitude * METERS_PER_DEGREE_LNG * p.latitude.to_radians().cos(),
            p.latitude * METERS_PER_DEGREE_LAT,
        )
    };

    let vertices = boundary.vertices();
    let n = vertices.len();
    let twice_area: f64 = (0..n)
        .map(|i| {
            let (x1, y1) = project(&vertices[i]);
            let (x2, y2) = project(&vertices[(i + 1) % n]);
            x1 * y2 - x2 * y1
        })
        .sum();

    twice_area.abs() / 2.0 / SQUARE_METERS_PER_HECTARE
}

/// Field area for callers that cannot work with a degenerate boundary
pub fn require_field_area(boundary: &FieldBoundary) -> AnalyticsResult<f64> {
    if !boundary.is_polygon() {
        return Err(AnalyticsError::InvalidGeometry(format!(
            "boundary has {} vertices, at least 3 are required",
            boundary.len()
        )));
    }
    let area = compute_field_area(boundary);
    if area <= 0.0 {
        return Err(AnalyticsError::InvalidGeometry(
            "boundary encloses no area".to_string(),
        ));
    }
    Ok(area)
}

fn zone(
    zone_id: &str,
    name: &str,
    elevation_range: Option<(f64, f64)>,
    characteristics: Vec<ZoneCharacteristic>,
    recommendations: &[&str],
) -> ManagementZone {
    ManagementZone {
        zone_id: zone_id.to_string(),
        name: name.to_string(),
        elevation_range,
        characteristics,
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
    }
}

fn elevations_of(samples: &[ElevationSample]) -> Vec<f64> {
    samples.iter().map(|s| s.elevation).collect()
}

/// Field mapping service
#[derive(Debug, Clone, Default)]
pub struct FieldMappingService;

impl FieldMappingService {
    pub fn new() -> Self {
        Self
    }

    /// Build the full field map and field-level advice
    pub fn create_field_map(&self, request: &FieldMapRequest) -> AnalyticsResult<FieldMapReport> {
        validate_request(request)?;

        let area_hectares = compute_field_area(&request.boundaries);
        let management_zones = self.generate_management_zones(
            &request.boundaries,
            &request.elevation_data,
            &request.soil_samples,
        );
        let drainage_patterns = self.analyze_drainage_patterns(&request.elevation_data);
        let soil_zones = self.create_soil_zones(&request.soil_samples);
        let elevation_analysis = self.analyze_elevation(&request.elevation_data);

        let recommendations = self.generate_field_recommendations(
            &management_zones.zones,
            &soil_zones,
            &drainage_patterns,
        );

        tracing::debug!(
            area_hectares,
            zones = management_zones.zones.len(),
            soil_zones = soil_zones.len(),
            "Field map created"
        );

        Ok(FieldMapReport {
            field_map: FieldMap {
                boundaries: request.boundaries.clone(),
                area_hectares,
                management_zones,
                soil_zones,
                drainage_patterns,
                elevation_analysis,
                created_at: Utc::now(),
            },
            recommendations,
        })
    }

    /// Four elevation-quartile zones when both elevation and soil data
    /// exist, otherwise one uniform zone tagged as defaulted.
    pub fn generate_management_zones(
        &self,
        _boundary: &FieldBoundary,
        elevations: &[ElevationSample],
        soil_samples: &[SoilSample],
    ) -> ZoneSet {
        let values = elevations_of(elevations);
        let quartiles = if soil_samples.is_empty() {
            None
        } else {
            stats::percentiles(&values, [0.0, 25.0, 50.0, 75.0, 100.0])
        };

        let Some([min, q1, q2, q3, max]) = quartiles else {
            tracing::warn!(
                elevation_points = elevations.len(),
                soil_samples = soil_samples.len(),
                "Insufficient survey data, using a uniform management zone"
            );
            return ZoneSet {
                provenance: Provenance::Defaulted,
                zones: vec![zone(
                    "uniform",
                    "Uniform Management Zone",
                    None,
                    vec![ZoneCharacteristic::StandardConditions],
                    &["standard_practices"],
                )],
            };
        };

        use ZoneCharacteristic::*;
        ZoneSet {
            provenance: Provenance::Computed,
            zones: vec![
                zone(
                    "low_elevation",
                    "Low Elevation Zone",
                    Some((min, q1)),
                    vec![GoodDrainage, LowerWaterRetention],
                    &["increased_irrigation", "nitrogen_management"],
                ),
                zone(
                    "medium_low_elevation",
                    "Medium-Low Elevation Zone",
                    Some((q1, q2)),
                    vec![ModerateDrainage, MediumWaterRetention],
                    &["balanced_fertilization", "standard_practices"],
                ),
                zone(
                    "medium_high_elevation",
                    "Medium-High Elevation Zone",
                    Some((q2, q3)),
                    vec![ModerateDrainage, GoodWaterRetention],
                    &["phosphorus_focus", "erosion_control"],
                ),
                zone(
                    "high_elevation",
                    "High Elevation Zone",
                    Some((q3, max)),
                    vec![PoorDrainage, HighWaterRetention],
                    &["drainage_improvement", "reduced_irrigation"],
                ),
            ],
        }
    }

    pub fn analyze_drainage_patterns(&self, elevations: &[ElevationSample]) -> DrainageReport {
        let values = elevations_of(elevations);
        let (Some(min), Some(max)) = (stats::min(&values), stats::max(&values)) else {
            return DrainageReport::no_data();
        };
        let relief = max - min;

        DrainageReport {
            status: DataStatus::Ok,
            overall_slope: Some(relief / values.len() as f64),
            drainage_quality: Some(if relief > GOOD_DRAINAGE_RELIEF {
                DrainageQuality::Good
            } else {
                DrainageQuality::Poor
            }),
            water_accumulation_areas: self.identify_low_areas(elevations),
            erosion_risk_areas: self.identify_steep_areas(elevations),
            recommendations: vec![
                "Install drainage tiles in low areas".to_string(),
                "Implement contour farming on slopes".to_string(),
                "Consider terracing for steep areas".to_string(),
            ],
        }
    }

    /// Samples in the bottom quartile; high risk in the bottom decile
    pub fn identify_low_areas(&self, elevations: &[ElevationSample]) -> Vec<LowArea> {
        let values = elevations_of(elevations);
        let Some([p10, p25]) = stats::percentiles(&values, [10.0, 25.0]) else {
            return Vec::new();
        };

        elevations
            .iter()
            .filter(|s| s.elevation <= p25)
            .map(|s| LowArea {
                location: s.location,
                elevation: s.elevation,
                risk_level: if s.elevation <= p10 {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                },
            })
            .collect()
    }

    /// Samples in the top quartile; high risk in the top decile
    pub fn identify_steep_areas(&self, elevations: &[ElevationSample]) -> Vec<SteepArea> {
        let values = elevations_of(elevations);
        let Some([p75, p90]) = stats::percentiles(&values, [75.0, 90.0]) else {
            return Vec::new();
        };

        elevations
            .iter()
            .filter(|s| s.elevation >= p75)
            .map(|s| SteepArea {
                location: s.location,
                elevation: s.elevation,
                erosion_risk: if s.elevation >= p90 {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                },
            })
            .collect()
    }

    /// One soil zone per sample, in sample order
    pub fn create_soil_zones(&self, samples: &[SoilSample]) -> Vec<SoilZone> {
        let indexed: Vec<(usize, &SoilSample)> = samples.iter().enumerate().collect();
        ordered_map(&indexed, |(i, sample)| SoilZone {
            zone_id: format!("soil_zone_{}", i + 1),
            location: sample.location,
            soil_type: sample.soil_type.clone(),
            ph_level: sample.ph,
            organic_matter: sample.organic_matter,
            nutrients: SoilNutrientReadings {
                nitrogen: sample.nitrogen,
                phosphorus: sample.phosphorus,
                potassium: sample.potassium,
            },
            recommendations: soil_management_recommendations(sample),
        })
    }

    pub fn analyze_elevation(&self, elevations: &[ElevationSample]) -> ElevationAnalysis {
        let values = elevations_of(elevations);
        let Some(mean) = stats::mean(&values) else {
            return ElevationAnalysis {
                status: DataStatus::NoData,
                min_elevation: None,
                max_elevation: None,
                average_elevation: None,
                elevation_variance: None,
                slope_analysis: SlopeAnalysis::default(),
            };
        };

        let slope_analysis = values.iter().map(|e| (e - mean).abs()).fold(
            SlopeAnalysis::default(),
            |mut acc, deviation| {
                if deviation < 2.0 {
                    acc.gentle_slopes += 1;
                } else if deviation < 5.0 {
                    acc.moderate_slopes += 1;
                } else {
                    acc.steep_slopes += 1;
                }
                acc
            },
        );

        ElevationAnalysis {
            status: DataStatus::Ok,
            min_elevation: stats::min(&values),
            max_elevation: stats::max(&values),
            average_elevation: Some(mean),
            elevation_variance: stats::variance(&values),
            slope_analysis,
        }
    }

    pub fn generate_field_recommendations(
        &self,
        zones: &[ManagementZone],
        soil_zones: &[SoilZone],
        drainage: &DrainageReport,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if zones.len() > 1 {
            recommendations.push("Implement zone-specific management practices".to_string());
            recommendations.push("Use variable rate application for fertilizers".to_string());
        }

        if drainage.drainage_quality == Some(DrainageQuality::Poor) {
            recommendations.push("Install drainage systems in low-lying areas".to_string());
            recommendations.push("Consider raised beds for better drainage".to_string());
        }

        let ph_levels: Vec<f64> = soil_zones.iter().map(|z| z.ph_level).collect();
        if let Some(avg_ph) = stats::mean(&ph_levels) {
            if avg_ph < 6.0 {
                recommendations.push("Apply lime to increase soil pH".to_string());
            } else if avg_ph > 7.5 {
                recommendations.push("Apply sulfur to decrease soil pH".to_string());
            }
        }

        recommendations.extend(
            [
                "Monitor crop health regularly using NDVI imagery",
                "Implement precision irrigation based on soil moisture",
                "Use GPS-guided equipment for accurate applications",
                "Keep detailed records of all field operations",
            ]
            .map(String::from),
        );

        recommendations
    }
}

fn soil_management_recommendations(sample: &SoilSample) -> Vec<String> {
    let mut recommendations = Vec::new();

    if sample.ph < 6.0 {
        recommendations.push("Apply lime to raise pH".to_string());
    } else if sample.ph > 7.5 {
        recommendations.push("Apply sulfur to lower pH".to_string());
    }
    if sample.organic_matter < 2.0 {
        recommendations.push("Increase organic matter with cover crops or compost".to_string());
    }
    if sample.nitrogen < 15.0 {
        recommendations.push("Apply nitrogen fertilizer".to_string());
    }

    recommendations
}

fn validate_request(request: &FieldMapRequest) -> AnalyticsResult<()> {
    let check = |field: &str, point: &GpsCoordinates| {
        validate_coordinates(point).map_err(|msg| AnalyticsError::validation(field, msg))
    };

    for vertex in request.boundaries.vertices() {
        check("boundaries", vertex)?;
    }
    for sample in &request.elevation_data {
        check("elevation_data", &sample.location)?;
    }
    for sample in &request.soil_samples {
        check("soil_samples", &sample.location)?;
    }
    Ok(())
}
