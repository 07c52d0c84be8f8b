//! Field mapping integration tests
//!
//! Tests for field geometry and zoning including:
//! - Shoelace area on projected coordinates
//! - Quartile management zones and the uniform fallback
//! - Drainage, soil zone and elevation analysis

use field_analytics_engine::services::{compute_field_area, require_field_area, FieldMappingService};
use field_analytics_engine::AnalyticsError;
use proptest::prelude::*;
use shared::{
    DataStatus, DrainageQuality, ElevationSample, FieldBoundary, FieldMapRequest, GpsCoordinates,
    Provenance, RiskLevel, SoilSample, ZoneCharacteristic,
};

/// A square of roughly 1 km per side at the equator
fn square_km() -> FieldBoundary {
    let d_lat = 1000.0 / 110_540.0;
    let d_lng = 1000.0 / 111_320.0;
    FieldBoundary::from(vec![(0.0, 0.0), (0.0, d_lng), (d_lat, d_lng), (d_lat, 0.0)])
}

fn elevations(values: &[f64]) -> Vec<ElevationSample> {
    values
        .iter()
        .enumerate()
        .map(|(i, &elevation)| ElevationSample {
            location: GpsCoordinates::new(41.0 + i as f64 * 0.0001, -93.0),
            elevation,
        })
        .collect()
}

fn soil_sample(ph: f64, organic_matter: f64, nitrogen: f64) -> SoilSample {
    SoilSample {
        location: GpsCoordinates::new(41.0, -93.0),
        soil_type: "loamy".to_string(),
        ph,
        organic_matter,
        nitrogen,
        phosphorus: 15.0,
        potassium: 150.0,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod area_tests {
    use super::*;

    /// Square kilometre is about one hundred hectares
    #[test]
    fn test_square_kilometre_is_about_one_hundred_hectares() {
        let area = compute_field_area(&square_km());
        assert!((area - 100.0).abs() < 0.1, "area was {}", area);
    }

    /// Fewer than three vertices is zero
    #[test]
    fn test_fewer_than_three_vertices_is_zero() {
        let line = FieldBoundary::from(vec![(0.0, 0.0), (0.0, 0.01)]);
        assert_eq!(compute_field_area(&line), 0.0);
        assert_eq!(compute_field_area(&FieldBoundary::default()), 0.0);
    }

    /// Strict area rejects degenerate boundaries
    #[test]
    fn test_strict_area_rejects_degenerate_boundaries() {
        let line = FieldBoundary::from(vec![(0.0, 0.0), (0.0, 0.01)]);
        assert!(matches!(
            require_field_area(&line),
            Err(AnalyticsError::InvalidGeometry(_))
        ));

        let collinear = FieldBoundary::from(vec![(0.0, 0.0), (0.0, 0.01), (0.0, 0.02)]);
        assert!(matches!(
            require_field_area(&collinear),
            Err(AnalyticsError::InvalidGeometry(_))
        ));

        assert!(require_field_area(&square_km()).is_ok());
    }
}

#[cfg(test)]
mod zoning_tests {
    use super::*;

    /// Quartile zones in fixed order
    #[test]
    fn test_quartile_zones_in_fixed_order() {
        let service = FieldMappingService::new();
        let survey = elevations(&[9.0, 1.0, 5.0, 3.0, 7.0, 2.0, 8.0, 4.0, 6.0]);
        let samples = vec![soil_sample(6.5, 3.0, 20.0)];

        let zone_set = service.generate_management_zones(&square_km(), &survey, &samples);

        assert_eq!(zone_set.provenance, Provenance::Computed);
        let ids: Vec<&str> = zone_set.zones.iter().map(|z| z.zone_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["low_elevation", "medium_low_elevation", "medium_high_elevation", "high_elevation"]
        );
        let ranges: Vec<Option<(f64, f64)>> =
            zone_set.zones.iter().map(|z| z.elevation_range).collect();
        assert_eq!(
            ranges,
            vec![Some((1.0, 3.0)), Some((3.0, 5.0)), Some((5.0, 7.0)), Some((7.0, 9.0))]
        );
        assert!(zone_set.zones[0].has(&ZoneCharacteristic::GoodDrainage));
        assert!(zone_set.zones[3].has(&ZoneCharacteristic::PoorDrainage));
        assert_eq!(
            zone_set.zones[3].recommendations,
            vec!["drainage_improvement", "reduced_irrigation"]
        );
    }

    /// Missing survey yields single uniform zone
    #[test]
    fn test_missing_survey_yields_single_uniform_zone() {
        let service = FieldMappingService::new();
        let samples = vec![soil_sample(6.5, 3.0, 20.0)];

        for (survey, soil) in [
            (Vec::new(), samples.clone()),
            (elevations(&[1.0, 2.0, 3.0]), Vec::new()),
        ] {
            let zone_set = service.generate_management_zones(&square_km(), &survey, &soil);
            assert_eq!(zone_set.provenance, Provenance::Defaulted);
            assert_eq!(zone_set.zones.len(), 1);
            assert_eq!(zone_set.zones[0].zone_id, "uniform");
            assert_eq!(
                zone_set.zones[0].characteristics,
                vec![ZoneCharacteristic::StandardConditions]
            );
            assert!(zone_set.zones[0].elevation_range.is_none());
        }
    }
}

#[cfg(test)]
mod drainage_tests {
    use super::*;

    /// Relief above five metres drains well
    #[test]
    fn test_relief_above_five_metres_drains_well() {
        let service = FieldMappingService::new();
        let survey = elevations(&(0..=10).map(|i| 100.0 + i as f64).collect::<Vec<_>>());

        let report = service.analyze_drainage_patterns(&survey);

        assert_eq!(report.status, DataStatus::Ok);
        assert_eq!(report.drainage_quality, Some(DrainageQuality::Good));
        assert!((report.overall_slope.unwrap() - 10.0 / 11.0).abs() < 1e-9);
        assert_eq!(report.recommendations.len(), 3);

        // p25 = 102.5, p10 = 101
        let low: Vec<(f64, RiskLevel)> = report
            .water_accumulation_areas
            .iter()
            .map(|a| (a.elevation, a.risk_level))
            .collect();
        assert_eq!(
            low,
            vec![(100.0, RiskLevel::High), (101.0, RiskLevel::High), (102.0, RiskLevel::Medium)]
        );

        // p75 = 107.5, p90 = 109
        let steep: Vec<(f64, RiskLevel)> = report
            .erosion_risk_areas
            .iter()
            .map(|a| (a.elevation, a.erosion_risk))
            .collect();
        assert_eq!(
            steep,
            vec![
                (108.0, RiskLevel::Medium),
                (109.0, RiskLevel::High),
                (110.0, RiskLevel::High)
            ]
        );
    }

    /// Flat field drains poorly
    #[test]
    fn test_flat_field_drains_poorly() {
        let service = FieldMappingService::new();
        let report = service.analyze_drainage_patterns(&elevations(&[300.0, 301.0, 302.0]));
        assert_eq!(report.drainage_quality, Some(DrainageQuality::Poor));
    }

    /// No elevation data is reported, not raised
    #[test]
    fn test_no_elevation_data_is_reported_not_raised() {
        let service = FieldMappingService::new();
        let report = service.analyze_drainage_patterns(&[]);
        assert_eq!(report.status, DataStatus::NoData);
        assert!(report.overall_slope.is_none());
        assert!(report.water_accumulation_areas.is_empty());

        let elevation = service.analyze_elevation(&[]);
        assert_eq!(elevation.status, DataStatus::NoData);
    }

    /// Slope classes by distance from mean
    #[test]
    fn test_slope_classes_by_distance_from_mean() {
        let service = FieldMappingService::new();
        // mean 62/6: three samples within 2 m, three within 5 m
        let analysis = service.analyze_elevation(&elevations(&[10.0, 11.0, 7.0, 14.0, 8.0, 12.0]));
        assert_eq!(analysis.status, DataStatus::Ok);
        assert_eq!(analysis.min_elevation, Some(7.0));
        assert_eq!(analysis.max_elevation, Some(14.0));
        let slopes = analysis.slope_analysis;
        assert_eq!(slopes.gentle_slopes, 3);
        assert_eq!(slopes.moderate_slopes, 3);
        assert_eq!(slopes.steep_slopes, 0);
    }
}

#[cfg(test)]
mod soil_tests {
    use super::*;

    /// Soil zone per sample with targeted advice
    #[test]
    fn test_soil_zone_per_sample_with_targeted_advice() {
        let service = FieldMappingService::new();
        let samples = vec![
            soil_sample(5.5, 1.5, 10.0),
            soil_sample(8.0, 3.0, 20.0),
            soil_sample(6.5, 3.0, 20.0),
        ];

        let zones = service.create_soil_zones(&samples);

        assert_eq!(zones.len(), 3);
        assert_eq!(zones[0].zone_id, "soil_zone_1");
        assert_eq!(
            zones[0].recommendations,
            vec![
                "Apply lime to raise pH",
                "Increase organic matter with cover crops or compost",
                "Apply nitrogen fertilizer"
            ]
        );
        assert_eq!(zones[1].recommendations, vec!["Apply sulfur to lower pH"]);
        assert!(zones[2].recommendations.is_empty());
        assert!(service.create_soil_zones(&[]).is_empty());
    }

    /// Sample fields default when omitted
    #[test]
    fn test_sample_fields_default_when_omitted() {
        let sample: SoilSample =
            serde_json::from_str(r#"{"location": {"latitude": 41.0, "longitude": -93.0}}"#)
                .unwrap();
        assert_eq!(sample.soil_type, "loamy");
        assert_eq!(sample.ph, 6.5);
        assert_eq!(sample.organic_matter, 3.0);
        assert_eq!(sample.potassium, 150.0);
    }
}

#[cfg(test)]
mod field_map_tests {
    use super::*;

    /// Full map with acidic soil
    #[test]
    fn test_full_map_with_acidic_soil() {
        let service = FieldMappingService::new();
        let request = FieldMapRequest {
            boundaries: square_km(),
            elevation_data: elevations(&[100.0, 100.5, 101.0, 101.5, 102.0]),
            soil_samples: vec![soil_sample(5.4, 3.0, 20.0), soil_sample(5.8, 3.0, 20.0)],
        };

        let report = service.create_field_map(&request).unwrap();

        assert!((report.field_map.area_hectares - 100.0).abs() < 0.1);
        assert_eq!(report.field_map.management_zones.zones.len(), 4);
        assert_eq!(report.field_map.soil_zones.len(), 2);
        assert_eq!(
            report.field_map.drainage_patterns.drainage_quality,
            Some(DrainageQuality::Poor)
        );
        let recs = &report.recommendations;
        assert!(recs.contains(&"Implement zone-specific management practices".to_string()));
        assert!(recs.contains(&"Install drainage systems in low-lying areas".to_string()));
        assert!(recs.contains(&"Apply lime to increase soil pH".to_string()));
        assert_eq!(recs.last().map(String::as_str), Some("Keep detailed records of all field operations"));
    }

    /// Empty request degrades gracefully
    #[test]
    fn test_empty_request_degrades_gracefully() {
        let service = FieldMappingService::new();
        let report = service.create_field_map(&FieldMapRequest::default()).unwrap();

        assert_eq!(report.field_map.area_hectares, 0.0);
        assert_eq!(report.field_map.management_zones.provenance, Provenance::Defaulted);
        assert_eq!(report.field_map.drainage_patterns.status, DataStatus::NoData);
        // Only the general advice applies
        assert_eq!(report.recommendations.len(), 4);
    }

    /// Out of range coordinates are rejected
    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let service = FieldMappingService::new();
        let request = FieldMapRequest {
            boundaries: FieldBoundary::from(vec![(0.0, 0.0), (0.0, 0.01), (95.0, 0.0)]),
            ..Default::default()
        };

        match service.create_field_map(&request) {
            Err(AnalyticsError::Validation { field, .. }) => assert_eq!(field, "boundaries"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn boundary_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-60.0f64..60.0, -170.0f64..170.0), 3..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Area is never negative and does not depend on the starting vertex
    #[test]
    fn test_prop_area_non_negative_and_rotation_invariant(
        points in boundary_strategy(),
        shift in 0usize..12
    ) {
        let area = compute_field_area(&FieldBoundary::from(points.clone()));
        prop_assert!(area >= 0.0);

        let mut rotated = points.clone();
        let len = rotated.len();
        rotated.rotate_left(shift % len);
        let rotated_area = compute_field_area(&FieldBoundary::from(rotated));
        prop_assert!((area - rotated_area).abs() <= 1e-6 * area + 1e-3);
    }

    /// Zoning is a pure function of its inputs
    #[test]
    fn test_prop_zoning_deterministic(values in prop::collection::vec(0.0f64..500.0, 1..40)) {
        let service = FieldMappingService::new();
        let survey = elevations(&values);
        let samples = vec![soil_sample(6.5, 3.0, 20.0)];

        let first = service.generate_management_zones(&square_km(), &survey, &samples);
        let second = service.generate_management_zones(&square_km(), &survey, &samples);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.zones.len(), 4);

        // Quartile ranges are contiguous and ordered
        for pair in first.zones.windows(2) {
            let (_, upper) = pair[0].elevation_range.unwrap();
            let (lower, _) = pair[1].elevation_range.unwrap();
            prop_assert_eq!(upper, lower);
        }
    }
}
