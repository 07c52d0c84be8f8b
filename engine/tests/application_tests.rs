//! Variable-rate application planning integration tests
//!
//! Tests for application plans including:
//! - Zone rate modifiers and justifications
//! - Default base rate for unsupported type/crop pairs
//! - Quantities, costs, equipment tiers and optimization notes

use std::sync::Arc;

use field_analytics_engine::config::PlannerConfig;
use field_analytics_engine::services::{ApplicationPlanner, FieldMappingService};
use field_analytics_engine::{AnalyticsError, KnowledgeBase};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    ApplicationQuantities, ApplicationRateEntry, ApplicationRequest, ApplicationType,
    ElevationSample, FieldBoundary, GpsCoordinates, ManagementZone, Provenance, RateMap,
    SoilSample, ZoneCharacteristic,
};

fn planner() -> ApplicationPlanner {
    ApplicationPlanner::new(Arc::new(KnowledgeBase::default()), PlannerConfig::default())
}

fn strict_planner() -> ApplicationPlanner {
    ApplicationPlanner::new(
        Arc::new(KnowledgeBase::default()),
        PlannerConfig {
            reject_unsupported_application: true,
            ..PlannerConfig::default()
        },
    )
}

fn zone(zone_id: &str, characteristics: Vec<ZoneCharacteristic>) -> ManagementZone {
    ManagementZone {
        zone_id: zone_id.to_string(),
        name: zone_id.to_string(),
        elevation_range: None,
        characteristics,
        recommendations: Vec::new(),
    }
}

/// The four quartile zones of a surveyed field
fn quartile_zones() -> Vec<ManagementZone> {
    let survey: Vec<ElevationSample> = (0..8)
        .map(|i| ElevationSample {
            location: GpsCoordinates::new(41.0 + i as f64 * 0.001, -93.0),
            elevation: 100.0 + i as f64,
        })
        .collect();
    let soil: SoilSample =
        serde_json::from_str(r#"{"location": {"latitude": 41.0, "longitude": -93.0}}"#).unwrap();

    FieldMappingService::new()
        .generate_management_zones(&FieldBoundary::default(), &survey, &[soil])
        .zones
}

fn request(application_type: ApplicationType, crop: &str) -> ApplicationRequest {
    ApplicationRequest {
        field_zones: quartile_zones(),
        application_type,
        crop_type: crop.to_string(),
        field_size_hectares: None,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod rates_tests {
    use super::*;

    /// Drainage adjusts corn fertilizer rates
    #[test]
    fn test_drainage_adjusts_corn_fertilizer_rates() {
        let rate_map = planner()
            .generate_application_rates(&quartile_zones(), &ApplicationType::Fertilizer, "corn")
            .unwrap();

        assert_eq!(rate_map.provenance, Provenance::Computed);
        assert!(!rate_map.default_rate_used);
        assert_eq!(rate_map.base_rate, 150.0);

        let rates = rate_map.rates();
        assert!(approx(rates[0], 165.0));
        assert!(approx(rates[1], 150.0));
        assert!(approx(rates[2], 150.0));
        assert!(approx(rates[3], 120.0));
        assert!(rate_map.entries.iter().all(|e| e.unit == "kg/ha"));

        assert_eq!(
            rate_map.entries[0].justification,
            "Increased rate due to good_drainage, lower_water_retention"
        );
        assert_eq!(rate_map.entries[1].justification, "Standard rate for zone conditions");
        assert_eq!(
            rate_map.entries[3].justification,
            "Reduced rate due to poor_drainage, high_water_retention"
        );
    }

    /// Modifiers compose when zone has both tags
    #[test]
    fn test_modifiers_compose_when_zone_has_both_tags() {
        let zones = vec![zone(
            "mixed",
            vec![ZoneCharacteristic::GoodDrainage, ZoneCharacteristic::PoorDrainage],
        )];

        let rate_map = planner()
            .generate_application_rates(&zones, &ApplicationType::Fertilizer, "corn")
            .unwrap();

        assert!(approx(rate_map.entries[0].application_rate, 132.0));
        assert!(rate_map.entries[0].justification.starts_with("Reduced rate"));
    }

    /// Unsupported pair uses default rate
    #[test]
    fn test_unsupported_pair_uses_default_rate() {
        let lime = ApplicationType::Custom("lime".to_string());
        let rate_map = planner()
            .generate_application_rates(&quartile_zones(), &lime, "corn")
            .unwrap();

        assert_eq!(rate_map.provenance, Provenance::Defaulted);
        assert!(rate_map.default_rate_used);
        assert_eq!(rate_map.base_rate, 100.0);
        assert_eq!(rate_map.entries[0].unit, "units/ha");

        // Known type, crop without a table entry
        let rate_map = planner()
            .generate_application_rates(&quartile_zones(), &ApplicationType::Water, "rice")
            .unwrap();
        assert!(rate_map.default_rate_used);
        assert_eq!(rate_map.entries[0].unit, "mm");
    }

    /// Strict mode rejects unsupported pair
    #[test]
    fn test_strict_mode_rejects_unsupported_pair() {
        let err = strict_planner()
            .generate_application_rates(&quartile_zones(), &ApplicationType::Seed, "rice")
            .unwrap_err();

        assert!(matches!(
            &err,
            AnalyticsError::UnsupportedApplication { application_type, crop }
                if application_type == "seed" && crop == "rice"
        ));
        assert_eq!(err.code(), "UNSUPPORTED_APPLICATION");
        assert_eq!(err.detail().field.as_deref(), Some("type"));
    }
}

#[cfg(test)]
mod plans_tests {
    use super::*;

    /// Corn fertilizer plan
    #[test]
    fn test_corn_fertilizer_plan() {
        let plan = planner()
            .plan_variable_rate_application(&request(ApplicationType::Fertilizer, " Corn "))
            .unwrap();

        assert_eq!(plan.crop, "corn");
        assert_eq!(plan.total_quantities.total_area, 4.0);
        assert!(approx(plan.total_quantities.average_rate, 146.25));
        assert!((plan.total_quantities.total_quantity - 2340.0).abs() < 1e-6);

        assert_eq!(plan.estimated_cost.product_cost, Decimal::from(1170));
        assert_eq!(plan.estimated_cost.application_cost, Decimal::from(100));
        assert_eq!(plan.estimated_cost.total_cost, Decimal::from(1270));
        assert_eq!(plan.estimated_cost.cost_per_hectare, Decimal::new(3175, 1));

        assert_eq!(
            plan.timing.get("side_dress").map(String::as_str),
            Some("V6-V8 growth stage")
        );
        // Four zones fall in the small tier
        assert_eq!(
            plan.equipment.recommended_equipment,
            "Broadcast spreader with GPS guidance"
        );
        assert_eq!(plan.equipment.features_needed.len(), 3);

        // Rate variance 267 triggers a calibration note; 165/120 is below the split ratio
        assert_eq!(
            plan.optimization_notes[0],
            "High rate variability detected - ensure equipment calibration"
        );
        assert_eq!(plan.optimization_notes.len(), 5);
    }

    /// Field size selects equipment tier
    #[test]
    fn test_field_size_selects_equipment_tier() {
        let mut seed = request(ApplicationType::Seed, "corn");
        seed.field_size_hectares = Some(150.0);
        let plan = planner().plan_variable_rate_application(&seed).unwrap();
        assert_eq!(
            plan.equipment.recommended_equipment,
            "Large planter with variable rate seeding"
        );

        let planner = planner();
        assert_eq!(
            planner
                .recommend_equipment(&ApplicationType::Pesticide, 50.0)
                .recommended_equipment,
            "Self-propelled sprayer with boom"
        );
        assert_eq!(
            planner
                .recommend_equipment(&ApplicationType::Water, 50.0)
                .recommended_equipment,
            "Standard equipment"
        );
    }

    /// Unknown timing falls back to agronomist
    #[test]
    fn test_unknown_timing_falls_back_to_agronomist() {
        let timing = planner().get_application_timing(&ApplicationType::Water, "corn");
        assert_eq!(timing.len(), 1);
        assert_eq!(timing["general"], "consult agronomist");

        let wheat = planner().get_application_timing(&ApplicationType::Fertilizer, "wheat");
        assert_eq!(wheat.keys().collect::<Vec<_>>(), vec!["fall", "spring"]);
    }

    /// Empty zone list costs nothing
    #[test]
    fn test_empty_zone_list_costs_nothing() {
        let mut empty = request(ApplicationType::Fertilizer, "corn");
        empty.field_zones.clear();

        let plan = planner().plan_variable_rate_application(&empty).unwrap();

        assert!(plan.rate_map.entries.is_empty());
        assert_eq!(plan.total_quantities.total_quantity, 0.0);
        assert_eq!(plan.estimated_cost.total_cost, Decimal::ZERO);
        assert_eq!(plan.estimated_cost.cost_per_hectare, Decimal::ZERO);
        assert_eq!(plan.optimization_notes.len(), 4);
    }

    /// Non-positive field size is rejected
    #[test]
    fn test_non_positive_field_size_is_rejected() {
        let mut bad = request(ApplicationType::Fertilizer, "corn");
        bad.field_size_hectares = Some(-3.0);

        match planner().plan_variable_rate_application(&bad) {
            Err(AnalyticsError::Validation { field, .. }) => {
                assert_eq!(field, "field_size_hectares")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    /// Request defaults from JSON
    #[test]
    fn test_request_defaults_from_json() {
        let request: ApplicationRequest = serde_json::from_str(r#"{"type": "pesticide"}"#).unwrap();
        assert_eq!(request.application_type, ApplicationType::Pesticide);
        assert_eq!(request.crop_type, "corn");
        assert!(request.field_zones.is_empty());
    }

    /// Custom type and zone tags from JSON
    #[test]
    fn test_custom_type_and_zone_tags_from_json() {
        let request: ApplicationRequest = serde_json::from_str(
            r#"{"type": "lime", "crop_type": "corn", "field_zones": [
                {"zone_id": "a", "name": "A", "characteristics": ["clay_soil"]},
                {"zone_id": "b", "name": "B", "characteristics": ["poor_drainage", "clay_soil"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(request.application_type, ApplicationType::Custom("lime".to_string()));
        assert_eq!(
            request.field_zones[0].characteristics,
            vec![ZoneCharacteristic::Custom("clay_soil".to_string())]
        );

        let plan = planner().plan_variable_rate_application(&request).unwrap();
        assert!(plan.rate_map.default_rate_used);
        assert!(approx(plan.rate_map.entries[0].application_rate, 100.0));
        assert!(approx(plan.rate_map.entries[1].application_rate, 80.0));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "lime");
        assert_eq!(json["field_zones"][1]["characteristics"][1], "clay_soil");
    }
}

#[cfg(test)]
mod notes_tests {
    use super::*;

    fn rate_map(rates: &[f64]) -> RateMap {
        RateMap {
            provenance: Provenance::Computed,
            default_rate_used: false,
            base_rate: 100.0,
            entries: rates
                .iter()
                .enumerate()
                .map(|(i, &rate)| ApplicationRateEntry {
                    zone_id: format!("z{}", i),
                    application_rate: rate,
                    unit: "kg/ha".to_string(),
                    justification: String::new(),
                })
                .collect(),
        }
    }

    const SPLIT: &str = "Consider splitting application into multiple passes";

    /// Wide spread suggests split passes
    #[test]
    fn test_wide_spread_suggests_split_passes() {
        let notes = planner().generate_optimization_notes(&rate_map(&[10.0, 30.0]));
        assert_eq!(notes[0], SPLIT);
        assert_eq!(notes.len(), 5);
    }

    /// Zero minimum with positive maximum suggests split passes
    #[test]
    fn test_zero_minimum_with_positive_maximum_suggests_split_passes() {
        let notes = planner().generate_optimization_notes(&rate_map(&[0.0, 5.0]));
        assert!(notes.contains(&SPLIT.to_string()));

        let notes = planner().generate_optimization_notes(&rate_map(&[0.0, 0.0]));
        assert!(!notes.contains(&SPLIT.to_string()));
    }

    /// Pesticide costs use unit price
    #[test]
    fn test_pesticide_costs_use_unit_price() {
        let quantities = ApplicationQuantities {
            total_area: 2.0,
            average_rate: 2.5,
            total_quantity: 10.0,
        };
        let cost = planner()
            .calculate_application_cost(&quantities, &ApplicationType::Pesticide)
            .unwrap();

        assert_eq!(cost.product_cost, Decimal::from(150));
        assert_eq!(cost.application_cost, Decimal::from(50));
        assert_eq!(cost.cost_per_hectare, Decimal::from(100));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn characteristics_strategy() -> impl Strategy<Value = Vec<ZoneCharacteristic>> {
    prop::collection::vec(
        prop_oneof![
            Just(ZoneCharacteristic::GoodDrainage),
            Just(ZoneCharacteristic::PoorDrainage),
            Just(ZoneCharacteristic::HighOrganicMatter),
            Just(ZoneCharacteristic::SteepSlope),
        ],
        0..4,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every zone rate is the base rate scaled by at most both modifiers
    #[test]
    fn test_prop_rates_within_modifier_bounds(
        tag_sets in prop::collection::vec(characteristics_strategy(), 1..10)
    ) {
        let zones: Vec<ManagementZone> = tag_sets
            .into_iter()
            .enumerate()
            .map(|(i, tags)| zone(&format!("z{}", i), tags))
            .collect();

        let rate_map = planner()
            .generate_application_rates(&zones, &ApplicationType::Fertilizer, "wheat")
            .unwrap();

        prop_assert_eq!(rate_map.entries.len(), zones.len());
        for (entry, zone) in rate_map.entries.iter().zip(&zones) {
            prop_assert_eq!(&entry.zone_id, &zone.zone_id);
            prop_assert!(entry.application_rate >= 120.0 * 0.8 - 1e-9);
            prop_assert!(entry.application_rate <= 120.0 * 1.1 + 1e-9);
        }
    }

    /// Total cost is product plus service cost, rounded to cents
    #[test]
    fn test_prop_total_cost_is_sum_of_parts(
        total_area in 0.0f64..500.0,
        total_quantity in 0.0f64..1_000_000.0
    ) {
        let quantities = ApplicationQuantities {
            total_area,
            average_rate: 0.0,
            total_quantity,
        };
        let cost = planner()
            .calculate_application_cost(&quantities, &ApplicationType::Fertilizer)
            .unwrap();

        let sum = cost.product_cost + cost.application_cost;
        prop_assert!((cost.total_cost - sum).abs() <= Decimal::new(1, 2));
        prop_assert!(cost.total_cost.scale() <= 2);
    }
}
