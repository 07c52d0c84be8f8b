//! Variable-rate application planning

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use shared::{
    validate_field_size, ApplicationCost, ApplicationPlan, ApplicationQuantities,
    ApplicationRateEntry, ApplicationRequest, ApplicationType, EquipmentRecommendation,
    FieldSizeTier, ManagementZone, Provenance, RateMap, ZoneCharacteristic,
};

use crate::config::PlannerConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::knowledge::KnowledgeBase;
use crate::parallel::ordered_map;
use crate::stats;

/// Rate modifiers in application order; each applies at most once
const RATE_MODIFIERS: [(ZoneCharacteristic, f64); 2] = [
    (ZoneCharacteristic::PoorDrainage, 0.8),
    (ZoneCharacteristic::GoodDrainage, 1.1),
];

const RATE_VARIANCE_LIMIT: f64 = 100.0;
const RATE_SPREAD_LIMIT: f64 = 2.0;

/// Variable-rate application planner
#[derive(Debug, Clone)]
pub struct ApplicationPlanner {
    knowledge: Arc<KnowledgeBase>,
    config: PlannerConfig,
}

impl ApplicationPlanner {
    pub fn new(knowledge: Arc<KnowledgeBase>, config: PlannerConfig) -> Self {
        Self { knowledge, config }
    }

    pub fn plan_variable_rate_application(
        &self,
        request: &ApplicationRequest,
    ) -> AnalyticsResult<ApplicationPlan> {
        if let Some(size) = request.field_size_hectares {
            validate_field_size(size)
                .map_err(|msg| AnalyticsError::validation("field_size_hectares", msg))?;
        }

        let crop = request.crop_type.trim().to_lowercase();
        let application_type = &request.application_type;

        let rate_map = self.generate_application_rates(&request.field_zones, application_type, &crop)?;
        let total_quantities = self.calculate_application_quantities(&rate_map);
        let timing = self.get_application_timing(application_type, &crop);
        let equipment = self.recommend_equipment(
            application_type,
            request.field_size_hectares.unwrap_or(total_quantities.total_area),
        );
        let estimated_cost = self.calculate_application_cost(&total_quantities, application_type)?;
        let optimization_notes = self.generate_optimization_notes(&rate_map);

        tracing::debug!(
            application_type = %application_type,
            crop = %crop,
            zones = rate_map.entries.len(),
            total_cost = %estimated_cost.total_cost,
            "Application plan created"
        );

        Ok(ApplicationPlan {
            application_type: application_type.clone(),
            crop,
            rate_map,
            total_quantities,
            timing,
            equipment,
            estimated_cost,
            optimization_notes,
            created_at: Utc::now(),
        })
    }

    /// Per-zone rates scaled from the reference base rate
    pub fn generate_application_rates(
        &self,
        zones: &[ManagementZone],
        application_type: &ApplicationType,
        crop: &str,
    ) -> AnalyticsResult<RateMap> {
        let (base_rate, provenance) = match self.knowledge.base_rate(application_type, crop) {
            Some(rate) => (rate, Provenance::Computed),
            None if self.config.reject_unsupported_application => {
                return Err(AnalyticsError::UnsupportedApplication {
                    application_type: application_type.to_string(),
                    crop: crop.to_string(),
                });
            }
            None => {
                tracing::warn!(
                    application_type = %application_type,
                    crop = %crop,
                    default_rate = self.config.default_base_rate,
                    "No reference rate, using the default base rate"
                );
                (self.config.default_base_rate, Provenance::Defaulted)
            }
        };

        let unit = self.knowledge.unit(application_type).to_string();
        let entries = ordered_map(zones, |zone| {
            let modifier = zone_rate_modifier(zone);
            ApplicationRateEntry {
                zone_id: zone.zone_id.clone(),
                application_rate: base_rate * modifier,
                unit: unit.clone(),
                justification: rate_justification(zone, modifier),
            }
        });

        Ok(RateMap {
            provenance,
            default_rate_used: provenance.is_defaulted(),
            base_rate,
            entries,
        })
    }

    pub fn calculate_application_quantities(&self, rate_map: &RateMap) -> ApplicationQuantities {
        let rates = rate_map.rates();
        let total_rate: f64 = rates.iter().sum();
        let total_area = rates.len() as f64;

        ApplicationQuantities {
            total_area,
            average_rate: stats::mean(&rates).unwrap_or(0.0),
            total_quantity: total_rate * total_area,
        }
    }

    pub fn get_application_timing(
        &self,
        application_type: &ApplicationType,
        crop: &str,
    ) -> BTreeMap<String, String> {
        self.knowledge.timing(application_type, crop)
    }

    pub fn recommend_equipment(
        &self,
        application_type: &ApplicationType,
        field_size_hectares: f64,
    ) -> EquipmentRecommendation {
        let tier = FieldSizeTier::from_hectares(field_size_hectares);
        EquipmentRecommendation {
            recommended_equipment: self.knowledge.equipment(application_type, tier).to_string(),
            features_needed: vec![
                "GPS guidance".to_string(),
                "variable rate capability".to_string(),
                "application mapping".to_string(),
            ],
            calibration_notes: "Calibrate equipment before each use for accuracy".to_string(),
        }
    }

    pub fn calculate_application_cost(
        &self,
        quantities: &ApplicationQuantities,
        application_type: &ApplicationType,
    ) -> AnalyticsResult<ApplicationCost> {
        let unit_cost = self.knowledge.unit_cost(application_type);
        let product_cost = quantities.total_quantity * unit_cost;
        let application_cost = quantities.total_area * self.config.service_fee_per_hectare;
        let total_cost = product_cost + application_cost;

        Ok(ApplicationCost {
            product_cost: to_money(product_cost)?,
            application_cost: to_money(application_cost)?,
            total_cost: to_money(total_cost)?,
            cost_per_hectare: to_money(total_cost / quantities.total_area.max(1.0))?,
        })
    }

    pub fn generate_optimization_notes(&self, rate_map: &RateMap) -> Vec<String> {
        let mut notes = Vec::new();
        let rates = rate_map.rates();

        if let (Some(variance), Some(min), Some(max)) =
            (stats::variance(&rates), stats::min(&rates), stats::max(&rates))
        {
            if variance > RATE_VARIANCE_LIMIT {
                notes.push("High rate variability detected - ensure equipment calibration".to_string());
            }
            let wide_spread = if min > 0.0 {
                max / min > RATE_SPREAD_LIMIT
            } else {
                max > 0.0
            };
            if wide_spread {
                notes.push("Consider splitting application into multiple passes".to_string());
            }
        }

        notes.extend(
            [
                "Monitor weather conditions before application",
                "Ensure proper equipment calibration",
                "Document actual application rates for future reference",
                "Consider soil moisture conditions before application",
            ]
            .map(String::from),
        );
        notes
    }
}

fn zone_rate_modifier(zone: &ManagementZone) -> f64 {
    RATE_MODIFIERS
        .iter()
        .filter(|(tag, _)| zone.has(tag))
        .map(|(_, factor)| factor)
        .product()
}

fn rate_justification(zone: &ManagementZone, modifier: f64) -> String {
    let tags = || {
        zone.characteristics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    if modifier > 1.0 {
        format!("Increased rate due to {}", tags())
    } else if modifier < 1.0 {
        format!("Reduced rate due to {}", tags())
    } else {
        "Standard rate for zone conditions".to_string()
    }
}

fn to_money(amount: f64) -> AnalyticsResult<Decimal> {
    Decimal::try_from(amount)
        .map(|d| d.round_dp(2))
        .map_err(|e| AnalyticsError::Internal(format!("cost {} out of range: {}", amount, e)))
}
