//! WebAssembly module for the Field Analytics Engine
//!
//! Provides client-side computation for:
//! - Field area and size tiers
//! - Monitoring analysis of scouting data
//! - Variable-rate application plans
//! - Crop and zone yield forecasts
//!
//! Requests and results cross the boundary as JSON strings. Errors are the
//! JSON form of the engine's error detail.

use std::sync::Arc;

use field_analytics_engine::config::{ForecastConfig, PlannerConfig};
use field_analytics_engine::services::{
    self, ApplicationPlanner, FieldMappingService, MonitoringService, YieldForecastService,
};
use field_analytics_engine::{AnalyticsError, AnalyticsResult, KnowledgeBase};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Crop forecast request with the weather it should be evaluated against
#[derive(Debug, Deserialize)]
struct CropForecastInput {
    #[serde(flatten)]
    request: CropYieldRequest,
    weather: WeatherConditions,
}

fn knowledge() -> Arc<KnowledgeBase> {
    Arc::new(KnowledgeBase::default())
}

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn respond<T: Serialize>(result: AnalyticsResult<T>) -> Result<String, JsValue> {
    let value = result.map_err(|err| {
        let detail = serde_json::to_string(&err.detail()).unwrap_or_else(|_| err.to_string());
        JsValue::from_str(&detail)
    })?;
    serde_json::to_string(&value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Surface substituted defaults in the browser console
fn console_warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// Field area in hectares; 0 for fewer than three vertices
#[wasm_bindgen]
pub fn calculate_field_area(boundary_json: &str) -> Result<f64, JsValue> {
    let boundary: FieldBoundary = parse(boundary_json, "boundary")?;
    Ok(services::compute_field_area(&boundary))
}

/// Suitability of a value against an optimal range, in [0, 1]
#[wasm_bindgen]
pub fn range_suitability(value: f64, min: f64, max: f64) -> f64 {
    services::range_suitability(value, min, max)
}

/// Equipment size tier of a field
#[wasm_bindgen]
pub fn field_size_tier(hectares: f64) -> String {
    FieldSizeTier::from_hectares(hectares).to_string()
}

/// Days until the next reading of a monitoring type is due
#[wasm_bindgen]
pub fn monitoring_cadence_days(data_type: &str) -> u32 {
    let data_type: MonitoringType = data_type.parse().unwrap_or_default();
    data_type.cadence_days() as u32
}

/// Supported crops as a JSON array
#[wasm_bindgen]
pub fn supported_crops() -> Result<String, JsValue> {
    respond(Ok(knowledge().supported_crops()))
}

/// Build a field map from boundary, elevation and soil data
#[wasm_bindgen]
pub fn generate_field_map(request_json: &str) -> Result<String, JsValue> {
    let request: FieldMapRequest = parse(request_json, "field map request")?;
    let result = FieldMappingService::new().create_field_map(&request);
    if let Ok(report) = &result {
        if report.field_map.management_zones.provenance.is_defaulted() {
            console_warn("Insufficient survey data, using a uniform management zone");
        }
    }
    respond(result)
}

/// Analyze a monitoring data set
#[wasm_bindgen]
pub fn analyze_monitoring_data(request_json: &str) -> Result<String, JsValue> {
    let request: MonitoringRequest = parse(request_json, "monitoring request")?;
    let result = MonitoringService::new(knowledge()).analyze(&request);
    if let Ok(analysis) = &result {
        if !analysis.status.is_ok() {
            console_warn("Monitoring data is sparse");
        }
    }
    respond(result)
}

/// Plan a variable-rate application
#[wasm_bindgen]
pub fn plan_application(request_json: &str) -> Result<String, JsValue> {
    let request: ApplicationRequest = parse(request_json, "application request")?;
    let result = ApplicationPlanner::new(knowledge(), PlannerConfig::default())
        .plan_variable_rate_application(&request);
    if let Ok(plan) = &result {
        if plan.rate_map.default_rate_used {
            console_warn("No reference rate, using the default base rate");
        }
    }
    respond(result)
}

/// Forecast a crop on one field; the request carries its weather snapshot
#[wasm_bindgen]
pub fn predict_crop_yield(request_json: &str) -> Result<String, JsValue> {
    let input: CropForecastInput = parse(request_json, "crop forecast request")?;
    respond(
        YieldForecastService::new(knowledge(), ForecastConfig::default())
            .predict_crop_yield(&input.request, &input.weather),
    )
}

/// Forecast yields across management zones
#[wasm_bindgen]
pub fn predict_field_yield(request_json: &str) -> Result<String, JsValue> {
    let request: FieldYieldRequest = parse(request_json, "field yield request")?;
    respond(
        YieldForecastService::new(knowledge(), ForecastConfig::default())
            .generate_yield_prediction_map(&request),
    )
}

/// Whether a failed call with this error code may succeed on retry
#[wasm_bindgen]
pub fn is_retryable_error(code: &str) -> bool {
    code == AnalyticsError::ConditionsUnavailable(String::new()).code()
}
