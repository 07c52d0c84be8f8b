//! Async facade over the analytics services
//!
//! Snapshots are fetched through a [`ConditionsSource`], then the CPU-bound
//! computation runs on tokio's blocking pool. Dropping a returned future
//! discards the result; services hold no mutable state, so nothing is left
//! half-written.

use std::sync::Arc;

use shared::{
    ApplicationPlan, ApplicationRequest, CropSummary, CropYieldRequest, FieldMapReport,
    FieldMapRequest, FieldYieldMap, FieldYieldRequest, MonitoringAnalysis, MonitoringRequest,
    YieldPrediction,
};

use super::{ApplicationPlanner, FieldMappingService, MonitoringService, YieldForecastService};
use crate::config::Config;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::external::ConditionsSource;
use crate::knowledge::KnowledgeBase;

/// Entry point bundling every analytics service
pub struct AnalyticsService<S> {
    field_mapping: Arc<FieldMappingService>,
    monitoring: Arc<MonitoringService>,
    planner: Arc<ApplicationPlanner>,
    forecaster: Arc<YieldForecastService>,
    conditions: S,
}

impl<S: ConditionsSource> AnalyticsService<S> {
    pub fn new(config: &Config, knowledge: Arc<KnowledgeBase>, conditions: S) -> Self {
        Self {
            field_mapping: Arc::new(FieldMappingService::new()),
            monitoring: Arc::new(MonitoringService::new(knowledge.clone())),
            planner: Arc::new(ApplicationPlanner::new(
                knowledge.clone(),
                config.planner.clone(),
            )),
            forecaster: Arc::new(YieldForecastService::new(knowledge, config.forecast.clone())),
            conditions,
        }
    }

    /// Build from configuration, loading the configured reference tables
    pub fn from_config(config: &Config, conditions: S) -> AnalyticsResult<Self> {
        let knowledge = Arc::new(config.knowledge_base()?);
        Ok(Self::new(config, knowledge, conditions))
    }

    pub async fn create_field_map(&self, request: FieldMapRequest) -> AnalyticsResult<FieldMapReport> {
        tracing::info!(vertices = request.boundaries.len(), "Creating field map");
        let service = self.field_mapping.clone();
        run_blocking(move || service.create_field_map(&request)).await
    }

    pub async fn analyze_monitoring(
        &self,
        request: MonitoringRequest,
    ) -> AnalyticsResult<MonitoringAnalysis> {
        tracing::info!(
            data_type = %request.data_type,
            points = request.data_points.len(),
            "Analyzing monitoring data"
        );
        let service = self.monitoring.clone();
        run_blocking(move || service.analyze(&request)).await
    }

    pub async fn plan_application(
        &self,
        request: ApplicationRequest,
    ) -> AnalyticsResult<ApplicationPlan> {
        tracing::info!(
            application_type = %request.application_type,
            zones = request.field_zones.len(),
            "Planning variable-rate application"
        );
        let service = self.planner.clone();
        run_blocking(move || service.plan_variable_rate_application(&request)).await
    }

    /// Fetch the weather (and soil, when the request has none) and forecast
    pub async fn forecast_crop_yield(
        &self,
        mut request: CropYieldRequest,
    ) -> AnalyticsResult<YieldPrediction> {
        tracing::info!(crop = %request.crop_type, "Forecasting crop yield");

        let weather = self.conditions.current_weather(request.location).await?;
        if request.soil_data.is_none() {
            request.soil_data = self.conditions.soil_conditions(request.location).await?;
        }

        let service = self.forecaster.clone();
        run_blocking(move || service.predict_crop_yield(&request, &weather)).await
    }

    pub async fn forecast_field_yield(
        &self,
        request: FieldYieldRequest,
    ) -> AnalyticsResult<FieldYieldMap> {
        tracing::info!(
            crop = %request.crop_type,
            zones = request.management_zones.len(),
            "Forecasting field yield map"
        );
        let service = self.forecaster.clone();
        run_blocking(move || service.generate_yield_prediction_map(&request)).await
    }

    pub fn supported_crops(&self) -> Vec<CropSummary> {
        self.forecaster.supported_crops()
    }
}

async fn run_blocking<T, F>(task: F) -> AnalyticsResult<T>
where
    F: FnOnce() -> AnalyticsResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        if e.is_cancelled() {
            AnalyticsError::Cancelled
        } else {
            AnalyticsError::Internal(format!("analysis worker failed: {}", e))
        }
    })?
}
