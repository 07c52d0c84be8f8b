//! Analytics services

pub mod application;
pub mod field_mapping;
pub mod monitoring;
pub mod yield_forecast;

#[cfg(feature = "runtime")]
pub mod analytics;

pub use application::ApplicationPlanner;
pub use field_mapping::{compute_field_area, require_field_area, FieldMappingService};
pub use monitoring::MonitoringService;
pub use yield_forecast::{range_suitability, YieldForecastService};

#[cfg(feature = "runtime")]
pub use analytics::AnalyticsService;
