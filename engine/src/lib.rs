//! Field Analytics Engine
//!
//! Turns field geometry, survey and sensor data into management zones,
//! monitoring reports, variable-rate application plans and yield forecasts.

pub mod config;
pub mod error;
pub mod external;
pub mod knowledge;
pub mod parallel;
pub mod services;
pub mod stats;

pub use config::Config;
pub use error::{AnalyticsError, AnalyticsResult, ErrorDetail};
pub use knowledge::KnowledgeBase;
