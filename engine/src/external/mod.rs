//! External data sources

pub mod conditions;

pub use conditions::{ConditionsSource, StaticConditions};
