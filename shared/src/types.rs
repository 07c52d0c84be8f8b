//! Common types used across the engine

use serde::{Deserialize, Serialize};

/// GPS coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<(f64, f64)> for GpsCoordinates {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// Whether a result was calculated from the inputs or substituted because
/// the inputs were missing or unsupported
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Computed,
    Defaulted,
}

impl Provenance {
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Provenance::Defaulted)
    }
}

/// Data sufficiency of an analysis.
///
/// Sparse inputs are never errors; they are reported here so callers can
/// re-run once more data arrives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    #[default]
    Ok,
    NoData,
    Limited,
    InsufficientData,
}

impl DataStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, DataStatus::Ok)
    }
}

/// Field size tier used by equipment lookups
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FieldSizeTier {
    Small,
    Medium,
    Large,
}

impl FieldSizeTier {
    /// Small below 20 ha, medium below 100 ha, large otherwise
    pub fn from_hectares(hectares: f64) -> Self {
        if hectares < 20.0 {
            FieldSizeTier::Small
        } else if hectares < 100.0 {
            FieldSizeTier::Medium
        } else {
            FieldSizeTier::Large
        }
    }
}

impl std::fmt::Display for FieldSizeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldSizeTier::Small => write!(f, "small"),
            FieldSizeTier::Medium => write!(f, "medium"),
            FieldSizeTier::Large => write!(f, "large"),
        }
    }
}
