//! Validation utilities for field analytics inputs

use crate::models::{FieldBoundary, SoilConditions, WeatherConditions};
use crate::types::GpsCoordinates;

// ============================================================================
// Geometry
// ============================================================================

/// Validate latitude and longitude are finite and within WGS84 bounds
pub fn validate_coordinates(point: &GpsCoordinates) -> Result<(), &'static str> {
    if !point.latitude.is_finite() || !point.longitude.is_finite() {
        return Err("Coordinates must be finite numbers");
    }
    if !(-90.0..=90.0).contains(&point.latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&point.longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a boundary can enclose an area
pub fn validate_boundary(boundary: &FieldBoundary) -> Result<(), &'static str> {
    if !boundary.is_polygon() {
        return Err("Field boundary needs at least 3 vertices");
    }
    boundary.vertices().iter().try_for_each(validate_coordinates)
}

/// Validate an explicit field size
pub fn validate_field_size(hectares: f64) -> Result<(), &'static str> {
    if !hectares.is_finite() || hectares <= 0.0 {
        return Err("Field size must be a positive number of hectares");
    }
    Ok(())
}

// ============================================================================
// Readings
// ============================================================================

/// Validate soil pH is on the 0-14 scale
pub fn validate_ph(ph: f64) -> Result<(), &'static str> {
    if !(0.0..=14.0).contains(&ph) {
        return Err("Soil pH must be between 0 and 14");
    }
    Ok(())
}

/// Validate relative humidity percentage
pub fn validate_humidity(humidity: f64) -> Result<(), &'static str> {
    if !(0.0..=100.0).contains(&humidity) {
        return Err("Humidity must be between 0 and 100%");
    }
    Ok(())
}

/// Validate an NDVI reading
pub fn validate_ndvi(value: f64) -> Result<(), &'static str> {
    if !(-1.0..=1.0).contains(&value) {
        return Err("NDVI must be between -1 and 1");
    }
    Ok(())
}

/// Validate a 0-1 factor such as rainfall adequacy or drainage quality
pub fn validate_unit_factor(value: f64) -> Result<(), &'static str> {
    if !(0.0..=1.0).contains(&value) {
        return Err("Factor must be between 0 and 1");
    }
    Ok(())
}

pub fn validate_weather(weather: &WeatherConditions) -> Result<(), &'static str> {
    if !weather.temperature_celsius.is_finite() {
        return Err("Temperature must be a finite number");
    }
    validate_humidity(weather.humidity_percent)?;
    if let Some(adequacy) = weather.rainfall_adequacy {
        validate_unit_factor(adequacy)?;
    }
    Ok(())
}

pub fn validate_soil(soil: &SoilConditions) -> Result<(), &'static str> {
    validate_ph(soil.ph_level)?;
    if !(0.0..=100.0).contains(&soil.moisture_content) {
        return Err("Moisture content must be between 0 and 100%");
    }
    if let Some(drainage) = soil.drainage_quality {
        validate_unit_factor(drainage)?;
    }
    Ok(())
}
