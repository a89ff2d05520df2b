//! Validation for geographic coordinates.

use crate::error::{GeoTrieError, Result};
use crate::geohash::{MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG};

/// Validates a WGS84 coordinate.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use geotrie::validation::validate_coordinate;
///
/// assert!(validate_coordinate(121.506377, 31.245105).is_ok());
/// assert!(validate_coordinate(200.0, 40.0).is_err());
/// assert!(validate_coordinate(-74.0, f64::NAN).is_err());
/// ```
pub fn validate_coordinate(lng: f64, lat: f64) -> Result<()> {
    check_axis("Longitude", lng, MIN_LNG, MAX_LNG)?;
    check_axis("Latitude", lat, MIN_LAT, MAX_LAT)
}

// NaN and infinities fail the range check as well.
fn check_axis(axis: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(GeoTrieError::InvalidInput(format!(
        "{} {} outside [{}, {}]",
        axis, value, min, max
    )))
}
