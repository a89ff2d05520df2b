//! Distance calculations used by the circle query's fine filter.

use geo::{Distance, Euclidean, Geodesic, HaversineMeasure, Point};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Rough meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_000.0;

const EARTH_SPHERE: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS);

/// Distance metrics for the circle query.
///
/// - **Haversine**: great-circle distance on a sphere. The default.
/// - **Planar**: Euclidean distance over degree deltas scaled by
///   [`METERS_PER_DEGREE`]. Cheaper, but it ignores the shrinking of a
///   longitude degree away from the equator, so it overestimates east-west
///   distances (by roughly `1 / cos(lat)`) and results near the radius edge
///   are no longer exact.
/// - **Geodesic**: ellipsoidal distance (Karney 2013) via the `geo` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Haversine,
    Planar,
    Geodesic,
}

/// Great-circle distance between two lon/lat points, in meters.
///
/// ```rust
/// use geo::Point;
/// use geotrie::spatial::haversine;
///
/// let d = haversine(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
/// assert_eq!(d as u32, 157_249);
/// ```
pub fn haversine(a: Point, b: Point) -> f64 {
    EARTH_SPHERE.distance(a, b)
}

/// Planar approximation in meters; see [`DistanceMetric::Planar`].
pub fn planar(a: Point, b: Point) -> f64 {
    Euclidean.distance(a * METERS_PER_DEGREE, b * METERS_PER_DEGREE)
}

/// Distance in whole meters (truncated) under the given metric.
pub fn distance_between(a: Point, b: Point, metric: DistanceMetric) -> u32 {
    let meters = match metric {
        DistanceMetric::Haversine => haversine(a, b),
        DistanceMetric::Planar => planar(a, b),
        DistanceMetric::Geodesic => Geodesic.distance(a, b),
    };
    // `as` saturates, so NaN maps to 0 and huge values to u32::MAX.
    meters as u32
}
