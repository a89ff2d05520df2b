//! Indexed points: a WGS84 coordinate plus an opaque payload.

use crate::geohash::{Geohash, geohash_of};
use crate::spatial::{DistanceMetric, distance_between};

/// Identity of a stored point: the literal (longitude, latitude) pair.
///
/// Compared bitwise, so `0.0` and `-0.0` are different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey {
    lng: u64,
    lat: u64,
}

impl CoordKey {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            lng: lng.to_bits(),
            lat: lat.to_bits(),
        }
    }

    pub fn lng(&self) -> f64 {
        f64::from_bits(self.lng)
    }

    pub fn lat(&self) -> f64 {
        f64::from_bits(self.lat)
    }
}

/// A point stored in the index.
///
/// # Examples
///
/// ```rust
/// use geotrie::Point;
///
/// let pearl = Point::new(121.506377, 31.245105, "Oriental Pearl Tower");
/// assert_eq!(pearl.geohash().as_str(), "WTW3SZYP");
/// assert_eq!(*pearl.value(), "Oriental Pearl Tower");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Point<V> {
    location: geo::Point<f64>,
    value: V,
}

impl<V> Point<V> {
    /// Creates a point. Coordinates are expected in WGS84 degrees.
    pub fn new(lng: f64, lat: f64, value: V) -> Self {
        Self {
            location: geo::Point::new(lng, lat),
            value,
        }
    }

    pub fn lng(&self) -> f64 {
        self.location.x()
    }

    pub fn lat(&self) -> f64 {
        self.location.y()
    }

    pub fn location(&self) -> geo::Point<f64> {
        self.location
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn key(&self) -> CoordKey {
        CoordKey::new(self.lng(), self.lat())
    }

    pub fn geohash(&self) -> Geohash {
        geohash_of(self.lng(), self.lat())
    }

    /// Haversine distance to `other` in whole meters.
    pub fn distance<W>(&self, other: &Point<W>) -> u32 {
        distance_between(self.location, other.location, DistanceMetric::Haversine)
    }
}

impl<V> From<&Point<V>> for geo::Point<f64> {
    fn from(point: &Point<V>) -> Self {
        point.location
    }
}
