//! The set of points sharing one geohash cell.

use crate::geohash::Geohash;
use crate::point::{CoordKey, Point};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Points stored at one trie leaf, deduplicated by coordinate.
///
/// Every point in a box hashes to the box's geohash. Cloning is cheap: the
/// points themselves are shared.
#[derive(Debug, PartialEq)]
pub struct GeoBox<V> {
    geohash: Geohash,
    points: FxHashMap<CoordKey, Arc<Point<V>>>,
}

impl<V> GeoBox<V> {
    pub(crate) fn new(geohash: Geohash) -> Self {
        Self {
            geohash,
            points: FxHashMap::default(),
        }
    }

    /// Adds a point, replacing (and returning) any point at the same coordinate.
    pub(crate) fn insert(&mut self, point: Point<V>) -> Option<Arc<Point<V>>> {
        debug_assert_eq!(point.geohash(), self.geohash);
        self.points.insert(point.key(), Arc::new(point))
    }

    pub fn geohash(&self) -> Geohash {
        self.geohash
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, key: &CoordKey) -> bool {
        self.points.contains_key(key)
    }

    pub fn get(&self, key: &CoordKey) -> Option<&Arc<Point<V>>> {
        self.points.get(key)
    }

    /// Iterates the points in no particular order.
    pub fn points(&self) -> impl Iterator<Item = &Arc<Point<V>>> {
        self.points.values()
    }

    pub fn all_points(&self) -> Vec<Arc<Point<V>>> {
        self.points.values().cloned().collect()
    }
}

impl<V> Clone for GeoBox<V> {
    fn clone(&self) -> Self {
        Self {
            geohash: self.geohash,
            points: self.points.clone(),
        }
    }
}
