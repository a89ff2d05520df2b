//! Embedded geospatial index: a geohash prefix trie with radius search.
//!
//! ```rust
//! use geotrie::{GeohashTrie, Point};
//!
//! let trie = GeohashTrie::new();
//! trie.put(Point::new(121.506377, 31.245105, "Oriental Pearl Tower"));
//! trie.put(Point::new(121.4871639, 31.2388556, "Peace Hotel"));
//!
//! // Exact cell and prefix lookups
//! assert!(trie.get("WTW3SZYP").is_some());
//! assert_eq!(trie.get_by_prefix("WTW3S").len(), 2);
//!
//! // Everything within 1 km of the Peace Hotel
//! let nearby = trie.get_points_by_circle((121.4871639, 31.2388556), 1_000)?;
//! assert_eq!(nearby.len(), 1);
//! # Ok::<(), geotrie::GeoTrieError>(())
//! ```

pub mod config;
pub mod error;
pub mod geobox;
pub mod geohash;
pub mod point;
pub mod search;
pub mod spatial;
pub mod trie;
pub mod validation;

pub use config::IndexConfig;
pub use error::{GeoTrieError, Result};
pub use geobox::GeoBox;
pub use crate::geohash::{Geohash, geohash_of};
pub use point::{CoordKey, Point};
pub use spatial::{DistanceMetric, distance_between};
pub use trie::{GeohashTrie, TrieStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{
        DistanceMetric, GeoBox, GeoTrieError, Geohash, GeohashTrie, IndexConfig, Point, Result,
    };
}
