//! Index configuration.
//!
//! ```rust
//! use geotrie::{DistanceMetric, IndexConfig};
//!
//! let json = r#"{
//!     "distance_metric": "planar",
//!     "coarsest_cell_length": 3
//! }"#;
//! let config = IndexConfig::from_json(json).unwrap();
//! assert_eq!(config.distance_metric, DistanceMetric::Planar);
//! ```

use crate::error::{GeoTrieError, Result};
use crate::geohash::GEOHASH_LEN;
use crate::spatial::DistanceMetric;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Metric for the circle query's exact distance filter.
    #[serde(default)]
    pub distance_metric: DistanceMetric,

    /// Shortest geohash prefix a circle query may probe with (1-8).
    ///
    /// Queries whose diameter would need a coarser cell are rejected. The
    /// bound applies to the diameter only; near the poles a circle may still
    /// scan coarser cells to cover its longitude span.
    #[serde(default = "IndexConfig::default_coarsest_cell_length")]
    pub coarsest_cell_length: usize,
}

impl IndexConfig {
    const fn default_coarsest_cell_length() -> usize {
        1
    }

    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    pub fn with_coarsest_cell_length(mut self, len: usize) -> Self {
        assert!(
            (1..=GEOHASH_LEN).contains(&len),
            "Coarsest cell length must be between 1 and 8"
        );
        self.coarsest_cell_length = len;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=GEOHASH_LEN).contains(&self.coarsest_cell_length) {
            return Err(GeoTrieError::ConfigInvalid {
                key: "coarsest_cell_length".to_string(),
                reason: format!("must be between 1 and 8, got {}", self.coarsest_cell_length),
            });
        }

        if self.distance_metric == DistanceMetric::Planar {
            log::warn!("Planar distance metric selected; circle query results are approximate");
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(input: &str) -> Result<Self> {
        let config: IndexConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            distance_metric: DistanceMetric::default(),
            coarsest_cell_length: Self::default_coarsest_cell_length(),
        }
    }
}
