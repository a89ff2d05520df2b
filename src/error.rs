//! Error types for the geohash trie.
//!
//! Lookups never fail: a malformed geohash or an empty prefix simply finds
//! nothing. Errors are reserved for rejected query parameters and for the
//! checked entry points (parsing, validated insertion, configuration).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoTrieError {
    /// The query diameter is zero or wider than any permitted cell can cover.
    #[error("invalid diameter: {0} m")]
    InvalidDiameter(u64),

    #[error("radius must be greater than zero")]
    InvalidRadius,

    #[error("invalid geohash: {0:?}")]
    InvalidGeohash(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("configuration parse error: {0}")]
    ConfigToml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GeoTrieError>;
