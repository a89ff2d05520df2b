//! Fixed-length geohash encoding.
//!
//! A geohash here is always 8 symbols (40 bits): 20 bits of longitude
//! interleaved with 20 bits of latitude, longitude first, most significant
//! bit first. Symbols come from the uppercase base32 geohash alphabet,
//! which omits `A`, `I`, `L` and `O`.
//!
//! ```rust
//! use geotrie::geohash::geohash_of;
//!
//! assert_eq!(geohash_of(13.361389, 38.115556).as_str(), "SQC8B49R");
//! ```

use crate::error::{GeoTrieError, Result};
use std::fmt;
use std::str::FromStr;

/// Number of symbols in every geohash.
pub const GEOHASH_LEN: usize = 8;

/// Bisection steps per axis.
pub const AXIS_BITS: u32 = 20;

/// Historical "not a symbol" marker; `decode_symbol` reports it as `None`.
pub const INVALID_SYMBOL: u8 = 32;

/// Size of the alphabet, and so the fan-out of every trie node.
pub const SYMBOL_COUNT: usize = 32;

pub const ALPHABET: &[u8; SYMBOL_COUNT] = b"0123456789BCDEFGHJKMNPQRSTUVWXYZ";

pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

const DECODER: [u8; 128] = build_decoder();

const fn build_decoder() -> [u8; 128] {
    let mut table = [INVALID_SYMBOL; 128];
    let mut i = 0;
    while i < SYMBOL_COUNT {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Maps an alphabet symbol to its index in `[0, 31]`.
///
/// Lowercase letters and the excluded letters `A`, `I`, `L`, `O` are not
/// symbols.
#[inline]
pub fn decode_symbol(symbol: u8) -> Option<u8> {
    match DECODER.get(usize::from(symbol)) {
        Some(&index) if index != INVALID_SYMBOL => Some(index),
        _ => None,
    }
}

/// Returns true iff `geohash` has exactly 8 symbols, all decodable.
pub fn is_valid(geohash: &str) -> bool {
    geohash.len() == GEOHASH_LEN && geohash.bytes().all(|b| decode_symbol(b).is_some())
}

/// Bisects `[low, high)` twenty times, packing the chosen halves MSB first.
///
/// A bit is 1 when the coordinate falls in the upper half (`>= mid`).
/// The coordinate is expected to lie inside the interval; values outside
/// it saturate to all zeros or all ones.
pub fn encode_axis(coordinate: f64, mut low: f64, mut high: f64) -> u32 {
    let mut bits = 0u32;
    for _ in 0..AXIS_BITS {
        let mid = (low + high) / 2.0;
        bits <<= 1;
        if coordinate < mid {
            high = mid;
        } else {
            bits |= 1;
            low = mid;
        }
    }
    bits
}

/// Computes the 8-symbol geohash of a WGS84 coordinate.
///
/// Precondition: `lng` in `[-180, 180]`, `lat` in `[-90, 90]`. Out-of-range
/// input never panics but yields an unspecified cell.
pub fn geohash_of(lng: f64, lat: f64) -> Geohash {
    let lng_bits = encode_axis(lng, MIN_LNG, MAX_LNG);
    let lat_bits = encode_axis(lat, MIN_LAT, MAX_LAT);

    let mut interleaved = 0u64;
    for i in (0..AXIS_BITS).rev() {
        let lng_bit = u64::from((lng_bits >> i) & 1);
        let lat_bit = u64::from((lat_bits >> i) & 1);
        interleaved = (interleaved << 2) | (lng_bit << 1) | lat_bit;
    }

    let mut symbols = [0u8; GEOHASH_LEN];
    for (i, symbol) in symbols.iter_mut().enumerate() {
        let shift = 5 * (GEOHASH_LEN - 1 - i);
        *symbol = ALPHABET[((interleaved >> shift) & 0x1f) as usize];
    }
    Geohash(symbols)
}

/// A valid 8-symbol geohash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Geohash([u8; GEOHASH_LEN]);

impl Geohash {
    pub fn as_str(&self) -> &str {
        let text = std::str::from_utf8(&self.0);
        debug_assert!(text.is_ok(), "geohash holds non-ASCII bytes {:?}", self.0);
        text.unwrap_or_default()
    }

    /// The leading `len` symbols, clamped to the full code.
    pub fn prefix(&self, len: usize) -> &str {
        self.as_str().get(..len.min(GEOHASH_LEN)).unwrap_or_default()
    }

    /// Decoded symbol indices, one per level of the trie.
    pub fn symbols(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().map(|&s| usize::from(DECODER[usize::from(s)]))
    }
}

impl FromStr for Geohash {
    type Err = GeoTrieError;

    fn from_str(s: &str) -> Result<Self> {
        if !is_valid(s) {
            return Err(GeoTrieError::InvalidGeohash(s.to_string()));
        }
        let mut symbols = [0u8; GEOHASH_LEN];
        symbols.copy_from_slice(s.as_bytes());
        Ok(Geohash(symbols))
    }
}

impl AsRef<str> for Geohash {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Geohash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Geohash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Geohash").field(&self.as_str()).finish()
    }
}
