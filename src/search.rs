//! Radius (circle) search over the geohash trie.
//!
//! A query runs in two phases. The coarse phase picks the longest geohash
//! prefix whose cells are still wide enough to cover the query diameter,
//! then probes the 3×3 grid of cells around the circle's circumscribed
//! square. Any cell the circle can touch contains one of the nine probes.
//! The fine phase keeps only points whose true distance to the center is
//! within the radius.
//!
//! The north-south probe offset is `radius / METERS_PER_DEGREE` degrees.
//! The east-west offset is the circle's true longitude half-width at the
//! center's latitude, which grows as a longitude degree shrinks toward the
//! poles. When that half-width outgrows the chosen cell's width the query
//! falls back to coarser cells; a circle enclosing a pole scans every box.
//! Probes wrap around at ±180° longitude.

use crate::error::{GeoTrieError, Result};
use crate::geobox::GeoBox;
use crate::geohash::{GEOHASH_LEN, MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG, geohash_of};
use crate::point::Point;
use crate::spatial::{METERS_PER_DEGREE, distance_between};
use crate::trie::GeohashTrie;
use crate::validation::validate_coordinate;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Worst-case inscribed-circle diameter, in meters, of a cell for each
/// geohash length (index 0 is a 1-symbol cell).
pub const INCIRCLE_DIAMETERS: [u32; GEOHASH_LEN] =
    [4_992_600, 624_100, 156_000, 19_500, 4_900, 609, 152, 19];

/// Longest geohash length whose cells still cover a circle of `diameter`
/// meters.
///
/// # Errors
///
/// [`GeoTrieError::InvalidDiameter`] if the diameter is zero or wider than a
/// 1-symbol cell.
///
/// ```rust
/// use geotrie::search::required_cell_length;
///
/// assert_eq!(required_cell_length(10).unwrap(), 8);
/// assert_eq!(required_cell_length(10_000).unwrap(), 4);
/// assert!(required_cell_length(10_000_000).is_err());
/// ```
pub fn required_cell_length(diameter: u64) -> Result<usize> {
    if diameter == 0 || diameter > u64::from(INCIRCLE_DIAMETERS[0]) {
        return Err(GeoTrieError::InvalidDiameter(diameter));
    }
    INCIRCLE_DIAMETERS
        .iter()
        .rposition(|&d| u64::from(d) >= diameter)
        .map(|index| index + 1)
        .ok_or(GeoTrieError::InvalidDiameter(diameter))
}

fn wrap(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        value + (max - min)
    } else if value > max {
        value - (max - min)
    } else {
        value
    }
}

/// Longitude and latitude half-widths, in degrees, of the box bounding a
/// circle of `radius` meters around a point at latitude `lat`.
///
/// The longitude half-width is 180° once the circle reaches a pole.
fn bounding_offsets(lat: f64, radius: u32) -> (f64, f64) {
    let lat_offset = f64::from(radius) / METERS_PER_DEGREE;
    let ratio = lat_offset.to_radians().sin() / lat.to_radians().cos();
    let lng_offset = if ratio.is_finite() && ratio < 1.0 {
        ratio.asin().to_degrees()
    } else {
        MAX_LNG
    };
    (lng_offset, lat_offset)
}

/// Width and height, in degrees, of a geohash cell of `len` symbols.
fn cell_span(len: usize) -> (f64, f64) {
    let bits = 5 * len as i32;
    let lng_bits = (bits + 1) / 2;
    let lat_bits = bits / 2;
    (
        (MAX_LNG - MIN_LNG) / 2f64.powi(lng_bits),
        (MAX_LAT - MIN_LAT) / 2f64.powi(lat_bits),
    )
}

/// Longest cell length, at most `len`, whose cells are at least as wide and
/// tall as the probe offsets. Zero means no cell is large enough.
fn covering_cell_length(mut len: usize, (lng_offset, lat_offset): (f64, f64)) -> usize {
    while len > 0 {
        let (width, height) = cell_span(len);
        if lng_offset <= width && lat_offset <= height {
            break;
        }
        len -= 1;
    }
    len
}

/// The center, edge midpoints and corners of the lon/lat box bounding a
/// circle, row by row from the north-west corner:
/// NW, N, NE, W, C, E, SW, S, SE.
pub fn circumscribed_square_probes(center: geo::Point<f64>, radius: u32) -> [geo::Point<f64>; 9] {
    let (lng, lat) = (center.x(), center.y());
    let (lng_offset, lat_offset) = bounding_offsets(lat, radius);

    let west = wrap(lng - lng_offset, MIN_LNG, MAX_LNG);
    let east = wrap(lng + lng_offset, MIN_LNG, MAX_LNG);
    let south = wrap(lat - lat_offset, MIN_LAT, MAX_LAT);
    let north = wrap(lat + lat_offset, MIN_LAT, MAX_LAT);

    [
        geo::Point::new(west, north),
        geo::Point::new(lng, north),
        geo::Point::new(east, north),
        geo::Point::new(west, lat),
        geo::Point::new(lng, lat),
        geo::Point::new(east, lat),
        geo::Point::new(west, south),
        geo::Point::new(lng, south),
        geo::Point::new(east, south),
    ]
}

impl<V> GeohashTrie<V> {
    /// Returns every stored point within `radius` meters of `center`.
    ///
    /// Distance is measured with the configured metric (haversine by
    /// default). The whole query runs under one read lock, so all nine
    /// probes see the same snapshot. Each point appears at most once; order
    /// is unspecified.
    ///
    /// # Errors
    ///
    /// - [`GeoTrieError::InvalidRadius`] for a zero radius
    /// - [`GeoTrieError::InvalidInput`] for a non-finite or out-of-range center
    /// - [`GeoTrieError::InvalidDiameter`] when the circle is too wide for the
    ///   coarsest permitted cell
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geotrie::{GeohashTrie, Point};
    ///
    /// let trie = GeohashTrie::new();
    /// trie.put(Point::new(121.506377, 31.245105, "Oriental Pearl Tower"));
    /// trie.put(Point::new(13.361389, 38.115556, "Palermo"));
    ///
    /// let near = trie.get_points_by_circle((121.4871639, 31.2388556), 10_000)?;
    /// assert_eq!(near.len(), 1);
    /// assert_eq!(*near[0].value(), "Oriental Pearl Tower");
    /// # Ok::<(), geotrie::GeoTrieError>(())
    /// ```
    pub fn get_points_by_circle(
        &self,
        center: impl Into<geo::Point<f64>>,
        radius: u32,
    ) -> Result<Vec<Arc<Point<V>>>> {
        let center = center.into();

        if radius == 0 {
            log::warn!("Rejecting circle query with zero radius");
            return Err(GeoTrieError::InvalidRadius);
        }

        if let Err(e) = validate_coordinate(center.x(), center.y()) {
            log::warn!("Rejecting circle query: {}", e);
            return Err(e);
        }

        let diameter = u64::from(radius) * 2;
        let cell_len = match required_cell_length(diameter) {
            Ok(len) if len >= self.config.coarsest_cell_length => len,
            _ => {
                log::warn!(
                    "Rejecting circle query: diameter {} m needs cells coarser than length {}",
                    diameter,
                    self.config.coarsest_cell_length
                );
                return Err(GeoTrieError::InvalidDiameter(diameter));
            }
        };

        let scan_len = covering_cell_length(cell_len, bounding_offsets(center.y(), radius));
        if scan_len < cell_len {
            log::debug!(
                "Circle at latitude {} widened from cell length {} to {}",
                center.y(),
                cell_len,
                scan_len
            );
        }

        let probes = circumscribed_square_probes(center, radius);
        let metric = self.config.distance_metric;

        let root = self.root.read();

        let mut visited = FxHashSet::default();
        let mut found = Vec::new();
        let mut scan = |cell: &GeoBox<V>| {
            if !visited.insert(cell.geohash()) {
                return;
            }
            found.extend(
                cell.points()
                    .filter(|p| distance_between(center, p.location(), metric) <= radius)
                    .cloned(),
            );
        };

        if scan_len == 0 {
            root.for_each_box(&mut scan);
        } else {
            for probe in probes {
                let geohash = geohash_of(probe.x(), probe.y());
                let prefix = geohash.prefix(scan_len);
                log::trace!("Circle probe ({}, {}) -> {}", probe.x(), probe.y(), prefix);

                if let Some(node) = root.find(prefix) {
                    node.for_each_box(&mut scan);
                }
            }
        }

        log::trace!(
            "Circle query at ({}, {}) r={} scanned {} boxes, matched {} points",
            center.x(),
            center.y(),
            radius,
            visited.len(),
            found.len()
        );
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::spatial::DistanceMetric;

    const PALERMO: (f64, f64) = (13.361389, 38.115556);
    const ORIENTAL_PEARL: (f64, f64) = (121.506377, 31.245105);
    const PEACE_HOTEL: (f64, f64) = (121.4871639, 31.2388556);

    fn sample(config: IndexConfig) -> GeohashTrie<&'static str> {
        let trie = GeohashTrie::with_config(config).unwrap();
        trie.put(Point::new(PALERMO.0, PALERMO.1, "Palermo"));
        trie.put(Point::new(ORIENTAL_PEARL.0, ORIENTAL_PEARL.1, "Oriental Pearl Tower"));
        trie
    }

    fn values(points: &[Arc<Point<&'static str>>]) -> Vec<&'static str> {
        let mut values: Vec<_> = points.iter().map(|p| *p.value()).collect();
        values.sort();
        values
    }

    #[test]
    fn test_required_cell_length() {
        assert_eq!(required_cell_length(10).unwrap(), 8);
        assert_eq!(required_cell_length(19).unwrap(), 8);
        assert_eq!(required_cell_length(20).unwrap(), 7);
        assert_eq!(required_cell_length(100).unwrap(), 7);
        assert_eq!(required_cell_length(609).unwrap(), 6);
        assert_eq!(required_cell_length(610).unwrap(), 5);
        assert_eq!(required_cell_length(10_000).unwrap(), 4);
        assert_eq!(required_cell_length(4_992_600).unwrap(), 1);

        assert!(matches!(
            required_cell_length(0),
            Err(GeoTrieError::InvalidDiameter(0))
        ));
        assert!(matches!(
            required_cell_length(4_992_601),
            Err(GeoTrieError::InvalidDiameter(4_992_601))
        ));
        assert!(required_cell_length(10_000_000).is_err());
    }

    #[test]
    fn test_incircle_table_is_decreasing() {
        assert!(INCIRCLE_DIAMETERS.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_probes_around_origin() {
        let probes = circumscribed_square_probes(geo::Point::new(0.0, 0.0), 111);
        let expected = [
            (-0.001, 0.001),
            (0.0, 0.001),
            (0.001, 0.001),
            (-0.001, 0.0),
            (0.0, 0.0),
            (0.001, 0.0),
            (-0.001, -0.001),
            (0.0, -0.001),
            (0.001, -0.001),
        ];
        for (probe, (lng, lat)) in probes.iter().zip(expected) {
            assert!((probe.x() - lng).abs() < 1e-12, "{:?}", probe);
            assert!((probe.y() - lat).abs() < 1e-12, "{:?}", probe);
        }
    }

    #[test]
    fn test_probes_wrap_around() {
        let probes = circumscribed_square_probes(geo::Point::new(179.9995, 0.0), 111);
        assert!((probes[2].x() - -179.9995).abs() < 1e-9);

        let probes = circumscribed_square_probes(geo::Point::new(-179.9995, 0.0), 111);
        assert!((probes[6].x() - 179.9995).abs() < 1e-9);

        let probes = circumscribed_square_probes(geo::Point::new(0.0, 89.9995), 111);
        assert!((probes[0].y() - -89.9995).abs() < 1e-9);

        let probes = circumscribed_square_probes(geo::Point::new(0.0, -89.9995), 111);
        assert!((probes[6].y() - 89.9995).abs() < 1e-9);
    }

    #[test]
    fn test_east_west_offset_widens_with_latitude() {
        let probes = circumscribed_square_probes(geo::Point::new(10.0, 60.0), 11_100);
        // Half a degree of longitude spans ~55.5 km at 60°N.
        let half_width = probes[5].x() - 10.0;
        assert!((half_width - 0.2).abs() < 1e-3, "got {}", half_width);
        assert!((probes[1].y() - 60.1).abs() < 1e-9);

        // Same layout as the flat offset on the equator.
        let probes = circumscribed_square_probes(geo::Point::new(10.0, 0.0), 11_100);
        assert!((probes[5].x() - 10.1).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_offsets_reach_pole() {
        let (lng_offset, lat_offset) = bounding_offsets(89.0, 222_000);
        assert_eq!(lng_offset, 180.0);
        assert!((lat_offset - 2.0).abs() < 1e-12);

        let (lng_offset, _) = bounding_offsets(90.0, 1);
        assert_eq!(lng_offset, 180.0);
    }

    #[test]
    fn test_cell_span() {
        assert_eq!(cell_span(1), (45.0, 45.0));
        assert_eq!(cell_span(2), (11.25, 5.625));
        assert_eq!(cell_span(8), (360.0 / 1_048_576.0, 180.0 / 1_048_576.0));
    }

    #[test]
    fn test_covering_cell_length() {
        // Equator: the incircle table already fits.
        assert_eq!(covering_cell_length(4, bounding_offsets(0.0, 5_000)), 4);
        assert_eq!(covering_cell_length(4, bounding_offsets(80.0, 5_000)), 4);
        // 5 km at 85°N is ~0.52° of longitude, wider than a length-4 cell.
        assert_eq!(covering_cell_length(4, bounding_offsets(85.0, 5_000)), 3);
        // A circle around the pole can only be scanned whole.
        assert_eq!(covering_cell_length(6, bounding_offsets(89.999, 500)), 0);
    }

    #[test]
    fn test_circle_hits_own_point() {
        let trie = sample(IndexConfig::default());
        let found = trie.get_points_by_circle(PALERMO, 1).unwrap();
        assert_eq!(values(&found), vec!["Palermo"]);
    }

    #[test]
    fn test_circle_on_empty_area() {
        let trie = sample(IndexConfig::default());
        assert!(trie.get_points_by_circle((0.0, 0.0), 1000).unwrap().is_empty());
    }

    #[test]
    fn test_circle_around_neighbouring_landmark() {
        let trie = sample(IndexConfig::default());
        let found = trie.get_points_by_circle(PEACE_HOTEL, 10_000).unwrap();
        assert_eq!(values(&found), vec!["Oriental Pearl Tower"]);

        let hotel = Point::new(PEACE_HOTEL.0, PEACE_HOTEL.1, ());
        let found = trie.get_points_by_circle(&hotel, 1_954).unwrap();
        assert_eq!(values(&found), vec!["Oriental Pearl Tower"]);
        assert!(trie.get_points_by_circle(&hotel, 1_953).unwrap().is_empty());
    }

    #[test]
    fn test_planar_metric_is_opt_in() {
        let haversine = sample(IndexConfig::default());
        let found = haversine.get_points_by_circle(PEACE_HOTEL, 2_000).unwrap();
        assert_eq!(found.len(), 1);

        // Planar measures the same pair at ~2242 m.
        let planar = sample(IndexConfig::default().with_distance_metric(DistanceMetric::Planar));
        assert!(planar.get_points_by_circle(PEACE_HOTEL, 2_000).unwrap().is_empty());
        assert_eq!(planar.get_points_by_circle(PEACE_HOTEL, 2_500).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_parameters() {
        let trie = sample(IndexConfig::default());

        assert!(matches!(
            trie.get_points_by_circle(PALERMO, 0),
            Err(GeoTrieError::InvalidRadius)
        ));
        assert!(matches!(
            trie.get_points_by_circle(PALERMO, 3_000_000),
            Err(GeoTrieError::InvalidDiameter(6_000_000))
        ));
        assert!(matches!(
            trie.get_points_by_circle((f64::NAN, 0.0), 10),
            Err(GeoTrieError::InvalidInput(_))
        ));
        assert!(matches!(
            trie.get_points_by_circle((0.0, 91.0), 10),
            Err(GeoTrieError::InvalidInput(_))
        ));

        // u32::MAX doubles past u32 without overflowing.
        assert!(matches!(
            trie.get_points_by_circle(PALERMO, u32::MAX),
            Err(GeoTrieError::InvalidDiameter(d)) if d == u64::from(u32::MAX) * 2
        ));
    }

    #[test]
    fn test_coarsest_cell_length_caps_diameter() {
        let capped = sample(IndexConfig::default().with_coarsest_cell_length(3));
        assert!(capped.get_points_by_circle(PEACE_HOTEL, 78_000).is_ok());
        assert!(matches!(
            capped.get_points_by_circle(PEACE_HOTEL, 78_001),
            Err(GeoTrieError::InvalidDiameter(156_002))
        ));

        let open = sample(IndexConfig::default());
        assert!(open.get_points_by_circle(PEACE_HOTEL, 78_001).is_ok());
    }

    #[test]
    fn test_cell_reached_by_several_probes_is_scanned_once() {
        let trie = GeohashTrie::new();
        trie.put(Point::new(ORIENTAL_PEARL.0, ORIENTAL_PEARL.1, 1));
        trie.put(Point::new(ORIENTAL_PEARL.0 + 0.000001, ORIENTAL_PEARL.1, 2));

        // Six of the nine probes land in the box holding both points.
        let found = trie.get_points_by_circle(ORIENTAL_PEARL, 1).unwrap();
        let mut values: Vec<i32> = found.iter().map(|p| *p.value()).collect();
        values.sort();
        assert_eq!(values, vec![1, 2]);
    }
}
