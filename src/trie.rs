//! Thread-safe 32-ary prefix tree keyed by geohash symbols.
//!
//! The tree has a fixed height of [`GEOHASH_LEN`] levels below the root; only
//! nodes at the last level are leaves, and each leaf owns one [`GeoBox`].
//!
//! ```text
//! root (pass_count = 3)
//! ├─ 'S' (2)
//! │  └─ 'Q' (2) ─ ... ─ 'R' leaf (2) -> GeoBox "SQC8B49R" {p1, p2}
//! └─ 'W' (1)
//!    └─ 'T' (1) ─ ... ─ 'P' leaf (1) -> GeoBox "WTW3SZYP" {p3}
//! ```
//!
//! Every node on a path, the root included, counts the live points beneath
//! it, so a leaf's count equals its box's size and the root's count is the
//! size of the whole index. Nodes are created on first insert and unlinked
//! as soon as their count drops to zero.

use crate::config::IndexConfig;
use crate::error::Result;
use crate::geobox::GeoBox;
use crate::geohash::{GEOHASH_LEN, Geohash, SYMBOL_COUNT, decode_symbol};
use crate::point::Point;
use crate::validation::validate_coordinate;
use parking_lot::RwLock;
use std::fmt;

pub(crate) struct Node<V> {
    children: [Option<Box<Node<V>>>; SYMBOL_COUNT],
    pass_count: usize,
    leaf: Option<GeoBox<V>>,
}

impl<V> Node<V> {
    fn new() -> Self {
        Self {
            children: std::array::from_fn(|_| None),
            pass_count: 0,
            leaf: None,
        }
    }

    /// Follows `prefix` down from this node.
    ///
    /// Returns `None` on an empty prefix, a non-alphabet symbol, or a
    /// missing child.
    pub(crate) fn find(&self, prefix: &str) -> Option<&Node<V>> {
        if prefix.is_empty() {
            return None;
        }
        let mut node = self;
        for symbol in prefix.bytes() {
            let index = decode_symbol(symbol)?;
            node = node.children[usize::from(index)].as_deref()?;
        }
        Some(node)
    }

    pub(crate) fn leaf(&self) -> Option<&GeoBox<V>> {
        self.leaf.as_ref()
    }

    /// Visits every box in this subtree, depth first in alphabet order.
    pub(crate) fn for_each_box<F: FnMut(&GeoBox<V>)>(&self, f: &mut F) {
        if let Some(cell) = &self.leaf {
            f(cell);
            return;
        }
        for child in self.children.iter().flatten() {
            child.for_each_box(f);
        }
    }

    fn tally(&self, stats: &mut TrieStats) {
        stats.node_count += 1;
        if let Some(cell) = &self.leaf {
            stats.box_count += 1;
            stats.point_count += cell.len();
        }
        for child in self.children.iter().flatten() {
            child.tally(stats);
        }
    }
}

/// Snapshot of the index's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrieStats {
    /// Live points across all boxes
    pub point_count: usize,
    /// Populated leaves
    pub box_count: usize,
    /// Nodes including the root
    pub node_count: usize,
}

/// An in-memory geospatial index over 8-symbol geohashes.
///
/// One reader/writer lock guards the whole tree. `get`, `get_by_prefix`,
/// `count` and circle queries share it; `put` and `delete` hold it
/// exclusively for their full duration, so no caller ever observes a
/// partially updated tree.
///
/// # Examples
///
/// ```rust
/// use geotrie::{GeohashTrie, Point};
///
/// let trie = GeohashTrie::new();
/// trie.put(Point::new(13.361389, 38.115556, "Palermo"));
/// trie.put(Point::new(121.506377, 31.245105, "Oriental Pearl Tower"));
///
/// let cell = trie.get("SQC8B49R").unwrap();
/// assert_eq!(cell.len(), 1);
/// assert_eq!(trie.get_by_prefix("WTW").len(), 1);
/// assert_eq!(trie.count(), 2);
///
/// assert!(trie.delete("SQC8B49R"));
/// assert_eq!(trie.count(), 1);
/// ```
pub struct GeohashTrie<V> {
    pub(crate) root: RwLock<Node<V>>,
    pub(crate) config: IndexConfig,
}

impl<V> GeohashTrie<V> {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Node::new()),
            config: IndexConfig::default(),
        }
    }

    pub fn with_config(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: RwLock::new(Node::new()),
            config,
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Inserts a point into the box of its geohash cell.
    ///
    /// Re-inserting an existing coordinate replaces its payload and leaves
    /// the count unchanged. Coordinates must be valid WGS84; see
    /// [`try_put`](Self::try_put) for a checked variant.
    pub fn put(&self, point: Point<V>) {
        let geohash = point.geohash();
        let key = point.key();

        let mut root = self.root.write();

        let existing = root
            .find(geohash.as_str())
            .and_then(Node::leaf)
            .is_some_and(|cell| cell.contains(&key));
        let delta = usize::from(!existing);

        let mut node = &mut *root;
        node.pass_count += delta;
        for index in geohash.symbols() {
            node = &mut **node.children[index].get_or_insert_with(|| Box::new(Node::new()));
            node.pass_count += delta;
        }

        let cell = node.leaf.get_or_insert_with(|| {
            log::debug!("Creating box {}", geohash);
            GeoBox::new(geohash)
        });
        cell.insert(point);
    }

    /// Validates the coordinate, then behaves like [`put`](Self::put).
    pub fn try_put(&self, point: Point<V>) -> Result<()> {
        validate_coordinate(point.lng(), point.lat())?;
        self.put(point);
        Ok(())
    }

    /// Returns the box stored under an exact 8-symbol geohash.
    ///
    /// Malformed geohashes simply find nothing.
    pub fn get(&self, geohash: &str) -> Option<GeoBox<V>> {
        if geohash.len() != GEOHASH_LEN {
            return None;
        }
        let root = self.root.read();
        root.find(geohash).and_then(Node::leaf).cloned()
    }

    /// Returns every box whose geohash starts with `prefix`.
    ///
    /// An empty, malformed, or unknown prefix yields an empty list. Boxes
    /// come back depth first in alphabet order, but callers should not rely
    /// on any particular order.
    pub fn get_by_prefix(&self, prefix: &str) -> Vec<GeoBox<V>> {
        let root = self.root.read();
        let mut boxes = Vec::new();
        if let Some(node) = root.find(prefix) {
            node.for_each_box(&mut |cell| boxes.push(cell.clone()));
        }
        boxes
    }

    /// Removes the whole box stored under `geohash`.
    ///
    /// Returns false if the geohash is malformed or not present.
    pub fn delete(&self, geohash: &str) -> bool {
        let Ok(geohash) = geohash.parse::<Geohash>() else {
            return false;
        };

        let mut root = self.root.write();

        let removed = match root.find(geohash.as_str()).and_then(Node::leaf) {
            Some(cell) => cell.len(),
            None => return false,
        };

        let mut node = &mut *root;
        node.pass_count -= removed;
        for (depth, index) in geohash.symbols().enumerate() {
            let remaining = match node.children[index].as_deref() {
                Some(child) => child.pass_count - removed,
                None => break,
            };
            // A zero count here means the whole subtree below is empty too.
            if remaining == 0 {
                node.children[index] = None;
                log::debug!(
                    "Pruned subtree {} while deleting box {}",
                    geohash.prefix(depth + 1),
                    geohash
                );
                return true;
            }
            let Some(child) = node.children[index].as_deref_mut() else {
                break;
            };
            child.pass_count = remaining;
            node = child;
        }
        true
    }

    /// Total number of live points.
    pub fn count(&self) -> usize {
        self.root.read().pass_count
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn stats(&self) -> TrieStats {
        let root = self.root.read();
        let mut stats = TrieStats::default();
        root.tally(&mut stats);
        stats
    }
}

impl<V> Default for GeohashTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for GeohashTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeohashTrie")
            .field("count", &self.count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
