//! Zone-partitioned endpoint sets.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::endpoint::{NetworkEndpoint, PodRef};

/// Set of network endpoints registered (or to be registered) in one zone.
pub type NetworkEndpointSet = EndpointSet<NetworkEndpoint>;

/// Zone name to endpoint-set mapping. Zones are opaque strings and never
/// nested; a node belongs to exactly one zone at a time.
pub type ZoneEndpointMap<T> = HashMap<String, EndpointSet<T>>;

/// Mapping from an endpoint to the pod backing it. Duplicate tuples
/// overwrite (last write wins); under normal cluster invariants the same
/// (ip, port, node) tuple never recurs.
pub type EndpointPodMap = HashMap<NetworkEndpoint, PodRef>;

/// An unordered mutable set with a destructive drain operation.
///
/// `pop_any` removes and returns an arbitrary element, which is what the
/// mutation batcher needs to chunk a large set across several API calls.
/// Callers must not rely on any particular pop order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet<T: Eq + Hash> {
    items: HashSet<T>,
}

impl<T: Eq + Hash + Clone> EndpointSet<T> {
    pub fn new() -> Self {
        Self {
            items: HashSet::new(),
        }
    }

    /// Inserts an element, returning whether it was newly added.
    pub fn insert(&mut self, item: T) -> bool {
        self.items.insert(item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Elements present in `self` but not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            items: self.items.difference(&other.items).cloned().collect(),
        }
    }

    /// Removes and returns an arbitrary element, or `None` when empty.
    pub fn pop_any(&mut self) -> Option<T> {
        let item = self.items.iter().next().cloned()?;
        self.items.remove(&item);
        Some(item)
    }
}

impl<T: Eq + Hash + Clone> Default for EndpointSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for EndpointSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for EndpointSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}
