//! Networks, routes and the name-keyed routing table.

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;

use crate::Prefix;

/// Identity of a peer participating in the coordination group.
///
/// Peers are ordered; the reconciler folds proposals in ascending peer
/// order so conflict tie-breaking stays deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PeerId(String);

impl PeerId {
    /// Create a peer id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A static route reachable through a network's address space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// The destination prefix this route leads to.
    pub destination: Prefix,
    /// The gateway carrying traffic toward the destination. Must lie
    /// within the owning network's prefix.
    pub gateway: Ipv4Addr,
}

/// A reserved IPv4 network: a prefix, its gateway, and optional routes.
///
/// `Network` is the atomic unit of reservation. Values of this type always
/// carry both a prefix and a gateway; structurally incomplete records are
/// rejected at the [`wire`](crate::wire) decode boundary and never reach
/// this representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Network {
    /// The reserved address block.
    #[serde(rename = "network")]
    pub prefix: Prefix,
    /// The gateway address, inside `prefix`.
    pub gateway: Ipv4Addr,
    /// Static routes reachable through this network.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl Network {
    /// Create a network without routes.
    pub fn new(prefix: Prefix, gateway: Ipv4Addr) -> Self {
        Self {
            prefix,
            gateway,
            routes: Vec::new(),
        }
    }

    /// Add a static route, builder-style.
    #[must_use]
    pub fn with_route(mut self, destination: Prefix, gateway: Ipv4Addr) -> Self {
        self.routes.push(Route {
            destination,
            gateway,
        });
        self
    }
}

/// The authoritative mapping from network name to reserved network.
///
/// Backed by a `BTreeMap` so iteration order and the serialized form are
/// deterministic: reconciling the same proposals twice yields a
/// bit-for-bit identical payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoutingTable {
    entries: BTreeMap<String, Network>,
}

impl RoutingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a network by name.
    pub fn get(&self, name: &str) -> Option<&Network> {
        self.entries.get(name)
    }

    /// Whether a name is already registered.
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert a network under a name, returning any displaced entry.
    pub fn insert(&mut self, name: impl Into<String>, network: Network) -> Option<Network> {
        self.entries.insert(name.into(), network)
    }

    /// Remove a network by name.
    pub fn remove(&mut self, name: &str) -> Option<Network> {
        self.entries.remove(name)
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Network)> {
        self.entries.iter()
    }

    /// Iterate registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Number of reserved networks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no reservations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first pair of entries whose prefixes overlap.
    ///
    /// The validator makes overlapping entries impossible, so a hit here
    /// is an internal-consistency violation, not a user error.
    pub fn find_overlap(&self) -> Option<(&str, &str)> {
        let entries: Vec<_> = self.entries.iter().collect();
        for (i, (name_a, net_a)) in entries.iter().enumerate() {
            for (name_b, net_b) in &entries[i + 1..] {
                if net_a.prefix.overlaps(&net_b.prefix) {
                    return Some((name_a, name_b));
                }
            }
        }
        None
    }
}

impl FromIterator<(String, Network)> for RoutingTable {
    fn from_iter<I: IntoIterator<Item = (String, Network)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
