//! IPv4 CIDR prefixes.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// An IPv4 CIDR prefix: a network address plus a prefix length.
///
/// Prefixes are strict: the address must be the network address, so
/// `192.168.250.0/24` parses but `192.168.250.1/24` does not. Two CIDR
/// prefixes either nest or are disjoint, which is what makes
/// [`overlaps`](Self::overlaps) a complete exclusivity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Prefix {
    addr: Ipv4Addr,
    len: u8,
}

impl Prefix {
    /// Create a prefix, rejecting lengths over 32 and host bits set.
    pub fn new(addr: Ipv4Addr, len: u8) -> Result<Self> {
        if len > 32 {
            return Err(Error::InvalidPrefix(format!("{addr}/{len}")));
        }
        if u32::from(addr) & !mask(len) != 0 {
            return Err(Error::InvalidPrefix(format!("{addr}/{len}")));
        }
        Ok(Self { addr, len })
    }

    /// The network address.
    pub const fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// The prefix length in bits.
    pub const fn len(&self) -> u8 {
        self.len
    }

    /// Whether `ip` falls inside this prefix.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & mask(self.len) == u32::from(self.addr)
    }

    /// Whether every address of `self` also lies in `other`.
    ///
    /// A prefix is a subset of itself.
    pub fn is_subset_of(&self, other: &Prefix) -> bool {
        other.len <= self.len && other.contains(self.addr)
    }

    /// Whether the two prefixes share any address.
    ///
    /// Covers the equal, subset and superset cases; disjoint CIDR blocks
    /// never partially overlap.
    pub fn overlaps(&self, other: &Prefix) -> bool {
        self.is_subset_of(other) || other.is_subset_of(self)
    }
}

const fn mask(len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        u32::MAX << (32 - len)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

impl FromStr for Prefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| Error::InvalidPrefix(s.to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| Error::InvalidPrefix(s.to_string()))?;
        let len: u8 = len
            .parse()
            .map_err(|_| Error::InvalidPrefix(s.to_string()))?;
        Self::new(addr, len)
    }
}

impl Serialize for Prefix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Prefix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
