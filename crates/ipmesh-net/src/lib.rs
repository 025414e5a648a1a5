//! IPv4 network reservation types for the ipmesh coordinator.
//!
//! This crate holds the pure data model shared by both sides of the
//! coordination protocol: CIDR prefixes, networks with gateways and static
//! routes, and the name-keyed routing table that reserves address space.
//!
//! # Design
//!
//! All wire payloads enter through the [`wire`] module, which converts raw
//! JSON records into typed values and reports exactly which field is missing
//! or malformed. Typed values are never re-checked for structural
//! completeness after that boundary. The [`validate`] function then enforces
//! the semantic rules: gateways inside their network, route gateways
//! reachable, and no two reserved prefixes overlapping.

mod addr;
mod error;
mod table;
mod validate;
pub mod wire;

pub use addr::Prefix;
pub use error::{Error, Result};
pub use table::{Network, PeerId, Route, RoutingTable};
pub use validate::validate;
