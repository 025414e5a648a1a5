//! Error types for ipmesh-net.

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::Prefix;

/// Result type for ipmesh-net operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding or validating a proposed network.
#[derive(Debug, Error)]
pub enum Error {
    /// A network record on the wire lacks a required field.
    #[error("network `{entry}` is missing required field `{field}`")]
    MissingField { entry: String, field: &'static str },

    /// A route record on the wire lacks a required field.
    #[error("route {index} of network `{entry}` is missing required field `{field}`")]
    MissingRouteField {
        entry: String,
        index: usize,
        field: &'static str,
    },

    /// A dotted-quad address string failed to parse.
    #[error("invalid IPv4 address `{0}`")]
    InvalidAddress(String),

    /// A CIDR string failed to parse, or has host bits set.
    #[error("invalid IPv4 prefix `{0}`")]
    InvalidPrefix(String),

    /// The network's gateway lies outside its own prefix.
    #[error("gateway {gateway} of network `{entry}` is outside its prefix {prefix}")]
    GatewayNotInNetwork {
        entry: String,
        gateway: Ipv4Addr,
        prefix: Prefix,
    },

    /// A static route's gateway lies outside the owning network's prefix.
    #[error("route gateway {gateway} of network `{entry}` is unreachable from {prefix}")]
    RouteUnreachable {
        entry: String,
        gateway: Ipv4Addr,
        prefix: Prefix,
    },

    /// The proposed prefix collides with an already-reserved one.
    #[error("network `{entry}` ({prefix}) conflicts with reserved network `{existing}` ({existing_prefix})")]
    NetworkConflict {
        entry: String,
        prefix: Prefix,
        existing: String,
        existing_prefix: Prefix,
    },

    /// A mailbox payload could not be decoded at all.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}
