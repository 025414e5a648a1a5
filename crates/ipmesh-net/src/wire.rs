//! Wire encoding for mailbox payloads.
//!
//! A proposal or authoritative table travels as a JSON object mapping
//! network names to records with keys `network` (CIDR string), `gateway`
//! (dotted quad) and optional `routes`. The key names are a wire contract
//! shared with every peer implementation and must not change.
//!
//! Decoding is two-phase. [`decode_entries`] only requires the payload to
//! be a JSON object of records; it fails as a whole when the payload is
//! undecodable ([`Error::MalformedPayload`]). Each [`RawNetwork`] is then
//! converted individually, so one incomplete record can be skipped without
//! discarding the rest of the payload. When even record shape must be
//! tolerated per entry, [`decode_values`] defers record decoding to
//! [`raw_from_value`] so a wrong-typed value only costs its own entry.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::{Network, Route, RoutingTable};

/// A network record as it appears on the wire, before field checks.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNetwork {
    network: Option<String>,
    gateway: Option<String>,
    routes: Option<Vec<RawRoute>>,
}

/// A route record as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRoute {
    destination: Option<String>,
    gateway: Option<String>,
}

impl RawNetwork {
    /// Convert into a typed [`Network`], reporting the first missing or
    /// unparseable field. `entry` names the record in errors.
    pub fn into_network(self, entry: &str) -> Result<Network> {
        let prefix = self
            .network
            .ok_or_else(|| Error::MissingField {
                entry: entry.to_string(),
                field: "network",
            })?
            .parse()?;
        let gateway = parse_addr(self.gateway.as_deref().ok_or_else(|| {
            Error::MissingField {
                entry: entry.to_string(),
                field: "gateway",
            }
        })?)?;

        let mut routes = Vec::new();
        for (index, raw) in self.routes.unwrap_or_default().into_iter().enumerate() {
            let destination = raw
                .destination
                .ok_or_else(|| Error::MissingRouteField {
                    entry: entry.to_string(),
                    index,
                    field: "destination",
                })?
                .parse()?;
            let gateway = parse_addr(raw.gateway.as_deref().ok_or_else(|| {
                Error::MissingRouteField {
                    entry: entry.to_string(),
                    index,
                    field: "gateway",
                }
            })?)?;
            routes.push(Route {
                destination,
                gateway,
            });
        }

        Ok(Network {
            prefix,
            gateway,
            routes,
        })
    }
}

fn parse_addr(s: &str) -> Result<Ipv4Addr> {
    s.parse().map_err(|_| Error::InvalidAddress(s.to_string()))
}

/// Decode a payload into raw per-name records.
///
/// Fails only when the payload as a whole is not a JSON object of network
/// records; per-record problems surface later from
/// [`RawNetwork::into_network`].
pub fn decode_entries(payload: &str) -> Result<BTreeMap<String, RawNetwork>> {
    Ok(serde_json::from_str(payload)?)
}

/// Decode a payload into per-name JSON values, deferring record decoding.
///
/// Looser than [`decode_entries`]: only the outer object shape is
/// required, so an entry whose value is the wrong JSON type (a number, a
/// list) can be skipped individually via [`raw_from_value`] without
/// discarding its well-formed siblings.
pub fn decode_values(payload: &str) -> Result<BTreeMap<String, serde_json::Value>> {
    Ok(serde_json::from_str(payload)?)
}

/// Convert one JSON value into a raw network record.
pub fn raw_from_value(value: serde_json::Value) -> Result<RawNetwork> {
    Ok(serde_json::from_value(value)?)
}

/// Encode a routing table for publication.
pub fn encode_table(table: &RoutingTable) -> Result<String> {
    Ok(serde_json::to_string(table)?)
}

/// Encode a peer's proposal set.
pub fn encode_networks(networks: &BTreeMap<String, Network>) -> Result<String> {
    Ok(serde_json::to_string(networks)?)
}
