//! Admission validation for proposed networks.

use crate::error::{Error, Result};
use crate::{Network, RoutingTable};

/// Decide whether `candidate` may join `existing` under the name `entry`.
///
/// Checks run in order and stop at the first failure:
///
/// 1. the gateway must lie inside the candidate's own prefix,
/// 2. every route gateway must lie inside the candidate's prefix, and
/// 3. the candidate's prefix must not equal, contain, or be contained by
///    any prefix already reserved in `existing`.
///
/// Structural completeness is guaranteed by the [`wire`](crate::wire)
/// decode boundary, so it is not re-checked here; for wire-sourced records
/// that means a missing route field is reported at decode time, before any
/// gateway check runs. The function is pure and never mutates `existing`.
pub fn validate(entry: &str, candidate: &Network, existing: &RoutingTable) -> Result<()> {
    if !candidate.prefix.contains(candidate.gateway) {
        return Err(Error::GatewayNotInNetwork {
            entry: entry.to_string(),
            gateway: candidate.gateway,
            prefix: candidate.prefix,
        });
    }

    for route in &candidate.routes {
        if !candidate.prefix.contains(route.gateway) {
            return Err(Error::RouteUnreachable {
                entry: entry.to_string(),
                gateway: route.gateway,
                prefix: candidate.prefix,
            });
        }
    }

    for (existing_name, existing_net) in existing.iter() {
        if candidate.prefix.overlaps(&existing_net.prefix) {
            return Err(Error::NetworkConflict {
                entry: entry.to_string(),
                prefix: candidate.prefix,
                existing: existing_name.clone(),
                existing_prefix: existing_net.prefix,
            });
        }
    }

    Ok(())
}
