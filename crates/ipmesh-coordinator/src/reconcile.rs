//! Reconciliation: folding per-peer proposals into one authoritative table.

use std::collections::BTreeMap;

use ipmesh_net::{validate, wire, PeerId, RoutingTable};
use tracing::{debug, warn};

/// Fold every peer's raw proposal payload into a fresh routing table.
///
/// The fold is deterministic: `proposals` is a `BTreeMap`, so peers are
/// visited in ascending id order and the earlier peer wins any conflict.
/// Faults are isolated per element and never abort the pass:
///
/// - an undecodable payload skips that peer entirely,
/// - a name already claimed earlier in the same pass skips the entry,
/// - an incomplete record or a validation failure skips the entry.
///
/// Every skip is logged with the specific reason; the affected peer simply
/// contributes nothing (or less) this round.
pub fn reconcile(proposals: &BTreeMap<PeerId, String>) -> RoutingTable {
    let mut table = RoutingTable::new();
    for (peer, payload) in proposals {
        let entries = match wire::decode_entries(payload) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(peer = %peer, error = %err, "skipping peer with undecodable proposal");
                continue;
            }
        };
        fold_entries(&mut table, peer.as_str(), entries);
    }
    table
}

/// Fold one source's decoded records into `table`, skipping bad entries.
///
/// Shared between the provider's reconciliation pass and the requirer's
/// defensive read of the authoritative table, so both degrade identically.
pub(crate) fn fold_entries(
    table: &mut RoutingTable,
    source: &str,
    entries: BTreeMap<String, wire::RawNetwork>,
) {
    for (name, raw) in entries {
        if table.contains_name(&name) {
            // Two peers picked the same network name. The requirer side
            // avoids this by deriving names from its own peer identity.
            warn!(source, name = %name, "network name already claimed, skipping entry");
            continue;
        }
        let network = match raw.into_network(&name) {
            Ok(network) => network,
            Err(err) => {
                warn!(source, name = %name, error = %err, "skipping malformed network record");
                continue;
            }
        };
        match validate(&name, &network, table) {
            Ok(()) => {
                debug!(source, name = %name, prefix = %network.prefix, "admitted network");
                table.insert(name, network);
            }
            Err(err) => {
                warn!(source, name = %name, error = %err, "rejecting proposed network");
            }
        }
    }
}
