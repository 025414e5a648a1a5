//! Requirer-side coordinator: a peer's own proposal set and its local view
//! of the authoritative table.

use std::collections::BTreeMap;

use ipmesh_net::{validate, wire, Network, PeerId, RoutingTable};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::mailbox::{Mailbox, NETWORKS_KEY};
use crate::reconcile::fold_entries;

/// The requirer-side coordinator.
///
/// Proposals are replacement writes: the networks handed to
/// [`propose`](Self::propose) become the peer's entire published set, and
/// any previously proposed name missing from the new set is dropped. A
/// successful `propose` only means the local write completed — the
/// authoritative table reflects it after the provider's next
/// reconciliation pass, observable through [`subscribe`](Self::subscribe).
#[derive(Debug)]
pub struct RouterRequirer<M: Mailbox> {
    mailbox: M,
    upstream: PeerId,
    cached: RoutingTable,
    updates: broadcast::Sender<RoutingTable>,
}

impl<M: Mailbox> RouterRequirer<M> {
    /// Create a requirer talking to the provider peer `upstream`.
    pub fn new(mailbox: M, upstream: PeerId) -> Self {
        let (updates, _) = broadcast::channel(16);
        Self {
            mailbox,
            upstream,
            cached: RoutingTable::new(),
            updates,
        }
    }

    /// Subscribe to observed-table changes.
    pub fn subscribe(&self) -> broadcast::Receiver<RoutingTable> {
        self.updates.subscribe()
    }

    /// Publish this peer's desired set of named networks.
    ///
    /// Every candidate is validated, in order, against the last observed
    /// authoritative table minus this peer's own prior contribution, so a
    /// peer can amend or resubmit its own networks without conflicting
    /// with itself. The batch is all-or-nothing: on the first validation
    /// failure the error is returned and nothing is published.
    ///
    /// Only the leader unit publishes; on a non-leader this is a no-op.
    pub fn propose(&mut self, networks: BTreeMap<String, Network>) -> Result<()> {
        if !self.mailbox.is_leader() {
            trace!("not the leader, ignoring propose");
            return Ok(());
        }

        let mut accumulator = self.routing_table()?;
        if let Some(prior) = self.mailbox.read_own(&self.upstream, NETWORKS_KEY)? {
            match wire::decode_entries(&prior) {
                Ok(entries) => {
                    for name in entries.keys() {
                        accumulator.remove(name);
                    }
                }
                Err(err) => {
                    warn!(error = %err, "prior proposal undecodable, not excluding any names")
                }
            }
        }

        for (name, network) in &networks {
            validate(name, network, &accumulator)?;
            accumulator.insert(name.clone(), network.clone());
        }

        let payload = wire::encode_networks(&networks)?;
        self.mailbox.write(&self.upstream, NETWORKS_KEY, &payload)?;
        debug!(networks = networks.len(), "published proposal");
        Ok(())
    }

    /// The most recently observed authoritative table.
    ///
    /// The upstream payload is re-decoded defensively on every read: a
    /// malformed entry is skipped with a warning rather than failing the
    /// whole read, so partially-good data stays available. That covers
    /// entries whose value is the wrong JSON type outright, not just
    /// records with missing fields.
    pub fn routing_table(&self) -> Result<RoutingTable> {
        let Some(payload) = self.mailbox.read(&self.upstream, NETWORKS_KEY)? else {
            return Ok(RoutingTable::new());
        };
        let mut table = RoutingTable::new();
        match wire::decode_values(&payload) {
            Ok(values) => {
                let mut entries = BTreeMap::new();
                for (name, value) in values {
                    match wire::raw_from_value(value) {
                        Ok(raw) => {
                            entries.insert(name, raw);
                        }
                        Err(err) => {
                            warn!(name = %name, error = %err, "skipping undecodable network record")
                        }
                    }
                }
                fold_entries(&mut table, self.upstream.as_str(), entries);
            }
            Err(err) => {
                warn!(error = %err, "authoritative table undecodable, treating as empty")
            }
        }
        Ok(table)
    }

    /// Look up one network in the observed authoritative table.
    pub fn network(&self, name: &str) -> Result<Network> {
        self.routing_table()?
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// The upstream provider's mailbox content changed.
    ///
    /// Refreshes the local cache and notifies subscribers when the
    /// observed table differs from the last cached value. Idempotent
    /// under duplicate delivery.
    pub fn on_mailbox_changed(&mut self, peer: &PeerId) -> Result<()> {
        if *peer != self.upstream {
            return Ok(());
        }
        let table = self.routing_table()?;
        if table != self.cached {
            debug!(networks = table.len(), "observed authoritative table changed");
            self.cached = table.clone();
            let _ = self.updates.send(table);
        }
        Ok(())
    }
}
