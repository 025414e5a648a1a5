//! Provider-side coordinator: owner of the authoritative routing table.

use std::collections::{BTreeMap, BTreeSet};

use ipmesh_net::{wire, PeerId, RoutingTable};
use tokio::sync::broadcast;
use tracing::{debug, error, info, trace};

use crate::error::{Error, Result};
use crate::mailbox::{Mailbox, NETWORKS_KEY};
use crate::reconcile::reconcile;

/// The provider-side coordinator.
///
/// Owns the authoritative [`RoutingTable`] and reacts to mailbox lifecycle
/// signals: any proposal change or peer departure triggers one
/// reconciliation pass from the latest observed state, after which the new
/// table is republished to every known peer. Signals arriving while a pass
/// runs are naturally coalesced — re-running once from the latest snapshot
/// is sufficient.
///
/// Reconciliation is a critical section: all entry points take `&mut self`,
/// so the borrow checker rules out interleaved passes within a process, and
/// the leader gate rules out concurrent writers across processes. Only the
/// elected leader reconciles and publishes; replicas observe every signal
/// as a no-op, so any number of them can run alongside the leader.
#[derive(Debug)]
pub struct RouterProvider<M: Mailbox> {
    mailbox: M,
    peers: BTreeSet<PeerId>,
    table: RoutingTable,
    updates: broadcast::Sender<RoutingTable>,
}

impl<M: Mailbox> RouterProvider<M> {
    /// Create a provider with an empty table and no known peers.
    pub fn new(mailbox: M) -> Self {
        let (updates, _) = broadcast::channel(16);
        Self {
            mailbox,
            peers: BTreeSet::new(),
            table: RoutingTable::new(),
            updates,
        }
    }

    /// Subscribe to authoritative-table changes. A message is sent once
    /// per reconciliation pass that actually altered the table.
    pub fn subscribe(&self) -> broadcast::Receiver<RoutingTable> {
        self.updates.subscribe()
    }

    /// Snapshot of the current authoritative table.
    pub fn routing_table(&self) -> RoutingTable {
        self.table.clone()
    }

    /// A peer joined the coordination group.
    ///
    /// The peer is tracked for future reconciliation passes and, if we are
    /// the leader, immediately seeded with the current table so a newcomer
    /// does not have to wait for the next change elsewhere. Idempotent
    /// under duplicate delivery.
    pub fn on_peer_joined(&mut self, peer: PeerId) -> Result<()> {
        if self.peers.insert(peer.clone()) {
            debug!(peer = %peer, "peer joined");
        }
        if !self.mailbox.is_leader() {
            return Ok(());
        }
        let payload = wire::encode_table(&self.table)?;
        self.mailbox.write(&peer, NETWORKS_KEY, &payload)?;
        Ok(())
    }

    /// A peer's mailbox content changed.
    pub fn on_mailbox_changed(&mut self, peer: &PeerId) -> Result<()> {
        // A change signal can outrun the join signal; track the peer
        // either way so its proposal is read this pass.
        self.peers.insert(peer.clone());
        if !self.mailbox.is_leader() {
            trace!(peer = %peer, "not the leader, ignoring mailbox change");
            return Ok(());
        }
        self.reconcile_and_publish()
    }

    /// A peer left the coordination group entirely. Its contributions
    /// disappear from the next pass; other peers' entries are untouched.
    pub fn on_peer_departed(&mut self, peer: &PeerId) -> Result<()> {
        if self.peers.remove(peer) {
            debug!(peer = %peer, "peer departed");
        }
        if !self.mailbox.is_leader() {
            return Ok(());
        }
        self.reconcile_and_publish()
    }

    fn reconcile_and_publish(&mut self) -> Result<()> {
        let mut proposals = BTreeMap::new();
        for peer in &self.peers {
            if let Some(payload) = self.mailbox.read(peer, NETWORKS_KEY)? {
                proposals.insert(peer.clone(), payload);
            }
        }

        let table = reconcile(&proposals);

        if let Some((a, b)) = table.find_overlap() {
            // Post-condition the validator is supposed to make impossible.
            let (a, b) = (a.to_string(), b.to_string());
            error!(a = %a, b = %b, "reconciled table contains overlapping networks");
            return Err(Error::InternalConsistency { a, b });
        }

        if table == self.table {
            trace!("reconciliation produced no changes");
            return Ok(());
        }

        self.table = table;
        let payload = wire::encode_table(&self.table)?;
        for peer in &self.peers {
            self.mailbox.write(peer, NETWORKS_KEY, &payload)?;
        }
        info!(
            networks = self.table.len(),
            peers = self.peers.len(),
            "published authoritative routing table"
        );
        let _ = self.updates.send(self.table.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::InMemoryMailbox;
    use tokio::sync::broadcast::error::TryRecvError;

    fn propose(mailbox: &InMemoryMailbox, peer: &PeerId, payload: &str) {
        mailbox
            .requirer(peer.clone())
            .write(peer, NETWORKS_KEY, payload)
            .unwrap();
    }

    #[test]
    fn empty_system_has_empty_table() {
        let provider = RouterProvider::new(InMemoryMailbox::provider());
        assert!(provider.routing_table().is_empty());
    }

    #[test]
    fn single_proposal_round_trip() {
        let mailbox = InMemoryMailbox::provider();
        let mut provider = RouterProvider::new(mailbox.clone());
        let peer = PeerId::new("host-a");

        provider.on_peer_joined(peer.clone()).unwrap();
        propose(
            &mailbox,
            &peer,
            r#"{"net-a": {"network": "192.168.250.0/24", "gateway": "192.168.250.1"}}"#,
        );
        provider.on_mailbox_changed(&peer).unwrap();

        let table = provider.routing_table();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("net-a").unwrap().prefix.to_string(),
            "192.168.250.0/24"
        );

        // The merged table was republished to the peer's slot.
        let published = mailbox
            .requirer(peer.clone())
            .read(&peer, NETWORKS_KEY)
            .unwrap()
            .unwrap();
        assert_eq!(published, wire::encode_table(&table).unwrap());
    }

    #[test]
    fn join_seeds_newcomer_with_current_table() {
        let mailbox = InMemoryMailbox::provider();
        let mut provider = RouterProvider::new(mailbox.clone());
        let first = PeerId::new("host-a");

        provider.on_peer_joined(first.clone()).unwrap();
        propose(
            &mailbox,
            &first,
            r#"{"net-a": {"network": "192.168.250.0/24", "gateway": "192.168.250.1"}}"#,
        );
        provider.on_mailbox_changed(&first).unwrap();

        let late = PeerId::new("host-b");
        provider.on_peer_joined(late.clone()).unwrap();

        let seeded = mailbox
            .requirer(late.clone())
            .read(&late, NETWORKS_KEY)
            .unwrap()
            .unwrap();
        assert!(seeded.contains("net-a"));
    }

    #[test]
    fn replica_ignores_signals() {
        let mailbox = InMemoryMailbox::provider();
        let mut replica = RouterProvider::new(mailbox.replica());
        let peer = PeerId::new("host-a");

        replica.on_peer_joined(peer.clone()).unwrap();
        propose(
            &mailbox,
            &peer,
            r#"{"net-a": {"network": "192.168.250.0/24", "gateway": "192.168.250.1"}}"#,
        );
        replica.on_mailbox_changed(&peer).unwrap();

        assert!(replica.routing_table().is_empty());
        // Nothing was published back either.
        assert!(mailbox
            .requirer(peer.clone())
            .read(&peer, NETWORKS_KEY)
            .unwrap()
            .is_none());
    }

    #[test]
    fn notification_only_when_table_changes() {
        let mailbox = InMemoryMailbox::provider();
        let mut provider = RouterProvider::new(mailbox.clone());
        let mut updates = provider.subscribe();
        let peer = PeerId::new("host-a");

        provider.on_peer_joined(peer.clone()).unwrap();
        propose(
            &mailbox,
            &peer,
            r#"{"net-a": {"network": "192.168.250.0/24", "gateway": "192.168.250.1"}}"#,
        );
        provider.on_mailbox_changed(&peer).unwrap();
        let table = updates.try_recv().unwrap();
        assert_eq!(table.len(), 1);

        // Same proposal again: reconciliation runs but nothing changed.
        provider.on_mailbox_changed(&peer).unwrap();
        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn departed_peer_entries_are_dropped() {
        let mailbox = InMemoryMailbox::provider();
        let mut provider = RouterProvider::new(mailbox.clone());
        let a = PeerId::new("host-a");
        let b = PeerId::new("host-b");

        provider.on_peer_joined(a.clone()).unwrap();
        provider.on_peer_joined(b.clone()).unwrap();
        propose(
            &mailbox,
            &a,
            r#"{"net-a": {"network": "192.168.250.0/24", "gateway": "192.168.250.1"}}"#,
        );
        propose(
            &mailbox,
            &b,
            r#"{"net-b": {"network": "192.168.251.0/24", "gateway": "192.168.251.1"}}"#,
        );
        provider.on_mailbox_changed(&a).unwrap();
        provider.on_mailbox_changed(&b).unwrap();
        assert_eq!(provider.routing_table().len(), 2);

        provider.on_peer_departed(&a).unwrap();
        let table = provider.routing_table();
        assert_eq!(table.len(), 1);
        assert!(table.contains_name("net-b"));

        // Duplicate departure signal is a no-op.
        provider.on_peer_departed(&a).unwrap();
        assert_eq!(provider.routing_table().len(), 1);
    }

    #[test]
    fn change_signal_before_join_is_tolerated() {
        let mailbox = InMemoryMailbox::provider();
        let mut provider = RouterProvider::new(mailbox.clone());
        let peer = PeerId::new("host-a");

        propose(
            &mailbox,
            &peer,
            r#"{"net-a": {"network": "192.168.250.0/24", "gateway": "192.168.250.1"}}"#,
        );
        // No join signal seen yet; the change signal alone suffices.
        provider.on_mailbox_changed(&peer).unwrap();
        assert_eq!(provider.routing_table().len(), 1);
    }
}
