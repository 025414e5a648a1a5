//! Mailbox abstraction over the external pub/sub substrate.
//!
//! Each pair of peers shares a slot with two independent halves, one per
//! writer, mirroring how relation data stores keep each side's payload
//! separate. A coordinator writes its own half and reads the
//! counterparty's; both sides use the same well-known key.
//!
//! Lifecycle signals (`joined`, `changed`, `departed`) are delivered by
//! whatever event loop drives the coordinators and are edge-triggered with
//! no exactly-once guarantee, so every handler in this crate is idempotent
//! under duplicate delivery.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use ipmesh_net::PeerId;

use crate::error::{Error, Result};

/// Mailbox key under which proposals and the authoritative table travel.
/// Part of the wire contract; peers on other stacks look up this exact key.
pub const NETWORKS_KEY: &str = "networks";

/// Access to the external per-peer key/value mailbox.
///
/// Implementations are expected to be cheap handles onto a shared
/// transport; all methods take `&self`.
pub trait Mailbox {
    /// Write `value` into this process's half of the slot shared with `peer`.
    fn write(&self, peer: &PeerId, key: &str, value: &str) -> Result<()>;

    /// Read the counterparty's half of the slot shared with `peer`.
    fn read(&self, peer: &PeerId, key: &str) -> Result<Option<String>>;

    /// Re-read this process's own half of the slot shared with `peer`.
    /// Read-your-own-writes is guaranteed.
    fn read_own(&self, peer: &PeerId, key: &str) -> Result<Option<String>>;

    /// Whether this process is the elected leader for its role. Only the
    /// leader acts as the authoritative writer; replicas observe signals
    /// and do nothing.
    fn is_leader(&self) -> bool;
}

#[derive(Debug, Default)]
struct Store {
    /// Requirer-authored halves, keyed by (requirer, key).
    to_provider: BTreeMap<(PeerId, String), String>,
    /// Provider-authored halves, keyed by (requirer, key).
    to_requirer: BTreeMap<(PeerId, String), String>,
}

#[derive(Debug, Clone)]
enum Endpoint {
    Provider,
    Requirer(PeerId),
}

/// In-process mailbox for tests and single-process deployments.
///
/// All handles created from one [`provider`](Self::provider) root share a
/// store, so a provider and several requirers can run the full
/// propose → reconcile → observe loop without any transport.
#[derive(Debug, Clone)]
pub struct InMemoryMailbox {
    store: Arc<Mutex<Store>>,
    endpoint: Endpoint,
    leader: bool,
}

impl InMemoryMailbox {
    /// Create the provider-side handle and a fresh store. Leader by default.
    pub fn provider() -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            endpoint: Endpoint::Provider,
            leader: true,
        }
    }

    /// Create a requirer-side handle sharing this mailbox's store.
    pub fn requirer(&self, id: PeerId) -> Self {
        Self {
            store: Arc::clone(&self.store),
            endpoint: Endpoint::Requirer(id),
            leader: true,
        }
    }

    /// Create a non-leader handle for the same endpoint.
    pub fn replica(&self) -> Self {
        Self {
            leader: false,
            ..self.clone()
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| Error::Mailbox("mailbox store poisoned".into()))
    }

    /// The slot a write from this endpoint lands in.
    fn own_slot(&self, peer: &PeerId, key: &str) -> ((PeerId, String), bool) {
        match &self.endpoint {
            // The provider addresses the requirer it is writing to.
            Endpoint::Provider => ((peer.clone(), key.to_string()), false),
            // A requirer always writes its own half, whoever it talks to.
            Endpoint::Requirer(id) => ((id.clone(), key.to_string()), true),
        }
    }
}

impl Mailbox for InMemoryMailbox {
    fn write(&self, peer: &PeerId, key: &str, value: &str) -> Result<()> {
        let (slot, to_provider) = self.own_slot(peer, key);
        let mut store = self.lock()?;
        if to_provider {
            store.to_provider.insert(slot, value.to_string());
        } else {
            store.to_requirer.insert(slot, value.to_string());
        }
        Ok(())
    }

    fn read(&self, peer: &PeerId, key: &str) -> Result<Option<String>> {
        let store = self.lock()?;
        let value = match &self.endpoint {
            Endpoint::Provider => store
                .to_provider
                .get(&(peer.clone(), key.to_string()))
                .cloned(),
            Endpoint::Requirer(id) => store
                .to_requirer
                .get(&(id.clone(), key.to_string()))
                .cloned(),
        };
        Ok(value)
    }

    fn read_own(&self, peer: &PeerId, key: &str) -> Result<Option<String>> {
        let (slot, to_provider) = self.own_slot(peer, key);
        let store = self.lock()?;
        let value = if to_provider {
            store.to_provider.get(&slot).cloned()
        } else {
            store.to_requirer.get(&slot).cloned()
        };
        Ok(value)
    }

    fn is_leader(&self) -> bool {
        self.leader
    }
}
