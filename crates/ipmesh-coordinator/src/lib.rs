//! Coordination layer for the ipmesh IPv4 address-space coordinator.
//!
//! Requirer peers each propose a set of named networks they want reserved.
//! A single provider-leader folds every peer's proposal into one
//! conflict-free authoritative [`RoutingTable`](ipmesh_net::RoutingTable)
//! and republishes it to all peers. Data moves through an external per-peer
//! key/value mailbox, abstracted by the [`Mailbox`] trait; this crate only
//! implements the logic driven by the mailbox's lifecycle signals.
//!
//! # Control flow
//!
//! ```text
//! RouterRequirer ── propose ──▶ mailbox ── changed ──▶ RouterProvider
//!        ▲                                                  │ reconcile
//!        └────────── observe ◀── mailbox ◀── publish ───────┘
//! ```
//!
//! The round trip is fully asynchronous: a successful `propose` only means
//! the local write completed. Callers who need to see their networks in the
//! authoritative table subscribe to the change notification and wait for
//! the table to come back around.

mod error;
mod mailbox;
mod provider;
mod reconcile;
mod requirer;

pub use error::{Error, Result};
pub use mailbox::{InMemoryMailbox, Mailbox, NETWORKS_KEY};
pub use provider::RouterProvider;
pub use reconcile::reconcile;
pub use requirer::RouterRequirer;
