//! Error types for ipmesh-coordinator.

use thiserror::Error;

/// Result type for coordinator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the provider and requirer coordinators.
#[derive(Debug, Error)]
pub enum Error {
    /// A proposed network failed validation; nothing was published.
    #[error(transparent)]
    Validation(#[from] ipmesh_net::Error),

    /// Lookup of a network name that is not in the authoritative table.
    #[error("no network named `{0}` in the routing table")]
    NotFound(String),

    /// The mailbox transport failed.
    #[error("mailbox error: {0}")]
    Mailbox(String),

    /// Two accepted networks were found to overlap after reconciliation.
    /// This cannot happen unless the validator or reconciler is broken;
    /// it is raised loudly instead of publishing a corrupt table.
    #[error("internal consistency violation: accepted networks `{a}` and `{b}` overlap")]
    InternalConsistency { a: String, b: String },
}
