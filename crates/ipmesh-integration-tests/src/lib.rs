//! End-to-end coordination scenarios for ipmesh.
//!
//! The actual tests live in `tests/`; they wire one provider and several
//! requirers over an in-memory mailbox and play the transport's lifecycle
//! signals by hand.
