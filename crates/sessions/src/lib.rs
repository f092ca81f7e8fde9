//! Per-account session management.
//!
//! Each account owns one transport connection and one event-loop task; the
//! loop drives the persisted lifecycle state machine and the ingestion
//! pipeline. The registry keeps live sessions addressable without any
//! cross-account locking, and the manager layers account lifecycle,
//! startup reconnection, and the readiness-gated send path on top.

pub mod error;
pub mod manager;
pub mod outbound;
pub mod registry;
mod session;

pub use {
    error::{Error, Result},
    manager::SessionManager,
    outbound::{SendConfig, normalize_destination},
    registry::{SessionHandle, SessionRegistry},
};
