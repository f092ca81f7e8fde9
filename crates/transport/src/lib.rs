//! Transport capability interface.
//!
//! The messaging network itself is an opaque collaborator: this crate only
//! fixes the seam — one connection per account, a typed event stream with
//! per-connection ordering, a send operation, and an explicit teardown.
//! Concrete backends live outside the workspace; `testing` provides a
//! scripted in-memory backend for the test suites of dependent crates.

pub mod connection;
pub mod error;
pub mod event;
pub mod testing;

pub use {
    connection::{EVENT_CHANNEL_CAPACITY, Transport, TransportConnection},
    error::{Error, Result},
    event::{GroupInfo, InboundMessage, MediaInfo, SendReceipt, TransportEvent},
};
