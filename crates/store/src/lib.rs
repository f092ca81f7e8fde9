//! Persistent store for the courier gateway.
//!
//! Defines the durable data model (accounts, webhooks, message log) and the
//! async store traits the session and dispatch layers depend on, plus the
//! SQLite implementations used by the binary and the test suites.

pub mod account;
pub mod error;
pub mod message_log;
pub mod sqlite;
pub mod webhook;

pub use {
    account::{Account, AccountStatus, AccountStore, StatusUpdate},
    error::{Error, Result},
    message_log::{
        DeliveryStatus, MessageDirection, MessageLog, MessageLogEntry, MessageStats,
        NewMessageLogEntry,
    },
    webhook::{Webhook, WebhookStore},
};

/// Current unix time in seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
