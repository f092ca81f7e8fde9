//! Webhook fan-out engine.
//!
//! One inbound message is delivered to every active subscriber of its
//! account concurrently; every attempt records its own delivery-outcome
//! log entry, and no subscriber can affect another's outcome.

pub mod dispatcher;
pub mod payload;

pub use {
    dispatcher::{ACCOUNT_HEADER, DELIVERY_TIMEOUT, SECRET_HEADER, WebhookDispatcher},
    payload::MessagePayload,
};
