//! Scripted in-memory transport for tests.
//!
//! Tests drive lifecycle and message events by hand and inspect what was
//! sent or destroyed; dependent crates use this to exercise their session
//! and dispatch logic without a real messaging backend.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use {async_trait::async_trait, tokio::sync::mpsc};

use crate::{
    Error, Result,
    connection::{EVENT_CHANNEL_CAPACITY, Transport, TransportConnection},
    event::{SendReceipt, TransportEvent},
};

/// A message recorded by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub account_id: String,
    pub to: String,
    pub body: String,
}

#[derive(Default)]
struct Shared {
    senders: Mutex<HashMap<String, mpsc::Sender<TransportEvent>>>,
    connects: Mutex<Vec<String>>,
    sent: Mutex<Vec<SentMessage>>,
    destroyed: Mutex<HashSet<String>>,
    fail_connect: AtomicBool,
    fail_send: AtomicBool,
    send_counter: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Transport whose events are scripted by the test.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    shared: Arc<Shared>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `connect` calls fail.
    pub fn set_fail_connect(&self, fail: bool) {
        self.shared.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `send_message` calls fail.
    pub fn set_fail_send(&self, fail: bool) {
        self.shared.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Deliver an event to the account's live connection, if any.
    pub async fn emit(&self, account_id: &str, event: TransportEvent) {
        let sender = lock(&self.shared.senders).get(account_id).cloned();
        if let Some(sender) = sender {
            let _ = sender.send(event).await;
        }
    }

    /// Account ids `connect` was called for, in order.
    #[must_use]
    pub fn connected_accounts(&self) -> Vec<String> {
        lock(&self.shared.connects).clone()
    }

    /// Everything sent through any connection, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.shared.sent).clone()
    }

    /// Whether the account's connection was destroyed.
    #[must_use]
    pub fn destroyed(&self, account_id: &str) -> bool {
        lock(&self.shared.destroyed).contains(account_id)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(
        &self,
        account_id: &str,
    ) -> Result<(Box<dyn TransportConnection>, mpsc::Receiver<TransportEvent>)> {
        if self.shared.fail_connect.load(Ordering::SeqCst) {
            return Err(Error::connect("scripted connect failure"));
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        lock(&self.shared.senders).insert(account_id.to_string(), tx);
        lock(&self.shared.connects).push(account_id.to_string());

        let connection = ScriptedConnection {
            account_id: account_id.to_string(),
            shared: Arc::clone(&self.shared),
        };
        Ok((Box::new(connection), rx))
    }
}

struct ScriptedConnection {
    account_id: String,
    shared: Arc<Shared>,
}

#[async_trait]
impl TransportConnection for ScriptedConnection {
    async fn send_message(&self, to: &str, body: &str) -> Result<SendReceipt> {
        if self.shared.fail_send.load(Ordering::SeqCst) {
            return Err(Error::send("scripted send failure"));
        }

        lock(&self.shared.sent).push(SentMessage {
            account_id: self.account_id.clone(),
            to: to.to_string(),
            body: body.to_string(),
        });

        let n = self.shared.send_counter.fetch_add(1, Ordering::SeqCst);
        Ok(SendReceipt {
            message_id: format!("scripted-{n}"),
            from: Some(self.account_id.clone()),
            to: to.to_string(),
            timestamp: 1700000000,
        })
    }

    async fn destroy(&self) -> Result<()> {
        // Dropping the sender closes the event stream.
        lock(&self.shared.senders).remove(&self.account_id);
        lock(&self.shared.destroyed).insert(self.account_id.clone());
        Ok(())
    }
}
