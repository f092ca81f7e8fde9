use {async_trait::async_trait, serde::Serialize};

use crate::{Result, webhook::Webhook};

/// Which way a logged message travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    /// Received from the transport.
    Incoming,
    /// Sent through the transport.
    Outgoing,
    /// A delivery attempt to a webhook subscriber.
    Webhook,
    /// A call received on the inbound-webhook surface.
    WebhookIncoming,
}

impl MessageDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
            Self::Webhook => "webhook",
            Self::WebhookIncoming => "webhook_incoming",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incoming" => Some(Self::Incoming),
            "outgoing" => Some(Self::Outgoing),
            "webhook" => Some(Self::Webhook),
            "webhook_incoming" => Some(Self::WebhookIncoming),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded for a logged message or delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Success,
    Failed,
}

impl DeliveryStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message-log row. Append-only; rows are never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct MessageLogEntry {
    pub id: i64,
    pub account_id: String,
    pub direction: MessageDirection,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub body: String,
    pub status: DeliveryStatus,
    pub webhook_id: Option<String>,
    pub webhook_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: i64,
}

/// A log row to append. The store stamps `created_at` at write time.
#[derive(Debug, Clone)]
pub struct NewMessageLogEntry {
    pub account_id: String,
    pub direction: MessageDirection,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub body: String,
    pub status: DeliveryStatus,
    pub webhook_id: Option<String>,
    pub webhook_url: Option<String>,
    pub error_message: Option<String>,
}

impl NewMessageLogEntry {
    fn base(account_id: &str, direction: MessageDirection, body: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            direction,
            sender: None,
            recipient: None,
            body: body.to_string(),
            status: DeliveryStatus::Success,
            webhook_id: None,
            webhook_url: None,
            error_message: None,
        }
    }

    #[must_use]
    pub fn incoming(account_id: &str, sender: &str, recipient: &str, body: &str) -> Self {
        Self {
            sender: Some(sender.to_string()),
            recipient: Some(recipient.to_string()),
            ..Self::base(account_id, MessageDirection::Incoming, body)
        }
    }

    #[must_use]
    pub fn incoming_failed(
        account_id: &str,
        sender: &str,
        recipient: &str,
        body: &str,
        error: &str,
    ) -> Self {
        Self {
            status: DeliveryStatus::Failed,
            error_message: Some(error.to_string()),
            ..Self::incoming(account_id, sender, recipient, body)
        }
    }

    #[must_use]
    pub fn outgoing(account_id: &str, recipient: &str, body: &str) -> Self {
        Self {
            recipient: Some(recipient.to_string()),
            ..Self::base(account_id, MessageDirection::Outgoing, body)
        }
    }

    #[must_use]
    pub fn outgoing_failed(account_id: &str, recipient: &str, body: &str, error: &str) -> Self {
        Self {
            status: DeliveryStatus::Failed,
            error_message: Some(error.to_string()),
            ..Self::outgoing(account_id, recipient, body)
        }
    }

    #[must_use]
    pub fn webhook_success(account_id: &str, webhook: &Webhook, body: &str) -> Self {
        Self {
            webhook_id: Some(webhook.id.clone()),
            webhook_url: Some(webhook.url.clone()),
            ..Self::base(account_id, MessageDirection::Webhook, body)
        }
    }

    #[must_use]
    pub fn webhook_failed(account_id: &str, webhook: &Webhook, body: &str, error: &str) -> Self {
        Self {
            status: DeliveryStatus::Failed,
            error_message: Some(error.to_string()),
            ..Self::webhook_success(account_id, webhook, body)
        }
    }
}

/// Per-account aggregate over the message log.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MessageStats {
    pub total: i64,
    pub incoming: i64,
    pub outgoing: i64,
    pub webhook: i64,
    pub failed: i64,
}

/// Append-only persistent log of message activity and delivery outcomes.
///
/// There is deliberately no per-entry delete or update: log rows are
/// retained even after their account is removed.
#[async_trait]
pub trait MessageLog: Send + Sync {
    async fn append(&self, entry: NewMessageLogEntry) -> Result<()>;
    async fn list_by_account(&self, account_id: &str, limit: u32) -> Result<Vec<MessageLogEntry>>;
    async fn stats_by_account(&self, account_id: &str) -> Result<MessageStats>;
}
