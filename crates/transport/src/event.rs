use serde::{Deserialize, Serialize};

/// Media attached to an inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub mime_type: String,
    pub filename: Option<String>,
    pub size_bytes: Option<u64>,
}

/// Group/channel context of an inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub group_id: String,
    pub subject: Option<String>,
    /// Group member the message came from, when it differs from `from`.
    pub participant: Option<String>,
}

/// An inbound message as emitted by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    pub body: String,
    pub timestamp: i64,
    pub media: Option<MediaInfo>,
    pub group: Option<GroupInfo>,
}

/// Lifecycle and message events, delivered in arrival order per connection.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A QR code is ready to be scanned.
    Qr { code: String },
    /// The connection is authenticated and usable; identity resolved.
    Ready { phone_number: String },
    /// Intermediate auth signal; no lifecycle transition.
    Authenticated,
    /// Authentication failed; the account will not recover on its own.
    AuthFailure { reason: String },
    /// The connection dropped.
    Disconnected { reason: String },
    /// An inbound message arrived.
    Message(InboundMessage),
}

/// Receipt returned by a successful send.
#[derive(Debug, Clone, Serialize)]
pub struct SendReceipt {
    pub message_id: String,
    pub from: Option<String>,
    pub to: String,
    pub timestamp: i64,
}
