use {async_trait::async_trait, tokio::sync::mpsc};

use crate::{
    Result,
    event::{SendReceipt, TransportEvent},
};

/// Bound of the per-connection event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Factory for per-account connections to the messaging network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection for `account_id`.
    ///
    /// Returns the connection handle plus the receiving end of its event
    /// stream. Events arrive in transport order; dropping the connection
    /// (or calling `destroy`) closes the stream.
    async fn connect(
        &self,
        account_id: &str,
    ) -> Result<(Box<dyn TransportConnection>, mpsc::Receiver<TransportEvent>)>;
}

/// One live connection to the messaging network.
#[async_trait]
pub trait TransportConnection: Send + Sync {
    /// Send a message to an already-normalized transport address.
    async fn send_message(&self, to: &str, body: &str) -> Result<SendReceipt>;

    /// Tear the connection down and release its resources. Idempotent.
    async fn destroy(&self) -> Result<()>;
}
