/// Crate-wide result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed transport errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Establishing the connection failed.
    #[error("transport connect failed: {message}")]
    Connect { message: String },

    /// The underlying send call failed.
    #[error("transport send failed: {message}")]
    Send { message: String },

    /// The connection is gone.
    #[error("transport connection closed")]
    Closed,
}

impl Error {
    #[must_use]
    pub fn connect(message: impl std::fmt::Display) -> Self {
        Self::Connect {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn send(message: impl std::fmt::Display) -> Self {
        Self::Send {
            message: message.to_string(),
        }
    }
}
