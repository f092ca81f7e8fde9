use courier_store::AccountStatus;

/// Crate-wide result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed session errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input payload or parameter is invalid; rejected before any state change.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A session for this account is already live.
    #[error("session already exists for account: {account_id}")]
    AlreadyExists { account_id: String },

    /// No live session for this account.
    #[error("no live session for account: {account_id}")]
    NotFound { account_id: String },

    /// The session exists but is not in the `ready` state.
    #[error("session for account {account_id} is not ready (status: {status})")]
    NotReady {
        account_id: String,
        status: AccountStatus,
    },

    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] courier_transport::Error),

    /// The persistent store failed.
    #[error(transparent)]
    Store(#[from] courier_store::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn already_exists(account_id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            account_id: account_id.into(),
        }
    }

    #[must_use]
    pub fn not_found(account_id: impl Into<String>) -> Self {
        Self::NotFound {
            account_id: account_id.into(),
        }
    }

    #[must_use]
    pub fn not_ready(account_id: impl Into<String>, status: AccountStatus) -> Self {
        Self::NotReady {
            account_id: account_id.into(),
            status,
        }
    }
}
