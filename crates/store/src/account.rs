use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::Result;

/// Connection lifecycle status of an account.
///
/// `AuthFailed` and `Disconnected` are terminal: the account is never
/// re-attached automatically and must be explicitly restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Initializing,
    QrReady,
    Ready,
    AuthFailed,
    Disconnected,
}

impl AccountStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::QrReady => "qr_ready",
            Self::Ready => "ready",
            Self::AuthFailed => "auth_failed",
            Self::Disconnected => "disconnected",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "initializing" => Some(Self::Initializing),
            "qr_ready" => Some(Self::QrReady),
            "ready" => Some(Self::Ready),
            "auth_failed" => Some(Self::AuthFailed),
            "disconnected" => Some(Self::Disconnected),
            _ => None,
        }
    }

    /// Whether a persisted account in this status is re-attached at startup.
    #[must_use]
    pub fn is_reconnectable(self) -> bool {
        matches!(self, Self::Ready | Self::QrReady)
    }

    /// Whether the account is still working towards `Ready`. Only these
    /// states accept `qr`/`ready` transport events; anything later (or
    /// terminal) ignores them.
    #[must_use]
    pub fn is_authenticating(self) -> bool {
        matches!(self, Self::Initializing | Self::QrReady)
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted messaging account.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: AccountStatus,
    pub phone_number: Option<String>,
    /// Raw QR code persisted while the account waits for a scan.
    pub qr_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A single status transition to persist.
///
/// `qr_code` and `error_message` overwrite the stored values (so a `None`
/// clears them); `phone_number` is only written when `Some`, since a later
/// disconnect must not erase the resolved identity.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: AccountStatus,
    pub qr_code: Option<String>,
    pub phone_number: Option<String>,
    pub error_message: Option<String>,
}

impl StatusUpdate {
    #[must_use]
    pub fn new(status: AccountStatus) -> Self {
        Self {
            status,
            qr_code: None,
            phone_number: None,
            error_message: None,
        }
    }
}

/// Persistent storage for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, account: &Account) -> Result<()>;
    async fn list(&self) -> Result<Vec<Account>>;
    async fn get(&self, id: &str) -> Result<Option<Account>>;
    /// Update the operator-editable fields (name, description).
    async fn update(&self, account: &Account) -> Result<()>;
    /// Persist a lifecycle transition.
    async fn update_status(&self, id: &str, update: StatusUpdate) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            AccountStatus::Initializing,
            AccountStatus::QrReady,
            AccountStatus::Ready,
            AccountStatus::AuthFailed,
            AccountStatus::Disconnected,
        ] {
            assert_eq!(AccountStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AccountStatus::parse("bogus"), None);
    }

    #[test]
    fn only_pre_ready_states_accept_auth_events() {
        assert!(AccountStatus::Initializing.is_authenticating());
        assert!(AccountStatus::QrReady.is_authenticating());
        assert!(!AccountStatus::Ready.is_authenticating());
        assert!(!AccountStatus::AuthFailed.is_authenticating());
        assert!(!AccountStatus::Disconnected.is_authenticating());
    }

    #[test]
    fn only_ready_and_qr_ready_reconnect() {
        assert!(AccountStatus::Ready.is_reconnectable());
        assert!(AccountStatus::QrReady.is_reconnectable());
        assert!(!AccountStatus::Initializing.is_reconnectable());
        assert!(!AccountStatus::AuthFailed.is_reconnectable());
        assert!(!AccountStatus::Disconnected.is_reconnectable());
    }
}
