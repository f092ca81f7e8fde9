use {async_trait::async_trait, serde::Serialize};

use crate::Result;

/// A callback subscriber attached to one account.
#[derive(Debug, Clone, Serialize)]
pub struct Webhook {
    pub id: String,
    pub account_id: String,
    pub url: String,
    /// Shared secret sent back on every delivery; empty header when absent.
    pub secret: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Persistent storage for webhook subscribers.
#[async_trait]
pub trait WebhookStore: Send + Sync {
    async fn create(&self, webhook: &Webhook) -> Result<()>;
    async fn list_by_account(&self, account_id: &str) -> Result<Vec<Webhook>>;
    async fn get(&self, id: &str) -> Result<Option<Webhook>>;
    async fn update(&self, webhook: &Webhook) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
    /// Cascade helper used when an account is deleted.
    async fn delete_by_account(&self, account_id: &str) -> Result<()>;
}
