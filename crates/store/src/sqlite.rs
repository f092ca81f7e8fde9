//! SQLite implementations of the store traits.

use {
    async_trait::async_trait,
    sqlx::{
        SqlitePool,
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    },
};

use crate::{
    Error, Result, unix_now,
    account::{Account, AccountStatus, AccountStore, StatusUpdate},
    message_log::{
        DeliveryStatus, MessageDirection, MessageLog, MessageLogEntry, MessageStats,
        NewMessageLogEntry,
    },
    webhook::{Webhook, WebhookStore},
};

/// Open (creating if missing) the database at `path`.
pub async fn open_pool(path: &std::path::Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(pool)
}

/// Create all tables and indexes.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    SqliteAccountStore::init(pool).await?;
    SqliteWebhookStore::init(pool).await?;
    SqliteMessageLog::init(pool).await?;
    Ok(())
}

// ── Accounts ────────────────────────────────────────────────────────────────

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    name: String,
    description: Option<String>,
    status: String,
    phone_number: Option<String>,
    qr_code: Option<String>,
    error_message: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<AccountRow> for Account {
    type Error = Error;

    fn try_from(r: AccountRow) -> Result<Self> {
        let status = AccountStatus::parse(&r.status)
            .ok_or_else(|| Error::invalid_column("status", r.status.clone()))?;
        Ok(Self {
            id: r.id,
            name: r.name,
            description: r.description,
            status,
            phone_number: r.phone_number,
            qr_code: r.qr_code,
            error_message: r.error_message,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// SQLite-backed account store.
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the accounts table schema.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts (
                id            TEXT    PRIMARY KEY,
                name          TEXT    NOT NULL,
                description   TEXT,
                status        TEXT    NOT NULL,
                phone_number  TEXT,
                qr_code       TEXT,
                error_message TEXT,
                created_at    INTEGER NOT NULL,
                updated_at    INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create(&self, account: &Account) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts
             (id, name, description, status, phone_number, qr_code, error_message,
              created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.description)
        .bind(account.status.as_str())
        .bind(&account.phone_number)
        .bind(&account.qr_code)
        .bind(&account.error_message)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let rows =
            sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, account: &Account) -> Result<()> {
        sqlx::query("UPDATE accounts SET name = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(&account.name)
            .bind(&account.description)
            .bind(unix_now())
            .bind(&account.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_status(&self, id: &str, update: StatusUpdate) -> Result<()> {
        sqlx::query(
            "UPDATE accounts
             SET status = ?,
                 qr_code = ?,
                 phone_number = COALESCE(?, phone_number),
                 error_message = ?,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(update.status.as_str())
        .bind(&update.qr_code)
        .bind(&update.phone_number)
        .bind(&update.error_message)
        .bind(unix_now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// ── Webhooks ────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct WebhookRow {
    id: String,
    account_id: String,
    url: String,
    secret: Option<String>,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl From<WebhookRow> for Webhook {
    fn from(r: WebhookRow) -> Self {
        Self {
            id: r.id,
            account_id: r.account_id,
            url: r.url,
            secret: r.secret,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// SQLite-backed webhook store.
pub struct SqliteWebhookStore {
    pool: SqlitePool,
}

impl SqliteWebhookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the webhooks table schema.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS webhooks (
                id         TEXT    PRIMARY KEY,
                account_id TEXT    NOT NULL,
                url        TEXT    NOT NULL,
                secret     TEXT,
                is_active  INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_webhooks_account
             ON webhooks (account_id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl WebhookStore for SqliteWebhookStore {
    async fn create(&self, webhook: &Webhook) -> Result<()> {
        sqlx::query(
            "INSERT INTO webhooks
             (id, account_id, url, secret, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&webhook.id)
        .bind(&webhook.account_id)
        .bind(&webhook.url)
        .bind(&webhook.secret)
        .bind(webhook.is_active)
        .bind(webhook.created_at)
        .bind(webhook.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_by_account(&self, account_id: &str) -> Result<Vec<Webhook>> {
        let rows = sqlx::query_as::<_, WebhookRow>(
            "SELECT * FROM webhooks WHERE account_id = ? ORDER BY created_at ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Webhook>> {
        let row = sqlx::query_as::<_, WebhookRow>("SELECT * FROM webhooks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn update(&self, webhook: &Webhook) -> Result<()> {
        sqlx::query(
            "UPDATE webhooks SET url = ?, secret = ?, is_active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&webhook.url)
        .bind(&webhook.secret)
        .bind(webhook.is_active)
        .bind(unix_now())
        .bind(&webhook.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM webhooks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_account(&self, account_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM webhooks WHERE account_id = ?")
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// ── Message log ─────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    account_id: String,
    direction: String,
    sender: Option<String>,
    recipient: Option<String>,
    body: String,
    status: String,
    webhook_id: Option<String>,
    webhook_url: Option<String>,
    error_message: Option<String>,
    created_at: i64,
}

impl TryFrom<LogRow> for MessageLogEntry {
    type Error = Error;

    fn try_from(r: LogRow) -> Result<Self> {
        let direction = MessageDirection::parse(&r.direction)
            .ok_or_else(|| Error::invalid_column("direction", r.direction.clone()))?;
        let status = DeliveryStatus::parse(&r.status)
            .ok_or_else(|| Error::invalid_column("status", r.status.clone()))?;
        Ok(Self {
            id: r.id,
            account_id: r.account_id,
            direction,
            sender: r.sender,
            recipient: r.recipient,
            body: r.body,
            status,
            webhook_id: r.webhook_id,
            webhook_url: r.webhook_url,
            error_message: r.error_message,
            created_at: r.created_at,
        })
    }
}

/// SQLite-backed append-only message log.
pub struct SqliteMessageLog {
    pool: SqlitePool,
}

impl SqliteMessageLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the message_log table schema.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS message_log (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id    TEXT    NOT NULL,
                direction     TEXT    NOT NULL,
                sender        TEXT,
                recipient     TEXT,
                body          TEXT    NOT NULL,
                status        TEXT    NOT NULL,
                webhook_id    TEXT,
                webhook_url   TEXT,
                error_message TEXT,
                created_at    INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_message_log_account_created
             ON message_log (account_id, created_at DESC)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl MessageLog for SqliteMessageLog {
    async fn append(&self, entry: NewMessageLogEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO message_log
             (account_id, direction, sender, recipient, body, status,
              webhook_id, webhook_url, error_message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.account_id)
        .bind(entry.direction.as_str())
        .bind(&entry.sender)
        .bind(&entry.recipient)
        .bind(&entry.body)
        .bind(entry.status.as_str())
        .bind(&entry.webhook_id)
        .bind(&entry.webhook_url)
        .bind(&entry.error_message)
        .bind(unix_now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_by_account(&self, account_id: &str, limit: u32) -> Result<Vec<MessageLogEntry>> {
        let rows = sqlx::query_as::<_, LogRow>(
            "SELECT * FROM message_log
             WHERE account_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(account_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn stats_by_account(&self, account_id: &str) -> Result<MessageStats> {
        let row = sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN direction = 'incoming' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN direction = 'outgoing' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN direction IN ('webhook', 'webhook_incoming')
                                 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0)
             FROM message_log
             WHERE account_id = ?",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(MessageStats {
            total: row.0,
            incoming: row.1,
            outgoing: row.2,
            webhook: row.3,
            failed: row.4,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    fn sample_account(id: &str) -> Account {
        Account {
            id: id.into(),
            name: "Support line".into(),
            description: None,
            status: AccountStatus::Initializing,
            phone_number: None,
            qr_code: None,
            error_message: None,
            created_at: 1700000000,
            updated_at: 1700000000,
        }
    }

    fn sample_webhook(id: &str, account_id: &str) -> Webhook {
        Webhook {
            id: id.into(),
            account_id: account_id.into(),
            url: format!("https://example.com/{id}"),
            secret: Some("s3cret".into()),
            is_active: true,
            created_at: 1700000000,
            updated_at: 1700000000,
        }
    }

    #[tokio::test]
    async fn account_crud_round_trip() {
        let pool = test_pool().await;
        let store = SqliteAccountStore::new(pool);

        store.create(&sample_account("acc-1")).await.unwrap();
        let fetched = store.get("acc-1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Support line");
        assert_eq!(fetched.status, AccountStatus::Initializing);

        let mut edited = fetched.clone();
        edited.name = "Sales line".into();
        edited.description = Some("primary".into());
        store.update(&edited).await.unwrap();
        let fetched = store.get("acc-1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Sales line");
        assert_eq!(fetched.description.as_deref(), Some("primary"));

        assert_eq!(store.list().await.unwrap().len(), 1);
        store.delete("acc-1").await.unwrap();
        assert!(store.get("acc-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn status_update_overwrites_qr_but_keeps_phone() {
        let pool = test_pool().await;
        let store = SqliteAccountStore::new(pool);
        store.create(&sample_account("acc-1")).await.unwrap();

        store
            .update_status(
                "acc-1",
                StatusUpdate {
                    qr_code: Some("QR-DATA".into()),
                    ..StatusUpdate::new(AccountStatus::QrReady)
                },
            )
            .await
            .unwrap();
        let account = store.get("acc-1").await.unwrap().unwrap();
        assert_eq!(account.status, AccountStatus::QrReady);
        assert_eq!(account.qr_code.as_deref(), Some("QR-DATA"));

        store
            .update_status(
                "acc-1",
                StatusUpdate {
                    phone_number: Some("1555000111".into()),
                    ..StatusUpdate::new(AccountStatus::Ready)
                },
            )
            .await
            .unwrap();
        let account = store.get("acc-1").await.unwrap().unwrap();
        assert_eq!(account.status, AccountStatus::Ready);
        assert!(account.qr_code.is_none());
        assert_eq!(account.phone_number.as_deref(), Some("1555000111"));

        // A disconnect keeps the resolved phone identity.
        store
            .update_status(
                "acc-1",
                StatusUpdate {
                    error_message: Some("stream closed".into()),
                    ..StatusUpdate::new(AccountStatus::Disconnected)
                },
            )
            .await
            .unwrap();
        let account = store.get("acc-1").await.unwrap().unwrap();
        assert_eq!(account.status, AccountStatus::Disconnected);
        assert_eq!(account.phone_number.as_deref(), Some("1555000111"));
        assert_eq!(account.error_message.as_deref(), Some("stream closed"));
    }

    #[tokio::test]
    async fn webhook_crud_and_cascade() {
        let pool = test_pool().await;
        let store = SqliteWebhookStore::new(pool);

        store.create(&sample_webhook("wh-1", "acc-1")).await.unwrap();
        store.create(&sample_webhook("wh-2", "acc-1")).await.unwrap();
        store.create(&sample_webhook("wh-3", "acc-2")).await.unwrap();

        assert_eq!(store.list_by_account("acc-1").await.unwrap().len(), 2);

        let mut hook = store.get("wh-1").await.unwrap().unwrap();
        hook.is_active = false;
        store.update(&hook).await.unwrap();
        assert!(!store.get("wh-1").await.unwrap().unwrap().is_active);

        store.delete_by_account("acc-1").await.unwrap();
        assert!(store.list_by_account("acc-1").await.unwrap().is_empty());
        assert_eq!(store.list_by_account("acc-2").await.unwrap().len(), 1);

        store.delete("wh-3").await.unwrap();
        assert!(store.get("wh-3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn message_log_append_list_and_stats() {
        let pool = test_pool().await;
        let log = SqliteMessageLog::new(pool);
        let hook = sample_webhook("wh-1", "acc-1");

        log.append(NewMessageLogEntry::incoming("acc-1", "155", "166", "hi"))
            .await
            .unwrap();
        log.append(NewMessageLogEntry::outgoing("acc-1", "177", "yo"))
            .await
            .unwrap();
        log.append(NewMessageLogEntry::webhook_failed("acc-1", &hook, "hi", "timeout"))
            .await
            .unwrap();
        log.append(NewMessageLogEntry::incoming("acc-2", "199", "166", "other"))
            .await
            .unwrap();

        let entries = log.list_by_account("acc-1", 50).await.unwrap();
        assert_eq!(entries.len(), 3);
        // Newest first.
        assert_eq!(entries[0].direction, MessageDirection::Webhook);
        assert_eq!(entries[0].webhook_id.as_deref(), Some("wh-1"));

        let limited = log.list_by_account("acc-1", 2).await.unwrap();
        assert_eq!(limited.len(), 2);

        let stats = log.stats_by_account("acc-1").await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.incoming, 1);
        assert_eq!(stats.outgoing, 1);
        assert_eq!(stats.webhook, 1);
        assert_eq!(stats.failed, 1);

        let empty = log.stats_by_account("acc-9").await.unwrap();
        assert_eq!(empty.total, 0);
        assert_eq!(empty.failed, 0);
    }
}
