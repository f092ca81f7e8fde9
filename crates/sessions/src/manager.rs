use std::sync::Arc;

use tracing::{debug, info, warn};

use {
    courier_store::{
        Account, AccountStatus, AccountStore, MessageLog, NewMessageLogEntry, StatusUpdate,
        WebhookStore, unix_now,
    },
    courier_transport::{SendReceipt, Transport, TransportConnection},
    courier_webhooks::WebhookDispatcher,
};

use crate::{
    Error, Result,
    outbound::{SendConfig, normalize_destination},
    registry::{SessionHandle, SessionRegistry},
    session::{SessionContext, run_event_loop},
};

/// Owns the live sessions and coordinates them with the persistent store,
/// the transport, and the webhook dispatcher.
pub struct SessionManager {
    registry: SessionRegistry,
    accounts: Arc<dyn AccountStore>,
    webhooks: Arc<dyn WebhookStore>,
    log: Arc<dyn MessageLog>,
    transport: Arc<dyn Transport>,
    dispatcher: WebhookDispatcher,
    send_config: SendConfig,
}

impl SessionManager {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        webhooks: Arc<dyn WebhookStore>,
        log: Arc<dyn MessageLog>,
        transport: Arc<dyn Transport>,
        send_config: SendConfig,
    ) -> Self {
        let dispatcher = WebhookDispatcher::new(Arc::clone(&webhooks), Arc::clone(&log));
        Self {
            registry: SessionRegistry::new(),
            accounts,
            webhooks,
            log,
            transport,
            dispatcher,
            send_config,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Persist a new account and start its session.
    pub async fn create_account(&self, name: &str, description: Option<String>) -> Result<Account> {
        if name.trim().is_empty() {
            return Err(Error::invalid_input("account name is required"));
        }

        let now = unix_now();
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description,
            status: AccountStatus::Initializing,
            phone_number: None,
            qr_code: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        };
        self.accounts.create(&account).await?;
        self.start_session(&account.id).await?;
        Ok(account)
    }

    /// Attach a transport session to an existing account.
    ///
    /// The registry insert is the atomic claim: a concurrent start for the
    /// same account loses with `AlreadyExists` before anything connects. A
    /// connect failure releases the claim and persists `Disconnected` with
    /// the reason.
    pub async fn start_session(&self, account_id: &str) -> Result<()> {
        let handle = SessionHandle::new(account_id);
        self.registry.insert(handle.clone())?;

        if let Err(e) = self
            .accounts
            .update_status(account_id, StatusUpdate::new(AccountStatus::Initializing))
            .await
        {
            self.registry.remove(account_id);
            return Err(e.into());
        }

        match self.transport.connect(account_id).await {
            Ok((connection, events)) => {
                let connection: Arc<dyn TransportConnection> = Arc::from(connection);
                handle.set_connection(connection);

                let ctx = SessionContext {
                    account_id: account_id.to_string(),
                    handle: handle.clone(),
                    accounts: Arc::clone(&self.accounts),
                    log: Arc::clone(&self.log),
                    dispatcher: self.dispatcher.clone(),
                };
                handle.set_task(tokio::spawn(run_event_loop(ctx, events)));
                info!(account_id, "session started");
                Ok(())
            },
            Err(e) => {
                self.registry.remove(account_id);
                let update = StatusUpdate {
                    error_message: Some(e.to_string()),
                    ..StatusUpdate::new(AccountStatus::Disconnected)
                };
                if let Err(persist_err) = self.accounts.update_status(account_id, update).await {
                    warn!(account_id, error = %persist_err, "failed to persist connect failure");
                }
                Err(e.into())
            },
        }
    }

    /// Tear down the account's live session, if any. Idempotent.
    pub async fn stop_session(&self, account_id: &str) -> Result<()> {
        let Some(handle) = self.registry.remove(account_id) else {
            debug!(account_id, "no live session to stop");
            return Ok(());
        };

        if let Some(connection) = handle.connection() {
            if let Err(e) = connection.destroy().await {
                warn!(account_id, error = %e, "failed to destroy transport connection");
            }
        }
        if let Some(task) = handle.take_task() {
            task.abort();
        }
        info!(account_id, "session stopped");
        Ok(())
    }

    /// Stop the session and delete the account with its webhooks.
    /// Message-log entries are retained.
    pub async fn delete_account(&self, account_id: &str) -> Result<()> {
        self.stop_session(account_id).await?;
        self.webhooks.delete_by_account(account_id).await?;
        self.accounts.delete(account_id).await?;
        info!(account_id, "account deleted");
        Ok(())
    }

    /// Re-attach sessions for every persisted account whose last known
    /// status allows it. Terminal accounts stay untouched; a failed
    /// re-attach leaves the account `Disconnected` with the reason.
    /// Returns how many sessions were re-attached.
    pub async fn restore_sessions(&self) -> Result<usize> {
        let accounts = self.accounts.list().await?;
        let mut restored = 0;

        for account in accounts {
            if !account.status.is_reconnectable() {
                debug!(
                    account_id = %account.id,
                    status = %account.status,
                    "skipping account at startup"
                );
                continue;
            }
            match self.start_session(&account.id).await {
                Ok(()) => restored += 1,
                Err(Error::AlreadyExists { .. }) => {},
                Err(e) => {
                    warn!(account_id = %account.id, error = %e, "failed to re-attach session");
                },
            }
        }

        Ok(restored)
    }

    /// Send a message through the account's live, ready session.
    ///
    /// Validation and readiness failures are returned without touching the
    /// log; only an actual transport failure is recorded as a failed
    /// outgoing entry.
    pub async fn send_message(
        &self,
        account_id: &str,
        destination: &str,
        body: &str,
    ) -> Result<SendReceipt> {
        if destination.trim().is_empty() {
            return Err(Error::invalid_input("destination is required"));
        }
        if body.is_empty() {
            return Err(Error::invalid_input("message body is required"));
        }

        let handle = self
            .registry
            .get(account_id)
            .ok_or_else(|| Error::not_found(account_id))?;
        let status = handle.status();
        if status != AccountStatus::Ready {
            return Err(Error::not_ready(account_id, status));
        }
        let connection = handle
            .connection()
            .ok_or_else(|| Error::not_ready(account_id, status))?;

        let to = normalize_destination(destination, &self.send_config);
        match connection.send_message(&to, body).await {
            Ok(receipt) => {
                let entry = NewMessageLogEntry::outgoing(account_id, &to, body);
                if let Err(e) = self.log.append(entry).await {
                    warn!(account_id, error = %e, "failed to log outgoing message");
                }
                Ok(receipt)
            },
            Err(e) => {
                let entry = NewMessageLogEntry::outgoing_failed(account_id, &to, body, &e.to_string());
                if let Err(log_err) = self.log.append(entry).await {
                    warn!(account_id, error = %log_err, "failed to log send failure");
                }
                Err(e.into())
            },
        }
    }

    /// Cached status of the live session, if any.
    #[must_use]
    pub fn status(&self, account_id: &str) -> Option<AccountStatus> {
        self.registry.get(account_id).map(|h| h.status())
    }

    /// Cached QR code of the live session, if one is waiting for a scan.
    #[must_use]
    pub fn qr_code(&self, account_id: &str) -> Option<String> {
        self.registry.get(account_id).and_then(|h| h.qr_code())
    }

    /// Account ids with a live session.
    #[must_use]
    pub fn live_accounts(&self) -> Vec<String> {
        self.registry.ids()
    }
}
