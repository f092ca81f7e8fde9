use std::{sync::Arc, time::Duration};

use {
    tokio::task::JoinSet,
    tracing::{debug, warn},
};

use courier_store::{MessageLog, NewMessageLogEntry, Webhook, WebhookStore};

use crate::payload::MessagePayload;

/// Header carrying the subscriber's shared secret (empty when none is set).
pub const SECRET_HEADER: &str = "X-Webhook-Secret";

/// Header carrying the originating account id.
pub const ACCOUNT_HEADER: &str = "X-Account-Id";

/// Hard bound on each delivery attempt.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Fans one message payload out to all active subscribers of an account.
///
/// Deliveries run as independent tasks; each records its own outcome entry
/// in the message log. There is no retry: one attempt per subscriber per
/// message.
#[derive(Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    webhooks: Arc<dyn WebhookStore>,
    log: Arc<dyn MessageLog>,
}

impl WebhookDispatcher {
    pub fn new(webhooks: Arc<dyn WebhookStore>, log: Arc<dyn MessageLog>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhooks,
            log,
        }
    }

    /// Fire-and-forget fan-out; returns immediately so ingestion of the
    /// next event never waits on any subscriber.
    pub fn dispatch(&self, payload: MessagePayload) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            match dispatcher.fan_out(payload).await {
                Ok(attempted) => debug!(attempted, "webhook fan-out finished"),
                Err(e) => warn!(error = %e, "webhook fan-out skipped"),
            }
        });
    }

    /// Deliver `payload` to every active subscriber of its account and wait
    /// for all outcomes to be recorded. Returns the number of attempts.
    pub async fn fan_out(&self, payload: MessagePayload) -> courier_store::Result<usize> {
        let hooks = self.webhooks.list_by_account(&payload.account_id).await?;
        let active: Vec<Webhook> = hooks.into_iter().filter(|w| w.is_active).collect();
        let attempted = active.len();

        let mut deliveries = JoinSet::new();
        for hook in active {
            let client = self.client.clone();
            let log = Arc::clone(&self.log);
            let payload = payload.clone();
            deliveries.spawn(async move {
                deliver_and_record(&client, log.as_ref(), &hook, &payload).await;
            });
        }

        while let Some(joined) = deliveries.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "webhook delivery task aborted");
            }
        }

        Ok(attempted)
    }
}

/// One delivery attempt plus its accounting. Failures stay local: the
/// outcome entry (or a warning when even that fails) is the only effect.
async fn deliver_and_record(
    client: &reqwest::Client,
    log: &dyn MessageLog,
    hook: &Webhook,
    payload: &MessagePayload,
) {
    let outcome = deliver(client, hook, payload).await;

    let entry = match &outcome {
        Ok(()) => NewMessageLogEntry::webhook_success(&payload.account_id, hook, &payload.body),
        Err(reason) => {
            NewMessageLogEntry::webhook_failed(&payload.account_id, hook, &payload.body, reason)
        },
    };
    if let Err(e) = log.append(entry).await {
        warn!(webhook_id = %hook.id, error = %e, "failed to record delivery outcome");
    }

    match outcome {
        Ok(()) => debug!(webhook_id = %hook.id, url = %hook.url, "webhook delivered"),
        Err(reason) => {
            warn!(webhook_id = %hook.id, url = %hook.url, %reason, "webhook delivery failed");
        },
    }
}

async fn deliver(
    client: &reqwest::Client,
    hook: &Webhook,
    payload: &MessagePayload,
) -> Result<(), String> {
    let response = client
        .post(&hook.url)
        .timeout(DELIVERY_TIMEOUT)
        .header(SECRET_HEADER, hook.secret.as_deref().unwrap_or(""))
        .header(ACCOUNT_HEADER, payload.account_id.as_str())
        .json(payload)
        .send()
        .await;

    match response {
        Ok(r) if r.status().is_success() => Ok(()),
        Ok(r) => Err(format!("unexpected status {}", r.status())),
        Err(e) => Err(e.to_string()),
    }
}
