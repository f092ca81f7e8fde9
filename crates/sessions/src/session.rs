//! Per-account event loop: lifecycle transitions and message ingestion.

use std::sync::Arc;

use {
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use {
    courier_store::{AccountStatus, AccountStore, MessageLog, NewMessageLogEntry, StatusUpdate},
    courier_transport::{InboundMessage, TransportEvent},
    courier_webhooks::{MessagePayload, WebhookDispatcher},
};

use crate::registry::SessionHandle;

pub(crate) struct SessionContext {
    pub account_id: String,
    pub handle: SessionHandle,
    pub accounts: Arc<dyn AccountStore>,
    pub log: Arc<dyn MessageLog>,
    pub dispatcher: WebhookDispatcher,
}

/// Drain the connection's event stream until it closes.
///
/// Runs as one task per account; nothing here blocks any other account,
/// and webhook dispatch is handed off so the next event for this account
/// is picked up immediately.
pub(crate) async fn run_event_loop(
    ctx: SessionContext,
    mut events: mpsc::Receiver<TransportEvent>,
) {
    while let Some(event) = events.recv().await {
        handle_event(&ctx, event).await;
    }
    debug!(account_id = %ctx.account_id, "transport event stream closed");
}

async fn handle_event(ctx: &SessionContext, event: TransportEvent) {
    match event {
        TransportEvent::Qr { code } => {
            let current = ctx.handle.status();
            if !current.is_authenticating() {
                debug!(account_id = %ctx.account_id, status = %current, "ignoring qr event");
                return;
            }
            info!(account_id = %ctx.account_id, "qr code received");
            let update = StatusUpdate {
                qr_code: Some(code.clone()),
                ..StatusUpdate::new(AccountStatus::QrReady)
            };
            if persist_transition(ctx, update).await {
                ctx.handle.set_status(AccountStatus::QrReady);
                ctx.handle.set_qr_code(Some(code));
            }
        },
        TransportEvent::Ready { phone_number } => {
            let current = ctx.handle.status();
            if !current.is_authenticating() {
                debug!(account_id = %ctx.account_id, status = %current, "ignoring ready event");
                return;
            }
            info!(account_id = %ctx.account_id, %phone_number, "session ready");
            let update = StatusUpdate {
                phone_number: Some(phone_number.clone()),
                ..StatusUpdate::new(AccountStatus::Ready)
            };
            if persist_transition(ctx, update).await {
                ctx.handle.set_status(AccountStatus::Ready);
                ctx.handle.set_qr_code(None);
                ctx.handle.set_phone_number(Some(phone_number));
            }
        },
        TransportEvent::Authenticated => {
            // Intermediate signal only; no lifecycle transition.
            debug!(account_id = %ctx.account_id, "transport authenticated");
        },
        TransportEvent::AuthFailure { reason } => {
            warn!(account_id = %ctx.account_id, %reason, "authentication failed");
            let update = StatusUpdate {
                error_message: Some(reason),
                ..StatusUpdate::new(AccountStatus::AuthFailed)
            };
            if persist_transition(ctx, update).await {
                ctx.handle.set_status(AccountStatus::AuthFailed);
                ctx.handle.set_qr_code(None);
            }
        },
        TransportEvent::Disconnected { reason } => {
            warn!(account_id = %ctx.account_id, %reason, "transport disconnected");
            let update = StatusUpdate {
                error_message: Some(reason),
                ..StatusUpdate::new(AccountStatus::Disconnected)
            };
            if persist_transition(ctx, update).await {
                ctx.handle.set_status(AccountStatus::Disconnected);
                ctx.handle.set_qr_code(None);
            }
        },
        TransportEvent::Message(message) => ingest_message(ctx, message).await,
    }
}

/// Persist a transition; the in-memory cache is only updated on success so
/// the store never lags behind what callers can observe.
async fn persist_transition(ctx: &SessionContext, update: StatusUpdate) -> bool {
    let status = update.status;
    match ctx.accounts.update_status(&ctx.account_id, update).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                account_id = %ctx.account_id,
                status = %status,
                error = %e,
                "failed to persist status transition"
            );
            false
        },
    }
}

/// Normalize, persist, and hand off one inbound message. Persistence
/// failures are logged best-effort and never crash the loop; dispatch is
/// skipped for entries that failed to persist.
async fn ingest_message(ctx: &SessionContext, message: InboundMessage) {
    debug!(account_id = %ctx.account_id, from = %message.from, "inbound message");

    let entry = NewMessageLogEntry::incoming(
        &ctx.account_id,
        &message.from,
        &message.to,
        &message.body,
    );
    match ctx.log.append(entry).await {
        Ok(()) => {
            let payload = MessagePayload::from_inbound(&ctx.account_id, &message);
            ctx.dispatcher.dispatch(payload);
        },
        Err(e) => {
            warn!(account_id = %ctx.account_id, error = %e, "failed to log inbound message");
            let failed = NewMessageLogEntry::incoming_failed(
                &ctx.account_id,
                &message.from,
                &message.to,
                &message.body,
                &e.to_string(),
            );
            if let Err(e) = ctx.log.append(failed).await {
                warn!(account_id = %ctx.account_id, error = %e, "failed to log ingest failure");
            }
        },
    }
}
