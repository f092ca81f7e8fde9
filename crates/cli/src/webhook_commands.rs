use {clap::Subcommand, sqlx::SqlitePool};

use courier_store::{
    AccountStore, Webhook, WebhookStore,
    sqlite::{SqliteAccountStore, SqliteWebhookStore},
    unix_now,
};

#[derive(Subcommand)]
pub enum WebhookAction {
    /// Subscribe a URL to an account's inbound messages.
    Add {
        account_id: String,
        url: String,
        /// Shared secret echoed back on every delivery.
        #[arg(long)]
        secret: Option<String>,
    },
    /// List an account's webhooks.
    List { account_id: String },
    /// Remove a webhook.
    Remove { id: String },
    /// Enable a webhook.
    Enable { id: String },
    /// Disable a webhook without deleting it.
    Disable { id: String },
}

pub async fn handle_webhooks(action: WebhookAction, pool: &SqlitePool) -> anyhow::Result<()> {
    let webhooks = SqliteWebhookStore::new(pool.clone());

    match action {
        WebhookAction::Add {
            account_id,
            url,
            secret,
        } => {
            let accounts = SqliteAccountStore::new(pool.clone());
            if accounts.get(&account_id).await?.is_none() {
                anyhow::bail!("no account with id {account_id}");
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("webhook url must be http(s): {url}");
            }
            let now = unix_now();
            let hook = Webhook {
                id: uuid::Uuid::new_v4().to_string(),
                account_id,
                url,
                secret,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            webhooks.create(&hook).await?;
            println!("Created webhook {} -> {}", hook.id, hook.url);
        },
        WebhookAction::List { account_id } => {
            let all = webhooks.list_by_account(&account_id).await?;
            if all.is_empty() {
                println!("No webhooks for account {account_id}.");
            } else {
                for hook in &all {
                    let state = if hook.is_active { "active" } else { "disabled" };
                    println!("  {}  {:<8}  {}", hook.id, state, hook.url);
                }
            }
        },
        WebhookAction::Remove { id } => {
            if webhooks.get(&id).await?.is_none() {
                anyhow::bail!("no webhook with id {id}");
            }
            webhooks.delete(&id).await?;
            println!("Deleted webhook {id}.");
        },
        WebhookAction::Enable { id } => set_active(&webhooks, &id, true).await?,
        WebhookAction::Disable { id } => set_active(&webhooks, &id, false).await?,
    }

    Ok(())
}

async fn set_active(store: &SqliteWebhookStore, id: &str, active: bool) -> anyhow::Result<()> {
    let Some(mut hook) = store.get(id).await? else {
        anyhow::bail!("no webhook with id {id}");
    };
    hook.is_active = active;
    store.update(&hook).await?;
    let state = if active { "enabled" } else { "disabled" };
    println!("Webhook {id} {state}.");
    Ok(())
}
