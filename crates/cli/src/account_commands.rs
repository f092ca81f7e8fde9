use {clap::Subcommand, sqlx::SqlitePool};

use courier_store::{
    Account, AccountStatus, AccountStore, StatusUpdate, WebhookStore,
    sqlite::{SqliteAccountStore, SqliteWebhookStore},
    unix_now,
};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Register a new account. It starts in `initializing`.
    Add {
        /// Display name.
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List all accounts.
    List,
    /// Show one account in full, as JSON.
    Show { id: String },
    /// Delete an account and its webhooks. Log entries are retained.
    Remove { id: String },
    /// Mark a stuck or terminal account for re-attachment on the next
    /// gateway start. It re-enters authentication from scratch.
    Reset { id: String },
}

pub async fn handle_accounts(action: AccountAction, pool: &SqlitePool) -> anyhow::Result<()> {
    let accounts = SqliteAccountStore::new(pool.clone());

    match action {
        AccountAction::Add { name, description } => {
            if name.trim().is_empty() {
                anyhow::bail!("account name is required");
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
            accounts.create(&account).await?;
            println!("Created account {} ({})", account.id, account.name);
        },
        AccountAction::List => {
            let all = accounts.list().await?;
            if all.is_empty() {
                println!("No accounts.");
            } else {
                for account in &all {
                    let phone = account.phone_number.as_deref().unwrap_or("-");
                    println!(
                        "  {}  {:<13} {:<16} {}",
                        account.id, account.status, phone, account.name
                    );
                }
            }
        },
        AccountAction::Show { id } => match accounts.get(&id).await? {
            Some(account) => println!("{}", serde_json::to_string_pretty(&account)?),
            None => anyhow::bail!("no account with id {id}"),
        },
        AccountAction::Remove { id } => {
            if accounts.get(&id).await?.is_none() {
                anyhow::bail!("no account with id {id}");
            }
            let webhooks = SqliteWebhookStore::new(pool.clone());
            webhooks.delete_by_account(&id).await?;
            accounts.delete(&id).await?;
            println!("Deleted account {id} and its webhooks. Log entries are retained.");
        },
        AccountAction::Reset { id } => {
            if accounts.get(&id).await?.is_none() {
                anyhow::bail!("no account with id {id}");
            }
            // Startup only re-attaches `ready`/`qr_ready` accounts, so the
            // reset must land in that set to be picked up.
            accounts
                .update_status(&id, StatusUpdate::new(AccountStatus::QrReady))
                .await?;
            println!("Account {id} will re-attach on the next gateway start.");
        },
    }

    Ok(())
}
