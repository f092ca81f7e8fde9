use {clap::Subcommand, sqlx::SqlitePool};

use courier_store::{MessageLog, sqlite::SqliteMessageLog};

#[derive(Subcommand)]
pub enum LogAction {
    /// List recent log entries for an account, newest first.
    List {
        account_id: String,
        /// Maximum number of entries.
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Aggregate counts for an account.
    Stats { account_id: String },
}

pub async fn handle_logs(action: LogAction, pool: &SqlitePool) -> anyhow::Result<()> {
    let log = SqliteMessageLog::new(pool.clone());

    match action {
        LogAction::List { account_id, limit } => {
            let entries = log.list_by_account(&account_id, limit).await?;
            if entries.is_empty() {
                println!("No log entries for account {account_id}.");
            } else {
                for entry in &entries {
                    let peer = entry
                        .webhook_url
                        .as_deref()
                        .or(entry.recipient.as_deref())
                        .or(entry.sender.as_deref())
                        .unwrap_or("-");
                    let error = entry
                        .error_message
                        .as_deref()
                        .map(|e| format!("  [{e}]"))
                        .unwrap_or_default();
                    println!(
                        "  {}  {:<16} {:<7} {}  {}{}",
                        entry.created_at, entry.direction, entry.status, peer, entry.body, error
                    );
                }
            }
        },
        LogAction::Stats { account_id } => {
            let stats = log.stats_by_account(&account_id).await?;
            println!("Account {account_id}:");
            println!("  total:    {}", stats.total);
            println!("  incoming: {}", stats.incoming);
            println!("  outgoing: {}", stats.outgoing);
            println!("  webhook:  {}", stats.webhook);
            println!("  failed:   {}", stats.failed);
        },
    }

    Ok(())
}
