mod account_commands;
mod log_commands;
mod webhook_commands;

use {
    clap::{Parser, Subcommand},
    sqlx::SqlitePool,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "courier", about = "Courier — multi-account messaging gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Custom data directory (overrides the platform default).
    #[arg(long, global = true, env = "COURIER_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management.
    Accounts {
        #[command(subcommand)]
        action: account_commands::AccountAction,
    },
    /// Webhook subscriber management.
    Webhooks {
        #[command(subcommand)]
        action: webhook_commands::WebhookAction,
    },
    /// Message log inspection.
    Logs {
        #[command(subcommand)]
        action: log_commands::LogAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn data_dir(cli: &Cli) -> anyhow::Result<std::path::PathBuf> {
    if let Some(ref dir) = cli.data_dir {
        return Ok(dir.clone());
    }
    let dirs = directories::ProjectDirs::from("", "", "courier")
        .ok_or_else(|| anyhow::anyhow!("could not determine a data directory"))?;
    Ok(dirs.data_dir().to_path_buf())
}

async fn open_store(cli: &Cli) -> anyhow::Result<SqlitePool> {
    let dir = data_dir(cli)?;
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("courier.db");
    let pool = courier_store::sqlite::open_pool(&db_path).await?;
    courier_store::sqlite::init_schema(&pool).await?;
    info!(db = %db_path.display(), "store opened");
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let pool = open_store(&cli).await?;

    match cli.command {
        Commands::Accounts { action } => account_commands::handle_accounts(action, &pool).await,
        Commands::Webhooks { action } => webhook_commands::handle_webhooks(action, &pool).await,
        Commands::Logs { action } => log_commands::handle_logs(action, &pool).await,
    }
}
