use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::bootstrap::build_app_state;
use super::commands;
use anycheckin_infrastructure::config::{AppConfig, CONFIG_PATH_ENV};
use anycheckin_infrastructure::logging::init_logger;

#[derive(Parser)]
#[command(
    name = "anycheckin",
    version,
    about = "Scheduled daily check-in for new-api style sites",
    long_about = "Stores site sessions, runs cron-scheduled check-in tasks over them and reports results"
)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short, global = true, env = CONFIG_PATH_ENV, default_value = "anycheckin.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scheduler until Ctrl-C
    Serve,

    /// Session cookie tools
    #[command(subcommand)]
    Session(SessionCommands),

    /// Account management
    #[command(subcommand)]
    Account(AccountCommands),

    /// Scheduled task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Show recent check-in logs
    Logs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Re-send the latest successful check-in to Telegram
    NotifyTest,
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Decode a session cookie (or a whole Cookie header) without storing it
    Decode { raw: String },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Add an account from its session cookie
    Add { name: String, session: String },
    List,
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        /// New session; "unchanged" keeps the stored one
        #[arg(long)]
        session: Option<String>,
    },
    Enable { id: i64 },
    Disable { id: i64 },
    Delete { id: i64 },
    /// Check in one account now
    CheckIn { id: i64 },
    /// Reload identity and balance from the site
    Refresh { id: i64 },
}

#[derive(Args)]
pub struct TaskArgs {
    #[arg(long)]
    pub name: String,

    /// Five-field cron expression, e.g. "0 8 * * *"
    #[arg(long)]
    pub cron: String,

    /// Comma-separated account ids
    #[arg(long, value_delimiter = ',')]
    pub accounts: Vec<i64>,

    /// Store the task without scheduling it
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    Add(TaskArgs),
    List,
    Update {
        id: i64,
        #[command(flatten)]
        args: TaskArgs,
    },
    Delete { id: i64 },
    /// Run a task once and wait for it
    Run { id: i64 },
}

/// Entry point of the `anycheckin` binary.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Decoding is pure; no config or storage needed
    if let Commands::Session(SessionCommands::Decode { raw }) = &cli.command {
        return commands::session::decode(raw);
    }

    let config = AppConfig::load(&cli.config)?;
    if let Err(e) = init_logger(config.logging.dir.clone()) {
        eprintln!("Failed to initialize file logging: {}", e);
        let _ = tracing_subscriber::fmt().with_target(false).try_init();
    }

    let state = build_app_state(&config).await?;

    let result = match cli.command {
        Commands::Serve => commands::serve::serve(&state).await,
        Commands::Session(_) => Ok(()),
        Commands::Account(cmd) => commands::account::handle(&state, cmd).await,
        Commands::Task(cmd) => commands::task::handle(&state, cmd).await,
        Commands::Logs { limit } => commands::logs::show(&state, limit).await,
        Commands::NotifyTest => commands::logs::notify_test(&state).await,
    };

    result.map_err(|e| match commands::describe_error(&e) {
        Some(described) => e.context(described),
        None => e,
    })
}
