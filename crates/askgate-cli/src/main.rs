use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_LOG_FILTER: &str = "askgate=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "askgate", version, about = "Token-gated question answering over tables, documents and SQLite")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API and browser UI.
    Serve {
        /// Path to the configuration file (defaults to askgate.yaml when present).
        #[arg(short, long, env = "ASKGATE_CONFIG")]
        config: Option<PathBuf>,

        /// Override `server.host`.
        #[arg(long, env = "ASKGATE_HOST")]
        host: Option<String>,

        /// Override `server.port`.
        #[arg(short, long, env = "ASKGATE_PORT")]
        port: Option<u16>,
    },

    /// Create the SQLite database from a CSV file, or describe it if it exists.
    BootstrapDb {
        /// Source CSV with a header row.
        #[arg(long)]
        csv: PathBuf,

        /// Database file to create.
        #[arg(long)]
        db: PathBuf,

        /// Table to load the rows into.
        #[arg(long, default_value = "retail_transactions")]
        table: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve { config, host, port } => commands::serve::serve(config, host, port).await,
        Command::BootstrapDb { csv, db, table } => {
            commands::bootstrap::bootstrap_db(&csv, &db, &table).await
        }
    }
}
