use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "datadash",
    version,
    about = "Admin dashboard over in-memory and Postgres tables"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard described by a configuration file.
    Serve {
        /// Path to the configuration file.
        #[arg(short, long, env = "DATADASH_CONFIG", default_value = "datadash.yaml")]
        config: PathBuf,

        /// Override the configured listen port.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a configuration file without serving it.
    Check {
        /// Path to the configuration file.
        #[arg(short, long, env = "DATADASH_CONFIG", default_value = "datadash.yaml")]
        config: PathBuf,

        /// Also connect to the database and compare Postgres tables with their declarations.
        #[arg(long, default_value_t = false)]
        connect: bool,
    },

    /// Serve a generated in-memory `users` table.
    Demo {
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Number of generated rows.
        #[arg(long, default_value_t = 137)]
        rows: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve { config, port } => commands::serve::run(&config, port).await,
        Command::Check { config, connect } => commands::check::run(&config, connect).await,
        Command::Demo { port, rows } => commands::demo::run(port, rows).await,
    }
}
