//! ENSPM Hub - command line client
//!
//! Main entry point for the enspm CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{auth, config, opportunities, orgs, status, users};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// ENSPM Hub - command line client for the alumni network API
#[derive(Parser)]
#[command(name = "enspm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (default: from client.toml, then http://localhost:8000)
    #[arg(long, global = true, env = "ENSPM_SERVER_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the API is reachable
    Status(status::StatusArgs),

    /// Sign in, sign out and inspect the session
    Auth(auth::AuthArgs),

    /// User administration
    Users(users::UsersArgs),

    /// Organisations and following
    Orgs(orgs::OrgsArgs),

    /// Internship, job and training boards
    Opportunities(opportunities::OpportunitiesArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "enspm=debug,enspm_client=debug,enspm_config=debug,info"
    } else {
        "enspm=info,enspm_client=warn,warn"
    };

    let log_dir = enspm_config::log_dir().unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "enspm.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "enspm=trace,enspm_client=trace,enspm_config=trace,info",
                )),
        )
        .init();

    let config = enspm_config::load_client_config()?;
    let server_url = cli.server.unwrap_or_else(|| config.server.clone());

    let ctx = commands::Context {
        server_url,
        json_output: cli.json,
        verbose: cli.verbose,
        config,
    };

    match cli.command {
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Users(args) => users::run(args, &ctx).await,
        Commands::Orgs(args) => orgs::run(args, &ctx).await,
        Commands::Opportunities(args) => opportunities::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
