//! Config command - configuration management.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::Style;
use serde::Serialize;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Set the server URL in client.toml
    SetServer {
        /// Server root URL (e.g., https://hub.enspm.cm)
        url: String,
    },
}

/// Effective settings for JSON output.
#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    config_file: Option<String>,
    server: &'a str,
    server_source: &'a str,
    timeout_secs: u64,
    single_flight_refresh: bool,
    session_file: Option<String>,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(ctx),
        ConfigCommand::SetServer { url } => cmd_set_server(&url, ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let server_source = if ctx.server_url != config.server {
        "flag or ENSPM_SERVER_URL"
    } else if enspm_config::client_config_path().is_some_and(|p| p.exists()) {
        "config file"
    } else {
        "default"
    };

    let output = ShowOutput {
        config_file: enspm_config::client_config_path().map(|p| p.display().to_string()),
        server: &ctx.server_url,
        server_source,
        timeout_secs: config.timeout_secs,
        single_flight_refresh: config.single_flight_refresh,
        session_file: config.session_path().map(|p| p.display().to_string()),
    };

    if ctx.json_output {
        return ctx.print_json(&output);
    }

    let dim = Style::new().dim();
    println!("# ENSPM Client Configuration\n");
    println!(
        "  {:<22} {}",
        "config file",
        output.config_file.as_deref().unwrap_or("(none)")
    );
    println!(
        "  {:<22} {} {}",
        "server",
        output.server,
        dim.apply_to(format!("({})", output.server_source))
    );
    println!("  {:<22} {}s", "timeout", output.timeout_secs);
    println!(
        "  {:<22} {}",
        "single-flight refresh", output.single_flight_refresh
    );
    println!(
        "  {:<22} {}",
        "session file",
        output.session_file.as_deref().unwrap_or("(none)")
    );
    println!();
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let path = enspm_config::client_config_path()
        .context("Could not determine config directory; set ENSPM_CONFIG_DIR")?;

    if ctx.json_output {
        return ctx.print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        }));
    }

    println!("{}", path.display());
    Ok(())
}

fn cmd_set_server(url: &str, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    config.set_server(url)?;
    let path = enspm_config::save_client_config(&config)?;

    tracing::info!(server = %config.server, "Server updated");
    if ctx.json_output {
        return ctx.print_json(&serde_json::json!({
            "server": config.server,
            "path": path.display().to_string(),
        }));
    }

    let green = Style::new().green();
    println!(
        "{} Server set to {} in {}",
        green.apply_to("✓"),
        config.server,
        path.display()
    );
    Ok(())
}
