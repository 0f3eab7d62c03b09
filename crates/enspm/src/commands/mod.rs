//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod opportunities;
pub mod orgs;
pub mod status;
pub mod users;

use anyhow::{Context as _, Result};
use console::Style;
use enspm_client::{EnspmClient, FileSessionStore, PaginationMeta};
use enspm_config::ClientConfig;
use serde::Serialize;
use std::sync::Arc;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Server URL to connect to.
    pub server_url: String,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Loaded client configuration.
    pub config: ClientConfig,
}

impl Context {
    /// Build an API client backed by the persisted session.
    pub fn client(&self) -> Result<EnspmClient> {
        let session_path = self
            .config
            .session_path()
            .context("Could not determine where to store the session; set ENSPM_CONFIG_DIR")?;

        let client = EnspmClient::builder()
            .base_url(&self.server_url)
            .timeout(self.config.timeout())
            .single_flight_refresh(self.config.single_flight_refresh)
            .session_store(Arc::new(FileSessionStore::with_path(session_path)))
            .build()?;
        Ok(client)
    }

    /// Print a value as pretty JSON.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Print the "page X of Y" footer under a list.
pub(crate) fn print_page_footer(meta: &PaginationMeta) {
    let dim = Style::new().dim();
    println!();
    println!(
        "  {}",
        dim.apply_to(format!(
            "page {} of {} ({} total)",
            meta.page,
            meta.total_pages.max(1),
            meta.total_items
        ))
    );
    if meta.has_next() {
        println!(
            "  {}",
            dim.apply_to(format!("next: --page {}", meta.page + 1))
        );
    }
}

/// Print a bold section title with a rule under it.
pub(crate) fn print_header(title: &str) {
    let dim = Style::new().dim();
    println!();
    println!("{}", console::style(title).bold());
    println!("{}", dim.apply_to("─".repeat(40)));
}
