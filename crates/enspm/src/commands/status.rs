//! Status command - checks that the API answers.

use anyhow::Result;
use clap::Args;
use console::Style;
use serde::Serialize;

use super::{Context, print_header};

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also list the API modules the server advertises
    #[arg(short, long)]
    pub detailed: bool,
}

/// Status response for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    reachable: bool,
    version: Option<String>,
    server_url: String,
    signed_in: bool,
}

/// Run the status command.
pub async fn run(args: StatusArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let signed_in = client.session().await?.is_authenticated();

    match client.info().get().await {
        Ok(info) => {
            if ctx.json_output {
                return ctx.print_json(&StatusOutput {
                    reachable: true,
                    version: Some(info.version.clone()),
                    server_url: ctx.server_url.clone(),
                    signed_in,
                });
            }

            let green = Style::new().green();
            let dim = Style::new().dim();

            print_header("ENSPM Hub API Status");
            println!();
            println!(
                "  {} {}",
                dim.apply_to("Status:"),
                green.apply_to("● reachable")
            );
            println!("  {} {}", dim.apply_to("Version:"), info.version);
            println!("  {} {}", dim.apply_to("Server:"), ctx.server_url);
            println!(
                "  {} {}",
                dim.apply_to("Session:"),
                if signed_in { "signed in" } else { "signed out" }
            );

            if args.detailed && !info.modules.is_empty() {
                println!();
                let mut modules: Vec<_> = info.modules.iter().collect();
                modules.sort();
                for (name, path) in modules {
                    println!("  {:<16} {}", name, dim.apply_to(path));
                }
            }
            println!();
        }
        Err(e) => {
            if ctx.json_output {
                return ctx.print_json(&StatusOutput {
                    reachable: false,
                    version: None,
                    server_url: ctx.server_url.clone(),
                    signed_in,
                });
            }

            let red = Style::new().red();
            let dim = Style::new().dim();

            print_header("ENSPM Hub API Status");
            println!();
            println!(
                "  {} {}",
                dim.apply_to("Status:"),
                red.apply_to("● unreachable")
            );
            println!("  {} {}", dim.apply_to("Server:"), ctx.server_url);

            if ctx.verbose {
                println!();
                println!("  {} {}", dim.apply_to("Error:"), e);
            }

            println!();
            println!(
                "  {}",
                dim.apply_to("Point at another server with: enspm config set-server <url>")
            );
            println!();
        }
    }

    Ok(())
}
