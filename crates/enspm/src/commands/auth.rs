//! Auth command - session management.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::Style;
use serde::Serialize;

use super::{Context, print_header};

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Sign in with email and password
    Login {
        /// Account email
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long, env = "ENSPM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the stored tokens
    Logout,

    /// Show the stored session without contacting the server
    Status,

    /// Fetch the signed-in account from the server
    Whoami,

    /// Ask the server to email a temporary password
    Recover {
        /// Account email
        email: String,
    },
}

/// Session summary for JSON output.
#[derive(Debug, Serialize)]
struct SessionOutput<'a> {
    signed_in: bool,
    email: Option<&'a str>,
    name: Option<&'a str>,
    role: Option<&'a str>,
    session_file: Option<String>,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login { email, password } => cmd_login(&email, password, ctx).await,
        AuthCommand::Logout => cmd_logout(ctx).await,
        AuthCommand::Status => cmd_status(ctx).await,
        AuthCommand::Whoami => cmd_whoami(ctx).await,
        AuthCommand::Recover { email } => cmd_recover(&email, ctx).await,
    }
}

async fn cmd_login(email: &str, password: Option<String>, ctx: &Context) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password(format!("Password for {}: ", email))
            .context("Failed to read password")?,
    };

    let client = ctx.client()?;
    let response = client
        .auth()
        .login(email, &password)
        .await
        .context("Login failed")?;

    if ctx.json_output {
        let session = client.session().await?;
        let user = session.user();
        return ctx.print_json(&SessionOutput {
            signed_in: true,
            email: Some(&response.user.email),
            name: user.map(|u| u.display_name()),
            role: Some(&response.user.role_systeme),
            session_file: None,
        });
    }

    let green = Style::new().green();
    println!(
        "{} Signed in as {} ({})",
        green.apply_to("✓"),
        response.user.email,
        response.user.role_systeme
    );
    Ok(())
}

async fn cmd_logout(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    if !client.session().await?.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }

    client.auth().logout().await.context("Logout failed")?;
    println!("Signed out.");
    Ok(())
}

async fn cmd_status(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let session = client.session().await?;
    let user = session.user();
    let session_file = ctx
        .config
        .session_path()
        .map(|p| p.display().to_string());

    if ctx.json_output {
        return ctx.print_json(&SessionOutput {
            signed_in: session.is_authenticated(),
            email: user.map(|u| u.account.email.as_str()),
            name: user.map(|u| u.display_name()),
            role: user.map(|u| u.account.role_systeme.as_str()),
            session_file,
        });
    }

    let dim = Style::new().dim();
    print_header("Authentication Status");
    println!();

    if session.is_authenticated() {
        println!("  {} signed in", dim.apply_to("Session:"));
        match user {
            Some(user) => {
                println!("  {} {}", dim.apply_to("Name:"), user.display_name());
                println!("  {} {}", dim.apply_to("Email:"), user.account.email);
                println!("  {} {}", dim.apply_to("Role:"), user.account.role_systeme);
            }
            None => println!(
                "  {} not cached (run 'enspm auth whoami')",
                dim.apply_to("User:")
            ),
        }
    } else {
        println!("  {} signed out", dim.apply_to("Session:"));
        println!("  Run 'enspm auth login <email>' to sign in");
    }

    if let Some(path) = session_file {
        println!("  {} {}", dim.apply_to("File:"), path);
    }
    println!();
    Ok(())
}

async fn cmd_whoami(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let user = client.auth().me().await?;

    if ctx.json_output {
        return ctx.print_json(&user);
    }

    let dim = Style::new().dim();
    print_header(user.display_name());
    println!();
    println!("  {} {}", dim.apply_to("Email:"), user.account.email);
    println!("  {} {}", dim.apply_to("Role:"), user.account.role_systeme);
    if let Some(status) = &user.profil.statut_global {
        println!("  {} {}", dim.apply_to("Status:"), status);
    }
    if let Some(domain) = &user.profil.domaine {
        println!("  {} {}", dim.apply_to("Field:"), domain);
    }
    if let Some(slug) = &user.profil.slug {
        println!("  {} {}", dim.apply_to("Slug:"), slug);
    }
    println!();
    Ok(())
}

async fn cmd_recover(email: &str, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    client.auth().recover_password(email).await?;
    println!("If {} has an account, a temporary password is on its way.", email);
    Ok(())
}
