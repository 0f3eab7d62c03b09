//! Users command - account administration.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use enspm_client::{PageRequest, UserDetail, UserFilter};

use super::{Context, print_header, print_page_footer};

/// Arguments for the users command.
#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List accounts
    List {
        /// Search name, email or matricule
        #[arg(short, long)]
        search: Option<String>,

        /// Only these system roles (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,

        /// Only these global statuses (repeatable)
        #[arg(long = "status")]
        statuses: Vec<String>,

        /// Only active (true) or inactive (false) accounts
        #[arg(long)]
        active: Option<bool>,

        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Items per page (max 100)
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=100))]
        page_size: u32,
    },

    /// Show one account
    Get {
        /// User ID, or profile slug with --slug
        id: String,

        /// Look up by profile slug instead of ID
        #[arg(long)]
        slug: bool,
    },

    /// Activate or deactivate an account
    Toggle {
        /// User ID
        id: String,

        /// New state
        #[arg(long, required = true, action = clap::ArgAction::Set)]
        active: bool,
    },

    /// Soft-delete an account
    Delete {
        /// User ID
        id: String,
    },
}

/// Run the users command.
pub async fn run(args: UsersArgs, ctx: &Context) -> Result<()> {
    match args.command {
        UsersCommand::List {
            search,
            roles,
            statuses,
            active,
            page,
            page_size,
        } => {
            let filter = UserFilter {
                search,
                roles,
                statuses,
                active,
            };
            cmd_list(&filter, PageRequest::new(page, page_size), ctx).await
        }
        UsersCommand::Get { id, slug } => cmd_get(&id, slug, ctx).await,
        UsersCommand::Toggle { id, active } => cmd_toggle(&id, active, ctx).await,
        UsersCommand::Delete { id } => cmd_delete(&id, ctx).await,
    }
}

async fn cmd_list(filter: &UserFilter, page: PageRequest, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let users = client.users().list(filter, page).await?;

    if ctx.json_output {
        return ctx.print_json(&users);
    }

    print_header("Users");
    if users.items.is_empty() {
        println!("  No users match.");
        return Ok(());
    }

    let dim = Style::new().dim();
    for user in &users.items {
        let state = if user.account.est_actif {
            Style::new().green().apply_to("active")
        } else {
            Style::new().red().apply_to("inactive")
        };
        println!(
            "  {:<28} {:<32} {:<12} {}",
            user.display_name(),
            user.account.email,
            user.account.role_systeme,
            state
        );
        if ctx.verbose {
            println!("    {}", dim.apply_to(&user.account.id));
        }
    }
    print_page_footer(&users.meta);
    Ok(())
}

async fn cmd_get(id: &str, by_slug: bool, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let user = if by_slug {
        client.users().get_by_slug(id).await?
    } else {
        client.users().get(id).await?
    };

    if ctx.json_output {
        return ctx.print_json(&user);
    }
    print_user(&user);
    Ok(())
}

async fn cmd_toggle(id: &str, active: bool, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let user = client.users().toggle_status(id, active).await?;

    if ctx.json_output {
        return ctx.print_json(&user);
    }
    println!(
        "{} is now {}",
        user.display_name(),
        if user.account.est_actif { "active" } else { "inactive" }
    );
    Ok(())
}

async fn cmd_delete(id: &str, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    client.users().delete(id).await?;
    println!("Deleted user {}", id);
    Ok(())
}

fn print_user(user: &UserDetail) {
    let dim = Style::new().dim();
    print_header(user.display_name());
    println!();
    println!("  {} {}", dim.apply_to("ID:"), user.account.id);
    println!("  {} {}", dim.apply_to("Email:"), user.account.email);
    println!("  {} {}", dim.apply_to("Role:"), user.account.role_systeme);
    println!("  {} {}", dim.apply_to("Active:"), user.account.est_actif);
    if let Some(matricule) = &user.profil.matricule {
        println!("  {} {}", dim.apply_to("Matricule:"), matricule);
    }
    if let Some(status) = &user.profil.statut_global {
        println!("  {} {}", dim.apply_to("Status:"), status);
    }
    if let Some(year) = user.profil.annee_sortie {
        println!("  {} {}", dim.apply_to("Class of:"), year);
    }
    if let Some(last_login) = &user.account.last_login {
        println!("  {} {}", dim.apply_to("Last login:"), last_login);
    }
    println!();
}
