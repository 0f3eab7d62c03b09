//! Orgs command - organisations and following.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use enspm_client::{Organisation, OrganisationFilter, PageRequest};

use super::{Context, print_header, print_page_footer};

/// Arguments for the orgs command.
#[derive(Args, Debug)]
pub struct OrgsArgs {
    #[command(subcommand)]
    pub command: OrgsCommand,
}

#[derive(Subcommand, Debug)]
pub enum OrgsCommand {
    /// List active organisations
    List {
        /// Search organisation names
        #[arg(short, long)]
        search: Option<String>,

        /// Organisation type (e.g. entreprise, association)
        #[arg(long = "type")]
        kind: Option<String>,

        /// City
        #[arg(long)]
        city: Option<String>,

        /// Country
        #[arg(long)]
        country: Option<String>,

        /// Show organisations awaiting moderation instead (admin)
        #[arg(long, conflicts_with_all = ["search", "kind", "city", "country"])]
        pending: bool,

        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Items per page (max 100)
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=100))]
        page_size: u32,
    },

    /// Show one organisation
    Get {
        /// Organisation ID
        id: String,

        /// Also list its members
        #[arg(long)]
        members: bool,
    },

    /// Follow an organisation
    Follow {
        /// Organisation ID
        id: String,
    },

    /// Stop following an organisation
    Unfollow {
        /// Organisation ID
        id: String,
    },

    /// List organisations you follow
    Following,
}

/// Run the orgs command.
pub async fn run(args: OrgsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        OrgsCommand::List {
            search,
            kind,
            city,
            country,
            pending,
            page,
            page_size,
        } => {
            if pending {
                return cmd_pending(ctx).await;
            }
            let filter = OrganisationFilter {
                search,
                type_organisation: kind,
                secteur_activite: None,
                ville: city,
                pays: country,
            };
            cmd_list(&filter, PageRequest::new(page, page_size), ctx).await
        }
        OrgsCommand::Get { id, members } => cmd_get(&id, members, ctx).await,
        OrgsCommand::Follow { id } => cmd_follow(&id, ctx).await,
        OrgsCommand::Unfollow { id } => cmd_unfollow(&id, ctx).await,
        OrgsCommand::Following => cmd_following(ctx).await,
    }
}

async fn cmd_list(filter: &OrganisationFilter, page: PageRequest, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let orgs = client.organisations().list(filter, page).await?;

    if ctx.json_output {
        return ctx.print_json(&orgs);
    }

    print_header("Organisations");
    print_org_rows(&orgs.items, ctx.verbose);
    if !orgs.items.is_empty() {
        print_page_footer(&orgs.meta);
    }
    Ok(())
}

async fn cmd_pending(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let orgs = client.organisations().pending().await?;

    if ctx.json_output {
        return ctx.print_json(&orgs);
    }

    print_header("Pending Organisations");
    print_org_rows(&orgs, ctx.verbose);
    Ok(())
}

async fn cmd_get(id: &str, with_members: bool, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let org = client.organisations().get(id).await?;
    let members = if with_members {
        Some(client.organisations().members(id).await?)
    } else {
        None
    };

    if ctx.json_output {
        let mut value = serde_json::to_value(&org)?;
        if let (Some(members), Some(map)) = (&members, value.as_object_mut()) {
            map.insert("members".to_string(), serde_json::to_value(members)?);
        }
        return ctx.print_json(&value);
    }

    let dim = Style::new().dim();
    print_header(&org.nom_organisation);
    println!();
    println!("  {} {}", dim.apply_to("ID:"), org.id);
    println!("  {} {}", dim.apply_to("Type:"), org.type_organisation);
    println!("  {} {}", dim.apply_to("Status:"), org.statut);
    if let Some(location) = location(&org) {
        println!("  {} {}", dim.apply_to("Location:"), location);
    }
    if let Some(description) = &org.description {
        println!();
        println!("  {}", description);
    }

    if let Some(members) = members {
        println!();
        println!("  {}", console::style("Members").bold());
        if members.is_empty() {
            println!("  {}", dim.apply_to("none"));
        }
        for member in members.iter().filter(|m| m.est_actif) {
            println!("  {:<28} {}", member.profil_nom, member.role_organisation);
        }
    }
    println!();
    Ok(())
}

async fn cmd_follow(id: &str, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let subscription = client.organisations().follow(id).await?;

    if ctx.json_output {
        return ctx.print_json(&subscription);
    }
    println!("Following organisation {}", subscription.organisation);
    Ok(())
}

async fn cmd_unfollow(id: &str, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    client.organisations().unfollow(id).await?;
    println!("Stopped following organisation {}", id);
    Ok(())
}

async fn cmd_following(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let orgs = client.organisations().following().await?;

    if ctx.json_output {
        return ctx.print_json(&orgs);
    }

    print_header("Following");
    print_org_rows(&orgs, ctx.verbose);
    Ok(())
}

fn print_org_rows(orgs: &[Organisation], verbose: bool) {
    if orgs.is_empty() {
        println!("  No organisations.");
        return;
    }

    let dim = Style::new().dim();
    for org in orgs {
        println!(
            "  {:<32} {:<14} {}",
            org.nom_organisation,
            org.type_organisation,
            dim.apply_to(location(org).unwrap_or_default())
        );
        if verbose {
            println!("    {}", dim.apply_to(&org.id));
        }
    }
    println!();
}

fn location(org: &Organisation) -> Option<String> {
    match (&org.ville, &org.pays) {
        (Some(city), Some(country)) => Some(format!("{}, {}", city, country)),
        (Some(place), None) | (None, Some(place)) => Some(place.clone()),
        (None, None) => None,
    }
}
