//! Opportunities command - internship, job and training boards.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use console::Style;
use enspm_client::{Opportunity, OpportunityFilter, OpportunityKind, PageRequest};

use super::{Context, print_header, print_page_footer};

/// Arguments for the opportunities command.
#[derive(Args, Debug)]
pub struct OpportunitiesArgs {
    /// Which board to use
    #[arg(long, value_enum, global = true, default_value_t = KindArg::Internship)]
    pub kind: KindArg,

    #[command(subcommand)]
    pub command: OpportunitiesCommand,
}

/// Board selector on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Internship,
    Job,
    Training,
}

impl From<KindArg> for OpportunityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Internship => OpportunityKind::Internship,
            KindArg::Job => OpportunityKind::Job,
            KindArg::Training => OpportunityKind::Training,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum OpportunitiesCommand {
    /// List published offers
    List {
        /// Search title, structure or description
        #[arg(short, long)]
        search: Option<String>,

        /// Board-specific type (e.g. academique, cdi, certifiante)
        #[arg(long = "type")]
        kind_type: Option<String>,

        /// City
        #[arg(long)]
        city: Option<String>,

        /// Country
        #[arg(long)]
        country: Option<String>,

        /// Paid trainings only (true) or free only (false)
        #[arg(long)]
        paid: Option<bool>,

        /// Only your own offers, any status
        #[arg(long, conflicts_with = "pending")]
        mine: bool,

        /// Offers awaiting validation (moderators)
        #[arg(long)]
        pending: bool,

        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Items per page (max 100)
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=100))]
        page_size: u32,
    },

    /// Show one offer
    Get {
        /// Offer ID, or slug with --slug
        id: String,

        /// Look up by slug instead of ID
        #[arg(long)]
        slug: bool,
    },
}

/// Run the opportunities command.
pub async fn run(args: OpportunitiesArgs, ctx: &Context) -> Result<()> {
    let kind = OpportunityKind::from(args.kind);

    match args.command {
        OpportunitiesCommand::List {
            search,
            kind_type,
            city,
            country,
            paid,
            mine,
            pending,
            page,
            page_size,
        } => {
            let page = PageRequest::new(page, page_size);
            let board = ctx.client()?.opportunities(kind);
            let offers = if mine {
                board.mine(page).await?
            } else if pending {
                board.pending(page).await?
            } else {
                let filter = OpportunityFilter {
                    search,
                    kind_type,
                    ville: city,
                    pays: country,
                    statut: None,
                    paid,
                };
                board.list(&filter, page).await?
            };

            if ctx.json_output {
                return ctx.print_json(&offers);
            }

            print_header(&board_title(kind));
            if offers.items.is_empty() {
                println!("  No offers.");
                return Ok(());
            }
            for offer in &offers.items {
                print_row(offer, ctx.verbose);
            }
            print_page_footer(&offers.meta);
            Ok(())
        }
        OpportunitiesCommand::Get { id, slug } => {
            let board = ctx.client()?.opportunities(kind);
            let offer = if slug {
                board.get_by_slug(&id).await?
            } else {
                board.get(&id).await?
            };

            if ctx.json_output {
                return ctx.print_json(&offer);
            }
            print_offer(&offer);
            Ok(())
        }
    }
}

fn board_title(kind: OpportunityKind) -> String {
    match kind {
        OpportunityKind::Internship => "Internships".to_string(),
        OpportunityKind::Job => "Jobs".to_string(),
        OpportunityKind::Training => "Trainings".to_string(),
    }
}

fn print_row(offer: &Opportunity, verbose: bool) {
    let dim = Style::new().dim();
    println!(
        "  {:<36} {:<24} {}",
        offer.titre,
        offer.nom_structure,
        dim.apply_to(offer.ville.as_deref().unwrap_or(""))
    );
    if verbose {
        println!("    {} {}", dim.apply_to(&offer.id), dim.apply_to(&offer.statut));
    }
}

fn print_offer(offer: &Opportunity) {
    let dim = Style::new().dim();
    print_header(&offer.titre);
    println!();
    println!("  {} {}", dim.apply_to("ID:"), offer.id);
    println!("  {} {}", dim.apply_to("Structure:"), offer.nom_structure);
    println!("  {} {}", dim.apply_to("Status:"), offer.statut);
    println!("  {} {}", dim.apply_to("Validated:"), offer.est_valide);
    println!("  {} {}", dim.apply_to("Published:"), offer.date_publication);
    if let Some(city) = &offer.ville {
        println!("  {} {}", dim.apply_to("City:"), city);
    }
    println!();
    println!("  {}", offer.description);

    if !offer.extra.is_empty() {
        println!();
        let mut keys: Vec<_> = offer.extra.keys().collect();
        keys.sort();
        for key in keys {
            let value = &offer.extra[key.as_str()];
            if value.is_null() {
                continue;
            }
            let shown = match value.as_str() {
                Some(s) => s.to_string(),
                None => value.to_string(),
            };
            println!("  {:<22} {}", dim.apply_to(key), shown);
        }
    }
    println!();
}
