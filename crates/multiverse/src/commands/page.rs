use crate::catalog::Catalog;
use crate::prelude::{println, *};
use crate::transport::Transport;
use colored::Colorize;
use multiverse_core::kind::EntityKind;
use serde::{Deserialize, Serialize};

use super::render::{print_records, to_json};

/// Options for showing one listing page
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct PageOptions {
    /// Collection to page through: character, episode, location
    #[arg(value_name = "KIND")]
    pub kind: EntityKind,

    /// Page number (1-indexed)
    #[arg(value_name = "PAGE", default_value = "1")]
    pub page: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Commands to reach the neighbouring pages, if any
pub fn navigation_commands(
    kind: EntityKind,
    page: u64,
    has_next: bool,
    has_prev: bool,
) -> Vec<(&'static str, String)> {
    let mut commands = Vec::new();
    if has_next {
        commands.push(("Next page", format!("multiverse page {} {}", kind, page + 1)));
    }
    if has_prev && page > 1 {
        commands.push(("Previous page", format!("multiverse page {} {}", kind, page - 1)));
    }
    commands
}

/// Handle the page command
pub async fn handler<T: Transport>(options: PageOptions, catalog: &Catalog<T>) -> Result<()> {
    let spinner = super::spinner(format!(
        "Fetching {} page {}...",
        options.kind, options.page
    ))?;
    let page = catalog.page(options.kind, options.page).await;
    spinner.finish_and_clear();
    let page = page?;

    if options.json {
        println!("{}", to_json(&page)?);
        return Ok(());
    }

    print_records(options.kind, &page.results);

    let total_pages = page
        .info
        .pages
        .map(|p| p.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!(
        "\n{} {} {} {}",
        "Showing page".bright_white(),
        options.page.max(1).to_string().bright_cyan().bold(),
        "of".bright_white(),
        total_pages.bright_cyan().bold()
    );

    let commands = navigation_commands(
        options.kind,
        options.page.max(1),
        page.info.next.is_some(),
        page.info.prev.is_some(),
    );
    if !commands.is_empty() {
        println!("\n{}:", "To navigate".bright_white().bold());
        for (label, command) in commands {
            println!("  {}: {}", label.green(), command.cyan());
        }
    }

    Ok(())
}
