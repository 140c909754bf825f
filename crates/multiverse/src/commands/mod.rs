use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::prelude::{eprintln, *};
use crate::transport::HttpTransport;
use indicatif::{ProgressBar, ProgressStyle};
use multiverse_core::kind::EntityKind;

pub mod get;
pub mod list;
pub mod page;
pub mod render;
pub mod search;

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List every character with its episodes resolved
    Characters(list::ListOptions),

    /// List every episode with its characters resolved
    Episodes(list::ListOptions),

    /// List every location with its residents resolved
    Locations(list::ListOptions),

    /// Search a collection by name
    Search(search::SearchOptions),

    /// Show a single listing page
    Page(page::PageOptions),

    /// Look up specific entities by id or reference URL
    Get(get::GetOptions),
}

/// Spinner shown on stderr while the catalog is being walked
pub(crate) fn spinner(msg: impl Into<String>) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| eyre!("Invalid spinner template: {}", e))?,
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(msg.into());
    Ok(spinner)
}

pub async fn run(command: Commands, global: crate::Global) -> Result<()> {
    let config = CatalogConfig::from_env()?.with_overrides(&global);

    if global.verbose {
        eprintln!("Catalog API Base: {}", config.base_url);
        eprintln!(
            "Timeout: {:?} | Batch size: {} | Deadline: {:?}",
            config.timeout, config.batch_size, config.deadline
        );
        eprintln!();
    }

    let transport = HttpTransport::new(&config)?;
    let catalog = Catalog::new(transport, &config);

    match command {
        Commands::Characters(options) => {
            list::handler(EntityKind::Character, options, &catalog).await
        }
        Commands::Episodes(options) => list::handler(EntityKind::Episode, options, &catalog).await,
        Commands::Locations(options) => {
            list::handler(EntityKind::Location, options, &catalog).await
        }
        Commands::Search(options) => search::handler(options, &catalog).await,
        Commands::Page(options) => page::handler(options, &catalog).await,
        Commands::Get(options) => get::handler(options, &catalog).await,
    }
}
