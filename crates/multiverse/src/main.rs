use crate::prelude::*;
use clap::Parser;

mod catalog;
mod commands;
mod config;
mod error;
mod prelude;
mod transport;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Browse the Rick and Morty catalog with every reference resolved inline"
)]
pub struct App {
    #[command(subcommand)]
    pub command: commands::Commands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Catalog API base URL (overrides MULTIVERSE_BASE_URL env var)
    #[clap(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds (overrides MULTIVERSE_TIMEOUT env var)
    #[clap(long, global = true)]
    timeout: Option<u64>,

    /// Maximum ids per batch request (overrides MULTIVERSE_BATCH_SIZE env var)
    #[clap(long, global = true)]
    batch_size: Option<usize>,

    /// Give up on the whole operation after N seconds (overrides MULTIVERSE_DEADLINE env var)
    #[clap(long, global = true)]
    deadline: Option<u64>,

    /// Whether to display additional information.
    #[clap(long, env = "MULTIVERSE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    commands::run(app.command, app.global)
        .await
        .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
