use crate::catalog::Catalog;
use crate::prelude::{println, *};
use crate::transport::Transport;
use multiverse_core::kind::EntityKind;
use serde::{Deserialize, Serialize};

use super::render::{print_records, to_json};

/// Options for listing a whole collection
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Handle the characters / episodes / locations commands
pub async fn handler<T: Transport>(
    kind: EntityKind,
    options: ListOptions,
    catalog: &Catalog<T>,
) -> Result<()> {
    let spinner = super::spinner(format!("Fetching every {}...", kind))?;
    let records = match kind {
        EntityKind::Character => catalog.characters().await,
        EntityKind::Episode => catalog.episodes().await,
        EntityKind::Location => catalog.locations().await,
    };
    spinner.finish_and_clear();
    let records = records?;

    if options.json {
        println!("{}", to_json(&records)?);
    } else {
        print_records(kind, &records);
    }

    Ok(())
}
