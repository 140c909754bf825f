use crate::catalog::Catalog;
use crate::prelude::{println, *};
use crate::transport::Transport;
use multiverse_core::kind::EntityKind;
use serde::{Deserialize, Serialize};

use super::render::{print_records, to_json};

/// Options for searching a collection by name
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct SearchOptions {
    /// Collection to search: character, episode, location
    #[arg(value_name = "KIND")]
    pub kind: EntityKind,

    /// Name (or part of it) to match
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Handle the search command
pub async fn handler<T: Transport>(options: SearchOptions, catalog: &Catalog<T>) -> Result<()> {
    let spinner = super::spinner(format!(
        "Searching {} records named {:?}...",
        options.kind, options.name
    ))?;
    let records = catalog.search(options.kind, &options.name).await;
    spinner.finish_and_clear();
    let records = records?;

    if options.json {
        println!("{}", to_json(&records)?);
    } else {
        print_records(options.kind, &records);
    }

    Ok(())
}
