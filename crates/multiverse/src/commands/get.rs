use crate::catalog::Catalog;
use crate::prelude::{println, *};
use crate::transport::Transport;
use multiverse_core::kind::EntityKind;
use multiverse_core::reference::{extract_id, EntityId};
use serde::{Deserialize, Serialize};

use super::render::{print_summaries, to_json};

/// Options for looking up entities by id
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct GetOptions {
    /// Collection to look in: character, episode, location
    #[arg(value_name = "KIND")]
    pub kind: EntityKind,

    /// Ids or reference URLs (space or comma separated)
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Turn user input (`1,2 3` or full reference URLs) into entity ids
pub fn parse_ids(inputs: &[String]) -> Result<Vec<EntityId>> {
    inputs
        .iter()
        .flat_map(|input| input.split(','))
        .map(str::trim)
        .filter(|input| !input.is_empty())
        .map(|input| extract_id(input).map_err(|e| eyre!("{}", e)))
        .collect()
}

/// Handle the get command
pub async fn handler<T: Transport>(options: GetOptions, catalog: &Catalog<T>) -> Result<()> {
    let ids = parse_ids(&options.ids)?;
    if ids.is_empty() {
        return Err(eyre!("No ids given"));
    }

    let spinner = super::spinner(format!("Fetching {} {}(s)...", ids.len(), options.kind))?;
    let summaries = catalog.by_ids(options.kind, &ids).await;
    spinner.finish_and_clear();
    let summaries = summaries?;

    if options.json {
        println!("{}", to_json(&summaries)?);
    } else {
        print_summaries(options.kind, &summaries);
    }

    Ok(())
}
