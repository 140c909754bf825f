use crate::prelude::{println, *};
use colored::Colorize;
use multiverse_core::hydrate::HydratedRecord;
use multiverse_core::kind::{EntityKind, ResolvedSummary};
use serde::Serialize;
use serde_json::Value;

/// Names shown per reference cell before collapsing the rest into a count
const MAX_NAMES: usize = 3;

/// Serialize any output as pretty JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// `air_date` -> `Air date`
pub fn header_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a scalar JSON value for a table cell
pub fn scalar_cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Summarize a hydrated reference list: the first few names plus a count of the rest
pub fn reference_cell(summaries: &[Value]) -> String {
    if summaries.is_empty() {
        return "-".to_string();
    }

    let names: Vec<&str> = summaries
        .iter()
        .take(MAX_NAMES)
        .map(|s| s.get("name").and_then(Value::as_str).unwrap_or("?"))
        .collect();

    let mut cell = names.join(", ");
    if summaries.len() > MAX_NAMES {
        cell.push_str(&format!(" (+{} more)", summaries.len() - MAX_NAMES));
    }
    cell
}

/// Print hydrated records as a table
pub fn print_records(kind: EntityKind, records: &[HydratedRecord]) {
    if records.is_empty() {
        println!("{}", format!("No {} records found.", kind).yellow());
        return;
    }

    let mut table = crate::prelude::new_table();

    let mut header = vec!["ID".bold().cyan().to_string(), "Name".bold().cyan().to_string()];
    header.extend(
        kind.display_fields()
            .iter()
            .map(|f| header_label(f).bold().cyan().to_string()),
    );
    header.extend(
        kind.reference_fields()
            .iter()
            .map(|f| header_label(f.name).bold().cyan().to_string()),
    );
    table.add_row(prettytable::Row::new(
        header.into_iter().map(|h| prettytable::Cell::new(&h)).collect(),
    ));

    for record in records {
        let mut cells = vec![
            scalar_cell(record.get("id")).bright_yellow().to_string(),
            scalar_cell(record.get("name")).bright_white().to_string(),
        ];
        cells.extend(
            kind.display_fields()
                .iter()
                .map(|f| scalar_cell(record.get(f))),
        );
        cells.extend(kind.reference_fields().iter().map(|f| {
            let summaries = record
                .get(f.name)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            reference_cell(summaries).bright_magenta().to_string()
        }));

        table.add_row(prettytable::Row::new(
            cells.iter().map(|c| prettytable::Cell::new(c)).collect(),
        ));
    }

    table.printstd();
    println!(
        "\n{} {} record(s)",
        "Total:".bright_white().bold(),
        records.len().to_string().bright_cyan().bold()
    );
}

/// Print resolved summaries as a table
pub fn print_summaries(kind: EntityKind, summaries: &[ResolvedSummary]) {
    if summaries.is_empty() {
        println!("{}", format!("No matching {} found.", kind).yellow());
        return;
    }

    let mut table = crate::prelude::new_table();
    let mut header = vec!["ID".bold().cyan().to_string(), "Name".bold().cyan().to_string()];
    header.extend(
        kind.display_fields()
            .iter()
            .map(|f| header_label(f).bold().cyan().to_string()),
    );
    table.add_row(prettytable::Row::new(
        header.into_iter().map(|h| prettytable::Cell::new(&h)).collect(),
    ));

    for summary in summaries {
        let mut cells = vec![
            summary.id.to_string().bright_yellow().to_string(),
            summary.name.bright_white().to_string(),
        ];
        cells.extend(
            kind.display_fields()
                .iter()
                .map(|f| scalar_cell(summary.display.get(*f))),
        );
        table.add_row(prettytable::Row::new(
            cells.iter().map(|c| prettytable::Cell::new(c)).collect(),
        ));
    }

    table.printstd();
}
