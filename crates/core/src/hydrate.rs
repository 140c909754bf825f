//! Hydration of parent records
//!
//! A parent record carries reference fields holding URLs of other entities. Hydration
//! swaps each of those URL lists for the matching [`ResolvedSummary`] values taken from a
//! fully built [`ResolutionMap`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::kind::{EntityKind, ResolvedSummary};
use crate::listing::{PageInfo, RawEntity};
use crate::reference::{extract_id, EntityId, ReferenceError};

/// Read-only lookup from `(kind, id)` to summary, built once per aggregation run
#[derive(Debug, Clone, Default)]
pub struct ResolutionMap {
    entries: HashMap<(EntityKind, EntityId), ResolvedSummary>,
}

impl ResolutionMap {
    /// Build the map from per-kind resolution results.
    pub fn from_parts<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = (EntityKind, HashMap<EntityId, ResolvedSummary>)>,
    {
        let entries = parts
            .into_iter()
            .flat_map(|(kind, summaries)| {
                summaries
                    .into_iter()
                    .map(move |(id, summary)| ((kind, id), summary))
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Option<&ResolvedSummary> {
        self.entries.get(&(kind, id.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parent record whose reference fields now hold summaries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HydratedRecord(Map<String, Value>);

impl HydratedRecord {
    pub fn id(&self) -> Option<EntityId> {
        self.0.get("id").and_then(EntityId::from_json)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// A single hydrated listing page
#[derive(Debug, Clone, Serialize)]
pub struct HydratedPage {
    pub info: PageInfo,
    pub results: Vec<HydratedRecord>,
}

/// Distinct references found across a set of parent records
#[derive(Debug, Clone, Default)]
pub struct References {
    pub wanted: BTreeMap<EntityKind, BTreeSet<EntityId>>,
    pub malformed: Vec<ReferenceError>,
}

impl References {
    /// Number of distinct `(kind, id)` pairs
    pub fn distinct(&self) -> usize {
        self.wanted.values().map(BTreeSet::len).sum()
    }
}

/// Reference URLs held by a field, in order.
///
/// A single string counts as a one-element list; anything that is not a string is
/// reported as malformed.
fn reference_urls(value: Option<&Value>) -> Vec<Result<&str, ReferenceError>> {
    fn as_url(value: &Value) -> Result<&str, ReferenceError> {
        match value {
            Value::String(s) => Ok(s.as_str()),
            other => Err(ReferenceError::MalformedReference(other.to_string())),
        }
    }

    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(as_url).collect(),
        Some(other) => vec![as_url(other)],
    }
}

fn reference_ids(
    value: Option<&Value>,
) -> impl Iterator<Item = Result<EntityId, ReferenceError>> + '_ {
    reference_urls(value)
        .into_iter()
        .map(|url| url.and_then(extract_id))
}

/// Collect the deduplicated union of references across all parent records.
pub fn collect_references(kind: EntityKind, records: &[RawEntity]) -> References {
    let mut references = References::default();

    for record in records {
        for field in kind.reference_fields() {
            for id in reference_ids(record.get(field.name)) {
                match id {
                    Ok(id) => {
                        references.wanted.entry(field.target).or_default().insert(id);
                    }
                    Err(err) => references.malformed.push(err),
                }
            }
        }
    }

    references
}

/// Replace every reference field of `record` with its resolved summaries.
///
/// Order follows the original references, duplicates included. References that are
/// malformed or absent from `map` are dropped.
pub fn hydrate(kind: EntityKind, record: &RawEntity, map: &ResolutionMap) -> HydratedRecord {
    let mut hydrated = record.clone();

    for field in kind.reference_fields() {
        let summaries: Vec<Value> = reference_ids(record.get(field.name))
            .filter_map(Result::ok)
            .filter_map(|id| map.get(field.target, &id))
            .map(ResolvedSummary::to_json)
            .collect();

        hydrated.insert(field.name.to_string(), Value::Array(summaries));
    }

    HydratedRecord(hydrated)
}
