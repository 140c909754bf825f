//! Batch lookup helpers
//!
//! The catalog fetches several entities of one kind in a single request by joining their
//! ids with commas (`/character/1,2,3`). It answers with a bare object when exactly one id
//! was requested and with an array otherwise. Ids it does not know are left out of the
//! array.

use serde_json::Value;
use std::collections::HashMap;

use crate::kind::{summarize, EntityKind, ResolvedSummary};
use crate::reference::EntityId;

/// Default maximum number of ids joined into one request
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("Unexpected batch response shape: expected object or array, got {0}")]
    UnexpectedShape(&'static str),
}

/// Split ids into chunks of at most `max` entries, keeping their order.
///
/// A `max` of zero is treated as one.
pub fn partition_ids(ids: &[EntityId], max: usize) -> Vec<Vec<EntityId>> {
    ids.chunks(max.max(1)).map(<[EntityId]>::to_vec).collect()
}

/// Request path for a batch of ids of one kind
pub fn batch_path(kind: EntityKind, ids: &[EntityId]) -> String {
    let joined = ids
        .iter()
        .map(EntityId::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!("{}/{}", kind.collection_path(), joined)
}

/// Normalize the single-object and array response forms into one list of records.
pub fn normalize_batch_response(value: Value) -> Result<Vec<Value>, ShapeError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![value]),
        Value::Null => Err(ShapeError::UnexpectedShape("null")),
        Value::Bool(_) => Err(ShapeError::UnexpectedShape("boolean")),
        Value::Number(_) => Err(ShapeError::UnexpectedShape("number")),
        Value::String(_) => Err(ShapeError::UnexpectedShape("string")),
    }
}

/// Summaries found for one batch, plus the requested ids that did not come back
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub summaries: HashMap<EntityId, ResolvedSummary>,
    pub gaps: Vec<EntityId>,
}

impl BatchOutcome {
    /// Merge another (disjoint) outcome into this one
    pub fn merge(mut self, other: BatchOutcome) -> Self {
        self.summaries.extend(other.summaries);
        self.gaps.extend(other.gaps);
        self
    }
}

/// Index the records of a batch response by id.
///
/// Only requested ids are kept; records the remote added on its own are ignored.
/// Requested ids without a record are reported as gaps, in request order.
pub fn index_batch(kind: EntityKind, requested: &[EntityId], records: Vec<Value>) -> BatchOutcome {
    let mut found: HashMap<EntityId, ResolvedSummary> = records
        .iter()
        .filter_map(|record| summarize(kind, record))
        .map(|summary| (summary.id.clone(), summary))
        .collect();

    let mut outcome = BatchOutcome::default();
    for id in requested {
        match found.remove(id) {
            Some(summary) => {
                outcome.summaries.insert(id.clone(), summary);
            }
            None if outcome.summaries.contains_key(id) => {}
            None => outcome.gaps.push(id.clone()),
        }
    }

    outcome
}
