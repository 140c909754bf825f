//! Reference URL parsing
//!
//! A reference URL points at another entity's canonical location, e.g.
//! `https://rickandmortyapi.com/api/character/73`. The trailing path segment is the
//! referenced entity's identifier. The rule is the same for every entity kind.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;

/// Error raised when a reference URL carries no identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("Malformed reference URL (no trailing identifier): {0:?}")]
    MalformedReference(String),
}

/// Opaque identifier of an entity within its kind.
///
/// Numeric identifiers order numerically so that batch requests read `1,2,10`
/// rather than `1,10,2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read an identifier from a JSON `id` value (number or string).
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            _ => None,
        }
    }

    /// JSON form of the identifier: a number when the id is canonical decimal, else a string.
    pub fn to_json(&self) -> Value {
        match self.as_number() {
            Some(n) if n.to_string() == self.0 => Value::from(n),
            _ => Value::String(self.0.clone()),
        }
    }

    fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_number() {
            Some(n) if n.to_string() == self.0 => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

/// Extract the identifier from a reference URL.
///
/// Any query string or fragment is ignored. Fails when the last path segment is empty,
/// which covers `""`, `"https://host/api/character/"` and friends.
pub fn extract_id(url: &str) -> Result<EntityId, ReferenceError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();

    match path.rsplit('/').next() {
        Some(segment) if !segment.trim().is_empty() => Ok(EntityId(segment.trim().to_string())),
        _ => Err(ReferenceError::MalformedReference(url.to_string())),
    }
}
