//! Paginated listing responses
//!
//! The catalog answers listing requests with
//! `{ info: { count, pages, next, prev }, results: [...] }`. `next` is the only
//! authoritative signal that more pages exist; `pages` is advisory.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kind::EntityKind;

/// Raw entity record as returned by the remote
pub type RawEntity = Map<String, Value>;

/// Listing metadata
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PageInfo {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// One page of a listing
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Page {
    #[serde(default)]
    pub info: PageInfo,
    #[serde(default)]
    pub results: Vec<RawEntity>,
}

impl Page {
    /// Parse a listing page from a JSON body
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// `true` when the remote declares no further page
    pub fn is_last(&self) -> bool {
        self.info.next.as_deref().map_or(true, str::is_empty)
    }
}

/// Every record of a listing, flattened in page order
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub items: Vec<RawEntity>,
    /// Page count announced by the first page, if any
    pub declared_pages: Option<u64>,
    /// Pages actually walked
    pub pages_fetched: u64,
}

/// Path of the first listing page for a kind
pub fn first_page_path(kind: EntityKind) -> String {
    kind.collection_path().to_string()
}

/// Path of a specific (1-indexed) listing page
pub fn page_path(kind: EntityKind, page: u64) -> String {
    format!("{}?page={}", kind.collection_path(), page.max(1))
}

/// Turn a `next` link into a request-able path by stripping the known base prefix.
///
/// Links that do not start with `base_url` are returned untouched so the transport
/// requests them as absolute URLs.
pub fn normalize_next(next: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    match next.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '?']) => rest.to_string(),
        _ => next.to_string(),
    }
}
