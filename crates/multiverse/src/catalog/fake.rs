//! In-memory catalog used by the engine tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use multiverse_core::kind::EntityKind;

use crate::transport::{Transport, TransportError};

pub const BASE: &str = "https://rickandmortyapi.com/api";

/// Serves listing pages registered by path and answers batch lookups
/// (`/{kind}/{id,id,...}`) from an entity store, the way the real API does.
#[derive(Default)]
pub struct FakeCatalog {
    pages: HashMap<String, Value>,
    entities: HashMap<EntityKind, BTreeMap<String, Value>>,
    failures: HashMap<String, TransportError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, path: &str, body: Value) -> Self {
        self.pages.insert(path.to_string(), body);
        self
    }

    pub fn with_entity(mut self, kind: EntityKind, record: Value) -> Self {
        let id = record["id"].to_string();
        self.entities.entry(kind).or_default().insert(id, record);
        self
    }

    pub fn with_failure(mut self, path: &str, err: TransportError) -> Self {
        self.failures.insert(path.to_string(), err);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every path requested so far, in request order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests that were batch lookups rather than listing pages
    pub fn batch_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|path| !self.pages.contains_key(path))
            .collect()
    }

    fn batch_lookup(&self, path: &str) -> Option<Result<Value, TransportError>> {
        let kind = EntityKind::ALL.into_iter().find(|kind| {
            path.strip_prefix(kind.collection_path())
                .is_some_and(|rest| rest.starts_with('/') && !rest.contains('?'))
        })?;
        let ids = &path[kind.collection_path().len() + 1..];
        let store = self.entities.get(&kind);
        let find = |id: &str| store.and_then(|s| s.get(id)).cloned();

        if ids.contains(',') {
            let found: Vec<Value> = ids.split(',').filter_map(find).collect();
            Some(Ok(Value::Array(found)))
        } else {
            Some(find(ids).ok_or_else(|| TransportError::HttpStatus {
                status: 404,
                url: format!("{BASE}{path}"),
            }))
        }
    }
}

#[async_trait]
impl Transport for FakeCatalog {
    fn base_url(&self) -> &str {
        BASE
    }

    async fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(path.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failures.get(path) {
            return Err(err.clone());
        }
        if let Some(page) = self.pages.get(path) {
            return Ok(page.clone());
        }

        self.batch_lookup(path).unwrap_or_else(|| {
            Err(TransportError::HttpStatus {
                status: 404,
                url: format!("{BASE}{path}"),
            })
        })
    }
}

/// Reference URL for an entity
pub fn url(kind: EntityKind, id: u64) -> String {
    format!("{BASE}{}/{id}", kind.collection_path())
}

/// Listing page body with an optional absolute `next` link
pub fn page(results: Vec<Value>, pages: u64, next: Option<&str>) -> Value {
    json!({
        "info": {
            "count": results.len(),
            "pages": pages,
            "next": next.map(|path| format!("{BASE}{path}")),
            "prev": null
        },
        "results": results
    })
}

pub fn character(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("Character {id}"),
        "status": "Alive",
        "image": format!("{BASE}/character/avatar/{id}.jpeg"),
        "episode": [url(EntityKind::Episode, 1)]
    })
}

pub fn episode(id: u64, characters: &[u64]) -> Value {
    json!({
        "id": id,
        "name": format!("Episode {id}"),
        "air_date": "December 2, 2013",
        "episode": format!("S01E{id:02}"),
        "characters": characters
            .iter()
            .map(|c| url(EntityKind::Character, *c))
            .collect::<Vec<_>>(),
        "url": url(EntityKind::Episode, id)
    })
}

pub fn location(id: u64, residents: &[u64]) -> Value {
    json!({
        "id": id,
        "name": format!("Location {id}"),
        "type": "Planet",
        "dimension": "Dimension C-137",
        "residents": residents
            .iter()
            .map(|c| url(EntityKind::Character, *c))
            .collect::<Vec<_>>(),
        "url": url(EntityKind::Location, id)
    })
}
