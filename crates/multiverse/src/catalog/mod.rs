//! Aggregation of catalog listings into hydrated records
//!
//! [`Catalog`] walks a listing to exhaustion, collects every distinct reference across all
//! records, resolves them in bounded batches and hydrates each record from the resulting
//! [`ResolutionMap`]. Each referenced entity is fetched at most once per call, however many
//! records point at it.

use futures::future::try_join_all;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use multiverse_core::hydrate::{
    collect_references, hydrate, HydratedPage, HydratedRecord, References, ResolutionMap,
};
use multiverse_core::kind::{EntityKind, ResolvedSummary};
use multiverse_core::listing::{first_page_path, page_path, RawEntity};
use multiverse_core::reference::EntityId;

use crate::config::CatalogConfig;
use crate::error::Error;
use crate::transport::Transport;

#[cfg(test)]
pub(crate) mod fake;
pub mod paginator;
pub mod resolver;

pub use resolver::resolve_batch;

pub struct Catalog<T> {
    transport: T,
    batch_size: usize,
    deadline: Option<Duration>,
}

impl<T: Transport> Catalog<T> {
    pub fn new(transport: T, config: &CatalogConfig) -> Self {
        Self {
            transport,
            batch_size: config.batch_size,
            deadline: config.deadline,
        }
    }

    /// Every character with its episodes hydrated
    pub async fn characters(&self) -> Result<Vec<HydratedRecord>, Error> {
        self.aggregate_all(EntityKind::Character).await
    }

    /// Every episode with its characters hydrated
    pub async fn episodes(&self) -> Result<Vec<HydratedRecord>, Error> {
        self.aggregate_all(EntityKind::Episode).await
    }

    /// Every location with its residents hydrated
    pub async fn locations(&self) -> Result<Vec<HydratedRecord>, Error> {
        self.aggregate_all(EntityKind::Location).await
    }

    /// Fetch every record of `kind` and hydrate its references.
    ///
    /// Fails as a whole if any page or any resolution batch fails.
    pub async fn aggregate_all(&self, kind: EntityKind) -> Result<Vec<HydratedRecord>, Error> {
        self.within_deadline(self.aggregate_listing(kind, &first_page_path(kind)))
            .await
    }

    /// Records of `kind` whose name matches `name`, hydrated.
    ///
    /// The remote answers a search without matches with 404 on the first listing page,
    /// which is reported here as an empty result. A 404 anywhere later in the walk or in
    /// reference resolution fails the search like any other error.
    pub async fn search(&self, kind: EntityKind, name: &str) -> Result<Vec<HydratedRecord>, Error> {
        let path = format!(
            "{}?name={}",
            kind.collection_path(),
            urlencoding::encode(name)
        );

        self.within_deadline(async {
            let first = match paginator::fetch_page(&self.transport, &path).await {
                Err(Error::Transport(err)) if err.is_not_found() => {
                    debug!("No {} matches {:?}", kind, name);
                    return Ok(Vec::new());
                }
                other => other?,
            };

            let listing = paginator::fetch_rest(&self.transport, &path, first).await?;
            self.hydrate_records(kind, &listing.items).await
        })
        .await
    }

    /// A single listing page of `kind`, hydrated, with its listing metadata
    pub async fn page(&self, kind: EntityKind, page: u64) -> Result<HydratedPage, Error> {
        self.within_deadline(async {
            let page = paginator::fetch_page(&self.transport, &page_path(kind, page)).await?;
            let results = self.hydrate_records(kind, &page.results).await?;

            Ok(HydratedPage {
                info: page.info,
                results,
            })
        })
        .await
    }

    /// Summaries for a known set of ids, bypassing pagination.
    ///
    /// Results follow the first occurrence of each id in `ids`; ids that do not resolve
    /// are left out.
    pub async fn by_ids(
        &self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<Vec<ResolvedSummary>, Error> {
        self.within_deadline(async {
            let wanted: BTreeSet<EntityId> = ids.iter().cloned().collect();
            let mut resolved =
                resolve_batch(&self.transport, kind, &wanted, self.batch_size).await?;

            Ok(ids.iter().filter_map(|id| resolved.remove(id)).collect())
        })
        .await
    }

    async fn aggregate_listing(
        &self,
        kind: EntityKind,
        start: &str,
    ) -> Result<Vec<HydratedRecord>, Error> {
        let listing = paginator::fetch_all(&self.transport, start).await?;
        debug!(
            "Fetched {} {} record(s) over {} page(s)",
            listing.items.len(),
            kind,
            listing.pages_fetched
        );

        self.hydrate_records(kind, &listing.items).await
    }

    async fn hydrate_records(
        &self,
        kind: EntityKind,
        records: &[RawEntity],
    ) -> Result<Vec<HydratedRecord>, Error> {
        let references = collect_references(kind, records);
        for err in &references.malformed {
            warn!("Dropping reference on {} record: {}", kind, err);
        }

        let map = self.resolve_references(&references).await?;

        Ok(records
            .iter()
            .map(|record| hydrate(kind, record, &map))
            .collect())
    }

    /// Resolve every referenced kind concurrently and merge the results once all are in.
    async fn resolve_references(&self, references: &References) -> Result<ResolutionMap, Error> {
        debug!(
            "Resolving {} distinct reference(s) across {} kind(s)",
            references.distinct(),
            references.wanted.len()
        );

        let parts = try_join_all(references.wanted.iter().map(|(kind, ids)| async move {
            let resolved = resolve_batch(&self.transport, *kind, ids, self.batch_size).await?;
            Ok::<_, Error>((*kind, resolved))
        }))
        .await?;

        Ok(ResolutionMap::from_parts(parts))
    }

    async fn within_deadline<R, F>(&self, operation: F) -> Result<R, Error>
    where
        F: Future<Output = Result<R, Error>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, operation)
                .await
                .map_err(|_| Error::Cancelled(deadline))?,
            None => operation.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::fake::{self, FakeCatalog};
    use crate::transport::TransportError;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn config(batch_size: usize) -> CatalogConfig {
        CatalogConfig {
            batch_size,
            ..CatalogConfig::default()
        }
    }

    fn field_ids(record: &HydratedRecord, field: &str) -> Vec<u64> {
        record
            .get(field)
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .map(|summary| summary["id"].as_u64().unwrap())
            .collect()
    }

    fn with_characters(catalog: FakeCatalog, ids: &[u64]) -> FakeCatalog {
        ids.iter().fold(catalog, |catalog, id| {
            catalog.with_entity(EntityKind::Character, fake::character(*id))
        })
    }

    /// Two listing pages: 20 episodes then 6. Episode 14 references only character 7,
    /// which the remote does not know; every other episode references 1..=3.
    fn two_page_episodes() -> FakeCatalog {
        let episode = |id: u64| {
            if id == 14 {
                fake::episode(id, &[7])
            } else {
                fake::episode(id, &[1, 2, 3])
            }
        };

        let catalog = FakeCatalog::new()
            .with_page(
                "/episode",
                fake::page((1..=20).map(episode).collect(), 2, Some("/episode?page=2")),
            )
            .with_page(
                "/episode?page=2",
                fake::page((21..=26).map(episode).collect(), 2, None),
            );

        with_characters(catalog, &[1, 2, 3])
    }

    #[tokio::test]
    async fn test_two_pages_flatten_and_drop_missing_reference() {
        let catalog = Catalog::new(two_page_episodes(), &config(100));

        let episodes = catalog.episodes().await.unwrap();
        assert_eq!(episodes.len(), 26);

        let ids: Vec<u64> = episodes
            .iter()
            .map(|e| e.get("id").and_then(Value::as_u64).unwrap())
            .collect();
        assert_eq!(ids, (1..=26).collect::<Vec<_>>());

        assert_eq!(episodes[13].get("characters"), Some(&json!([])));
        assert_eq!(field_ids(&episodes[0], "characters"), vec![1, 2, 3]);
        assert_eq!(
            episodes[0].get("characters").unwrap()[0],
            json!({
                "id": 1,
                "name": "Character 1",
                "image": format!("{}/character/avatar/1.jpeg", fake::BASE)
            })
        );
    }

    #[tokio::test]
    async fn test_resolution_calls_depend_on_distinct_references() {
        let catalog = Catalog::new(two_page_episodes(), &config(100));
        catalog.episodes().await.unwrap();

        // 26 episodes, 78 references, 4 distinct characters: one batch call
        assert_eq!(catalog.transport.batch_calls(), vec!["/character/1,2,3,7"]);
        assert_eq!(catalog.transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_resolution_batches_bounded_by_batch_size() {
        let catalog = Catalog::new(two_page_episodes(), &config(3));
        catalog.episodes().await.unwrap();

        let mut batches = catalog.transport.batch_calls();
        batches.sort();
        assert_eq!(batches, vec!["/character/1,2,3", "/character/7"]);
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent() {
        let catalog = Catalog::new(two_page_episodes(), &config(2));

        let first = catalog.episodes().await.unwrap();
        let second = catalog.episodes().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_order_preserved_with_duplicates() {
        let remote = FakeCatalog::new().with_page(
            "/location",
            fake::page(vec![fake::location(1, &[3, 1, 3, 2])], 1, None),
        );
        let catalog = Catalog::new(with_characters(remote, &[1, 2]), &config(100));

        let locations = catalog.locations().await.unwrap();
        assert_eq!(field_ids(&locations[0], "residents"), vec![1, 2]);

        let remote = FakeCatalog::new().with_page(
            "/location",
            fake::page(vec![fake::location(1, &[3, 1, 3, 2])], 1, None),
        );
        let catalog = Catalog::new(with_characters(remote, &[1, 2, 3]), &config(100));

        let locations = catalog.locations().await.unwrap();
        assert_eq!(field_ids(&locations[0], "residents"), vec![3, 1, 3, 2]);
        assert_eq!(locations[0].get("dimension"), Some(&json!("Dimension C-137")));
    }

    #[tokio::test]
    async fn test_characters_hydrate_episodes() {
        let remote = FakeCatalog::new()
            .with_page(
                "/character",
                fake::page(vec![fake::character(1), fake::character(2)], 1, None),
            )
            .with_entity(EntityKind::Episode, fake::episode(1, &[1, 2]));
        let catalog = Catalog::new(remote, &config(100));

        let characters = catalog.characters().await.unwrap();
        assert_eq!(
            characters[1].get("episode"),
            Some(&json!([{
                "id": 1,
                "name": "Episode 1",
                "air_date": "December 2, 2013",
                "episode": "S01E01"
            }]))
        );
        assert_eq!(catalog.transport.batch_calls(), vec!["/episode/1"]);
    }

    #[tokio::test]
    async fn test_malformed_reference_is_dropped() {
        let mut location = fake::location(1, &[1]);
        location["residents"]
            .as_array_mut()
            .unwrap()
            .push(json!(format!("{}/character/", fake::BASE)));

        let remote = FakeCatalog::new().with_page("/location", fake::page(vec![location], 1, None));
        let catalog = Catalog::new(with_characters(remote, &[1]), &config(100));

        let locations = catalog.locations().await.unwrap();
        assert_eq!(field_ids(&locations[0], "residents"), vec![1]);
    }

    #[tokio::test]
    async fn test_no_references_no_batch_calls() {
        let remote = FakeCatalog::new().with_page(
            "/location",
            fake::page(vec![fake::location(1, &[]), fake::location(2, &[])], 1, None),
        );
        let catalog = Catalog::new(remote, &config(100));

        let locations = catalog.locations().await.unwrap();
        assert_eq!(locations.len(), 2);
        assert!(catalog.transport.batch_calls().is_empty());
    }

    #[tokio::test]
    async fn test_pagination_failure_fails_whole_operation() {
        let remote = two_page_episodes().with_failure(
            "/episode?page=2",
            TransportError::Network("connection reset".to_string()),
        );
        let catalog = Catalog::new(remote, &config(100));

        let result = catalog.episodes().await;
        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::Network(_)))
        ));
        assert!(catalog.transport.batch_calls().is_empty());
    }

    #[tokio::test]
    async fn test_batch_failure_fails_whole_operation() {
        let remote = two_page_episodes().with_failure(
            "/character/1,2,3,7",
            TransportError::HttpStatus {
                status: 502,
                url: "/character/1,2,3,7".to_string(),
            },
        );
        let catalog = Catalog::new(remote, &config(100));

        let result = catalog.episodes().await;
        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::HttpStatus { status: 502, .. }))
        ));
    }

    #[tokio::test]
    async fn test_deadline_cancels_operation() {
        let remote = two_page_episodes().with_delay(Duration::from_millis(200));
        let catalog = Catalog::new(
            remote,
            &CatalogConfig {
                deadline: Some(Duration::from_millis(20)),
                ..CatalogConfig::default()
            },
        );

        let result = catalog.episodes().await;
        assert!(matches!(result, Err(Error::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_search_encodes_name_and_hydrates() {
        let remote = FakeCatalog::new().with_page(
            "/location?name=Citadel%20of%20Ricks",
            fake::page(vec![fake::location(3, &[1])], 1, None),
        );
        let catalog = Catalog::new(with_characters(remote, &[1]), &config(100));

        let results = catalog
            .search(EntityKind::Location, "Citadel of Ricks")
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(field_ids(&results[0], "residents"), vec![1]);
    }

    #[tokio::test]
    async fn test_search_without_matches_is_empty() {
        let catalog = Catalog::new(FakeCatalog::new(), &config(100));

        let results = catalog
            .search(EntityKind::Character, "Nobody")
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_fails_when_later_page_missing() {
        // Only the first page may answer 404 for "no matches"
        let remote = FakeCatalog::new().with_page(
            "/character?name=rick",
            fake::page(vec![fake::character(1)], 2, Some("/character?page=2&name=rick")),
        );
        let catalog = Catalog::new(remote, &config(100));

        let result = catalog.search(EntityKind::Character, "rick").await;
        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::HttpStatus { status: 404, .. }))
        ));
        assert_eq!(
            catalog.transport.calls(),
            vec!["/character?name=rick", "/character?page=2&name=rick"]
        );
    }

    #[tokio::test]
    async fn test_kinds_resolve_concurrently() {
        let remote = with_characters(FakeCatalog::new(), &[1, 2])
            .with_entity(EntityKind::Episode, fake::episode(1, &[1]))
            .with_delay(Duration::from_millis(100));
        let catalog = Catalog::new(remote, &config(100));

        let characters: BTreeSet<EntityId> = [1u64, 2].into_iter().map(EntityId::from).collect();
        let episodes = BTreeSet::from([EntityId::from(1)]);
        let references = References {
            wanted: BTreeMap::from([
                (EntityKind::Character, characters),
                (EntityKind::Episode, episodes),
            ]),
            malformed: Vec::new(),
        };

        // One round trip per kind; sequential resolution would need 200ms
        let map = tokio::time::timeout(
            Duration::from_millis(170),
            catalog.resolve_references(&references),
        )
        .await
        .expect("kinds should be resolved in parallel")
        .unwrap();

        assert_eq!(map.len(), 3);
        assert!(map.get(EntityKind::Episode, &EntityId::from(1)).is_some());
    }

    #[tokio::test]
    async fn test_page_hydrates_single_page() {
        let remote = FakeCatalog::new().with_page(
            "/location?page=2",
            fake::page(vec![fake::location(21, &[2])], 7, Some("/location?page=3")),
        );
        let catalog = Catalog::new(with_characters(remote, &[2]), &config(100));

        let page = catalog.page(EntityKind::Location, 2).await.unwrap();
        assert_eq!(page.info.pages, Some(7));
        assert_eq!(page.results.len(), 1);
        assert_eq!(field_ids(&page.results[0], "residents"), vec![2]);
        assert!(!catalog.transport.calls().contains(&"/location?page=3".to_string()));
    }

    #[tokio::test]
    async fn test_by_ids_follows_request_order() {
        let catalog = Catalog::new(with_characters(FakeCatalog::new(), &[1, 2, 5]), &config(100));

        let ids: Vec<EntityId> = [5u64, 9, 1, 5].into_iter().map(EntityId::from).collect();
        let summaries = catalog.by_ids(EntityKind::Character, &ids).await.unwrap();

        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Character 5", "Character 1"]);
        assert_eq!(catalog.transport.calls(), vec!["/character/1,5,9"]);
    }
}
