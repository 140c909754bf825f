use futures::future::try_join_all;
use log::debug;
use std::collections::{BTreeSet, HashMap};

use multiverse_core::batch::{
    batch_path, index_batch, normalize_batch_response, partition_ids, BatchOutcome,
};
use multiverse_core::kind::{EntityKind, ResolvedSummary};
use multiverse_core::reference::EntityId;

use crate::error::Error;
use crate::transport::Transport;

/// Resolve a set of ids of one kind to their summaries.
///
/// Ids are split into chunks of at most `batch_size`; chunks are fetched concurrently.
/// Ids the remote does not return are left out of the mapping.
pub async fn resolve_batch<T: Transport + ?Sized>(
    transport: &T,
    kind: EntityKind,
    ids: &BTreeSet<EntityId>,
    batch_size: usize,
) -> Result<HashMap<EntityId, ResolvedSummary>, Error> {
    resolve_with(transport, kind, ids, batch_size, kind.supports_multi_fetch()).await
}

async fn resolve_with<T: Transport + ?Sized>(
    transport: &T,
    kind: EntityKind,
    ids: &BTreeSet<EntityId>,
    batch_size: usize,
    multi_fetch: bool,
) -> Result<HashMap<EntityId, ResolvedSummary>, Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let ids: Vec<EntityId> = ids.iter().cloned().collect();
    let requests: Vec<Vec<EntityId>> = if multi_fetch {
        partition_ids(&ids, batch_size)
    } else {
        partition_ids(&ids, 1)
    };

    debug!(
        "Resolving {} {} id(s) in {} request(s)",
        ids.len(),
        kind,
        requests.len()
    );

    let outcomes = try_join_all(
        requests
            .iter()
            .map(|chunk| fetch_chunk(transport, kind, chunk)),
    )
    .await?;

    let outcome = outcomes
        .into_iter()
        .fold(BatchOutcome::default(), BatchOutcome::merge);

    if !outcome.gaps.is_empty() {
        debug!(
            "{} {} id(s) did not resolve: {}",
            outcome.gaps.len(),
            kind,
            outcome
                .gaps
                .iter()
                .map(EntityId::as_str)
                .collect::<Vec<_>>()
                .join(",")
        );
    }

    Ok(outcome.summaries)
}

/// One request for one chunk of ids.
///
/// A single-id request answered with 404 is the remote saying "not found", so it is
/// reported as a gap rather than an error.
async fn fetch_chunk<T: Transport + ?Sized>(
    transport: &T,
    kind: EntityKind,
    chunk: &[EntityId],
) -> Result<BatchOutcome, Error> {
    let path = batch_path(kind, chunk);

    let body = match transport.get(&path).await {
        Ok(body) => body,
        Err(err) if chunk.len() == 1 && err.is_not_found() => {
            return Ok(index_batch(kind, chunk, Vec::new()));
        }
        Err(err) => return Err(err.into()),
    };

    let records = normalize_batch_response(body).map_err(|e| Error::UnexpectedShape {
        path: path.clone(),
        message: e.to_string(),
    })?;

    Ok(index_batch(kind, chunk, records))
}
