use log::debug;
use std::collections::HashSet;

use multiverse_core::listing::{normalize_next, Listing, Page};

use crate::error::Error;
use crate::transport::Transport;

/// Fetch and parse a single listing page
pub async fn fetch_page<T: Transport + ?Sized>(transport: &T, path: &str) -> Result<Page, Error> {
    let body = transport.get(path).await?;

    Page::from_json(body).map_err(|e| Error::UnexpectedShape {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Fetch all listing pages, following `info.next` until the remote stops announcing one.
///
/// The page count declared by the first page is only recorded; a missing `next` link is
/// what ends the walk. Any failed page fails the whole walk.
pub async fn fetch_all<T: Transport + ?Sized>(transport: &T, start: &str) -> Result<Listing, Error> {
    debug!("Fetching listing page 1: {}", start);
    let first = fetch_page(transport, start).await?;

    fetch_rest(transport, start, first).await
}

/// Continue a listing walk from an already fetched first page.
///
/// Every page after `first` is fetched here, and any failure among them fails the walk.
pub async fn fetch_rest<T: Transport + ?Sized>(
    transport: &T,
    start: &str,
    first: Page,
) -> Result<Listing, Error> {
    let mut listing = Listing {
        declared_pages: first.info.pages,
        ..Listing::default()
    };
    let mut visited = HashSet::from([start.to_string()]);
    let mut page = first;

    loop {
        listing.pages_fetched += 1;

        let next = if page.is_last() {
            None
        } else {
            page.info
                .next
                .as_deref()
                .map(|link| normalize_next(link, transport.base_url()))
        };
        listing.items.extend(page.results);

        let Some(path) = next else {
            break;
        };
        if !visited.insert(path.clone()) {
            return Err(Error::PaginationLoop(path));
        }

        debug!(
            "Fetching listing page {} ({} items so far): {}",
            listing.pages_fetched + 1,
            listing.items.len(),
            path
        );
        page = fetch_page(transport, &path).await?;
    }

    if let Some(declared) = listing.declared_pages {
        if declared.max(1) != listing.pages_fetched {
            debug!(
                "Listing {} declared {} pages but {} were walked",
                start, declared, listing.pages_fetched
            );
        }
    }

    Ok(listing)
}
