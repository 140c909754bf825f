use std::time::Duration;

use crate::transport::TransportError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Unexpected response for {path}: {message}")]
    UnexpectedShape { path: String, message: String },

    #[error("Pagination loops back to an already fetched page: {0}")]
    PaginationLoop(String),

    #[error("Operation cancelled after {0:?}")]
    Cancelled(Duration),
}
