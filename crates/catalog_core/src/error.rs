use std::fmt;

use shared::domain::GenreId;
use thiserror::Error;

/// The three read requests the catalog exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Movies,
    Genres,
    MoviesByGenre(GenreId),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movies => f.write_str("/movies"),
            Self::Genres => f.write_str("/genres"),
            Self::MoviesByGenre(genre_id) => write!(f, "/movies/genre/{genre_id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {cause}")]
    FetchFailed {
        endpoint: Endpoint,
        status: Option<u16>,
        cause: String,
    },
    #[error("failed to decode {endpoint} payload: {source}")]
    DecodeFailed {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn fetch_failed(endpoint: Endpoint, cause: impl Into<String>) -> Self {
        Self::FetchFailed {
            endpoint,
            status: None,
            cause: cause.into(),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        match self {
            Self::FetchFailed { endpoint, .. } | Self::DecodeFailed { endpoint, .. } => endpoint,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::FetchFailed { status, .. } => *status,
            Self::DecodeFailed { .. } => None,
        }
    }
}
