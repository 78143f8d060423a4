use std::sync::Arc;

use shared::domain::GenreId;
use tracing::{debug, info};

use crate::{error::FetchError, gateway::FetchGateway, store::CollectionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreSelection {
    /// No filter.
    All,
    Genre(GenreId),
}

impl GenreSelection {
    /// Interprets the raw value of a genre picker. Empty input means no filter.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            Self::All
        } else {
            Self::Genre(GenreId::new(raw))
        }
    }
}

impl From<Option<GenreId>> for GenreSelection {
    fn from(value: Option<GenreId>) -> Self {
        match value {
            Some(genre_id) if !genre_id.as_str().trim().is_empty() => Self::Genre(genre_id),
            _ => Self::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Applied { count: usize },
    /// A newer request started before this one settled; its response was dropped.
    Superseded,
    Cleared,
}

pub struct GenreFilterController {
    gateway: Arc<dyn FetchGateway>,
    store: CollectionStore,
}

impl GenreFilterController {
    pub fn new(gateway: Arc<dyn FetchGateway>, store: CollectionStore) -> Self {
        Self { gateway, store }
    }

    pub async fn on_genre_selected(
        &self,
        selection: GenreSelection,
    ) -> Result<FilterOutcome, FetchError> {
        let genre_id = match selection {
            GenreSelection::All => {
                self.store.clear_genre_filter();
                info!("catalog: genre filter cleared");
                return Ok(FilterOutcome::Cleared);
            }
            GenreSelection::Genre(genre_id) => genre_id,
        };

        let ticket = self.store.begin_genre_fetch();
        debug!(%genre_id, generation = ticket.generation(), "catalog: filtering by genre");

        match self.gateway.fetch_by_genre(&genre_id).await {
            Ok(movies) => {
                let count = movies.len();
                if self
                    .store
                    .commit_movies(ticket, movies, Some(genre_id.clone()))
                {
                    info!(%genre_id, count, "catalog: genre filter applied");
                    Ok(FilterOutcome::Applied { count })
                } else {
                    debug!(
                        %genre_id,
                        generation = ticket.generation(),
                        "catalog: dropped superseded genre response"
                    );
                    Ok(FilterOutcome::Superseded)
                }
            }
            Err(err) => {
                if !self.store.fail_movies(ticket, err.to_string()) {
                    debug!(
                        %genre_id,
                        generation = ticket.generation(),
                        "catalog: superseded genre request failed"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
