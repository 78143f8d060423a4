use std::sync::Arc;

use anyhow::Result;
use shared::protocol::Genre;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    config::ClientSettings,
    error::FetchError,
    filter::{FilterOutcome, GenreFilterController, GenreSelection},
    gateway::{FetchGateway, HttpFetchGateway},
    sort::{Direction, SortKey},
    store::{CollectionState, CollectionStore},
};

/// One hosting view's catalog: owns the collection state and routes every
/// user action through it.
pub struct CatalogSession {
    gateway: Arc<dyn FetchGateway>,
    store: CollectionStore,
    genre_filter: GenreFilterController,
}

impl CatalogSession {
    pub fn new(gateway: Arc<dyn FetchGateway>) -> Self {
        let store = CollectionStore::new();
        let genre_filter = GenreFilterController::new(Arc::clone(&gateway), store.clone());
        Self {
            gateway,
            store,
            genre_filter,
        }
    }

    pub fn connect(settings: &ClientSettings) -> Result<Self> {
        let gateway = HttpFetchGateway::from_settings(settings)?;
        info!(server_url = %gateway.base_url(), "catalog: session created");
        Ok(Self::new(Arc::new(gateway)))
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<CollectionState> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<CollectionState>> {
        self.store.subscribe()
    }

    /// Startup load of every movie and every genre. Both requests run
    /// concurrently; whichever succeeds is committed even if the other fails.
    pub async fn load_initial(&self) -> Result<(), FetchError> {
        let ticket = self.store.begin_movie_fetch();
        let (movies, genres) =
            futures::join!(self.gateway.fetch_all(), self.gateway.fetch_genres());

        let movies_result = match movies {
            Ok(movies) => {
                let count = movies.len();
                if self.store.commit_movies(ticket, movies, None) {
                    info!(count, "catalog: movies loaded");
                }
                Ok(())
            }
            Err(err) => {
                self.store.fail_movies(ticket, err.to_string());
                Err(err)
            }
        };

        let genres_result = self.commit_genres(genres);
        movies_result.and(genres_result)
    }

    /// Replaces the collection with the unfiltered catalog.
    pub async fn reload_all(&self) -> Result<FilterOutcome, FetchError> {
        let ticket = self.store.begin_movie_fetch();
        match self.gateway.fetch_all().await {
            Ok(movies) => {
                let count = movies.len();
                if self.store.commit_movies(ticket, movies, None) {
                    info!(count, "catalog: catalog reloaded");
                    Ok(FilterOutcome::Applied { count })
                } else {
                    Ok(FilterOutcome::Superseded)
                }
            }
            Err(err) => {
                self.store.fail_movies(ticket, err.to_string());
                Err(err)
            }
        }
    }

    pub async fn select_genre(
        &self,
        selection: GenreSelection,
    ) -> Result<FilterOutcome, FetchError> {
        self.genre_filter.on_genre_selected(selection).await
    }

    /// One click on a sort button. Returns the direction that was applied.
    pub fn sort_by(&self, key: SortKey) -> Direction {
        let direction = self.store.apply_sort(key);
        info!(%key, ?direction, "catalog: collection sorted");
        direction
    }

    fn commit_genres(&self, genres: Result<Vec<Genre>, FetchError>) -> Result<(), FetchError> {
        match genres {
            Ok(genres) => {
                info!(count = genres.len(), "catalog: genres loaded");
                self.store.replace_genres(genres);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "catalog: genres unavailable");
                self.store.record_error(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
