use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::GenreId,
    protocol::{Genre, Movie},
};
use tokio::sync::watch;

use crate::sort::{Direction, SortEngine, SortKey, SortToggles};

/// The displayed collection at one point in time.
///
/// States are never edited in place: every store operation builds a new value
/// and swaps it in, so a snapshot held by a reader stays consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    pub movies: Vec<Movie>,
    pub genres: Vec<Genre>,
    pub loading: bool,
    pub sort_toggles: SortToggles,
    /// Genre whose movies are currently shown; `None` for the whole catalog.
    pub selected_genre: Option<GenreId>,
    pub last_error: Option<String>,
}

impl Default for CollectionState {
    fn default() -> Self {
        Self {
            movies: Vec::new(),
            genres: Vec::new(),
            loading: true,
            sort_toggles: SortToggles::default(),
            selected_genre: None,
            last_error: None,
        }
    }
}

/// Proof that a movie fetch was started. Only the most recent ticket may
/// commit its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct StoreInner {
    state: watch::Sender<Arc<CollectionState>>,
    // Both only written while holding the watch write lock.
    generation: AtomicU64,
    catalog_fetch_pending: AtomicBool,
}

/// Single source of truth for one view's collection. Clones share the same
/// state; any number of readers may [`subscribe`](Self::subscribe).
#[derive(Clone)]
pub struct CollectionStore {
    inner: Arc<StoreInner>,
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(CollectionState::default()));
        Self {
            inner: Arc::new(StoreInner {
                state,
                generation: AtomicU64::new(0),
                catalog_fetch_pending: AtomicBool::new(false),
            }),
        }
    }

    pub fn snapshot(&self) -> Arc<CollectionState> {
        Arc::clone(&self.inner.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<CollectionState>> {
        self.inner.state.subscribe()
    }

    pub fn movies(&self) -> Vec<Movie> {
        self.inner.state.borrow().movies.clone()
    }

    pub fn genres(&self) -> Vec<Genre> {
        self.inner.state.borrow().genres.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.state.borrow().last_error.clone()
    }

    pub fn replace_movies(&self, movies: Vec<Movie>) {
        self.update(|next| next.movies = movies);
    }

    pub fn replace_genres(&self, genres: Vec<Genre>) {
        self.update(|next| next.genres = genres);
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|next| next.loading = loading);
    }

    /// Records a failure for display without touching the loading flag.
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|next| next.last_error = Some(message));
    }

    /// Starts a fetch of the unfiltered catalog: raises the loading flag and
    /// invalidates every ticket handed out before.
    pub fn begin_movie_fetch(&self) -> FetchTicket {
        self.begin_fetch(true)
    }

    /// Starts a fetch of one genre's movies. Like [`begin_movie_fetch`](Self::begin_movie_fetch),
    /// but [`clear_genre_filter`](Self::clear_genre_filter) abandons it.
    pub fn begin_genre_fetch(&self) -> FetchTicket {
        self.begin_fetch(false)
    }

    fn begin_fetch(&self, unfiltered: bool) -> FetchTicket {
        let mut ticket = FetchTicket { generation: 0 };
        self.inner.state.send_modify(|state| {
            ticket.generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner
                .catalog_fetch_pending
                .store(unfiltered, Ordering::SeqCst);
            swap(state, |next| next.loading = true);
        });
        ticket
    }

    /// Replaces the movies with a fetch result if `ticket` is still the latest.
    /// Returns `false` when the response was superseded and dropped.
    pub fn commit_movies(
        &self,
        ticket: FetchTicket,
        movies: Vec<Movie>,
        selected_genre: Option<GenreId>,
    ) -> bool {
        self.inner.state.send_if_modified(|state| {
            if !self.is_current(ticket) {
                return false;
            }
            self.settle();
            swap(state, |next| {
                next.movies = movies;
                next.selected_genre = selected_genre;
                next.loading = false;
                next.last_error = None;
            });
            true
        })
    }

    /// Settles a failed fetch if `ticket` is still the latest; the movies are
    /// left as they were.
    pub fn fail_movies(&self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        let message = message.into();
        self.inner.state.send_if_modified(|state| {
            if !self.is_current(ticket) {
                return false;
            }
            self.settle();
            swap(state, |next| {
                next.loading = false;
                next.last_error = Some(message);
            });
            true
        })
    }

    /// Drops the genre filter marker and abandons any in-flight genre fetch.
    /// The current movies stay in place. A pending unfiltered fetch keeps
    /// running and still commits.
    pub fn clear_genre_filter(&self) {
        self.inner.state.send_modify(|state| {
            if self.inner.catalog_fetch_pending.load(Ordering::SeqCst) {
                swap(state, |next| next.selected_genre = None);
                return;
            }
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            swap(state, |next| {
                next.selected_genre = None;
                next.loading = false;
            });
        });
    }

    /// Applies one sort click to the current movies and returns the direction
    /// that was used.
    pub fn apply_sort(&self, key: SortKey) -> Direction {
        let mut applied = Direction::default();
        self.inner.state.send_modify(|state| {
            applied = state.sort_toggles.get(key);
            let outcome = SortEngine::click(&state.movies, key, state.sort_toggles);
            swap(state, |next| {
                next.movies = outcome.movies;
                next.sort_toggles = outcome.toggles;
            });
        });
        applied
    }

    fn settle(&self) {
        self.inner
            .catalog_fetch_pending
            .store(false, Ordering::SeqCst);
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == ticket.generation
    }

    fn update(&self, apply: impl FnOnce(&mut CollectionState)) {
        self.inner.state.send_modify(|state| swap(state, apply));
    }
}

fn swap(state: &mut Arc<CollectionState>, apply: impl FnOnce(&mut CollectionState)) {
    let mut next = CollectionState::clone(state);
    apply(&mut next);
    *state = Arc::new(next);
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
