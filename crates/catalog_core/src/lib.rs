//! Client-side collection state for the movie catalog: fetching, genre
//! filtering, and sort toggles over one in-memory collection.

pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod session;
pub mod sort;
pub mod store;

pub use config::{load_settings, ClientSettings};
pub use error::{Endpoint, FetchError};
pub use filter::{FilterOutcome, GenreFilterController, GenreSelection};
pub use gateway::{FetchGateway, HttpFetchGateway};
pub use session::CatalogSession;
pub use sort::{sort_movies, Direction, SortEngine, SortKey, SortOutcome, SortToggles};
pub use store::{CollectionState, CollectionStore, FetchTicket};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
