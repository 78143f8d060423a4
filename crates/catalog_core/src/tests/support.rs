use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    domain::{GenreId, MovieId},
    protocol::{Genre, Movie},
};
use tokio::sync::oneshot;

use crate::{
    error::{Endpoint, FetchError},
    gateway::FetchGateway,
};

pub(crate) fn movie(id: i64, rating: Option<f64>, release_date: Option<&str>) -> Movie {
    Movie {
        id: MovieId(id),
        title: format!("movie-{id}"),
        plot: format!("plot of movie {id}"),
        image_url: format!("https://images.example/{id}.jpg"),
        wikipedia_url: None,
        year: None,
        release_date: release_date
            .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("date")),
        rating,
        genre_id: None,
    }
}

pub(crate) fn genre(id: &str, name: &str) -> Genre {
    Genre {
        id: GenreId::new(id),
        name: name.to_string(),
    }
}

pub(crate) fn ids(movies: &[Movie]) -> Vec<i64> {
    movies.iter().map(|movie| movie.id.0).collect()
}

pub(crate) enum Reply<T> {
    Items(Vec<T>),
    Status(u16),
    Gated(oneshot::Receiver<Vec<T>>),
}

impl<T> Reply<T> {
    async fn resolve(self, endpoint: Endpoint) -> Result<Vec<T>, FetchError> {
        match self {
            Reply::Items(items) => Ok(items),
            Reply::Status(status) => Err(FetchError::FetchFailed {
                endpoint,
                status: Some(status),
                cause: format!("server responded with {status}"),
            }),
            Reply::Gated(rx) => rx
                .await
                .map_err(|_| FetchError::fetch_failed(endpoint, "gate dropped")),
        }
    }
}

/// Scripted gateway: each request pops the next reply queued for its endpoint
/// and every call is recorded.
#[derive(Default)]
pub(crate) struct FakeGateway {
    all_movies: Mutex<VecDeque<Reply<Movie>>>,
    genres: Mutex<VecDeque<Reply<Genre>>>,
    by_genre: Mutex<HashMap<GenreId, VecDeque<Reply<Movie>>>>,
    calls: Mutex<Vec<Endpoint>>,
}

impl FakeGateway {
    pub(crate) fn push_all(&self, reply: Reply<Movie>) {
        self.all_movies.lock().expect("lock").push_back(reply);
    }

    pub(crate) fn push_genres(&self, reply: Reply<Genre>) {
        self.genres.lock().expect("lock").push_back(reply);
    }

    pub(crate) fn push_by_genre(&self, genre_id: &str, reply: Reply<Movie>) {
        self.by_genre
            .lock()
            .expect("lock")
            .entry(GenreId::new(genre_id))
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, endpoint: &Endpoint) {
        self.calls.lock().expect("lock").push(endpoint.clone());
    }
}

fn unscripted<T>(endpoint: Endpoint) -> Result<Vec<T>, FetchError> {
    Err(FetchError::fetch_failed(endpoint, "no scripted reply"))
}

#[async_trait]
impl FetchGateway for FakeGateway {
    async fn fetch_all(&self) -> Result<Vec<Movie>, FetchError> {
        let endpoint = Endpoint::Movies;
        self.record(&endpoint);
        let reply = self.all_movies.lock().expect("lock").pop_front();
        match reply {
            Some(reply) => reply.resolve(endpoint).await,
            None => unscripted(endpoint),
        }
    }

    async fn fetch_genres(&self) -> Result<Vec<Genre>, FetchError> {
        let endpoint = Endpoint::Genres;
        self.record(&endpoint);
        let reply = self.genres.lock().expect("lock").pop_front();
        match reply {
            Some(reply) => reply.resolve(endpoint).await,
            None => unscripted(endpoint),
        }
    }

    async fn fetch_by_genre(&self, genre_id: &GenreId) -> Result<Vec<Movie>, FetchError> {
        let endpoint = Endpoint::MoviesByGenre(genre_id.clone());
        self.record(&endpoint);
        let reply = self
            .by_genre
            .lock()
            .expect("lock")
            .get_mut(genre_id)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(reply) => reply.resolve(endpoint).await,
            None => unscripted(endpoint),
        }
    }
}
