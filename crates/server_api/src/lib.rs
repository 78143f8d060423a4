use shared::{
    domain::GenreId,
    error::{ApiError, ErrorCode},
    protocol::{Genre, Movie},
};
use storage::{Storage, StoredGenre, StoredMovie};
use tracing::error;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_movies(ctx: &ApiContext) -> Result<Vec<Movie>, ApiError> {
    let movies = ctx.storage.list_movies().await.map_err(internal)?;
    Ok(movies.into_iter().map(movie_record).collect())
}

pub async fn list_genres(ctx: &ApiContext) -> Result<Vec<Genre>, ApiError> {
    let genres = ctx.storage.list_genres().await.map_err(internal)?;
    Ok(genres.into_iter().map(genre_record).collect())
}

pub async fn list_movies_by_genre(
    ctx: &ApiContext,
    genre_id: &GenreId,
) -> Result<Vec<Movie>, ApiError> {
    let movies = ctx
        .storage
        .list_movies_by_genre(genre_id)
        .await
        .map_err(internal)?;
    Ok(movies.into_iter().map(movie_record).collect())
}

pub async fn health(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.storage.health_check().await.map_err(internal)
}

fn movie_record(movie: StoredMovie) -> Movie {
    Movie {
        id: movie.movie_id,
        title: movie.title,
        plot: movie.plot,
        image_url: movie.image_url,
        wikipedia_url: movie.wikipedia_url,
        year: movie.year,
        release_date: movie.release_date,
        rating: movie.rating,
        genre_id: movie.genre_id.map(GenreId::from),
    }
}

fn genre_record(genre: StoredGenre) -> Genre {
    Genre {
        id: GenreId::from(genre.genre_id),
        name: genre.name,
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = %format!("{err:#}"), "catalog storage failure");
    ApiError::new(ErrorCode::Internal, err.to_string())
}
