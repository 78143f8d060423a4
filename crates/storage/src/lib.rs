use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{GenreId, MovieId};

const MOVIE_COLUMNS: &str =
    "id, title, plot, image_url, wikipedia_url, year, release_date, rating, genre_id";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredMovie {
    pub movie_id: MovieId,
    pub title: String,
    pub plot: String,
    pub image_url: String,
    pub wikipedia_url: Option<String>,
    pub year: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<f64>,
    pub genre_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGenre {
    pub genre_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewMovie {
    pub title: String,
    pub plot: String,
    pub image_url: String,
    pub wikipedia_url: Option<String>,
    pub year: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<f64>,
    pub genre_id: Option<i64>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open catalog database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run catalog migrations")?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts a genre, or returns the id of the existing genre with that name.
    pub async fn create_genre(&self, name: &str) -> Result<i64> {
        let rec = sqlx::query(
            "INSERT INTO genres (name) VALUES (?)
             ON CONFLICT(name) DO UPDATE SET name=excluded.name
             RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to store genre '{name}'"))?;
        Ok(rec.get::<i64, _>(0))
    }

    pub async fn genre_by_name(&self, name: &str) -> Result<Option<StoredGenre>> {
        let row = sqlx::query("SELECT id, name FROM genres WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| StoredGenre {
            genre_id: r.get::<i64, _>(0),
            name: r.get::<String, _>(1),
        }))
    }

    pub async fn list_genres(&self) -> Result<Vec<StoredGenre>> {
        let rows = sqlx::query("SELECT id, name FROM genres ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| StoredGenre {
                genre_id: r.get::<i64, _>(0),
                name: r.get::<String, _>(1),
            })
            .collect())
    }

    pub async fn create_movie(&self, movie: &NewMovie) -> Result<MovieId> {
        let rec = sqlx::query(
            "INSERT INTO movies
                (title, plot, image_url, wikipedia_url, year, release_date, rating, genre_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&movie.title)
        .bind(&movie.plot)
        .bind(&movie.image_url)
        .bind(&movie.wikipedia_url)
        .bind(movie.year)
        .bind(movie.release_date)
        .bind(movie.rating)
        .bind(movie.genre_id)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to store movie '{}'", movie.title))?;
        Ok(MovieId(rec.get::<i64, _>(0)))
    }

    pub async fn list_movies(&self) -> Result<Vec<StoredMovie>> {
        let rows = sqlx::query(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(movie_from_row).collect()
    }

    /// Movies of one genre. Ids that are not integers cannot match any stored
    /// genre and yield an empty list.
    pub async fn list_movies_by_genre(&self, genre_id: &GenreId) -> Result<Vec<StoredMovie>> {
        let Some(genre_id) = genre_id.as_i64() else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE genre_id = ? ORDER BY id ASC"
        ))
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(movie_from_row).collect()
    }
}

fn movie_from_row(row: &SqliteRow) -> Result<StoredMovie> {
    Ok(StoredMovie {
        movie_id: MovieId(row.try_get::<i64, _>("id")?),
        title: row.try_get("title")?,
        plot: row.try_get("plot")?,
        image_url: row.try_get("image_url")?,
        wikipedia_url: row.try_get("wikipedia_url")?,
        year: row.try_get("year")?,
        release_date: row
            .try_get("release_date")
            .context("invalid release_date column")?,
        rating: row.try_get("rating")?,
        genre_id: row.try_get("genre_id")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
