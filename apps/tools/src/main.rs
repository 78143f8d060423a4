use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use shared::protocol::release_date;
use storage::{NewMovie, Storage};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/catalog.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateGenre {
        name: String,
    },
    CreateMovie {
        #[arg(long)]
        title: String,
        #[arg(long)]
        plot: String,
        #[arg(long)]
        image_url: String,
        #[arg(long)]
        wikipedia_url: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_parser = release_date::parse)]
        release_date: Option<NaiveDate>,
        #[arg(long)]
        rating: Option<f64>,
        /// Genre name; created when missing.
        #[arg(long)]
        genre: Option<String>,
    },
    /// Loads genres and movies from a JSON seed file.
    Import {
        path: PathBuf,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeedFile {
    genres: Vec<SeedGenre>,
    movies: Vec<SeedMovie>,
}

#[derive(Debug, Deserialize)]
struct SeedGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedMovie {
    title: String,
    plot: String,
    image_url: String,
    #[serde(default)]
    wikipedia_url: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    genre: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ImportSummary {
    genres: usize,
    movies: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateGenre { name } => {
            let genre_id = storage.create_genre(&name).await?;
            println!("created genre_id={genre_id}");
        }
        Command::CreateMovie {
            title,
            plot,
            image_url,
            wikipedia_url,
            year,
            release_date,
            rating,
            genre,
        } => {
            let genre_id = match genre {
                Some(name) => Some(storage.create_genre(&name).await?),
                None => None,
            };
            let movie_id = storage
                .create_movie(&NewMovie {
                    title,
                    plot,
                    image_url,
                    wikipedia_url,
                    year,
                    release_date,
                    rating,
                    genre_id,
                })
                .await?;
            println!("created movie_id={movie_id}");
        }
        Command::Import { path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
            let summary = import_seed(&storage, &raw).await?;
            println!(
                "imported {} genres and {} movies",
                summary.genres, summary.movies
            );
        }
    }

    Ok(())
}

async fn import_seed(storage: &Storage, raw: &str) -> Result<ImportSummary> {
    let seed: SeedFile = serde_json::from_str(raw).context("invalid seed file")?;

    let mut genre_ids = HashMap::new();
    for genre in &seed.genres {
        let name = genre.name.trim();
        if name.is_empty() {
            warn!("skipping seed genre with empty name");
            continue;
        }
        let genre_id = storage.create_genre(name).await?;
        genre_ids.insert(name.to_string(), genre_id);
    }

    for movie in &seed.movies {
        let genre_id = match movie.genre.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => match genre_ids.get(name) {
                Some(genre_id) => Some(*genre_id),
                None => bail!("movie '{}' references unknown genre '{name}'", movie.title),
            },
            _ => None,
        };
        let release_date = movie
            .release_date
            .as_deref()
            .map(release_date::parse)
            .transpose()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("movie '{}'", movie.title))?;

        storage
            .create_movie(&NewMovie {
                title: movie.title.clone(),
                plot: movie.plot.clone(),
                image_url: movie.image_url.clone(),
                wikipedia_url: movie.wikipedia_url.clone(),
                year: movie.year,
                release_date,
                rating: movie.rating,
                genre_id,
            })
            .await?;
    }

    let summary = ImportSummary {
        genres: genre_ids.len(),
        movies: seed.movies.len(),
    };
    info!(genres = summary.genres, movies = summary.movies, "seed imported");
    Ok(summary)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
