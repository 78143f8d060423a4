use anyhow::{Context, Result};
use catalog_core::{load_settings, CatalogSession, CollectionState, GenreSelection, SortKey};
use clap::Parser;
use shared::protocol::Movie;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const PLOT_PREVIEW_CHARS: usize = 80;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides `server_url` from catalog.toml / CATALOG_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Genre id to filter by; an empty value shows the whole catalog.
    #[arg(long)]
    genre: Option<String>,
    /// Sort clicks to apply in order, e.g. `--sort rating --sort rating`.
    #[arg(long)]
    sort: Vec<SortKey>,
    /// Reload the unfiltered catalog before sorting.
    #[arg(long)]
    reload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }

    let session = CatalogSession::connect(&settings).context("failed to create catalog session")?;

    let mut updates = session.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            debug!(
                movies = state.movies.len(),
                genres = state.genres.len(),
                loading = state.loading,
                selected_genre = ?state.selected_genre,
                "catalog state changed"
            );
        }
    });

    if let Err(err) = session.load_initial().await {
        warn!(error = %err, "initial load incomplete");
    }

    if let Some(raw) = args.genre.as_deref() {
        session.select_genre(GenreSelection::from_raw(raw)).await?;
    }
    if args.reload {
        session.reload_all().await?;
    }
    for key in args.sort {
        let direction = session.sort_by(key);
        println!("sorted by {key} ({direction:?} toggle applied)");
    }

    print_state(&session.snapshot());
    Ok(())
}

fn print_state(state: &CollectionState) {
    if !state.genres.is_empty() {
        println!("Genres:");
        for genre in &state.genres {
            println!("  [{}] {}", genre.id, genre.name);
        }
    }

    if let Some(genre_id) = &state.selected_genre {
        println!("Showing genre {genre_id}");
    }
    if let Some(error) = &state.last_error {
        println!("Last error: {error}");
    }

    println!("Movies ({}):", state.movies.len());
    for movie in &state.movies {
        print_movie(movie);
    }
}

fn print_movie(movie: &Movie) {
    let year = movie
        .year
        .map(|year| year.to_string())
        .unwrap_or_else(|| "----".to_string());
    let rating = movie
        .rating
        .map(|rating| format!("{rating:.1}"))
        .unwrap_or_else(|| " - ".to_string());
    println!("  {year}  {rating}  {}", movie.title);

    let preview: String = movie.plot.chars().take(PLOT_PREVIEW_CHARS).collect();
    if preview.len() < movie.plot.len() {
        println!("      {preview}...");
    } else {
        println!("      {preview}");
    }
    if let Some(link) = &movie.wikipedia_url {
        println!("      {link}");
    }
}
