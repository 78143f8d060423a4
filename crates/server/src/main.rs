use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use server_api::{list_genres, list_movies, list_movies_by_genre, ApiContext};
use shared::{
    domain::GenreId,
    error::{ApiError, ErrorCode},
    protocol::{Genre, Movie},
};
use storage::Storage;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "catalog server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("catalog server shutting down");
}

fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/movies", get(http_list_movies))
        .route("/genres", get(http_list_genres))
        .route("/movies/genre/:genre_id", get(http_list_movies_by_genre))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    server_api::health(&state.api)
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, Json(e)))?;
    Ok("ok")
}

async fn http_list_movies(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Movie>> {
    let movies = list_movies(&state.api).await.map_err(internal)?;
    Ok(Json(movies))
}

async fn http_list_genres(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Genre>> {
    let genres = list_genres(&state.api).await.map_err(internal)?;
    Ok(Json(genres))
}

async fn http_list_movies_by_genre(
    State(state): State<Arc<AppState>>,
    Path(genre_id): Path<String>,
) -> ApiResult<Vec<Movie>> {
    let movies = list_movies_by_genre(&state.api, &GenreId::new(genre_id))
        .await
        .map_err(internal)?;
    Ok(Json(movies))
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(
            ErrorCode::NotFound,
            format!("no route for {}", uri.path()),
        )),
    )
}

fn internal(err: ApiError) -> (StatusCode, Json<ApiError>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
