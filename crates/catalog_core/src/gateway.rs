use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::GenreId,
    protocol::{Genre, Movie},
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::ClientSettings,
    error::{Endpoint, FetchError},
};

/// Read access to the remote catalog.
///
/// Implementations only perform the request and decode the payload; they never
/// touch collection state.
#[async_trait]
pub trait FetchGateway: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Movie>, FetchError>;
    async fn fetch_genres(&self) -> Result<Vec<Genre>, FetchError>;
    async fn fetch_by_genre(&self, genre_id: &GenreId) -> Result<Vec<Movie>, FetchError>;
}

pub struct HttpFetchGateway {
    http: Client,
    base_url: Url,
}

impl HttpFetchGateway {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_timeout(server_url, None)
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::with_timeout(
            &settings.server_url,
            Some(Duration::from_secs(settings.request_timeout_secs)),
        )
    }

    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(server_url.trim())
            .with_context(|| format!("invalid catalog server url '{server_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("catalog server url '{server_url}' cannot carry request paths");
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build catalog http client")?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &Endpoint) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                FetchError::fetch_failed(endpoint.clone(), "server url cannot carry request paths")
            })?;
            segments.pop_if_empty();
            match endpoint {
                Endpoint::Movies => {
                    segments.push("movies");
                }
                Endpoint::Genres => {
                    segments.push("genres");
                }
                Endpoint::MoviesByGenre(genre_id) => {
                    segments.extend(["movies", "genre", genre_id.as_str()]);
                }
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, FetchError> {
        let result = self.get_json_inner(&endpoint).await;
        if let Err(err) = &result {
            warn!(%endpoint, status = ?err.status(), error = %err, "catalog: fetch failed");
        }
        result
    }

    async fn get_json_inner<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<T, FetchError> {
        let url = self.endpoint_url(endpoint)?;
        debug!(%endpoint, %url, "catalog: sending request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::FetchFailed {
                endpoint: endpoint.clone(),
                status: err.status().map(|status| status.as_u16()),
                cause: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::FetchFailed {
                endpoint: endpoint.clone(),
                status: Some(status.as_u16()),
                cause: format!("server responded with {status}"),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::fetch_failed(endpoint.clone(), err.to_string()))?;

        let decoded = serde_json::from_slice(&body).map_err(|source| FetchError::DecodeFailed {
            endpoint: endpoint.clone(),
            source,
        })?;
        debug!(%endpoint, bytes = body.len(), "catalog: response decoded");
        Ok(decoded)
    }
}

#[async_trait]
impl FetchGateway for HttpFetchGateway {
    async fn fetch_all(&self) -> Result<Vec<Movie>, FetchError> {
        self.get_json(Endpoint::Movies).await
    }

    async fn fetch_genres(&self) -> Result<Vec<Genre>, FetchError> {
        self.get_json(Endpoint::Genres).await
    }

    async fn fetch_by_genre(&self, genre_id: &GenreId) -> Result<Vec<Movie>, FetchError> {
        self.get_json(Endpoint::MoviesByGenre(genre_id.clone())).await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
