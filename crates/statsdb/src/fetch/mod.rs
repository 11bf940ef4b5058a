// Remote data sources: the stats API and the WAR text datasets.
//
// Both fetchers share one reqwest client and one error type. Every request is
// a single GET; a failed request or a non-2xx status aborts the run.

pub mod stats;
pub mod war;

pub use stats::StatsFetcher;
pub use war::{WarDataset, WarFetcher};

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },
}

impl FetchError {
    pub(crate) fn malformed(url: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status of a transport failure, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Build the client shared by every fetch of a run.
pub fn build_http_client() -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(concat!("statsdb/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::Client)
}

/// GET `url` with `query` and return the body text of a 2xx response.
pub(crate) async fn get_text(
    http: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<String, FetchError> {
    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let mut request = http.get(url);
    if !query.is_empty() {
        request = request.query(query);
    }

    let response = request
        .send()
        .await
        .map_err(transport)?
        .error_for_status()
        .map_err(transport)?;

    debug!(status = %response.status(), url, "response received");

    let body = response.text().await.map_err(transport)?;
    debug!(bytes = body.len(), url, "response body read");
    Ok(body)
}
