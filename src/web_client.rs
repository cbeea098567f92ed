use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
];

const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Referer", "https://html.duckduckgo.com/"),
    ("Accept", "text/html,application/xhtml+xml"),
    ("Accept-Language", "en-US,en;q=0.9"),
];

/// Faults below the HTTP status layer. A non-success status is not an error.
#[derive(Debug, Error)]
pub enum WebClientError {
    #[error("network error in {method} {url}: {source}")]
    Network {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Request body for POST calls
#[derive(Debug, Clone, Default)]
pub enum PostBody {
    #[default]
    Empty,
    Form(HashMap<String, String>),
    Json(serde_json::Value),
}

/// HTTP access used by the search pipeline.
///
/// `Ok(None)` means the server answered with an unaccepted status; `Err` means the
/// request never completed.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Option<String>, WebClientError>;

    async fn post(
        &self,
        url: &str,
        body: PostBody,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<Option<String>, WebClientError>;
}

/// HTTP client with User-Agent rotation.
///
/// Every call builds its own connection pool, nothing is reused between calls.
#[derive(Debug, Clone)]
pub struct WebClient {
    timeout: Duration,
}

impl WebClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Get a random User-Agent string
    fn get_random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        let index = rng.gen_range(0..USER_AGENTS.len());
        USER_AGENTS[index]
    }

    /// Default headers plus a rotated User-Agent, then caller overrides
    pub fn headers(&self, custom: Option<&HashMap<String, String>>) -> HashMap<String, String> {
        let mut headers: HashMap<String, String> = DEFAULT_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        headers.insert(
            "User-Agent".to_string(),
            self.get_random_user_agent().to_string(),
        );
        if let Some(custom) = custom {
            headers.extend(custom.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        headers
    }

    fn session(&self) -> Result<Client, WebClientError> {
        Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(WebClientError::Build)
    }
}

impl Default for WebClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl HttpFetch for WebClient {
    async fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Option<String>, WebClientError> {
        let network = |source: reqwest::Error| WebClientError::Network {
            method: "GET",
            url: url.to_string(),
            source,
        };

        let mut request = self.session()?.get(url).query(params);
        for (name, value) in self.headers(None) {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            error!(url, error = %e, "Network error in GET {}", url);
            network(e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!(url, status_code = status.as_u16(), "HTTP GET error: {}", status.as_u16());
            return Ok(None);
        }

        let body = response.text().await.map_err(|e| {
            error!(url, error = %e, "Network error in GET {}", url);
            network(e)
        })?;
        debug!(url, bytes = body.len(), "GET succeeded");
        Ok(Some(body))
    }

    async fn post(
        &self,
        url: &str,
        body: PostBody,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<Option<String>, WebClientError> {
        let network = |source: reqwest::Error| WebClientError::Network {
            method: "POST",
            url: url.to_string(),
            source,
        };

        let mut request = self.session()?.post(url);
        for (name, value) in self.headers(headers) {
            request = request.header(name, value);
        }
        request = match body {
            PostBody::Empty => request,
            PostBody::Form(form) => request.form(&form),
            PostBody::Json(json) => request.json(&json),
        };

        let response = request.send().await.map_err(|e| {
            error!(url, error = %e, "Network error in POST {}", url);
            network(e)
        })?;

        // Some endpoints answer 202 Accepted with a usable body
        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::ACCEPTED {
            error!(url, status_code = status.as_u16(), "HTTP POST error: {}", status.as_u16());
            return Ok(None);
        }

        let text = response.text().await.map_err(|e| {
            error!(url, error = %e, "Network error in POST {}", url);
            network(e)
        })?;
        Ok(Some(text))
    }
}
