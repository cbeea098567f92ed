//! Search-and-extract pipeline behind the `search_mql5_docs` tool.
//!
//! Per request: cache lookup, rate-limit gate, search API query, URL selection,
//! page fetch, content extraction, cache store. Failures surface as the fixed
//! result strings of [`SearchOutcome`]; nothing escapes as an error.

use crate::cache::{CacheKey, SearchCache};
use crate::config::Config;
use crate::rate_limit::RateLimiter;
use crate::scrape::ContentExtractor;
use crate::search::{ResultSelector, SearchApiParams};
use crate::timing::OperationTimer;
use crate::types::*;
use crate::web_client::{HttpFetch, WebClient, WebClientError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Http(#[from] WebClientError),

    #[error("content extraction failed: {0}")]
    Extraction(#[from] tokio::task::JoinError),
}

pub struct SearchPipeline {
    client: Arc<dyn HttpFetch>,
    limiter: RateLimiter,
    cache: SearchCache,
    selector: ResultSelector,
    extractor: ContentExtractor,
    search_api_url: String,
    search_params: SearchApiParams,
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("limiter", &self.limiter)
            .field("search_api_url", &self.search_api_url)
            .field("search_params", &self.search_params)
            .finish_non_exhaustive()
    }
}

impl SearchPipeline {
    pub fn new(
        client: Arc<dyn HttpFetch>,
        limiter: RateLimiter,
        cache: SearchCache,
        search_api_url: impl Into<String>,
        search_params: SearchApiParams,
    ) -> Self {
        Self {
            client,
            limiter,
            cache,
            selector: ResultSelector::new(),
            extractor: ContentExtractor::new(),
            search_api_url: search_api_url.into(),
            search_params,
        }
    }

    /// Pipeline wired to a real [`WebClient`]
    pub fn from_config(config: &Config) -> Self {
        Self::with_client(config, Arc::new(WebClient::new(config.request_timeout())))
    }

    pub fn with_client(config: &Config, client: Arc<dyn HttpFetch>) -> Self {
        Self::new(
            client,
            RateLimiter::new(config.calls_per_minute),
            SearchCache::new(config.cache_capacity),
            config.search_api_url.clone(),
            SearchApiParams::from_config(config),
        )
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run one search and render its outcome
    pub async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("search", %request_id);
        self.search_inner(request).instrument(span).await
    }

    async fn search_inner(&self, request: &SearchRequest) -> SearchOutcome {
        let term = request.term.as_str();
        info!(search_term = term, max_chars = request.max_chars, "Search request");

        let key = CacheKey::new(term, request.max_chars);
        if let Some(cached) = self.cache.get(&key).await {
            info!(search_term = term, cache_hit = true, "Cache hit");
            return SearchOutcome::Cached(cached);
        }

        self.limiter.acquire().await;

        let mut timer = OperationTimer::start("full_search").with_field("search_term", term);
        match self.run(request, &mut timer).await {
            Ok(outcome) => {
                if let SearchOutcome::Found { .. } = &outcome {
                    let rendered = outcome.to_string();
                    timer.record("result_length", rendered.chars().count());
                    self.cache.put(key, rendered).await;
                }
                timer.complete();
                outcome
            }
            Err(e) => {
                timer.fail(&e);
                error!(search_term = term, error = %e, details = ?e, "Unexpected error");
                SearchOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run(
        &self,
        request: &SearchRequest,
        timer: &mut OperationTimer,
    ) -> Result<SearchOutcome, PipelineError> {
        let term = request.term.as_str();

        // 1. Query the search API
        let mut stage = OperationTimer::start("search_api").with_field("search_term", term);
        let params = self.search_params.query(term);
        let search_response = self.client.get(&self.search_api_url, &params).await?;
        stage.record("responded", search_response.is_some());
        stage.complete();
        drop(stage);
        let Some(search_response) = search_response.filter(|body| !body.is_empty()) else {
            return Ok(SearchOutcome::SearchApiError);
        };

        // 2. Pick the best link
        let Some(target_url) = self.selector.select_best(&search_response, term) else {
            warn!(search_term = term, "No results found");
            return Ok(SearchOutcome::NoMatch {
                term: term.to_string(),
            });
        };
        timer.record("target_url", &target_url);

        // 3. Fetch the page
        let mut stage = OperationTimer::start("fetch_page").with_field("url", &target_url);
        let page = self.client.get(&target_url, &[]).await?;
        stage.record("responded", page.is_some());
        stage.complete();
        drop(stage);
        let Some(html) = page.filter(|body| !body.is_empty()) else {
            return Ok(SearchOutcome::PageUnavailable { url: target_url });
        };

        // 4. Extract content off the async workers
        let mut stage = OperationTimer::start("extract_content").with_field("url", &target_url);
        stage.record("html_bytes", html.len());
        let extractor = self.extractor;
        let max_chars = request.max_chars;
        let content =
            tokio::task::spawn_blocking(move || extractor.extract(&html, max_chars)).await?;
        stage.record("content_chars", content.chars().count());
        stage.complete();
        drop(stage);

        Ok(SearchOutcome::Found {
            url: target_url,
            content,
        })
    }
}
