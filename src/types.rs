use crate::config::DEFAULT_MAX_CHARS;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("search_term must not be empty")]
    EmptyTerm,
    #[error("max_chars must be greater than 0")]
    ZeroMaxChars,
}

/// One validated documentation search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub term: String,
    pub max_chars: usize,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>, max_chars: usize) -> Result<Self, RequestError> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(RequestError::EmptyTerm);
        }
        if max_chars == 0 {
            return Err(RequestError::ZeroMaxChars);
        }
        Ok(Self { term, max_chars })
    }
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

/// Arguments of the `search_mql5_docs` tool
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchDocsArgs {
    /// The term or concept to search for in the MQL5 documentation
    pub search_term: String,
    /// Maximum number of characters to return from the page content
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl TryFrom<SearchDocsArgs> for SearchRequest {
    type Error = RequestError;

    fn try_from(args: SearchDocsArgs) -> Result<Self, Self::Error> {
        SearchRequest::new(args.search_term, args.max_chars)
    }
}

/// Result of one pipeline run. `Display` renders the exact text handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found { url: String, content: String },
    /// Body of an earlier `Found` result
    Cached(String),
    SearchApiError,
    NoMatch { term: String },
    PageUnavailable { url: String },
    Failed(String),
}

impl SearchOutcome {
    pub fn is_cached(&self) -> bool {
        matches!(self, SearchOutcome::Cached(_))
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::Found { url, content } => write!(f, "SOURCE: {}\n\n{}", url, content),
            SearchOutcome::Cached(body) => write!(f, "[CACHED]\n{}", body),
            SearchOutcome::SearchApiError => f.write_str("Search error in MQL5 API"),
            SearchOutcome::NoMatch { term } => write!(f, "No documentation found for '{}'", term),
            SearchOutcome::PageUnavailable { url } => {
                write!(f, "Error obtaining the page: {}", url)
            }
            SearchOutcome::Failed(message) => write!(f, "Error: {}", message),
        }
    }
}

// Search API types
#[derive(Debug, Deserialize)]
pub struct SearchApiResponse {
    #[serde(default)]
    pub results: Option<Vec<serde_json::Value>>,
}

/// One raw search hit. Fields are read leniently so a malformed sibling
/// never invalidates the rest of the response.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchApiEntry {
    pub module: Option<String>,
    pub info: Option<serde_json::Value>,
}

impl From<serde_json::Value> for SearchApiEntry {
    fn from(value: serde_json::Value) -> Self {
        Self {
            module: value
                .get("module")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            info: value.get("info").cloned(),
        }
    }
}

/// A usable search hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchApiResult {
    pub module: String,
    pub url: String,
    pub title: Option<String>,
}

// HTTP surface types
#[derive(Debug, Serialize, Deserialize)]
pub struct DocsSearchRequest {
    pub search_term: String,
    #[serde(default)]
    pub max_chars: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocsSearchResponse {
    pub search_term: String,
    pub max_chars: usize,
    pub result: String,
    pub cached: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(SearchRequest::new("OrderSend", 4000).is_ok());
        assert_eq!(SearchRequest::new("   ", 4000), Err(RequestError::EmptyTerm));
        assert_eq!(SearchRequest::new("iMA", 0), Err(RequestError::ZeroMaxChars));
    }

    #[test]
    fn test_args_default_max_chars() {
        let args: SearchDocsArgs =
            serde_json::from_value(serde_json::json!({"search_term": "OnTick"})).unwrap();
        assert_eq!(args.max_chars, 4000);

        let request = SearchRequest::try_from(args).unwrap();
        assert_eq!(request.term, "OnTick");
        assert_eq!(request.max_chars, 4000);
    }

    #[test]
    fn test_outcome_strings() {
        let found = SearchOutcome::Found {
            url: "https://x/y".to_string(),
            content: "Title\n\nBody".to_string(),
        };
        assert_eq!(found.to_string(), "SOURCE: https://x/y\n\nTitle\n\nBody");
        assert_eq!(
            SearchOutcome::Cached(found.to_string()).to_string(),
            "[CACHED]\nSOURCE: https://x/y\n\nTitle\n\nBody"
        );
        assert_eq!(
            SearchOutcome::SearchApiError.to_string(),
            "Search error in MQL5 API"
        );
        assert_eq!(
            SearchOutcome::NoMatch { term: "X".to_string() }.to_string(),
            "No documentation found for 'X'"
        );
        assert_eq!(
            SearchOutcome::PageUnavailable { url: "https://x".to_string() }.to_string(),
            "Error obtaining the page: https://x"
        );
        assert_eq!(
            SearchOutcome::Failed("boom".to_string()).to_string(),
            "Error: boom"
        );
    }
}
