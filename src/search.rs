use crate::config::Config;
use crate::types::*;
use tracing::{error, info};

/// Parameters sent to the documentation search endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SearchApiParams {
    pub language: String,
    pub count: u32,
    pub target_site: String,
    pub module: String,
}

impl SearchApiParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.language.clone(),
            count: config.result_count,
            target_site: config.target_site.clone(),
            module: config.docs_module.clone(),
        }
    }

    /// Query string pairs for one search
    pub fn query(&self, keyword: &str) -> Vec<(&'static str, String)> {
        vec![
            ("keyword", keyword.to_string()),
            ("lng", self.language.clone()),
            ("count", self.count.to_string()),
            ("dt_from", "0".to_string()),
            ("target_site", self.target_site.clone()),
            ("module", self.module.clone()),
        ]
    }
}

impl Default for SearchApiParams {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Picks the best page out of a search API response, preferring documentation
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultSelector;

impl ResultSelector {
    pub fn new() -> Self {
        Self
    }

    /// Parse the raw response. Malformed JSON is logged and reported as `None`.
    pub fn parse(&self, raw_json: &str) -> Option<Vec<SearchApiEntry>> {
        match serde_json::from_str::<SearchApiResponse>(raw_json) {
            Ok(response) => Some(
                response
                    .results
                    .unwrap_or_default()
                    .into_iter()
                    .map(SearchApiEntry::from)
                    .collect(),
            ),
            Err(e) => {
                error!(error = %e, "Failed to decode JSON response from search API");
                None
            }
        }
    }

    /// Docs-module entries first, then the rest, each group in API order
    pub fn rank(&self, entries: Vec<SearchApiEntry>) -> Vec<SearchApiEntry> {
        let (mut docs, others): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| entry.module.as_deref().unwrap_or("").contains("docs"));
        docs.extend(others);
        docs
    }

    /// URL of the top ranked entry, if it carries a string URL
    pub fn select_best(&self, raw_json: &str, search_term: &str) -> Option<String> {
        let entries = self.parse(raw_json)?;
        let best = self.rank(entries).into_iter().next()?;
        let result = usable_result(best)?;

        info!(
            search_term,
            url = %result.url,
            title = result.title.as_deref().unwrap_or(""),
            "Best match found via API"
        );
        Some(result.url)
    }
}

fn usable_result(entry: SearchApiEntry) -> Option<SearchApiResult> {
    let info = entry.info?;
    let url = match info.get("url")? {
        serde_json::Value::String(url) if !url.is_empty() => url.clone(),
        _ => return None,
    };
    let title = info
        .get("title")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    Some(SearchApiResult {
        module: entry.module.unwrap_or_default(),
        url,
        title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(selector: &ResultSelector, raw: &str) -> Vec<String> {
        let entries = selector.parse(raw).unwrap();
        selector
            .rank(entries)
            .into_iter()
            .filter_map(usable_result)
            .map(|r| r.url)
            .collect()
    }

    #[test]
    fn test_select_best_success() {
        let raw = r#"{
            "results": [
                {
                    "module": "mql5.com.en.docs",
                    "info": {"url": "https://www.mql5.com/en/docs/target", "title": "Target Doc"}
                }
            ]
        }"#;
        let selector = ResultSelector::new();
        assert_eq!(
            selector.select_best(raw, "term").as_deref(),
            Some("https://www.mql5.com/en/docs/target")
        );
    }

    #[test]
    fn test_no_results() {
        let selector = ResultSelector::new();
        assert_eq!(selector.select_best(r#"{"results": []}"#, "term"), None);
        assert_eq!(selector.select_best(r#"{}"#, "term"), None);
        assert_eq!(selector.select_best(r#"{"results": null}"#, "term"), None);
    }

    #[test]
    fn test_invalid_json() {
        let selector = ResultSelector::new();
        assert_eq!(selector.select_best("invalid json", "term"), None);
        assert_eq!(selector.select_best(r#"{"results": "nope"}"#, "term"), None);
    }

    #[test]
    fn test_prioritizes_docs() {
        let raw = r#"{
            "results": [
                {"module": "mql5.com.en.forum", "info": {"url": "https://forum", "title": "Forum"}},
                {"module": "mql5.com.en.docs", "info": {"url": "https://docs", "title": "Docs"}}
            ]
        }"#;
        let selector = ResultSelector::new();
        assert_eq!(selector.select_best(raw, "term").as_deref(), Some("https://docs"));
    }

    #[test]
    fn test_rank_keeps_relative_order() {
        let raw = r#"{
            "results": [
                {"module": "mql5.com.en.forum", "info": {"url": "https://f1"}},
                {"module": "mql5.com.en.docs", "info": {"url": "https://d1"}},
                {"module": "mql5.com.en.code", "info": {"url": "https://f2"}},
                {"module": "mql5.com.en.docs", "info": {"url": "https://d2"}},
                {"info": {"url": "https://f3"}}
            ]
        }"#;
        let selector = ResultSelector::new();
        assert_eq!(
            urls(&selector, raw),
            vec!["https://d1", "https://d2", "https://f1", "https://f2", "https://f3"]
        );
    }

    #[test]
    fn test_falls_back_to_other_modules() {
        let raw = r#"{"results": [{"module": "mql5.com.en.articles", "info": {"url": "https://article"}}]}"#;
        let selector = ResultSelector::new();
        assert_eq!(selector.select_best(raw, "term").as_deref(), Some("https://article"));
    }

    #[test]
    fn test_missing_url() {
        let raw = r#"{"results": [{"module": "mql5.com.en.docs", "info": {"title": "No URL"}}]}"#;
        let selector = ResultSelector::new();
        assert_eq!(selector.select_best(raw, "term"), None);

        let raw = r#"{"results": [{"module": "mql5.com.en.docs"}]}"#;
        assert_eq!(selector.select_best(raw, "term"), None);
    }

    #[test]
    fn test_non_string_url() {
        let raw = r#"{"results": [{"module": "mql5.com.en.docs", "info": {"url": 42}}]}"#;
        let selector = ResultSelector::new();
        assert_eq!(selector.select_best(raw, "term"), None);

        let raw = r#"{"results": [{"module": "mql5.com.en.docs", "info": {"url": ["a"]}}]}"#;
        assert_eq!(selector.select_best(raw, "term"), None);
    }

    #[test]
    fn test_only_first_candidate_is_considered() {
        // The top docs entry lacks a URL; later entries are not consulted
        let raw = r#"{
            "results": [
                {"module": "mql5.com.en.forum", "info": {"url": "https://forum"}},
                {"module": "mql5.com.en.docs", "info": {"title": "broken"}}
            ]
        }"#;
        let selector = ResultSelector::new();
        assert_eq!(selector.select_best(raw, "term"), None);
    }

    #[test]
    fn test_malformed_sibling_does_not_hide_top_hit() {
        let raw = r#"{
            "results": [
                {"module": "mql5.com.en.docs", "info": {"url": "https://a"}},
                {"module": "mql5.com.en.forum", "info": "unexpected"},
                {"module": 7, "info": []},
                "not an object"
            ]
        }"#;
        let selector = ResultSelector::new();
        assert_eq!(selector.select_best(raw, "term"), Some("https://a".to_string()));
    }

    #[test]
    fn test_malformed_top_entry_is_absent() {
        let raw = r#"{"results": [{"module": "mql5.com.en.docs", "info": "unexpected"}]}"#;
        let selector = ResultSelector::new();
        assert_eq!(selector.select_best(raw, "term"), None);
    }

    #[test]
    fn test_query_params() {
        let params = SearchApiParams::default();
        let query = params.query("OrderSend");
        assert_eq!(
            query,
            vec![
                ("keyword", "OrderSend".to_string()),
                ("lng", "en".to_string()),
                ("count", "10".to_string()),
                ("dt_from", "0".to_string()),
                ("target_site", "mql5.com".to_string()),
                ("module", "mql5.com.en.docs".to_string()),
            ]
        );
    }
}
