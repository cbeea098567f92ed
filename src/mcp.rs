use crate::types::*;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const TOOL_NAME: &str = "search_mql5_docs";
pub const TOOL_DESCRIPTION: &str = "Search the official MQL5 documentation. Finds the most relevant documentation page on mql5.com, extracts its main text and returns it prefixed with the source URL.";

#[derive(Debug, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpToolsResponse {
    pub tools: Vec<McpTool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallRequest {
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallResponse {
    pub content: Vec<McpContent>,
    pub is_error: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// JSON schema of the tool arguments
pub fn input_schema() -> serde_json::Map<String, serde_json::Value> {
    let schema = schemars::schema_for!(SearchDocsArgs);
    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

/// Validate raw tool arguments into a pipeline request
pub fn parse_arguments(arguments: serde_json::Value) -> Result<SearchRequest, String> {
    let args: SearchDocsArgs =
        serde_json::from_value(arguments).map_err(|e| format!("Invalid arguments: {}", e))?;
    SearchRequest::try_from(args).map_err(|e| e.to_string())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/search", post(search_docs_handler))
        .route("/mcp/tools", get(list_tools))
        .route("/mcp/call", post(call_tool))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mql5-docs-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn search_docs_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DocsSearchRequest>,
) -> Result<Json<DocsSearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let max_chars = request.max_chars.unwrap_or(crate::config::DEFAULT_MAX_CHARS);
    let search = SearchRequest::new(request.search_term, max_chars).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let outcome = state.pipeline.search(&search).await;
    Ok(Json(DocsSearchResponse {
        search_term: search.term,
        max_chars: search.max_chars,
        cached: outcome.is_cached(),
        result: outcome.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn list_tools() -> Json<McpToolsResponse> {
    let tools = vec![McpTool {
        name: TOOL_NAME.to_string(),
        description: TOOL_DESCRIPTION.to_string(),
        input_schema: serde_json::Value::Object(input_schema()),
    }];

    Json(McpToolsResponse { tools })
}

pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Json(request): Json<McpCallRequest>,
) -> Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!("MCP tool call: {} with args: {:?}", request.name, request.arguments);

    if request.name != TOOL_NAME {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Unknown tool: {}", request.name),
            }),
        ));
    }

    let search = parse_arguments(request.arguments).map_err(|error| {
        warn!(%error, "Rejected tool arguments");
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
    })?;

    let outcome = state.pipeline.search(&search).await;
    Ok(Json(McpCallResponse {
        content: vec![McpContent {
            content_type: "text".to_string(),
            text: outcome.to_string(),
        }],
        is_error: false,
    }))
}
