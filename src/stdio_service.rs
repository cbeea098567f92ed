use rmcp::{model::*, ServiceExt};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{error, info};

use crate::mcp::{input_schema, parse_arguments, TOOL_DESCRIPTION, TOOL_NAME};
use crate::{logging, AppState, Config};

#[derive(Clone, Debug)]
pub struct McpService {
    pub state: Arc<AppState>,
}

impl McpService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let config = Config::from_env();
        config.validate()?;
        logging::init(&config)?;

        info!("Starting MCP Service");
        info!("Search API: {}", config.search_api_url);

        Ok(Self::new(Arc::new(AppState::new(config))))
    }

    fn tool() -> Tool {
        Tool::new(
            Cow::Borrowed(TOOL_NAME),
            Cow::Borrowed(TOOL_DESCRIPTION),
            Arc::new(input_schema()),
        )
    }

    /// Run the tool for already-extracted arguments
    pub async fn search_docs(
        &self,
        arguments: Option<&JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let args = arguments.ok_or_else(|| {
            ErrorData::new(
                ErrorCode::INVALID_PARAMS,
                "Missing required arguments object",
                None,
            )
        })?;
        let search = parse_arguments(serde_json::Value::Object(args.clone()))
            .map_err(|e| ErrorData::new(ErrorCode::INVALID_PARAMS, e, None))?;

        let outcome = self.state.pipeline.search(&search).await;
        Ok(CallToolResult::success(vec![Content::text(
            outcome.to_string(),
        )]))
    }
}

impl rmcp::ServerHandler for McpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "mql5-docs-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Search the official MQL5 documentation and return the cleaned text of the best matching page.".to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _page: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: vec![Self::tool()],
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("MCP tool call: {} with args: {:?}", request.name, request.arguments);

        match request.name.as_ref() {
            TOOL_NAME => self.search_docs(request.arguments.as_ref()).await,
            _ => {
                error!("Unknown tool requested: {}", request.name);
                Err(ErrorData::new(
                    ErrorCode::METHOD_NOT_FOUND,
                    format!("Unknown tool: {}", request.name),
                    None,
                ))
            }
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let service = McpService::from_env()?;
    // Use the stdio transport from rmcp
    let server = service.serve(rmcp::transport::stdio()).await?;
    info!("MCP stdio server running");
    let quit_reason = server.waiting().await?;
    info!("MCP stdio server stopped: {:?}", quit_reason);
    Ok(())
}
