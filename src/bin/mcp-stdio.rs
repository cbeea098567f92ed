use mql5_docs_mcp::stdio_service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stdio_service::run().await
}
