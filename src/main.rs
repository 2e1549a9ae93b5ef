//! Biochemical Unit Converter (BUC)
//!
//! An MCP server for clinical concentration unit conversions.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use buc::build_info;
use buc::config::{self, ExtractorConfig};
use buc::extract::{AnthropicExtractor, RequestExtractor};
use buc::mcp::BucService;
use buc::reference::ReferenceData;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("buc=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    // Load reference data; nothing works without it
    let data_path = config::reference_data_path();
    eprintln!("Reference data: {}", data_path.display());
    let reference = match ReferenceData::open(&data_path) {
        Ok(reference) => reference,
        Err(e) => {
            eprintln!("Failed to load reference data: {}", e);
            eprintln!("Set BUC_DATA_PATH to a valid dataset and restart.");
            std::process::exit(1);
        }
    };
    eprintln!("Analytes loaded: {}", reference.snapshot().len());

    // Natural-language extractor is optional
    let extractor_config = ExtractorConfig::from_env();
    let extractor: Option<Arc<dyn RequestExtractor>> = if extractor_config.is_enabled() {
        match AnthropicExtractor::new(&extractor_config) {
            Ok(extractor) => {
                eprintln!("Natural-language extractor: {}", extractor_config.model);
                Some(Arc::new(extractor) as Arc<dyn RequestExtractor>)
            }
            Err(e) => {
                tracing::warn!("Natural-language extractor disabled: {}", e);
                None
            }
        }
    } else {
        eprintln!("Natural-language extractor: disabled (ANTHROPIC_API_KEY not set)");
        None
    };

    // Create the BUC service
    let service = BucService::new(
        reference,
        extractor,
        extractor_config.timeout,
        config::export_dir(),
    );

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;
    tracing::info!("MCP server ready");

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
