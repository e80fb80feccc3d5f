use std::sync::Arc;

use anyhow::{Context, Result};
use image_gen_mcp::provider::Settings;
use image_gen_mcp::providers::laozhang::build_laozhang_image_model;
use image_gen_mcp::server::McpServer;
use image_gen_mcp::storage::ImageStore;
use image_gen_mcp::tools::ImageTools;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "image_gen=info";

// Run with:
//   LAOZHANG_API_KEY=sk-... cargo run -p image-gen-server
// Optional (also read from .env):
//   OBSIDIAN_VAULT_PATH=~/Obsidian/VAULTS/Trinity
//   AI_GRAPHICS_FOLDER="110 Assets/AI graphics"
//   RUST_LOG=image_gen=debug
//
// The server speaks JSON-RPC on stdin/stdout; logs go to stderr.

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(env_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    if !dotenv_loaded {
        tracing::debug!(target: "image_gen::server", "no .env file found, using process environment");
    }

    let settings = Settings::from_env().context("loading settings")?;
    let model = build_laozhang_image_model(&settings).context("building image model")?;
    let store = ImageStore::new(settings.output_dir());
    tracing::info!(
        target: "image_gen::server",
        output_dir = %store.output_dir().display(),
        "starting image-gen-mcp"
    );

    let server = McpServer::new(ImageTools::new(Arc::new(model), store));
    server.serve_stdio().await.context("serving stdio")?;
    Ok(())
}

/// `RUST_LOG` when set and valid, else the default.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    use super::env_filter;

    #[test]
    fn rust_log_overrides_default_level() {
        assert_eq!(env_filter(Some("image_gen=debug")).to_string(), "image_gen=debug");
    }

    #[test]
    fn default_applies_when_rust_log_missing_or_blank() {
        assert_eq!(env_filter(None).to_string(), "image_gen=info");
        assert_eq!(env_filter(Some("  ")).to_string(), "image_gen=info");
    }
}
