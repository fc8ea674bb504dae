//! Scale Advisor - analysis tool server
//!
//! CLI entry point for the stdio JSON-RPC server.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;

use advisor_llm::ClaudeClient;
use advisor_tools::{register_builtins, ToolRegistry};

#[derive(Parser)]
#[command(
    name = "scale-advisor",
    version,
    about = "Tool server for repository, cloud, and security analysis"
)]
struct Cli {
    /// Print the tool catalog as JSON and exit
    #[arg(long)]
    list_tools: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays a clean protocol stream
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scale_advisor=info,advisor_tools=info,advisor_llm=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let client = ClaudeClient::from_env()
        .context("failed to configure the Claude client (is ANTHROPIC_API_KEY set?)")?;

    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry, Arc::new(client));

    let server = server::RpcServer::new(registry);

    if cli.list_tools {
        println!("{}", serde_json::to_string_pretty(&server.registry().list())?);
        return Ok(());
    }

    info!("Starting Scale Advisor v{}", env!("CARGO_PKG_VERSION"));
    server.run().await
}
