//! VeriRAG command line: server, document registration, ingestion and queries
//!
//! Run with: cargo run -p verirag -- serve

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use verirag::{server::state::AppState, server::VeriragServer, VeriragConfig};

#[derive(Parser, Debug)]
#[command(
    name = "verirag",
    version,
    about = "Answer questions from PDF documents with a self-reported faithfulness score"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, env = "VERIRAG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Register a PDF document
    Add {
        /// Path to the PDF
        pdf: PathBuf,
        /// Document title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
        /// Index the document right away
        #[arg(long, default_value_t = false)]
        ingest: bool,
    },
    /// Index a registered document
    Ingest {
        /// Document ID
        id: Uuid,
    },
    /// Ask a question
    Query {
        /// Question text
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verirag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = VeriragConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            tracing::info!("Configuration loaded");
            tracing::info!("  - Embedding: {:?} {} ({} dims)", config.embedding.provider, config.embedding.model, config.embedding.dimensions);
            tracing::info!("  - Generation: {:?} {}", config.generation.provider, config.generation.model);
            tracing::info!("  - Chunking: {} chars, {} overlap", config.chunking.chunk_size, config.chunking.chunk_overlap);
            tracing::info!("  - Collection: {} (top_k = {})", config.vector_store.collection, config.vector_store.top_k);

            let server = VeriragServer::new(config)?;

            println!("\nServer starting...");
            println!("  API: http://{}", server.address());
            println!("  Health: http://{}/health", server.address());
            println!("\nEndpoints:");
            println!("  POST /api/documents            - Upload a PDF");
            println!("  POST /api/documents/:id/ingest - Index a PDF");
            println!("  POST /api/query                - Ask a question");
            println!("\nPress Ctrl+C to stop\n");

            server.start().await?;
        }
        Command::Add { pdf, title, ingest } => {
            let state = AppState::new(config)?;
            let document = state.add_document_from_path(&pdf, title).await?;
            println!("{}", serde_json::to_string_pretty(&document)?);

            if ingest {
                let report = state.pipeline().ingest(&document.id).await;
                println!("{}", serde_json::to_string_pretty(&report)?);
                if !report.succeeded() {
                    anyhow::bail!("Ingestion failed: {}", report.message);
                }
            }
        }
        Command::Ingest { id } => {
            let state = AppState::new(config)?;
            let report = state.pipeline().ingest(&id).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.succeeded() {
                anyhow::bail!("Ingestion failed: {}", report.message);
            }
        }
        Command::Query { text } => {
            if text.trim().is_empty() {
                anyhow::bail!("No query provided");
            }
            let state = AppState::new(config)?;
            let answer = state.verifier().answer(&text).await;
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
    }

    Ok(())
}
