use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use recall_index::SourceType;
use recall_retrieval::{HealthCheck, RecallConfig, SemanticMemory, TextItem};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Embed text, store it in a vector index and search it by meaning")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a text and store it in the index
    Index {
        /// Kind of source: knowledge-node, conversation-log, document-chunk or context-file
        #[arg(long)]
        source_type: SourceType,
        /// Identifier of the source entity
        #[arg(long)]
        source_id: String,
        /// Node type stored in record metadata
        #[arg(long)]
        node_type: Option<String>,
        /// File the text came from
        #[arg(long)]
        source_ref: Option<String>,
        /// Text to embed
        text: String,
    },
    /// Find the stored texts most similar to a query
    Search {
        /// Number of results; the configured default when omitted
        #[arg(long)]
        top_k: Option<usize>,
        /// Query text
        query: String,
    },
    /// Show index statistics
    Stats,
    /// Check that the index loads and, optionally, that the provider answers
    Health {
        /// Embed a probe text through the configured provider
        #[arg(long)]
        probe_provider: bool,
    },
    /// Remove the record stored for a source
    Remove {
        #[arg(long)]
        source_type: SourceType,
        #[arg(long)]
        source_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RecallConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RecallConfig::default(),
    };
    debug!("Using storage root {}", config.storage.root.display());

    let memory = SemanticMemory::from_config(&config)
        .await
        .context("failed to initialize semantic memory")?;

    match cli.command {
        Commands::Index {
            source_type,
            source_id,
            node_type,
            source_ref,
            text,
        } => {
            let mut item = TextItem::new(source_type, source_id, text);
            item.node_type = node_type;
            item.source_ref = source_ref;
            let record = memory.remember(item).await.context("indexing failed")?;
            print_json(&serde_json::json!({
                "id": record.id,
                "sourceType": record.source_type,
                "sourceId": record.source_id,
                "dimension": record.dimension(),
            }))?;
        }
        Commands::Search { top_k, query } => {
            let hits = memory
                .recall(&query, top_k)
                .await
                .context("search failed")?;
            let results: Vec<_> = hits
                .iter()
                .map(|hit| {
                    serde_json::json!({
                        "score": hit.score,
                        "id": hit.record.id,
                        "sourceType": hit.record.source_type,
                        "sourceId": hit.record.source_id,
                        "meta": hit.record.meta,
                    })
                })
                .collect();
            print_json(&results)?;
        }
        Commands::Stats => {
            let stats = memory.stats().await.context("failed to read index")?;
            print_json(&stats)?;
        }
        Commands::Health { probe_provider } => {
            let report = HealthCheck::for_memory(&memory).run(probe_provider).await;
            print_json(&report)?;
            if !report.healthy {
                std::process::exit(1);
            }
        }
        Commands::Remove {
            source_type,
            source_id,
        } => {
            let removed = memory
                .forget(source_type, &source_id)
                .await
                .context("remove failed")?;
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
