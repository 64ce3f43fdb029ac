use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use papier_core::{config::load_dotenv, Config};
use papier_service::{ask, ingest_document, AppState, IngestReceipt};

#[derive(Parser)]
#[command(name = "papier")]
#[command(about = "Document Q&A: ingest files, then ask questions grounded in them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, chunk, and embed documents into the vector index
    Ingest {
        /// Files to ingest (.pdf, .docx, .txt, .md)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Ask a question against the indexed documents
    Ask {
        /// The question to answer
        question: String,

        /// How many chunks to retrieve (defaults to PAPIER_TOP_K)
        #[arg(long)]
        top_k: Option<usize>,

        /// Ingest these files first, then ask
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,
    },
    /// Print the active configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Ingest { files } => {
            config.log_summary();
            let state =
                AppState::from_config(config).context("failed to initialize pipelines")?;
            ingest_files(&state, &files).await?;
        }
        Commands::Ask {
            question,
            top_k,
            files,
        } => {
            config.log_summary();
            let state =
                AppState::from_config(config).context("failed to initialize pipelines")?;
            if !files.is_empty() {
                ingest_files(&state, &files).await?;
            }

            let response = ask(&state, &question, top_k).await?;
            println!("{}", response.answer);
            println!();
            println!(
                "Sources ({} chunks, {:.2}ms):",
                response.chunks_used.len(),
                response.processing_time_ms
            );
            for chunk in &response.chunks_used {
                println!(
                    "  [{:.4}] doc {} chunk {}: {}",
                    chunk.similarity,
                    chunk.document_id,
                    chunk.chunk_index,
                    snippet(&chunk.text)
                );
            }
        }
        Commands::Config => {
            let mut summary = config.redacted_summary();
            summary["available_profiles"] = serde_json::json!(Config::available_profiles());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

async fn ingest_files(state: &AppState, files: &[PathBuf]) -> Result<()> {
    let mut failures = 0usize;
    for path in files {
        match ingest_file(state, path).await {
            Ok(receipt) => println!(
                "indexed {} as {} ({} chunks, {} tokens)",
                receipt.filename, receipt.document_id, receipt.chunk_count, receipt.total_tokens
            ),
            Err(e) => {
                eprintln!("failed to ingest {}: {:#}", path.display(), e);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        anyhow::bail!("{failures} of {} files failed to ingest", files.len());
    }
    Ok(())
}

async fn ingest_file(state: &AppState, path: &Path) -> Result<IngestReceipt> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid file name: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(ingest_document(state, filename, &bytes).await?)
}

/// First line of the chunk, shortened for terminal output.
fn snippet(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    let mut out: String = line.chars().take(80).collect();
    if out.len() < line.len() {
        out.push('…');
    }
    out
}
