//! Offline indexing CLI: segment the textbook corpus, embed every chunk and
//! replace the vector store collection.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use textbook_rag::config::Config;
use textbook_rag::providers::cohere::CohereClient;
use textbook_rag::providers::qdrant::QdrantStore;
use textbook_rag::rag::Indexer;

#[derive(Parser)]
#[command(
    name = "index-textbook",
    about = "Segment, embed and upload the textbook corpus",
    version
)]
struct Cli {
    /// Directory containing the markdown corpus
    #[arg(default_value = "docs")]
    docs_dir: PathBuf,

    /// Target collection name
    #[arg(long)]
    collection: Option<String>,

    /// Chunk size budget in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Word overlap carried between split chunks
    #[arg(long)]
    overlap_words: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let mut rag = config.rag.clone();
    if let Some(collection) = cli.collection {
        rag.collection = collection;
    }
    if let Some(chunk_size) = cli.chunk_size {
        rag.chunk_size = chunk_size;
    }
    if let Some(overlap_words) = cli.overlap_words {
        rag.overlap_words = overlap_words;
    }

    let api_key = config
        .cohere_api_key
        .context("COHERE_API_KEY is not set")?;
    let qdrant_url = config.qdrant_url.context("QDRANT_URL is not set")?;

    let cohere = Arc::new(CohereClient::new(api_key, &rag)?);
    let qdrant = Arc::new(QdrantStore::new(
        qdrant_url,
        config.qdrant_api_key,
        rag.collection.clone(),
    )?);

    let indexer = Indexer::new(cohere, qdrant, rag);
    let report = indexer.run(&cli.docs_dir).await?;

    log::info!(
        "indexed {} documents into {} chunks; collection holds {} points",
        report.documents,
        report.chunks,
        report.points
    );
    Ok(())
}
