mod args;
mod ingest;
mod query;
mod status;

pub use args::{Args, Command};

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::embedder::{create_embedder, Embedder};
use crate::index::{FlatIndex, VectorIndex};
use crate::ingest::IngestionEngine;

pub async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Rebuild => ingest::run_rebuild(&config).await,
        Command::Update => ingest::run_update(&config).await,
        Command::Add { file } => ingest::run_add(&config, &file).await,
        Command::Remove { file } => ingest::run_remove(&config, &file).await,
        Command::Status { json } => status::run_status(&config, json).await,
        Command::Query { text, k, json } => {
            let k = k.unwrap_or(config.retrieval_k);
            query::run_query(&config, &text, k, json).await
        }
    }
}

pub(crate) fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    Ok(Arc::from(create_embedder(&config.embedder)?))
}

pub(crate) fn build_engine(config: &Config, embedder: Arc<dyn Embedder>) -> IngestionEngine {
    let index: Arc<dyn VectorIndex> = Arc::new(FlatIndex::new(
        config.index_file(),
        config.embedder.dimensions,
    ));
    IngestionEngine::new(config.clone(), embedder, index)
}
