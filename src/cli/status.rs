use anyhow::Result;
use console::{style, Emoji};
use serde_json::json;

use crate::config::Config;
use crate::ingest::EngineState;

use super::{build_embedder, build_engine};

static STATUS: Emoji<'_, '_> = Emoji("📊 ", "");

pub async fn run_status(config: &Config, json: bool) -> Result<()> {
    let embedder = build_embedder(config)?;
    let engine = build_engine(config, embedder);
    let status = engine.status().await?;

    let state = match status.state {
        EngineState::Empty => "empty",
        EngineState::Ready => "ready",
    };

    if json {
        let output = json!({
            "state": state,
            "knowledge_dir": config.knowledge_dir,
            "index_dir": config.index_dir,
            "tracked_files": status.tracked_files,
            "total_records": status.index.total_records,
            "dimension": status.index.dimension,
            "index_size_bytes": status.index.index_size_bytes,
            "last_updated": status.index.last_updated,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n{}Index status\n", STATUS);
    println!("  State:         {}", style(state).cyan());
    println!(
        "  Knowledge dir: {}",
        style(config.knowledge_dir.display()).dim()
    );
    println!(
        "  Index dir:     {}",
        style(config.index_dir.display()).dim()
    );
    println!("  Tracked files: {}", style(status.tracked_files).green());
    println!(
        "  Records:       {}",
        style(status.index.total_records).green()
    );
    println!("  Dimension:     {}", style(status.index.dimension).dim());
    println!(
        "  Index size:    {} bytes",
        style(status.index.index_size_bytes).dim()
    );
    if let Some(updated) = status.index.last_updated {
        println!("  Last updated:  {}", style(updated.to_rfc3339()).dim());
    }

    Ok(())
}
