use anyhow::Result;
use console::{style, Emoji};

use crate::config::Config;
use crate::retriever::Retriever;

use super::build_embedder;

static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
static FILE: Emoji<'_, '_> = Emoji("📄 ", "");

pub async fn run_query(config: &Config, text: &str, k: usize, json: bool) -> Result<()> {
    let embedder = build_embedder(config)?;
    embedder.health_check().await?;

    let retriever = Retriever::open(config, embedder).await?;
    let retrieval = retriever.retrieve(text, k).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&retrieval)?);
        return Ok(());
    }

    if retrieval.passages.is_empty() {
        println!("No passages found for: {}", style(text).italic());
        return Ok(());
    }

    println!(
        "\n{}Top {} passages for: {}\n",
        SEARCH,
        style(retrieval.passages.len()).cyan(),
        style(text).yellow().bold()
    );

    for (i, passage) in retrieval.passages.iter().enumerate() {
        println!(
            "{} {}. {} {}",
            FILE,
            style(i + 1).dim(),
            style(&passage.source_path).green(),
            style(format!("(score {:.3})", passage.score)).dim()
        );

        let preview: String = passage.text.chars().take(200).collect();
        let suffix = if passage.text.chars().count() > 200 {
            "..."
        } else {
            ""
        };
        println!("   {}{}\n", style(preview).dim(), suffix);
    }

    println!("Sources: {}", retrieval.sources.join(", "));

    Ok(())
}
