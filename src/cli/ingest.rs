use std::path::Path;

use anyhow::Result;
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;

use super::{build_embedder, build_engine};

static BUILDING: Emoji<'_, '_> = Emoji("📚 ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "");
static ERROR: Emoji<'_, '_> = Emoji("❌ ", "");
static REMOVED: Emoji<'_, '_> = Emoji("🗑️  ", "");

pub async fn run_rebuild(config: &Config) -> Result<()> {
    let embedder = build_embedder(config)?;
    embedder.health_check().await?;
    let engine = build_engine(config, embedder);

    let pb = spinner(format!(
        "{}Rebuilding index from {}...",
        BUILDING,
        config.knowledge_dir.display()
    ));

    let report = engine.full_build().await?;
    pb.finish_and_clear();

    println!("\n{}Full build complete!\n", SUCCESS);
    println!(
        "  Files processed: {}",
        style(report.files_processed).green()
    );
    println!("  Chunks indexed:  {}", style(report.chunks_indexed).cyan());
    if report.files_failed > 0 {
        println!("  Files failed:    {}", style(report.files_failed).red());
    }
    print_errors(&report.errors);

    Ok(())
}

pub async fn run_update(config: &Config) -> Result<()> {
    let embedder = build_embedder(config)?;
    embedder.health_check().await?;
    let engine = build_engine(config, embedder);

    let pb = spinner(format!(
        "{}Checking {} for changes...",
        BUILDING,
        config.knowledge_dir.display()
    ));

    let stats = engine.incremental_update().await?;
    pb.finish_and_clear();

    println!("\n{}Incremental update complete!\n", SUCCESS);
    println!("  Added:     {}", style(stats.added).green());
    println!("  Updated:   {}", style(stats.updated).cyan());
    println!("  Removed:   {}", style(stats.removed).yellow());
    println!("  Unchanged: {}", style(stats.unchanged).dim());
    print_errors(&stats.errors);

    if stats.updated > 0 || stats.removed > 0 {
        println!(
            "\n  {}",
            style("Stale vectors from updated/removed files remain until `ragmill rebuild`.")
                .dim()
        );
    }

    Ok(())
}

pub async fn run_add(config: &Config, file: &Path) -> Result<()> {
    let embedder = build_embedder(config)?;
    embedder.health_check().await?;
    let engine = build_engine(config, embedder);

    let chunks = engine.add_knowledge_file(file).await?;
    println!(
        "{}Added {} ({} chunks)",
        SUCCESS,
        style(file.display()).green(),
        style(chunks).cyan()
    );

    Ok(())
}

pub async fn run_remove(config: &Config, file: &Path) -> Result<()> {
    let embedder = build_embedder(config)?;
    let engine = build_engine(config, embedder);

    engine.remove_knowledge_file(file).await?;
    println!(
        "{}Stopped tracking {}",
        REMOVED,
        style(file.display()).yellow()
    );
    println!(
        "  {}",
        style("Its vectors remain searchable until `ragmill rebuild`.").dim()
    );

    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn print_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    println!("\n{}Skipped files ({}):", ERROR, errors.len());
    for error in errors.iter().take(10) {
        println!("  - {}", style(error).red());
    }
    if errors.len() > 10 {
        println!("  ... and {} more", errors.len() - 10);
    }
}
