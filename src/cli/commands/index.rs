//! `relcache index` command - Manage the local index
//!
//! The index is a local SQLite database holding entity metadata, relation
//! counts and relation members. It is gitignored and rebuilt from the
//! entity files whenever needed.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::index::EntityIndex;

#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    /// Rebuild the index from scratch
    Rebuild,

    /// Sync the index with file changes (incremental)
    Sync,

    /// Show index statistics
    Status,
}

pub fn run(cmd: IndexCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        IndexCommands::Rebuild => run_rebuild(global),
        IndexCommands::Sync => run_sync(global),
        IndexCommands::Status => run_status(global),
    }
}

fn run_rebuild(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut index = EntityIndex::open_without_sync(&project)?;

    let stats = index.rebuild()?;

    println!(
        "{} Index rebuilt in {}ms",
        style("✓").green(),
        stats.duration_ms
    );
    println!("  Files scanned:    {}", stats.files_scanned);
    println!("  Entities indexed: {}", stats.entities_added);
    if stats.files_failed > 0 {
        println!("  Failed:           {}", style(stats.files_failed).red());
    }
    Ok(())
}

fn run_sync(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut index = EntityIndex::open_without_sync(&project)?;

    let stats = index.sync()?;

    if stats.entities_added == 0 && stats.entities_updated == 0 && stats.entities_removed == 0 {
        println!("{} Index is up to date", style("✓").green());
        return Ok(());
    }

    println!(
        "{} Index synced in {}ms",
        style("✓").green(),
        stats.duration_ms
    );
    if stats.entities_added > 0 {
        println!("  Added:   {}", style(stats.entities_added).green());
    }
    if stats.entities_updated > 0 {
        println!("  Updated: {}", style(stats.entities_updated).yellow());
    }
    if stats.entities_removed > 0 {
        println!("  Removed: {}", style(stats.entities_removed).red());
    }
    Ok(())
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let index = EntityIndex::open(&project)?;
    let stats = index.statistics()?;

    println!("{}", style("Index Status").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!(
        "  Location:        {}",
        EntityIndex::index_path(project.root()).display()
    );
    println!("  Total entities:  {}", style(stats.total_entities).cyan());
    println!("  Relations:       {}", style(stats.total_relations).cyan());
    println!("  Members:         {}", style(stats.total_members).cyan());
    println!(
        "  Database size:   {} KB",
        style(stats.db_size_bytes / 1024).cyan()
    );

    if !stats.by_prefix.is_empty() {
        println!();
        println!("  {}", style("By Type:").bold());
        let mut prefixes: Vec<_> = stats.by_prefix.iter().collect();
        prefixes.sort_by_key(|(k, _)| *k);
        for (prefix, count) in prefixes {
            println!("    {:<8} {}", prefix, count);
        }
    }
    Ok(())
}
