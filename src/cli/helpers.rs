//! Shared helper functions for CLI commands

use std::rc::Rc;

use clap::ValueEnum;
use miette::Result;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityId;
use crate::core::index::EntityIndex;
use crate::core::project::Project;
use crate::core::Config;

/// Find the project from `--project` or the current directory
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Open the project index, synced with the entity files
pub fn open_index(project: &Project) -> Result<Rc<EntityIndex>> {
    Ok(Rc::new(EntityIndex::open(project)?))
}

/// Resolve a user-supplied ID: indexed (full or partial) first, then any full ID
pub fn resolve_entity_id(index: &EntityIndex, input: &str) -> Result<EntityId> {
    match index.resolve_id(input) {
        Ok(id) => Ok(id),
        Err(resolve_err) => EntityId::parse(&input.trim().to_ascii_uppercase())
            .map_err(|_| resolve_err),
    }
}

/// Resolve `--format auto` against the configured default
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|s| OutputFormat::from_str(s, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Format an EntityId for display, truncating if too long
pub fn format_short_id(id: &str) -> String {
    if id.len() > 16 {
        format!("{}...", &id[..13])
    } else {
        id.to_string()
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render rows as a table (`Md` uses markdown, everything else a sharp grid)
pub fn render_table<const N: usize>(
    header: [&str; N],
    rows: &[[String; N]],
    format: OutputFormat,
) -> String {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row.iter().map(String::as_str));
    }
    let mut table = builder.build();
    match format {
        OutputFormat::Md => table.with(Style::markdown()),
        _ => table.with(Style::sharp()),
    };
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(format: OutputFormat) -> GlobalOpts {
        GlobalOpts {
            format,
            quiet: false,
            verbose: false,
            project: None,
        }
    }

    #[test]
    fn test_format_short_id() {
        assert_eq!(
            format_short_id("ORD-01HQ3K4N5M6P7R8S9T0VWXYZAB"),
            "ORD-01HQ3K4N5..."
        );
        assert_eq!(format_short_id("ORD-1"), "ORD-1");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a much longer title", 10), "a much ...");
    }

    #[test]
    fn test_effective_format_uses_config_for_auto() {
        let config = Config {
            author: None,
            default_format: Some("json".to_string()),
        };
        assert_eq!(effective_format(&opts(OutputFormat::Auto), &config), OutputFormat::Json);
        assert_eq!(effective_format(&opts(OutputFormat::Tsv), &config), OutputFormat::Tsv);
    }

    #[test]
    fn test_render_markdown_table() {
        let rows = [["items".to_string(), "3".to_string()]];
        let out = render_table(["RELATION", "COUNT"], &rows, OutputFormat::Md);
        assert!(out.contains("| RELATION | COUNT |"));
        assert!(out.contains("| items    | 3     |"));
    }
}
