//! `relcache search` command - Search entity titles
//!
//! The query is matched literally: `%` and `_` are not wildcards.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{
    effective_format, format_short_id, open_index, open_project, render_table, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Text to look for in titles (case-insensitive)
    pub query: String,

    /// Only entities of this type prefix
    #[arg(long = "type", short = 't')]
    pub entity_type: Option<String>,

    /// Maximum number of results
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,
}

pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let index = open_index(&project)?;

    let prefix = args
        .entity_type
        .as_deref()
        .map(EntityPrefix::new)
        .transpose()
        .into_diagnostic()?;
    let results = index.search(&args.query, prefix.as_ref(), args.limit)?;

    match effective_format(global, &config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&results).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for r in &results {
                println!("{}\t{}\t{}", r.id, r.prefix, r.title);
            }
        }
        format @ (OutputFormat::Auto | OutputFormat::Md) => {
            if results.is_empty() {
                if !global.quiet {
                    println!("{} No matches for \"{}\"", style("!").yellow(), args.query);
                }
                return Ok(());
            }
            let rows: Vec<[String; 3]> = results
                .iter()
                .map(|r| {
                    [
                        format_short_id(&r.id),
                        truncate_str(&r.title, 48),
                        r.author.clone(),
                    ]
                })
                .collect();
            println!("{}", render_table(["ID", "TITLE", "AUTHOR"], &rows, format));
            if !global.quiet {
                println!("{} match(es)", results.len());
            }
        }
    }

    Ok(())
}
