//! `relcache count` command - Report relation counts
//!
//! Counts come from the index metadata; members are only loaded with
//! `--materialize`.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{effective_format, open_index, open_project, render_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct CountArgs {
    /// Entity ID (or unique leading part of it)
    pub id: String,

    /// Only report this relation
    pub relation: Option<String>,

    /// Load relation members before counting
    #[arg(long)]
    pub materialize: bool,
}

#[derive(Debug, Serialize)]
struct CountRow {
    relation: String,
    count: usize,
    materialized: bool,
}

pub fn run(args: CountArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let index = open_index(&project)?;

    let id = index.resolve_id(&args.id)?;
    let mut record = index.load_record(&id)?;

    let names: Vec<String> = match &args.relation {
        Some(name) => vec![name.clone()],
        None => record.relations().names().map(String::from).collect(),
    };

    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        if args.materialize {
            record.relations_mut().materialize(&name).into_diagnostic()?;
        }
        let count = record.relation_count(&name).into_diagnostic()?;
        let materialized = record
            .relations()
            .get(&name)
            .is_some_and(|r| r.is_materialized());
        rows.push(CountRow {
            relation: name,
            count,
            materialized,
        });
    }

    match effective_format(global, &config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&rows).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for row in &rows {
                println!("{}\t{}", row.relation, row.count);
            }
        }
        format @ (OutputFormat::Auto | OutputFormat::Md) => {
            if rows.is_empty() {
                if !global.quiet {
                    println!("{} {} has no relations", style("!").yellow(), id);
                }
                return Ok(());
            }
            let table_rows: Vec<[String; 2]> = rows
                .iter()
                .map(|r| [r.relation.clone(), r.count.to_string()])
                .collect();
            if !global.quiet && format == OutputFormat::Auto {
                println!("{} {}", style(&id).cyan(), style(record.title()).dim());
            }
            println!("{}", render_table(["RELATION", "COUNT"], &table_rows, format));
        }
    }

    Ok(())
}
