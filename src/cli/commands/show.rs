//! `relcache show` command - Show an entity with its relation members

use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{effective_format, open_index, open_project, render_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Entity ID (or unique leading part of it)
    pub id: String,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let index = open_index(&project)?;

    let id = index.resolve_id(&args.id)?;
    let mut record = index.load_record(&id)?;
    let doc = record.to_document().into_diagnostic()?;

    match effective_format(global, &config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&doc).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for (name, members) in &doc.relations {
                for member in members {
                    println!("{}\t{}", name, member);
                }
            }
        }
        OutputFormat::Md => {
            let rows: Vec<[String; 2]> = doc
                .relations
                .iter()
                .flat_map(|(name, members)| {
                    members.iter().map(move |m| [name.clone(), m.to_string()])
                })
                .collect();
            println!("# {} {}\n", doc.id, doc.title);
            println!("{}", render_table(["RELATION", "MEMBER"], &rows, OutputFormat::Md));
        }
        OutputFormat::Auto | OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&doc).into_diagnostic()?);
        }
    }

    Ok(())
}
