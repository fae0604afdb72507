//! `relcache new` command - Create an entity file

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_index, open_project};
use crate::cli::GlobalOpts;
use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::core::Config;
use crate::entities::{with_declared_relations, Record};

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Entity type prefix (e.g. ORD, ART, TAG)
    pub prefix: String,

    /// Title
    #[arg(long, short = 't')]
    pub title: String,

    /// Author (default: from config, git, or $USER)
    #[arg(long)]
    pub author: Option<String>,

    /// Declare an empty relation (repeatable)
    #[arg(long = "relation", short = 'r')]
    pub relations: Vec<String>,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let prefix = EntityPrefix::new(&args.prefix).into_diagnostic()?;
    let author = args.author.unwrap_or_else(|| config.author());

    let mut record =
        with_declared_relations(Record::new(prefix, args.title, author)).into_diagnostic()?;
    for name in &args.relations {
        record.relations_mut().set(name, Vec::new());
    }

    let path = project.entity_path(record.id());
    let doc = record.to_document().into_diagnostic()?;
    doc.save(&path)?;

    let index = open_index(&project)?;
    index.index_file(&path)?;
    tracing::debug!(id = %record.id(), path = %path.display(), "entity created");

    if global.quiet {
        println!("{}", record.id());
    } else {
        println!(
            "{} Created {} {}",
            style("✓").green(),
            record.id(),
            style(format!("\"{}\"", record.title())).dim()
        );
    }
    Ok(())
}
