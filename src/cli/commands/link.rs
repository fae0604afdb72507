//! `relcache link` command - Change an entity's relations
//!
//! Every change goes through the entity's relation set, so the cached
//! count for the touched relation is dropped before the members change.

use std::rc::Rc;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_index, open_project, resolve_entity_id};
use crate::cli::GlobalOpts;
use crate::core::entity::Entity;
use crate::core::index::EntityIndex;
use crate::core::project::Project;
use crate::entities::Record;

#[derive(clap::Subcommand, Debug)]
pub enum LinkCommands {
    /// Add a member to a relation (creates the relation if needed)
    Add(LinkArgs),

    /// Remove a member from a relation
    #[command(alias = "remove")]
    Rm(LinkArgs),

    /// Replace all members of a relation
    Set(SetArgs),
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Owner entity ID (or unique leading part of it)
    pub source: String,

    /// Relation name (e.g. items, tags)
    pub relation: String,

    /// Member entity ID
    pub target: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Owner entity ID (or unique leading part of it)
    pub source: String,

    /// Relation name
    pub relation: String,

    /// New members (none clears the relation)
    pub targets: Vec<String>,
}

pub fn run(cmd: LinkCommands, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let index = open_index(&project)?;

    match cmd {
        LinkCommands::Add(args) => run_add(&project, &index, args, global),
        LinkCommands::Rm(args) => run_remove(&project, &index, args, global),
        LinkCommands::Set(args) => run_set(&project, &index, args, global),
    }
}

fn run_add(
    project: &Project,
    index: &Rc<EntityIndex>,
    args: LinkArgs,
    global: &GlobalOpts,
) -> Result<()> {
    let source = index.resolve_id(&args.source)?;
    let target = resolve_entity_id(index, &args.target)?;
    let mut record = index.load_record(&source)?;

    let before = count_or_zero(&mut record, &args.relation)?;
    let added = record
        .relations_mut()
        .add(&args.relation, target.clone())
        .into_diagnostic()?;
    let after = record.relation_count(&args.relation).into_diagnostic()?;

    if added {
        save(project, index, &mut record)?;
    }

    if !global.quiet {
        if added {
            println!(
                "{} Added {} to {}.{} ({} → {})",
                style("✓").green(),
                target,
                source,
                style(&args.relation).cyan(),
                before,
                after
            );
        } else {
            println!(
                "{} {} is already in {}.{}",
                style("!").yellow(),
                target,
                source,
                args.relation
            );
        }
    }
    Ok(())
}

fn run_remove(
    project: &Project,
    index: &Rc<EntityIndex>,
    args: LinkArgs,
    global: &GlobalOpts,
) -> Result<()> {
    let source = index.resolve_id(&args.source)?;
    let target = resolve_entity_id(index, &args.target)?;
    let mut record = index.load_record(&source)?;

    if !record.relations().contains(&args.relation) {
        return Err(miette::miette!(
            "{} has no relation named '{}'",
            source,
            args.relation
        ));
    }

    let before = record.relation_count(&args.relation).into_diagnostic()?;
    let removed = record
        .relations_mut()
        .remove(&args.relation, &target)
        .into_diagnostic()?;
    let after = record.relation_count(&args.relation).into_diagnostic()?;

    if removed {
        save(project, index, &mut record)?;
    }

    if !global.quiet {
        if removed {
            println!(
                "{} Removed {} from {}.{} ({} → {})",
                style("✓").green(),
                target,
                source,
                style(&args.relation).cyan(),
                before,
                after
            );
        } else {
            println!(
                "{} {} is not in {}.{}",
                style("!").yellow(),
                target,
                source,
                args.relation
            );
        }
    }
    Ok(())
}

fn run_set(
    project: &Project,
    index: &Rc<EntityIndex>,
    args: SetArgs,
    global: &GlobalOpts,
) -> Result<()> {
    let source = index.resolve_id(&args.source)?;
    let targets = args
        .targets
        .iter()
        .map(|t| resolve_entity_id(index, t))
        .collect::<Result<Vec<_>>>()?;
    let mut record = index.load_record(&source)?;

    record.relations_mut().set(&args.relation, targets);
    let after = record.relation_count(&args.relation).into_diagnostic()?;
    save(project, index, &mut record)?;

    if !global.quiet {
        println!(
            "{} Set {}.{} ({} member(s))",
            style("✓").green(),
            source,
            style(&args.relation).cyan(),
            after
        );
    }
    Ok(())
}

fn count_or_zero(record: &mut Record, relation: &str) -> Result<usize> {
    if record.relations().contains(relation) {
        record.relation_count(relation).into_diagnostic()
    } else {
        Ok(0)
    }
}

/// Write the record back to its file and refresh the index
fn save(project: &Project, index: &EntityIndex, record: &mut Record) -> Result<()> {
    let path = match index.get_entity(&record.id().to_string())? {
        Some(entry) => project.root().join(entry.file_path),
        None => project.entity_path(record.id()),
    };
    let doc = record.to_document().into_diagnostic()?;
    doc.save(&path)?;
    index.index_file(&path)?;
    tracing::debug!(id = %record.id(), "entity saved");
    Ok(())
}
