//! `plm part` command - Part management

use clap::Subcommand;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::fs;

use crate::cli::commands::search::{parse_key_value, CliStatus, FilterArgs};
use crate::cli::helpers::{actor, load_catalog, open_store, print_parts, styled_status};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::duplicates::{find_potential_duplicates_with_threshold, DuplicateMatch};
use crate::core::lifecycle::{plan_new_part, plan_note, plan_revision, plan_status_change, plan_variant, ChangeSet};
use crate::core::store::{PartStore, ProjectStore};
use crate::core::Config;
use crate::entities::part::{Part, PartDraft, PartStatus};

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// Create a new part (screened for duplicates first)
    New(NewArgs),

    /// List parts with filtering
    List(ListArgs),

    /// Show a part's details
    Show(ShowArgs),

    /// Edit a part in your editor
    Edit(EditArgs),

    /// Create the next revision (the current one becomes obsolete)
    Revise(ReviseArgs),

    /// Create a new variant in the part's family
    Variant(VariantArgs),

    /// Change a part's status
    Status(StatusArgs),

    /// Add a note to a part's change log
    Note(NoteArgs),

    /// Delete a part
    Delete(DeleteArgs),

    /// Show a part's change log
    Log(LogArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Part name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Part description
    #[arg(long, short = 'd')]
    pub description: String,

    /// Four-digit category code (see `plm category list`)
    #[arg(long, short = 'c')]
    pub category: String,

    /// Manufacturer id or code
    #[arg(long)]
    pub mfr: Option<String>,

    /// Manufacturer part number
    #[arg(long)]
    pub mpn: Option<String>,

    /// Existing Fellten part number this part carries over
    #[arg(long)]
    pub fellten: Option<String>,

    /// Metadata field as key=value (repeatable)
    #[arg(long = "meta", short = 'm', value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Create even if potential duplicates are found
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part number
    pub part_number: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Part number
    pub part_number: String,
}

#[derive(clap::Args, Debug)]
pub struct ReviseArgs {
    /// Part number of the current revision
    pub part_number: String,

    /// Reason for the change
    #[arg(long, short = 'm')]
    pub comment: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct VariantArgs {
    /// Part number to derive the variant from
    pub part_number: String,

    /// Name of the new variant
    #[arg(long, short = 'n')]
    pub name: String,

    /// Reason for the change
    #[arg(long, short = 'm')]
    pub comment: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Part number
    pub part_number: String,

    /// New status
    pub status: CliStatus,

    /// Reason for the change
    #[arg(long, short = 'm')]
    pub comment: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NoteArgs {
    /// Part number
    pub part_number: String,

    /// Note text
    #[arg(long, short = 'm')]
    pub comment: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Part number
    pub part_number: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Part number
    pub part_number: String,
}

/// Run a part subcommand
pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::New(args) => run_new(args, global),
        PartCommands::List(args) => run_list(args, global),
        PartCommands::Show(args) => run_show(args, global),
        PartCommands::Edit(args) => run_edit(args, global),
        PartCommands::Revise(args) => run_revise(args, global),
        PartCommands::Variant(args) => run_variant(args, global),
        PartCommands::Status(args) => run_status(args, global),
        PartCommands::Note(args) => run_note(args, global),
        PartCommands::Delete(args) => run_delete(args, global),
        PartCommands::Log(args) => run_log(args, global),
    }
}

fn store_error(e: impl std::fmt::Display) -> miette::Report {
    miette::miette!("{}", e)
}

fn require_part(store: &ProjectStore, part_number: &str) -> Result<Part> {
    store
        .get_part(part_number)
        .map_err(store_error)?
        .ok_or_else(|| miette::miette!("No part found with part number '{}'", part_number))
}

/// Interactive confirmation; false when there is no terminal to ask on
fn confirm(prompt: &str) -> Result<bool> {
    if !Term::stderr().is_term() {
        return Ok(false);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

fn print_duplicates(matches: &[DuplicateMatch<'_>]) {
    eprintln!(
        "{} {} potential duplicate(s) found:",
        style("!").yellow(),
        matches.len()
    );
    for m in matches {
        eprintln!(
            "  {} {} {}",
            style(&m.part.part_number).cyan(),
            m.part.name,
            style(format!("({:.0}%)", m.similarity * 100.0)).dim()
        );
        for reason in &m.reasons {
            eprintln!("      {}", reason);
        }
    }
}

/// Apply a change set, then print its outcome
fn apply_and_report(store: &mut ProjectStore, changes: ChangeSet, verb: &str, global: &GlobalOpts) -> Result<()> {
    store.apply(changes.clone()).map_err(store_error)?;
    report(&changes, verb, global);
    Ok(())
}

fn report(changes: &ChangeSet, verb: &str, global: &GlobalOpts) {
    let Some(part) = changes.created().or(changes.updated()) else {
        return;
    };
    if global.format == OutputFormat::Id {
        println!("{}", part.part_number);
        return;
    }
    if global.quiet {
        return;
    }
    println!("{} {} {}", style("✓").green(), verb, style(&part.part_number).cyan());
    for obsolete in changes.updates.iter().filter(|p| p.is_obsolete() && p.part_number != part.part_number) {
        println!("  {} is now {}", obsolete.part_number, styled_status(obsolete.status));
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let catalog = load_catalog(Some(store.project()))?;

    let manufacturer_id = match &args.mfr {
        Some(id_or_code) => {
            let directory = store.manufacturers().map_err(store_error)?;
            let manufacturer = directory
                .resolve(id_or_code)
                .ok_or_else(|| miette::miette!("Unknown manufacturer '{}' (see `plm mfr list`)", id_or_code))?;
            Some(manufacturer.id.clone())
        }
        None => None,
    };

    let draft = PartDraft {
        name: args.name,
        description: args.description,
        category: args.category,
        manufacturer_id,
        manufacturer_part_number: args.mpn,
        fellten_part_number: args.fellten,
        metadata: args.metadata.into_iter().collect::<BTreeMap<_, _>>(),
        variant_name: None,
        notes: args.notes,
    };

    draft.validate().map_err(|e| miette::miette!("{}", e))?;
    if !catalog.is_known_code(&draft.category) {
        return Err(miette::miette!(
            help = "see `plm category list` for valid codes",
            "Unknown category code '{}'",
            draft.category
        ));
    }

    let missing = catalog.missing_required_fields(&draft.category, &draft.metadata);
    if !missing.is_empty() {
        let keys: Vec<&str> = missing.iter().map(|f| f.key.as_str()).collect();
        return Err(miette::miette!(
            help = "pass each one with --meta <key>=<value>",
            "Missing required metadata for category {}: {}",
            draft.category,
            keys.join(", ")
        ));
    }

    let existing = store.all_parts().map_err(store_error)?;
    let duplicates = find_potential_duplicates_with_threshold(&draft, &existing, config.duplicate_threshold());
    if !duplicates.is_empty() {
        print_duplicates(&duplicates);
        if !args.yes && !confirm("Create the part anyway?")? {
            return Err(miette::miette!(
                help = "re-run with --yes to create it anyway",
                "Part not created: potential duplicates found"
            ));
        }
    }

    let changes = plan_new_part(&draft, &existing)?;
    apply_and_report(&mut store, changes, "Created part", global)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let catalog = load_catalog(Some(store.project()))?;
    let parts = store.all_parts().map_err(store_error)?;

    let selected = args.filters.select(&parts, None);

    if args.count {
        println!("{}", selected.len());
        return Ok(());
    }

    let format = global.format.resolve(config.default_format.as_deref(), OutputFormat::Tsv);
    if selected.is_empty() && matches!(format, OutputFormat::Tsv) {
        println!("No parts found.");
        return Ok(());
    }
    print_parts(&selected, format, &catalog)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let part = require_part(&store, &args.part_number)?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&part).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", part.part_number),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&part).into_diagnostic()?),
        _ => {
            let catalog = load_catalog(Some(store.project()))?;
            print_part_details(&part, &catalog, &store)?;
        }
    }
    Ok(())
}

fn print_part_details(
    part: &Part,
    catalog: &crate::core::catalog::Catalog,
    store: &ProjectStore,
) -> Result<()> {
    println!("{}", style(&part.part_number).cyan().bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Name").bold(), part.name);
    println!("{}: {}", style("Description").bold(), part.description);
    let category = catalog
        .name_for_code(&part.category)
        .map(|name| format!("{} ({})", part.category, name))
        .unwrap_or_else(|| part.category.clone());
    println!("{}: {}", style("Category").bold(), category);
    println!("{}: {}", style("Status").bold(), styled_status(part.status));
    println!("{}: {}", style("Revision").bold(), part.revision);
    if let Some(variant) = &part.variant_name {
        println!("{}: {}", style("Variant").bold(), variant);
    }

    if let Some(id) = &part.manufacturer_id {
        let directory = store.manufacturers().map_err(store_error)?;
        let name = directory
            .get(id)
            .map(|m| format!("{} ({})", m.name, m.code))
            .unwrap_or_else(|| id.clone());
        println!("{}: {}", style("Manufacturer").bold(), name);
    }
    if let Some(mpn) = &part.manufacturer_part_number {
        println!("{}: {}", style("Manufacturer P/N").bold(), mpn);
    }
    if let Some(fellten) = &part.fellten_part_number {
        println!("{}: {}", style("Fellten P/N").bold(), fellten);
    }

    if !part.metadata.is_empty() {
        println!();
        println!("{}", style("Metadata").bold());
        let fields = catalog.fields_for(&part.category);
        for (key, value) in &part.metadata {
            let field = fields.iter().find(|f| &f.key == key);
            let label = field.map(|f| f.label.as_str()).unwrap_or(key.as_str());
            let unit = field.and_then(|f| f.unit.as_deref()).unwrap_or("");
            println!("  {}: {} {}", style(label).cyan(), value, style(unit).dim());
        }
    }

    if let Some(notes) = &part.notes {
        println!();
        println!("{}", style("Notes").bold());
        println!("  {}", notes);
    }

    println!();
    println!(
        "{} {}   {} {}",
        style("Created:").dim(),
        part.created_at.format("%Y-%m-%d %H:%M"),
        style("Updated:").dim(),
        part.updated_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let original = require_part(&store, &args.part_number)?;
    let path = store.part_file(&original.part_number).map_err(store_error)?;
    let before = fs::read_to_string(&path).into_diagnostic()?;

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(config.editor()).yellow()
    );
    config.run_editor(&path).into_diagnostic()?;

    let edited = fs::read_to_string(&path).into_diagnostic()?;
    if edited == before {
        println!("No changes made.");
        return Ok(());
    }

    let mut part: Part = match serde_yml::from_str(&edited) {
        Ok(part) => part,
        Err(e) => {
            fs::write(&path, &before).into_diagnostic()?;
            return Err(miette::miette!("Edit discarded, the file no longer parses: {}", e));
        }
    };
    if part.part_number != original.part_number {
        fs::write(&path, &before).into_diagnostic()?;
        return Err(miette::miette!(
            help = "create a revision or variant to get a new part number",
            "Edit discarded, part numbers cannot be changed"
        ));
    }

    part.updated_at = chrono::Utc::now();
    store.update_part(part).map_err(store_error)?;
    println!("{} Updated {}", style("✓").green(), style(&original.part_number).cyan());
    Ok(())
}

fn run_revise(args: ReviseArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let existing = store.all_parts().map_err(store_error)?;

    let changes = plan_revision(&args.part_number, &existing, &actor(&config, args.comment.as_deref()))?;
    apply_and_report(&mut store, changes, "Created revision", global)
}

fn run_variant(args: VariantArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let existing = store.all_parts().map_err(store_error)?;

    let changes = plan_variant(
        &args.part_number,
        &args.name,
        &existing,
        &actor(&config, args.comment.as_deref()),
    )?;
    apply_and_report(&mut store, changes, "Created variant", global)
}

fn run_status(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let existing = store.all_parts().map_err(store_error)?;
    let status = PartStatus::from(args.status);

    let changes = plan_status_change(
        &args.part_number,
        status,
        &existing,
        &actor(&config, args.comment.as_deref()),
    )?;
    store.apply(changes).map_err(store_error)?;

    if !global.quiet {
        println!(
            "{} {} is now {}",
            style("✓").green(),
            style(&args.part_number).cyan(),
            styled_status(status)
        );
    }
    Ok(())
}

fn run_note(args: NoteArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let existing = store.all_parts().map_err(store_error)?;

    let changes = plan_note(&args.part_number, &existing, &actor(&config, Some(&args.comment)))?;
    store.apply(changes).map_err(store_error)?;

    if !global.quiet {
        println!("{} Note added to {}", style("✓").green(), style(&args.part_number).cyan());
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let part = require_part(&store, &args.part_number)?;

    if !args.yes && !confirm(&format!("Delete {} ({})?", part.part_number, part.name))? {
        return Err(miette::miette!(
            help = "re-run with --yes to skip confirmation",
            "Aborted, {} was not deleted",
            part.part_number
        ));
    }

    store.delete_part(&part.part_number).map_err(store_error)?;
    if !global.quiet {
        println!("{} Deleted {}", style("✓").green(), style(&part.part_number).cyan());
    }
    Ok(())
}

fn run_log(args: LogArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let entries = store.changes_for(&args.part_number).map_err(store_error)?;

    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&entries).into_diagnostic()?),
        _ => {
            if entries.is_empty() {
                println!("No changes recorded for {}.", style(&args.part_number).cyan());
                return Ok(());
            }
            for entry in &entries {
                let values = match (&entry.old_value, &entry.new_value) {
                    (Some(old), Some(new)) => format!(" {} → {}", old, new),
                    _ => String::new(),
                };
                println!(
                    "{}  {:<8} {}{}  {}",
                    style(entry.timestamp.format("%Y-%m-%d %H:%M")).dim(),
                    style(entry.change_type).yellow(),
                    entry.description,
                    values,
                    style(&entry.user_initials).cyan()
                );
                if !entry.comment.is_empty() {
                    println!("                  {}", style(&entry.comment).dim());
                }
            }
        }
    }
    Ok(())
}
