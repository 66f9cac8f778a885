//! Shared helper functions for CLI commands
//!
//! Project/store discovery, change attribution and part list rendering used
//! by several command modules.

use console::{style, StyledObject};
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::Catalog;
use crate::core::project::Project;
use crate::core::store::ProjectStore;
use crate::core::Config;
use crate::entities::changelog::Actor;
use crate::entities::part::{Part, PartStatus};

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Locate the project from `--project` or the current directory
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

pub fn open_store(global: &GlobalOpts) -> Result<ProjectStore> {
    open_project(global).map(ProjectStore::new)
}

/// Catalog for the project if one was found, the builtin otherwise
pub fn load_catalog(project: Option<&Project>) -> Result<Catalog> {
    Catalog::load(project).map_err(|e| miette::miette!("{}", e))
}

/// Who is making a change: initials from config, the given comment
pub fn actor(config: &Config, comment: Option<&str>) -> Actor {
    Actor::new(config.initials(), comment.unwrap_or_default())
}

pub fn styled_status(status: PartStatus) -> StyledObject<PartStatus> {
    match status {
        PartStatus::Active => style(status).green(),
        PartStatus::Obsolete => style(status).dim(),
        PartStatus::Pending => style(status).yellow(),
    }
}

/// Render a list of parts in the requested format
pub fn print_parts(parts: &[&Part], format: OutputFormat, catalog: &Catalog) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(parts).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(parts).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for part in parts {
                println!("{}", part.part_number);
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Part Number", "Name", "Description", "Category", "Status", "Rev"]);
            for part in parts {
                let category = catalog.name_for_code(&part.category).unwrap_or_default();
                builder.push_record([
                    part.part_number.as_str(),
                    part.name.as_str(),
                    part.description.as_str(),
                    category.as_str(),
                    part.status.as_str(),
                    part.revision.as_str(),
                ]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<18} {:<24} {:<34} {:<10} {:<3}",
                style("PART NUMBER").bold(),
                style("NAME").bold(),
                style("DESCRIPTION").bold(),
                style("STATUS").bold(),
                style("REV").bold()
            );
            println!("{}", "-".repeat(93));
            for part in parts {
                println!(
                    "{:<18} {:<24} {:<34} {:<10} {:<3}",
                    style(&part.part_number).cyan(),
                    truncate_str(&part.name, 22),
                    truncate_str(&part.description, 32),
                    styled_status(part.status),
                    part.revision
                );
            }
            println!();
            println!("{} part(s) found", style(parts.len()).cyan());
        }
    }
    Ok(())
}
