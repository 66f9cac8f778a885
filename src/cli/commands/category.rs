//! `plm category` command - Browse the category catalog

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{load_catalog, open_project};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::{Catalog, MetadataField};

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List every category code
    List,

    /// Show a category code and its metadata fields
    Show(ShowCategoryArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowCategoryArgs {
    /// Four-digit category code (e.g. 0401)
    pub code: String,
}

#[derive(Serialize)]
struct CategoryCode<'a> {
    code: String,
    name: String,
    #[serde(skip_serializing_if = "no_fields")]
    fields: &'a [MetadataField],
}

fn no_fields(fields: &&[MetadataField]) -> bool {
    fields.is_empty()
}

pub fn run(cmd: CategoryCommands, global: &GlobalOpts) -> Result<()> {
    // Outside a project the builtin catalog still applies
    let project = open_project(global).ok();
    let catalog = load_catalog(project.as_ref())?;

    match cmd {
        CategoryCommands::List => run_list(&catalog, global.format),
        CategoryCommands::Show(args) => run_show(&catalog, &args.code, global.format),
    }
}

fn run_list(catalog: &Catalog, format: OutputFormat) -> Result<()> {
    let codes: Vec<CategoryCode<'_>> = catalog
        .codes()
        .into_iter()
        .map(|(code, name)| CategoryCode {
            fields: catalog.fields_for(&code),
            code,
            name,
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&codes).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&codes).into_diagnostic()?),
        OutputFormat::Id => {
            for c in &codes {
                println!("{}", c.code);
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Code", "Category", "Fields"]);
            for c in &codes {
                builder.push_record([c.code.clone(), c.name.clone(), c.fields.len().to_string()]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            for c in &codes {
                let marker = if c.fields.is_empty() {
                    String::new()
                } else {
                    format!("{} fields", c.fields.len())
                };
                println!("{}  {:<50} {}", style(&c.code).cyan(), c.name, style(marker).dim());
            }
        }
    }
    Ok(())
}

fn run_show(catalog: &Catalog, code: &str, format: OutputFormat) -> Result<()> {
    let name = catalog.name_for_code(code).ok_or_else(|| {
        miette::miette!(
            help = "see `plm category list` for valid codes",
            "Unknown category code '{}'",
            code
        )
    })?;
    let category = CategoryCode {
        code: code.to_string(),
        name,
        fields: catalog.fields_for(code),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&category).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&category).into_diagnostic()?),
        OutputFormat::Id => println!("{}", category.code),
        _ => {
            println!("{} {}", style(&category.code).cyan().bold(), category.name);
            if category.fields.is_empty() {
                println!("{}", style("No metadata fields").dim());
                return Ok(());
            }
            println!();
            println!("{}", fields_table(category.fields));
        }
    }
    Ok(())
}

fn fields_table(fields: &[MetadataField]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Key", "Label", "Type", "Required", "Unit", "Options"]);
    for field in fields {
        let choices = if field.options.is_empty() {
            &field.unit_options
        } else {
            &field.options
        };
        builder.push_record([
            field.key.clone(),
            field.label.clone(),
            field.field_type.to_string(),
            if field.required { "yes" } else { "" }.to_string(),
            field.unit.clone().unwrap_or_default(),
            choices.join(", "),
        ]);
    }
    builder.build().with(Style::markdown()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_table_lists_required_marker() {
        let catalog = Catalog::builtin().unwrap();
        let table = fields_table(catalog.fields_for("0401"));
        assert!(table.contains("Key"));
        assert!(table.contains("voltage"));
        assert!(table.contains("yes"));
    }
}
