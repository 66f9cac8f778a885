//! `plm mfr` command - Manufacturer directory

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::open_store;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::manufacturer::Manufacturer;

#[derive(Subcommand, Debug)]
pub enum MfrCommands {
    /// List all manufacturers
    List,

    /// Add a manufacturer
    New(NewMfrArgs),

    /// Search manufacturers by name or code
    Search(SearchMfrArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewMfrArgs {
    /// Manufacturer name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Short unique code (stored upper case; defaults to the name's initials)
    #[arg(long, short = 'c')]
    pub code: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SearchMfrArgs {
    /// Text to look for in names and codes
    pub query: String,
}

pub fn run(cmd: MfrCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MfrCommands::List => run_list(global),
        MfrCommands::New(args) => run_new(args, global),
        MfrCommands::Search(args) => run_search(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let directory = store.manufacturers().map_err(|e| miette::miette!("{}", e))?;
    let all: Vec<&Manufacturer> = directory.manufacturers.iter().collect();
    print_manufacturers(&all, global.format)
}

fn run_new(args: NewMfrArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut directory = store.manufacturers().map_err(|e| miette::miette!("{}", e))?;

    let manufacturer = match &args.code {
        Some(code) => Manufacturer::new(&args.name, code),
        None => Manufacturer::named(&args.name),
    };
    let added = directory
        .add(manufacturer)
        .map_err(|e| miette::miette!("{}", e))?
        .clone();
    store
        .save_manufacturers(&directory)
        .map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Id => println!("{}", added.id),
        _ if global.quiet => {}
        _ => println!(
            "{} Added manufacturer {} ({})",
            style("✓").green(),
            style(&added.name).cyan(),
            added.code
        ),
    }
    Ok(())
}

fn run_search(args: SearchMfrArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let directory = store.manufacturers().map_err(|e| miette::miette!("{}", e))?;
    let found = directory.search(&args.query);

    if found.is_empty() && matches!(global.format, OutputFormat::Auto | OutputFormat::Tsv) {
        println!("No manufacturers matching '{}'.", style(&args.query).yellow());
        return Ok(());
    }
    print_manufacturers(&found, global.format)
}

fn print_manufacturers(manufacturers: &[&Manufacturer], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(manufacturers).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(manufacturers).into_diagnostic()?),
        OutputFormat::Id => {
            for m in manufacturers {
                println!("{}", m.id);
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Code", "Name", "ID"]);
            for m in manufacturers {
                builder.push_record([m.code.as_str(), m.name.as_str(), m.id.as_str()]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            if manufacturers.is_empty() {
                println!("No manufacturers yet. Add one with {}", style("plm mfr new").yellow());
                return Ok(());
            }
            println!("{:<8} {:<30} {}", style("CODE").bold(), style("NAME").bold(), style("ID").bold());
            for m in manufacturers {
                println!("{:<8} {:<30} {}", style(&m.code).cyan(), m.name, style(&m.id).dim());
            }
        }
    }
    Ok(())
}
