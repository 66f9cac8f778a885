//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    category::CategoryCommands, completions::CompletionsArgs, config::ConfigCommands,
    init::InitArgs, mfr::MfrCommands, part::PartCommands, search::SearchArgs,
    suggest::SuggestArgs,
};

#[derive(Parser)]
#[command(name = "plm")]
#[command(author, version, about = "Parts lifecycle toolkit")]
#[command(long_about = "Create, search, revise and track engineering parts with structured part numbers, stored as plain text files.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .plm/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new PLM project
    Init(InitArgs),

    /// Part management (create, revise, variants, status)
    #[command(subcommand)]
    Part(PartCommands),

    /// Search parts with the query language
    Search(SearchArgs),

    /// Autocomplete suggestions for a partial query
    Suggest(SuggestArgs),

    /// Manufacturer directory
    #[command(subcommand)]
    Mfr(MfrCommands),

    /// Category catalog
    #[command(subcommand)]
    Category(CategoryCommands),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
    /// Just part numbers, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `Auto` against the configured default, then the given fallback
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|s| OutputFormat::from_str(s, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(OutputFormat::Json.resolve(Some("yaml"), OutputFormat::Tsv), OutputFormat::Json);
        assert_eq!(OutputFormat::Auto.resolve(Some("md"), OutputFormat::Tsv), OutputFormat::Md);
        assert_eq!(OutputFormat::Auto.resolve(Some("bogus"), OutputFormat::Tsv), OutputFormat::Tsv);
        assert_eq!(OutputFormat::Auto.resolve(None, OutputFormat::Yaml), OutputFormat::Yaml);
    }
}
