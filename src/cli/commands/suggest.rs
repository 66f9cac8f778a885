//! `plm suggest` command - Autocomplete suggestions for a partial query

use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_store;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::search::generate_search_suggestions;
use crate::core::store::PartStore;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct SuggestArgs {
    /// Partial query text
    pub query: String,

    /// Maximum number of suggestions (default: suggestion_limit from config)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

pub fn run(args: SuggestArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let parts = store.all_parts().map_err(|e| miette::miette!("{}", e))?;

    let limit = args.limit.unwrap_or_else(|| config.suggestion_limit());
    let suggestions = generate_search_suggestions(&args.query, &parts, limit);

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&suggestions).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&suggestions).into_diagnostic()?);
        }
        _ => {
            for suggestion in &suggestions {
                println!("{}", suggestion);
            }
        }
    }

    Ok(())
}
