//! `plm search` command - Query parts
//!
//! The query language supports exact phrases (`"front caliper"`), prefix
//! wildcards (`brak*`), metadata predicates (`voltage:12`) and plain words,
//! joined by spaces or `&` (all must match) or `|`/`,` (any may match).

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;

use crate::cli::helpers::{load_catalog, open_store, print_parts};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::search::{filter_parts, parse_search_query, sort_parts, SearchFilters, SortDirection, SortKey};
use crate::core::store::PartStore;
use crate::core::Config;
use crate::entities::part::{Part, PartStatus};

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Show only count
    #[arg(long)]
    pub count: bool,

    /// Print the parsed query instead of searching
    #[arg(long)]
    pub explain: bool,
}

/// Filters and ordering shared by `search` and `part list`
#[derive(clap::Args, Debug, Default)]
pub struct FilterArgs {
    /// Category code prefix (e.g. 04 or 0401)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Filter by status
    #[arg(long, short = 's')]
    pub status: Option<CliStatus>,

    /// Metadata filter as key=value (substring match, repeatable)
    #[arg(long = "meta", short = 'm', value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,

    /// Sort by column
    #[arg(long, default_value = "part-number")]
    pub sort: SortField,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

impl FilterArgs {
    pub fn to_filters(&self, query: Option<&str>) -> SearchFilters {
        SearchFilters {
            query: query.map(str::to_string),
            category: self.category.clone(),
            status: self.status.map(PartStatus::from),
            metadata: self.metadata.iter().cloned().collect::<BTreeMap<_, _>>(),
        }
    }

    /// Filter, sort and limit `parts`
    pub fn select<'a>(&self, parts: &'a [Part], query: Option<&str>) -> Vec<&'a Part> {
        let mut selected = filter_parts(parts, &self.to_filters(query));
        let direction = if self.reverse {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        sort_parts(&mut selected, self.sort.into(), direction);
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Part status for command-line arguments
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliStatus {
    Active,
    Obsolete,
    Pending,
}

impl From<CliStatus> for PartStatus {
    fn from(status: CliStatus) -> Self {
        match status {
            CliStatus::Active => PartStatus::Active,
            CliStatus::Obsolete => PartStatus::Obsolete,
            CliStatus::Pending => PartStatus::Pending,
        }
    }
}

/// Sortable columns
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    PartNumber,
    Name,
    Description,
    Category,
    Status,
    Revision,
    Updated,
}

impl From<SortField> for SortKey {
    fn from(field: SortField) -> Self {
        match field {
            SortField::PartNumber => SortKey::PartNumber,
            SortField::Name => SortKey::Name,
            SortField::Description => SortKey::Description,
            SortField::Category => SortKey::Category,
            SortField::Status => SortKey::Status,
            SortField::Revision => SortKey::Revision,
            SortField::Updated => SortKey::Updated,
        }
    }
}

/// Parse `key=value`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Run the search command
pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    if args.explain {
        let group = parse_search_query(&args.query);
        let format = global.format.resolve(None, OutputFormat::Json);
        if format == OutputFormat::Yaml {
            print!("{}", serde_yml::to_string(&group).into_diagnostic()?);
        } else {
            println!("{}", serde_json::to_string_pretty(&group).into_diagnostic()?);
        }
        return Ok(());
    }

    let store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let catalog = load_catalog(Some(store.project()))?;
    let parts = store.all_parts().map_err(|e| miette::miette!("{}", e))?;

    let results = args.filters.select(&parts, Some(args.query.as_str()));

    if args.count {
        println!("{}", results.len());
        return Ok(());
    }

    let format = global.format.resolve(config.default_format.as_deref(), OutputFormat::Tsv);

    if results.is_empty() && matches!(format, OutputFormat::Tsv | OutputFormat::Auto) {
        println!("No results found for '{}'.", style(&args.query).yellow());
        return Ok(());
    }

    print_parts(&results, format, &catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::PartIdentifier;
    use crate::entities::part::PartDraft;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("voltage = 12V"),
            Ok(("voltage".to_string(), "12V".to_string()))
        );
        assert_eq!(parse_key_value("note=a=b").unwrap().1, "a=b");
        assert!(parse_key_value("voltage").is_err());
        assert!(parse_key_value("=12").is_err());
    }

    #[test]
    fn test_select_sorts_and_limits() {
        let parts: Vec<Part> = ["Pump B", "Pump A", "Heater"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let draft = PartDraft::new(*name, "thermal", "0802");
                Part::from_draft(&draft, &PartIdentifier::new("08", "02", i as u32 + 1))
            })
            .collect();

        let args = FilterArgs {
            sort: SortField::Name,
            limit: Some(1),
            ..Default::default()
        };
        let selected = args.select(&parts, Some("pump"));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "Pump A");
    }
}
