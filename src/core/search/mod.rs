//! Part search: query language, matching, list filters and suggestions

pub mod matcher;
pub mod parser;
pub mod suggest;

pub use matcher::{
    filter_parts, matches_search_tokens, sort_parts, SearchFilters, SortDirection, SortKey,
};
pub use parser::{parse_search_query, Operator, SearchGroup, SearchToken, TokenKind};
pub use suggest::{generate_search_suggestions, DEFAULT_SUGGESTION_LIMIT};
