//! Evaluate parsed queries and list filters against parts

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::core::search::parser::{parse_search_query, Operator, SearchGroup, SearchToken, TokenKind};
use crate::entities::part::{Part, PartStatus};

/// Does the part satisfy the group?
///
/// AND groups need every token to match (an empty group matches everything);
/// OR groups need at least one.
pub fn matches_search_tokens(part: &Part, group: &SearchGroup) -> bool {
    match group.operator {
        Operator::Or => group.tokens.iter().any(|t| matches_token(part, t)),
        Operator::And => group.tokens.iter().all(|t| matches_token(part, t)),
    }
}

/// Fields compared by exact and wildcard tokens
fn identity_fields(part: &Part) -> impl Iterator<Item = &str> {
    [
        Some(part.part_number.as_str()),
        Some(part.name.as_str()),
        Some(part.description.as_str()),
        part.manufacturer_part_number.as_deref(),
    ]
    .into_iter()
    .flatten()
    .chain(part.metadata.values().map(String::as_str))
}

/// Fields scanned by plain text tokens
fn text_fields(part: &Part) -> impl Iterator<Item = &str> {
    identity_fields(part).chain(part.notes.as_deref())
}

fn matches_token(part: &Part, token: &SearchToken) -> bool {
    let needle = token.value.to_lowercase();

    match token.kind {
        TokenKind::Exact => identity_fields(part).any(|f| f.to_lowercase() == needle),
        TokenKind::Wildcard => {
            let prefix = needle.strip_suffix('*').unwrap_or(&needle);
            identity_fields(part).any(|f| f.to_lowercase().starts_with(prefix))
        }
        TokenKind::Metadata => token
            .field
            .as_ref()
            .and_then(|field| part.metadata.get(field))
            .is_some_and(|value| value.to_lowercase().contains(&needle)),
        TokenKind::Text => text_fields(part).any(|f| f.to_lowercase().contains(&needle)),
    }
}

/// List filters applied on top of the free-text query
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Free-form query in the search language
    pub query: Option<String>,

    /// Category code prefix (e.g. "04" or "0401")
    pub category: Option<String>,

    pub status: Option<PartStatus>,

    /// Every entry must be a case-insensitive substring of the part's value
    pub metadata: BTreeMap<String, String>,
}

impl SearchFilters {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    fn matches_metadata(&self, part: &Part) -> bool {
        self.metadata.iter().all(|(key, wanted)| {
            part.metadata
                .get(key)
                .is_some_and(|v| !v.is_empty() && v.to_lowercase().contains(&wanted.to_lowercase()))
        })
    }
}

/// Apply query, category, status and metadata filters in that order
pub fn filter_parts<'a>(parts: &'a [Part], filters: &SearchFilters) -> Vec<&'a Part> {
    let group = filters
        .query
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(parse_search_query);

    parts
        .iter()
        .filter(|p| group.as_ref().map_or(true, |g| matches_search_tokens(p, g)))
        .filter(|p| {
            filters
                .category
                .as_ref()
                .map_or(true, |c| p.category.starts_with(c.as_str()))
        })
        .filter(|p| filters.status.map_or(true, |s| p.status == s))
        .filter(|p| filters.matches_metadata(p))
        .collect()
}

/// Sortable part columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PartNumber,
    Name,
    Description,
    Category,
    Status,
    Revision,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort by the given column
pub fn sort_parts(parts: &mut [&Part], key: SortKey, direction: SortDirection) {
    parts.sort_by(|a, b| {
        let ordering = compare_by(a, b, key);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare_by(a: &Part, b: &Part, key: SortKey) -> Ordering {
    match key {
        SortKey::PartNumber => a.part_number.cmp(&b.part_number),
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Description => a.description.cmp(&b.description),
        SortKey::Category => a.category.cmp(&b.category),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        SortKey::Revision => a.revision.cmp(&b.revision),
        SortKey::Updated => a.updated_at.cmp(&b.updated_at),
    }
}
