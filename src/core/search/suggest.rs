//! Autocomplete suggestions for the search box

use crate::entities::part::Part;

/// Default number of suggestions
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Collect up to `limit` distinct suggestions for `query`, in first-found
/// order.
///
/// For each part, in order: the bare part number, the quoted name, the
/// quoted description, `manufacturerPartNumber:<mpn>`, then `key:value` for
/// every metadata entry whose key or value contains the query. Matching is
/// case-insensitive. Results are not ranked.
pub fn generate_search_suggestions(query: &str, parts: &[Part], limit: usize) -> Vec<String> {
    if query.is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    let contains = |s: &str| s.to_lowercase().contains(&needle);
    let mut suggestions: Vec<String> = Vec::new();
    let push = |s: String, out: &mut Vec<String>| {
        if !out.contains(&s) {
            out.push(s);
        }
    };

    for part in parts {
        if suggestions.len() >= limit {
            break;
        }

        if contains(&part.part_number) {
            push(part.part_number.clone(), &mut suggestions);
        }
        if contains(&part.name) {
            push(format!("\"{}\"", part.name), &mut suggestions);
        }
        if contains(&part.description) {
            push(format!("\"{}\"", part.description), &mut suggestions);
        }
        if let Some(mpn) = part.manufacturer_part_number.as_deref() {
            if contains(mpn) {
                push(format!("manufacturerPartNumber:{}", mpn), &mut suggestions);
            }
        }
        for (key, value) in &part.metadata {
            if contains(key) || contains(value) {
                push(format!("{}:{}", key, value), &mut suggestions);
            }
        }
    }

    suggestions.truncate(limit);
    suggestions
}
