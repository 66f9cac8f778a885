//! Duplicate screening for new parts

use serde::Serialize;

use crate::core::similarity::similarity;
use crate::entities::part::{Part, PartDraft};

/// Minimum name/description similarity reported as a potential duplicate
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// An existing part that looks like the draft being created
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateMatch<'a> {
    pub part: &'a Part,

    /// Human-readable reasons, in check order
    pub reasons: Vec<String>,

    /// Highest score among the checks that fired, in `[0, 1]`
    pub similarity: f64,
}

/// Screen a draft against existing parts using the default threshold
pub fn find_potential_duplicates<'a>(draft: &PartDraft, existing: &'a [Part]) -> Vec<DuplicateMatch<'a>> {
    find_potential_duplicates_with_threshold(draft, existing, SIMILARITY_THRESHOLD)
}

/// Screen a draft against existing parts.
///
/// Exact legacy or manufacturer part number hits score 1. Names (when both
/// are present) and descriptions score their normalized edit similarity when
/// it reaches `threshold`. Results are sorted by descending similarity; ties
/// keep the order of `existing`.
pub fn find_potential_duplicates_with_threshold<'a>(
    draft: &PartDraft,
    existing: &'a [Part],
    threshold: f64,
) -> Vec<DuplicateMatch<'a>> {
    let mut matches: Vec<DuplicateMatch<'a>> = existing
        .iter()
        .filter_map(|part| check_part(draft, part, threshold))
        .collect();

    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    tracing::debug!(
        candidates = existing.len(),
        matches = matches.len(),
        threshold,
        "duplicate screening finished"
    );
    matches
}

fn check_part<'a>(draft: &PartDraft, part: &'a Part, threshold: f64) -> Option<DuplicateMatch<'a>> {
    let mut reasons = Vec::new();
    let mut max_similarity: f64 = 0.0;

    if let Some(fellten) = draft.fellten_part_number.as_deref().filter(|s| !s.is_empty()) {
        if part.fellten_part_number.as_deref() == Some(fellten) {
            reasons.push("Identical Fellten part number".to_string());
            max_similarity = 1.0;
        }
    }

    if let Some(mpn) = draft.manufacturer_part_number.as_deref().filter(|s| !s.is_empty()) {
        if part.manufacturer_part_number.as_deref() == Some(mpn)
            && part.manufacturer_id == draft.manufacturer_id
        {
            reasons.push("Identical manufacturer part number".to_string());
            max_similarity = 1.0;
        }
    }

    if !draft.name.is_empty() && !part.name.is_empty() {
        let score = similarity(&draft.name, &part.name);
        if score >= threshold {
            reasons.push(format!("Similar name ({}% match)", percent(score)));
            max_similarity = max_similarity.max(score);
        }
    }

    let score = similarity(&draft.description, &part.description);
    if score >= threshold {
        reasons.push(format!("Similar description ({}% match)", percent(score)));
        max_similarity = max_similarity.max(score);
    }

    if reasons.is_empty() {
        return None;
    }

    Some(DuplicateMatch {
        part,
        reasons,
        similarity: max_similarity,
    })
}

fn percent(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::PartIdentifier;

    fn existing(seq: u32, name: &str, description: &str) -> Part {
        let draft = PartDraft::new(name, description, "0401");
        Part::from_draft(&draft, &PartIdentifier::new("04", "01", seq))
    }

    #[test]
    fn test_identical_fellten_number() {
        let mut p = existing(1, "Pack", "Battery module");
        p.fellten_part_number = Some("FT-1001".to_string());
        let parts = vec![p];

        let mut draft = PartDraft::new("Completely different", "Nothing alike here", "0401");
        draft.fellten_part_number = Some("FT-1001".to_string());

        let found = find_potential_duplicates(&draft, &parts);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].similarity, 1.0);
        assert_eq!(found[0].reasons, vec!["Identical Fellten part number"]);
    }

    #[test]
    fn test_manufacturer_number_needs_same_manufacturer() {
        let mut p = existing(1, "Relay", "Main contactor");
        p.manufacturer_id = Some("m1".to_string());
        p.manufacturer_part_number = Some("EV200".to_string());
        let parts = vec![p];

        let mut draft = PartDraft::new("Other", "Unrelated thing", "0601");
        draft.manufacturer_part_number = Some("EV200".to_string());
        draft.manufacturer_id = Some("m2".to_string());
        assert!(find_potential_duplicates(&draft, &parts).is_empty());

        draft.manufacturer_id = Some("m1".to_string());
        let found = find_potential_duplicates(&draft, &parts);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reasons, vec!["Identical manufacturer part number"]);
    }

    #[test]
    fn test_transposed_description_is_flagged() {
        let parts = vec![existing(1, "Caliper", "Front Caliper")];
        let draft = PartDraft::new("Bracket", "Fornt Caliper", "0401");

        let found = find_potential_duplicates(&draft, &parts);
        assert_eq!(found.len(), 1);
        assert!(found[0].similarity >= SIMILARITY_THRESHOLD);
        assert!(found[0].reasons[0].starts_with("Similar description ("));
        assert_eq!(found[0].reasons[0], "Similar description (85% match)");
    }

    #[test]
    fn test_unrelated_description_is_excluded() {
        let parts = vec![existing(1, "Caliper", "Front Caliper")];
        let draft = PartDraft::new("Hub", "Rear Hub", "0401");
        assert!(find_potential_duplicates(&draft, &parts).is_empty());
    }

    #[test]
    fn test_similarity_is_max_of_fired_checks() {
        let parts = vec![existing(1, "Brake Kit", "Front Caliper")];
        let draft = PartDraft::new("Brake Kit", "Fornt Caliper", "0401");

        let found = find_potential_duplicates(&draft, &parts);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reasons.len(), 2);
        assert_eq!(found[0].reasons[0], "Similar name (100% match)");
        assert_eq!(found[0].similarity, 1.0);
    }

    #[test]
    fn test_empty_descriptions_match() {
        let parts = vec![existing(1, "Alpha", "")];
        let draft = PartDraft::new("Omega", "", "0401");
        let found = find_potential_duplicates(&draft, &parts);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reasons, vec!["Similar description (100% match)"]);
    }

    #[test]
    fn test_sorted_by_similarity_desc() {
        let parts = vec![
            existing(1, "X", "Front Caliper"),
            existing(2, "Y", "Fornt Caliper"),
            existing(3, "Z", "Front Caliper"),
        ];
        let draft = PartDraft::new("W", "Front Caliper", "0401");

        let found = find_potential_duplicates(&draft, &parts);
        let order: Vec<&str> = found.iter().map(|m| m.part.name.as_str()).collect();
        assert_eq!(order, vec!["X", "Z", "Y"]);
    }

    #[test]
    fn test_custom_threshold() {
        let parts = vec![existing(1, "Caliper", "Front Caliper")];
        let draft = PartDraft::new("Bracket", "Fornt Caliper", "0401");
        assert!(find_potential_duplicates_with_threshold(&draft, &parts, 0.9).is_empty());
    }
}
