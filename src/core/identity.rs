//! Part number codec
//!
//! Part numbers have the canonical shape `CCSS-NNNNNN-VV-R`:
//!
//! - `CC` two-digit category id
//! - `SS` two-digit subcategory id
//! - `NNNNNN` zero-padded global sequence (unique across all categories)
//! - `VV` two-digit variance (variant family member, `00` for the base part)
//! - `R` single uppercase revision letter
//!
//! The string form is the primary key of a part and is never rewritten once
//! assigned. Revisions and variants always get a brand new part number.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Default variance for a newly created part
pub const DEFAULT_VARIANCE: &str = "00";

/// Default revision for a newly created part or variant
pub const DEFAULT_REVISION: char = 'A';

static PART_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})(\d{2})-(\d{6})-(\d{2})-([A-Z])$").expect("part number pattern is valid")
});

static SEQUENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d{6})-").expect("sequence pattern is valid"));

/// Decoded components of a part number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartIdentifier {
    /// Two-digit category id (e.g. "04")
    pub category_id: String,

    /// Two-digit subcategory id (e.g. "01")
    pub subcategory_id: String,

    /// Global sequence number
    pub sequence: u32,

    /// Two-digit variance (e.g. "00")
    pub variance: String,

    /// Revision letter
    pub revision: char,
}

impl PartIdentifier {
    /// Build an identifier for a brand new base part (variance `00`, revision `A`)
    pub fn new(category_id: impl Into<String>, subcategory_id: impl Into<String>, sequence: u32) -> Self {
        Self {
            category_id: category_id.into(),
            subcategory_id: subcategory_id.into(),
            sequence,
            variance: DEFAULT_VARIANCE.to_string(),
            revision: DEFAULT_REVISION,
        }
    }

    /// Decode a part number, returning `None` if it is not in canonical form
    pub fn parse(s: &str) -> Option<Self> {
        parse_part_number(s)
    }

    /// The four-character category code (category id + subcategory id)
    pub fn category_code(&self) -> String {
        format!("{}{}", self.category_id, self.subcategory_id)
    }

    /// True if `other` belongs to the same variant family (same category,
    /// subcategory and sequence)
    pub fn same_family(&self, other: &PartIdentifier) -> bool {
        self.category_id == other.category_id
            && self.subcategory_id == other.subcategory_id
            && self.sequence == other.sequence
    }

    /// Same identifier with a different revision letter
    pub fn with_revision(&self, revision: char) -> Self {
        Self {
            revision,
            ..self.clone()
        }
    }

    /// Same family with a different variance and the revision reset to `A`
    pub fn with_variance(&self, variance: impl Into<String>) -> Self {
        Self {
            variance: variance.into(),
            revision: DEFAULT_REVISION,
            ..self.clone()
        }
    }
}

impl fmt::Display for PartIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            generate_part_number(
                &self.category_id,
                &self.subcategory_id,
                self.sequence,
                &self.variance,
                self.revision,
            )
        )
    }
}

impl FromStr for PartIdentifier {
    type Err = PartNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_part_number(s).ok_or_else(|| PartNumberError::InvalidFormat(s.to_string()))
    }
}

impl Serialize for PartIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PartIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Encode part number components into the canonical string.
///
/// Category and subcategory ids are used as given; the caller is responsible
/// for passing two-digit strings. Bad inputs produce a well-shaped but
/// malformed part number rather than an error.
pub fn generate_part_number(
    category_id: &str,
    subcategory_id: &str,
    sequence: u32,
    variance: &str,
    revision: char,
) -> String {
    format!(
        "{}{}-{:06}-{}-{}",
        category_id, subcategory_id, sequence, variance, revision
    )
}

/// Decode a part number.
///
/// Only strings matching `^\d{2}\d{2}-\d{6}-\d{2}-[A-Z]$` are accepted.
pub fn parse_part_number(s: &str) -> Option<PartIdentifier> {
    let Some(caps) = PART_NUMBER_RE.captures(s) else {
        tracing::warn!(part_number = s, "invalid part number format");
        return None;
    };

    let sequence = caps[3].parse().ok()?;
    let revision = caps[5].chars().next()?;

    Some(PartIdentifier {
        category_id: caps[1].to_string(),
        subcategory_id: caps[2].to_string(),
        sequence,
        variance: caps[4].to_string(),
        revision,
    })
}

/// Next global sequence number: one past the largest sequence found in any
/// of the given part numbers, or 1 when none contains a sequence.
///
/// The counter is global rather than per-category, so sequences are unique
/// system-wide but not dense within a category.
pub fn next_sequence<I, S>(existing: I) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max = existing
        .into_iter()
        .filter_map(|pn| {
            SEQUENCE_RE
                .captures(pn.as_ref())
                .and_then(|caps| caps[1].parse::<u32>().ok())
        })
        .max()
        .unwrap_or(0);

    tracing::debug!(max_sequence = max, "computed next sequence");
    max + 1
}

/// Next revision letter by code point (`A` -> `B`).
///
/// There is no wraparound: the revision after `Z` is `[`, which no longer
/// decodes as a valid part number.
pub fn next_revision(current: char) -> char {
    let next = char::from_u32(current as u32 + 1).unwrap_or(char::REPLACEMENT_CHARACTER);
    if !next.is_ascii_uppercase() {
        tracing::warn!(current = %current, next = %next, "revision letter left the A-Z range");
    }
    next
}

/// Next variance, re-padded to two digits (`09` -> `10`).
///
/// Returns `None` if `current` is not a base-10 number. Past `99` the result
/// is three digits wide and no longer decodes as a valid part number.
pub fn next_variance(current: &str) -> Option<String> {
    let value: u32 = current.trim().parse().ok()?;
    let next = format!("{:02}", value + 1);
    if next.len() > 2 {
        tracing::warn!(current, next = %next, "variance left the 00-99 range");
    }
    Some(next)
}

/// Errors that can occur when parsing part numbers
#[derive(Debug, Error)]
pub enum PartNumberError {
    #[error("invalid part number format: '{0}' (expected CCSS-NNNNNN-VV-R, e.g. 0401-000001-00-A)")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generate_canonical_form() {
        assert_eq!(generate_part_number("04", "01", 5, "00", 'A'), "0401-000005-00-A");
        assert_eq!(
            generate_part_number("10", "03", 123456, "12", 'C'),
            "1003-123456-12-C"
        );
    }

    #[test]
    fn test_generate_does_not_validate_inputs() {
        assert_eq!(generate_part_number("4", "1", 7, "00", 'A'), "41-000007-00-A");
    }

    #[test]
    fn test_parse_valid() {
        let id = parse_part_number("0601-000003-02-B").unwrap();
        assert_eq!(id.category_id, "06");
        assert_eq!(id.subcategory_id, "01");
        assert_eq!(id.sequence, 3);
        assert_eq!(id.variance, "02");
        assert_eq!(id.revision, 'B');
        assert_eq!(id.category_code(), "0601");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_part_number("0401-000005-00-a").is_none());
        assert!(parse_part_number("0401-00005-00-A").is_none());
        assert!(parse_part_number("0401000005-00-A").is_none());
        assert!(parse_part_number("0401-000005-00-AB").is_none());
        assert!(parse_part_number(" 0401-000005-00-A").is_none());
        assert!(parse_part_number("").is_none());
    }

    #[test]
    fn test_from_str_error() {
        let err = "bogus".parse::<PartIdentifier>().unwrap_err();
        assert!(matches!(err, PartNumberError::InvalidFormat(_)));
    }

    #[test]
    fn test_next_sequence() {
        assert_eq!(next_sequence(Vec::<String>::new()), 1);
        assert_eq!(
            next_sequence(["0401-000005-00-A", "0601-000003-00-B"]),
            6
        );
    }

    #[test]
    fn test_next_sequence_ignores_unmatched() {
        assert_eq!(next_sequence(["legacy-123", "n/a"]), 1);
        assert_eq!(next_sequence(["legacy-123", "0201-000041-00-A"]), 42);
    }

    #[test]
    fn test_next_revision() {
        assert_eq!(next_revision('A'), 'B');
        assert_eq!(next_revision('Y'), 'Z');
        assert_eq!(next_revision('Z'), '[');
    }

    #[test]
    fn test_next_variance() {
        assert_eq!(next_variance("00").as_deref(), Some("01"));
        assert_eq!(next_variance("09").as_deref(), Some("10"));
        assert_eq!(next_variance("99").as_deref(), Some("100"));
        assert_eq!(next_variance("xx"), None);
    }

    #[test]
    fn test_identifier_family() {
        let base = PartIdentifier::new("04", "01", 12);
        let variant = base.with_variance("03");
        assert!(base.same_family(&variant));
        assert_eq!(variant.to_string(), "0401-000012-03-A");
        assert_eq!(base.with_revision('D').to_string(), "0401-000012-00-D");
        assert!(!base.same_family(&PartIdentifier::new("04", "02", 12)));
    }

    #[test]
    fn test_serde_as_string() {
        let id = PartIdentifier::new("05", "01", 9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0501-000009-00-A\"");
        let back: PartIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    proptest! {
        #[test]
        fn roundtrip_valid_components(
            cat in 0u32..100,
            sub in 0u32..100,
            seq in 1u32..=999_999,
            var in 0u32..100,
            rev in proptest::char::range('A', 'Z'),
        ) {
            let category_id = format!("{:02}", cat);
            let subcategory_id = format!("{:02}", sub);
            let variance = format!("{:02}", var);
            let pn = generate_part_number(&category_id, &subcategory_id, seq, &variance, rev);
            let parsed = parse_part_number(&pn).unwrap();
            prop_assert_eq!(parsed.category_id, category_id);
            prop_assert_eq!(parsed.subcategory_id, subcategory_id);
            prop_assert_eq!(parsed.sequence, seq);
            prop_assert_eq!(parsed.variance, variance);
            prop_assert_eq!(parsed.revision, rev);
        }
    }
}
