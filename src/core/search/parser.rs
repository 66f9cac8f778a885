//! Search query tokenizer
//!
//! Turns a free-form query into a flat [`SearchGroup`]:
//!
//! - `"front caliper"` exact phrase
//! - `brak*` prefix wildcard (trailing `*` only)
//! - `voltage:12` metadata `field:value`
//! - anything else is a plain text token
//!
//! Tokens are separated by spaces or by the operators `&` (AND), `|` (OR)
//! and `,` (OR). Grouping is deliberately flat: if any token was introduced
//! with OR the whole group is evaluated as OR-of-all, otherwise AND-of-all.
//! Mixed `&`/`|` queries do not get operator precedence.

use serde::Serialize;

/// Boolean operator attached to a token or a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '&' => Some(Operator::And),
            '|' | ',' => Some(Operator::Or),
            _ => None,
        }
    }
}

/// What a token matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Case-insensitive full-field equality
    Exact,
    /// Case-insensitive prefix match; the value keeps its trailing `*`
    Wildcard,
    /// Substring match on one metadata field
    Metadata,
    /// Substring match across all searchable fields
    Text,
}

/// One parsed unit of a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchToken {
    pub kind: TokenKind,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub operator: Operator,
}

impl SearchToken {
    fn new(kind: TokenKind, value: &str, operator: Operator) -> Self {
        Self {
            kind,
            value: value.trim().to_string(),
            field: None,
            operator,
        }
    }

    fn metadata(field: &str, value: &str, operator: Operator) -> Self {
        Self {
            kind: TokenKind::Metadata,
            value: value.trim().to_string(),
            field: Some(field.trim().to_string()),
            operator,
        }
    }
}

/// Tokens plus the operator used to combine all of them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SearchGroup {
    pub tokens: Vec<SearchToken>,
    pub operator: Operator,
}

impl SearchGroup {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Characters that end a metadata value
fn ends_metadata_value(c: char) -> bool {
    matches!(c, ' ' | '&' | '|' | ',')
}

/// Parse a query string into a [`SearchGroup`]
pub fn parse_search_query(query: &str) -> SearchGroup {
    let chars: Vec<char> = query.chars().collect();
    let mut tokens = Vec::new();
    let mut buffer = String::new();
    let mut in_quotes = false;
    let mut operator = Operator::And;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if !in_quotes {
            if let Some(next_op) = Operator::from_char(c) {
                if !buffer.is_empty() {
                    tokens.push(SearchToken::new(TokenKind::Text, &buffer, operator));
                    buffer.clear();
                }
                operator = next_op;
                i += 1;
                continue;
            }
        }

        if c == '"' {
            if !buffer.is_empty() {
                let kind = if in_quotes {
                    TokenKind::Exact
                } else {
                    TokenKind::Text
                };
                tokens.push(SearchToken::new(kind, &buffer, operator));
                buffer.clear();
            }
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }

        if !in_quotes && c == ':' && !buffer.is_empty() {
            let field = std::mem::take(&mut buffer);
            i += 1;
            while i < chars.len() && !ends_metadata_value(chars[i]) {
                buffer.push(chars[i]);
                i += 1;
            }
            if !buffer.is_empty() {
                tokens.push(SearchToken::metadata(&field, &buffer, operator));
                buffer.clear();
            }
            continue;
        }

        if !in_quotes && c == '*' {
            if !buffer.is_empty() {
                let pattern = format!("{}*", buffer.trim());
                tokens.push(SearchToken::new(TokenKind::Wildcard, &pattern, operator));
                buffer.clear();
            }
            i += 1;
            continue;
        }

        if !in_quotes && c == ' ' {
            if !buffer.is_empty() {
                tokens.push(SearchToken::new(TokenKind::Text, &buffer, operator));
                buffer.clear();
            }
            i += 1;
            continue;
        }

        buffer.push(c);
        i += 1;
    }

    if !buffer.is_empty() {
        tokens.push(SearchToken::new(TokenKind::Text, &buffer, operator));
    }

    let operator = if tokens.iter().any(|t| t.operator == Operator::Or) {
        Operator::Or
    } else {
        Operator::And
    };

    tracing::debug!(query, tokens = tokens.len(), ?operator, "parsed search query");

    SearchGroup { tokens, operator }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(group: &SearchGroup) -> Vec<TokenKind> {
        group.tokens.iter().map(|t| t.kind).collect()
    }

    fn values(group: &SearchGroup) -> Vec<&str> {
        group.tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn test_plain_words_are_and_text() {
        let group = parse_search_query("brake caliper");
        assert_eq!(kinds(&group), vec![TokenKind::Text, TokenKind::Text]);
        assert_eq!(values(&group), vec!["brake", "caliper"]);
        assert_eq!(group.operator, Operator::And);
    }

    #[test]
    fn test_quoted_phrase_is_exact() {
        let group = parse_search_query(r#"brake & "front caliper""#);
        assert_eq!(kinds(&group), vec![TokenKind::Text, TokenKind::Exact]);
        assert_eq!(values(&group), vec!["brake", "front caliper"]);
        assert_eq!(group.operator, Operator::And);
    }

    #[test]
    fn test_metadata_token() {
        let group = parse_search_query("voltage:12 chemistry:LFP");
        assert_eq!(group.tokens.len(), 2);
        assert_eq!(group.tokens[0].kind, TokenKind::Metadata);
        assert_eq!(group.tokens[0].field.as_deref(), Some("voltage"));
        assert_eq!(group.tokens[0].value, "12");
        assert_eq!(group.tokens[1].field.as_deref(), Some("chemistry"));
        assert_eq!(group.tokens[1].value, "LFP");
    }

    #[test]
    fn test_metadata_value_stops_at_operator() {
        let group = parse_search_query("voltage:12|pump");
        assert_eq!(kinds(&group), vec![TokenKind::Metadata, TokenKind::Text]);
        assert_eq!(group.tokens[0].operator, Operator::And);
        assert_eq!(group.tokens[1].operator, Operator::Or);
        assert_eq!(group.operator, Operator::Or);
    }

    #[test]
    fn test_metadata_without_value_is_dropped() {
        let group = parse_search_query("voltage: pump");
        assert_eq!(kinds(&group), vec![TokenKind::Text]);
        assert_eq!(values(&group), vec!["pump"]);
    }

    #[test]
    fn test_leading_colon_is_text() {
        let group = parse_search_query(":12");
        assert_eq!(kinds(&group), vec![TokenKind::Text]);
        assert_eq!(values(&group), vec![":12"]);
    }

    #[test]
    fn test_wildcard_keeps_star() {
        let group = parse_search_query("brak*");
        assert_eq!(kinds(&group), vec![TokenKind::Wildcard]);
        assert_eq!(values(&group), vec!["brak*"]);
    }

    #[test]
    fn test_lone_star_is_ignored() {
        assert!(parse_search_query("*").is_empty());
        assert!(parse_search_query("   ").is_empty());
        assert!(parse_search_query("").is_empty());
    }

    #[test]
    fn test_comma_means_or() {
        let group = parse_search_query("pump, heater");
        assert_eq!(values(&group), vec!["pump", "heater"]);
        assert_eq!(group.tokens[0].operator, Operator::And);
        assert_eq!(group.tokens[1].operator, Operator::Or);
        assert_eq!(group.operator, Operator::Or);
    }

    #[test]
    fn test_any_or_makes_group_or() {
        let group = parse_search_query("a & b | c & d");
        assert_eq!(values(&group), vec!["a", "b", "c", "d"]);
        assert_eq!(group.operator, Operator::Or);
    }

    #[test]
    fn test_operator_sticks_until_changed() {
        let group = parse_search_query("a | b c");
        let ops: Vec<Operator> = group.tokens.iter().map(|t| t.operator).collect();
        assert_eq!(ops, vec![Operator::And, Operator::Or, Operator::Or]);
    }

    #[test]
    fn test_operators_inside_quotes_are_literal() {
        let group = parse_search_query(r#""nuts & bolts, m6""#);
        assert_eq!(kinds(&group), vec![TokenKind::Exact]);
        assert_eq!(values(&group), vec!["nuts & bolts, m6"]);
        assert_eq!(group.operator, Operator::And);
    }

    #[test]
    fn test_opening_quote_flushes_text() {
        let group = parse_search_query(r#"kit"front""#);
        assert_eq!(kinds(&group), vec![TokenKind::Text, TokenKind::Exact]);
        assert_eq!(values(&group), vec!["kit", "front"]);
    }

    #[test]
    fn test_unterminated_quote_flushes_as_text() {
        let group = parse_search_query(r#""front cal"#);
        assert_eq!(kinds(&group), vec![TokenKind::Text]);
        assert_eq!(values(&group), vec!["front cal"]);
    }

    proptest! {
        #[test]
        fn parser_is_total(query in ".{0,64}") {
            let group = parse_search_query(&query);
            for token in &group.tokens {
                if token.kind == TokenKind::Metadata {
                    prop_assert!(token.field.is_some());
                }
                if token.kind == TokenKind::Wildcard {
                    prop_assert!(token.value.ends_with('*'));
                }
            }
        }
    }
}
