//! String similarity primitives shared by search and duplicate detection

/// Levenshtein edit distance between two strings, counted in characters
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            curr_row[j + 1] = if ca == cb {
                prev_row[j]
            } else {
                1 + prev_row[j].min(prev_row[j + 1]).min(curr_row[j])
            };
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

/// Case-insensitive similarity ratio in `[0, 1]`:
/// `1 - distance / max(len_a, len_b)`.
///
/// Two empty strings are 100% similar.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(&a, &b);
    1.0 - distance as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_basics() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abcd"), 4);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("flaw", "lawn"), 2);
    }

    #[test]
    fn test_transposition_costs_two() {
        assert_eq!(levenshtein_distance("front", "fornt"), 2);
    }

    #[test]
    fn test_distance_counts_chars_not_bytes() {
        assert_eq!(levenshtein_distance("über", "uber"), 1);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("Brake", "brake"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);

        let s = similarity("Front Caliper", "Fornt Caliper");
        assert!(s >= 0.8, "expected >= 0.8, got {s}");

        let s = similarity("Front Caliper", "Rear Hub");
        assert!(s < 0.8, "expected < 0.8, got {s}");
    }
}
