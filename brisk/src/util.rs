//! Shared utility functions

// ============================================================================
// Levenshtein Distance: Typo Suggestions
// ============================================================================

/// Maximum edit distance for a "did you mean" suggestion
pub const SUGGESTION_THRESHOLD: usize = 2;

/// Calculate Levenshtein edit distance between two strings.
/// Uses O(min(m,n)) space with two-row optimization.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (m, n) = (a_chars.len(), b_chars.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Find the closest candidate within `threshold` edits.
/// Ties keep the first candidate seen; the name itself is never suggested.
pub fn find_similar_name<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    threshold: usize,
) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;

    for candidate in candidates {
        if candidate == name || candidate.len().abs_diff(name.len()) > threshold {
            continue;
        }
        let distance = levenshtein_distance(name, candidate);
        if distance <= threshold && best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Inline "did you mean" suffix for an unknown-name message
pub fn format_suggestion_hint(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(name) => format!("; did you mean `{name}`?"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein_distance("count", "count"), 0);
    }

    #[test]
    fn test_levenshtein_single_edit() {
        assert_eq!(levenshtein_distance("count", "cont"), 1);
        assert_eq!(levenshtein_distance("resulti", "results"), 1);
    }

    #[test]
    fn test_levenshtein_multiple_edits() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_levenshtein_empty_strings() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_levenshtein_case_sensitive() {
        assert_eq!(levenshtein_distance("Main", "main"), 1);
    }

    #[test]
    fn test_find_similar_name_close() {
        assert_eq!(find_similar_name("cont", ["count", "total"], 2), Some("count"));
    }

    #[test]
    fn test_find_similar_name_prefers_closest() {
        assert_eq!(find_similar_name("abcd", ["abxy", "abcx"], 2), Some("abcx"));
    }

    #[test]
    fn test_find_similar_name_skips_itself() {
        assert_eq!(find_similar_name("x", ["x"], 2), None);
    }

    #[test]
    fn test_find_similar_name_none() {
        assert_eq!(find_similar_name("xyz", ["hello", "world"], 2), None);
    }

    #[test]
    fn test_format_suggestion_hint() {
        assert_eq!(format_suggestion_hint(Some("count")), "; did you mean `count`?");
        assert_eq!(format_suggestion_hint(None), "");
    }
}
