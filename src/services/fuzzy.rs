//! String similarity scores on a 0 to 100 scale
//!
//! `ratio` is the normalized indel similarity of two whole strings.
//! `partial_ratio` slides the shorter string along the longer one and keeps
//! the best `ratio` of any alignment, so a query that appears almost verbatim
//! inside a long text scores near 100.

/// Length of the longest common subsequence of two character slices
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

fn indel_similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * (2 * lcs_len(a, b)) as f64 / total as f64
}

/// Similarity of two whole strings
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_similarity(&a, &b)
}

/// Best similarity of the shorter string against any aligned slice of the longer
///
/// # Examples
/// ```
/// use billbook_cli::services::fuzzy::partial_ratio;
/// assert_eq!(partial_ratio("widget", "a100 red widget acme"), 100.0);
/// ```
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let n = short.len();
    let mut best = 0.0f64;

    for window in alignment_windows(&long, n) {
        if window == short.as_slice() {
            return 100.0;
        }
        let score = indel_similarity(&short, window);
        if score > best {
            best = score;
        }
    }

    best
}

/// Every slice of `long` an `n`-character needle can align with
///
/// Full windows of length `n`, plus the shorter windows hanging off either
/// edge (`long[..1]` to `long[..n-1]` and `long[len-n+1..]` to `long[len-1..]`).
fn alignment_windows(long: &[char], n: usize) -> impl Iterator<Item = &[char]> {
    let len = long.len();
    let prefixes = (1..n.min(len + 1)).map(move |end| &long[..end]);
    let full = (0..=len.saturating_sub(n))
        .filter(move |_| n <= len)
        .map(move |start| &long[start..start + n]);
    let suffixes = (len.saturating_sub(n) + 1..len).map(move |start| &long[start..]);
    prefixes.chain(full).chain(suffixes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcs_len() {
        let a: Vec<char> = "abcde".chars().collect();
        let b: Vec<char> = "ace".chars().collect();
        assert_eq!(lcs_len(&a, &b), 3);
        assert_eq!(lcs_len(&a, &[]), 0);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("widget", "widget"), 100.0);
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        // lcs("kitten", "sitting") = 4, 2*4 / 13
        assert!((ratio("kitten", "sitting") - 61.538).abs() < 0.01);
    }

    #[test]
    fn test_partial_ratio_substring_is_perfect() {
        assert_eq!(partial_ratio("red", "a100 red widget"), 100.0);
        assert_eq!(partial_ratio("a100 red widget", "red"), 100.0);
    }

    #[test]
    fn test_partial_ratio_empty() {
        assert_eq!(partial_ratio("", "anything"), 0.0);
        assert_eq!(partial_ratio("", ""), 100.0);
    }

    #[test]
    fn test_partial_ratio_near_match() {
        let score = partial_ratio("widgte", "b200 blue widget");
        assert!(score > 80.0 && score < 100.0, "{}", score);
    }

    #[test]
    fn test_partial_ratio_edge_alignment() {
        // "xab" only overlaps the start of the text
        let score = partial_ratio("xab", "abzzzzzz");
        assert!((score - 80.0).abs() < 1e-9, "{}", score);
    }

    #[test]
    fn test_partial_ratio_unrelated() {
        assert!(partial_ratio("zzz", "a100 red widget") < 30.0);
    }

    #[test]
    fn test_alignment_windows_cover_edges() {
        let long: Vec<char> = "abcd".chars().collect();
        let windows: Vec<String> = alignment_windows(&long, 2)
            .map(|w| w.iter().collect())
            .collect();
        assert_eq!(windows, vec!["a", "ab", "bc", "cd", "d"]);
    }
}
