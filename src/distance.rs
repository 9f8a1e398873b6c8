//! Levenshtein edit distance over character sequences

/// Compute the Levenshtein distance between two strings.
///
/// Unit cost for insertions, deletions, and substitutions, measured over
/// `char`s rather than bytes. Runs in O(n*m) time and O(min(n, m)) space;
/// the shorter string sizes the working row.
///
/// The prompt synchronizer uses this to decide whether two consecutive idle
/// round trips look like the same prompt.
///
/// # Examples
///
/// ```
/// use serexpect::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let (short, long): (Vec<char>, Vec<char>) = {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        if a.len() <= b.len() {
            (a, b)
        } else {
            (b, a)
        }
    };

    if short.is_empty() {
        return long.len();
    }

    // row[j] holds the distance between long[..i] and short[..j].
    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (i, &lc) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, &sc) in short.iter().enumerate() {
            let substitution = diagonal + usize::from(lc != sc);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }

    row[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_strings_have_zero_distance() {
        assert_eq!(levenshtein("prompt> ", "prompt> "), 0);
        assert_eq!(levenshtein("", ""), 0);
    }

    #[test]
    fn test_empty_against_nonempty_is_length() {
        assert_eq!(levenshtein("", "hello"), 5);
        assert_eq!(levenshtein("hello", ""), 5);
    }

    #[test]
    fn test_kitten_sitting() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(levenshtein("héllo", "hello"), 1);
        assert_eq!(levenshtein("世界", "世間"), 1);
    }

    #[test]
    fn test_single_edit_operations() {
        assert_eq!(levenshtein("abc", "abcd"), 1); // insert
        assert_eq!(levenshtein("abcd", "abc"), 1); // delete
        assert_eq!(levenshtein("abc", "axc"), 1); // substitute
    }

    proptest! {
        #[test]
        fn test_distance_to_self_is_zero(s in ".*") {
            prop_assert_eq!(levenshtein(&s, &s), 0);
        }

        #[test]
        fn test_distance_from_empty_is_char_count(s in ".*") {
            prop_assert_eq!(levenshtein("", &s), s.chars().count());
        }

        #[test]
        fn test_distance_is_symmetric(a in ".*", b in ".*") {
            prop_assert_eq!(levenshtein(&a, &b), levenshtein(&b, &a));
        }

        #[test]
        fn test_distance_bounded_by_longer_length(a in ".*", b in ".*") {
            let bound = a.chars().count().max(b.chars().count());
            prop_assert!(levenshtein(&a, &b) <= bound);
        }
    }
}
