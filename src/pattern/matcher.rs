//! Pattern matcher implementations

use crate::result::PatternError;
use globset::{Glob, GlobMatcher as GlobsetMatcher};
use regex::Regex;

/// Result of a pattern match. Offsets are byte positions into the haystack.
#[derive(Debug, Clone)]
pub struct Match {
    /// Start of the match.
    pub start: usize,
    /// End of the match (exclusive).
    pub end: usize,
    /// Captured groups (regex only).
    pub captures: Vec<String>,
}

/// Trait for searching accumulated session output.
pub trait Matcher: Send + Sync {
    /// Find the first match in the haystack.
    fn find(&self, haystack: &str) -> Option<Match>;
}

/// Exact string matcher using Boyer-Moore-Horspool over the UTF-8 bytes.
///
/// A valid UTF-8 needle can only match at character boundaries, so the byte
/// offsets it reports are always safe to slice the haystack with.
pub struct ExactMatcher {
    needle: Vec<u8>,
    bad_char_table: [usize; 256],
}

impl ExactMatcher {
    /// Create a new exact matcher.
    pub fn new(needle: &str) -> Result<Self, PatternError> {
        let needle = needle.as_bytes().to_vec();

        if needle.is_empty() {
            return Err(PatternError::EmptyPattern);
        }

        let mut bad_char_table = [needle.len(); 256];
        for (i, &byte) in needle.iter().enumerate().take(needle.len() - 1) {
            bad_char_table[byte as usize] = needle.len() - 1 - i;
        }

        Ok(Self {
            needle,
            bad_char_table,
        })
    }
}

impl Matcher for ExactMatcher {
    fn find(&self, haystack: &str) -> Option<Match> {
        let hay = haystack.as_bytes();
        if hay.len() < self.needle.len() {
            return None;
        }

        let mut pos = 0;
        while pos + self.needle.len() <= hay.len() {
            if hay[pos..pos + self.needle.len()] == self.needle[..] {
                return Some(Match {
                    start: pos,
                    end: pos + self.needle.len(),
                    captures: vec![],
                });
            }

            let shift_char = hay[pos + self.needle.len() - 1];
            pos += self.bad_char_table[shift_char as usize];
        }

        None
    }
}

/// Regex matcher with capture-group extraction.
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Create a new regex matcher.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

impl Matcher for RegexMatcher {
    fn find(&self, haystack: &str) -> Option<Match> {
        let captures = self.regex.captures(haystack)?;
        let full_match = captures.get(0)?;

        let capture_strings = captures
            .iter()
            .flatten()
            .map(|c| c.as_str().to_string())
            .collect();

        Some(Match {
            start: full_match.start(),
            end: full_match.end(),
            captures: capture_strings,
        })
    }
}

/// Glob matcher applied line by line.
///
/// Console output is line-oriented, so a glob like `*login failed*` is
/// checked against each complete or partial line of the haystack. A match
/// spans the whole matching line.
pub struct GlobMatcher {
    matcher: GlobsetMatcher,
}

impl GlobMatcher {
    /// Create a new glob matcher.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let glob = Glob::new(pattern).map_err(|e| PatternError::InvalidGlob(e.to_string()))?;

        Ok(Self {
            matcher: glob.compile_matcher(),
        })
    }
}

impl Matcher for GlobMatcher {
    fn find(&self, haystack: &str) -> Option<Match> {
        let mut offset = 0;
        for line in haystack.split_inclusive('\n') {
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if self.matcher.is_match(trimmed) {
                return Some(Match {
                    start: offset,
                    end: offset + trimmed.len(),
                    captures: vec![],
                });
            }
            offset += line.len();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matcher_finds_needle() {
        let matcher = ExactMatcher::new("hello").unwrap();

        let result = matcher.find("world hello there").unwrap();
        assert_eq!(result.start, 6);
        assert_eq!(result.end, 11);
    }

    #[test]
    fn test_exact_matcher_not_found() {
        let matcher = ExactMatcher::new("missing").unwrap();
        assert!(matcher.find("this text does not contain it").is_none());
    }

    #[test]
    fn test_exact_matcher_at_start_and_end() {
        let matcher = ExactMatcher::new("end").unwrap();
        let result = matcher.find("end at the end").unwrap();
        assert_eq!(result.start, 0);
        assert_eq!(result.end, 3);
    }

    #[test]
    fn test_exact_matcher_first_occurrence_wins() {
        let matcher = ExactMatcher::new("test").unwrap();
        let result = matcher.find("test and test again").unwrap();
        assert_eq!(result.start, 0);
    }

    #[test]
    fn test_exact_matcher_rejects_empty_needle() {
        assert!(ExactMatcher::new("").is_err());
    }

    #[test]
    fn test_exact_matcher_utf8() {
        let matcher = ExactMatcher::new("hello 世界").unwrap();
        let haystack = "this is hello 世界 test";

        let result = matcher.find(haystack).unwrap();
        assert_eq!(&haystack[result.start..result.end], "hello 世界");
    }

    #[test]
    fn test_regex_matcher_basic() {
        let matcher = RegexMatcher::new(r"\d+").unwrap();

        let result = matcher.find("test 123 end").unwrap();
        assert_eq!(result.start, 5);
        assert_eq!(result.end, 8);
        assert_eq!(result.captures[0], "123");
    }

    #[test]
    fn test_regex_matcher_no_match() {
        let matcher = RegexMatcher::new(r"\d+").unwrap();
        assert!(matcher.find("no numbers here").is_none());
    }

    #[test]
    fn test_regex_matcher_with_captures() {
        let matcher = RegexMatcher::new(r"(\w+)@(\w+)").unwrap();

        let result = matcher.find("mail: user@example down").unwrap();
        assert_eq!(result.captures[0], "user@example");
        assert_eq!(result.captures[1], "user");
        assert_eq!(result.captures[2], "example");
    }

    #[test]
    fn test_regex_matcher_bracketed_prompt() {
        let matcher = RegexMatcher::new(r"\[SEREX\][\$\#] ").unwrap();

        let result = matcher.find("motd\r\n[SEREX]$ ").unwrap();
        assert_eq!(result.end, 15);
    }

    #[test]
    fn test_glob_matcher_matches_a_line() {
        let matcher = GlobMatcher::new("*failed*").unwrap();
        let haystack = "ok\r\nauth failed for user\r\nretry\r\n";

        let result = matcher.find(haystack).unwrap();
        assert_eq!(
            &haystack[result.start..result.end],
            "auth failed for user"
        );
    }

    #[test]
    fn test_glob_matcher_no_match() {
        let matcher = GlobMatcher::new("*failed*").unwrap();
        assert!(matcher.find("all good\r\nstill good\r\n").is_none());
    }

    #[test]
    fn test_glob_matcher_partial_trailing_line() {
        let matcher = GlobMatcher::new("login:*").unwrap();

        // The final line has no terminator yet; it still participates.
        let result = matcher.find("banner\r\nlogin: ").unwrap();
        assert_eq!(result.start, 8);
    }
}
