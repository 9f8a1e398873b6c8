//! Pattern matching for expect operations

mod matcher;

pub use matcher::{Match, Matcher};

use crate::result::PatternError;
use regex::Regex;

/// Pattern types for matching session output.
///
/// # Pattern Types
///
/// - **Exact**: exact string matching using Boyer-Moore-Horspool
/// - **Regex**: full regular expression support with capture groups
/// - **Glob**: shell-style wildcards, applied per line of output
/// - **Eof**: special pattern matching end of stream
/// - **Timeout**: special pattern matching timeout expiry
///
/// The special patterns turn conditions that would otherwise be errors into
/// successful `expect_any` matches; `Timeout` is implicitly the last
/// alternative when matching the shell prompt via [`Session::prompt`].
///
/// [`Session::prompt`]: crate::Session::prompt
///
/// # Examples
///
/// ```
/// use serexpect::Pattern;
///
/// let p1 = Pattern::exact("login: ");
/// let p2 = Pattern::regex(r"\[SEREX\][\$\#] ").unwrap();
/// let p3 = Pattern::glob("*connection refused*");
/// let p4 = Pattern::Eof;
/// let p5 = Pattern::Timeout;
/// ```
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Exact string match (most efficient).
    Exact(String),

    /// Regular expression match, with capture groups reported in the
    /// `MatchResult`.
    Regex(Regex),

    /// Glob match (shell-style wildcards), checked against each line of
    /// output.
    Glob(String),

    /// Match end of stream instead of raising `ExpectError::Eof`.
    Eof,

    /// Match timeout expiry instead of raising `ExpectError::Timeout`.
    Timeout,
}

impl Pattern {
    /// Create an exact string pattern.
    pub fn exact(s: impl Into<String>) -> Self {
        Pattern::Exact(s.into())
    }

    /// Create a regex pattern.
    ///
    /// # Errors
    ///
    /// Fails if the pattern is not valid regex syntax.
    pub fn regex(pattern: &str) -> Result<Self, PatternError> {
        Ok(Pattern::Regex(Regex::new(pattern)?))
    }

    /// Create a glob pattern.
    pub fn glob(pattern: &str) -> Self {
        Pattern::Glob(pattern.to_string())
    }

    /// Compile this pattern into a matcher.
    ///
    /// # Errors
    ///
    /// Fails for malformed patterns and for the special `Eof`/`Timeout`
    /// patterns, which have no text matcher and are handled by the expect
    /// loop itself.
    pub fn to_matcher(&self) -> Result<Box<dyn Matcher>, PatternError> {
        use matcher::{ExactMatcher, GlobMatcher, RegexMatcher};

        match self {
            Pattern::Exact(s) => Ok(Box::new(ExactMatcher::new(s)?)),
            Pattern::Regex(r) => Ok(Box::new(RegexMatcher::new(r.as_str())?)),
            Pattern::Glob(g) => Ok(Box::new(GlobMatcher::new(g)?)),
            Pattern::Eof | Pattern::Timeout => Err(PatternError::NotMatchable),
        }
    }

    /// Check if this is a special pattern (`Eof`, `Timeout`).
    pub fn is_special(&self) -> bool {
        matches!(self, Pattern::Eof | Pattern::Timeout)
    }
}
