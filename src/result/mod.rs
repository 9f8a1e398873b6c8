//! Result types for expect operations

mod error;

pub use error::{ExpectError, PatternError};

/// Result of a successful pattern match.
///
/// Contains the matched text, the text that arrived before it, and any
/// captured groups when the pattern was a regex.
///
/// # Examples
///
/// ```no_run
/// use serexpect::{Pattern, Session, Wait};
///
/// # fn example(mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
/// session.sendline("uptime")?;
/// let result = session.expect(Pattern::exact("$ "), Wait::Default)?;
///
/// // Everything the command printed before the prompt came back.
/// println!("uptime output: {}", result.before);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Index of the pattern that matched (for `expect_any`).
    ///
    /// When matching against multiple patterns this is the 0-based index into
    /// the pattern list. For `expect` with a single pattern it is always 0.
    pub pattern_index: usize,

    /// The matched text.
    ///
    /// Empty when a special alternative (`Pattern::Timeout`, `Pattern::Eof`)
    /// is what completed.
    pub matched: String,

    /// Text that arrived before the match.
    ///
    /// This is usually the interesting part when scraping command output:
    /// send a command, expect the prompt, and read the output from `before`.
    pub before: String,

    /// Captured groups (regex patterns only).
    ///
    /// Index 0 is the full match, followed by each capture group. Empty for
    /// non-regex patterns.
    pub captures: Vec<String>,
}
