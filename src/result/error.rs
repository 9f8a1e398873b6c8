//! Error types for serexpect

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while driving a session.
///
/// Most methods return `Result<T, ExpectError>`. The two conditions a caller
/// usually wants to branch on, `Timeout` and `Eof`, can alternatively be
/// consumed as successful matches by putting [`Pattern::Timeout`] or
/// [`Pattern::Eof`] into an `expect_any` pattern list.
///
/// [`Pattern::Timeout`]: crate::Pattern::Timeout
/// [`Pattern::Eof`]: crate::Pattern::Eof
///
/// # Examples
///
/// ```no_run
/// use serexpect::{ExpectError, Pattern, Session, Wait};
///
/// # fn example(mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
/// match session.expect(Pattern::exact("login: "), Wait::Default) {
///     Ok(result) => println!("matched: {}", result.matched),
///     Err(ExpectError::Timeout { duration }) => {
///         eprintln!("no login prompt after {:?}", duration);
///     }
///     Err(ExpectError::Eof) => {
///         eprintln!("line dropped");
///     }
///     Err(e) => return Err(e.into()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum ExpectError {
    /// No matching data arrived within the allotted budget.
    ///
    /// Raised by `expect`/`expect_any` when no pattern completes in time, and
    /// by `read_valid` when the transport stays silent for the whole window.
    #[error("timeout waiting for data (after {duration:?})")]
    Timeout {
        /// Duration that was waited before giving up.
        duration: Duration,
    },

    /// The transport is permanently exhausted and the pending buffer is drained.
    ///
    /// Reader-thread I/O errors are logged and swallowed; they surface to the
    /// caller only as an eventual `Eof`.
    #[error("end of file (transport exhausted)")]
    Eof,

    /// The transport handed to the builder was not open.
    #[error("transport is not open")]
    NotOpen,

    /// `prompt()` was called before any prompt pattern was configured.
    ///
    /// An unset prompt is a configuration error, never a default.
    #[error("no prompt pattern configured")]
    PromptNotSet,

    /// The encoding label given to the builder is not a known encoding.
    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// Incoming bytes could not be decoded under the strict codec policy.
    #[error("malformed {encoding} byte sequence in incoming data")]
    Decode {
        /// Name of the encoding that rejected the input.
        encoding: &'static str,
    },

    /// Outgoing text is not representable in the session encoding (strict
    /// codec policy only).
    #[error("text not representable in {encoding}")]
    Encode {
        /// Name of the encoding that rejected the text.
        encoding: &'static str,
    },

    /// Two consecutive idle round trips did not converge on a stable prompt.
    ///
    /// The session is closed before this is returned; a desynchronized
    /// session is unsafe to keep open.
    #[error("could not synchronize with original prompt")]
    SyncFailed,

    /// The remote shell never echoed the unique prompt we tried to install.
    ///
    /// Carries the last-observed output and the pattern that was expected,
    /// for diagnosis. The session is closed before this is returned.
    #[error("could not set prompt (expected {expected:?}, last saw {seen:?})")]
    PromptSetFailed {
        /// Output observed while waiting for the new prompt.
        seen: String,
        /// The prompt pattern that was expected to match.
        expected: String,
    },

    /// Invalid pattern.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    /// I/O error on the caller's side of the transport (send, close, logfile).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to pattern creation.
#[derive(Error, Debug)]
pub enum PatternError {
    /// Invalid regex pattern.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// Invalid glob pattern.
    #[error("invalid glob: {0}")]
    InvalidGlob(String),

    /// Empty pattern.
    #[error("pattern cannot be empty")]
    EmptyPattern,

    /// A special pattern (`Eof`, `Timeout`) used where a text matcher is required.
    #[error("special pattern has no text matcher")]
    NotMatchable,
}
