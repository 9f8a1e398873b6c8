//! serexpect: expect-style automation for serial byte streams
//!
//! serexpect drives interactive sessions over a duplex byte stream (typically
//! a serial port), in the spirit of the Unix `expect` utility: send input,
//! wait for output matching a pattern, repeat. A background thread drains the
//! transport continuously so the blocking, pattern-matching API on the
//! caller's thread never loses data while it deliberates.
//!
//! # Features
//!
//! - **Caller-owned transport**: you open and configure the serial port;
//!   the session reads, writes, and eventually closes it
//! - **Pattern matching**: exact strings, regex with captures, and per-line
//!   globs, with timeout and end-of-stream as matchable alternatives
//! - **Prompt synchronization**: detect an idle shell prompt without knowing
//!   its text, then install a unique, collision-resistant prompt
//! - **Streaming decode**: any encoding_rs label, with multi-byte sequences
//!   split across reads handled correctly
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use serexpect::{SerialTransport, Session, Wait};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let port = serialport::new("/dev/ttyUSB0", 115_200)
//!         .timeout(Duration::from_millis(100))
//!         .open()?;
//!
//!     let mut session = Session::builder()
//!         .timeout(Duration::from_secs(30))
//!         .open(Arc::new(SerialTransport::new(port)?))?;
//!
//!     // Find the shell and give it a prompt we can match reliably.
//!     session.init_linux_prompt(true, 1.0)?;
//!
//!     session.sendline("cat /proc/uptime")?;
//!     if session.prompt(Wait::Default)? {
//!         println!("uptime: {}", session.before());
//!     }
//!
//!     session.close()?;
//!     Ok(())
//! }
//! ```
//!
//! # Pattern Matching
//!
//! ```rust,no_run
//! use serexpect::{Pattern, Session, Wait};
//!
//! # fn example(mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
//! let patterns = [
//!     Pattern::exact("login: "),
//!     Pattern::regex(r"[Pp]assword: ")?,
//!     Pattern::Timeout,
//! ];
//!
//! match session.expect_any(&patterns, Wait::Default)?.pattern_index {
//!     0 => session.sendline("root")?,
//!     1 => session.sendline("hunter2")?,
//!     _ => return Err("no login prompt".into()),
//! };
//! # Ok(())
//! # }
//! ```
//!
//! # Reading Without Patterns
//!
//! [`Session::read_nonblocking`] returns whatever has arrived, up to a size
//! and a timeout, without ever blocking past the budget; an empty result just
//! means the line was quiet. [`Session::read_valid`] layers a retry loop on
//! top and fails with a timeout when nothing arrives at all.

#![warn(missing_docs)]

mod codec;
mod distance;
mod pattern;
mod result;
mod session;
mod transport;

// Public API exports
pub use codec::{strip_ansi, CodecErrors};
pub use distance::levenshtein;
pub use pattern::{Match, Matcher, Pattern};
pub use result::{ExpectError, MatchResult, PatternError};
pub use session::{Session, SessionBuilder, Wait, PROMPT_SET_CSH, PROMPT_SET_SH, UNIQUE_PROMPT};
pub use transport::{SerialTransport, Transport};

// Re-export so callers can open ports without naming the crate themselves.
pub use serialport;
