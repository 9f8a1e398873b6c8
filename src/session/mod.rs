//! Session management over a byte-stream transport

mod builder;
mod prompt;
mod reader;

pub use builder::SessionBuilder;
pub use prompt::{PROMPT_SET_CSH, PROMPT_SET_SH, UNIQUE_PROMPT};

use std::io::Write as _;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam_channel::{Receiver, TryRecvError};

use crate::codec::{strip_ansi, TextCodec};
use crate::pattern::{Matcher, Pattern};
use crate::result::{ExpectError, MatchResult};
use crate::transport::Transport;

/// Sleep between polls while waiting for output to arrive.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Timeout selector for read and expect operations.
///
/// Mirrors the three timeout shapes the session API accepts: use the session
/// default, wait without bound, or wait for an explicit duration.
///
/// # Examples
///
/// ```
/// use serexpect::Wait;
/// use std::time::Duration;
///
/// let explicit: Wait = Duration::from_secs(5).into();
/// assert_eq!(explicit, Wait::For(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Wait {
    /// Use the session's configured default timeout.
    #[default]
    Default,
    /// Wait without bound (until data, a match, or end of stream).
    Unbounded,
    /// Wait at most this long.
    For(Duration),
}

impl From<Duration> for Wait {
    fn from(d: Duration) -> Self {
        Wait::For(d)
    }
}

/// An expect-style session over a caller-provided transport.
///
/// A `Session` bridges a background reader thread, which continuously drains
/// the transport into a channel, to a synchronous pattern-matching API on the
/// caller's thread. The caller opens the transport (typically a serial port
/// wrapped in [`SerialTransport`]) and hands it to [`SessionBuilder::open`].
///
/// [`SerialTransport`]: crate::SerialTransport
///
/// # Examples
///
/// ```no_run
/// use serexpect::{Pattern, SerialTransport, Session, Wait};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let port = serialport::new("/dev/ttyUSB0", 115_200)
///     .timeout(Duration::from_millis(100))
///     .open()?;
/// let mut session = Session::builder()
///     .timeout(Duration::from_secs(10))
///     .open(Arc::new(SerialTransport::new(port)?))?;
///
/// session.init_linux_prompt(true, 1.0)?;
/// session.sendline("uname -a")?;
/// if session.prompt(Wait::Default)? {
///     println!("{}", session.before());
/// }
/// session.close()?;
/// # Ok(())
/// # }
/// ```
pub struct Session {
    transport: Arc<dyn Transport>,
    chunks: Receiver<Bytes>,
    reader: JoinHandle<()>,
    codec: TextCodec,
    /// Decoded text not yet returned to the caller. Caller-thread only.
    pending: String,
    eof_seen: bool,
    closed: bool,
    timeout: Duration,
    maxread: usize,
    searchwindow: Option<usize>,
    strip_ansi: bool,
    linesep: Vec<u8>,
    prompt_patterns: Vec<Pattern>,
    logfile: Option<Box<dyn std::io::Write + Send>>,
    before: String,
}

impl Session {
    /// Create a new session builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Open a session over `transport` with default configuration.
    ///
    /// Shorthand for `Session::builder().open(transport)`.
    ///
    /// # Errors
    ///
    /// Fails with `NotOpen` if the transport is not open.
    pub fn open(transport: Arc<dyn Transport>) -> Result<Self, ExpectError> {
        SessionBuilder::new().open(transport)
    }

    /// Return up to `size` characters of decoded output within the timeout
    /// budget, without blocking past it.
    ///
    /// Drains whatever the background reader has already queued, decodes it,
    /// and slices up to `size` characters off the front of the pending
    /// buffer. An empty result means no data had arrived yet; it is not an
    /// error and not end of stream. At least one dequeue attempt is made even
    /// with a zero budget.
    ///
    /// Once end of stream has been observed, subsequent calls drain the
    /// remaining buffered text and then fail with [`ExpectError::Eof`].
    pub fn read_nonblocking(&mut self, size: usize, wait: Wait) -> Result<String, ExpectError> {
        if self.eof_seen {
            if self.pending.is_empty() {
                return Err(ExpectError::Eof);
            }
            let out = self.take_pending(size);
            self.log_read(&out)?;
            return Ok(out);
        }

        if size == 0 {
            return Ok(String::new());
        }

        let budget = self.resolve_wait(wait);
        let start = Instant::now();

        loop {
            match self.chunks.try_recv() {
                Ok(chunk) => {
                    let text = self.codec.decode(&chunk)?;
                    if self.strip_ansi {
                        self.pending.push_str(&strip_ansi(&text));
                    } else {
                        self.pending.push_str(&text);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // The reader thread exited; the stream is over for good.
                    self.eof_seen = true;
                    break;
                }
            }

            if char_count(&self.pending) >= size {
                break;
            }
            if let Some(budget) = budget {
                if start.elapsed() >= budget {
                    break;
                }
            }
        }

        let out = self.take_pending(size);
        self.log_read(&out)?;
        Ok(out)
    }

    /// Read until at least one character arrives, or fail with `Timeout`.
    ///
    /// [`read_nonblocking`] legitimately returns an empty string while the
    /// line is quiet; this wrapper retries it with a short sleep in between
    /// until text shows up or the budget elapses.
    ///
    /// [`read_nonblocking`]: Session::read_nonblocking
    pub fn read_valid(&mut self, size: usize, wait: Wait) -> Result<String, ExpectError> {
        let budget = self.resolve_wait(wait);
        let start = Instant::now();

        loop {
            let remaining = match budget {
                Some(b) => Wait::For(b.saturating_sub(start.elapsed())),
                None => Wait::Unbounded,
            };
            let text = self.read_nonblocking(size, remaining)?;
            if !text.is_empty() {
                return Ok(text);
            }
            if let Some(b) = budget {
                if start.elapsed() >= b {
                    return Err(ExpectError::Timeout { duration: b });
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Wait for a single pattern to appear in the output.
    ///
    /// See [`expect_any`] for the matching rules.
    ///
    /// [`expect_any`]: Session::expect_any
    pub fn expect(&mut self, pattern: Pattern, wait: Wait) -> Result<MatchResult, ExpectError> {
        self.expect_any(std::slice::from_ref(&pattern), wait)
    }

    /// Wait for any of the given patterns (first in list order wins).
    ///
    /// Repeatedly pulls decoded output and searches the accumulated window,
    /// restricted to the last `searchwindow` characters when one is
    /// configured. [`Pattern::Timeout`] and [`Pattern::Eof`] entries convert
    /// those conditions into successful matches instead of errors. Output
    /// after the match stays buffered for subsequent reads; no character is
    /// returned twice or dropped.
    ///
    /// [`before`] is set to the pre-match text at every exit, including
    /// timeout and end-of-stream exits.
    ///
    /// [`before`]: Session::before
    ///
    /// # Errors
    ///
    /// `Timeout` if nothing matches in time (and no `Pattern::Timeout` entry
    /// was given), `Eof` if the stream ends first (and no `Pattern::Eof`
    /// entry was given).
    pub fn expect_any(
        &mut self,
        patterns: &[Pattern],
        wait: Wait,
    ) -> Result<MatchResult, ExpectError> {
        let mut matchers: Vec<(usize, Box<dyn Matcher>)> = Vec::new();
        let mut eof_index = None;
        let mut timeout_index = None;

        for (idx, pattern) in patterns.iter().enumerate() {
            match pattern {
                Pattern::Eof => {
                    eof_index.get_or_insert(idx);
                }
                Pattern::Timeout => {
                    timeout_index.get_or_insert(idx);
                }
                _ => matchers.push((idx, pattern.to_matcher()?)),
            }
        }

        let budget = self.resolve_wait(wait);
        let start = Instant::now();
        let mut window = String::new();

        loop {
            let base = self.search_base(&window);
            for (idx, matcher) in &matchers {
                if let Some(m) = matcher.find(&window[base..]) {
                    let abs_start = base + m.start;
                    let abs_end = base + m.end;
                    let before = window[..abs_start].to_string();
                    let matched = window[abs_start..abs_end].to_string();

                    // Anything after the match is unconsumed input.
                    self.pending.insert_str(0, &window[abs_end..]);
                    self.before = before.clone();

                    return Ok(MatchResult {
                        pattern_index: *idx,
                        matched,
                        before,
                        captures: m.captures,
                    });
                }
            }

            if let Some(b) = budget {
                if start.elapsed() >= b {
                    self.before = window.clone();
                    if let Some(idx) = timeout_index {
                        return Ok(MatchResult {
                            pattern_index: idx,
                            matched: String::new(),
                            before: window,
                            captures: vec![],
                        });
                    }
                    // Keep the unmatched output for later reads.
                    self.pending.insert_str(0, &window);
                    return Err(ExpectError::Timeout { duration: b });
                }
            }

            let remaining = match budget {
                Some(b) => Wait::For(b.saturating_sub(start.elapsed())),
                None => Wait::Unbounded,
            };
            match self.read_nonblocking(self.maxread, remaining) {
                Ok(text) if text.is_empty() => thread::sleep(POLL_INTERVAL),
                Ok(text) => window.push_str(&text),
                Err(ExpectError::Eof) => {
                    self.before = window.clone();
                    if let Some(idx) = eof_index {
                        return Ok(MatchResult {
                            pattern_index: idx,
                            matched: String::new(),
                            before: window,
                            captures: vec![],
                        });
                    }
                    self.pending.insert_str(0, &window);
                    return Err(ExpectError::Eof);
                }
                Err(e) => {
                    // Same accounting as the Timeout/Eof exits: nothing that
                    // was received gets lost to the error.
                    self.before = window.clone();
                    self.pending.insert_str(0, &window);
                    return Err(e);
                }
            }
        }
    }

    /// Write text to the transport, returning the number of bytes written.
    pub fn send(&mut self, s: &str) -> Result<usize, ExpectError> {
        let bytes = self.codec.encode(s)?;
        self.send_bytes(&bytes)
    }

    /// Write text followed by the line separator, as a single transport write.
    pub fn sendline(&mut self, s: &str) -> Result<usize, ExpectError> {
        let mut bytes = self.codec.encode(s)?;
        bytes.extend_from_slice(&self.linesep);
        self.send_bytes(&bytes)
    }

    /// Write text to the transport, discarding the byte count.
    pub fn write(&mut self, s: &str) -> Result<(), ExpectError> {
        self.send(s).map(|_| ())
    }

    /// Call [`write`](Session::write) for each item in sequence.
    ///
    /// No line separators are added.
    pub fn writelines<I, S>(&mut self, lines: I) -> Result<(), ExpectError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.write(line.as_ref())?;
        }
        Ok(())
    }

    /// Set a single prompt pattern as the active match target.
    pub fn set_prompt(&mut self, pattern: Pattern) {
        self.prompt_patterns = vec![pattern];
    }

    /// Set an ordered list of prompt patterns as the active match target.
    pub fn set_prompts(&mut self, patterns: Vec<Pattern>) {
        self.prompt_patterns = patterns;
    }

    /// The active prompt pattern list. Empty until configured.
    pub fn get_prompt(&self) -> &[Pattern] {
        &self.prompt_patterns
    }

    /// Text that arrived before the most recent expect match (or before its
    /// timeout/EOF exit).
    pub fn before(&self) -> &str {
        &self.before
    }

    /// Check whether the session is usable: transport open and reader thread
    /// running.
    pub fn isalive(&self) -> bool {
        self.transport.is_open() && !self.reader.is_finished()
    }

    /// Close the transport.
    ///
    /// Idempotent: closing an already-closed session does nothing. The reader
    /// thread is not signalled; it observes the closed transport on its next
    /// read and exits on its own.
    pub fn close(&mut self) -> Result<(), ExpectError> {
        if self.closed || !self.transport.is_open() {
            return Ok(());
        }
        if let Some(logfile) = &mut self.logfile {
            logfile.flush()?;
        }
        self.transport.close()?;
        self.closed = true;
        Ok(())
    }

    fn resolve_wait(&self, wait: Wait) -> Option<Duration> {
        match wait {
            Wait::Default => Some(self.timeout),
            Wait::Unbounded => None,
            Wait::For(d) => Some(d),
        }
    }

    /// Slice up to `size` characters off the front of the pending buffer.
    fn take_pending(&mut self, size: usize) -> String {
        let split = self
            .pending
            .char_indices()
            .nth(size)
            .map(|(i, _)| i)
            .unwrap_or(self.pending.len());
        let rest = self.pending.split_off(split);
        std::mem::replace(&mut self.pending, rest)
    }

    /// Byte offset where the search window starts: the whole window, or its
    /// last `searchwindow` characters.
    fn search_base(&self, window: &str) -> usize {
        match self.searchwindow {
            Some(w) => {
                let count = char_count(window);
                if count <= w {
                    0
                } else {
                    window
                        .char_indices()
                        .nth(count - w)
                        .map(|(i, _)| i)
                        .unwrap_or(0)
                }
            }
            None => 0,
        }
    }

    fn send_bytes(&mut self, bytes: &[u8]) -> Result<usize, ExpectError> {
        log::trace!("send: {} bytes", bytes.len());
        if let Some(logfile) = &mut self.logfile {
            logfile.write_all(bytes)?;
            logfile.flush()?;
        }
        Ok(self.transport.write(bytes)?)
    }

    fn log_read(&mut self, text: &str) -> Result<(), ExpectError> {
        if text.is_empty() {
            return Ok(());
        }
        log::trace!("read: {} chars", text.chars().count());
        if let Some(logfile) = &mut self.logfile {
            logfile.write_all(text.as_bytes())?;
            logfile.flush()?;
        }
        Ok(())
    }
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}
