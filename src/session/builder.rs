//! Session builder for configuration

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::codec::{CodecErrors, TextCodec};
use crate::result::ExpectError;
use crate::session::{reader, Session};
use crate::transport::Transport;

/// Default timeout for expect operations.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum chunk size for a single read, in characters.
const DEFAULT_MAXREAD: usize = 2000;

/// Default line separator appended by `sendline`.
const DEFAULT_LINESEP: &str = "\r\n";

/// Default text encoding for the transport byte stream.
const DEFAULT_ENCODING: &str = "utf-8";

/// Builder for configuring and opening sessions.
///
/// # Defaults
///
/// - Timeout: 30 seconds
/// - Max read size: 2000 characters
/// - Search window: unlimited
/// - Line separator: `"\r\n"`
/// - Encoding: UTF-8, replacement on malformed input
/// - ANSI stripping: disabled
/// - Logfile: none
///
/// # Examples
///
/// ```no_run
/// use serexpect::{SerialTransport, Session};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn example(transport: Arc<SerialTransport>) -> Result<(), Box<dyn std::error::Error>> {
/// let session = Session::builder()
///     .timeout(Duration::from_secs(60))
///     .maxread(4096)
///     .searchwindow(200)
///     .strip_ansi(true)
///     .open(transport)?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    timeout: Duration,
    maxread: usize,
    searchwindow: Option<usize>,
    linesep: String,
    encoding: String,
    codec_errors: CodecErrors,
    strip_ansi: bool,
    logfile: Option<Box<dyn Write + Send>>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    /// Create a new session builder with default configuration.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            maxread: DEFAULT_MAXREAD,
            searchwindow: None,
            linesep: DEFAULT_LINESEP.to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            codec_errors: CodecErrors::default(),
            strip_ansi: false,
            logfile: None,
        }
    }

    /// Set the default timeout for read and expect operations.
    ///
    /// Individual calls can override it via [`Wait`](crate::Wait).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of characters pulled per read attempt.
    pub fn maxread(mut self, size: usize) -> Self {
        self.maxread = size;
        self
    }

    /// Restrict pattern searches to the last `size` characters of
    /// accumulated output.
    ///
    /// Useful when a prompt always appears at the end of output and the
    /// output itself can be large.
    pub fn searchwindow(mut self, size: usize) -> Self {
        self.searchwindow = Some(size);
        self
    }

    /// Set the line separator `sendline` appends (default `"\r\n"`).
    ///
    /// Encoded once, at open time, in the session encoding.
    pub fn linesep(mut self, sep: impl Into<String>) -> Self {
        self.linesep = sep.into();
        self
    }

    /// Set the text encoding label for the byte stream (default `"utf-8"`).
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    /// Set the policy for undecodable bytes and unencodable text.
    pub fn codec_errors(mut self, policy: CodecErrors) -> Self {
        self.codec_errors = policy;
        self
    }

    /// Strip ANSI escape sequences from decoded output before buffering.
    pub fn strip_ansi(mut self, strip: bool) -> Self {
        self.strip_ansi = strip;
        self
    }

    /// Attach a sink that receives the raw bytes of every send and the text
    /// of every read.
    pub fn logfile(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.logfile = Some(sink);
        self
    }

    /// Open a session over an already-open transport.
    ///
    /// Starts the background reader thread immediately; it runs for the
    /// session's lifetime.
    ///
    /// # Errors
    ///
    /// Fails with `NotOpen` if the transport reports closed, with
    /// `UnknownEncoding` for an unrecognized encoding label, or with an I/O
    /// error if the reader thread cannot be spawned.
    pub fn open(self, transport: Arc<dyn Transport>) -> Result<Session, ExpectError> {
        if !transport.is_open() {
            return Err(ExpectError::NotOpen);
        }

        let codec = TextCodec::new(&self.encoding, self.codec_errors)?;
        let linesep = codec.encode(&self.linesep)?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let reader = reader::spawn(Arc::clone(&transport), tx, self.maxread)?;

        Ok(Session {
            transport,
            chunks: rx,
            reader,
            codec,
            pending: String::new(),
            eof_seen: false,
            closed: false,
            timeout: self.timeout,
            maxread: self.maxread,
            searchwindow: self.searchwindow,
            strip_ansi: self.strip_ansi,
            linesep,
            prompt_patterns: Vec::new(),
            logfile: self.logfile,
            before: String::new(),
        })
    }
}
