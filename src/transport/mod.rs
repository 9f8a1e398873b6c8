//! Byte-stream transport abstraction and the serial-port adapter

use std::io::{self, Read as _, Write as _};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serialport::SerialPort;

/// A duplex byte stream a session can drive.
///
/// The session never opens or configures the underlying device; the caller
/// hands in an already-open transport and the session reads, writes, and
/// eventually closes it.
///
/// Methods take `&self` because the handle is shared between the caller's
/// thread and the background reader thread; implementations synchronize
/// internally.
///
/// # Contract
///
/// - `read` blocks until data arrives and returns the number of bytes read.
///   `Ok(0)` means end of stream and the reader thread will stop. Transient
///   conditions (`TimedOut`, `WouldBlock`, `Interrupted`) are retried by the
///   reader; any other error ends the stream.
/// - `write` sends bytes and returns the count written.
/// - `close` must be idempotent.
pub trait Transport: Send + Sync {
    /// Blocking read into `buf`. `Ok(0)` signals end of stream.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write `data`, returning the number of bytes written.
    fn write(&self, data: &[u8]) -> io::Result<usize>;

    /// Whether the transport is still open.
    fn is_open(&self) -> bool;

    /// Close the transport. Closing twice is a no-op.
    fn close(&self) -> io::Result<()>;
}

/// [`Transport`] adapter over a pre-opened serial port.
///
/// The port handle is cloned into independent reader and writer halves so a
/// blocked read never starves a write. The port must be configured with a
/// read timeout (serialport requires one to open); the reader thread treats
/// those timeouts as "no data yet" and re-checks the open flag, which is how
/// `close` takes effect without signalling the thread.
///
/// # Examples
///
/// ```no_run
/// use serexpect::{SerialTransport, Session};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let port = serialport::new("/dev/ttyUSB0", 115_200)
///     .timeout(Duration::from_millis(100))
///     .open()?;
///
/// let transport = Arc::new(SerialTransport::new(port)?);
/// let session = Session::builder().open(transport)?;
/// # Ok(())
/// # }
/// ```
pub struct SerialTransport {
    reader: Mutex<Option<Box<dyn SerialPort>>>,
    writer: Mutex<Option<Box<dyn SerialPort>>>,
    open: AtomicBool,
}

impl SerialTransport {
    /// Wrap an open serial port.
    ///
    /// # Errors
    ///
    /// Fails if the handle cannot be cloned into a second half.
    pub fn new(port: Box<dyn SerialPort>) -> serialport::Result<Self> {
        let writer = port.try_clone()?;

        Ok(Self {
            reader: Mutex::new(Some(port)),
            writer: Mutex::new(Some(writer)),
            open: AtomicBool::new(true),
        })
    }

    fn poisoned() -> io::Error {
        io::Error::other("serial transport lock poisoned")
    }
}

impl Transport for SerialTransport {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut guard = self.reader.lock().map_err(|_| Self::poisoned())?;

        if !self.open.load(Ordering::Acquire) {
            // Drop our half so the OS handle is released promptly.
            guard.take();
            return Ok(0);
        }

        match guard.as_mut() {
            Some(port) => port.read(buf),
            None => Ok(0),
        }
    }

    fn write(&self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self.writer.lock().map_err(|_| Self::poisoned())?;

        match guard.as_mut() {
            Some(port) => {
                let n = port.write(data)?;
                port.flush()?;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "serial port is closed",
            )),
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn close(&self) -> io::Result<()> {
        if !self.open.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        // The reader half is dropped by the reader thread on its next
        // timed-out read; taking it here would block on a read in flight.
        let mut guard = self.writer.lock().map_err(|_| Self::poisoned())?;
        guard.take();
        log::debug!("serial transport closed");
        Ok(())
    }
}
