//! Shared test transport: an in-memory serial port stand-in

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Condvar, Mutex};

use serexpect::Transport;

/// What a `FakeSerial` does when the session writes to it.
enum OnWrite {
    /// Swallow writes.
    Silent,
    /// Queue a fixed byte string as the response to every write.
    Echo(Vec<u8>),
    /// Queue the next scripted response per write; later writes get nothing.
    Script(VecDeque<Vec<u8>>),
}

struct State {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
    on_write: OnWrite,
    open: bool,
    close_calls: usize,
}

/// In-memory transport with real blocking-read semantics.
///
/// `read` blocks on a condvar until bytes are available or the port is
/// closed, mirroring a serial port with no data on the line. Responses can be
/// preloaded, pushed externally, or produced in reaction to writes.
pub struct FakeSerial {
    state: Mutex<State>,
    data_ready: Condvar,
}

impl FakeSerial {
    pub fn new() -> Self {
        Self::with_behavior(OnWrite::Silent)
    }

    /// Respond to every write by queueing `literal` for reading back.
    pub fn echoing(literal: &[u8]) -> Self {
        Self::with_behavior(OnWrite::Echo(literal.to_vec()))
    }

    /// Respond to the n-th write by queueing the n-th entry of `responses`.
    pub fn scripted<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self::with_behavior(OnWrite::Script(responses.into_iter().collect()))
    }

    fn with_behavior(on_write: OnWrite) -> Self {
        // Surface session log output under `RUST_LOG=... cargo test`.
        let _ = env_logger::builder().is_test(true).try_init();

        Self {
            state: Mutex::new(State {
                incoming: VecDeque::new(),
                written: Vec::new(),
                on_write,
                open: true,
                close_calls: 0,
            }),
            data_ready: Condvar::new(),
        }
    }

    /// Make bytes available for the reader thread, as if they arrived on the
    /// line.
    pub fn push(&self, bytes: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.incoming.extend(bytes.iter().copied());
        self.data_ready.notify_all();
    }

    /// Number of times `close` actually closed the port.
    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }

    /// Everything the session has written so far.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().written.clone()
    }
}

impl Transport for FakeSerial {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        loop {
            if !state.incoming.is_empty() {
                let n = buf.len().min(state.incoming.len());
                for slot in buf.iter_mut().take(n) {
                    *slot = state.incoming.pop_front().unwrap();
                }
                return Ok(n);
            }
            if !state.open {
                return Ok(0);
            }
            state = self.data_ready.wait(state).unwrap();
        }
    }

    fn write(&self, data: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if !state.open {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "fake serial is closed",
            ));
        }

        state.written.extend_from_slice(data);

        let response = match &mut state.on_write {
            OnWrite::Silent => None,
            OnWrite::Echo(literal) => Some(literal.clone()),
            OnWrite::Script(queue) => queue.pop_front(),
        };
        if let Some(bytes) = response {
            state.incoming.extend(bytes);
            self.data_ready.notify_all();
        }

        Ok(data.len())
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    fn close(&self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.open {
            state.open = false;
            state.close_calls += 1;
            self.data_ready.notify_all();
        }
        Ok(())
    }
}
