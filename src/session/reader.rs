//! Background reader thread

use std::io;
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};

use bytes::Bytes;
use crossbeam_channel::Sender;

use crate::transport::Transport;

/// Spawn the background reader for a session.
///
/// The thread loops on blocking transport reads and forwards each non-empty
/// chunk through the channel, in arrival order. It does no decoding, no
/// buffering, and no matching. It ends when the transport reports end of
/// stream or fails, or when the receiving session has been dropped; dropping
/// the sender on exit is the end-of-stream sentinel the session observes.
///
/// Transport errors are logged, never propagated. The caller learns of them
/// only as an eventual EOF.
pub(crate) fn spawn(
    transport: Arc<dyn Transport>,
    chunks: Sender<Bytes>,
    maxread: usize,
) -> io::Result<JoinHandle<()>> {
    Builder::new()
        .name("serexpect-reader".into())
        .spawn(move || read_incoming(&*transport, &chunks, maxread))
}

fn read_incoming(transport: &dyn Transport, chunks: &Sender<Bytes>, maxread: usize) {
    let mut buf = vec![0u8; maxread.max(1)];

    loop {
        match transport.read(&mut buf) {
            Ok(0) => {
                log::debug!("transport reached end of stream, reader exiting");
                return;
            }
            Ok(n) => {
                if chunks.send(Bytes::copy_from_slice(&buf[..n])).is_err() {
                    // Session dropped; nobody is listening anymore.
                    return;
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut
                        | io::ErrorKind::WouldBlock
                        | io::ErrorKind::Interrupted
                ) =>
            {
                // Serial read timeouts are routine, not end of stream.
                continue;
            }
            Err(e) => {
                log::warn!("transport read failed, treating as end of stream: {e}");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Transport returning a fixed script of read results.
    struct ScriptedTransport {
        script: Mutex<Vec<io::Result<Vec<u8>>>>,
        open: AtomicBool,
    }

    impl ScriptedTransport {
        fn new(script: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                script: Mutex::new(script),
                open: AtomicBool::new(true),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Ok(0);
            }
            match script.remove(0) {
                Ok(data) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                Err(e) => Err(e),
            }
        }

        fn write(&self, data: &[u8]) -> io::Result<usize> {
            Ok(data.len())
        }

        fn is_open(&self) -> bool {
            self.open.load(Ordering::Relaxed)
        }

        fn close(&self) -> io::Result<()> {
            self.open.store(false, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn test_chunks_arrive_in_order_then_channel_disconnects() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(b"first".to_vec()),
            Ok(b"second".to_vec()),
        ]));
        let (tx, rx) = unbounded();

        let handle = spawn(transport, tx, 64).unwrap();
        handle.join().unwrap();

        assert_eq!(rx.recv().unwrap(), Bytes::from_static(b"first"));
        assert_eq!(rx.recv().unwrap(), Bytes::from_static(b"second"));
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_timed_out_reads_are_retried() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(io::Error::new(io::ErrorKind::TimedOut, "serial timeout")),
            Ok(b"data".to_vec()),
        ]));
        let (tx, rx) = unbounded();

        spawn(transport, tx, 64).unwrap().join().unwrap();

        assert_eq!(rx.recv().unwrap(), Bytes::from_static(b"data"));
    }

    #[test]
    fn test_hard_errors_end_the_stream_silently() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(b"before".to_vec()),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "line dropped")),
            Ok(b"never seen".to_vec()),
        ]));
        let (tx, rx) = unbounded();

        spawn(transport, tx, 64).unwrap().join().unwrap();

        assert_eq!(rx.recv().unwrap(), Bytes::from_static(b"before"));
        assert!(rx.recv().is_err());
    }
}
