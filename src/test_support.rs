// /src/test_support.rs
//
// Scripted serial port for driver tests. Inbound bytes come from a queue
// the test preloads; each write captures the outgoing bytes and may queue
// one scripted reply, which models the strict command/response lockstep of
// the modem.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::task::Poll;

use embedded_io_async::{ErrorKind, ErrorType, Read, Write};

#[derive(Default)]
struct Inner {
    rx: VecDeque<u8>,
    replies: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
    eof_when_drained: bool,
}

/// Clonable handle; the driver consumes one clone while the test keeps
/// another to script replies and inspect writes.
#[derive(Clone, Default)]
pub struct MockPort(Rc<RefCell<Inner>>);

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preloads an unsolicited inbound line (CRLF appended).
    pub fn push_line(&self, line: &str) {
        let mut inner = self.0.borrow_mut();
        inner.rx.extend(line.as_bytes());
        inner.rx.extend(b"\r\n");
    }

    pub fn push_raw(&self, bytes: &[u8]) {
        self.0.borrow_mut().rx.extend(bytes);
    }

    /// Queues the raw bytes the port feeds back after the next write.
    pub fn enqueue_reply(&self, reply: &[u8]) {
        self.0.borrow_mut().replies.push_back(reply.to_vec());
    }

    /// After the inbound queue drains, reads report a closed link.
    pub fn close_when_drained(&self) {
        self.0.borrow_mut().eof_when_drained = true;
    }

    /// Every write call so far, in order.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.0.borrow().written.clone()
    }

    /// Written chunks rendered as strings, CRLF kept.
    pub fn written_strings(&self) -> Vec<String> {
        self.0
            .borrow()
            .written
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

impl ErrorType for MockPort {
    type Error = ErrorKind;
}

impl Read for MockPort {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorKind> {
        core::future::poll_fn(|cx| {
            let mut inner = self.0.borrow_mut();
            if let Some(byte) = inner.rx.pop_front() {
                buf[0] = byte;
                return Poll::Ready(Ok(1));
            }
            if inner.eof_when_drained {
                return Poll::Ready(Ok(0));
            }
            // Nothing scripted yet; stay pollable so timeouts can fire.
            cx.waker().wake_by_ref();
            Poll::Pending
        })
        .await
    }
}

impl Write for MockPort {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, ErrorKind> {
        let mut inner = self.0.borrow_mut();
        inner.written.push(buf.to_vec());
        if let Some(reply) = inner.replies.pop_front() {
            inner.rx.extend(reply);
        }
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }
}
