// /src/line.rs
//
// Line framing over the raw serial transport. The modem speaks CRLF-framed
// ASCII with one exception: the SMS body prompt `>` is emitted without a
// newline, so a `>` arriving at column 0 completes a line by itself.

use embassy_time::{Duration, Instant, with_timeout};
use embedded_io_async::{Read, Write};
use heapless::{String, Vec};

use crate::constants::{LINE_BUFFER_SIZE, OUT_LINE_BUFFER_SIZE};
use crate::error::Error;

pub(crate) enum LineEvent<'a> {
    None,
    Complete(&'a str),
    Overflow,
}

/// Incremental byte-to-line assembler with a fixed buffer.
pub(crate) struct LineReader {
    buf: [u8; LINE_BUFFER_SIZE],
    len: usize,
    overflowed: bool,
}

impl LineReader {
    pub(crate) const fn new() -> Self {
        Self {
            buf: [0; LINE_BUFFER_SIZE],
            len: 0,
            overflowed: false,
        }
    }

    /// Feeds one byte; yields a complete trimmed line when a terminator
    /// (or the bare prompt) is reached.
    pub(crate) fn push_byte(&mut self, byte: u8) -> LineEvent<'_> {
        if byte == b'\n' {
            if self.overflowed {
                // The rest of an overlong line; swallow it.
                self.overflowed = false;
                self.len = 0;
                return LineEvent::None;
            }
            let mut end = self.len;
            if end > 0 && self.buf[end - 1] == b'\r' {
                end -= 1;
            }
            self.len = 0;
            return match core::str::from_utf8(&self.buf[..end]) {
                Ok(line) => LineEvent::Complete(line.trim()),
                Err(_) => LineEvent::None,
            };
        }

        // The SMS prompt arrives without a newline.
        if byte == b'>' && self.len == 0 && !self.overflowed {
            return LineEvent::Complete(">");
        }

        if self.overflowed {
            return LineEvent::None;
        }

        if self.len < self.buf.len() {
            self.buf[self.len] = byte;
            self.len += 1;
            return LineEvent::None;
        }

        self.len = 0;
        self.overflowed = true;
        LineEvent::Overflow
    }
}

/// The one shared lane to the modem: transport plus the partially
/// assembled inbound line. Lives inside the driver mutex so ownership
/// hand-off between the reader loop and a foreground exchange can never
/// split a line.
pub(crate) struct LineChannel<T> {
    transport: T,
    reader: LineReader,
}

impl<T: Read + Write> LineChannel<T> {
    pub(crate) fn new(transport: T) -> Self {
        Self {
            transport,
            reader: LineReader::new(),
        }
    }

    /// Reads one whitespace-trimmed line, waiting at most `timeout`.
    ///
    /// `Ok(None)` means no complete line arrived in time; an empty string
    /// is a real (blank) line and callers keep waiting on it. `read()`
    /// returning zero bytes means the link is gone.
    pub(crate) async fn read_line(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<String<LINE_BUFFER_SIZE>>, Error> {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let mut byte = [0u8; 1];
            match with_timeout(deadline - now, self.transport.read(&mut byte)).await {
                Err(_) => return Ok(None),
                Ok(Ok(0)) => {
                    error!("serial transport closed");
                    return Err(Error::Transport);
                }
                Ok(Ok(_)) => match self.reader.push_byte(byte[0]) {
                    LineEvent::Complete(line) => {
                        let mut out: String<LINE_BUFFER_SIZE> = String::new();
                        let _ = out.push_str(line);
                        return Ok(Some(out));
                    }
                    LineEvent::Overflow => warn!("dropping overlong line"),
                    LineEvent::None => {}
                },
                Ok(Err(_)) => {
                    error!("serial read failed");
                    return Err(Error::Transport);
                }
            }
        }
    }

    /// Writes raw bytes, e.g. the Ctrl-Z terminator or a PDU payload.
    pub(crate) async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.transport
            .write_all(bytes)
            .await
            .map_err(|_| Error::Transport)?;
        self.transport.flush().await.map_err(|_| Error::Transport)
    }

    /// Writes one CRLF-terminated command or body line as a single
    /// transport write.
    pub(crate) async fn write_line(&mut self, line: &str) -> Result<(), Error> {
        let mut out: Vec<u8, OUT_LINE_BUFFER_SIZE> = Vec::new();
        out.extend_from_slice(line.as_bytes())
            .map_err(|_| Error::BufferFull)?;
        out.extend_from_slice(b"\r\n").map_err(|_| Error::BufferFull)?;
        self.write(&out).await
    }
}
