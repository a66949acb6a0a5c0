// /src/error.rs
use core::fmt;

/// Driver failure kinds.
///
/// Only `Transport` is fatal: the reader loop exits and the link is
/// considered gone. Everything else aborts the current operation and
/// leaves the driver usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The serial link failed or was closed.
    Transport,
    /// The modem answered `ERROR`. The operation is aborted, never retried.
    Modem,
    /// The expected response did not arrive within the operation deadline.
    Timeout,
    /// An outbound command line exceeded its buffer.
    BufferFull,
    /// No caller has been recorded yet.
    NoLastCaller,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::Transport => "serial link lost",
            Error::Modem => "modem reported ERROR",
            Error::Timeout => "no response within deadline",
            Error::BufferFull => "command line too long",
            Error::NoLastCaller => "no caller recorded",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Error {}
