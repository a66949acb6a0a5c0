// /src/pdu.rs
//
// Minimal PDU-mode SMS encoding. Text mode is the main path; this encoder
// covers the raw-submit flow only and makes no attempt at 7-bit septet
// packing or multi-part messages.

use core::fmt::Write;

use heapless::String;

use crate::constants::{MAX_PHONE_LENGTH, PDU_BUFFER_SIZE};
use crate::error::Error;

/// Encodes a destination number and message into a hex PDU submit string.
///
/// Layout: default SMSC (`00`), address length in octets, international
/// type (`91`), semi-octet swapped digits (`F`-padded to even length),
/// PID/DCS `0000`, validity `A7`, payload length, then each character as
/// two hex digits.
pub fn encode_pdu(number: &str, message: &str) -> Result<String<PDU_BUFFER_SIZE>, Error> {
    let digits = number.strip_prefix('+').unwrap_or(number);

    let mut padded: String<{ MAX_PHONE_LENGTH + 1 }> = String::new();
    for c in digits.chars() {
        padded.push(c).map_err(|_| Error::BufferFull)?;
    }
    if padded.len() % 2 != 0 {
        padded.push('F').map_err(|_| Error::BufferFull)?;
    }

    let mut payload: String<PDU_BUFFER_SIZE> = String::new();
    for c in message.chars() {
        write!(payload, "{:02X}", c as u32).map_err(|_| Error::BufferFull)?;
    }

    let mut out: String<PDU_BUFFER_SIZE> = String::new();
    write!(out, "00{:02X}91", padded.len() / 2).map_err(|_| Error::BufferFull)?;
    for pair in padded.as_bytes().chunks(2) {
        write!(out, "{}{}", pair[1] as char, pair[0] as char).map_err(|_| Error::BufferFull)?;
    }
    write!(out, "0000A7{:02X}", payload.len() / 2).map_err(|_| Error::BufferFull)?;
    out.push_str(&payload).map_err(|_| Error::BufferFull)?;
    Ok(out)
}
