// /src/urc.rs
//
// Unsolicited result code records and decoders. Decoders are pure: a line
// either matches the fixed grammar or yields `None`, and the dispatcher
// logs and drops mismatches.

use heapless::String;

use crate::constants::{MAX_ALPHA_LENGTH, MAX_PHONE_LENGTH, MAX_TIMESTAMP_LENGTH};
use crate::custom_strings::{copy_truncated, extract_after_delimiter, quoted_fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallDirection {
    /// Mobile originated.
    Outgoing,
    /// Mobile terminated.
    Incoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallStatus {
    Active,
    Held,
    Dialing,
    Alerting,
    Incoming,
    Waiting,
    Disconnected,
}

impl CallStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => CallStatus::Active,
            1 => CallStatus::Held,
            2 => CallStatus::Dialing,
            3 => CallStatus::Alerting,
            4 => CallStatus::Incoming,
            5 => CallStatus::Waiting,
            6 => CallStatus::Disconnected,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            CallStatus::Active => 0,
            CallStatus::Held => 1,
            CallStatus::Dialing => 2,
            CallStatus::Alerting => 3,
            CallStatus::Incoming => 4,
            CallStatus::Waiting => 5,
            CallStatus::Disconnected => 6,
        }
    }
}

/// One decoded `+CLCC:` call-status line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallRecord {
    pub index: u8,
    pub direction: CallDirection,
    pub status: CallStatus,
    pub mode: u8,
    pub multiparty: bool,
    pub number: String<MAX_PHONE_LENGTH>,
    pub number_type: u8,
    pub alpha: String<MAX_ALPHA_LENGTH>,
}

/// Origin of a received SMS: sender, service-center timestamp and the
/// storage index it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmsHeader {
    pub sender_number: String<MAX_PHONE_LENGTH>,
    pub timestamp: String<MAX_TIMESTAMP_LENGTH>,
    pub message_index: u32,
}

/// Decodes `+CLCC: <idx>,<dir>,<stat>,<mode>,<mpty>,"<number>",<type>[,"<alpha>"]`.
pub fn decode_clcc(line: &str) -> Option<CallRecord> {
    let rest = extract_after_delimiter(line, "+CLCC: ")?;
    let mut parts = rest.splitn(6, ',');

    let index: u8 = parts.next()?.trim().parse().ok()?;
    let direction = match parts.next()?.trim() {
        "0" => CallDirection::Outgoing,
        "1" => CallDirection::Incoming,
        _ => return None,
    };
    let status = CallStatus::from_code(parts.next()?.trim().parse().ok()?)?;
    let mode: u8 = parts.next()?.trim().parse().ok()?;
    let multiparty = match parts.next()?.trim() {
        "0" => false,
        "1" => true,
        _ => return None,
    };

    // `"<number>",<type>[,"<alpha>"]`
    let tail = parts.next()?;
    let tail = tail.strip_prefix('"')?;
    let (number, rest) = tail.split_once('"')?;
    let rest = rest.strip_prefix(',')?;
    let (type_str, alpha) = match rest.split_once(',') {
        Some((t, a)) => (t, a.trim().trim_matches('"')),
        None => (rest, ""),
    };
    let number_type: u8 = type_str.trim().parse().ok()?;

    Some(CallRecord {
        index,
        direction,
        status,
        mode,
        multiparty,
        number: copy_truncated(number),
        number_type,
        alpha: copy_truncated(alpha),
    })
}

/// Decodes the `+CMGR:` header line into `(sender_number, timestamp)`.
///
/// The sender is the first quoted field that is all digits (an optional
/// leading `+` allowed); the timestamp is the `dd/dd/dd,dd:dd:dd`-shaped
/// prefix of the last quoted field carrying one, which drops any trailing
/// zone suffix such as `+00`.
pub fn decode_cmgr(
    line: &str,
) -> Option<(String<MAX_PHONE_LENGTH>, String<MAX_TIMESTAMP_LENGTH>)> {
    let mut number: Option<&str> = None;
    let mut timestamp: Option<&str> = None;
    for field in quoted_fields(line) {
        if number.is_none() && is_msisdn(field) {
            number = Some(field);
        }
        if let Some(ts) = timestamp_prefix(field) {
            timestamp = Some(ts);
        }
    }
    Some((copy_truncated(number?), copy_truncated(timestamp?)))
}

fn is_msisdn(field: &str) -> bool {
    let digits = field.strip_prefix('+').unwrap_or(field);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn timestamp_prefix(field: &str) -> Option<&str> {
    let bytes = field.as_bytes();
    let mut i = 0;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'/') {
        i += 1;
    }
    if i == 0 || i >= bytes.len() || bytes[i] != b',' {
        return None;
    }
    i += 1;
    let time_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b':') {
        i += 1;
    }
    if i == time_start {
        return None;
    }
    Some(&field[..i])
}
