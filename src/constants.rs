// /src/constants.rs
pub const MAX_PHONE_LENGTH: usize = 20;
pub const MAX_ALPHA_LENGTH: usize = 16;
pub const MAX_TIMESTAMP_LENGTH: usize = 20;

pub const LINE_BUFFER_SIZE: usize = 128;
pub const CMD_BUFFER_SIZE: usize = 64;
/// Outbound line scratch: longest text-mode body plus CRLF.
pub const OUT_LINE_BUFFER_SIZE: usize = 192;
pub const SMS_BODY_SIZE: usize = 512;
pub const PDU_BUFFER_SIZE: usize = 400;

/// The SMS terminator in text and PDU mode.
pub const CTRL_Z: u8 = 0x1A;

/// How long the reader loop owns the channel per poll.
pub const POLL_INTERVAL_MS: u64 = 100;
/// Deadline for a plain command response (`OK`/`ERROR`).
pub const RESPONSE_TIMEOUT_MS: u64 = 5_000;
/// Deadline for SMS submission; the network leg can take seconds.
pub const SEND_TIMEOUT_MS: u64 = 10_000;
/// Deadline for the next `RING` of an incoming call.
pub const RING_TIMEOUT_MS: u64 = 15_000;

/// SMS catalog pages are padded to this many characters.
pub const SMS_PAGE_LENGTH: usize = 154;
pub const MAX_MENU_PAGES: usize = 8;
