// /src/sim900.rs
//
// SIM900A driver core. Two actors share the one serial lane: the reader
// loop (`run`) that turns unsolicited `+CMTI`/`+CLCC` lines into handler
// calls, and foreground command operations that own the channel mutex for
// their whole command/response exchange. While a foreground exchange holds
// the channel, background dispatch is simply suspended; unsolicited lines
// arriving mid-exchange are consumed and discarded by the sentinel matcher.

use core::fmt::Write as FmtWrite;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant};
use embedded_io_async::{Read, Write};
use heapless::String;

use crate::constants::{
    CMD_BUFFER_SIZE, CTRL_Z, MAX_PHONE_LENGTH, POLL_INTERVAL_MS, RESPONSE_TIMEOUT_MS,
    RING_TIMEOUT_MS, SEND_TIMEOUT_MS, SMS_BODY_SIZE,
};
use crate::custom_strings::{copy_truncated, trailing_integer};
use crate::error::Error;
use crate::line::LineChannel;
use crate::pdu::encode_pdu;
use crate::urc::{CallRecord, CallStatus, SmsHeader, decode_clcc, decode_cmgr};

const POLL_INTERVAL: Duration = Duration::from_millis(POLL_INTERVAL_MS);
const RESPONSE_TIMEOUT: Duration = Duration::from_millis(RESPONSE_TIMEOUT_MS);
const SEND_TIMEOUT: Duration = Duration::from_millis(SEND_TIMEOUT_MS);
const RING_TIMEOUT: Duration = Duration::from_millis(RING_TIMEOUT_MS);

/// Application hooks for unsolicited modem events.
///
/// Both hooks run on the reader-loop task. Returning `true` from
/// [`on_call`](EventHandler::on_call) answers the call when the event is an
/// incoming-call notification. The `HANDLES_*` consts gate whole
/// notification kinds: with `HANDLES_SMS == false` the driver never issues
/// the `AT+CMGR` read for a new-message notification.
pub trait EventHandler {
    const HANDLES_SMS: bool = true;
    const HANDLES_CALLS: bool = true;

    async fn on_sms(&mut self, _header: &SmsHeader, _body: &str) {}

    async fn on_call(&mut self, _call: &CallRecord) -> bool {
        false
    }
}

#[derive(Default)]
struct CallState {
    is_call_ongoing: bool,
    last_caller: Option<String<MAX_PHONE_LENGTH>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum WaitOutcome {
    Matched,
    ErrorSeen,
}

/// Reads lines until one contains `sentinel` as a substring, discarding
/// everything else (command echo, blank keep-alives, unrelated
/// notifications). A line containing `ERROR` short-circuits, even when it
/// arrives before the sentinel.
pub(crate) async fn wait_for<T: Read + Write>(
    chan: &mut LineChannel<T>,
    sentinel: &str,
    timeout: Duration,
) -> Result<WaitOutcome, Error> {
    let deadline = Instant::now() + timeout;
    loop {
        let now = Instant::now();
        if now >= deadline {
            warn!("gave up waiting for {}", sentinel);
            return Err(Error::Timeout);
        }
        match chan.read_line(deadline - now).await? {
            None => {
                warn!("gave up waiting for {}", sentinel);
                return Err(Error::Timeout);
            }
            Some(line) => {
                if line.contains("ERROR") {
                    return Ok(WaitOutcome::ErrorSeen);
                }
                if line.contains(sentinel) {
                    return Ok(WaitOutcome::Matched);
                }
                trace!("discarding line: {}", line.as_str());
            }
        }
    }
}

async fn expect<T: Read + Write>(
    chan: &mut LineChannel<T>,
    sentinel: &str,
    timeout: Duration,
) -> Result<(), Error> {
    match wait_for(chan, sentinel, timeout).await? {
        WaitOutcome::Matched => Ok(()),
        WaitOutcome::ErrorSeen => {
            error!("modem rejected command while waiting for {}", sentinel);
            Err(Error::Modem)
        }
    }
}

/// The driver. `run` is the background half; every other `async` method is
/// a foreground operation that owns the channel for its full exchange.
pub struct Sim900<M: RawMutex, T: Read + Write> {
    channel: Mutex<M, LineChannel<T>>,
    calls: Mutex<M, CallState>,
}

impl<M: RawMutex, T: Read + Write> Sim900<M, T> {
    /// Wraps an opened serial transport. Call [`init`](Self::init) before
    /// starting the reader loop.
    pub fn new(transport: T) -> Self {
        Self {
            channel: Mutex::new(LineChannel::new(transport)),
            calls: Mutex::new(CallState::default()),
        }
    }

    /// Puts the modem into the expected reporting modes: call status
    /// reporting (`AT+CLCC=1`), new-SMS notifications (`AT+CNMI`) and SMS
    /// text mode (`AT+CMGF=1`).
    pub async fn init(&self) -> Result<(), Error> {
        info!("initializing modem");
        let mut chan = self.channel.lock().await;
        for cmd in ["AT+CLCC=1", "AT+CNMI=2,1,0,0,0", "AT+CMGF=1"] {
            chan.write_line(cmd).await?;
            expect(&mut chan, "OK", RESPONSE_TIMEOUT).await?;
        }
        Ok(())
    }

    /// Sends a text-mode SMS.
    pub async fn send_sms(&self, number: &str, message: &str) -> Result<(), Error> {
        info!("sending SMS to {}", number);
        let mut chan = self.channel.lock().await;

        chan.write_line("AT+CMGF=1").await?;
        expect(&mut chan, "OK", RESPONSE_TIMEOUT).await?;

        let mut cmd: String<CMD_BUFFER_SIZE> = String::new();
        write!(cmd, "AT+CMGS=\"{}\"", number).map_err(|_| Error::BufferFull)?;
        chan.write_line(&cmd).await?;
        expect(&mut chan, ">", SEND_TIMEOUT).await?;

        chan.write_line(message).await?;
        // The body is echoed back; absorb one more prompt-or-echo line
        // before terminating the entry.
        expect(&mut chan, ">", SEND_TIMEOUT).await?;

        chan.write(&[CTRL_Z]).await?;
        expect(&mut chan, "OK", SEND_TIMEOUT).await
    }

    /// Sends a text-mode SMS to the caller most recently seen going
    /// active.
    pub async fn send_sms_to_last_caller(&self, message: &str) -> Result<(), Error> {
        let number = self.calls.lock().await.last_caller.clone();
        match number {
            Some(number) => self.send_sms(&number, message).await,
            None => Err(Error::NoLastCaller),
        }
    }

    /// Sends an SMS in PDU mode. The exchange ends at the payload write;
    /// the final `OK` is not collected.
    pub async fn send_sms_pdu(&self, number: &str, message: &str) -> Result<(), Error> {
        info!("sending PDU SMS to {}", number);
        let pdu = encode_pdu(number, message)?;

        let mut chan = self.channel.lock().await;
        chan.write_line("AT+CMGF=0").await?;
        expect(&mut chan, "OK", RESPONSE_TIMEOUT).await?;

        let mut cmd: String<CMD_BUFFER_SIZE> = String::new();
        write!(cmd, "AT+CMGS={}", pdu.len() / 2).map_err(|_| Error::BufferFull)?;
        chan.write_line(&cmd).await?;
        expect(&mut chan, ">", SEND_TIMEOUT).await?;

        chan.write(pdu.as_bytes()).await?;
        chan.write(&[CTRL_Z]).await
    }

    /// Deletes the stored message at `index`.
    pub async fn delete_sms(&self, index: u32) -> Result<(), Error> {
        let mut chan = self.channel.lock().await;
        let mut cmd: String<CMD_BUFFER_SIZE> = String::new();
        write!(cmd, "AT+CMGD={}", index).map_err(|_| Error::BufferFull)?;
        chan.write_line(&cmd).await?;
        expect(&mut chan, "OK", RESPONSE_TIMEOUT).await
    }

    /// Hangs up, if a call is ongoing.
    pub async fn hang_up(&self) -> Result<(), Error> {
        if !self.calls.lock().await.is_call_ongoing {
            return Ok(());
        }
        info!("hanging up");
        let mut chan = self.channel.lock().await;
        chan.write_line("ATH").await?;
        expect(&mut chan, "OK", RESPONSE_TIMEOUT).await
    }

    /// Swaps to the waiting call and merges it into the conversation.
    pub async fn add_waiting_call(&self) -> Result<(), Error> {
        info!("merging waiting call");
        let mut chan = self.channel.lock().await;
        chan.write_line("AT+CHLD=2").await?;
        expect(&mut chan, "OK", RESPONSE_TIMEOUT).await?;
        chan.write_line("AT+CHLD=3").await?;
        expect(&mut chan, "OK", RESPONSE_TIMEOUT).await
    }

    /// Whether a call is currently connected.
    pub async fn is_call_ongoing(&self) -> bool {
        self.calls.lock().await.is_call_ongoing
    }

    /// The number of the caller most recently seen going active.
    pub async fn last_caller(&self) -> Option<String<MAX_PHONE_LENGTH>> {
        self.calls.lock().await.last_caller.clone()
    }

    // Waits for the next RING before going off-hook.
    async fn answer_call(&self) -> Result<(), Error> {
        let mut chan = self.channel.lock().await;
        expect(&mut chan, "RING", RING_TIMEOUT).await?;
        chan.write_line("ATA").await?;
        expect(&mut chan, "OK", RESPONSE_TIMEOUT).await
    }

    /// Drives the background half: polls the channel for unsolicited
    /// lines and dispatches them to `handler` until the transport fails.
    /// There is no reconnect; the returned error is fatal.
    pub async fn run<H: EventHandler>(&self, handler: &mut H) -> Error {
        info!("reader loop started");
        loop {
            let result = {
                let mut chan = self.channel.lock().await;
                chan.read_line(POLL_INTERVAL).await
            };
            match result {
                Ok(Some(line)) => {
                    if let Err(e) = self.dispatch(&line, handler).await {
                        error!("reader loop terminated: {}", e);
                        return e;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!("reader loop terminated: {}", e);
                    return e;
                }
            }
        }
    }

    // Classifies one unsolicited line. Only transport loss propagates;
    // everything else is logged and dropped.
    async fn dispatch<H: EventHandler>(
        &self,
        line: &str,
        handler: &mut H,
    ) -> Result<(), Error> {
        if H::HANDLES_SMS && line.contains("+CMTI:") {
            match self.collect_sms(line).await {
                Ok(Some((header, body))) => {
                    let body = body.as_str();
                    let body = body.strip_suffix('\n').unwrap_or(body);
                    debug!("SMS from {} at index {}", header.sender_number.as_str(), header.message_index);
                    handler.on_sms(&header, body).await;
                }
                Ok(None) => {}
                Err(Error::Transport) => return Err(Error::Transport),
                Err(e) => warn!("sms retrieval aborted: {}", e),
            }
        } else if H::HANDLES_CALLS && line.contains("+CLCC: ") {
            let Some(record) = decode_clcc(line) else {
                warn!("unparseable call status line: {}", line);
                return Ok(());
            };
            let answer = handler.on_call(&record).await;

            {
                let mut calls = self.calls.lock().await;
                match record.status {
                    CallStatus::Active => {
                        calls.is_call_ongoing = true;
                        calls.last_caller = Some(record.number.clone());
                    }
                    CallStatus::Disconnected => calls.is_call_ongoing = false,
                    _ => {}
                }
            }

            if answer && record.status == CallStatus::Incoming {
                match self.answer_call().await {
                    Ok(()) => info!("answered call from {}", record.number.as_str()),
                    Err(Error::Transport) => return Err(Error::Transport),
                    Err(e) => warn!("auto-answer failed: {}", e),
                }
            }
        }
        Ok(())
    }

    // Reads the message a `+CMTI:` notification points at. Owns the
    // channel for the whole `AT+CMGR` exchange.
    async fn collect_sms(
        &self,
        cmti_line: &str,
    ) -> Result<Option<(SmsHeader, String<SMS_BODY_SIZE>)>, Error> {
        let Some(index) = trailing_integer(cmti_line) else {
            warn!("new-message notification without an index");
            return Ok(None);
        };

        let mut chan = self.channel.lock().await;
        let mut cmd: String<CMD_BUFFER_SIZE> = String::new();
        write!(cmd, "AT+CMGR={}", index).map_err(|_| Error::BufferFull)?;
        chan.write_line(&cmd).await?;

        let mut header: Option<_> = None;
        let mut header_seen = false;
        let mut body: String<SMS_BODY_SIZE> = String::new();
        loop {
            let Some(line) = chan.read_line(RESPONSE_TIMEOUT).await? else {
                return Err(Error::Timeout);
            };
            if line.is_empty() {
                continue;
            }
            if line.contains("AT+") {
                // Command echo.
                continue;
            }
            if line.contains("+CMGR: ") {
                if !header_seen {
                    header = decode_cmgr(&line);
                    header_seen = true;
                }
                continue;
            }
            if line.contains("OK") {
                break;
            }
            if body.len() + line.len() + 1 <= body.capacity() {
                let _ = body.push_str(&line);
                let _ = body.push('\n');
            } else {
                warn!("sms body full, dropping line");
            }
        }
        drop(chan);

        let header = match header {
            Some((sender_number, timestamp)) => SmsHeader {
                sender_number,
                timestamp,
                message_index: index,
            },
            // Header decode failed; deliver the body anyway.
            None => SmsHeader {
                sender_number: copy_truncated("0"),
                timestamp: String::new(),
                message_index: index,
            },
        };
        Ok(Some((header, body)))
    }
}
