//! # sim900a
//!
//! Async driver for SIM900A-class GSM modems over a serial link, generic
//! over any [`embedded_io_async`] transport. A background reader loop
//! turns unsolicited `+CMTI` (new SMS) and `+CLCC` (call status) lines
//! into [`EventHandler`] calls, while foreground operations (send/delete
//! SMS, hang up, merge a waiting call) own the link for their whole
//! command/response exchange and interleave safely with the loop.
//!
//! The crate never opens ports, plays audio or runs an executor; wire it
//! to a UART and spawn `run` as a task:
//!
//! ```rust,ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use sim900a::{CallRecord, CallStatus, EventHandler, Sim900, SmsHeader};
//!
//! struct Jukebox;
//!
//! impl EventHandler for Jukebox {
//!     async fn on_sms(&mut self, header: &SmsHeader, body: &str) {
//!         // react to "menu"/"song" commands, reply via driver.send_sms(...)
//!     }
//!     async fn on_call(&mut self, call: &CallRecord) -> bool {
//!         call.status == CallStatus::Incoming // pick up every caller
//!     }
//! }
//!
//! let driver: Sim900<CriticalSectionRawMutex, _> = Sim900::new(uart);
//! driver.init().await?;
//! // spawn driver.run(&mut Jukebox) alongside the application tasks
//! ```
#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

#[macro_use]
mod fmt;

pub mod constants;
mod custom_strings;
mod error;
mod line;
pub mod menu;
pub mod pdu;
mod sim900;
mod urc;

#[cfg(test)]
mod test_support;

pub use error::Error;
pub use sim900::{EventHandler, Sim900};
pub use urc::{CallDirection, CallRecord, CallStatus, SmsHeader, decode_clcc, decode_cmgr};
