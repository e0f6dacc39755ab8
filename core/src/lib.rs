//! Platform-agnostic RTC subsystem
//!
//! Brings up the low-speed oscillators, keeps a versioned bank of backup
//! registers holding persisted system configuration, converts calendar
//! registers to and from [`DateTime`], and delivers the wake alarm to a single
//! subscriber. All hardware access goes through the
//! [`hal_abstractions::RtcPlatform`] traits.
//!
//! ## Boot sequence
//! ```ignore
//! static INTERRUPTS: InterruptTable<'static> = InterruptTable::new();
//!
//! let rtc = RTC.init(Rtc::new(board, &INTERRUPTS));
//! rtc.init_early(); // clock up (recovering if needed), header verified
//! // ...
//! rtc.init();       // calendar prescalers, logging config replayed
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod alarm;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod datetime;
pub mod error;
pub mod interrupt;
pub mod registers;
pub mod rtc;

#[cfg(test)]
mod mock;

pub use alarm::{AlarmCallback, AlarmContext, AlarmSetting, AlarmState};
pub use clock::{ClockError, ClockSourceManager, ClockStatus};
pub use config::{
    BootMode, DateFormat, Flag, HeapTrackMode, LocaleUnits, LogBaudRate, LogDevice,
    SystemConfig, TimeFormat,
};
pub use datetime::{DateTime, DateTimeError};
pub use error::RtcError;
pub use interrupt::{InterruptHandler, InterruptId, InterruptTable};
pub use registers::{BackupRegisterStore, Register};
pub use rtc::Rtc;
