//! Hardware abstraction traits for the RTC subsystem
//!
//! This crate defines traits that abstract over the clock tree, the RTC
//! peripheral, the backup domain and the interrupt lines the RTC subsystem
//! drives. BSPs implement these traits; `rtc-core` only ever talks to
//! hardware through them.
//!
//! ## Layout
//! - [`clock`]: LSE/LSI oscillators and RTC clock source selection
//! - [`rtc`]: calendar, alarm A and write protection of the RTC peripheral
//! - [`backup`]: battery-backed register bank and backup domain reset
//! - [`exti`]: external interrupt lines feeding the interrupt controller
//! - [`system`]: services the subsystem calls out to (indicator, debug port,
//!   log sink, restart)

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod backup;
pub mod clock;
pub mod exti;
pub mod rtc;
pub mod system;

pub use backup::BackupDomain;
pub use clock::{ClockControl, Oscillator, RtcClockSource};
pub use exti::{ExtiControl, ExtiLine};
pub use rtc::{HourFormat, Prescalers, RtcPeripheral};
pub use system::{
    DebugPort, FailureIndication, Indicator, LogLevel, LogSink, SerialId, SystemControl,
};

use embedded_hal::delay::DelayNs;

/// Everything the RTC subsystem needs from a board
///
/// Blanket-implemented for any type implementing all of the component
/// traits, so a BSP only implements the pieces.
pub trait RtcPlatform:
    ClockControl
    + RtcPeripheral
    + BackupDomain
    + ExtiControl
    + SystemControl
    + Indicator
    + DebugPort
    + LogSink
    + DelayNs
{
}

impl<T> RtcPlatform for T where
    T: ClockControl
        + RtcPeripheral
        + BackupDomain
        + ExtiControl
        + SystemControl
        + Indicator
        + DebugPort
        + LogSink
        + DelayNs
{
}
