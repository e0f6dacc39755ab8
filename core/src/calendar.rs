//! Calendar register access
//!
//! Write protection, init mode and shadow register handling around the
//! packed-decimal calendar words.

use core::ops::{Deref, DerefMut};

use embedded_hal::delay::DelayNs;
use hal_abstractions::{HourFormat, Prescalers, RtcPeripheral};

use crate::datetime::{self, DateTime};
use crate::error::RtcError;

/// Prescalers dividing the 32.768 kHz LSE down to 1 Hz
pub const CALENDAR_PRESCALERS: Prescalers = Prescalers {
    asynchronous: 127,
    synchronous: 255,
};

/// Polls allowed for the calendar to stop after requesting init mode
pub const INIT_MODE_POLL_LIMIT: u32 = 1_000;

/// Polls allowed for the shadow registers to resynchronize
pub const SHADOW_SYNC_POLL_LIMIT: u32 = 1_000;

/// Write access to the RTC peripheral
///
/// Lifts write protection on construction and restores it on drop, so every
/// exit path leaves the peripheral protected.
pub struct WriteUnlocked<'a, P: RtcPeripheral> {
    hw: &'a mut P,
}

impl<'a, P: RtcPeripheral> WriteUnlocked<'a, P> {
    pub fn new(hw: &'a mut P) -> Self {
        hw.disable_write_protection();
        Self { hw }
    }
}

impl<P: RtcPeripheral> Deref for WriteUnlocked<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.hw
    }
}

impl<P: RtcPeripheral> DerefMut for WriteUnlocked<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.hw
    }
}

impl<P: RtcPeripheral> Drop for WriteUnlocked<'_, P> {
    fn drop(&mut self) {
        self.hw.enable_write_protection();
    }
}

/// Enter or leave init mode, waiting for the peripheral to acknowledge
fn set_init_mode<P: RtcPeripheral + DelayNs>(hw: &mut P, enter: bool) -> Result<(), RtcError> {
    hw.request_init_mode(enter);

    for _ in 0..INIT_MODE_POLL_LIMIT {
        if hw.is_init_mode() == enter {
            return Ok(());
        }
        hw.delay_us(1);
    }

    if hw.is_init_mode() == enter {
        Ok(())
    } else {
        error!("RTC init mode {=bool} not acknowledged", enter);
        Err(RtcError::InitModeTimeout)
    }
}

/// Run `f` with the calendar stopped
///
/// If the peripheral never acknowledges init mode, the request is withdrawn
/// so the calendar keeps running once it can.
fn with_init_mode<P, F>(hw: &mut P, f: F) -> Result<(), RtcError>
where
    P: RtcPeripheral + DelayNs,
    F: FnOnce(&mut P),
{
    let mut rtc = WriteUnlocked::new(hw);
    if let Err(e) = set_init_mode(&mut *rtc, true) {
        rtc.request_init_mode(false);
        return Err(e);
    }
    f(&mut *rtc);
    set_init_mode(&mut *rtc, false)
}

/// Wait for the shadow registers to latch the running calendar
///
/// No-op when shadow registers are bypassed.
pub fn sync_shadow<P: RtcPeripheral + DelayNs>(hw: &mut P) -> Result<(), RtcError> {
    if hw.is_shadow_bypass_enabled() {
        return Ok(());
    }

    WriteUnlocked::new(hw).clear_registers_synced();

    for _ in 0..SHADOW_SYNC_POLL_LIMIT {
        if hw.is_registers_synced() {
            return Ok(());
        }
        hw.delay_us(1);
    }

    if hw.is_registers_synced() {
        Ok(())
    } else {
        error!("RTC shadow registers did not resynchronize");
        Err(RtcError::ShadowSyncTimeout)
    }
}

/// Program 24 hour format and the 1 Hz prescalers
pub fn configure<P: RtcPeripheral + DelayNs>(hw: &mut P) -> Result<(), RtcError> {
    with_init_mode(hw, |rtc| {
        rtc.configure(HourFormat::TwentyFour, CALENDAR_PRESCALERS)
    })
}

pub fn read_datetime<P: RtcPeripheral>(hw: &P) -> DateTime {
    datetime::decode(hw.time_bcd(), hw.date_bcd())
}

/// Stop the calendar, load `value` and restart it
pub fn write_datetime<P: RtcPeripheral + DelayNs>(
    hw: &mut P,
    value: &DateTime,
) -> Result<(), RtcError> {
    let (time, date) = datetime::encode(value);

    with_init_mode(hw, |rtc| {
        rtc.set_time_bcd(time);
        rtc.set_date_bcd(date);
    })?;

    sync_shadow(hw)
}
