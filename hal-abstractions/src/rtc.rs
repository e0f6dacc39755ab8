//! RTC peripheral: calendar, alarm A and write protection
//!
//! Calendar words use the packed-decimal layouts below, one field per byte:
//!
//! ```text
//! time:  0x00HHMMSS
//! date:  0xWWDDMMYY   (YY is the offset from 2000)
//! alarm: 0x00HHMMSS
//! ```
//!
//! Every mutating method requires write protection to be lifted first and,
//! for the calendar and prescalers, the peripheral to be in init mode.

/// Hour notation of the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormat {
    /// 24 hour notation
    TwentyFour,
    /// AM/PM notation
    AmPm,
}

/// Calendar prescalers: `f_ck_spre = f_rtcclk / ((asynchronous + 1) * (synchronous + 1))`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Prescalers {
    /// 7-bit asynchronous divider
    pub asynchronous: u8,
    /// 15-bit synchronous divider
    pub synchronous: u16,
}

/// RTC register interface
pub trait RtcPeripheral {
    /// Write the unlock key sequence to the write protection register
    fn disable_write_protection(&mut self);

    /// Write an invalid key, locking the registers again
    fn enable_write_protection(&mut self);

    /// Request (`true`) or leave (`false`) initialization mode
    fn request_init_mode(&mut self, enter: bool);

    /// Whether the calendar is stopped and writable
    fn is_init_mode(&self) -> bool;

    /// Set hour format and prescalers (init mode only)
    fn configure(&mut self, format: HourFormat, prescalers: Prescalers);

    /// Whether calendar reads bypass the shadow registers
    fn is_shadow_bypass_enabled(&self) -> bool;

    /// Clear the registers-synchronized flag
    fn clear_registers_synced(&mut self);

    /// Whether the shadow registers hold a fresh copy of the calendar
    fn is_registers_synced(&self) -> bool;

    /// Current time word
    fn time_bcd(&self) -> u32;

    /// Current date word
    fn date_bcd(&self) -> u32;

    /// Load the time word (init mode only)
    fn set_time_bcd(&mut self, time: u32);

    /// Load the date word (init mode only)
    fn set_date_bcd(&mut self, date: u32);

    /// Alarm A hour/minute/second match fields
    fn alarm_time_bcd(&self) -> u32;

    /// Program alarm A hour/minute/second match fields
    fn set_alarm_time_bcd(&mut self, time: u32);

    /// Ignore (`true`) or compare (`false`) the date/weekday field of alarm A
    fn set_alarm_date_masked(&mut self, masked: bool);

    /// Arm or disarm alarm A
    fn set_alarm_enabled(&mut self, enabled: bool);

    /// Whether alarm A is armed
    fn is_alarm_enabled(&self) -> bool;

    /// Whether alarm A matched since the flag was last cleared
    fn is_alarm_flag_set(&self) -> bool;

    /// Clear the alarm A match flag
    fn clear_alarm_flag(&mut self);

    /// Enable or disable interrupt generation on alarm A match
    fn set_alarm_interrupt(&mut self, enabled: bool);

    /// Route alarm A to the RTC output pin (active low, open drain) or disconnect it
    fn set_alarm_output(&mut self, enabled: bool);
}
