//! Low-speed oscillators and RTC clock source selection

/// Low-speed oscillator feeding the RTC domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// External 32.768 kHz crystal (precise)
    Lse,
    /// Internal RC oscillator (imprecise, always available)
    Lsi,
}

/// RTC clock source as selected in the backup domain control register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcClockSource {
    /// No clock, the reset value after a backup domain reset
    NoClock,
    /// External low-speed crystal
    Lse,
    /// Internal low-speed oscillator
    Lsi,
    /// High-speed external oscillator divided by 32
    HseDiv32,
}

/// Clock tree control for the backup domain
///
/// Selecting an RTC clock source is sticky on most parts: once a source is
/// set, hardware ignores further changes until a backup domain reset. Callers
/// must confirm a selection with [`ClockControl::rtc_clock_source`].
pub trait ClockControl {
    /// Unlock writes to the backup domain (RTC, clock selection, backup registers)
    fn enable_backup_access(&mut self);

    /// Enable the bus clock of the RTC register interface
    fn enable_rtc_bus_clock(&mut self);

    /// Start an oscillator. The LSE is started with high drive capability.
    fn enable_oscillator(&mut self, oscillator: Oscillator);

    /// Stop an oscillator
    fn disable_oscillator(&mut self, oscillator: Oscillator);

    /// Whether the oscillator reports a stable output
    fn is_oscillator_ready(&self, oscillator: Oscillator) -> bool;

    /// Request an RTC clock source
    fn set_rtc_clock_source(&mut self, source: RtcClockSource);

    /// Read back the RTC clock source currently in effect
    fn rtc_clock_source(&self) -> RtcClockSource;

    /// Enable the RTC kernel clock
    fn enable_rtc(&mut self);

    /// Whether the LSE clock security system detected a failure
    fn is_lse_css_fault(&self) -> bool;

    /// Switch off the LSE clock security system
    fn disable_lse_css(&mut self);
}
