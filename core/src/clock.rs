//! Low-speed clock bring-up and recovery
//!
//! The RTC runs from the LSE crystal. Both LSE and LSI are started; LSI is
//! the fallback the calendar is parked on while a failed LSE is recovered.
//!
//! Recovery is destructive: it resets the backup domain, which erases the
//! backup register bank and the RTC configuration. The calendar value is
//! carried across the reset when it can still be read. If the clock does
//! not come back after one domain reset, the system is restarted.

use hal_abstractions::{FailureIndication, Oscillator, RtcClockSource, RtcPlatform};

use crate::calendar;
use crate::datetime::DateTime;

/// Oscillator startup polls, 1 ms each
pub const STARTUP_POLL_LIMIT: u32 = 300;

/// Clock start errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Oscillators not ready within the startup budget
    Timeout,
    /// RTC clock source read back differs from the one selected
    SourceMismatch,
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "oscillator startup timeout"),
            Self::SourceMismatch => write!(f, "RTC clock source mismatch"),
        }
    }
}

impl core::error::Error for ClockError {}

/// Volatile clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockStatus {
    pub lse_ready: bool,
    pub lsi_ready: bool,
    pub source: RtcClockSource,
    pub css_fault: bool,
}

pub struct ClockSourceManager<'p, P> {
    hw: &'p mut P,
}

impl<'p, P: RtcPlatform> ClockSourceManager<'p, P> {
    pub fn new(hw: &'p mut P) -> Self {
        Self { hw }
    }

    /// Bring the clock up, recovering if it does not start
    ///
    /// Returns only once the RTC runs from LSE; a failed recovery restarts
    /// the system instead.
    pub fn establish(&mut self) -> ClockStatus {
        match self.start_clock_and_select_source() {
            Ok(()) => info!("RTC clock running from LSE"),
            Err(e) => {
                warn!("RTC clock start failed: {}", e);
                self.recover();
            }
        }

        self.status()
    }

    pub fn status(&self) -> ClockStatus {
        ClockStatus {
            lse_ready: self.hw.is_oscillator_ready(Oscillator::Lse),
            lsi_ready: self.hw.is_oscillator_ready(Oscillator::Lsi),
            source: self.hw.rtc_clock_source(),
            css_fault: self.hw.is_lse_css_fault(),
        }
    }

    /// Start LSI and LSE, then run the RTC from LSE
    pub fn start_clock_and_select_source(&mut self) -> Result<(), ClockError> {
        self.hw.enable_backup_access();
        self.hw.enable_oscillator(Oscillator::Lsi);
        self.hw.enable_oscillator(Oscillator::Lse);

        let mut ready = false;
        for _ in 0..STARTUP_POLL_LIMIT {
            if self.oscillators_ready() {
                ready = true;
                break;
            }
            self.hw.delay_ms(1);
        }

        if !ready && !self.oscillators_ready() {
            return Err(ClockError::Timeout);
        }

        self.hw.set_rtc_clock_source(RtcClockSource::Lse);
        self.hw.enable_rtc();

        if self.hw.rtc_clock_source() != RtcClockSource::Lse {
            return Err(ClockError::SourceMismatch);
        }

        Ok(())
    }

    fn oscillators_ready(&self) -> bool {
        self.hw.is_oscillator_ready(Oscillator::Lse) && self.hw.is_oscillator_ready(Oscillator::Lsi)
    }

    /// Recover from a failed or faulted LSE
    ///
    /// Resets the backup domain. Never returns if the clock cannot be
    /// restarted afterwards.
    pub fn recover(&mut self) {
        if self.hw.is_lse_css_fault() {
            error!("LSE clock security fault");
            self.hw.indicate(FailureIndication::LseCssFault);
            self.hw.disable_lse_css();
            self.hw.disable_oscillator(Oscillator::Lse);
        } else {
            error!("LSE failed to start");
            self.hw.indicate(FailureIndication::ClockStartFailed);
        }

        // Park the calendar on LSI so its value can still be read
        self.hw.set_rtc_clock_source(RtcClockSource::Lsi);
        let preserved = if self.hw.rtc_clock_source() == RtcClockSource::Lsi {
            Some(calendar::read_datetime(&*self.hw))
        } else {
            warn!("Unable to switch RTC to LSI, calendar will be lost");
            None
        };

        info!("Resetting backup domain");
        self.hw.reset_backup_domain();

        if let Err(e) = self.start_clock_and_select_source() {
            error!("RTC clock recovery failed: {}", e);
            self.hw.indicate(FailureIndication::ClockRecoveryFailed);
            self.hw.reset_backup_domain();
            self.hw.system_reset();
        }

        // A calendar that was never set reads back as month and day zero
        if let Some(datetime) = preserved.filter(DateTime::is_valid) {
            if let Err(e) = calendar::write_datetime(&mut *self.hw, &datetime) {
                warn!("Unable to restore calendar after recovery: {}", e);
            }
        }

        info!("RTC clock recovered");
    }
}
