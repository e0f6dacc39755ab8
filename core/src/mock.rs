//! Host-side platform for unit tests
//!
//! Models just enough of the clock tree, RTC and backup domain to exercise
//! the subsystem: oscillators become ready after a configurable number of
//! milliseconds of [`DelayNs`] time, the RTC clock source is sticky until a
//! domain reset, and RTC registers panic when written while write protected.

use embedded_hal::delay::DelayNs;
use hal_abstractions::{
    BackupDomain, ClockControl, DebugPort, ExtiControl, ExtiLine, FailureIndication, HourFormat,
    Indicator, LogLevel, LogSink, Oscillator, Prescalers, RtcClockSource, RtcPeripheral, SerialId,
    SystemControl,
};

use crate::datetime::{self, DateTime};

pub const BACKUP_REGISTERS: usize = 20;

/// Side effects visible outside the RTC, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Indicate(FailureIndication),
    SelectSource(RtcClockSource),
    DisableLseCss,
    DisableLse,
    DomainReset,
    SystemReset,
    DebugPort(bool),
    LogLevel(LogLevel),
    LoggingConfig(Option<SerialId>, u32),
}

#[derive(Debug)]
pub struct MockPlatform {
    pub backup: [u32; BACKUP_REGISTERS],
    pub events: heapless::Vec<Event, 64>,

    /// Milliseconds after enabling until the oscillator is ready, `None` never
    pub lse_start_ms: Option<u32>,
    pub lsi_start_ms: Option<u32>,
    /// LSE starts right away once the backup domain has been reset
    pub lse_recovers_after_reset: bool,
    pub elapsed_ns: u64,
    pub lse_enabled_at: Option<u64>,
    pub lsi_enabled_at: Option<u64>,
    pub clock_source: RtcClockSource,
    pub clock_source_locked: bool,
    pub css_fault: bool,
    pub backup_access: bool,
    pub rtc_bus_clock: bool,
    pub rtc_enabled: bool,

    pub write_protected: bool,
    pub init_mode: bool,
    /// Last value written to the INIT request bit
    pub init_requested: bool,
    pub init_mode_stuck: bool,
    pub shadow_bypass: bool,
    pub synced: bool,
    pub sync_stuck: bool,
    pub calendar_config: Option<(HourFormat, Prescalers)>,
    pub time: u32,
    pub date: u32,
    pub calendar_writes: u32,

    pub alarm_time: u32,
    pub alarm_date_masked: bool,
    pub alarm_enabled: bool,
    pub alarm_flag: bool,
    pub alarm_interrupt: bool,
    pub alarm_output: bool,

    pub exti_rising: bool,
    pub exti_interrupt: bool,
    pub exti_pending_clears: u32,

    pub debug_enabled: bool,
    pub in_isr: bool,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            backup: [0; BACKUP_REGISTERS],
            events: heapless::Vec::new(),
            lse_start_ms: Some(0),
            lsi_start_ms: Some(0),
            lse_recovers_after_reset: false,
            elapsed_ns: 0,
            lse_enabled_at: None,
            lsi_enabled_at: None,
            clock_source: RtcClockSource::NoClock,
            clock_source_locked: false,
            css_fault: false,
            backup_access: false,
            rtc_bus_clock: false,
            rtc_enabled: false,
            write_protected: true,
            init_mode: false,
            init_requested: false,
            init_mode_stuck: false,
            shadow_bypass: false,
            synced: true,
            sync_stuck: false,
            calendar_config: None,
            time: 0,
            date: 0,
            calendar_writes: 0,
            alarm_time: 0,
            alarm_date_masked: false,
            alarm_enabled: false,
            alarm_flag: false,
            alarm_interrupt: false,
            alarm_output: false,
            exti_rising: false,
            exti_interrupt: false,
            exti_pending_clears: 0,
            debug_enabled: false,
            in_isr: false,
        }
    }
}

impl MockPlatform {
    pub fn elapsed_ms(&self) -> u32 {
        (self.elapsed_ns / 1_000_000) as u32
    }

    /// Set the running calendar without going through init mode
    pub fn load_datetime(&mut self, value: &DateTime) {
        let (time, date) = datetime::encode(value);
        self.time = time;
        self.date = date;
    }

    fn record(&mut self, event: Event) {
        self.events.push(event).expect("event log full");
    }

    fn assert_unprotected(&self) {
        assert!(!self.write_protected, "RTC written while write protected");
    }

    fn assert_init_mode(&self) {
        self.assert_unprotected();
        assert!(self.init_mode, "RTC calendar written outside init mode");
    }

    fn is_started(&self, enabled_at: Option<u64>, start_ms: Option<u32>) -> bool {
        match (enabled_at, start_ms) {
            (Some(at), Some(ms)) => self.elapsed_ns - at >= u64::from(ms) * 1_000_000,
            _ => false,
        }
    }
}

impl DelayNs for MockPlatform {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

impl ClockControl for MockPlatform {
    fn enable_backup_access(&mut self) {
        self.backup_access = true;
    }

    fn enable_rtc_bus_clock(&mut self) {
        self.rtc_bus_clock = true;
    }

    fn enable_oscillator(&mut self, oscillator: Oscillator) {
        let now = self.elapsed_ns;
        let enabled_at = match oscillator {
            Oscillator::Lse => &mut self.lse_enabled_at,
            Oscillator::Lsi => &mut self.lsi_enabled_at,
        };
        enabled_at.get_or_insert(now);
    }

    fn disable_oscillator(&mut self, oscillator: Oscillator) {
        match oscillator {
            Oscillator::Lse => {
                self.lse_enabled_at = None;
                self.record(Event::DisableLse);
            }
            Oscillator::Lsi => self.lsi_enabled_at = None,
        }
    }

    fn is_oscillator_ready(&self, oscillator: Oscillator) -> bool {
        match oscillator {
            Oscillator::Lse => self.is_started(self.lse_enabled_at, self.lse_start_ms),
            Oscillator::Lsi => self.is_started(self.lsi_enabled_at, self.lsi_start_ms),
        }
    }

    fn set_rtc_clock_source(&mut self, source: RtcClockSource) {
        self.record(Event::SelectSource(source));
        if !self.clock_source_locked {
            self.clock_source = source;
            self.clock_source_locked = source != RtcClockSource::NoClock;
        }
    }

    fn rtc_clock_source(&self) -> RtcClockSource {
        self.clock_source
    }

    fn enable_rtc(&mut self) {
        self.rtc_enabled = true;
    }

    fn is_lse_css_fault(&self) -> bool {
        self.css_fault
    }

    fn disable_lse_css(&mut self) {
        self.record(Event::DisableLseCss);
    }
}

impl BackupDomain for MockPlatform {
    const REGISTER_COUNT: usize = BACKUP_REGISTERS;

    fn read_backup_register(&self, index: usize) -> u32 {
        self.backup[index]
    }

    fn write_backup_register(&mut self, index: usize, value: u32) {
        self.backup[index] = value;
    }

    fn reset_backup_domain(&mut self) {
        self.record(Event::DomainReset);

        self.backup = [0; BACKUP_REGISTERS];
        self.lse_enabled_at = None;
        self.clock_source = RtcClockSource::NoClock;
        self.clock_source_locked = false;
        self.css_fault = false;
        self.rtc_enabled = false;

        self.write_protected = true;
        self.init_mode = false;
        self.init_requested = false;
        self.calendar_config = None;
        self.time = 0;
        self.date = 0;
        self.alarm_time = 0;
        self.alarm_date_masked = false;
        self.alarm_enabled = false;
        self.alarm_flag = false;
        self.alarm_interrupt = false;
        self.alarm_output = false;

        if self.lse_recovers_after_reset {
            self.lse_start_ms = Some(0);
        }
    }
}

impl RtcPeripheral for MockPlatform {
    fn disable_write_protection(&mut self) {
        self.write_protected = false;
    }

    fn enable_write_protection(&mut self) {
        self.write_protected = true;
    }

    fn request_init_mode(&mut self, enter: bool) {
        self.assert_unprotected();
        self.init_requested = enter;
        if !self.init_mode_stuck {
            self.init_mode = enter;
        }
    }

    fn is_init_mode(&self) -> bool {
        self.init_mode
    }

    fn configure(&mut self, format: HourFormat, prescalers: Prescalers) {
        self.assert_init_mode();
        self.calendar_config = Some((format, prescalers));
    }

    fn is_shadow_bypass_enabled(&self) -> bool {
        self.shadow_bypass
    }

    fn clear_registers_synced(&mut self) {
        self.assert_unprotected();
        // Resynchronizes immediately unless told not to
        self.synced = !self.sync_stuck;
    }

    fn is_registers_synced(&self) -> bool {
        self.synced
    }

    fn time_bcd(&self) -> u32 {
        self.time
    }

    fn date_bcd(&self) -> u32 {
        self.date
    }

    fn set_time_bcd(&mut self, time: u32) {
        self.assert_init_mode();
        self.time = time;
        self.calendar_writes += 1;
    }

    fn set_date_bcd(&mut self, date: u32) {
        self.assert_init_mode();
        self.date = date;
    }

    fn alarm_time_bcd(&self) -> u32 {
        self.alarm_time
    }

    fn set_alarm_time_bcd(&mut self, time: u32) {
        self.assert_unprotected();
        self.alarm_time = time;
    }

    fn set_alarm_date_masked(&mut self, masked: bool) {
        self.assert_unprotected();
        self.alarm_date_masked = masked;
    }

    fn set_alarm_enabled(&mut self, enabled: bool) {
        self.assert_unprotected();
        self.alarm_enabled = enabled;
    }

    fn is_alarm_enabled(&self) -> bool {
        self.alarm_enabled
    }

    fn is_alarm_flag_set(&self) -> bool {
        self.alarm_flag
    }

    fn clear_alarm_flag(&mut self) {
        self.alarm_flag = false;
    }

    fn set_alarm_interrupt(&mut self, enabled: bool) {
        self.assert_unprotected();
        self.alarm_interrupt = enabled;
    }

    fn set_alarm_output(&mut self, enabled: bool) {
        self.assert_unprotected();
        self.alarm_output = enabled;
    }
}

impl ExtiControl for MockPlatform {
    fn set_rising_trigger(&mut self, line: ExtiLine, enabled: bool) {
        assert_eq!(line, ExtiLine::RTC_ALARM);
        self.exti_rising = enabled;
    }

    fn set_line_interrupt(&mut self, line: ExtiLine, enabled: bool) {
        assert_eq!(line, ExtiLine::RTC_ALARM);
        self.exti_interrupt = enabled;
    }

    fn clear_pending(&mut self, line: ExtiLine) {
        assert_eq!(line, ExtiLine::RTC_ALARM);
        self.exti_pending_clears += 1;
    }
}

impl SystemControl for MockPlatform {
    fn is_interrupt_context(&self) -> bool {
        self.in_isr
    }

    fn system_reset(&mut self) -> ! {
        self.record(Event::SystemReset);
        panic!("system reset");
    }
}

impl Indicator for MockPlatform {
    fn indicate(&mut self, indication: FailureIndication) {
        self.record(Event::Indicate(indication));
    }
}

impl DebugPort for MockPlatform {
    fn set_debug_enabled(&mut self, enabled: bool) {
        self.debug_enabled = enabled;
        self.record(Event::DebugPort(enabled));
    }
}

impl LogSink for MockPlatform {
    fn set_log_level(&mut self, level: LogLevel) {
        self.record(Event::LogLevel(level));
    }

    fn set_logging_config(&mut self, serial: Option<SerialId>, baud_rate: u32) {
        self.record(Event::LoggingConfig(serial, baud_rate));
    }
}
