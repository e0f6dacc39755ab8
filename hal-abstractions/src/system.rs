//! System services used by the RTC subsystem

/// Failure signalled to the user while the clock is being recovered
///
/// Boards typically map these to LED sequences: blue for a clock security
/// fault, red for a plain start failure, blinking red before the restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureIndication {
    /// LSE clock security system tripped
    LseCssFault,
    /// Oscillators did not start or the RTC source did not switch
    ClockStartFailed,
    /// Recovery failed, the system is about to restart
    ClockRecoveryFailed,
}

/// Serial port carrying the log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialId {
    Usart,
    Lpuart,
}

/// Runtime log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogLevel {
    /// Build default
    #[default]
    Default = 0,
    None = 1,
    Error = 2,
    Warn = 3,
    Info = 4,
    Debug = 5,
    Trace = 6,
}

impl LogLevel {
    /// Decode a raw level, `None` for values outside the known set
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Default),
            1 => Some(Self::None),
            2 => Some(Self::Error),
            3 => Some(Self::Warn),
            4 => Some(Self::Info),
            5 => Some(Self::Debug),
            6 => Some(Self::Trace),
            _ => None,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// User-visible failure signalling (LED, buzzer, ...)
pub trait Indicator {
    fn indicate(&mut self, indication: FailureIndication);
}

/// Debug interface (SWD) control
pub trait DebugPort {
    fn set_debug_enabled(&mut self, enabled: bool);
}

/// Logging service configuration
pub trait LogSink {
    /// Apply a new runtime log level
    fn set_log_level(&mut self, level: LogLevel);

    /// Route logs to `serial` at `baud_rate`, or disable serial logging when `None`
    fn set_logging_config(&mut self, serial: Option<SerialId>, baud_rate: u32);
}

/// Core system control
pub trait SystemControl {
    /// Whether the caller runs in an exception handler
    fn is_interrupt_context(&self) -> bool;

    /// Request a full system reset
    fn system_reset(&mut self) -> !;
}
