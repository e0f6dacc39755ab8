//! Persisted system configuration word
//!
//! The `System` backup register packs the persisted configuration into one
//! 32-bit word. Field boundaries are part of the persisted format and never
//! move:
//!
//! ```text
//! bits   field
//! 0..4   log level
//! 4..8   reserved
//! 8..16  flags (identifiers 1<<0 ..= 1<<7)
//! 16..20 boot mode
//! 20..22 heap track mode
//! 22     locale units
//! 23     locale time format
//! 24..26 locale date format
//! 26..28 log device
//! 28..31 log baud rate
//! 31     reserved
//! ```

use hal_abstractions::{LogLevel, SerialId};

/// Bit field of the configuration word
#[derive(Clone, Copy)]
struct Field {
    offset: u32,
    width: u32,
}

impl Field {
    const fn new(offset: u32, width: u32) -> Self {
        Self { offset, width }
    }

    const fn mask(self) -> u32 {
        ((1 << self.width) - 1) << self.offset
    }

    const fn get(self, word: u32) -> u32 {
        (word & self.mask()) >> self.offset
    }

    const fn set(self, word: u32, value: u32) -> u32 {
        (word & !self.mask()) | ((value << self.offset) & self.mask())
    }
}

const LOG_LEVEL: Field = Field::new(0, 4);
const FLAGS: Field = Field::new(8, 8);
const BOOT_MODE: Field = Field::new(16, 4);
const HEAP_TRACK_MODE: Field = Field::new(20, 2);
const LOCALE_UNITS: Field = Field::new(22, 1);
const LOCALE_TIME_FORMAT: Field = Field::new(23, 1);
const LOCALE_DATE_FORMAT: Field = Field::new(24, 2);
const LOG_DEVICE: Field = Field::new(26, 2);
const LOG_BAUD_RATE: Field = Field::new(28, 3);

/// Boot target requested for the next reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BootMode {
    /// Normal boot mode, default value
    #[default]
    Normal = 0,
    /// Boot to DFU (MCU bootloader)
    Dfu = 1,
    /// Boot to updater, pre update
    PreUpdate = 2,
    /// Boot to updater, main
    Update = 3,
    /// Boot to updater, post update
    PostUpdate = 4,
}

impl BootMode {
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Normal),
            1 => Some(Self::Dfu),
            2 => Some(Self::PreUpdate),
            3 => Some(Self::Update),
            4 => Some(Self::PostUpdate),
            _ => None,
        }
    }
}

/// Heap allocation tracking scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HeapTrackMode {
    /// Disable allocation tracking
    #[default]
    None = 0,
    /// Track the main application thread
    Main = 1,
    /// Track the main application thread and its children
    Tree = 2,
    /// Track all threads
    All = 3,
}

impl HeapTrackMode {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::None,
            1 => Self::Main,
            2 => Self::Tree,
            _ => Self::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LocaleUnits {
    #[default]
    Metric = 0,
    Imperial = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TimeFormat {
    #[default]
    H24 = 0,
    H12 = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DateFormat {
    /// Day/Month/Year
    #[default]
    Dmy = 0,
    /// Month/Day/Year
    Mdy = 1,
    /// Year/Month/Day
    Ymd = 2,
}

impl DateFormat {
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Dmy),
            1 => Some(Self::Mdy),
            2 => Some(Self::Ymd),
            _ => None,
        }
    }
}

/// Serial port used for log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogDevice {
    #[default]
    Usart = 0,
    Lpuart = 1,
    /// Reserved for future use, logs nowhere
    Reserved = 2,
    /// Serial logging disabled
    None = 3,
}

impl LogDevice {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Usart,
            1 => Self::Lpuart,
            2 => Self::Reserved,
            _ => Self::None,
        }
    }

    /// Serial port this device maps to, `None` when serial logging is off
    pub const fn serial(self) -> Option<SerialId> {
        match self {
            Self::Usart => Some(SerialId::Usart),
            Self::Lpuart => Some(SerialId::Lpuart),
            Self::Reserved | Self::None => None,
        }
    }
}

/// Log baud rate; raw values are not in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogBaudRate {
    #[default]
    B230400 = 0,
    B9600 = 1,
    B38400 = 2,
    B57600 = 3,
    B115200 = 4,
    B460800 = 5,
    B921600 = 6,
    B1843200 = 7,
}

impl LogBaudRate {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Self::B230400,
            1 => Self::B9600,
            2 => Self::B38400,
            3 => Self::B57600,
            4 => Self::B115200,
            5 => Self::B460800,
            6 => Self::B921600,
            _ => Self::B1843200,
        }
    }

    pub const fn baud_rate(self) -> u32 {
        match self {
            Self::B230400 => 230_400,
            Self::B9600 => 9_600,
            Self::B38400 => 38_400,
            Self::B57600 => 57_600,
            Self::B115200 => 115_200,
            Self::B460800 => 460_800,
            Self::B921600 => 921_600,
            Self::B1843200 => 1_843_200,
        }
    }
}

/// Persisted boolean flag
///
/// Identifiers up to `1 << 7` live in the `flags` byte of [`SystemConfig`].
/// Larger identifiers are pre-shifted by 8 at their definition site and are
/// stored as `id >> 8` in the `ExtendedFlags` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Flag(u32);

impl Flag {
    pub const DEBUG: Flag = Flag(1 << 0);
    pub const STORAGE_FORMAT_INTERNAL: Flag = Flag(1 << 1);
    /// PIN lock
    pub const LOCK: Flag = Flag(1 << 2);
    /// Co-processor firmware update pending
    pub const C2_UPDATE: Flag = Flag(1 << 3);
    /// Left-handed orientation
    pub const HAND_ORIENT: Flag = Flag(1 << 4);
    pub const LEGACY_SLEEP: Flag = Flag(1 << 5);
    pub const STEALTH_MODE: Flag = Flag(1 << 6);
    pub const RANDOM_FILENAME: Flag = Flag(1 << 7);
    pub const VERTICAL_MENUS: Flag = Flag((1 << 0) << 8);

    /// Largest identifier stored in the `SystemConfig` flags byte
    pub const LAST_SYSTEM: u32 = 1 << 7;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether the flag lives in the `ExtendedFlags` register
    pub const fn is_extended(self) -> bool {
        self.0 > Self::LAST_SYSTEM
    }

    /// Whether any bit of `other` is part of this flag
    pub const fn contains(self, other: Flag) -> bool {
        self.0 & other.0 != 0
    }

    /// Mask within the `flags` byte
    pub(crate) const fn system_mask(self) -> u8 {
        self.0 as u8
    }

    /// Mask within the `ExtendedFlags` register
    pub(crate) const fn extended_mask(self) -> u32 {
        self.0 >> 8
    }
}

/// Unpacked view of the `System` backup register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemConfig(u32);

impl SystemConfig {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Log level, [`LogLevel::Default`] for values outside the known set
    pub fn log_level(self) -> LogLevel {
        let raw = LOG_LEVEL.get(self.0) as u8;
        LogLevel::from_bits(raw).unwrap_or_else(|| {
            warn!("Unknown persisted log level {=u8}", raw);
            LogLevel::Default
        })
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.0 = LOG_LEVEL.set(self.0, u32::from(level.bits()));
    }

    /// Raw `flags` byte
    pub fn flags(self) -> u8 {
        FLAGS.get(self.0) as u8
    }

    pub fn set_flags(&mut self, flags: u8) {
        self.0 = FLAGS.set(self.0, u32::from(flags));
    }

    /// Boot mode, [`BootMode::Normal`] for values outside the known set
    pub fn boot_mode(self) -> BootMode {
        let raw = BOOT_MODE.get(self.0) as u8;
        BootMode::from_bits(raw).unwrap_or_else(|| {
            warn!("Unknown persisted boot mode {=u8}", raw);
            BootMode::Normal
        })
    }

    pub fn set_boot_mode(&mut self, mode: BootMode) {
        self.0 = BOOT_MODE.set(self.0, mode as u32);
    }

    pub fn heap_track_mode(self) -> HeapTrackMode {
        HeapTrackMode::from_bits(HEAP_TRACK_MODE.get(self.0) as u8)
    }

    pub fn set_heap_track_mode(&mut self, mode: HeapTrackMode) {
        self.0 = HEAP_TRACK_MODE.set(self.0, mode as u32);
    }

    pub fn locale_units(self) -> LocaleUnits {
        match LOCALE_UNITS.get(self.0) {
            0 => LocaleUnits::Metric,
            _ => LocaleUnits::Imperial,
        }
    }

    pub fn set_locale_units(&mut self, units: LocaleUnits) {
        self.0 = LOCALE_UNITS.set(self.0, units as u32);
    }

    pub fn locale_time_format(self) -> TimeFormat {
        match LOCALE_TIME_FORMAT.get(self.0) {
            0 => TimeFormat::H24,
            _ => TimeFormat::H12,
        }
    }

    pub fn set_locale_time_format(&mut self, format: TimeFormat) {
        self.0 = LOCALE_TIME_FORMAT.set(self.0, format as u32);
    }

    /// Date format, [`DateFormat::Dmy`] for the unused raw value
    pub fn locale_date_format(self) -> DateFormat {
        let raw = LOCALE_DATE_FORMAT.get(self.0) as u8;
        DateFormat::from_bits(raw).unwrap_or_else(|| {
            warn!("Unknown persisted date format {=u8}", raw);
            DateFormat::Dmy
        })
    }

    pub fn set_locale_date_format(&mut self, format: DateFormat) {
        self.0 = LOCALE_DATE_FORMAT.set(self.0, format as u32);
    }

    pub fn log_device(self) -> LogDevice {
        LogDevice::from_bits(LOG_DEVICE.get(self.0) as u8)
    }

    pub fn set_log_device(&mut self, device: LogDevice) {
        self.0 = LOG_DEVICE.set(self.0, device as u32);
    }

    pub fn log_baud_rate(self) -> LogBaudRate {
        LogBaudRate::from_bits(LOG_BAUD_RATE.get(self.0) as u8)
    }

    pub fn set_log_baud_rate(&mut self, baud_rate: LogBaudRate) {
        self.0 = LOG_BAUD_RATE.set(self.0, baud_rate as u32);
    }
}
