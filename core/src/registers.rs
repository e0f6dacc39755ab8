//! Backup register bank
//!
//! Slot layout of the battery-backed registers. Indices are part of the
//! persisted format; retired slots keep their index.
//!
//! Slot 0 holds a header `{magic: u16, version: u8, reserved: u8}`. A header
//! that does not match [`HEADER_MAGIC`]/[`HEADER_VERSION`] means nothing in the
//! bank can be trusted: the whole bank is zeroed and re-stamped rather than
//! partially repaired.

use hal_abstractions::{BackupDomain, DebugPort, LogLevel, LogSink};

use crate::config::{
    BootMode, DateFormat, Flag, HeapTrackMode, LocaleUnits, LogBaudRate, LogDevice,
    SystemConfig, TimeFormat,
};

pub const HEADER_MAGIC: u16 = 0x10F1;
pub const HEADER_VERSION: u8 = 0;

/// Role of a backup register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Register {
    /// Bank header (magic and layout version)
    Header = 0,
    /// Packed [`SystemConfig`]
    System = 1,
    /// Pointer to the version record
    Version = 2,
    /// LFS geometry fingerprint, no longer written
    LfsFingerprint = 3,
    /// Pointer to the last fault message
    FaultData = 4,
    /// Failed PIN attempts
    PinFails = 5,
    /// Index of the FS directory entry holding the update to apply
    UpdateFolderFsIndex = 6,
    /// Encoded value of the current PIN
    PinValue = 7,
    /// Flags beyond the `SystemConfig` flags byte
    ExtendedFlags = 8,
}

impl Register {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Decoded slot 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header {
    pub magic: u16,
    pub version: u8,
}

impl Header {
    /// Header stamped by [`BackupRegisterStore::reset_registers`]
    pub const CURRENT: Header = Header {
        magic: HEADER_MAGIC,
        version: HEADER_VERSION,
    };

    pub const fn from_bits(bits: u32) -> Self {
        Self {
            magic: bits as u16,
            version: (bits >> 16) as u8,
        }
    }

    pub const fn bits(self) -> u32 {
        self.magic as u32 | (self.version as u32) << 16
    }
}

/// Typed accessor over the backup register bank
///
/// Borrows the platform for the duration of one operation. Callers that share
/// the platform with an interrupt handler must hold a critical section for
/// the lifetime of the store; [`crate::Rtc::with_registers`] does this.
pub struct BackupRegisterStore<'p, P> {
    hw: &'p mut P,
}

impl<'p, P: BackupDomain> BackupRegisterStore<'p, P> {
    pub fn new(hw: &'p mut P) -> Self {
        Self { hw }
    }

    pub fn get(&self, register: Register) -> u32 {
        self.hw.read_backup_register(register.index())
    }

    pub fn set(&mut self, register: Register, value: u32) {
        self.hw.write_backup_register(register.index(), value);
    }

    pub fn header(&self) -> Header {
        Header::from_bits(self.get(Register::Header))
    }

    /// Zero every register and stamp a fresh header
    pub fn reset_registers(&mut self) {
        for index in 0..P::REGISTER_COUNT {
            self.hw.write_backup_register(index, 0);
        }

        self.set(Register::Header, Header::CURRENT.bits());
        self.set(Register::ExtendedFlags, 0);
    }

    /// Check the header, resetting the whole bank if it does not match
    ///
    /// Returns `false` when the bank was reset.
    pub fn verify_header(&mut self) -> bool {
        let header = self.header();
        if header == Header::CURRENT {
            return true;
        }

        warn!(
            "Backup register header mismatch (magic {=u16:#x}, version {=u8}), resetting bank",
            header.magic,
            header.version
        );
        self.reset_registers();
        false
    }

    pub fn system_config(&self) -> SystemConfig {
        SystemConfig::from_bits(self.get(Register::System))
    }

    /// Read-modify-write of the `System` register
    pub fn update_system_config(&mut self, f: impl FnOnce(&mut SystemConfig)) {
        let mut config = self.system_config();
        f(&mut config);
        self.set(Register::System, config.bits());
    }

    pub fn log_level(&self) -> LogLevel {
        self.system_config().log_level()
    }

    pub fn log_device(&self) -> LogDevice {
        self.system_config().log_device()
    }

    pub fn log_baud_rate(&self) -> LogBaudRate {
        self.system_config().log_baud_rate()
    }

    pub fn boot_mode(&self) -> BootMode {
        self.system_config().boot_mode()
    }

    pub fn set_boot_mode(&mut self, mode: BootMode) {
        self.update_system_config(|config| config.set_boot_mode(mode));
    }

    pub fn heap_track_mode(&self) -> HeapTrackMode {
        self.system_config().heap_track_mode()
    }

    pub fn set_heap_track_mode(&mut self, mode: HeapTrackMode) {
        self.update_system_config(|config| config.set_heap_track_mode(mode));
    }

    pub fn locale_units(&self) -> LocaleUnits {
        self.system_config().locale_units()
    }

    pub fn set_locale_units(&mut self, units: LocaleUnits) {
        self.update_system_config(|config| config.set_locale_units(units));
    }

    pub fn locale_time_format(&self) -> TimeFormat {
        self.system_config().locale_time_format()
    }

    pub fn set_locale_time_format(&mut self, format: TimeFormat) {
        self.update_system_config(|config| config.set_locale_time_format(format));
    }

    pub fn locale_date_format(&self) -> DateFormat {
        self.system_config().locale_date_format()
    }

    pub fn set_locale_date_format(&mut self, format: DateFormat) {
        self.update_system_config(|config| config.set_locale_date_format(format));
    }

    pub fn is_flag_set(&self, flag: Flag) -> bool {
        if flag.is_extended() {
            self.get(Register::ExtendedFlags) & flag.extended_mask() != 0
        } else {
            self.system_config().flags() & flag.system_mask() != 0
        }
    }

    /// Set `flag` without touching the debug port
    fn write_flag(&mut self, flag: Flag, set: bool) {
        if flag.is_extended() {
            let flags = self.get(Register::ExtendedFlags);
            let flags = if set {
                flags | flag.extended_mask()
            } else {
                flags & !flag.extended_mask()
            };
            self.set(Register::ExtendedFlags, flags);
        } else {
            self.update_system_config(|config| {
                let flags = if set {
                    config.flags() | flag.system_mask()
                } else {
                    config.flags() & !flag.system_mask()
                };
                config.set_flags(flags);
            });
        }
    }

    pub fn fault_data(&self) -> u32 {
        self.get(Register::FaultData)
    }

    pub fn set_fault_data(&mut self, value: u32) {
        self.set(Register::FaultData, value);
    }

    pub fn pin_fails(&self) -> u32 {
        self.get(Register::PinFails)
    }

    pub fn set_pin_fails(&mut self, value: u32) {
        self.set(Register::PinFails, value);
    }

    pub fn pin_value(&self) -> u32 {
        self.get(Register::PinValue)
    }

    pub fn set_pin_value(&mut self, value: u32) {
        self.set(Register::PinValue, value);
    }
}

impl<'p, P: BackupDomain + DebugPort> BackupRegisterStore<'p, P> {
    /// Set a flag; setting [`Flag::DEBUG`] also enables the debug port
    pub fn set_flag(&mut self, flag: Flag) {
        self.write_flag(flag, true);

        if flag.contains(Flag::DEBUG) {
            self.hw.set_debug_enabled(true);
        }
    }

    /// Clear a flag; clearing [`Flag::DEBUG`] also disables the debug port
    pub fn reset_flag(&mut self, flag: Flag) {
        self.write_flag(flag, false);

        if flag.contains(Flag::DEBUG) {
            self.hw.set_debug_enabled(false);
        }
    }

    /// Drive the debug port from the persisted debug flag
    pub fn apply_debug_flag(&mut self) {
        let enabled = self.is_flag_set(Flag::DEBUG);
        self.hw.set_debug_enabled(enabled);
    }
}

impl<'p, P: BackupDomain + LogSink> BackupRegisterStore<'p, P> {
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.update_system_config(|config| config.set_log_level(level));
        self.hw.set_log_level(level);
    }

    pub fn set_log_device(&mut self, device: LogDevice) {
        self.update_system_config(|config| config.set_log_device(device));
        self.publish_logging_config();
    }

    pub fn set_log_baud_rate(&mut self, baud_rate: LogBaudRate) {
        self.update_system_config(|config| config.set_log_baud_rate(baud_rate));
        self.publish_logging_config();
    }

    /// Hand the persisted log level and transport to the logging service
    pub fn apply_logging_config(&mut self) {
        let level = self.log_level();
        self.hw.set_log_level(level);
        self.publish_logging_config();
    }

    fn publish_logging_config(&mut self) {
        let config = self.system_config();
        self.hw
            .set_logging_config(config.log_device().serial(), config.log_baud_rate().baud_rate());
    }
}
