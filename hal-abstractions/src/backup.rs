//! Battery-backed register bank

/// Backup domain: registers that survive a system reset and power loss while
/// VBAT is present
pub trait BackupDomain {
    /// Number of 32-bit registers in the bank
    const REGISTER_COUNT: usize;

    /// Read register `index` (`index < REGISTER_COUNT`)
    fn read_backup_register(&self, index: usize) -> u32;

    /// Write register `index` (`index < REGISTER_COUNT`)
    fn write_backup_register(&mut self, index: usize, value: u32);

    /// Force and release a backup domain reset
    ///
    /// Clears the RTC clock configuration, the calendar and every backup
    /// register.
    fn reset_backup_domain(&mut self);
}
