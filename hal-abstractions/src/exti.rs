//! External interrupt/event controller lines

/// EXTI line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtiLine(pub u8);

impl ExtiLine {
    /// Internal line the RTC alarms are routed through
    pub const RTC_ALARM: ExtiLine = ExtiLine(17);
}

/// Per-line control of the EXTI block
pub trait ExtiControl {
    /// Enable or disable rising-edge detection on `line`
    fn set_rising_trigger(&mut self, line: ExtiLine, enabled: bool);

    /// Unmask or mask the interrupt request of `line`
    fn set_line_interrupt(&mut self, line: ExtiLine, enabled: bool);

    /// Clear the pending flag of `line`
    fn clear_pending(&mut self, line: ExtiLine);
}
