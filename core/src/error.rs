//! RTC peripheral error types

/// RTC peripheral operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// Calendar did not stop within the init mode poll budget
    InitModeTimeout,
    /// Shadow registers did not resynchronize within the poll budget
    ShadowSyncTimeout,
}

impl core::fmt::Display for RtcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InitModeTimeout => write!(f, "RTC init mode timeout"),
            Self::ShadowSyncTimeout => write!(f, "RTC shadow register sync timeout"),
        }
    }
}

impl core::error::Error for RtcError {}
