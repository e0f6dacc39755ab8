//! Calendar value and packed-decimal register codec
//!
//! The RTC keeps its calendar in two packed-decimal words, one field per
//! byte:
//!
//! ```text
//! time: 0x00HHMMSS
//! date: 0xWWDDMMYY
//! ```
//!
//! `YY` is the offset from [`EPOCH_YEAR`], so the calendar covers 2000-2099.
//! Year 2100 wraps silently back to 2000; this is a hardware limitation and is
//! left as is.
//!
//! Timestamps are seconds since the Unix epoch (1970-01-01 00:00:00 UTC) and
//! use Howard Hinnant's O(1) `days_from_civil`/`civil_from_days` algorithms.
//! Reference: http://howardhinnant.github.io/date_algorithms.html

/// Base year of the two-digit year held in the date register
pub const EPOCH_YEAR: u16 = 2000;

const SECONDS_PER_DAY: u32 = 86_400;

/// Days from 0000-03-01 to 1970-01-01
const UNIX_EPOCH_DAYS: i32 = 719_468;

/// Binary calendar value
///
/// `weekday` runs from 1 (Monday) to 7 (Sunday). An all-zero value (the
/// `Default`) means "no time available".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Calendar field validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// Year outside 2000-2099
    Year,
    /// Month outside 1-12
    Month,
    /// Day outside the month
    Day,
    /// Weekday outside 1-7
    Weekday,
    /// Hour outside 0-23
    Hour,
    /// Minute outside 0-59
    Minute,
    /// Second outside 0-59
    Second,
}

impl core::fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Year => write!(f, "year out of range"),
            Self::Month => write!(f, "month out of range"),
            Self::Day => write!(f, "day out of range"),
            Self::Weekday => write!(f, "weekday out of range"),
            Self::Hour => write!(f, "hour out of range"),
            Self::Minute => write!(f, "minute out of range"),
            Self::Second => write!(f, "second out of range"),
        }
    }
}

impl core::error::Error for DateTimeError {}

impl DateTime {
    /// Build a validated calendar value; the weekday is derived from the date
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DateTimeError> {
        let datetime = Self {
            year,
            month,
            day,
            weekday: 1,
            hour,
            minute,
            second,
        };
        datetime.validate()?;

        Ok(Self {
            weekday: weekday(year, month, day),
            ..datetime
        })
    }

    /// Check every field against the range the calendar registers can hold
    pub fn validate(&self) -> Result<(), DateTimeError> {
        if !(EPOCH_YEAR..EPOCH_YEAR + 100).contains(&self.year) {
            return Err(DateTimeError::Year);
        }
        if !(1..=12).contains(&self.month) {
            return Err(DateTimeError::Month);
        }
        if self.day == 0 || self.day > days_in_month(self.year, self.month) {
            return Err(DateTimeError::Day);
        }
        if !(1..=7).contains(&self.weekday) {
            return Err(DateTimeError::Weekday);
        }
        if self.hour > 23 {
            return Err(DateTimeError::Hour);
        }
        if self.minute > 59 {
            return Err(DateTimeError::Minute);
        }
        if self.second > 59 {
            return Err(DateTimeError::Second);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Seconds since the Unix epoch
    pub fn timestamp(&self) -> u32 {
        timestamp(self)
    }
}

/// Binary to packed decimal, `value` must be below 100
pub const fn bin_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Packed decimal to binary
pub const fn bcd_to_bin(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

/// Check if year is a leap year (Gregorian calendar)
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`, 0 for an invalid month
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// ISO weekday (1 = Monday) of a civil date
pub fn weekday(year: u16, month: u8, day: u8) -> u8 {
    weekday_from_days(days_from_civil(year, month, day))
}

/// Encode a calendar value into `(time, date)` register words
pub fn encode(datetime: &DateTime) -> (u32, u32) {
    let time = u32::from(bin_to_bcd(datetime.hour)) << 16
        | u32::from(bin_to_bcd(datetime.minute)) << 8
        | u32::from(bin_to_bcd(datetime.second));

    let date = u32::from(bin_to_bcd(datetime.weekday)) << 24
        | u32::from(bin_to_bcd(datetime.day)) << 16
        | u32::from(bin_to_bcd(datetime.month)) << 8
        | u32::from(bin_to_bcd(year_offset(datetime.year)));

    (time, date)
}

/// Decode `(time, date)` register words into a calendar value
pub fn decode(time: u32, date: u32) -> DateTime {
    let byte = |word: u32, shift: u32| bcd_to_bin((word >> shift) as u8);

    DateTime {
        second: byte(time, 0),
        minute: byte(time, 8),
        hour: byte(time, 16),
        year: u16::from(byte(date, 0)) + EPOCH_YEAR,
        month: byte(date, 8),
        day: byte(date, 16),
        weekday: byte(date, 24),
    }
}

/// Encode only the time of day, as used by the alarm match fields
pub fn encode_time(datetime: &DateTime) -> u32 {
    encode(datetime).0
}

/// Decode a time-of-day word; date fields are left at zero
pub fn decode_time(time: u32) -> DateTime {
    let decoded = decode(time, 0);
    DateTime {
        hour: decoded.hour,
        minute: decoded.minute,
        second: decoded.second,
        ..DateTime::default()
    }
}

/// Seconds since the Unix epoch, wrapping in 2106
pub fn timestamp(datetime: &DateTime) -> u32 {
    let days = days_from_civil(datetime.year, datetime.month, datetime.day);

    (days as u32)
        .wrapping_mul(SECONDS_PER_DAY)
        .wrapping_add(u32::from(datetime.hour) * 3600)
        .wrapping_add(u32::from(datetime.minute) * 60)
        .wrapping_add(u32::from(datetime.second))
}

/// Calendar value of a Unix timestamp, weekday included
pub fn from_timestamp(timestamp: u32) -> DateTime {
    let days = (timestamp / SECONDS_PER_DAY) as i32;
    let secs_today = timestamp % SECONDS_PER_DAY;
    let (year, month, day) = civil_from_days(days);

    DateTime {
        year,
        month,
        day,
        weekday: weekday_from_days(days),
        hour: (secs_today / 3600) as u8,
        minute: ((secs_today % 3600) / 60) as u8,
        second: (secs_today % 60) as u8,
    }
}

fn year_offset(year: u16) -> u8 {
    (year.wrapping_sub(EPOCH_YEAR) % 100) as u8
}

/// 1970-01-01 was a Thursday
fn weekday_from_days(days_since_epoch: i32) -> u8 {
    ((days_since_epoch + 3).rem_euclid(7) + 1) as u8
}

/// Convert civil date (year, month, day) to days since Unix epoch
fn days_from_civil(year: u16, month: u8, day: u8) -> i32 {
    let y = year as i32;
    let m = month as i32;
    let d = day as i32;

    // March is month 0, February is month 11
    let (y, m) = if m <= 2 { (y - 1, m + 9) } else { (y, m - 3) };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32; // year of era [0, 399]
    let doy = (153 * (m as u32) + 2) / 5 + (d as u32) - 1; // day of year [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // day of era [0, 146096]

    era * 146_097 + (doe as i32) - UNIX_EPOCH_DAYS
}

/// Convert days since Unix epoch to civil date (year, month, day)
fn civil_from_days(days_since_epoch: i32) -> (u16, u8, u8) {
    let z = days_since_epoch + UNIX_EPOCH_DAYS;

    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u32; // day of era [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let y = (yoe as i32) + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11], March first
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = if m <= 2 { y + 1 } else { y };

    (year as u16, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_conversion() {
        assert_eq!(bin_to_bcd(0), 0x00);
        assert_eq!(bin_to_bcd(9), 0x09);
        assert_eq!(bin_to_bcd(10), 0x10);
        assert_eq!(bin_to_bcd(59), 0x59);
        assert_eq!(bcd_to_bin(0x23), 23);
        assert_eq!(bcd_to_bin(0x99), 99);
    }

    #[test]
    fn test_leap_year() {
        assert!(is_leap_year(2000)); // Divisible by 400
        assert!(is_leap_year(2024)); // Divisible by 4
        assert!(!is_leap_year(1900)); // Divisible by 100, not 400
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(2100));
    }

    #[test]
    fn test_new_year_2024() {
        let dt = DateTime::new(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(dt.weekday, 1); // Monday

        let (time, date) = encode(&dt);
        assert_eq!(time, 0x0000_0000);
        assert_eq!(date, 0x0101_0124);

        assert_eq!(decode(time, date), dt);
        assert_eq!(dt.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_encode_layout() {
        let dt = DateTime {
            year: 2037,
            month: 12,
            day: 31,
            weekday: 4,
            hour: 23,
            minute: 59,
            second: 58,
        };
        assert_eq!(encode(&dt), (0x0023_5958, 0x0431_1237));
    }

    #[test]
    fn test_round_trip_all_dates() {
        let times = [(0, 0, 0), (12, 34, 56), (23, 59, 59)];

        for year in EPOCH_YEAR..EPOCH_YEAR + 100 {
            for month in 1..=12 {
                for day in 1..=days_in_month(year, month) {
                    for &(hour, minute, second) in &times {
                        let dt = DateTime::new(year, month, day, hour, minute, second).unwrap();
                        let (time, date) = encode(&dt);
                        assert_eq!(decode(time, date), dt, "round trip failed for {:?}", dt);
                    }
                }
            }
        }
    }

    #[test]
    fn test_year_2100_wraps() {
        let dt = DateTime {
            year: 2100,
            month: 1,
            day: 1,
            weekday: 5,
            hour: 0,
            minute: 0,
            second: 0,
        };
        let (time, date) = encode(&dt);
        assert_eq!(date & 0xFF, 0x00);
        assert_eq!(decode(time, date).year, 2000);
    }

    #[test]
    fn test_timestamp_known_values() {
        let y2k = DateTime::new(2000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(y2k.timestamp(), 946_684_800);

        let y2038 = DateTime::new(2038, 1, 19, 3, 14, 7).unwrap();
        assert_eq!(y2038.timestamp(), 2_147_483_647);
    }

    #[test]
    fn test_from_timestamp() {
        for &secs in &[946_684_800u32, 1_609_459_200, 1_704_067_200, 2_147_483_647] {
            let dt = from_timestamp(secs);
            assert!(dt.is_valid(), "{:?}", dt);
            assert_eq!(dt.timestamp(), secs);
        }

        // 2024-02-29 12:00:00, a Thursday
        let leap_day = from_timestamp(1_709_208_000);
        assert_eq!((leap_day.year, leap_day.month, leap_day.day), (2024, 2, 29));
        assert_eq!(leap_day.hour, 12);
        assert_eq!(leap_day.weekday, 4);
    }

    #[test]
    fn test_weekday() {
        assert_eq!(weekday(2000, 1, 1), 6); // Saturday
        assert_eq!(weekday(2024, 1, 7), 7); // Sunday
        assert_eq!(weekday(2099, 12, 31), 4); // Thursday
    }

    #[test]
    fn test_validation() {
        assert_eq!(DateTime::new(1999, 1, 1, 0, 0, 0), Err(DateTimeError::Year));
        assert_eq!(DateTime::new(2100, 1, 1, 0, 0, 0), Err(DateTimeError::Year));
        assert_eq!(DateTime::new(2024, 13, 1, 0, 0, 0), Err(DateTimeError::Month));
        assert_eq!(DateTime::new(2023, 2, 29, 0, 0, 0), Err(DateTimeError::Day));
        assert_eq!(DateTime::new(2024, 4, 31, 0, 0, 0), Err(DateTimeError::Day));
        assert_eq!(DateTime::new(2024, 1, 1, 24, 0, 0), Err(DateTimeError::Hour));
        assert_eq!(DateTime::new(2024, 1, 1, 0, 60, 0), Err(DateTimeError::Minute));
        assert_eq!(DateTime::new(2024, 1, 1, 0, 0, 60), Err(DateTimeError::Second));
        assert!(DateTime::new(2024, 2, 29, 0, 0, 0).is_ok());

        let mut dt = DateTime::new(2024, 1, 1, 0, 0, 0).unwrap();
        dt.weekday = 0;
        assert_eq!(dt.validate(), Err(DateTimeError::Weekday));
        assert!(!DateTime::default().is_valid());
    }

    #[test]
    fn test_alarm_time_word() {
        let dt = DateTime::new(2024, 6, 15, 7, 30, 5).unwrap();
        let word = encode_time(&dt);
        assert_eq!(word, 0x0007_3005);

        let decoded = decode_time(word);
        assert_eq!((decoded.hour, decoded.minute, decoded.second), (7, 30, 5));
        assert_eq!(decoded.year, 0);
        assert_eq!(decoded.day, 0);
    }
}
