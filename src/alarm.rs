//! Alarm specifications and their register-byte encoding.
//!
//! Each alarm register byte carries a BCD data field plus a "don't care"
//! mask bit in its top position; the day/date byte additionally selects
//! weekday or date comparison. Which mask bits are set is determined
//! entirely by the match mode, not by which data fields were provided:
//! fields the mode masks out may be left unset and encode as zero nibbles
//! that the device ignores.

use crate::bcd::encode_bcd;
use crate::registers::ALARM_WEEKDAY;
use crate::Error;

/// One of the two alarm units.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm {
    /// Alarm 1, seconds resolution
    One,
    /// Alarm 2, minutes resolution
    Two,
}

/// Alarms targeted by an interrupt-enable change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptTarget {
    /// Alarm 1 only
    Alarm1,
    /// Alarm 2 only
    Alarm2,
    /// Both alarms, each via its own read-modify-write cycle
    Both,
}

/// Which trailing time fields Alarm 1 compares against the running clock.
///
/// The discriminant is the device's A1M4..A1M1 bit pattern: a set bit marks
/// that dimension as don't-care.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm1Match {
    /// Trigger once per second
    EverySecond = 0b1111,
    /// Trigger when seconds match (once per minute)
    Seconds = 0b1110,
    /// Trigger when minutes and seconds match (once per hour)
    MinutesSeconds = 0b1100,
    /// Trigger when hours, minutes and seconds match (once per day)
    HoursMinutesSeconds = 0b1000,
    /// Trigger when day-or-date, hours, minutes and seconds all match
    DayHoursMinutesSeconds = 0b0000,
}

/// Which trailing time fields Alarm 2 compares against the running clock.
///
/// The discriminant is the device's A2M4..A2M2 bit pattern. Alarm 2 has no
/// seconds register and always fires at second 00 of the matching minute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm2Match {
    /// Trigger once per minute
    EveryMinute = 0b111,
    /// Trigger when minutes match (once per hour)
    Minutes = 0b110,
    /// Trigger when hours and minutes match (once per day)
    HoursMinutes = 0b100,
    /// Trigger when day-or-date, hours and minutes all match
    DayHoursMinutes = 0b000,
}

/// Alarm 1 settings: up to second + minute + hour + day-or-date.
///
/// Built with [`Alarm1::new`] and the `at_*`/`on_*` methods; fields the
/// match mode masks out may simply be left unset.
///
/// ```
/// use ds3231_rtc::{Alarm1, Alarm1Match};
///
/// // Fire at second 30 of every minute.
/// let alarm = Alarm1::new(Alarm1Match::Seconds).at_second(30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm1 {
    second: Option<u8>,
    minute: Option<u8>,
    hour: Option<u8>,
    day: Option<u8>,
    matching: Alarm1Match,
    use_weekday: bool,
}

/// Alarm 2 settings: up to minute + hour + day-or-date.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm2 {
    minute: Option<u8>,
    hour: Option<u8>,
    day: Option<u8>,
    matching: Alarm2Match,
    use_weekday: bool,
}

// Encodes one alarm register byte: BCD data (0 when the field is unset)
// with the don't-care bit taken from the match-mode pattern.
fn data_field<E>(
    value: Option<u8>,
    min: u8,
    max: u8,
    what: &'static str,
) -> Result<u8, Error<E>> {
    match value {
        None => Ok(0),
        Some(v) if (min..=max).contains(&v) => Ok(encode_bcd(v)),
        Some(_) => Err(Error::InvalidValue(what)),
    }
}

impl Alarm1 {
    /// Creates an Alarm 1 spec with all data fields unset.
    #[must_use]
    pub fn new(matching: Alarm1Match) -> Self {
        Alarm1 {
            second: None,
            minute: None,
            hour: None,
            day: None,
            matching,
            use_weekday: false,
        }
    }

    /// Seconds to match (0–59).
    #[must_use]
    pub fn at_second(mut self, second: u8) -> Self {
        self.second = Some(second);
        self
    }

    /// Minutes to match (0–59).
    #[must_use]
    pub fn at_minute(mut self, minute: u8) -> Self {
        self.minute = Some(minute);
        self
    }

    /// Hours to match (0–23).
    #[must_use]
    pub fn at_hour(mut self, hour: u8) -> Self {
        self.hour = Some(hour);
        self
    }

    /// Date of month to match (1–31).
    #[must_use]
    pub fn on_date(mut self, date: u8) -> Self {
        self.day = Some(date);
        self.use_weekday = false;
        self
    }

    /// Day of week to match (1–7).
    #[must_use]
    pub fn on_weekday(mut self, weekday: u8) -> Self {
        self.day = Some(weekday);
        self.use_weekday = true;
        self
    }

    /// Encodes the four Alarm 1 register bytes.
    pub(crate) fn to_registers<E>(&self) -> Result<[u8; 4], Error<E>> {
        let m = self.matching as u8;
        let day_max = if self.use_weekday { 7 } else { 31 };
        let day_kind = if self.use_weekday {
            "alarm weekday must be 1-7"
        } else {
            "alarm date must be 1-31"
        };
        let mut day_date = data_field(self.day, 1, day_max, day_kind)?;
        if self.use_weekday {
            day_date |= ALARM_WEEKDAY;
        }
        Ok([
            data_field(self.second, 0, 59, "alarm second must be 0-59")? | (m & 0b0001) << 7,
            data_field(self.minute, 0, 59, "alarm minute must be 0-59")? | (m & 0b0010) << 6,
            data_field(self.hour, 0, 23, "alarm hour must be 0-23")? | (m & 0b0100) << 5,
            day_date | (m & 0b1000) << 4,
        ])
    }
}

impl Alarm2 {
    /// Creates an Alarm 2 spec with all data fields unset.
    #[must_use]
    pub fn new(matching: Alarm2Match) -> Self {
        Alarm2 {
            minute: None,
            hour: None,
            day: None,
            matching,
            use_weekday: false,
        }
    }

    /// Minutes to match (0–59).
    #[must_use]
    pub fn at_minute(mut self, minute: u8) -> Self {
        self.minute = Some(minute);
        self
    }

    /// Hours to match (0–23).
    #[must_use]
    pub fn at_hour(mut self, hour: u8) -> Self {
        self.hour = Some(hour);
        self
    }

    /// Date of month to match (1–31).
    #[must_use]
    pub fn on_date(mut self, date: u8) -> Self {
        self.day = Some(date);
        self.use_weekday = false;
        self
    }

    /// Day of week to match (1–7).
    #[must_use]
    pub fn on_weekday(mut self, weekday: u8) -> Self {
        self.day = Some(weekday);
        self.use_weekday = true;
        self
    }

    /// Encodes the three Alarm 2 register bytes.
    pub(crate) fn to_registers<E>(&self) -> Result<[u8; 3], Error<E>> {
        let m = self.matching as u8;
        let day_max = if self.use_weekday { 7 } else { 31 };
        let day_kind = if self.use_weekday {
            "alarm weekday must be 1-7"
        } else {
            "alarm date must be 1-31"
        };
        let mut day_date = data_field(self.day, 1, day_max, day_kind)?;
        if self.use_weekday {
            day_date |= ALARM_WEEKDAY;
        }
        Ok([
            data_field(self.minute, 0, 59, "alarm minute must be 0-59")? | (m & 0b001) << 7,
            data_field(self.hour, 0, 23, "alarm hour must be 0-23")? | (m & 0b010) << 6,
            day_date | (m & 0b100) << 5,
        ])
    }
}
