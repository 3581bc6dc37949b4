//! Date/time value object and the 7-byte clock register codec.
//!
//! [`DateTime`] is a transient value object: it is produced by decoding the
//! 7 raw clock registers and consumed by encoding back into them. Hours are
//! always normalized to 24-hour representation on decode, whatever mode the
//! device happens to be in, and always written back in 24-hour form.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::bcd::{decode_bcd, encode_bcd};
use crate::registers::{HOUR_MODE_12H, HOUR_PM, MONTH_CENTURY};
use crate::Error;

/// A calendar date and wall-clock time as kept by the device.
///
/// `year` spans 2000–2099; the century is fixed by the hardware. `weekday`
/// is a user-defined day-of-week counter (1–7) that the device increments at
/// midnight; the driver assigns no meaning to which day is 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    /// Year, 2000–2099 (two-digit values 0–99 are accepted on write)
    pub year: u16,
    /// Month, 1–12
    pub month: u8,
    /// Day of month, 1–31
    pub day: u8,
    /// Day of week, 1–7 (0 when never set)
    pub weekday: u8,
    /// Hour, 0–23
    pub hour: u8,
    /// Minute, 0–59
    pub minute: u8,
    /// Second, 0–59
    pub second: u8,
}

impl DateTime {
    /// Creates a value with the given date and time of day.
    ///
    /// `second` and `weekday` start at 0; use [`DateTime::with_second`] and
    /// [`DateTime::with_weekday`] to fill them in.
    #[must_use]
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> Self {
        DateTime {
            year,
            month,
            day,
            weekday: 0,
            hour,
            minute,
            second: 0,
        }
    }

    /// Sets the seconds field.
    #[must_use]
    pub fn with_second(mut self, second: u8) -> Self {
        self.second = second;
        self
    }

    /// Sets the day-of-week field.
    #[must_use]
    pub fn with_weekday(mut self, weekday: u8) -> Self {
        self.weekday = weekday;
        self
    }

    /// Encodes into the 7 clock register bytes.
    ///
    /// The hour byte is always written in 24-hour form (mode bit clear), the
    /// century flag is written as 0 and the year is truncated to its last
    /// two decimal digits, so both `23` and `2023` encode as `0x23`.
    pub(crate) fn to_registers<E>(&self) -> Result<[u8; 7], Error<E>> {
        self.validate()?;
        Ok([
            encode_bcd(self.second),
            encode_bcd(self.minute),
            encode_bcd(self.hour),
            encode_bcd(self.weekday),
            encode_bcd(self.day),
            encode_bcd(self.month) & !MONTH_CENTURY,
            encode_bcd((self.year % 100) as u8),
        ])
    }

    /// Decodes the 7 clock register bytes.
    ///
    /// The hour byte is inspected for the 12-hour mode bit: in 12-hour mode
    /// the BCD hour is taken from the low five bits and 12 is added when the
    /// PM bit is set; in 24-hour mode the low six bits decode directly. The
    /// century flag is masked out of the month and the year is always
    /// reported as 2000 plus the stored two digits, whatever the flag says.
    ///
    /// Registers holding non-decimal nibbles decode to garbage; the device
    /// never produces such values on its own.
    pub(crate) fn from_registers(data: &[u8; 7]) -> Self {
        let hour_reg = data[2];
        let hour = if hour_reg & HOUR_MODE_12H != 0 {
            let base = decode_bcd(hour_reg & 0x1F);
            if hour_reg & HOUR_PM != 0 {
                base + 12
            } else {
                base
            }
        } else {
            decode_bcd(hour_reg & 0x3F)
        };
        DateTime {
            second: decode_bcd(data[0]),
            minute: decode_bcd(data[1]),
            hour,
            weekday: decode_bcd(data[3]),
            day: decode_bcd(data[4]),
            month: decode_bcd(data[5] & !MONTH_CENTURY),
            year: 2000 + u16::from(decode_bcd(data[6])),
        }
    }

    fn validate<E>(&self) -> Result<(), Error<E>> {
        if self.year > 99 && !(2000..=2099).contains(&self.year) {
            return Err(Error::InvalidValue("year must be 0-99 or 2000-2099"));
        }
        if self.month == 0 || self.month > 12 {
            return Err(Error::InvalidValue("month must be 1-12"));
        }
        if self.day == 0 || self.day > 31 {
            return Err(Error::InvalidValue("day must be 1-31"));
        }
        if self.weekday > 7 {
            return Err(Error::InvalidValue("weekday must be 1-7"));
        }
        if self.hour > 23 {
            return Err(Error::InvalidValue("hour must be 0-23"));
        }
        if self.minute > 59 {
            return Err(Error::InvalidValue("minute must be 0-59"));
        }
        if self.second > 59 {
            return Err(Error::InvalidValue("second must be 0-59"));
        }
        Ok(())
    }
}

impl TryFrom<&NaiveDateTime> for DateTime {
    type Error = &'static str;

    /// Converts from chrono, with the weekday numbered from Sunday = 1.
    fn try_from(dt: &NaiveDateTime) -> Result<Self, Self::Error> {
        let year = dt.year();
        if !(2000..=2099).contains(&year) {
            return Err("year must be 2000-2099");
        }
        Ok(DateTime {
            year: year as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            weekday: dt.weekday().number_from_sunday() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        })
    }
}

impl TryFrom<&DateTime> for NaiveDateTime {
    type Error = &'static str;

    fn try_from(dt: &DateTime) -> Result<Self, Self::Error> {
        let year = if dt.year <= 99 {
            2000 + i32::from(dt.year)
        } else {
            i32::from(dt.year)
        };
        NaiveDate::from_ymd_opt(year, u32::from(dt.month), u32::from(dt.day))
            .and_then(|d| {
                d.and_hms_opt(
                    u32::from(dt.hour),
                    u32::from(dt.minute),
                    u32::from(dt.second),
                )
            })
            .ok_or("not a valid calendar date")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    fn encode(dt: &DateTime) -> [u8; 7] {
        dt.to_registers::<Infallible>().unwrap()
    }

    fn encode_err(dt: &DateTime) -> Error<Infallible> {
        dt.to_registers::<Infallible>().unwrap_err()
    }

    #[test]
    fn encode_packs_all_fields() {
        // 2023-06-15 10:30:45, weekday 4
        let dt = DateTime::new(2023, 6, 15, 10, 30)
            .with_second(45)
            .with_weekday(4);
        assert_eq!(
            encode(&dt),
            [0x45, 0x30, 0x10, 0x04, 0x15, 0x06, 0x23]
        );
    }

    #[test]
    fn encode_accepts_two_digit_year() {
        let dt = DateTime::new(23, 6, 15, 10, 30);
        assert_eq!(encode(&dt)[6], 0x23);
    }

    #[test]
    fn encode_defaults_second_and_weekday_to_zero() {
        let dt = DateTime::new(2024, 1, 1, 0, 0);
        let data = encode(&dt);
        assert_eq!(data[0], 0x00);
        assert_eq!(data[3], 0x00);
    }

    #[test]
    fn encode_forces_24_hour_representation() {
        let dt = DateTime::new(2024, 1, 1, 23, 0);
        let data = encode(&dt);
        assert_eq!(data[2], 0x23);
        assert_eq!(data[2] & HOUR_MODE_12H, 0);
    }

    #[test]
    fn encode_masks_century_bit() {
        let dt = DateTime::new(2099, 12, 31, 0, 0);
        assert_eq!(encode(&dt)[5] & MONTH_CENTURY, 0);
    }

    #[test]
    fn decode_24_hour_mode() {
        let dt = DateTime::from_registers(&[0x00, 0x30, 0x23, 0x04, 0x14, 0x03, 0x24]);
        assert_eq!(dt.hour, 23);
        assert_eq!(dt.minute, 30);
        assert_eq!(dt.second, 0);
        assert_eq!(dt.weekday, 4);
        assert_eq!(dt.day, 14);
        assert_eq!(dt.month, 3);
        assert_eq!(dt.year, 2024);
    }

    #[test]
    fn decode_12_hour_mode() {
        // Mode bit set, PM set, BCD hour 3 -> 15
        let pm = HOUR_MODE_12H | HOUR_PM | 0x03;
        assert_eq!(
            DateTime::from_registers(&[0, 0, pm, 1, 1, 1, 0]).hour,
            15
        );
        // Mode bit set, PM clear, BCD hour 3 -> 3
        let am = HOUR_MODE_12H | 0x03;
        assert_eq!(DateTime::from_registers(&[0, 0, am, 1, 1, 1, 0]).hour, 3);
        // Mode bit clear, BCD 0x23 -> 23
        assert_eq!(
            DateTime::from_registers(&[0, 0, 0x23, 1, 1, 1, 0]).hour,
            23
        );
    }

    #[test]
    fn decode_ignores_century_flag_in_month() {
        let dt = DateTime::from_registers(&[0, 0, 0, 1, 0x01, MONTH_CENTURY | 0x06, 0x05]);
        assert_eq!(dt.month, 6);
        // The year window is anchored at 2000 regardless of the flag.
        assert_eq!(dt.year, 2005);
    }

    #[test]
    fn round_trip_at_range_boundaries() {
        let cases = [
            DateTime::new(2000, 1, 1, 0, 0).with_second(0).with_weekday(6),
            DateTime::new(2099, 12, 31, 23, 59).with_second(59).with_weekday(5),
            DateTime::new(2023, 1, 31, 12, 1).with_second(30).with_weekday(2),
            DateTime::new(2050, 12, 1, 6, 6).with_second(6).with_weekday(4),
        ];
        for dt in cases {
            assert_eq!(DateTime::from_registers(&encode(&dt)), dt);
        }
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let base = DateTime::new(2024, 6, 15, 10, 30);
        let bad = [
            DateTime { year: 2100, ..base },
            DateTime { year: 1999, ..base },
            DateTime { month: 0, ..base },
            DateTime { month: 13, ..base },
            DateTime { day: 0, ..base },
            DateTime { day: 32, ..base },
            DateTime { weekday: 8, ..base },
            DateTime { hour: 24, ..base },
            DateTime { minute: 60, ..base },
            DateTime { second: 60, ..base },
        ];
        for dt in bad {
            assert!(
                matches!(encode_err(&dt), Error::InvalidValue(_)),
                "expected rejection of {dt:?}"
            );
        }
    }

    #[test]
    fn chrono_round_trip() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 45)
            .unwrap();
        let dt = DateTime::try_from(&naive).unwrap();
        assert_eq!(dt.weekday, 5); // 2024-03-14 is a Thursday
        assert_eq!(NaiveDateTime::try_from(&dt).unwrap(), naive);
    }

    #[test]
    fn chrono_rejects_out_of_window_years() {
        let naive = NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert!(DateTime::try_from(&naive).is_err());
    }

    #[test]
    fn chrono_rejects_impossible_dates() {
        // Day 31 is a valid register value but not a valid February date.
        let dt = DateTime::new(2023, 2, 31, 0, 0);
        assert!(NaiveDateTime::try_from(&dt).is_err());
    }
}
