//! Proleptic ISO-8601 calendar arithmetic.
//!
//! The civil-calendar conversions follow the days-from-civil /
//! civil-from-days decomposition over 400-year eras, which is exact for
//! the full supported year range.

use crate::error::DateTimeError;
use crate::field::{ChronoField, NANOS_PER_SECOND, SECONDS_PER_DAY};
use crate::DateTimeResult;
use core::fmt;

pub(crate) const fn floor_div(a: i64, b: i64) -> i64 {
    a.div_euclid(b)
}

pub(crate) const fn floor_mod(a: i64, b: i64) -> i64 {
    a.rem_euclid(b)
}

pub(crate) const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub(crate) const fn days_in_year(year: i32) -> u16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

pub(crate) const fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

/// A proleptic ISO calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl IsoDate {
    /// Creates a date, validating month and day against the calendar.
    pub fn new(year: i32, month: u8, day: u8) -> DateTimeResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DateTimeError::range()
                .with_message(alloc::format!("invalid month: {month} (valid values 1..=12)")));
        }
        let dim = days_in_month(year, month);
        if day < 1 || day > dim {
            return Err(DateTimeError::range().with_message(alloc::format!(
                "invalid day {day} for {year:04}-{month:02} (valid values 1..={dim})"
            )));
        }
        Ok(Self { year, month, day })
    }

    pub(crate) const fn new_unchecked(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Creates a date from a year and a 1-based ordinal day.
    pub fn of_year_day(year: i32, day_of_year: u16) -> DateTimeResult<Self> {
        let diy = days_in_year(year);
        if day_of_year < 1 || day_of_year > diy {
            return Err(DateTimeError::range().with_message(alloc::format!(
                "invalid day-of-year {day_of_year} for {year} (valid values 1..={diy})"
            )));
        }
        let mut month = 1u8;
        let mut remaining = day_of_year;
        loop {
            let dim = u16::from(days_in_month(year, month));
            if remaining <= dim {
                return Ok(Self::new_unchecked(year, month, remaining as u8));
            }
            remaining -= dim;
            month += 1;
        }
    }

    /// Days since the epoch 1970-01-01.
    pub fn to_epoch_days(self) -> i64 {
        let y = i64::from(self.year) - i64::from(self.month <= 2);
        let era = floor_div(y, 400);
        let yoe = y - era * 400;
        let m = i64::from(self.month);
        let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(self.day) - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * 146_097 + doe - 719_468
    }

    /// The inverse of [`Self::to_epoch_days`].
    pub fn from_epoch_days(epoch_days: i64) -> Self {
        let z = epoch_days + 719_468;
        let era = floor_div(z, 146_097);
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let y = yoe + era * 400;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
        let year = (y + i64::from(month <= 2)) as i32;
        Self { year, month, day }
    }

    pub fn plus_days(self, days: i64) -> Self {
        Self::from_epoch_days(self.to_epoch_days() + days)
    }

    /// 1-based ordinal day within the year.
    pub fn day_of_year(self) -> u16 {
        let mut doy = u16::from(self.day);
        for m in 1..self.month {
            doy += u16::from(days_in_month(self.year, m));
        }
        doy
    }

    /// ISO day of week, 1 = Monday .. 7 = Sunday.
    pub fn day_of_week(self) -> u8 {
        // 1970-01-01 was a Thursday.
        (floor_mod(self.to_epoch_days() + 3, 7) + 1) as u8
    }

    /// The ISO week-based year and week number.
    ///
    /// A week belongs to the year that contains its Thursday.
    pub fn iso_week(self) -> (i32, u8) {
        let dow = i64::from(self.day_of_week());
        let thursday = self.to_epoch_days() + (4 - dow);
        let thu = Self::from_epoch_days(thursday);
        let jan1 = Self::new_unchecked(thu.year, 1, 1).to_epoch_days();
        let week = ((thursday - jan1) / 7 + 1) as u8;
        (thu.year, week)
    }

    /// The number of ISO weeks in the week-based year `year` (52 or 53).
    pub fn weeks_in_iso_year(year: i32) -> u8 {
        let jan1 = Self::new_unchecked(year, 1, 1);
        let dow = jan1.day_of_week();
        if dow == 4 || (dow == 3 && is_leap_year(year)) {
            53
        } else {
            52
        }
    }

    /// ISO week of the month, 0 for days before the month's first week.
    pub fn week_of_month(self) -> u8 {
        let first = Self::new_unchecked(self.year, self.month, 1);
        let first_dow = i64::from(first.day_of_week());
        // Offset of the first Monday from the start of the month,
        // shifted so that partial leading weeks shorter than 4 days
        // count as week 0.
        let start = floor_mod(8 - first_dow, 7);
        let adjusted_start = if start >= 4 { start - 7 } else { start };
        let day = i64::from(self.day) - 1;
        ((day - adjusted_start).div_euclid(7) + 1).max(0) as u8
    }

    pub const fn quarter_of_year(self) -> u8 {
        (self.month - 1) / 3 + 1
    }

    /// 1-based ordinal day within the current quarter.
    pub fn day_of_quarter(self) -> u16 {
        let first_month = (self.quarter_of_year() - 1) * 3 + 1;
        let mut doq = u16::from(self.day);
        for m in first_month..self.month {
            doq += u16::from(days_in_month(self.year, m));
        }
        doq
    }

    /// The value of a date-based field for this date, if defined.
    pub fn get(self, field: ChronoField) -> Option<i64> {
        use ChronoField::*;
        let value = match field {
            DayOfWeek => i64::from(self.day_of_week()),
            AlignedDayOfWeekInMonth => (i64::from(self.day) - 1) % 7 + 1,
            AlignedDayOfWeekInYear => (i64::from(self.day_of_year()) - 1) % 7 + 1,
            DayOfMonth => i64::from(self.day),
            DayOfYear => i64::from(self.day_of_year()),
            EpochDay => self.to_epoch_days(),
            AlignedWeekOfMonth => (i64::from(self.day) - 1) / 7 + 1,
            AlignedWeekOfYear => (i64::from(self.day_of_year()) - 1) / 7 + 1,
            MonthOfYear => i64::from(self.month),
            ProlepticMonth => i64::from(self.year) * 12 + i64::from(self.month) - 1,
            YearOfEra => {
                if self.year >= 1 {
                    i64::from(self.year)
                } else {
                    1 - i64::from(self.year)
                }
            }
            Year => i64::from(self.year),
            Era => i64::from(self.year >= 1),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year < 0 {
            write!(f, "-{:04}-{:02}-{:02}", -self.year, self.month, self.day)
        } else {
            write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
        }
    }
}

/// A time of day with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
}

impl IsoTime {
    pub const MIDNIGHT: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
        nanosecond: 0,
    };

    pub fn new(hour: u8, minute: u8, second: u8, nanosecond: u32) -> DateTimeResult<Self> {
        if hour > 23 {
            return Err(DateTimeError::range()
                .with_message(alloc::format!("invalid hour: {hour} (valid values 0..=23)")));
        }
        if minute > 59 {
            return Err(DateTimeError::range()
                .with_message(alloc::format!("invalid minute: {minute} (valid values 0..=59)")));
        }
        if second > 59 {
            return Err(DateTimeError::range()
                .with_message(alloc::format!("invalid second: {second} (valid values 0..=59)")));
        }
        if nanosecond > 999_999_999 {
            return Err(DateTimeError::range().with_message(alloc::format!(
                "invalid nanosecond: {nanosecond} (valid values 0..=999999999)"
            )));
        }
        Ok(Self {
            hour,
            minute,
            second,
            nanosecond,
        })
    }

    pub(crate) const fn new_unchecked(hour: u8, minute: u8, second: u8, nanosecond: u32) -> Self {
        Self {
            hour,
            minute,
            second,
            nanosecond,
        }
    }

    pub const fn second_of_day(self) -> i64 {
        self.hour as i64 * 3600 + self.minute as i64 * 60 + self.second as i64
    }

    pub const fn nano_of_day(self) -> i64 {
        self.second_of_day() * NANOS_PER_SECOND + self.nanosecond as i64
    }

    pub fn from_nano_of_day(nano_of_day: i64) -> DateTimeResult<Self> {
        ChronoField::NanoOfDay
            .range()
            .check_valid_value(nano_of_day, ChronoField::NanoOfDay.into())?;
        let second_of_day = nano_of_day / NANOS_PER_SECOND;
        Ok(Self {
            hour: (second_of_day / 3600) as u8,
            minute: (second_of_day / 60 % 60) as u8,
            second: (second_of_day % 60) as u8,
            nanosecond: (nano_of_day % NANOS_PER_SECOND) as u32,
        })
    }

    /// The value of a time-based field for this time, if defined.
    pub fn get(self, field: ChronoField) -> Option<i64> {
        use ChronoField::*;
        let value = match field {
            NanoOfSecond => i64::from(self.nanosecond),
            NanoOfDay => self.nano_of_day(),
            MicroOfSecond => i64::from(self.nanosecond) / 1_000,
            MicroOfDay => self.nano_of_day() / 1_000,
            MilliOfSecond => i64::from(self.nanosecond) / 1_000_000,
            MilliOfDay => self.nano_of_day() / 1_000_000,
            SecondOfMinute => i64::from(self.second),
            SecondOfDay => self.second_of_day(),
            MinuteOfHour => i64::from(self.minute),
            MinuteOfDay => i64::from(self.hour) * 60 + i64::from(self.minute),
            HourOfAmPm => i64::from(self.hour % 12),
            ClockHourOfAmPm => {
                let h = i64::from(self.hour % 12);
                if h == 0 {
                    12
                } else {
                    h
                }
            }
            HourOfDay => i64::from(self.hour),
            ClockHourOfDay => {
                if self.hour == 0 {
                    24
                } else {
                    i64::from(self.hour)
                }
            }
            AmPmOfDay => i64::from(self.hour / 12),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for IsoTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)?;
        if self.second > 0 || self.nanosecond > 0 {
            write!(f, ":{:02}", self.second)?;
        }
        if self.nanosecond > 0 {
            let mut nanos = self.nanosecond;
            let mut digits = 9;
            while nanos % 10 == 0 {
                nanos /= 10;
                digits -= 1;
            }
            write!(f, ".{nanos:0digits$}", digits = digits as usize)?;
        }
        Ok(())
    }
}

/// A date and time of day without offset or zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDateTime {
    pub date: IsoDate,
    pub time: IsoTime,
}

impl IsoDateTime {
    pub const fn new(date: IsoDate, time: IsoTime) -> Self {
        Self { date, time }
    }

    /// Seconds since the epoch, applying `offset_seconds` as the local
    /// offset from UTC.
    pub fn to_epoch_seconds(self, offset_seconds: i32) -> i64 {
        self.date.to_epoch_days() * SECONDS_PER_DAY + self.time.second_of_day()
            - i64::from(offset_seconds)
    }

    pub fn from_epoch_seconds(
        epoch_seconds: i64,
        nanosecond: u32,
        offset_seconds: i32,
    ) -> DateTimeResult<Self> {
        let local = epoch_seconds
            .checked_add(i64::from(offset_seconds))
            .ok_or_else(|| DateTimeError::range().with_message("epoch seconds overflow"))?;
        let days = floor_div(local, SECONDS_PER_DAY);
        let second_of_day = floor_mod(local, SECONDS_PER_DAY);
        let time =
            IsoTime::from_nano_of_day(second_of_day * NANOS_PER_SECOND + i64::from(nanosecond))?;
        Ok(Self {
            date: IsoDate::from_epoch_days(days),
            time,
        })
    }

    pub fn get(self, field: ChronoField) -> Option<i64> {
        self.date.get(field).or_else(|| self.time.get(field))
    }
}

impl fmt::Display for IsoDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_day_round_trip() {
        let cases = [
            (1970, 1, 1, 0),
            (1970, 1, 2, 1),
            (1969, 12, 31, -1),
            (2000, 3, 1, 11_017),
            (2024, 2, 29, 19_782),
            (1600, 1, 1, -135_140),
        ];
        for (year, month, day, epoch) in cases {
            let date = IsoDate::new_unchecked(year, month, day);
            assert_eq!(date.to_epoch_days(), epoch, "{date}");
            assert_eq!(IsoDate::from_epoch_days(epoch), date);
        }
    }

    #[test]
    fn date_validation() {
        assert!(IsoDate::new(2023, 2, 29).is_err());
        assert!(IsoDate::new(2024, 2, 29).is_ok());
        assert!(IsoDate::new(2024, 13, 1).is_err());
        assert!(IsoDate::new(2024, 4, 31).is_err());
        assert!(IsoTime::new(24, 0, 0, 0).is_err());
        assert!(IsoTime::new(23, 59, 59, 999_999_999).is_ok());
    }

    #[test]
    fn day_of_week() {
        // 1970-01-01 was a Thursday.
        assert_eq!(IsoDate::new_unchecked(1970, 1, 1).day_of_week(), 4);
        assert_eq!(IsoDate::new_unchecked(2024, 7, 15).day_of_week(), 1);
        assert_eq!(IsoDate::new_unchecked(2024, 7, 21).day_of_week(), 7);
    }

    #[test]
    fn day_of_year_round_trip() {
        for (year, month, day) in [(2024, 12, 31), (2023, 3, 1), (2024, 3, 1), (2000, 1, 1)] {
            let date = IsoDate::new_unchecked(year, month, day);
            let doy = date.day_of_year();
            assert_eq!(IsoDate::of_year_day(year, doy).unwrap(), date);
        }
        assert_eq!(IsoDate::new_unchecked(2024, 12, 31).day_of_year(), 366);
    }

    #[test]
    fn iso_week_numbers() {
        assert_eq!(IsoDate::new_unchecked(2015, 12, 31).iso_week(), (2015, 53));
        assert_eq!(IsoDate::new_unchecked(2016, 1, 1).iso_week(), (2015, 53));
        assert_eq!(IsoDate::new_unchecked(2019, 12, 30).iso_week(), (2020, 1));
        assert_eq!(IsoDate::new_unchecked(2024, 7, 15).iso_week(), (2024, 29));
        assert_eq!(IsoDate::weeks_in_iso_year(2015), 53);
        assert_eq!(IsoDate::weeks_in_iso_year(2016), 52);
        assert_eq!(IsoDate::weeks_in_iso_year(2020), 53);
    }

    #[test]
    fn quarters() {
        assert_eq!(IsoDate::new_unchecked(2024, 7, 15).quarter_of_year(), 3);
        assert_eq!(IsoDate::new_unchecked(2024, 7, 15).day_of_quarter(), 15);
        assert_eq!(IsoDate::new_unchecked(2023, 3, 31).day_of_quarter(), 90);
        assert_eq!(IsoDate::new_unchecked(2024, 12, 31).day_of_quarter(), 92);
    }

    #[test]
    fn time_fields() {
        let time = IsoTime::new_unchecked(13, 45, 30, 500_000_000);
        assert_eq!(time.get(ChronoField::HourOfAmPm), Some(1));
        assert_eq!(time.get(ChronoField::ClockHourOfAmPm), Some(1));
        assert_eq!(time.get(ChronoField::AmPmOfDay), Some(1));
        assert_eq!(time.get(ChronoField::MilliOfSecond), Some(500));
        let midnight = IsoTime::MIDNIGHT;
        assert_eq!(midnight.get(ChronoField::ClockHourOfDay), Some(24));
        assert_eq!(midnight.get(ChronoField::ClockHourOfAmPm), Some(12));
    }

    #[test]
    fn epoch_seconds_round_trip() {
        let dt = IsoDateTime::new(
            IsoDate::new_unchecked(2024, 7, 15),
            IsoTime::new_unchecked(8, 30, 0, 0),
        );
        let secs = dt.to_epoch_seconds(3600);
        assert_eq!(
            IsoDateTime::from_epoch_seconds(secs, 0, 3600).unwrap(),
            dt
        );
        assert_eq!(
            IsoDateTime::new(
                IsoDate::new_unchecked(1970, 1, 1),
                IsoTime::MIDNIGHT
            )
            .to_epoch_seconds(0),
            0
        );
    }

    #[test]
    fn display() {
        let dt = IsoDateTime::new(
            IsoDate::new_unchecked(2024, 1, 2),
            IsoTime::new_unchecked(3, 4, 5, 123_450_000),
        );
        assert_eq!(dt.to_string(), "2024-01-02T03:04:05.12345");
    }
}
