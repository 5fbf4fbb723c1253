//! Temporal field identifiers and their valid value ranges.
//!
//! A field is a named, range-bounded temporal quantity. The engine stores
//! parsed values keyed by [`Field`], which is either one of the built-in
//! [`ChronoField`]s or a locale-dependent [`WeekField`].

use crate::{DateTimeError, DateTimeResult};
use core::fmt;

pub(crate) const SECONDS_PER_DAY: i64 = 86_400;
pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub(crate) const NANOS_PER_DAY: i64 = SECONDS_PER_DAY * NANOS_PER_SECOND;

/// The supported range of proleptic years.
pub(crate) const MIN_YEAR: i64 = -999_999_999;
pub(crate) const MAX_YEAR: i64 = 999_999_999;

/// The range of valid values for a field.
///
/// Both bounds may themselves vary (e.g. day-of-month has a smallest
/// maximum of 28 and a largest maximum of 31), so each bound is stored as
/// a smallest/largest pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange {
    min_smallest: i64,
    min_largest: i64,
    max_smallest: i64,
    max_largest: i64,
}

impl ValueRange {
    /// A range with fixed minimum and maximum.
    pub const fn of(min: i64, max: i64) -> Self {
        Self {
            min_smallest: min,
            min_largest: min,
            max_smallest: max,
            max_largest: max,
        }
    }

    /// A range with a fixed minimum and a variable maximum.
    pub const fn of_variable_max(min: i64, max_smallest: i64, max_largest: i64) -> Self {
        Self {
            min_smallest: min,
            min_largest: min,
            max_smallest,
            max_largest,
        }
    }

    /// A fully variable range.
    pub const fn of_variable(
        min_smallest: i64,
        min_largest: i64,
        max_smallest: i64,
        max_largest: i64,
    ) -> Self {
        Self {
            min_smallest,
            min_largest,
            max_smallest,
            max_largest,
        }
    }

    pub const fn minimum(&self) -> i64 {
        self.min_smallest
    }

    pub const fn smallest_maximum(&self) -> i64 {
        self.max_smallest
    }

    pub const fn maximum(&self) -> i64 {
        self.max_largest
    }

    /// Whether the bounds are fixed rather than field-context dependent.
    pub const fn is_fixed(&self) -> bool {
        self.min_smallest == self.min_largest && self.max_smallest == self.max_largest
    }

    /// Whether every valid value fits in an `i32`.
    pub const fn is_int_range(&self) -> bool {
        self.min_smallest >= i32::MIN as i64 && self.max_largest <= i32::MAX as i64
    }

    pub const fn is_valid_value(&self, value: i64) -> bool {
        value >= self.min_smallest && value <= self.max_largest
    }

    /// Validates `value` against the outer bounds of the range.
    pub fn check_valid_value(&self, value: i64, field: Field) -> DateTimeResult<i64> {
        if !self.is_valid_value(value) {
            return Err(DateTimeError::range().with_message(alloc::format!(
                "invalid value for {field}: {value} (valid values {}..={})",
                self.min_smallest,
                self.max_largest
            )));
        }
        Ok(value)
    }
}

/// The built-in set of date and time fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChronoField {
    NanoOfSecond,
    NanoOfDay,
    MicroOfSecond,
    MicroOfDay,
    MilliOfSecond,
    MilliOfDay,
    SecondOfMinute,
    SecondOfDay,
    MinuteOfHour,
    MinuteOfDay,
    HourOfAmPm,
    ClockHourOfAmPm,
    HourOfDay,
    ClockHourOfDay,
    AmPmOfDay,
    DayOfWeek,
    AlignedDayOfWeekInMonth,
    AlignedDayOfWeekInYear,
    DayOfMonth,
    DayOfYear,
    EpochDay,
    AlignedWeekOfMonth,
    AlignedWeekOfYear,
    MonthOfYear,
    ProlepticMonth,
    YearOfEra,
    Year,
    Era,
    InstantSeconds,
    OffsetSeconds,
}

impl ChronoField {
    /// The valid value range of this field.
    pub const fn range(self) -> ValueRange {
        use ChronoField::*;
        match self {
            NanoOfSecond => ValueRange::of(0, 999_999_999),
            NanoOfDay => ValueRange::of(0, NANOS_PER_DAY - 1),
            MicroOfSecond => ValueRange::of(0, 999_999),
            MicroOfDay => ValueRange::of(0, SECONDS_PER_DAY * 1_000_000 - 1),
            MilliOfSecond => ValueRange::of(0, 999),
            MilliOfDay => ValueRange::of(0, SECONDS_PER_DAY * 1_000 - 1),
            SecondOfMinute => ValueRange::of(0, 59),
            SecondOfDay => ValueRange::of(0, SECONDS_PER_DAY - 1),
            MinuteOfHour => ValueRange::of(0, 59),
            MinuteOfDay => ValueRange::of(0, 24 * 60 - 1),
            HourOfAmPm => ValueRange::of(0, 11),
            ClockHourOfAmPm => ValueRange::of(1, 12),
            HourOfDay => ValueRange::of(0, 23),
            ClockHourOfDay => ValueRange::of(1, 24),
            AmPmOfDay => ValueRange::of(0, 1),
            DayOfWeek => ValueRange::of(1, 7),
            AlignedDayOfWeekInMonth => ValueRange::of(1, 7),
            AlignedDayOfWeekInYear => ValueRange::of(1, 7),
            DayOfMonth => ValueRange::of_variable_max(1, 28, 31),
            DayOfYear => ValueRange::of_variable_max(1, 365, 366),
            EpochDay => ValueRange::of(-365_243_219_162, 365_241_780_471),
            AlignedWeekOfMonth => ValueRange::of_variable_max(1, 4, 5),
            AlignedWeekOfYear => ValueRange::of(1, 53),
            MonthOfYear => ValueRange::of(1, 12),
            ProlepticMonth => ValueRange::of(MIN_YEAR * 12, MAX_YEAR * 12 + 11),
            YearOfEra => ValueRange::of_variable_max(1, MAX_YEAR, MAX_YEAR + 1),
            Year => ValueRange::of(MIN_YEAR, MAX_YEAR),
            Era => ValueRange::of(0, 1),
            InstantSeconds => ValueRange::of(i64::MIN, i64::MAX),
            OffsetSeconds => ValueRange::of(-18 * 3600, 18 * 3600),
        }
    }

    /// Whether this field forms part of a date.
    pub const fn is_date_based(self) -> bool {
        use ChronoField::*;
        matches!(
            self,
            DayOfWeek
                | AlignedDayOfWeekInMonth
                | AlignedDayOfWeekInYear
                | DayOfMonth
                | DayOfYear
                | EpochDay
                | AlignedWeekOfMonth
                | AlignedWeekOfYear
                | MonthOfYear
                | ProlepticMonth
                | YearOfEra
                | Year
                | Era
        )
    }

    /// Whether this field forms part of a time of day.
    pub const fn is_time_based(self) -> bool {
        use ChronoField::*;
        matches!(
            self,
            NanoOfSecond
                | NanoOfDay
                | MicroOfSecond
                | MicroOfDay
                | MilliOfSecond
                | MilliOfDay
                | SecondOfMinute
                | SecondOfDay
                | MinuteOfHour
                | MinuteOfDay
                | HourOfAmPm
                | ClockHourOfAmPm
                | HourOfDay
                | ClockHourOfDay
                | AmPmOfDay
        )
    }

    pub const fn name(self) -> &'static str {
        use ChronoField::*;
        match self {
            NanoOfSecond => "NanoOfSecond",
            NanoOfDay => "NanoOfDay",
            MicroOfSecond => "MicroOfSecond",
            MicroOfDay => "MicroOfDay",
            MilliOfSecond => "MilliOfSecond",
            MilliOfDay => "MilliOfDay",
            SecondOfMinute => "SecondOfMinute",
            SecondOfDay => "SecondOfDay",
            MinuteOfHour => "MinuteOfHour",
            MinuteOfDay => "MinuteOfDay",
            HourOfAmPm => "HourOfAmPm",
            ClockHourOfAmPm => "ClockHourOfAmPm",
            HourOfDay => "HourOfDay",
            ClockHourOfDay => "ClockHourOfDay",
            AmPmOfDay => "AmPmOfDay",
            DayOfWeek => "DayOfWeek",
            AlignedDayOfWeekInMonth => "AlignedDayOfWeekInMonth",
            AlignedDayOfWeekInYear => "AlignedDayOfWeekInYear",
            DayOfMonth => "DayOfMonth",
            DayOfYear => "DayOfYear",
            EpochDay => "EpochDay",
            AlignedWeekOfMonth => "AlignedWeekOfMonth",
            AlignedWeekOfYear => "AlignedWeekOfYear",
            MonthOfYear => "MonthOfYear",
            ProlepticMonth => "ProlepticMonth",
            YearOfEra => "YearOfEra",
            Year => "Year",
            Era => "Era",
            InstantSeconds => "InstantSeconds",
            OffsetSeconds => "OffsetSeconds",
        }
    }

    /// Range-checks `value` and narrows it to `i32`.
    pub fn check_valid_int_value(self, value: i64) -> DateTimeResult<i32> {
        let checked = self.range().check_valid_value(value, Field::Chrono(self))?;
        i32::try_from(checked)
            .map_err(|_| DateTimeError::range().with_message("field value exceeds i32 range"))
    }
}

impl fmt::Display for ChronoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Calendar-system-specific fields of the ISO calendar that are not part
/// of [`ChronoField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IsoField {
    /// Quarter of the year, 1 to 4.
    QuarterOfYear,
    /// Day within the quarter, 1 to 90/91/92.
    DayOfQuarter,
}

impl IsoField {
    pub const fn range(self) -> ValueRange {
        match self {
            IsoField::QuarterOfYear => ValueRange::of(1, 4),
            IsoField::DayOfQuarter => ValueRange::of_variable_max(1, 90, 92),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            IsoField::QuarterOfYear => "QuarterOfYear",
            IsoField::DayOfQuarter => "DayOfQuarter",
        }
    }
}

impl fmt::Display for IsoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Week-based fields.
///
/// These depend on a locale's week definition; this crate ships the ISO
/// definition (Monday first day, 4-day minimal week) for every locale.
/// Unlike [`ChronoField`]s they self-resolve during phase 2 of parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeekField {
    /// Day of week numbered from the locale's first day of week.
    LocalDayOfWeek,
    /// Week of the current month.
    WeekOfMonth,
    /// Week of the week-based year.
    WeekOfWeekBasedYear,
    /// Year of the week-based calendar.
    WeekBasedYear,
}

impl WeekField {
    pub const fn range(self) -> ValueRange {
        match self {
            WeekField::LocalDayOfWeek => ValueRange::of(1, 7),
            WeekField::WeekOfMonth => ValueRange::of_variable(0, 1, 4, 6),
            WeekField::WeekOfWeekBasedYear => ValueRange::of_variable(1, 1, 52, 53),
            WeekField::WeekBasedYear => ValueRange::of(MIN_YEAR, MAX_YEAR),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            WeekField::LocalDayOfWeek => "DayOfWeek[ISO]",
            WeekField::WeekOfMonth => "WeekOfMonth[ISO]",
            WeekField::WeekOfWeekBasedYear => "WeekOfWeekBasedYear[ISO]",
            WeekField::WeekBasedYear => "WeekBasedYear[ISO]",
        }
    }
}

impl fmt::Display for WeekField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any field the engine can store a parsed value for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Chrono(ChronoField),
    Iso(IsoField),
    Week(WeekField),
}

impl Field {
    pub const fn range(self) -> ValueRange {
        match self {
            Field::Chrono(f) => f.range(),
            Field::Iso(f) => f.range(),
            Field::Week(f) => f.range(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Field::Chrono(f) => f.name(),
            Field::Iso(f) => f.name(),
            Field::Week(f) => f.name(),
        }
    }

    pub const fn is_date_based(self) -> bool {
        match self {
            Field::Chrono(f) => f.is_date_based(),
            Field::Iso(_) | Field::Week(_) => true,
        }
    }

    pub const fn is_time_based(self) -> bool {
        match self {
            Field::Chrono(f) => f.is_time_based(),
            Field::Iso(_) | Field::Week(_) => false,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ChronoField> for Field {
    fn from(value: ChronoField) -> Self {
        Field::Chrono(value)
    }
}

impl From<IsoField> for Field {
    fn from(value: IsoField) -> Self {
        Field::Iso(value)
    }
}

impl From<WeekField> for Field {
    fn from(value: WeekField) -> Self {
        Field::Week(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_validation() {
        assert!(ChronoField::HourOfDay.range().is_valid_value(0));
        assert!(ChronoField::HourOfDay.range().is_valid_value(23));
        assert!(!ChronoField::HourOfDay.range().is_valid_value(24));
        assert!(ChronoField::ClockHourOfDay.range().is_valid_value(24));
        assert!(!ChronoField::ClockHourOfDay.range().is_valid_value(0));
    }

    #[test]
    fn check_valid_value_reports_field() {
        let err = ChronoField::MonthOfYear
            .range()
            .check_valid_value(13, Field::Chrono(ChronoField::MonthOfYear))
            .unwrap_err();
        assert!(err.message().contains("MonthOfYear"));
        assert!(err.message().contains("13"));
    }

    #[test]
    fn variable_ranges() {
        let dom = ChronoField::DayOfMonth.range();
        assert_eq!(dom.smallest_maximum(), 28);
        assert_eq!(dom.maximum(), 31);
        assert!(!dom.is_fixed());
        assert!(dom.is_int_range());
        assert!(!ChronoField::InstantSeconds.range().is_int_range());
    }

    #[test]
    fn date_time_classification() {
        assert!(ChronoField::Year.is_date_based());
        assert!(!ChronoField::Year.is_time_based());
        assert!(ChronoField::NanoOfDay.is_time_based());
        assert!(Field::Week(WeekField::WeekOfMonth).is_date_based());
    }

}
