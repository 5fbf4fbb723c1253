//! The accessor seam between temporal values and the formatting engine.
//!
//! Formatting units never see concrete date or time types; they query a
//! [`TemporalAccessor`] for field values and, for the zone units, an
//! attached zone. Anything that can answer those queries can be
//! formatted.

use core::fmt;

use crate::field::{ChronoField, Field, IsoField, WeekField};
use crate::iso::{IsoDate, IsoDateTime, IsoTime};
use crate::zone::{ZoneId, ZoneOffset};
use crate::DateTimeResult;

pub trait TemporalAccessor {
    /// The value of `field`, or `None` when this value cannot supply it.
    fn get_field(&self, field: Field) -> Option<i64>;

    /// The attached time zone, if any.
    fn zone(&self) -> Option<ZoneId> {
        None
    }

    /// The calendar-system id of this value. Everything in this crate
    /// is proleptic ISO.
    fn chronology(&self) -> Option<&str> {
        Some("iso8601")
    }
}

fn date_field(date: IsoDate, field: Field) -> Option<i64> {
    match field {
        Field::Chrono(f) => date.get(f),
        Field::Iso(IsoField::QuarterOfYear) => Some(i64::from(date.quarter_of_year())),
        Field::Iso(IsoField::DayOfQuarter) => Some(i64::from(date.day_of_quarter())),
        Field::Week(WeekField::LocalDayOfWeek) => Some(i64::from(date.day_of_week())),
        Field::Week(WeekField::WeekOfMonth) => Some(i64::from(date.week_of_month())),
        Field::Week(WeekField::WeekOfWeekBasedYear) => Some(i64::from(date.iso_week().1)),
        Field::Week(WeekField::WeekBasedYear) => Some(i64::from(date.iso_week().0)),
    }
}

impl TemporalAccessor for IsoDate {
    fn get_field(&self, field: Field) -> Option<i64> {
        date_field(*self, field)
    }
}

impl TemporalAccessor for IsoTime {
    fn get_field(&self, field: Field) -> Option<i64> {
        match field {
            Field::Chrono(f) => self.get(f),
            _ => None,
        }
    }
}

impl TemporalAccessor for IsoDateTime {
    fn get_field(&self, field: Field) -> Option<i64> {
        date_field(self.date, field).or_else(|| self.time.get_field(field))
    }
}

/// A date-time with a resolved offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetDateTime {
    pub datetime: IsoDateTime,
    pub offset: ZoneOffset,
}

impl OffsetDateTime {
    pub const fn new(datetime: IsoDateTime, offset: ZoneOffset) -> Self {
        Self { datetime, offset }
    }

    pub fn from_epoch_seconds(
        epoch_seconds: i64,
        nanosecond: u32,
        offset: ZoneOffset,
    ) -> DateTimeResult<Self> {
        Ok(Self {
            datetime: IsoDateTime::from_epoch_seconds(
                epoch_seconds,
                nanosecond,
                offset.total_seconds(),
            )?,
            offset,
        })
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.datetime.to_epoch_seconds(self.offset.total_seconds())
    }
}

impl TemporalAccessor for OffsetDateTime {
    fn get_field(&self, field: Field) -> Option<i64> {
        match field {
            Field::Chrono(ChronoField::OffsetSeconds) => {
                Some(i64::from(self.offset.total_seconds()))
            }
            Field::Chrono(ChronoField::InstantSeconds) => Some(self.epoch_seconds()),
            _ => self.datetime.get_field(field),
        }
    }

    // No `zone` override: an offset date-time carries an offset, not a
    // zone. Lenient zone lookups rebuild one from the offset field.
}

impl fmt::Display for OffsetDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.datetime, self.offset)
    }
}

/// A date-time paired with both an offset and a named zone.
///
/// The engine carries the zone without interpreting its rules; the
/// offset must be supplied by the caller (or by the parse).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZonedDateTime {
    pub datetime: IsoDateTime,
    pub offset: ZoneOffset,
    pub zone: ZoneId,
}

impl ZonedDateTime {
    pub const fn new(datetime: IsoDateTime, offset: ZoneOffset, zone: ZoneId) -> Self {
        Self {
            datetime,
            offset,
            zone,
        }
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.datetime.to_epoch_seconds(self.offset.total_seconds())
    }
}

impl TemporalAccessor for ZonedDateTime {
    fn get_field(&self, field: Field) -> Option<i64> {
        match field {
            Field::Chrono(ChronoField::OffsetSeconds) => {
                Some(i64::from(self.offset.total_seconds()))
            }
            Field::Chrono(ChronoField::InstantSeconds) => Some(self.epoch_seconds()),
            _ => self.datetime.get_field(field),
        }
    }

    fn zone(&self) -> Option<ZoneId> {
        Some(self.zone.clone())
    }
}

impl fmt::Display for ZonedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}[{}]", self.datetime, self.offset, self.zone)
    }
}
