//! Parse-side state: the field map populated during the scan phase and
//! the resolution algorithm that turns it into dates and times.

use alloc::format;
use alloc::vec::Vec;

use rustc_hash::FxHashMap;
use tinystr::TinyAsciiStr;

use crate::chronology::{add_field_value, Chronology, ResolverStyle};
use crate::error::DateTimeError;
use crate::field::{ChronoField, Field, IsoField, WeekField, NANOS_PER_DAY, NANOS_PER_SECOND};
use crate::formatter::DecimalStyle;
use crate::iso::{self, IsoDate, IsoDateTime, IsoTime};
use crate::locale::Locale;
use crate::temporal::TemporalAccessor;
use crate::text::DateTimeTextProvider;
use crate::zone::{ZoneId, ZoneOffset};
use crate::DateTimeResult;

/// Resolution gives up after this many passes over self-resolving
/// fields; hitting the bound means a field keeps rewriting the map.
const RESOLVE_ITERATIONS: usize = 50;

/// A cursor into the input text, tracking where an error occurred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsePosition {
    pub index: usize,
    pub error_index: Option<usize>,
}

impl ParsePosition {
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            error_index: None,
        }
    }
}

/// The raw outcome of the scan phase, and after [`Parsed::resolve`] the
/// combined date, time, and leftovers.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub(crate) fields: FxHashMap<Field, i64>,
    pub(crate) zone: Option<ZoneId>,
    pub(crate) chronology: Option<TinyAsciiStr<16>>,
    pub(crate) leap_second: bool,
    pub(crate) date: Option<IsoDate>,
    pub(crate) time: Option<IsoTime>,
    pub(crate) excess_days: i64,
}

impl Parsed {
    /// The raw or derived value of `field`.
    pub fn get(&self, field: Field) -> Option<i64> {
        if let Some(&value) = self.fields.get(&field) {
            return Some(value);
        }
        if let Some(date) = self.date {
            if let Some(value) = date.get_field(field) {
                return Some(value);
            }
        }
        if let Some(time) = self.time {
            if let Some(value) = time.get_field(field) {
                return Some(value);
            }
        }
        None
    }

    pub fn zone(&self) -> Option<&ZoneId> {
        self.zone.as_ref()
    }

    /// The calendar-system id, when one appeared in the text.
    pub fn chronology(&self) -> Option<&str> {
        self.chronology.as_ref().map(TinyAsciiStr::as_str)
    }

    pub fn date(&self) -> Option<IsoDate> {
        self.date
    }

    pub fn time(&self) -> Option<IsoTime> {
        self.time
    }

    /// Whether the input named the leap second `23:59:60`; the stored
    /// time reads `23:59:59`.
    pub fn leap_second(&self) -> bool {
        self.leap_second
    }

    /// Whole days carried out of lenient or `24:00` time resolution when
    /// no date was available to absorb them.
    pub fn excess_days(&self) -> i64 {
        self.excess_days
    }

    /// Phase 2: combines the field map into date and time values.
    pub fn resolve(
        mut self,
        style: ResolverStyle,
        filter: Option<&[Field]>,
        chronology: &dyn Chronology,
    ) -> DateTimeResult<Parsed> {
        if let Some(filter) = filter {
            self.fields.retain(|field, _| filter.contains(field));
        }
        log::trace!("resolving {} fields with {style:?} style", self.fields.len());
        self.resolve_self_resolving_fields(style)?;
        self.resolve_instant_fields()?;
        if let Some(date) = chronology.resolve_date(&mut self.fields, style)? {
            self.update_date(date)?;
        }
        self.resolve_time_fields(style)?;
        if self.excess_days != 0 {
            if let (Some(date), Some(_)) = (self.date, self.time) {
                self.date = Some(date.plus_days(self.excess_days));
                self.excess_days = 0;
            }
        }
        self.cross_check(style)?;
        self.resolve_fractional();
        self.resolve_instant()?;
        Ok(self)
    }

    fn update_date(&mut self, date: IsoDate) -> DateTimeResult<()> {
        if let Some(old) = self.date {
            if old != date {
                return Err(DateTimeError::conflict().with_message(format!(
                    "conflict found: resolved dates {old} and {date} differ"
                )));
            }
        }
        self.date = Some(date);
        Ok(())
    }

    fn remove(&mut self, field: impl Into<Field>) -> Option<i64> {
        self.fields.remove(&field.into())
    }

    fn contains(&self, field: impl Into<Field>) -> bool {
        self.fields.contains_key(&field.into())
    }

    /// Week and quarter fields combine among themselves and with the
    /// built-in fields, repeating until the map stops changing.
    fn resolve_self_resolving_fields(&mut self, style: ResolverStyle) -> DateTimeResult<()> {
        for _ in 0..RESOLVE_ITERATIONS {
            if !self.resolve_week_and_quarter(style)? {
                return Ok(());
            }
        }
        Err(DateTimeError::assert().with_message("field resolution failed to settle"))
    }

    fn resolve_week_and_quarter(&mut self, style: ResolverStyle) -> DateTimeResult<bool> {
        if let Some(ldow) = self.remove(WeekField::LocalDayOfWeek) {
            // The ISO week numbering makes the localized day-of-week
            // identical to the standard one.
            let dow = if style == ResolverStyle::Lenient {
                iso::floor_mod(ldow - 1, 7) + 1
            } else {
                WeekField::LocalDayOfWeek
                    .range()
                    .check_valid_value(ldow, WeekField::LocalDayOfWeek.into())?
            };
            add_field_value(&mut self.fields, ChronoField::DayOfWeek.into(), dow)?;
            return Ok(true);
        }
        if self.contains(WeekField::WeekBasedYear)
            && self.contains(WeekField::WeekOfWeekBasedYear)
            && self.contains(ChronoField::DayOfWeek)
        {
            let wby = self.remove(WeekField::WeekBasedYear).expect("checked");
            let week = self.remove(WeekField::WeekOfWeekBasedYear).expect("checked");
            let dow = self.remove(ChronoField::DayOfWeek).expect("checked");
            let date = Self::date_of_week_based(wby, week, dow, style)?;
            self.update_date(date)?;
            return Ok(true);
        }
        if self.contains(WeekField::WeekOfMonth)
            && self.contains(ChronoField::Year)
            && self.contains(ChronoField::MonthOfYear)
            && self.contains(ChronoField::DayOfWeek)
        {
            let week = self.remove(WeekField::WeekOfMonth).expect("checked");
            let year = self.remove(ChronoField::Year).expect("checked");
            let month = self.remove(ChronoField::MonthOfYear).expect("checked");
            let dow = self.remove(ChronoField::DayOfWeek).expect("checked");
            let date = Self::date_of_week_of_month(year, month, week, dow, style)?;
            self.update_date(date)?;
            return Ok(true);
        }
        if self.contains(IsoField::DayOfQuarter)
            && self.contains(IsoField::QuarterOfYear)
            && self.contains(ChronoField::Year)
        {
            let doq = self.remove(IsoField::DayOfQuarter).expect("checked");
            let quarter = self.remove(IsoField::QuarterOfYear).expect("checked");
            let year = self.remove(ChronoField::Year).expect("checked");
            let date = Self::date_of_quarter(year, quarter, doq, style)?;
            self.update_date(date)?;
            return Ok(true);
        }
        if self.contains(IsoField::QuarterOfYear) && self.contains(ChronoField::MonthOfYear) {
            // A quarter next to a month is a pure cross-check.
            let quarter = self.remove(IsoField::QuarterOfYear).expect("checked");
            let month = *self
                .fields
                .get(&ChronoField::MonthOfYear.into())
                .expect("checked");
            if style != ResolverStyle::Lenient && (month - 1).div_euclid(3) + 1 != quarter {
                return Err(DateTimeError::conflict().with_message(format!(
                    "conflict found: QuarterOfYear {quarter} differs from month {month}"
                )));
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn date_of_week_based(
        wby: i64,
        week: i64,
        dow: i64,
        style: ResolverStyle,
    ) -> DateTimeResult<IsoDate> {
        let year = ChronoField::Year.check_valid_int_value(wby)?;
        if style == ResolverStyle::Lenient {
            let dow = iso::floor_mod(dow - 1, 7) + 1;
            let start = Self::week_based_year_start(year);
            return Ok(start.plus_days((week - 1) * 7 + (dow - 1)));
        }
        let week = WeekField::WeekOfWeekBasedYear
            .range()
            .check_valid_value(week, WeekField::WeekOfWeekBasedYear.into())?;
        let dow = ChronoField::DayOfWeek
            .range()
            .check_valid_value(dow, ChronoField::DayOfWeek.into())?;
        let date = Self::week_based_year_start(year).plus_days((week - 1) * 7 + (dow - 1));
        if style == ResolverStyle::Strict && date.iso_week() != (year, week as u8) {
            return Err(DateTimeError::conflict().with_message(format!(
                "strict mode rejected week {week} of week-based year {wby}"
            )));
        }
        Ok(date)
    }

    /// The Monday of week 1, which is the week containing January 4th.
    fn week_based_year_start(year: i32) -> IsoDate {
        let jan4 = IsoDate::new_unchecked(year, 1, 4);
        jan4.plus_days(1 - i64::from(jan4.day_of_week()))
    }

    fn date_of_week_of_month(
        year: i64,
        month: i64,
        week: i64,
        dow: i64,
        style: ResolverStyle,
    ) -> DateTimeResult<IsoDate> {
        let y = ChronoField::Year.check_valid_int_value(year)?;
        if style == ResolverStyle::Lenient {
            let dow = iso::floor_mod(dow - 1, 7) + 1;
            let pm = i64::from(y) * 12 + (month - 1);
            let base = IsoDate::new_unchecked(
                ChronoField::Year.check_valid_int_value(iso::floor_div(pm, 12))?,
                (iso::floor_mod(pm, 12) + 1) as u8,
                1,
            );
            let start = Self::month_week_start(base);
            return Ok(start.plus_days((week - 1) * 7 + (dow - 1)));
        }
        let month = ChronoField::MonthOfYear.check_valid_int_value(month)? as u8;
        let week = WeekField::WeekOfMonth
            .range()
            .check_valid_value(week, WeekField::WeekOfMonth.into())?;
        let dow = ChronoField::DayOfWeek
            .range()
            .check_valid_value(dow, ChronoField::DayOfWeek.into())?;
        let start = Self::month_week_start(IsoDate::new_unchecked(y, month, 1));
        let date = start.plus_days((week - 1) * 7 + (dow - 1));
        if style == ResolverStyle::Strict && (date.year != y || date.month != month) {
            return Err(DateTimeError::conflict().with_message(format!(
                "strict mode rejected week {week} of {y:04}-{month:02}"
            )));
        }
        Ok(date)
    }

    /// The Monday starting week 1 of the month holding `first`, where a
    /// leading partial week shorter than four days counts as week 0.
    fn month_week_start(first: IsoDate) -> IsoDate {
        let start = iso::floor_mod(8 - i64::from(first.day_of_week()), 7);
        let adjusted = if start >= 4 { start - 7 } else { start };
        first.plus_days(adjusted)
    }

    fn date_of_quarter(
        year: i64,
        quarter: i64,
        doq: i64,
        style: ResolverStyle,
    ) -> DateTimeResult<IsoDate> {
        let y = ChronoField::Year.check_valid_int_value(year)?;
        if style == ResolverStyle::Lenient {
            let first_month = ((quarter - 1) * 3 + 1).clamp(i64::from(i32::MIN), i64::from(i32::MAX));
            let pm = i64::from(y) * 12 + (first_month - 1);
            let base = IsoDate::new_unchecked(
                ChronoField::Year.check_valid_int_value(iso::floor_div(pm, 12))?,
                (iso::floor_mod(pm, 12) + 1) as u8,
                1,
            );
            return Ok(base.plus_days(doq - 1));
        }
        let quarter = IsoField::QuarterOfYear
            .range()
            .check_valid_value(quarter, IsoField::QuarterOfYear.into())?;
        let doq = IsoField::DayOfQuarter
            .range()
            .check_valid_value(doq, IsoField::DayOfQuarter.into())?;
        let first_month = ((quarter - 1) * 3 + 1) as u8;
        let date = IsoDate::new_unchecked(y, first_month, 1).plus_days(doq - 1);
        if style == ResolverStyle::Strict && i64::from(date.quarter_of_year()) != quarter {
            return Err(DateTimeError::conflict().with_message(format!(
                "strict mode rejected day {doq} of quarter {quarter}"
            )));
        }
        Ok(date)
    }

    /// An instant plus a known offset pins down the date and the second
    /// of day. Region zones without an offset cannot be applied here
    /// because the engine carries no zone rules.
    fn resolve_instant_fields(&mut self) -> DateTimeResult<()> {
        if !self.contains(ChronoField::InstantSeconds) {
            return Ok(());
        }
        let offset = match self.zone.as_ref().and_then(ZoneId::as_offset) {
            Some(offset) => offset.total_seconds(),
            None => match self.fields.get(&ChronoField::OffsetSeconds.into()) {
                Some(&secs) => secs as i32,
                None => return Ok(()),
            },
        };
        let secs = self.remove(ChronoField::InstantSeconds).expect("checked");
        let datetime = IsoDateTime::from_epoch_seconds(secs, 0, offset)?;
        self.update_date(datetime.date)?;
        add_field_value(
            &mut self.fields,
            ChronoField::SecondOfDay.into(),
            datetime.time.second_of_day(),
        )
    }

    fn resolve_time_fields(&mut self, style: ResolverStyle) -> DateTimeResult<()> {
        use ChronoField::*;
        let lenient = style == ResolverStyle::Lenient;

        if let Some(ch) = self.remove(ClockHourOfDay) {
            if style == ResolverStyle::Strict || (style == ResolverStyle::Smart && ch != 0) {
                ClockHourOfDay.range().check_valid_value(ch, ClockHourOfDay.into())?;
            }
            let hour = if ch == 24 { 0 } else { ch };
            add_field_value(&mut self.fields, HourOfDay.into(), hour)?;
        }
        if let Some(ch) = self.remove(ClockHourOfAmPm) {
            if style == ResolverStyle::Strict || (style == ResolverStyle::Smart && ch != 0) {
                ClockHourOfAmPm
                    .range()
                    .check_valid_value(ch, ClockHourOfAmPm.into())?;
            }
            let hour = if ch == 12 { 0 } else { ch };
            add_field_value(&mut self.fields, HourOfAmPm.into(), hour)?;
        }
        if self.contains(AmPmOfDay) && self.contains(HourOfAmPm) {
            let ap = self.remove(AmPmOfDay).expect("checked");
            let hap = self.remove(HourOfAmPm).expect("checked");
            if !lenient {
                AmPmOfDay.range().check_valid_value(ap, AmPmOfDay.into())?;
                HourOfAmPm.range().check_valid_value(hap, HourOfAmPm.into())?;
            }
            add_field_value(&mut self.fields, HourOfDay.into(), ap * 12 + hap)?;
        }
        if let Some(nod) = self.remove(NanoOfDay) {
            if !lenient {
                NanoOfDay.range().check_valid_value(nod, NanoOfDay.into())?;
            }
            add_field_value(&mut self.fields, SecondOfDay.into(), nod.div_euclid(NANOS_PER_SECOND))?;
            add_field_value(
                &mut self.fields,
                NanoOfSecond.into(),
                nod.rem_euclid(NANOS_PER_SECOND),
            )?;
        }
        if let Some(cod) = self.remove(MicroOfDay) {
            if !lenient {
                MicroOfDay.range().check_valid_value(cod, MicroOfDay.into())?;
            }
            add_field_value(&mut self.fields, SecondOfDay.into(), cod.div_euclid(1_000_000))?;
            add_field_value(
                &mut self.fields,
                MicroOfSecond.into(),
                cod.rem_euclid(1_000_000),
            )?;
        }
        if let Some(lod) = self.remove(MilliOfDay) {
            if !lenient {
                MilliOfDay.range().check_valid_value(lod, MilliOfDay.into())?;
            }
            add_field_value(&mut self.fields, SecondOfDay.into(), lod.div_euclid(1_000))?;
            add_field_value(&mut self.fields, MilliOfSecond.into(), lod.rem_euclid(1_000))?;
        }
        if let Some(sod) = self.remove(SecondOfDay) {
            if !lenient {
                SecondOfDay.range().check_valid_value(sod, SecondOfDay.into())?;
            }
            add_field_value(&mut self.fields, HourOfDay.into(), sod.div_euclid(3600))?;
            add_field_value(
                &mut self.fields,
                MinuteOfHour.into(),
                sod.div_euclid(60).rem_euclid(60),
            )?;
            add_field_value(&mut self.fields, SecondOfMinute.into(), sod.rem_euclid(60))?;
        }
        if let Some(mod_) = self.remove(MinuteOfDay) {
            if !lenient {
                MinuteOfDay.range().check_valid_value(mod_, MinuteOfDay.into())?;
            }
            add_field_value(&mut self.fields, HourOfDay.into(), mod_.div_euclid(60))?;
            add_field_value(&mut self.fields, MinuteOfHour.into(), mod_.rem_euclid(60))?;
        }
        if let Some(&nos) = self.fields.get(&NanoOfSecond.into()) {
            if !lenient {
                NanoOfSecond.range().check_valid_value(nos, NanoOfSecond.into())?;
            }
            if let Some(cos) = self.remove(MicroOfSecond) {
                if !lenient {
                    MicroOfSecond.range().check_valid_value(cos, MicroOfSecond.into())?;
                }
                let merged = cos * 1_000 + nos % 1_000;
                add_field_value(&mut self.fields, NanoOfSecond.into(), merged)?;
            }
            if let Some(los) = self.remove(MilliOfSecond) {
                if !lenient {
                    MilliOfSecond.range().check_valid_value(los, MilliOfSecond.into())?;
                }
                let nos = *self.fields.get(&NanoOfSecond.into()).expect("just set");
                add_field_value(
                    &mut self.fields,
                    NanoOfSecond.into(),
                    los * 1_000_000 + nos % 1_000_000,
                )?;
            }
        }
        // Combine into a time only when the fields present form an
        // unbroken prefix of hour, minute, second, nano.
        let hod = self.fields.get(&HourOfDay.into()).copied();
        let moh = self.fields.get(&MinuteOfHour.into()).copied();
        let som = self.fields.get(&SecondOfMinute.into()).copied();
        let nos = self.fields.get(&NanoOfSecond.into()).copied();
        if let Some(hod) = hod {
            if (moh.is_some() || (som.is_none() && nos.is_none()))
                && (som.is_some() || nos.is_none())
            {
                self.remove(HourOfDay);
                self.remove(MinuteOfHour);
                self.remove(SecondOfMinute);
                self.remove(NanoOfSecond);
                self.build_time(
                    hod,
                    moh.unwrap_or(0),
                    som.unwrap_or(0),
                    nos.unwrap_or(0),
                    style,
                )?;
            }
        }
        Ok(())
    }

    fn build_time(
        &mut self,
        hod: i64,
        moh: i64,
        som: i64,
        nos: i64,
        style: ResolverStyle,
    ) -> DateTimeResult<()> {
        use ChronoField::*;
        if style == ResolverStyle::Lenient {
            let total = hod * 3_600 * NANOS_PER_SECOND
                + moh * 60 * NANOS_PER_SECOND
                + som * NANOS_PER_SECOND
                + nos;
            self.excess_days = iso::floor_div(total, NANOS_PER_DAY);
            self.set_time(IsoTime::from_nano_of_day(iso::floor_mod(total, NANOS_PER_DAY))?)?;
            return Ok(());
        }
        let moh = MinuteOfHour.check_valid_int_value(moh)?;
        let nos = NanoOfSecond.check_valid_int_value(nos)?;
        let mut hod = hod;
        if style == ResolverStyle::Smart && hod == 24 && moh == 0 && som == 0 && nos == 0 {
            hod = 0;
            self.excess_days = 1;
        }
        let hod = HourOfDay.check_valid_int_value(hod)?;
        let som = SecondOfMinute.check_valid_int_value(som)?;
        self.set_time(IsoTime::new_unchecked(
            hod as u8,
            moh as u8,
            som as u8,
            nos as u32,
        ))
    }

    fn set_time(&mut self, time: IsoTime) -> DateTimeResult<()> {
        if let Some(old) = self.time {
            if old != time {
                return Err(DateTimeError::conflict().with_message(format!(
                    "conflict found: resolved times {old} and {time} differ"
                )));
            }
        }
        self.time = Some(time);
        Ok(())
    }

    /// Leftover fields must agree with the resolved date and time.
    fn cross_check(&mut self, style: ResolverStyle) -> DateTimeResult<()> {
        if style == ResolverStyle::Lenient {
            return Ok(());
        }
        let date = self.date;
        let time = self.time;
        let mut conflict = None;
        self.fields.retain(|&field, &mut value| {
            let derived = date
                .and_then(|d| d.get_field(field))
                .or_else(|| time.and_then(|t| t.get_field(field)));
            match derived {
                Some(actual) if actual != value => {
                    if conflict.is_none() {
                        conflict = Some((field, value, actual));
                    }
                    false
                }
                Some(_) => false,
                None => true,
            }
        });
        if let Some((field, value, actual)) = conflict {
            return Err(DateTimeError::conflict().with_message(format!(
                "conflict found: {field} {value} differs from derived value {actual}"
            )));
        }
        Ok(())
    }

    /// Makes the coarser fractions queryable when only seconds-level
    /// fields were parsed.
    fn resolve_fractional(&mut self) {
        use ChronoField::*;
        if self.time.is_some() || !(self.contains(InstantSeconds) || self.contains(SecondOfDay)) {
            return;
        }
        if let Some(&nos) = self.fields.get(&NanoOfSecond.into()) {
            self.fields.insert(MicroOfSecond.into(), nos / 1_000);
            self.fields.insert(MilliOfSecond.into(), nos / 1_000_000);
        } else {
            self.fields.insert(NanoOfSecond.into(), 0);
            self.fields.insert(MicroOfSecond.into(), 0);
            self.fields.insert(MilliOfSecond.into(), 0);
        }
    }

    /// With a full date, time, and offset the instant is implied; record
    /// it, cross-checking any instant parsed directly.
    fn resolve_instant(&mut self) -> DateTimeResult<()> {
        let (Some(date), Some(time)) = (self.date, self.time) else {
            return Ok(());
        };
        let offset = match self.zone.as_ref().and_then(ZoneId::as_offset) {
            Some(offset) => offset.total_seconds(),
            None => match self.fields.get(&ChronoField::OffsetSeconds.into()) {
                Some(&secs) => secs as i32,
                None => return Ok(()),
            },
        };
        let instant = IsoDateTime::new(date, time).to_epoch_seconds(offset);
        add_field_value(&mut self.fields, ChronoField::InstantSeconds.into(), instant)
    }
}

impl TemporalAccessor for Parsed {
    fn get_field(&self, field: Field) -> Option<i64> {
        self.get(field)
    }

    fn zone(&self) -> Option<ZoneId> {
        self.zone.clone()
    }
}

impl TryFrom<&Parsed> for IsoDate {
    type Error = DateTimeError;

    fn try_from(parsed: &Parsed) -> DateTimeResult<Self> {
        parsed
            .date()
            .ok_or_else(|| DateTimeError::parse().with_message("no date could be resolved"))
    }
}

impl TryFrom<&Parsed> for IsoTime {
    type Error = DateTimeError;

    fn try_from(parsed: &Parsed) -> DateTimeResult<Self> {
        parsed
            .time()
            .ok_or_else(|| DateTimeError::parse().with_message("no time could be resolved"))
    }
}

impl TryFrom<&Parsed> for IsoDateTime {
    type Error = DateTimeError;

    fn try_from(parsed: &Parsed) -> DateTimeResult<Self> {
        Ok(IsoDateTime::new(
            IsoDate::try_from(parsed)?,
            IsoTime::try_from(parsed)?,
        ))
    }
}

fn parsed_offset(parsed: &Parsed) -> DateTimeResult<ZoneOffset> {
    if let Some(offset) = parsed.zone().and_then(ZoneId::as_offset) {
        return Ok(offset);
    }
    match parsed.get(ChronoField::OffsetSeconds.into()) {
        Some(secs) => ZoneOffset::of_seconds(secs as i32),
        None => Err(DateTimeError::parse().with_message("no offset could be resolved")),
    }
}

impl TryFrom<&Parsed> for crate::temporal::OffsetDateTime {
    type Error = DateTimeError;

    fn try_from(parsed: &Parsed) -> DateTimeResult<Self> {
        Ok(Self::new(IsoDateTime::try_from(parsed)?, parsed_offset(parsed)?))
    }
}

impl TryFrom<&Parsed> for crate::temporal::ZonedDateTime {
    type Error = DateTimeError;

    fn try_from(parsed: &Parsed) -> DateTimeResult<Self> {
        let datetime = IsoDateTime::try_from(parsed)?;
        let offset = parsed_offset(parsed)?;
        let zone = parsed
            .zone()
            .cloned()
            .unwrap_or(ZoneId::Offset(offset));
        Ok(Self::new(datetime, offset, zone))
    }
}

/// State shared by every unit during one scan pass.
///
/// Optional sections snapshot the accumulated [`Parsed`] so a failed
/// branch can be discarded without unwinding individual field writes.
pub(crate) struct ParseContext<'a> {
    pub(crate) locale: &'a Locale,
    pub(crate) decimal_style: DecimalStyle,
    pub(crate) text_provider: &'a dyn DateTimeTextProvider,
    case_sensitive: bool,
    strict: bool,
    parsed: Vec<Parsed>,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(
        locale: &'a Locale,
        decimal_style: DecimalStyle,
        text_provider: &'a dyn DateTimeTextProvider,
    ) -> Self {
        Self {
            locale,
            decimal_style,
            text_provider,
            case_sensitive: true,
            strict: true,
            parsed: alloc::vec![Parsed::default()],
        }
    }

    pub(crate) fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub(crate) fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.case_sensitive = case_sensitive;
    }

    pub(crate) fn strict(&self) -> bool {
        self.strict
    }

    pub(crate) fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub(crate) fn start_optional(&mut self) {
        let snapshot = self.current().clone();
        self.parsed.push(snapshot);
    }

    pub(crate) fn end_optional(&mut self, successful: bool) {
        let top = self.parsed.pop().expect("optional depth underflow");
        if successful {
            *self.current_mut() = top;
        }
    }

    pub(crate) fn current(&self) -> &Parsed {
        self.parsed.last().expect("parse stack never empty")
    }

    pub(crate) fn current_mut(&mut self) -> &mut Parsed {
        self.parsed.last_mut().expect("parse stack never empty")
    }

    /// Records a parsed field value. A second differing value for the
    /// same field fails the parse at `error_pos`.
    pub(crate) fn set_field(
        &mut self,
        field: Field,
        value: i64,
        error_pos: usize,
        success_pos: usize,
    ) -> Result<usize, usize> {
        let fields = &mut self.current_mut().fields;
        match fields.insert(field, value) {
            Some(old) if old != value => Err(error_pos),
            _ => Ok(success_pos),
        }
    }

    pub(crate) fn set_zone(&mut self, zone: ZoneId) {
        self.current_mut().zone = Some(zone);
    }

    pub(crate) fn set_chronology(&mut self, id: TinyAsciiStr<16>) {
        self.current_mut().chronology = Some(id);
    }

    pub(crate) fn set_leap_second(&mut self) {
        self.current_mut().leap_second = true;
    }

    /// Character comparison honoring the case-sensitivity setting.
    pub(crate) fn char_equals(&self, a: char, b: char) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a == b || a.to_lowercase().eq(b.to_lowercase())
        }
    }

    /// Prefix comparison at `pos`, honoring case sensitivity. Returns
    /// the position after the match.
    pub(crate) fn match_str(&self, text: &str, pos: usize, expected: &str) -> Option<usize> {
        let rest = text.get(pos..)?;
        if self.case_sensitive {
            rest.starts_with(expected).then(|| pos + expected.len())
        } else {
            let mut len = 0;
            let mut rest_chars = rest.chars();
            for exp in expected.chars() {
                let got = rest_chars.next()?;
                if !self.char_equals(got, exp) {
                    return None;
                }
                len += got.len_utf8();
            }
            Some(pos + len)
        }
    }

    pub(crate) fn into_parsed(mut self) -> Parsed {
        self.parsed.pop().expect("parse stack never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chronology::IsoChronology;
    use crate::text::EnglishTextProvider;

    fn parsed(entries: &[(Field, i64)]) -> Parsed {
        Parsed {
            fields: entries.iter().copied().collect(),
            ..Parsed::default()
        }
    }

    #[test]
    fn resolves_date_and_time() {
        let p = parsed(&[
            (ChronoField::Year.into(), 2024),
            (ChronoField::MonthOfYear.into(), 7),
            (ChronoField::DayOfMonth.into(), 15),
            (ChronoField::HourOfDay.into(), 8),
            (ChronoField::MinuteOfHour.into(), 30),
        ]);
        let resolved = p
            .resolve(ResolverStyle::Strict, None, &IsoChronology)
            .unwrap();
        assert_eq!(resolved.date(), Some(IsoDate::new_unchecked(2024, 7, 15)));
        assert_eq!(resolved.time(), Some(IsoTime::new_unchecked(8, 30, 0, 0)));
        // Instant needs an offset; none was parsed.
        assert_eq!(resolved.get(ChronoField::InstantSeconds.into()), None);
    }

    #[test]
    fn clock_hour_and_am_pm() {
        let p = parsed(&[
            (ChronoField::ClockHourOfAmPm.into(), 12),
            (ChronoField::AmPmOfDay.into(), 1),
        ]);
        let resolved = p
            .resolve(ResolverStyle::Smart, None, &IsoChronology)
            .unwrap();
        assert_eq!(resolved.time(), Some(IsoTime::new_unchecked(12, 0, 0, 0)));
    }

    #[test]
    fn smart_hour_24_rolls_to_next_day() {
        let p = parsed(&[
            (ChronoField::Year.into(), 2024),
            (ChronoField::MonthOfYear.into(), 12),
            (ChronoField::DayOfMonth.into(), 31),
            (ChronoField::HourOfDay.into(), 24),
            (ChronoField::MinuteOfHour.into(), 0),
        ]);
        let resolved = p
            .resolve(ResolverStyle::Smart, None, &IsoChronology)
            .unwrap();
        assert_eq!(resolved.date(), Some(IsoDate::new_unchecked(2025, 1, 1)));
        assert_eq!(resolved.time(), Some(IsoTime::MIDNIGHT));
        assert_eq!(resolved.excess_days(), 0);

        let strict = parsed(&[(ChronoField::HourOfDay.into(), 24)]);
        assert!(strict
            .resolve(ResolverStyle::Strict, None, &IsoChronology)
            .is_err());
    }

    #[test]
    fn lenient_time_overflow_reports_excess_days() {
        let p = parsed(&[
            (ChronoField::HourOfDay.into(), 25),
            (ChronoField::MinuteOfHour.into(), 70),
        ]);
        let resolved = p
            .resolve(ResolverStyle::Lenient, None, &IsoChronology)
            .unwrap();
        assert_eq!(resolved.time(), Some(IsoTime::new_unchecked(2, 10, 0, 0)));
        assert_eq!(resolved.excess_days(), 1);
    }

    #[test]
    fn week_based_fields_resolve_to_date() {
        let p = parsed(&[
            (WeekField::WeekBasedYear.into(), 2020),
            (WeekField::WeekOfWeekBasedYear.into(), 1),
            (WeekField::LocalDayOfWeek.into(), 1),
        ]);
        let resolved = p
            .resolve(ResolverStyle::Strict, None, &IsoChronology)
            .unwrap();
        assert_eq!(resolved.date(), Some(IsoDate::new_unchecked(2019, 12, 30)));
    }

    #[test]
    fn quarter_fields_resolve_to_date() {
        let p = parsed(&[
            (ChronoField::Year.into(), 2024),
            (IsoField::QuarterOfYear.into(), 3),
            (IsoField::DayOfQuarter.into(), 15),
        ]);
        let resolved = p
            .resolve(ResolverStyle::Strict, None, &IsoChronology)
            .unwrap();
        assert_eq!(resolved.date(), Some(IsoDate::new_unchecked(2024, 7, 15)));
    }

    #[test]
    fn cross_check_rejects_wrong_day_of_week() {
        let p = parsed(&[
            (ChronoField::Year.into(), 2024),
            (ChronoField::MonthOfYear.into(), 7),
            (ChronoField::DayOfMonth.into(), 15),
            // 2024-07-15 is a Monday (1), not a Tuesday.
            (ChronoField::DayOfWeek.into(), 2),
        ]);
        let err = p
            .resolve(ResolverStyle::Smart, None, &IsoChronology)
            .unwrap_err();
        assert!(err.message().contains("conflict"));
    }

    #[test]
    fn instant_with_offset_resolves_fields() {
        let mut p = parsed(&[
            (ChronoField::InstantSeconds.into(), 0),
            (ChronoField::OffsetSeconds.into(), 3600),
        ]);
        p.zone = Some(ZoneId::Offset(ZoneOffset::of_seconds(3600).unwrap()));
        let resolved = p
            .resolve(ResolverStyle::Strict, None, &IsoChronology)
            .unwrap();
        assert_eq!(resolved.date(), Some(IsoDate::new_unchecked(1970, 1, 1)));
        assert_eq!(resolved.time(), Some(IsoTime::new_unchecked(1, 0, 0, 0)));
        assert_eq!(resolved.get(ChronoField::InstantSeconds.into()), Some(0));
    }

    #[test]
    fn field_filter_discards_everything_else() {
        let p = parsed(&[
            (ChronoField::Year.into(), 2024),
            (ChronoField::MonthOfYear.into(), 7),
            (ChronoField::DayOfMonth.into(), 15),
        ]);
        let filter = [Field::Chrono(ChronoField::Year)];
        let resolved = p
            .resolve(ResolverStyle::Strict, Some(&filter), &IsoChronology)
            .unwrap();
        assert_eq!(resolved.date(), None);
        assert_eq!(resolved.get(ChronoField::Year.into()), Some(2024));
    }

    #[test]
    fn query_conversions() {
        let p = parsed(&[
            (ChronoField::Year.into(), 2024),
            (ChronoField::MonthOfYear.into(), 7),
            (ChronoField::DayOfMonth.into(), 15),
            (ChronoField::HourOfDay.into(), 8),
            (ChronoField::MinuteOfHour.into(), 30),
            (ChronoField::OffsetSeconds.into(), 3600),
        ]);
        let resolved = p
            .resolve(ResolverStyle::Strict, None, &IsoChronology)
            .unwrap();
        let datetime = IsoDateTime::try_from(&resolved).unwrap();
        assert_eq!(datetime.date, IsoDate::new_unchecked(2024, 7, 15));
        let odt = crate::temporal::OffsetDateTime::try_from(&resolved).unwrap();
        assert_eq!(odt.offset.total_seconds(), 3600);
        // No named zone was parsed, so the zoned view reuses the offset.
        let zdt = crate::temporal::ZonedDateTime::try_from(&resolved).unwrap();
        assert_eq!(zdt.zone, ZoneId::Offset(odt.offset));

        let time_only = parsed(&[(ChronoField::HourOfDay.into(), 8)])
            .resolve(ResolverStyle::Strict, None, &IsoChronology)
            .unwrap();
        assert!(IsoDate::try_from(&time_only).is_err());
        assert!(crate::temporal::OffsetDateTime::try_from(&time_only).is_err());
    }

    #[test]
    fn optional_snapshot_rollback() {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        ctx.set_field(ChronoField::Year.into(), 2024, 0, 4).unwrap();
        ctx.start_optional();
        ctx.set_field(ChronoField::MonthOfYear.into(), 7, 4, 6).unwrap();
        ctx.end_optional(false);
        let parsed = ctx.into_parsed();
        assert_eq!(parsed.get(ChronoField::Year.into()), Some(2024));
        assert_eq!(parsed.get(ChronoField::MonthOfYear.into()), None);
    }

    #[test]
    fn conflicting_field_value_is_rejected() {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        assert_eq!(ctx.set_field(ChronoField::Year.into(), 2024, 0, 4), Ok(4));
        assert_eq!(ctx.set_field(ChronoField::Year.into(), 2024, 5, 9), Ok(9));
        assert_eq!(ctx.set_field(ChronoField::Year.into(), 1999, 5, 9), Err(5));
    }

    #[test]
    fn case_insensitive_matching() {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        assert_eq!(ctx.match_str("GMT", 0, "GMT"), Some(3));
        assert_eq!(ctx.match_str("gmt", 0, "GMT"), None);
        ctx.set_case_sensitive(false);
        assert_eq!(ctx.match_str("gmt", 0, "GMT"), Some(3));
    }
}
