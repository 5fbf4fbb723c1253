//! Calendar systems and calendar-specific date resolution.
//!
//! Phase 2 of parsing hands the collected field map to a [`Chronology`],
//! which combines whatever date fields are present into a concrete date.
//! Only the proleptic ISO calendar ships here, but the trait is the seam
//! a non-ISO calendar would implement.

use alloc::format;
use core::fmt;

use rustc_hash::FxHashMap;

use crate::error::DateTimeError;
use crate::field::{ChronoField, Field};
use crate::iso::{self, IsoDate};
use crate::DateTimeResult;

/// How aggressively parsed field values are checked and combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolverStyle {
    /// Every value must be valid for its field and for the resolved date.
    Strict,
    /// Values must be within the field's outer range; sensible
    /// adjustments are made, such as day 31 of a 30-day month becoming
    /// day 30, or hour 24 rolling into the next day.
    #[default]
    Smart,
    /// Out-of-range values wrap arithmetically into neighboring units.
    Lenient,
}

/// The calendar-type ids the chronology printer-parser recognizes.
pub(crate) const CHRONOLOGY_IDS: &[&str] = &["iso8601", "ISO"];

/// A calendar system that can resolve parsed date fields.
pub trait Chronology: Send + Sync + fmt::Debug {
    /// The calendar-type identifier, such as `"iso8601"`.
    fn calendar_type(&self) -> &'static str;

    /// Combines date fields from `fields` into a date, removing the
    /// fields it consumed. Returns `Ok(None)` when no resolvable
    /// combination is present.
    fn resolve_date(
        &self,
        fields: &mut FxHashMap<Field, i64>,
        style: ResolverStyle,
    ) -> DateTimeResult<Option<IsoDate>>;
}

/// Records `value` for `field`, failing if a different value is present.
pub(crate) fn add_field_value(
    fields: &mut FxHashMap<Field, i64>,
    field: Field,
    value: i64,
) -> DateTimeResult<()> {
    if let Some(old) = fields.insert(field, value) {
        if old != value {
            return Err(DateTimeError::conflict().with_message(format!(
                "conflict found: {field} {old} differs from {field} {value}"
            )));
        }
    }
    Ok(())
}

fn remove(fields: &mut FxHashMap<Field, i64>, field: ChronoField) -> Option<i64> {
    fields.remove(&Field::Chrono(field))
}

fn check_int(field: ChronoField, value: i64) -> DateTimeResult<i32> {
    field.check_valid_int_value(value)
}

/// The proleptic ISO-8601 calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoChronology;

impl IsoChronology {
    fn resolve_proleptic_month(
        fields: &mut FxHashMap<Field, i64>,
        style: ResolverStyle,
    ) -> DateTimeResult<()> {
        let Some(pm) = remove(fields, ChronoField::ProlepticMonth) else {
            return Ok(());
        };
        if style != ResolverStyle::Lenient {
            ChronoField::ProlepticMonth
                .range()
                .check_valid_value(pm, ChronoField::ProlepticMonth.into())?;
        }
        add_field_value(fields, ChronoField::Year.into(), iso::floor_div(pm, 12))?;
        add_field_value(
            fields,
            ChronoField::MonthOfYear.into(),
            iso::floor_mod(pm, 12) + 1,
        )
    }

    fn resolve_year_of_era(
        fields: &mut FxHashMap<Field, i64>,
        style: ResolverStyle,
    ) -> DateTimeResult<()> {
        let Some(yoe) = remove(fields, ChronoField::YearOfEra) else {
            if let Some(&era) = fields.get(&Field::Chrono(ChronoField::Era)) {
                ChronoField::Era
                    .range()
                    .check_valid_value(era, ChronoField::Era.into())?;
            }
            return Ok(());
        };
        if style != ResolverStyle::Lenient {
            ChronoField::YearOfEra
                .range()
                .check_valid_value(yoe, ChronoField::YearOfEra.into())?;
        }
        match remove(fields, ChronoField::Era) {
            None => {
                let year = fields.get(&Field::Chrono(ChronoField::Year)).copied();
                if style == ResolverStyle::Strict {
                    // Without an era, strict mode only cross-checks
                    // against an already-known year.
                    match year {
                        Some(year) => {
                            let resolved = if year > 0 { yoe } else { 1 - yoe };
                            add_field_value(fields, ChronoField::Year.into(), resolved)?;
                        }
                        None => {
                            fields.insert(ChronoField::YearOfEra.into(), yoe);
                        }
                    }
                } else {
                    let resolved = match year {
                        Some(year) if year <= 0 => 1 - yoe,
                        _ => yoe,
                    };
                    add_field_value(fields, ChronoField::Year.into(), resolved)?;
                }
            }
            Some(1) => add_field_value(fields, ChronoField::Year.into(), yoe)?,
            Some(0) => add_field_value(fields, ChronoField::Year.into(), 1 - yoe)?,
            Some(era) => {
                return Err(DateTimeError::conflict()
                    .with_message(format!("invalid value for era: {era}")));
            }
        }
        Ok(())
    }

    fn date(year: i32, month: u8, day: u8) -> DateTimeResult<IsoDate> {
        IsoDate::new(year, month, day)
    }

    fn plus_months_days(year: i32, months: i64, days: i64) -> DateTimeResult<IsoDate> {
        let pm = i64::from(year) * 12 + months;
        let y = check_int(ChronoField::Year, iso::floor_div(pm, 12))?;
        let month = (iso::floor_mod(pm, 12) + 1) as u8;
        Ok(IsoDate::new_unchecked(y, month, 1).plus_days(days))
    }

    /// Advances `date` zero to six days until its day-of-week is `dow`.
    fn next_or_same(date: IsoDate, dow: i64) -> IsoDate {
        let diff = iso::floor_mod(dow - i64::from(date.day_of_week()), 7);
        date.plus_days(diff)
    }

    fn check_same_month(date: IsoDate, year: i32, month: u8, what: &str) -> DateTimeResult<IsoDate> {
        if date.year != year || date.month != month {
            return Err(DateTimeError::conflict().with_message(format!(
                "strict mode rejected resolved date {date}: {what} crosses into a different month"
            )));
        }
        Ok(date)
    }

    fn check_same_year(date: IsoDate, year: i32, what: &str) -> DateTimeResult<IsoDate> {
        if date.year != year {
            return Err(DateTimeError::conflict().with_message(format!(
                "strict mode rejected resolved date {date}: {what} crosses into a different year"
            )));
        }
        Ok(date)
    }

    fn resolve_ymd(
        fields: &mut FxHashMap<Field, i64>,
        style: ResolverStyle,
    ) -> DateTimeResult<IsoDate> {
        let year = remove(fields, ChronoField::Year).expect("caller checked year");
        let y = check_int(ChronoField::Year, year)?;
        if style == ResolverStyle::Lenient {
            let months = remove(fields, ChronoField::MonthOfYear).expect("caller checked") - 1;
            let days = remove(fields, ChronoField::DayOfMonth).expect("caller checked") - 1;
            return Self::plus_months_days(y, months, days);
        }
        let moy = check_int(
            ChronoField::MonthOfYear,
            remove(fields, ChronoField::MonthOfYear).expect("caller checked"),
        )? as u8;
        let dom = check_int(
            ChronoField::DayOfMonth,
            remove(fields, ChronoField::DayOfMonth).expect("caller checked"),
        )? as u8;
        if style == ResolverStyle::Smart {
            let last = iso::days_in_month(y, moy);
            return Self::date(y, moy, dom.min(last));
        }
        Self::date(y, moy, dom)
    }

    fn resolve_yd(
        fields: &mut FxHashMap<Field, i64>,
        style: ResolverStyle,
    ) -> DateTimeResult<IsoDate> {
        let y = check_int(
            ChronoField::Year,
            remove(fields, ChronoField::Year).expect("caller checked"),
        )?;
        if style == ResolverStyle::Lenient {
            let days = remove(fields, ChronoField::DayOfYear).expect("caller checked") - 1;
            return Ok(IsoDate::new_unchecked(y, 1, 1).plus_days(days));
        }
        let doy = remove(fields, ChronoField::DayOfYear).expect("caller checked");
        let doy = u16::try_from(doy)
            .ok()
            .filter(|d| *d >= 1)
            .ok_or_else(|| {
                DateTimeError::range().with_message(format!("invalid day-of-year: {doy}"))
            })?;
        IsoDate::of_year_day(y, doy)
    }
}

impl Chronology for IsoChronology {
    fn calendar_type(&self) -> &'static str {
        "iso8601"
    }

    fn resolve_date(
        &self,
        fields: &mut FxHashMap<Field, i64>,
        style: ResolverStyle,
    ) -> DateTimeResult<Option<IsoDate>> {
        use ChronoField::*;

        if let Some(epoch_day) = remove(fields, EpochDay) {
            if style != ResolverStyle::Lenient {
                EpochDay.range().check_valid_value(epoch_day, EpochDay.into())?;
            }
            return Ok(Some(IsoDate::from_epoch_days(epoch_day)));
        }
        Self::resolve_proleptic_month(fields, style)?;
        Self::resolve_year_of_era(fields, style)?;

        let has = |fields: &FxHashMap<Field, i64>, f: ChronoField| {
            fields.contains_key(&Field::Chrono(f))
        };
        if !has(fields, Year) {
            return Ok(None);
        }
        if has(fields, MonthOfYear) {
            if has(fields, DayOfMonth) {
                return Self::resolve_ymd(fields, style).map(Some);
            }
            if has(fields, AlignedWeekOfMonth) {
                if has(fields, AlignedDayOfWeekInMonth) {
                    let y = check_int(Year, remove(fields, Year).expect("present"))?;
                    let moy = remove(fields, MonthOfYear).expect("present");
                    let aw = remove(fields, AlignedWeekOfMonth).expect("present");
                    let ad = remove(fields, AlignedDayOfWeekInMonth).expect("present");
                    if style == ResolverStyle::Lenient {
                        let days = (aw - 1) * 7 + (ad - 1);
                        return Self::plus_months_days(y, moy - 1, days).map(Some);
                    }
                    let moy = check_int(MonthOfYear, moy)? as u8;
                    let aw = check_int(AlignedWeekOfMonth, aw)?;
                    let ad = check_int(AlignedDayOfWeekInMonth, ad)?;
                    let date = IsoDate::new_unchecked(y, moy, 1)
                        .plus_days(i64::from((aw - 1) * 7 + (ad - 1)));
                    if style == ResolverStyle::Strict {
                        return Self::check_same_month(date, y, moy, "aligned week").map(Some);
                    }
                    return Ok(Some(date));
                }
                if has(fields, DayOfWeek) {
                    let y = check_int(Year, remove(fields, Year).expect("present"))?;
                    let moy = remove(fields, MonthOfYear).expect("present");
                    let aw = remove(fields, AlignedWeekOfMonth).expect("present");
                    let dow = remove(fields, DayOfWeek).expect("present");
                    if style == ResolverStyle::Lenient {
                        let base = Self::plus_months_days(y, moy - 1, (aw - 1) * 7)?;
                        return Ok(Some(Self::next_or_same(base, iso::floor_mod(dow - 1, 7) + 1)));
                    }
                    let moy = check_int(MonthOfYear, moy)? as u8;
                    let aw = check_int(AlignedWeekOfMonth, aw)?;
                    let dow = i64::from(check_int(DayOfWeek, dow)?);
                    let base =
                        IsoDate::new_unchecked(y, moy, 1).plus_days(i64::from(aw - 1) * 7);
                    let date = Self::next_or_same(base, dow);
                    if style == ResolverStyle::Strict {
                        return Self::check_same_month(date, y, moy, "day-of-week").map(Some);
                    }
                    return Ok(Some(date));
                }
            }
        }
        if has(fields, DayOfYear) {
            return Self::resolve_yd(fields, style).map(Some);
        }
        if has(fields, AlignedWeekOfYear) {
            if has(fields, AlignedDayOfWeekInYear) {
                let y = check_int(Year, remove(fields, Year).expect("present"))?;
                let aw = remove(fields, AlignedWeekOfYear).expect("present");
                let ad = remove(fields, AlignedDayOfWeekInYear).expect("present");
                if style == ResolverStyle::Lenient {
                    return Ok(Some(
                        IsoDate::new_unchecked(y, 1, 1).plus_days((aw - 1) * 7 + (ad - 1)),
                    ));
                }
                let aw = check_int(AlignedWeekOfYear, aw)?;
                let ad = check_int(AlignedDayOfWeekInYear, ad)?;
                let date = IsoDate::new_unchecked(y, 1, 1)
                    .plus_days(i64::from((aw - 1) * 7 + (ad - 1)));
                if style == ResolverStyle::Strict {
                    return Self::check_same_year(date, y, "aligned week").map(Some);
                }
                return Ok(Some(date));
            }
            if has(fields, DayOfWeek) {
                let y = check_int(Year, remove(fields, Year).expect("present"))?;
                let aw = remove(fields, AlignedWeekOfYear).expect("present");
                let dow = remove(fields, DayOfWeek).expect("present");
                if style == ResolverStyle::Lenient {
                    let base = IsoDate::new_unchecked(y, 1, 1).plus_days((aw - 1) * 7);
                    return Ok(Some(Self::next_or_same(base, iso::floor_mod(dow - 1, 7) + 1)));
                }
                let aw = check_int(AlignedWeekOfYear, aw)?;
                let dow = i64::from(check_int(DayOfWeek, dow)?);
                let base = IsoDate::new_unchecked(y, 1, 1).plus_days(i64::from(aw - 1) * 7);
                let date = Self::next_or_same(base, dow);
                if style == ResolverStyle::Strict {
                    return Self::check_same_year(date, y, "day-of-week").map(Some);
                }
                return Ok(Some(date));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(ChronoField, i64)]) -> FxHashMap<Field, i64> {
        entries
            .iter()
            .map(|&(f, v)| (Field::Chrono(f), v))
            .collect()
    }

    #[test]
    fn resolves_year_month_day() {
        let mut fields = map(&[
            (ChronoField::Year, 2024),
            (ChronoField::MonthOfYear, 7),
            (ChronoField::DayOfMonth, 15),
        ]);
        let date = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(date, IsoDate::new_unchecked(2024, 7, 15));
        assert!(fields.is_empty());
    }

    #[test]
    fn smart_clamps_day_of_month() {
        let mut fields = map(&[
            (ChronoField::Year, 2023),
            (ChronoField::MonthOfYear, 2),
            (ChronoField::DayOfMonth, 30),
        ]);
        let smart = IsoChronology
            .resolve_date(&mut fields.clone(), ResolverStyle::Smart)
            .unwrap()
            .unwrap();
        assert_eq!(smart, IsoDate::new_unchecked(2023, 2, 28));
        assert!(IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Strict)
            .is_err());
    }

    #[test]
    fn lenient_rolls_over() {
        let mut fields = map(&[
            (ChronoField::Year, 2024),
            (ChronoField::MonthOfYear, 14),
            (ChronoField::DayOfMonth, 32),
        ]);
        let date = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Lenient)
            .unwrap()
            .unwrap();
        // 2024-01-01 plus 13 months is 2025-02-01, plus 31 days is
        // 2025-03-04.
        assert_eq!(date, IsoDate::new_unchecked(2025, 3, 4));
    }

    #[test]
    fn epoch_day_wins() {
        let mut fields = map(&[
            (ChronoField::EpochDay, 19_782),
            (ChronoField::Year, 1999),
        ]);
        let date = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Smart)
            .unwrap()
            .unwrap();
        assert_eq!(date, IsoDate::new_unchecked(2024, 2, 29));
    }

    #[test]
    fn proleptic_month_expands() {
        let mut fields = map(&[
            (ChronoField::ProlepticMonth, 2024 * 12 + 6),
            (ChronoField::DayOfMonth, 1),
        ]);
        let date = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(date, IsoDate::new_unchecked(2024, 7, 1));
    }

    #[test]
    fn year_of_era_with_era() {
        let mut fields = map(&[
            (ChronoField::YearOfEra, 52),
            (ChronoField::Era, 0),
            (ChronoField::MonthOfYear, 3),
            (ChronoField::DayOfMonth, 15),
        ]);
        let date = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(date.year, -51);
    }

    #[test]
    fn strict_keeps_unresolvable_year_of_era() {
        let mut fields = map(&[(ChronoField::YearOfEra, 2024)]);
        let resolved = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Strict)
            .unwrap();
        assert_eq!(resolved, None);
        assert_eq!(
            fields.get(&Field::Chrono(ChronoField::YearOfEra)),
            Some(&2024)
        );
    }

    #[test]
    fn year_and_day_of_year() {
        let mut fields = map(&[(ChronoField::Year, 2024), (ChronoField::DayOfYear, 200)]);
        let date = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Smart)
            .unwrap()
            .unwrap();
        assert_eq!(date, IsoDate::new_unchecked(2024, 7, 18));
    }

    #[test]
    fn aligned_week_combinations() {
        let mut fields = map(&[
            (ChronoField::Year, 2024),
            (ChronoField::MonthOfYear, 7),
            (ChronoField::AlignedWeekOfMonth, 3),
            (ChronoField::AlignedDayOfWeekInMonth, 2),
        ]);
        let date = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(date, IsoDate::new_unchecked(2024, 7, 16));

        let mut fields = map(&[
            (ChronoField::Year, 2024),
            (ChronoField::MonthOfYear, 7),
            (ChronoField::AlignedWeekOfMonth, 2),
            (ChronoField::DayOfWeek, 7),
        ]);
        let date = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Smart)
            .unwrap()
            .unwrap();
        // 2024-07-08 is a Monday; next-or-same Sunday is the 14th.
        assert_eq!(date, IsoDate::new_unchecked(2024, 7, 14));
    }

    #[test]
    fn conflicting_values_fail() {
        let mut fields = map(&[
            (ChronoField::ProlepticMonth, 2024 * 12 + 6),
            (ChronoField::MonthOfYear, 3),
            (ChronoField::DayOfMonth, 1),
        ]);
        let err = IsoChronology
            .resolve_date(&mut fields, ResolverStyle::Strict)
            .unwrap_err();
        assert!(err.message().contains("conflict"));
    }
}
