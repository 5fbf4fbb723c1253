//! The ISO-8601 instant unit, pattern-independent and always UTC.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::DateTimeError;
use crate::field::ChronoField;
use crate::iso::IsoDate;
use crate::parse::ParseContext;
use crate::print::PrintContext;
use crate::units::offset::OffsetIdUnit;
use crate::units::{CompositeUnit, FractionUnit, NumberUnit, SignStyle, Unit};
use crate::DateTimeResult;

/// 146097 days per 400-year cycle, 25 cycles per chunk.
const SECONDS_PER_10000_YEARS: i64 = 146_097 * 25 * 86_400;
const SECONDS_0000_TO_1970: i64 = ((146_097 * 5) - (30 * 365 + 7)) * 86_400;

/// Prints and parses an instant like `2024-07-15T08:30:00Z`.
///
/// Formatting works on the epoch second directly, chunked into
/// 10000-year blocks so instants far outside the four-digit-year range
/// still print exactly.
#[derive(Debug, Clone)]
pub(crate) struct InstantUnit {
    /// `-2`: groups of three digits as needed; `-1`: as many digits as
    /// needed; `0..=9`: exactly that many.
    fractional_digits: i8,
}

impl InstantUnit {
    /// Groups of three fraction digits, printed only when non-zero.
    pub(crate) const fn grouped() -> Self {
        Self {
            fractional_digits: -2,
        }
    }

    pub(crate) fn new(fractional_digits: i8) -> DateTimeResult<Self> {
        if !(-2..=9).contains(&fractional_digits) {
            return Err(DateTimeError::builder().with_message(alloc::format!(
                "invalid fractional digits: {fractional_digits} (valid values -2..=9)"
            )));
        }
        Ok(Self { fractional_digits })
    }

    pub(crate) fn format(
        &self,
        ctx: &mut PrintContext<'_>,
        out: &mut String,
    ) -> DateTimeResult<bool> {
        use core::fmt::Write;
        let Some(in_secs) = ctx.value(ChronoField::InstantSeconds.into())? else {
            return Ok(false);
        };
        let in_nano = ctx
            .value_opt(ChronoField::NanoOfSecond.into())
            .unwrap_or(0);
        let in_nano = ChronoField::NanoOfSecond.check_valid_int_value(in_nano)?;

        let zero_secs = in_secs
            .checked_add(SECONDS_0000_TO_1970)
            .ok_or_else(|| DateTimeError::range().with_message("instant out of printable range"))?;
        let hi = zero_secs.div_euclid(SECONDS_PER_10000_YEARS);
        let lo = zero_secs.rem_euclid(SECONDS_PER_10000_YEARS);
        let ldt = crate::iso::IsoDateTime::from_epoch_seconds(lo - SECONDS_0000_TO_1970, 0, 0)?;
        let year = i64::from(ldt.date.year) + hi * 10_000;
        if year > 9_999 {
            let _ = write!(out, "+{year}");
        } else if year >= 0 {
            let _ = write!(out, "{year:04}");
        } else {
            let _ = write!(out, "-{:04}", year.unsigned_abs());
        }
        let _ = write!(
            out,
            "-{:02}-{:02}T{:02}:{:02}:{:02}",
            ldt.date.month, ldt.date.day, ldt.time.hour, ldt.time.minute, ldt.time.second
        );

        let mut nano = in_nano;
        match self.fractional_digits {
            -2 => {
                if nano != 0 {
                    out.push('.');
                    if nano % 1_000_000 == 0 {
                        let _ = write!(out, "{:03}", nano / 1_000_000);
                    } else if nano % 1_000 == 0 {
                        let _ = write!(out, "{:06}", nano / 1_000);
                    } else {
                        let _ = write!(out, "{nano:09}");
                    }
                }
            }
            digits if digits > 0 || (digits == -1 && nano > 0) => {
                out.push('.');
                let mut div = 100_000_000;
                let mut i = 0;
                while (digits == -1 && nano > 0) || i < digits {
                    let digit = nano / div;
                    let _ = write!(out, "{digit}");
                    nano -= digit * div;
                    div /= 10;
                    i += 1;
                }
            }
            _ => {}
        }
        out.push('Z');
        Ok(true)
    }

    /// The inner parser: an extended ISO local date-time, a fraction,
    /// and an offset.
    fn inner_parser(&self) -> CompositeUnit {
        let (min_frac, max_frac) = if self.fractional_digits < 0 {
            (0, 9)
        } else {
            (self.fractional_digits as usize, self.fractional_digits as usize)
        };
        let mut units: Vec<Unit> = Vec::with_capacity(12);
        units.push(Unit::Number(NumberUnit::new(
            ChronoField::Year.into(),
            4,
            10,
            SignStyle::ExceedsPad,
        )));
        units.push(Unit::Char('-'));
        units.push(Unit::Number(NumberUnit::new(
            ChronoField::MonthOfYear.into(),
            2,
            2,
            SignStyle::NotNegative,
        )));
        units.push(Unit::Char('-'));
        units.push(Unit::Number(NumberUnit::new(
            ChronoField::DayOfMonth.into(),
            2,
            2,
            SignStyle::NotNegative,
        )));
        units.push(Unit::Char('T'));
        units.push(Unit::Number(NumberUnit::new(
            ChronoField::HourOfDay.into(),
            2,
            2,
            SignStyle::NotNegative,
        )));
        units.push(Unit::Char(':'));
        units.push(Unit::Number(NumberUnit::new(
            ChronoField::MinuteOfHour.into(),
            2,
            2,
            SignStyle::NotNegative,
        )));
        units.push(Unit::Char(':'));
        units.push(Unit::Number(NumberUnit::new(
            ChronoField::SecondOfMinute.into(),
            2,
            2,
            SignStyle::NotNegative,
        )));
        units.push(Unit::Fraction(FractionUnit::new(
            ChronoField::NanoOfSecond.into(),
            min_frac,
            max_frac,
            true,
        )));
        units.push(Unit::OffsetId(OffsetIdUnit::iso_z()));
        CompositeUnit::new(units, false)
    }

    pub(crate) fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
        text: &str,
        pos: usize,
    ) -> Result<usize, usize> {
        let mut sub = ParseContext::new(ctx.locale, ctx.decimal_style, ctx.text_provider);
        sub.set_case_sensitive(ctx.case_sensitive());
        sub.set_strict(false);
        let end = self.inner_parser().parse(&mut sub, text, pos)?;
        let parsed = sub.into_parsed();
        let get =
            |f: ChronoField| -> Result<i64, usize> { parsed.get(f.into()).ok_or(pos) };
        let year_parsed = get(ChronoField::Year)?;
        let month = get(ChronoField::MonthOfYear)?;
        let day = get(ChronoField::DayOfMonth)?;
        let mut hour = get(ChronoField::HourOfDay)?;
        let minute = get(ChronoField::MinuteOfHour)?;
        let mut second = get(ChronoField::SecondOfMinute)?;
        let nano = parsed.get(ChronoField::NanoOfSecond.into()).unwrap_or(0);
        let offset = parsed.get(ChronoField::OffsetSeconds.into()).unwrap_or(0);

        let mut days: i64 = 0;
        if hour == 24 && minute == 0 && second == 0 && nano == 0 {
            hour = 0;
            days = 1;
        } else if second == 60 {
            // Leap second: record it and parse as :59.
            ctx.set_leap_second();
            second = 59;
        }
        let year = year_parsed % 10_000;
        let date = IsoDate::new(year as i32, month as u8, day as u8).map_err(|_| pos)?;
        if !(0..24).contains(&hour) || !(0..60).contains(&minute) || !(0..60).contains(&second) {
            return Err(pos);
        }
        let date = date.plus_days(days);
        let local_secs =
            date.to_epoch_days() * 86_400 + hour * 3_600 + minute * 60 + second - offset;
        let chunk = (year_parsed / 10_000)
            .checked_mul(SECONDS_PER_10000_YEARS)
            .and_then(|c| c.checked_add(local_secs))
            .ok_or(pos)?;
        ctx.set_field(ChronoField::InstantSeconds.into(), chunk, pos, end)?;
        ctx.set_field(ChronoField::NanoOfSecond.into(), nano, pos, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::DecimalStyle;
    use crate::iso::{IsoDate, IsoDateTime, IsoTime};
    use crate::locale::Locale;
    use crate::temporal::OffsetDateTime;
    use crate::text::EnglishTextProvider;
    use crate::zone::ZoneOffset;

    fn format(unit: &InstantUnit, epoch_seconds: i64, nano: u32) -> String {
        let temporal =
            OffsetDateTime::from_epoch_seconds(epoch_seconds, nano, ZoneOffset::UTC).unwrap();
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = PrintContext::new(&temporal, &locale, DecimalStyle::STANDARD, &provider);
        let mut out = String::new();
        unit.format(&mut ctx, &mut out).unwrap();
        out
    }

    fn parse(unit: &InstantUnit, text: &str) -> Result<(i64, i64), usize> {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        unit.parse(&mut ctx, text, 0)?;
        let parsed = ctx.into_parsed();
        Ok((
            parsed.get(ChronoField::InstantSeconds.into()).unwrap(),
            parsed.get(ChronoField::NanoOfSecond.into()).unwrap(),
        ))
    }

    fn epoch(date: IsoDate, time: IsoTime) -> i64 {
        IsoDateTime::new(date, time).to_epoch_seconds(0)
    }

    #[test]
    fn formats_and_parses_plain_instants() {
        let unit = InstantUnit::new(-2).unwrap();
        assert_eq!(format(&unit, 0, 0), "1970-01-01T00:00:00Z");
        let secs = epoch(
            IsoDate::new_unchecked(2024, 7, 15),
            IsoTime::new_unchecked(8, 30, 15, 0),
        );
        assert_eq!(format(&unit, secs, 0), "2024-07-15T08:30:15Z");
        assert_eq!(parse(&unit, "2024-07-15T08:30:15Z"), Ok((secs, 0)));
    }

    #[test]
    fn fraction_styles() {
        let grouped = InstantUnit::new(-2).unwrap();
        assert_eq!(format(&grouped, 0, 123_000_000), "1970-01-01T00:00:00.123Z");
        assert_eq!(
            format(&grouped, 0, 123_456_000),
            "1970-01-01T00:00:00.123456Z"
        );
        let minimal = InstantUnit::new(-1).unwrap();
        assert_eq!(format(&minimal, 0, 120_000_000), "1970-01-01T00:00:00.12Z");
        let fixed = InstantUnit::new(3).unwrap();
        assert_eq!(format(&fixed, 0, 0), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn parses_offset_adjusted_instants() {
        let unit = InstantUnit::new(-2).unwrap();
        assert_eq!(parse(&unit, "1970-01-01T01:00:00+01:00"), Ok((0, 0)));
        assert_eq!(
            parse(&unit, "1970-01-01T00:00:00.5Z"),
            Ok((0, 500_000_000))
        );
    }

    #[test]
    fn leap_second_and_hour_24() {
        let unit = InstantUnit::new(-2).unwrap();
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        unit.parse(&mut ctx, "2016-12-31T23:59:60Z", 0).unwrap();
        let parsed = ctx.into_parsed();
        assert!(parsed.leap_second());
        let expected = epoch(
            IsoDate::new_unchecked(2016, 12, 31),
            IsoTime::new_unchecked(23, 59, 59, 0),
        );
        assert_eq!(
            parsed.get(ChronoField::InstantSeconds.into()),
            Some(expected)
        );

        let next_day = epoch(IsoDate::new_unchecked(2024, 3, 2), IsoTime::MIDNIGHT);
        assert_eq!(parse(&unit, "2024-03-01T24:00:00Z"), Ok((next_day, 0)));
    }

    #[test]
    fn far_years_round_trip() {
        let unit = InstantUnit::new(-2).unwrap();
        let (secs, _) = parse(&unit, "+12345-06-07T08:09:10Z").unwrap();
        assert_eq!(format(&unit, secs, 0), "+12345-06-07T08:09:10Z");
        let (secs, _) = parse(&unit, "-0100-01-01T00:00:00Z").unwrap();
        assert_eq!(format(&unit, secs, 0), "-0100-01-01T00:00:00Z");
    }
}
