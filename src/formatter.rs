//! The immutable formatter facade and its companion option types.

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;
use std::sync::OnceLock;

use crate::builder::FormatterBuilder;
use crate::chronology::{Chronology, IsoChronology, ResolverStyle};
use crate::error::DateTimeError;
use crate::field::{ChronoField, Field, WeekField};
use crate::locale::Locale;
use crate::parse::{Parsed, ParseContext, ParsePosition};
use crate::print::PrintContext;
use crate::temporal::TemporalAccessor;
use crate::text::{DateTimeTextProvider, EnglishTextProvider, TextStyle};
use crate::units::{SignStyle, Unit};
use crate::zone::ZoneId;
use crate::DateTimeResult;

/// The characters used for digits, signs, and the decimal separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalStyle {
    pub zero_digit: char,
    pub positive_sign: char,
    pub negative_sign: char,
    pub decimal_separator: char,
}

impl DecimalStyle {
    /// ASCII digits, `+`/`-`, and `.`.
    pub const STANDARD: Self = Self {
        zero_digit: '0',
        positive_sign: '+',
        negative_sign: '-',
        decimal_separator: '.',
    };

    /// The character representing digit `value` (0..=9).
    pub fn digit_char(&self, value: u8) -> char {
        char::from_u32(self.zero_digit as u32 + u32::from(value)).unwrap_or(self.zero_digit)
    }

    /// The digit a character represents, if any.
    pub fn digit_value(&self, ch: char) -> Option<u32> {
        let value = (ch as u32).wrapping_sub(self.zero_digit as u32);
        (value <= 9).then_some(value)
    }
}

impl Default for DecimalStyle {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// The four stock lengths of a localized date or time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatStyle {
    Full,
    Long,
    Medium,
    Short,
}

/// An immutable, thread-safe formatter: a compiled unit tree plus the
/// formatting locale, symbols, and resolution settings.
///
/// The `with_*` methods return an adjusted copy; the compiled unit tree
/// is shared between copies.
#[derive(Clone)]
pub struct DateTimeFormatter {
    unit: Arc<Unit>,
    locale: Locale,
    decimal_style: DecimalStyle,
    resolver_style: ResolverStyle,
    resolver_fields: Option<Arc<[Field]>>,
    chronology: Arc<dyn Chronology>,
    text_provider: Arc<dyn DateTimeTextProvider>,
    zone: Option<ZoneId>,
}

impl fmt::Debug for DateTimeFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateTimeFormatter")
            .field("unit", &self.unit)
            .field("locale", &self.locale)
            .field("resolver_style", &self.resolver_style)
            .field("resolver_fields", &self.resolver_fields)
            .field("chronology", &self.chronology)
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

impl DateTimeFormatter {
    pub(crate) fn from_unit(unit: Arc<Unit>) -> Self {
        Self {
            unit,
            locale: Locale::english(),
            decimal_style: DecimalStyle::STANDARD,
            resolver_style: ResolverStyle::Smart,
            resolver_fields: None,
            chronology: Arc::new(IsoChronology),
            text_provider: Arc::new(EnglishTextProvider::new()),
            zone: None,
        }
    }

    pub(crate) fn unit(&self) -> Arc<Unit> {
        Arc::clone(&self.unit)
    }

    /// Compiles `pattern` into a formatter with the default locale and
    /// smart resolution.
    pub fn of_pattern(pattern: &str) -> DateTimeResult<Self> {
        let mut builder = FormatterBuilder::new();
        builder.append_pattern(pattern)?;
        Ok(builder.to_formatter())
    }

    /// Compiles `pattern` into a formatter for `locale`.
    pub fn of_pattern_localized(pattern: &str, locale: Locale) -> DateTimeResult<Self> {
        let mut builder = FormatterBuilder::new();
        builder.append_pattern(pattern)?;
        Ok(builder.to_formatter_with_locale(locale))
    }

    /// A formatter for the stock localized date and/or time styles.
    pub fn of_localized(
        date_style: Option<FormatStyle>,
        time_style: Option<FormatStyle>,
    ) -> DateTimeResult<Self> {
        let mut builder = FormatterBuilder::new();
        builder.append_localized(date_style, time_style)?;
        Ok(builder.to_formatter())
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn resolver_style(&self) -> ResolverStyle {
        self.resolver_style
    }

    pub fn with_locale(&self, locale: Locale) -> Self {
        let mut copy = self.clone();
        copy.locale = locale;
        copy
    }

    pub fn with_decimal_style(&self, decimal_style: DecimalStyle) -> Self {
        let mut copy = self.clone();
        copy.decimal_style = decimal_style;
        copy
    }

    pub fn with_resolver_style(&self, resolver_style: ResolverStyle) -> Self {
        let mut copy = self.clone();
        copy.resolver_style = resolver_style;
        copy
    }

    /// Restricts resolution to `fields`; everything else parsed from
    /// the text is discarded before resolving.
    pub fn with_resolver_fields(&self, fields: &[Field]) -> Self {
        let mut copy = self.clone();
        copy.resolver_fields = Some(fields.into());
        copy
    }

    pub fn with_chronology(&self, chronology: Arc<dyn Chronology>) -> Self {
        let mut copy = self.clone();
        copy.chronology = chronology;
        copy
    }

    pub fn with_text_provider(&self, provider: Arc<dyn DateTimeTextProvider>) -> Self {
        let mut copy = self.clone();
        copy.text_provider = provider;
        copy
    }

    /// Overrides the zone: formatting presents this zone and parsing
    /// falls back to it when the text supplies none.
    pub fn with_zone(&self, zone: ZoneId) -> Self {
        let mut copy = self.clone();
        copy.zone = Some(zone);
        copy
    }

    /// Formats `temporal` to a new string.
    pub fn format(&self, temporal: &dyn TemporalAccessor) -> DateTimeResult<String> {
        let with_zone;
        let effective: &dyn TemporalAccessor = match &self.zone {
            Some(zone) => {
                with_zone = ZoneOverride {
                    inner: temporal,
                    zone,
                };
                &with_zone
            }
            None => temporal,
        };
        let mut ctx = PrintContext::new(
            effective,
            &self.locale,
            self.decimal_style,
            self.text_provider.as_ref(),
        );
        let mut out = String::new();
        if !self.unit.format(&mut ctx, &mut out)? {
            return Err(DateTimeError::format()
                .with_message("unable to format: a queried value is absent"));
        }
        Ok(out)
    }

    /// Formats `temporal` into any [`core::fmt::Write`] sink.
    pub fn format_to<W: fmt::Write>(
        &self,
        temporal: &dyn TemporalAccessor,
        sink: &mut W,
    ) -> DateTimeResult<()> {
        let out = self.format(temporal)?;
        sink.write_str(&out)
            .map_err(|_| DateTimeError::format().with_message("failed to write formatted text"))
    }

    /// Parses the whole of `text` and resolves the result.
    pub fn parse(&self, text: &str) -> DateTimeResult<Parsed> {
        let mut pos = ParsePosition::new(0);
        match self.parse_raw(text, &mut pos) {
            Some(parsed) if pos.index == text.len() => self.resolve(parsed),
            Some(_) => Err(DateTimeError::parse_failure(text, pos.index)),
            None => Err(DateTimeError::parse_failure(
                text,
                pos.error_index.unwrap_or(pos.index),
            )),
        }
    }

    /// Parses from `position.index`, resolving the result but not
    /// requiring the whole text to be consumed.
    pub fn parse_positioned(
        &self,
        text: &str,
        position: &mut ParsePosition,
    ) -> DateTimeResult<Parsed> {
        match self.parse_raw(text, position) {
            Some(parsed) => self.resolve(parsed),
            None => Err(DateTimeError::parse_failure(
                text,
                position.error_index.unwrap_or(position.index),
            )),
        }
    }

    /// Phase 1 only: the raw field map, with no resolution and no
    /// validation beyond what the units themselves perform.
    pub fn parse_unresolved(&self, text: &str, position: &mut ParsePosition) -> Option<Parsed> {
        self.parse_raw(text, position)
    }

    /// Parses the whole of `text` directly into a target type.
    pub fn parse_to<T>(&self, text: &str) -> DateTimeResult<T>
    where
        T: for<'p> TryFrom<&'p Parsed, Error = DateTimeError>,
    {
        let parsed = self.parse(text)?;
        T::try_from(&parsed)
    }

    /// Parses once and tries `queries` in order, returning the first
    /// that succeeds. Useful for text that may or may not carry a zone.
    pub fn parse_best<T>(
        &self,
        text: &str,
        queries: &[&dyn Fn(&Parsed) -> DateTimeResult<T>],
    ) -> DateTimeResult<T> {
        let parsed = self.parse(text)?;
        let mut last_error = None;
        for query in queries {
            match query(&parsed) {
                Ok(value) => return Ok(value),
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error
            .unwrap_or_else(|| DateTimeError::parse().with_message("no parse query supplied")))
    }

    fn parse_raw(&self, text: &str, position: &mut ParsePosition) -> Option<Parsed> {
        let mut ctx = ParseContext::new(
            &self.locale,
            self.decimal_style,
            self.text_provider.as_ref(),
        );
        match self.unit.parse(&mut ctx, text, position.index) {
            Ok(end) => {
                position.index = end;
                Some(ctx.into_parsed())
            }
            Err(err_index) => {
                position.error_index = Some(err_index);
                None
            }
        }
    }

    fn resolve(&self, mut parsed: Parsed) -> DateTimeResult<Parsed> {
        if parsed.zone.is_none() {
            parsed.zone = self.zone.clone();
        }
        parsed.resolve(
            self.resolver_style,
            self.resolver_fields.as_deref(),
            self.chronology.as_ref(),
        )
    }
}

/// Presents a temporal with the formatter's override zone attached.
struct ZoneOverride<'a> {
    inner: &'a dyn TemporalAccessor,
    zone: &'a ZoneId,
}

impl TemporalAccessor for ZoneOverride<'_> {
    fn get_field(&self, field: Field) -> Option<i64> {
        self.inner.get_field(field)
    }

    fn zone(&self) -> Option<ZoneId> {
        Some(self.zone.clone())
    }
}

// The stock formatters. Each is compiled once, on first use, and the
// instance is shared for the life of the process.

fn predefined(
    slot: &'static OnceLock<DateTimeFormatter>,
    build: fn() -> DateTimeFormatter,
) -> &'static DateTimeFormatter {
    slot.get_or_init(build)
}

fn iso_strict(builder: FormatterBuilder) -> DateTimeFormatter {
    builder
        .to_formatter()
        .with_resolver_style(ResolverStyle::Strict)
}

fn local_date_units(builder: &mut FormatterBuilder) {
    builder
        .append_value_styled(ChronoField::Year, 4, 10, SignStyle::ExceedsPad)
        .expect("static formatter definition")
        .append_literal('-')
        .append_value_width(ChronoField::MonthOfYear, 2)
        .expect("static formatter definition")
        .append_literal('-')
        .append_value_width(ChronoField::DayOfMonth, 2)
        .expect("static formatter definition");
}

fn local_time_units(builder: &mut FormatterBuilder) {
    builder
        .append_value_width(ChronoField::HourOfDay, 2)
        .expect("static formatter definition")
        .append_literal(':')
        .append_value_width(ChronoField::MinuteOfHour, 2)
        .expect("static formatter definition")
        .optional_start()
        .append_literal(':')
        .append_value_width(ChronoField::SecondOfMinute, 2)
        .expect("static formatter definition")
        .optional_start()
        .append_fraction(ChronoField::NanoOfSecond, 0, 9, true)
        .expect("static formatter definition");
}

impl DateTimeFormatter {
    /// `20240705`, with an optional `+HHMMss`-style offset.
    pub fn basic_iso_date() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            b.append_value_width(ChronoField::Year, 4)
                .expect("static formatter definition")
                .append_value_width(ChronoField::MonthOfYear, 2)
                .expect("static formatter definition")
                .append_value_width(ChronoField::DayOfMonth, 2)
                .expect("static formatter definition")
                .optional_start()
                .parse_lenient()
                .append_offset("+HHMMss", "Z")
                .expect("static formatter definition")
                .parse_strict();
            iso_strict(b)
        })
    }

    /// `2024-07-05`.
    pub fn iso_local_date() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            local_date_units(&mut b);
            iso_strict(b)
        })
    }

    /// `2024-07-05+01:00`.
    pub fn iso_offset_date() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            local_date_units(&mut b);
            b.append_offset_id();
            iso_strict(b)
        })
    }

    /// `2024-07-05` with the offset optional.
    pub fn iso_date() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            local_date_units(&mut b);
            b.optional_start().append_offset_id();
            iso_strict(b)
        })
    }

    /// `08:30`, `08:30:15`, or `08:30:15.123`.
    pub fn iso_local_time() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            local_time_units(&mut b);
            iso_strict(b)
        })
    }

    /// An ISO local time followed by a required offset.
    pub fn iso_offset_time() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            local_time_units(&mut b);
            b.optional_end()
                .expect("static formatter definition")
                .optional_end()
                .expect("static formatter definition")
                .append_offset_id();
            iso_strict(b)
        })
    }

    /// An ISO local time with the offset optional.
    pub fn iso_time() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            local_time_units(&mut b);
            b.optional_end()
                .expect("static formatter definition")
                .optional_end()
                .expect("static formatter definition")
                .optional_start()
                .append_offset_id();
            iso_strict(b)
        })
    }

    /// `2024-07-05T08:30:15`.
    pub fn iso_local_date_time() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            local_date_units(&mut b);
            b.append_literal('T');
            local_time_units(&mut b);
            iso_strict(b)
        })
    }

    /// `2024-07-05T08:30:15+01:00`.
    pub fn iso_offset_date_time() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            local_date_units(&mut b);
            b.append_literal('T');
            local_time_units(&mut b);
            b.optional_end()
                .expect("static formatter definition")
                .optional_end()
                .expect("static formatter definition")
                .parse_lenient()
                .append_offset_id()
                .parse_strict();
            iso_strict(b)
        })
    }

    /// `2024-07-05T08:30:15+01:00[Europe/London]`.
    pub fn iso_zoned_date_time() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            local_date_units(&mut b);
            b.append_literal('T');
            local_time_units(&mut b);
            b.optional_end()
                .expect("static formatter definition")
                .optional_end()
                .expect("static formatter definition")
                .parse_lenient()
                .append_offset_id()
                .parse_strict()
                .optional_start()
                .append_literal('[')
                .parse_case_sensitive()
                .append_zone_region_id()
                .append_literal(']');
            iso_strict(b)
        })
    }

    /// An ISO date-time where both the offset and the bracketed zone
    /// are optional.
    pub fn iso_date_time() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            local_date_units(&mut b);
            b.append_literal('T');
            local_time_units(&mut b);
            b.optional_end()
                .expect("static formatter definition")
                .optional_end()
                .expect("static formatter definition")
                .optional_start()
                .append_offset_id()
                .optional_end()
                .expect("static formatter definition")
                .optional_start()
                .append_literal('[')
                .parse_case_sensitive()
                .append_zone_region_id()
                .append_literal(']');
            iso_strict(b)
        })
    }

    /// `2024-187`, year and day-of-year.
    pub fn iso_ordinal_date() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            b.append_value_styled(ChronoField::Year, 4, 10, SignStyle::ExceedsPad)
                .expect("static formatter definition")
                .append_literal('-')
                .append_value_width(ChronoField::DayOfYear, 3)
                .expect("static formatter definition")
                .optional_start()
                .append_offset_id();
            iso_strict(b)
        })
    }

    /// `2024-W27-5`, the ISO week date.
    pub fn iso_week_date() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive();
            b.append_value_styled(WeekField::WeekBasedYear, 4, 10, SignStyle::ExceedsPad)
                .expect("static formatter definition")
                .append_string("-W")
                .append_value_width(WeekField::WeekOfWeekBasedYear, 2)
                .expect("static formatter definition")
                .append_literal('-')
                .append_value_width(ChronoField::DayOfWeek, 1)
                .expect("static formatter definition")
                .optional_start()
                .append_offset_id();
            iso_strict(b)
        })
    }

    /// `2024-07-05T08:30:15Z`, always UTC.
    pub fn iso_instant() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive().append_instant();
            iso_strict(b)
        })
    }

    /// `Fri, 5 Jul 2024 08:30:15 GMT`.
    pub fn rfc_1123_date_time() -> &'static Self {
        static SLOT: OnceLock<DateTimeFormatter> = OnceLock::new();
        predefined(&SLOT, || {
            let mut b = FormatterBuilder::new();
            b.parse_case_insensitive()
                .parse_lenient()
                .optional_start()
                .append_text_styled(ChronoField::DayOfWeek, TextStyle::Short)
                .append_string(", ")
                .optional_end()
                .expect("static formatter definition")
                .append_value_styled(ChronoField::DayOfMonth, 1, 2, SignStyle::NotNegative)
                .expect("static formatter definition")
                .append_literal(' ')
                .append_text_styled(ChronoField::MonthOfYear, TextStyle::Short)
                .append_literal(' ')
                .append_value_width(ChronoField::Year, 4)
                .expect("static formatter definition")
                .append_literal(' ')
                .append_value_width(ChronoField::HourOfDay, 2)
                .expect("static formatter definition")
                .append_literal(':')
                .append_value_width(ChronoField::MinuteOfHour, 2)
                .expect("static formatter definition")
                .optional_start()
                .append_literal(':')
                .append_value_width(ChronoField::SecondOfMinute, 2)
                .expect("static formatter definition")
                .optional_end()
                .expect("static formatter definition")
                .append_literal(' ')
                .append_offset("+HHMM", "GMT")
                .expect("static formatter definition");
            b.to_formatter()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iso::{IsoDate, IsoDateTime, IsoTime};
    use crate::temporal::{OffsetDateTime, ZonedDateTime};
    use crate::zone::ZoneOffset;

    fn sample_date_time() -> IsoDateTime {
        IsoDateTime::new(
            IsoDate::new_unchecked(2024, 7, 5),
            IsoTime::new_unchecked(8, 30, 15, 0),
        )
    }

    fn sample_offset_date_time() -> OffsetDateTime {
        OffsetDateTime::new(
            sample_date_time(),
            ZoneOffset::of_hms(1, 0, 0).expect("valid offset"),
        )
    }

    #[test]
    fn pattern_format_and_parse_round_trip() {
        let formatter = DateTimeFormatter::of_pattern("uuuu-MM-dd'T'HH:mm:ss").unwrap();
        let text = formatter.format(&sample_date_time()).unwrap();
        assert_eq!(text, "2024-07-05T08:30:15");
        let parsed = formatter.parse(&text).unwrap();
        assert_eq!(parsed.date(), Some(IsoDate::new_unchecked(2024, 7, 5)));
        assert_eq!(parsed.time(), Some(IsoTime::new_unchecked(8, 30, 15, 0)));
    }

    #[test]
    fn parse_reports_error_index() {
        let formatter = DateTimeFormatter::of_pattern("uuuu-MM-dd").unwrap();
        let err = formatter.parse("2024/07/05").unwrap_err();
        assert_eq!(err.index(), Some(4));
    }

    #[test]
    fn unparsed_trailing_text_is_an_error() {
        let formatter = DateTimeFormatter::of_pattern("HH:mm").unwrap();
        assert!(formatter.parse("08:30!").is_err());
        let mut pos = ParsePosition::new(0);
        let parsed = formatter.parse_positioned("08:30!", &mut pos).unwrap();
        assert_eq!(pos.index, 5);
        assert_eq!(parsed.time(), Some(IsoTime::new_unchecked(8, 30, 0, 0)));
    }

    #[test]
    fn parse_to_typed_values() {
        let formatter = DateTimeFormatter::iso_offset_date_time();
        let odt: OffsetDateTime = formatter.parse_to("2024-07-05T08:30:15+01:00").unwrap();
        assert_eq!(odt, sample_offset_date_time());
    }

    #[test]
    fn predefined_round_trips() {
        let odt = sample_offset_date_time();
        let cases: &[(&DateTimeFormatter, &str)] = &[
            (DateTimeFormatter::basic_iso_date(), "20240705+0100"),
            (DateTimeFormatter::iso_local_date(), "2024-07-05"),
            (DateTimeFormatter::iso_offset_date(), "2024-07-05+01:00"),
            (DateTimeFormatter::iso_local_time(), "08:30:15"),
            (DateTimeFormatter::iso_offset_time(), "08:30:15+01:00"),
            (
                DateTimeFormatter::iso_local_date_time(),
                "2024-07-05T08:30:15",
            ),
            (
                DateTimeFormatter::iso_offset_date_time(),
                "2024-07-05T08:30:15+01:00",
            ),
            (DateTimeFormatter::iso_ordinal_date(), "2024-187+01:00"),
            (DateTimeFormatter::iso_week_date(), "2024-W27-5+01:00"),
            (
                DateTimeFormatter::rfc_1123_date_time(),
                "Fri, 5 Jul 2024 08:30:15 +0100",
            ),
        ];
        for (formatter, expected) in cases {
            assert_eq!(formatter.format(&odt).unwrap(), *expected);
            // Parsed values implement TemporalAccessor, so the output
            // must survive a parse and reformat unchanged.
            let parsed = formatter.parse(expected).unwrap();
            assert_eq!(formatter.format(&parsed).unwrap(), *expected, "{expected}");
        }
    }

    #[test]
    fn iso_instant_round_trip() {
        let formatter = DateTimeFormatter::iso_instant();
        let odt = OffsetDateTime::from_epoch_seconds(1_720_168_215, 0, ZoneOffset::UTC).unwrap();
        let text = formatter.format(&odt).unwrap();
        assert_eq!(text, "2024-07-05T08:30:15Z");
        let parsed = formatter.parse(&text).unwrap();
        assert_eq!(
            parsed.get(ChronoField::InstantSeconds.into()),
            Some(1_720_168_215)
        );
    }

    #[test]
    fn zoned_formatter_and_zone_override() {
        let formatter = DateTimeFormatter::iso_zoned_date_time();
        let zdt: ZonedDateTime = formatter
            .parse_to("2024-07-05T08:30:15+01:00[Europe/London]")
            .unwrap();
        assert_eq!(zdt.zone, ZoneId::Region("Europe/London".into()));

        let overridden = DateTimeFormatter::of_pattern("VV")
            .unwrap()
            .with_zone(ZoneId::Region("Europe/Paris".into()));
        assert_eq!(
            overridden.format(&sample_date_time()).unwrap(),
            "Europe/Paris"
        );
    }

    #[test]
    fn resolver_fields_filter() {
        let formatter = DateTimeFormatter::iso_local_date().with_resolver_fields(&[
            Field::Chrono(ChronoField::Year),
            Field::Chrono(ChronoField::MonthOfYear),
        ]);
        let parsed = formatter.parse("2024-07-05").unwrap();
        assert_eq!(parsed.date(), None);
        assert_eq!(parsed.get(ChronoField::Year.into()), Some(2024));
    }

    #[test]
    fn parse_best_prefers_earlier_queries() {
        let formatter = DateTimeFormatter::iso_date();
        let with_offset = formatter
            .parse_best(
                "2024-07-05+01:00",
                &[
                    &|p: &Parsed| OffsetDateTimeOrDate::offset(p),
                    &|p: &Parsed| OffsetDateTimeOrDate::date(p),
                ],
            )
            .unwrap();
        assert!(matches!(with_offset, OffsetDateTimeOrDate::Offset(_)));
        let plain = formatter
            .parse_best(
                "2024-07-05",
                &[
                    &|p: &Parsed| OffsetDateTimeOrDate::offset(p),
                    &|p: &Parsed| OffsetDateTimeOrDate::date(p),
                ],
            )
            .unwrap();
        assert!(matches!(plain, OffsetDateTimeOrDate::Date(_)));
    }

    #[derive(Debug)]
    enum OffsetDateTimeOrDate {
        Offset(i64),
        Date(IsoDate),
    }

    impl OffsetDateTimeOrDate {
        fn offset(parsed: &Parsed) -> DateTimeResult<Self> {
            parsed
                .get(ChronoField::OffsetSeconds.into())
                .map(Self::Offset)
                .ok_or_else(|| DateTimeError::parse().with_message("no offset"))
        }

        fn date(parsed: &Parsed) -> DateTimeResult<Self> {
            IsoDate::try_from(parsed).map(Self::Date)
        }
    }

    #[test]
    fn localized_formatter() {
        let formatter =
            DateTimeFormatter::of_localized(Some(FormatStyle::Medium), None).unwrap();
        assert_eq!(
            formatter.format(&sample_date_time()).unwrap(),
            "Jul 5, 2024"
        );
    }
}
