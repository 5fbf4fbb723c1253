//! Composing formatters unit by unit, or from a pattern string.

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::DateTimeError;
use crate::field::{ChronoField, Field, IsoField, WeekField};
use crate::formatter::{DateTimeFormatter, FormatStyle};
use crate::text::TextStyle;
use crate::units::offset::OFFSET_PATTERNS;
use crate::units::{
    ChronologyUnit, CompositeUnit, DefaultingUnit, InstantUnit, LocalizedOffsetUnit,
    LocalizedUnit, NumberUnit, OffsetIdUnit, PadUnit, Setting, SignStyle, TextUnit, Unit,
    ZoneIdStyle, ZoneIdUnit, ZoneTextUnit,
};
use crate::DateTimeResult;

const MAX_WIDTH: usize = 19;

/// The text style a run of pattern letters selects: three or fewer for
/// the abbreviation, four for the full name, five for the narrow form.
fn text_style(count: usize, standalone: bool) -> Option<TextStyle> {
    let style = match count {
        1..=3 => TextStyle::Short,
        4 => TextStyle::Full,
        5 => TextStyle::Narrow,
        _ => return None,
    };
    Some(if standalone {
        style.as_standalone()
    } else {
        style
    })
}

/// One nesting level of the builder. Optional sections open a fresh
/// frame so adjacent-value state and pending padding never leak across
/// a `[`/`]` boundary.
#[derive(Debug, Default)]
struct Frame {
    units: Vec<Unit>,
    pad_next_width: usize,
    pad_next_char: char,
    /// Index of the variable-width numeric unit that fixed-width
    /// numeric followers attach to.
    value_index: Option<usize>,
}

/// Builds a [`DateTimeFormatter`] from individual units or from a
/// pattern string.
///
/// Consecutive numeric appends where the follower has a fixed width and
/// a [`SignStyle::NotNegative`] sign combine into an adjacent run: the
/// first unit parses greedily but leaves exactly enough digits for the
/// followers, which is what lets `HHmmss` split `123456` correctly.
#[derive(Debug)]
pub struct FormatterBuilder {
    stack: Vec<Frame>,
    active: Frame,
}

impl Default for FormatterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterBuilder {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            active: Frame::default(),
        }
    }

    /// Appends `unit`, applying any pending pad directive, and clears
    /// the adjacent-value anchor.
    fn append_unit(&mut self, mut unit: Unit) -> usize {
        if self.active.pad_next_width > 0 {
            unit = Unit::Pad(PadUnit::new(
                unit,
                self.active.pad_next_width,
                self.active.pad_next_char,
            ));
            self.active.pad_next_width = 0;
        }
        self.active.units.push(unit);
        self.active.value_index = None;
        self.active.units.len() - 1
    }

    fn append_number(&mut self, unit: NumberUnit) {
        if let Some(index) = self.active.value_index {
            if matches!(self.active.units.get(index), Some(Unit::Number(_))) {
                if unit.min_width == unit.max_width
                    && unit.sign_style == SignStyle::NotNegative
                {
                    let width = unit.max_width;
                    self.append_unit(Unit::Number(unit.with_fixed_width()));
                    if let Some(Unit::Number(base)) = self.active.units.get_mut(index) {
                        base.subsequent_width += width as i32;
                    }
                    self.active.value_index = Some(index);
                } else {
                    if let Some(Unit::Number(base)) = self.active.units.get_mut(index) {
                        base.subsequent_width = -1;
                    }
                    let appended = self.append_unit(Unit::Number(unit));
                    self.active.value_index = Some(appended);
                }
                return;
            }
        }
        let appended = self.append_unit(Unit::Number(unit));
        self.active.value_index = Some(appended);
    }

    /// Appends a variable-width numeric field, one to nineteen digits,
    /// with a sign only for negative values.
    pub fn append_value(&mut self, field: impl Into<Field>) -> &mut Self {
        self.append_number(NumberUnit::new(
            field.into(),
            1,
            MAX_WIDTH,
            SignStyle::Normal,
        ));
        self
    }

    /// Appends a fixed-width, zero-padded numeric field. Fixed-width
    /// units take part in adjacent-value parsing.
    pub fn append_value_width(
        &mut self,
        field: impl Into<Field>,
        width: usize,
    ) -> DateTimeResult<&mut Self> {
        if !(1..=MAX_WIDTH).contains(&width) {
            return Err(DateTimeError::builder()
                .with_message(format!("invalid width: {width} (valid values 1..=19)")));
        }
        self.append_number(NumberUnit::new(
            field.into(),
            width,
            width,
            SignStyle::NotNegative,
        ));
        Ok(self)
    }

    /// Appends a numeric field with explicit widths and sign handling.
    pub fn append_value_styled(
        &mut self,
        field: impl Into<Field>,
        min_width: usize,
        max_width: usize,
        sign_style: SignStyle,
    ) -> DateTimeResult<&mut Self> {
        if min_width < 1 || max_width > MAX_WIDTH || min_width > max_width {
            return Err(DateTimeError::builder().with_message(format!(
                "invalid widths: {min_width}..={max_width} (valid values 1..=19)"
            )));
        }
        self.append_number(NumberUnit::new(field.into(), min_width, max_width, sign_style));
        Ok(self)
    }

    /// Appends a numeric field printed as the low-order digits relative
    /// to a base value, such as a two-digit year with base 2000.
    pub fn append_value_reduced(
        &mut self,
        field: impl Into<Field>,
        width: usize,
        max_width: usize,
        base_value: i64,
    ) -> DateTimeResult<&mut Self> {
        if width < 1 || max_width > 10 || width > max_width {
            return Err(DateTimeError::builder().with_message(format!(
                "invalid reduced widths: {width}..={max_width} (valid values 1..=10)"
            )));
        }
        self.append_number(NumberUnit::reduced(field.into(), width, max_width, base_value));
        Ok(self)
    }

    /// Appends the fractional part of a fixed-range field, scaled to a
    /// decimal fraction of the field's span.
    pub fn append_fraction(
        &mut self,
        field: impl Into<Field>,
        min_width: usize,
        max_width: usize,
        decimal_point: bool,
    ) -> DateTimeResult<&mut Self> {
        let field = field.into();
        if max_width < 1 || max_width > 9 || min_width > max_width {
            return Err(DateTimeError::builder().with_message(format!(
                "invalid fraction widths: {min_width}..={max_width} (valid values 0..=9)"
            )));
        }
        if !field.range().is_fixed() {
            return Err(DateTimeError::builder().with_message(format!(
                "field does not have a fixed value range: {field}"
            )));
        }
        self.append_unit(Unit::Fraction(crate::units::FractionUnit::new(
            field,
            min_width,
            max_width,
            decimal_point,
        )));
        Ok(self)
    }

    /// Appends the full text of a field, such as `January`.
    pub fn append_text(&mut self, field: impl Into<Field>) -> &mut Self {
        self.append_text_styled(field, TextStyle::Full)
    }

    pub fn append_text_styled(&mut self, field: impl Into<Field>, style: TextStyle) -> &mut Self {
        self.append_unit(Unit::Text(TextUnit::new(field.into(), style)));
        self
    }

    pub fn append_literal(&mut self, literal: char) -> &mut Self {
        self.append_unit(Unit::Char(literal));
        self
    }

    pub fn append_string(&mut self, literal: &str) -> &mut Self {
        let mut chars = literal.chars();
        match (chars.next(), chars.next()) {
            (None, _) => {}
            (Some(c), None) => {
                self.append_unit(Unit::Char(c));
            }
            _ => {
                self.append_unit(Unit::Str(literal.into()));
            }
        }
        self
    }

    /// Appends an offset in the `+HH:MM:ss` layout with `Z` for zero.
    pub fn append_offset_id(&mut self) -> &mut Self {
        self.append_unit(Unit::OffsetId(OffsetIdUnit::iso_z()));
        self
    }

    /// Appends an offset using one of the `+HH`-family layouts.
    pub fn append_offset(&mut self, pattern: &str, no_offset_text: &str) -> DateTimeResult<&mut Self> {
        let unit = OffsetIdUnit::new(pattern, no_offset_text)?;
        self.append_unit(Unit::OffsetId(unit));
        Ok(self)
    }

    /// Appends a localized offset such as `GMT+2`; only the full and
    /// short normal styles are meaningful.
    pub fn append_localized_offset(&mut self, style: TextStyle) -> DateTimeResult<&mut Self> {
        if !matches!(style, TextStyle::Full | TextStyle::Short) {
            return Err(DateTimeError::builder()
                .with_message("localized offset style must be full or short"));
        }
        self.append_unit(Unit::LocalizedOffset(LocalizedOffsetUnit::new(style)));
        Ok(self)
    }

    /// Appends a zone id that only prints a zone the temporal actually
    /// carries; a bare offset is treated as an absent field.
    pub fn append_zone_id(&mut self) -> &mut Self {
        self.append_unit(Unit::ZoneId(ZoneIdUnit::new(ZoneIdStyle::Strict)));
        self
    }

    /// Appends a zone id that only prints region zones; fixed-offset
    /// zones are treated as an absent field as well.
    pub fn append_zone_region_id(&mut self) -> &mut Self {
        self.append_unit(Unit::ZoneId(ZoneIdUnit::new(ZoneIdStyle::RegionOnly)));
        self
    }

    /// Appends a zone id that falls back to a fixed-offset zone built
    /// from the offset field when the temporal carries no zone.
    pub fn append_zone_or_offset_id(&mut self) -> &mut Self {
        self.append_unit(Unit::ZoneId(ZoneIdUnit::new(ZoneIdStyle::OrOffset)));
        self
    }

    pub fn append_zone_text(&mut self, style: TextStyle) -> &mut Self {
        self.append_unit(Unit::ZoneText(ZoneTextUnit::new(style)));
        self
    }

    /// Appends the chronology id, such as `iso8601`.
    pub fn append_chronology_id(&mut self) -> &mut Self {
        self.append_unit(Unit::Chronology(ChronologyUnit));
        self
    }

    /// Injects `value` for `field` after parsing when nothing in the
    /// text supplied it.
    pub fn parse_defaulting(&mut self, field: impl Into<Field>, value: i64) -> &mut Self {
        self.append_unit(Unit::Defaulting(DefaultingUnit::new(field.into(), value)));
        self
    }

    /// Appends an ISO-8601 instant, seconds always present and the
    /// fraction printed in groups of three digits as needed.
    pub fn append_instant(&mut self) -> &mut Self {
        self.append_unit(Unit::Instant(InstantUnit::grouped()));
        self
    }

    /// Appends an ISO-8601 instant with a controlled fraction: `-1`
    /// prints as many digits as needed, `0..=9` exactly that many.
    pub fn append_instant_digits(&mut self, fractional_digits: i8) -> DateTimeResult<&mut Self> {
        let unit = InstantUnit::new(fractional_digits)?;
        self.append_unit(Unit::Instant(unit));
        Ok(self)
    }

    /// Appends a locale-dependent date and/or time in the given styles.
    pub fn append_localized(
        &mut self,
        date_style: Option<FormatStyle>,
        time_style: Option<FormatStyle>,
    ) -> DateTimeResult<&mut Self> {
        let unit = LocalizedUnit::new(date_style, time_style)?;
        self.append_unit(Unit::Localized(unit));
        Ok(self)
    }

    /// Pads the next appended unit to `width` with spaces.
    pub fn pad_next(&mut self, width: usize) -> DateTimeResult<&mut Self> {
        self.pad_next_with(width, ' ')
    }

    pub fn pad_next_with(&mut self, width: usize, pad_char: char) -> DateTimeResult<&mut Self> {
        if width < 1 {
            return Err(DateTimeError::builder().with_message("pad width must be at least one"));
        }
        self.active.pad_next_width = width;
        self.active.pad_next_char = pad_char;
        Ok(self)
    }

    /// Opens an optional section. During formatting the section is
    /// skipped when a field inside it is absent; during parsing a
    /// failed section is rolled back and skipped.
    pub fn optional_start(&mut self) -> &mut Self {
        let parent = core::mem::take(&mut self.active);
        self.stack.push(parent);
        self
    }

    pub fn optional_end(&mut self) -> DateTimeResult<&mut Self> {
        let Some(parent) = self.stack.pop() else {
            return Err(DateTimeError::builder()
                .with_message("no optional section open to end"));
        };
        let closed = core::mem::replace(&mut self.active, parent);
        if !closed.units.is_empty() {
            self.append_unit(Unit::Composite(CompositeUnit::new(closed.units, true)));
        }
        Ok(self)
    }

    pub fn parse_case_sensitive(&mut self) -> &mut Self {
        self.append_unit(Unit::Settings(Setting::CaseSensitive));
        self
    }

    pub fn parse_case_insensitive(&mut self) -> &mut Self {
        self.append_unit(Unit::Settings(Setting::CaseInsensitive));
        self
    }

    pub fn parse_strict(&mut self) -> &mut Self {
        self.append_unit(Unit::Settings(Setting::Strict));
        self
    }

    pub fn parse_lenient(&mut self) -> &mut Self {
        self.append_unit(Unit::Settings(Setting::Lenient));
        self
    }

    /// Appends all units of an existing formatter; the compiled form is
    /// shared, not copied.
    pub fn append_formatter(&mut self, formatter: &DateTimeFormatter) -> &mut Self {
        self.append_unit(Unit::Shared(formatter.unit()));
        self
    }

    /// Appends units compiled from a pattern string such as
    /// `uuuu-MM-dd'T'HH:mm:ss`.
    pub fn append_pattern(&mut self, pattern: &str) -> DateTimeResult<&mut Self> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut pos = 0;
        while pos < chars.len() {
            let cur = chars[pos];
            if cur.is_ascii_alphabetic() {
                let start = pos;
                while pos < chars.len() && chars[pos] == cur {
                    pos += 1;
                }
                let mut letter = cur;
                let mut count = pos - start;
                if cur == 'p' {
                    let pad = count;
                    let Some(next) = chars.get(pos).copied().filter(char::is_ascii_alphabetic)
                    else {
                        return Err(DateTimeError::builder().with_message(format!(
                            "pad letter 'p' must be followed by a pattern letter: {pattern:?}"
                        )));
                    };
                    letter = next;
                    let field_start = pos;
                    while pos < chars.len() && chars[pos] == letter {
                        pos += 1;
                    }
                    count = pos - field_start;
                    self.pad_next(pad)?;
                }
                self.append_pattern_letter(letter, count)?;
            } else if cur == '\'' {
                pos += 1;
                let mut literal = String::new();
                loop {
                    match chars.get(pos) {
                        None => {
                            return Err(DateTimeError::builder().with_message(format!(
                                "pattern ends with an unterminated literal: {pattern:?}"
                            )));
                        }
                        Some('\'') if chars.get(pos + 1) == Some(&'\'') => {
                            literal.push('\'');
                            pos += 2;
                        }
                        Some('\'') => {
                            pos += 1;
                            break;
                        }
                        Some(c) => {
                            literal.push(*c);
                            pos += 1;
                        }
                    }
                }
                if literal.is_empty() {
                    self.append_literal('\'');
                } else {
                    self.append_string(&literal);
                }
            } else if cur == '[' {
                self.optional_start();
                pos += 1;
            } else if cur == ']' {
                self.optional_end().map_err(|_| {
                    DateTimeError::builder().with_message(format!(
                        "pattern contains ']' without a matching '[': {pattern:?}"
                    ))
                })?;
                pos += 1;
            } else if matches!(cur, '#' | '{' | '}') {
                return Err(DateTimeError::builder()
                    .with_message(format!("reserved pattern character: {cur:?}")));
            } else {
                self.append_literal(cur);
                pos += 1;
            }
        }
        Ok(self)
    }

    fn append_pattern_letter(&mut self, letter: char, count: usize) -> DateTimeResult<()> {
        use ChronoField::*;
        let bad_count = || {
            DateTimeError::builder()
                .with_message(format!("invalid pattern letter count: {count} of {letter:?}"))
        };
        match letter {
            'G' => {
                self.append_text_styled(Era, text_style(count, false).ok_or_else(bad_count)?);
            }
            'u' | 'y' | 'Y' => {
                let field: Field = match letter {
                    'u' => Year.into(),
                    'y' => YearOfEra.into(),
                    _ => WeekField::WeekBasedYear.into(),
                };
                if count == 2 {
                    self.append_number(NumberUnit::reduced(field, 2, 2, 2000));
                } else if count <= MAX_WIDTH {
                    let sign = if count < 4 {
                        SignStyle::Normal
                    } else {
                        SignStyle::ExceedsPad
                    };
                    self.append_number(NumberUnit::new(field, count, MAX_WIDTH, sign));
                } else {
                    return Err(bad_count());
                }
            }
            'Q' | 'q' => {
                let field: Field = IsoField::QuarterOfYear.into();
                match count {
                    1 => {
                        self.append_value(field);
                    }
                    2 => {
                        self.append_value_width(field, 2)?;
                    }
                    _ => {
                        self.append_text_styled(
                            field,
                            text_style(count, letter == 'q').ok_or_else(bad_count)?,
                        );
                    }
                }
            }
            'M' | 'L' => match count {
                1 => {
                    self.append_value(MonthOfYear);
                }
                2 => {
                    self.append_value_width(MonthOfYear, 2)?;
                }
                _ => {
                    self.append_text_styled(
                        MonthOfYear,
                        text_style(count, letter == 'L').ok_or_else(bad_count)?,
                    );
                }
            },
            'w' => {
                if count > 2 {
                    return Err(bad_count());
                }
                self.append_value_styled(
                    WeekField::WeekOfWeekBasedYear,
                    count,
                    2,
                    SignStyle::NotNegative,
                )?;
            }
            'W' => {
                if count != 1 {
                    return Err(bad_count());
                }
                self.append_value_styled(WeekField::WeekOfMonth, 1, 2, SignStyle::NotNegative)?;
            }
            'd' => match count {
                1 => {
                    self.append_value(DayOfMonth);
                }
                2 => {
                    self.append_value_width(DayOfMonth, 2)?;
                }
                _ => return Err(bad_count()),
            },
            'D' => match count {
                1 => {
                    self.append_value(DayOfYear);
                }
                2 | 3 => {
                    self.append_value_styled(DayOfYear, count, 3, SignStyle::NotNegative)?;
                }
                _ => return Err(bad_count()),
            },
            'F' => {
                if count != 1 {
                    return Err(bad_count());
                }
                self.append_value(AlignedDayOfWeekInMonth);
            }
            'E' => {
                self.append_text_styled(DayOfWeek, text_style(count, false).ok_or_else(bad_count)?);
            }
            'e' => match count {
                1 | 2 => {
                    self.append_value_styled(
                        WeekField::LocalDayOfWeek,
                        count,
                        2,
                        SignStyle::NotNegative,
                    )?;
                }
                _ => {
                    self.append_text_styled(DayOfWeek, text_style(count, false).ok_or_else(bad_count)?);
                }
            },
            'c' => match count {
                1 => {
                    self.append_value_styled(
                        WeekField::LocalDayOfWeek,
                        1,
                        2,
                        SignStyle::NotNegative,
                    )?;
                }
                2 => return Err(bad_count()),
                _ => {
                    self.append_text_styled(DayOfWeek, text_style(count, true).ok_or_else(bad_count)?);
                }
            },
            'a' => {
                if count != 1 {
                    return Err(bad_count());
                }
                self.append_text_styled(AmPmOfDay, TextStyle::Short);
            }
            'h' | 'K' | 'k' | 'H' | 'm' | 's' => {
                let field = match letter {
                    'h' => ClockHourOfAmPm,
                    'K' => HourOfAmPm,
                    'k' => ClockHourOfDay,
                    'H' => HourOfDay,
                    'm' => MinuteOfHour,
                    _ => SecondOfMinute,
                };
                match count {
                    1 => {
                        self.append_value(field);
                    }
                    2 => {
                        self.append_value_width(field, 2)?;
                    }
                    _ => return Err(bad_count()),
                }
            }
            'S' => {
                self.append_fraction(NanoOfSecond, count, count, false)?;
            }
            'A' | 'n' | 'N' => {
                let field = match letter {
                    'A' => MilliOfDay,
                    'n' => NanoOfSecond,
                    _ => NanoOfDay,
                };
                if count > MAX_WIDTH {
                    return Err(bad_count());
                }
                self.append_value_styled(field, count, MAX_WIDTH, SignStyle::NotNegative)?;
            }
            'V' => {
                if count != 2 {
                    return Err(bad_count());
                }
                self.append_zone_id();
            }
            'z' => match count {
                1..=3 => {
                    self.append_zone_text(TextStyle::Short);
                }
                4 => {
                    self.append_zone_text(TextStyle::Full);
                }
                _ => return Err(bad_count()),
            },
            'O' => match count {
                1 => {
                    self.append_localized_offset(TextStyle::Short)?;
                }
                4 => {
                    self.append_localized_offset(TextStyle::Full)?;
                }
                _ => return Err(bad_count()),
            },
            'X' | 'x' => {
                if count > 5 {
                    return Err(bad_count());
                }
                let index = count + usize::from(count > 1);
                let no_offset = if letter == 'X' {
                    "Z"
                } else if count == 1 {
                    "+00"
                } else if count % 2 == 0 {
                    "+0000"
                } else {
                    "+00:00"
                };
                self.append_offset(OFFSET_PATTERNS[index], no_offset)?;
            }
            'Z' => match count {
                1..=3 => {
                    self.append_offset("+HHMM", "+0000")?;
                }
                4 => {
                    self.append_localized_offset(TextStyle::Full)?;
                }
                5 => {
                    self.append_offset("+HH:MM:ss", "Z")?;
                }
                _ => return Err(bad_count()),
            },
            _ => {
                return Err(DateTimeError::builder()
                    .with_message(format!("unknown pattern letter: {letter:?}")));
            }
        }
        Ok(())
    }

    /// Closes any open optional sections and produces the compiled
    /// unit tree.
    pub(crate) fn build_unit(mut self) -> Unit {
        while !self.stack.is_empty() {
            // Cannot fail while a frame remains on the stack.
            let _ = self.optional_end();
        }
        Unit::Composite(CompositeUnit::new(self.active.units, false))
    }

    /// Completes this builder into a formatter with the default locale
    /// and smart resolution.
    pub fn to_formatter(self) -> DateTimeFormatter {
        DateTimeFormatter::from_unit(Arc::new(self.build_unit()))
    }

    pub fn to_formatter_with_locale(self, locale: crate::locale::Locale) -> DateTimeFormatter {
        self.to_formatter().with_locale(locale)
    }
}
