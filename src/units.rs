//! The printer-parser units a formatter is composed of.
//!
//! Every unit knows how to emit itself into an output buffer and how to
//! consume itself from input text. Formatting reports `Ok(false)` when a
//! field is absent inside an optional section; parsing reports
//! `Err(error_position)` instead of carrying the position in a sign bit.

pub(crate) mod instant;
pub(crate) mod localized;
pub(crate) mod offset;
pub(crate) mod zone;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::DateTimeError;
use crate::field::Field;
use crate::print::PrintContext;
use crate::parse::ParseContext;
use crate::text::TextStyle;
use crate::DateTimeResult;

pub(crate) use instant::InstantUnit;
pub(crate) use localized::LocalizedUnit;
pub(crate) use offset::{LocalizedOffsetUnit, OffsetIdUnit};
pub(crate) use zone::{ZoneIdStyle, ZoneIdUnit, ZoneTextUnit};

/// How the sign of a numeric field is printed and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignStyle {
    /// Print the sign only for negative values.
    Normal,
    /// Always print a sign.
    Always,
    /// Never print a sign; parse may still accept one leniently.
    Never,
    /// The value is never negative; no sign is printed.
    NotNegative,
    /// Print the sign when the value exceeds the padded width.
    ExceedsPad,
}

impl SignStyle {
    /// Whether a parsed sign character is admissible.
    fn parse(self, positive: bool, strict: bool, fixed_width: bool) -> bool {
        match self {
            SignStyle::Normal => !positive || !strict,
            SignStyle::Always | SignStyle::ExceedsPad => true,
            SignStyle::Never | SignStyle::NotNegative => !strict && !fixed_width,
        }
    }
}

/// Parse-mode toggles, appended as zero-width units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Setting {
    CaseSensitive,
    CaseInsensitive,
    Strict,
    Lenient,
}

/// One node of a compiled formatter.
#[derive(Debug)]
pub(crate) enum Unit {
    Char(char),
    Str(Box<str>),
    Composite(CompositeUnit),
    Shared(Arc<Unit>),
    Pad(PadUnit),
    Settings(Setting),
    Number(NumberUnit),
    Fraction(FractionUnit),
    Text(TextUnit),
    OffsetId(OffsetIdUnit),
    LocalizedOffset(LocalizedOffsetUnit),
    ZoneId(ZoneIdUnit),
    ZoneText(ZoneTextUnit),
    Chronology(ChronologyUnit),
    Defaulting(DefaultingUnit),
    Instant(InstantUnit),
    Localized(LocalizedUnit),
}

impl Unit {
    /// Emits this unit. `Ok(false)` means a field was absent inside an
    /// optional section; the caller discards any partial output.
    pub(crate) fn format(&self, ctx: &mut PrintContext<'_>, out: &mut String) -> DateTimeResult<bool> {
        match self {
            Unit::Char(c) => {
                out.push(*c);
                Ok(true)
            }
            Unit::Str(s) => {
                out.push_str(s);
                Ok(true)
            }
            Unit::Composite(unit) => unit.format(ctx, out),
            Unit::Shared(unit) => unit.format(ctx, out),
            Unit::Pad(unit) => unit.format(ctx, out),
            Unit::Settings(_) => Ok(true),
            Unit::Number(unit) => unit.format(ctx, out),
            Unit::Fraction(unit) => unit.format(ctx, out),
            Unit::Text(unit) => unit.format(ctx, out),
            Unit::OffsetId(unit) => unit.format(ctx, out),
            Unit::LocalizedOffset(unit) => unit.format(ctx, out),
            Unit::ZoneId(unit) => unit.format(ctx, out),
            Unit::ZoneText(unit) => unit.format(ctx, out),
            Unit::Chronology(unit) => unit.format(ctx, out),
            Unit::Defaulting(_) => Ok(true),
            Unit::Instant(unit) => unit.format(ctx, out),
            Unit::Localized(unit) => unit.format(ctx, out),
        }
    }

    /// Consumes this unit from `text` at `pos`, returning the new
    /// position or the position where matching failed.
    pub(crate) fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
        text: &str,
        pos: usize,
    ) -> Result<usize, usize> {
        match self {
            Unit::Char(c) => {
                let next = text[pos..].chars().next().ok_or(pos)?;
                if ctx.char_equals(next, *c) {
                    Ok(pos + next.len_utf8())
                } else {
                    Err(pos)
                }
            }
            Unit::Str(s) => ctx.match_str(text, pos, s).ok_or(pos),
            Unit::Composite(unit) => unit.parse(ctx, text, pos),
            Unit::Shared(unit) => unit.parse(ctx, text, pos),
            Unit::Pad(unit) => unit.parse(ctx, text, pos),
            Unit::Settings(setting) => {
                match setting {
                    Setting::CaseSensitive => ctx.set_case_sensitive(true),
                    Setting::CaseInsensitive => ctx.set_case_sensitive(false),
                    Setting::Strict => ctx.set_strict(true),
                    Setting::Lenient => ctx.set_strict(false),
                }
                Ok(pos)
            }
            Unit::Number(unit) => unit.parse(ctx, text, pos),
            Unit::Fraction(unit) => unit.parse(ctx, text, pos),
            Unit::Text(unit) => unit.parse(ctx, text, pos),
            Unit::OffsetId(unit) => unit.parse(ctx, text, pos),
            Unit::LocalizedOffset(unit) => unit.parse(ctx, text, pos),
            Unit::ZoneId(unit) => unit.parse(ctx, text, pos),
            Unit::ZoneText(unit) => unit.parse(ctx, text, pos),
            Unit::Chronology(unit) => unit.parse(ctx, text, pos),
            Unit::Defaulting(unit) => unit.parse(ctx, pos),
            Unit::Instant(unit) => unit.parse(ctx, text, pos),
            Unit::Localized(unit) => unit.parse(ctx, text, pos),
        }
    }
}

/// An ordered run of units, optionally forming an optional section.
#[derive(Debug)]
pub(crate) struct CompositeUnit {
    pub(crate) units: Vec<Unit>,
    pub(crate) optional: bool,
}

impl CompositeUnit {
    pub(crate) fn new(units: Vec<Unit>, optional: bool) -> Self {
        Self { units, optional }
    }

    fn format(&self, ctx: &mut PrintContext<'_>, out: &mut String) -> DateTimeResult<bool> {
        let length = out.len();
        if self.optional {
            ctx.start_optional();
        }
        let mut result = Ok(true);
        for unit in &self.units {
            match unit.format(ctx, out) {
                Ok(true) => {}
                Ok(false) => {
                    // A missing field erases the whole section.
                    out.truncate(length);
                    break;
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        if self.optional {
            ctx.end_optional();
        }
        result
    }

    fn parse(&self, ctx: &mut ParseContext<'_>, text: &str, pos: usize) -> Result<usize, usize> {
        if self.optional {
            ctx.start_optional();
            let mut current = pos;
            for unit in &self.units {
                match unit.parse(ctx, text, current) {
                    Ok(next) => current = next,
                    Err(_) => {
                        ctx.end_optional(false);
                        return Ok(pos);
                    }
                }
            }
            ctx.end_optional(true);
            Ok(current)
        } else {
            let mut current = pos;
            for unit in &self.units {
                current = unit.parse(ctx, text, current)?;
            }
            Ok(current)
        }
    }
}

/// Fixed-width decorator: pads output on the left and constrains the
/// wrapped unit to the pad window when parsing strictly.
#[derive(Debug)]
pub(crate) struct PadUnit {
    inner: Box<Unit>,
    width: usize,
    pad_char: char,
}

impl PadUnit {
    pub(crate) fn new(inner: Unit, width: usize, pad_char: char) -> Self {
        Self {
            inner: Box::new(inner),
            width,
            pad_char,
        }
    }

    fn format(&self, ctx: &mut PrintContext<'_>, out: &mut String) -> DateTimeResult<bool> {
        let pre_len = out.len();
        if !self.inner.format(ctx, out)? {
            return Ok(false);
        }
        let len = out.len() - pre_len;
        if len > self.width {
            return Err(DateTimeError::format().with_message(format!(
                "output of {len} characters exceeds pad width of {}",
                self.width
            )));
        }
        let padding: String = core::iter::repeat(self.pad_char)
            .take(self.width - len)
            .collect();
        out.insert_str(pre_len, &padding);
        Ok(true)
    }

    fn parse(&self, ctx: &mut ParseContext<'_>, text: &str, pos: usize) -> Result<usize, usize> {
        let strict = ctx.strict();
        if pos >= text.len() {
            return Err(pos);
        }
        let mut end_pos = pos + self.width;
        if end_pos > text.len() {
            if strict {
                return Err(pos);
            }
            end_pos = text.len();
        }
        while end_pos > pos && !text.is_char_boundary(end_pos) {
            end_pos -= 1;
        }
        let mut inner_pos = pos;
        for c in text[pos..end_pos].chars() {
            if !ctx.char_equals(c, self.pad_char) {
                break;
            }
            inner_pos += c.len_utf8();
        }
        // The wrapped unit may not look past the pad window.
        let window = &text[..end_pos];
        let result_pos = self.inner.parse(ctx, window, inner_pos)?;
        if result_pos != end_pos && strict {
            return Err(pos + 1);
        }
        Ok(result_pos)
    }
}

const MAX_DIGITS: usize = 19;

fn pow10(exp: usize) -> Option<i64> {
    10_i64.checked_pow(u32::try_from(exp).ok()?)
}

/// A numeric field with width and sign control.
///
/// `subsequent_width` drives adjacent-value parsing: a positive value
/// makes the variable-width first unit of a run leave that many digits
/// for the fixed-width units that follow it, and `-1` marks those
/// fixed-width followers.
#[derive(Debug, Clone)]
pub(crate) struct NumberUnit {
    pub(crate) field: Field,
    pub(crate) min_width: usize,
    pub(crate) max_width: usize,
    pub(crate) sign_style: SignStyle,
    pub(crate) subsequent_width: i32,
    /// Base value of a reduced field, such as 2000 for two-digit years.
    pub(crate) reduced_base: Option<i64>,
}

impl NumberUnit {
    pub(crate) fn new(
        field: Field,
        min_width: usize,
        max_width: usize,
        sign_style: SignStyle,
    ) -> Self {
        Self {
            field,
            min_width,
            max_width,
            sign_style,
            subsequent_width: 0,
            reduced_base: None,
        }
    }

    pub(crate) fn reduced(field: Field, width: usize, max_width: usize, base_value: i64) -> Self {
        Self {
            field,
            min_width: width,
            max_width,
            sign_style: SignStyle::NotNegative,
            subsequent_width: 0,
            reduced_base: Some(base_value),
        }
    }

    pub(crate) fn with_fixed_width(mut self) -> Self {
        self.subsequent_width = -1;
        self
    }

    pub(crate) fn with_subsequent_width(mut self, width: usize) -> Self {
        self.subsequent_width += width as i32;
        self
    }

    fn is_fixed_width(&self, strict: bool) -> bool {
        if self.reduced_base.is_some() && !strict {
            return false;
        }
        self.subsequent_width == -1
    }

    /// The digits actually printed, which for reduced fields is the
    /// low-order part within the base window.
    fn output_value(&self, value: i64) -> i64 {
        let Some(base) = self.reduced_base else {
            return value;
        };
        let abs = value.unsigned_abs() as i64;
        if let Some(range) = pow10(self.min_width) {
            if value >= base && value < base + range {
                return abs % range;
            }
        }
        match pow10(self.max_width) {
            Some(range) => abs % range,
            None => abs,
        }
    }

    /// Maps parsed digits back to a full value for reduced fields.
    fn apply_value(
        &self,
        ctx: &mut ParseContext<'_>,
        mut value: i64,
        error_pos: usize,
        success_pos: usize,
    ) -> Result<usize, usize> {
        if let Some(base) = self.reduced_base {
            let parse_len = success_pos - error_pos;
            if parse_len == self.min_width && value >= 0 {
                if let Some(range) = pow10(self.min_width) {
                    let last_part = base % range;
                    let base_part = base - last_part;
                    value = if base > 0 {
                        base_part + value
                    } else {
                        base_part - value
                    };
                    if value < base {
                        value += range;
                    }
                }
            }
        }
        ctx.set_field(self.field, value, error_pos, success_pos)
    }

    fn format(&self, ctx: &mut PrintContext<'_>, out: &mut String) -> DateTimeResult<bool> {
        let Some(value) = ctx.value(self.field)? else {
            return Ok(false);
        };
        let value = self.output_value(value);
        let ds = ctx.decimal_style;
        let digits = value.unsigned_abs().to_string();
        if digits.len() > self.max_width {
            return Err(DateTimeError::format().with_message(format!(
                "field {} value {value} exceeds maximum print width of {}",
                self.field, self.max_width
            )));
        }
        if value >= 0 {
            match self.sign_style {
                SignStyle::ExceedsPad => {
                    if let Some(exceed) = pow10(self.min_width) {
                        if value >= exceed {
                            out.push(ds.positive_sign);
                        }
                    }
                }
                SignStyle::Always => out.push(ds.positive_sign),
                _ => {}
            }
        } else {
            match self.sign_style {
                SignStyle::Normal | SignStyle::ExceedsPad | SignStyle::Always => {
                    out.push(ds.negative_sign);
                }
                SignStyle::NotNegative | SignStyle::Never => {
                    return Err(DateTimeError::format().with_message(format!(
                        "field {} value {value} cannot be negative",
                        self.field
                    )));
                }
            }
        }
        for _ in digits.len()..self.min_width {
            out.push(ds.zero_digit);
        }
        for d in digits.bytes() {
            out.push(ds.digit_char(d - b'0'));
        }
        Ok(true)
    }

    fn parse(&self, ctx: &mut ParseContext<'_>, text: &str, pos: usize) -> Result<usize, usize> {
        let strict = ctx.strict();
        let ds = ctx.decimal_style;
        let bytes = text.as_bytes();
        if pos >= bytes.len() {
            return Err(pos);
        }
        let mut position = pos;
        let sign = text[position..].chars().next().ok_or(pos)?;
        let mut negative = false;
        let mut positive = false;
        let fixed = self.min_width == self.max_width;
        if sign == ds.positive_sign {
            if !self.sign_style.parse(true, strict, fixed) {
                return Err(pos);
            }
            positive = true;
            position += sign.len_utf8();
        } else if sign == ds.negative_sign {
            if !self.sign_style.parse(false, strict, fixed) {
                return Err(pos);
            }
            negative = true;
            position += sign.len_utf8();
        } else if self.sign_style == SignStyle::Always && strict {
            return Err(pos);
        }
        let eff_min = if strict || self.is_fixed_width(strict) {
            self.min_width
        } else {
            1
        };
        let min_end = position + eff_min;
        if min_end > bytes.len() {
            return Err(pos);
        }
        let base_max = if strict || self.is_fixed_width(strict) {
            self.max_width
        } else {
            9
        };
        let mut eff_max = base_max + usize::try_from(self.subsequent_width).unwrap_or(0);
        let mut total: i64 = 0;
        let mut total_big: i128 = 0;
        let mut use_big = false;
        let mut cursor = position;
        loop {
            let max_end = (position + eff_max).min(bytes.len());
            while cursor < max_end {
                let Some(digit) = ds.digit_value(bytes[cursor] as char) else {
                    if cursor < min_end {
                        return Err(pos);
                    }
                    break;
                };
                cursor += 1;
                if cursor - position > 18 {
                    if !use_big {
                        total_big = i128::from(total);
                        use_big = true;
                    }
                    total_big = total_big * 10 + i128::from(digit);
                } else {
                    total = total * 10 + i64::from(digit);
                }
            }
            // Two-pass reparse: leave room for the adjacent fixed-width
            // units that follow.
            if self.subsequent_width > 0 && eff_max > base_max {
                let parse_len = cursor - position;
                eff_max = eff_min.max(parse_len.saturating_sub(self.subsequent_width as usize));
                cursor = position;
                total = 0;
                total_big = 0;
                use_big = false;
            } else {
                break;
            }
        }
        if use_big {
            // More digits than fit an i64: drop the last one.
            if total_big > i128::from(i64::MAX) {
                total_big /= 10;
                cursor -= 1;
            }
            total = total_big as i64;
        }
        if negative {
            if total == 0 && strict {
                return Err(pos);
            }
            total = -total;
        } else if self.sign_style == SignStyle::ExceedsPad && strict {
            let parse_len = cursor - position;
            if positive {
                if parse_len <= self.min_width {
                    return Err(pos);
                }
            } else if parse_len > self.min_width {
                return Err(pos);
            }
        }
        self.apply_value(ctx, total, pos, cursor)
    }
}

/// A fractional field printed as decimal digits scaled into `[0, 1)`.
#[derive(Debug, Clone)]
pub(crate) struct FractionUnit {
    pub(crate) field: Field,
    pub(crate) min_width: usize,
    pub(crate) max_width: usize,
    pub(crate) decimal_point: bool,
}

impl FractionUnit {
    pub(crate) fn new(field: Field, min_width: usize, max_width: usize, decimal_point: bool) -> Self {
        Self {
            field,
            min_width,
            max_width,
            decimal_point,
        }
    }

    fn format(&self, ctx: &mut PrintContext<'_>, out: &mut String) -> DateTimeResult<bool> {
        let Some(value) = ctx.value(self.field)? else {
            return Ok(false);
        };
        let range = self.field.range();
        range.check_valid_value(value, self.field)?;
        let ds = ctx.decimal_style;
        let min = range.minimum();
        let span = i128::from(range.maximum()) - i128::from(min) + 1;
        // Scale to nine digits, the longest supported fraction.
        let scaled = (i128::from(value - min) * 1_000_000_000) / span;
        let mut digits = format!("{scaled:09}");
        digits.truncate(self.max_width);
        while digits.len() > self.min_width && digits.ends_with('0') {
            digits.pop();
        }
        if digits.is_empty() {
            return Ok(true);
        }
        if self.decimal_point {
            out.push(ds.decimal_separator);
        }
        for d in digits.bytes() {
            out.push(ds.digit_char(d - b'0'));
        }
        Ok(true)
    }

    fn parse(&self, ctx: &mut ParseContext<'_>, text: &str, pos: usize) -> Result<usize, usize> {
        let strict = ctx.strict();
        let ds = ctx.decimal_style;
        let eff_min = if strict { self.min_width } else { 0 };
        let eff_max = if strict { self.max_width } else { 9 };
        let bytes = text.as_bytes();
        let mut position = pos;
        if position >= bytes.len() {
            return if eff_min > 0 { Err(pos) } else { Ok(pos) };
        }
        if self.decimal_point {
            if bytes[position] as char != ds.decimal_separator {
                return if eff_min > 0 { Err(pos) } else { Ok(pos) };
            }
            position += 1;
        }
        let min_end = position + eff_min;
        if min_end > bytes.len() {
            return Err(pos);
        }
        let max_end = (position + eff_max).min(bytes.len());
        let mut total: i64 = 0;
        let mut cursor = position;
        while cursor < max_end {
            let Some(digit) = ds.digit_value(bytes[cursor] as char) else {
                if cursor < min_end {
                    return Err(pos);
                }
                break;
            };
            cursor += 1;
            total = total * 10 + i64::from(digit);
        }
        let range = self.field.range();
        let min = range.minimum();
        let span = i128::from(range.maximum()) - i128::from(min) + 1;
        let scale = 10_i128.pow((cursor - position) as u32);
        let value = (i128::from(total) * span) / scale + i128::from(min);
        ctx.set_field(self.field, value as i64, pos, cursor)
    }
}

/// A field printed as localized text, falling back to digits.
#[derive(Debug, Clone)]
pub(crate) struct TextUnit {
    pub(crate) field: Field,
    pub(crate) style: TextStyle,
}

impl TextUnit {
    pub(crate) fn new(field: Field, style: TextStyle) -> Self {
        Self { field, style }
    }

    fn number_fallback(&self) -> NumberUnit {
        NumberUnit::new(self.field, 1, MAX_DIGITS, SignStyle::Normal)
    }

    fn format(&self, ctx: &mut PrintContext<'_>, out: &mut String) -> DateTimeResult<bool> {
        let Some(value) = ctx.value(self.field)? else {
            return Ok(false);
        };
        match ctx.text_provider.text(self.field, value, self.style, ctx.locale) {
            Some(text) => {
                out.push_str(&text);
                Ok(true)
            }
            None => self.number_fallback().format(ctx, out),
        }
    }

    fn parse(&self, ctx: &mut ParseContext<'_>, text: &str, pos: usize) -> Result<usize, usize> {
        if pos > text.len() {
            return Err(pos);
        }
        let style = if ctx.strict() { Some(self.style) } else { None };
        let candidates = ctx.text_provider.candidates(self.field, style, ctx.locale);
        for (candidate, value) in candidates.iter() {
            if let Some(next) = ctx.match_str(text, pos, candidate) {
                return ctx.set_field(self.field, *value, pos, next);
            }
        }
        if ctx.strict() {
            return Err(pos);
        }
        self.number_fallback().parse(ctx, text, pos)
    }
}

/// Prints and parses the calendar-system id, such as `iso8601`.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChronologyUnit;

impl ChronologyUnit {
    fn format(&self, ctx: &mut PrintContext<'_>, out: &mut String) -> DateTimeResult<bool> {
        let Some(id) = ctx.chronology()? else {
            return Ok(false);
        };
        out.push_str(id);
        Ok(true)
    }

    fn parse(&self, ctx: &mut ParseContext<'_>, text: &str, pos: usize) -> Result<usize, usize> {
        let mut ids: Vec<&str> = crate::chronology::CHRONOLOGY_IDS.to_vec();
        ids.sort_by(|a, b| b.len().cmp(&a.len()));
        for id in ids {
            if let Some(end) = ctx.match_str(text, pos, id) {
                if let Ok(tiny) = tinystr::TinyAsciiStr::try_from_str(id) {
                    ctx.set_chronology(tiny);
                }
                return Ok(end);
            }
        }
        Err(pos)
    }
}

/// Supplies a fallback field value; consumes no text and prints
/// nothing.
#[derive(Debug, Clone)]
pub(crate) struct DefaultingUnit {
    field: Field,
    value: i64,
}

impl DefaultingUnit {
    pub(crate) const fn new(field: Field, value: i64) -> Self {
        Self { field, value }
    }

    fn parse(&self, ctx: &mut ParseContext<'_>, pos: usize) -> Result<usize, usize> {
        if ctx.current().get(self.field).is_none() {
            return ctx.set_field(self.field, self.value, pos, pos);
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ChronoField;
    use crate::formatter::DecimalStyle;
    use crate::iso::{IsoDate, IsoTime};
    use crate::locale::Locale;
    use crate::text::EnglishTextProvider;

    fn format_unit(unit: &Unit, temporal: &dyn crate::temporal::TemporalAccessor) -> String {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = PrintContext::new(temporal, &locale, DecimalStyle::STANDARD, &provider);
        let mut out = String::new();
        unit.format(&mut ctx, &mut out).unwrap();
        out
    }

    fn parse_unit(unit: &Unit, text: &str) -> Result<(crate::parse::Parsed, usize), usize> {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        let pos = unit.parse(&mut ctx, text, 0)?;
        Ok((ctx.into_parsed(), pos))
    }

    #[test]
    fn number_pads_to_min_width() {
        let unit = Unit::Number(NumberUnit::new(
            ChronoField::MonthOfYear.into(),
            2,
            2,
            SignStyle::NotNegative,
        ));
        let date = IsoDate::new_unchecked(2024, 7, 15);
        assert_eq!(format_unit(&unit, &date), "07");
    }

    #[test]
    fn number_rejects_overwide_value() {
        let unit = Unit::Number(NumberUnit::new(
            ChronoField::Year.into(),
            2,
            2,
            SignStyle::NotNegative,
        ));
        let date = IsoDate::new_unchecked(2024, 7, 15);
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = PrintContext::new(&date, &locale, DecimalStyle::STANDARD, &provider);
        let mut out = String::new();
        assert!(unit.format(&mut ctx, &mut out).is_err());
    }

    #[test]
    fn adjacent_value_parsing_reserves_digits() {
        // A variable-width year followed by a fixed two-digit month,
        // merged the way the builder does it.
        let year = NumberUnit::new(
            ChronoField::Year.into(),
            1,
            MAX_DIGITS,
            SignStyle::Normal,
        )
        .with_subsequent_width(2);
        let month = NumberUnit::new(
            ChronoField::MonthOfYear.into(),
            2,
            2,
            SignStyle::NotNegative,
        )
        .with_fixed_width();
        let unit = Unit::Composite(CompositeUnit::new(
            alloc::vec![Unit::Number(year), Unit::Number(month)],
            false,
        ));
        let (parsed, pos) = parse_unit(&unit, "201106").unwrap();
        assert_eq!(pos, 6);
        assert_eq!(parsed.get(ChronoField::Year.into()), Some(2011));
        assert_eq!(parsed.get(ChronoField::MonthOfYear.into()), Some(6));
    }

    #[test]
    fn reduced_two_digit_year() {
        let unit = Unit::Number(NumberUnit::reduced(ChronoField::Year.into(), 2, 2, 2000));
        let (parsed, pos) = parse_unit(&unit, "12").unwrap();
        assert_eq!(pos, 2);
        assert_eq!(parsed.get(ChronoField::Year.into()), Some(2012));

        // Same unit formats 2012 back as the two low digits.
        let date = IsoDate::new_unchecked(2012, 1, 1);
        assert_eq!(format_unit(&unit, &date), "12");
    }

    #[test]
    fn reduced_year_full_length_stays_literal() {
        let unit = Unit::Number(NumberUnit::reduced(ChronoField::Year.into(), 2, 4, 2000));
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        ctx.set_strict(false);
        let pos = unit.parse(&mut ctx, "1915", 0).unwrap();
        assert_eq!(pos, 4);
        assert_eq!(ctx.into_parsed().get(ChronoField::Year.into()), Some(1915));
    }

    #[test]
    fn sign_styles_on_parse() {
        let strict_never = Unit::Number(NumberUnit::new(
            ChronoField::DayOfMonth.into(),
            2,
            2,
            SignStyle::NotNegative,
        ));
        assert!(parse_unit(&strict_never, "+5").is_err());

        let always = Unit::Number(NumberUnit::new(
            ChronoField::Year.into(),
            4,
            10,
            SignStyle::ExceedsPad,
        ));
        let (parsed, _) = parse_unit(&always, "+12024").unwrap();
        assert_eq!(parsed.get(ChronoField::Year.into()), Some(12024));
        // A sign on a non-exceeding strict value is rejected.
        assert!(parse_unit(&always, "+2024").is_err());
        let (parsed, _) = parse_unit(&always, "-0300").unwrap();
        assert_eq!(parsed.get(ChronoField::Year.into()), Some(-300));
    }

    #[test]
    fn fraction_round_trip() {
        let unit = Unit::Fraction(FractionUnit::new(
            ChronoField::NanoOfSecond.into(),
            0,
            9,
            true,
        ));
        let time = IsoTime::new_unchecked(0, 0, 0, 123_450_000);
        assert_eq!(format_unit(&unit, &time), ".12345");
        let (parsed, pos) = parse_unit(&unit, ".12345").unwrap();
        assert_eq!(pos, 6);
        assert_eq!(
            parsed.get(ChronoField::NanoOfSecond.into()),
            Some(123_450_000)
        );
    }

    #[test]
    fn fraction_zero_with_no_min_width_prints_nothing() {
        let unit = Unit::Fraction(FractionUnit::new(
            ChronoField::NanoOfSecond.into(),
            0,
            9,
            true,
        ));
        let time = IsoTime::new_unchecked(0, 0, 0, 0);
        assert_eq!(format_unit(&unit, &time), "");
        // And an empty input is acceptable.
        let (_, pos) = parse_unit(&unit, "").unwrap();
        assert_eq!(pos, 0);
    }

    #[test]
    fn text_formats_and_falls_back_to_number() {
        let unit = Unit::Text(TextUnit::new(
            ChronoField::MonthOfYear.into(),
            TextStyle::Short,
        ));
        let date = IsoDate::new_unchecked(2024, 7, 15);
        assert_eq!(format_unit(&unit, &date), "Jul");
        let (parsed, pos) = parse_unit(&unit, "Jul").unwrap();
        assert_eq!(pos, 3);
        assert_eq!(parsed.get(ChronoField::MonthOfYear.into()), Some(7));

        // No text exists for minute-of-hour, so digits are used.
        let minute = Unit::Text(TextUnit::new(
            ChronoField::MinuteOfHour.into(),
            TextStyle::Full,
        ));
        let time = IsoTime::new_unchecked(0, 5, 0, 0);
        assert_eq!(format_unit(&minute, &time), "5");
    }

    #[test]
    fn optional_composite_rolls_back() {
        let unit = Unit::Composite(CompositeUnit::new(
            alloc::vec![
                Unit::Number(NumberUnit::new(
                    ChronoField::HourOfDay.into(),
                    2,
                    2,
                    SignStyle::NotNegative,
                )),
                Unit::Composite(CompositeUnit::new(
                    alloc::vec![
                        Unit::Char(':'),
                        Unit::Number(NumberUnit::new(
                            ChronoField::MinuteOfHour.into(),
                            2,
                            2,
                            SignStyle::NotNegative,
                        )),
                    ],
                    true,
                )),
            ],
            false,
        ));
        let (parsed, pos) = parse_unit(&unit, "11:30").unwrap();
        assert_eq!(pos, 5);
        assert_eq!(parsed.get(ChronoField::MinuteOfHour.into()), Some(30));

        let (parsed, pos) = parse_unit(&unit, "11").unwrap();
        assert_eq!(pos, 2);
        assert_eq!(parsed.get(ChronoField::HourOfDay.into()), Some(11));
        assert_eq!(parsed.get(ChronoField::MinuteOfHour.into()), None);
    }

    #[test]
    fn pad_formats_and_parses() {
        let unit = Unit::Pad(PadUnit::new(
            Unit::Number(NumberUnit::new(
                ChronoField::DayOfMonth.into(),
                1,
                2,
                SignStyle::NotNegative,
            )),
            3,
            ' ',
        ));
        let date = IsoDate::new_unchecked(2024, 7, 5);
        assert_eq!(format_unit(&unit, &date), "  5");
        let (parsed, pos) = parse_unit(&unit, " 15").unwrap();
        assert_eq!(pos, 3);
        assert_eq!(parsed.get(ChronoField::DayOfMonth.into()), Some(15));
    }

    #[test]
    fn chronology_id_longest_match_wins() {
        let unit = Unit::Composite(CompositeUnit::new(
            alloc::vec![
                Unit::Settings(Setting::CaseInsensitive),
                Unit::Chronology(ChronologyUnit),
            ],
            false,
        ));
        // "ISO" is a case-insensitive prefix of "iso8601"; the longer id
        // must be tried first so the full text is consumed.
        let (parsed, pos) = parse_unit(&unit, "ISO8601").unwrap();
        assert_eq!(pos, 7);
        assert_eq!(parsed.chronology(), Some("iso8601"));

        let (parsed, pos) = parse_unit(&unit, "ISO").unwrap();
        assert_eq!(pos, 3);
        assert_eq!(parsed.chronology(), Some("ISO"));
    }

    #[test]
    fn settings_toggle_parse_modes() {
        let unit = Unit::Composite(CompositeUnit::new(
            alloc::vec![
                Unit::Settings(Setting::CaseInsensitive),
                Unit::Str("UTC".into()),
            ],
            false,
        ));
        let (_, pos) = parse_unit(&unit, "utc").unwrap();
        assert_eq!(pos, 3);
    }
}
