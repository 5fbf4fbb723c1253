//! UTC-offset printing and parsing.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;

use crate::error::DateTimeError;
use crate::field::ChronoField;
use crate::parse::ParseContext;
use crate::print::PrintContext;
use crate::text::TextStyle;
use crate::DateTimeResult;

/// The supported offset layouts, in pattern order.
pub(crate) const OFFSET_PATTERNS: &[&str] = &[
    "+HH", "+HHmm", "+HH:mm", "+HHMM", "+HH:MM", "+HHMMss", "+HH:MM:ss", "+HHMMSS", "+HH:MM:SS",
];

/// Prints and parses an offset like `+01:30`, `-0500`, or `Z`.
///
/// The pattern index encodes three things at once: whether a colon
/// separates the components (even indexes), whether minutes and seconds
/// appear at all, and whether they are required (uppercase in the
/// pattern) or printed only when non-zero.
#[derive(Debug, Clone)]
pub(crate) struct OffsetIdUnit {
    pattern: usize,
    no_offset_text: Box<str>,
}

impl OffsetIdUnit {
    pub(crate) fn new(pattern: &str, no_offset_text: &str) -> DateTimeResult<Self> {
        let index = OFFSET_PATTERNS
            .iter()
            .position(|p| *p == pattern)
            .ok_or_else(|| {
                DateTimeError::builder()
                    .with_message(format!("invalid offset pattern: {pattern:?}"))
            })?;
        Ok(Self {
            pattern: index,
            no_offset_text: no_offset_text.into(),
        })
    }

    /// The `+HH:MM:ss` layout with `Z` for zero, as used inside zone-id
    /// parsing and the instant unit.
    pub(crate) fn iso_z() -> Self {
        Self {
            pattern: 6,
            no_offset_text: "Z".into(),
        }
    }

    fn colon(&self) -> bool {
        self.pattern % 2 == 0
    }

    fn has_minutes(&self) -> bool {
        self.pattern >= 1
    }

    fn minutes_required(&self) -> bool {
        self.pattern >= 3
    }

    fn has_seconds(&self) -> bool {
        self.pattern >= 5
    }

    fn seconds_required(&self) -> bool {
        self.pattern >= 7
    }

    pub(crate) fn format(
        &self,
        ctx: &mut PrintContext<'_>,
        out: &mut String,
    ) -> DateTimeResult<bool> {
        let Some(total) = ctx.value(ChronoField::OffsetSeconds.into())? else {
            return Ok(false);
        };
        if total == 0 {
            out.push_str(&self.no_offset_text);
            return Ok(true);
        }
        let abs = total.unsigned_abs();
        let (hours, minutes, seconds) = (abs / 3600, abs / 60 % 60, abs % 60);
        let start = out.len();
        out.push(if total < 0 { '-' } else { '+' });
        let _ = core::fmt::Write::write_fmt(out, format_args!("{hours:02}"));
        let mut printed = hours;
        if self.minutes_required() || (self.has_minutes() && minutes > 0) {
            if self.colon() {
                out.push(':');
            }
            let _ = core::fmt::Write::write_fmt(out, format_args!("{minutes:02}"));
            printed += minutes;
            if self.seconds_required() || (self.has_seconds() && seconds > 0) {
                if self.colon() {
                    out.push(':');
                }
                let _ = core::fmt::Write::write_fmt(out, format_args!("{seconds:02}"));
                printed += seconds;
            }
        }
        if printed == 0 {
            out.truncate(start);
            out.push_str(&self.no_offset_text);
        }
        Ok(true)
    }

    /// Reads a two-digit component, preceded by a colon in colon
    /// layouts. Returns `Ok(None)` when the optional component is
    /// simply absent.
    fn parse_component(
        &self,
        bytes: &[u8],
        pos: &mut usize,
        colon_before: bool,
        required: bool,
    ) -> Result<Option<u64>, ()> {
        let mut p = *pos;
        if colon_before && self.colon() {
            if p >= bytes.len() || bytes[p] != b':' {
                return if required { Err(()) } else { Ok(None) };
            }
            p += 1;
        }
        if p + 2 > bytes.len() {
            return if required { Err(()) } else { Ok(None) };
        }
        let (d1, d2) = (bytes[p], bytes[p + 1]);
        if !d1.is_ascii_digit() || !d2.is_ascii_digit() {
            return if required { Err(()) } else { Ok(None) };
        }
        let value = u64::from(d1 - b'0') * 10 + u64::from(d2 - b'0');
        if value > 59 {
            return if required { Err(()) } else { Ok(None) };
        }
        *pos = p + 2;
        Ok(Some(value))
    }

    pub(crate) fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
        text: &str,
        pos: usize,
    ) -> Result<usize, usize> {
        let no_offset_len = self.no_offset_text.len();
        if no_offset_len == 0 {
            if pos == text.len() {
                return ctx.set_field(ChronoField::OffsetSeconds.into(), 0, pos, pos);
            }
        } else {
            if pos == text.len() {
                return Err(pos);
            }
            if let Some(next) = ctx.match_str(text, pos, &self.no_offset_text) {
                return ctx.set_field(ChronoField::OffsetSeconds.into(), 0, pos, next);
            }
        }
        let bytes = text.as_bytes();
        if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
            let negative = bytes[pos] == b'-';
            let mut cursor = pos + 1;
            let parsed = (|| -> Result<u64, ()> {
                let hours = self
                    .parse_component(bytes, &mut cursor, false, true)?
                    .ok_or(())?;
                let mut total = hours * 3600;
                if self.has_minutes() {
                    if let Some(minutes) =
                        self.parse_component(bytes, &mut cursor, true, self.minutes_required())?
                    {
                        total += minutes * 60;
                        if self.has_seconds() {
                            if let Some(seconds) = self.parse_component(
                                bytes,
                                &mut cursor,
                                true,
                                self.seconds_required(),
                            )? {
                                total += seconds;
                            }
                        }
                    }
                }
                Ok(total)
            })();
            if let Ok(total) = parsed {
                let offset = if negative {
                    -(total as i64)
                } else {
                    total as i64
                };
                return ctx.set_field(ChronoField::OffsetSeconds.into(), offset, pos, cursor);
            }
        }
        if no_offset_len == 0 {
            return ctx.set_field(ChronoField::OffsetSeconds.into(), 0, pos, pos);
        }
        Err(pos)
    }
}

/// The `GMT+01:30` style localized offset.
#[derive(Debug, Clone)]
pub(crate) struct LocalizedOffsetUnit {
    style: TextStyle,
}

impl LocalizedOffsetUnit {
    pub(crate) fn new(style: TextStyle) -> Self {
        Self { style }
    }

    fn full(&self) -> bool {
        self.style.as_normal() == TextStyle::Full
    }

    pub(crate) fn format(
        &self,
        ctx: &mut PrintContext<'_>,
        out: &mut String,
    ) -> DateTimeResult<bool> {
        let Some(total) = ctx.value(ChronoField::OffsetSeconds.into())? else {
            return Ok(false);
        };
        out.push_str("GMT");
        if total == 0 {
            return Ok(true);
        }
        let abs = total.unsigned_abs();
        let (hours, minutes, seconds) = (abs / 3600, abs / 60 % 60, abs % 60);
        out.push(if total < 0 { '-' } else { '+' });
        if self.full() {
            let _ = core::fmt::Write::write_fmt(
                out,
                format_args!("{hours:02}:{minutes:02}"),
            );
            if seconds > 0 {
                let _ = core::fmt::Write::write_fmt(out, format_args!(":{seconds:02}"));
            }
        } else {
            let _ = core::fmt::Write::write_fmt(out, format_args!("{hours}"));
            if minutes > 0 || seconds > 0 {
                let _ = core::fmt::Write::write_fmt(out, format_args!(":{minutes:02}"));
                if seconds > 0 {
                    let _ = core::fmt::Write::write_fmt(out, format_args!(":{seconds:02}"));
                }
            }
        }
        Ok(true)
    }

    pub(crate) fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
        text: &str,
        pos: usize,
    ) -> Result<usize, usize> {
        let Some(mut cursor) = ctx.match_str(text, pos, "GMT") else {
            return Err(pos);
        };
        let bytes = text.as_bytes();
        if cursor >= bytes.len() || (bytes[cursor] != b'+' && bytes[cursor] != b'-') {
            return ctx.set_field(ChronoField::OffsetSeconds.into(), 0, pos, cursor);
        }
        let negative = bytes[cursor] == b'-';
        cursor += 1;
        // One or two hour digits; the full style always pads to two.
        let mut hours: i64 = 0;
        let mut digits = 0;
        while cursor < bytes.len() && digits < 2 && bytes[cursor].is_ascii_digit() {
            hours = hours * 10 + i64::from(bytes[cursor] - b'0');
            cursor += 1;
            digits += 1;
        }
        if digits == 0 || (self.full() && digits != 2 && ctx.strict()) {
            return Err(pos);
        }
        let mut total = hours * 3600;
        for unit_secs in [60_i64, 1] {
            if cursor + 3 <= bytes.len()
                && bytes[cursor] == b':'
                && bytes[cursor + 1].is_ascii_digit()
                && bytes[cursor + 2].is_ascii_digit()
            {
                let value = i64::from(bytes[cursor + 1] - b'0') * 10
                    + i64::from(bytes[cursor + 2] - b'0');
                if value > 59 {
                    break;
                }
                total += value * unit_secs;
                cursor += 3;
            } else {
                break;
            }
        }
        let offset = if negative { -total } else { total };
        ctx.set_field(ChronoField::OffsetSeconds.into(), offset, pos, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::DecimalStyle;
    use crate::locale::Locale;
    use crate::temporal::OffsetDateTime;
    use crate::iso::{IsoDate, IsoDateTime, IsoTime};
    use crate::text::EnglishTextProvider;
    use crate::zone::ZoneOffset;

    fn odt(offset_seconds: i32) -> OffsetDateTime {
        OffsetDateTime::new(
            IsoDateTime::new(
                IsoDate::new_unchecked(2024, 7, 15),
                IsoTime::new_unchecked(8, 0, 0, 0),
            ),
            ZoneOffset::of_seconds(offset_seconds).unwrap(),
        )
    }

    fn format(unit: &OffsetIdUnit, offset_seconds: i32) -> String {
        let temporal = odt(offset_seconds);
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = PrintContext::new(&temporal, &locale, DecimalStyle::STANDARD, &provider);
        let mut out = String::new();
        unit.format(&mut ctx, &mut out).unwrap();
        out
    }

    fn parse(unit: &OffsetIdUnit, text: &str) -> Result<(i64, usize), usize> {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        let pos = unit.parse(&mut ctx, text, 0)?;
        let offset = ctx
            .into_parsed()
            .get(ChronoField::OffsetSeconds.into())
            .expect("offset parsed");
        Ok((offset, pos))
    }

    #[test]
    fn format_layouts() {
        let hh_mm = OffsetIdUnit::new("+HH:MM", "Z").unwrap();
        assert_eq!(format(&hh_mm, 0), "Z");
        assert_eq!(format(&hh_mm, 3600), "+01:00");
        assert_eq!(format(&hh_mm, -19_800), "-05:30");

        let hhmm_opt = OffsetIdUnit::new("+HHmm", "+0000").unwrap();
        assert_eq!(format(&hhmm_opt, 3600), "+01");
        assert_eq!(format(&hhmm_opt, 5400), "+0130");

        let full = OffsetIdUnit::new("+HH:MM:SS", "Z").unwrap();
        assert_eq!(format(&full, 3723), "+01:02:03");
        assert_eq!(format(&full, 3600), "+01:00:00");
    }

    #[test]
    fn parse_layouts() {
        let hh_mm = OffsetIdUnit::new("+HH:MM", "Z").unwrap();
        assert_eq!(parse(&hh_mm, "Z"), Ok((0, 1)));
        assert_eq!(parse(&hh_mm, "+01:30"), Ok((5400, 6)));
        assert_eq!(parse(&hh_mm, "-05:30"), Ok((-19_800, 6)));
        assert!(parse(&hh_mm, "+01").is_err());

        let hh = OffsetIdUnit::new("+HH", "Z").unwrap();
        assert_eq!(parse(&hh, "+05"), Ok((18_000, 3)));

        let with_secs = OffsetIdUnit::new("+HH:MM:ss", "Z").unwrap();
        assert_eq!(parse(&with_secs, "+01:02:03"), Ok((3723, 9)));
        assert_eq!(parse(&with_secs, "+01:02"), Ok((3720, 6)));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(OffsetIdUnit::new("+H", "Z").is_err());
    }

    #[test]
    fn localized_offset() {
        let unit = LocalizedOffsetUnit::new(TextStyle::Full);
        let temporal = odt(5400);
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = PrintContext::new(&temporal, &locale, DecimalStyle::STANDARD, &provider);
        let mut out = String::new();
        unit.format(&mut ctx, &mut out).unwrap();
        assert_eq!(out, "GMT+01:30");

        let mut pctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        let pos = unit.parse(&mut pctx, "GMT+01:30", 0).unwrap();
        assert_eq!(pos, 9);
        assert_eq!(
            pctx.into_parsed().get(ChronoField::OffsetSeconds.into()),
            Some(5400)
        );

        let short = LocalizedOffsetUnit::new(TextStyle::Short);
        let temporal = odt(-3600);
        let mut ctx = PrintContext::new(&temporal, &locale, DecimalStyle::STANDARD, &provider);
        let mut out = String::new();
        short.format(&mut ctx, &mut out).unwrap();
        assert_eq!(out, "GMT-1");
    }
}
