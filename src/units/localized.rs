//! Locale-dependent date and time styles, resolved to a concrete
//! pattern the first time the unit runs.

use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;
use std::sync::OnceLock;

use crate::builder::FormatterBuilder;
use crate::error::DateTimeError;
use crate::formatter::FormatStyle;
use crate::parse::ParseContext;
use crate::print::PrintContext;
use crate::units::Unit;
use crate::DateTimeResult;

fn date_pattern(style: FormatStyle) -> &'static str {
    match style {
        FormatStyle::Full => "EEEE, MMMM d, y",
        FormatStyle::Long => "MMMM d, y",
        FormatStyle::Medium => "MMM d, y",
        FormatStyle::Short => "M/d/yy",
    }
}

fn time_pattern(style: FormatStyle) -> &'static str {
    match style {
        FormatStyle::Full => "h:mm:ss a zzzz",
        FormatStyle::Long => "h:mm:ss a z",
        FormatStyle::Medium => "h:mm:ss a",
        FormatStyle::Short => "h:mm a",
    }
}

/// Formats and parses using a date and/or time style instead of an
/// explicit pattern. The style is expanded to a pattern lazily and the
/// compiled form is cached for the lifetime of the formatter.
pub(crate) struct LocalizedUnit {
    date_style: Option<FormatStyle>,
    time_style: Option<FormatStyle>,
    cache: OnceLock<Box<Unit>>,
}

impl LocalizedUnit {
    pub(crate) fn new(
        date_style: Option<FormatStyle>,
        time_style: Option<FormatStyle>,
    ) -> DateTimeResult<Self> {
        if date_style.is_none() && time_style.is_none() {
            return Err(DateTimeError::builder()
                .with_message("either a date or a time style must be provided"));
        }
        Ok(Self {
            date_style,
            time_style,
            cache: OnceLock::new(),
        })
    }

    fn pattern(&self) -> String {
        match (self.date_style, self.time_style) {
            (Some(date), Some(time)) => {
                format!("{}, {}", date_pattern(date), time_pattern(time))
            }
            (Some(date), None) => date_pattern(date).to_string(),
            (None, Some(time)) => time_pattern(time).to_string(),
            (None, None) => String::new(),
        }
    }

    fn unit(&self) -> DateTimeResult<&Unit> {
        if let Some(unit) = self.cache.get() {
            return Ok(unit.as_ref());
        }
        let mut builder = FormatterBuilder::new();
        builder.append_pattern(&self.pattern())?;
        let compiled = Box::new(builder.build_unit());
        Ok(self.cache.get_or_init(|| compiled).as_ref())
    }

    pub(crate) fn format(
        &self,
        ctx: &mut PrintContext<'_>,
        out: &mut String,
    ) -> DateTimeResult<bool> {
        self.unit()?.format(ctx, out)
    }

    pub(crate) fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
        text: &str,
        pos: usize,
    ) -> Result<usize, usize> {
        self.unit().map_err(|_| pos)?.parse(ctx, text, pos)
    }
}

impl fmt::Debug for LocalizedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalizedUnit")
            .field("date_style", &self.date_style)
            .field("time_style", &self.time_style)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::DecimalStyle;
    use crate::iso::{IsoDate, IsoDateTime, IsoTime};
    use crate::locale::Locale;
    use crate::text::EnglishTextProvider;

    fn format(unit: &LocalizedUnit, temporal: &dyn crate::temporal::TemporalAccessor) -> String {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = PrintContext::new(temporal, &locale, DecimalStyle::STANDARD, &provider);
        let mut out = String::new();
        unit.format(&mut ctx, &mut out).unwrap();
        out
    }

    #[test]
    fn date_styles() {
        let date = IsoDate::new_unchecked(2024, 7, 15);
        let full = LocalizedUnit::new(Some(FormatStyle::Full), None).unwrap();
        assert_eq!(format(&full, &date), "Monday, July 15, 2024");
        let medium = LocalizedUnit::new(Some(FormatStyle::Medium), None).unwrap();
        assert_eq!(format(&medium, &date), "Jul 15, 2024");
        let short = LocalizedUnit::new(Some(FormatStyle::Short), None).unwrap();
        assert_eq!(format(&short, &date), "7/15/24");
    }

    #[test]
    fn combined_date_time() {
        let datetime = IsoDateTime::new(
            IsoDate::new_unchecked(2024, 7, 15),
            IsoTime::new_unchecked(8, 5, 0, 0),
        );
        let unit =
            LocalizedUnit::new(Some(FormatStyle::Short), Some(FormatStyle::Short)).unwrap();
        assert_eq!(format(&unit, &datetime), "7/15/24, 8:05 AM");
    }

    #[test]
    fn requires_at_least_one_style() {
        assert!(LocalizedUnit::new(None, None).is_err());
    }

    #[test]
    fn style_unit_nests_inside_the_unit_enum() {
        let unit = Unit::Localized(
            LocalizedUnit::new(Some(FormatStyle::Medium), None).unwrap(),
        );
        let composite = Unit::Composite(crate::units::CompositeUnit::new(vec![unit], false));
        let date = IsoDate::new_unchecked(2024, 7, 15);
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = PrintContext::new(&date, &locale, DecimalStyle::STANDARD, &provider);
        let mut out = String::new();
        assert!(composite.format(&mut ctx, &mut out).unwrap());
        assert_eq!(out, "Jul 15, 2024");
    }
}
