//! Context threaded through a format pass.

use alloc::format;

use crate::error::DateTimeError;
use crate::field::Field;
use crate::formatter::DecimalStyle;
use crate::locale::Locale;
use crate::temporal::TemporalAccessor;
use crate::text::DateTimeTextProvider;
use crate::zone::ZoneId;
use crate::DateTimeResult;

/// State shared by every unit during one format pass.
///
/// Field access depends on the optional depth: inside an optional
/// section a missing field makes the section print nothing, while at the
/// top level it is an error.
pub(crate) struct PrintContext<'a> {
    temporal: &'a dyn TemporalAccessor,
    pub(crate) locale: &'a Locale,
    pub(crate) decimal_style: DecimalStyle,
    pub(crate) text_provider: &'a dyn DateTimeTextProvider,
    optional: usize,
}

impl<'a> PrintContext<'a> {
    pub(crate) fn new(
        temporal: &'a dyn TemporalAccessor,
        locale: &'a Locale,
        decimal_style: DecimalStyle,
        text_provider: &'a dyn DateTimeTextProvider,
    ) -> Self {
        Self {
            temporal,
            locale,
            decimal_style,
            text_provider,
            optional: 0,
        }
    }

    pub(crate) fn start_optional(&mut self) {
        self.optional += 1;
    }

    pub(crate) fn end_optional(&mut self) {
        self.optional -= 1;
    }

    /// The value of `field`, `Ok(None)` when absent inside an optional
    /// section, and an error when absent at the top level.
    pub(crate) fn value(&self, field: Field) -> DateTimeResult<Option<i64>> {
        match self.temporal.get_field(field) {
            Some(value) => Ok(Some(value)),
            None if self.optional > 0 => Ok(None),
            None => Err(DateTimeError::format()
                .with_message(format!("unsupported field for formatting: {field}"))),
        }
    }

    /// The value of `field` if the temporal can supply it, never an
    /// error.
    pub(crate) fn value_opt(&self, field: Field) -> Option<i64> {
        self.temporal.get_field(field)
    }

    /// The calendar-system id, with the same optional-section contract
    /// as [`Self::value`].
    pub(crate) fn chronology(&self) -> DateTimeResult<Option<&str>> {
        match self.temporal.chronology() {
            Some(id) => Ok(Some(id)),
            None if self.optional > 0 => Ok(None),
            None => {
                Err(DateTimeError::format().with_message("no chronology available for formatting"))
            }
        }
    }

    /// The attached zone, with the same optional-section contract as
    /// [`Self::value`].
    pub(crate) fn zone(&self) -> DateTimeResult<Option<ZoneId>> {
        match self.temporal.zone() {
            Some(zone) => Ok(Some(zone)),
            None if self.optional > 0 => Ok(None),
            None => {
                Err(DateTimeError::format().with_message("no zone available for formatting"))
            }
        }
    }

    /// The attached zone, or a fixed-offset zone built from the
    /// offset-seconds field when the temporal carries no zone of its
    /// own.
    pub(crate) fn zone_or_offset(&self) -> DateTimeResult<Option<ZoneId>> {
        let zone = self.temporal.zone().or_else(|| {
            self.temporal
                .get_field(crate::field::ChronoField::OffsetSeconds.into())
                .and_then(|secs| crate::zone::ZoneOffset::of_seconds(secs as i32).ok())
                .map(ZoneId::Offset)
        });
        match zone {
            Some(zone) => Ok(Some(zone)),
            None if self.optional > 0 => Ok(None),
            None => {
                Err(DateTimeError::format().with_message("no zone available for formatting"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ChronoField;
    use crate::formatter::DecimalStyle;
    use crate::iso::IsoTime;
    use crate::text::EnglishTextProvider;

    #[test]
    fn missing_field_errors_only_at_top_level() {
        let time = IsoTime::new_unchecked(10, 30, 0, 0);
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = PrintContext::new(&time, &locale, DecimalStyle::STANDARD, &provider);
        assert!(ctx.value(Field::Chrono(ChronoField::Year)).is_err());
        assert!(ctx.zone().is_err());
        ctx.start_optional();
        assert_eq!(ctx.value(Field::Chrono(ChronoField::Year)).unwrap(), None);
        assert_eq!(ctx.zone().unwrap(), None);
        assert_eq!(
            ctx.value(Field::Chrono(ChronoField::HourOfDay)).unwrap(),
            Some(10)
        );
        ctx.end_optional();
    }
}
