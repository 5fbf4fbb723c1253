//! Localized text for field values (month names, day names, eras).
//!
//! The engine only talks to text through [`DateTimeTextProvider`], so
//! callers can plug in a CLDR-backed provider. The built-in provider
//! ships English names, which is enough for the predefined formatters
//! and for round-tripping RFC-1123 text.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::field::{ChronoField, Field, IsoField};
use crate::locale::Locale;

/// The width and grammatical form of localized text.
///
/// Standalone forms exist for languages that decline names differently
/// when the name appears without a day number next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextStyle {
    Full,
    FullStandalone,
    Short,
    ShortStandalone,
    Narrow,
    NarrowStandalone,
}

impl TextStyle {
    pub const fn is_standalone(self) -> bool {
        matches!(
            self,
            TextStyle::FullStandalone | TextStyle::ShortStandalone | TextStyle::NarrowStandalone
        )
    }

    pub const fn as_standalone(self) -> Self {
        match self {
            TextStyle::Full => TextStyle::FullStandalone,
            TextStyle::Short => TextStyle::ShortStandalone,
            TextStyle::Narrow => TextStyle::NarrowStandalone,
            other => other,
        }
    }

    pub const fn as_normal(self) -> Self {
        match self {
            TextStyle::FullStandalone => TextStyle::Full,
            TextStyle::ShortStandalone => TextStyle::Short,
            TextStyle::NarrowStandalone => TextStyle::Narrow,
            other => other,
        }
    }
}

/// Candidate (text, value) pairs for parsing a field, longest text first.
pub type ParseCandidates = Arc<[(String, i64)]>;

/// Source of localized field text.
pub trait DateTimeTextProvider: Send + Sync {
    /// The text for `value` of `field` in `style`, or `None` when the
    /// provider has no text for that combination (the caller falls back
    /// to numeric output).
    fn text(&self, field: Field, value: i64, style: TextStyle, locale: &Locale)
        -> Option<String>;

    /// All pairs usable for parsing `field`, ordered longest-first so a
    /// greedy scan prefers the most specific match. A `style` of `None`
    /// merges every style.
    fn candidates(
        &self,
        field: Field,
        style: Option<TextStyle>,
        locale: &Locale,
    ) -> ParseCandidates;
}

const MONTHS_FULL: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTHS_NARROW: [&str; 12] = ["J", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"];

const DAYS_FULL: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const DAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const DAYS_NARROW: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];

const AMPM: [&str; 2] = ["AM", "PM"];
const AMPM_NARROW: [&str; 2] = ["A", "P"];

const ERAS_FULL: [&str; 2] = ["Before Christ", "Anno Domini"];
const ERAS_SHORT: [&str; 2] = ["BC", "AD"];
const ERAS_NARROW: [&str; 2] = ["B", "A"];

const QUARTERS_FULL: [&str; 4] = ["1st quarter", "2nd quarter", "3rd quarter", "4th quarter"];
const QUARTERS_SHORT: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];
const QUARTERS_NARROW: [&str; 4] = ["1", "2", "3", "4"];

fn english_table(field: Field, style: TextStyle) -> Option<(&'static [&'static str], i64)> {
    // Second element is the field value of the table's first entry.
    let table: (&[&str], i64) = match (field, style.as_normal()) {
        (Field::Chrono(ChronoField::MonthOfYear), TextStyle::Full) => (&MONTHS_FULL, 1),
        (Field::Chrono(ChronoField::MonthOfYear), TextStyle::Short) => (&MONTHS_SHORT, 1),
        (Field::Chrono(ChronoField::MonthOfYear), TextStyle::Narrow) => (&MONTHS_NARROW, 1),
        (Field::Chrono(ChronoField::DayOfWeek), TextStyle::Full) => (&DAYS_FULL, 1),
        (Field::Chrono(ChronoField::DayOfWeek), TextStyle::Short) => (&DAYS_SHORT, 1),
        (Field::Chrono(ChronoField::DayOfWeek), TextStyle::Narrow) => (&DAYS_NARROW, 1),
        (Field::Chrono(ChronoField::AmPmOfDay), TextStyle::Full | TextStyle::Short) => (&AMPM, 0),
        (Field::Chrono(ChronoField::AmPmOfDay), TextStyle::Narrow) => (&AMPM_NARROW, 0),
        (Field::Chrono(ChronoField::Era), TextStyle::Full) => (&ERAS_FULL, 0),
        (Field::Chrono(ChronoField::Era), TextStyle::Short) => (&ERAS_SHORT, 0),
        (Field::Chrono(ChronoField::Era), TextStyle::Narrow) => (&ERAS_NARROW, 0),
        (Field::Iso(IsoField::QuarterOfYear), TextStyle::Full) => (&QUARTERS_FULL, 1),
        (Field::Iso(IsoField::QuarterOfYear), TextStyle::Short) => (&QUARTERS_SHORT, 1),
        (Field::Iso(IsoField::QuarterOfYear), TextStyle::Narrow) => (&QUARTERS_NARROW, 1),
        _ => return None,
    };
    Some(table)
}

/// The built-in English text provider.
///
/// Parse candidate lists are cached per (field, style); English has no
/// per-locale variation so the locale does not key the cache.
#[derive(Debug, Default)]
pub struct EnglishTextProvider {
    cache: RwLock<FxHashMap<(Field, Option<TextStyle>), ParseCandidates>>,
}

impl EnglishTextProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_candidates(field: Field, style: Option<TextStyle>) -> ParseCandidates {
        let styles: Vec<TextStyle> = match style {
            Some(s) => alloc::vec![s.as_normal()],
            None => alloc::vec![TextStyle::Full, TextStyle::Short, TextStyle::Narrow],
        };
        let mut seen: FxHashMap<String, i64> = FxHashMap::default();
        for s in styles {
            if let Some((table, first)) = english_table(field, s) {
                for (i, text) in table.iter().enumerate() {
                    // First style wins when the same text recurs.
                    seen.entry((*text).into()).or_insert(first + i as i64);
                }
            }
        }
        let mut pairs: Vec<(String, i64)> = seen.into_iter().collect();
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        pairs.into()
    }
}

impl DateTimeTextProvider for EnglishTextProvider {
    fn text(
        &self,
        field: Field,
        value: i64,
        style: TextStyle,
        _locale: &Locale,
    ) -> Option<String> {
        let (table, first) = english_table(field, style)?;
        let index = usize::try_from(value.checked_sub(first)?).ok()?;
        table.get(index).map(|s| (*s).into())
    }

    fn candidates(
        &self,
        field: Field,
        style: Option<TextStyle>,
        _locale: &Locale,
    ) -> ParseCandidates {
        let key = (field, style.map(TextStyle::as_normal));
        if let Some(cached) = self.cache.read().expect("text cache poisoned").get(&key) {
            return Arc::clone(cached);
        }
        let built = Self::build_candidates(field, style);
        self.cache
            .write()
            .expect("text cache poisoned")
            .entry(key)
            .or_insert(built)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_text() {
        let provider = EnglishTextProvider::new();
        let locale = Locale::english();
        let month = Field::Chrono(ChronoField::MonthOfYear);
        assert_eq!(
            provider.text(month, 1, TextStyle::Full, &locale).as_deref(),
            Some("January")
        );
        assert_eq!(
            provider.text(month, 12, TextStyle::Short, &locale).as_deref(),
            Some("Dec")
        );
        assert_eq!(provider.text(month, 13, TextStyle::Full, &locale), None);
        assert_eq!(
            provider
                .text(month, 3, TextStyle::FullStandalone, &locale)
                .as_deref(),
            Some("March")
        );
    }

    #[test]
    fn no_text_for_numeric_fields() {
        let provider = EnglishTextProvider::new();
        let locale = Locale::english();
        let hour = Field::Chrono(ChronoField::HourOfDay);
        assert_eq!(provider.text(hour, 5, TextStyle::Full, &locale), None);
    }

    #[test]
    fn candidates_are_longest_first() {
        let provider = EnglishTextProvider::new();
        let locale = Locale::english();
        let month = Field::Chrono(ChronoField::MonthOfYear);
        let merged = provider.candidates(month, None, &locale);
        let lengths: Vec<usize> = merged.iter().map(|(t, _)| t.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
        // "May" is both full and short; it must appear once.
        assert_eq!(merged.iter().filter(|(t, _)| t == "May").count(), 1);
        assert!(merged.iter().any(|(t, v)| t == "September" && *v == 9));
    }

    #[test]
    fn era_and_quarter_text() {
        let provider = EnglishTextProvider::new();
        let locale = Locale::english();
        let era = Field::Chrono(ChronoField::Era);
        assert_eq!(
            provider.text(era, 0, TextStyle::Short, &locale).as_deref(),
            Some("BC")
        );
        let quarter = Field::Iso(IsoField::QuarterOfYear);
        assert_eq!(
            provider.text(quarter, 3, TextStyle::Short, &locale).as_deref(),
            Some("Q3")
        );
        assert_eq!(
            provider.text(quarter, 1, TextStyle::Full, &locale).as_deref(),
            Some("1st quarter")
        );
    }
}
