//! A minimal locale value used to key text providers and caches.
//!
//! The engine consumes localized text through the provider traits in
//! [`crate::text`] and [`crate::zone`]; this type only identifies which
//! locale a lookup is for. It deliberately carries no CLDR data.

use alloc::string::{String, ToString};
use core::fmt;

/// A locale identifier: a lowercase language code with an optional
/// uppercase region code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    /// Creates a locale from a language code.
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            region: None,
        }
    }

    /// Creates a locale from a language and region code.
    pub fn with_region(language: &str, region: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            region: Some(region.to_ascii_uppercase()),
        }
    }

    /// The root locale, used for locale-independent lookups.
    pub fn root() -> Self {
        Self {
            language: String::new(),
            region: None,
        }
    }

    /// The `en` locale. Built-in providers carry English data only.
    pub fn english() -> Self {
        Self::new("en")
    }

    /// Returns the language subtag, empty for the root locale.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the region subtag, if any.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(region) = &self.region {
            write!(f, "-{region}")?;
        }
        Ok(())
    }
}

impl core::str::FromStr for Locale {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(['-', '_']) {
            Some((lang, region)) => Ok(Self::with_region(lang, region)),
            None => Ok(Self::new(s)),
        }
    }
}
