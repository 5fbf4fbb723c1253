//! This module implements `DateTimeError`.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

/// `DateTimeError`'s error type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error.
    #[default]
    Generic,
    /// An invalid builder or pattern argument, raised at construction time.
    Builder,
    /// A value could not be formatted.
    Format,
    /// Text did not match the expected shape.
    Parse,
    /// Two parsed fields disagreed during resolution.
    Conflict,
    /// A value was outside its valid range.
    Range,
    /// Internal invariant violation.
    Assert,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => "Error",
            Self::Builder => "BuilderError",
            Self::Format => "FormatError",
            Self::Parse => "ParseError",
            Self::Conflict => "ConflictError",
            Self::Range => "RangeError",
            Self::Assert => "ImplementationError",
        }
        .fmt(f)
    }
}

/// Inputs longer than this are ellipsized in parse error messages.
const PARSE_EXCERPT_LEN: usize = 64;

/// The error type for `datetime_pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeError {
    kind: ErrorKind,
    msg: Cow<'static, str>,
    /// Offset of the failure within the parsed input, when known.
    index: Option<usize>,
}

impl DateTimeError {
    #[inline]
    #[must_use]
    const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            msg: Cow::Borrowed(""),
            index: None,
        }
    }

    /// Create a generic error.
    #[inline]
    #[must_use]
    pub fn general(msg: &'static str) -> Self {
        Self::new(ErrorKind::Generic).with_message(msg)
    }

    /// Create a construction-time builder error.
    #[inline]
    #[must_use]
    pub const fn builder() -> Self {
        Self::new(ErrorKind::Builder)
    }

    /// Create a formatting error.
    #[inline]
    #[must_use]
    pub const fn format() -> Self {
        Self::new(ErrorKind::Format)
    }

    /// Create a parse error.
    #[inline]
    #[must_use]
    pub const fn parse() -> Self {
        Self::new(ErrorKind::Parse)
    }

    /// Create a field-conflict error.
    #[inline]
    #[must_use]
    pub const fn conflict() -> Self {
        Self::new(ErrorKind::Conflict)
    }

    /// Create a range error.
    #[inline]
    #[must_use]
    pub const fn range() -> Self {
        Self::new(ErrorKind::Range)
    }

    /// Creates an assertion error.
    #[inline]
    #[must_use]
    #[cfg_attr(debug_assertions, track_caller)]
    pub(crate) fn assert() -> Self {
        #[cfg(debug_assertions)]
        {
            Self::new(ErrorKind::Assert).with_message(core::panic::Location::caller().file())
        }
        #[cfg(not(debug_assertions))]
        Self::new(ErrorKind::Assert)
    }

    /// Create a parse error describing a failure at `index` within `input`.
    ///
    /// The input is ellipsized past a display threshold so that huge inputs
    /// do not end up verbatim in error text.
    #[must_use]
    pub fn parse_failure(input: &str, index: usize) -> Self {
        let mut excerpt = String::new();
        if input.len() > PARSE_EXCERPT_LEN {
            let mut end = PARSE_EXCERPT_LEN;
            while !input.is_char_boundary(end) {
                end -= 1;
            }
            excerpt.push_str(&input[..end]);
            excerpt.push_str("...");
        } else {
            excerpt.push_str(input);
        }
        let msg = alloc::format!("text '{excerpt}' could not be parsed at index {index}");
        let mut err = Self::new(ErrorKind::Parse).with_message(msg);
        err.index = Some(index);
        err
    }

    /// Add a message to the error.
    #[inline]
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.msg = msg.into();
        self
    }

    /// Attach the input offset at which the error occurred.
    #[inline]
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Returns this error's kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the input offset of a parse failure, when known.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Borrows the error message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.msg.is_empty() {
            write!(f, ": {}", self.msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for DateTimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = DateTimeError::range().with_message("value out of range");
        assert_eq!(err.to_string(), "RangeError: value out of range");
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn parse_failure_carries_index_and_excerpt() {
        let err = DateTimeError::parse_failure("2024-13-01", 5);
        assert_eq!(err.index(), Some(5));
        assert!(err.message().contains("2024-13-01"));
        assert!(err.message().contains("index 5"));
    }

    #[test]
    fn parse_failure_ellipsizes_long_input() {
        let long = "x".repeat(200);
        let err = DateTimeError::parse_failure(&long, 150);
        assert!(err.message().contains("..."));
        assert!(err.message().len() < 200);
    }
}
