//! The `datetime_pattern` crate is a pattern-driven, locale-aware
//! formatter and parser engine for dates and times.
//!
//! ```rust
//! use datetime_pattern::{DateTimeFormatter, IsoDateTime};
//!
//! let formatter = DateTimeFormatter::of_pattern("EEE, d MMM uuuu HH:mm").unwrap();
//!
//! let parsed = formatter.parse("Fri, 5 Jul 2024 08:30").unwrap();
//! let datetime = IsoDateTime::try_from(&parsed).unwrap();
//! assert_eq!(formatter.format(&datetime).unwrap(), "Fri, 5 Jul 2024 08:30");
//! ```
//!
//! Formatters are immutable and thread-safe. They are compiled either
//! from a pattern string, where each letter of the alphabet is reserved
//! as a field directive, or programmatically through
//! [`FormatterBuilder`], which exposes the directives patterns compile
//! down to plus a few that have no pattern-letter spelling.
//!
//! Parsing runs in two phases: a scan phase that matches text against
//! the compiled directives and records raw field values, and a resolve
//! phase that cross-checks those values and combines them into dates and
//! times under a [`ResolverStyle`].
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    clippy::module_name_repetitions,
    clippy::redundant_pub_crate,
    clippy::too_many_lines,
    clippy::cognitive_complexity,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

extern crate alloc;

pub mod builder;
pub mod chronology;
pub mod error;
pub mod field;
pub mod formatter;
pub mod iso;
pub mod locale;
pub mod parse;
mod print;
pub mod temporal;
pub mod text;
mod tree;
mod units;
pub mod zone;

/// The result type returned by this crate.
pub type DateTimeResult<T> = Result<T, error::DateTimeError>;

#[doc(inline)]
pub use builder::FormatterBuilder;
#[doc(inline)]
pub use chronology::{Chronology, IsoChronology, ResolverStyle};
#[doc(inline)]
pub use error::{DateTimeError, ErrorKind};
#[doc(inline)]
pub use field::{ChronoField, Field, IsoField, ValueRange, WeekField};
#[doc(inline)]
pub use formatter::{DateTimeFormatter, DecimalStyle, FormatStyle};
#[doc(inline)]
pub use iso::{IsoDate, IsoDateTime, IsoTime};
#[doc(inline)]
pub use locale::Locale;
#[doc(inline)]
pub use parse::{Parsed, ParsePosition};
#[doc(inline)]
pub use temporal::{OffsetDateTime, TemporalAccessor, ZonedDateTime};
#[doc(inline)]
pub use text::{DateTimeTextProvider, EnglishTextProvider, TextStyle};
#[doc(inline)]
pub use units::SignStyle;
#[doc(inline)]
pub use zone::{set_zone_registry, ZoneId, ZoneOffset, ZoneRegistry};
