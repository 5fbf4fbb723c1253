//! Zone offsets, zone identifiers, and the zone registry seam.
//!
//! The engine does not carry tzdb rules; it only needs to know which
//! region identifiers exist and what localized names they go by, both of
//! which come from a [`ZoneRegistry`]. A small baked registry backs the
//! predefined formatters out of the box and can be replaced process-wide
//! with [`set_zone_registry`].

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{OnceLock, RwLock};

use writeable::{impl_display_with_writeable, LengthHint, Writeable};

use crate::error::DateTimeError;
use crate::locale::Locale;
use crate::text::TextStyle;
use crate::DateTimeResult;

/// A fixed offset from UTC, in the range -18:00 to +18:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneOffset {
    total_seconds: i32,
}

impl ZoneOffset {
    pub const UTC: Self = Self { total_seconds: 0 };

    const MAX_SECONDS: i32 = 18 * 3600;

    pub fn of_seconds(total_seconds: i32) -> DateTimeResult<Self> {
        if total_seconds.abs() > Self::MAX_SECONDS {
            return Err(DateTimeError::range().with_message(alloc::format!(
                "zone offset {total_seconds}s outside -18:00..=+18:00"
            )));
        }
        Ok(Self { total_seconds })
    }

    pub fn of_hms(hours: i32, minutes: i32, seconds: i32) -> DateTimeResult<Self> {
        Self::of_seconds(hours * 3600 + minutes * 60 + seconds)
    }

    pub const fn total_seconds(self) -> i32 {
        self.total_seconds
    }

    /// The canonical identifier, `Z` for UTC and otherwise
    /// `+HH:MM` or `+HH:MM:SS`.
    pub fn id(self) -> String {
        self.write_to_string().into_owned()
    }
}

impl Writeable for ZoneOffset {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.total_seconds == 0 {
            return sink.write_char('Z');
        }
        let abs = self.total_seconds.unsigned_abs();
        sink.write_char(if self.total_seconds < 0 { '-' } else { '+' })?;
        write!(sink, "{:02}:{:02}", abs / 3600, abs / 60 % 60)?;
        if abs % 60 != 0 {
            write!(sink, ":{:02}", abs % 60)?;
        }
        Ok(())
    }

    fn writeable_length_hint(&self) -> LengthHint {
        if self.total_seconds == 0 {
            LengthHint::exact(1)
        } else if self.total_seconds % 60 == 0 {
            LengthHint::exact(6)
        } else {
            LengthHint::exact(9)
        }
    }
}

impl_display_with_writeable!(ZoneOffset);

/// A time-zone identifier, either a fixed offset or a named region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneId {
    Offset(ZoneOffset),
    Region(String),
}

impl ZoneId {
    pub fn id(&self) -> String {
        match self {
            ZoneId::Offset(offset) => offset.id(),
            ZoneId::Region(region) => region.clone(),
        }
    }

    /// The fixed offset, when this zone is one.
    pub fn as_offset(&self) -> Option<ZoneOffset> {
        match self {
            ZoneId::Offset(offset) => Some(*offset),
            ZoneId::Region(_) => None,
        }
    }
}

impl Writeable for ZoneId {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        match self {
            ZoneId::Offset(offset) => offset.write_to(sink),
            ZoneId::Region(region) => sink.write_str(region),
        }
    }

    fn writeable_length_hint(&self) -> LengthHint {
        match self {
            ZoneId::Offset(offset) => offset.writeable_length_hint(),
            ZoneId::Region(region) => LengthHint::exact(region.len()),
        }
    }
}

impl_display_with_writeable!(ZoneId);

impl From<ZoneOffset> for ZoneId {
    fn from(offset: ZoneOffset) -> Self {
        ZoneId::Offset(offset)
    }
}

/// Source of the known region identifiers and their localized names.
pub trait ZoneRegistry: Send + Sync {
    /// Every region identifier the registry knows.
    fn zone_ids(&self) -> Vec<String>;

    /// The localized display name of a zone, or `None` to make the
    /// formatter fall back to the raw identifier.
    fn display_name(&self, zone_id: &str, style: TextStyle, locale: &Locale) -> Option<String>;

    /// Every (display name, zone id) pair parseable in `locale`.
    fn localized_names(&self, locale: &Locale) -> Vec<(String, String)>;
}

/// Region ids baked into the default registry.
const BAKED_ZONE_IDS: &[&str] = &[
    "Africa/Cairo",
    "Africa/Johannesburg",
    "Africa/Lagos",
    "Africa/Nairobi",
    "America/Anchorage",
    "America/Argentina/Buenos_Aires",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "America/Mexico_City",
    "America/New_York",
    "America/Phoenix",
    "America/Sao_Paulo",
    "America/Toronto",
    "America/Vancouver",
    "Asia/Dubai",
    "Asia/Hong_Kong",
    "Asia/Jakarta",
    "Asia/Kolkata",
    "Asia/Seoul",
    "Asia/Shanghai",
    "Asia/Singapore",
    "Asia/Tokyo",
    "Australia/Melbourne",
    "Australia/Perth",
    "Australia/Sydney",
    "Etc/GMT",
    "Etc/UTC",
    "Europe/Amsterdam",
    "Europe/Berlin",
    "Europe/Dublin",
    "Europe/Lisbon",
    "Europe/London",
    "Europe/Madrid",
    "Europe/Moscow",
    "Europe/Paris",
    "Europe/Rome",
    "Europe/Stockholm",
    "Europe/Warsaw",
    "Europe/Zurich",
    "Pacific/Auckland",
    "Pacific/Honolulu",
    "UTC",
];

/// English generic display names, as (zone id, long name, short name).
const BAKED_ZONE_NAMES: &[(&str, &str, &str)] = &[
    ("UTC", "Coordinated Universal Time", "UTC"),
    ("Etc/UTC", "Coordinated Universal Time", "UTC"),
    ("Etc/GMT", "Greenwich Mean Time", "GMT"),
    ("Europe/London", "Greenwich Mean Time", "GMT"),
    ("Europe/Paris", "Central European Time", "CET"),
    ("Europe/Berlin", "Central European Time", "CET"),
    ("Europe/Moscow", "Moscow Standard Time", "MSK"),
    ("America/New_York", "Eastern Time", "ET"),
    ("America/Chicago", "Central Time", "CT"),
    ("America/Denver", "Mountain Time", "MT"),
    ("America/Los_Angeles", "Pacific Time", "PT"),
    ("Asia/Kolkata", "India Standard Time", "IST"),
    ("Asia/Shanghai", "China Standard Time", "CST"),
    ("Asia/Tokyo", "Japan Standard Time", "JST"),
    ("Australia/Sydney", "Australian Eastern Time", "AET"),
];

/// The default registry, listing common IANA region ids with English
/// generic names.
#[derive(Debug, Default)]
pub struct BakedZoneRegistry;

impl ZoneRegistry for BakedZoneRegistry {
    fn zone_ids(&self) -> Vec<String> {
        BAKED_ZONE_IDS.iter().map(|id| (*id).into()).collect()
    }

    fn display_name(&self, zone_id: &str, style: TextStyle, _locale: &Locale) -> Option<String> {
        let (_, long, short) = BAKED_ZONE_NAMES.iter().find(|(id, _, _)| *id == zone_id)?;
        match style.as_normal() {
            TextStyle::Full => Some((*long).into()),
            _ => Some((*short).into()),
        }
    }

    fn localized_names(&self, _locale: &Locale) -> Vec<(String, String)> {
        let mut names = Vec::with_capacity(BAKED_ZONE_NAMES.len() * 2);
        for (id, long, short) in BAKED_ZONE_NAMES {
            // Earlier entries win for ambiguous names like "UTC".
            names.push(((*long).into(), (*id).into()));
            names.push(((*short).into(), (*id).into()));
        }
        names
    }
}

struct RegistrySlot {
    registry: RwLock<Arc<dyn ZoneRegistry>>,
    generation: AtomicUsize,
}

fn registry_slot() -> &'static RegistrySlot {
    static SLOT: OnceLock<RegistrySlot> = OnceLock::new();
    SLOT.get_or_init(|| RegistrySlot {
        registry: RwLock::new(Arc::new(BakedZoneRegistry)),
        generation: AtomicUsize::new(0),
    })
}

/// Replaces the process-wide zone registry.
///
/// Formatters built before or after the call all observe the new
/// registry; cached zone-matching trees are rebuilt lazily.
pub fn set_zone_registry(registry: Arc<dyn ZoneRegistry>) {
    let slot = registry_slot();
    *slot.registry.write().expect("zone registry poisoned") = registry;
    slot.generation.fetch_add(1, Ordering::Release);
}

pub(crate) fn zone_registry() -> Arc<dyn ZoneRegistry> {
    Arc::clone(
        &registry_slot()
            .registry
            .read()
            .expect("zone registry poisoned"),
    )
}

/// Monotonic counter bumped on every [`set_zone_registry`], used to
/// invalidate caches derived from the registry contents.
pub(crate) fn zone_registry_generation() -> usize {
    registry_slot().generation.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_ids() {
        assert_eq!(ZoneOffset::UTC.id(), "Z");
        assert_eq!(ZoneOffset::of_hms(1, 0, 0).unwrap().id(), "+01:00");
        assert_eq!(ZoneOffset::of_hms(-5, -30, 0).unwrap().id(), "-05:30");
        assert_eq!(ZoneOffset::of_hms(1, 2, 3).unwrap().id(), "+01:02:03");
        assert!(ZoneOffset::of_hms(18, 0, 1).is_err());
        assert!(ZoneOffset::of_hms(-19, 0, 0).is_err());
    }

    #[test]
    fn zone_id_display() {
        let region = ZoneId::Region("Europe/London".into());
        assert_eq!(region.to_string(), "Europe/London");
        assert_eq!(region.as_offset(), None);
        let offset = ZoneId::from(ZoneOffset::of_seconds(3600).unwrap());
        assert_eq!(offset.id(), "+01:00");
        assert_eq!(offset.as_offset().unwrap().total_seconds(), 3600);
    }

    #[test]
    fn baked_registry_names() {
        let registry = BakedZoneRegistry;
        let locale = Locale::english();
        assert_eq!(
            registry
                .display_name("America/New_York", TextStyle::Full, &locale)
                .as_deref(),
            Some("Eastern Time")
        );
        assert_eq!(
            registry
                .display_name("Asia/Tokyo", TextStyle::Short, &locale)
                .as_deref(),
            Some("JST")
        );
        assert_eq!(
            registry.display_name("Europe/Unknown", TextStyle::Full, &locale),
            None
        );
        assert!(registry.zone_ids().iter().any(|id| id == "Europe/London"));
    }
}
