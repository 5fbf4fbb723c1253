//! Zone-id and localized zone-name printing and parsing.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::str::FromStr;
use std::sync::{OnceLock, RwLock};

use rustc_hash::FxHashMap;

use crate::field::ChronoField;
use crate::parse::ParseContext;
use crate::print::PrintContext;
use crate::text::TextStyle;
use crate::tree::{Matching, PrefixTree};
use crate::units::offset::OffsetIdUnit;
use crate::zone::{zone_registry, zone_registry_generation, ZoneId, ZoneOffset};
use crate::DateTimeResult;

struct CachedTree {
    generation: usize,
    tree: Arc<PrefixTree>,
}

type TreeMap = FxHashMap<String, CachedTree>;

fn tree_cache() -> &'static RwLock<TreeMap> {
    static CACHE: OnceLock<RwLock<TreeMap>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// The matching mode implied by the current parse settings.
fn tree_matching(ctx: &ParseContext<'_>) -> Matching {
    if !ctx.strict() {
        Matching::Lenient
    } else if !ctx.case_sensitive() {
        Matching::Insensitive
    } else {
        Matching::Sensitive
    }
}

fn matching_key(matching: Matching) -> &'static str {
    match matching {
        Matching::Sensitive => "sensitive",
        Matching::Insensitive => "insensitive",
        Matching::Lenient => "lenient",
    }
}

/// The region-id matching tree, rebuilt when the registry changes.
fn zone_id_tree(matching: Matching) -> Arc<PrefixTree> {
    cached_tree(format!("ids/{}", matching_key(matching)), matching, |tree| {
        for id in zone_registry().zone_ids() {
            tree.add(&id, &id);
        }
    })
}

/// The localized-name matching tree for one locale.
fn zone_name_tree(matching: Matching, locale: &str) -> Arc<PrefixTree> {
    let key = format!("names/{}/{locale}", matching_key(matching));
    cached_tree(key, matching, |tree| {
        let locale = crate::locale::Locale::from_str(locale).unwrap_or_default();
        for (name, id) in zone_registry().localized_names(&locale) {
            if tree.longest_match(&name, 0).map(|(_, end)| end) != Some(name.len()) {
                tree.add(&name, &id);
            }
        }
    })
}

fn cached_tree(key: String, matching: Matching, build: impl Fn(&mut PrefixTree)) -> Arc<PrefixTree> {
    let generation = zone_registry_generation();
    if let Some(cached) = tree_cache().read().expect("zone tree cache poisoned").get(&key) {
        if cached.generation == generation {
            return Arc::clone(&cached.tree);
        }
    }
    let mut tree = PrefixTree::new(matching);
    build(&mut tree);
    log::debug!("rebuilt zone tree '{key}' for registry generation {generation}");
    let tree = Arc::new(tree);
    tree_cache()
        .write()
        .expect("zone tree cache poisoned")
        .insert(
            key,
            CachedTree {
                generation,
                tree: Arc::clone(&tree),
            },
        );
    tree
}

/// The zone-id parse algorithm shared by the id and name units: offsets
/// and the UT/UTC/GMT prefixes are handled structurally, everything
/// else goes through `tree`, and a bare `Z` means UTC.
fn parse_zone(
    ctx: &mut ParseContext<'_>,
    text: &str,
    pos: usize,
    tree: &PrefixTree,
) -> Result<usize, usize> {
    if pos >= text.len() {
        return Err(pos);
    }
    let bytes = text.as_bytes();
    let next = bytes[pos] as char;
    if next == '+' || next == '-' {
        return parse_offset_based(ctx, text, pos, pos, "");
    }
    if pos + 2 <= bytes.len() {
        let second = bytes[pos + 1] as char;
        if ctx.char_equals(next, 'U') && ctx.char_equals(second, 'T') {
            if pos + 3 <= bytes.len() && ctx.char_equals(bytes[pos + 2] as char, 'C') {
                return parse_offset_based(ctx, text, pos, pos + 3, "UTC");
            }
            return parse_offset_based(ctx, text, pos, pos + 2, "UT");
        }
        if ctx.char_equals(next, 'G')
            && pos + 3 <= bytes.len()
            && ctx.char_equals(second, 'M')
            && ctx.char_equals(bytes[pos + 2] as char, 'T')
        {
            return parse_offset_based(ctx, text, pos, pos + 3, "GMT");
        }
    }
    if let Some((zone_id, end)) = tree.longest_match(text, pos) {
        ctx.set_zone(ZoneId::Region(zone_id.into()));
        return Ok(end);
    }
    if ctx.char_equals(next, 'Z') {
        ctx.set_zone(ZoneId::Offset(ZoneOffset::UTC));
        return Ok(pos + 1);
    }
    Err(pos)
}

/// Handles a zone spelled as a prefix plus optional offset, like
/// `GMT+01:00`, `UTC`, or a bare `+05:30`.
fn parse_offset_based(
    ctx: &mut ParseContext<'_>,
    text: &str,
    prefix_pos: usize,
    pos: usize,
    prefix: &str,
) -> Result<usize, usize> {
    let bytes = text.as_bytes();
    if pos >= bytes.len() {
        if prefix.is_empty() {
            return Err(prefix_pos);
        }
        ctx.set_zone(ZoneId::Region(prefix.into()));
        return Ok(pos);
    }
    if !prefix.is_empty()
        && (bytes[pos] == b'0' || ctx.char_equals(bytes[pos] as char, 'Z'))
    {
        ctx.set_zone(ZoneId::Region(prefix.into()));
        return Ok(pos);
    }
    let mut sub = ParseContext::new(ctx.locale, ctx.decimal_style, ctx.text_provider);
    sub.set_case_sensitive(ctx.case_sensitive());
    sub.set_strict(ctx.strict());
    match OffsetIdUnit::iso_z().parse(&mut sub, text, pos) {
        Ok(end) => {
            let total = sub
                .into_parsed()
                .get(ChronoField::OffsetSeconds.into())
                .unwrap_or(0);
            let Ok(offset) = ZoneOffset::of_seconds(total as i32) else {
                return Err(pos);
            };
            let zone = if prefix.is_empty() {
                ZoneId::Offset(offset)
            } else if offset.total_seconds() == 0 {
                ZoneId::Region(prefix.into())
            } else {
                ZoneId::Region(format!("{prefix}{}", offset.id()))
            };
            ctx.set_zone(zone);
            Ok(end)
        }
        Err(err) => {
            if prefix.is_empty() {
                Err(err)
            } else {
                ctx.set_zone(ZoneId::Region(prefix.into()));
                Ok(pos)
            }
        }
    }
}

/// How a [`ZoneIdUnit`] obtains the zone it prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ZoneIdStyle {
    /// Only a zone the temporal actually carries.
    #[default]
    Strict,
    /// Like `Strict`, but fixed-offset zones are refused as well.
    RegionOnly,
    /// Falls back to a fixed-offset zone built from the offset field.
    OrOffset,
}

/// Prints and parses a full zone identifier, pattern letter `VV`.
///
/// The three styles only differ when formatting; parsing accepts the
/// same inputs for all of them.
#[derive(Debug, Clone, Default)]
pub(crate) struct ZoneIdUnit {
    style: ZoneIdStyle,
}

impl ZoneIdUnit {
    pub(crate) const fn new(style: ZoneIdStyle) -> Self {
        Self { style }
    }

    pub(crate) fn format(
        &self,
        ctx: &mut PrintContext<'_>,
        out: &mut String,
    ) -> DateTimeResult<bool> {
        let zone = match self.style {
            ZoneIdStyle::Strict | ZoneIdStyle::RegionOnly => ctx.zone()?,
            ZoneIdStyle::OrOffset => ctx.zone_or_offset()?,
        };
        let Some(zone) = zone else {
            return Ok(false);
        };
        if self.style == ZoneIdStyle::RegionOnly && matches!(zone, ZoneId::Offset(_)) {
            return Ok(false);
        }
        out.push_str(&zone.id());
        Ok(true)
    }

    pub(crate) fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
        text: &str,
        pos: usize,
    ) -> Result<usize, usize> {
        let tree = zone_id_tree(tree_matching(ctx));
        parse_zone(ctx, text, pos, &tree)
    }
}

/// Prints and parses a localized zone name, pattern letter `z`.
///
/// Offsets print their id; a region with no registry name falls back to
/// its id as well.
#[derive(Debug, Clone)]
pub(crate) struct ZoneTextUnit {
    style: TextStyle,
}

impl ZoneTextUnit {
    pub(crate) fn new(style: TextStyle) -> Self {
        Self { style }
    }

    pub(crate) fn format(
        &self,
        ctx: &mut PrintContext<'_>,
        out: &mut String,
    ) -> DateTimeResult<bool> {
        let Some(zone) = ctx.zone_or_offset()? else {
            return Ok(false);
        };
        match &zone {
            ZoneId::Offset(offset) => out.push_str(&offset.id()),
            ZoneId::Region(region) => {
                match zone_registry().display_name(region, self.style, ctx.locale) {
                    Some(name) => out.push_str(&name),
                    None => out.push_str(region),
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
        let tree = zone_name_tree(tree_matching(ctx), &ctx.locale.to_string());
        parse_zone(ctx, text, pos, &tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::DecimalStyle;
    use crate::locale::Locale;
    use crate::text::EnglishTextProvider;

    fn parse_id(text: &str) -> Result<(ZoneId, usize), usize> {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        let pos = ZoneIdUnit::default().parse(&mut ctx, text, 0)?;
        let zone = ctx.into_parsed().zone().expect("zone parsed").clone();
        Ok((zone, pos))
    }

    #[test]
    fn parses_region_ids_longest_first() {
        let (zone, pos) = parse_id("Europe/London!").unwrap();
        assert_eq!(zone, ZoneId::Region("Europe/London".into()));
        assert_eq!(pos, 13);
    }

    #[test]
    fn parses_offsets_and_z() {
        assert_eq!(
            parse_id("+01:30").unwrap().0,
            ZoneId::Offset(ZoneOffset::of_seconds(5400).unwrap())
        );
        assert_eq!(parse_id("Z").unwrap(), (ZoneId::Offset(ZoneOffset::UTC), 1));
    }

    #[test]
    fn parses_prefixed_offsets() {
        assert_eq!(
            parse_id("GMT+01:00").unwrap(),
            (ZoneId::Region("GMT+01:00".into()), 9)
        );
        assert_eq!(parse_id("UTC").unwrap(), (ZoneId::Region("UTC".into()), 3));
        let (zone, pos) = parse_id("UT-05:00").unwrap();
        assert_eq!(zone, ZoneId::Region("UT-05:00".into()));
        assert_eq!(pos, 8);
        // A prefix with no valid trailing offset stands alone.
        assert_eq!(parse_id("GMT hello").unwrap(), (ZoneId::Region("GMT".into()), 3));
    }

    #[test]
    fn parses_localized_names() {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        let unit = ZoneTextUnit::new(TextStyle::Full);
        let pos = unit.parse(&mut ctx, "Eastern Time", 0).unwrap();
        assert_eq!(pos, 12);
        assert_eq!(
            ctx.into_parsed().zone(),
            Some(&ZoneId::Region("America/New_York".into()))
        );
    }

    #[test]
    fn unknown_zone_fails_at_position() {
        assert_eq!(parse_id("Nowhere/Special"), Err(0));
    }

    #[test]
    fn lenient_parsing_forgives_separators() {
        let locale = Locale::english();
        let provider = EnglishTextProvider::new();
        let mut ctx = ParseContext::new(&locale, DecimalStyle::STANDARD, &provider);
        let unit = ZoneIdUnit::default();
        // Strict parsing wants the id exactly as registered.
        assert_eq!(unit.parse(&mut ctx, "America/New York", 0), Err(0));
        ctx.set_strict(false);
        let pos = unit.parse(&mut ctx, "America/New York", 0).unwrap();
        assert_eq!(pos, 16);
        assert_eq!(
            ctx.into_parsed().zone(),
            Some(&ZoneId::Region("America/New_York".into()))
        );
    }
}
