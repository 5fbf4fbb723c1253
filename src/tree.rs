//! A prefix tree over ASCII keys, used to match zone identifiers and
//! localized zone names against input text.
//!
//! Matching is greedy: the longest key that prefixes the remaining input
//! wins, which is what lets `Europe/London` beat `Europe/L` style
//! collisions without backtracking in the caller.

use alloc::string::String;
use alloc::vec::Vec;

/// How keys compare against input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Matching {
    Sensitive,
    Insensitive,
    /// Case-insensitive, and the separators space, underscore and slash
    /// are ignorable on both the key and the input side.
    Lenient,
}

#[derive(Debug, Clone, Default)]
struct Node {
    /// The key fragment covered by this node.
    fragment: String,
    /// Present when a complete key terminates at this node.
    value: Option<String>,
    children: Vec<Node>,
}

/// A prefix tree mapping string keys to owned values.
#[derive(Debug, Clone)]
pub(crate) struct PrefixTree {
    root: Node,
    matching: Matching,
}

fn bytes_eq(a: u8, b: u8, matching: Matching) -> bool {
    match matching {
        Matching::Sensitive => a == b,
        Matching::Insensitive | Matching::Lenient => a.eq_ignore_ascii_case(&b),
    }
}

fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'_' | b'/')
}

/// Length of the common prefix of `a` and `b`.
fn common_prefix(a: &[u8], b: &[u8], matching: Matching) -> usize {
    let mut i = 0;
    while i < a.len() && i < b.len() && bytes_eq(a[i], b[i], matching) {
        i += 1;
    }
    i
}

impl PrefixTree {
    pub(crate) fn new(matching: Matching) -> Self {
        Self {
            root: Node::default(),
            matching,
        }
    }

    /// Inserts `key` mapping to `value`, replacing any previous value.
    ///
    /// Lenient trees store keys with the ignorable separators removed,
    /// so `America/New_York` and `America New York` insert identically.
    pub(crate) fn add(&mut self, key: &str, value: &str) {
        let normalized;
        let key = if self.matching == Matching::Lenient {
            normalized = key
                .bytes()
                .filter(|&b| !is_separator(b))
                .map(char::from)
                .collect::<String>();
            normalized.as_str()
        } else {
            key
        };
        if key.is_empty() {
            return;
        }
        let matching = self.matching;
        let mut node = &mut self.root;
        let mut rest = key.as_bytes();
        loop {
            let pos = node
                .children
                .iter()
                .position(|c| bytes_eq(c.fragment.as_bytes()[0], rest[0], matching));
            let Some(pos) = pos else {
                node.children.push(Node {
                    fragment: String::from_utf8_lossy(rest).into_owned(),
                    value: Some(value.into()),
                    children: Vec::new(),
                });
                return;
            };
            let child = &mut node.children[pos];
            let shared = common_prefix(child.fragment.as_bytes(), rest, matching);
            if shared < child.fragment.len() {
                // Split the child so the shared prefix gets its own node.
                let tail = child.fragment.split_off(shared);
                let split = Node {
                    fragment: tail,
                    value: child.value.take(),
                    children: core::mem::take(&mut child.children),
                };
                child.children.push(split);
            }
            if shared == rest.len() {
                child.value = Some(value.into());
                return;
            }
            rest = &rest[shared..];
            node = &mut node.children[pos];
        }
    }

    /// Finds the longest key that prefixes `text` starting at `pos`.
    ///
    /// Returns the matched value and the position just past the match.
    pub(crate) fn longest_match<'a>(&'a self, text: &str, pos: usize) -> Option<(&'a str, usize)> {
        let bytes = text.as_bytes();
        let mut node = &self.root;
        let mut at = pos;
        let mut best = None;
        loop {
            let next = node
                .children
                .iter()
                .find_map(|c| self.match_fragment(c.fragment.as_bytes(), bytes, at, pos).map(|end| (c, end)));
            let Some((child, end)) = next else {
                return best;
            };
            at = end;
            if let Some(value) = &child.value {
                best = Some((value.as_str(), at));
            }
            node = child;
        }
    }

    /// Matches one stored fragment against `bytes` at `at`, skipping
    /// ignorable input separators in lenient mode. Separators before
    /// `start` of the whole match are never skipped.
    fn match_fragment(
        &self,
        frag: &[u8],
        bytes: &[u8],
        mut at: usize,
        start: usize,
    ) -> Option<usize> {
        for &f in frag {
            if self.matching == Matching::Lenient {
                while at > start && at < bytes.len() && is_separator(bytes[at]) {
                    at += 1;
                }
            }
            if at >= bytes.len() || !bytes_eq(f, bytes[at], self.matching) {
                return None;
            }
            at += 1;
        }
        Some(at)
    }
}
