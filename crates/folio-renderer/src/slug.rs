//! Anchor slugs for headings.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

/// Used when nothing of the heading text survives slugging.
pub const FALLBACK_SLUG: &str = "section";

/// Turns heading text into a URL-fragment-safe slug.
///
/// NFKC-normalizes, trims, lowercases ASCII, turns whitespace runs into a
/// single `-`, drops everything outside [`is_slug_char`], and collapses
/// repeated hyphens. Japanese text survives as-is.
pub fn slugify(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    let mut slug = String::with_capacity(normalized.len());
    for c in normalized.trim().chars() {
        let c = if c.is_whitespace() {
            '-'
        } else if is_slug_char(c) {
            c.to_ascii_lowercase()
        } else {
            continue;
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug
    }
}

/// ASCII letters and digits, `-`, `_`, and the CJK ranges blog content is
/// written in: symbols and punctuation, hiragana, katakana (which includes
/// the prolonged sound mark `ー`), and unified ideographs.
pub fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '_'
                | '\u{3000}'..='\u{303F}'
                | '\u{3040}'..='\u{309F}'
                | '\u{30A0}'..='\u{30FF}'
                | '\u{4E00}'..='\u{9FFF}'
        )
}

/// Hands out unique slugs within one document.
///
/// Counts are keyed on the base slug: the first `intro` stays `intro`, the
/// next ones become `intro-1`, `intro-2`, and so on, in the order they are
/// claimed. A heading whose own text slugs to `intro-1` is counted
/// separately and can coincide with a suffixed repeat.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    seen: HashMap<String, usize>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, base: String) -> String {
        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        slug
    }
}
