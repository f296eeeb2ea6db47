//! Entity name normalization.
//!
//! Every lookup in the catalog goes through [`normalize`] so that
//! `"Tumeken's shadow (uncharged)"`, `" tumeken's  shadow (UNCHARGED)"` and
//! the wiki form `"Tumeken's#shadow (uncharged)"` address the same entity.

/// Turn a display name into the catalog identity key: `#` separators become
/// spaces, surrounding whitespace is trimmed, inner whitespace runs collapse to
/// a single space, and the result is lowercased.
pub fn normalize(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for word in name.split(|c: char| c == '#' || c.is_whitespace()) {
        if word.is_empty() {
            continue;
        }
        if !key.is_empty() {
            key.push(' ');
        }
        key.extend(word.chars().flat_map(char::to_lowercase));
    }
    key
}

/// Normalize a name fragment used as a suffix. Unlike [`normalize`], leading
/// and trailing spaces are significant and kept.
pub fn normalize_affix(affix: &str) -> String {
    affix.replace('#', " ").to_lowercase()
}
