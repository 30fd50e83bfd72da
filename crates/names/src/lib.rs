//! Name normalization for specimen search.
//!
//! Pure functions shared by the resolver, the inventory and the renderers:
//! - Title casing for display
//! - Whitespace and case-insensitive comparison helpers
//! - Order-preserving case-insensitive deduplication
//! - Encyclopedia title and truncation helpers

/// Collapse runs of whitespace and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase everything, then capitalize the first letter of each word.
///
/// `"nymphaea LOTUS"` becomes `"Nymphaea Lotus"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

/// Capitalize the first letter and lowercase the rest (`"QUERCUS"` -> `"Quercus"`).
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Canonical binomial form: genus capitalized, epithets lowercase.
///
/// `"nymphaea LOTUS"` becomes `"Nymphaea lotus"`.
pub fn scientific_case(name: &str) -> String {
    let normalized = normalize_whitespace(name);
    let mut words = normalized.split(' ');
    let mut out = words.next().map(capitalize).unwrap_or_default();
    for word in words {
        out.push(' ');
        out.push_str(&word.to_lowercase());
    }
    out
}

/// Case-insensitive equality after whitespace normalization.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    normalize_whitespace(a).to_lowercase() == normalize_whitespace(b).to_lowercase()
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Whether a word could be a genus name: one token, letters only, two or more.
pub fn is_genus_shaped(word: &str) -> bool {
    let word = word.trim();
    word.chars().count() >= 2 && word.chars().all(char::is_alphabetic)
}

/// Genus part of a scientific name, capitalized.
pub fn genus_of(name: &str) -> Option<String> {
    name.split_whitespace().next().map(capitalize)
}

/// Deduplicate names case-insensitively, keeping the first spelling seen.
///
/// Blank entries are dropped.
pub fn dedup_case_insensitive<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    let mut kept = Vec::new();

    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        let lowered = name.to_lowercase();
        if !seen.contains(&lowered) {
            seen.push(lowered);
            kept.push(name.to_string());
        }
    }

    kept
}

/// Join names for display (`"a, b, c"`).
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truncate to at most `max_chars`, ending in `...` when shortened.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Encyclopedia article title: first letter capitalized, spaces as underscores.
pub fn wiki_title(name: &str) -> String {
    let normalized = normalize_whitespace(name);
    let mut chars = normalized.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars)
            .collect::<String>()
            .replace(' ', "_"),
        None => String::new(),
    }
}
