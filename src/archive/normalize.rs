//! Entry name cleanup
//!
//! Some labels stamp their own name, the artist, and the album onto every
//! track, e.g.
//! `Lacerated Enemy records - THE RITUAL AURA - Tæther - 01 Tæthered Betwixt.flac`
//! or `NECROVILE - NECROVILE - Engorging The Devourmental Void - 01 I Kill.flac`.
//! The library already encodes artist and album in the directory layout, so
//! those prefixes are removed before extraction.

/// Label tags stripped from entry names by default
pub const KNOWN_LABEL_PREFIXES: &[&str] = &["Lacerated Enemy records - "];

/// Separator between name tokens in storefront file names
pub const TOKEN_SEPARATOR: &str = " - ";

/// Strip each prefix, in order, if the name currently starts with it
///
/// Matching is case-insensitive. Each prefix is removed at most once, and
/// later prefixes are checked against the already-stripped name.
pub fn strip<S: AsRef<str>>(entry_name: &str, known_prefixes: &[S]) -> String {
    let mut current = entry_name;
    for prefix in known_prefixes {
        if let Some(rest) = strip_prefix_ignore_case(current, prefix.as_ref()) {
            current = rest;
        }
    }
    current.to_string()
}

/// The prefix list applied to every entry of an archive
///
/// Order: label tags, `artist - ` twice (some archives double-stamp it),
/// then `album - `.
pub fn default_prefixes<S: AsRef<str>>(labels: &[S], artist: &str, album: &str) -> Vec<String> {
    let artist_prefix = format!("{artist}{TOKEN_SEPARATOR}");
    let album_prefix = format!("{album}{TOKEN_SEPARATOR}");

    labels
        .iter()
        .map(|label| label.as_ref().to_string())
        .chain([artist_prefix.clone(), artist_prefix, album_prefix])
        .collect()
}

/// Case-insensitive `str::strip_prefix`, compared per character
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = s.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !chars_equal_ignore_case(actual, expected) {
            return None;
        }
    }
    let consumed = chars.next().map_or(s.len(), |(idx, _)| idx);
    Some(&s[consumed..])
}

fn chars_equal_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
