//! Artist and album inference from storefront download names
//!
//! Downloads are named like `Psycroptic - As the Kingdom Drowns (pre-order).zip`,
//! and a repeated download gets a marker: `... (pre-order) (1).zip`.

use crate::archive::normalize::TOKEN_SEPARATOR;
use crate::error::{ExpandError, Result};

/// Length of the extension removed from the album token, dot included
const EXTENSION_LEN: usize = 4;

/// Artist and album parsed from one file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub artist: String,
    pub album: String,
}

/// Parse both tokens at once
pub fn parse(filename: &str) -> Result<ParsedName> {
    Ok(ParsedName {
        artist: parse_artist(filename)?,
        album: parse_album(filename)?,
    })
}

/// Everything before the first `" - "`
pub fn parse_artist(filename: &str) -> Result<String> {
    let (artist, _) = split_once(filename)?;
    Ok(artist.to_string())
}

/// Everything after the first `" - "`, minus the extension and any
/// single-digit duplicate marker such as `" (1)"`
pub fn parse_album(filename: &str) -> Result<String> {
    let (_, rest) = split_once(filename)?;

    let mut album = drop_last_chars(rest, EXTENSION_LEN).ok_or_else(|| {
        ExpandError::malformed(filename, "album name is too short to carry an extension")
    })?;

    // Only one digit is recognised; "(12)" is left alone
    if album.chars().count() > 4 {
        if let Some(stripped) = strip_duplicate_marker(album) {
            album = stripped;
        }
    }

    Ok(album.to_string())
}

fn split_once(filename: &str) -> Result<(&str, &str)> {
    filename
        .split_once(TOKEN_SEPARATOR)
        .ok_or_else(|| ExpandError::malformed(filename, "missing ' - ' between artist and album"))
}

/// `s` without its last `n` characters, or `None` if it is shorter than `n`
fn drop_last_chars(s: &str, n: usize) -> Option<&str> {
    if n == 0 {
        return Some(s);
    }
    let (idx, _) = s.char_indices().rev().nth(n - 1)?;
    Some(&s[..idx])
}

fn strip_duplicate_marker(album: &str) -> Option<&str> {
    let head = drop_last_chars(album, 4)?;
    let mut tail = album[head.len()..].chars();
    match (tail.next(), tail.next(), tail.next(), tail.next()) {
        (Some(' '), Some('('), Some(d), Some(')')) if d.is_ascii_digit() => Some(head),
        _ => None,
    }
}
