use serde::Serialize;
use std::fmt;

/// Characters that are not allowed in file names on common platforms.
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Longest title in bytes. Leaves room under the 255-byte name limit for the
/// `_video.mp4` style suffixes added to intermediate files.
pub const MAX_TITLE_BYTES: usize = 200;

/// A media title made safe for use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaTitle(String);

impl MediaTitle {
    /// Sanitizes a reported title. Falls back to `fallback` (normally the
    /// media identifier) when nothing usable is left.
    pub fn new(raw: &str, fallback: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control())
            .collect();
        let cleaned = truncate_to_bytes(cleaned.trim(), MAX_TITLE_BYTES)
            .trim_end()
            .trim_end_matches('.')
            .trim();

        if cleaned.is_empty() {
            Self(fallback.to_string())
        } else {
            Self(cleaned.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn truncate_to_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl fmt::Display for MediaTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
