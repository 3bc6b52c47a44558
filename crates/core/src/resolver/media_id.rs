//! Canonical media identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a canonical identifier.
pub const MEDIA_ID_LEN: usize = 11;

/// An 11-character URL-safe token naming one video, independent of the URL
/// form that referenced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaId(String);

impl MediaId {
    /// Returns the identifier if `raw` has the platform's identifier shape.
    pub fn parse(raw: &str) -> Option<Self> {
        if is_valid_id(raw) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical watch page for this identifier.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

/// Shape check: exactly 11 characters from `[A-Za-z0-9_-]`.
pub fn is_valid_id(raw: &str) -> bool {
    raw.len() == MEDIA_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MediaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MediaId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_id(&value) {
            Ok(Self(value))
        } else {
            Err(format!("invalid media id: {:?}", value))
        }
    }
}

impl From<MediaId> for String {
    fn from(id: MediaId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = MediaId::parse("dQw4w9WgXcQ").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(id.to_string(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_parse_accepts_dash_and_underscore() {
        assert!(MediaId::parse("a-b_c-d_e-f").is_some());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(MediaId::parse("dQw4w9WgXc").is_none());
        assert!(MediaId::parse("dQw4w9WgXcQQ").is_none());
        assert!(MediaId::parse("").is_none());
    }

    #[test]
    fn test_parse_rejects_bad_characters() {
        assert!(MediaId::parse("dQw4w9WgX/Q").is_none());
        assert!(MediaId::parse("dQw4w9WgX Q").is_none());
        // multi-byte characters must not sneak past the length check
        assert!(MediaId::parse("dQw4w9WgXé").is_none());
    }

    #[test]
    fn test_watch_url() {
        let id = MediaId::parse("dQw4w9WgXcQ").unwrap();
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_serde_round_trip_rejects_invalid() {
        let id: MediaId = serde_json::from_str("\"dQw4w9WgXcQ\"").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
        assert!(serde_json::from_str::<MediaId>("\"nope\"").is_err());
    }
}
