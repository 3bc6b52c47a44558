//! Turns user-supplied video page URLs into canonical media identifiers.
//!
//! Accepted forms include the short-link host (`youtu.be/<id>`), the long-form
//! host with a `v` query parameter (`www.youtube.com/watch?v=<id>`, any
//! subdomain), and, for input the URL parser rejects, the `embed/`, `v/` and
//! `shorts/` path shapes.

mod error;
mod media_id;

pub use error::ResolveError;
pub use media_id::{is_valid_id, MediaId, MEDIA_ID_LEN};

use once_cell::sync::Lazy;
use regex_lite::Regex;
use url::Url;

const SHORT_LINK_HOST: &str = "youtu.be";
const LONG_FORM_HOST: &str = "youtube.com";

static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtu\.be/|youtube\.com/(?:watch\?v=|embed/|v/|shorts/))([\w-]{11})")
        .expect("link pattern is valid")
});

/// Resolve a raw URL string to a [`MediaId`].
///
/// Pure and deterministic: no network access.
pub fn resolve(raw: &str) -> Result<MediaId, ResolveError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::Empty);
    }

    let normalized = with_default_scheme(trimmed);
    let token = match Url::parse(&normalized) {
        Ok(parsed) => token_from_url(&parsed)?,
        Err(_) => token_from_pattern(&normalized).ok_or(ResolveError::Malformed)?,
    };

    MediaId::parse(&token).ok_or(ResolveError::NoIdentifier)
}

fn with_default_scheme(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    }
}

fn token_from_url(parsed: &Url) -> Result<String, ResolveError> {
    let host = parsed.host_str().unwrap_or_default();

    if host == SHORT_LINK_HOST {
        let path = parsed.path();
        let token = path.strip_prefix('/').unwrap_or(path);
        if token.is_empty() {
            return Err(ResolveError::NoIdentifier);
        }
        return Ok(token.to_string());
    }

    if host.contains(LONG_FORM_HOST) {
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .ok_or(ResolveError::NoIdentifier);
    }

    Err(ResolveError::UnsupportedHost {
        host: host.to_string(),
    })
}

fn token_from_pattern(input: &str) -> Option<String> {
    LINK_PATTERN
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
