//! URL normalisation: turn free-form user input into a fetchable absolute URL.
//!
//! Users type `google.com`, `www.medium.com/article` or paste a full link with
//! stray whitespace. The only rewrite performed is adding `https://` when no
//! HTTP scheme is present. Domain syntax, reachability and scheme casing are
//! not checked here; malformed input surfaces later as a fetch error.

use crate::error::MapperError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An absolute URL guaranteed to begin with `http://` or `https://`.
///
/// Built by [`normalize_url`]. Deserialising goes through [`TryFrom<String>`],
/// which rejects values without an HTTP(S) scheme instead of rewriting them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NormalizedUrl {
    type Error = MapperError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if has_http_scheme(&value) && value.trim() == value {
            Ok(NormalizedUrl(value))
        } else {
            Err(MapperError::InvalidInput { input: value })
        }
    }
}

impl From<NormalizedUrl> for String {
    fn from(url: NormalizedUrl) -> Self {
        url.0
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check if the input string already carries an HTTP(S) scheme.
pub fn has_http_scheme(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Normalise raw user input into a [`NormalizedUrl`].
///
/// Trims surrounding whitespace, keeps `http://` / `https://` inputs as they
/// are, and prefixes everything else (including `www.` hosts) with
/// `https://`. Idempotent: normalising the result again is a no-op.
///
/// # Errors
/// [`MapperError::InvalidInput`] when nothing is left after trimming.
pub fn normalize_url(raw: &str) -> Result<NormalizedUrl, MapperError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MapperError::InvalidInput {
            input: raw.to_string(),
        });
    }

    if has_http_scheme(trimmed) {
        return Ok(NormalizedUrl(trimmed.to_string()));
    }

    Ok(NormalizedUrl(format!("https://{trimmed}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        normalize_url(s).unwrap().into_string()
    }

    #[test]
    fn test_has_http_scheme() {
        assert!(has_http_scheme("https://example.com"));
        assert!(has_http_scheme("http://example.com"));
        assert!(!has_http_scheme("example.com"));
        assert!(!has_http_scheme("ftp://example.com"));
        assert!(!has_http_scheme(""));
    }

    #[test]
    fn bare_domain_gets_https() {
        assert_eq!(norm("google.com"), "https://google.com");
    }

    #[test]
    fn www_is_trimmed_and_prefixed() {
        assert_eq!(
            norm("  www.medium.com/article "),
            "https://www.medium.com/article"
        );
    }

    #[test]
    fn existing_scheme_is_kept() {
        assert_eq!(norm("https://example.com"), "https://example.com");
        assert_eq!(norm("http://example.com/a?b=c"), "http://example.com/a?b=c");
        assert_eq!(norm("\thttps://example.com\n"), "https://example.com");
    }

    #[test]
    fn idempotent_on_varied_inputs() {
        for raw in [
            "google.com",
            "  www.medium.com/article ",
            "https://example.com",
            "http://x",
            "not a url at all",
            "ftp://files.example",
        ] {
            let once = normalize_url(raw).unwrap();
            let twice = normalize_url(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn malformed_input_passes_through() {
        assert_eq!(norm("ftp://files.example"), "https://ftp://files.example");
        assert_eq!(norm("exa mple"), "https://exa mple");
    }

    #[test]
    fn empty_input_is_invalid() {
        for raw in ["", "   ", "\n\t"] {
            let err = normalize_url(raw).unwrap_err();
            assert!(matches!(err, MapperError::InvalidInput { .. }), "for {raw:?}");
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let url = normalize_url("example.com").unwrap();
        assert_eq!(serde_json::to_string(&url).unwrap(), "\"https://example.com\"");
    }

    #[test]
    fn deserialize_accepts_normalised_values() {
        let url: NormalizedUrl = serde_json::from_str("\"http://example.com/a\"").unwrap();
        assert_eq!(url.as_str(), "http://example.com/a");
    }

    #[test]
    fn deserialize_rejects_values_without_scheme() {
        for raw in ["\"\"", "\"no-scheme\"", "\"ftp://files.example\"", "\" https://x\""] {
            assert!(
                serde_json::from_str::<NormalizedUrl>(raw).is_err(),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn try_from_rejects_empty() {
        let err = NormalizedUrl::try_from(String::new()).unwrap_err();
        assert!(matches!(err, MapperError::InvalidInput { .. }));
    }
}
