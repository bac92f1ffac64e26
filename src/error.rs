//! Error types for the neuromind-mapper library.
//!
//! Every failure is scoped to a single request: an error aborts the current
//! `visualize` call and leaves nothing behind, so the caller can show the
//! message and accept the next URL straight away.
//!
//! The three user-facing kinds are:
//!
//! * **Invalid input**: the raw string cannot become a URL at all.
//! * **Fetch**: network failure, timeout, or a non-success HTTP status.
//! * **Empty content**: the page loaded but carried no readable text.
//!
//! The remaining variants cover the AI collaborator, configuration and
//! output I/O. [`MapperError::kind`] collapses them into an [`ErrorKind`]
//! for callers that only need to branch on the category.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the neuromind-mapper library.
#[derive(Debug, Error)]
pub enum MapperError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The raw input is empty or otherwise unusable as a URL.
    #[error("Invalid input '{input}': please enter a website address (e.g. google.com)")]
    InvalidInput { input: String },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// The GET request failed, or the server answered with a non-success status.
    #[error("Could not access '{url}': {reason}")]
    FetchFailed {
        url: String,
        /// HTTP status code when the server answered at all.
        status: Option<u16>,
        reason: String,
    },

    /// The GET request exceeded the configured timeout.
    #[error("Fetching '{url}' timed out after {secs}s\nIncrease --fetch-timeout.")]
    FetchTimeout { url: String, secs: u64 },

    // ── Content errors ────────────────────────────────────────────────────
    /// The page was fetched but yielded too little readable text.
    #[error("No readable text found at '{url}' ({chars} chars, need at least {min})")]
    EmptyContent { url: String, chars: usize, min: usize },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A summary or diagram call failed after all retries, or returned nothing.
    #[error("{task} generation failed: {detail}")]
    GenerationFailed { task: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse category of a [`MapperError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Fetch,
    EmptyContent,
    Generation,
    Config,
    Io,
    Internal,
}

impl MapperError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapperError::InvalidInput { .. } => ErrorKind::InvalidInput,
            MapperError::FetchFailed { .. } | MapperError::FetchTimeout { .. } => ErrorKind::Fetch,
            MapperError::EmptyContent { .. } => ErrorKind::EmptyContent,
            MapperError::ProviderNotConfigured { .. } | MapperError::GenerationFailed { .. } => {
                ErrorKind::Generation
            }
            MapperError::InvalidConfig(_) => ErrorKind::Config,
            MapperError::OutputWriteFailed { .. } => ErrorKind::Io,
            MapperError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// `true` for network failures, timeouts and non-success HTTP statuses.
    pub fn is_fetch_error(&self) -> bool {
        self.kind() == ErrorKind::Fetch
    }

    /// A short, actionable suggestion to show under the error message.
    pub fn user_hint(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::InvalidInput => Some("Enter a site such as google.com or https://example.com/article"),
            ErrorKind::Fetch => Some(
                "Check that the website is reachable, try a different article URL, \
                 or make sure the site allows automated access",
            ),
            ErrorKind::EmptyContent => {
                Some("The page may render its text with JavaScript; try a different article URL")
            }
            ErrorKind::Generation => {
                Some("Set ANTHROPIC_API_KEY or OPENAI_API_KEY (a .env file works too)")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failed_display_includes_reason() {
        let e = MapperError::FetchFailed {
            url: "https://example.com/missing".into(),
            status: Some(404),
            reason: "HTTP 404 Not Found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("example.com/missing"), "got: {msg}");
        assert!(msg.contains("404"), "got: {msg}");
    }

    #[test]
    fn timeout_is_a_fetch_error() {
        let e = MapperError::FetchTimeout {
            url: "https://slow.example".into(),
            secs: 10,
        };
        assert!(e.is_fetch_error());
        assert!(e.to_string().contains("10s"));
    }

    #[test]
    fn empty_content_display() {
        let e = MapperError::EmptyContent {
            url: "https://example.com".into(),
            chars: 3,
            min: 50,
        };
        assert_eq!(e.kind(), ErrorKind::EmptyContent);
        assert!(e.to_string().contains("3 chars"));
        assert!(!e.is_fetch_error());
    }

    #[test]
    fn generation_errors_share_a_kind() {
        let a = MapperError::ProviderNotConfigured {
            provider: "auto".into(),
            hint: "no key".into(),
        };
        let b = MapperError::GenerationFailed {
            task: "Summary".into(),
            detail: "boom".into(),
        };
        assert_eq!(a.kind(), ErrorKind::Generation);
        assert_eq!(b.kind(), ErrorKind::Generation);
        assert!(b.to_string().starts_with("Summary generation failed"));
    }

    #[test]
    fn hints_exist_for_user_facing_kinds() {
        let e = MapperError::InvalidInput { input: "".into() };
        assert!(e.user_hint().is_some());
        assert!(MapperError::Internal("x".into()).user_hint().is_none());
    }
}
