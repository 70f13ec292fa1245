//! Error types for the nanonets-ocr library.
//!
//! Everything here is **fatal** for the call that raised it: the operation
//! cannot produce a response and returns `Err(NanonetsError)`. There is no
//! retry layer — a 429 or timeout surfaces immediately and the caller
//! decides whether to try again. The one non-fatal path in the crate is
//! batch *collection*, where an unreadable input is skipped with a `warn!`
//! rather than aborting the whole upload (see
//! [`crate::client::NanonetsClient::extract_batch`]).
//!
//! The multipart encoder itself has no error type by design: it accepts any
//! part list and always produces a well-formed body. Failures that look like
//! "encoding errors" (missing file, undecodable base64) actually come from
//! document resolution, before the encoder runs.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the nanonets-ocr library.
#[derive(Debug, Error)]
pub enum NanonetsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Document file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// A base64 document payload could not be decoded.
    #[error("Invalid base64 document content: {detail}")]
    InvalidBase64 { detail: String },

    /// More documents were supplied than one batch request accepts.
    #[error("Batch of {count} documents exceeds the API limit of {max} per request.\nSplit the input into smaller batches.")]
    BatchTooLarge { count: usize, max: usize },

    /// A batch upload ended up with nothing to send (every input was
    /// skipped or the list was empty).
    #[error("Batch contains no usable documents")]
    EmptyBatch,

    // ── Configuration errors ──────────────────────────────────────────────
    /// No API key was provided and none was found in the environment.
    #[error("No API key configured.\nPass one to ClientConfig::builder().api_key(..) or set NANONETS_API_KEY.")]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Transport errors ──────────────────────────────────────────────────
    /// The HTTP request could not be sent or the response body not read.
    #[error("Request to '{url}' failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // ── API errors ────────────────────────────────────────────────────────
    /// The API rejected the credential (401/403) — retrying will not help.
    #[error("Authentication failed ({status}): {detail}\nCheck the API key.")]
    AuthFailed { status: u16, detail: String },

    /// The API returned HTTP 429 — caller should back off.
    ///
    /// Check `retry_after_secs` for a server-specified delay. No retry is
    /// performed here.
    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-2xx response.
    #[error("API error ({status}) from '{url}': {message}")]
    ApiError {
        status: u16,
        url: String,
        message: String,
    },

    /// The response body was not the JSON shape the operation expects.
    #[error("Unexpected response from '{url}': {detail}")]
    InvalidResponse { url: String, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_too_large_display() {
        let e = NanonetsError::BatchTooLarge { count: 72, max: 50 };
        let msg = e.to_string();
        assert!(msg.contains("72"), "got: {msg}");
        assert!(msg.contains("50"), "got: {msg}");
    }

    #[test]
    fn auth_failed_display() {
        let e = NanonetsError::AuthFailed {
            status: 401,
            detail: "invalid key".into(),
        };
        assert!(e.to_string().contains("401"));
        assert!(e.to_string().contains("invalid key"));
    }

    #[test]
    fn api_error_display() {
        let e = NanonetsError::ApiError {
            status: 500,
            url: "https://extraction-api.nanonets.com/api/v1/extract/sync".into(),
            message: "internal".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("/extract/sync"));
    }

    #[test]
    fn file_not_found_display() {
        let e = NanonetsError::FileNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert!(e.to_string().contains("/tmp/missing.pdf"));
    }

    #[test]
    fn rate_limited_display_with_and_without_hint() {
        let with = NanonetsError::RateLimited {
            retry_after_secs: Some(30),
        };
        let without = NanonetsError::RateLimited {
            retry_after_secs: None,
        };
        assert!(with.to_string().contains("Rate limit"));
        assert!(without.to_string().contains("Rate limit"));
    }
}
