//! Hand-rolled `multipart/form-data` body encoder.
//!
//! ## Why not reqwest's `multipart` feature?
//!
//! The extraction API reads repeated `files` fields positionally, so the
//! request body must preserve part order byte-for-byte. Building the body
//! here keeps the wire format deterministic, testable without a network,
//! and free of an extra feature flag on the HTTP stack. The format itself
//! (RFC 2046) is small: one `--boundary` delimited section per part, CRLF
//! line endings, and a trailing `--boundary--` close.
//!
//! The encoder is a pure function over in-memory bytes: no I/O, no shared
//! state, no failure mode. Callers resolve documents into [`Part`] values
//! first (see [`crate::document`]); anything that can go wrong — a missing
//! file, undecodable base64 — has already gone wrong by the time `encode`
//! runs.

/// One named unit of data in a multipart body.
///
/// A closed sum type rather than an "is there a filename?" inspection so
/// both shapes are handled exhaustively at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// A UTF-8 text field.
    Text {
        /// Field name. Must be non-empty; may repeat across parts.
        name: String,
        /// Field value, written verbatim (UTF-8 bytes, no transformation).
        value: String,
    },
    /// A binary file attachment.
    File {
        /// Field name. Must be non-empty; repeated `files` names are how
        /// batch uploads are expressed.
        name: String,
        /// Raw payload. May be empty (zero-length upload).
        data: Vec<u8>,
        /// Filename sent in the part header. Non-empty; defaults are the
        /// caller's job.
        filename: String,
        /// MIME type sent in the part header. Non-empty.
        content_type: String,
    },
}

impl Part {
    /// Convenience constructor for a text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Part::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Convenience constructor for a file field.
    pub fn file(
        name: impl Into<String>,
        data: Vec<u8>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Part::File {
            name: name.into(),
            data,
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    /// The field name regardless of variant.
    pub fn name(&self) -> &str {
        match self {
            Part::Text { name, .. } => name,
            Part::File { name, .. } => name,
        }
    }
}

/// The encoded request body and its `Content-Type` header value.
///
/// Owned solely by the caller that issues the HTTP call; each `encode`
/// invocation allocates a fresh pair.
#[derive(Debug, Clone)]
pub struct EncodedForm {
    /// The complete body: all parts in input order plus the closing delimiter.
    pub body: Vec<u8>,
    /// Header value of the form `multipart/form-data; boundary=<boundary>`.
    pub content_type: String,
}

/// Fixed prefix of every generated boundary, in the
/// `----WebKitFormBoundary` convention.
const BOUNDARY_PREFIX: &str = "----NanonetsFormBoundary";

/// Length of the random alphanumeric suffix appended to the prefix.
const BOUNDARY_SUFFIX_LEN: usize = 16;

/// Generate a fresh boundary token: fixed prefix + random alphanumeric
/// suffix.
///
/// A 16-char alphanumeric suffix gives 62^16 possible tokens; the chance of
/// one appearing inside a field's content is accepted as negligible and is
/// not checked. Collisions would corrupt the parsed body on the receiving
/// end — a known limitation, not a guarded invariant.
fn generate_boundary() -> String {
    let mut boundary = String::with_capacity(BOUNDARY_PREFIX.len() + BOUNDARY_SUFFIX_LEN);
    boundary.push_str(BOUNDARY_PREFIX);
    for _ in 0..BOUNDARY_SUFFIX_LEN {
        boundary.push(fastrand::alphanumeric());
    }
    boundary
}

/// Encode an ordered sequence of parts into a single multipart body.
///
/// Generates a fresh boundary per call. Part order is preserved exactly —
/// the remote API interprets repeated `files` fields positionally — and no
/// part is dropped, merged, or deduplicated. Cannot fail: any input encodes
/// to a well-formed body.
pub fn encode(parts: &[Part]) -> EncodedForm {
    encode_with_boundary(parts, &generate_boundary())
}

/// Encode with a caller-supplied boundary.
///
/// Output is deterministic given a fixed boundary, which is what the
/// byte-exactness tests key on. Library code goes through [`encode`].
pub fn encode_with_boundary(parts: &[Part], boundary: &str) -> EncodedForm {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(b"--");
        body.extend_from_slice(boundary.as_bytes());
        body.extend_from_slice(b"\r\n");
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                data,
                filename,
                content_type,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(b"--");
    body.extend_from_slice(boundary.as_bytes());
    body.extend_from_slice(b"--\r\n");

    EncodedForm {
        body,
        content_type: format!("multipart/form-data; boundary={boundary}"),
    }
}
