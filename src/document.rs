//! Document input resolution: normalise a caller-supplied source into a
//! form part.
//!
//! ## Why resolve before encoding?
//!
//! The multipart encoder is a total function — it cannot fail and should
//! never have to. Everything fallible about a document (a path that does
//! not exist, base64 that does not decode) is dealt with here, so by the
//! time parts reach [`crate::multipart::encode`] they are plain bytes and
//! strings. Filename and content-type defaults are also applied here; the
//! encoder writes whatever it is handed, verbatim.

use crate::error::NanonetsError;
use crate::multipart::Part;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::PathBuf;
use tracing::debug;

/// Fallback filename when a source does not carry one.
pub const DEFAULT_FILENAME: &str = "document.pdf";

/// Fallback content type when a source does not carry one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

/// Where a document comes from.
///
/// One closed enum instead of separate method overloads so every operation
/// (extract, classify, chat) accepts the same set of sources.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// A publicly reachable HTTP(S) URL. Sent to the API as a `file_url`
    /// text field; the document itself never passes through this client.
    Url(String),
    /// An in-memory buffer, e.g. read from a database or upstream service.
    Buffer {
        data: Vec<u8>,
        /// Defaults to [`DEFAULT_FILENAME`] when `None`.
        filename: Option<String>,
        /// Defaults to [`DEFAULT_CONTENT_TYPE`] when `None`.
        content_type: Option<String>,
    },
    /// A base64-encoded payload. The content type is inferred from the
    /// filename's extension.
    Base64 { content: String, filename: String },
    /// A local file, read asynchronously at resolution time.
    Path(PathBuf),
}

impl DocumentSource {
    pub fn url(url: impl Into<String>) -> Self {
        DocumentSource::Url(url.into())
    }

    pub fn buffer(data: Vec<u8>) -> Self {
        DocumentSource::Buffer {
            data,
            filename: None,
            content_type: None,
        }
    }

    pub fn buffer_named(
        data: Vec<u8>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        DocumentSource::Buffer {
            data,
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
        }
    }

    pub fn base64(content: impl Into<String>, filename: impl Into<String>) -> Self {
        DocumentSource::Base64 {
            content: content.into(),
            filename: filename.into(),
        }
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        DocumentSource::Path(path.into())
    }
}

/// A source after all fallible work is done: either a URL forwarded to the
/// API as text, or actual bytes with their part headers decided.
#[derive(Debug, Clone)]
pub enum ResolvedDocument {
    FileUrl(String),
    Attachment {
        data: Vec<u8>,
        filename: String,
        content_type: String,
    },
}

impl ResolvedDocument {
    /// Turn the resolved document into a multipart part under `field_name`
    /// (URLs use the fixed `file_url` field regardless).
    pub fn into_part(self, field_name: &str) -> Part {
        match self {
            ResolvedDocument::FileUrl(url) => Part::text("file_url", url),
            ResolvedDocument::Attachment {
                data,
                filename,
                content_type,
            } => Part::file(field_name, data, filename, content_type),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Infer a MIME type from a filename extension.
///
/// The table covers the formats the extraction API accepts natively;
/// anything else is sent as `application/octet-stream` and left to the
/// server to sniff.
pub fn mime_for_filename(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tiff" | "tif" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Resolve a [`DocumentSource`] into bytes-or-URL form.
///
/// This is where upstream failures surface: missing files, permission
/// problems, and undecodable base64 all return an error *before* any
/// request body is assembled.
pub async fn resolve(source: DocumentSource) -> Result<ResolvedDocument, NanonetsError> {
    match source {
        DocumentSource::Url(url) => Ok(ResolvedDocument::FileUrl(url)),

        DocumentSource::Buffer {
            data,
            filename,
            content_type,
        } => Ok(ResolvedDocument::Attachment {
            data,
            filename: filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        }),

        DocumentSource::Base64 { content, filename } => {
            let data = STANDARD
                .decode(content.trim())
                .map_err(|e| NanonetsError::InvalidBase64 {
                    detail: e.to_string(),
                })?;
            debug!("Decoded {} base64 bytes for '{}'", data.len(), filename);
            let content_type = mime_for_filename(&filename).to_string();
            Ok(ResolvedDocument::Attachment {
                data,
                filename,
                content_type,
            })
        }

        DocumentSource::Path(path) => {
            let data = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    NanonetsError::PermissionDenied { path: path.clone() }
                }
                _ => NanonetsError::FileNotFound { path: path.clone() },
            })?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
            debug!("Read {} bytes from {}", data.len(), path.display());
            let content_type = mime_for_filename(&filename).to_string();
            Ok(ResolvedDocument::Attachment {
                data,
                filename,
                content_type,
            })
        }
    }
}
