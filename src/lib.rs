//! # nanonets-ocr
//!
//! Client for the Nanonets document AI API: extract structured data from
//! documents, classify them into categories, and ask questions about them
//! through an OpenAI-compatible chat endpoint.
//!
//! ## Why this crate?
//!
//! The extraction API takes documents as `multipart/form-data` uploads and
//! reads repeated `files` fields positionally, so the request body must be
//! assembled with exact part ordering. This crate builds that body by hand
//! — a small, fully tested RFC 2046 encoder — and keeps the rest of the
//! surface thin: typed options in, lenient JSON models out, no retry
//! magic in between.
//!
//! ## Request Path
//!
//! ```text
//! DocumentSource
//!  │
//!  ├─ 1. Resolve   URL passthrough / read file / decode base64 (fallible)
//!  ├─ 2. Assemble  options + document → ordered form parts
//!  ├─ 3. Encode    parts → multipart body + boundary header (pure)
//!  └─ 4. Dispatch  POST with Bearer credential, map status → error
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nanonets_ocr::{DocumentSource, ExtractOptions, NanonetsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key from NANONETS_API_KEY
//!     let client = NanonetsClient::from_env()?;
//!
//!     let record = client
//!         .extract(DocumentSource::path("invoice.pdf"), &ExtractOptions::default())
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `nanonets-ocr` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! nanonets-ocr = { version = "0.1", default-features = false }
//! ```
//!
//! ## Choosing an Operation
//!
//! | Method | Endpoint style | Best for |
//! |--------|---------------|----------|
//! | [`NanonetsClient::extract`] | sync | Single documents, interactive use |
//! | [`NanonetsClient::extract_async`] + [`NanonetsClient::get_result`] | queued | Large documents, pipelines |
//! | [`NanonetsClient::extract_batch`] | one request, ≤ 50 uploads | Bulk ingestion |
//! | [`NanonetsClient::classify`] | sync | Routing documents by type |
//! | [`NanonetsClient::ask`] | chat | Free-form questions about a document |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod multipart;
pub mod types;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{NanonetsClient, MAX_BATCH_DOCUMENTS};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use document::DocumentSource;
pub use error::NanonetsError;
pub use multipart::{encode, EncodedForm, Part};
pub use types::{
    Category, ChatMessage, ChatRequest, ChatResponse, ContentPart, ExtractOptions,
    ExtractionRecord, ListOptions, OutputFormat, PromptMode, ResultsPage, SortOrder,
};
