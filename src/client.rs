//! The API client: one async method per remote operation.
//!
//! ## Shape
//!
//! Every operation follows the same three steps: resolve inputs into form
//! parts ([`crate::document`]), encode the body ([`crate::multipart`]),
//! dispatch with the bearer credential and map the response status onto the
//! error taxonomy. The dispatch helpers (`post_multipart`, `post_json`,
//! `get`) are the only code that touches the network.
//!
//! ## No retry layer
//!
//! 429s and transient 5xx responses surface immediately as errors — the
//! client performs no backoff. Sync extraction holds one connection open
//! per call; callers wanting resilience should use
//! [`NanonetsClient::extract_async`] and poll
//! [`NanonetsClient::get_result`] at their own pace.

use crate::config::ClientConfig;
use crate::document::{self, DocumentSource, ResolvedDocument};
use crate::error::NanonetsError;
use crate::multipart::{self, Part};
use crate::types::{
    Category, ChatMessage, ChatRequest, ChatResponse, ContentPart, ExtractOptions,
    ExtractionRecord, ListOptions, ResultsPage,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Maximum documents one batch request accepts.
pub const MAX_BATCH_DOCUMENTS: usize = 50;

/// How much of an error response body is carried into error messages.
const ERROR_BODY_SNIPPET: usize = 300;

/// Async client for the Nanonets document AI API.
///
/// Construct once and reuse: the underlying connection pool is shared
/// across calls, and `NanonetsClient` is cheap to clone.
///
/// # Example
/// ```rust,no_run
/// use nanonets_ocr::{DocumentSource, ExtractOptions, NanonetsClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // API key from NANONETS_API_KEY
///     let client = NanonetsClient::from_env()?;
///     let record = client
///         .extract(
///             DocumentSource::url("https://example.com/invoice.pdf"),
///             &ExtractOptions::default(),
///         )
///         .await?;
///     println!("{}", serde_json::to_string_pretty(&record)?);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct NanonetsClient {
    http: reqwest::Client,
    config: ClientConfig,
    api_key: String,
}

// Manual Debug so the resolved credential never lands in logs.
impl std::fmt::Debug for NanonetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NanonetsClient")
            .field("config", &self.config)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl NanonetsClient {
    /// Create a client from a [`ClientConfig`].
    ///
    /// Fails when no API key is configured (explicitly or via
    /// `NANONETS_API_KEY`) or the HTTP stack cannot be initialised.
    pub fn new(config: ClientConfig) -> Result<Self, NanonetsError> {
        let api_key = config.resolve_api_key()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NanonetsError::Internal(format!("HTTP client init failed: {e}")))?;
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Create a client entirely from the environment.
    pub fn from_env() -> Result<Self, NanonetsError> {
        Self::new(ClientConfig::default())
    }

    // ── Extraction ───────────────────────────────────────────────────────

    /// Extract a document synchronously.
    ///
    /// The call returns when extraction finishes, which for large documents
    /// can take most of the configured timeout.
    pub async fn extract(
        &self,
        source: DocumentSource,
        options: &ExtractOptions,
    ) -> Result<ExtractionRecord, NanonetsError> {
        let resolved = document::resolve(source).await?;
        let parts = extract_parts(resolved, options);
        self.post_multipart("/api/v1/extract/sync", parts).await
    }

    /// Queue a document for asynchronous extraction.
    ///
    /// Returns a record whose `record_id` can be polled with
    /// [`get_result`](NanonetsClient::get_result).
    pub async fn extract_async(
        &self,
        source: DocumentSource,
        options: &ExtractOptions,
    ) -> Result<ExtractionRecord, NanonetsError> {
        let resolved = document::resolve(source).await?;
        let parts = extract_parts(resolved, options);
        self.post_multipart("/api/v1/extract/async", parts).await
    }

    /// Extract a batch of documents referenced by URL in one request.
    pub async fn extract_batch_urls(
        &self,
        urls: &[String],
        options: &ExtractOptions,
    ) -> Result<ExtractionRecord, NanonetsError> {
        check_batch_size(urls.len())?;
        let mut parts = options.form_parts();
        parts.push(Part::text(
            "urls",
            serde_json::to_string(urls)
                .map_err(|e| NanonetsError::Internal(format!("URL list serialisation: {e}")))?,
        ));
        info!("Submitting URL batch of {} documents", urls.len());
        self.post_multipart("/api/v1/extract/batch", parts).await
    }

    /// Extract a batch of up to [`MAX_BATCH_DOCUMENTS`] uploaded documents
    /// in one request.
    ///
    /// Sources that cannot be resolved (missing file, bad base64) are
    /// skipped with a warning rather than failing the batch, matching how
    /// per-document problems are treated server-side. URL sources cannot be
    /// uploaded and are skipped the same way — use
    /// [`extract_batch_urls`](NanonetsClient::extract_batch_urls) for those.
    pub async fn extract_batch(
        &self,
        sources: Vec<DocumentSource>,
        options: &ExtractOptions,
    ) -> Result<ExtractionRecord, NanonetsError> {
        check_batch_size(sources.len())?;
        let mut parts = options.form_parts();
        let attached = self.collect_attachments(sources, &mut parts).await;
        if attached == 0 {
            return Err(NanonetsError::EmptyBatch);
        }
        info!("Submitting batch of {attached} documents");
        self.post_multipart("/api/v1/extract/batch", parts).await
    }

    /// Fetch an extraction result by record ID.
    pub async fn get_result(&self, record_id: &str) -> Result<ExtractionRecord, NanonetsError> {
        self.get(&format!("/api/v1/extract/results/{record_id}"), &[])
            .await
    }

    /// List recent extraction results.
    pub async fn list_results(&self, options: &ListOptions) -> Result<ResultsPage, NanonetsError> {
        self.get("/api/v1/extract/results", &options.query_pairs())
            .await
    }

    // ── Classification ───────────────────────────────────────────────────

    /// Classify a document into the given categories.
    pub async fn classify(
        &self,
        source: DocumentSource,
        categories: &[Category],
    ) -> Result<ExtractionRecord, NanonetsError> {
        let resolved = document::resolve(source).await?;
        let parts = classify_parts(resolved, categories)?;
        self.post_multipart("/api/v1/classify/sync", parts).await
    }

    /// Classify up to [`MAX_BATCH_DOCUMENTS`] uploaded documents in one
    /// request. Unresolvable sources are skipped with a warning.
    pub async fn classify_batch(
        &self,
        sources: Vec<DocumentSource>,
        categories: &[Category],
    ) -> Result<ExtractionRecord, NanonetsError> {
        check_batch_size(sources.len())?;
        let mut parts = vec![Part::text("categories", categories_json(categories)?)];
        let attached = self.collect_attachments(sources, &mut parts).await;
        if attached == 0 {
            return Err(NanonetsError::EmptyBatch);
        }
        info!("Classifying batch of {attached} documents");
        self.post_multipart("/api/v1/classify/batch", parts).await
    }

    // ── Chat ─────────────────────────────────────────────────────────────

    /// Ask a question about a document (or none) via the OpenAI-compatible
    /// chat endpoint, using the configured default model.
    pub async fn ask(
        &self,
        message: impl Into<String>,
        source: Option<DocumentSource>,
    ) -> Result<ChatResponse, NanonetsError> {
        let mut content = Vec::new();
        if let Some(source) = source {
            match document::resolve(source).await? {
                ResolvedDocument::FileUrl(url) => content.push(ContentPart::file_url(url)),
                ResolvedDocument::Attachment {
                    data, content_type, ..
                } => content.push(ContentPart::inline_document(&content_type, &data)),
            }
        }
        content.push(ContentPart::text(message));

        self.chat(ChatRequest {
            model: self.config.chat_model.clone(),
            messages: vec![ChatMessage::user(content)],
            stream: false,
        })
        .await
    }

    /// Send a fully caller-assembled chat completion request.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, NanonetsError> {
        self.post_json("/v1/chat/completions", &request).await
    }

    // ── Dispatch helpers ─────────────────────────────────────────────────

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Resolve each source and append it as a repeated `files` part.
    /// Returns how many were attached; failures are logged and skipped.
    async fn collect_attachments(
        &self,
        sources: Vec<DocumentSource>,
        parts: &mut Vec<Part>,
    ) -> usize {
        let mut attached = 0;
        for (i, source) in sources.into_iter().enumerate() {
            match document::resolve(source).await {
                Ok(ResolvedDocument::Attachment {
                    data,
                    filename,
                    content_type,
                }) => {
                    parts.push(Part::file("files", data, filename, content_type));
                    attached += 1;
                }
                Ok(ResolvedDocument::FileUrl(url)) => {
                    warn!("Batch document {i} is a URL ({url}) — skipped; use extract_batch_urls");
                }
                Err(e) => {
                    warn!("Batch document {i} skipped: {e}");
                }
            }
        }
        attached
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<Part>,
    ) -> Result<T, NanonetsError> {
        let form = multipart::encode(&parts);
        let url = self.endpoint(path);
        debug!(
            "POST {} — {} parts, {} body bytes",
            url,
            parts.len(),
            form.body.len()
        );
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, form.content_type)
            .body(form.body)
            .send()
            .await
            .map_err(|e| NanonetsError::RequestFailed {
                url: url.clone(),
                source: e,
            })?;
        self.handle_response(url, response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, NanonetsError> {
        let url = self.endpoint(path);
        debug!("POST {url} (json)");
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| NanonetsError::RequestFailed {
                url: url.clone(),
                source: e,
            })?;
        self.handle_response(url, response).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, NanonetsError> {
        let url = self.endpoint(path);
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .query(query)
            .send()
            .await
            .map_err(|e| NanonetsError::RequestFailed {
                url: url.clone(),
                source: e,
            })?;
        self.handle_response(url, response).await
    }

    /// Map the response status onto the error taxonomy, then decode JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        url: String,
        response: reqwest::Response,
    ) -> Result<T, NanonetsError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let detail = body_snippet(response).await;
            return Err(NanonetsError::AuthFailed {
                status: status.as_u16(),
                detail,
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(NanonetsError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let message = body_snippet(response).await;
            return Err(NanonetsError::ApiError {
                status: status.as_u16(),
                url,
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| NanonetsError::RequestFailed {
                url: url.clone(),
                source: e,
            })?;
        serde_json::from_str(&text).map_err(|e| NanonetsError::InvalidResponse {
            url,
            detail: format!("{e} (body: {})", truncate(&text, ERROR_BODY_SNIPPET)),
        })
    }
}

// ── Part assembly (pure, unit-tested) ────────────────────────────────────

/// Options first, document last — the field order the API documents.
fn extract_parts(resolved: ResolvedDocument, options: &ExtractOptions) -> Vec<Part> {
    let mut parts = options.form_parts();
    parts.push(resolved.into_part("file"));
    parts
}

fn classify_parts(
    resolved: ResolvedDocument,
    categories: &[Category],
) -> Result<Vec<Part>, NanonetsError> {
    Ok(vec![
        Part::text("categories", categories_json(categories)?),
        resolved.into_part("file"),
    ])
}

fn categories_json(categories: &[Category]) -> Result<String, NanonetsError> {
    serde_json::to_string(categories)
        .map_err(|e| NanonetsError::Internal(format!("category serialisation: {e}")))
}

fn check_batch_size(count: usize) -> Result<(), NanonetsError> {
    if count > MAX_BATCH_DOCUMENTS {
        return Err(NanonetsError::BatchTooLarge {
            count,
            max: MAX_BATCH_DOCUMENTS,
        });
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

async fn body_snippet(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) if !body.is_empty() => truncate(&body, ERROR_BODY_SNIPPET).to_string(),
        Ok(_) => "<empty body>".to_string(),
        Err(e) => format!("<unreadable body: {e}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutputFormat;

    fn attachment() -> ResolvedDocument {
        ResolvedDocument::Attachment {
            data: vec![1, 2, 3],
            filename: "a.pdf".into(),
            content_type: "application/pdf".into(),
        }
    }

    #[test]
    fn extract_parts_put_document_last() {
        let opts = ExtractOptions {
            output_format: OutputFormat::Json,
            custom_instructions: Some("totals only".into()),
            ..Default::default()
        };
        let parts = extract_parts(attachment(), &opts);
        let names: Vec<&str> = parts.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["output_format", "custom_instructions", "file"]);
    }

    #[test]
    fn extract_parts_forward_urls_as_text() {
        let parts = extract_parts(
            ResolvedDocument::FileUrl("https://example.com/a.pdf".into()),
            &ExtractOptions::default(),
        );
        assert_eq!(
            parts.last().unwrap(),
            &Part::text("file_url", "https://example.com/a.pdf")
        );
    }

    #[test]
    fn classify_parts_lead_with_categories_json() {
        let cats = vec![Category::new("invoice"), Category::new("receipt")];
        let parts = classify_parts(attachment(), &cats).unwrap();
        assert_eq!(
            parts[0],
            Part::text("categories", r#"[{"name":"invoice"},{"name":"receipt"}]"#)
        );
        assert_eq!(parts[1].name(), "file");
    }

    #[test]
    fn batch_size_is_enforced() {
        assert!(check_batch_size(MAX_BATCH_DOCUMENTS).is_ok());
        let err = check_batch_size(MAX_BATCH_DOCUMENTS + 1).unwrap_err();
        assert!(matches!(
            err,
            NanonetsError::BatchTooLarge { count: 51, max: 50 }
        ));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ok", 300), "ok");
    }

    #[test]
    fn endpoint_joins_base_and_path() {
        let client = NanonetsClient::new(
            ClientConfig::builder()
                .api_key("k")
                .base_url("https://example.com")
                .build()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("/api/v1/extract/sync"),
            "https://example.com/api/v1/extract/sync"
        );
    }
}
