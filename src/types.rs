//! Request and response models.
//!
//! Request-side types serialize to exactly the field names and shapes the
//! extraction API expects. Response-side types are deliberately lenient:
//! the API adds fields between versions, so every model keeps unknown keys
//! in a flattened `extra` map instead of rejecting them. Callers that need
//! the raw payload can re-serialize the model and get the original JSON
//! back.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::multipart::Part;

// ── Extraction ───────────────────────────────────────────────────────────

/// Format of the extracted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Document structure rendered as Markdown. (default)
    #[default]
    Markdown,
    /// Structured fields as JSON; steer with [`ExtractOptions::json_options`].
    Json,
    /// Tabular output; steer with [`ExtractOptions::csv_options`].
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// How custom instructions combine with the API's built-in prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Instructions are appended to the built-in prompt. (default)
    #[default]
    Append,
    /// Instructions replace the built-in prompt entirely.
    Replace,
}

impl PromptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptMode::Append => "append",
            PromptMode::Replace => "replace",
        }
    }
}

/// Knobs for extract operations (sync, async, and batch).
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub output_format: OutputFormat,
    /// For JSON output: a field list, e.g. `["invoice_number", "total"]`.
    pub json_options: Option<String>,
    /// For CSV output: options such as `"table"`.
    pub csv_options: Option<String>,
    pub prompt_mode: Option<PromptMode>,
    pub custom_instructions: Option<String>,
    /// Ask the API to include coordinate data per extracted value.
    pub include_bounding_boxes: bool,
    /// Ask the API to include a confidence score per extracted value.
    pub include_confidence_score: bool,
}

impl ExtractOptions {
    /// The `include_metadata` field value: requested flags joined with
    /// commas, or `None` when nothing was requested.
    pub fn metadata_flags(&self) -> Option<String> {
        let mut flags: Vec<&str> = Vec::new();
        if self.include_bounding_boxes {
            flags.push("bounding_boxes");
        }
        if self.include_confidence_score {
            flags.push("confidence_score");
        }
        if flags.is_empty() {
            None
        } else {
            Some(flags.join(","))
        }
    }

    /// Render the options as form parts, in the order the API documents
    /// them. Unset optionals are omitted entirely, never sent empty.
    pub fn form_parts(&self) -> Vec<Part> {
        let mut parts = vec![Part::text("output_format", self.output_format.as_str())];
        if let Some(ref v) = self.json_options {
            parts.push(Part::text("json_options", v.clone()));
        }
        if let Some(ref v) = self.csv_options {
            parts.push(Part::text("csv_options", v.clone()));
        }
        if let Some(mode) = self.prompt_mode {
            parts.push(Part::text("prompt_mode", mode.as_str()));
        }
        if let Some(ref v) = self.custom_instructions {
            parts.push(Part::text("custom_instructions", v.clone()));
        }
        if let Some(flags) = self.metadata_flags() {
            parts.push(Part::text("include_metadata", flags));
        }
        parts
    }
}

/// One record returned by extract/get/list operations.
///
/// `record_id` and `status` are the handles callers poll with; everything
/// else the API sends rides along in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A page of extraction results from the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsPage {
    #[serde(default)]
    pub results: Vec<ExtractionRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Listing ──────────────────────────────────────────────────────────────

/// Sort order for listed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first. (default)
    #[default]
    Desc,
    Asc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Desc => "desc",
            SortOrder::Asc => "asc",
        }
    }
}

/// Pagination options for [`crate::NanonetsClient::list_results`].
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// 1-indexed page number. Default: 1.
    pub page: u32,
    /// Records per page. Default: 10.
    pub page_size: u32,
    pub sort_order: SortOrder,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            sort_order: SortOrder::default(),
        }
    }
}

impl ListOptions {
    /// Render as query pairs for the list endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
            ("sort_order", self.sort_order.as_str().to_string()),
        ]
    }
}

// ── Classification ───────────────────────────────────────────────────────

/// A category documents may be classified into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
        }
    }
}

// ── Chat ─────────────────────────────────────────────────────────────────

/// OpenAI-compatible chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// One message in a chat conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    /// A user message from an ordered list of content parts.
    pub fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// One piece of user content: text, a document URL, or inline document
/// bytes as a data URI.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "file_url")]
    FileUrl { file_url: UrlRef },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: UrlRef },
}

/// URL wrapper object used by `file_url` and `image_url` parts.
#[derive(Debug, Clone, Serialize)]
pub struct UrlRef {
    pub url: String,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn file_url(url: impl Into<String>) -> Self {
        ContentPart::FileUrl {
            file_url: UrlRef { url: url.into() },
        }
    }

    /// Inline document bytes as a `data:` URI image part.
    pub fn inline_document(content_type: &str, data: &[u8]) -> Self {
        ContentPart::ImageUrl {
            image_url: UrlRef {
                url: format!("data:{};base64,{}", content_type, STANDARD.encode(data)),
            },
        }
    }
}

/// OpenAI-compatible chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatUsage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatResponse {
    /// The first choice's message text, if the API returned one.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// One completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatResponseMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// The assistant message inside a choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Token accounting, when the API reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}
