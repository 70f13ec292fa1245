//! CLI binary for nanonets-ocr.
//!
//! A thin shim over the library crate that maps CLI flags to client calls
//! and prints the API's JSON responses.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use nanonets_ocr::{
    document, Category, ClientConfig, DocumentSource, ExtractOptions, ListOptions,
    NanonetsClient, OutputFormat, PromptMode, SortOrder,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nanonets-ocr",
    version,
    about = "Extract, classify, and chat with documents via the Nanonets API",
    after_help = "Examples:\n  \
        nanonets-ocr extract invoice.pdf\n  \
        nanonets-ocr extract https://example.com/doc.pdf --output-format json\n  \
        nanonets-ocr batch scans/*.pdf --queue\n  \
        nanonets-ocr classify letter.png -c invoice -c receipt:\"store receipts\"\n  \
        nanonets-ocr chat \"What is the total?\" --document invoice.pdf\n  \
        nanonets-ocr result rec_abc123\n  \
        nanonets-ocr list --page 2"
)]
struct Cli {
    /// API key. Falls back to the NANONETS_API_KEY environment variable.
    #[arg(long, env = "NANONETS_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Override the API host (proxies, test servers).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 120, global = true)]
    timeout: u64,

    /// Verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract data from a document (local path or URL)
    Extract(ExtractArgs),
    /// Extract from many documents in one batch request (max 50)
    Batch(BatchArgs),
    /// Classify a document into categories
    Classify(ClassifyArgs),
    /// Ask a question about a document
    Chat(ChatArgs),
    /// Fetch an extraction result by record ID
    Result { record_id: String },
    /// List recent extraction results
    List(ListArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Local file path or HTTP(S) URL
    input: String,

    #[command(flatten)]
    options: ExtractOptionArgs,

    /// Queue for asynchronous extraction instead of waiting
    #[arg(long)]
    queue: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// Local file paths, or HTTP(S) URLs (all inputs must be one or the other)
    inputs: Vec<String>,

    #[command(flatten)]
    options: ExtractOptionArgs,
}

#[derive(Args)]
struct ExtractOptionArgs {
    /// Format for extracted content
    #[arg(long, value_enum, default_value_t = OutputFormatArg::Markdown)]
    output_format: OutputFormatArg,

    /// For JSON output: field list, e.g. '["invoice_number", "total"]'
    #[arg(long)]
    json_options: Option<String>,

    /// For CSV output: options such as "table"
    #[arg(long)]
    csv_options: Option<String>,

    /// How custom instructions combine with the built-in prompt
    #[arg(long, value_enum)]
    prompt_mode: Option<PromptModeArg>,

    /// Custom extraction instructions
    #[arg(long)]
    instructions: Option<String>,

    /// Include coordinate data per extracted value
    #[arg(long)]
    bounding_boxes: bool,

    /// Include a confidence score per extracted value
    #[arg(long)]
    confidence: bool,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Local file path or HTTP(S) URL
    input: String,

    /// Category as NAME or NAME:DESCRIPTION. Repeatable.
    #[arg(short, long = "category", required = true)]
    categories: Vec<String>,
}

#[derive(Args)]
struct ChatArgs {
    /// The question to ask
    message: String,

    /// Document to ground the answer in (local path or URL)
    #[arg(long)]
    document: Option<String>,

    /// Model override
    #[arg(long)]
    model: Option<String>,

    /// Print the raw JSON response instead of just the answer text
    #[arg(long)]
    raw: bool,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 10)]
    page_size: u32,

    /// Oldest first instead of newest first
    #[arg(long)]
    asc: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    Markdown,
    Json,
    Csv,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(v: OutputFormatArg) -> Self {
        match v {
            OutputFormatArg::Markdown => OutputFormat::Markdown,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PromptModeArg {
    Append,
    Replace,
}

impl From<PromptModeArg> for PromptMode {
    fn from(v: PromptModeArg) -> Self {
        match v {
            PromptModeArg::Append => PromptMode::Append,
            PromptModeArg::Replace => PromptMode::Replace,
        }
    }
}

impl ExtractOptionArgs {
    fn into_options(self) -> ExtractOptions {
        ExtractOptions {
            output_format: self.output_format.into(),
            json_options: self.json_options,
            csv_options: self.csv_options,
            prompt_mode: self.prompt_mode.map(Into::into),
            custom_instructions: self.instructions,
            include_bounding_boxes: self.bounding_boxes,
            include_confidence_score: self.confidence,
        }
    }
}

/// A path stays a path, anything URL-shaped becomes a URL source.
fn source_for(input: &str) -> DocumentSource {
    if document::is_url(input) {
        DocumentSource::url(input)
    } else {
        DocumentSource::path(PathBuf::from(input))
    }
}

/// Parse NAME or NAME:DESCRIPTION.
fn parse_category(raw: &str) -> Result<Category> {
    match raw.split_once(':') {
        Some((name, desc)) if !name.is_empty() => {
            Ok(Category::with_description(name.trim(), desc.trim()))
        }
        None if !raw.is_empty() => Ok(Category::new(raw.trim())),
        _ => bail!("invalid category '{raw}': expected NAME or NAME:DESCRIPTION"),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("serialising response")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("nanonets_ocr=debug"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut builder = ClientConfig::builder().timeout_secs(cli.timeout);
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Command::Chat(ChatArgs {
        model: Some(ref model),
        ..
    }) = cli.command
    {
        builder = builder.chat_model(model.clone());
    }
    let config = builder.build()?;
    let client = NanonetsClient::new(config)?;

    match cli.command {
        Command::Extract(args) => {
            let source = source_for(&args.input);
            let options = args.options.into_options();
            let record = if args.queue {
                client.extract_async(source, &options).await?
            } else {
                client.extract(source, &options).await?
            };
            print_json(&record)?;
        }

        Command::Batch(args) => {
            if args.inputs.is_empty() {
                bail!("batch requires at least one input");
            }
            let options = args.options.into_options();
            let all_urls = args.inputs.iter().all(|i| document::is_url(i));
            let any_urls = args.inputs.iter().any(|i| document::is_url(i));
            let record = if all_urls {
                client.extract_batch_urls(&args.inputs, &options).await?
            } else if any_urls {
                bail!("batch inputs must be all URLs or all local files");
            } else {
                let sources = args.inputs.iter().map(|i| source_for(i)).collect();
                client.extract_batch(sources, &options).await?
            };
            print_json(&record)?;
        }

        Command::Classify(args) => {
            let categories: Vec<Category> = args
                .categories
                .iter()
                .map(|c| parse_category(c))
                .collect::<Result<_>>()?;
            let record = client.classify(source_for(&args.input), &categories).await?;
            print_json(&record)?;
        }

        Command::Chat(args) => {
            let source = args.document.as_deref().map(source_for);
            let response = client.ask(args.message, source).await?;
            if args.raw {
                print_json(&response)?;
            } else {
                match response.content() {
                    Some(text) => println!("{text}"),
                    None => bail!("API returned no completion content"),
                }
            }
        }

        Command::Result { record_id } => {
            let record = client.get_result(&record_id).await?;
            print_json(&record)?;
        }

        Command::List(args) => {
            let options = ListOptions {
                page: args.page,
                page_size: args.page_size,
                sort_order: if args.asc {
                    SortOrder::Asc
                } else {
                    SortOrder::Desc
                },
            };
            let page = client.list_results(&options).await?;
            print_json(&page)?;
        }
    }

    Ok(())
}
