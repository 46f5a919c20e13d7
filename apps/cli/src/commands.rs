//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use topiclens_core::ProgressReporter;
use topiclens_diagram::DiagramDispatcher;
use topiclens_shared::{
    AppConfig, ContentEdit, ContentRecord, DiagramRequest, RecordId, ResearchMode,
    ResearchRecord, init_config, load_config,
};

use crate::app::App;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// TopicLens — research a topic, write about it, draw it.
#[derive(Parser)]
#[command(
    name = "topiclens",
    version,
    about = "Research topics from the web, generate articles, and render diagrams.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print records as JSON instead of a summary.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Research a topic (served from storage when already known).
    Research {
        /// Topic to research.
        topic: String,

        /// Policy when no page survives extraction: permissive or strict.
        #[arg(short, long)]
        mode: Option<ResearchMode>,
    },

    /// Generate and manage articles.
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Generate diagrams from descriptions.
    Diagram {
        #[command(subcommand)]
        action: DiagramAction,
    },

    /// Start the HTTP API.
    Serve {
        /// Address to bind (defaults to `[server].bind`).
        #[arg(long)]
        bind: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Article subcommands.
#[derive(Subcommand)]
pub(crate) enum ContentAction {
    /// Generate an article for a topic.
    Generate { topic: String },
    /// Discard an article and generate the topic again.
    Regenerate { id: RecordId, topic: String },
    /// Replace an article's title, body, or summary.
    Edit {
        id: RecordId,
        #[arg(long)]
        title: Option<String>,
        /// File holding the new article body.
        #[arg(long)]
        body_file: Option<PathBuf>,
        #[arg(long)]
        summary: Option<String>,
    },
    /// Mark an article approved.
    Approve { id: RecordId },
    /// Show one article.
    Show { id: RecordId },
    /// List all articles, newest first.
    History,
}

/// Diagram subcommands.
#[derive(Subcommand)]
pub(crate) enum DiagramAction {
    /// Generate a diagram for a description.
    Generate {
        description: String,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
        /// blue, green, purple, or monochrome.
        #[arg(long, default_value = "blue")]
        color_scheme: String,
        /// Write SVG output to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List supported diagram types.
    Types,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "topiclens=info",
        1 => "topiclens=debug",
        _ => "topiclens=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Research { topic, mode } => cmd_research(&topic, mode, json).await,
        Command::Content { action } => cmd_content(action, json).await,
        Command::Diagram { action } => match action {
            DiagramAction::Generate {
                description,
                width,
                height,
                color_scheme,
                out,
            } => {
                let mut request = DiagramRequest::new(description);
                request.width = width;
                request.height = height;
                request.color_scheme = color_scheme;
                cmd_diagram_generate(request, out, json).await
            }
            DiagramAction::Types => cmd_diagram_types(),
        },
        Command::Serve { bind } => cmd_serve(bind).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_research(topic: &str, mode: Option<ResearchMode>, json: bool) -> Result<()> {
    let config = load_config()?;
    let app = App::from_config(&config, mode).await?;
    info!(topic, "researching topic");

    let reporter = CliProgress::new();
    let result = app.research.run(topic, &reporter).await;
    reporter.finish();

    print_research(&result?, json)
}

async fn cmd_content(action: ContentAction, json: bool) -> Result<()> {
    let config = load_config()?;
    let app = App::from_config(&config, None).await?;

    match action {
        ContentAction::Generate { topic } => {
            let reporter = CliProgress::new();
            let result = app.content.generate(&topic, &reporter).await;
            reporter.finish();
            print_content(&result?, json)
        }
        ContentAction::Regenerate { id, topic } => {
            let reporter = CliProgress::new();
            let result = app.content.regenerate(&id, &topic, &reporter).await;
            reporter.finish();
            print_content(&result?, json)
        }
        ContentAction::Edit {
            id,
            title,
            body_file,
            summary,
        } => {
            let current = app
                .content
                .get(&id)
                .await?
                .ok_or_else(|| eyre!("no content with id {id}"))?;
            let article_text = match body_file {
                Some(path) => std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?,
                None => current.article_text,
            };
            let edit = ContentEdit {
                title: title.unwrap_or(current.title),
                article_text,
                summary: summary.unwrap_or(current.summary),
            };
            let record = app
                .content
                .edit(&id, edit)
                .await?
                .ok_or_else(|| eyre!("no content with id {id}"))?;
            print_content(&record, json)
        }
        ContentAction::Approve { id } => {
            let record = app
                .content
                .approve(&id)
                .await?
                .ok_or_else(|| eyre!("no content with id {id}"))?;
            print_content(&record, json)
        }
        ContentAction::Show { id } => {
            let record = app
                .content
                .get(&id)
                .await?
                .ok_or_else(|| eyre!("no content with id {id}"))?;
            print_content(&record, json)
        }
        ContentAction::History => {
            let records = app.content.history().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            if records.is_empty() {
                println!("No content generated yet.");
            }
            for r in &records {
                println!(
                    "{}  {:<8}  {}  {}",
                    r.id,
                    r.status.as_str(),
                    r.updated_at.format("%Y-%m-%d %H:%M"),
                    r.title
                );
            }
            Ok(())
        }
    }
}

async fn cmd_diagram_generate(request: DiagramRequest, out: Option<PathBuf>, json: bool) -> Result<()> {
    let config = load_config()?;
    let dispatcher = DiagramDispatcher::from_config(&config.diagram)?;
    let response = dispatcher.dispatch(&request).await;

    if let (Some(path), Some(svg)) = (&out, &response.svg_content) {
        std::fs::write(path, svg).map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
        info!(path = %path.display(), "diagram written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!();
    println!("  Type:     {}", response.diagram_type);
    println!("  Provider: {}", response.provider);
    println!("  Format:   {}", response.format);
    if let Some(url) = &response.image_url {
        println!("  Image:    {url}");
    }
    match (&out, &response.svg_content) {
        (Some(path), Some(_)) => println!("  Saved:    {}", path.display()),
        (None, Some(svg)) => println!("  SVG:      {} bytes (use --out to save)", svg.len()),
        _ => {}
    }
    println!();
    Ok(())
}

fn cmd_diagram_types() -> Result<()> {
    for t in DiagramDispatcher::supported_types() {
        println!("{t}");
    }
    Ok(())
}

async fn cmd_serve(bind: Option<String>) -> Result<()> {
    let config = load_config()?;
    let app = App::from_config(&config, None).await?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    crate::server::serve(app, &bind).await
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {label}:");
    for item in items {
        println!("    - {item}");
    }
}

fn print_research(record: &ResearchRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }
    println!();
    println!("  {}", record.title);
    println!("  ID:      {}", record.id);
    println!("  Sources: {}", record.source_urls.len());
    println!();
    println!("  {}", record.summary);
    println!();
    print_list("Key points", &record.key_points);
    print_list("Diagram ideas", &record.diagram_ideas);
    print_list("Related topics", &record.related_topics);
    println!();
    Ok(())
}

fn print_content(record: &ContentRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }
    println!();
    println!("  {}", record.title);
    println!("  ID:      {}", record.id);
    println!("  Status:  {}", record.status.as_str());
    println!("  Sources: {}", record.source_urls.len());
    println!();
    println!("  {}", record.summary);
    println!();
    println!("{}", record.article_text);
    println!();
    print_list("Key insights", &record.key_insights);
    print_list("Diagram ideas", &record.diagram_ideas);
    print_list("Related topics", &record.related_topics);
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn pages_extracted(&self, kept: usize, total: usize) {
        self.spinner
            .set_message(format!("Kept {kept} of {total} pages"));
    }

    fn cache_hit(&self, topic: &str) {
        self.spinner
            .set_message(format!("Found stored result for '{topic}'"));
    }
}
