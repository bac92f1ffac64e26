//! CLI binary for neuromind-mapper.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `MapperConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use neuromind_mapper::{
    extract, render_markdown, visualize, write_report, DiagramKind, MapperConfig, MapperError,
    PipelineProgressCallback, ProgressCallback, Stage,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one spinner whose message follows the current stage,
/// plus a log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

fn stage_unit(stage: Stage) -> &'static str {
    match stage {
        Stage::Fetch => "bytes",
        _ => "chars",
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_pipeline_start(&self, url: &str) {
        self.bar
            .println(format!("{} {}", cyan("◆"), bold(&format!("Reading {url}"))));
    }

    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.label());
        self.bar.set_message("…");
    }

    fn on_stage_complete(&self, stage: Stage, output_len: usize, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<16}  {:<14}  {}",
            green("✓"),
            stage.label(),
            dim(&format!("{output_len:>6} {}", stage_unit(stage))),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        // Keep the log line to one row; the full error is printed on exit.
        let first_line = error.lines().next().unwrap_or(error);
        let msg = match first_line.char_indices().nth(80) {
            Some((idx, _)) => format!("{}\u{2026}", &first_line[..idx]),
            None => first_line.to_string(),
        };
        self.bar
            .println(format!("  {} {:<16}  {}", red("✗"), stage.label(), red(&msg)));
    }

    fn on_pipeline_complete(&self, success: bool) {
        self.bar.finish_and_clear();
        if success {
            eprintln!("{} {}", green("✔"), bold("Done"));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summary + mind map as Markdown on stdout
  neuromind medium.com/some-article

  # Flowchart, written as a standalone HTML page
  neuromind --diagram flowchart docs.rs/tokio -o tokio.html

  # Just check whether a site can be read (no API key needed)
  neuromind --extract-only www.rust-lang.org

  # Summary only, as JSON
  neuromind --summary-only --json example.com > out.json

  # Pick provider and model explicitly
  neuromind --provider openai --model gpt-4.1-mini example.com

DIAGRAM KINDS:
  mindmap     Concepts and hierarchical topics (default)
  flowchart   Processes, decisions, step-by-step guides
  timeline    Historical sequences, project phases
  network     Related concepts without a single hierarchy

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY       Anthropic API key (preferred when set)
  OPENAI_API_KEY          OpenAI API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (anthropic, openai, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  NEUROMIND_*             Any flag, e.g. NEUROMIND_DIAGRAM=timeline

  Variables in a .env file in the working directory are loaded at startup.
"#;

/// Turn a web article into a summary and a Mermaid diagram.
#[derive(Parser, Debug)]
#[command(
    name = "neuromind",
    version,
    about = "Turn a web article into a plain-language summary and a Mermaid diagram",
    long_about = "Fetch a web page, extract its readable text and ask an LLM for a structured \
summary plus a Mermaid diagram (mind map, flowchart, timeline or concept network). Supports \
Anthropic, OpenAI, Google Gemini and any OpenAI-compatible endpoint through edgequake-llm.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Website address, e.g. google.com or https://example.com/article.
    url: String,

    /// Write the report to this file (.html for a web page, anything else for Markdown).
    #[arg(short, long, env = "NEUROMIND_OUTPUT")]
    output: Option<PathBuf>,

    /// Diagram kind to generate.
    #[arg(long, env = "NEUROMIND_DIAGRAM", value_enum, default_value = "mindmap")]
    diagram: DiagramArg,

    /// Print the extracted page text only; no AI calls.
    #[arg(long, env = "NEUROMIND_EXTRACT_ONLY", conflicts_with = "summary_only")]
    extract_only: bool,

    /// Generate the summary but no diagram.
    #[arg(long, env = "NEUROMIND_SUMMARY_ONLY")]
    summary_only: bool,

    /// LLM model ID (e.g. claude-sonnet-4-20250514, gpt-4.1-mini).
    #[arg(long, env = "NEUROMIND_MODEL")]
    model: Option<String>,

    /// LLM provider: anthropic, openai, gemini, ollama, azure.
    #[arg(
        long,
        env = "NEUROMIND_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set \
          (ANTHROPIC_API_KEY first).\nSupported: anthropic, openai, gemini, azure, ollama."
    )]
    provider: Option<String>,

    /// Page fetch timeout in seconds.
    #[arg(long, env = "NEUROMIND_FETCH_TIMEOUT", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    fetch_timeout: u64,

    /// Minimum characters of extracted text for a page to count as readable.
    #[arg(long, env = "NEUROMIND_MIN_CHARS", default_value_t = 50)]
    min_chars: usize,

    /// Retries per AI call on failure.
    #[arg(long, env = "NEUROMIND_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// User-Agent header sent with the page request.
    #[arg(long, env = "NEUROMIND_USER_AGENT")]
    user_agent: Option<String>,

    /// Output structured JSON instead of Markdown.
    #[arg(long, env = "NEUROMIND_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "NEUROMIND_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NEUROMIND_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "NEUROMIND_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum DiagramArg {
    Mindmap,
    Flowchart,
    Timeline,
    Network,
}

impl From<DiagramArg> for DiagramKind {
    fn from(v: DiagramArg) -> Self {
        match v {
            DiagramArg::Mindmap => DiagramKind::Mindmap,
            DiagramArg::Flowchart => DiagramKind::Flowchart,
            DiagramArg::Timeline => DiagramKind::Timeline,
            DiagramArg::Network => DiagramKind::Network,
        }
    }
}

#[tokio::main]
async fn main() {
    // .env first so its values are visible to clap's `env` lookups.
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{} {:#}", red("✘"), err);
        if let Some(hint) = err.downcast_ref::<MapperError>().and_then(|e| e.user_hint()) {
            eprintln!("  {}", dim(hint));
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO-level library logs when it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn PipelineProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let content = extract(&cli.url, &config).await?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&content).context("Failed to serialise content")?
            );
        } else {
            if let Some(ref title) = content.title {
                println!("{}\n", bold(title));
            }
            println!("{}", content.text);
        }
        if !cli.quiet && !cli.json {
            eprintln!("{}", dim(&format!("{} chars from {}", content.char_count(), content.url)));
        }
        return Ok(());
    }

    // ── Full run ─────────────────────────────────────────────────────────
    let output = visualize(&cli.url, &config).await?;

    if let Some(ref output_path) = cli.output {
        write_report(&output, output_path).await?;
        if !cli.quiet {
            eprintln!("{}  →  {}", green("✔"), bold(&output_path.display().to_string()));
        }
    } else if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let markdown = render_markdown(&output);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !markdown.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "   {} tokens in  /  {} tokens out  —  {}ms total",
            dim(&output.stats.total_input_tokens.to_string()),
            dim(&output.stats.total_output_tokens.to_string()),
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `MapperConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<MapperConfig> {
    let mut builder = MapperConfig::builder()
        .diagram_kind(cli.diagram.into())
        .with_diagram(!cli.summary_only)
        .fetch_timeout_secs(cli.fetch_timeout)
        .min_content_chars(cli.min_chars)
        .max_retries(cli.max_retries);

    if let Some(ref ua) = cli.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
