//! Top-level entry points: URL in, summary and diagram out.
//!
//! [`visualize`] runs the whole pipeline for one URL. [`extract`] stops
//! after text extraction and needs no API key, which makes it the quickest
//! way to check whether a site can be read at all. [`summarize`] and
//! [`generate_diagram`] expose the two AI steps on their own for callers
//! that already hold a [`PageContent`].

use crate::config::{DiagramKind, MapperConfig};
use crate::error::MapperError;
use crate::output::{Diagram, RunStats, VisualizationOutput};
use crate::pipeline::extract::{page_content_from_html, PageContent};
use crate::pipeline::fetch::{fetch_content, fetch_html};
use crate::pipeline::layout::analyze_complexity;
use crate::pipeline::llm::{self, LlmGenerator, TextGenerator};
use crate::pipeline::normalize::normalize_url;
use crate::pipeline::postprocess::clean_diagram;
use crate::progress::Stage;
use crate::render::{render_html, render_markdown};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Model used with the Anthropic provider when none is configured.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
/// Model used with any other named provider when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Turn a website address into a summary and a diagram.
///
/// Stages run strictly in order: normalise, fetch, extract, summarise,
/// then draw (unless `config.with_diagram` is off). Any failure aborts the
/// run; nothing is retained between calls.
///
/// # Errors
/// - [`MapperError::InvalidInput`] for empty input
/// - [`MapperError::FetchFailed`] / [`MapperError::FetchTimeout`] when the page cannot be loaded
/// - [`MapperError::EmptyContent`] when the page has no readable text
/// - [`MapperError::ProviderNotConfigured`] / [`MapperError::GenerationFailed`] from the AI calls
pub async fn visualize(
    raw: impl AsRef<str>,
    config: &MapperConfig,
) -> Result<VisualizationOutput, MapperError> {
    let result = run_pipeline(raw.as_ref(), config).await;
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_complete(result.is_ok());
    }
    result
}

async fn run_pipeline(raw: &str, config: &MapperConfig) -> Result<VisualizationOutput, MapperError> {
    let total_start = Instant::now();

    // ── Step 1: Normalise ────────────────────────────────────────────────
    let url = normalize_url(raw)?;
    info!("Visualising {}", url);
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_start(url.as_str());
    }

    // ── Step 2: Resolve the generator before any network work ────────────
    let generator = resolve_generator(config)?;

    // ── Step 3: Fetch + extract ──────────────────────────────────────────
    let fetch_start = Instant::now();
    let html = tracked(config, Stage::Fetch, fetch_html(&url, config), |h| h.len()).await?;
    let content = tracked(
        config,
        Stage::Extract,
        async { page_content_from_html(&url, &html, config.min_content_chars) },
        |c| c.char_count(),
    )
    .await?;
    drop(html);
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

    // ── Step 4: Summary ──────────────────────────────────────────────────
    let summary = tracked(
        config,
        Stage::Summarize,
        llm::summarize(&generator, &content, config),
        |g| g.content.len(),
    )
    .await?;

    let mut stats = RunStats {
        fetch_duration_ms,
        summary_duration_ms: summary.duration_ms,
        total_input_tokens: summary.input_tokens as u64,
        total_output_tokens: summary.output_tokens as u64,
        ..Default::default()
    };

    // ── Step 5: Diagram ──────────────────────────────────────────────────
    let diagram = if config.with_diagram {
        let kind = config.diagram_kind;
        let generated = tracked(
            config,
            Stage::Diagram,
            llm::request_diagram(&generator, kind, &content, config),
            |g| g.content.len(),
        )
        .await?;
        stats.diagram_duration_ms = generated.duration_ms;
        stats.total_input_tokens += generated.input_tokens as u64;
        stats.total_output_tokens += generated.output_tokens as u64;
        Some(build_diagram(kind, &generated.content))
    } else {
        debug!("Diagram disabled, skipping");
        None
    };

    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Done: {} chars in, {} / {} tokens, {}ms total",
        content.char_count(),
        stats.total_input_tokens,
        stats.total_output_tokens,
        stats.total_duration_ms
    );

    Ok(VisualizationOutput {
        url,
        content,
        summary: summary.content,
        diagram,
        stats,
    })
}

/// Synchronous wrapper around [`visualize`].
///
/// Creates a temporary tokio runtime internally.
pub fn visualize_sync(
    raw: impl AsRef<str>,
    config: &MapperConfig,
) -> Result<VisualizationOutput, MapperError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MapperError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(visualize(raw, config))
}

/// Visualise a URL and write the report to `output_path`.
///
/// A `.html` / `.htm` extension selects the HTML page; anything else gets
/// Markdown. See [`write_report`].
pub async fn visualize_to_file(
    raw: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &MapperConfig,
) -> Result<RunStats, MapperError> {
    let output = visualize(raw, config).await?;
    write_report(&output, output_path).await?;
    Ok(output.stats)
}

/// Render `output` in the format implied by the path's extension and
/// write it atomically (temp file + rename).
pub async fn write_report(
    output: &VisualizationOutput,
    path: impl AsRef<Path>,
) -> Result<(), MapperError> {
    let path = path.as_ref();
    let body = if is_html_path(path) {
        render_html(output)
    } else {
        render_markdown(output)
    };

    let write_err = |e: std::io::Error| MapperError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);
    tokio::fs::write(tmp_path, body).await.map_err(write_err)?;
    tokio::fs::rename(tmp_path, path).await.map_err(write_err)?;

    info!("Wrote {}", path.display());
    Ok(())
}

fn is_html_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// Fetch a page and return its readable text.
///
/// Does not require an LLM provider or API key. Fetch and extraction are
/// reported to the progress callback as a single [`Stage::Fetch`], framed by
/// the usual pipeline start and completion events.
pub async fn extract(raw: impl AsRef<str>, config: &MapperConfig) -> Result<PageContent, MapperError> {
    let url = normalize_url(raw.as_ref())?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_start(url.as_str());
    }

    let result = tracked(config, Stage::Fetch, fetch_content(&url, config), |c| c.char_count()).await;

    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_complete(result.is_ok());
    }
    result
}

/// Summarise already-extracted page text.
pub async fn summarize(
    generator: &Arc<dyn TextGenerator>,
    content: &PageContent,
    config: &MapperConfig,
) -> Result<String, MapperError> {
    llm::summarize(generator, content, config)
        .await
        .map(|g| g.content)
}

/// Generate, clean and size a diagram for already-extracted page text.
pub async fn generate_diagram(
    generator: &Arc<dyn TextGenerator>,
    kind: DiagramKind,
    content: &PageContent,
    config: &MapperConfig,
) -> Result<Diagram, MapperError> {
    let generated = llm::request_diagram(generator, kind, content, config).await?;
    Ok(build_diagram(kind, &generated.content))
}

/// Clean raw model output and attach its complexity analysis.
pub fn build_diagram(kind: DiagramKind, raw: &str) -> Diagram {
    let code = clean_diagram(kind, raw);
    let complexity = analyze_complexity(kind, &code);
    debug!(
        "{} diagram: {} nodes, score {}, height {}px",
        kind, complexity.node_count, complexity.score, complexity.recommended_height
    );
    Diagram {
        kind,
        code,
        complexity,
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run one stage, reporting start, completion and failure to the progress
/// callback. `size` measures the stage's output for `on_stage_complete`.
async fn tracked<T, F>(
    config: &MapperConfig,
    stage: Stage,
    fut: F,
    size: impl FnOnce(&T) -> usize,
) -> Result<T, MapperError>
where
    F: std::future::Future<Output = Result<T, MapperError>>,
{
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    let result = fut.await;
    if let Some(cb) = cb {
        match &result {
            Ok(value) => cb.on_stage_complete(stage, size(value), start.elapsed().as_millis() as u64),
            Err(e) => cb.on_stage_error(stage, &e.to_string()),
        }
    }
    result
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, MapperError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        MapperError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the text generator, from most-specific to least-specific.
///
/// 1. **Pre-built generator** (`config.generator`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`), built with
///    [`ProviderFactory::create_llm_provider`], which reads the provider's
///    API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    honoured only when both are set.
/// 4. **`ANTHROPIC_API_KEY`** selects Anthropic, the service the tool was
///    designed around.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_generator(config: &MapperConfig) -> Result<Arc<dyn TextGenerator>, MapperError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }

    let provider = if let Some(ref name) = config.provider_name {
        let default_model = if name.eq_ignore_ascii_case("anthropic") {
            DEFAULT_ANTHROPIC_MODEL
        } else {
            DEFAULT_MODEL
        };
        create_provider(name, config.model.as_deref().unwrap_or(default_model))?
    } else if let (Some(prov), Some(model)) = (
        non_empty_env("EDGEQUAKE_LLM_PROVIDER"),
        non_empty_env("EDGEQUAKE_MODEL"),
    ) {
        create_provider(&prov, &model)?
    } else if non_empty_env("ANTHROPIC_API_KEY").is_some() {
        let model = config.model.as_deref().unwrap_or(DEFAULT_ANTHROPIC_MODEL);
        create_provider("anthropic", model)?
    } else {
        let (llm_provider, _embedding) =
            ProviderFactory::from_env().map_err(|e| MapperError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                    Set ANTHROPIC_API_KEY or OPENAI_API_KEY, or pass --provider.\n\
                    Error: {}",
                    e
                ),
            })?;
        llm_provider
    };

    Ok(Arc::new(LlmGenerator::new(provider)))
}
