//! Configuration types for web-page visualisation.
//!
//! All pipeline behaviour is controlled through [`MapperConfig`], built via
//! its [`MapperConfigBuilder`]. One struct holds every knob: fetch limits,
//! text budgets sent to the model, sampling parameters for each AI task and
//! the provider selection.

use crate::error::MapperError;
use crate::pipeline::llm::TextGenerator;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// User-Agent sent with every page fetch unless overridden.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) neuromind-mapper";

/// Configuration for a URL → summary + diagram run.
///
/// Built via [`MapperConfig::builder()`] or using [`MapperConfig::default()`].
///
/// # Example
/// ```rust
/// use neuromind_mapper::{DiagramKind, MapperConfig};
///
/// let config = MapperConfig::builder()
///     .diagram_kind(DiagramKind::Flowchart)
///     .fetch_timeout_secs(15)
///     .model("claude-sonnet-4-20250514")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct MapperConfig {
    /// Timeout for the single page GET, in seconds. Default: 10.
    pub fetch_timeout_secs: u64,

    /// User-Agent header for the page GET.
    ///
    /// Many sites reject the default `reqwest` agent outright, so a
    /// browser-like string is sent.
    pub user_agent: String,

    /// Minimum number of extracted characters for a page to count as
    /// having content. Default: 50.
    ///
    /// Pages below this are almost always JavaScript shells, cookie walls or
    /// error stubs; summarising them only produces hallucinated output.
    pub min_content_chars: usize,

    /// Characters of page text sent to the summary prompt. Default: 4000.
    pub max_summary_input_chars: usize,

    /// Characters of page text sent to the diagram prompt. Default: 2000.
    ///
    /// Diagram prompts carry long syntax instructions of their own, and a
    /// mind map only has room for a handful of branches anyway.
    pub max_diagram_input_chars: usize,

    /// Which diagram to produce. Default: [`DiagramKind::Mindmap`].
    pub diagram_kind: DiagramKind,

    /// Generate a diagram after the summary. Default: true.
    pub with_diagram: bool,

    /// Sampling temperature for the summary. Default: 0.3.
    pub summary_temperature: f32,

    /// Output-token cap for the summary. Default: 1000.
    pub summary_max_tokens: usize,

    /// Sampling temperature for diagram code. Default: 0.2.
    ///
    /// Kept lower than the summary: Mermaid is unforgiving and creative
    /// indentation breaks the render.
    pub diagram_temperature: f32,

    /// Output-token cap for diagram code. Default: 1500.
    pub diagram_max_tokens: usize,

    /// Retries per AI call on failure. Default: 0 (no automatic retry).
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// LLM model identifier, e.g. "claude-sonnet-4-20250514", "gpt-4.1-mini".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "anthropic", "openai", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed generator. Takes precedence over `provider_name`.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Stage-level progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_content_chars: 50,
            max_summary_input_chars: 4000,
            max_diagram_input_chars: 2000,
            diagram_kind: DiagramKind::default(),
            with_diagram: true,
            summary_temperature: 0.3,
            summary_max_tokens: 1000,
            diagram_temperature: 0.2,
            diagram_max_tokens: 1500,
            max_retries: 0,
            retry_backoff_ms: 500,
            model: None,
            provider_name: None,
            generator: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for MapperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperConfig")
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("min_content_chars", &self.min_content_chars)
            .field("max_summary_input_chars", &self.max_summary_input_chars)
            .field("max_diagram_input_chars", &self.max_diagram_input_chars)
            .field("diagram_kind", &self.diagram_kind)
            .field("with_diagram", &self.with_diagram)
            .field("summary_temperature", &self.summary_temperature)
            .field("diagram_temperature", &self.diagram_temperature)
            .field("max_retries", &self.max_retries)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("generator", &self.generator.as_ref().map(|_| "<dyn TextGenerator>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl MapperConfig {
    /// Create a new builder for `MapperConfig`.
    pub fn builder() -> MapperConfigBuilder {
        MapperConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`MapperConfig`].
#[derive(Debug)]
pub struct MapperConfigBuilder {
    config: MapperConfig,
}

impl MapperConfigBuilder {
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn min_content_chars(mut self, n: usize) -> Self {
        self.config.min_content_chars = n;
        self
    }

    pub fn max_summary_input_chars(mut self, n: usize) -> Self {
        self.config.max_summary_input_chars = n.max(1);
        self
    }

    pub fn max_diagram_input_chars(mut self, n: usize) -> Self {
        self.config.max_diagram_input_chars = n.max(1);
        self
    }

    pub fn diagram_kind(mut self, kind: DiagramKind) -> Self {
        self.config.diagram_kind = kind;
        self
    }

    pub fn with_diagram(mut self, enabled: bool) -> Self {
        self.config.with_diagram = enabled;
        self
    }

    pub fn summary_temperature(mut self, t: f32) -> Self {
        self.config.summary_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn summary_max_tokens(mut self, n: usize) -> Self {
        self.config.summary_max_tokens = n;
        self
    }

    pub fn diagram_temperature(mut self, t: f32) -> Self {
        self.config.diagram_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn diagram_max_tokens(mut self, n: usize) -> Self {
        self.config.diagram_max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MapperConfig, MapperError> {
        let c = &self.config;
        if c.fetch_timeout_secs == 0 {
            return Err(MapperError::InvalidConfig(
                "Fetch timeout must be ≥ 1 second".into(),
            ));
        }
        if c.user_agent.trim().is_empty() {
            return Err(MapperError::InvalidConfig(
                "User-Agent must not be empty".into(),
            ));
        }
        if reqwest::header::HeaderValue::from_str(&c.user_agent).is_err() {
            return Err(MapperError::InvalidConfig(format!(
                "User-Agent {:?} is not a valid HTTP header value",
                c.user_agent
            )));
        }
        if c.summary_max_tokens == 0 || c.diagram_max_tokens == 0 {
            return Err(MapperError::InvalidConfig(
                "Max tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The Mermaid diagram family to generate.
///
/// | Kind | Best for |
/// |------|----------|
/// | Mindmap | Concepts and hierarchical topics (default) |
/// | Flowchart | Processes, decisions, step-by-step guides |
/// | Timeline | Historical sequences, project phases |
/// | Network | Related concepts without a single hierarchy |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    #[default]
    Mindmap,
    Flowchart,
    Timeline,
    Network,
}

impl DiagramKind {
    /// All kinds, in menu order.
    pub const ALL: [DiagramKind; 4] = [
        DiagramKind::Mindmap,
        DiagramKind::Flowchart,
        DiagramKind::Timeline,
        DiagramKind::Network,
    ];

    /// Lower-case identifier used on the command line and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Mindmap => "mindmap",
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::Timeline => "timeline",
            DiagramKind::Network => "network",
        }
    }

    /// The Mermaid declaration the diagram code must start with.
    pub fn mermaid_header(&self) -> &'static str {
        match self {
            DiagramKind::Mindmap => "mindmap",
            DiagramKind::Flowchart => "flowchart TD",
            DiagramKind::Timeline => "timeline",
            DiagramKind::Network => "graph TD",
        }
    }

    /// Human-readable title, e.g. for headings.
    pub fn title(&self) -> &'static str {
        match self {
            DiagramKind::Mindmap => "Mind Map",
            DiagramKind::Flowchart => "Flowchart",
            DiagramKind::Timeline => "Timeline",
            DiagramKind::Network => "Network",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramKind {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mindmap" | "mind-map" | "mind_map" => Ok(DiagramKind::Mindmap),
            "flowchart" | "flow" => Ok(DiagramKind::Flowchart),
            "timeline" => Ok(DiagramKind::Timeline),
            "network" | "graph" => Ok(DiagramKind::Network),
            other => Err(MapperError::InvalidConfig(format!(
                "Unknown diagram kind '{other}' (expected mindmap, flowchart, timeline or network)"
            ))),
        }
    }
}
