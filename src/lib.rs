//! # neuromind-mapper
//!
//! Turn any web article into a plain-language summary and a Mermaid diagram,
//! for learners who take in structure more easily than long prose.
//!
//! ## Pipeline Overview
//!
//! ```text
//! "medium.com/some-article"
//!  │
//!  ├─ 1. Normalise  add https:// when no scheme is given
//!  ├─ 2. Fetch      one GET, 10 s timeout, browser-like User-Agent
//!  ├─ 3. Extract    DOM walk, drop script/style/nav, collapse whitespace
//!  ├─ 4. Summarise  AI call, first 4000 chars of text
//!  ├─ 5. Diagram    AI call, first 2000 chars → mindmap / flowchart / timeline / network
//!  ├─ 6. Polish     strip fences, fix headers, repair mind map indentation
//!  └─ 7. Output     summary + Mermaid code + complexity-based sizing
//! ```
//!
//! Every run is independent: one URL in, one result or one error out, and
//! nothing is kept between calls.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neuromind_mapper::{visualize, MapperConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from ANTHROPIC_API_KEY / OPENAI_API_KEY / …
//!     let config = MapperConfig::default();
//!     let output = visualize("www.rust-lang.org", &config).await?;
//!     println!("{}", output.summary);
//!     if let Some(diagram) = &output.diagram {
//!         println!("{}", diagram.code);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Only need the text? [`extract`] stops after step 3 and needs no API key.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `neuromind` binary (clap + anyhow + tracing-subscriber + indicatif + dotenv) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! neuromind-mapper = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;
pub mod visualize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DiagramKind, MapperConfig, MapperConfigBuilder};
pub use error::{ErrorKind, MapperError};
pub use output::{Diagram, RunStats, VisualizationOutput};
pub use pipeline::extract::PageContent;
pub use pipeline::layout::DiagramComplexity;
pub use pipeline::llm::{GenerationRequest, Generated, LlmGenerator, TextGenerator};
pub use pipeline::normalize::{normalize_url, NormalizedUrl};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use render::{render_html, render_markdown};
pub use visualize::{
    extract, generate_diagram, summarize, visualize, visualize_sync, visualize_to_file,
    write_report,
};
