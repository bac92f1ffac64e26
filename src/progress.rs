//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::MapperConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves from fetching to summarising to drawing.
//! The CLI uses it to drive a spinner; a web front end could forward the
//! same events over a WebSocket.
//!
//! # Example
//!
//! ```rust
//! use neuromind_mapper::{MapperConfig, PipelineProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct PrintStages;
//!
//! impl PipelineProgressCallback for PrintStages {
//!     fn on_stage_start(&self, stage: Stage) {
//!         eprintln!("{}…", stage.label());
//!     }
//! }
//!
//! let config = MapperConfig::builder()
//!     .progress_callback(Arc::new(PrintStages))
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One step of the linear pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Extract,
    Summarize,
    Diagram,
}

impl Stage {
    /// Short present-tense label for progress displays.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Fetch => "Fetching page",
            Stage::Extract => "Extracting text",
            Stage::Summarize => "Writing summary",
            Stage::Diagram => "Drawing diagram",
        }
    }
}

/// Called by the pipeline as it moves through each [`Stage`].
///
/// All methods have no-op defaults so implementors override only what they
/// need. Stages run strictly one after another, but the trait is still
/// `Send + Sync` so a callback can be shared with other tasks.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once, after normalisation, with the URL about to be fetched.
    fn on_pipeline_start(&self, url: &str) {
        let _ = url;
    }

    /// Called before a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage succeeds.
    ///
    /// # Arguments
    /// * `stage`: the finished stage
    /// * `output_len`: size of what the stage produced (HTML bytes for
    ///   [`Stage::Fetch`], characters of text for [`Stage::Extract`],
    ///   reply length for the AI stages)
    /// * `elapsed_ms`: wall-clock duration of the stage
    fn on_stage_complete(&self, stage: Stage, output_len: usize, elapsed_ms: u64) {
        let _ = (stage, output_len, elapsed_ms);
    }

    /// Called when a stage fails; the pipeline stops afterwards.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once at the end, whether or not the run succeeded.
    fn on_pipeline_complete(&self, success: bool) {
        let _ = success;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::MapperConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl PipelineProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start:{stage:?}"));
        }

        fn on_stage_complete(&self, stage: Stage, _output_len: usize, _elapsed_ms: u64) {
            self.events.lock().unwrap().push(format!("done:{stage:?}"));
        }

        fn on_stage_error(&self, stage: Stage, _error: &str) {
            self.events.lock().unwrap().push(format!("error:{stage:?}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_pipeline_start("https://example.com");
        cb.on_stage_start(Stage::Fetch);
        cb.on_stage_complete(Stage::Fetch, 1024, 12);
        cb.on_stage_error(Stage::Extract, "empty");
        cb.on_pipeline_complete(false);
    }

    #[test]
    fn recorder_sees_events_in_order() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::Fetch);
        rec.on_stage_complete(Stage::Fetch, 10, 1);
        rec.on_stage_start(Stage::Extract);
        rec.on_stage_error(Stage::Extract, "no text");

        let events = rec.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["start:Fetch", "done:Fetch", "start:Extract", "error:Extract"]
        );
    }

    #[test]
    fn stage_labels_are_distinct() {
        let labels = [Stage::Fetch, Stage::Extract, Stage::Summarize, Stage::Diagram]
            .map(|s| s.label());
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
