//! Result types returned by the visualisation entry points.

use crate::config::DiagramKind;
use crate::pipeline::extract::PageContent;
use crate::pipeline::layout::DiagramComplexity;
use crate::pipeline::normalize::NormalizedUrl;
use serde::{Deserialize, Serialize};

/// Cleaned Mermaid code plus its sizing analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub kind: DiagramKind,
    /// Mermaid source, starting with the kind's header line.
    pub code: String,
    pub complexity: DiagramComplexity,
}

/// Timing and token accounting for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Fetch plus text extraction.
    pub fetch_duration_ms: u64,
    pub summary_duration_ms: u64,
    /// Zero when no diagram was requested.
    pub diagram_duration_ms: u64,
    pub total_duration_ms: u64,
    /// Prompt tokens summed over every AI call.
    pub total_input_tokens: u64,
    /// Completion tokens summed over every AI call.
    pub total_output_tokens: u64,
}

/// Everything produced for one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationOutput {
    pub url: NormalizedUrl,
    pub content: PageContent,
    pub summary: String,
    /// `None` when the run was configured without a diagram.
    pub diagram: Option<Diagram>,
    pub stats: RunStats,
}

impl VisualizationOutput {
    /// Page title when the document had one, otherwise the URL.
    pub fn display_title(&self) -> &str {
        self.content.title.as_deref().unwrap_or(self.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::normalize_url;

    fn output(title: Option<&str>) -> VisualizationOutput {
        let url = normalize_url("example.com/a").unwrap();
        VisualizationOutput {
            url: url.clone(),
            content: PageContent {
                url,
                title: title.map(str::to_string),
                text: "text".into(),
            },
            summary: "A summary.".into(),
            diagram: None,
            stats: RunStats::default(),
        }
    }

    #[test]
    fn display_title_prefers_page_title() {
        assert_eq!(output(Some("Rust")).display_title(), "Rust");
        assert_eq!(output(None).display_title(), "https://example.com/a");
    }

    #[test]
    fn serializes_url_as_plain_string() {
        let json = serde_json::to_value(output(None)).unwrap();
        assert_eq!(json["url"], "https://example.com/a");
        assert!(json["diagram"].is_null());
        assert_eq!(json["stats"]["total_input_tokens"], 0);
    }
}
