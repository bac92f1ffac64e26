//! Diagram complexity analysis for display sizing.
//!
//! The renderer needs a container height before Mermaid has laid anything
//! out. We estimate it from the code itself: how many nodes and edges it
//! has, how deep it nests, how much text each node carries, and which
//! diagram family it is. The result is a 0–100 score and a pixel height.

use crate::config::DiagramKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Height used for the simplest diagrams, in pixels.
pub const BASE_HEIGHT_PX: u32 = 1000;
/// Lower bound on height contributed by each node, in pixels.
pub const HEIGHT_PER_NODE_PX: u32 = 100;
/// Upper bound on the initial display height, in pixels.
pub const MAX_HEIGHT_PX: u32 = 2500;

/// Structural statistics and display sizing for one diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramComplexity {
    pub kind: DiagramKind,
    pub node_count: usize,
    pub edge_count: usize,
    pub max_depth: usize,
    /// Mean label length in characters.
    pub text_density: f64,
    /// Edges per node.
    pub branching_factor: f64,
    /// 0–100.
    pub score: u32,
    pub recommended_height: u32,
}

static RE_PAREN_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
static RE_FLOW_BOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]\d*)\[([^\]]+)\]").unwrap());
static RE_FLOW_DECISION: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]\d*)\{([^}]+)\}").unwrap());
static RE_TIMELINE_EVENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^:]+):\s*(.+)").unwrap());
static RE_NETWORK_NODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z])\[([^\]]+)\]").unwrap());
static RE_NETWORK_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"---|-->").unwrap());

/// Analyse cleaned diagram code of the given kind.
pub fn analyze_complexity(kind: DiagramKind, code: &str) -> DiagramComplexity {
    let mut nodes: HashSet<String> = HashSet::new();
    let mut edges = 0usize;
    let mut total_text = 0usize;
    let mut body_indent: Option<usize> = None;
    let mut max_depth = 0usize;

    // Skip the header line and Mermaid comments.
    for line in code.lines().skip(1) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        let base = *body_indent.get_or_insert(indent);
        max_depth = max_depth.max(indent.saturating_sub(base) / 2);

        match kind {
            DiagramKind::Mindmap => {
                if trimmed.starts_with("::icon(") {
                    continue;
                }
                for caps in RE_PAREN_LABEL.captures_iter(trimmed) {
                    total_text += caps[1].chars().count();
                    nodes.insert(caps[1].to_string());
                }
            }
            DiagramKind::Flowchart => {
                for caps in RE_FLOW_BOX
                    .captures_iter(trimmed)
                    .chain(RE_FLOW_DECISION.captures_iter(trimmed))
                {
                    total_text += caps[2].chars().count();
                    nodes.insert(caps[1].to_string());
                }
                edges += trimmed.matches("-->").count();
            }
            DiagramKind::Timeline => {
                if let Some(caps) = RE_TIMELINE_EVENT.captures(trimmed) {
                    total_text += caps[2].chars().count();
                    nodes.insert(caps[1].trim().to_string());
                }
            }
            DiagramKind::Network => {
                for caps in RE_NETWORK_NODE.captures_iter(trimmed) {
                    total_text += caps[2].chars().count();
                    nodes.insert(caps[1].to_string());
                }
                edges += RE_NETWORK_LINK.find_iter(trimmed).count();
            }
        }
    }

    let node_count = nodes.len();
    // A mind map is a tree: every node but the root hangs off one edge.
    if kind == DiagramKind::Mindmap {
        edges = node_count.saturating_sub(1);
    }

    let text_density = total_text as f64 / node_count.max(1) as f64;
    let branching_factor = if node_count > 0 {
        edges as f64 / node_count as f64
    } else {
        0.0
    };

    let score = complexity_score(kind, node_count, max_depth, text_density, branching_factor);
    let recommended_height = recommended_height(score, node_count);

    DiagramComplexity {
        kind,
        node_count,
        edge_count: edges,
        max_depth,
        text_density,
        branching_factor,
        score,
        recommended_height,
    }
}

fn complexity_score(
    kind: DiagramKind,
    node_count: usize,
    max_depth: usize,
    text_density: f64,
    branching_factor: f64,
) -> u32 {
    // Node count: 0–30
    let mut score = if node_count <= 5 {
        node_count as f64 * 3.0
    } else if node_count <= 15 {
        15.0 + (node_count - 5) as f64 * 1.5
    } else {
        30.0
    };

    // Depth: 0–25
    score += (max_depth as f64 * 5.0).min(25.0);

    // Label length: 0–20
    score += if text_density > 50.0 {
        20.0
    } else if text_density > 25.0 {
        15.0
    } else if text_density > 15.0 {
        10.0
    } else {
        text_density / 3.0
    };

    // Branching: 0–15
    score += (branching_factor * 10.0).min(15.0);

    // Family: 4–10
    score += match kind {
        DiagramKind::Mindmap => 5.0,
        DiagramKind::Flowchart => 8.0,
        DiagramKind::Timeline => 4.0,
        DiagramKind::Network => 10.0,
    };

    (score as u32).min(100)
}

fn recommended_height(score: u32, node_count: usize) -> u32 {
    let banded = match score {
        0..=20 => BASE_HEIGHT_PX,
        21..=40 => BASE_HEIGHT_PX + 400,
        41..=60 => BASE_HEIGHT_PX + 800,
        61..=80 => BASE_HEIGHT_PX + 1200,
        _ => BASE_HEIGHT_PX + 1600,
    };
    let per_node = (node_count as u32).saturating_mul(HEIGHT_PER_NODE_PX);
    banded.max(per_node).min(MAX_HEIGHT_PX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINDMAP: &str = "mindmap\n  root(Main Topic)\n    (Branch 1)\n      ::icon(fa fa-lightbulb)\n      (Sub A)\n    (Branch 2)\n      (Sub C)";

    #[test]
    fn mindmap_statistics() {
        let c = analyze_complexity(DiagramKind::Mindmap, MINDMAP);
        assert_eq!(c.node_count, 5);
        assert_eq!(c.edge_count, 4);
        assert_eq!(c.max_depth, 2);
        assert_eq!(c.score, 40);
        assert_eq!(c.recommended_height, 1400);
    }

    #[test]
    fn icon_lines_are_not_nodes() {
        let c = analyze_complexity(DiagramKind::Mindmap, "mindmap\n  root(R)\n    (B)\n      ::icon(fa fa-x)");
        assert_eq!(c.node_count, 2);
    }

    #[test]
    fn flowchart_counts_boxes_decisions_and_arrows() {
        let code = "flowchart TD\n    A[Start] --> B{Ok?}\n    B -->|Yes| C[Done]";
        let c = analyze_complexity(DiagramKind::Flowchart, code);
        assert_eq!(c.node_count, 3);
        assert_eq!(c.edge_count, 2);
        assert_eq!(c.max_depth, 0);
        assert_eq!(c.recommended_height, 1400);
    }

    #[test]
    fn timeline_counts_events() {
        let code = "timeline\n    title History\n    section Early\n        1990 : Web invented\n        1995 : JavaScript\n    section Later\n        2015 : Rust 1.0";
        let c = analyze_complexity(DiagramKind::Timeline, code);
        assert_eq!(c.node_count, 3);
        assert_eq!(c.max_depth, 2);
    }

    #[test]
    fn network_counts_links() {
        let code = "graph TD\n    A[Core] --- B[Edge]\n    A --> C[Leaf]\n    style A fill:#e1f5fe";
        let c = analyze_complexity(DiagramKind::Network, code);
        assert_eq!(c.node_count, 3);
        assert_eq!(c.edge_count, 2);
    }

    #[test]
    fn empty_diagram_is_minimal() {
        let c = analyze_complexity(DiagramKind::Network, "graph TD");
        assert_eq!(c.node_count, 0);
        assert_eq!(c.branching_factor, 0.0);
        assert_eq!(c.recommended_height, BASE_HEIGHT_PX);
    }

    #[test]
    fn height_is_capped() {
        let body: String = (0..26)
            .map(|i| format!("\n    N{i}[Node number {i}] --> N{}[Next]", i + 1))
            .collect();
        let code = format!("flowchart TD{body}");
        let c = analyze_complexity(DiagramKind::Flowchart, &code);
        assert!(c.node_count > 25);
        assert_eq!(c.recommended_height, MAX_HEIGHT_PX);
        assert!(c.score <= 100);
    }

    #[test]
    fn height_grows_with_node_count() {
        assert_eq!(recommended_height(10, 14), 1400);
        assert_eq!(recommended_height(10, 3), 1000);
        assert_eq!(recommended_height(90, 0), 2500);
    }
}
