//! Post-processing: deterministic cleanup of model-generated Mermaid code.
//!
//! Even with strict prompts, models wrap diagrams in ```` ```mermaid ````
//! fences, add a chatty first line ("Here is your mind map:"), leave CRLF
//! line endings, or flatten a mind map's indentation. Mermaid refuses to
//! render any of that, so every diagram goes through [`clean_diagram`]
//! before it reaches the presentation layer.
//!
//! ## Rule Order
//!
//! Fences are stripped before line endings are normalised so the fence regex
//! sees the raw text; the header check runs on the cleaned lines; the mind
//! map repair runs last because it relies on the header being in place.

use crate::config::DiagramKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// Shown when a mind map reply has no usable branches at all.
pub const FALLBACK_MINDMAP: &str = "mindmap
  root(Article Content)
    (Main Topics)
      (Key Point 1)
      (Key Point 2)
    (Details)
      (Important Info)
      (Supporting Facts)";

/// Apply all cleanup rules to raw diagram code.
///
/// Rules (applied in order):
/// 1. Extract the body of the first fenced block, drop any stray fences
/// 2. Normalise line endings (CRLF → LF)
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 4. Trim trailing whitespace per line and drop blank lines
/// 5. Drop chatter before the diagram header, or prepend a missing header
/// 6. Mind maps only: rebuild root/branch/leaf indentation
pub fn clean_diagram(kind: DiagramKind, raw: &str) -> String {
    let s = strip_code_fences(raw);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    let s = drop_blank_lines(&s);
    let s = ensure_header(kind, &s);
    match kind {
        DiagramKind::Mindmap => repair_mindmap(&s),
        _ => s,
    }
}

// ── Rule 1: Strip code fences ────────────────────────────────────────────────

static RE_FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n?```").unwrap());

fn strip_code_fences(input: &str) -> String {
    let body = match RE_FENCED_BLOCK.captures(input) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    };
    body.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace, drop blank lines ──────────────────────

fn drop_blank_lines(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Ensure the diagram header ───────────────────────────────────────

/// Header keywords Mermaid accepts for each kind.
fn accepted_headers(kind: DiagramKind) -> &'static [&'static str] {
    match kind {
        DiagramKind::Mindmap => &["mindmap"],
        DiagramKind::Flowchart => &["flowchart", "graph"],
        DiagramKind::Timeline => &["timeline"],
        DiagramKind::Network => &["graph", "flowchart"],
    }
}

fn is_header_line(kind: DiagramKind, line: &str) -> bool {
    let first_word = line.split_whitespace().next().unwrap_or("");
    accepted_headers(kind).contains(&first_word)
}

fn ensure_header(kind: DiagramKind, input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    match lines.iter().position(|l| is_header_line(kind, l.trim())) {
        Some(idx) => {
            let mut out = vec![lines[idx].trim()];
            out.extend_from_slice(&lines[idx + 1..]);
            out.join("\n")
        }
        None if lines.is_empty() => kind.mermaid_header().to_string(),
        None => format!("{}\n{}", kind.mermaid_header(), lines.join("\n")),
    }
}

// ── Rule 6: Mind map structure repair ───────────────────────────────────────
//
// Mermaid mind maps are indentation-sensitive. Models frequently flatten the
// tree, mix tabs and spaces, or drop the `root` keyword. We rebuild a
// canonical three-level layout:
//
//   mindmap
//     root(Topic)          2 spaces
//       (Branch)           4 spaces
//         ::icon(fa fa-x)  6 spaces, only under a branch
//         (Leaf)           6 spaces
//
// Nesting is inferred from the reply's indentation relative to the first
// child of the root: anything at or above that level is a branch, anything
// deeper is a leaf. A flat reply makes every node a branch.

static RE_ROOT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^root\b").unwrap());

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Strip shape delimiters, bullets and inner parentheses from a node line.
fn node_label(line: &str) -> String {
    let s = line.trim();
    let s = RE_ROOT_PREFIX.replace(s, "");
    let s = s.trim().trim_start_matches(['-', '*', '+']).trim();
    let s = s.trim_start_matches(['(', '[', '{', ')']);
    let s = s.trim_end_matches([')', ']', '}', '(']);
    s.replace(['(', ')'], "").trim().to_string()
}

fn repair_mindmap(input: &str) -> String {
    let mut out: Vec<String> = vec!["mindmap".to_string()];
    let mut root_indent: Option<usize> = None;
    let mut branch_indent: Option<usize> = None;
    let mut has_branch = false;

    for line in input.lines().skip(1) {
        let trimmed = line.trim();
        let indent = indent_width(line);

        if trimmed.starts_with("::icon(") {
            if has_branch {
                out.push(format!("      {trimmed}"));
            }
            continue;
        }

        let label = node_label(trimmed);
        if label.is_empty() {
            continue;
        }

        let Some(root) = root_indent else {
            out.push(format!("  root({label})"));
            root_indent = Some(indent);
            continue;
        };

        let level = *branch_indent.get_or_insert(if indent > root { indent } else { root });
        if indent <= level {
            out.push(format!("    ({label})"));
            has_branch = true;
        } else if has_branch {
            out.push(format!("      ({label})"));
        } else {
            out.push(format!("    ({label})"));
            has_branch = true;
        }
    }

    if !has_branch {
        return FALLBACK_MINDMAP.to_string();
    }
    out.join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language() {
        let input = "```mermaid\ngraph TD\n    A --- B\n```";
        assert_eq!(strip_code_fences(input), "graph TD\n    A --- B");
    }

    #[test]
    fn test_strip_fences_with_chatter() {
        let input = "Here you go:\n```\ntimeline\n    title T\n```\nEnjoy!";
        assert_eq!(strip_code_fences(input), "timeline\n    title T");
    }

    #[test]
    fn test_stray_fence_lines_removed() {
        assert_eq!(strip_code_fences("mindmap\n```"), "mindmap");
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_remove_invisible() {
        assert_eq!(remove_invisible_chars("A\u{200B}B\u{FEFF}"), "AB");
    }

    #[test]
    fn test_drop_blank_lines_keeps_indent() {
        assert_eq!(drop_blank_lines("a  \n\n   \n  b"), "a\n  b");
    }

    #[test]
    fn test_header_prepended_when_missing() {
        let out = ensure_header(DiagramKind::Flowchart, "    A[Start] --> B[End]");
        assert_eq!(out, "flowchart TD\n    A[Start] --> B[End]");
    }

    #[test]
    fn test_chatter_before_header_dropped() {
        let out = ensure_header(DiagramKind::Network, "Sure! Here it is:\ngraph LR\n    A --- B");
        assert_eq!(out, "graph LR\n    A --- B");
    }

    #[test]
    fn test_flowchart_accepts_graph_header() {
        let out = ensure_header(DiagramKind::Flowchart, "graph TD\n    A --> B");
        assert!(out.starts_with("graph TD"));
    }

    #[test]
    fn test_empty_reply_gets_header_only() {
        assert_eq!(ensure_header(DiagramKind::Timeline, ""), "timeline");
    }

    #[test]
    fn test_node_label_shapes() {
        assert_eq!(node_label("root((Big Idea))"), "Big Idea");
        assert_eq!(node_label("(Branch)"), "Branch");
        assert_eq!(node_label("[Square]"), "Square");
        assert_eq!(node_label("- Bullet item"), "Bullet item");
        assert_eq!(node_label("Plain text"), "Plain text");
        assert_eq!(node_label("(Rust (language))"), "Rust language");
    }

    #[test]
    fn test_repair_canonical_mindmap_unchanged() {
        let input = "mindmap\n  root(Main Topic)\n    (Branch 1)\n      ::icon(fa fa-lightbulb)\n      (Sub A)\n    (Branch 2)\n      (Sub C)";
        assert_eq!(repair_mindmap(input), input);
    }

    #[test]
    fn test_repair_reindents_deep_tree() {
        let input = "mindmap\n\troot((Rust))\n\t\tOwnership\n\t\t\tBorrowing\n\t\tTraits";
        assert_eq!(
            repair_mindmap(input),
            "mindmap\n  root(Rust)\n    (Ownership)\n      (Borrowing)\n    (Traits)"
        );
    }

    #[test]
    fn test_repair_flat_list_becomes_branches() {
        let input = "mindmap\n(Topic)\n(One)\n(Two)";
        assert_eq!(
            repair_mindmap(input),
            "mindmap\n  root(Topic)\n    (One)\n    (Two)"
        );
    }

    #[test]
    fn test_icon_before_any_branch_dropped() {
        let input = "mindmap\n  root(T)\n  ::icon(fa fa-x)\n    (B)";
        assert_eq!(repair_mindmap(input), "mindmap\n  root(T)\n    (B)");
    }

    #[test]
    fn test_root_only_falls_back() {
        assert_eq!(repair_mindmap("mindmap\n  root(Lonely)"), FALLBACK_MINDMAP);
        assert_eq!(repair_mindmap("mindmap"), FALLBACK_MINDMAP);
    }

    #[test]
    fn test_clean_diagram_full_pipeline_mindmap() {
        let input = "```mermaid\r\nmindmap\r\n  root(Web)\u{200B}\r\n    (HTTP)\r\n      (GET)\r\n```";
        assert_eq!(
            clean_diagram(DiagramKind::Mindmap, input),
            "mindmap\n  root(Web)\n    (HTTP)\n      (GET)"
        );
    }

    #[test]
    fn test_clean_diagram_leaves_flowchart_body() {
        let input = "flowchart TD\n    A[Start] --> B{Ok?}\n    B -->|Yes| C[Done]\n";
        assert_eq!(
            clean_diagram(DiagramKind::Flowchart, input),
            "flowchart TD\n    A[Start] --> B{Ok?}\n    B -->|Yes| C[Done]"
        );
    }
}
