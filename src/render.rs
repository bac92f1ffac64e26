//! Presentation: turn a [`VisualizationOutput`] into something a person reads.
//!
//! [`render_html`] builds a standalone page that loads Mermaid.js from a CDN
//! and lets the browser lay the diagram out. [`render_markdown`] builds a
//! report with a fenced `mermaid` block that renders on GitHub and most
//! Markdown viewers.

use crate::output::VisualizationOutput;
use std::fmt::Write as _;

/// Mermaid.js bundle loaded by the HTML page.
pub const MERMAID_CDN_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";

/// Font Awesome stylesheet, needed for `::icon(fa …)` in mind maps.
pub const FONT_AWESOME_CDN_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css";

const PAGE_STYLE: &str = r#"body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 24px; background: #f8f9fa; color: #212529; line-height: 1.6; }
main { max-width: 1200px; margin: 0 auto; }
h1 { color: #2E86AB; margin-bottom: 4px; }
.source { font-size: 14px; color: #6c757d; margin-bottom: 24px; }
.summary { background: white; border-radius: 12px; padding: 16px 24px; box-shadow: 0 2px 10px rgba(0,0,0,0.08); font-size: 18px; }
.diagram { background: white; border-radius: 12px; margin-top: 24px; box-shadow: 0 2px 10px rgba(0,0,0,0.08); overflow: auto; }
.diagram-info { font-size: 12px; color: #6c757d; padding: 12px 20px; border-bottom: 1px solid #dee2e6; }
.mermaid { display: flex; justify-content: center; align-items: center; margin: 0; padding: 40px; }"#;

/// Escape text for use in HTML element content and double-quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a standalone HTML page.
pub fn render_html(output: &VisualizationOutput) -> String {
    let title = escape_html(output.display_title());
    let url = escape_html(output.url.as_str());

    let mut html = String::with_capacity(4096 + output.summary.len());
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{FONT_AWESOME_CDN_URL}\">");
    let _ = writeln!(html, "<style>\n{PAGE_STYLE}\n</style>");
    html.push_str("</head>\n<body>\n<main>\n");

    let _ = writeln!(html, "<h1>{title}</h1>");
    let _ = writeln!(html, "<p class=\"source\"><a href=\"{url}\">{url}</a></p>");

    html.push_str("<section class=\"summary\">\n");
    for paragraph in paragraphs(&output.summary) {
        let lines: Vec<String> = paragraph.lines().map(|l| escape_html(l.trim())).collect();
        let _ = writeln!(html, "<p>{}</p>", lines.join("<br>\n"));
    }
    html.push_str("</section>\n");

    if let Some(diagram) = &output.diagram {
        let c = &diagram.complexity;
        let _ = writeln!(
            html,
            "<section class=\"diagram\">\n<div class=\"diagram-info\">{} · complexity {}/100 · {} nodes</div>",
            diagram.kind.title(),
            c.score,
            c.node_count
        );
        let _ = writeln!(
            html,
            "<pre class=\"mermaid\" style=\"min-height: {}px\">\n{}\n</pre>\n</section>",
            c.recommended_height,
            escape_html(&diagram.code)
        );
        let _ = writeln!(html, "<script src=\"{MERMAID_CDN_URL}\"></script>");
        html.push_str(
            "<script>mermaid.initialize({ startOnLoad: true, theme: 'default', securityLevel: 'strict' });</script>\n",
        );
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// Render a Markdown report.
pub fn render_markdown(output: &VisualizationOutput) -> String {
    let mut md = String::with_capacity(1024 + output.summary.len());
    let _ = writeln!(md, "# {}\n", output.display_title());
    let _ = writeln!(md, "Source: <{}>\n", output.url);
    let _ = writeln!(md, "## Summary\n\n{}\n", output.summary.trim());

    if let Some(diagram) = &output.diagram {
        let _ = writeln!(md, "## {}\n", diagram.kind.title());
        let _ = writeln!(md, "```mermaid\n{}\n```\n", diagram.code);
        let _ = writeln!(
            md,
            "_Complexity {}/100, {} nodes, suggested height {}px._",
            diagram.complexity.score, diagram.complexity.node_count, diagram.complexity.recommended_height
        );
    }
    md
}

/// Split text into blank-line separated paragraphs.
fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}
