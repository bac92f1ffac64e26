//! Prompts for the summary and diagram calls.
//!
//! Every instruction sent to the model lives here so prompt changes never
//! touch retry or error-handling code, and tests can inspect prompts without
//! a live provider.
//!
//! Each task uses two messages: a system prompt with the rules, and a user
//! message carrying the (truncated) page text.

use crate::config::DiagramKind;

/// System prompt for the prose summary.
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You write summaries of web articles for neurodiverse learners.

Rules:
1. Open with one sentence that states what the page is about.
2. Follow with the main ideas as short paragraphs or a bulleted list.
3. Keep key concepts, names, numbers and conclusions; drop boilerplate such as
   menus, cookie notices and author bios.
4. Use plain, direct language and short sentences. Define any jargon you keep.
5. Output only the summary. No preamble, no closing remarks."#;

/// System prompt for a Mermaid mind map.
pub const MINDMAP_SYSTEM_PROMPT: &str = r#"You turn article text into a Mermaid mind map for neurodiverse learners.

Syntax rules (the output is parsed, not read):
1. First line is exactly: mindmap
2. Second line is the root, indented two spaces: root(Topic Name)
3. Main branches are indented four spaces, their items six spaces.
4. Every label is wrapped in parentheses: (Label)
5. An optional icon line ::icon(fa fa-name) goes directly under a branch.
6. At most 4 main branches, each with 2 to 4 items.
7. Labels are short and contain no parentheses, quotes or colons.

Example:
mindmap
  root(Main Topic)
    (First Branch)
      ::icon(fa fa-lightbulb)
      (Item A)
      (Item B)
    (Second Branch)
      (Item C)
      (Item D)

Output only the diagram code. Never wrap it in ``` fences."#;

/// System prompt for a Mermaid flowchart.
pub const FLOWCHART_SYSTEM_PROMPT: &str = r#"You turn article text into a Mermaid flowchart for neurodiverse learners.

Syntax rules (the output is parsed, not read):
1. First line is exactly: flowchart TD
2. Node ids are single capital letters: A, B, C …
3. Step labels use brackets: A[Start Here]
4. Decisions use braces: C{Question?}
5. Arrows: A --> B, labelled paths: C -->|Yes| D
6. Between 4 and 10 nodes in total, in plain language.

Example:
flowchart TD
    A[Starting Point] --> B[Next Step]
    B --> C{Decision?}
    C -->|Yes| D[Path A]
    C -->|No| E[Path B]
    D --> F[Result]
    E --> F

Output only the diagram code. Never wrap it in ``` fences."#;

/// System prompt for a Mermaid timeline.
pub const TIMELINE_SYSTEM_PROMPT: &str = r#"You turn article text into a Mermaid timeline for neurodiverse learners.

Syntax rules (the output is parsed, not read):
1. First line is exactly: timeline
2. Second line: title <Timeline Name>
3. Group events with "section <Period>" lines when the text spans several periods.
4. Each event is one line: <Period> : <short description>
5. At most 8 events, in chronological order.

Example:
timeline
    title Article Timeline
    section Early Period
        1990 : First event
        1995 : Another event
    section Later Period
        2010 : Recent development

Output only the diagram code. Never wrap it in ``` fences."#;

/// System prompt for a Mermaid concept network.
pub const NETWORK_SYSTEM_PROMPT: &str = r#"You turn article text into a Mermaid concept network for neurodiverse learners.

Syntax rules (the output is parsed, not read):
1. First line is exactly: graph TD
2. Node ids are single capital letters: A, B, C …
3. Labels use brackets: A[Concept Name]
4. Links: A --- B for a relation, A --> B for a direction.
5. At most 8 nodes; highlight the central ones with style lines.

Example:
graph TD
    A[Main Concept] --- B[Related Idea]
    A --- C[Another Concept]
    B --> D[Supporting Point]
    style A fill:#e1f5fe
    style B fill:#f3e5f5

Output only the diagram code. Never wrap it in ``` fences."#;

/// System prompt for the given diagram kind.
pub fn diagram_system_prompt(kind: DiagramKind) -> &'static str {
    match kind {
        DiagramKind::Mindmap => MINDMAP_SYSTEM_PROMPT,
        DiagramKind::Flowchart => FLOWCHART_SYSTEM_PROMPT,
        DiagramKind::Timeline => TIMELINE_SYSTEM_PROMPT,
        DiagramKind::Network => NETWORK_SYSTEM_PROMPT,
    }
}

/// User message for the summary call.
pub fn summary_user_message(text: &str) -> String {
    format!("Summarise the following page text:\n\n\"\"\"{text}\"\"\"")
}

/// User message for a diagram call.
pub fn diagram_user_message(kind: DiagramKind, text: &str) -> String {
    format!(
        "Create a {} from the following page text:\n\n\"\"\"{text}\"\"\"",
        kind.title().to_lowercase()
    )
}

/// Truncate `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_diagram_prompt_names_its_header() {
        for kind in DiagramKind::ALL {
            let prompt = diagram_system_prompt(kind);
            assert!(
                prompt.contains(&format!("First line is exactly: {}", kind.mermaid_header())),
                "{kind} prompt does not pin the header"
            );
            assert!(prompt.contains("Never wrap it in ``` fences"));
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn user_messages_embed_text() {
        assert!(summary_user_message("body text").contains("\"\"\"body text\"\"\""));
        let msg = diagram_user_message(DiagramKind::Mindmap, "x");
        assert!(msg.starts_with("Create a mind map"));
    }
}
