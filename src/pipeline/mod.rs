//! Pipeline stages for URL-to-diagram visualisation.
//!
//! Each submodule implements exactly one transformation step, so every
//! stage can be tested without the network or a model.
//!
//! ## Data Flow
//!
//! ```text
//! normalize ──▶ fetch ──▶ extract ──▶ llm ──▶ postprocess ──▶ layout
//!  (raw text)  (reqwest) (scraper)  (AI)    (Mermaid fix)   (sizing)
//! ```
//!
//! 1. [`normalize`]: turn free-form input into an absolute http(s) URL
//! 2. [`fetch`]: one GET with a timeout and a browser-like User-Agent
//! 3. [`extract`]: walk the DOM, drop scripts and styles, keep prose
//! 4. [`llm`]: summary and diagram requests through a [`llm::TextGenerator`]
//! 5. [`postprocess`]: deterministic cleanup of Mermaid code
//! 6. [`layout`]: complexity score and display height for the diagram

pub mod extract;
pub mod fetch;
pub mod layout;
pub mod llm;
pub mod normalize;
pub mod postprocess;
