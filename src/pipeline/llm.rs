//! Text-generation client: summary and diagram calls.
//!
//! The AI service sits behind the [`TextGenerator`] trait. Production code
//! uses [`LlmGenerator`], a thin adapter over any `edgequake-llm` provider;
//! tests and embedders can plug in their own implementation through
//! [`crate::config::MapperConfig::generator`].
//!
//! All prompt text lives in [`crate::prompts`]; this module only assembles
//! requests, applies truncation budgets and drives the retry loop.
//!
//! ## Retry Strategy
//!
//! `max_retries` defaults to 0, so a failed call surfaces immediately. When
//! raised, waits grow as `retry_backoff_ms * 2^(attempt-1)`, saturating at
//! [`MAX_BACKOFF_MS`].

use crate::config::{DiagramKind, MapperConfig};
use crate::error::MapperError;
use crate::pipeline::extract::PageContent;
use crate::prompts::{
    diagram_system_prompt, diagram_user_message, summary_user_message, truncate_chars,
    SUMMARY_SYSTEM_PROMPT,
};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Upper bound on a single retry wait.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// One prompt-in, text-out request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// The model's reply plus token accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Generated {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    /// Wall-clock time including any retries.
    pub duration_ms: u64,
    /// Retries spent before the successful attempt.
    pub retries: u32,
}

/// An external text-generation service.
///
/// Implementations map their own failures to
/// [`MapperError::GenerationFailed`]; the retry loop treats every error as
/// retryable.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generated, MapperError>;
}

/// [`TextGenerator`] backed by an `edgequake-llm` provider.
pub struct LlmGenerator {
    provider: Arc<dyn LLMProvider>,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generated, MapperError> {
        let messages = vec![
            ChatMessage::system(request.system.as_str()),
            ChatMessage::user(request.user.as_str()),
        ];
        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| MapperError::GenerationFailed {
                task: "LLM".to_string(),
                detail: e.to_string(),
            })?;

        Ok(Generated {
            content: response.content,
            input_tokens: response.prompt_tokens as usize,
            output_tokens: response.completion_tokens as usize,
            ..Default::default()
        })
    }
}

/// Ask for a prose summary of the page.
pub async fn summarize(
    generator: &Arc<dyn TextGenerator>,
    content: &PageContent,
    config: &MapperConfig,
) -> Result<Generated, MapperError> {
    let request = summary_request(content, config);
    let mut generated = generate_with_retry(generator, "Summary", &request, config).await?;
    generated.content = generated.content.trim().to_string();
    Ok(generated)
}

/// Ask for raw Mermaid code of the given kind. Cleanup happens in
/// [`crate::pipeline::postprocess`].
pub async fn request_diagram(
    generator: &Arc<dyn TextGenerator>,
    kind: DiagramKind,
    content: &PageContent,
    config: &MapperConfig,
) -> Result<Generated, MapperError> {
    let request = diagram_request(kind, content, config);
    generate_with_retry(generator, kind.title(), &request, config).await
}

/// Build the summary request from the page text and config budgets.
pub fn summary_request(content: &PageContent, config: &MapperConfig) -> GenerationRequest {
    let text = truncate_chars(&content.text, config.max_summary_input_chars);
    GenerationRequest {
        system: SUMMARY_SYSTEM_PROMPT.to_string(),
        user: summary_user_message(text),
        temperature: config.summary_temperature,
        max_tokens: config.summary_max_tokens,
    }
}

/// Build a diagram request from the page text and config budgets.
pub fn diagram_request(
    kind: DiagramKind,
    content: &PageContent,
    config: &MapperConfig,
) -> GenerationRequest {
    let text = truncate_chars(&content.text, config.max_diagram_input_chars);
    GenerationRequest {
        system: diagram_system_prompt(kind).to_string(),
        user: diagram_user_message(kind, text),
        temperature: config.diagram_temperature,
        max_tokens: config.diagram_max_tokens,
    }
}

/// Run one request, retrying with exponential backoff up to
/// `config.max_retries` times. A blank reply counts as a failure.
async fn generate_with_retry(
    generator: &Arc<dyn TextGenerator>,
    task: &str,
    request: &GenerationRequest,
    config: &MapperConfig,
) -> Result<Generated, MapperError> {
    let start = Instant::now();
    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = retry_delay_ms(config.retry_backoff_ms, attempt);
            warn!(
                "{}: retry {}/{} after {}ms",
                task, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match generator.generate(request).await {
            Ok(mut generated) if !generated.content.trim().is_empty() => {
                generated.duration_ms = start.elapsed().as_millis() as u64;
                generated.retries = attempt;
                debug!(
                    "{}: {} input tokens, {} output tokens, {}ms",
                    task, generated.input_tokens, generated.output_tokens, generated.duration_ms
                );
                return Ok(generated);
            }
            Ok(_) => {
                warn!("{}: attempt {} returned an empty reply", task, attempt + 1);
                last_err = Some("model returned an empty reply".to_string());
            }
            Err(e) => {
                let err_msg = match e {
                    MapperError::GenerationFailed { detail, .. } => detail,
                    other => other.to_string(),
                };
                warn!("{}: attempt {} failed: {}", task, attempt + 1, err_msg);
                last_err = Some(err_msg);
            }
        }
    }

    Err(MapperError::GenerationFailed {
        task: task.to_string(),
        detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Wait before retry number `attempt` (1-based).
fn retry_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS)
}
