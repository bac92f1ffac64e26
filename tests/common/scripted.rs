//! A `TextGenerator` that replays canned replies instead of calling a model.

use async_trait::async_trait;
use neuromind_mapper::{GenerationRequest, Generated, MapperError, TextGenerator};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generated, MapperError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(content) => Ok(Generated {
                content,
                input_tokens: 100,
                output_tokens: 20,
                ..Default::default()
            }),
            None => Err(MapperError::GenerationFailed {
                task: "Scripted".into(),
                detail: "no more replies".into(),
            }),
        }
    }
}
