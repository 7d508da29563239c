//! Decision engine: renders the prompt, asks the model for one line and parses it.

mod parser;
mod prompt;

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::memory::AgentState;
use crate::application::tooling::ToolCatalog;
use crate::model::{ModelClient, ModelRequest};
use crate::types::Decision;

pub use parser::{
    FINAL_ANSWER_PREFIX, FUNCTION_CALL_PREFIX, ParseError, parse_function_call, parse_response,
};
pub use prompt::{compose_prompt, compose_system_prompt};

pub struct DecisionEngine {
    client: Arc<dyn ModelClient>,
    model: String,
    system_prompt: String,
}

impl DecisionEngine {
    /// The system prompt is rendered once; the catalog does not change during a session.
    pub fn new(client: Arc<dyn ModelClient>, model: impl Into<String>, catalog: &ToolCatalog) -> Self {
        Self {
            client,
            model: model.into(),
            system_prompt: compose_system_prompt(catalog),
        }
    }

    /// Chooses the next step. Generation faults come back as a terminal final answer.
    pub async fn decide(&self, task: &str, state: &AgentState) -> Decision {
        let prompt = compose_prompt(&self.system_prompt, task, state);
        debug!(
            iteration = state.iteration,
            prompt_chars = prompt.len(),
            "Requesting decision from model"
        );

        let request = ModelRequest::new(self.model.clone(), prompt);
        let text = match self.client.generate(request).await {
            Ok(response) => response.text,
            Err(err) => {
                warn!(provider = self.client.id(), %err, "Model generation failed");
                return Decision::FinalAnswer(format!("Error in decision making: {err}"));
            }
        };
        debug!(response = %text.trim(), "Model responded");

        let decision = parse_response(&text);
        match &decision {
            Decision::Call(call) => info!(tool = %call.name, "Model chose a tool call"),
            Decision::FinalAnswer(_) => info!("Model returned a final answer"),
        }
        decision
    }
}
