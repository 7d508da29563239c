use tracing::{debug, info};

use super::action::ActionDispatcher;
use super::decision::DecisionEngine;
use super::errors::AgentError;
use super::memory::{AgentState, Memory};
use super::models::AgentOutcome;
use super::perception::process_user_query;
use crate::types::{Decision, ToolCall, ToolResult, UserQuery};

enum LoopState {
    AwaitingDecision,
    ExecutingTool(ToolCall),
    Done(String),
}

/// Drives decide → act → record until the model gives a final answer.
pub struct Agent {
    memory: Memory,
    engine: DecisionEngine,
    dispatcher: ActionDispatcher,
}

impl Agent {
    pub fn new(engine: DecisionEngine, dispatcher: ActionDispatcher) -> Self {
        Self {
            memory: Memory::new(),
            engine,
            dispatcher,
        }
    }

    /// Current session state; still readable after an interrupted run.
    pub fn state(&self) -> &AgentState {
        self.memory.state()
    }

    pub async fn run(&mut self, query: &UserQuery) -> Result<AgentOutcome, AgentError> {
        self.memory.reset();
        let task = process_user_query(query);
        info!("Agent run started");

        let mut state = LoopState::AwaitingDecision;
        loop {
            state = match state {
                LoopState::AwaitingDecision => {
                    let iteration = self.memory.state().iteration;
                    debug!(iteration, "Awaiting decision");
                    match self.engine.decide(&task, self.memory.state()).await {
                        Decision::Call(call) => LoopState::ExecutingTool(call),
                        Decision::FinalAnswer(answer) => LoopState::Done(answer),
                    }
                }
                LoopState::ExecutingTool(call) => {
                    let iteration = self.memory.state().iteration;
                    self.memory.record_action(call.clone())?;
                    let result = self.dispatcher.execute(&call).await;
                    info!(
                        iteration,
                        tool = %call.name,
                        success = result.success,
                        "Iteration finished"
                    );
                    if !call.is_show_reasoning() {
                        narrate(&call, &result);
                    }
                    self.memory.record_result(result)?;
                    self.memory.increment_iteration();
                    LoopState::AwaitingDecision
                }
                LoopState::Done(answer) => {
                    println!("\n=== Agent Execution Complete ===");
                    println!("{answer}");
                    self.memory.complete(answer.clone());
                    let state = self.memory.state();
                    info!(iterations = state.iteration, "Agent run finished");
                    return Ok(AgentOutcome {
                        final_answer: answer,
                        iterations: state.iteration,
                        state: state.clone(),
                    });
                }
            };
        }
    }
}

fn narrate(call: &ToolCall, result: &ToolResult) {
    if result.success {
        println!("{} -> {}", call.name, result.content);
    } else {
        let error = result.error.as_deref().unwrap_or("unknown error");
        if result.content.is_empty() {
            println!("{} failed: {error}", call.name);
        } else {
            println!("{} failed: {error} ({})", call.name, result.content);
        }
    }
}
