use super::memory::AgentState;

/// What a finished run hands back to the caller.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub final_answer: String,
    pub iterations: usize,
    pub state: AgentState,
}
