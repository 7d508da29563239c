use super::parser::{FINAL_ANSWER_PREFIX, FUNCTION_CALL_PREFIX};
use crate::application::agent::memory::AgentState;
use crate::application::tooling::ToolCatalog;
use crate::types::SHOW_REASONING;

/// Fixed preamble: the tool list followed by the response protocol and behaviour rules.
pub fn compose_system_prompt(catalog: &ToolCatalog) -> String {
    let tools = catalog
        .iter()
        .enumerate()
        .map(|(index, tool)| {
            format!(
                "{}. {} - {}",
                index + 1,
                tool.signature(),
                tool.description
                    .as_deref()
                    .unwrap_or("No description available")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let lines = [
        "You are a creative agent that works step by step to produce artwork in a drawing application using basic tools. You can reason about the task, check your work and decide how to proceed.".to_string(),
        String::new(),
        "Available tools:".to_string(),
        tools,
        String::new(),
        "Respond with exactly one line, in one of these two formats and no other:".to_string(),
        format!(
            "1) {FUNCTION_CALL_PREFIX} {{\"name\": \"<tool_name>\", \"args\": {{\"param\": value, ...}}}}"
        ),
        "   \"name\" must be one of the tools above and \"args\" a JSON object of its parameters, e.g.".to_string(),
        format!(
            "   {FUNCTION_CALL_PREFIX} {{\"name\": \"draw_rectangle\", \"args\": {{\"x1\": 272, \"y1\": 310, \"x2\": 559, \"y2\": 657}}}}"
        ),
        format!("2) {FINAL_ANSWER_PREFIX} <your answer>"),
        format!("Never treat {FINAL_ANSWER_PREFIX} as a tool name."),
        String::new(),
        "Rules:".to_string(),
        format!(
            "- Your first response must be {FUNCTION_CALL_PREFIX} {{\"name\": \"{SHOW_REASONING}\", \"args\": {{\"steps\": [<ordered plan steps>]}}}}; do not write the plan as plain text."
        ),
        "- Do not include a step like \"Finalize the image\" in the plan.".to_string(),
        format!("- Never call {SHOW_REASONING} in two consecutive iterations."),
        "- For every tool taking x1, y1, x2, y2, x1 must never equal x2 and y1 must never equal y2.".to_string(),
        format!("- Only respond with {FINAL_ANSWER_PREFIX} once every planned step is done."),
    ];
    lines.join("\n")
}

/// Full prompt for the current iteration.
pub fn compose_prompt(system_prompt: &str, task: &str, state: &AgentState) -> String {
    let query = if state.iteration == 0 {
        task.to_string()
    } else {
        format!(
            "{task}\n\n{}\nWhat should I do next?",
            state.format_history()
        )
    };
    format!("{system_prompt}\n\nQuery: {query}")
}
