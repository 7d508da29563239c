//! Local handling of the `show_reasoning` planning tool.

use serde_json::{Map, Value};

use crate::types::ToolResult;

pub const REASONING_DISPLAYED: &str = "Reasoning steps displayed successfully.";
const INVALID_STEPS: &str = "steps must be a list of strings";
const BOX_WIDTH: usize = 60;

/// Extracts the ordered plan from the call's `steps` argument.
pub fn parse_steps(args: &Map<String, Value>) -> Option<Vec<String>> {
    match args.get("steps") {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(items)) => Some(items.iter().map(render_step).collect()),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => Some(items.iter().map(render_step).collect()),
            Ok(_) | Err(_) => Some(
                text.split([';', ','])
                    .map(str::trim)
                    .filter(|step| !step.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        },
        Some(_) => None,
    }
}

fn render_step(item: &Value) -> String {
    match item {
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}

/// Formats each step as a boxed `Step N` block.
pub fn render_plan(steps: &[String]) -> String {
    let border = "─".repeat(BOX_WIDTH);
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            format!(
                "┌{border}┐\n│ {:<width$} │\n├{border}┤\n│ {:<width$} │\n└{border}┘",
                format!("Step {}", index + 1),
                step,
                width = BOX_WIDTH - 2
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints the plan for the operator and reports the fixed outcome.
pub fn show_reasoning(args: &Map<String, Value>) -> ToolResult {
    let Some(steps) = parse_steps(args) else {
        return ToolResult::failure(INVALID_STEPS);
    };
    if !steps.is_empty() {
        println!("{}", render_plan(&steps));
    }
    ToolResult::success(REASONING_DISPLAYED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test arguments must be an object"),
        }
    }

    #[test]
    fn steps_accept_arrays_and_encoded_strings() {
        assert_eq!(
            parse_steps(&args(json!({"steps": ["Open paint", "Draw a hydra", 3]}))),
            Some(vec!["Open paint".into(), "Draw a hydra".into(), "3".into()])
        );
        assert_eq!(
            parse_steps(&args(json!({"steps": "[\"Open paint\", \"Add text\"]"}))),
            Some(vec!["Open paint".into(), "Add text".into()])
        );
        assert_eq!(
            parse_steps(&args(json!({"steps": "Open paint; Draw border, Add text;"}))),
            Some(vec![
                "Open paint".into(),
                "Draw border".into(),
                "Add text".into()
            ])
        );
        assert_eq!(parse_steps(&Map::new()), Some(Vec::new()));
        assert_eq!(parse_steps(&args(json!({"steps": {"a": 1}}))), None);
    }

    #[test]
    fn plan_renders_numbered_blocks() {
        let rendered = render_plan(&["Open paint".into(), "Draw a centaur".into()]);
        assert!(rendered.contains("│ Step 1"));
        assert!(rendered.contains("│ Open paint"));
        assert!(rendered.contains("│ Step 2"));
        assert!(rendered.contains("│ Draw a centaur"));
        assert_eq!(rendered.matches('┌').count(), 2);
    }

    #[test]
    fn invalid_steps_fail_without_panicking() {
        let result = show_reasoning(&args(json!({"steps": 42})));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(INVALID_STEPS));

        let result = show_reasoning(&args(json!({"steps": ["Plan"]})));
        assert!(result.success);
        assert_eq!(result.content, REASONING_DISPLAYED);
    }
}
