use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{Decision, ToolCall};

pub const FUNCTION_CALL_PREFIX: &str = "FUNCTION_CALL:";
pub const FINAL_ANSWER_PREFIX: &str = "FINAL_ANSWER:";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON in function call: {0}")]
    Json(#[from] serde_json::Error),
    #[error("function call must be a JSON object, got {0}")]
    NotAnObject(String),
    #[error("function call is missing a string 'name'")]
    MissingName,
    #[error("function call 'args' must be a JSON object, got {0}")]
    InvalidArgs(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseLine<'a> {
    FunctionCall(&'a str),
    FinalAnswer(&'a str),
}

/// Picks the first line starting with one of the two protocol prefixes.
pub(crate) fn select_line(text: &str) -> Option<ResponseLine<'_>> {
    text.lines().find_map(|line| {
        if let Some(rest) = line.strip_prefix(FUNCTION_CALL_PREFIX) {
            Some(ResponseLine::FunctionCall(rest))
        } else {
            line.strip_prefix(FINAL_ANSWER_PREFIX)
                .map(ResponseLine::FinalAnswer)
        }
    })
}

/// Decodes the payload after `FUNCTION_CALL:`, tolerating one level of string encoding.
pub fn parse_function_call(payload: &str) -> Result<ToolCall, ParseError> {
    let cleaned = payload.trim().trim_matches('`').trim();
    let value = match serde_json::from_str::<Value>(cleaned)? {
        Value::String(inner) => serde_json::from_str::<Value>(&inner)?,
        other => other,
    };

    let Value::Object(mut object) = value else {
        return Err(ParseError::NotAnObject(value.to_string()));
    };

    let name = match object.remove("name") {
        Some(Value::String(name)) => name,
        _ => return Err(ParseError::MissingName),
    };

    let args = match object.remove("args") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(args)) => args,
        Some(other) => return Err(ParseError::InvalidArgs(other.to_string())),
    };

    Ok(ToolCall::new(name, args))
}

/// Turns free model output into a decision. Never fails: malformed output becomes a
/// terminal final answer describing the problem.
pub fn parse_response(text: &str) -> Decision {
    let trimmed = text.trim();
    match select_line(trimmed) {
        Some(ResponseLine::FunctionCall(payload)) => match parse_function_call(payload) {
            Ok(call) => Decision::Call(call),
            Err(err) => Decision::FinalAnswer(format!("Error in decision making: {err}")),
        },
        Some(ResponseLine::FinalAnswer(answer)) => Decision::FinalAnswer(answer.trim().to_string()),
        None => Decision::FinalAnswer(format!("Unexpected response format: {trimmed}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expect_call(decision: Decision) -> ToolCall {
        match decision {
            Decision::Call(call) => call,
            Decision::FinalAnswer(text) => panic!("expected tool call, got final answer: {text}"),
        }
    }

    fn expect_final(decision: Decision) -> String {
        match decision {
            Decision::FinalAnswer(text) => text,
            Decision::Call(call) => panic!("expected final answer, got call to {}", call.name),
        }
    }

    #[test]
    fn selects_protocol_line_among_reasoning() {
        let text = "Let me think about the composition.\n\
                    FUNCTION_CALL: {\"name\": \"draw_rectangle\", \"args\": {\"x1\": 272, \"y1\": 310, \"x2\": 559, \"y2\": 657}}\n\
                    That should frame the scene.";
        let call = expect_call(parse_response(text));
        assert_eq!(call.name, "draw_rectangle");
        assert_eq!(
            serde_json::Value::Object(call.args),
            json!({"x1": 272, "y1": 310, "x2": 559, "y2": 657})
        );
    }

    #[test]
    fn first_matching_line_wins() {
        let text = "FINAL_ANSWER: first\nFUNCTION_CALL: {\"name\": \"open_paint\", \"args\": {}}";
        assert_eq!(expect_final(parse_response(text)), "first");
    }

    #[test]
    fn double_encoded_payload_is_decoded() {
        let text = r#"FUNCTION_CALL: "{\"name\": \"open_paint\", \"args\": {}}""#;
        let call = expect_call(parse_response(text));
        assert_eq!(call.name, "open_paint");
        assert!(call.args.is_empty());
    }

    #[test]
    fn backtick_wrapped_payload_and_missing_args_are_accepted() {
        let call = expect_call(parse_response("FUNCTION_CALL: `{\"name\": \"open_paint\"}`"));
        assert_eq!(call.name, "open_paint");
        assert!(call.args.is_empty());
    }

    #[test]
    fn final_answer_is_trimmed() {
        assert_eq!(
            expect_final(parse_response("FINAL_ANSWER: A centaur battling a hydra  ")),
            "A centaur battling a hydra"
        );
    }

    #[test]
    fn unrecognised_text_becomes_terminal_answer() {
        let answer = expect_final(parse_response("  I will draw a circle now.\n"));
        assert_eq!(answer, "Unexpected response format: I will draw a circle now.");
    }

    #[test]
    fn prefix_must_start_the_line() {
        let answer = expect_final(parse_response("Result: FINAL_ANSWER: nope"));
        assert!(answer.starts_with("Unexpected response format:"));
    }

    #[test]
    fn malformed_json_becomes_terminal_answer() {
        let answer = expect_final(parse_response("FUNCTION_CALL:FINAL_ANSWER|done"));
        assert!(answer.starts_with("Error in decision making: invalid JSON"));

        let answer = expect_final(parse_response("FUNCTION_CALL: {\"args\": {}}"));
        assert_eq!(
            answer,
            "Error in decision making: function call is missing a string 'name'"
        );

        let answer = expect_final(parse_response("FUNCTION_CALL: [1, 2]"));
        assert!(answer.contains("must be a JSON object"));

        let answer = expect_final(parse_response(
            "FUNCTION_CALL: {\"name\": \"draw_oval\", \"args\": \"x1=1\"}",
        ));
        assert!(answer.contains("'args' must be a JSON object"));
    }

    #[test]
    fn select_line_reports_which_prefix_matched() {
        assert_eq!(
            select_line("noise\nFINAL_ANSWER:done"),
            Some(ResponseLine::FinalAnswer("done"))
        );
        assert_eq!(select_line("nothing here"), None);
    }
}
