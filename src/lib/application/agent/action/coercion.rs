use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::application::tooling::{ParamType, ToolDescriptor};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoercionError {
    #[error("argument '{param}' expected an integer, got {value}")]
    Integer { param: String, value: String },
    #[error("argument '{param}' expected a number, got {value}")]
    Number { param: String, value: String },
    #[error("argument '{param}' expected a comma-separated list of integers, got {value}")]
    Array { param: String, value: String },
}

/// Coerces the call's arguments to the types declared by `descriptor`.
///
/// Only declared parameters that are present in `args` survive; nothing is defaulted.
pub fn coerce_arguments(
    descriptor: &ToolDescriptor,
    args: &Map<String, Value>,
) -> Result<Map<String, Value>, CoercionError> {
    let mut coerced = Map::new();
    for param in &descriptor.params {
        if let Some(raw) = args.get(&param.name) {
            let value = coerce_value(&param.name, &param.kind, raw)?;
            coerced.insert(param.name.clone(), value);
        }
    }
    Ok(coerced)
}

fn coerce_value(param: &str, kind: &ParamType, raw: &Value) -> Result<Value, CoercionError> {
    match kind {
        ParamType::Integer => to_integer(raw)
            .map(Value::from)
            .ok_or_else(|| CoercionError::Integer {
                param: param.to_string(),
                value: raw.to_string(),
            }),
        ParamType::Number => to_number(raw)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CoercionError::Number {
                param: param.to_string(),
                value: raw.to_string(),
            }),
        ParamType::Array => match raw {
            Value::String(text) => parse_int_list(text)
                .map(|items| Value::Array(items.into_iter().map(Value::from).collect()))
                .ok_or_else(|| CoercionError::Array {
                    param: param.to_string(),
                    value: raw.to_string(),
                }),
            other => Ok(other.clone()),
        },
        ParamType::String | ParamType::Unspecified | ParamType::Other(_) => Ok(match raw {
            Value::String(text) => Value::String(text.clone()),
            other => Value::String(other.to_string()),
        }),
    }
}

fn to_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(number) if number.is_f64() => number.as_f64().and_then(truncate_to_i64),
        // A u64 above i64::MAX has no i64 form.
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    }
}

/// Truncates toward zero, rejecting values that do not fit in an i64.
fn truncate_to_i64(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    let truncated = value.trunc();
    (truncated.is_finite() && (-LIMIT..LIMIT).contains(&truncated)).then_some(truncated as i64)
}

fn to_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// `"[1, 2, 3]"` or `"1,2,3"` into integers; any bad element fails the whole list.
fn parse_int_list(text: &str) -> Option<Vec<i64>> {
    text.trim()
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|item| item.trim().parse::<i64>().ok())
        .collect()
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

    fn rectangle() -> ToolDescriptor {
        ToolDescriptor::new(
            "draw_rectangle",
            vec![
                ("x1", ParamType::Integer),
                ("y1", ParamType::Integer),
                ("x2", ParamType::Integer),
                ("y2", ParamType::Integer),
            ],
        )
    }

    #[test]
    fn integer_parameters_accept_numbers_and_numeric_strings() {
        let coerced = coerce_arguments(
            &rectangle(),
            &args(json!({"x1": 272, "y1": "310", "x2": 559.9, "y2": " 657 "})),
        )
        .expect("coerces");
        assert_eq!(
            Value::Object(coerced),
            json!({"x1": 272, "y1": 310, "x2": 559, "y2": 657})
        );
    }

    #[test]
    fn non_numeric_integer_is_an_error() {
        let err = coerce_arguments(
            &rectangle(),
            &args(json!({"x1": "left", "y1": 1, "x2": 2, "y2": 3})),
        )
        .expect_err("must fail");
        assert_eq!(
            err,
            CoercionError::Integer {
                param: "x1".into(),
                value: "\"left\"".into()
            }
        );
    }

    #[test]
    fn out_of_range_integers_are_rejected() {
        let oval = ToolDescriptor::new("draw_oval", vec![("x1", ParamType::Integer)]);
        for raw in [
            json!(1e20),
            json!(-1e20),
            json!(18446744073709551615u64),
            json!("99999999999999999999"),
        ] {
            let result = coerce_arguments(&oval, &args(json!({"x1": raw.clone()})));
            assert!(
                matches!(result, Err(CoercionError::Integer { .. })),
                "{raw} must not coerce"
            );
        }

        let edge = coerce_arguments(&oval, &args(json!({"x1": i64::MIN})))
            .expect("i64::MIN fits");
        assert_eq!(edge["x1"], json!(i64::MIN));
        let truncated = coerce_arguments(&oval, &args(json!({"x1": -3.9}))).expect("coerces");
        assert_eq!(truncated["x1"], json!(-3));
    }

    #[test]
    fn undeclared_arguments_are_dropped_and_missing_ones_omitted() {
        let coerced = coerce_arguments(&rectangle(), &args(json!({"x1": 1, "colour": "red"})))
            .expect("coerces");
        assert_eq!(Value::Object(coerced), json!({"x1": 1}));
    }

    #[test]
    fn array_strings_become_integer_lists() {
        let descriptor = ToolDescriptor::new("polyline", vec![("points", ParamType::Array)]);
        let coerced = coerce_arguments(&descriptor, &args(json!({"points": "[1, 2, 3]"})))
            .expect("coerces");
        assert_eq!(coerced["points"], json!([1, 2, 3]));

        let passthrough = coerce_arguments(&descriptor, &args(json!({"points": [4, 5]})))
            .expect("coerces");
        assert_eq!(passthrough["points"], json!([4, 5]));

        assert!(matches!(
            coerce_arguments(&descriptor, &args(json!({"points": "[1, two]"}))),
            Err(CoercionError::Array { .. })
        ));
        assert!(coerce_arguments(&descriptor, &args(json!({"points": "[]"}))).is_err());
    }

    #[test]
    fn numbers_and_strings_coerce_by_declared_type() {
        let descriptor = ToolDescriptor::new(
            "add_text_in_paint",
            vec![
                ("text", ParamType::String),
                ("scale", ParamType::Number),
                ("bold", ParamType::Other("boolean".into())),
                ("note", ParamType::Unspecified),
            ],
        );
        let coerced = coerce_arguments(
            &descriptor,
            &args(json!({"text": 42, "scale": "1.5", "bold": true, "note": "hi"})),
        )
        .expect("coerces");
        assert_eq!(
            Value::Object(coerced),
            json!({"text": "42", "scale": 1.5, "bold": "true", "note": "hi"})
        );

        assert!(matches!(
            coerce_arguments(&descriptor, &args(json!({"scale": "big"}))),
            Err(CoercionError::Number { .. })
        ));
    }
}
