//! Tool domain traits
//!
//! Contains pure argument validation against a tool's [`InputSchema`].
//! Execution lives behind [`ToolExecutor`](super::executor::ToolExecutor).

use super::entities::{Arguments, InputSchema, ParamType, ToolParameter};
use super::value_objects::ValidationError;
use serde_json::{Number, Value};

/// How arguments that the schema does not declare are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Fail validation
    #[default]
    Reject,
    /// Drop them before the executor sees the arguments
    Ignore,
}

/// Validator for tool arguments
///
/// Returns the normalized arguments (coerced types, defaults filled in)
/// that the executor should receive.
pub trait ToolValidator {
    fn validate(&self, schema: &InputSchema, args: &Arguments)
    -> Result<Arguments, ValidationError>;
}

/// Default implementation of ToolValidator
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator {
    pub unknown_fields: UnknownFieldPolicy,
}

impl DefaultToolValidator {
    pub fn new(unknown_fields: UnknownFieldPolicy) -> Self {
        Self { unknown_fields }
    }
}

impl ToolValidator for DefaultToolValidator {
    fn validate(
        &self,
        schema: &InputSchema,
        args: &Arguments,
    ) -> Result<Arguments, ValidationError> {
        if self.unknown_fields == UnknownFieldPolicy::Reject
            && let Some(extra) = args.keys().find(|k| schema.parameter(k).is_none())
        {
            return Err(ValidationError::UnknownParameter {
                param: extra.clone(),
            });
        }

        let mut normalized = Arguments::new();
        for param in schema.parameters() {
            match args.get(&param.name) {
                // null is treated the same as an absent argument
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(ValidationError::MissingRequired {
                            param: param.name.clone(),
                        });
                    }
                    if let Some(default) = &param.default {
                        normalized.insert(param.name.clone(), default.clone());
                    }
                }
                Some(value) => {
                    let coerced = coerce(param, value)?;
                    check_constraints(param, &coerced)?;
                    normalized.insert(param.name.clone(), coerced);
                }
            }
        }

        Ok(normalized)
    }
}

/// Convert `value` into the parameter's declared type where that is lossless.
fn coerce(param: &ToolParameter, value: &Value) -> Result<Value, ValidationError> {
    let coerced = match (param.param_type, value) {
        (ParamType::String, Value::String(_)) => Some(value.clone()),
        (ParamType::Integer, Value::Number(n)) => integer_from_number(n),
        (ParamType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (ParamType::Number, Value::Number(_)) => Some(value.clone()),
        (ParamType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        (ParamType::Boolean, Value::Bool(_)) => Some(value.clone()),
        (ParamType::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (ParamType::Object, Value::Object(_)) => Some(value.clone()),
        (ParamType::Array, Value::Array(_)) => Some(value.clone()),
        _ => None,
    };

    coerced.ok_or_else(|| ValidationError::TypeMismatch {
        param: param.name.clone(),
        expected: param.param_type.to_string(),
        found: describe(value),
    })
}

/// 2^63, the first float past `i64::MAX`
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Integral numbers that fit in an `i64` pass, including floats such as
/// `5.0` that models often emit.
fn integer_from_number(n: &Number) -> Option<Value> {
    if n.is_i64() {
        return Some(Value::Number(n.clone()));
    }
    if n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < I64_UPPER_BOUND {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

fn check_constraints(param: &ToolParameter, value: &Value) -> Result<(), ValidationError> {
    let constraints = &param.constraints;

    if let Some(allowed) = &constraints.allowed
        && !allowed.contains(value)
    {
        return Err(ValidationError::NotAllowed {
            param: param.name.clone(),
            value: value.to_string(),
            allowed: Value::Array(allowed.clone()).to_string(),
        });
    }

    if let Some(n) = value.as_f64() {
        if let Some(min) = constraints.minimum
            && n < min
        {
            return Err(ValidationError::OutOfRange {
                param: param.name.clone(),
                value: value.to_string(),
                relation: "below the minimum",
                bound: min,
            });
        }
        if let Some(max) = constraints.maximum
            && n > max
        {
            return Err(ValidationError::OutOfRange {
                param: param.name.clone(),
                value: value.to_string(),
                relation: "above the maximum",
                bound: max,
            });
        }
    }

    Ok(())
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sum_schema() -> InputSchema {
        InputSchema::new()
            .with_parameter(ToolParameter::new("a", ParamType::Integer, true))
            .with_parameter(ToolParameter::new("b", ParamType::Integer, true))
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_validator_missing_required() {
        let validator = DefaultToolValidator::default();
        let err = validator
            .validate(&sum_schema(), &args(json!({"a": 1})))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired { param: "b".into() });
    }

    #[test]
    fn test_validator_null_counts_as_missing() {
        let validator = DefaultToolValidator::default();
        let err = validator
            .validate(&sum_schema(), &args(json!({"a": 1, "b": null})))
            .unwrap_err();
        assert_eq!(err.param(), "b");
    }

    #[test]
    fn test_validator_type_mismatch_cites_param() {
        let validator = DefaultToolValidator::default();
        let err = validator
            .validate(&sum_schema(), &args(json!({"a": "x", "b": 2})))
            .unwrap_err();
        assert_eq!(err.param(), "a");
        assert!(err.to_string().contains("expected integer"));
    }

    #[test]
    fn test_validator_coerces_numeric_strings_and_integral_floats() {
        let validator = DefaultToolValidator::default();
        let normalized = validator
            .validate(&sum_schema(), &args(json!({"a": "5", "b": 2.0})))
            .unwrap();
        assert_eq!(normalized["a"], json!(5));
        assert_eq!(normalized["b"], json!(2));
    }

    #[test]
    fn test_validator_rejects_fractional_integer() {
        let validator = DefaultToolValidator::default();
        assert!(
            validator
                .validate(&sum_schema(), &args(json!({"a": 1.5, "b": 2})))
                .is_err()
        );
    }

    #[test]
    fn test_validator_rejects_integers_outside_i64() {
        let validator = DefaultToolValidator::default();

        let two_pow_63 = args(json!({"a": 9223372036854775808.0_f64, "b": 1}));
        let err = validator.validate(&sum_schema(), &two_pow_63).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { ref param, .. } if param == "a"));

        let err = validator
            .validate(&sum_schema(), &args(json!({"a": u64::MAX, "b": 1})))
            .unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { ref param, .. } if param == "a"));

        let edges = args(json!({"a": i64::MAX, "b": -9223372036854775808.0_f64}));
        let normalized = validator.validate(&sum_schema(), &edges).unwrap();
        assert_eq!(normalized["a"], json!(i64::MAX));
        assert_eq!(normalized["b"], json!(i64::MIN));
    }

    #[test]
    fn test_validator_unknown_param_rejected_by_default() {
        let validator = DefaultToolValidator::default();
        let err = validator
            .validate(&sum_schema(), &args(json!({"a": 1, "b": 2, "c": 3})))
            .unwrap_err();
        assert_eq!(err, ValidationError::UnknownParameter { param: "c".into() });
    }

    #[test]
    fn test_validator_unknown_param_ignored_when_configured() {
        let validator = DefaultToolValidator::new(UnknownFieldPolicy::Ignore);
        let normalized = validator
            .validate(&sum_schema(), &args(json!({"a": 1, "b": 2, "c": 3})))
            .unwrap();
        assert!(!normalized.contains_key("c"));
    }

    #[test]
    fn test_validator_fills_defaults() {
        let schema = InputSchema::new()
            .with_parameter(ToolParameter::new("operation", ParamType::String, true))
            .with_parameter(
                ToolParameter::new("include_history", ParamType::Boolean, false).with_default(true),
            )
            .with_parameter(ToolParameter::new("start_date", ParamType::String, false));

        let normalized = DefaultToolValidator::default()
            .validate(&schema, &args(json!({"operation": "Dallas"})))
            .unwrap();
        assert_eq!(normalized["include_history"], json!(true));
        assert!(!normalized.contains_key("start_date"));
    }

    #[test]
    fn test_validator_constraints() {
        let schema = InputSchema::new()
            .with_parameter(ToolParameter::new("n", ParamType::Integer, true).with_minimum(1.0))
            .with_parameter(
                ToolParameter::new("unit", ParamType::String, false).with_enum(["units", "revenue"]),
            );
        let validator = DefaultToolValidator::default();

        let err = validator
            .validate(&schema, &args(json!({"n": 0})))
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));

        let err = validator
            .validate(&schema, &args(json!({"n": 3, "unit": "euros"})))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));

        assert!(
            validator
                .validate(&schema, &args(json!({"n": 3, "unit": "units"})))
                .is_ok()
        );
    }

    #[test]
    fn test_validator_boolean_strings() {
        let schema = InputSchema::new()
            .with_parameter(ToolParameter::new("flag", ParamType::Boolean, true));
        let normalized = DefaultToolValidator::default()
            .validate(&schema, &args(json!({"flag": "false"})))
            .unwrap();
        assert_eq!(normalized["flag"], json!(false));
    }
}
