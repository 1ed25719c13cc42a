//! Tool domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;

/// Arguments passed to a tool, keyed by parameter name.
pub type Arguments = Map<String, Value>;

/// Maximum length of a tool name.
pub const MAX_TOOL_NAME_LEN: usize = 64;

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ParamType::String),
            "number" => Ok(ParamType::Number),
            "integer" => Ok(ParamType::Integer),
            "boolean" => Ok(ParamType::Boolean),
            "object" => Ok(ParamType::Object),
            "array" => Ok(ParamType::Array),
            other => Err(DomainError::InvalidSchema(format!(
                "unsupported parameter type '{}'",
                other
            ))),
        }
    }
}

/// Optional value constraints on a parameter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamConstraints {
    /// Allowed values (`enum`)
    pub allowed: Option<Vec<Value>>,
    /// Inclusive lower bound for numeric parameters
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numeric parameters
    pub maximum: Option<f64>,
}

impl ParamConstraints {
    pub fn is_empty(&self) -> bool {
        self.allowed.is_none() && self.minimum.is_none() && self.maximum.is_none()
    }
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub param_type: ParamType,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Value used when an optional parameter is absent
    pub default: Option<Value>,
    /// Value constraints
    pub constraints: ParamConstraints,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, param_type: ParamType, required: bool) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: String::new(),
            required,
            default: None,
            constraints: ParamConstraints::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_enum(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.constraints.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.constraints.minimum = Some(minimum);
        self
    }

    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.constraints.maximum = Some(maximum);
        self
    }

    fn to_property(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".to_string(), json!(self.param_type.as_str()));
        if !self.description.is_empty() {
            prop.insert("description".to_string(), json!(self.description));
        }
        if let Some(default) = &self.default {
            prop.insert("default".to_string(), default.clone());
        }
        if let Some(allowed) = &self.constraints.allowed {
            prop.insert("enum".to_string(), Value::Array(allowed.clone()));
        }
        if let Some(min) = self.constraints.minimum {
            prop.insert("minimum".to_string(), number_value(min));
        }
        if let Some(max) = self.constraints.maximum {
            prop.insert("maximum".to_string(), number_value(max));
        }
        Value::Object(prop)
    }

    fn from_property(name: &str, prop: &Value, required: bool) -> Result<Self, DomainError> {
        let obj = prop.as_object().ok_or_else(|| {
            DomainError::InvalidSchema(format!("property '{}' is not an object", name))
        })?;

        // Properties without a type are treated as strings.
        let param_type = match obj.get("type") {
            Some(Value::String(t)) => t.parse()?,
            Some(other) => {
                return Err(DomainError::InvalidSchema(format!(
                    "property '{}' has non-string type {}",
                    name, other
                )));
            }
            None => ParamType::String,
        };

        Ok(Self {
            name: name.to_string(),
            param_type,
            description: obj
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or_default()
                .to_string(),
            required,
            default: obj.get("default").cloned(),
            constraints: ParamConstraints {
                allowed: obj.get("enum").and_then(|e| e.as_array()).cloned(),
                minimum: obj.get("minimum").and_then(|m| m.as_f64()),
                maximum: obj.get("maximum").and_then(|m| m.as_f64()),
            },
        })
    }
}

/// Render a bound as an integer when it has no fractional part, so `1.0`
/// round-trips as `1` in published schemas.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

/// Structural input schema: an object with ordered, named properties.
///
/// Serialized as a JSON Schema object:
/// `{"type": "object", "properties": {...}, "required": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct InputSchema {
    parameters: Vec<ToolParameter>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Names of the required parameters, in declaration order
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }

    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            properties.insert(param.name.clone(), param.to_property());
        }
        let required: Vec<&str> = self.required().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn from_json_schema(value: &Value) -> Result<Self, DomainError> {
        let obj = value
            .as_object()
            .ok_or_else(|| DomainError::InvalidSchema("schema is not an object".into()))?;

        if let Some(t) = obj.get("type").and_then(|t| t.as_str())
            && t != "object"
        {
            return Err(DomainError::InvalidSchema(format!(
                "top-level type must be 'object', got '{}'",
                t
            )));
        }

        let required: Vec<&str> = obj
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let mut parameters = Vec::new();
        if let Some(props) = obj.get("properties") {
            let props = props
                .as_object()
                .ok_or_else(|| DomainError::InvalidSchema("properties is not an object".into()))?;
            for (name, prop) in props {
                parameters.push(ToolParameter::from_property(
                    name,
                    prop,
                    required.contains(&name.as_str()),
                )?);
            }
        }

        if let Some(missing) = required
            .iter()
            .find(|r| !parameters.iter().any(|p| &p.name == *r))
        {
            return Err(DomainError::InvalidSchema(format!(
                "required parameter '{}' has no property",
                missing
            )));
        }

        Ok(Self { parameters })
    }
}

impl TryFrom<Value> for InputSchema {
    type Error = DomainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json_schema(&value)
    }
}

impl From<InputSchema> for Value {
    fn from(schema: InputSchema) -> Self {
        schema.to_json_schema()
    }
}

/// Published description of a tool: name, human-readable text, and input schema.
///
/// Identity is the name; descriptors are immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique name of the tool (e.g., "top_n_products")
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Structural schema of the arguments
    #[serde(default)]
    pub input_schema: InputSchema,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: InputSchema::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.input_schema = self.input_schema.with_parameter(param);
        self
    }

    /// Check the name against the registry naming rules.
    pub fn validate_name(&self) -> Result<(), DomainError> {
        let valid = !self.name.is_empty()
            && self.name.len() <= MAX_TOOL_NAME_LEN
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidToolName(self.name.clone()))
        }
    }
}

/// A request to invoke a tool by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRequest {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    #[serde(default)]
    pub arguments: Arguments,
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: Arguments::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_str(&self, key: &str) -> Result<&str, String> {
        self.get_str(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get an optional i64 argument
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }

    /// Get an optional bool argument
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.arguments.get(key).and_then(|v| v.as_bool())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_n_descriptor() -> ToolDescriptor {
        ToolDescriptor::new("top_n_products", "Top N products by units sold")
            .with_parameter(
                ToolParameter::new("n", ParamType::Integer, true)
                    .with_description("Number of products")
                    .with_minimum(1.0),
            )
            .with_parameter(ToolParameter::new("operation", ParamType::String, true))
            .with_parameter(
                ToolParameter::new("include_history", ParamType::Boolean, false).with_default(true),
            )
    }

    #[test]
    fn test_schema_serializes_in_declaration_order() {
        let schema = top_n_descriptor().input_schema.to_json_schema();

        assert_eq!(schema["type"], "object");
        let keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["n", "operation", "include_history"]);
        assert_eq!(schema["properties"]["n"]["minimum"], 1);
        assert_eq!(schema["properties"]["include_history"]["default"], true);
        assert_eq!(schema["required"], json!(["n", "operation"]));
    }

    #[test]
    fn test_descriptor_wire_shape() {
        let json = serde_json::to_value(top_n_descriptor()).unwrap();
        assert_eq!(json["name"], "top_n_products");
        assert!(json["inputSchema"]["properties"]["operation"].is_object());
        assert!(json.get("input_schema").is_none());
    }

    #[test]
    fn test_descriptor_parses_published_schema() {
        let json = json!({
            "name": "forecast_sales",
            "description": "Forecast sales",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "operation": {"type": "string", "description": "Operation name"},
                    "start_date": {"type": "string"}
                },
                "required": ["operation"]
            }
        });

        let descriptor: ToolDescriptor = serde_json::from_value(json).unwrap();
        let params = descriptor.input_schema.parameters();
        assert_eq!(params.len(), 2);
        assert!(params[0].required);
        assert_eq!(params[0].description, "Operation name");
        assert!(!params[1].required);
    }

    #[test]
    fn test_schema_rejects_required_without_property() {
        let json = json!({"type": "object", "properties": {}, "required": ["x"]});
        assert!(InputSchema::from_json_schema(&json).is_err());
    }

    #[test]
    fn test_schema_rejects_unknown_type() {
        let json = json!({"type": "object", "properties": {"x": {"type": "date"}}});
        let err = InputSchema::from_json_schema(&json).unwrap_err();
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn test_validate_name() {
        assert!(ToolDescriptor::new("echo", "").validate_name().is_ok());
        assert!(ToolDescriptor::new("sales.top-n_1", "").validate_name().is_ok());
        assert!(ToolDescriptor::new("", "").validate_name().is_err());
        assert!(ToolDescriptor::new("has space", "").validate_name().is_err());
        assert!(ToolDescriptor::new("x".repeat(65), "").validate_name().is_err());
    }

    #[test]
    fn test_tool_call_request_accessors() {
        let call = ToolCallRequest::new("top_n_products")
            .with_arg("n", 5)
            .with_arg("operation", "Dallas");

        assert_eq!(call.get_i64("n"), Some(5));
        assert_eq!(call.require_str("operation"), Ok("Dallas"));
        assert!(call.require_str("missing").is_err());
        assert_eq!(call.get_bool("n"), None);
    }
}
