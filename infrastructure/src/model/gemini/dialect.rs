//! Descriptor → Gemini `functionDeclarations` translation

use serde_json::{Map, Value, json};
use toolwire_application::FunctionDialect;
use toolwire_domain::{ToolDescriptor, ToolParameter};

/// Gemini's OpenAPI-subset schema: upper-case type names, string enums.
pub struct GeminiDialect;

impl GeminiDialect {
    fn property(param: &ToolParameter) -> Value {
        let mut prop = Map::new();
        prop.insert(
            "type".to_string(),
            json!(param.param_type.as_str().to_ascii_uppercase()),
        );
        if !param.description.is_empty() {
            prop.insert("description".to_string(), json!(param.description));
        }
        if let Some(allowed) = &param.constraints.allowed {
            let values: Vec<String> = allowed
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            prop.insert("enum".to_string(), json!(values));
        }
        if let Some(min) = param.constraints.minimum {
            prop.insert("minimum".to_string(), json!(min));
        }
        if let Some(max) = param.constraints.maximum {
            prop.insert("maximum".to_string(), json!(max));
        }
        Value::Object(prop)
    }
}

impl FunctionDialect for GeminiDialect {
    fn declare(&self, tool: &ToolDescriptor) -> Value {
        let mut decl = json!({
            "name": tool.name,
            "description": tool.description,
        });

        // Gemini rejects an OBJECT schema with no properties
        let params = tool.input_schema.parameters();
        if !params.is_empty() {
            let properties: Map<String, Value> = params
                .iter()
                .map(|p| (p.name.clone(), Self::property(p)))
                .collect();
            let required: Vec<&str> = tool.input_schema.required().collect();
            decl["parameters"] = json!({
                "type": "OBJECT",
                "properties": properties,
                "required": required,
            });
        }
        decl
    }
}
