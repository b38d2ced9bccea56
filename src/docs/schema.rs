//! Schema generation and property extraction for JSON Schema documents.

use serde_json::Value;

use crate::{config::ConfigFile, definition::CommandDefinition};

/// Represents information about a single property in a JSON Schema.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    /// The name of the property as defined in the schema.
    pub name: String,
    /// The JSON Schema type of the property (e.g., "string", "object").
    pub type_name: String,
    /// Human-readable description of the property.
    pub description: String,
    /// String representation of the property's default value, or "-" if not specified.
    pub default_value: String,
}

/// JSON schema of command definition documents.
pub fn definition_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(CommandDefinition)).unwrap_or(Value::Null)
}

/// JSON schema of the CLI configuration file.
pub fn config_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(ConfigFile)).unwrap_or(Value::Null)
}

/// Extracts property information from a JSON Schema document.
///
/// Returns an empty vector if the schema has no top-level properties.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use imperative::docs::schema::extract_property_info;
///
/// let schema = json!({
///     "properties": {
///         "name": {
///             "type": "string",
///             "description": "The user's name",
///             "default": "John Doe"
///         }
///     }
/// });
///
/// let properties = extract_property_info(&schema);
/// assert_eq!(properties[0].name, "name");
/// assert_eq!(properties[0].type_name, "string");
/// ```
pub fn extract_property_info(schema: &Value) -> Vec<PropertyInfo> {
    schema
        .get("properties")
        .and_then(|props| props.as_object())
        .map(build_properties)
        .unwrap_or_default()
}

fn build_properties(props_obj: &serde_json::Map<String, Value>) -> Vec<PropertyInfo> {
    props_obj
        .iter()
        .map(|(name, property)| PropertyInfo {
            name: name.clone(),
            type_name: get_type(property),
            description: get_description(property),
            default_value: get_default_value(property),
        })
        .collect()
}

fn get_type(property: &Value) -> String {
    match property.get("type") {
        Some(Value::String(type_of)) => type_of.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" | "),
        _ if property.get("$ref").is_some() => "object".to_string(),
        _ => "unknown".to_string(),
    }
}

fn get_description(property: &Value) -> String {
    property
        .get("description")
        .and_then(|desc| desc.as_str())
        .map(|desc| desc.replace('\n', " "))
        .unwrap_or_else(|| "No description provided".to_string())
}

fn get_default_value(property: &Value) -> String {
    property
        .get("default")
        .map(|def_val| match def_val {
            Value::String(s) => format!("\"{s}\""),
            _ => def_val.to_string(),
        })
        .unwrap_or_else(|| "-".to_string())
}
