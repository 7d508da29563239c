use serde_json::Value;
use tracing::warn;

use super::interface::ServerToolInfo;

/// Declared JSON-schema type of one tool parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Integer,
    Number,
    Array,
    String,
    /// Schema entry without a `type`; coerced like a string.
    Unspecified,
    Other(String),
}

impl ParamType {
    pub fn from_declared(declared: Option<&str>) -> Self {
        match declared {
            None => ParamType::Unspecified,
            Some("integer") => ParamType::Integer,
            Some("number") => ParamType::Number,
            Some("array") => ParamType::Array,
            Some("string") => ParamType::String,
            Some(other) => ParamType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Array => "array",
            ParamType::String => "string",
            ParamType::Unspecified => "unknown",
            ParamType::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
}

/// One capability offered by the tool provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    /// Parameters in schema order.
    pub params: Vec<ParamSpec>,
    /// False when the schema has no `properties` object at all.
    pub has_schema_properties: bool,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, params: Vec<(&str, ParamType)>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: params
                .into_iter()
                .map(|(name, kind)| ParamSpec {
                    name: name.to_string(),
                    kind,
                })
                .collect(),
            has_schema_properties: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn from_server_info(info: ServerToolInfo) -> Self {
        let properties = info
            .input_schema
            .as_ref()
            .and_then(|schema| schema.get("properties"))
            .and_then(Value::as_object);

        let params = properties
            .map(|props| {
                props
                    .iter()
                    .map(|(name, spec)| ParamSpec {
                        name: name.clone(),
                        kind: ParamType::from_declared(spec.get("type").and_then(Value::as_str)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: info.name,
            description: info.description,
            params,
            has_schema_properties: properties.is_some(),
        }
    }

    /// `name(p: type, ...)`, the signature shown to the model.
    pub fn signature(&self) -> String {
        if !self.has_schema_properties {
            return format!("{}(no parameters)", self.name);
        }
        let params = self
            .params
            .iter()
            .map(|param| format!("{}: {}", param.name, param.kind.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({params})", self.name)
    }
}

/// Immutable list of tools fetched once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Builds the catalog, keeping the first descriptor for any duplicated name.
    pub fn new(descriptors: Vec<ToolDescriptor>) -> Self {
        let mut tools: Vec<ToolDescriptor> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if tools.iter().any(|existing| existing.name == descriptor.name) {
                warn!(tool = %descriptor.name, "Duplicate tool name in catalog, keeping first");
                continue;
            }
            tools.push(descriptor);
        }
        Self { tools }
    }

    pub fn from_server_tools(infos: Vec<ServerToolInfo>) -> Self {
        Self::new(infos.into_iter().map(ToolDescriptor::from_server_info).collect())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
