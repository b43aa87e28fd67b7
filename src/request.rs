use crate::view::{Parameters, Template, DEFAULT_FORMAT};
use serde_json::Value;
use std::collections::HashMap;

/// Explicit template override for the current request.
pub const TEMPLATE: &str = "_template";
/// Variable names requested by the template annotation.
pub const TEMPLATE_VARS: &str = "_template_vars";
/// Variable names derived from the controller action's arguments.
pub const TEMPLATE_DEFAULT_VARS: &str = "_template_default_vars";
pub const FORMAT: &str = "_format";

/// Per-request attribute storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestAttributes {
    attributes: HashMap<String, Value>,
}

impl RequestAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn format(&self) -> &str {
        self.get(FORMAT)
            .and_then(Value::as_str)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FORMAT)
    }

    /// The `_template` override, if one is set and non-empty.
    pub fn template(&self) -> Option<Template> {
        self.get(TEMPLATE)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(Template::parse)
    }

    /// `_template_vars` when non-empty, else `_template_default_vars`.
    pub fn template_var_names(&self) -> Vec<String> {
        let explicit = self.string_list(TEMPLATE_VARS);
        if explicit.is_empty() {
            self.string_list(TEMPLATE_DEFAULT_VARS)
        } else {
            explicit
        }
    }

    /// Build template parameters by reading each named attribute.
    /// Missing attributes become `null`.
    pub fn collect_parameters(&self) -> Parameters {
        self.template_var_names()
            .into_iter()
            .map(|name| {
                let value = self.get(&name).cloned().unwrap_or(Value::Null);
                (name, value)
            })
            .collect()
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}
