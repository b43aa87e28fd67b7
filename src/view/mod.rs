//! View layer: the [`View`] result type, template identifiers, the render
//! service and the listeners that turn controller results into responses.

use axum::http::StatusCode;
use serde_json::Value;

pub mod annotation;
pub mod guesser;
pub mod handler;
pub mod listener;
pub mod template;

pub use annotation::{TemplateAnnotation, TemplateAnnotationListener};
pub use guesser::{Bundle, BundleRegistry, ControllerRef, TemplateGuesser};
pub use handler::{MiniJinjaEngine, TemplateEngine, TemplatingViewHandler, ViewHandler};
pub use listener::{ViewEvent, ViewEventListener, ViewListener};
pub use template::{Template, TemplateReference};

/// Template parameters, keyed by variable name.
pub type Parameters = serde_json::Map<String, Value>;

pub const DEFAULT_FORMAT: &str = "html";

/// A controller result that asks to be rendered by the view layer.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    format: Option<String>,
    template: Option<Template>,
    parameters: Option<Parameters>,
    status_code: StatusCode,
}

impl Default for View {
    fn default() -> Self {
        Self {
            format: None,
            template: None,
            parameters: None,
            status_code: StatusCode::OK,
        }
    }
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.set_format(format);
        self
    }

    pub fn with_template(mut self, template: impl Into<Template>) -> Self {
        self.set_template(template);
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.set_parameters(parameters);
        self
    }

    pub fn with_status_code(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = Some(format.into());
    }

    pub fn set_template(&mut self, template: impl Into<Template>) {
        self.template = Some(template.into());
    }

    pub fn set_parameters(&mut self, parameters: Parameters) {
        self.parameters = Some(parameters);
    }

    /// The explicit format, or `html` when none was set.
    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    pub fn has_format(&self) -> bool {
        self.format.is_some()
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// An empty parameter map counts as "not set".
    pub fn has_parameters(&self) -> bool {
        self.parameters.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

/// What a controller action handed back.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerResult {
    View(View),
    Value(Value),
}

impl From<View> for ControllerResult {
    fn from(view: View) -> Self {
        ControllerResult::View(view)
    }
}

impl From<Value> for ControllerResult {
    fn from(value: Value) -> Self {
        ControllerResult::Value(value)
    }
}
