use crate::di::{Container, Injectable};
use crate::error::{RestViewError, Result};
use crate::view::{Parameters, Template, TemplateReference, View};
use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use minijinja::{AutoEscape, Environment};
use std::sync::Arc;

/// The render service: turns a [`View`] into an HTTP response.
pub trait ViewHandler: Send + Sync + 'static {
    fn handle(&self, view: View) -> Result<Response>;
}

/// A template engine the view handler renders html through.
pub trait TemplateEngine: Send + Sync + 'static {
    fn render(&self, template: &Template, parameters: &Parameters) -> Result<String>;

    fn exists(&self, template: &Template) -> bool;
}

/// Default [`ViewHandler`]: html goes through the template engine, json is
/// serialized straight from the parameters.
pub struct TemplatingViewHandler {
    engine: Arc<dyn TemplateEngine>,
}

impl TemplatingViewHandler {
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self { engine }
    }
}

impl Injectable for TemplatingViewHandler {
    fn inject(container: &Container) -> Result<Self> {
        Ok(Self::new(container.resolve_trait::<dyn TemplateEngine>()?))
    }
}

impl ViewHandler for TemplatingViewHandler {
    fn handle(&self, view: View) -> Result<Response> {
        let parameters = view.parameters().cloned().unwrap_or_default();
        let status = view.status_code();

        match view.format() {
            "html" => {
                let template = view.template().ok_or_else(|| RestViewError::MissingTemplate {
                    format: view.format().to_string(),
                })?;
                let body = self.engine.render(template, &parameters)?;
                Ok((status, [(CONTENT_TYPE, "text/html; charset=utf-8")], body).into_response())
            }
            "json" => {
                let body = serde_json::to_string(&parameters)?;
                Ok((status, [(CONTENT_TYPE, "application/json")], body).into_response())
            }
            other => Err(RestViewError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>{{ status_code }} {{ status_text }}</title></head>
<body>
<h1>{{ status_code }} {{ status_text }}</h1>
{% if message %}<p>{{ message }}</p>{% endif %}
</body>
</html>
"#;

const EXCEPTION_FULL_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>{{ exception.class }}: {{ exception.message }}</title></head>
<body>
<h1>{{ status_code }} {{ status_text }}</h1>
<h2>{{ exception.class }}</h2>
<pre>{{ exception.message }}</pre>
{% if exception.previous %}
<h3>Caused by {{ exception.previous.class }}</h3>
<pre>{{ exception.previous.message }}</pre>
{% endif %}
{% if logger %}
<h2>Logs ({{ logger.errors }} errors)</h2>
<ul>{% for entry in logger.logs %}<li>[{{ entry.level }}] {{ entry.message }}</li>{% endfor %}</ul>
{% endif %}
{% if currentContent %}<pre>{{ currentContent }}</pre>{% endif %}
</body>
</html>
"#;

/// [`TemplateEngine`] backed by `minijinja`.
///
/// Templates are addressed by their display name, so a reference is looked up
/// by its logical name. Names containing `.html` are auto-escaped.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|name| {
            if name.contains(".html") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        Self { env }
    }

    /// Also registers the built-in html exception pages.
    pub fn with_exception_templates() -> Result<Self> {
        let mut engine = Self::new();
        for (name, source) in [
            ("error", ERROR_HTML),
            ("exception", ERROR_HTML),
            ("exception_full", EXCEPTION_FULL_HTML),
        ] {
            let reference = TemplateReference::new("FrameworkBundle", "Exception", name, "html");
            engine.add_template(reference.logical_name(), source)?;
        }
        Ok(engine)
    }

    pub fn add_template(&mut self, name: impl Into<String>, source: impl Into<String>) -> Result<()> {
        self.env.add_template_owned(name.into(), source.into())?;
        Ok(())
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template: &Template, parameters: &Parameters) -> Result<String> {
        let name = template.to_string();
        Ok(self.env.get_template(&name)?.render(parameters)?)
    }

    fn exists(&self, template: &Template) -> bool {
        self.env.get_template(&template.to_string()).is_ok()
    }
}
