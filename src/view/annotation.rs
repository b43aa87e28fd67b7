use crate::di::{Container, Injectable};
use crate::error::Result;
use crate::request::{RequestAttributes, TEMPLATE, TEMPLATE_DEFAULT_VARS, TEMPLATE_VARS};
use crate::view::{
    BundleRegistry, ControllerRef, ControllerResult, TemplateGuesser, View, ViewEvent,
    ViewEventListener, ViewHandler,
};
use serde_json::Value;
use std::sync::Arc;

/// A parsed `#[template]`-style annotation on a controller action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateAnnotation {
    pub template: Option<String>,
    pub vars: Vec<String>,
}

impl TemplateAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vars = vars.into_iter().map(Into::into).collect();
        self
    }
}

/// Default listener for annotated actions that return plain data.
///
/// `on_controller` records the template and variable names on the request;
/// `on_view` renders object (or null) results through that template.
pub struct TemplateAnnotationListener {
    guesser: TemplateGuesser,
    view_handler: Arc<dyn ViewHandler>,
}

impl TemplateAnnotationListener {
    pub fn new(guesser: TemplateGuesser, view_handler: Arc<dyn ViewHandler>) -> Self {
        Self {
            guesser,
            view_handler,
        }
    }

    pub fn on_controller(
        &self,
        controller: &ControllerRef,
        request: &mut RequestAttributes,
        annotation: Option<&TemplateAnnotation>,
    ) -> Result<()> {
        let Some(annotation) = annotation else {
            return Ok(());
        };

        let template = match &annotation.template {
            Some(template) => template.clone(),
            None => self
                .guesser
                .guess_template_name(controller, request)?
                .logical_name(),
        };
        tracing::debug!(template = %template, controller = %controller.class, "template selected");

        request.set(TEMPLATE, template);
        request.set(TEMPLATE_VARS, annotation.vars.clone());
        request.set(TEMPLATE_DEFAULT_VARS, controller.arguments.clone());
        Ok(())
    }
}

impl Injectable for TemplateAnnotationListener {
    fn inject(container: &Container) -> Result<Self> {
        let bundles = container
            .resolve::<BundleRegistry>()
            .map(|registry| registry.as_ref().clone())
            .unwrap_or_default();
        Ok(Self::new(
            TemplateGuesser::new(bundles),
            container.resolve_trait::<dyn ViewHandler>()?,
        ))
    }
}

impl ViewEventListener for TemplateAnnotationListener {
    fn on_view(&self, event: &mut ViewEvent) -> Result<()> {
        if event.has_response() {
            return Ok(());
        }
        let Some(template) = event.request().template() else {
            return Ok(());
        };

        let parameters = match event.controller_result() {
            Some(ControllerResult::Value(Value::Object(map))) => map.clone(),
            Some(ControllerResult::Value(Value::Null)) | None => {
                event.request().collect_parameters()
            }
            _ => return Ok(()),
        };

        let view = View::new()
            .with_format(event.request().format())
            .with_template(template)
            .with_parameters(parameters);
        let response = self.view_handler.handle(view)?;
        event.set_response(response);
        Ok(())
    }
}
