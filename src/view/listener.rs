use crate::di::{Container, Injectable};
use crate::error::Result;
use crate::request::RequestAttributes;
use crate::view::{ControllerResult, TemplateAnnotationListener, View, ViewHandler};
use axum::response::Response;
use std::sync::Arc;

/// The "controller returned something other than a response" event.
pub struct ViewEvent {
    request: RequestAttributes,
    controller_result: Option<ControllerResult>,
    response: Option<Response>,
}

impl ViewEvent {
    pub fn new(request: RequestAttributes, controller_result: impl Into<ControllerResult>) -> Self {
        Self {
            request,
            controller_result: Some(controller_result.into()),
            response: None,
        }
    }

    pub fn request(&self) -> &RequestAttributes {
        &self.request
    }

    pub fn controller_result(&self) -> Option<&ControllerResult> {
        self.controller_result.as_ref()
    }

    /// Takes the controller result only if it is a [`View`].
    pub fn take_view(&mut self) -> Option<View> {
        match self.controller_result.take() {
            Some(ControllerResult::View(view)) => Some(view),
            other => {
                self.controller_result = other;
                None
            }
        }
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    pub fn set_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}

pub trait ViewEventListener: Send + Sync + 'static {
    fn on_view(&self, event: &mut ViewEvent) -> Result<()>;
}

/// Renders [`View`] results; everything else goes to the fallback listener.
pub struct ViewListener {
    view_handler: Arc<dyn ViewHandler>,
    fallback: Arc<dyn ViewEventListener>,
}

impl ViewListener {
    pub fn new(view_handler: Arc<dyn ViewHandler>, fallback: Arc<dyn ViewEventListener>) -> Self {
        Self {
            view_handler,
            fallback,
        }
    }
}

impl Injectable for ViewListener {
    fn inject(container: &Container) -> Result<Self> {
        let fallback = TemplateAnnotationListener::inject(container)?;
        Ok(Self::new(
            container.resolve_trait::<dyn ViewHandler>()?,
            Arc::new(fallback),
        ))
    }
}

impl ViewEventListener for ViewListener {
    fn on_view(&self, event: &mut ViewEvent) -> Result<()> {
        let Some(mut view) = event.take_view() else {
            tracing::debug!("controller result is not a view, delegating");
            return self.fallback.on_view(event);
        };

        if !view.has_parameters() {
            view.set_parameters(event.request().collect_parameters());
        }

        if let Some(template) = event.request().template() {
            view.set_template(template);
        }

        if !view.has_format() {
            view.set_format(event.request().format());
        }

        let response = self.view_handler.handle(view)?;
        event.set_response(response);
        Ok(())
    }
}
