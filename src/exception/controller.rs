use crate::config::ExceptionSettings;
use crate::di::{Container, Injectable};
use crate::error::{RestViewError, Result};
use crate::exception::{DebugLogger, ExceptionFilter, FlattenException};
use crate::kernel::Kernel;
use crate::view::{DEFAULT_FORMAT, Parameters, TemplateReference, View, ViewHandler};
use axum::{
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::error::Error;
use std::sync::Arc;
use strum_macros::Display;

pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// Which built-in exception page to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorTemplate {
    ExceptionFull,
    Exception,
    Error,
}

/// Everything [`ExceptionController::show`] needs for one failed request.
pub struct ExceptionContext {
    pub exception: FlattenException,
    pub logger: Option<Arc<dyn DebugLogger>>,
    pub format: String,
    /// Output produced before the failure; handed to the template and discarded.
    pub current_content: String,
}

impl ExceptionContext {
    pub fn new(exception: FlattenException) -> Self {
        Self {
            exception,
            logger: None,
            format: DEFAULT_FORMAT.to_string(),
            current_content: String::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn DebugLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_current_content(mut self, content: impl Into<String>) -> Self {
        self.current_content = content.into();
        self
    }
}

/// Converts flattened exceptions into responses through the view layer,
/// applying the configured status overrides and message allow-list.
pub struct ExceptionController {
    settings: Arc<ExceptionSettings>,
    view_handler: Arc<dyn ViewHandler>,
    debug: bool,
    default_format: String,
}

impl ExceptionController {
    pub fn new(
        settings: Arc<ExceptionSettings>,
        view_handler: Arc<dyn ViewHandler>,
        debug: bool,
    ) -> Self {
        Self {
            settings,
            view_handler,
            debug,
            default_format: DEFAULT_FORMAT.to_string(),
        }
    }

    /// Format used by [`ExceptionFilter::catch`], which has no request to ask.
    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = format.into();
        self
    }

    pub fn show(&self, context: ExceptionContext) -> Response {
        let format = self.format(&context.format);
        let code = self.status_code(&context.exception);
        let parameters = self.parameters(&context, code, &format);
        tracing::debug!(
            class = context.exception.class(),
            status = code,
            format = %format,
            "rendering exception"
        );

        let view = View::new()
            .with_format(format.clone())
            .with_template(self.template(&format))
            .with_parameters(parameters);
        let rendered = StatusCode::from_u16(code)
            .map_err(|_| {
                RestViewError::invalid_argument(format!(
                    "The HTTP status code \"{}\" is not valid.",
                    code
                ))
            })
            .and_then(|status| self.view_handler.handle(view.with_status_code(status)));

        let mut response = match rendered {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    class = context.exception.class(),
                    error = %err,
                    "exception rendering failed, falling back to plain response"
                );
                let message = if self.debug {
                    err.to_string()
                } else {
                    INTERNAL_SERVER_ERROR_MESSAGE.to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        };

        replace_headers(response.headers_mut(), context.exception.headers());
        response
    }

    fn format(&self, format: &str) -> String {
        format.to_string()
    }

    fn status_code(&self, exception: &FlattenException) -> u16 {
        self.settings
            .code_for(exception.class())
            .unwrap_or_else(|| exception.status_code())
    }

    fn exception_message(&self, exception: &FlattenException) -> String {
        if self.settings.exposes_message(exception.class()) {
            exception.message().to_string()
        } else {
            String::new()
        }
    }

    fn template(&self, format: &str) -> TemplateReference {
        let name = match (self.debug, format) {
            (true, "html") => ErrorTemplate::ExceptionFull,
            (true, _) => ErrorTemplate::Exception,
            (false, _) => ErrorTemplate::Error,
        };
        TemplateReference::new("FrameworkBundle", "Exception", name.to_string(), format)
    }

    fn parameters(&self, context: &ExceptionContext, code: u16, format: &str) -> Parameters {
        let status_text = StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default();

        let mut parameters = Parameters::new();
        parameters.insert("status".into(), json!("error"));
        parameters.insert("status_code".into(), json!(code));
        parameters.insert("status_text".into(), json!(status_text));
        parameters.insert("currentContent".into(), json!(context.current_content));
        parameters.insert(
            "message".into(),
            json!(self.exception_message(&context.exception)),
        );

        if format == "html" {
            parameters.insert(
                "exception".into(),
                serde_json::to_value(&context.exception).unwrap_or_default(),
            );
            let logger = context.logger.as_ref().map_or(Value::Null, |logger| {
                json!({ "logs": logger.logs(), "errors": logger.count_errors() })
            });
            parameters.insert("logger".into(), logger);
        }
        parameters
    }
}

/// Swap in the exception's headers. The rendered content type survives unless
/// the exception sets its own.
fn replace_headers(target: &mut HeaderMap, headers: &HeaderMap) {
    let content_type = target.remove(CONTENT_TYPE);
    *target = headers.clone();
    if let Some(content_type) = content_type {
        target.entry(CONTENT_TYPE).or_insert(content_type);
    }
}

impl Injectable for ExceptionController {
    fn inject(container: &Container) -> Result<Self> {
        let settings = match container.resolve::<ExceptionSettings>() {
            Ok(settings) => settings,
            Err(_) => Arc::new(ExceptionSettings::from_container(container)?),
        };
        let kernel = container.resolve::<Kernel>()?;
        Ok(Self::new(
            settings,
            container.resolve_trait::<dyn ViewHandler>()?,
            kernel.is_debug(),
        ))
    }
}

impl ExceptionFilter for ExceptionController {
    fn catch(&self, error: Box<dyn Error + Send + Sync>) -> Response {
        let exception = match error.downcast::<FlattenException>() {
            Ok(flattened) => *flattened,
            Err(other) => FlattenException::from_error(&*other),
        };
        self.show(ExceptionContext::new(exception).with_format(self.default_format.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::MemoryLogger;
    use crate::view::{MiniJinjaEngine, Template, TemplatingViewHandler};
    use axum::http::header::{HeaderValue, WWW_AUTHENTICATE};
    use std::sync::Mutex;
    use tracing::Level;

    /// Captures the view instead of rendering it.
    #[derive(Default)]
    struct CapturingHandler {
        last: Mutex<Option<View>>,
    }

    impl ViewHandler for CapturingHandler {
        fn handle(&self, view: View) -> Result<Response> {
            let status = view.status_code();
            *self.last.lock().unwrap() = Some(view);
            Ok(status.into_response())
        }
    }

    struct FailingHandler;

    impl ViewHandler for FailingHandler {
        fn handle(&self, _view: View) -> Result<Response> {
            Err(RestViewError::Render("template exploded".to_string()))
        }
    }

    fn settings() -> Arc<ExceptionSettings> {
        Arc::new(
            ExceptionSettings::new()
                .with_code("NotFound", 404)
                .with_code("Teapot", 418)
                .with_message("NotFound", true)
                .with_message("Hidden", false),
        )
    }

    fn capturing(debug: bool) -> (ExceptionController, Arc<CapturingHandler>) {
        let handler = Arc::new(CapturingHandler::default());
        let controller = ExceptionController::new(settings(), handler.clone(), debug);
        (controller, handler)
    }

    fn last_view(handler: &CapturingHandler) -> View {
        handler.last.lock().unwrap().clone().unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_mapped_class_uses_configured_status() {
        let (controller, handler) = capturing(false);
        let response = controller.show(ExceptionContext::new(FlattenException::new(
            "NotFound", "no such user", 500,
        )));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let view = last_view(&handler);
        let parameters = view.parameters().unwrap();
        assert_eq!(parameters["status"], json!("error"));
        assert_eq!(parameters["status_code"], json!(404));
        assert_eq!(parameters["status_text"], json!("Not Found"));
        assert_eq!(parameters["message"], json!("no such user"));
    }

    #[test]
    fn test_unmapped_class_keeps_own_status_and_hides_message() {
        let (controller, handler) = capturing(false);
        let response = controller.show(ExceptionContext::new(FlattenException::new(
            "Conflict", "secret detail", 409,
        )));

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let parameters = last_view(&handler).parameters().cloned().unwrap();
        assert_eq!(parameters["message"], json!(""));
    }

    #[test]
    fn test_message_flag_false_hides_message() {
        let (controller, handler) = capturing(true);
        controller.show(ExceptionContext::new(FlattenException::new(
            "Hidden", "secret", 400,
        )));
        assert_eq!(
            last_view(&handler).parameters().unwrap()["message"],
            json!("")
        );
    }

    #[test]
    fn test_html_includes_exception_and_logger() {
        let (controller, handler) = capturing(false);
        let logger = Arc::new(MemoryLogger::new());
        logger.record(Level::ERROR, "query failed");
        logger.record(Level::INFO, "retrying");

        controller.show(
            ExceptionContext::new(FlattenException::new("Teapot", "short and stout", 500))
                .with_logger(logger)
                .with_current_content("partial output"),
        );

        let view = last_view(&handler);
        let parameters = view.parameters().unwrap();
        assert_eq!(parameters["exception"]["class"], json!("Teapot"));
        assert_eq!(parameters["logger"]["errors"], json!(1));
        assert_eq!(parameters["logger"]["logs"][1]["message"], json!("retrying"));
        assert_eq!(parameters["currentContent"], json!("partial output"));
        assert_eq!(parameters["status_text"], json!("I'm a teapot"));
    }

    #[test]
    fn test_html_without_logger_sets_null() {
        let (controller, handler) = capturing(false);
        controller.show(ExceptionContext::new(FlattenException::new("X", "", 500)));
        let view = last_view(&handler);
        assert_eq!(view.parameters().unwrap()["logger"], Value::Null);
    }

    #[test]
    fn test_other_formats_omit_exception_and_logger() {
        let (controller, handler) = capturing(false);
        controller.show(
            ExceptionContext::new(FlattenException::new("X", "", 500))
                .with_logger(Arc::new(MemoryLogger::new()))
                .with_format("json"),
        );

        let view = last_view(&handler);
        let parameters = view.parameters().unwrap();
        assert!(!parameters.contains_key("exception"));
        assert!(!parameters.contains_key("logger"));
        assert_eq!(view.format(), "json");
    }

    #[test]
    fn test_template_selection() {
        let cases = [
            (true, "html", "FrameworkBundle:Exception:exception_full.html.jinja"),
            (true, "json", "FrameworkBundle:Exception:exception.json.jinja"),
            (false, "html", "FrameworkBundle:Exception:error.html.jinja"),
            (false, "json", "FrameworkBundle:Exception:error.json.jinja"),
        ];
        for (debug, format, expected) in cases {
            let (controller, handler) = capturing(debug);
            controller.show(
                ExceptionContext::new(FlattenException::new("X", "", 500)).with_format(format),
            );
            assert_eq!(
                last_view(&handler).template().map(Template::to_string),
                Some(expected.to_string())
            );
        }
    }

    #[tokio::test]
    async fn test_render_failure_falls_back_to_generic_500() {
        let controller = ExceptionController::new(settings(), Arc::new(FailingHandler), false);
        let response = controller.show(ExceptionContext::new(FlattenException::new(
            "NotFound", "gone", 404,
        )));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, INTERNAL_SERVER_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_render_failure_in_debug_exposes_failure_message() {
        let controller = ExceptionController::new(settings(), Arc::new(FailingHandler), true);
        let response = controller.show(ExceptionContext::new(FlattenException::new(
            "NotFound", "gone", 404,
        )));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            RestViewError::Render("template exploded".to_string()).to_string()
        );
    }

    #[test]
    fn test_invalid_status_code_falls_back() {
        let controller = ExceptionController::new(
            Arc::new(ExceptionSettings::new().with_code("Weird", 42)),
            Arc::new(CapturingHandler::default()),
            false,
        );
        let response = controller.show(ExceptionContext::new(FlattenException::new(
            "Weird", "", 500,
        )));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_exception_headers_replace_response_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        let exception = FlattenException::new("Unauthorized", "", 401).with_headers(headers);

        let controller = ExceptionController::new(settings(), Arc::new(FailingHandler), false);
        let response = controller.show(ExceptionContext::new(exception));

        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.headers().len(), 2);
    }

    #[tokio::test]
    async fn test_renders_builtin_html_page() {
        let engine = MiniJinjaEngine::with_exception_templates().unwrap();
        let handler = Arc::new(TemplatingViewHandler::new(Arc::new(engine)));
        let controller = ExceptionController::new(settings(), handler, false);

        let response = controller.show(ExceptionContext::new(FlattenException::new(
            "NotFound", "no <script>", 500,
        )));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_string(response).await;
        assert!(body.contains("<h1>404 Not Found</h1>"));
        assert!(body.contains("no &lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_catch_flattens_boxed_errors() {
        let engine = MiniJinjaEngine::with_exception_templates().unwrap();
        let handler = Arc::new(TemplatingViewHandler::new(Arc::new(engine)));
        let controller =
            ExceptionController::new(settings(), handler, false).with_default_format("json");

        let boxed: Box<dyn Error + Send + Sync> =
            Box::new(FlattenException::new("NotFound", "missing", 500));
        let response = controller.catch(boxed);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["message"], json!("missing"));

        let io = std::io::Error::other("disk full");
        let response = controller.catch(Box::new(io));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["message"], json!(""));
        assert_eq!(body["status_text"], json!("Internal Server Error"));
    }
}
