//! # restview
//!
//! Exception-to-response mapping and annotation-driven view resolution for
//! axum applications.
//!
//! ## Features
//!
//! - **Exception controller**: turns a [`FlattenException`](exception::FlattenException)
//!   into a response through the view layer, with configurable status overrides
//!   and a message allow-list
//! - **View listener**: renders [`View`](view::View) results returned by controllers,
//!   filling parameters and template from request attributes
//! - **Template guessing**: infers `Bundle:Controller:action.format.engine`
//!   references from controller type paths
//! - **Bootstrap DI**: components resolve their collaborators once from a
//!   [`Container`](di::Container)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restview::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> restview::Result<()> {
//! let mut container = ContainerBuilder::new()
//!     .register(Kernel::new(false))
//!     .register(MiniJinjaEngine::with_exception_templates()?)
//!     .bind::<dyn TemplateEngine, MiniJinjaEngine, _>(|e| e as Arc<dyn TemplateEngine>)
//!     .parameter("restview.exception.codes", json!({"NotFound": 404}))
//!     .parameter("restview.exception.messages", json!({"NotFound": true}))
//!     .build();
//!
//! let handler = TemplatingViewHandler::inject(&container)?;
//! container.register(handler);
//! container.register_trait::<dyn ViewHandler, TemplatingViewHandler, _>(|h| h as Arc<dyn ViewHandler>);
//!
//! let exceptions = ExceptionController::inject(&container)?;
//! let response = exceptions.show(ExceptionContext::new(FlattenException::new(
//!     "NotFound",
//!     "no such user",
//!     500,
//! )));
//! assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod di;
pub mod error;
pub mod exception;
pub mod kernel;
pub mod request;
pub mod view;

pub use error::{RestViewError, Result};

pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use restview::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigService, ExceptionSettings};
    pub use crate::di::{Container, ContainerBuilder, Injectable};
    pub use crate::error::{RestViewError, Result};
    pub use crate::exception::{
        DebugLogger, ExceptionContext, ExceptionController, ExceptionFilter, FlattenException,
        HttpException, MemoryLogger,
    };
    pub use crate::kernel::Kernel;
    pub use crate::request::RequestAttributes;
    pub use crate::view::{
        Bundle, BundleRegistry, ControllerRef, ControllerResult, MiniJinjaEngine, Template,
        TemplateAnnotation, TemplateAnnotationListener, TemplateEngine, TemplateGuesser,
        TemplateReference, TemplatingViewHandler, View, ViewEvent, ViewEventListener,
        ViewHandler, ViewListener,
    };
    pub use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
