use axum::response::Response;
use std::error::Error;

pub mod controller;
pub mod flatten;
pub mod logger;

pub use controller::{ErrorTemplate, ExceptionContext, ExceptionController};
pub use flatten::{FlattenException, HttpException};
pub use logger::{DebugLogger, LogEntry, MemoryLogger};

/// The ExceptionFilter trait
///
/// Filters handle errors thrown during request processing.
/// They must return a valid Response.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch an exception and return a response
    fn catch(&self, error: Box<dyn Error + Send + Sync>) -> Response;
}
