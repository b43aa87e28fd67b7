use thiserror::Error;

pub type Result<T> = std::result::Result<T, RestViewError>;

#[derive(Debug, Error)]
pub enum RestViewError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Format '{format}' is not supported by the view handler")]
    UnsupportedFormat { format: String },

    #[error("No template set for format '{format}'")]
    MissingTemplate { format: String },

    #[error("Template rendering failed: {0}")]
    Render(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestViewError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<minijinja::Error> for RestViewError {
    fn from(err: minijinja::Error) -> Self {
        RestViewError::Render(err.to_string())
    }
}

impl axum::response::IntoResponse for RestViewError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            RestViewError::InvalidArgument(_) => axum::http::StatusCode::BAD_REQUEST,
            RestViewError::UnsupportedFormat { .. } => axum::http::StatusCode::NOT_ACCEPTABLE,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
