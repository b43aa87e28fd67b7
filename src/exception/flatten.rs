use axum::http::{HeaderMap, StatusCode};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

/// Errors that know how they should surface over HTTP.
pub trait HttpException: Error {
    /// Stable name used as the key in exception code/message maps.
    fn class(&self) -> &str;

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}

/// Class used for errors that do not implement [`HttpException`].
pub const GENERIC_CLASS: &str = "Error";

/// Serializable snapshot of an error, detached from the live error value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenException {
    class: String,
    message: String,
    status_code: u16,
    #[serde(serialize_with = "serialize_headers")]
    headers: HeaderMap,
    previous: Option<Box<FlattenException>>,
}

impl FlattenException {
    pub fn new(class: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            status_code,
            headers: HeaderMap::new(),
            previous: None,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_previous(mut self, previous: FlattenException) -> Self {
        self.previous = Some(Box::new(previous));
        self
    }

    pub fn from_exception<E: HttpException + ?Sized>(exception: &E) -> Self {
        let flattened = Self::new(
            exception.class(),
            exception.to_string(),
            exception.status_code().as_u16(),
        )
        .with_headers(exception.headers());
        match exception.source() {
            Some(source) => flattened.with_previous(Self::from_error(source)),
            None => flattened,
        }
    }

    /// Snapshot an arbitrary error as a generic 500, keeping its source chain.
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let flattened = Self::new(
            GENERIC_CLASS,
            error.to_string(),
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        );
        match error.source() {
            Some(source) => flattened.with_previous(Self::from_error(source)),
            None => flattened,
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn previous(&self) -> Option<&FlattenException> {
        self.previous.as_deref()
    }
}

impl fmt::Display for FlattenException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.message)
    }
}

impl Error for FlattenException {}

fn serialize_headers<S: Serializer>(headers: &HeaderMap, serializer: S) -> Result<S::Ok, S::Error> {
    let map: BTreeMap<&str, String> = headers
        .iter()
        .map(|(name, value)| (name.as_str(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
        .collect();
    map.serialize(serializer)
}
