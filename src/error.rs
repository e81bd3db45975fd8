use std::{fmt, io};

use http::status::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[cfg(feature = "wasm")]
use serde_wasm_bindgen::Error as WasmError;

#[cfg(feature = "wasm")]
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum CatalogError {
    #[error("Browser API error: {0}")]
    Browser(String),
    #[error("Invalid Command: {0}")]
    Command(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("Operation cancelled by user")]
    OperationCancelled,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    /// Logical error reported by the backend in an `{"error": ...}` payload.
    #[error("{error}")]
    Server {
        status: u16,
        error: String,
        details: Option<String>,
    },
    #[error("Unexpected response status: {0}")]
    Status(u16),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Browser(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Command(_) => StatusCode::BAD_REQUEST,
            CatalogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::OperationCancelled => StatusCode::NO_CONTENT,
            CatalogError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Server { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|code| !code.is_success())
                .unwrap_or(StatusCode::BAD_REQUEST),
            CatalogError::Status(code) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            CatalogError::Transport(_) => StatusCode::BAD_GATEWAY,
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// True when the backend answered with a structured `error` field. Those messages are shown
    /// to the user verbatim; everything else maps to a generic message.
    pub fn is_server_reported(&self) -> bool {
        matches!(self, CatalogError::Server { .. })
    }

    /// HTTP status of the response that produced this error, if there was one.
    pub fn response_status(&self) -> Option<u16> {
        match self {
            CatalogError::Server { status, .. } | CatalogError::Status(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<JsonError> for CatalogError {
    fn from(src: JsonError) -> CatalogError {
        CatalogError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(src: toml::de::Error) -> CatalogError {
        CatalogError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for CatalogError {
    fn from(src: toml::ser::Error) -> CatalogError {
        CatalogError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<UrlParseError> for CatalogError {
    fn from(src: UrlParseError) -> CatalogError {
        CatalogError::Config(format!("Invalid URL: {src}"))
    }
}

impl From<io::Error> for CatalogError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => CatalogError::NotFound(format!("{x}")),
            _ => CatalogError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for CatalogError {
    fn from(x: fmt::Error) -> Self {
        CatalogError::Serialization(format!("{x}"))
    }
}

#[cfg(feature = "bin")]
impl From<reqwest::Error> for CatalogError {
    fn from(src: reqwest::Error) -> Self {
        CatalogError::Transport(format!("{src}"))
    }
}

#[cfg(feature = "wasm")]
impl From<WasmError> for CatalogError {
    fn from(wasm_error: WasmError) -> Self {
        CatalogError::Serialization(format!("Serde-wasm-bindgen error: {wasm_error}"))
    }
}

#[cfg(feature = "wasm")]
impl From<JsValue> for CatalogError {
    fn from(value: JsValue) -> Self {
        CatalogError::Browser(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}

#[cfg(feature = "wasm")]
impl From<CatalogError> for JsValue {
    fn from(err: CatalogError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
