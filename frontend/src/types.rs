//! Common types used across the browser bindings.
//!
//! # Categories
//!
//! - **Load Types** - what page initialization found
//! - **Error Types** - frontend error handling

use serde::{Deserialize, Serialize};
use std::fmt;
use wasm_bindgen::JsValue;

use ifcload::ClientError;

// =============================================================================
// Load Types
// =============================================================================

/// Outcome of loading settings and the schema library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// `settings.json` could not be loaded; empty endpoints are in use.
    pub settings_fallback: bool,
    /// Notice to show when `settings_fallback` is set.
    pub warning: Option<String>,
    pub library_loaded: bool,
    pub schema_count: usize,
    /// LODs known to the library, in library order.
    pub lods: Vec<String>,
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
///
/// Unified error type for all browser-side operations.
#[derive(Clone, Debug)]
pub enum AppError {
    /// Network/HTTP error.
    Network(String),
    /// Upload refused by the gate or by the server.
    Upload(String),
    /// Schema library could not be used.
    Library(String),
    /// Viewer link could not be built.
    Launch(String),
    /// A browser API failed.
    Browser(String),
    /// Invalid data format.
    Invalid(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            // Shown verbatim
            AppError::Upload(msg) => write!(f, "{}", msg),
            AppError::Library(msg) => write!(f, "Schema library error: {}", msg),
            AppError::Launch(msg) => write!(f, "{}", msg),
            AppError::Browser(msg) => write!(f, "Browser error: {}", msg),
            AppError::Invalid(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Submission(e) => AppError::Upload(e.to_string()),
            ClientError::Launch(e) => AppError::Launch(e.to_string()),
            ClientError::Library(e) => AppError::Library(e.to_string()),
            other => AppError::Invalid(other.to_string()),
        }
    }
}

impl From<gloo_net::Error> for AppError {
    fn from(err: gloo_net::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for AppError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        AppError::Invalid(err.to_string())
    }
}

impl From<AppError> for JsValue {
    fn from(err: AppError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;

/// Format a JS exception for an [`AppError`].
pub fn js_error(context: &str, value: JsValue) -> AppError {
    let detail = value.as_string().unwrap_or_else(|| format!("{:?}", value));
    AppError::Browser(format!("{}: {}", context, detail))
}
