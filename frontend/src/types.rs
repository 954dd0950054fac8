//! Browser-side error type.
//!
//! Workflow errors live in `enrol-core`; this covers the JavaScript glue
//! around it (reading files, triggering downloads).

use std::fmt;

use wasm_bindgen::JsValue;

/// Failures in browser APIs.
#[derive(Clone, Debug, PartialEq)]
pub enum AppError {
    /// Reading the selected file failed.
    FileRead(String),
    /// Handing a file to the browser for download failed.
    Download(String),
    /// A browser API (window, document) is unavailable.
    Browser(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::FileRead(msg) => write!(f, "Could not read the file: {}", msg),
            AppError::Download(msg) => write!(f, "Download failed: {}", msg),
            AppError::Browser(msg) => write!(f, "Browser error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Result type alias for browser operations.
pub type AppResult<T> = Result<T, AppError>;

/// Render a thrown JavaScript value as text.
pub(crate) fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
