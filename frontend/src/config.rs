//! Application configuration.
//!
//! Compile-time settings for the upload page. The bearer token is not
//! configured here: whatever signed the user in leaves it in local storage
//! under [`TOKEN_STORAGE_KEY`].

/// Backend API base URL.
pub const BACKEND_URL: &str = "http://localhost:8000/api";

/// Local storage key holding the bearer token.
pub const TOKEN_STORAGE_KEY: &str = "auth_token";

/// Value of the file input's `accept` attribute.
pub const ACCEPTED_FILES: &str = ".csv,text/csv";

pub use enrol_core::MAX_UPLOAD_BYTES;
