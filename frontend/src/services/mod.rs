//! Browser services.
//!
//! # Services
//!
//! - [`api`] - `gloo-net` implementation of the school backend contract
//! - [`files`] - Reading selected files and triggering downloads

pub mod api;
pub mod files;

pub use api::*;
pub use files::*;
