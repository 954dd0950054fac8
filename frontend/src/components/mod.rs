//! UI components for the bulk upload page.
//!
//! Every component reads the shared [`UploadSession`](enrol_core::UploadSession)
//! signal; the ones that talk to the backend also take the stored
//! [`GlooApi`](crate::services::GlooApi).
//!
//! - [`NoticeBanner`] - Current status message
//! - [`UploadSection`] - Template download, file selection, upload trigger
//! - [`ErrorsSection`] - Row errors and the error log download
//! - [`PreviewSection`] - Staged rows, summary and commit

mod errors;
mod notice;
mod preview;
mod upload;

pub use errors::*;
pub use notice::*;
pub use preview::*;
pub use upload::*;
