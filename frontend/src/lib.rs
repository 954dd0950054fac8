//! Enrol - bulk student upload page
//!
//! A WebAssembly frontend over the `enrol-core` upload workflow: download
//! the template, pick a CSV, preview the staged students, then commit them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  NoticeBanner (status message)                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UploadSection (template, file input, upload)                │
//! │  ErrorsSection (when validation failed)                      │
//! │  PreviewSection (when a batch is staged)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! All components share one `RwSignal<UploadSession>`. Requests run in
//! `spawn_local` between the session's `begin_*` and `finish_*` calls.
//!
//! # Modules
//!
//! - [`config`] - Backend URL and input constants
//! - [`types`] - Browser error type
//! - [`components`] - UI components
//! - [`services`] - Backend client and file helpers

use enrol_core::UploadSession;
use leptos::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::*;
pub use types::{AppError, AppResult};
pub use components::*;
pub use services::*;

// =============================================================================
// Application
// =============================================================================

#[component]
pub fn App() -> impl IntoView {
    let session = create_rw_signal(UploadSession::new());
    let api = store_value(GlooApi::from_browser());

    view! {
        <main class="container">
            <header class="hero">
                <h1>"Bulk student upload"</h1>
                <p class="hero-subtitle">
                    "Add a whole intake at once: upload a CSV, check the preview, then commit."
                </p>
            </header>

            <NoticeBanner session=session/>
            <UploadSection session=session api=api/>
            <ErrorsSection session=session/>
            <PreviewSection session=session api=api/>
        </main>
    }
}
