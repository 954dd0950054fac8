//! # Enrol - bulk student upload from the terminal
//!
//! Drives the [`enrol_core`] upload workflow and grade-scale editor
//! against a school backend over HTTP.
//!
//! ## Modules
//!
//! - [`config`] - Backend URL and token settings
//! - [`client`] - `reqwest` implementation of [`enrol_core::SchoolApi`]
//! - [`grades`] - Grade scale CSV files
//! - [`report`] - Terminal tables and notices
//! - [`error`] - CLI error type

pub mod config;
pub mod client;
pub mod grades;
pub mod report;
pub mod error;

pub use client::HttpApi;
pub use config::{Settings, DEFAULT_API_URL};
pub use error::{CliError, CliResult};
pub use grades::{read_ranges, read_ranges_file};
