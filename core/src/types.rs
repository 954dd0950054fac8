//! Common types shared by the workflow and its UI adapters.
//!
//! # Categories
//!
//! - **Notice Types** - The single user-visible message slot
//! - **Selection Types** - The locally chosen file
//! - **Batch Types** - Server-issued preview batches and their rows
//! - **Failure Types** - Server-side validation failures
//! - **Export Types** - Files handed to the UI for download

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// Notice Types
// =============================================================================

/// Severity of a notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl NoticeLevel {
    /// CSS class for alert styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "alert-info",
            NoticeLevel::Success => "alert-success",
            NoticeLevel::Warning => "alert-warning",
            NoticeLevel::Danger => "alert-danger",
        }
    }

    /// Emoji prefix for terminal display.
    pub fn emoji(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "ℹ️",
            NoticeLevel::Success => "✅",
            NoticeLevel::Warning => "⚠️",
            NoticeLevel::Danger => "❌",
        }
    }
}

/// A message for the user, replacing whatever was shown before.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Danger, text: text.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level.emoji(), self.text)
    }
}

// =============================================================================
// Selection Types
// =============================================================================

/// A CSV file that passed the local gate and is ready to upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadSelection {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadSelection {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// Keeps multi-megabyte payloads out of debug logs.
impl fmt::Debug for UploadSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadSelection")
            .field("name", &self.name)
            .field("size", &self.size())
            .finish()
    }
}

// =============================================================================
// Batch Types
// =============================================================================

/// One truncated, human-readable row of a previewed upload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewRow {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub admission_no: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub session: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub class: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub arm: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub section: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub parent_email: Option<String>,
}

impl PreviewRow {
    /// Class, arm and section joined for display, e.g. `JSS1 / A / Junior`.
    pub fn placement(&self) -> String {
        [&self.class, &self.arm, &self.section]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Aggregate counts for a previewed upload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub total_rows: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub sessions: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub classes: u64,
}

/// A validated-but-uncommitted upload staged on the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewBatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub batch_id: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub preview_rows: Vec<PreviewRow>,
    #[serde(default)]
    pub summary: Option<BatchSummary>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PreviewBatch {
    /// Whether the batch's validity window has passed at `now`.
    ///
    /// A batch without an expiry never expires client-side.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Accepts RFC 3339, or a naive ISO timestamp taken as UTC; anything else is `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    log::warn!("Ignoring unparseable batch expiry: {}", raw);
    None
}

// =============================================================================
// Failure Types
// =============================================================================

/// One offending cell reported by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowError {
    #[serde(deserialize_with = "null_as_default")]
    pub row: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub column: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

/// A preview attempt the server rejected. No batch exists for it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub errors: Vec<RowError>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub error_csv: Option<String>,
}

// =============================================================================
// Lenient Deserializers
// =============================================================================

/// `null` reads as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings kept as-is, numbers and booleans rendered as text, anything else `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// A list read entry by entry. Unreadable entries are skipped; `null` or a
/// non-list reads as empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            log::warn!("Expected a list, ignoring: {}", other);
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect())
}

/// Outcome of a successful commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitResult {
    pub processed: u64,
    pub message: String,
}

// =============================================================================
// Export Types
// =============================================================================

/// A file produced for the user to save.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ExportedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedFile")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}
