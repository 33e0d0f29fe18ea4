//! Error types for the IFC Load client.
//!
//! Validation outcomes are never errors: a CSV that fails the schema check
//! produces a [`crate::ValidationVerdict`]. The types here cover the
//! infrastructure around the matcher:
//!
//! - [`CsvError`] - reading and decoding CSV bytes
//! - [`LibraryError`] - loading and normalizing the schema library
//! - [`SettingsError`] - loading `settings.json`
//! - [`SubmissionError`] - upload gating
//! - [`LaunchError`] - viewer deep links
//! - [`ClientError`] - top-level umbrella
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while turning raw file bytes into text.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Bytes could not be decoded with the detected encoding.
    #[error("Failed to decode content as {encoding}: {message}")]
    EncodingError { encoding: String, message: String },
}

// =============================================================================
// Schema Library Errors
// =============================================================================

/// Errors while loading the schema library document.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The document is not valid JSON.
    #[error("Schema library is not valid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The document does not have the expected shape.
    #[error("Schema library has an invalid shape: {}", .errors.join("; "))]
    InvalidShape { errors: Vec<String> },

    /// An entry carries neither `columns` nor `columnName`.
    #[error("Schema entry #{index} (\"{name}\") has no `columns` or `columnName` field")]
    MissingColumns { index: usize, name: String },

    /// A selection option is empty; an empty choice means "nothing selected".
    #[error("Schema \"{name}\" has a blank selection option")]
    BlankSelectionOption { name: String },

    /// Failed to read the library file.
    #[error("Failed to read schema library: {0}")]
    IoError(#[from] std::io::Error),

    /// HTTP request for the library failed.
    #[error("Failed to fetch schema library: {0}")]
    HttpError(String),
}

// =============================================================================
// Settings Errors
// =============================================================================

/// Errors while loading client settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings document is not valid JSON.
    #[error("Invalid settings.json: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Failed to read settings file.
    #[error("Failed to read settings.json: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Submission Errors
// =============================================================================

/// Reasons the upload form may not be submitted yet.
///
/// Each message is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// No IFC model selected.
    #[error("Please select an IFC file")]
    MissingModelFile,

    /// A CSV slot has a file but no completed validation.
    #[error("Please wait for CSV validation to complete before uploading")]
    ValidationPending { file_name: String },

    /// A CSV slot failed validation.
    #[error("CSV file \"{file_name}\" failed validation: {message}")]
    ValidationFailed { file_name: String, message: String },

    /// A CSV slot needs a schema option and none is chosen.
    #[error("CSV file \"{file_name}\" requires schema selection. Please select an option from the dropdown.")]
    SelectionRequired { file_name: String },
}

// =============================================================================
// Launch Errors
// =============================================================================

/// Errors while building viewer deep links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    /// The job metadata has no area map endpoint.
    #[error("Area map endpoint not available")]
    AreaMapUnavailable,

    /// The job metadata has no individual BIM endpoint.
    #[error("BIM endpoint not available")]
    BimUnavailable,

    /// `totalBIMversion` is not an integer.
    #[error("Invalid BIM version: {0}")]
    InvalidVersion(String),
}

// =============================================================================
// Client Errors (top-level)
// =============================================================================

/// Top-level error for session orchestration.
#[derive(Debug, Error)]
pub enum ClientError {
    /// CSV read error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Schema library error.
    #[error("Schema library error: {0}")]
    Library(#[from] LibraryError),

    /// Settings error.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Submission refused.
    #[error("{0}")]
    Submission(#[from] SubmissionError),

    /// Deep link error.
    #[error("{0}")]
    Launch(#[from] LaunchError),

    /// Unknown CSV slot.
    #[error("Unknown CSV slot: {0}")]
    UnknownSlot(u32),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for schema library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type for session operations.
pub type ClientResult<T> = Result<T, ClientError>;
