//! # IFC Load - CSV schema validation for IFC processing uploads
//!
//! An IFC model is uploaded together with auxiliary CSV files. Each CSV is
//! checked against a library of named header schemas, scoped by the level of
//! detail (LOD) chosen for the upload, before the bundle is sent for
//! processing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│   Parser    │────▶│   Matcher   │────▶│   Verdict   │
//! │ (UTF-8/ISO) │     │  (header)   │     │ (LOD-scoped)│     │  (per slot) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//!                                      ┌─────────┴─────────┐
//!                                      │  Schema Library   │
//!                                      │ (CSVSchema.json)  │
//!                                      └───────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use ifcload::{load_library_str, validate_csv};
//!
//! let library = load_library_str(r#"{ "schema": [
//!     { "name": "Doors", "selectedLOD": "LOD300",
//!       "columns": ["DoorId"], "selection": ["Internal", "External"] }
//! ] }"#).unwrap();
//!
//! let verdict = validate_csv(&library, "DoorId,Width\nD1,900\n", "LOD300", None);
//! assert!(!verdict.is_valid);
//! assert!(verdict.requires_selection);
//!
//! let verdict = validate_csv(&library, "DoorId,Width\nD1,900\n", "LOD300", Some("Internal"));
//! assert!(verdict.is_valid);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Schema definitions, library and header rows
//! - [`parser`] - Header extraction and encoding detection
//! - [`library`] - Schema library loading and shape check
//! - [`validation`] - The schema matcher and its verdicts
//! - [`slots`] - Per-attachment validation state
//! - [`submission`] - Upload gate and form layout
//! - [`job`] - Job status and viewer links
//! - [`session`] - Settings and page state

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Schema library
pub mod library;

// Validation
pub mod validation;

// Upload workflow
pub mod slots;
pub mod submission;
pub mod job;
pub mod session;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ClientError,
    ClientResult,
    CsvError,
    LaunchError,
    LibraryError,
    SettingsError,
    SubmissionError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{HeaderRow, SchemaDefinition, SchemaLibrary};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_bytes,
    detect_delimiter,
    detect_encoding,
    header_row,
    parse_header_line,
    read_csv_file,
    DecodedCsv,
};

// =============================================================================
// Re-exports - Schema Library
// =============================================================================

pub use library::{
    append_query,
    library_url,
    load_library_file,
    load_library_str,
    load_library_value,
    LIBRARY_FILE_NAME,
};

#[cfg(feature = "fetch")]
pub use library::{fetch_library, load_library_source};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate_csv, SchemaMatcher, ValidationVerdict, VerdictErrorKind};

// =============================================================================
// Re-exports - Upload workflow
// =============================================================================

pub use slots::{Completion, CsvSlot, Dropdown, SlotId, SlotStatus, SlotTracker, SlotView, Ticket};

pub use submission::{check_submission, upload_url, UploadAttachment, UploadForm, UploadResponse};

pub use job::{area_map_url, bim_url, status_url, JobMetadata, JobStatus};

pub use session::{Session, Settings, Theme};
