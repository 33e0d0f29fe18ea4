//! The structured result of validating one CSV against the schema library.

use serde::{Deserialize, Serialize};

/// Why a verdict is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerdictErrorKind {
    /// No error (valid, possibly with a warning).
    #[default]
    None,
    /// The file is too short to hold a header and a data row.
    Structural,
    /// A schema matched but its selection is missing or invalid.
    SchemaMismatch,
    /// The content could not be read or split.
    Parse,
}

/// Outcome of one validation.
///
/// `is_valid = false` always comes with a remedy the user can act on.
/// `warning = true` is advisory and never blocks submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub is_valid: bool,
    #[serde(default)]
    pub warning: bool,
    /// Human-readable message; empty when there is nothing to say.
    #[serde(rename = "error", default)]
    pub error_message: String,
    /// Name of the schema the file was checked against; empty when none.
    #[serde(rename = "schemaName", default)]
    pub matched_schema_name: String,
    /// Option the verdict was computed with, echoed on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,
    #[serde(default)]
    pub requires_selection: bool,
    #[serde(default)]
    pub selection_options: Vec<String>,
    #[serde(default)]
    pub missing_columns: Vec<String>,
    #[serde(default)]
    pub extra_columns: Vec<String>,
    #[serde(default)]
    pub matched_columns: Vec<String>,
    #[serde(default)]
    pub error_kind: VerdictErrorKind,
}

impl ValidationVerdict {
    /// File has fewer than a header line and one data line.
    pub fn structural() -> Self {
        Self {
            is_valid: false,
            error_message: "CSV file must contain at least a header row and one data row".into(),
            error_kind: VerdictErrorKind::Structural,
            ..Default::default()
        }
    }

    /// Content could not be parsed.
    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self {
            is_valid: false,
            error_message: format!("Error parsing CSV file: {}", detail),
            error_kind: VerdictErrorKind::Parse,
            ..Default::default()
        }
    }

    /// The file could not be read at all.
    pub fn read_error() -> Self {
        Self {
            is_valid: false,
            error_message: "Error reading CSV file".into(),
            error_kind: VerdictErrorKind::Parse,
            ..Default::default()
        }
    }

    /// Accepted without a schema check.
    pub fn unchecked(message: String) -> Self {
        Self {
            is_valid: true,
            warning: true,
            error_message: message,
            ..Default::default()
        }
    }

    /// Valid without reservation.
    pub fn is_clean(&self) -> bool {
        self.is_valid && !self.warning
    }

    pub fn has_schema(&self) -> bool {
        !self.matched_schema_name.is_empty()
    }
}
