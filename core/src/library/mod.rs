//! Schema library loading.
//!
//! The library arrives as one JSON document:
//!
//! ```json
//! { "schema": [ { "name": "Rooms", "selectedLOD": "LOD300",
//!                 "columns": ["Id", "Name"], "selection": ["Internal", "External"] } ] }
//! ```
//!
//! Loading happens in two steps:
//!
//! 1. The document is checked against the embedded JSON Schema ([`shape`]).
//! 2. Each entry is normalized into a [`SchemaDefinition`]: required columns
//!    come from `columns`, or from the `columnName` alias when `columns` is
//!    absent. An entry with neither is rejected.
//!
//! Entry order is kept; it decides which schema wins when several match.

pub mod shape;

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::error::{LibraryError, LibraryResult};
use crate::models::{SchemaDefinition, SchemaLibrary};

pub use shape::{is_valid_library_shape, validate, validate_library_shape};

/// File name of the library under the main endpoint.
pub const LIBRARY_FILE_NAME: &str = "CSVSchema.json";

#[derive(Debug, Deserialize)]
struct RawLibrary {
    schema: Vec<RawSchema>,
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    name: String,
    #[serde(rename = "selectedLOD")]
    selected_lod: String,
    #[serde(default)]
    columns: Option<Vec<String>>,
    #[serde(default, rename = "columnName")]
    column_name: Option<Vec<String>>,
    #[serde(default)]
    selection: Option<Vec<String>>,
}

impl RawSchema {
    fn normalize(self, index: usize) -> LibraryResult<SchemaDefinition> {
        let columns = match (self.columns, self.column_name) {
            (Some(columns), _) => columns,
            (None, Some(columns)) => columns,
            (None, None) => {
                return Err(LibraryError::MissingColumns {
                    index,
                    name: self.name,
                })
            }
        };

        let options = self.selection.unwrap_or_default();
        if options.iter().any(|o| o.trim().is_empty()) {
            return Err(LibraryError::BlankSelectionOption { name: self.name });
        }

        Ok(SchemaDefinition::new(self.name, self.selected_lod, columns).with_selection(options))
    }
}

/// Load a library from an already parsed JSON document.
pub fn load_library_value(document: Value) -> LibraryResult<SchemaLibrary> {
    validate_library_shape(&document).map_err(|errors| LibraryError::InvalidShape { errors })?;

    let raw: RawLibrary = serde_json::from_value(document)?;
    let schemas = raw
        .schema
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.normalize(index))
        .collect::<LibraryResult<Vec<_>>>()?;

    let library = SchemaLibrary::new(schemas);
    log::info!(
        "loaded schema library: {} schemas across {} LODs",
        library.len(),
        library.lods().len()
    );
    Ok(library)
}

/// Load a library from JSON text.
///
/// # Example
/// ```
/// use ifcload::library::load_library_str;
///
/// let library = load_library_str(r#"{ "schema": [
///     { "name": "Rooms", "selectedLOD": "LOD300", "columnName": ["Id", "Name"] }
/// ] }"#).unwrap();
///
/// assert_eq!(library.schemas()[0].columns, ["Id", "Name"]);
/// ```
pub fn load_library_str(json: &str) -> LibraryResult<SchemaLibrary> {
    let document: Value = serde_json::from_str(json)?;
    load_library_value(document)
}

/// Load a library from a JSON file.
pub fn load_library_file<P: AsRef<Path>>(path: P) -> LibraryResult<SchemaLibrary> {
    let content = std::fs::read_to_string(path.as_ref())?;
    load_library_str(&content)
}

/// URL of the library under `main_endpoint` (which ends with `/`).
pub fn library_url(main_endpoint: &str) -> String {
    format!("{}{}", main_endpoint, LIBRARY_FILE_NAME)
}

/// Append a pre-encoded query string to `url`, choosing `?` or `&`.
///
/// An empty query leaves the URL unchanged.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query)
}

/// Fetch and load a library over HTTP.
///
/// `access_query` is appended verbatim (for example signed-URL parameters).
#[cfg(feature = "fetch")]
pub async fn fetch_library(url: &str, access_query: Option<&str>) -> LibraryResult<SchemaLibrary> {
    let url = append_query(url, access_query.unwrap_or(""));
    log::debug!("fetching schema library from {}", url);

    let response = reqwest::get(&url)
        .await
        .map_err(|e| LibraryError::HttpError(e.to_string()))?;

    if !response.status().is_success() {
        return Err(LibraryError::HttpError(format!(
            "server returned {}",
            response.status()
        )));
    }

    let document: Value = response
        .json()
        .await
        .map_err(|e| LibraryError::HttpError(format!("Failed to parse response: {}", e)))?;

    load_library_value(document)
}

/// Load a library from a file path or an `http(s)://` URL.
#[cfg(feature = "fetch")]
pub async fn load_library_source(source: &str, access_query: Option<&str>) -> LibraryResult<SchemaLibrary> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_library(source, access_query).await
    } else {
        load_library_file(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_alias_normalized() {
        let library = load_library_str(
            r#"{ "schema": [
                { "name": "A", "selectedLOD": "L1", "columns": ["x", "y"] },
                { "name": "B", "selectedLOD": "L1", "columnName": ["z"] }
            ] }"#,
        )
        .unwrap();

        assert_eq!(library.schemas()[0].columns, ["x", "y"]);
        assert_eq!(library.schemas()[1].columns, ["z"]);
    }

    #[test]
    fn test_columns_wins_over_alias() {
        let library = load_library_str(
            r#"{ "schema": [
                { "name": "A", "selectedLOD": "L1", "columns": ["x"], "columnName": ["y"] }
            ] }"#,
        )
        .unwrap();
        assert_eq!(library.schemas()[0].columns, ["x"]);
    }

    #[test]
    fn test_missing_columns_fails_fast() {
        let err = load_library_str(
            r#"{ "schema": [
                { "name": "A", "selectedLOD": "L1", "columns": ["x"] },
                { "name": "Broken", "selectedLOD": "L1" }
            ] }"#,
        )
        .unwrap_err();

        match err {
            LibraryError::MissingColumns { index, name } => {
                assert_eq!(index, 1);
                assert_eq!(name, "Broken");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_selection_null_or_empty_means_none() {
        let library = load_library_str(
            r#"{ "schema": [
                { "name": "A", "selectedLOD": "L1", "columns": ["x"], "selection": null },
                { "name": "B", "selectedLOD": "L1", "columns": ["x"], "selection": [] },
                { "name": "C", "selectedLOD": "L1", "columns": ["x"], "selection": ["p", "q"] }
            ] }"#,
        )
        .unwrap();

        let schemas = library.schemas();
        assert!(!schemas[0].requires_selection());
        assert!(!schemas[1].requires_selection());
        assert_eq!(schemas[2].selection_options, ["p", "q"]);
    }

    #[test]
    fn test_blank_selection_option_rejected() {
        let err = load_library_str(
            r#"{ "schema": [
                { "name": "A", "selectedLOD": "L1", "columns": ["x"], "selection": ["p", " "] }
            ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, LibraryError::BlankSelectionOption { .. }));
    }

    #[test]
    fn test_shape_violation_reported() {
        let err = load_library_str(r#"{ "schema": [ { "name": "A" } ] }"#).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidShape { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = load_library_str("{ not json").unwrap_err();
        assert!(matches!(err, LibraryError::JsonError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LIBRARY_FILE_NAME);
        std::fs::write(
            &path,
            r#"{ "schema": [ { "name": "A", "selectedLOD": "L1", "columns": ["x"] } ] }"#,
        )
        .unwrap();

        let library = load_library_file(&path).unwrap();
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_library_url_and_query() {
        let url = library_url("https://cdn.example.com/assets/");
        assert_eq!(url, "https://cdn.example.com/assets/CSVSchema.json");
        assert_eq!(append_query(&url, "Policy=p&Signature=s"), format!("{}?Policy=p&Signature=s", url));
        assert_eq!(append_query("https://x/a?v=1", "k=2"), "https://x/a?v=1&k=2");
        assert_eq!(append_query("https://x/a", ""), "https://x/a");
    }
}
