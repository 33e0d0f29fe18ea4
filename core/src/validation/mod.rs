//! CSV header validation against the schema library.
//!
//! # Matching rules
//!
//! Given a header row, an LOD and an optional schema option:
//!
//! 1. Only schemas of the requested LOD are candidates. With no candidate the
//!    file is accepted unchecked (valid, with a warning).
//! 2. Candidates are tried in library order. The first schema whose required
//!    columns are all present wins; extra header columns never disqualify.
//!    If that schema has selection options, a supplied option must be one of
//!    them, and its absence is an error the user fixes by choosing one.
//! 3. Without an exact match, the candidate missing the fewest columns is
//!    reported (first listed wins ties) and the file is accepted unchecked.
//!
//! Unknown LODs and partial matches never make a verdict invalid, so an
//! incomplete schema catalog cannot block an upload.
//!
//! # Example
//!
//! ```
//! use ifcload::{load_library_str, SchemaMatcher};
//!
//! let library = load_library_str(r#"{ "schema": [
//!     { "name": "Rooms", "selectedLOD": "LOD300", "columns": ["Id", "Name"] }
//! ] }"#).unwrap();
//!
//! let verdict = SchemaMatcher::new(&library)
//!     .validate_text("Id,Name,Area\n1,Lobby,42\n", "LOD300", None);
//!
//! assert!(verdict.is_valid);
//! assert_eq!(verdict.matched_schema_name, "Rooms");
//! assert_eq!(verdict.extra_columns, ["Area"]);
//! ```

pub mod verdict;

use crate::models::{HeaderRow, SchemaDefinition, SchemaLibrary};
use crate::parser::{parse_header_line, split_lines};

pub use verdict::{ValidationVerdict, VerdictErrorKind};

/// Missing column names listed in full up to this count.
const MAX_LISTED_MISSING: usize = 4;

/// Names shown before "and N more" when the list is truncated.
const TRUNCATED_LISTED_MISSING: usize = 3;

/// Validates CSV headers against an immutable [`SchemaLibrary`].
///
/// Every method is a pure function of its inputs and the library.
#[derive(Debug, Clone, Copy)]
pub struct SchemaMatcher<'a> {
    library: &'a SchemaLibrary,
}

impl<'a> SchemaMatcher<'a> {
    pub fn new(library: &'a SchemaLibrary) -> Self {
        Self { library }
    }

    /// Validate raw CSV text.
    ///
    /// Fails with a structural error when the text has fewer than two lines
    /// (trailing blank lines excluded),
    /// whatever the LOD or library contents.
    pub fn validate_text(&self, content: &str, lod: &str, selected: Option<&str>) -> ValidationVerdict {
        let lines = split_lines(content);
        if lines.len() < 2 {
            log::debug!("structural error: {} line(s)", lines.len());
            return ValidationVerdict::structural();
        }

        let header = parse_header_line(lines[0]);
        self.validate(&header, lod, selected)
    }

    /// Validate raw CSV bytes, which must be UTF-8.
    pub fn validate_bytes(&self, bytes: &[u8], lod: &str, selected: Option<&str>) -> ValidationVerdict {
        match std::str::from_utf8(bytes) {
            Ok(content) => self.validate_text(content, lod, selected),
            Err(e) => ValidationVerdict::parse_error(e),
        }
    }

    /// Validate a parsed header row.
    ///
    /// An empty `selected` string counts as no selection.
    pub fn validate(&self, header: &HeaderRow, lod: &str, selected: Option<&str>) -> ValidationVerdict {
        let selected = selected.filter(|s| !s.is_empty());
        let candidates: Vec<&SchemaDefinition> = self.library.candidates(lod).collect();

        if candidates.is_empty() {
            log::debug!("no schema for LOD {}", lod);
            return ValidationVerdict::unchecked(format!(
                "No schema found for selected LOD: {}. File will be accepted without validation.",
                lod
            ));
        }

        // First exact match in library order wins.
        if let Some(schema) = candidates.iter().find(|s| s.is_satisfied_by(header)) {
            return exact_match(schema, header, selected);
        }

        best_effort(&candidates, header)
    }
}

/// Validate CSV text against `library` in one call.
pub fn validate_csv(
    library: &SchemaLibrary,
    content: &str,
    lod: &str,
    selected: Option<&str>,
) -> ValidationVerdict {
    SchemaMatcher::new(library).validate_text(content, lod, selected)
}

fn exact_match(schema: &SchemaDefinition, header: &HeaderRow, selected: Option<&str>) -> ValidationVerdict {
    let extra_columns = schema.extra_columns(header);
    let matched_columns = schema.columns.clone();

    if schema.requires_selection() {
        let error_message = match selected {
            None => Some(format!("Schema \"{}\" requires selection of one option", schema.name)),
            Some(option) if !schema.offers(option) => Some(format!(
                "Invalid selection \"{}\" for schema \"{}\". Valid options: {}",
                option,
                schema.name,
                schema.selection_options.join(", ")
            )),
            Some(_) => None,
        };

        if let Some(error_message) = error_message {
            log::debug!("schema {} matched, selection needed", schema.name);
            return ValidationVerdict {
                is_valid: false,
                error_message,
                matched_schema_name: schema.name.clone(),
                requires_selection: true,
                selection_options: schema.selection_options.clone(),
                extra_columns,
                matched_columns,
                error_kind: VerdictErrorKind::SchemaMismatch,
                ..Default::default()
            };
        }
    }

    log::debug!("schema {} matched", schema.name);
    ValidationVerdict {
        is_valid: true,
        matched_schema_name: schema.name.clone(),
        selected_option: selected
            .filter(|_| schema.requires_selection())
            .map(str::to_string),
        requires_selection: schema.requires_selection(),
        selection_options: schema.selection_options.clone(),
        extra_columns,
        matched_columns,
        ..Default::default()
    }
}

fn best_effort(candidates: &[&SchemaDefinition], header: &HeaderRow) -> ValidationVerdict {
    // `min_by_key` keeps the first of equal minimums: library order breaks ties.
    let best = candidates
        .iter()
        .map(|schema| (*schema, schema.missing_columns(header)))
        .min_by_key(|(_, missing)| missing.len());

    let Some((schema, missing)) = best else {
        return ValidationVerdict::unchecked(
            "No suitable schema found. File will be accepted without validation.".into(),
        );
    };

    if !missing.is_empty() {
        log::debug!("closest schema {} misses {} column(s)", schema.name, missing.len());
        let mut verdict = ValidationVerdict::unchecked(format!(
            "CSV columns do not match schema \"{}\". Missing columns: {}. File will be accepted without validation.",
            schema.name,
            summarize_missing(&missing)
        ));
        verdict.missing_columns = missing;
        verdict.extra_columns = schema.extra_columns(header);
        return verdict;
    }

    // Zero missing columns means an exact match, which the first pass
    // already returned. Kept so a change to that rule degrades to a warning.
    ValidationVerdict {
        is_valid: true,
        warning: true,
        error_message: format!(
            "CSV has extra columns not in schema \"{}\". File will be accepted.",
            schema.name
        ),
        matched_schema_name: schema.name.clone(),
        requires_selection: schema.requires_selection(),
        selection_options: schema.selection_options.clone(),
        extra_columns: schema.extra_columns(header),
        matched_columns: schema.matched_columns(header),
        ..Default::default()
    }
}

/// `a, b, c` up to four names, otherwise `a, b, c and N more`.
fn summarize_missing(missing: &[String]) -> String {
    if missing.len() > MAX_LISTED_MISSING {
        format!(
            "{} and {} more",
            missing[..TRUNCATED_LISTED_MISSING].join(", "),
            missing.len() - TRUNCATED_LISTED_MISSING
        )
    } else {
        missing.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn library() -> SchemaLibrary {
        SchemaLibrary::new(vec![
            SchemaDefinition::new("Rooms", "LOD300", cols(&["Id", "Name", "Area"])),
            SchemaDefinition::new("RoomsLite", "LOD300", cols(&["Id", "Name"])),
            SchemaDefinition::new("Doors", "LOD300", cols(&["DoorId", "Width"]))
                .with_selection(cols(&["A", "B"])),
            SchemaDefinition::new("Spaces", "LOD200", cols(&["c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8"])),
        ])
    }

    #[test]
    fn test_first_exact_match_wins() {
        let lib = library();
        let matcher = SchemaMatcher::new(&lib);

        // Satisfies both Rooms and RoomsLite; Rooms is listed first.
        let verdict = matcher.validate(&HeaderRow::new(["Area", "Name", "Id"]), "LOD300", None);
        assert!(verdict.is_clean());
        assert_eq!(verdict.matched_schema_name, "Rooms");

        // Only RoomsLite is satisfied.
        let verdict = matcher.validate(&HeaderRow::new(["Name", "Id"]), "LOD300", None);
        assert_eq!(verdict.matched_schema_name, "RoomsLite");
    }

    #[test]
    fn test_selection_missing() {
        let lib = library();
        let header = HeaderRow::new(["DoorId", "Width"]);
        let verdict = SchemaMatcher::new(&lib).validate(&header, "LOD300", None);

        assert!(!verdict.is_valid);
        assert!(verdict.requires_selection);
        assert_eq!(verdict.selection_options, ["A", "B"]);
        assert_eq!(verdict.matched_schema_name, "Doors");
        assert_eq!(verdict.error_kind, VerdictErrorKind::SchemaMismatch);
        assert_eq!(verdict.error_message, "Schema \"Doors\" requires selection of one option");
    }

    #[test]
    fn test_empty_selection_counts_as_missing() {
        let lib = library();
        let header = HeaderRow::new(["DoorId", "Width"]);
        let verdict = SchemaMatcher::new(&lib).validate(&header, "LOD300", Some(""));
        assert!(!verdict.is_valid);
        assert!(verdict.error_message.contains("requires selection"));
    }

    #[test]
    fn test_selection_invalid() {
        let lib = library();
        let header = HeaderRow::new(["DoorId", "Width"]);
        let verdict = SchemaMatcher::new(&lib).validate(&header, "LOD300", Some("C"));

        assert!(!verdict.is_valid);
        assert!(verdict.requires_selection);
        assert_eq!(verdict.selection_options, ["A", "B"]);
        assert_eq!(
            verdict.error_message,
            "Invalid selection \"C\" for schema \"Doors\". Valid options: A, B"
        );
    }

    #[test]
    fn test_selection_valid() {
        let lib = library();
        let header = HeaderRow::new(["DoorId", "Width", "Colour"]);
        let verdict = SchemaMatcher::new(&lib).validate(&header, "LOD300", Some("A"));

        assert!(verdict.is_clean());
        assert_eq!(verdict.matched_schema_name, "Doors");
        assert_eq!(verdict.selected_option.as_deref(), Some("A"));
        assert!(verdict.requires_selection);
        assert_eq!(verdict.selection_options, ["A", "B"]);
        assert_eq!(verdict.extra_columns, ["Colour"]);
    }

    #[test]
    fn test_option_ignored_without_selection_list() {
        let lib = library();
        let verdict = SchemaMatcher::new(&lib).validate(&HeaderRow::new(["Id", "Name"]), "LOD300", Some("A"));
        assert!(verdict.is_clean());
        assert_eq!(verdict.selected_option, None);
        assert!(!verdict.requires_selection);
        assert!(verdict.selection_options.is_empty());
    }

    #[test]
    fn test_unknown_lod_is_warning() {
        let lib = library();
        let verdict = SchemaMatcher::new(&lib).validate(&HeaderRow::new(["x"]), "L9", None);

        assert!(verdict.is_valid);
        assert!(verdict.warning);
        assert_eq!(verdict.matched_schema_name, "");
        assert!(verdict.error_message.contains("L9"));
        assert_eq!(verdict.error_kind, VerdictErrorKind::None);
    }

    #[test]
    fn test_empty_library_is_warning() {
        let lib = SchemaLibrary::default();
        let verdict = validate_csv(&lib, "a,b\n1,2", "LOD300", None);
        assert!(verdict.is_valid);
        assert!(verdict.warning);
    }

    #[test]
    fn test_missing_columns_truncated() {
        let lib = library();
        let header = HeaderRow::new(["c1", "c2", "c3", "other"]);
        let verdict = SchemaMatcher::new(&lib).validate(&header, "LOD200", None);

        assert!(verdict.is_valid);
        assert!(verdict.warning);
        assert_eq!(verdict.matched_schema_name, "");
        assert_eq!(verdict.missing_columns, ["c4", "c5", "c6", "c7", "c8"]);
        assert!(
            verdict.error_message.contains("Missing columns: c4, c5, c6 and 2 more."),
            "{}",
            verdict.error_message
        );
    }

    #[test]
    fn test_missing_columns_listed_up_to_four() {
        let lib = library();
        let header = HeaderRow::new(["c1", "c2", "c3", "c4"]);
        let verdict = SchemaMatcher::new(&lib).validate(&header, "LOD200", None);
        assert!(verdict.error_message.contains("Missing columns: c5, c6, c7, c8."));
    }

    #[test]
    fn test_best_effort_picks_fewest_missing() {
        let lib = library();
        // Rooms misses Area and Name, RoomsLite misses Name, Doors misses Width.
        let header = HeaderRow::new(["Id", "DoorId"]);
        let verdict = SchemaMatcher::new(&lib).validate(&header, "LOD300", None);

        // RoomsLite and Doors tie on one missing column; RoomsLite is first.
        assert!(verdict.error_message.contains("schema \"RoomsLite\""), "{}", verdict.error_message);
        assert_eq!(verdict.missing_columns, ["Name"]);
        assert!(!verdict.requires_selection);
    }

    #[test]
    fn test_extra_columns_never_invalidate() {
        let lib = library();
        let header = HeaderRow::new(["Id", "Name", "Area", "Floor", "Zone", "Tag"]);
        let verdict = SchemaMatcher::new(&lib).validate(&header, "LOD300", None);
        assert!(verdict.is_clean());
        assert_eq!(verdict.extra_columns, ["Floor", "Zone", "Tag"]);
    }

    #[test]
    fn test_header_only_file_is_structural_error() {
        let lib = library();
        let matcher = SchemaMatcher::new(&lib);

        for content in ["Id,Name,Area", "Id,Name,Area\n", "Id,Name,Area\n\n", "Id,Name,Area\r\n  \r\n", ""] {
            let verdict = matcher.validate_text(content, "LOD300", None);
            assert!(!verdict.is_valid);
            assert_eq!(verdict.error_kind, VerdictErrorKind::Structural);
        }

        // Independent of LOD.
        let verdict = matcher.validate_text("x", "L9", None);
        assert_eq!(verdict.error_kind, VerdictErrorKind::Structural);
    }

    #[test]
    fn test_quoted_header_text() {
        let lib = library();
        let verdict = validate_csv(&lib, "\"Id\", \"Name\"\r\n1,Lobby\r\n", "LOD300", None);
        assert_eq!(verdict.matched_schema_name, "RoomsLite");
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let lib = library();
        let verdict = SchemaMatcher::new(&lib).validate_bytes(b"Id,Name\n1,\xFF", "LOD300", None);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.error_kind, VerdictErrorKind::Parse);
        assert!(verdict.error_message.starts_with("Error parsing CSV file:"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let lib = library();
        let matcher = SchemaMatcher::new(&lib);
        let content = "DoorId,Width\n1,90";

        let first = matcher.validate_text(content, "LOD300", Some("C"));
        let second = matcher.validate_text(content, "LOD300", Some("C"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_summarize_missing() {
        assert_eq!(summarize_missing(&cols(&["a"])), "a");
        assert_eq!(summarize_missing(&cols(&["a", "b", "c", "d"])), "a, b, c, d");
        assert_eq!(summarize_missing(&cols(&["a", "b", "c", "d", "e"])), "a, b, c and 2 more");
    }
}
