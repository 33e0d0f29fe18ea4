//! Domain models for CSV schema validation.
//!
//! - [`SchemaDefinition`] - A named set of required CSV columns for one LOD
//! - [`SchemaLibrary`] - Ordered, immutable collection of definitions
//! - [`HeaderRow`] - Column names parsed from the first line of a CSV
//!
//! Library order is part of the contract: when several schemas of the same
//! LOD match a header, the first one listed wins.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// Schema Definition
// =============================================================================

/// A named set of required CSV header columns.
///
/// `name` is unique within an LOD group but not across the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    pub name: String,
    /// Level of detail this schema applies to.
    pub lod: String,
    /// Required header names, in display order.
    pub columns: Vec<String>,
    /// Values the user must choose from; empty when no choice is needed.
    pub selection_options: Vec<String>,
}

impl SchemaDefinition {
    pub fn new(name: impl Into<String>, lod: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lod: lod.into(),
            columns,
            selection_options: Vec::new(),
        }
    }

    pub fn with_selection(mut self, options: Vec<String>) -> Self {
        self.selection_options = options;
        self
    }

    /// Whether the caller must supply one of [`Self::selection_options`].
    pub fn requires_selection(&self) -> bool {
        !self.selection_options.is_empty()
    }

    /// Required columns absent from `header`, in schema order.
    pub fn missing_columns(&self, header: &HeaderRow) -> Vec<String> {
        self.columns
            .iter()
            .filter(|col| !header.contains(col))
            .cloned()
            .collect()
    }

    /// Header columns this schema does not require, in header order.
    pub fn extra_columns(&self, header: &HeaderRow) -> Vec<String> {
        header
            .columns()
            .iter()
            .filter(|col| !self.columns.contains(col))
            .cloned()
            .collect()
    }

    /// Required columns present in `header`, in schema order.
    pub fn matched_columns(&self, header: &HeaderRow) -> Vec<String> {
        self.columns
            .iter()
            .filter(|col| header.contains(col))
            .cloned()
            .collect()
    }

    /// Every required column is present. Extra header columns are ignored.
    pub fn is_satisfied_by(&self, header: &HeaderRow) -> bool {
        self.columns.iter().all(|col| header.contains(col))
    }

    pub fn offers(&self, option: &str) -> bool {
        self.selection_options.iter().any(|o| o == option)
    }
}

// =============================================================================
// Schema Library
// =============================================================================

/// Ordered collection of schema definitions, loaded once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaLibrary {
    schemas: Vec<SchemaDefinition>,
}

impl SchemaLibrary {
    pub fn new(schemas: Vec<SchemaDefinition>) -> Self {
        Self { schemas }
    }

    /// Definitions for `lod`, in library order.
    pub fn candidates<'a>(&'a self, lod: &'a str) -> impl Iterator<Item = &'a SchemaDefinition> + 'a {
        self.schemas.iter().filter(move |s| s.lod == lod)
    }

    /// Distinct LOD values, in order of first appearance.
    pub fn lods(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.schemas
            .iter()
            .map(|s| s.lod.as_str())
            .filter(|lod| seen.insert(*lod))
            .collect()
    }

    pub fn schemas(&self) -> &[SchemaDefinition] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

// =============================================================================
// Header Row
// =============================================================================

/// Column names from the first line of a CSV.
///
/// Matching is set-based; the original order is kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRow {
    columns: Vec<String>,
    lookup: HashSet<String>,
}

impl HeaderRow {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let lookup = columns.iter().cloned().collect();
        Self { columns, lookup }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.lookup.contains(column)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
