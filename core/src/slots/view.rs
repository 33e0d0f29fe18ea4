//! What the UI shows for a slot, derived from its latest verdict.

use serde::{Deserialize, Serialize};

use super::CsvSlot;
use crate::validation::ValidationVerdict;

const PLACEHOLDER_SELECT: &str = "Select an option...";
const PLACEHOLDER_NOT_REQUIRED: &str = "No selection required";
const PLACEHOLDER_NO_FILE: &str = "No file selected";

/// Status icon of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Empty,
    Pending,
    Valid,
    Warning,
    Invalid,
}

impl SlotStatus {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            SlotStatus::Empty => "validation-icon default",
            SlotStatus::Pending => "validation-icon validating",
            SlotStatus::Valid => "validation-icon valid",
            SlotStatus::Warning => "validation-icon warning",
            SlotStatus::Invalid => "validation-icon invalid",
        }
    }
}

/// State of the schema option dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dropdown {
    pub enabled: bool,
    /// Text of the empty first entry.
    pub placeholder: String,
    pub options: Vec<String>,
    /// Option to show as chosen, if still offered.
    pub selected: Option<String>,
}

impl Dropdown {
    fn disabled(placeholder: &str) -> Self {
        Self {
            enabled: false,
            placeholder: placeholder.to_string(),
            options: Vec::new(),
            selected: None,
        }
    }

    fn for_verdict(verdict: &ValidationVerdict, current: Option<&String>) -> Self {
        if !(verdict.requires_selection && !verdict.selection_options.is_empty()) {
            return Self::disabled(PLACEHOLDER_NOT_REQUIRED);
        }
        Self {
            enabled: true,
            placeholder: PLACEHOLDER_SELECT.to_string(),
            options: verdict.selection_options.clone(),
            selected: current
                .filter(|c| verdict.selection_options.contains(c))
                .cloned(),
        }
    }
}

/// Rendered state of one CSV slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub status: SlotStatus,
    pub message: String,
    /// `Schema: Rooms (Internal)` or `No schema validation`; hidden when `None`.
    pub schema_label: Option<String>,
    pub dropdown: Dropdown,
    /// Blocking notice to raise once, when the file was rejected outright.
    pub alert: Option<String>,
}

impl SlotView {
    pub fn from_slot(slot: &CsvSlot) -> Self {
        if slot.is_pending() {
            return Self::pending(slot);
        }
        match slot.verdict() {
            Some(verdict) => Self::from_verdict(verdict, slot.selected_option.as_ref()),
            None if slot.has_file() => Self::pending(slot),
            None => Self {
                status: SlotStatus::Empty,
                message: PLACEHOLDER_NO_FILE.to_string(),
                schema_label: None,
                dropdown: Dropdown::disabled(PLACEHOLDER_NO_FILE),
                alert: None,
            },
        }
    }

    fn pending(slot: &CsvSlot) -> Self {
        // Keep the previous dropdown while revalidating an option change.
        let dropdown = slot
            .verdict()
            .map(|v| Dropdown::for_verdict(v, slot.selected_option.as_ref()))
            .unwrap_or_else(|| Dropdown::disabled(PLACEHOLDER_NO_FILE));
        Self {
            status: SlotStatus::Pending,
            message: "Validating...".to_string(),
            schema_label: None,
            dropdown,
            alert: None,
        }
    }

    pub fn from_verdict(verdict: &ValidationVerdict, current: Option<&String>) -> Self {
        if verdict.is_valid && verdict.warning {
            return Self {
                status: SlotStatus::Warning,
                message: verdict.error_message.clone(),
                schema_label: Some("No schema validation".to_string()),
                dropdown: Dropdown::disabled(PLACEHOLDER_NOT_REQUIRED),
                alert: None,
            };
        }

        if verdict.is_valid {
            let label = match &verdict.selected_option {
                Some(option) => format!("Schema: {} ({})", verdict.matched_schema_name, option),
                None => format!("Schema: {}", verdict.matched_schema_name),
            };
            return Self {
                status: SlotStatus::Valid,
                message: "Valid CSV file".to_string(),
                schema_label: Some(label),
                dropdown: Dropdown::for_verdict(verdict, current),
                alert: None,
            };
        }

        let alert = (!verdict.requires_selection)
            .then(|| format!("CSV validation failed: {}", verdict.error_message));
        Self {
            status: SlotStatus::Invalid,
            message: verdict.error_message.clone(),
            schema_label: None,
            dropdown: Dropdown::for_verdict(verdict, current),
            alert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::SlotTracker;

    #[test]
    fn test_empty_slot() {
        let mut tracker = SlotTracker::new();
        let id = tracker.add_slot();
        let view = tracker.view(id).unwrap();

        assert_eq!(view.status, SlotStatus::Empty);
        assert_eq!(view.message, "No file selected");
        assert!(!view.dropdown.enabled);
        assert_eq!(view.dropdown.placeholder, "No file selected");
    }

    #[test]
    fn test_valid_with_option_label() {
        let verdict = ValidationVerdict {
            is_valid: true,
            matched_schema_name: "Doors".into(),
            selected_option: Some("Internal".into()),
            requires_selection: true,
            selection_options: vec!["Internal".into(), "External".into()],
            ..Default::default()
        };
        let current = "Internal".to_string();
        let view = SlotView::from_verdict(&verdict, Some(&current));

        assert_eq!(view.status, SlotStatus::Valid);
        assert_eq!(view.schema_label.as_deref(), Some("Schema: Doors (Internal)"));
        assert!(view.dropdown.enabled);
        assert_eq!(view.dropdown.placeholder, "Select an option...");
        assert_eq!(view.dropdown.selected.as_deref(), Some("Internal"));
    }

    #[test]
    fn test_valid_without_selection_disables_dropdown() {
        let verdict = ValidationVerdict {
            is_valid: true,
            matched_schema_name: "Rooms".into(),
            ..Default::default()
        };
        let view = SlotView::from_verdict(&verdict, None);
        assert_eq!(view.schema_label.as_deref(), Some("Schema: Rooms"));
        assert!(!view.dropdown.enabled);
        assert_eq!(view.dropdown.placeholder, "No selection required");
    }

    #[test]
    fn test_warning_view() {
        let verdict = ValidationVerdict::unchecked("No schema found for selected LOD: L9.".into());
        let view = SlotView::from_verdict(&verdict, None);

        assert_eq!(view.status, SlotStatus::Warning);
        assert_eq!(view.schema_label.as_deref(), Some("No schema validation"));
        assert!(!view.dropdown.enabled);
        assert!(view.alert.is_none());
    }

    #[test]
    fn test_invalid_selection_keeps_dropdown_without_alert() {
        let verdict = ValidationVerdict {
            is_valid: false,
            error_message: "Schema \"Doors\" requires selection of one option".into(),
            requires_selection: true,
            selection_options: vec!["A".into(), "B".into()],
            ..Default::default()
        };
        let stale = "C".to_string();
        let view = SlotView::from_verdict(&verdict, Some(&stale));

        assert_eq!(view.status, SlotStatus::Invalid);
        assert!(view.dropdown.enabled);
        assert_eq!(view.dropdown.options, ["A", "B"]);
        assert_eq!(view.dropdown.selected, None);
        assert!(view.alert.is_none());
    }

    #[test]
    fn test_structural_error_raises_alert() {
        let view = SlotView::from_verdict(&ValidationVerdict::structural(), None);
        assert_eq!(view.status, SlotStatus::Invalid);
        assert!(view.alert.unwrap().starts_with("CSV validation failed: CSV file must contain"));
    }

    #[test]
    fn test_pending_keeps_dropdown() {
        let mut tracker = SlotTracker::new();
        let id = tracker.add_slot();
        tracker.set_file(id, Some("doors.csv".into())).unwrap();
        let ticket = tracker.begin(id).unwrap();
        tracker.complete(
            ticket,
            ValidationVerdict {
                is_valid: false,
                requires_selection: true,
                selection_options: vec!["A".into()],
                ..Default::default()
            },
        );

        tracker.set_option(id, Some("A".into())).unwrap();
        tracker.begin(id).unwrap();

        let view = tracker.view(id).unwrap();
        assert_eq!(view.status, SlotStatus::Pending);
        assert!(view.dropdown.enabled);
        assert_eq!(view.dropdown.selected.as_deref(), Some("A"));
    }
}
