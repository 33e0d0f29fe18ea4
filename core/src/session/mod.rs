//! Client session: settings, credentials, the loaded library and the form state.
//!
//! Everything the upload page needs lives in one [`Session`] owned by the
//! caller. The matcher borrows the library from here; nothing is global.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ClientResult, SettingsError, SettingsResult, SubmissionError};
use crate::library::library_url;
use crate::models::SchemaLibrary;
use crate::slots::{Completion, SlotTracker, Ticket};
use crate::submission::{check_submission, UploadForm};
use crate::validation::{SchemaMatcher, ValidationVerdict};

/// Shown when `settings.json` cannot be loaded.
pub const SETTINGS_FALLBACK_WARNING: &str =
    "Warning: Could not load settings.json. Using default configuration.";

static EMPTY_LIBRARY: Lazy<SchemaLibrary> = Lazy::new(SchemaLibrary::default);

// =============================================================================
// Settings
// =============================================================================

/// Endpoints read from `settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "API_BASE_URL", default)]
    pub api_base_url: String,
    /// Base URL of static resources; ends with `/`.
    #[serde(rename = "MAIN_ENDPOINT", default)]
    pub main_endpoint: String,
    #[serde(rename = "AUTH_ENDPOINT", default)]
    pub auth_endpoint: String,
    #[serde(rename = "CLOUDFRONT_AUTH_ENDPOINT", default)]
    pub cloudfront_auth_endpoint: String,
}

impl Settings {
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Use the loaded settings, or empty endpoints when loading failed.
    pub fn or_fallback(loaded: SettingsResult<Self>) -> Self {
        loaded.unwrap_or_else(|e: SettingsError| {
            log::warn!("{} ({})", SETTINGS_FALLBACK_WARNING, e);
            Self::default()
        })
    }

    /// Where the schema library is published.
    pub fn library_url(&self) -> String {
        library_url(&self.main_endpoint)
    }
}

// =============================================================================
// Theme
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse a stored preference; anything unknown is light.
    pub fn parse(stored: Option<&str>) -> Self {
        match stored {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// State of one upload page.
#[derive(Debug, Clone, Default)]
pub struct Session {
    settings: Settings,
    access_token: Option<String>,
    library: Option<SchemaLibrary>,
    lod: String,
    theme: Theme,
    tracker: SlotTracker,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token.filter(|t| !t.is_empty());
    }

    /// The loaded library; empty until one is set.
    pub fn library(&self) -> &SchemaLibrary {
        self.library.as_ref().unwrap_or(&EMPTY_LIBRARY)
    }

    pub fn has_library(&self) -> bool {
        self.library.is_some()
    }

    pub fn set_library(&mut self, library: Option<SchemaLibrary>) {
        if library.is_none() {
            log::warn!("schema library unavailable; CSV files will be accepted without validation");
        }
        self.library = library;
    }

    pub fn matcher(&self) -> SchemaMatcher<'_> {
        SchemaMatcher::new(self.library())
    }

    pub fn lod(&self) -> &str {
        &self.lod
    }

    /// Change the LOD. Slots validated under the old LOD are removed.
    pub fn set_lod(&mut self, lod: impl Into<String>) {
        let lod = lod.into();
        if lod != self.lod {
            log::debug!("LOD changed from {:?} to {:?}; clearing CSV slots", self.lod, lod);
            self.tracker.clear();
            self.lod = lod;
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn tracker(&self) -> &SlotTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SlotTracker {
        &mut self.tracker
    }

    /// Validate the text read for `ticket` and store the verdict.
    ///
    /// Stale tickets are dropped before any matching happens.
    pub fn complete_validation(&mut self, ticket: Ticket, content: &str) -> Completion {
        let Some(slot) = self.tracker.slot(ticket.slot).filter(|_| self.tracker.is_current(ticket)) else {
            return Completion::Stale;
        };

        let verdict = self
            .matcher()
            .validate_text(content, &self.lod, slot.selected_option.as_deref());
        self.tracker.complete(ticket, verdict)
    }

    /// Validate a header without a slot, with the session's LOD.
    pub fn validate_text(&self, content: &str, selected: Option<&str>) -> ValidationVerdict {
        self.matcher().validate_text(content, &self.lod, selected)
    }

    pub fn check_submission(&self, model_file_present: bool) -> Result<(), SubmissionError> {
        check_submission(model_file_present, self.tracker.slots())
    }

    /// Gate the submission and lay out the form.
    pub fn prepare_upload(
        &self,
        model_file_present: bool,
        building_id: &str,
        description: &str,
    ) -> ClientResult<UploadForm> {
        self.check_submission(model_file_present)?;
        Ok(UploadForm::new(building_id, description, &self.lod, self.tracker.slots()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::load_library_str;
    use crate::slots::SlotStatus;

    const LIBRARY: &str = r#"{ "schema": [
        { "name": "Rooms", "selectedLOD": "LOD300", "columns": ["Id", "Name"] },
        { "name": "Doors", "selectedLOD": "LOD300", "columns": ["DoorId"], "selection": ["Internal", "External"] }
    ] }"#;

    fn session() -> Session {
        let mut session = Session::new(Settings::default());
        session.set_library(Some(load_library_str(LIBRARY).unwrap()));
        session.set_lod("LOD300");
        session
    }

    #[test]
    fn test_settings_parse() {
        let settings = Settings::from_json(
            r#"{ "API_BASE_URL": "https://api.example.com", "MAIN_ENDPOINT": "https://cdn.example.com/" }"#,
        )
        .unwrap();
        assert_eq!(settings.api_base_url, "https://api.example.com");
        assert_eq!(settings.auth_endpoint, "");
        assert_eq!(settings.library_url(), "https://cdn.example.com/CSVSchema.json");
    }

    #[test]
    fn test_settings_fallback() {
        let settings = Settings::or_fallback(Settings::from_json("not json"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.library_url(), "CSVSchema.json");
    }

    #[test]
    fn test_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "AUTH_ENDPOINT": "https://auth.example.com" }"#).unwrap();
        assert_eq!(Settings::from_file(&path).unwrap().auth_endpoint, "https://auth.example.com");
        assert!(Settings::from_file(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_theme_toggle() {
        let mut session = Session::default();
        assert_eq!(session.theme(), Theme::Light);
        assert_eq!(session.toggle_theme(), Theme::Dark);
        assert_eq!(Theme::parse(Some("dark")), Theme::Dark);
        assert_eq!(Theme::parse(Some("sepia")), Theme::Light);
        assert_eq!(Theme::Dark.as_str(), "dark");
    }

    #[test]
    fn test_missing_library_accepts_with_warning() {
        let mut session = Session::new(Settings::default());
        session.set_library(None);
        session.set_lod("LOD300");

        let verdict = session.validate_text("Id,Name\n1,Lobby\n", None);
        assert!(verdict.is_valid);
        assert!(verdict.warning);
        assert!(!session.has_library());
    }

    #[test]
    fn test_slot_validation_flow() {
        let mut session = session();
        let id = session.tracker_mut().add_slot();
        session.tracker_mut().set_file(id, Some("doors.csv".into())).unwrap();

        let ticket = session.tracker_mut().begin(id).unwrap();
        assert_eq!(session.complete_validation(ticket, "DoorId\nD1\n"), Completion::Applied);
        assert_eq!(session.tracker().view(id).unwrap().status, SlotStatus::Invalid);

        session.tracker_mut().set_option(id, Some("External".into())).unwrap();
        let ticket = session.tracker_mut().begin(id).unwrap();
        session.complete_validation(ticket, "DoorId\nD1\n");

        let view = session.tracker().view(id).unwrap();
        assert_eq!(view.status, SlotStatus::Valid);
        assert_eq!(view.schema_label.as_deref(), Some("Schema: Doors (External)"));

        let form = session.prepare_upload(true, "B1", "").unwrap();
        assert_eq!(form.attachments[0].schema_option, "External");
        assert_eq!(form.selected_lod, "LOD300");
    }

    #[test]
    fn test_unvalidated_option_not_uploaded() {
        let mut session = session();
        let id = session.tracker_mut().add_slot();
        session.tracker_mut().set_file(id, Some("doors.csv".into())).unwrap();
        session.tracker_mut().set_option(id, Some("Internal".into())).unwrap();
        let ticket = session.tracker_mut().begin(id).unwrap();
        session.complete_validation(ticket, "DoorId\nD1\n");
        assert!(session.check_submission(true).is_ok());

        session.tracker_mut().set_option(id, Some("Z".into())).unwrap();
        assert!(matches!(
            session.check_submission(true),
            Err(SubmissionError::ValidationPending { .. })
        ));
        assert!(session.prepare_upload(true, "B1", "").is_err());

        let ticket = session.tracker_mut().begin(id).unwrap();
        session.complete_validation(ticket, "DoorId\nD1\n");
        assert!(matches!(
            session.check_submission(true),
            Err(SubmissionError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_stale_completion_skipped() {
        let mut session = session();
        let id = session.tracker_mut().add_slot();
        session.tracker_mut().set_file(id, Some("rooms.csv".into())).unwrap();

        let old = session.tracker_mut().begin(id).unwrap();
        let new = session.tracker_mut().begin(id).unwrap();
        assert_eq!(session.complete_validation(new, "Id,Name\n1,A\n"), Completion::Applied);
        assert_eq!(session.complete_validation(old, "x\n"), Completion::Stale);
        assert!(session.tracker().slot(id).unwrap().verdict().unwrap().is_valid);
    }

    #[test]
    fn test_lod_change_clears_slots() {
        let mut session = session();
        session.tracker_mut().add_slot();
        session.set_lod("LOD300");
        assert_eq!(session.tracker().slots().len(), 1);

        session.set_lod("LOD400");
        assert!(session.tracker().slots().is_empty());
    }

    #[test]
    fn test_prepare_upload_gates() {
        let session = session();
        let err = session.prepare_upload(false, "B1", "").unwrap_err();
        assert_eq!(err.to_string(), "Please select an IFC file");
    }
}
