//! The upload page's handle on the validation engine.
//!
//! JavaScript owns the DOM and the timers; [`Client`] owns everything else.
//! Methods that touch the network or read files return a `Promise`.
//!
//! ```js
//! const client = new Client();
//! const report = await client.load("settings.json");
//! const slot = client.addSlot();
//! const view = await client.selectFile(slot, input.files[0]);
//! if (view) render(slot, view); // null: a newer validation is in flight
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::File;

use ifcload::{
    area_map_url, bim_url, load_library_str, Completion, JobStatus, SchemaMatcher, Session, SlotId,
    Theme, Ticket,
};

use crate::config::{POLL_INTERVAL_MS, REVEAL_DELAY_MS, SETTINGS_URL};
use crate::services::{
    fetch_schema_library, fetch_status, load_settings, store_theme, store_token, stored_theme,
    stored_token, submit_upload,
};
use crate::types::{AppError, AppResult, LoadReport};

fn to_js<T: Serialize + ?Sized>(value: &T) -> AppResult<JsValue> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}

#[derive(Default)]
struct State {
    session: Session,
    model: Option<File>,
    files: HashMap<SlotId, File>,
    processing_id: Option<String>,
    job: Option<JobStatus>,
}

impl State {
    /// Apply preferences saved by an earlier visit.
    fn restore(&mut self, token: Option<String>, theme: Option<String>) {
        self.session.set_access_token(token);
        self.session.set_theme(Theme::parse(theme.as_deref()));
    }

    fn report(&self, settings_fallback: bool) -> LoadReport {
        let library = self.session.library();
        LoadReport {
            settings_fallback,
            warning: settings_fallback
                .then(|| ifcload::session::SETTINGS_FALLBACK_WARNING.to_string()),
            library_loaded: self.session.has_library(),
            schema_count: library.len(),
            lods: library.lods().into_iter().map(str::to_string).collect(),
        }
    }

    /// Store the outcome of a validation and return the slot view, or
    /// `null` when the ticket is stale. `None` text means the read failed.
    fn finish(&mut self, ticket: Ticket, text: Option<&str>) -> AppResult<JsValue> {
        let completion = match text {
            Some(text) => self.session.complete_validation(ticket, text),
            None => self.session.tracker_mut().fail(ticket),
        };
        if completion == Completion::Stale {
            return Ok(JsValue::NULL);
        }

        // A rejected file is dropped from the slot.
        let has_file = self
            .session
            .tracker()
            .slot(ticket.slot)
            .is_some_and(|s| s.has_file());
        if !has_file {
            self.files.remove(&ticket.slot);
        }

        to_js(&self.session.tracker().view(ticket.slot))
    }
}

/// Browser-side state of the upload page.
#[wasm_bindgen]
pub struct Client {
    state: Rc<RefCell<State>>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Client {
    /// New client, with the token and theme saved by an earlier visit.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Client {
        let mut state = State::default();
        state.restore(stored_token(), stored_theme());
        Client {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Interval the page polls `fetchStatus` at.
    #[wasm_bindgen(js_name = pollIntervalMs)]
    pub fn poll_interval_ms() -> u32 {
        POLL_INTERVAL_MS
    }

    /// Delay between a completed status and showing the results.
    #[wasm_bindgen(js_name = revealDelayMs)]
    pub fn reveal_delay_ms() -> u32 {
        REVEAL_DELAY_MS
    }

    // =========================================================================
    // Settings and schema library
    // =========================================================================

    /// Load `settings.json`, then the schema library it points to.
    ///
    /// Resolves to a load report; never rejects.
    pub fn load(&self, settings_url: Option<String>) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let url = settings_url.unwrap_or_else(|| SETTINGS_URL.to_string());
            let (settings, fallback) = load_settings(&url).await;
            state.borrow_mut().session.set_settings(settings);

            refresh(&state, None).await;
            let report = state.borrow().report(fallback);
            to_js(&report).map_err(JsValue::from)
        })
    }

    /// Download the schema library again, with signed-URL parameters.
    #[wasm_bindgen(js_name = refreshLibrary)]
    pub fn refresh_library(&self, access_query: Option<String>) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            refresh(&state, access_query.as_deref()).await;
            let report = state.borrow().report(false);
            to_js(&report).map_err(JsValue::from)
        })
    }

    /// Set (or forget) the access token; it is kept for later visits.
    #[wasm_bindgen(js_name = setAccessToken)]
    pub fn set_access_token(&self, token: Option<String>) {
        let mut state = self.state.borrow_mut();
        state.session.set_access_token(token);
        store_token(state.session.access_token());
    }

    #[wasm_bindgen(js_name = accessToken)]
    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().session.access_token().map(str::to_string)
    }

    #[wasm_bindgen(js_name = apiBaseUrl)]
    pub fn api_base_url(&self) -> String {
        self.state.borrow().session.settings().api_base_url.clone()
    }

    // =========================================================================
    // LOD and CSV slots
    // =========================================================================

    /// Change the LOD; every CSV slot is removed when it differs.
    #[wasm_bindgen(js_name = setLod)]
    pub fn set_lod(&self, lod: String) {
        let mut state = self.state.borrow_mut();
        state.session.set_lod(lod);
        if state.session.tracker().slots().is_empty() {
            state.files.clear();
        }
    }

    #[wasm_bindgen(js_name = addSlot)]
    pub fn add_slot(&self) -> SlotId {
        self.state.borrow_mut().session.tracker_mut().add_slot()
    }

    #[wasm_bindgen(js_name = removeSlot)]
    pub fn remove_slot(&self, id: SlotId) -> bool {
        let mut state = self.state.borrow_mut();
        state.files.remove(&id);
        state.session.tracker_mut().remove_slot(id)
    }

    #[wasm_bindgen(js_name = clearSlots)]
    pub fn clear_slots(&self) {
        let mut state = self.state.borrow_mut();
        state.files.clear();
        state.session.tracker_mut().clear();
    }

    #[wasm_bindgen(js_name = setSlotDetails)]
    pub fn set_slot_details(&self, id: SlotId, description: String, key_column: String) -> Result<(), JsValue> {
        self.state
            .borrow_mut()
            .session
            .tracker_mut()
            .set_details(id, description, key_column)
            .map_err(|e| AppError::from(e).into())
    }

    #[wasm_bindgen(js_name = setModelFile)]
    pub fn set_model_file(&self, file: Option<File>) {
        self.state.borrow_mut().model = file;
    }

    /// Attach (or detach) a CSV file and validate it.
    ///
    /// Resolves to the slot view, or `null` when superseded.
    #[wasm_bindgen(js_name = selectFile)]
    pub fn select_file(&self, id: SlotId, file: Option<File>) -> Promise {
        let result = (|| -> AppResult<bool> {
            let mut state = self.state.borrow_mut();
            state.session.tracker_mut().set_file(id, file.as_ref().map(File::name))?;
            match file {
                Some(file) => {
                    state.files.insert(id, file);
                    Ok(true)
                }
                None => {
                    state.files.remove(&id);
                    Ok(false)
                }
            }
        })();

        match result {
            Ok(true) => self.validate_slot(id),
            Ok(false) => resolve_view(&self.state, id),
            Err(e) => Promise::reject(&e.into()),
        }
    }

    /// Choose a schema option and revalidate the slot's file.
    #[wasm_bindgen(js_name = selectOption)]
    pub fn select_option(&self, id: SlotId, option: Option<String>) -> Promise {
        let has_file = {
            let mut state = self.state.borrow_mut();
            if let Err(e) = state.session.tracker_mut().set_option(id, option) {
                return Promise::reject(&AppError::from(e).into());
            }
            state.files.contains_key(&id)
        };

        if has_file {
            self.validate_slot(id)
        } else {
            resolve_view(&self.state, id)
        }
    }

    /// Read the slot's file and validate it.
    #[wasm_bindgen(js_name = validateSlot)]
    pub fn validate_slot(&self, id: SlotId) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            validate_slot(state, id).await.map_err(JsValue::from)
        })
    }

    /// Start a validation whose file the caller reads itself.
    #[wasm_bindgen(js_name = beginValidation)]
    pub fn begin_validation(&self, id: SlotId) -> Result<JsValue, JsValue> {
        let ticket = self
            .state
            .borrow_mut()
            .session
            .tracker_mut()
            .begin(id)
            .map_err(AppError::from)?;
        Ok(to_js(&ticket)?)
    }

    /// Validate the text read for `ticket`; `null` when superseded.
    #[wasm_bindgen(js_name = completeValidation)]
    pub fn complete_validation(&self, ticket: JsValue, text: String) -> Result<JsValue, JsValue> {
        let ticket: Ticket = serde_wasm_bindgen::from_value(ticket).map_err(AppError::from)?;
        Ok(self.state.borrow_mut().finish(ticket, Some(&text))?)
    }

    /// Record that reading the file of `ticket` failed.
    #[wasm_bindgen(js_name = readFailed)]
    pub fn read_failed(&self, ticket: JsValue) -> Result<JsValue, JsValue> {
        let ticket: Ticket = serde_wasm_bindgen::from_value(ticket).map_err(AppError::from)?;
        Ok(self.state.borrow_mut().finish(ticket, None)?)
    }

    #[wasm_bindgen(js_name = slotView)]
    pub fn slot_view(&self, id: SlotId) -> Result<JsValue, JsValue> {
        Ok(to_js(&self.state.borrow().session.tracker().view(id))?)
    }

    // =========================================================================
    // Upload and job
    // =========================================================================

    /// Throws the message to show when the form may not be submitted.
    #[wasm_bindgen(js_name = checkSubmission)]
    pub fn check_submission(&self) -> Result<(), JsValue> {
        let state = self.state.borrow();
        state
            .session
            .check_submission(state.model.is_some())
            .map_err(|e| AppError::Upload(e.to_string()).into())
    }

    /// Gate and post the bundle. Resolves to the server reply.
    pub fn submit(&self, building_id: String, description: String) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            submit(state, building_id, description).await.map_err(JsValue::from)
        })
    }

    /// Fetch the status of the submitted job once.
    #[wasm_bindgen(js_name = fetchStatus)]
    pub fn fetch_status(&self) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let (api_base, processing_id) = {
                let state = state.borrow();
                let id = state
                    .processing_id
                    .clone()
                    .ok_or_else(|| JsValue::from(AppError::Invalid("No job submitted".into())))?;
                (state.session.settings().api_base_url.clone(), id)
            };

            let status = fetch_status(&api_base, &processing_id).await?;
            let value = to_js(&status)?;
            if status.is_terminal() {
                log::info!("Processing finished with status: {}", status.status);
            }
            state.borrow_mut().job = Some(status);
            Ok(value)
        })
    }

    /// Store a status obtained elsewhere (e.g. the page's own poller).
    #[wasm_bindgen(js_name = setJobStatus)]
    pub fn set_job_status(&self, status: JsValue) -> Result<(), JsValue> {
        let status: JobStatus = serde_wasm_bindgen::from_value(status).map_err(AppError::from)?;
        self.state.borrow_mut().job = Some(status);
        Ok(())
    }

    #[wasm_bindgen(js_name = launchAreaMapUrl)]
    pub fn launch_area_map_url(&self) -> Result<String, JsValue> {
        let state = self.state.borrow();
        let metadata = job_metadata(&state);
        area_map_url(&metadata, state.session.access_token())
            .map_err(|e| AppError::Launch(e.to_string()).into())
    }

    #[wasm_bindgen(js_name = launchBimUrl)]
    pub fn launch_bim_url(&self, building_id: String) -> Result<String, JsValue> {
        let state = self.state.borrow();
        let metadata = job_metadata(&state);
        bim_url(&metadata, &building_id, state.session.access_token())
            .map_err(|e| AppError::Launch(e.to_string()).into())
    }

    // =========================================================================
    // Theme
    // =========================================================================

    /// The theme in effect (`light` or `dark`).
    pub fn theme(&self) -> String {
        self.state.borrow().session.theme().as_str().to_string()
    }

    /// Apply a theme and save it; returns the theme in effect.
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, theme: Option<String>) -> String {
        let theme = Theme::parse(theme.as_deref());
        self.state.borrow_mut().session.set_theme(theme);
        store_theme(theme.as_str());
        theme.as_str().to_string()
    }

    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) -> String {
        let theme = self.state.borrow_mut().session.toggle_theme();
        store_theme(theme.as_str());
        theme.as_str().to_string()
    }
}

fn job_metadata(state: &State) -> ifcload::JobMetadata {
    state
        .job
        .as_ref()
        .and_then(|job| job.metadata.clone())
        .unwrap_or_default()
}

fn resolve_view(state: &Rc<RefCell<State>>, id: SlotId) -> Promise {
    match to_js(&state.borrow().session.tracker().view(id)) {
        Ok(view) => Promise::resolve(&view),
        Err(e) => Promise::reject(&e.into()),
    }
}

/// Download the library into the session; failures leave it unset.
async fn refresh(state: &Rc<RefCell<State>>, access_query: Option<&str>) {
    let url = state.borrow().session.settings().library_url();
    let library = match fetch_schema_library(&url, access_query).await {
        Ok(library) => Some(library),
        Err(e) => {
            log::error!("Error fetching CSV schema: {}", e);
            None
        }
    };
    state.borrow_mut().session.set_library(library);
}

async fn validate_slot(state: Rc<RefCell<State>>, id: SlotId) -> AppResult<JsValue> {
    let (ticket, file) = {
        let mut state = state.borrow_mut();
        let file = state
            .files
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::Invalid(format!("Slot {} has no file", id)))?;
        let ticket = state.session.tracker_mut().begin(id)?;
        (ticket, file)
    };

    let text = match JsFuture::from(file.text()).await {
        Ok(value) => value.as_string(),
        Err(e) => {
            log::error!("Error reading CSV file {}: {:?}", file.name(), e);
            None
        }
    };

    let result = state.borrow_mut().finish(ticket, text.as_deref());
    result
}

async fn submit(state: Rc<RefCell<State>>, building_id: String, description: String) -> AppResult<JsValue> {
    let (api_base, form, model, files) = {
        let state = state.borrow();
        let form = state
            .session
            .prepare_upload(state.model.is_some(), &building_id, &description)?;
        let model = state
            .model
            .clone()
            .ok_or_else(|| AppError::Upload("Please select an IFC file".into()))?;
        (
            state.session.settings().api_base_url.clone(),
            form,
            model,
            state.files.clone(),
        )
    };

    let response = submit_upload(&api_base, &form, &model, &files).await?;
    if response.success {
        log::info!("✅ {}", response.summary());
        state.borrow_mut().processing_id = response.processing_id.clone();
    } else {
        log::warn!("❌ {}", response.summary());
    }
    to_js(&response)
}

/// Validate CSV text against a library document, without a session.
#[wasm_bindgen(js_name = validateCsv)]
pub fn validate_csv(text: &str, lod: &str, option: Option<String>, library_json: &str) -> Result<JsValue, JsValue> {
    let library = load_library_str(library_json).map_err(|e| AppError::Library(e.to_string()))?;
    let verdict = SchemaMatcher::new(&library).validate_text(text, lod, option.as_deref());
    Ok(to_js(&verdict)?)
}
