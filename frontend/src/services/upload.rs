//! Bundle upload to the processing API, and job status lookups.

use std::collections::HashMap;

use gloo_net::http::Request;
use web_sys::{File, FormData};

use ifcload::{status_url, upload_url, JobStatus, SlotId, UploadForm, UploadResponse};

use crate::types::{js_error, AppError, AppResult};

/// Lay out the multipart body: the model, the base fields, then each CSV
/// followed by its own fields.
pub fn build_form_data(form: &UploadForm, model: &File, files: &HashMap<SlotId, File>) -> AppResult<FormData> {
    let form_data = FormData::new().map_err(|e| js_error("Failed to create FormData", e))?;

    form_data
        .append_with_blob("file", model)
        .map_err(|e| js_error("Failed to append file", e))?;

    for (name, value) in form.base_fields() {
        form_data
            .append_with_str(&name, &value)
            .map_err(|e| js_error("Failed to append field", e))?;
    }

    for attachment in &form.attachments {
        let file = files.get(&attachment.slot).ok_or_else(|| {
            AppError::Upload(format!("CSV file \"{}\" is no longer available", attachment.file_name))
        })?;

        form_data
            .append_with_blob(&attachment.file_field(), file)
            .map_err(|e| js_error("Failed to append CSV file", e))?;

        for (name, value) in attachment.text_fields() {
            form_data
                .append_with_str(&name, &value)
                .map_err(|e| js_error("Failed to append field", e))?;
        }
    }

    Ok(form_data)
}

/// Post the bundle to `{api_base}/api/process-ifc`.
pub async fn submit_upload(
    api_base: &str,
    form: &UploadForm,
    model: &File,
    files: &HashMap<SlotId, File>,
) -> AppResult<UploadResponse> {
    let form_data = build_form_data(form, model, files)?;

    log::info!(
        "📤 Uploading {} with {} CSV file(s)",
        model.name(),
        form.attachments.len()
    );

    let response = Request::post(&upload_url(api_base))
        .body(form_data)
        .map_err(|e| AppError::Network(format!("Failed to build request: {}", e)))?
        .send()
        .await?;

    // Failed uploads still answer with `{ success: false, message }`.
    response
        .json::<UploadResponse>()
        .await
        .map_err(|e| AppError::Upload(format!("Upload failed: {}", e)))
}

/// Fetch the current status of a job once.
pub async fn fetch_status(api_base: &str, processing_id: &str) -> AppResult<JobStatus> {
    let response = Request::get(&status_url(api_base, processing_id)).send().await?;

    if !response.ok() {
        return Err(AppError::Network(format!(
            "Status request failed ({})",
            response.status()
        )));
    }

    response
        .json::<JobStatus>()
        .await
        .map_err(|e| AppError::Invalid(format!("Failed to parse status: {}", e)))
}
