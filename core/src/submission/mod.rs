//! Upload gating and the multipart layout of the processing request.
//!
//! The gate runs before any bytes leave the browser: every attached CSV must
//! have a completed, valid verdict, and a schema option when one is needed.

use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;
use crate::slots::CsvSlot;

/// Path of the processing endpoint, relative to the API base URL.
pub const PROCESS_PATH: &str = "/api/process-ifc";

/// `userId` sent with every upload.
pub const UPLOAD_USER_ID: &str = "admin";

/// Check whether the form may be submitted.
///
/// Slots without a file are ignored. The first blocking slot, in form
/// order, decides the message.
pub fn check_submission(model_file_present: bool, slots: &[CsvSlot]) -> Result<(), SubmissionError> {
    if !model_file_present {
        return Err(SubmissionError::MissingModelFile);
    }

    for slot in slots {
        let Some(file_name) = &slot.file_name else {
            continue;
        };

        let verdict = match slot.verdict() {
            Some(verdict) if !slot.is_pending() => verdict,
            _ => {
                return Err(SubmissionError::ValidationPending {
                    file_name: file_name.clone(),
                })
            }
        };

        if !verdict.is_valid {
            return Err(SubmissionError::ValidationFailed {
                file_name: file_name.clone(),
                message: verdict.error_message.clone(),
            });
        }

        if verdict.requires_selection && slot.selected_option.is_none() {
            return Err(SubmissionError::SelectionRequired {
                file_name: file_name.clone(),
            });
        }

        // The option sent must be the one the verdict was computed with.
        if verdict.requires_selection && !verdict.warning && verdict.selected_option != slot.selected_option {
            return Err(SubmissionError::ValidationPending {
                file_name: file_name.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Form layout
// =============================================================================

/// One CSV attachment of the upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAttachment {
    /// Slot the file belongs to.
    pub slot: u32,
    /// Position of the slot in the form; used in field names.
    pub index: usize,
    pub file_name: String,
    pub description: String,
    pub key_column: String,
    pub schema_name: String,
    pub schema_option: String,
}

impl UploadAttachment {
    pub fn file_field(&self) -> String {
        format!("csvFile{}", self.index)
    }

    /// Text fields that follow the file field.
    pub fn text_fields(&self) -> [(String, String); 4] {
        let i = self.index;
        [
            (format!("csvDescription{}", i), self.description.clone()),
            (format!("csvKeyColumn{}", i), self.key_column.clone()),
            (format!("csvSchemaName{}", i), self.schema_name.clone()),
            (format!("csvSchemaOption{}", i), self.schema_option.clone()),
        ]
    }
}

/// Everything the processing endpoint receives, minus the file bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadForm {
    pub building_id: String,
    pub description: String,
    pub user_id: String,
    pub selected_lod: String,
    pub attachments: Vec<UploadAttachment>,
}

impl UploadForm {
    /// Build the form from the current slots.
    ///
    /// Indices follow slot positions, so they may have gaps when a slot has
    /// no file.
    pub fn new(building_id: &str, description: &str, selected_lod: &str, slots: &[CsvSlot]) -> Self {
        let attachments = slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let file_name = slot.file_name.clone()?;
                Some(UploadAttachment {
                    slot: slot.id,
                    index,
                    file_name,
                    description: slot.description.clone(),
                    key_column: slot.key_column.clone(),
                    schema_name: slot
                        .verdict()
                        .map(|v| v.matched_schema_name.clone())
                        .unwrap_or_default(),
                    schema_option: slot.selected_option.clone().unwrap_or_default(),
                })
            })
            .collect();

        Self {
            building_id: building_id.to_string(),
            description: description.to_string(),
            user_id: UPLOAD_USER_ID.to_string(),
            selected_lod: selected_lod.to_string(),
            attachments,
        }
    }

    /// Fields sent right after the model's `file` field.
    pub fn base_fields(&self) -> Vec<(String, String)> {
        vec![
            ("buildingId".to_string(), self.building_id.clone()),
            ("description".to_string(), self.description.clone()),
            ("userId".to_string(), self.user_id.clone()),
            ("selectedLOD".to_string(), self.selected_lod.clone()),
        ]
    }

    /// All text fields. On the wire each attachment's file
    /// ([`UploadAttachment::file_field`]) precedes its text fields.
    pub fn text_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.base_fields();
        for attachment in &self.attachments {
            fields.extend(attachment.text_fields());
        }
        fields
    }
}

/// Reply of the processing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub processing_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    /// Message to show the user.
    pub fn summary(&self) -> String {
        if self.success {
            "File uploaded successfully! Processing started.".to_string()
        } else {
            format!("Upload failed: {}", self.message.as_deref().unwrap_or_default())
        }
    }
}

/// `{api_base}/api/process-ifc`
pub fn upload_url(api_base: &str) -> String {
    format!("{}{}", api_base.trim_end_matches('/'), PROCESS_PATH)
}
