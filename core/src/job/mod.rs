//! Processing job status and the viewer links offered once it completes.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::LaunchError;
use crate::library::append_query;

/// How often the status endpoint is polled.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Delay between the `completed` status and showing the results.
pub const REVEAL_DELAY: Duration = Duration::from_secs(1);

/// Building shown when the form leaves the id empty.
pub const DEFAULT_BUILDING_ID: &str = "CEN047";

/// `{api_base}/api/status/{processing_id}`
pub fn status_url(api_base: &str, processing_id: &str) -> String {
    format!("{}/api/status/{}", api_base.trim_end_matches('/'), processing_id)
}

/// Building id for display.
pub fn display_building_id(building_id: &str) -> &str {
    if building_id.is_empty() {
        DEFAULT_BUILDING_ID
    } else {
        building_id
    }
}

/// Model file name for display; falls back to `{building}.ifc`.
pub fn display_model_name(model_file: Option<&str>, building_id: &str) -> String {
    match model_file {
        Some(name) => name.to_string(),
        None => format!("{}.ifc", display_building_id(building_id)),
    }
}

/// Characters a URI component keeps unescaped, besides ASCII alphanumerics.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

// =============================================================================
// Status
// =============================================================================

/// Extra results attached to a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMetadata {
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub area_bim_endpoint: Option<String>,
    #[serde(default)]
    pub individual_bim_endpoint: Option<String>,
    /// Current BIM version; a number or a numeric string.
    #[serde(default, rename = "totalBIMversion")]
    pub total_bim_version: Option<serde_json::Value>,
}

/// One poll of the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub processing_id: String,
    /// `processing`, `completed`, `failed`, or any server-defined value.
    pub status: String,
    /// Fraction done, 0 to 1.
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub metadata: Option<JobMetadata>,
}

impl JobStatus {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }

    /// Polling stops at a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.is_failed()
    }

    pub fn progress_percent(&self) -> u32 {
        (self.progress.clamp(0.0, 1.0) * 100.0).round() as u32
    }

    /// Text under the spinner.
    pub fn display_label(&self) -> String {
        match self.status.as_str() {
            "processing" => "Processing...".to_string(),
            "completed" => "Completed!".to_string(),
            "failed" => "Failed".to_string(),
            other => capitalize(other),
        }
    }

    /// Alert to raise when the job reached a terminal status.
    pub fn outcome_message(&self) -> Option<String> {
        if self.is_completed() {
            Some("Processing completed successfully!".to_string())
        } else if self.is_failed() {
            Some(format!(
                "Processing failed: {}",
                self.message.as_deref().unwrap_or_default()
            ))
        } else {
            None
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Deep links
// =============================================================================

/// Area map link, carrying the access token.
pub fn area_map_url(metadata: &JobMetadata, token: Option<&str>) -> Result<String, LaunchError> {
    let endpoint = metadata
        .area_bim_endpoint
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or(LaunchError::AreaMapUnavailable)?;
    Ok(append_query(endpoint, &format!("token={}", encode(token.unwrap_or_default()))))
}

/// BIM viewer link for the next model version of a building.
pub fn bim_url(metadata: &JobMetadata, building_id: &str, token: Option<&str>) -> Result<String, LaunchError> {
    let endpoint = metadata
        .individual_bim_endpoint
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or(LaunchError::BimUnavailable)?;
    let version = next_version(metadata.total_bim_version.as_ref())?;

    Ok(format!(
        "{}?building_id={}&v={}&p=full&d=normal&token={}",
        endpoint,
        encode(building_id),
        version,
        encode(token.unwrap_or_default())
    ))
}

fn next_version(version: Option<&serde_json::Value>) -> Result<i64, LaunchError> {
    use serde_json::Value;

    let parsed = match version {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => leading_integer(s),
        _ => None,
    };
    parsed
        .and_then(|v| v.checked_add(1))
        .ok_or_else(|| LaunchError::InvalidVersion(version.map(|v| v.to_string()).unwrap_or_default()))
}

/// Integer prefix of a string, as a lenient numeric parse would read it.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
