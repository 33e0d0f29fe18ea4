//! Endpoint settings served next to the page.

use gloo_net::http::Request;

use ifcload::session::SETTINGS_FALLBACK_WARNING;
use ifcload::Settings;

use crate::types::{AppError, AppResult};

/// Fetch and parse `settings.json`.
pub async fn fetch_settings(url: &str) -> AppResult<Settings> {
    let response = Request::get(url).send().await?;

    if !response.ok() {
        return Err(AppError::Network(format!(
            "Failed to load {} ({})",
            url,
            response.status()
        )));
    }

    let text = response.text().await?;
    Settings::from_json(&text).map_err(|e| AppError::Invalid(e.to_string()))
}

/// Fetch the settings, falling back to empty endpoints.
///
/// Returns the settings and whether the fallback was used.
pub async fn load_settings(url: &str) -> (Settings, bool) {
    match fetch_settings(url).await {
        Ok(settings) => {
            log::info!("✅ Settings loaded from {}", url);
            (settings, false)
        }
        Err(e) => {
            log::warn!("⚠️  {} ({})", SETTINGS_FALLBACK_WARNING, e);
            (Settings::default(), true)
        }
    }
}
