//! Schema library download.

use gloo_net::http::Request;

use ifcload::{append_query, load_library_str, SchemaLibrary};

use crate::types::{AppError, AppResult};

/// Download and load the schema library.
///
/// `access_query` (signed-URL parameters) is appended to `url` when given.
pub async fn fetch_schema_library(url: &str, access_query: Option<&str>) -> AppResult<SchemaLibrary> {
    let url = append_query(url, access_query.unwrap_or_default());
    log::debug!("📥 Fetching CSV schema from {}", url);

    let response = Request::get(&url).send().await?;

    if !response.ok() {
        return Err(AppError::Library(format!(
            "Failed to fetch CSV schema: {} {}",
            response.status(),
            response.status_text()
        )));
    }

    let text = response.text().await?;
    let library = load_library_str(&text).map_err(|e| AppError::Library(e.to_string()))?;

    log::info!("✅ CSV schema loaded: {} schemas", library.len());
    Ok(library)
}
