//! Application configuration.
//!
//! Endpoints come from `settings.json`; these constants cover the rest.

/// Settings document, relative to the page.
pub const SETTINGS_URL: &str = "settings.json";

/// `localStorage` key of the access token.
pub const TOKEN_STORAGE_KEY: &str = "accessToken";

/// `localStorage` key of the theme preference.
pub const THEME_STORAGE_KEY: &str = "theme";

/// Status polling interval (in milliseconds).
pub const POLL_INTERVAL_MS: u32 = ifcload::job::POLL_INTERVAL.as_millis() as u32;

/// Delay before the completed view is shown (in milliseconds).
pub const REVEAL_DELAY_MS: u32 = ifcload::job::REVEAL_DELAY.as_millis() as u32;

/// Console log level.
pub const LOG_LEVEL: log::Level = log::Level::Debug;
