//! Preferences kept in `localStorage` across page loads.

use crate::config::{THEME_STORAGE_KEY, TOKEN_STORAGE_KEY};

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn read(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

fn write(key: &str, value: Option<&str>) {
    let Some(storage) = local_storage() else {
        log::warn!("⚠️  localStorage unavailable; {} not saved", key);
        return;
    };
    let result = match value {
        Some(value) => storage.set_item(key, value),
        None => storage.remove_item(key),
    };
    if result.is_err() {
        log::warn!("⚠️  Could not save {}", key);
    }
}

pub fn stored_token() -> Option<String> {
    read(TOKEN_STORAGE_KEY).filter(|t| !t.is_empty())
}

/// Save the access token, or forget it when `None`.
pub fn store_token(token: Option<&str>) {
    write(TOKEN_STORAGE_KEY, token);
}

pub fn stored_theme() -> Option<String> {
    read(THEME_STORAGE_KEY)
}

pub fn store_theme(theme: &str) {
    write(THEME_STORAGE_KEY, Some(theme));
}
