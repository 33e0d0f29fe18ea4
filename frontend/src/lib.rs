//! IFC Load - Browser bindings
//!
//! WebAssembly module behind the upload page. The page renders and wires
//! events in JavaScript; validation, upload gating and link building run
//! here, on the same engine as the `ifcload` CLI.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Page (JavaScript)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Client                                                      │
//! │  ├── Session (settings, token, LOD, theme)                   │
//! │  ├── SlotTracker (CSV slots, stale-result discarding)        │
//! │  └── SchemaMatcher (schema library)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Services: settings.json, CSVSchema.json, /api/process-ifc   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Load report and error types
//! - [`client`] - The exported `Client`
//! - [`services`] - HTTP communication

use wasm_bindgen::prelude::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod client;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{AppError, AppResult, LoadReport};

// Client
pub use client::{validate_csv, Client};

// Services
pub use services::*;

// =============================================================================
// Module Entry Point
// =============================================================================

/// WASM entry point - called when the module is instantiated.
#[wasm_bindgen(start)]
pub fn main() {
    // Setup panic hook for better error messages
    console_error_panic_hook::set_once();

    // Setup console logging
    _ = console_log::init_with_level(LOG_LEVEL);

    log::info!("🏗️ IFC Load - bindings ready");
}
