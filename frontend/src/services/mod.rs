//! Backend and static resource services.
//!
//! # Services
//!
//! - [`settings`] - `settings.json` endpoints
//! - [`schema`] - CSV schema library download
//! - [`upload`] - bundle upload and job status
//! - [`storage`] - token and theme preferences

pub mod settings;
pub mod schema;
pub mod upload;
pub mod storage;

pub use settings::*;
pub use schema::*;
pub use upload::*;
pub use storage::*;
