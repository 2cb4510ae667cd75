// Library surface for the binary, headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod api;
pub mod app_dirs;
pub mod auth;
pub mod config;
pub mod editor;
pub mod error;
pub mod finger;
pub mod keymap;
pub mod layout;
pub mod logging;
pub mod runtime;
pub mod store;
pub mod timer;
pub mod typing;
pub mod typing_policy;
pub mod words;

pub use error::{ApiError, Error, Result};
