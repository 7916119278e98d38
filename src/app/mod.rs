//! Application module
//!
//! This module contains the core application state and logic.

pub mod config;
pub mod preferences;
mod state;

pub use config::Action;
pub use preferences::Preferences;
pub use state::{AppState, TapOutcome};
