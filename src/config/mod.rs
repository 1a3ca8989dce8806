//! Application configuration module
//!
//! Environment-driven settings plus the constants shared by the session
//! and team layers.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
