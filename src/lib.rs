//! Teams API - team listing with lazy provisioning, and team creation.
//!
//! Users authenticate with a session cookie. Listing the teams of a user who
//! has none creates a personal team for them and moves their documents and
//! domains into it; creating a team makes the requester its ADMIN.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, repositories)
//! - **api**: HTTP handlers, extractors, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Print a session cookie for a user
//! cargo run -- session issue --email ada@example.com
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Team, TeamRole, TeamSummary, User};
pub use errors::{AppError, AppResult};
