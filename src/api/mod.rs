//! API layer - HTTP handlers and extractors
//!
//! This module contains all HTTP-related concerns:
//! - Request handlers
//! - Custom extractors (session, validated JSON)
//! - Route definitions and OpenAPI documentation

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
