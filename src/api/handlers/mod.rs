//! HTTP request handlers.

pub mod team_handler;

pub use team_handler::team_routes;
