//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod custom_domain;
pub mod document;
pub mod team;
pub mod user;
pub mod user_team;
