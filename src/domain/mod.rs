//! Domain layer - Core business entities and logic
//!
//! Plain data types and the rules that do not need a database:
//! team naming, plan inheritance, role parsing.

pub mod team;
pub mod user;

pub use team::{Membership, NewTeam, Team, TeamResponse, TeamRole, TeamSummary, TeamWithMembers};
pub use user::User;
