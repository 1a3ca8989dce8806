//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion and reach repositories through the Unit of Work.

pub mod container;
mod session_service;
mod team_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use session_service::{SessionAuthenticator, SessionClaims, SessionService};
pub use team_service::{TeamManager, TeamService};
