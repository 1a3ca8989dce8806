//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub(crate) mod entities;
pub(crate) mod team_repository;
mod user_repository;

pub use team_repository::{TeamRepository, TeamStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests
#[cfg(any(test, feature = "test-utils"))]
pub use team_repository::MockTeamRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
