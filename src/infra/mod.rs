//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and migrations
//! - SeaORM entities and repositories
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{TeamRepository, TeamStore, UserRepository, UserStore};
pub use unit_of_work::{
    in_transaction, retry_on_serialization_failure, Persistence, TransactionContext,
    TxTeamRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockTeamRepository, MockUserRepository};
