//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Centralizes access to all repositories
//! - Manages database transactions (begin, commit, rollback)
//! - Hands transaction-scoped repositories to multi-step writes

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use uuid::Uuid;

use super::repositories::team_repository::{
    insert_member, insert_team, members_of, move_documents, move_domains, teams_for_user,
};
use super::repositories::{TeamRepository, TeamStore, UserRepository, UserStore};
use crate::domain::{Membership, NewTeam, Team, TeamRole, TeamSummary};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transactional closures.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories. Transactions are opened
/// by repositories that need them through [`in_transaction`].
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get team repository
    fn teams(&self) -> Arc<dyn TeamRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    team_repo: Arc<TeamStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            team_repo: Arc::new(TeamStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn teams(&self) -> Arc<dyn TeamRepository> {
        self.team_repo.clone()
    }
}

/// Execute a closure within a transaction.
///
/// The transaction is committed when the closure succeeds and rolled back
/// when it fails.
pub async fn in_transaction<F, T>(
    db: &DatabaseConnection,
    isolation: IsolationLevel,
    f: F,
) -> AppResult<T>
where
    F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
    T: Send,
{
    let txn = db
        .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
        .await
        .map_err(AppError::from)?;

    let ctx = TransactionContext::new(&txn);

    match f(ctx).await {
        Ok(result) => {
            txn.commit().await.map_err(AppError::from)?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// Re-run `op` when it loses a serialization conflict, at most `max_retries` times.
///
/// Each call to `op` must start a fresh transaction.
pub async fn retry_on_serialization_failure<F, Fut, T>(max_retries: u32, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if attempt < max_retries && e.is_serialization_failure() => {
                attempt += 1;
                tracing::warn!(attempt, "Serialization conflict, retrying transaction");
            }
            result => return result,
        }
    }
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get team repository for this transaction
    pub fn teams(&self) -> TxTeamRepository<'a> {
        TxTeamRepository { txn: self.txn }
    }
}

/// Transaction-aware team repository.
pub struct TxTeamRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxTeamRepository<'_> {
    /// Teams the user belongs to, oldest first
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<TeamSummary>> {
        teams_for_user(self.txn, user_id).await
    }

    /// Insert a team row
    pub async fn insert(&self, team: NewTeam) -> AppResult<Team> {
        insert_team(self.txn, team).await
    }

    /// Add a user to a team
    pub async fn add_member(&self, team_id: Uuid, user_id: Uuid, role: TeamRole) -> AppResult<Membership> {
        insert_member(self.txn, team_id, user_id, role).await
    }

    /// Memberships of a team
    pub async fn members(&self, team_id: Uuid) -> AppResult<Vec<Membership>> {
        members_of(self.txn, team_id).await
    }

    /// Attach every document owned by the user to the team
    pub async fn attach_documents(&self, owner_id: Uuid, team_id: Uuid) -> AppResult<u64> {
        move_documents(self.txn, owner_id, team_id).await
    }

    /// Attach every domain registered by the user to the team
    pub async fn attach_domains(&self, user_id: Uuid, team_id: Uuid) -> AppResult<u64> {
        move_domains(self.txn, user_id, team_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::errors::serialization_conflict;

    #[tokio::test]
    async fn test_retries_once_after_conflict() {
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result = retry_on_serialization_failure(1, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(serialization_conflict())
            } else {
                Ok("winner's teams")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "winner's teams");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: AppResult<()> = retry_on_serialization_failure(1, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(serialization_conflict())
        })
        .await;

        assert!(result.unwrap_err().is_serialization_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: AppResult<()> = retry_on_serialization_failure(3, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::internal("constraint check failed"))
        })
        .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
