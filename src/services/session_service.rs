//! Session service - Resolves session cookies to users.
//!
//! A session token is an HS256 JWT whose subject is the user id. Verifying a
//! token also checks that the user still exists.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Session service trait for dependency injection.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Mint a session token for a user
    fn issue(&self, user: &User) -> AppResult<String>;

    /// Verify a session token and load its user
    async fn authenticate(&self, token: &str) -> AppResult<User>;
}

/// Concrete implementation of SessionService using Unit of Work.
pub struct SessionAuthenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> SessionAuthenticator<U> {
    /// Create new session service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    fn verify(&self, token: &str) -> AppResult<SessionClaims> {
        let token_data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.session_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl<U: UnitOfWork> SessionService for SessionAuthenticator<U> {
    fn issue(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = Duration::try_hours(self.config.session_ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::internal("Session lifetime out of range"))?;

        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.session_secret_bytes()),
        )?;

        Ok(token)
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify(token)?;

        match self.uow.users().find_by_id(claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = %claims.sub, "Session refers to unknown user");
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockTeamRepository, MockUserRepository, TeamRepository, UserRepository};
    use mockall::predicate::eq;

    struct TestUnitOfWork {
        users: Arc<MockUserRepository>,
    }

    impl UnitOfWork for TestUnitOfWork {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.users.clone()
        }

        fn teams(&self) -> Arc<dyn TeamRepository> {
            Arc::new(MockTeamRepository::new())
        }
    }

    fn config() -> Config {
        Config::new("postgres://localhost/teams", "test-session-secret-with-32-chars!!").unwrap()
    }

    fn authenticator(users: MockUserRepository) -> SessionAuthenticator<TestUnitOfWork> {
        let uow = TestUnitOfWork {
            users: Arc::new(users),
        };
        SessionAuthenticator::new(Arc::new(uow), config())
    }

    #[tokio::test]
    async fn test_issued_token_authenticates() {
        let user = User::new(Uuid::new_v4(), "ada@example.com".to_string()).with_name("Ada");
        let stored = user.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(user.id))
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = authenticator(users);
        let token = service.issue(&user).unwrap();
        let resolved = service.authenticate(&token).await.unwrap();

        assert_eq!(resolved, user);
    }

    #[tokio::test]
    async fn test_unknown_user_is_unauthorized() {
        let user = User::new(Uuid::new_v4(), "gone@example.com".to_string());

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let service = authenticator(users);
        let token = service.issue(&user).unwrap();
        let result = service.authenticate(&token).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected_without_lookup() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();

        let service = authenticator(users);
        let result = service.authenticate("not-a-jwt").await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Jwt(_)));
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let user = User::new(Uuid::new_v4(), "ada@example.com".to_string());
        let other = SessionAuthenticator::new(
            Arc::new(TestUnitOfWork {
                users: Arc::new(MockUserRepository::new()),
            }),
            Config::new("postgres://localhost/teams", "another-secret-that-is-32-chars-long").unwrap(),
        );
        let forged = other.issue(&user).unwrap();

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();

        let result = authenticator(users).authenticate(&forged).await;
        assert!(matches!(result, Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_oversized_ttl_is_an_error() {
        let mut config = config();
        config.session_ttl_hours = 1_000_000_000_000;
        let service = SessionAuthenticator::new(
            Arc::new(TestUnitOfWork {
                users: Arc::new(MockUserRepository::new()),
            }),
            config,
        );

        let user = User::new(Uuid::new_v4(), "ada@example.com".to_string());
        let result = service.issue(&user);

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
            iat: (Utc::now() - Duration::hours(3)).timestamp(),
        };
        let expired = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config().session_secret_bytes()),
        )
        .unwrap();

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();

        let result = authenticator(users).authenticate(&expired).await;
        assert!(matches!(result, Err(AppError::Jwt(_))));
    }
}
