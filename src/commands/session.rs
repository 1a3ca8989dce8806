//! Session command - Issues session cookies for existing users.

use std::sync::Arc;

use crate::cli::args::{SessionAction, SessionArgs};
use crate::config::{Config, SESSION_COOKIE_NAME};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Database, Persistence, UnitOfWork};
use crate::services::{SessionAuthenticator, SessionService};

/// Execute the session command
pub async fn execute(args: SessionArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let uow = Arc::new(Persistence::new(db.get_connection()));

    match args.action {
        SessionAction::Issue { email } => {
            let user = uow
                .users()
                .find_by_email(&email)
                .await?
                .ok_or_not_found()
                .inspect_err(|_| tracing::error!(%email, "No user with this email"))?;

            let sessions = SessionAuthenticator::new(uow, config);
            let token = sessions.issue(&user)?;

            tracing::info!(user_id = %user.id, "Session issued");
            println!("{}={}", SESSION_COOKIE_NAME, token);
        }
    }

    Ok(())
}
