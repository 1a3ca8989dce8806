//! Session extractor - Resolves the session cookie to the current user.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::api::AppState;
use crate::config::{SECURE_SESSION_COOKIE_NAME, SESSION_COOKIE_NAME};
use crate::domain::User;
use crate::errors::AppError;

/// Authenticated user of the current request.
///
/// Rejects with 401 when the session cookie is missing or does not resolve
/// to a user. Being a parts extractor, it runs before any body extractor, so
/// unauthenticated requests never reach body parsing.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SECURE_SESSION_COOKIE_NAME)
            .or_else(|| jar.get(SESSION_COOKIE_NAME))
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let user = state.session_service.authenticate(&token).await?;
        Ok(CurrentUser(user))
    }
}
