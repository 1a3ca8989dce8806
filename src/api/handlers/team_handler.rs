//! Team handlers.

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, MethodFilter},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{CurrentUser, ValidatedJson};
use crate::api::AppState;
use crate::config::{TEAMS_ALLOWED_METHODS, TEAMS_PATH};
use crate::domain::{TeamResponse, TeamSummary};
use crate::errors::AppResult;
use crate::types::Created;

/// Team creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    /// Name of the new team
    #[validate(length(min = 1, message = "Team name is required"))]
    #[schema(example = "Acme")]
    pub team: String,
}

/// Create team routes
///
/// `get` also answers HEAD, so HEAD is routed to the 405 handler explicitly.
pub fn team_routes() -> Router<AppState> {
    Router::new().route(
        TEAMS_PATH,
        get(list_teams)
            .post(create_team)
            .on(MethodFilter::HEAD, method_not_allowed)
            .fallback(method_not_allowed),
    )
}

/// List the current user's teams
///
/// A user without teams gets a personal team created on first access.
#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "Teams",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Teams ordered by creation time", body = Vec<TeamSummary>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_teams(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<TeamSummary>>> {
    let teams = state.team_service.list_teams(&user).await?;
    Ok(Json(teams))
}

/// Create a team with the current user as ADMIN
#[utoipa::path(
    post,
    path = "/api/teams",
    tag = "Teams",
    security(("session_cookie" = [])),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_team(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateTeamRequest>,
) -> AppResult<Created<TeamResponse>> {
    let team = state.team_service.create_team(&user, payload.team).await?;
    Ok(Created(TeamResponse::from(team)))
}

/// Any method other than GET and POST
async fn method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, TEAMS_ALLOWED_METHODS)],
        format!("Method {} Not Allowed", method),
    )
        .into_response()
}
