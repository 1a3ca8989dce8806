//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::team_handler;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{Membership, TeamResponse, TeamRole, TeamSummary};

/// OpenAPI documentation for the Teams API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Teams API",
        version = "0.1.0",
        description = "Team listing with lazy provisioning, and team creation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        team_handler::list_teams,
        team_handler::create_team,
    ),
    components(
        schemas(
            TeamRole,
            TeamSummary,
            Membership,
            TeamResponse,
            team_handler::CreateTeamRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Teams", description = "Team membership and creation")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
            );
        }
    }
}
