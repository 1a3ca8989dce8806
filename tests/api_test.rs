//! Integration tests for the teams endpoints.
//!
//! These tests drive the full router with stub services, so no database
//! connection is required.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use teams_api::api::{create_router, AppState};
use teams_api::domain::{Membership, Team, TeamRole, TeamSummary, TeamWithMembers, User};
use teams_api::errors::{AppError, AppResult};
use teams_api::infra::Database;
use teams_api::services::{SessionService, TeamService};

const VALID_SESSION: &str = "valid-session";

// =============================================================================
// Stub Services
// =============================================================================

/// Accepts a single known token
struct StubSessionService {
    user: User,
}

#[async_trait]
impl SessionService for StubSessionService {
    fn issue(&self, _user: &User) -> AppResult<String> {
        Ok(VALID_SESSION.to_string())
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        if token == VALID_SESSION {
            Ok(self.user.clone())
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

/// Records created team names, counts listings, and lists a fixed set of teams
#[derive(Default)]
struct StubTeamService {
    created: Mutex<Vec<String>>,
    listings: Mutex<usize>,
}

#[async_trait]
impl TeamService for StubTeamService {
    async fn list_teams(&self, user: &User) -> AppResult<Vec<TeamSummary>> {
        *self.listings.lock().unwrap() += 1;
        Ok(vec![TeamSummary {
            id: Uuid::new_v4(),
            name: format!("{}'s Team", user.display_name().unwrap_or("Someone")),
        }])
    }

    async fn create_team(&self, user: &User, name: String) -> AppResult<TeamWithMembers> {
        self.created.lock().unwrap().push(name.clone());

        let id = Uuid::new_v4();
        let now = Utc::now();
        Ok(TeamWithMembers {
            team: Team {
                id,
                name,
                plan: "free".to_string(),
                stripe_id: None,
                subscription_id: None,
                starts_at: None,
                ends_at: None,
                created_at: now,
                updated_at: now,
            },
            users: vec![Membership {
                user_id: user.id,
                team_id: id,
                role: TeamRole::Admin,
            }],
        })
    }
}

struct TestApp {
    router: Router,
    user: User,
    teams: Arc<StubTeamService>,
}

fn create_test_app() -> TestApp {
    let user = User::new(Uuid::new_v4(), "ada@example.com".to_string()).with_name("Ada");
    let teams = Arc::new(StubTeamService::default());
    let database = Arc::new(Database::from_connection(
        sea_orm::DatabaseConnection::Disconnected,
    ));

    let state = AppState::new(
        Arc::new(StubSessionService { user: user.clone() }),
        teams.clone(),
        database,
    );

    TestApp {
        router: create_router(state),
        user,
        teams,
    }
}

fn request(method: Method, cookie: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri("/api/teams");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_requires_session() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(Method::GET, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_list_rejects_unknown_session() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(Method::GET, Some("session_token=forged"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_returns_teams() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(
            Method::GET,
            Some("session_token=valid-session"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let teams = body.as_array().unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0]["name"], "Ada's Team");
    assert!(teams[0]["id"].is_string());
    assert_eq!(*app.teams.listings.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_secure_cookie_is_accepted() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(
            Method::GET,
            Some("theme=dark; __Secure-session_token=valid-session"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn test_create_returns_team_with_admin() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(
            Method::POST,
            Some("session_token=valid-session"),
            Some(r#"{"team":"Acme"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Acme");
    assert_eq!(body["plan"], "free");
    assert_eq!(body["users"][0]["role"], "ADMIN");
    assert_eq!(body["users"][0]["userId"], app.user.id.to_string());
    assert_eq!(body["users"][0]["teamId"], body["id"]);

    assert_eq!(*app.teams.created.lock().unwrap(), vec!["Acme".to_string()]);
}

#[tokio::test]
async fn test_create_requires_session() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(Method::POST, None, Some(r#"{"team":"Acme"}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.teams.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_empty_name() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(
            Method::POST,
            Some("session_token=valid-session"),
            Some(r#"{"team":""}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Team name is required");
    assert!(app.teams.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_missing_name() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(
            Method::POST,
            Some("session_token=valid-session"),
            Some(r#"{}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.teams.created.lock().unwrap().is_empty());
}

// =============================================================================
// Method dispatch
// =============================================================================

#[tokio::test]
async fn test_unsupported_method_is_405_with_allow_header() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(Method::PUT, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers().get(header::ALLOW).unwrap(),
        "GET, POST"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Method PUT Not Allowed");
}

#[tokio::test]
async fn test_head_is_405_and_does_not_list() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(
            Method::HEAD,
            Some("session_token=valid-session"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers().get(header::ALLOW).unwrap(),
        "GET, POST"
    );
    assert_eq!(*app.teams.listings.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_delete_is_405_even_with_session() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(request(
            Method::DELETE,
            Some("session_token=valid-session"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Method DELETE Not Allowed");
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_root() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Teams API");
}

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
}
