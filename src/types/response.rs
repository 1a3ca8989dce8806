use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// 201 Created with the resource as the JSON body
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}
