//! Custom axum extractors.

mod session;
mod validated_json;

pub use session::CurrentUser;
pub use validated_json::ValidatedJson;
