//! HTTP surface: login, dashboard pages, bot actions, status stream and metrics.

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, StatusPayload, CONTROL_VIEW_PATH};
pub use routes::create_router;
