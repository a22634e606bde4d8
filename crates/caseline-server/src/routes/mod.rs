pub mod attachments;
pub mod cases;
pub mod health;

use std::sync::Arc;

use axum::{http::StatusCode, middleware, Json, Router};
use caseline_db::Database;
use caseline_service::CaseStore;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthConfig};

pub struct InnerAppState {
    pub cases: Arc<dyn CaseStore>,
    pub db: Arc<dyn Database>,
    pub auth: Option<Arc<AuthConfig>>,
}

pub type AppState = Arc<InnerAppState>;

/// Error half of every handler result: a status plus `{"error": msg}`.
pub type ApiError = (StatusCode, Json<Value>);

pub fn build_router(state: AppState) -> Router {
    let public = Router::new().merge(health::routes());

    let protected = Router::new()
        .merge(cases::routes())
        .merge(attachments::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": msg.into() })))
}

/// 500 carrying `msg`, or `fallback` when `msg` is blank.
pub(crate) fn internal_error(msg: &str, fallback: &str) -> ApiError {
    let msg = if msg.trim().is_empty() { fallback } else { msg };
    api_error(StatusCode::INTERNAL_SERVER_ERROR, msg)
}
