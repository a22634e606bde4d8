use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use caseline_core::case::CaseView;
use tracing::error;

use super::{api_error, internal_error, ApiError, AppState};

const FETCH_FAILED: &str = "Failed to fetch case";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cases/", get(get_case_without_id))
        .route("/cases/{case_id}", get(get_case))
}

async fn get_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseView>, ApiError> {
    lookup_case(&state, &case_id).await.map(Json)
}

async fn get_case_without_id(State(state): State<AppState>) -> Result<Json<CaseView>, ApiError> {
    lookup_case(&state, "").await.map(Json)
}

async fn lookup_case(state: &AppState, case_id: &str) -> Result<CaseView, ApiError> {
    if case_id.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing caseId parameter"));
    }

    match state.cases.get_case(case_id).await {
        Ok(Some(case)) => Ok(CaseView::from(case)),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Case {case_id} not found"),
        )),
        Err(e) => {
            error!("fetching case {case_id} failed: {e}");
            Err(internal_error(e.message(), FETCH_FAILED))
        }
    }
}
