pub mod auth;
pub mod commands;
pub mod config;
pub mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use caseline_db::Database;
use caseline_service::LocalCaseStore;
use tokio::net::TcpListener;

use auth::AuthConfig;
use routes::{AppState, InnerAppState};

/// Wire the shared handles the handlers read through.
pub fn app_state(db: Arc<dyn Database>, auth: Option<Arc<AuthConfig>>) -> AppState {
    Arc::new(InnerAppState {
        cases: Arc::new(LocalCaseStore::new(db.clone())),
        db,
        auth,
    })
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = routes::build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
