use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use axum::Router;
use caseline_core::attachment::{Attachment, AttachmentBlob, CreateAttachment};
use caseline_core::case::Case;
use caseline_db::{Database, DbError};
use caseline_service::{CaseStore, LocalCaseStore, ServiceError};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::auth::build_auth_config;
use crate::routes::{build_router, AppState, InnerAppState};

pub const TEST_API_KEY: &str = "cl_test_3f9a0c1d";

fn memory_db() -> Arc<dyn Database> {
    Arc::new(caseline_db::SqliteDatabase::open_in_memory().unwrap())
}

/// App state over in-memory SQLite with no auth.
pub fn test_state() -> (AppState, Arc<dyn Database>) {
    let db = memory_db();
    let state = Arc::new(InnerAppState {
        cases: Arc::new(LocalCaseStore::new(db.clone())),
        db: db.clone(),
        auth: None,
    });
    (state, db)
}

/// Build a test router with in-memory SQLite and no auth.
pub fn test_router() -> (Router, Arc<dyn Database>) {
    let (state, db) = test_state();
    (build_router(state), db)
}

/// Build a test router with auth enabled, returning (router, db, api_key).
pub fn test_router_with_auth() -> (Router, Arc<dyn Database>, String) {
    let db = memory_db();
    let state = Arc::new(InnerAppState {
        cases: Arc::new(LocalCaseStore::new(db.clone())),
        db: db.clone(),
        auth: build_auth_config(Some(TEST_API_KEY)),
    });
    (build_router(state), db, TEST_API_KEY.to_string())
}

/// State whose database fails every call.
pub fn failing_state(db: Arc<FailingDatabase>) -> AppState {
    Arc::new(InnerAppState {
        cases: Arc::new(LocalCaseStore::new(db.clone())),
        db,
        auth: None,
    })
}

/// Router whose case store fails every lookup.
pub fn failing_router(cases: Arc<FailingCaseStore>) -> Router {
    build_router(Arc::new(InnerAppState {
        cases,
        db: memory_db(),
        auth: None,
    }))
}

pub fn sample_case(case_id: &str) -> Case {
    Case {
        case_id: case_id.to_string(),
        po_number: "PO-2231".to_string(),
        line_id: "4".to_string(),
        supplier_name: Some("Initech Supply".to_string()),
        state: "awaiting_supplier".to_string(),
        status: "pending".to_string(),
        missing_fields: Some(vec!["ship_date".to_string()]),
        next_check_at: Some(1_700_000_900_000),
        updated_at: 1_700_000_000_000,
        meta: Some(json!({ "agent_queue": "followup" })),
    }
}

pub async fn read_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub struct FailingDatabase {
    message: String,
}

impl FailingDatabase {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn err(&self) -> DbError {
        DbError::Internal(self.message.clone())
    }
}

#[async_trait]
impl Database for FailingDatabase {
    async fn get_case(&self, _case_id: &str) -> Result<Option<Case>, DbError> {
        Err(self.err())
    }
    async fn put_case(&self, _case: &Case) -> Result<(), DbError> {
        Err(self.err())
    }
    async fn get_attachment_blob(
        &self,
        _attachment_id: &str,
    ) -> Result<Option<AttachmentBlob>, DbError> {
        Err(self.err())
    }
    async fn insert_attachment(&self, _input: &CreateAttachment) -> Result<Attachment, DbError> {
        Err(self.err())
    }
}

pub struct FailingCaseStore {
    message: String,
}

impl FailingCaseStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl CaseStore for FailingCaseStore {
    async fn get_case(&self, _case_id: &str) -> Result<Option<Case>, ServiceError> {
        Err(ServiceError::Internal(self.message.clone()))
    }
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    pub db: Arc<dyn Database>,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    spawn_with(test_router()).await
}

/// Same as [`spawn_test_server`] with bearer auth required; the key is
/// [`TEST_API_KEY`].
pub async fn spawn_test_server_with_auth() -> TestServer {
    let (app, db, _key) = test_router_with_auth();
    spawn_with((app, db)).await
}

async fn spawn_with((app, db): (Router, Arc<dyn Database>)) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        db,
        _handle: handle,
    }
}
