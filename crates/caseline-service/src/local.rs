use std::sync::Arc;

use async_trait::async_trait;
use caseline_core::case::Case;
use caseline_core::CaselineError;
use caseline_db::Database;

use crate::{CaseStore, ServiceError};

/// Case store backed by the local database handle.
#[derive(Clone)]
pub struct LocalCaseStore {
    db: Arc<dyn Database>,
}

impl LocalCaseStore {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Validate and write a case, replacing any stored case with the same id.
    pub async fn put_case(&self, case: &Case) -> Result<(), ServiceError> {
        case.validate()?;
        Ok(self.db.put_case(case).await?)
    }
}

impl From<caseline_db::DbError> for ServiceError {
    fn from(e: caseline_db::DbError) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

impl From<CaselineError> for ServiceError {
    fn from(e: CaselineError) -> Self {
        match e {
            CaselineError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

#[async_trait]
impl CaseStore for LocalCaseStore {
    async fn get_case(&self, case_id: &str) -> Result<Option<Case>, ServiceError> {
        Ok(self.db.get_case(case_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LocalCaseStore {
        LocalCaseStore::new(Arc::new(
            caseline_db::SqliteDatabase::open_in_memory().unwrap(),
        ))
    }

    fn case(case_id: &str) -> Case {
        Case {
            case_id: case_id.into(),
            po_number: "PO1".into(),
            line_id: "L1".into(),
            supplier_name: None,
            state: "open".into(),
            status: "pending".into(),
            missing_fields: None,
            next_check_at: None,
            updated_at: 100,
            meta: None,
        }
    }

    #[tokio::test]
    async fn reads_back_written_case() {
        let store = store();
        store.put_case(&case("C1")).await.unwrap();
        let fetched = store.get_case("C1").await.unwrap().unwrap();
        assert_eq!(fetched.po_number, "PO1");
        assert!(store.get_case("C2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_case_without_id() {
        let store = store();
        let err = store.put_case(&case("")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
