use async_trait::async_trait;
use caseline_core::case::Case;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// The message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::NotFound(msg)
            | ServiceError::InvalidInput(msg)
            | ServiceError::Internal(msg) => msg,
        }
    }
}

/// Read access to cases owned by the upstream workflow.
///
/// The HTTP layer programs against this trait.
/// `LocalCaseStore` reads through a `caseline_db::Database`.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// `Ok(None)` when no case has this id.
    async fn get_case(&self, case_id: &str) -> Result<Option<Case>, ServiceError>;
}
