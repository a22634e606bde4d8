use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaselineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid attachment payload: {0}")]
    InvalidPayload(String),
}
