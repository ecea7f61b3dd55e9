use shared::{error::ApiError, protocol::TimestampError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("questionnaire request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("questionnaire request rejected: {0}")]
    Server(#[from] ApiError),
    #[error("malformed questionnaire payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("questionnaire has an invalid open window: {0}")]
    InvalidWindow(#[from] TimestampError),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("answer submission failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("answer submission rejected: {0}")]
    Rejected(#[from] ApiError),
}
