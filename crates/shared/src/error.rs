use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PoiId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidIndex,
    UnknownPointOfInterest,
    NoSelection,
    LocationUnavailable,
    SessionClosed,
}

/// Rejections surfaced by session commands. Every variant leaves session state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("index {index} out of range (len {len})")]
    InvalidIndex { index: usize, len: usize },
    #[error("unknown point of interest {0}")]
    UnknownPointOfInterest(PoiId),
    #[error("no point selected")]
    NoSelection,
    #[error("location unavailable (code {code})")]
    LocationUnavailable { code: i32 },
    #[error("session is closed")]
    SessionClosed,
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::InvalidIndex { .. } => ErrorCode::InvalidIndex,
            SessionError::UnknownPointOfInterest(_) => ErrorCode::UnknownPointOfInterest,
            SessionError::NoSelection => ErrorCode::NoSelection,
            SessionError::LocationUnavailable { .. } => ErrorCode::LocationUnavailable,
            SessionError::SessionClosed => ErrorCode::SessionClosed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&SessionError> for ApiError {
    fn from(value: &SessionError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}
