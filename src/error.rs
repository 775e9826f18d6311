// src/error.rs - Errors surfaced by the camera client and panel view-model
use thiserror::Error;

/// The only failure the camera-control layer reports.
///
/// Transport errors, non-success HTTP statuses and undecodable bodies all
/// collapse into `RequestFailed`; callers decide whether to log or show it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Request to '{endpoint}' failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },
}

impl CameraError {
    pub fn request_failed(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        CameraError::RequestFailed {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            CameraError::RequestFailed { endpoint, .. } => endpoint,
        }
    }
}

pub type CameraResult<T> = Result<T, CameraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_display() {
        let err = CameraError::request_failed("move", "connection refused");
        assert_eq!(err.endpoint(), "move");
        assert_eq!(err.to_string(), "Request to 'move' failed: connection refused");
    }
}
