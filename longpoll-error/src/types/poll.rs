use std::{any::Any, time::Duration};

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Failure of a single long-poll wait.
///
/// A timeout is the routine end of a round without data: callers are
/// expected to subscribe and wait again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("polling timeout after {after:?}")]
    Timeout { after: Duration },
}

impl PollError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl ErrorExt for PollError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Timeout { .. } => StatusCode::Timeout,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::Timeout { .. } => "Long polling timeout".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = PollError::Timeout {
            after: Duration::from_millis(100),
        };
        assert_eq!(err.to_string(), "polling timeout after 100ms");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_timeout_status_answers_ok() {
        let err = PollError::Timeout {
            after: Duration::from_secs(1),
        };
        assert_eq!(err.status_code(), StatusCode::Timeout);
        assert_eq!(err.status_code().http_status(), 200);
        assert_eq!(err.client_message(), "Long polling timeout");
    }
}
