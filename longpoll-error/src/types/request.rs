use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Errors produced while turning a transport request into a broker call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("missing required parameter '{name}'")]
    MissingParam { name: &'static str },

    #[error("invalid value '{value}' for parameter '{name}'")]
    InvalidParam { name: &'static str, value: String },

    #[error("invalid request body: {reason}")]
    InvalidBody { reason: String },
}

impl ErrorExt for RequestError {
    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidArgs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
