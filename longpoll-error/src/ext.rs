use std::{any::Any, error::Error};

use crate::StatusCode;

/// Extension trait for the crate's errors (object-safe).
///
/// Gives every error a status code, a message that is safe to hand to a
/// client and a detailed message for logs.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Status used by the transport layer.
    ///
    /// Defaults to [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Returns the error as [`Any`] so callers can downcast to the concrete
    /// type.
    fn as_any(&self) -> &dyn Any;

    /// Message for clients. Server-side failures never leak their details.
    fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    /// Detailed message for logs only.
    fn log_message(&self) -> String {
        format!("{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use std::{any::Any, error::Error, fmt};

    use super::*;

    #[derive(Debug)]
    struct DefaultError(pub &'static str);

    impl fmt::Display for DefaultError {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "DefaultError: {}", self.0)
        }
    }

    impl Error for DefaultError {}

    impl ErrorExt for DefaultError {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct BadInput(pub &'static str);

    impl fmt::Display for BadInput {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "bad input: {}", self.0)
        }
    }

    impl Error for BadInput {}

    impl ErrorExt for BadInput {
        fn status_code(&self) -> StatusCode {
            StatusCode::InvalidArgs
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Errors without an explicit status are internal.
    #[test]
    fn test_default_status_code_is_internal() {
        let e = DefaultError("oops");
        assert_eq!(e.status_code(), StatusCode::Internal);
    }

    /// Internal errors hide their details from clients.
    #[test]
    fn test_client_message_internal() {
        let e = DefaultError("sensitive");
        assert_eq!(e.client_message(), "Internal server error");
        assert!(e.log_message().contains("sensitive"));
    }

    /// Client errors are reported with their `Display` text.
    #[test]
    fn test_client_message_client_error() {
        let e = BadInput("topic");
        assert_eq!(e.client_message(), "bad input: topic");
    }

    #[test]
    fn test_downcast_via_as_any() {
        let boxed: Box<dyn ErrorExt> = Box::new(BadInput("x"));
        assert!(boxed.as_any().downcast_ref::<BadInput>().is_some());
        assert!(boxed.as_any().downcast_ref::<DefaultError>().is_none());
    }
}
