//! Errors raised while turning a request into a response.

use std::io;
use thiserror::Error;

use crate::response::Status;

pub type Result<T> = std::result::Result<T, ServeError>;

#[derive(Error, Debug)]
pub enum ServeError {
    /// Missing or unreadable path, traversal attempt or disallowed method
    #[error("{0}")]
    NotFound(String),

    /// The request line or path could not be understood
    #[error("{0}")]
    BadRequest(String),

    /// Writing to or finalizing the compression stream failed
    #[error("compression failed: {0}")]
    Compression(#[source] io::Error),

    /// Anything else, e.g. rendering a listing page
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServeError {
    pub fn status(&self) -> Status {
        match self {
            ServeError::NotFound(_) => Status::NotFound,
            ServeError::BadRequest(_) => Status::BadRequest,
            ServeError::Compression(_) | ServeError::Internal(_) => Status::InternalServerError,
        }
    }

    /// Body sent to the client. Server-side failures are not echoed back.
    pub fn body(&self) -> String {
        match self {
            ServeError::NotFound(msg) | ServeError::BadRequest(msg) => msg.clone(),
            ServeError::Compression(_) | ServeError::Internal(_) => "Internal error".to_string(),
        }
    }
}

impl From<std::fmt::Error> for ServeError {
    fn from(e: std::fmt::Error) -> Self {
        ServeError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_status() {
        assert_eq!(ServeError::NotFound("x".into()).status(), Status::NotFound);
        assert_eq!(ServeError::BadRequest("x".into()).status(), Status::BadRequest);
        let err = ServeError::Compression(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(err.status(), Status::InternalServerError);
        assert_eq!(err.body(), "Internal error");
    }

    #[test]
    fn not_found_body_is_message() {
        let err = ServeError::NotFound("invalid path".into());
        assert_eq!(err.body(), "invalid path");
        assert_eq!(err.to_string(), "invalid path");
    }
}
