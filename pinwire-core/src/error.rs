//! Error classification
//!
//! Every per-request failure is classified into one of these kinds at the
//! router boundary; the kind alone decides the status code.

use pinwire_protocol::Status;

/// Category of a request failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Bad path, method or parameter shape
    Validation,
    /// Well-formed, but not allowed in the pin's current state
    Precondition,
    /// Path not recognized
    NotFound,
    /// Hardware or storage failed after validation passed
    Internal,
}

impl ErrorKind {
    /// Status code reported for this kind
    pub fn status(self) -> Status {
        match self {
            ErrorKind::Validation => Status::BadRequest,
            ErrorKind::Precondition => Status::NotAcceptable,
            ErrorKind::NotFound => Status::NotFound,
            ErrorKind::Internal => Status::InternalServerError,
        }
    }
}
