use thiserror::Error;

/// Failure taxonomy shared by every layer of the backend.
///
/// Mutating operations are all-or-nothing: whenever one of these surfaces,
/// no partial effect (seat decrement, booking insert) has been persisted.
/// `Transient` failures are safe for the caller to retry as-is.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("resource not found")]
    NotFound,

    #[error("flight is sold out")]
    SoldOut,

    #[error("booking is already cancelled")]
    AlreadyCancelled,

    #[error("flight number already exists: {0}")]
    DuplicateFlightNumber(String),

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
