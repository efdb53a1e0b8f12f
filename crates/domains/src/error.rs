//! # DomainError
//!
//! Centralized error handling for the doot workspace.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

use crate::validation::FieldErrors;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Resource not found (e.g., Post, Comment, Board)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// One or more submitted fields failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The form as a whole was rejected (e.g., bad credentials).
    #[error("{0}")]
    Rejected(String),

    /// No authenticated user for an operation that needs one.
    #[error("you must be logged in to do that")]
    Unauthenticated,

    /// Authenticated, but not the owner of the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource already exists (e.g., duplicate username or board slug)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, hashing task panicked)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A specialized Result type for doot logic.
pub type Result<T> = std::result::Result<T, DomainError>;
