//! Custom error types for SplitLedger
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Every ledger validation failure is
//! recoverable: the operation that produced it leaves state untouched.

use thiserror::Error;

/// The main error type for SplitLedger operations
#[derive(Error, Debug)]
pub enum SplitError {
    /// Split parameters don't add up, or reference unknown members
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Payer amounts don't add up, or reference unknown members
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    /// Adding a member name that is already registered
    #[error("Member already exists: {0}")]
    DuplicateMember(String),

    /// Import snapshot is missing required fields or is malformed
    #[error("Format error: {0}")]
    Format(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl SplitError {
    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for members
    pub fn member_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Member",
            identifier: identifier.into(),
        }
    }
}

impl From<std::io::Error> for SplitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SplitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for SplitLedger operations
pub type SplitResult<T> = Result<T, SplitError>;
