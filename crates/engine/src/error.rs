//! The module contains the error the engine can throw.
//!
//! Every ledger operation either commits fully or returns exactly one
//! [`EngineError`]. The variants are tagged so the transport layer can map
//! them to stable response codes:
//!
//! - [`Validation`] malformed input, lists every violation found.
//! - [`InsufficientFunds`] a balance-sufficiency precondition failed.
//! - [`InvalidState`] the entity state forbids the operation.
//! - [`KeyNotFound`] the entity is missing or belongs to another user.
//! - [`Conflict`] a concurrent mutation won the race, the caller may retry.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

use crate::MoneyCents;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: MoneyCents,
        requested: MoneyCents,
    },
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Shorthand for a validation error with a single violation.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Stable tag for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidState(_) => "invalid_state",
            Self::KeyNotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Database(_) => "internal_error",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (
                Self::InsufficientFunds {
                    available: a1,
                    requested: r1,
                },
                Self::InsufficientFunds {
                    available: a2,
                    requested: r2,
                },
            ) => a1 == a2 && r1 == r2,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_message_includes_available() {
        let err = EngineError::InsufficientFunds {
            available: MoneyCents::new(500_00),
            requested: MoneyCents::new(600_00),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: available 500.00, requested 600.00"
        );
    }

    #[test]
    fn validation_lists_every_violation() {
        let err = EngineError::Validation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Validation failed: a; b");
        assert_eq!(err.code(), "validation_error");
    }
}
