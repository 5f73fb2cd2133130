//! The module contains the errors the engine can throw.
//!
//! They fall into three classes the API surfaces as 4xx responses:
//!
//! - not found: [`KeyNotFound`] (no shop configured, or an id outside the
//!   caller's shop)
//! - permission: [`Forbidden`]
//! - validation: [`ExistingKey`], [`InvalidInput`], [`InvalidTransition`]
//!
//! [`Database`] wraps storage failures and is never an expected outcome.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidTransition`]: EngineError::InvalidTransition
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    KeyNotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    ExistingKey(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors caused by the caller's request rather than
    /// by the storage layer.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ExistingKey(_) | Self::InvalidInput(_) | Self::InvalidTransition(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
