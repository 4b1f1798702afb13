//! The module contains the errors the engine can throw.
//!
//! The server maps each variant onto an HTTP status:
//!
//! - [`KeyNotFound`] for missing (or not visible) rows, 404.
//! - [`Unauthorized`] for bad credentials and unknown or expired sessions, 401.
//! - the `Invalid*` variants and [`ExistingKey`] for rejected input, 400.
//! - [`Database`] and [`PasswordHash`] for everything unexpected, 500.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Database`]: EngineError::Database
//!  [`PasswordHash`]: EngineError::PasswordHash
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found")]
    KeyNotFound(String),
    #[error("{0} already present")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidMonth(a), Self::InvalidMonth(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::InvalidConfig(a), Self::InvalidConfig(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
