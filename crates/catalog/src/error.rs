//! The module contains the errors the catalog can return.
//!
//! - [`NotFound`] when a requested row does not exist.
//! - [`ConstraintViolation`] when a write breaks a schema constraint
//!   (lengths, required fields, category codes, uniqueness, foreign keys).
//! - [`Validation`] when user input cannot even be interpreted.
//!
//!  [`NotFound`]: CatalogError::NotFound
//!  [`ConstraintViolation`]: CatalogError::ConstraintViolation
//!  [`Validation`]: CatalogError::Validation
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Catalog custom errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Media storage failed: {0}")]
    Media(#[from] std::io::Error),
    #[error("Password hashing failed: {0}")]
    Password(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for CatalogError {
    fn from(value: DbErr) -> Self {
        match value.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => {
                Self::ConstraintViolation(format!("unique constraint failed: {msg}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                Self::ConstraintViolation(format!("foreign key constraint failed: {msg}"))
            }
            // sqlx does not classify SQLite CHECK failures.
            _ if value.to_string().contains("CHECK constraint failed") => {
                Self::ConstraintViolation(value.to_string())
            }
            _ => Self::Database(value),
        }
    }
}

impl PartialEq for CatalogError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ConstraintViolation(a), Self::ConstraintViolation(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Media(a), Self::Media(b)) => a.kind() == b.kind(),
            (Self::Password(a), Self::Password(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
