//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when an item is not found or not owned by the
//!   current user.
//! - [`Validation`] thrown when submitted data fails field-level checks.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Validation`]: EngineError::Validation
use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;

/// A single field-level validation message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected validation messages for one submitted form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was collected, a [`EngineError::Validation`]
    /// otherwise.
    pub fn into_result(self) -> Result<(), EngineError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Password hashing failed: {0}")]
    Password(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Shorthand for a validation error on a single field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        Self::Validation(errors)
    }
}

impl From<DbErr> for EngineError {
    /// An update that touched no row means the row vanished between load and
    /// write (a concurrent delete); that is reported as not found. Every other
    /// database error stays fatal.
    fn from(value: DbErr) -> Self {
        match value {
            DbErr::RecordNotUpdated => Self::KeyNotFound("record".to_string()),
            DbErr::RecordNotFound(what) => Self::KeyNotFound(what),
            other => Self::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Password(a), Self::Password(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanished_row_is_not_found() {
        let err = EngineError::from(DbErr::RecordNotUpdated);
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }

    #[test]
    fn other_db_errors_stay_fatal() {
        let err = EngineError::from(DbErr::Custom("boom".to_string()));
        assert!(matches!(err, EngineError::Database(_)));
    }

    #[test]
    fn field_errors_display_joins_fields() {
        let mut errors = FieldErrors::new();
        errors.push("name", "must not be empty");
        errors.push("amount", "must be greater than 0");
        assert_eq!(
            errors.to_string(),
            "name: must not be empty; amount: must be greater than 0"
        );
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
