//! Error taxonomy shared by every codec operation.

use idcard_types::{ErrorCode, LastError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdCardError {
    /// Reference table missing, unreadable, empty or not decodable.
    #[error("{0}")]
    LocationFileNotExists(String),

    /// Wrong length, non-digit characters or check-character mismatch.
    #[error("invalid id card.")]
    InvalidIdCard,

    /// Code absent from the reference table, or district rule violated.
    #[error("{0}")]
    InvalidLocation(&'static str),

    /// Not a real calendar date.
    #[error("{0}")]
    InvalidDate(&'static str),
}

impl IdCardError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::LocationFileNotExists(_) => ErrorCode::LocationFileNotExists,
            Self::InvalidIdCard => ErrorCode::InvalidIdCard,
            Self::InvalidLocation(_) => ErrorCode::InvalidLocation,
            Self::InvalidDate(_) => ErrorCode::InvalidDate,
        }
    }
}

impl From<&IdCardError> for LastError {
    fn from(err: &IdCardError) -> Self {
        LastError {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IdCardError>;
