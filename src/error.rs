use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JigError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Write/verify error: {0}")]
    WriteVerify(String),

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Firmware error: {0}")]
    FirmwareError(String),

    #[error("Programming cancelled")]
    Cancelled,

    #[error("Robot did not respond within {0:?}")]
    Timeout(Duration),
}

/// Coarse classification of a failure, as presented to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    WriteVerify,
    Communication,
    Validation,
}

impl JigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JigError::Connection(_) => ErrorKind::Connection,
            JigError::WriteVerify(_) | JigError::Cancelled => ErrorKind::WriteVerify,
            JigError::Communication(_) | JigError::Timeout(_) => ErrorKind::Communication,
            JigError::Validation(_) | JigError::FirmwareError(_) => ErrorKind::Validation,
        }
    }
}

pub type JigResult<T> = std::result::Result<T, JigError>;
