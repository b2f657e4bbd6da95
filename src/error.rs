//! Error types.
//!
//! - `ChartError` is the library error: per-row load failures and invalid
//!   parameter snapshots handed to the aggregation engine.
//! - `AppError` is the binary boundary error: a message plus the process exit code.
//!   File, export and terminal failures construct it directly (exit code 4).

use thiserror::Error;

/// Errors raised by the record store and the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    /// A raw row could not be coerced into a `ChartRecord`. Recoverable: the row
    /// is dropped and the load continues.
    #[error("line {line}: invalid `{field}` value '{value}': {reason}")]
    MalformedRecord {
        line: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The caller handed the engine a parameter snapshot it cannot evaluate
    /// (date index out of range, `top_n == 0`).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ChartError {
    /// Source line for row-level errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            ChartError::MalformedRecord { line, .. } => Some(*line),
            ChartError::InvalidParameter(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ChartError> for AppError {
    fn from(err: ChartError) -> Self {
        let code = match err {
            ChartError::InvalidParameter(_) => 2,
            ChartError::MalformedRecord { .. } => 3,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
