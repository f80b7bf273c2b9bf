//! Unified error taxonomy for metricgate.
//!
//! Two families of failure exist:
//! - [`ValidationError`]: the input was rejected before any work started.
//! - [`EngineError::Comparison`]: something unexpected went wrong while
//!   computing a report. Carries the `COMPARISON_ERROR` code and the cause.
//!
//! Callers branch on [`EngineError::code`] instead of walking source chains.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const COMPARISON_ERROR: &str = "COMPARISON_ERROR";

/// Minimum history length accepted by trend analysis.
pub const MIN_TREND_SNAPSHOTS: usize = 2;

/// Stable, machine-readable error code.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    ComparisonError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ValidationError => VALIDATION_ERROR,
            ErrorCode::ComparisonError => COMPARISON_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a non-empty string")]
    EmptyString { field: String },

    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidNumber { field: String, value: f64 },

    #[error("invalid metrics snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("invalid baseline: {reason}")]
    InvalidBaseline { reason: String },

    #[error("At least {required} snapshots required for trend analysis (got {actual})")]
    InsufficientSnapshots { required: usize, actual: usize },

    #[error("precision must be at most {max} digits (got {value})")]
    InvalidPrecision { value: u32, max: u32 },
}

impl ValidationError {
    pub fn empty(field: impl Into<String>) -> Self {
        ValidationError::EmptyString {
            field: field.into(),
        }
    }

    pub fn snapshot(reason: impl Into<String>) -> Self {
        ValidationError::InvalidSnapshot {
            reason: reason.into(),
        }
    }

    pub fn baseline(reason: impl Into<String>) -> Self {
        ValidationError::InvalidBaseline {
            reason: reason.into(),
        }
    }
}

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by the engine's public use cases.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{code}: {message}")]
    Comparison {
        code: ErrorCode,
        message: String,
        #[source]
        source: BoxedCause,
    },
}

impl EngineError {
    /// Wrap an unexpected internal failure as a `COMPARISON_ERROR`.
    pub fn comparison<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: Into<BoxedCause>,
    {
        EngineError::Comparison {
            code: ErrorCode::ComparisonError,
            message: message.into(),
            source: cause.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Validation(_) => ErrorCode::ValidationError,
            EngineError::Comparison { code, .. } => *code,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}
