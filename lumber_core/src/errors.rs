//! # Error Types
//!
//! Structured error types for lumber_core. Every error is a deterministic
//! logic error reported at the point of detection: construction time for
//! table and grade problems, call time for out-of-domain lookups.
//!
//! ## Example
//!
//! ```rust
//! use lumber_core::errors::{LumberError, LumberResult};
//!
//! fn validate_width(width_m: f64) -> LumberResult<()> {
//!     if width_m <= 0.0 {
//!         return Err(LumberError::invalid_input(
//!             "width_m",
//!             width_m.to_string(),
//!             "Section dimensions must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for lumber_core operations
pub type LumberResult<T> = Result<T, LumberError>;

/// Structured error type for design value operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum LumberError {
    /// A curve was queried outside its valid input domain
    #[error("Domain error: '{curve}' evaluated at {x}, valid domain is [{min}, {max}]")]
    Domain {
        curve: String,
        x: f64,
        min: f64,
        max: f64,
    },

    /// A curve or species table is malformed
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Grade or sub-grade not recognized for the species
    #[error("Unknown grade for {species}: grade '{grade}', sub-grade '{sub_grade}'")]
    UnknownGrade {
        species: String,
        grade: String,
        sub_grade: String,
    },

    /// An input value is invalid (non-positive dimension or factor)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A configuration or table file could not be read
    #[error("I/O error on '{path}': {reason}")]
    Io { path: String, reason: String },
}

impl LumberError {
    /// Create a Domain error
    pub fn domain(curve: impl Into<String>, x: f64, min: f64, max: f64) -> Self {
        LumberError::Domain {
            curve: curve.into(),
            x,
            min,
            max,
        }
    }

    /// Create a Config error
    pub fn config(reason: impl Into<String>) -> Self {
        LumberError::Config {
            reason: reason.into(),
        }
    }

    /// Create an UnknownGrade error
    pub fn unknown_grade(
        species: impl Into<String>,
        grade: impl Into<String>,
        sub_grade: impl Into<String>,
    ) -> Self {
        LumberError::UnknownGrade {
            species: species.into(),
            grade: grade.into(),
            sub_grade: sub_grade.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        LumberError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an Io error
    pub fn io(path: impl Into<String>, reason: impl Into<String>) -> Self {
        LumberError::Io {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether a retry could succeed. Never true: lookups are deterministic.
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            LumberError::Domain { .. } => "DOMAIN_ERROR",
            LumberError::Config { .. } => "CONFIG_ERROR",
            LumberError::UnknownGrade { .. } => "UNKNOWN_GRADE",
            LumberError::InvalidInput { .. } => "INVALID_INPUT",
            LumberError::Io { .. } => "IO_ERROR",
        }
    }
}
