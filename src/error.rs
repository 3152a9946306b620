//! Error types for valuation runs
//!
//! Two tiers:
//! - [`InputValidationError`] is raised before any projection starts and fails the whole run
//! - [`ProjectionError`] is raised for a single employee and is captured in that employee's result

use serde::Serialize;
use thiserror::Error;

/// Errors detected while building the typed inputs of a run
#[derive(Debug, Error)]
pub enum InputValidationError {
    /// An assumption value is missing or outside its allowed range
    #[error("invalid assumption `{field}`: {message}")]
    Assumption {
        field: &'static str,
        message: String,
    },

    /// An employee field is malformed or outside its allowed range
    #[error("invalid employee `{employee_id}` field `{field}`: {message}")]
    Employee {
        employee_id: String,
        field: &'static str,
        message: String,
    },

    /// The same employee ID appears more than once in a run
    #[error("duplicate employee id `{0}`")]
    DuplicateEmployee(String),

    /// A line of the input file could not be tokenized
    #[error("line {line}: {message}")]
    Line { line: u64, message: String },

    /// The mortality table is empty or carries an invalid rate
    #[error("invalid mortality table: {0}")]
    MortalityTable(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InputValidationError {
    pub(crate) fn assumption(field: &'static str, message: impl Into<String>) -> Self {
        Self::Assumption {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn employee(
        employee_id: &str,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::Employee {
            employee_id: employee_id.to_string(),
            field,
            message: message.into(),
        }
    }
}

/// Errors that stop the projection of a single employee
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ProjectionError {
    /// Mortality lookup for an age the table does not cover
    #[error("age {age} is outside the mortality table (covers {min_age}..={max_age})")]
    AgeOutOfRange { age: u32, min_age: u32, max_age: u32 },
}
