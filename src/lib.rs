//! EDO Valuation - Yearly Expected Death Outflow projections for employee benefit schemes
//!
//! This library provides:
//! - Typed, validated valuation inputs (assumptions and employee census)
//! - Age-keyed mortality tables with strict bounds
//! - A per-employee projection from the valuation date to retirement
//! - Batch valuation runs with per-employee failure capture
//! - CSV/JSON output for the execution history

pub mod error;
pub mod employee;
pub mod assumptions;
pub mod projection;
pub mod valuation;
pub mod output;

// Re-export commonly used types
pub use error::{InputValidationError, ProjectionError};
pub use employee::EmployeeRecord;
pub use assumptions::{Assumptions, MortalityTable};
pub use projection::{ProjectionEngine, ProjectionRow};
pub use valuation::{EmployeeOutcome, EmployeeResult, RunResult, RunStatus, RunSummary, ValuationRunner};
