//! Cashflow output structures for projections

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// A single row of projection output for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    // Timing
    pub projection_year: u32,
    pub calendar_year: i32,
    pub attained_age: u32,
    pub years_of_service: u32,

    // Salary and discounting
    pub projected_salary: f64,
    pub discount_factor: f64,

    // Decrements
    /// Probability of surviving from the valuation date to the start of the year (px)
    pub survival_probability: f64,
    /// Probability of death within the year (qx)
    pub death_probability: f64,

    /// Discounted, probability-weighted salary payable on death in the year
    pub expected_death_outflow: f64,
}

/// A projection that stopped before retirement
///
/// Rows produced before the failure are kept for diagnostics; they are not part of any result.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionFailure {
    pub error: ProjectionError,
    pub partial_rows: Vec<ProjectionRow>,
}

/// Sum of expected death outflows over a set of rows
pub fn total_expected_death_outflow(rows: &[ProjectionRow]) -> f64 {
    rows.iter().map(|r| r.expected_death_outflow).sum()
}
