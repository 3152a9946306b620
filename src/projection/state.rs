//! Projection state tracking for a single employee

use chrono::{Datelike, NaiveDate};

use crate::employee::EmployeeRecord;

/// State of an employee at the start of a projection year
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    /// Completed projection years (0 at the valuation date)
    pub projection_year: u32,

    /// Calendar year of the valuation date plus completed projection years
    pub calendar_year: i32,

    /// Attained age in whole years
    pub attained_age: u32,

    /// Completed years of service
    pub years_of_service: u32,

    /// Cumulative probability of surviving from the valuation date to now
    pub survival: f64,
}

impl ProjectionState {
    /// Initialize state for an employee at the valuation date
    pub fn at_valuation(employee: &EmployeeRecord, valuation_date: NaiveDate) -> Self {
        Self {
            projection_year: 0,
            calendar_year: valuation_date.year(),
            attained_age: employee.attained_age(valuation_date),
            years_of_service: employee.years_of_service(valuation_date),
            survival: 1.0,
        }
    }

    /// Years left before the employee reaches `retirement_age` (0 once reached)
    pub fn years_to_retirement(&self, retirement_age: u32) -> u32 {
        retirement_age.saturating_sub(self.attained_age)
    }

    /// Move to the next projection year; survival is carried until [`Self::apply_mortality`]
    pub fn advance_year(&mut self) {
        self.projection_year += 1;
        self.calendar_year += 1;
        self.attained_age += 1;
        self.years_of_service += 1;
    }

    /// Remove the year's deaths from the surviving probability
    pub fn apply_mortality(&mut self, qx: f64) {
        self.survival *= 1.0 - qx;
    }
}
