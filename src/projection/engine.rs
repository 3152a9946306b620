//! Core projection engine for yearly Expected Death Outflow projections

use log::debug;

use crate::assumptions::{Assumptions, MortalityTable};
use crate::employee::EmployeeRecord;
use super::state::ProjectionState;
use super::cashflows::{ProjectionFailure, ProjectionRow};

/// Main projection engine
///
/// Holds the read-only basis of a run. Projecting an employee touches no other state,
/// so one engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
    mortality: MortalityTable,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and mortality
    pub fn new(assumptions: Assumptions, mortality: MortalityTable) -> Self {
        Self { assumptions, mortality }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn mortality(&self) -> &MortalityTable {
        &self.mortality
    }

    /// Project one employee from the valuation date to retirement
    ///
    /// Emits one row per year until the employee reaches retirement age; an employee
    /// already at or past retirement age gets no rows. Stops at the first year whose
    /// mortality rate is not tabulated and returns the rows produced so far with the error.
    pub fn project_employee(&self, employee: &EmployeeRecord) -> Result<Vec<ProjectionRow>, ProjectionFailure> {
        let mut state = ProjectionState::at_valuation(employee, self.assumptions.valuation_date());
        let years = state.years_to_retirement(self.assumptions.retirement_age());
        // Never more rows than the table has ages to look up
        let mut rows = Vec::with_capacity((years as usize).min(self.mortality.len()));

        for _ in 0..years {
            // Rate applicable over the year is the one for the age at its start
            let age_at_start = state.attained_age;
            let qx = match self.mortality.lookup(age_at_start) {
                Ok(qx) => qx,
                Err(error) => {
                    debug!(
                        "employee {}: projection stopped in year {}: {}",
                        employee.employee_id(),
                        state.projection_year + 1,
                        error
                    );
                    return Err(ProjectionFailure { error, partial_rows: rows });
                }
            };

            state.advance_year();
            rows.push(self.calculate_year(employee, &state, qx));
            state.apply_mortality(qx);
        }

        Ok(rows)
    }

    /// Calculate the row for the year `state` has just entered
    fn calculate_year(&self, employee: &EmployeeRecord, state: &ProjectionState, qx: f64) -> ProjectionRow {
        let t = state.projection_year as i32;

        let projected_salary = employee.annual_salary()
            * (1.0 + self.assumptions.salary_increase_rate()).powi(t);
        let discount_factor = 1.0 / (1.0 + self.assumptions.discount_rate()).powi(t);
        let expected_death_outflow = projected_salary * qx * state.survival * discount_factor;

        ProjectionRow {
            projection_year: state.projection_year,
            calendar_year: state.calendar_year,
            attained_age: state.attained_age,
            years_of_service: state.years_of_service,
            projected_salary,
            discount_factor,
            survival_probability: state.survival,
            death_probability: qx,
            expected_death_outflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectionError;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assumptions(discount_rate: f64) -> Assumptions {
        Assumptions::new(date(2024, 12, 31), discount_rate, 0.03, 60).unwrap()
    }

    fn employee(dob: NaiveDate) -> EmployeeRecord {
        EmployeeRecord::new("E001", "Jane Doe", dob, date(2015, 6, 1).max(dob), 50_000.0).unwrap()
    }

    /// Rising rates so survival visibly compounds; covers ages 0-99
    fn rising_table() -> MortalityTable {
        let rates: Vec<f64> = (0..100).map(|age| 0.0005 + age as f64 * 0.0004).collect();
        MortalityTable::from_qx_by_age(0, &rates).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let engine = ProjectionEngine::new(assumptions(0.07), MortalityTable::standard());
        let rows = engine.project_employee(&employee(date(1990, 1, 15))).unwrap();

        assert_eq!(rows.len(), 26);

        let first = &rows[0];
        let qx_1 = MortalityTable::standard().lookup(34).unwrap();
        assert_eq!(first.projection_year, 1);
        assert_eq!(first.calendar_year, 2025);
        assert_eq!(first.attained_age, 35);
        assert_eq!(first.years_of_service, 10);
        assert_relative_eq!(first.projected_salary, 51_500.0, epsilon = 1e-9);
        assert_relative_eq!(first.discount_factor, 0.934579, epsilon = 1e-6);
        assert_eq!(first.survival_probability, 1.0);
        assert_eq!(first.death_probability, qx_1);
        assert_relative_eq!(
            first.expected_death_outflow,
            51_500.0 * qx_1 * (1.0 / 1.07),
            max_relative = 1e-12
        );

        let last = rows.last().unwrap();
        assert_eq!(last.projection_year, 26);
        assert_eq!(last.attained_age, 60);
        assert_eq!(last.calendar_year, 2050);
    }

    #[test]
    fn test_row_count_matches_years_to_retirement() {
        let engine = ProjectionEngine::new(assumptions(0.05), rising_table());

        for birth_year in [1965, 1970, 1980, 1990, 2000] {
            let employee = employee(date(birth_year, 6, 30));
            let age = employee.attained_age(date(2024, 12, 31));
            let rows = engine.project_employee(&employee).unwrap();
            assert_eq!(rows.len() as u32, 60 - age);
        }
    }

    #[test]
    fn test_retired_employee_has_no_rows() {
        let engine = ProjectionEngine::new(assumptions(0.05), rising_table());

        // Exactly 60 at the valuation date, and well past it
        assert!(engine.project_employee(&employee(date(1964, 12, 31))).unwrap().is_empty());
        assert!(engine.project_employee(&employee(date(1950, 3, 1))).unwrap().is_empty());
    }

    #[test]
    fn test_one_year_before_retirement_has_one_row() {
        let engine = ProjectionEngine::new(assumptions(0.05), rising_table());
        // Turns 60 on 1 Jan 2025, so 59 at the valuation date
        let rows = engine.project_employee(&employee(date(1965, 1, 1))).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attained_age, 60);
        assert_eq!(rows[0].death_probability, rising_table().lookup(59).unwrap());
    }

    #[test]
    fn test_discount_factor_strictly_decreasing() {
        let engine = ProjectionEngine::new(assumptions(0.04), rising_table());
        let rows = engine.project_employee(&employee(date(1985, 5, 5))).unwrap();

        assert!(rows.windows(2).all(|w| w[1].discount_factor < w[0].discount_factor));
    }

    #[test]
    fn test_zero_discount_rate_is_flat() {
        let engine = ProjectionEngine::new(assumptions(0.0), rising_table());
        let rows = engine.project_employee(&employee(date(1985, 5, 5))).unwrap();

        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.discount_factor == 1.0));
    }

    #[test]
    fn test_survival_non_increasing_and_bounded() {
        let engine = ProjectionEngine::new(assumptions(0.05), rising_table());
        let rows = engine.project_employee(&employee(date(1980, 2, 2))).unwrap();

        assert!(rows.iter().all(|r| (0.0..=1.0).contains(&r.survival_probability)));
        assert!(rows.windows(2).all(|w| w[1].survival_probability <= w[0].survival_probability));

        // Survival to year 3 is the product of the first two years' survival
        let expected = (1.0 - rows[0].death_probability) * (1.0 - rows[1].death_probability);
        assert_relative_eq!(rows[2].survival_probability, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_certain_death_zeroes_later_survival() {
        let table = MortalityTable::from_qx_by_age(55, &[0.0, 1.0, 0.2, 0.2, 0.2]).unwrap();
        let engine = ProjectionEngine::new(assumptions(0.05), table);
        let rows = engine.project_employee(&employee(date(1969, 6, 1))).unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].survival_probability, 1.0);
        assert!(rows[2..].iter().all(|r| r.survival_probability == 0.0 && r.expected_death_outflow == 0.0));
    }

    #[test]
    fn test_missing_rate_returns_partial_rows() {
        // Table stops at 57: ages 55-57 project, lookup(58) fails in year 4
        let table = MortalityTable::from_qx_by_age(55, &[0.01, 0.01, 0.01]).unwrap();
        let engine = ProjectionEngine::new(assumptions(0.05), table);
        let failure = engine.project_employee(&employee(date(1969, 6, 1))).unwrap_err();

        assert_eq!(failure.partial_rows.len(), 3);
        assert_eq!(
            failure.error,
            ProjectionError::AgeOutOfRange { age: 58, min_age: 55, max_age: 57 }
        );
    }

    #[test]
    fn test_retirement_beyond_table_fails_at_table_end() {
        let assumptions = Assumptions::new(date(2024, 12, 31), 0.05, 0.03, 150).unwrap();
        let engine = ProjectionEngine::new(assumptions, MortalityTable::standard());
        let failure = engine.project_employee(&employee(date(1990, 1, 15))).unwrap_err();

        // 34 at valuation: ages 34-73 project, lookup(74) fails
        assert_eq!(failure.partial_rows.len(), 40);
        assert_eq!(
            failure.error,
            ProjectionError::AgeOutOfRange { age: 74, min_age: 20, max_age: 73 }
        );
    }

    #[test]
    fn test_young_employee_below_table_fails_first_year() {
        let engine = ProjectionEngine::new(assumptions(0.05), MortalityTable::standard());
        let failure = engine.project_employee(&employee(date(2008, 1, 1))).unwrap_err();

        assert!(failure.partial_rows.is_empty());
        assert!(matches!(failure.error, ProjectionError::AgeOutOfRange { age: 16, .. }));
    }
}
