//! Employee census records

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::assumptions::Assumptions;
use crate::error::InputValidationError;

/// Whole calendar years elapsed from `from` to `to`
///
/// An anniversary not yet reached in the year of `to` does not count.
/// Negative when `to` precedes `from`.
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years - 1
    } else {
        years
    }
}

/// A single employee from the valuation census
///
/// Fields are private so that every record has passed [`EmployeeRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRecord {
    employee_id: String,
    name: String,
    date_of_birth: NaiveDate,
    date_of_joining: NaiveDate,
    annual_salary: f64,
}

impl EmployeeRecord {
    /// Validate and build a record
    ///
    /// # Errors
    /// - blank employee ID
    /// - joining date before the date of birth
    /// - salary not strictly positive or not finite
    pub fn new(
        employee_id: impl Into<String>,
        name: impl Into<String>,
        date_of_birth: NaiveDate,
        date_of_joining: NaiveDate,
        annual_salary: f64,
    ) -> Result<Self, InputValidationError> {
        let employee_id = employee_id.into().trim().to_string();
        let name = name.into().trim().to_string();

        if employee_id.is_empty() {
            return Err(InputValidationError::employee(&employee_id, "employee_id", "must not be blank"));
        }
        if date_of_joining < date_of_birth {
            return Err(InputValidationError::employee(
                &employee_id,
                "date_of_joining",
                format!("{} is before date of birth {}", date_of_joining, date_of_birth),
            ));
        }
        if !annual_salary.is_finite() || annual_salary <= 0.0 {
            return Err(InputValidationError::employee(
                &employee_id,
                "annual_salary",
                format!("{} must be a positive amount", annual_salary),
            ));
        }

        Ok(Self {
            employee_id,
            name,
            date_of_birth,
            date_of_joining,
            annual_salary,
        })
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    pub fn date_of_joining(&self) -> NaiveDate {
        self.date_of_joining
    }

    pub fn annual_salary(&self) -> f64 {
        self.annual_salary
    }

    /// Age in whole years at the given date (0 before the first birthday)
    pub fn attained_age(&self, as_of: NaiveDate) -> u32 {
        whole_years_between(self.date_of_birth, as_of).max(0) as u32
    }

    /// Completed years of service at the given date (0 before joining)
    pub fn years_of_service(&self, as_of: NaiveDate) -> u32 {
        whole_years_between(self.date_of_joining, as_of).max(0) as u32
    }
}

/// Check a census against the valuation basis before any projection runs
///
/// # Errors
/// - an employee ID appears more than once
/// - an employee is born or joins after the valuation date
pub fn validate_census(
    employees: &[EmployeeRecord],
    assumptions: &Assumptions,
) -> Result<(), InputValidationError> {
    let valuation_date = assumptions.valuation_date();
    let mut seen = HashSet::with_capacity(employees.len());

    for employee in employees {
        if !seen.insert(employee.employee_id()) {
            return Err(InputValidationError::DuplicateEmployee(employee.employee_id().to_string()));
        }
        if employee.date_of_birth() > valuation_date {
            return Err(InputValidationError::employee(
                employee.employee_id(),
                "date_of_birth",
                format!("{} is after valuation date {}", employee.date_of_birth(), valuation_date),
            ));
        }
        if employee.date_of_joining() > valuation_date {
            return Err(InputValidationError::employee(
                employee.employee_id(),
                "date_of_joining",
                format!("{} is after valuation date {}", employee.date_of_joining(), valuation_date),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(id: &str, dob: NaiveDate, doj: NaiveDate) -> EmployeeRecord {
        EmployeeRecord::new(id, "Test", dob, doj, 50_000.0).unwrap()
    }

    #[test]
    fn test_whole_years_truncates() {
        // Birthday not yet reached in the valuation year
        assert_eq!(whole_years_between(date(1990, 1, 15), date(2024, 12, 31)), 34);
        assert_eq!(whole_years_between(date(1990, 12, 31), date(2024, 12, 30)), 33);
        // Birthday on the valuation date counts
        assert_eq!(whole_years_between(date(1990, 12, 31), date(2024, 12, 31)), 34);
        assert_eq!(whole_years_between(date(2025, 1, 1), date(2024, 12, 31)), -1);
    }

    #[test]
    fn test_leap_day_birthday() {
        // 29 Feb birthday is not reached on 28 Feb of a common year
        assert_eq!(whole_years_between(date(2000, 2, 29), date(2023, 2, 28)), 22);
        assert_eq!(whole_years_between(date(2000, 2, 29), date(2023, 3, 1)), 23);
    }

    #[test]
    fn test_age_and_service() {
        let record = employee("E1", date(1990, 1, 15), date(2015, 6, 1));
        let valuation = date(2024, 12, 31);

        assert_eq!(record.attained_age(valuation), 34);
        assert_eq!(record.years_of_service(valuation), 9);
        assert_eq!(record.years_of_service(date(2015, 1, 1)), 0);
    }

    #[test]
    fn test_new_trims_and_validates() {
        let record = EmployeeRecord::new(" E1 ", " Jane Doe ", date(1990, 1, 1), date(2010, 1, 1), 1.0).unwrap();
        assert_eq!(record.employee_id(), "E1");
        assert_eq!(record.name(), "Jane Doe");

        assert!(matches!(
            EmployeeRecord::new("  ", "x", date(1990, 1, 1), date(2010, 1, 1), 1.0),
            Err(InputValidationError::Employee { field: "employee_id", .. })
        ));
        assert!(matches!(
            EmployeeRecord::new("E2", "x", date(1990, 1, 1), date(2010, 1, 1), 0.0),
            Err(InputValidationError::Employee { field: "annual_salary", .. })
        ));
        assert!(matches!(
            EmployeeRecord::new("E3", "x", date(1990, 1, 1), date(2010, 1, 1), -5.0),
            Err(InputValidationError::Employee { field: "annual_salary", .. })
        ));
        assert!(matches!(
            EmployeeRecord::new("E4", "x", date(1990, 1, 1), date(1989, 1, 1), 1.0),
            Err(InputValidationError::Employee { field: "date_of_joining", .. })
        ));
    }

    #[test]
    fn test_validate_census() {
        let assumptions = Assumptions::default();
        let a = employee("A", date(1990, 1, 1), date(2010, 1, 1));
        let b = employee("B", date(1985, 1, 1), date(2012, 1, 1));

        assert!(validate_census(&[a.clone(), b], &assumptions).is_ok());
        assert!(matches!(
            validate_census(&[a.clone(), a], &assumptions),
            Err(InputValidationError::DuplicateEmployee(id)) if id == "A"
        ));

        let late_joiner = employee("C", date(1990, 1, 1), date(2025, 3, 1));
        assert!(matches!(
            validate_census(&[late_joiner], &assumptions),
            Err(InputValidationError::Employee { field: "date_of_joining", .. })
        ));
    }
}
