//! Valuation assumptions and mortality

mod mortality;
pub mod loader;

pub use mortality::MortalityTable;
pub use loader::{load_mortality_table, load_mortality_table_from_reader};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::InputValidationError;

/// Default valuation date of the EDO workbook
pub const DEFAULT_VALUATION_DATE: (i32, u32, u32) = (2024, 12, 31);
/// Default annual discount rate
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.0545;
/// Default annual salary escalation
pub const DEFAULT_SALARY_INCREASE_RATE: f64 = 0.05;
/// Default normal retirement age
pub const DEFAULT_RETIREMENT_AGE: u32 = 60;
/// Highest retirement age a basis may carry
pub const MAX_RETIREMENT_AGE: u32 = 150;

/// Economic and demographic basis for one valuation run
///
/// Fields are private so that every instance has passed [`Assumptions::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assumptions {
    valuation_date: NaiveDate,
    discount_rate: f64,
    salary_increase_rate: f64,
    retirement_age: u32,
}

impl Assumptions {
    /// Validate and build an assumption set
    ///
    /// # Errors
    /// - discount rate negative or not finite
    /// - salary increase rate negative or not finite
    /// - retirement age of zero or above [`MAX_RETIREMENT_AGE`]
    pub fn new(
        valuation_date: NaiveDate,
        discount_rate: f64,
        salary_increase_rate: f64,
        retirement_age: u32,
    ) -> Result<Self, InputValidationError> {
        if !discount_rate.is_finite() || discount_rate < 0.0 {
            return Err(InputValidationError::assumption(
                "discount_rate",
                format!("{} must be a non-negative fraction", discount_rate),
            ));
        }
        if !salary_increase_rate.is_finite() || salary_increase_rate < 0.0 {
            return Err(InputValidationError::assumption(
                "salary_increase_rate",
                format!("{} must be a non-negative fraction", salary_increase_rate),
            ));
        }
        if retirement_age == 0 || retirement_age > MAX_RETIREMENT_AGE {
            return Err(InputValidationError::assumption(
                "retirement_age",
                format!("{} must be between 1 and {} years", retirement_age, MAX_RETIREMENT_AGE),
            ));
        }

        Ok(Self {
            valuation_date,
            discount_rate,
            salary_increase_rate,
            retirement_age,
        })
    }

    /// Date from which ages, service and discounting are measured
    pub fn valuation_date(&self) -> NaiveDate {
        self.valuation_date
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    pub fn salary_increase_rate(&self) -> f64 {
        self.salary_increase_rate
    }

    pub fn retirement_age(&self) -> u32 {
        self.retirement_age
    }

    /// Copy with a different valuation date, re-validated
    pub fn with_valuation_date(&self, valuation_date: NaiveDate) -> Result<Self, InputValidationError> {
        Self::new(valuation_date, self.discount_rate, self.salary_increase_rate, self.retirement_age)
    }

    /// Copy with a different discount rate, re-validated
    pub fn with_discount_rate(&self, discount_rate: f64) -> Result<Self, InputValidationError> {
        Self::new(self.valuation_date, discount_rate, self.salary_increase_rate, self.retirement_age)
    }

    /// Copy with a different salary increase rate, re-validated
    pub fn with_salary_increase_rate(&self, salary_increase_rate: f64) -> Result<Self, InputValidationError> {
        Self::new(self.valuation_date, self.discount_rate, salary_increase_rate, self.retirement_age)
    }

    /// Copy with a different retirement age, re-validated
    pub fn with_retirement_age(&self, retirement_age: u32) -> Result<Self, InputValidationError> {
        Self::new(self.valuation_date, self.discount_rate, self.salary_increase_rate, retirement_age)
    }
}

impl Default for Assumptions {
    /// Workbook defaults: 31 Dec 2024, 5.45% discount, 5% salary escalation, retirement at 60
    fn default() -> Self {
        let (year, month, day) = DEFAULT_VALUATION_DATE;
        Self {
            valuation_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
            discount_rate: DEFAULT_DISCOUNT_RATE,
            salary_increase_rate: DEFAULT_SALARY_INCREASE_RATE,
            retirement_age: DEFAULT_RETIREMENT_AGE,
        }
    }
}
