//! Mortality assumptions keyed by attained age
//!
//! The table maps an integer age to qx, the probability of death within the year.
//! Ages may be contiguous or sparse. A lookup for an age the table does not carry
//! is an error; the projection never substitutes a default rate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{InputValidationError, ProjectionError};

/// Annual mortality rates by attained age
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MortalityTable {
    /// qx by attained age
    rates: BTreeMap<u32, f64>,
}

impl MortalityTable {
    /// Build a table from (age, qx) pairs
    ///
    /// Rejects an empty table and any rate that is not a probability.
    pub fn new<I>(rates: I) -> Result<Self, InputValidationError>
    where
        I: IntoIterator<Item = (u32, f64)>,
    {
        let mut table = BTreeMap::new();
        for (age, qx) in rates {
            if !qx.is_finite() || !(0.0..=1.0).contains(&qx) {
                return Err(InputValidationError::MortalityTable(format!(
                    "qx {} at age {} is not in [0, 1]",
                    qx, age
                )));
            }
            if table.insert(age, qx).is_some() {
                return Err(InputValidationError::MortalityTable(format!(
                    "age {} appears more than once",
                    age
                )));
            }
        }

        if table.is_empty() {
            return Err(InputValidationError::MortalityTable(
                "table has no rates".to_string(),
            ));
        }

        Ok(Self { rates: table })
    }

    /// Build a contiguous table where `rates[i]` applies to age `start_age + i`
    pub fn from_qx_by_age(start_age: u32, rates: &[f64]) -> Result<Self, InputValidationError> {
        Self::new((start_age..).zip(rates.iter().copied()))
    }

    /// Default probability table used by the EDO workbook (ages 20-73)
    ///
    /// Rates step up in roughly five-year bands to age 59 and are nil from 60 onwards.
    pub fn standard() -> Self {
        const STANDARD_QX: [(u32, f64); 54] = [
            (20, 0.001152), (21, 0.001152), (22, 0.001152), (23, 0.001152), (24, 0.001152),
            (25, 0.001413), (26, 0.001491), (27, 0.001491), (28, 0.001491), (29, 0.001492),
            (30, 0.001492), (31, 0.001492), (32, 0.001491), (33, 0.001492), (34, 0.001492),
            (35, 0.002290), (36, 0.002290), (37, 0.002290), (38, 0.002290), (39, 0.002290),
            (40, 0.003211), (41, 0.003211), (42, 0.003211), (43, 0.003211), (44, 0.003211),
            (45, 0.004627), (46, 0.004748), (47, 0.004748), (48, 0.004748), (49, 0.004748),
            (50, 0.007059), (51, 0.007059), (52, 0.007059), (53, 0.007059), (54, 0.007059),
            (55, 0.010286), (56, 0.010286), (57, 0.010286), (58, 0.010286), (59, 0.010286),
            (60, 0.0), (61, 0.0), (62, 0.0), (63, 0.0), (64, 0.0),
            (65, 0.0), (66, 0.0), (67, 0.0), (68, 0.0), (69, 0.0),
            (70, 0.0), (71, 0.0), (72, 0.0), (73, 0.0),
        ];

        Self {
            rates: STANDARD_QX.into_iter().collect(),
        }
    }

    /// Probability of death within the year for the given attained age
    pub fn lookup(&self, age: u32) -> Result<f64, ProjectionError> {
        self.rates
            .get(&age)
            .copied()
            .ok_or_else(|| ProjectionError::AgeOutOfRange {
                age,
                min_age: self.min_age(),
                max_age: self.max_age(),
            })
    }

    /// Probability of surviving the year (px = 1 - qx)
    pub fn survival(&self, age: u32) -> Result<f64, ProjectionError> {
        self.lookup(age).map(|qx| 1.0 - qx)
    }

    /// Youngest age carried by the table
    pub fn min_age(&self) -> u32 {
        self.rates.keys().next().copied().unwrap_or(0)
    }

    /// Oldest age carried by the table
    pub fn max_age(&self) -> u32 {
        self.rates.keys().next_back().copied().unwrap_or(0)
    }

    /// Number of ages carried
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Whether every age between the bounds is present
    pub fn is_contiguous(&self) -> bool {
        (self.max_age() - self.min_age()) as usize + 1 == self.rates.len()
    }
}

impl Default for MortalityTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_bounds() {
        let table = MortalityTable::standard();

        assert_eq!(table.min_age(), 20);
        assert_eq!(table.max_age(), 73);
        assert_eq!(table.len(), 54);
        assert!(table.is_contiguous());

        assert_eq!(table.lookup(34), Ok(0.001492));
        assert_eq!(table.lookup(59), Ok(0.010286));
        assert_eq!(table.lookup(60), Ok(0.0));
    }

    #[test]
    fn test_lookup_outside_table_fails() {
        let table = MortalityTable::standard();

        assert_eq!(
            table.lookup(19),
            Err(ProjectionError::AgeOutOfRange { age: 19, min_age: 20, max_age: 73 })
        );
        assert!(table.lookup(74).is_err());
    }

    #[test]
    fn test_sparse_table_gap_is_an_error() {
        let table = MortalityTable::new([(30, 0.01), (40, 0.02)]).unwrap();

        assert!(!table.is_contiguous());
        assert_eq!(table.lookup(40), Ok(0.02));
        assert!(matches!(
            table.lookup(35),
            Err(ProjectionError::AgeOutOfRange { age: 35, min_age: 30, max_age: 40 })
        ));
    }

    #[test]
    fn test_survival_complements_qx() {
        let table = MortalityTable::from_qx_by_age(50, &[0.25, 0.5]).unwrap();

        assert_eq!(table.survival(50), Ok(0.75));
        assert_eq!(table.survival(51), Ok(0.5));
    }

    #[test]
    fn test_invalid_tables_rejected() {
        assert!(MortalityTable::new(Vec::<(u32, f64)>::new()).is_err());
        assert!(MortalityTable::new([(30, 1.5)]).is_err());
        assert!(MortalityTable::new([(30, -0.1)]).is_err());
        assert!(MortalityTable::new([(30, f64::NAN)]).is_err());
        assert!(MortalityTable::new([(30, 0.1), (30, 0.2)]).is_err());
    }
}
