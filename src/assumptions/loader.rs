//! CSV-based assumption loading
//!
//! Covers the two assumption inputs of a run:
//! - mortality tables stored as `age,qx[,px]` CSV files
//! - `key,value` assumption rows at the top of a combined input file

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;

use super::{Assumptions, MortalityTable};
use crate::error::InputValidationError;

/// Date layouts accepted in input files, tried in order
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a date in any of the accepted layouts; the first layout that matches wins
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

/// Raw CSV row of a mortality table file
#[derive(Debug, serde::Deserialize)]
struct MortalityRow {
    #[serde(alias = "Age", alias = "AGE")]
    age: u32,
    #[serde(alias = "Qx", alias = "QX")]
    qx: f64,
    /// Survival column of the workbook table; px is always derived from qx
    #[serde(default, rename = "px", alias = "Px", alias = "PX")]
    _px: Option<f64>,
}

/// Load a mortality table from a CSV file with an `age,qx[,px]` header
pub fn load_mortality_table<P: AsRef<Path>>(path: P) -> Result<MortalityTable, InputValidationError> {
    let file = File::open(path)?;
    load_mortality_table_from_reader(file)
}

/// Load a mortality table from any reader (e.g., string buffer, uploaded bytes)
pub fn load_mortality_table_from_reader<R: Read>(reader: R) -> Result<MortalityTable, InputValidationError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rates = Vec::new();
    for result in csv_reader.deserialize() {
        let row: MortalityRow = result?;
        rates.push((row.age, row.qx));
    }

    MortalityTable::new(rates)
}

/// Collects `key,value` assumption rows and turns them into [`Assumptions`]
///
/// A file that carries no assumption rows at all is valued on the defaults.
/// Once any assumption row is present, all four must be.
#[derive(Debug, Default, Clone)]
pub struct AssumptionRows {
    valuation_date: Option<NaiveDate>,
    discount_rate: Option<f64>,
    salary_increase_rate: Option<f64>,
    retirement_age: Option<u32>,
    seen: bool,
}

impl AssumptionRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one assumption row; returns `Ok(false)` when `key` is not an assumption
    pub fn accept(&mut self, key: &str, value: &str, line: u64) -> Result<bool, InputValidationError> {
        let value = value.trim();
        let invalid = |what: &str| InputValidationError::Line {
            line,
            message: format!("invalid {} `{}`", what, value),
        };

        match key.trim().to_ascii_lowercase().as_str() {
            "valuation_date" => {
                self.valuation_date = Some(parse_date(value).ok_or_else(|| invalid("valuation_date"))?);
            }
            "discount_rate" => {
                self.discount_rate = Some(value.parse().map_err(|_| invalid("discount_rate"))?);
            }
            "salary_increase_rate" => {
                self.salary_increase_rate =
                    Some(value.parse().map_err(|_| invalid("salary_increase_rate"))?);
            }
            "retirement_age" => {
                self.retirement_age = Some(value.parse().map_err(|_| invalid("retirement_age"))?);
            }
            _ => return Ok(false),
        }

        self.seen = true;
        Ok(true)
    }

    /// Build validated assumptions, falling back to defaults only when no rows were seen
    pub fn build(self) -> Result<Assumptions, InputValidationError> {
        if !self.seen {
            warn!("input carries no assumption rows, valuing on default assumptions");
            return Ok(Assumptions::default());
        }

        let missing = |field: &'static str| InputValidationError::assumption(field, "missing from input");

        Assumptions::new(
            self.valuation_date.ok_or_else(|| missing("valuation_date"))?,
            self.discount_rate.ok_or_else(|| missing("discount_rate"))?,
            self.salary_increase_rate.ok_or_else(|| missing("salary_increase_rate"))?,
            self.retirement_age.ok_or_else(|| missing("retirement_age"))?,
        )
    }
}
