//! Load a valuation input file
//!
//! The input is a single CSV carrying, in any order:
//! - `key,value` assumption rows (`valuation_date`, `discount_rate`, `salary_increase_rate`, `retirement_age`)
//! - an optional employee header row starting with `emp_id`, `employee_id` or `id`
//! - employee rows `id,name,date_of_birth,date_of_joining,salary`
//!
//! Blank rows and single-cell section titles are ignored. Anything else that does not
//! parse is rejected with its line number.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{debug, info};

use super::{validate_census, EmployeeRecord};
use crate::assumptions::loader::{parse_date, AssumptionRows};
use crate::assumptions::Assumptions;
use crate::error::InputValidationError;

const EMPLOYEE_COLUMNS: usize = 5;
const HEADER_KEYS: [&str; 3] = ["emp_id", "employee_id", "id"];

/// Typed, validated contents of an input file
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationInput {
    pub assumptions: Assumptions,
    pub employees: Vec<EmployeeRecord>,
}

/// Load and validate an input file from disk
pub fn load_input<P: AsRef<Path>>(path: P) -> Result<ValuationInput, InputValidationError> {
    let file = File::open(path)?;
    load_input_from_reader(file)
}

/// Load and validate an input file from any reader (e.g., string buffer, uploaded bytes)
pub fn load_input_from_reader<R: Read>(reader: R) -> Result<ValuationInput, InputValidationError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut assumption_rows = AssumptionRows::new();
    let mut employees = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let cells: Vec<&str> = record.iter().collect();
        let non_empty = cells.iter().filter(|cell| !cell.is_empty()).count();
        if non_empty == 0 {
            continue;
        }

        if cells.len() >= 2 && assumption_rows.accept(cells[0], cells[1], line)? {
            continue;
        }

        if cells.len() >= EMPLOYEE_COLUMNS {
            if HEADER_KEYS.contains(&cells[0].to_ascii_lowercase().as_str()) {
                continue;
            }
            employees.push(parse_employee(&record, line)?);
            continue;
        }

        if non_empty == 1 {
            debug!("line {}: skipping section title `{}`", line, cells[0]);
            continue;
        }

        return Err(InputValidationError::Line {
            line,
            message: format!("unrecognised row with {} cells", cells.len()),
        });
    }

    let assumptions = assumption_rows.build()?;
    validate_census(&employees, &assumptions)?;

    info!(
        "loaded {} employees, valuation date {}",
        employees.len(),
        assumptions.valuation_date()
    );

    Ok(ValuationInput {
        assumptions,
        employees,
    })
}

/// Parse one `id,name,date_of_birth,date_of_joining,salary` row
fn parse_employee(record: &StringRecord, line: u64) -> Result<EmployeeRecord, InputValidationError> {
    let field = |index: usize| record.get(index).unwrap_or("");
    let invalid = |what: &str, value: &str| InputValidationError::Line {
        line,
        message: format!("invalid {} `{}`", what, value),
    };

    let date_of_birth = parse_date(field(2)).ok_or_else(|| invalid("date_of_birth", field(2)))?;
    let date_of_joining = parse_date(field(3)).ok_or_else(|| invalid("date_of_joining", field(3)))?;
    let annual_salary: f64 = field(4)
        .replace(',', "")
        .parse()
        .map_err(|_| invalid("salary", field(4)))?;

    EmployeeRecord::new(field(0), field(1), date_of_birth, date_of_joining, annual_salary)
}
