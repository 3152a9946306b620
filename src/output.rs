//! Tabular output of a valuation run
//!
//! One CSV row per projection year, joined with the employee's identification.
//! Failed employees contribute no rows; their reasons live in the run summary.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::employee::EmployeeRecord;
use crate::valuation::{RunResult, RunSummary};

/// Output CSV row
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    employee_id: &'a str,
    name: &'a str,
    calendar_year: i32,
    attained_age: u32,
    years_of_service: u32,
    projected_salary: f64,
    discount_factor: f64,
    survival_probability: f64,
    death_probability: f64,
    expected_death_outflow: f64,
}

/// Write all projection rows of a run as CSV; returns the number of rows written
pub fn write_projection_csv<W: Write>(
    writer: W,
    result: &RunResult,
    employees: &[EmployeeRecord],
) -> Result<usize, csv::Error> {
    let names: HashMap<&str, &str> = employees
        .iter()
        .map(|e| (e.employee_id(), e.name()))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut written = 0;

    for employee in result.succeeded() {
        let name = names.get(employee.employee_id.as_str()).copied().unwrap_or("");
        for row in &employee.rows {
            csv_writer.serialize(OutputRow {
                employee_id: &employee.employee_id,
                name,
                calendar_year: row.calendar_year,
                attained_age: row.attained_age,
                years_of_service: row.years_of_service,
                projected_salary: row.projected_salary,
                discount_factor: row.discount_factor,
                survival_probability: row.survival_probability,
                death_probability: row.death_probability,
                expected_death_outflow: row.expected_death_outflow,
            })?;
            written += 1;
        }
    }

    csv_writer.flush()?;
    Ok(written)
}

/// Write projection rows to a CSV file
pub fn write_projection_file<P: AsRef<Path>>(
    path: P,
    result: &RunResult,
    employees: &[EmployeeRecord],
) -> Result<usize, csv::Error> {
    let file = File::create(path)?;
    write_projection_csv(file, result, employees)
}

/// Write the run summary as pretty-printed JSON
pub fn write_summary_json<W: Write>(mut writer: W, summary: &RunSummary) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)
}
