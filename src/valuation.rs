//! Valuation runner: projects every employee of a census and collects the run result
//!
//! Employees are independent. A failure for one employee is recorded in its result and
//! processing continues with the next; only invalid inputs fail the run as a whole.

use std::io::Read;

use chrono::{DateTime, Utc};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::assumptions::{Assumptions, MortalityTable};
use crate::employee::{load_input_from_reader, validate_census, EmployeeRecord};
use crate::error::ProjectionError;
use crate::projection::{total_expected_death_outflow, ProjectionEngine, ProjectionRow};

/// Outcome of one employee's projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EmployeeOutcome {
    Success,
    Failed(ProjectionError),
}

/// Projection rows and outcome for one employee
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeResult {
    pub employee_id: String,
    /// Chronological rows; empty for failed employees
    pub rows: Vec<ProjectionRow>,
    pub outcome: EmployeeOutcome,
}

impl EmployeeResult {
    pub fn is_success(&self) -> bool {
        self.outcome == EmployeeOutcome::Success
    }

    /// Present value of expected death outflows for this employee
    pub fn total_expected_death_outflow(&self) -> f64 {
        total_expected_death_outflow(&self.rows)
    }
}

/// Overall status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No employee failed (including a census with no employees)
    AllSucceeded,
    /// Some employees failed, at least one succeeded
    PartialFailure,
    /// Every employee failed, or the run could not start
    TotalFailure,
}

/// Complete result of one valuation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// One entry per employee, in input order
    pub employees: Vec<EmployeeResult>,
    pub status: RunStatus,
    /// Basis the run was valued on; absent when the run could not start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<Assumptions>,
    /// Why the run could not start, for pre-run failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_run_error: Option<String>,
}

impl RunResult {
    /// Collect employee results valued on `assumptions` and derive the run status
    pub fn from_employees(assumptions: Assumptions, employees: Vec<EmployeeResult>) -> Self {
        let failed = employees.iter().filter(|e| !e.is_success()).count();
        let status = if failed == 0 {
            RunStatus::AllSucceeded
        } else if failed < employees.len() {
            RunStatus::PartialFailure
        } else {
            RunStatus::TotalFailure
        };

        Self {
            employees,
            status,
            assumptions: Some(assumptions),
            pre_run_error: None,
        }
    }

    /// A run that failed before any projection started
    pub fn pre_run_failure(reason: impl Into<String>) -> Self {
        Self {
            employees: Vec::new(),
            status: RunStatus::TotalFailure,
            assumptions: None,
            pre_run_error: Some(reason.into()),
        }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &EmployeeResult> {
        self.employees.iter().filter(|e| e.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &EmployeeResult> {
        self.employees.iter().filter(|e| !e.is_success())
    }

    /// Total number of projection rows across successful employees
    pub fn row_count(&self) -> usize {
        self.employees.iter().map(|e| e.rows.len()).sum()
    }

    /// Execution record for the run history
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            generated_at: Utc::now(),
            status: self.status,
            assumptions: self.assumptions.clone(),
            input_rows: self.employees.len(),
            output_rows: self.row_count(),
            total_expected_death_outflow: self
                .succeeded()
                .map(EmployeeResult::total_expected_death_outflow)
                .sum(),
            failures: self
                .failed()
                .filter_map(|e| match &e.outcome {
                    EmployeeOutcome::Failed(error) => Some(EmployeeFailure {
                        employee_id: e.employee_id.clone(),
                        reason: error.to_string(),
                    }),
                    EmployeeOutcome::Success => None,
                })
                .collect(),
            pre_run_error: self.pre_run_error.clone(),
        }
    }
}

/// Failure reason recorded against an employee
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeFailure {
    pub employee_id: String,
    pub reason: String,
}

/// Summary statistics of a run, as persisted by the execution history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<Assumptions>,
    /// Employees valued
    pub input_rows: usize,
    /// Projection rows produced
    pub output_rows: usize,
    pub total_expected_death_outflow: f64,
    pub failures: Vec<EmployeeFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_run_error: Option<String>,
}

/// Runs the projection engine over a census
///
/// # Example
/// ```ignore
/// let runner = ValuationRunner::new(assumptions, MortalityTable::standard());
/// let result = runner.run(&employees);
/// ```
#[derive(Debug, Clone)]
pub struct ValuationRunner {
    engine: ProjectionEngine,
}

impl ValuationRunner {
    /// Create runner for one valuation basis
    pub fn new(assumptions: Assumptions, mortality: MortalityTable) -> Self {
        Self {
            engine: ProjectionEngine::new(assumptions, mortality),
        }
    }

    pub fn assumptions(&self) -> &Assumptions {
        self.engine.assumptions()
    }

    /// Value every employee in input order
    pub fn run(&self, employees: &[EmployeeRecord]) -> RunResult {
        if let Err(err) = validate_census(employees, self.engine.assumptions()) {
            warn!("valuation run rejected: {}", err);
            return RunResult::pre_run_failure(err.to_string());
        }

        info!("valuing {} employees", employees.len());
        let results = employees.iter().map(|e| self.value_employee(e)).collect();
        self.finish(results)
    }

    /// Value employees across the rayon pool; output is identical to [`Self::run`]
    pub fn run_parallel(&self, employees: &[EmployeeRecord]) -> RunResult {
        if let Err(err) = validate_census(employees, self.engine.assumptions()) {
            warn!("valuation run rejected: {}", err);
            return RunResult::pre_run_failure(err.to_string());
        }

        info!("valuing {} employees in parallel", employees.len());
        let results = employees.par_iter().map(|e| self.value_employee(e)).collect();
        self.finish(results)
    }

    fn value_employee(&self, employee: &EmployeeRecord) -> EmployeeResult {
        match self.engine.project_employee(employee) {
            Ok(rows) => EmployeeResult {
                employee_id: employee.employee_id().to_string(),
                rows,
                outcome: EmployeeOutcome::Success,
            },
            Err(failure) => {
                warn!(
                    "employee {} failed after {} rows, discarding them: {}",
                    employee.employee_id(),
                    failure.partial_rows.len(),
                    failure.error
                );
                EmployeeResult {
                    employee_id: employee.employee_id().to_string(),
                    rows: Vec::new(),
                    outcome: EmployeeOutcome::Failed(failure.error),
                }
            }
        }
    }

    fn finish(&self, results: Vec<EmployeeResult>) -> RunResult {
        let result = RunResult::from_employees(self.assumptions().clone(), results);
        info!(
            "valuation finished: {:?}, {} rows, {} failed",
            result.status,
            result.row_count(),
            result.failed().count()
        );
        result
    }
}

/// Parse a combined input file and value it on the given mortality table
///
/// Invalid input becomes a [`RunStatus::TotalFailure`] result. The parsed census is
/// returned alongside so that output can be joined with employee details.
pub fn run_from_reader<R: Read>(reader: R, mortality: &MortalityTable) -> (RunResult, Vec<EmployeeRecord>) {
    match load_input_from_reader(reader) {
        Ok(input) => {
            let runner = ValuationRunner::new(input.assumptions, mortality.clone());
            (runner.run(&input.employees), input.employees)
        }
        Err(err) => {
            warn!("input rejected: {}", err);
            (RunResult::pre_run_failure(err.to_string()), Vec::new())
        }
    }
}
