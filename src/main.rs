//! EDO Valuation CLI
//!
//! Values an employee census file and writes the yearly projection and a run summary

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use edo_valuation::{
    assumptions::{load_mortality_table, loader::parse_date},
    employee::{load_input, ValuationInput},
    output::{write_projection_file, write_summary_json},
    Assumptions, InputValidationError, MortalityTable, RunResult, RunStatus, ValuationRunner,
};

/// Project yearly Expected Death Outflow for every employee in a census file
#[derive(Debug, Parser)]
#[command(name = "edo-valuation")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input CSV: assumption rows followed by employee rows
    #[arg(short, long)]
    input: PathBuf,

    /// Mortality table CSV (`age,qx[,px]`); defaults to the standard table
    #[arg(short, long)]
    mortality: Option<PathBuf>,

    /// Where to write the projection rows
    #[arg(short, long, default_value = "edo_output.csv")]
    output: PathBuf,

    /// Where to write the JSON run summary; printed to stdout when omitted
    #[arg(short, long)]
    summary: Option<PathBuf>,

    /// Value employees across all cores
    #[arg(long)]
    parallel: bool,

    /// Override the valuation date
    #[arg(long)]
    valuation_date: Option<String>,

    /// Override the annual discount rate
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Override the annual salary increase rate
    #[arg(long)]
    salary_increase_rate: Option<f64>,

    /// Override the retirement age
    #[arg(long)]
    retirement_age: Option<u32>,
}

impl Cli {
    /// Apply command-line overrides on top of the file's assumptions
    fn apply_overrides(&self, assumptions: Assumptions) -> Result<Assumptions, InputValidationError> {
        let mut assumptions = assumptions;
        if let Some(value) = &self.valuation_date {
            let date = parse_date(value).ok_or_else(|| InputValidationError::Assumption {
                field: "valuation_date",
                message: format!("cannot parse `{}`", value),
            })?;
            assumptions = assumptions.with_valuation_date(date)?;
        }
        if let Some(rate) = self.discount_rate {
            assumptions = assumptions.with_discount_rate(rate)?;
        }
        if let Some(rate) = self.salary_increase_rate {
            assumptions = assumptions.with_salary_increase_rate(rate)?;
        }
        if let Some(age) = self.retirement_age {
            assumptions = assumptions.with_retirement_age(age)?;
        }
        Ok(assumptions)
    }

    /// Build the run inputs; any failure here fails the whole run
    fn prepare(&self) -> Result<(ValuationInput, MortalityTable), InputValidationError> {
        let mortality = match &self.mortality {
            Some(path) => load_mortality_table(path)?,
            None => MortalityTable::standard(),
        };
        let mut input = load_input(&self.input)?;
        input.assumptions = self.apply_overrides(input.assumptions)?;
        Ok((input, mortality))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let (result, employees) = match cli.prepare() {
        Ok((input, mortality)) => {
            info!(
                "mortality table covers ages {}..={}",
                mortality.min_age(),
                mortality.max_age()
            );
            if !mortality.is_contiguous() {
                warn!(
                    "mortality table is sparse: {} ages between {} and {}, missing ages fail their employees",
                    mortality.len(),
                    mortality.min_age(),
                    mortality.max_age()
                );
            }
            let runner = ValuationRunner::new(input.assumptions, mortality);
            let result = if cli.parallel {
                runner.run_parallel(&input.employees)
            } else {
                runner.run(&input.employees)
            };
            (result, input.employees)
        }
        Err(err) => (RunResult::pre_run_failure(err.to_string()), Vec::new()),
    };

    if result.pre_run_error.is_none() {
        let written = write_projection_file(&cli.output, &result, &employees)
            .with_context(|| format!("writing {}", cli.output.display()))?;
        info!("wrote {} rows to {}", written, cli.output.display());
    }

    let summary = result.summary();
    match &cli.summary {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_summary_json(file, &summary)?;
        }
        None => write_summary_json(io::stdout().lock(), &summary)?,
    }

    for failure in &summary.failures {
        eprintln!("employee {} failed: {}", failure.employee_id, failure.reason);
    }

    match result.status {
        RunStatus::TotalFailure => {
            let reason = result
                .pre_run_error
                .unwrap_or_else(|| "every employee failed".to_string());
            anyhow::bail!("valuation failed: {}", reason)
        }
        RunStatus::PartialFailure | RunStatus::AllSucceeded => Ok(()),
    }
}
