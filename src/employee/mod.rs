//! Employee census records and input loading

mod data;
pub mod loader;

pub use data::{EmployeeRecord, validate_census, whole_years_between};
pub use loader::{load_input, load_input_from_reader, ValuationInput};
