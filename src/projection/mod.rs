//! Projection engine for yearly employee projections

mod state;
mod engine;
mod cashflows;

pub use state::ProjectionState;
pub use engine::ProjectionEngine;
pub use cashflows::{ProjectionFailure, ProjectionRow, total_expected_death_outflow};
