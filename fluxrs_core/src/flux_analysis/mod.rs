//! Methods for analyzing and simulating metabolic models
pub mod cycle_free;
pub mod simulation;
pub mod transaction;

pub use cycle_free::cycle_free_flux;
pub use simulation::{fba, lmoma, moma, pfba, room, SimulationError};
pub use transaction::Transaction;
