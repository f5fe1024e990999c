//! Monte Carlo simulation: return generator → single-trial compounding →
//! parallel orchestration.

pub mod generator;
pub mod orchestrator;
pub mod path;

pub use generator::ReturnGenerator;
pub use orchestrator::{MonteCarlo, TrialOutcomes};
pub use path::{simulate_path, simulate_trial};
