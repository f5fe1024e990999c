//! Domain types for portfolio analysis.

pub mod holding;
pub mod portfolio;

pub use holding::Holding;
pub use portfolio::{HoldingWeight, Portfolio, PortfolioError, PortfolioSummary};
