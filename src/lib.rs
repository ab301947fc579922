//! Country carbon budget calculator.
//!
//! Re-exports [`carbon_budget_core`] and, with the `python` feature, provides
//! the `carbon_budget` Python extension module used by the dashboard.

pub use carbon_budget_core::*;

#[cfg(feature = "python")]
pub mod python;
