//! Core calculations for the country carbon budget calculator.
//!
//! A global carbon budget is shared between countries on an equal per-capita
//! basis ([`allocator`]), the resulting national budget is spread over a
//! linearly declining emissions pathway ([`projector`]) and both are
//! summarised for display ([`reporter`]).
//! [`calculator::BudgetCalculator`] ties these together on top of an
//! [`table::EmissionsTable`] loaded once at startup.

pub mod allocator;
pub mod calculator;
pub mod errors;
pub mod parameters;
pub mod projector;
pub mod reporter;
pub mod table;

/// Floating point type used for all emissions, budgets and populations.
pub type FloatValue = f64;

/// Calendar year.
pub type Year = i32;

/// A single point of a yearly series.
pub type YearValue = (Year, FloatValue);

pub use calculator::BudgetCalculator;
pub use errors::{BudgetError, BudgetResult};
pub use parameters::GlobalParameters;
