use crate::FloatValue;
use thiserror::Error;

/// Error type for budget calculations and data loading.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BudgetError {
    #[error("Could not load emissions table ({context}): {reason}")]
    DataLoad { context: String, reason: String },
    #[error("Unknown country '{0}'")]
    UnknownCountry(String),
    #[error("Division by zero: {0}")]
    DivisionByZero(String),
    #[error("Invalid budget input: {0}")]
    InvalidBudgetInput(String),
    #[error("Projection needs {years} years which exceeds the limit of {limit} years")]
    ProjectionHorizon { years: FloatValue, limit: u32 },
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BudgetError {
    pub(crate) fn data_load(context: impl Into<String>, reason: impl Into<String>) -> Self {
        BudgetError::DataLoad {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type for `Result<T, BudgetError>`.
pub type BudgetResult<T> = Result<T, BudgetError>;
