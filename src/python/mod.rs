//! Python bindings
//!
//! Exposes the calculator to the Python dashboard:
//!
//!     from carbon_budget import BudgetCalculator
//!
//!     calculator = BudgetCalculator("data.csv")
//!     report = calculator.compute("Belgium", 580)
//!     report.global_reach_years_2016  # 16.5

use carbon_budget_core::reporter::{BudgetReport, CountryEstimate};
use carbon_budget_core::{BudgetCalculator, BudgetError, FloatValue, GlobalParameters, YearValue};
use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;
use std::path::PathBuf;

fn to_py_err(error: BudgetError) -> PyErr {
    match error {
        BudgetError::UnknownCountry(_) => PyKeyError::new_err(error.to_string()),
        _ => PyValueError::new_err(error.to_string()),
    }
}

/// Country carbon budget calculator backed by an emissions table.
///
/// Example:
///     calculator = BudgetCalculator("data.csv", config="parameters.toml")
#[pyclass(frozen)]
#[pyo3(name = "BudgetCalculator")]
pub struct PyBudgetCalculator(BudgetCalculator);

#[pymethods]
impl PyBudgetCalculator {
    #[new]
    #[pyo3(signature = (path, config=None))]
    fn new(path: PathBuf, config: Option<PathBuf>) -> PyResult<Self> {
        let parameters = match config {
            Some(config) => GlobalParameters::from_toml_file(config).map_err(to_py_err)?,
            None => GlobalParameters::default(),
        };
        let calculator = BudgetCalculator::from_path(path, parameters).map_err(to_py_err)?;
        Ok(Self(calculator))
    }

    /// Country names in source order
    fn list_countries(&self) -> Vec<String> {
        self.0
            .list_countries()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn default_country(&self) -> Option<String> {
        self.0.default_country().map(str::to_string)
    }

    /// Default global budget from 2018 (Gt CO2)
    fn default_budget(&self) -> FloatValue {
        self.0.parameters().default_global_budget
    }

    /// Historical emissions as a list of (year, Mt CO2)
    fn historical_series(&self, country: &str) -> PyResult<Vec<YearValue>> {
        self.0.historical_series(country).map_err(to_py_err)
    }

    /// Compute the report for a country and a global budget from 2018 (Gt CO2)
    ///
    /// Raises KeyError for unknown countries and ValueError for budgets out of range.
    fn compute(&self, country: &str, budget: FloatValue) -> PyResult<PyBudgetReport> {
        self.0
            .compute(country, budget)
            .map(PyBudgetReport)
            .map_err(to_py_err)
    }
}

/// Result of `BudgetCalculator.compute`
///
/// Country figures are None when no estimate is possible; `undefined_reason`
/// and `messages` explain why.
#[pyclass(frozen)]
#[pyo3(name = "BudgetReport")]
pub struct PyBudgetReport(BudgetReport);

impl PyBudgetReport {
    fn estimate_value(&self, f: impl Fn(&CountryEstimate) -> FloatValue) -> Option<FloatValue> {
        self.0.estimate().map(f)
    }
}

#[pymethods]
impl PyBudgetReport {
    #[getter]
    fn country(&self) -> String {
        self.0.country.clone()
    }

    #[getter]
    fn global_budget_2018(&self) -> FloatValue {
        self.0.global_budget_2018
    }

    #[getter]
    fn global_reach_years_2016(&self) -> FloatValue {
        self.0.global_reach_years_2016
    }

    #[getter]
    fn global_reach_years_2020(&self) -> FloatValue {
        self.0.global_reach_years_2020
    }

    #[getter]
    fn country_budget_2016_mt(&self) -> Option<FloatValue> {
        self.estimate_value(|e| e.country_budget_2016_mt)
    }

    #[getter]
    fn country_budget_2020_mt(&self) -> Option<FloatValue> {
        self.estimate_value(|e| e.country_budget_2020_mt)
    }

    #[getter]
    fn years_constant(&self) -> Option<FloatValue> {
        self.estimate_value(|e| e.years_constant)
    }

    #[getter]
    fn years_linear(&self) -> Option<FloatValue> {
        self.estimate_value(|e| e.years_linear)
    }

    #[getter]
    fn depletion_year(&self) -> Option<i32> {
        self.0.estimate().map(|e| e.depletion_year)
    }

    #[getter]
    fn future_series(&self) -> Vec<YearValue> {
        self.0
            .estimate()
            .map(|e| e.future_series.clone())
            .unwrap_or_default()
    }

    /// None when the population is zero
    #[getter]
    fn future_series_personal(&self) -> Option<Vec<YearValue>> {
        self.0
            .estimate()
            .and_then(|e| e.future_series_personal.clone())
    }

    #[getter]
    fn undefined_reason(&self) -> Option<&'static str> {
        self.0.undefined_reason().map(|reason| reason.as_str())
    }

    #[getter]
    fn messages(&self) -> Vec<String> {
        self.0.messages()
    }

    fn __repr__(&self) -> String {
        format!(
            "BudgetReport(country={:?}, global_budget_2018={})",
            self.0.country, self.0.global_budget_2018
        )
    }
}

#[pymodule]
pub fn carbon_budget(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<PyBudgetCalculator>()?;
    m.add_class::<PyBudgetReport>()?;
    Ok(())
}
