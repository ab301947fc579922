//! Global parameters
//!
//! Domain constants shared by every calculation. They are fixed for the
//! lifetime of a [`crate::BudgetCalculator`] and can be overridden from a TOML
//! file; keys that are not present keep their defaults.

use crate::errors::{BudgetError, BudgetResult};
use crate::{FloatValue, Year};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Conversion from kilotonnes to megatonnes.
pub const KT_PER_MT: FloatValue = 1000.0;

/// Conversion from megatonnes to tonnes.
pub const TONNES_PER_MT: FloatValue = 1_000_000.0;

const CARRY_FORWARD_TOLERANCE: FloatValue = 1e-9;

/// Parameters of the equal per-capita allocation and the emissions projection.
///
/// The global budget entered by the user starts on 1 January of the year after
/// `baseline_year`. The allocation between countries happens at the start of
/// `allocation_year`, when the world emitted `global_annual_emissions` in
/// total and `global_per_capita_emissions` per person. The carry-forward must
/// cover the years in between at that rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalParameters {
    /// Emissions between the allocation year and the budget reference year
    /// that are added back to the user budget (Gt CO2).
    ///
    /// Must equal `(budget_reference_year() - allocation_year) * global_annual_emissions`.
    ///
    /// Default: 80.0 Gt (two years at 40 Gt/yr)
    pub baseline_budget_carry_forward: FloatValue,

    /// Global annual emissions at the allocation year (Gt CO2/yr).
    ///
    /// Default: 40.0 Gt/yr
    pub global_annual_emissions: FloatValue,

    /// Global per-capita emissions at the allocation year (t CO2/yr).
    ///
    /// Default: 5.4 t/yr
    pub global_per_capita_emissions: FloatValue,

    /// Year at which the global budget is shared between countries.
    ///
    /// Default: 2016
    pub allocation_year: Year,

    /// First year column required in the emissions table.
    ///
    /// Default: 1970
    pub first_historical_year: Year,

    /// Last year with observed emissions, used as the projection baseline.
    ///
    /// Default: 2017
    pub baseline_year: Year,

    /// Number of years after the baseline for which emissions are assumed to
    /// stay at the baseline value.
    ///
    /// Default: 2 (2018 and 2019)
    pub assumed_constant_years: u32,

    /// Smallest accepted global budget (Gt CO2).
    ///
    /// Default: 50.0
    pub min_global_budget: FloatValue,

    /// Largest accepted global budget (Gt CO2).
    ///
    /// Default: 2500.0
    pub max_global_budget: FloatValue,

    /// Upper bound on the number of projected years.
    ///
    /// Default: 1000
    pub max_projection_years: u32,

    /// Country selected when the presentation layer starts.
    ///
    /// Default: "Belgium"
    pub default_country: String,

    /// Global budget shown when the presentation layer starts (Gt CO2).
    ///
    /// 580 Gt gives a 50% chance of staying below 1.5 °C (IPCC SR1.5, table 2.2).
    ///
    /// Default: 580.0
    pub default_global_budget: FloatValue,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            baseline_budget_carry_forward: 80.0,
            global_annual_emissions: 40.0,
            global_per_capita_emissions: 5.4,
            allocation_year: 2016,
            first_historical_year: 1970,
            baseline_year: 2017,
            assumed_constant_years: 2,
            min_global_budget: 50.0,
            max_global_budget: 2500.0,
            max_projection_years: 1000,
            default_country: "Belgium".to_string(),
            default_global_budget: 580.0,
        }
    }
}

impl GlobalParameters {
    /// Parse parameters from a TOML document and validate them.
    pub fn from_toml_str(source: &str) -> BudgetResult<Self> {
        let parameters: Self =
            toml::from_str(source).map_err(|e| BudgetError::Config(e.to_string()))?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Read parameters from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> BudgetResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| BudgetError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Check that the parameters describe a usable configuration.
    pub fn validate(&self) -> BudgetResult<()> {
        let positive = [
            ("global_annual_emissions", self.global_annual_emissions),
            ("global_per_capita_emissions", self.global_per_capita_emissions),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(BudgetError::Config(format!(
                    "{name} must be finite and strictly positive, got {value}"
                )));
            }
        }
        if !(self.baseline_budget_carry_forward.is_finite()
            && self.baseline_budget_carry_forward >= 0.0)
        {
            return Err(BudgetError::Config(format!(
                "baseline_budget_carry_forward must be finite and non-negative, got {}",
                self.baseline_budget_carry_forward
            )));
        }
        if self.allocation_year > self.baseline_year {
            return Err(BudgetError::Config(format!(
                "allocation_year ({}) is after baseline_year ({})",
                self.allocation_year, self.baseline_year
            )));
        }
        let expected_carry_forward = FloatValue::from(
            self.budget_reference_year() - self.allocation_year,
        ) * self.global_annual_emissions;
        if (self.baseline_budget_carry_forward - expected_carry_forward).abs()
            > CARRY_FORWARD_TOLERANCE * expected_carry_forward.max(1.0)
        {
            return Err(BudgetError::Config(format!(
                "baseline_budget_carry_forward {} does not match {} years at {} Gt/yr ({})",
                self.baseline_budget_carry_forward,
                self.budget_reference_year() - self.allocation_year,
                self.global_annual_emissions,
                expected_carry_forward
            )));
        }
        if self.first_historical_year > self.baseline_year {
            return Err(BudgetError::Config(format!(
                "first_historical_year ({}) is after baseline_year ({})",
                self.first_historical_year, self.baseline_year
            )));
        }
        if !(self.min_global_budget.is_finite()
            && self.max_global_budget.is_finite()
            && self.min_global_budget <= self.max_global_budget)
        {
            return Err(BudgetError::Config(format!(
                "global budget range [{}, {}] is empty",
                self.min_global_budget, self.max_global_budget
            )));
        }
        if !self.budget_range().contains(&self.default_global_budget) {
            return Err(BudgetError::Config(format!(
                "default_global_budget {} is outside [{}, {}]",
                self.default_global_budget, self.min_global_budget, self.max_global_budget
            )));
        }
        if self.max_projection_years == 0 {
            return Err(BudgetError::Config(
                "max_projection_years must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Year columns that every emissions table must provide.
    pub fn historical_years(&self) -> RangeInclusive<Year> {
        self.first_historical_year..=self.baseline_year
    }

    /// Accepted range of the global budget (Gt CO2).
    pub fn budget_range(&self) -> RangeInclusive<FloatValue> {
        self.min_global_budget..=self.max_global_budget
    }

    /// Year from which the user supplied global budget is counted (2018 by default).
    pub fn budget_reference_year(&self) -> Year {
        self.baseline_year + 1
    }

    /// First year covered by the remaining national budget (2020 by default).
    pub fn projection_start_year(&self) -> Year {
        self.baseline_year + self.assumed_constant_years as Year + 1
    }
}
