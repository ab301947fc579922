//! Equal per-capita allocation of the global carbon budget
//!
//! The global budget counted from the budget reference year (2018) is first
//! moved back to the allocation year (2016) by adding the emissions of the
//! years in between. A country then receives the share of that budget that
//! matches its share of the world population, using
//! $total\_CO2 / per\_capita\_CO2$ as the population proxy:
//!
//! $$B_{2016} = (B_{2018} + carry) \cdot \frac{total\_CO2}{per\_capita\_CO2}
//!    \cdot \frac{e_{pc,world}}{E_{world}} \cdot 10^{-3}$$
//!
//! with the result in Mt CO2. Subtracting the emissions assumed for 2018 and
//! 2019 (the baseline year value, twice) gives the budget left from 2020.

use crate::errors::{BudgetError, BudgetResult};
use crate::parameters::{GlobalParameters, KT_PER_MT};
use crate::table::CountryRecord;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// A validated global carbon budget counted from the budget reference year (Gt CO2).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct BudgetInput(FloatValue);

impl BudgetInput {
    /// Accept whole numbers within the configured budget range.
    pub fn new(
        global_budget_2018: FloatValue,
        parameters: &GlobalParameters,
    ) -> BudgetResult<Self> {
        if !global_budget_2018.is_finite() {
            return Err(BudgetError::InvalidBudgetInput(format!(
                "global budget must be a finite number, got {global_budget_2018}"
            )));
        }
        if global_budget_2018.fract() != 0.0 {
            return Err(BudgetError::InvalidBudgetInput(format!(
                "global budget must be a whole number of Gt CO2, got {global_budget_2018}"
            )));
        }
        if !parameters.budget_range().contains(&global_budget_2018) {
            return Err(BudgetError::InvalidBudgetInput(format!(
                "global budget {} Gt CO2 is outside [{}, {}]",
                global_budget_2018, parameters.min_global_budget, parameters.max_global_budget
            )));
        }
        Ok(Self(global_budget_2018))
    }

    /// Budget in Gt CO2.
    pub fn gigatonnes(&self) -> FloatValue {
        self.0
    }
}

/// Both views of a country's budget (Mt CO2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Remaining budget at the start of the allocation year.
    pub budget_2016: FloatValue,
    /// Remaining budget after the assumed-constant years.
    pub budget_2020: FloatValue,
    /// Emissions in the baseline year (Mt CO2/yr).
    pub baseline_emissions: FloatValue,
}

/// Global budget at the allocation year (Gt CO2).
pub fn global_budget_2016(input: BudgetInput, parameters: &GlobalParameters) -> FloatValue {
    input.gigatonnes() + parameters.baseline_budget_carry_forward
}

/// Population proxy of a country: total emissions over per-capita emissions
/// (thousands of people when the total is in kt).
pub fn population_proxy(country: &CountryRecord) -> BudgetResult<FloatValue> {
    if country.per_capita_co2 == 0.0 {
        return Err(BudgetError::DivisionByZero(format!(
            "per capita emissions of '{}' are zero",
            country.name
        )));
    }
    Ok(country.total_co2 / country.per_capita_co2)
}

/// Share of the global budget for `country` at the allocation year (Mt CO2).
pub fn allocate(
    country: &CountryRecord,
    global_budget_2018: FloatValue,
    parameters: &GlobalParameters,
) -> BudgetResult<FloatValue> {
    let input = BudgetInput::new(global_budget_2018, parameters)?;
    allocate_input(country, input, parameters)
}

/// Share of the global budget left from the projection start year (Mt CO2).
pub fn allocate_remaining(
    country: &CountryRecord,
    global_budget_2018: FloatValue,
    parameters: &GlobalParameters,
) -> BudgetResult<FloatValue> {
    let input = BudgetInput::new(global_budget_2018, parameters)?;
    allocate_both(country, input, parameters).map(|allocation| allocation.budget_2020)
}

/// Compute both the 2016 and the 2020 budgets for `country`.
pub fn allocate_both(
    country: &CountryRecord,
    input: BudgetInput,
    parameters: &GlobalParameters,
) -> BudgetResult<Allocation> {
    let budget_2016 = allocate_input(country, input, parameters)?;
    let baseline_emissions = country.baseline_emissions(parameters.baseline_year)?;
    let budget_2020 =
        budget_2016 - FloatValue::from(parameters.assumed_constant_years) * baseline_emissions;

    Ok(Allocation {
        budget_2016,
        budget_2020,
        baseline_emissions,
    })
}

fn allocate_input(
    country: &CountryRecord,
    input: BudgetInput,
    parameters: &GlobalParameters,
) -> BudgetResult<FloatValue> {
    let population = population_proxy(country)?;
    Ok(global_budget_2016(input, parameters) * population
        / parameters.global_annual_emissions
        * parameters.global_per_capita_emissions
        / KT_PER_MT)
}
