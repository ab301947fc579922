//! Summary statistics for a country and a global budget
//!
//! Combines the allocation and the projection into the figures shown next to
//! the chart: how long the global budget lasts, the national budget at the
//! allocation year and from the projection start year, how long the national
//! budget lasts at constant or linearly decreasing emissions and the yearly
//! emissions pathway, in total and per person.
//!
//! Countries for which no estimate can be made (zero per-capita emissions, no
//! baseline emissions, ...) are reported as [`CountryOutcome::Undefined`] with
//! an explanation instead of an error.

use crate::allocator::{allocate_both, BudgetInput};
use crate::errors::{BudgetError, BudgetResult};
use crate::parameters::{GlobalParameters, TONNES_PER_MT};
use crate::projector::produce_future_sequence;
use crate::table::CountryRecord;
use crate::{FloatValue, Year, YearValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Why no national estimate could be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// Per-capita emissions are zero so the population share cannot be derived.
    ZeroPerCapitaEmissions,
    /// Baseline emissions are zero, nothing to project from.
    NonPositiveBaseline,
    /// The pathway would last longer than the configured horizon.
    ProjectionHorizonExceeded,
}

impl UndefinedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UndefinedReason::ZeroPerCapitaEmissions => "zero_per_capita_emissions",
            UndefinedReason::NonPositiveBaseline => "non_positive_baseline",
            UndefinedReason::ProjectionHorizonExceeded => "projection_horizon_exceeded",
        }
    }

    pub fn explain(&self, country: &str, parameters: &GlobalParameters) -> String {
        match self {
            UndefinedReason::ZeroPerCapitaEmissions => format!(
                "No carbon budget can be calculated for {country}: its per capita emissions are zero in the source data."
            ),
            UndefinedReason::NonPositiveBaseline => format!(
                "No emissions pathway can be calculated for {country}: it has no recorded emissions in {}.",
                parameters.baseline_year
            ),
            UndefinedReason::ProjectionHorizonExceeded => format!(
                "The emissions pathway for {country} would last more than {} years.",
                parameters.max_projection_years
            ),
        }
    }
}

/// National figures for one country and one global budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEstimate {
    /// Remaining budget at the allocation year (Mt CO2).
    pub country_budget_2016_mt: FloatValue,
    /// Remaining budget from the projection start year (Mt CO2), negative when overspent.
    pub country_budget_2020_mt: FloatValue,
    /// Emissions in the baseline year (Mt CO2/yr).
    pub baseline_emissions_mt: FloatValue,
    /// Years the remaining budget lasts at baseline emissions.
    pub years_constant: FloatValue,
    /// Years the remaining budget lasts with a linear decrease to zero.
    pub years_linear: FloatValue,
    /// First year with zero projected emissions.
    pub depletion_year: Year,
    /// Bridge years at baseline emissions followed by the projected pathway (Mt CO2).
    pub future_series: Vec<YearValue>,
    /// `future_series` per person (t CO2), `None` when the population is zero.
    pub future_series_personal: Option<Vec<YearValue>>,
}

impl CountryEstimate {
    /// True if nothing is left from the projection start year.
    pub fn is_exhausted(&self) -> bool {
        self.country_budget_2020_mt <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CountryOutcome {
    Estimated(CountryEstimate),
    Undefined {
        reason: UndefinedReason,
        message: String,
    },
}

/// Everything the presentation layer shows for a (country, budget) selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub country: String,
    /// Global budget from the budget reference year (Gt CO2).
    pub global_budget_2018: FloatValue,
    /// Years the global budget lasted from the allocation year at constant emissions.
    pub global_reach_years_2016: FloatValue,
    /// Years the global budget lasts from the projection start year at constant emissions.
    pub global_reach_years_2020: FloatValue,
    pub outcome: CountryOutcome,
    #[serde(skip)]
    parameters: GlobalParameters,
}

impl BudgetReport {
    pub fn estimate(&self) -> Option<&CountryEstimate> {
        match &self.outcome {
            CountryOutcome::Estimated(estimate) => Some(estimate),
            CountryOutcome::Undefined { .. } => None,
        }
    }

    pub fn undefined_reason(&self) -> Option<UndefinedReason> {
        match &self.outcome {
            CountryOutcome::Estimated(_) => None,
            CountryOutcome::Undefined { reason, .. } => Some(*reason),
        }
    }

    /// Human readable summary, one sentence per entry.
    pub fn messages(&self) -> Vec<String> {
        let parameters = &self.parameters;
        let start = parameters.projection_start_year();
        let mut messages = vec![
            format!(
                "For your carbon budget, the global reach in {} was {} years.",
                parameters.allocation_year, self.global_reach_years_2016
            ),
            format!(
                "From {} onwards, the global budget lasts {} years at constant emissions.",
                start, self.global_reach_years_2020
            ),
        ];

        match &self.outcome {
            CountryOutcome::Undefined { message, .. } => messages.push(message.clone()),
            CountryOutcome::Estimated(estimate) => {
                messages.push(format!(
                    "The remaining carbon budget for {} is {:.2} Mton CO2, calculated based on the \
                     premise that the remaining budget is distributed on an equal per capita basis \
                     at the start of {}.",
                    self.country, estimate.country_budget_2016_mt, parameters.allocation_year
                ));
                if estimate.is_exhausted() {
                    messages.push(format!(
                        "Assuming constant emissions until {}, {} has used up its budget before {}, \
                         overspending it by {:.2} Mton CO2.",
                        start - 1,
                        self.country,
                        start,
                        -estimate.country_budget_2020_mt
                    ));
                } else {
                    messages.push(format!(
                        "From {} onwards {} can emit {:.2} Mton CO2: {:.1} years at constant {} \
                         emissions, or {:.1} years with a linear decrease reaching zero in {}.",
                        start,
                        self.country,
                        estimate.country_budget_2020_mt,
                        estimate.years_constant,
                        parameters.baseline_year,
                        estimate.years_linear,
                        estimate.depletion_year
                    ));
                }
                if estimate.future_series_personal.is_none() {
                    messages.push(format!(
                        "No personal emissions can be calculated for {}: its population is zero \
                         in the source data.",
                        self.country
                    ));
                }
            }
        }
        messages
    }
}

/// Years the global budget lasted from the allocation year.
pub fn global_reach_years_2016(input: BudgetInput, parameters: &GlobalParameters) -> FloatValue {
    (input.gigatonnes() + parameters.baseline_budget_carry_forward)
        / parameters.global_annual_emissions
}

/// Years the global budget lasts from the projection start year, zero once spent.
pub fn global_reach_years_2020(input: BudgetInput, parameters: &GlobalParameters) -> FloatValue {
    let spent =
        FloatValue::from(parameters.assumed_constant_years) * parameters.global_annual_emissions;
    (input.gigatonnes() - spent).max(0.0) / parameters.global_annual_emissions
}

/// Convert a national series (Mt CO2) into emissions per person (t CO2).
pub fn personal_series(series: &[YearValue], population: FloatValue) -> Option<Vec<YearValue>> {
    if !(population.is_finite() && population > 0.0) {
        return None;
    }
    Some(
        series
            .iter()
            .map(|(year, value)| (*year, value / population * TONNES_PER_MT))
            .collect(),
    )
}

/// Build the full report for `country`.
///
/// Only data errors (a record without the baseline year) are returned as
/// errors; degenerate countries produce a [`CountryOutcome::Undefined`].
pub fn report(
    country: &CountryRecord,
    input: BudgetInput,
    parameters: &GlobalParameters,
) -> BudgetResult<BudgetReport> {
    debug!(
        country = %country.name,
        global_budget = input.gigatonnes(),
        "Computing carbon budget report"
    );
    let outcome = match estimate(country, input, parameters)? {
        Ok(estimate) => CountryOutcome::Estimated(estimate),
        Err(reason) => {
            warn!(country = %country.name, ?reason, "No estimate possible");
            CountryOutcome::Undefined {
                reason,
                message: reason.explain(&country.name, parameters),
            }
        }
    };

    Ok(BudgetReport {
        country: country.name.clone(),
        global_budget_2018: input.gigatonnes(),
        global_reach_years_2016: global_reach_years_2016(input, parameters),
        global_reach_years_2020: global_reach_years_2020(input, parameters),
        outcome,
        parameters: parameters.clone(),
    })
}

fn estimate(
    country: &CountryRecord,
    input: BudgetInput,
    parameters: &GlobalParameters,
) -> BudgetResult<Result<CountryEstimate, UndefinedReason>> {
    let allocation = match allocate_both(country, input, parameters) {
        Ok(allocation) => allocation,
        Err(BudgetError::DivisionByZero(_)) => {
            return Ok(Err(UndefinedReason::ZeroPerCapitaEmissions))
        }
        Err(e) => return Err(e),
    };
    let e0 = allocation.baseline_emissions;
    if e0 <= 0.0 {
        return Ok(Err(UndefinedReason::NonPositiveBaseline));
    }

    let start = parameters.projection_start_year();
    let projection = match produce_future_sequence(
        start,
        e0,
        allocation.budget_2020,
        parameters.max_projection_years,
    ) {
        Ok(projection) => projection,
        Err(BudgetError::ProjectionHorizon { .. }) => {
            return Ok(Err(UndefinedReason::ProjectionHorizonExceeded))
        }
        Err(e) => return Err(e),
    };
    let depletion_year = start + projection.len() as Year;

    let future_series: Vec<YearValue> = (parameters.baseline_year + 1..start)
        .map(|year| (year, e0))
        .chain(projection)
        .collect();
    let future_series_personal = personal_series(&future_series, country.population);
    if future_series_personal.is_none() {
        warn!(country = %country.name, "Population is zero, no personal series");
    }

    let years_constant = allocation.budget_2020.max(0.0) / e0;
    Ok(Ok(CountryEstimate {
        country_budget_2016_mt: allocation.budget_2016,
        country_budget_2020_mt: allocation.budget_2020,
        baseline_emissions_mt: e0,
        years_constant,
        years_linear: 2.0 * years_constant,
        depletion_year,
        future_series,
        future_series_personal,
    }))
}
