//! Linear-decay emissions pathway
//!
//! Future emissions fall by a constant amount every year, starting from the
//! baseline emissions $e_0$ and reaching zero at $t_d$:
//!
//! $$e(t) = e_0 - s \cdot t, \quad t = 0, 1, 2, \ldots$$
//!
//! The slope is chosen so that the yearly emissions add up to the remaining
//! budget $B$. Summing $e(t)$ for $t = 0 \ldots t_d$ gives
//! $(t_d + 1) e_0 / 2 = B$, hence
//!
//! $$s = \frac{e_0^2}{2B - e_0}, \qquad t_d = \frac{e_0}{s} = \frac{2B}{e_0} - 1$$
//!
//! The pathway has $n = \lceil t_d \rceil$ emitting years. The partial sums
//! satisfy $\sum_{t<n-1} e(t) \le B \le \sum_{t<n} e(t)$, so the last year
//! emits the residual of the budget, which lies in $[0, e(n-1)]$. The sequence
//! then adds up to $B$ exactly and stays non-increasing.

use crate::errors::{BudgetError, BudgetResult};
use crate::{FloatValue, Year, YearValue};
use serde::{Deserialize, Serialize};

/// Relative tolerance used to decide whether a year falls on the zero crossing.
const DEPLETION_TOLERANCE: FloatValue = 1e-9;

/// A solved linear-decay pathway.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearDecay {
    baseline_emissions: FloatValue,
    remaining_budget: FloatValue,
    slope: FloatValue,
    depletion_time: FloatValue,
}

impl LinearDecay {
    /// Solve the pathway for baseline emissions `e0` (Mt/yr) and a remaining budget (Mt).
    ///
    /// Returns `None` when there is nothing to project: non-positive or
    /// non-finite emissions or budget.
    pub fn solve(e0: FloatValue, remaining_budget: FloatValue) -> Option<Self> {
        if !(e0.is_finite() && e0 > 0.0 && remaining_budget.is_finite() && remaining_budget > 0.0) {
            return None;
        }
        // A budget below one year of baseline emissions is spent in the first year.
        let (slope, depletion_time) = if remaining_budget <= e0 {
            (e0, 1.0)
        } else {
            let slope = e0 * e0 / (2.0 * remaining_budget - e0);
            (slope, e0 / slope)
        };
        Some(Self {
            baseline_emissions: e0,
            remaining_budget,
            slope,
            depletion_time,
        })
    }

    pub fn baseline_emissions(&self) -> FloatValue {
        self.baseline_emissions
    }

    pub fn remaining_budget(&self) -> FloatValue {
        self.remaining_budget
    }

    /// Yearly reduction of emissions (Mt/yr per year).
    pub fn slope(&self) -> FloatValue {
        self.slope
    }

    /// Years after the first projected year at which emissions reach zero.
    pub fn depletion_time(&self) -> FloatValue {
        self.depletion_time
    }

    /// Emissions `t` years after the first projected year, never negative.
    pub fn emissions_at(&self, t: FloatValue) -> FloatValue {
        (self.baseline_emissions - self.slope * t).max(0.0)
    }

    /// Years the budget lasts when emissions stay at the baseline.
    pub fn years_at_constant(&self) -> FloatValue {
        self.remaining_budget / self.baseline_emissions
    }

    /// Years the budget lasts under a linear decrease: twice the constant case
    /// because a triangle has half the area of the rectangle with the same base.
    pub fn years_at_linear_decrease(&self) -> FloatValue {
        2.0 * self.years_at_constant()
    }

    /// Number of years with non-zero emissions.
    pub fn emitting_years(&self) -> usize {
        if self.remaining_budget <= self.baseline_emissions {
            return 1;
        }
        let cutoff = self.depletion_time * (1.0 - DEPLETION_TOLERANCE);
        cutoff.ceil() as usize
    }

    /// Yearly emissions starting at `first_year`, the last year taking the
    /// residual of the budget.
    ///
    /// Fails if the pathway would last longer than `max_years`.
    pub fn sequence(&self, first_year: Year, max_years: u32) -> BudgetResult<Vec<YearValue>> {
        if self.depletion_time > FloatValue::from(max_years) {
            return Err(BudgetError::ProjectionHorizon {
                years: self.depletion_time,
                limit: max_years,
            });
        }
        let years = self.emitting_years();
        let mut sequence = Vec::with_capacity(years);
        let mut emitted = 0.0;
        for t in 0..years - 1 {
            let value = self.emissions_at(t as FloatValue);
            emitted += value;
            sequence.push((first_year + t as Year, value));
        }
        let residual = self.remaining_budget - emitted;
        if residual > self.remaining_budget * DEPLETION_TOLERANCE {
            sequence.push((first_year + (years - 1) as Year, residual));
        }
        Ok(sequence)
    }
}

/// Project emissions from `first_year` until `remaining_budget` is used up.
///
/// Returns an empty sequence when the budget is exhausted or there are no
/// baseline emissions to project. Fails if the pathway would last longer than
/// `max_years`.
pub fn produce_future_sequence(
    first_year: Year,
    e0: FloatValue,
    remaining_budget: FloatValue,
    max_years: u32,
) -> BudgetResult<Vec<YearValue>> {
    match LinearDecay::solve(e0, remaining_budget) {
        Some(decay) => decay.sequence(first_year, max_years),
        None => Ok(Vec::new()),
    }
}
