//! Entry point for presentation layers.
//!
//! A [`BudgetCalculator`] owns the emissions table and the parameters. All
//! methods take `&self` and every result depends only on the arguments, so a
//! calculator can be shared between threads and results can be cached by
//! `(country, budget)`.

use crate::allocator::BudgetInput;
use crate::errors::BudgetResult;
use crate::parameters::GlobalParameters;
use crate::reporter::{report, BudgetReport};
use crate::table::EmissionsTable;
use crate::{FloatValue, YearValue};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct BudgetCalculator {
    table: EmissionsTable,
    parameters: GlobalParameters,
}

impl BudgetCalculator {
    pub fn new(table: EmissionsTable, parameters: GlobalParameters) -> BudgetResult<Self> {
        parameters.validate()?;
        Ok(Self { table, parameters })
    }

    /// Load the emissions table from a CSV file, requiring the historical
    /// years configured in `parameters`.
    pub fn from_path(path: impl AsRef<Path>, parameters: GlobalParameters) -> BudgetResult<Self> {
        parameters.validate()?;
        let table = EmissionsTable::load_path(path, parameters.historical_years())?;
        Self::new(table, parameters)
    }

    pub fn table(&self) -> &EmissionsTable {
        &self.table
    }

    pub fn parameters(&self) -> &GlobalParameters {
        &self.parameters
    }

    /// Country names in source order, for a selection control.
    pub fn list_countries(&self) -> Vec<&str> {
        self.table.names()
    }

    /// The configured default country if the table has it, otherwise the first country.
    pub fn default_country(&self) -> Option<&str> {
        match self.table.get(&self.parameters.default_country) {
            Ok(record) => Some(record.name.as_str()),
            Err(_) => self.table.names().first().copied(),
        }
    }

    /// Historical emissions of `country` (Mt CO2).
    pub fn historical_series(&self, country: &str) -> BudgetResult<Vec<YearValue>> {
        Ok(self.table.get(country)?.historical_series())
    }

    /// Compute the report for `country` and a global budget counted from 2018 (Gt CO2).
    ///
    /// Fails for unknown countries and for budgets outside the configured range.
    pub fn compute(
        &self,
        country: &str,
        global_budget_2018: FloatValue,
    ) -> BudgetResult<BudgetReport> {
        let input = BudgetInput::new(global_budget_2018, &self.parameters)?;
        let record = self.table.get(country)?;
        report(record, input, &self.parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BudgetError;

    const TABLE: &str = "\
country,2016,2017,total_kton_CO2,per_capita_CO2,population
France,331.0,338.0,331613,4.97,66859768
Belgium,100.0,100.5,99880,8.83,11331422
";

    fn calculator(parameters: GlobalParameters) -> BudgetCalculator {
        let parameters = GlobalParameters {
            first_historical_year: 2016,
            ..parameters
        };
        let table = EmissionsTable::load(TABLE.as_bytes(), parameters.historical_years()).unwrap();
        BudgetCalculator::new(table, parameters).unwrap()
    }

    #[test]
    fn test_list_countries_in_source_order() {
        let calculator = calculator(GlobalParameters::default());
        assert_eq!(calculator.list_countries(), vec!["France", "Belgium"]);
    }

    #[test]
    fn test_default_country() {
        assert_eq!(
            calculator(GlobalParameters::default()).default_country(),
            Some("Belgium")
        );

        let parameters = GlobalParameters {
            default_country: "Atlantis".to_string(),
            ..Default::default()
        };
        assert_eq!(calculator(parameters).default_country(), Some("France"));
    }

    #[test]
    fn test_compute_unknown_country() {
        let calculator = calculator(GlobalParameters::default());
        assert_eq!(
            calculator.compute("Atlantis", 580.0),
            Err(BudgetError::UnknownCountry("Atlantis".to_string()))
        );
    }

    #[test]
    fn test_compute_rejects_out_of_range_budget() {
        let calculator = calculator(GlobalParameters::default());
        assert!(matches!(
            calculator.compute("Belgium", 49.0),
            Err(BudgetError::InvalidBudgetInput(_))
        ));
        assert!(matches!(
            calculator.compute("Belgium", 2501.0),
            Err(BudgetError::InvalidBudgetInput(_))
        ));
    }

    #[test]
    fn test_historical_series() {
        let calculator = calculator(GlobalParameters::default());
        assert_eq!(
            calculator.historical_series("Belgium").unwrap(),
            vec![(2016, 100.0), (2017, 100.5)]
        );
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let table = EmissionsTable::default();
        let parameters = GlobalParameters {
            global_per_capita_emissions: -5.4,
            ..Default::default()
        };
        assert!(matches!(
            BudgetCalculator::new(table, parameters),
            Err(BudgetError::Config(_))
        ));
    }
}
