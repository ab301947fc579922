//! End-to-end scenarios on the sample emissions table.
//!
//! The sample table holds illustrative data for a handful of countries with
//! the same layout as the full dataset (1970-2017).

use approx::assert_relative_eq;
use carbon_budget_core::allocator::{allocate, allocate_remaining};
use carbon_budget_core::projector::produce_future_sequence;
use carbon_budget_core::reporter::{CountryOutcome, UndefinedReason};
use carbon_budget_core::table::EmissionsTable;
use carbon_budget_core::{BudgetCalculator, BudgetError, FloatValue, GlobalParameters};

fn sample_path() -> String {
    format!(
        "{}/tests/data/emissions_sample.csv",
        env!("CARGO_MANIFEST_DIR")
    )
}

fn sample_calculator() -> BudgetCalculator {
    BudgetCalculator::from_path(sample_path(), GlobalParameters::default())
        .expect("sample table should load")
}

fn budgets() -> impl Iterator<Item = FloatValue> {
    (50..=2500).step_by(10).map(|b| b as FloatValue)
}

mod table {
    use super::*;

    #[test]
    fn test_sample_table_loads_all_countries() {
        let calculator = sample_calculator();
        assert_eq!(
            calculator.list_countries(),
            vec!["Belgium", "Germany", "France", "India", "United States"]
        );
        assert_eq!(calculator.default_country(), Some("Belgium"));
    }

    #[test]
    fn test_historical_series_covers_1970_to_2017() {
        let calculator = sample_calculator();
        let series = calculator.historical_series("Belgium").unwrap();

        assert_eq!(series.len(), 48);
        assert_eq!(series.first().unwrap().0, 1970);
        assert_eq!(series.last().unwrap(), &(2017, 100.6));
    }

    #[test]
    fn test_table_requiring_later_years_fails() {
        let result = EmissionsTable::load_path(sample_path(), 1970..=2018);
        match result {
            Err(BudgetError::DataLoad { reason, .. }) => assert!(reason.contains("'2018'")),
            other => panic!("expected a load error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_fails() {
        let result =
            BudgetCalculator::from_path("/nonexistent/data.csv", GlobalParameters::default());
        assert!(matches!(result, Err(BudgetError::DataLoad { .. })));
    }
}

mod belgium {
    use super::*;

    #[test]
    fn test_default_scenario() {
        let calculator = sample_calculator();
        let report = calculator.compute("Belgium", 580.0).unwrap();

        assert_eq!(report.global_reach_years_2016, 16.5);
        assert_eq!(report.global_reach_years_2020, 12.5);

        // 660 Gt * (99880 kt / 8.83 t) * 5.4 / 40 / 1000
        let expected_2016 = 660.0 * (99880.0 / 8.83) * 5.4 / 40.0 / 1000.0;
        let estimate = report.estimate().unwrap();
        assert_relative_eq!(estimate.country_budget_2016_mt, expected_2016, max_relative = 1e-12);
        assert_relative_eq!(
            estimate.country_budget_2020_mt,
            expected_2016 - 2.0 * 100.6,
            max_relative = 1e-12
        );
        assert_eq!(estimate.years_linear, 2.0 * estimate.years_constant);
    }

    #[test]
    fn test_global_reach_literal_in_messages() {
        let calculator = sample_calculator();
        let report = calculator.compute("Belgium", 580.0).unwrap();

        assert!(report.messages().iter().any(|message| message.contains("16.5")));
    }

    #[test]
    fn test_budget_bounds_are_finite() {
        let calculator = sample_calculator();
        for budget in [50.0, 2500.0] {
            let report = calculator.compute("Belgium", budget).unwrap();
            let estimate = report.estimate().expect("Belgium has well-formed data");

            assert!(report.global_reach_years_2016.is_finite());
            assert!(report.global_reach_years_2020.is_finite());
            assert!(estimate.country_budget_2016_mt.is_finite());
            assert!(estimate.country_budget_2020_mt.is_finite());
            assert!(estimate.years_constant.is_finite());
            assert!(estimate.years_linear.is_finite());
            assert!(estimate
                .future_series
                .iter()
                .chain(estimate.future_series_personal.iter().flatten())
                .all(|(_, value)| value.is_finite()));
        }
    }

    #[test]
    fn test_compute_is_idempotent() {
        let calculator = sample_calculator();
        let first = calculator.compute("Belgium", 733.0).unwrap();
        let second = calculator.compute("Belgium", 733.0).unwrap();

        assert_eq!(first, second);
        let (a, b) = (first.estimate().unwrap(), second.estimate().unwrap());
        assert_eq!(a.years_constant.to_bits(), b.years_constant.to_bits());
        assert!(a
            .future_series
            .iter()
            .zip(&b.future_series)
            .all(|(x, y)| x.0 == y.0 && x.1.to_bits() == y.1.to_bits()));
    }
}

mod properties {
    use super::*;

    #[test]
    fn test_2020_budget_never_exceeds_2016_budget() {
        let calculator = sample_calculator();
        let parameters = calculator.parameters();
        for country in calculator.table().iter() {
            for budget in budgets() {
                let b2016 = allocate(country, budget, parameters).unwrap();
                let b2020 = allocate_remaining(country, budget, parameters).unwrap();
                assert!(b2020 <= b2016, "{} at {budget} Gt", country.name);
            }
        }
    }

    #[test]
    fn test_allocation_monotonic_in_budget() {
        let calculator = sample_calculator();
        let parameters = calculator.parameters();
        for country in calculator.table().iter() {
            let allocations: Vec<FloatValue> = budgets()
                .map(|budget| allocate(country, budget, parameters).unwrap())
                .collect();
            assert!(allocations.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn test_projection_conserves_remaining_budget() {
        let calculator = sample_calculator();
        let parameters = calculator.parameters();
        for country in calculator.table().iter() {
            let e0 = country.emissions_in(parameters.baseline_year).unwrap();
            for budget in budgets() {
                let remaining = allocate_remaining(country, budget, parameters).unwrap();
                let sequence = produce_future_sequence(
                    parameters.projection_start_year(),
                    e0,
                    remaining,
                    parameters.max_projection_years,
                )
                .unwrap();

                assert!(sequence.iter().all(|(_, value)| *value >= 0.0));
                assert!(sequence.windows(2).all(|pair| pair[1].1 <= pair[0].1));
                if remaining <= 0.0 {
                    assert!(sequence.is_empty());
                } else {
                    let sum: FloatValue = sequence.iter().map(|(_, value)| value).sum();
                    assert_relative_eq!(sum, remaining, max_relative = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_linear_years_twice_constant_years() {
        let calculator = sample_calculator();
        for country in calculator.list_countries() {
            for budget in budgets() {
                let report = calculator.compute(country, budget).unwrap();
                let estimate = report.estimate().unwrap();
                assert_eq!(estimate.years_linear, 2.0 * estimate.years_constant);
            }
        }
    }

    #[test]
    fn test_future_series_starts_after_baseline() {
        let calculator = sample_calculator();
        let report = calculator.compute("India", 1000.0).unwrap();
        let estimate = report.estimate().unwrap();

        let years: Vec<i32> = estimate.future_series.iter().map(|(year, _)| *year).collect();
        assert_eq!(years[0], 2018);
        assert!(years.windows(2).all(|pair| pair[1] == pair[0] + 1));
        assert_eq!(*years.last().unwrap() + 1, estimate.depletion_year);
    }
}

mod degenerate {
    use super::*;

    const DEGENERATE_TABLE: &str = "\
country,2016,2017,total_kton_CO2,per_capita_CO2,population
Belgium,100.0,100.6,99880,8.83,11331422
Nowhere,0.0,0.0,0,0,0
Emptyland,1.0,0.0,500,2.5,200000
Ghostland,5.0,5.0,500,2.5,0
";

    fn calculator() -> BudgetCalculator {
        let parameters = GlobalParameters {
            first_historical_year: 2016,
            ..Default::default()
        };
        let table =
            EmissionsTable::load(DEGENERATE_TABLE.as_bytes(), parameters.historical_years())
                .unwrap();
        BudgetCalculator::new(table, parameters).unwrap()
    }

    #[test]
    fn test_zero_per_capita_is_division_by_zero() {
        let calculator = calculator();
        let nowhere = calculator.table().get("Nowhere").unwrap();

        assert!(matches!(
            allocate(nowhere, 580.0, calculator.parameters()),
            Err(BudgetError::DivisionByZero(_))
        ));

        let report = calculator.compute("Nowhere", 580.0).unwrap();
        match &report.outcome {
            CountryOutcome::Undefined { reason, message } => {
                assert_eq!(*reason, UndefinedReason::ZeroPerCapitaEmissions);
                assert!(message.contains("Nowhere"));
            }
            CountryOutcome::Estimated(estimate) => panic!("unexpected estimate {estimate:?}"),
        }
        assert_eq!(report.global_reach_years_2016, 16.5);
    }

    #[test]
    fn test_zero_baseline_is_explained() {
        let calculator = calculator();
        let report = calculator.compute("Emptyland", 580.0).unwrap();

        assert_eq!(
            report.undefined_reason(),
            Some(UndefinedReason::NonPositiveBaseline)
        );
        assert!(report.messages().last().unwrap().contains("2017"));
    }

    #[test]
    fn test_zero_population_only_drops_personal_series() {
        let calculator = calculator();
        let report = calculator.compute("Ghostland", 580.0).unwrap();
        let estimate = report.estimate().expect("national figures remain defined");

        assert!(estimate.country_budget_2016_mt > 0.0);
        assert_eq!(estimate.future_series.first(), Some(&(2018, 5.0)));
        assert!(estimate.future_series_personal.is_none());
    }

    #[test]
    fn test_well_formed_country_unaffected() {
        let calculator = calculator();
        assert!(calculator.compute("Belgium", 580.0).unwrap().estimate().is_some());
    }
}
