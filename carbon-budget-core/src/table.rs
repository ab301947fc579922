//! Per-country emissions table
//!
//! The table is read once from a CSV source with one row per country:
//!
//! ```text
//! country,1970,...,2017,total_kton_CO2,per_capita_CO2,population
//! Belgium,140.2,...,100.6,99880,8.83,11331422
//! ```
//!
//! Year columns hold emissions in Mt CO2. They are the unbroken run of
//! numeric headers that contains the expected years. Other numeric headers and
//! columns that are not metadata columns are ignored.

use crate::errors::{BudgetError, BudgetResult};
use crate::{FloatValue, Year, YearValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::info;

pub const COLUMN_COUNTRY: &str = "country";
pub const COLUMN_TOTAL_CO2: &str = "total_kton_CO2";
pub const COLUMN_PER_CAPITA_CO2: &str = "per_capita_CO2";
pub const COLUMN_POPULATION: &str = "population";

/// Emissions data and metadata for a single country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    /// Yearly emissions (Mt CO2)
    pub yearly_emissions: BTreeMap<Year, FloatValue>,
    /// Total emissions figure used as the allocation weight (kt CO2)
    pub total_co2: FloatValue,
    /// Emissions per person (t CO2)
    pub per_capita_co2: FloatValue,
    pub population: FloatValue,
}

impl CountryRecord {
    pub fn emissions_in(&self, year: Year) -> Option<FloatValue> {
        self.yearly_emissions.get(&year).copied()
    }

    /// Emissions in `year`, which must be covered by the record.
    pub fn baseline_emissions(&self, year: Year) -> BudgetResult<FloatValue> {
        self.emissions_in(year).ok_or_else(|| {
            BudgetError::data_load(
                format!("country '{}', column '{}'", self.name, year),
                "no emissions recorded for the baseline year",
            )
        })
    }

    /// Historical emissions in year order.
    pub fn historical_series(&self) -> Vec<YearValue> {
        self.yearly_emissions
            .iter()
            .map(|(year, value)| (*year, *value))
            .collect()
    }

    /// Check the record invariants: non-empty name, finite non-negative values
    /// and no gaps between the first and last year.
    fn validate(&self) -> BudgetResult<()> {
        let context = || format!("country '{}'", self.name);

        if self.name.trim().is_empty() {
            return Err(BudgetError::data_load(
                format!("column '{COLUMN_COUNTRY}'"),
                "country name is empty",
            ));
        }
        let scalars = [
            (COLUMN_TOTAL_CO2, self.total_co2),
            (COLUMN_PER_CAPITA_CO2, self.per_capita_co2),
            (COLUMN_POPULATION, self.population),
        ];
        for (column, value) in scalars {
            check_non_negative(value).map_err(|reason| {
                BudgetError::data_load(format!("{}, column '{column}'", context()), reason)
            })?;
        }
        for (year, value) in &self.yearly_emissions {
            check_non_negative(*value).map_err(|reason| {
                BudgetError::data_load(format!("{}, column '{year}'", context()), reason)
            })?;
        }
        if let (Some(first), Some(last)) = (
            self.yearly_emissions.keys().next(),
            self.yearly_emissions.keys().next_back(),
        ) {
            let span = i64::from(*last) - i64::from(*first) + 1;
            if span != self.yearly_emissions.len() as i64 {
                return Err(BudgetError::data_load(
                    context(),
                    format!("yearly emissions between {first} and {last} have gaps"),
                ));
            }
        }
        Ok(())
    }
}

fn check_non_negative(value: FloatValue) -> Result<(), String> {
    if !value.is_finite() {
        Err(format!("value {value} is not finite"))
    } else if value < 0.0 {
        Err(format!("value {value} is negative"))
    } else {
        Ok(())
    }
}

/// Read-only collection of [`CountryRecord`]s keyed by country name.
///
/// The insertion order of the source is preserved by [`EmissionsTable::names`].
#[derive(Debug, Clone, Default)]
pub struct EmissionsTable {
    records: Vec<CountryRecord>,
    index: HashMap<String, usize>,
}

impl EmissionsTable {
    /// Build a table from already parsed records.
    ///
    /// Fails if two records share a name or a record breaks the record invariants.
    pub fn from_records(records: Vec<CountryRecord>) -> BudgetResult<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            record.validate()?;
            if index.insert(record.name.clone(), position).is_some() {
                return Err(BudgetError::data_load(
                    format!("row {}, column '{COLUMN_COUNTRY}'", position + 1),
                    format!("duplicate country '{}'", record.name),
                ));
            }
        }
        Ok(Self { records, index })
    }

    /// Parse a CSV source.
    ///
    /// Every year in `years` must be present as a column. Year columns outside
    /// that range are kept as long as the years remain contiguous.
    pub fn load<R: Read>(source: R, years: RangeInclusive<Year>) -> BudgetResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| BudgetError::data_load("header", e.to_string()))?
            .clone();
        let layout = ColumnLayout::from_headers(&headers, &years)?;

        let mut records = Vec::new();
        for (position, row) in reader.records().enumerate() {
            let row_number = position + 1;
            let row = row
                .map_err(|e| BudgetError::data_load(format!("row {row_number}"), e.to_string()))?;
            records.push(layout.parse_row(&row, row_number)?);
        }

        let table = Self::from_records(records)?;
        info!(
            countries = table.len(),
            first_year = *years.start(),
            last_year = *years.end(),
            "Loaded emissions table"
        );
        Ok(table)
    }

    /// Open and parse a CSV file.
    pub fn load_path(path: impl AsRef<Path>, years: RangeInclusive<Year>) -> BudgetResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| BudgetError::data_load(path.display().to_string(), e.to_string()))?;
        Self::load(std::io::BufReader::new(file), years)
    }

    pub fn get(&self, name: &str) -> BudgetResult<&CountryRecord> {
        self.index
            .get(name)
            .map(|position| &self.records[*position])
            .ok_or_else(|| BudgetError::UnknownCountry(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Country names in source order.
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Positions of the known columns within a CSV header.
struct ColumnLayout {
    country: usize,
    total_co2: usize,
    per_capita_co2: usize,
    population: usize,
    years: Vec<(Year, usize)>,
}

impl ColumnLayout {
    fn from_headers(
        headers: &csv::StringRecord,
        expected: &RangeInclusive<Year>,
    ) -> BudgetResult<Self> {
        let missing = |name: &str| {
            BudgetError::data_load("header", format!("missing required column '{name}'"))
        };
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| missing(name))
        };

        if expected.is_empty() {
            return Err(BudgetError::data_load("header", "the expected year range is empty"));
        }
        let numeric: BTreeMap<Year, usize> = headers
            .iter()
            .enumerate()
            .filter_map(|(position, header)| {
                header.parse::<Year>().ok().map(|year| (year, position))
            })
            .collect();
        if let Some(year) = expected.clone().find(|year| !numeric.contains_key(year)) {
            return Err(missing(&year.to_string()));
        }

        // Year columns are the unbroken run of numeric headers around the
        // expected years; detached numeric headers are ignored.
        let mut first = *expected.start();
        while let Some(year) = first.checked_sub(1).filter(|year| numeric.contains_key(year)) {
            first = year;
        }
        let mut last = *expected.end();
        while let Some(year) = last.checked_add(1).filter(|year| numeric.contains_key(year)) {
            last = year;
        }
        let years = numeric
            .range(first..=last)
            .map(|(year, position)| (*year, *position))
            .collect();

        Ok(Self {
            country: find(COLUMN_COUNTRY)?,
            total_co2: find(COLUMN_TOTAL_CO2)?,
            per_capita_co2: find(COLUMN_PER_CAPITA_CO2)?,
            population: find(COLUMN_POPULATION)?,
            years,
        })
    }

    fn parse_row(&self, row: &csv::StringRecord, row_number: usize) -> BudgetResult<CountryRecord> {
        let name = row.get(self.country).unwrap_or_default().to_string();
        let context = |column: &str| {
            if name.is_empty() {
                format!("row {row_number}, column '{column}'")
            } else {
                format!("row {row_number} ({name}), column '{column}'")
            }
        };
        if name.is_empty() {
            return Err(BudgetError::data_load(context(COLUMN_COUNTRY), "country name is empty"));
        }

        let number = |position: usize, column: &str| -> BudgetResult<FloatValue> {
            let cell = row.get(position).unwrap_or_default();
            if cell.is_empty() {
                return Err(BudgetError::data_load(context(column), "cell is empty"));
            }
            cell.parse::<FloatValue>()
                .map_err(|e| {
                    BudgetError::data_load(context(column), format!("cannot parse '{cell}': {e}"))
                })
        };

        let mut yearly_emissions = BTreeMap::new();
        for (year, position) in &self.years {
            yearly_emissions.insert(*year, number(*position, &year.to_string())?);
        }

        let record = CountryRecord {
            total_co2: number(self.total_co2, COLUMN_TOTAL_CO2)?,
            per_capita_co2: number(self.per_capita_co2, COLUMN_PER_CAPITA_CO2)?,
            population: number(self.population, COLUMN_POPULATION)?,
            yearly_emissions,
            name,
        };
        record.validate().map_err(|e| match e {
            BudgetError::DataLoad { context, reason } => BudgetError::DataLoad {
                context: format!("row {row_number}, {context}"),
                reason,
            },
            other => other,
        })?;
        Ok(record)
    }
}
