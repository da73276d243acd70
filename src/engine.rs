//! The analytics engine: keyed joins between the Case Table and the Measure
//! Table, aggregated into ratios.
//!
//! # A note on "death rate"
//!
//! [`Engine::average_death_rate`] averages **cases per death**
//! (`total_cases / total_deaths`), which is the inverse of the usual
//! definition. The orientation is kept because existing reports are built on
//! it; a larger value means fewer deaths per case.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::error::{QueryError, StoreError};
use crate::store::TableStore;
use crate::table::{CaseTable, MeasureTable};

/// Number of measures ranked by [`Engine::top_measures_efficiency`] unless
/// configured otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// Divisor used when averaging per-country rates for a measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathRateDivisor {
    /// Every adoption row looked up, including countries that were skipped
    /// for lack of usable data.
    #[default]
    AllAdopters,
    /// Only the countries that contributed a rate.
    Retained,
}

impl FromStr for DeathRateDivisor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all-adopters" | "all_adopters" => Ok(DeathRateDivisor::AllAdopters),
            "retained" => Ok(DeathRateDivisor::Retained),
            other => Err(format!(
                "unknown divisor '{}', expected 'all-adopters' or 'retained'",
                other
            )),
        }
    }
}

impl fmt::Display for DeathRateDivisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathRateDivisor::AllAdopters => write!(f, "all-adopters"),
            DeathRateDivisor::Retained => write!(f, "retained"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub death_rate_divisor: DeathRateDivisor,
}

/// Efficiency of one of the most adopted measures.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureEfficiency {
    pub measure: String,
    /// Number of adoption rows for the measure (its rank key).
    pub adoptions: usize,
    /// Pooled `sum(total_recovered) / sum(total_cases)` over adopters.
    pub efficiency: Result<f64, QueryError>,
}

#[derive(Debug, Clone)]
pub struct Engine {
    cases: CaseTable,
    measures: MeasureTable,
    options: EngineOptions,
}

impl Engine {
    pub fn new(cases: CaseTable, measures: MeasureTable) -> Self {
        Self::with_options(cases, measures, EngineOptions::default())
    }

    pub fn with_options(cases: CaseTable, measures: MeasureTable, options: EngineOptions) -> Self {
        Self {
            cases,
            measures,
            options,
        }
    }

    /// Loads both tables from `store`. Store failures come back unchanged.
    pub fn from_store<S: TableStore + ?Sized>(
        store: &S,
        options: EngineOptions,
    ) -> Result<Self, StoreError> {
        let measures = store.load_measure_table()?;
        let cases = store.load_case_table()?;
        Ok(Self::with_options(cases, measures, options))
    }

    pub fn cases(&self) -> &CaseTable {
        &self.cases
    }

    pub fn measures(&self) -> &MeasureTable {
        &self.measures
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Fraction of `country`'s cases that recovered.
    ///
    /// A missing `total_recovered` counts as zero here; a missing or zero
    /// `total_cases` makes the ratio undefined.
    pub fn recovery_ratio(&self, country: &str) -> Result<f64, QueryError> {
        let record = self
            .cases
            .get(country)
            .ok_or_else(|| QueryError::NotFound(country.to_string()))?;

        let total_cases = match record.total_cases {
            Some(cases) if cases > 0.0 => cases,
            Some(_) => {
                return Err(QueryError::Undefined(format!(
                    "'{}' has zero total cases",
                    country
                )))
            }
            None => {
                return Err(QueryError::Undefined(format!(
                    "'{}' has no total cases",
                    country
                )))
            }
        };

        Ok(record.total_recovered.unwrap_or(0.0) / total_cases)
    }

    /// Average cases-per-death over the countries that adopted `measure`.
    ///
    /// Adopters without a case row, without both counts, or with zero deaths
    /// are skipped. What they contribute to the divisor depends on
    /// [`EngineOptions::death_rate_divisor`].
    pub fn average_death_rate(&self, measure: &str) -> Result<f64, QueryError> {
        let adopters = self.measures.adopters(measure);
        if adopters.is_empty() {
            return Err(QueryError::NoAdopters(measure.to_string()));
        }

        let mut rates = Vec::with_capacity(adopters.len());
        for adopter in &adopters {
            let Some(record) = self.cases.get(&adopter.country) else {
                debug!(measure, country = %adopter.country, "adopter has no case row, skipped");
                continue;
            };
            match (record.total_cases, record.total_deaths) {
                (Some(cases), Some(deaths)) if deaths > 0.0 => rates.push(cases / deaths),
                _ => {
                    debug!(measure, country = %adopter.country, "adopter has no usable death rate, skipped");
                }
            }
        }

        if rates.is_empty() {
            return Err(QueryError::Undefined(format!(
                "no adopter of '{}' has usable case and death counts",
                measure
            )));
        }

        let average = match self.options.death_rate_divisor {
            DeathRateDivisor::AllAdopters => rates.iter().sum::<f64>() / adopters.len() as f64,
            DeathRateDivisor::Retained => rates.as_slice().mean(),
        };
        Ok(average)
    }

    /// The `k` most adopted measures with their pooled recovery efficiency,
    /// most adopted first.
    ///
    /// Measures with equal adoption counts keep the order in which they first
    /// appear in the Measure Table. An undefined efficiency only affects its
    /// own entry.
    pub fn top_measures_efficiency(&self, k: usize) -> Vec<MeasureEfficiency> {
        self.most_adopted(k)
            .into_iter()
            .map(|(measure, adoptions)| MeasureEfficiency {
                efficiency: self.pooled_recovery(measure),
                measure: measure.to_string(),
                adoptions,
            })
            .collect()
    }

    fn most_adopted(&self, k: usize) -> Vec<(&str, usize)> {
        let names = || {
            self.measures
                .rows()
                .iter()
                .map(|r| r.measure.as_str())
                .filter(|m| !m.is_empty())
        };
        let counts = names().counts();

        // unique() yields first-appearance order and the sort is stable,
        // so ties stay in that order.
        names()
            .unique()
            .map(|measure| (measure, counts[measure]))
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .take(k)
            .collect()
    }

    fn pooled_recovery(&self, measure: &str) -> Result<f64, QueryError> {
        let mut sum_recovered = 0.0;
        let mut sum_cases = 0.0;

        for adopter in self.measures.adopters(measure) {
            let Some(record) = self.cases.get(&adopter.country) else {
                continue;
            };
            if let (Some(recovered), Some(cases)) = (record.total_recovered, record.total_cases) {
                sum_recovered += recovered;
                sum_cases += cases;
            }
        }

        if sum_cases == 0.0 {
            return Err(QueryError::Undefined(format!(
                "adopters of '{}' have no total cases",
                measure
            )));
        }
        Ok(sum_recovered / sum_cases)
    }
}
