use serde::{Deserialize, Serialize};

use crate::clean::lenient_count;

/// One row of the Case Table.
///
/// Counts are `None` when the source cell was empty or held something that is
/// not a usable non-negative number. They are never defaulted to zero here;
/// each query decides how to treat a missing count.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CaseRecord {
    pub country: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_cases: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_deaths: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_recovered: Option<f64>,
}

impl CaseRecord {
    pub const COLUMNS: [&'static str; 4] =
        ["country", "total_cases", "total_deaths", "total_recovered"];

    pub fn new(
        country: impl Into<String>,
        total_cases: Option<f64>,
        total_deaths: Option<f64>,
        total_recovered: Option<f64>,
    ) -> Self {
        Self {
            country: country.into(),
            total_cases,
            total_deaths,
            total_recovered,
        }
    }
}

/// One (country, measure) adoption row of the Measure Table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MeasureRecord {
    pub country: String,
    pub measure: String,
}

impl MeasureRecord {
    pub const COLUMNS: [&'static str; 2] = ["country", "measure"];

    pub fn new(country: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            measure: measure.into(),
        }
    }
}
