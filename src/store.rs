//! Table Store: materializes the Case Table and the Measure Table from a
//! backing source.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::clean::count_incomplete;
use crate::error::StoreError;
use crate::models::{CaseRecord, MeasureRecord};
use crate::table::{CaseColumn, CaseTable, MeasureTable, Row, Table};

pub trait TableStore {
    fn load_case_table(&self) -> Result<CaseTable, StoreError>;
    fn load_measure_table(&self) -> Result<MeasureTable, StoreError>;
}

/// Where a CSV table comes from.
#[derive(Debug, Clone)]
pub enum CsvSource {
    Path(PathBuf),
    Buffer { name: String, data: Vec<u8> },
}

impl CsvSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        CsvSource::Path(path.into())
    }

    pub fn buffer(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        CsvSource::Buffer {
            name: name.into(),
            data: data.into(),
        }
    }

    fn open(&self) -> Result<Box<dyn Read + '_>, StoreError> {
        match self {
            CsvSource::Path(path) => match File::open(path) {
                Ok(file) => Ok(Box::new(file)),
                Err(error) if error.kind() == io::ErrorKind::NotFound => {
                    Err(StoreError::SourceNotFound(self.to_string()))
                }
                Err(error) => Err(StoreError::SourceUnreadable {
                    source_name: self.to_string(),
                    error,
                }),
            },
            CsvSource::Buffer { data, .. } => Ok(Box::new(data.as_slice())),
        }
    }
}

impl fmt::Display for CsvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvSource::Path(path) => write!(f, "{}", path.display()),
            CsvSource::Buffer { name, .. } => write!(f, "{}", name),
        }
    }
}

/// Reads both tables from headed CSV sources.
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    cases: CsvSource,
    measures: CsvSource,
}

impl CsvTableStore {
    pub fn new(cases: CsvSource, measures: CsvSource) -> Self {
        Self { cases, measures }
    }

    pub fn from_paths(cases: impl Into<PathBuf>, measures: impl Into<PathBuf>) -> Self {
        Self::new(CsvSource::path(cases), CsvSource::path(measures))
    }
}

impl TableStore for CsvTableStore {
    fn load_case_table(&self) -> Result<CaseTable, StoreError> {
        let records: Vec<CaseRecord> = read_records(&self.cases, &CaseRecord::COLUMNS)?;
        debug!(
            source = %self.cases,
            incomplete = count_incomplete(&records),
            "case records with missing counts"
        );
        let table = Table::new(records);
        warn_duplicate_countries(&table, &self.cases);
        info!(source = %self.cases, rows = table.len(), "loaded case table");
        Ok(table)
    }

    fn load_measure_table(&self) -> Result<MeasureTable, StoreError> {
        let records: Vec<MeasureRecord> = read_records(&self.measures, &MeasureRecord::COLUMNS)?;
        let table = Table::new(records);
        info!(source = %self.measures, rows = table.len(), "loaded measure table");
        Ok(table)
    }
}

/// Serves tables from records already in memory, e.g. generated data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub cases: Vec<CaseRecord>,
    pub measures: Vec<MeasureRecord>,
}

impl InMemoryStore {
    pub fn new(cases: Vec<CaseRecord>, measures: Vec<MeasureRecord>) -> Self {
        Self { cases, measures }
    }
}

impl TableStore for InMemoryStore {
    fn load_case_table(&self) -> Result<CaseTable, StoreError> {
        if self.cases.is_empty() {
            return Err(StoreError::SourceEmpty("in-memory cases".to_string()));
        }
        Ok(Table::new(self.cases.clone()))
    }

    fn load_measure_table(&self) -> Result<MeasureTable, StoreError> {
        if self.measures.is_empty() {
            return Err(StoreError::SourceEmpty("in-memory measures".to_string()));
        }
        Ok(Table::new(self.measures.clone()))
    }
}

fn read_records<T: DeserializeOwned + Row>(
    source: &CsvSource,
    required: &[&str],
) -> Result<Vec<T>, StoreError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(source.open()?);

    let headers = rdr
        .headers()
        .map_err(|e| csv_error(source, e))?
        .clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(StoreError::SourceEmpty(source.to_string()));
    }

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(StoreError::SourceMalformed {
            source_name: source.to_string(),
            reason: format!("missing required column(s): {}", missing.join(", ")),
        });
    }

    let mut records = Vec::new();
    let mut blank = 0;
    for result in rdr.deserialize() {
        let record: T = result.map_err(|e| csv_error(source, e))?;
        if record.has_blank_key() {
            blank += 1;
            continue;
        }
        records.push(record);
    }
    if blank > 0 {
        debug!(source = %source, rows = blank, "dropped rows with a blank key cell");
    }

    if records.is_empty() {
        return Err(StoreError::SourceEmpty(source.to_string()));
    }
    Ok(records)
}

fn csv_error(source: &CsvSource, err: csv::Error) -> StoreError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(error) => StoreError::SourceUnreadable {
            source_name: source.to_string(),
            error,
        },
        _ => StoreError::SourceMalformed {
            source_name: source.to_string(),
            reason,
        },
    }
}

fn warn_duplicate_countries(table: &CaseTable, source: &CsvSource) {
    for country in table.duplicated_keys(CaseColumn::Country) {
        warn!(source = %source, country, "duplicate case rows, using the first");
    }
}
