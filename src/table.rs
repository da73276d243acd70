//! Immutable, indexed tables.
//!
//! Every key column gets a value → row-positions index at construction, so a
//! keyed lookup costs one hash probe plus the number of matches. Matches are
//! always returned in original row order.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::models::{CaseRecord, MeasureRecord};

/// A row type that can be looked up by string key columns.
pub trait Row {
    type Column: Copy + Eq + Hash + Debug + 'static;

    /// Columns that get an index when the table is built.
    const KEY_COLUMNS: &'static [Self::Column];

    fn key(&self, column: Self::Column) -> &str;

    /// True when any key cell is empty. Such a row can never be joined.
    fn has_blank_key(&self) -> bool {
        Self::KEY_COLUMNS.iter().any(|&column| self.key(column).is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseColumn {
    Country,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureColumn {
    Country,
    Measure,
}

impl Row for CaseRecord {
    type Column = CaseColumn;
    const KEY_COLUMNS: &'static [CaseColumn] = &[CaseColumn::Country];

    fn key(&self, column: CaseColumn) -> &str {
        match column {
            CaseColumn::Country => &self.country,
        }
    }
}

impl Row for MeasureRecord {
    type Column = MeasureColumn;
    const KEY_COLUMNS: &'static [MeasureColumn] = &[MeasureColumn::Country, MeasureColumn::Measure];

    fn key(&self, column: MeasureColumn) -> &str {
        match column {
            MeasureColumn::Country => &self.country,
            MeasureColumn::Measure => &self.measure,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table<R: Row> {
    rows: Vec<R>,
    indexes: HashMap<R::Column, HashMap<String, Vec<usize>>>,
}

pub type CaseTable = Table<CaseRecord>;
pub type MeasureTable = Table<MeasureRecord>;

impl<R: Row> Table<R> {
    pub fn new(rows: Vec<R>) -> Self {
        let mut indexes = HashMap::new();
        for &column in R::KEY_COLUMNS {
            let mut index: HashMap<String, Vec<usize>> = HashMap::new();
            for (position, row) in rows.iter().enumerate() {
                index
                    .entry(row.key(column).to_string())
                    .or_default()
                    .push(position);
            }
            indexes.insert(column, index);
        }

        Self { rows, indexes }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose `column` equals `value` byte-for-byte, in table order.
    /// An empty result means "no match", which is not an error.
    pub fn lookup(&self, column: R::Column, value: &str) -> Vec<&R> {
        self.indexes
            .get(&column)
            .and_then(|index| index.get(value))
            .map(|positions| positions.iter().map(|&i| &self.rows[i]).collect())
            .unwrap_or_default()
    }

    /// Distinct values of `column` that occur more than once.
    pub fn duplicated_keys(&self, column: R::Column) -> Vec<&str> {
        let Some(index) = self.indexes.get(&column) else {
            return Vec::new();
        };
        let mut duplicated: Vec<(usize, &str)> = index
            .iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(key, positions)| (positions[0], key.as_str()))
            .collect();
        duplicated.sort_unstable();
        duplicated.into_iter().map(|(_, key)| key).collect()
    }
}

impl CaseTable {
    /// The case record for `country`. With duplicate rows the first one wins.
    pub fn get(&self, country: &str) -> Option<&CaseRecord> {
        self.lookup(CaseColumn::Country, country).into_iter().next()
    }
}

impl MeasureTable {
    /// Adoption rows for `measure`, in table order.
    pub fn adopters(&self, measure: &str) -> Vec<&MeasureRecord> {
        self.lookup(MeasureColumn::Measure, measure)
    }

    /// Every measure adopted by `country`, in table order.
    pub fn measures_of(&self, country: &str) -> Vec<&str> {
        self.lookup(MeasureColumn::Country, country)
            .into_iter()
            .map(|r| r.measure.as_str())
            .collect()
    }
}
