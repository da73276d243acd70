//! Cross-table analytics over pandemic case counts and adopted mitigation
//! measures.
//!
//! A [`TableStore`] yields the Case Table and the Measure Table; the
//! [`Engine`] joins them by exact country name to answer:
//!
//! - [`Engine::recovery_ratio`]: recovered / total cases for one country
//! - [`Engine::average_death_rate`]: mean cases-per-death among adopters of a
//!   measure (note the inverted orientation)
//! - [`Engine::top_measures_efficiency`]: pooled recovery ratio for the most
//!   adopted measures

pub mod clean;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod report;
pub mod store;
pub mod table;

pub use config::Settings;
pub use engine::{DeathRateDivisor, Engine, EngineOptions, MeasureEfficiency, DEFAULT_TOP_K};
pub use error::{Error, QueryError, Result, StoreError};
pub use models::{CaseRecord, MeasureRecord};
pub use store::{CsvSource, CsvTableStore, InMemoryStore, TableStore};
pub use table::{CaseColumn, CaseTable, MeasureColumn, MeasureTable, Table};
