//! TOML configuration.
//!
//! Every section is optional. Example:
//! ```toml
//! [sources]
//! cases = "covid_cases_stats.csv"
//! measures = "covid_safety_measures.csv"
//!
//! [analysis]
//! top_k = 5
//! death_rate_divisor = "all_adopters"  # or "retained"
//!
//! [report]
//! chart = "efficiency.png"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{DeathRateDivisor, EngineOptions, DEFAULT_TOP_K};

pub const DEFAULT_CONFIG_FILE: &str = "covid.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub sources: SourceSettings,
    pub analysis: AnalysisSettings,
    pub report: ReportSettings,
}

/// Paths of the two CSV tables.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSettings {
    pub cases: PathBuf,
    pub measures: PathBuf,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            cases: PathBuf::from("covid_cases_stats.csv"),
            measures: PathBuf::from("covid_safety_measures.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// How many of the most adopted measures to rank.
    pub top_k: usize,

    pub death_rate_divisor: DeathRateDivisor,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            death_rate_divisor: DeathRateDivisor::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Where to write the efficiency bar chart, if anywhere.
    pub chart: Option<PathBuf>,
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Loads `path` if given (it must exist), otherwise `covid.toml` when
    /// present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let local_config = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        Ok(Settings::default())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            death_rate_divisor: self.analysis.death_rate_divisor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.sources.cases, PathBuf::from("covid_cases_stats.csv"));
        assert_eq!(settings.sources.measures, PathBuf::from("covid_safety_measures.csv"));
        assert_eq!(settings.analysis.top_k, 5);
        assert_eq!(settings.analysis.death_rate_divisor, DeathRateDivisor::AllAdopters);
        assert!(settings.report.chart.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [analysis]
            death_rate_divisor = "retained"
            "#,
        )
        .unwrap();
        assert_eq!(settings.analysis.death_rate_divisor, DeathRateDivisor::Retained);
        assert_eq!(settings.analysis.top_k, 5);
        assert_eq!(settings.sources, SourceSettings::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [sources]
            cases = "data/cases.csv"
            measures = "data/measures.csv"

            [analysis]
            top_k = 3

            [report]
            chart = "out.png"
            "#
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.sources.cases, PathBuf::from("data/cases.csv"));
        assert_eq!(settings.analysis.top_k, 3);
        assert_eq!(settings.report.chart, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::FileNotFound(_)));
    }

    #[test]
    fn test_unknown_divisor_is_a_parse_error() {
        let result: Result<Settings, _> = toml::from_str(
            r#"
            [analysis]
            death_rate_divisor = "median"
            "#,
        );
        assert!(result.is_err());
    }
}
