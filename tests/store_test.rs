#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use covid_analytics::{
        CsvSource, CsvTableStore, Engine, EngineOptions, QueryError, StoreError, TableStore,
    };
    use tempfile::TempDir;

    const CASES: &str = "\
country,total_cases,total_deaths,total_recovered
United States,100,10,50
France,200,20,100
Germany,,5,
";

    const MEASURES: &str = "\
country,measure
United States,lockdown
France,lockdown
Germany,masks
France,masks
";

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_engine_from_csv_files() {
        let dir = TempDir::new().unwrap();
        let store = CsvTableStore::from_paths(
            write(&dir, "cases.csv", CASES),
            write(&dir, "measures.csv", MEASURES),
        );

        let engine = Engine::from_store(&store, EngineOptions::default()).unwrap();
        assert_eq!(engine.recovery_ratio("United States"), Ok(0.5));
        assert!(matches!(engine.recovery_ratio("Germany"), Err(QueryError::Undefined(_))));
        assert_eq!(engine.average_death_rate("lockdown"), Ok(10.0));
        // Germany has no case count, so only France contributes: 10 / 2 adopters.
        assert_eq!(engine.average_death_rate("masks"), Ok(5.0));

        let ranked: Vec<String> = engine
            .top_measures_efficiency(5)
            .into_iter()
            .map(|e| e.measure)
            .collect();
        assert_eq!(ranked, vec!["lockdown", "masks"]);
    }

    #[test]
    fn test_missing_file_is_source_not_found() {
        let dir = TempDir::new().unwrap();
        let store = CsvTableStore::from_paths(
            dir.path().join("nope.csv"),
            write(&dir, "measures.csv", MEASURES),
        );
        assert!(matches!(store.load_case_table(), Err(StoreError::SourceNotFound(_))));
        assert!(matches!(
            Engine::from_store(&store, EngineOptions::default()),
            Err(StoreError::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_empty_file_is_source_empty() {
        let dir = TempDir::new().unwrap();
        let store = CsvTableStore::from_paths(
            write(&dir, "cases.csv", ""),
            write(&dir, "measures.csv", "country,measure\n"),
        );
        assert!(matches!(store.load_case_table(), Err(StoreError::SourceEmpty(_))));
        assert!(matches!(store.load_measure_table(), Err(StoreError::SourceEmpty(_))));
    }

    #[test]
    fn test_missing_column_is_source_malformed() {
        let dir = TempDir::new().unwrap();
        let store = CsvTableStore::from_paths(
            write(&dir, "cases.csv", CASES),
            write(&dir, "measures.csv", "country,Measure\nFrance,masks\n"),
        );
        match store.load_measure_table() {
            Err(StoreError::SourceMalformed { reason, .. }) => assert!(reason.contains("measure")),
            other => panic!("Expected SourceMalformed, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_source_unreadable() {
        let dir = TempDir::new().unwrap();
        let store = CsvTableStore::from_paths(dir.path(), dir.path());
        assert!(matches!(
            store.load_case_table(),
            Err(StoreError::SourceUnreadable { .. })
        ));
    }

    #[test]
    fn test_blank_measures_are_never_ranked() {
        let dir = TempDir::new().unwrap();
        let store = CsvTableStore::from_paths(
            write(&dir, "cases.csv", CASES),
            write(
                &dir,
                "measures.csv",
                "country,measure\nUnited States,\nFrance,\nGermany,\nUnited States,lockdown\nFrance,lockdown\n",
            ),
        );
        let engine = Engine::from_store(&store, EngineOptions::default()).unwrap();

        let ranked: Vec<(String, usize)> = engine
            .top_measures_efficiency(5)
            .into_iter()
            .map(|e| (e.measure, e.adoptions))
            .collect();
        assert_eq!(ranked, vec![("lockdown".to_string(), 2)]);
        assert_eq!(
            engine.average_death_rate(""),
            Err(QueryError::NoAdopters(String::new()))
        );
    }

    #[test]
    fn test_buffer_source() {
        let store = CsvTableStore::new(
            CsvSource::buffer("cases", CASES),
            CsvSource::buffer("measures", MEASURES),
        );
        let measures = store.load_measure_table().unwrap();
        assert_eq!(measures.measures_of("France"), vec!["lockdown", "masks"]);
    }
}
