//! End-to-end integration tests
//!
//! These tests run the complete file-to-output pipeline on the CSV fixtures under
//! tests/fixtures/. Each fixture directory holds:
//! 1. `input.csv` - the file to process
//! 2. `options.json` (optional) - reader options, defaults when absent
//! 3. one or more expected outputs: `expected.txt`, `expected.jsonl`, `expected.csv`
//!
//! Every expected output present is checked, once with the synchronous strategy and
//! once with the async strategy.

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_csv_engine::cli::{OutputFormat, StrategyType};
    use rust_csv_engine::config::CsvOptions;
    use rust_csv_engine::strategy::create_strategy;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    const EXPECTED_FILES: [(&str, OutputFormat); 3] = [
        ("expected.txt", OutputFormat::Text),
        ("expected.jsonl", OutputFormat::Json),
        ("expected.csv", OutputFormat::Csv),
    ];

    /// Run a fixture and compare every expected output that exists
    ///
    /// # Panics
    ///
    /// Panics if the fixture has no input or no expected output, if processing
    /// fails, or if an output does not match byte for byte.
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType) {
        let fixture_dir = Path::new("tests/fixtures").join(fixture_name);
        let input_path = fixture_dir.join("input.csv");
        assert!(
            input_path.exists(),
            "Input file not found: {}",
            input_path.display()
        );

        let options_path = fixture_dir.join("options.json");
        let options = if options_path.exists() {
            CsvOptions::from_json_file(&options_path)
                .unwrap_or_else(|e| panic!("Failed to load options: {}", e))
        } else {
            CsvOptions::default()
        };
        let config = options
            .build()
            .unwrap_or_else(|e| panic!("Invalid options for {}: {}", fixture_name, e));

        let mut checked = 0;
        for (file_name, format) in EXPECTED_FILES {
            let expected_path = fixture_dir.join(file_name);
            if !expected_path.exists() {
                continue;
            }

            let strategy = create_strategy(strategy_type, config.clone(), format);
            let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");
            strategy
                .process(&input_path, &mut temp_output)
                .unwrap_or_else(|e| panic!("Failed to process {}: {}", fixture_name, e));
            temp_output.flush().expect("Failed to flush temp file");

            let actual_output = fs::read(temp_output.path())
                .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
            let expected_output = fs::read(&expected_path).unwrap_or_else(|e| {
                panic!(
                    "Failed to read expected file {}: {}",
                    expected_path.display(),
                    e
                )
            });

            assert_eq!(
                String::from_utf8_lossy(&actual_output),
                String::from_utf8_lossy(&expected_output),
                "\n\nOutput mismatch for fixture: {} (strategy: {:?}, format: {:?})\n",
                fixture_name,
                strategy_type,
                format
            );
            checked += 1;
        }

        assert!(checked > 0, "No expected output in fixture {}", fixture_name);
    }

    /// End-to-end test for all fixtures with both strategies
    #[rstest]
    #[case("basic")]
    #[case("quoted_multiline")]
    #[case("duplicate_headers")]
    #[case("comments_and_blank_lines")]
    #[case("multi_char_delimiter")]
    #[case("lenient_bad_data")]
    #[case("trimmed_fields")]
    #[case("pinned_new_line")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy);
    }

    #[rstest]
    fn test_unrecovered_bad_data_fails(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let config = CsvOptions::default().build().unwrap();
        let strategy = create_strategy(strategy, config, OutputFormat::Json);
        let mut output = Vec::new();

        let error = strategy
            .process(
                Path::new("tests/fixtures/lenient_bad_data/input.csv"),
                &mut output,
            )
            .unwrap_err();
        assert!(error.is_data_error());
        assert_eq!(error.row(), Some(2));
    }
}
