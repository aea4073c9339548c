//! Integration tests for the cleaning pipeline.
//!
//! These tests run the full stage sequence over CSV fixtures.

use lex_cleaning::utils::{float_cells, string_cells};
use lex_cleaning::{
    CleaningConfig, CleaningError, CleaningStage, ColumnKind, DateColumns, OutlierMethod,
    Pipeline, ProgressUpdate, ScalingMethod, Table, clean_dataset,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn load_table(filename: &str) -> Table {
    Table::new(load_csv(filename)).expect("Failed to classify columns")
}

fn customers_config() -> CleaningConfig {
    CleaningConfig::builder()
        .missing_threshold(0.5)
        .outlier_method(OutlierMethod::Iqr)
        .scaling_method(ScalingMethod::MinMax)
        .max_unique_for_encoding(5)
        .build()
        .unwrap()
}

fn run(table: Table, config: CleaningConfig) -> lex_cleaning::CleaningResult {
    Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(table)
        .expect("Pipeline should succeed")
}

fn floats(table: &Table, name: &str) -> Vec<f64> {
    float_cells(table.series(name).unwrap())
        .unwrap()
        .into_iter()
        .map(|v| v.expect("no missing values expected"))
        .collect()
}

fn strings(table: &Table, name: &str) -> Vec<Option<String>> {
    string_cells(table.series(name).unwrap()).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// Full Pipeline
// ============================================================================

#[test]
fn test_customers_end_to_end() {
    let result = run(load_table("customers.csv"), customers_config());
    let table = &result.table;

    assert_eq!(table.height(), 8, "one duplicate and one outlier removed");
    assert_eq!(
        table.column_names(),
        vec![
            "id".to_string(),
            "date_joined".to_string(),
            "score".to_string(),
            "name_bob".to_string(),
            "name_carol".to_string(),
            "name_dave".to_string(),
        ]
    );
}

#[test]
fn test_customers_stage_row_counts() {
    let result = run(load_table("customers.csv"), customers_config());
    let summary = &result.summary;

    let dedup = summary.stage(CleaningStage::Deduplication).unwrap();
    assert_eq!((dedup.rows_before, dedup.rows_after), (10, 9));

    let outliers = summary.stage(CleaningStage::OutlierRemoval).unwrap();
    assert_eq!((outliers.rows_before, outliers.rows_after), (9, 8));

    assert_eq!(summary.rows_before, 10);
    assert_eq!(summary.rows_after, 8);
    assert_eq!(summary.rows_removed, 2);
    assert_eq!(summary.columns_before, 4);
    assert_eq!(summary.columns_after, 6);
    assert_eq!(summary.missing_cells_after, 0);
    assert!(summary.warnings.is_empty());
    assert_eq!(summary.stages.len(), 9);
    assert!(summary.stages.iter().all(|report| !report.skipped));
}

#[test]
fn test_customers_scores_scaled_to_unit_range() {
    let result = run(load_table("customers.csv"), customers_config());
    let scores = floats(&result.table, "score");

    assert!(scores.iter().all(|v| (0.0..=1.0).contains(v)));
    assert!(scores.iter().any(|v| close(*v, 0.0)));
    assert!(scores.iter().any(|v| close(*v, 1.0)));
    // 48 on a 47..53 range
    assert!(close(scores[0], 1.0 / 6.0));

    let ids = floats(&result.table, "id");
    assert!(close(ids[0], 0.0));
    assert!(close(ids[7], 1.0));
}

#[test]
fn test_customers_dates_are_iso() {
    let result = run(load_table("customers.csv"), customers_config());

    assert_eq!(result.table.kind("date_joined"), Some(ColumnKind::Date));
    let dates: Vec<Option<String>> = [
        "2023-01-15",
        "2023-01-20",
        "2023-02-01",
        "2023-03-05",
        "2023-03-10",
        "2023-03-15",
        "2023-04-01",
        "2023-04-20",
    ]
    .iter()
    .map(|d| Some(d.to_string()))
    .collect();
    assert_eq!(strings(&result.table, "date_joined"), dates);
}

#[test]
fn test_customers_names_normalized_then_encoded() {
    let result = run(load_table("customers.csv"), customers_config());
    let table = &result.table;

    // Rows: alice, bob, carol, dave, alice, bob, carol, alice
    let expect = |name: &str, values: [i32; 8]| {
        let column: Vec<Option<i32>> = table
            .series(name)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        let values: Vec<Option<i32>> = values.into_iter().map(Some).collect();
        assert_eq!(column, values, "{}", name);
    };
    expect("name_bob", [0, 1, 0, 0, 0, 1, 0, 0]);
    expect("name_carol", [0, 0, 1, 0, 0, 0, 1, 0]);
    expect("name_dave", [0, 0, 0, 1, 0, 0, 0, 0]);
}

#[test]
fn test_json_config_file_matches_builder() {
    let config = CleaningConfig::from_json_file(fixtures_path().join("cleaning_config.json"))
        .expect("Fixture config should load");
    assert_eq!(config.outlier_method, OutlierMethod::Iqr);
    assert_eq!(config.scaling_method, ScalingMethod::MinMax);
    assert_eq!(config, customers_config());

    let from_file = run(load_table("customers.csv"), config);
    let from_builder = run(load_table("customers.csv"), customers_config());
    assert!(from_file.table.frame().equals(from_builder.table.frame()));
}

#[test]
fn test_clean_dataset_convenience() {
    let df = clean_dataset(load_csv("customers.csv"), &customers_config()).unwrap();
    assert_eq!(df.shape(), (8, 6));
}

// ============================================================================
// Missing Values
// ============================================================================

#[test]
fn test_sparse_column_pruned_and_rest_imputed() {
    let config = CleaningConfig::builder()
        .encode_categoricals(false)
        .build()
        .unwrap();
    let result = run(load_table("sparse.csv"), config);
    let table = &result.table;

    assert_eq!(
        table.column_names(),
        vec!["name".to_string(), "age".to_string(), "city".to_string()]
    );
    assert_eq!(
        result.summary.stage(CleaningStage::ColumnPruning).unwrap().columns_removed,
        vec!["notes".to_string()]
    );
    assert_eq!(result.summary.missing_cells_before, 9);
    assert_eq!(result.summary.missing_cells_after, 0);

    // Median of 25, 28, 30, 33, 35, 40, 45, 50
    let ages = floats(table, "age");
    assert!(close(ages[1], 34.0));
    assert!(close(ages[5], 34.0));

    // Mode is NY, lowercased afterwards
    assert_eq!(strings(table, "city")[3], Some("ny".to_string()));
}

#[test]
fn test_threshold_is_strictly_greater_than() {
    let config = CleaningConfig::builder()
        .missing_threshold(0.6)
        .encode_categoricals(false)
        .build()
        .unwrap();
    let result = run(load_table("sparse.csv"), config);

    assert!(result.table.column_names().contains(&"notes".to_string()));
    assert_eq!(strings(&result.table, "notes")[1], Some("vip".to_string()));
}

#[test]
fn test_all_missing_column_fails_in_imputation() {
    let df = df![
        "value" => &[1i64, 2, 3],
        "empty" => &[None::<&str>, None, None],
    ]
    .unwrap();
    let config = CleaningConfig::builder()
        .missing_threshold(1.0)
        .build()
        .unwrap();

    let err = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(Table::new(df).unwrap())
        .unwrap_err();

    assert_eq!(err.stage(), Some(CleaningStage::Imputation));
    assert_eq!(err.error_code(), "IMPUTATION_ERROR");
    assert!(err.is_user_error());
    assert!(matches!(err, CleaningError::StageFailed { .. }));
}

// ============================================================================
// Dates
// ============================================================================

#[test]
fn test_unparsable_dates_become_missing() {
    let df = df![
        "event_date" => &["2024-01-05", "not a date", "2024-02-30"],
        "amount" => &[1.0f64, 2.0, 3.0],
    ]
    .unwrap();

    let result = run(Table::new(df).unwrap(), CleaningConfig::default());

    assert_eq!(
        strings(&result.table, "event_date"),
        vec![Some("2024-01-05".to_string()), None, None]
    );
    assert_eq!(result.summary.missing_cells_after, 2);
    assert!(
        result
            .summary
            .warnings
            .iter()
            .any(|w| w.contains("2 missing cells remain"))
    );
}

#[test]
fn test_explicit_date_columns_without_date_in_name() {
    let df = df![
        "joined" => &["01/02/2024", "2024-03-04"],
        "update_date" => &["2024-05-06", "2024-07-08"],
    ]
    .unwrap();
    let config = CleaningConfig::builder()
        .date_columns(DateColumns::explicit(["Joined"]))
        .encode_categoricals(false)
        .build()
        .unwrap();

    let result = run(Table::new(df).unwrap(), config);

    assert_eq!(result.table.kind("joined"), Some(ColumnKind::Date));
    assert_eq!(
        strings(&result.table, "joined"),
        vec![Some("2024-01-02".to_string()), Some("2024-03-04".to_string())]
    );
    // Only the listed column is parsed
    assert_eq!(result.table.kind("update_date"), Some(ColumnKind::Text));
}

// ============================================================================
// Scaling and Outliers
// ============================================================================

#[test]
fn test_zero_variance_standard_scaling() {
    let df = df![
        "constant" => &[7i64, 7, 7, 7],
        "varying" => &[1.0f64, 2.0, 3.0, 4.0],
    ]
    .unwrap();
    let config = CleaningConfig::builder()
        .scaling_method(ScalingMethod::Standard)
        .build()
        .unwrap();

    let result = run(Table::new(df).unwrap(), config);

    assert_eq!(floats(&result.table, "constant"), vec![0.0; 4]);
    let varying = floats(&result.table, "varying");
    let mean: f64 = varying.iter().sum::<f64>() / varying.len() as f64;
    assert!(close(mean, 0.0));
}

#[test]
fn test_zscore_removes_extreme_row() {
    let mut values: Vec<f64> = (0..20).map(|i| 50.0 + i as f64 * 0.1).collect();
    values.push(10_000.0);
    let df = df!["reading" => values].unwrap();
    let config = CleaningConfig::builder()
        .outlier_method(OutlierMethod::ZScore)
        .build()
        .unwrap();

    let result = run(Table::new(df).unwrap(), config);

    assert_eq!(result.table.height(), 20);
    assert!(floats(&result.table, "reading").iter().all(|v| *v < 100.0));
}

#[test]
fn test_zscore_boundary_value_is_removed() {
    let mut values = vec![0.0f64; 9];
    values.push(10.0);
    let df = df!["reading" => values].unwrap();
    let config = CleaningConfig::builder()
        .outlier_method(OutlierMethod::ZScore)
        .remove_duplicates(false)
        .build()
        .unwrap();

    let result = run(Table::new(df).unwrap(), config);

    assert_eq!(result.table.height(), 9);
    assert_eq!(floats(&result.table, "reading"), vec![0.0; 9]);
}

#[test]
fn test_nan_counts_as_missing() {
    let df = df!["reading" => &[1.0f64, f64::NAN, 3.0, 4.0, 2.0]].unwrap();
    let config = CleaningConfig::builder()
        .outlier_method(OutlierMethod::Iqr)
        .build()
        .unwrap();

    let result = run(Table::new(df).unwrap(), config);

    assert_eq!(result.summary.missing_cells_before, 1);
    assert_eq!(result.summary.missing_cells_after, 0);
    assert_eq!(result.table.height(), 5);
    assert_eq!(floats(&result.table, "reading")[1], 2.5);
}

#[test]
fn test_high_row_loss_warning() {
    let df = df!["x" => &[1i64, 1, 1, 1, 2]].unwrap();
    let result = run(Table::new(df).unwrap(), CleaningConfig::default());

    assert_eq!(result.table.height(), 2);
    assert!(
        result
            .summary
            .warnings
            .iter()
            .any(|w| w.contains("High data loss"))
    );
}

// ============================================================================
// Toggles and Progress
// ============================================================================

#[test]
fn test_keep_duplicates_and_raw_text() {
    let config = CleaningConfig::builder()
        .remove_duplicates(false)
        .normalize_text(false)
        .encode_categoricals(false)
        .build()
        .unwrap();
    let result = run(load_table("customers.csv"), config);

    assert_eq!(result.table.height(), 10);
    assert_eq!(strings(&result.table, "name")[6], Some("Carol ".to_string()));
    assert!(
        result
            .summary
            .stage(CleaningStage::Deduplication)
            .unwrap()
            .skipped
    );
}

#[test]
fn test_progress_updates_cover_every_stage() {
    let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);

    Pipeline::builder()
        .config(customers_config())
        .on_progress(move |update| sink.lock().unwrap().push(update))
        .build()
        .unwrap()
        .process(load_table("customers.csv"))
        .unwrap();

    let updates = updates.lock().unwrap();
    // start + end for nine stages, then completion
    assert_eq!(updates.len(), 19);
    assert_eq!(updates.last().unwrap().stage, CleaningStage::Complete);
    assert!(
        updates
            .windows(2)
            .all(|w| w[0].progress <= w[1].progress + 1e-6)
    );
    assert!((updates.last().unwrap().progress - 1.0).abs() < f32::EPSILON);
}
