//! Column-level stages: name normalization and missing-value pruning.

use super::Stage;
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::pipeline::CleaningStage;
use crate::table::Table;
use std::collections::HashMap;
use tracing::debug;

/// Lowercases every column name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnNormalizer;

impl Stage for ColumnNormalizer {
    fn id(&self) -> CleaningStage {
        CleaningStage::ColumnNormalization
    }

    fn apply(&self, mut table: Table, _config: &CleaningConfig) -> Result<Table> {
        let original = table.column_names();
        let lowered: Vec<String> = original.iter().map(|name| name.to_lowercase()).collect();

        if original == lowered {
            return Ok(table);
        }

        let mut seen: HashMap<&str, &str> = HashMap::with_capacity(lowered.len());
        for (lower, name) in lowered.iter().zip(&original) {
            if let Some(previous) = seen.insert(lower.as_str(), name.as_str()) {
                return Err(CleaningError::Schema(format!(
                    "columns '{}' and '{}' both normalize to '{}'",
                    previous, name, lower
                )));
            }
        }

        table.rename_all(&lowered)?;
        debug!("Normalized {} column names", original.len());
        Ok(table)
    }
}

/// Drops columns whose fraction of missing values exceeds the threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnPruner;

impl Stage for ColumnPruner {
    fn id(&self) -> CleaningStage {
        CleaningStage::ColumnPruning
    }

    fn apply(&self, mut table: Table, config: &CleaningConfig) -> Result<Table> {
        let rows = table.height();
        if rows == 0 {
            return Ok(table);
        }

        let mut to_drop = Vec::new();
        for column in table.frame().get_columns() {
            let fraction = column.null_count() as f64 / rows as f64;
            if fraction > config.missing_threshold {
                debug!(
                    "Dropping column '{}' ({:.1}% missing > {:.1}%)",
                    column.name(),
                    fraction * 100.0,
                    config.missing_threshold * 100.0
                );
                to_drop.push(column.name().to_string());
            }
        }

        table.drop_columns(&to_drop);
        Ok(table)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;
    use polars::prelude::*;

    #[test]
    fn test_normalizer_lowercases_names() {
        let df = df![
            "ID" => &[1i64, 2],
            "Name" => &["a", "b"],
            "date_Joined" => &["2024-01-01", "2024-01-02"],
        ]
        .unwrap();
        let table = Table::new(df).unwrap();

        let result = ColumnNormalizer
            .apply(table, &CleaningConfig::default())
            .unwrap();

        assert_eq!(
            result.column_names(),
            vec!["id".to_string(), "name".to_string(), "date_joined".to_string()]
        );
        assert_eq!(result.kind("id"), Some(ColumnKind::Numeric));
        assert_eq!(result.kind("name"), Some(ColumnKind::Text));
    }

    #[test]
    fn test_normalizer_rejects_collisions() {
        let df = df![
            "Name" => &["a", "b"],
            "NAME" => &["c", "d"],
        ]
        .unwrap();
        let table = Table::new(df).unwrap();

        let result = ColumnNormalizer.apply(table, &CleaningConfig::default());
        assert!(matches!(result, Err(CleaningError::Schema(_))));
    }

    #[test]
    fn test_normalizer_keeps_data() {
        let df = df!["Score" => &[1.5f64, 2.5]].unwrap();
        let table = Table::new(df).unwrap();

        let result = ColumnNormalizer
            .apply(table, &CleaningConfig::default())
            .unwrap();

        let values: Vec<Option<f64>> = result
            .series("score")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(1.5), Some(2.5)]);
    }

    #[test]
    fn test_pruner_drops_columns_above_threshold() {
        let df = df![
            "mostly_missing" => &[Some(1i64), None, None, None, Some(5)],
            "half" => &[Some(1i64), None, None, Some(4), Some(5)],
            "full" => &[1i64, 2, 3, 4, 5],
        ]
        .unwrap();
        let table = Table::new(df).unwrap();

        let result = ColumnPruner
            .apply(table, &CleaningConfig::default())
            .unwrap();

        // 60% missing is dropped, 40% is kept
        assert_eq!(
            result.column_names(),
            vec!["half".to_string(), "full".to_string()]
        );
    }

    #[test]
    fn test_pruner_threshold_is_exclusive() {
        let df = df!["col" => &[Some("a"), None]].unwrap();
        let table = Table::new(df).unwrap();

        let result = ColumnPruner
            .apply(table, &CleaningConfig::default())
            .unwrap();

        assert_eq!(result.width(), 1);
    }

    #[test]
    fn test_pruner_zero_threshold_drops_any_missing() {
        let df = df![
            "a" => &[Some(1i64), None, Some(3)],
            "b" => &[1i64, 2, 3],
        ]
        .unwrap();
        let table = Table::new(df).unwrap();
        let config = CleaningConfig::builder()
            .missing_threshold(0.0)
            .build()
            .unwrap();

        let result = ColumnPruner.apply(table, &config).unwrap();
        assert_eq!(result.column_names(), vec!["b".to_string()]);
    }

    #[test]
    fn test_pruner_empty_table_drops_nothing() {
        let df = df!["a" => Vec::<Option<i64>>::new()].unwrap();
        let table = Table::new(df).unwrap();

        let result = ColumnPruner
            .apply(table, &CleaningConfig::default())
            .unwrap();
        assert_eq!(result.width(), 1);
    }
}
