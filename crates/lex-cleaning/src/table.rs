//! The in-memory table the pipeline operates on.
//!
//! A [`Table`] is a Polars `DataFrame` plus an explicit [`ColumnKind`] per
//! column. Kinds are assigned once on ingestion and only change where a stage
//! rewrites a column (date parsing, imputation of unknown columns, encoding).

use crate::error::{CleaningError, Result};
use crate::utils::{is_numeric_dtype, is_temporal_dtype, nan_to_null};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// How the pipeline treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Integer or floating point values
    Numeric,
    /// Free text or categorical labels
    Text,
    /// Canonical `YYYY-MM-DD` strings written by the date normalizer
    Date,
    /// Anything else (boolean, native temporal, nested)
    Unknown,
}

impl ColumnKind {
    /// Classify a Polars dtype on ingestion.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            ColumnKind::Numeric
        } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
            ColumnKind::Text
        } else {
            ColumnKind::Unknown
        }
    }
}

/// A rectangular dataset with a kind per column.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    kinds: HashMap<String, ColumnKind>,
}

impl Table {
    /// Wrap a DataFrame, classifying every column.
    ///
    /// Categorical columns are cast to plain strings so text stages see a
    /// single representation. Floating point NaN becomes a missing cell.
    pub fn new(frame: DataFrame) -> Result<Self> {
        let mut kinds = HashMap::with_capacity(frame.width());
        let mut columns = Vec::with_capacity(frame.width());

        for column in frame.get_columns() {
            let kind = ColumnKind::from_dtype(column.dtype());
            let column = if matches!(column.dtype(), DataType::Categorical(_, _)) {
                column.cast(&DataType::String)?
            } else if let Some(cleaned) = nan_to_null(column.as_materialized_series())? {
                debug!(
                    "Column '{}': {} NaN values treated as missing",
                    column.name(),
                    cleaned.null_count() - column.null_count()
                );
                Column::from(cleaned)
            } else {
                column.clone()
            };
            kinds.insert(column.name().to_string(), kind);
            columns.push(column);
        }

        let frame = if columns.is_empty() {
            frame
        } else {
            DataFrame::new(columns)?
        };

        Ok(Self { frame, kinds })
    }

    /// The underlying DataFrame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume the table, returning the underlying DataFrame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Kind of a column, if it exists.
    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.kinds.get(name).copied()
    }

    /// Names of all columns of the given kind, in table order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| self.kind(name) == Some(kind))
            .collect()
    }

    /// A column as a Series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        Ok(self.frame.column(name)?.as_materialized_series())
    }

    /// Rename every column, in order.
    pub(crate) fn rename_all(&mut self, names: &[String]) -> Result<()> {
        if names.len() != self.width() {
            return Err(CleaningError::Schema(format!(
                "expected {} column names, got {}",
                self.width(),
                names.len()
            )));
        }

        let mut kinds = HashMap::with_capacity(names.len());
        let mut columns = Vec::with_capacity(names.len());
        for (column, name) in self.frame.get_columns().iter().zip(names) {
            let kind = self
                .kinds
                .get(column.name().as_str())
                .copied()
                .unwrap_or(ColumnKind::Unknown);
            kinds.insert(name.clone(), kind);
            let series = column
                .as_materialized_series()
                .clone()
                .with_name(name.as_str().into());
            columns.push(Column::from(series));
        }

        if !columns.is_empty() {
            self.frame = DataFrame::new(columns)?;
        }
        self.kinds = kinds;
        Ok(())
    }

    /// Replace an existing column in place, setting its kind.
    pub(crate) fn replace_column(&mut self, series: Series, kind: ColumnKind) -> Result<()> {
        let name = series.name().to_string();
        self.frame.replace(&name, series)?;
        self.kinds.insert(name, kind);
        Ok(())
    }

    /// Append a new column at the end of the table.
    pub(crate) fn push_column(&mut self, series: Series, kind: ColumnKind) -> Result<()> {
        let name = series.name().to_string();
        if self.kinds.contains_key(&name) {
            return Err(CleaningError::Schema(format!(
                "column '{}' already exists",
                name
            )));
        }
        self.frame.with_column(series)?;
        self.kinds.insert(name, kind);
        Ok(())
    }

    /// Remove columns by name.
    pub(crate) fn drop_columns(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        let to_drop: Vec<PlSmallStr> = names.iter().map(|n| n.as_str().into()).collect();
        self.frame = self.frame.drop_many(to_drop);
        for name in names {
            self.kinds.remove(name);
        }
    }

    /// Keep only the rows where `mask` is true.
    pub(crate) fn filter_rows(&mut self, mask: &[bool]) -> Result<()> {
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        self.frame = self.frame.filter(&mask)?;
        Ok(())
    }

    /// Swap in a frame holding a subset of the current rows.
    ///
    /// The schema must be unchanged so column kinds stay valid.
    pub(crate) fn replace_rows(&mut self, frame: DataFrame) -> Result<()> {
        if frame.get_column_names() != self.frame.get_column_names() {
            return Err(CleaningError::Schema(
                "row subset does not match the table's columns".to_string(),
            ));
        }
        self.frame = frame;
        Ok(())
    }

    /// Whether a column holds native date or datetime values.
    pub(crate) fn is_temporal(&self, name: &str) -> Result<bool> {
        Ok(is_temporal_dtype(self.frame.column(name)?.dtype()))
    }
}

impl TryFrom<DataFrame> for Table {
    type Error = CleaningError;

    fn try_from(frame: DataFrame) -> Result<Self> {
        Table::new(frame)
    }
}
