//! Shared utilities for the cleaning stages.
//!
//! Dtype classification, cell access and the text mode. Numeric statistics
//! come straight from Polars aggregations on a `Float64Chunked`.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a native date or datetime type.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

// =============================================================================
// Series Access Utilities
// =============================================================================

/// Render every cell of a Series as an optional string.
pub fn string_cells(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let as_str = series.cast(&DataType::String)?;
    Ok(as_str
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Read every cell of a numeric Series as an optional f64.
pub fn float_cells(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let as_float = series.cast(&DataType::Float64)?;
    Ok(as_float.f64()?.into_iter().collect())
}

/// A numeric Series as a `Float64Chunked`, ready for Polars aggregations.
pub fn float_column(series: &Series) -> PolarsResult<Float64Chunked> {
    Ok(series.cast(&DataType::Float64)?.f64()?.clone())
}

/// Replace NaN cells of a float Series with nulls, keeping its dtype.
///
/// Returns `None` when the Series is not a float Series or holds no NaN.
pub fn nan_to_null(series: &Series) -> PolarsResult<Option<Series>> {
    if !matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
        return Ok(None);
    }

    let values = &float_column(series)?;
    if !values.into_iter().any(|v| v.is_some_and(f64::is_nan)) {
        return Ok(None);
    }

    let cleaned: Vec<Option<f64>> = values
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    let cleaned = Series::new(series.name().clone(), cleaned).cast(series.dtype())?;
    Ok(Some(cleaned))
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent non-missing value of a Series, rendered as a string.
///
/// Ties go to the value that appears first in row order.
pub fn string_mode(series: &Series) -> PolarsResult<Option<String>> {
    let cells = string_cells(series)?;

    // value -> (count, first row index)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (idx, value) in cells.into_iter().enumerate() {
        if let Some(value) = value {
            counts.entry(value).or_insert((0, idx)).0 += 1;
        }
    }

    Ok(counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value))
}

// =============================================================================
// Tests
// =============================================================================
