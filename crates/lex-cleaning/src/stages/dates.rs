//! Date normalization.
//!
//! Parses date-like text in a wide range of common formats and rewrites each
//! value as a canonical `YYYY-MM-DD` string. Values carrying a UTC offset are
//! converted to their UTC calendar date; naive values are taken as UTC.
//! Values that cannot be parsed become missing.

use super::Stage;
use crate::config::{CleaningConfig, DateColumns};
use crate::error::{CleaningError, Result};
use crate::pipeline::CleaningStage;
use crate::table::{ColumnKind, Table};
use crate::utils::string_cells;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::debug;

/// Date-times with an explicit offset.
const OFFSET_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
];

/// Naive date-times, taken as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Plain dates. Month-first wins over day-first for ambiguous values.
const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

// Compact YYYYMMDD - compiled once at startup
static COMPACT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}$").expect("Invalid regex: YYYYMMDD"));

/// Parse a date-like string to a UTC calendar date.
///
/// Returns `None` when no supported format matches.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    if COMPACT_DATE.is_match(value) {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok();
    }

    None
}

/// Rewrites date columns as ISO `YYYY-MM-DD` strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateNormalizer;

impl DateNormalizer {
    /// Resolve the working set of date columns against the table.
    fn resolve_columns(table: &Table, date_columns: &DateColumns) -> Vec<String> {
        match date_columns {
            DateColumns::Auto => table
                .column_names()
                .into_iter()
                .filter(|name| name.to_lowercase().contains("date"))
                .collect(),
            DateColumns::Explicit(names) => {
                let mut resolved = Vec::with_capacity(names.len());
                for name in names {
                    let name = name.to_lowercase();
                    if table.kind(&name).is_none() {
                        debug!("Date column '{}' not present, ignoring", name);
                    } else if !resolved.contains(&name) {
                        resolved.push(name);
                    }
                }
                resolved
            }
        }
    }

    /// Render a column as text ready for parsing, or `None` if it cannot hold dates.
    fn text_cells(
        table: &Table,
        name: &str,
        explicit: bool,
    ) -> Result<Option<Vec<Option<String>>>> {
        let kind = table.kind(name);
        let parseable = match kind {
            Some(ColumnKind::Text) | Some(ColumnKind::Date) => true,
            Some(ColumnKind::Unknown) => table.is_temporal(name)?,
            _ => false,
        };

        if !parseable {
            if explicit {
                return Err(CleaningError::Schema(format!(
                    "date column '{}' has kind {:?}, expected text or a native date",
                    name,
                    kind.unwrap_or(ColumnKind::Unknown)
                )));
            }
            debug!("Skipping auto-detected date column '{}' ({:?})", name, kind);
            return Ok(None);
        }

        let series = table.series(name)?;
        match series.dtype() {
            DataType::Datetime(unit, _) => Ok(Some(utc_dates(series, *unit)?)),
            _ => Ok(Some(string_cells(series)?)),
        }
    }
}

/// UTC calendar date of every instant in a native datetime column.
///
/// The column's time zone only affects display in Polars; the stored values
/// are UTC ticks.
fn utc_dates(series: &Series, unit: TimeUnit) -> Result<Vec<Option<String>>> {
    let physical = series.to_physical_repr();
    let ticks = physical.i64()?;

    Ok(ticks
        .into_iter()
        .map(|tick| {
            let tick = tick?;
            let instant = match unit {
                TimeUnit::Milliseconds => DateTime::from_timestamp_millis(tick),
                TimeUnit::Microseconds => DateTime::from_timestamp_micros(tick),
                TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(tick)),
            };
            instant.map(|utc| utc.date_naive().format("%Y-%m-%d").to_string())
        })
        .collect())
}

impl Stage for DateNormalizer {
    fn id(&self) -> CleaningStage {
        CleaningStage::DateNormalization
    }

    fn apply(&self, mut table: Table, config: &CleaningConfig) -> Result<Table> {
        let explicit = config.date_columns.is_explicit();

        for name in Self::resolve_columns(&table, &config.date_columns) {
            let Some(cells) = Self::text_cells(&table, &name, explicit)? else {
                continue;
            };

            let mut unparsable = 0usize;
            let normalized: Vec<Option<String>> = cells
                .into_iter()
                .map(|cell| {
                    let cell = cell?;
                    let parsed = parse_date(&cell);
                    if parsed.is_none() {
                        unparsable += 1;
                    }
                    parsed.map(|date| date.format("%Y-%m-%d").to_string())
                })
                .collect();

            if unparsable > 0 {
                debug!(
                    "Column '{}': {} unparsable date values set to missing",
                    name, unparsable
                );
            }

            let series = Series::new(name.as_str().into(), normalized);
            table.replace_column(series, ColumnKind::Date)?;
        }

        Ok(table)
    }
}

// =============================================================================
// Tests
// =============================================================================
