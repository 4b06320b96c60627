//! Loading of the combined dataset into typed [`Record`]s.
//!
//! Column access is fail-fast: a missing required column, an unparseable
//! timestamp, a non-numeric reading or a month outside `1..=12` aborts the
//! load with an error naming the column and line.

use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use dashboard_core::calendar;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{columns, Dataset, Record};
use tracing::debug;

use crate::assembler::UTF8_BOM;

/// Drop a leading UTF-8 byte-order mark, if present.
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Load the combined dataset at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(DashboardError::DatasetNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = parse_dataset(strip_bom(&bytes))?;
    debug!("Loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Parse combined-dataset CSV content.
pub fn parse_dataset(content: &[u8]) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content);

    let headers = rdr.headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        records.push(layout.record(&row, row_line(&row, i))?);
    }

    Ok(records)
}

// ── Reading columns ───────────────────────────────────────────────────────────

/// The typed measurement cells of one row: timestamp, total and rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub datetime: NaiveDateTime,
    pub total: f64,
    pub rate_a: f64,
    pub rate_b: f64,
    pub rate_c: f64,
}

/// Positions of `DateTime`, `Total` and the rate columns within a header.
///
/// Shared by the assembler, which rejects source files with bad cells, and
/// the dataset loader, so both accept exactly the same rows.
#[derive(Debug, Clone, Copy)]
pub struct ReadingColumns {
    datetime: usize,
    total: usize,
    rate_a: usize,
    rate_b: usize,
    rate_c: usize,
}

impl ReadingColumns {
    /// Locate the measurement columns; header names are compared trimmed.
    pub fn locate<'h>(headers: impl IntoIterator<Item = &'h str>) -> Result<Self> {
        let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let find = |name: &str| column_index(&headers, name);

        Ok(Self {
            datetime: find(columns::DATETIME)?,
            total: find(columns::TOTAL)?,
            rate_a: find(columns::RATE_A)?,
            rate_b: find(columns::RATE_B)?,
            rate_c: find(columns::RATE_C)?,
        })
    }

    /// Parse the measurement cells of one row. `cell(i)` returns the raw
    /// text of column `i` (empty when absent); `line` is used in errors.
    pub fn parse<'r>(&self, cell: impl Fn(usize) -> &'r str, line: u64) -> Result<Reading> {
        let raw_dt = cell(self.datetime);
        let datetime = calendar::parse_datetime(raw_dt)
            .ok_or_else(|| invalid(columns::DATETIME, line, raw_dt))?;

        Ok(Reading {
            datetime,
            total: parse_number(cell(self.total), columns::TOTAL, line)?,
            rate_a: parse_number(cell(self.rate_a), columns::RATE_A, line)?,
            rate_b: parse_number(cell(self.rate_b), columns::RATE_B, line)?,
            rate_c: parse_number(cell(self.rate_c), columns::RATE_C, line)?,
        })
    }
}

/// 1-based file line of `row`; the header is line 1.
pub(crate) fn row_line(row: &StringRecord, index: usize) -> u64 {
    row.position()
        .map(|p| p.line())
        .unwrap_or(index as u64 + 2)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Measurement columns plus the derived `Year` and `Month`.
struct ColumnLayout {
    reading: ReadingColumns,
    year: usize,
    month: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let trimmed: Vec<&str> = headers.iter().map(str::trim).collect();

        Ok(Self {
            reading: ReadingColumns::locate(trimmed.iter().copied())?,
            year: column_index(&trimmed, columns::YEAR)?,
            month: column_index(&trimmed, columns::MONTH)?,
        })
    }

    fn record(&self, row: &StringRecord, line: u64) -> Result<Record> {
        let cell = |idx: usize| row.get(idx).unwrap_or("");
        let reading = self.reading.parse(cell, line)?;

        let raw_month = cell(self.month);
        let month = calendar::normalize_month(raw_month)
            .ok_or_else(|| invalid(columns::MONTH, line, raw_month))?;

        Ok(Record {
            datetime: reading.datetime,
            total: reading.total,
            rate_a: reading.rate_a,
            rate_b: reading.rate_b,
            rate_c: reading.rate_c,
            year: cell(self.year).trim().to_string(),
            month,
        })
    }
}

fn column_index(headers: &[&str], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| *h == name)
        .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
}

fn parse_number(raw: &str, column: &str, line: u64) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(column, line, raw))
}

fn invalid(column: &str, line: u64, value: &str) -> DashboardError {
    DashboardError::InvalidValue {
        column: column.to_string(),
        line,
        value: value.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
