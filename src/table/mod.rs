//! Reader for time-indexed acoustic sample tables (`.creak`, `.fb`).
//!
//! Tables are headerless whitespace-delimited text; the caller supplies the
//! field schema as a comma-separated list whose first field is the frame
//! start time `t1`. Row `i` is active over the window `[t1_i, t1_{i+1})`;
//! the final row keeps the preceding frame step as its window width.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, ensure, Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub t1: f64,
    values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    path: PathBuf,
    fields: Vec<String>,
    rows: Vec<SampleRow>,
}

impl SampleTable {
    pub fn open(path: &Path, fields: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read sample table {path:?}"))?;
        Self::parse(&data, fields, path)
            .with_context(|| format!("malformed sample table {path:?}"))
    }

    pub fn parse(data: &str, fields: &str, path: &Path) -> Result<Self> {
        let fields: Vec<String> = fields.split(',').map(|f| f.trim().to_string()).collect();
        ensure!(
            fields.first().map(String::as_str) == Some("t1"),
            "field schema must lead with t1"
        );

        let mut rows = Vec::new();
        for (idx, line) in data.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let values: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if values.len() != fields.len() {
                bail!(
                    "line {}: expected {} columns, found {}",
                    idx + 1,
                    fields.len(),
                    values.len()
                );
            }
            let t1: f64 = values[0]
                .parse()
                .with_context(|| format!("line {}: invalid t1 {:?}", idx + 1, values[0]))?;
            rows.push(SampleRow { t1, values });
        }
        rows.sort_by(|a, b| a.t1.total_cmp(&b.t1));

        Ok(Self {
            path: path.to_path_buf(),
            fields,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rescales every frame time by a constant factor (formant tables carry
    /// times in milliseconds; pass 0.001 to query them in seconds).
    pub fn scale_by(&mut self, factor: f64) {
        for row in &mut self.rows {
            row.t1 *= factor;
        }
    }

    /// The row whose time window contains `time`, or `None` when the query
    /// falls before the first frame or past the end of the table.
    pub fn row_at(&self, time: f64) -> Option<RowView<'_>> {
        if self.rows.is_empty() || time < self.rows[0].t1 {
            return None;
        }
        let idx = self.rows.partition_point(|row| row.t1 <= time) - 1;
        if idx == self.rows.len() - 1 {
            let step = if self.rows.len() >= 2 {
                self.rows[idx].t1 - self.rows[idx - 1].t1
            } else {
                f64::INFINITY
            };
            if time >= self.rows[idx].t1 + step {
                return None;
            }
        }
        Some(RowView {
            table: self,
            row: &self.rows[idx],
        })
    }
}

/// Borrowed view of one row, with typed field access by schema name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'t> {
    table: &'t SampleTable,
    row: &'t SampleRow,
}

impl<'t> RowView<'t> {
    pub fn t1(&self) -> f64 {
        self.row.t1
    }

    pub fn text(&self, field: &str) -> Result<&'t str> {
        let idx = self
            .table
            .fields
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| anyhow!("no field {field:?} in {:?}", self.table.path))?;
        Ok(&self.row.values[idx])
    }

    pub fn float(&self, field: &str) -> Result<f64> {
        let raw = self.text(field)?;
        raw.parse()
            .with_context(|| format!("field {field:?} is not a float: {raw:?}"))
    }

    pub fn integer(&self, field: &str) -> Result<i64> {
        let raw = self.text(field)?;
        raw.parse()
            .with_context(|| format!("field {field:?} is not an integer: {raw:?}"))
    }
}
