use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::column::Column;
use super::error::DatasetError;
use super::history::ProcessingHistory;
use super::table::{Row, Table};

/// Multi-channel data of one shot on a shared time grid.
///
/// The grid is finite and strictly increasing, and every column holds exactly
/// one value per grid point. Datasets are never modified in place: stages and
/// queries return new datasets, sharing the grid where it is unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedDataset {
    shot: u32,
    acquired_at: DateTime<Utc>,
    time: Arc<[f64]>,
    columns: Vec<Column>,
    history: ProcessingHistory,
}

fn validate_grid(time: &[f64]) -> Result<(), DatasetError> {
    if let Some(index) = time.iter().position(|t| !t.is_finite()) {
        return Err(DatasetError::NonFiniteTime { index });
    }
    if let Some(index) = time.windows(2).position(|w| w[1] <= w[0]) {
        return Err(DatasetError::NonIncreasingTime { index: index + 1 });
    }
    Ok(())
}

fn validate_columns(grid_len: usize, columns: &[Column]) -> Result<(), DatasetError> {
    for (i, column) in columns.iter().enumerate() {
        if column.len() != grid_len {
            return Err(DatasetError::LengthMismatch {
                column: column.name().to_string(),
                len: column.len(),
                expected: grid_len,
            });
        }
        if columns[..i].iter().any(|c| c.name() == column.name()) {
            return Err(DatasetError::DuplicateColumn(column.name().to_string()));
        }
    }
    Ok(())
}

impl AlignedDataset {
    /// Create a dataset, checking the grid and column invariants
    pub fn new(
        shot: u32,
        acquired_at: DateTime<Utc>,
        time: Vec<f64>,
        columns: Vec<Column>,
    ) -> Result<Self, DatasetError> {
        validate_grid(&time)?;
        validate_columns(time.len(), &columns)?;
        Ok(Self {
            shot,
            acquired_at,
            time: time.into(),
            columns,
            history: ProcessingHistory::new(),
        })
    }

    /// Same grid, shot and history with replacement columns
    pub fn with_columns(&self, columns: Vec<Column>) -> Result<Self, DatasetError> {
        validate_columns(self.time.len(), &columns)?;
        Ok(Self {
            shot: self.shot,
            acquired_at: self.acquired_at,
            time: Arc::clone(&self.time),
            columns,
            history: self.history.clone(),
        })
    }

    /// Same shot and history on a new grid
    pub fn with_grid(&self, time: Vec<f64>, columns: Vec<Column>) -> Result<Self, DatasetError> {
        validate_grid(&time)?;
        validate_columns(time.len(), &columns)?;
        Ok(Self {
            shot: self.shot,
            acquired_at: self.acquired_at,
            time: time.into(),
            columns,
            history: self.history.clone(),
        })
    }

    pub(crate) fn record_step(&mut self, stage: &str, parameters: BTreeMap<String, String>) {
        self.history.push(stage, parameters);
    }

    /// Shot number
    pub fn shot(&self) -> u32 {
        self.shot
    }

    /// Acquisition time of the shot
    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// Time grid in seconds
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the grid is empty
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// All columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order
    pub fn channel_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Stages applied so far
    pub fn history(&self) -> &ProcessingHistory {
        &self.history
    }

    /// `(time, value)` pairs of a channel; empty for unknown channels
    pub fn channel(&self, name: &str) -> Vec<(f64, Option<f64>)> {
        self.column(name)
            .map(|c| self.time.iter().copied().zip(c.values().iter().copied()).collect())
            .unwrap_or_default()
    }

    /// Value of a channel at the grid point nearest to `t`.
    ///
    /// `None` for unknown channels, times outside the grid and missing values.
    pub fn value_at(&self, name: &str, t: f64) -> Option<f64> {
        let column = self.column(name)?;
        let (&first, &last) = (self.time.first()?, self.time.last()?);
        if !(first..=last).contains(&t) {
            return None;
        }
        let hi = self.time.partition_point(|&x| x < t);
        let index = if hi == 0 || self.time[hi] - t <= t - self.time[hi - 1] {
            hi
        } else {
            hi - 1
        };
        column.values()[index]
    }

    /// Missing values of a channel; 0 for unknown channels
    pub fn missing_count(&self, name: &str) -> usize {
        self.column(name).map_or(0, Column::missing_count)
    }

    /// Grid points with `start <= t <= end`. Empty when nothing falls inside.
    pub fn slice_time(&self, start: f64, end: f64) -> AlignedDataset {
        let lo = self.time.partition_point(|&t| t < start);
        let hi = self.time.partition_point(|&t| t <= end).max(lo);
        let columns = self
            .columns
            .iter()
            .map(|c| c.with_values(c.values()[lo..hi].to_vec()))
            .collect();
        Self {
            shot: self.shot,
            acquired_at: self.acquired_at,
            time: self.time[lo..hi].into(),
            columns,
            history: self.history.clone(),
        }
    }

    /// Listed channels in list order; unknown names are skipped
    pub fn select<S: AsRef<str>>(&self, channels: &[S]) -> AlignedDataset {
        let mut columns: Vec<Column> = Vec::with_capacity(channels.len());
        for name in channels {
            let name = name.as_ref();
            if columns.iter().any(|c| c.name() == name) {
                continue;
            }
            if let Some(column) = self.column(name) {
                columns.push(column.clone());
            }
        }
        Self {
            shot: self.shot,
            acquired_at: self.acquired_at,
            time: Arc::clone(&self.time),
            columns,
            history: self.history.clone(),
        }
    }

    /// Row view: one row per grid point
    pub fn to_table(&self) -> Table {
        let headers = self.columns.iter().map(|c| c.name().to_string()).collect();
        let units = self.columns.iter().map(|c| c.units().to_string()).collect();
        let rows = self
            .time
            .iter()
            .enumerate()
            .map(|(i, &time)| Row {
                time,
                values: self.columns.iter().map(|c| c.values()[i]).collect(),
            })
            .collect();
        Table {
            headers,
            units,
            rows,
        }
    }
}
