use std::io::Write;

use super::error::ExportError;

/// Header of the time column in tabular output
pub const TIME_COLUMN: &str = "time";

/// One grid point of a table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Grid time in seconds
    pub time: f64,
    /// One value per channel, `None` where missing
    pub values: Vec<Option<f64>>,
}

/// Row-oriented view of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Channel names
    pub headers: Vec<String>,
    /// Channel units, parallel to `headers`
    pub units: Vec<String>,
    /// Rows in time order
    pub rows: Vec<Row>,
}

impl Table {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write as CSV. Missing values are empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(self.headers.len() + 1);
        header.push(format!("{} [s]", TIME_COLUMN));
        for (name, units) in self.headers.iter().zip(&self.units) {
            if units.is_empty() {
                header.push(name.clone());
            } else {
                header.push(format!("{} [{}]", name, units));
            }
        }
        csv.write_record(&header)?;

        let mut record = Vec::with_capacity(header.len());
        for row in &self.rows {
            record.clear();
            record.push(row.time.to_string());
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
            );
            csv.write_record(&record)?;
        }
        csv.flush()?;
        Ok(())
    }
}
