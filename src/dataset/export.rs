use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::aligned::AlignedDataset;
use super::error::ExportError;
use super::keys::*;
use super::table::TIME_COLUMN;

/// Configuration for Parquet export
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// ZSTD compression level
    pub compression_level: i32,

    /// Target row group size
    pub row_group_size: usize,

    /// Data page size in bytes
    pub data_page_size: usize,

    /// Whether to write column statistics
    pub write_statistics: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            compression_level: 3,
            row_group_size: 100_000,
            data_page_size: 1024 * 1024,
            write_statistics: true,
        }
    }
}

impl ExportConfig {
    fn to_writer_properties(&self, metadata: &HashMap<String, String>) -> WriterProperties {
        let compression = Compression::ZSTD(
            ZstdLevel::try_new(self.compression_level).unwrap_or(ZstdLevel::default()),
        );

        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        // Sampled floats rarely repeat
        let builder = WriterProperties::builder()
            .set_compression(compression)
            .set_data_page_size_limit(self.data_page_size)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size)
            .set_dictionary_enabled(false);

        let mut kv_metadata: Vec<KeyValue> = metadata
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: Some(v.clone()),
            })
            .collect();
        kv_metadata.sort_by(|a, b| a.key.cmp(&b.key));

        builder.set_key_value_metadata(Some(kv_metadata)).build()
    }
}

/// Statistics from a completed export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStats {
    /// Grid points written
    pub rows_written: usize,
    /// Channel columns written (time excluded)
    pub channels_written: usize,
    /// Missing values written as nulls
    pub missing_values: usize,
    /// Row groups in the file (0 for CSV)
    pub row_groups_written: usize,
    /// Size of the final file
    pub file_size_bytes: u64,
}

impl fmt::Display for ExportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} rows x {} channels ({} missing values, {} bytes)",
            self.rows_written, self.channels_written, self.missing_values, self.file_size_bytes
        )
    }
}

#[derive(Serialize)]
struct ColumnInfo<'a> {
    name: &'a str,
    units: &'a str,
    channel: &'a str,
    source: Option<String>,
    missing: usize,
}

impl AlignedDataset {
    /// Arrow schema: a non-null `time` column plus one nullable column per channel
    pub fn arrow_schema(&self) -> Schema {
        let mut fields = Vec::with_capacity(self.columns().len() + 1);
        fields.push(
            Field::new(TIME_COLUMN, DataType::Float64, false).with_metadata(HashMap::from([(
                FIELD_UNITS.to_string(),
                "s".to_string(),
            )])),
        );
        for column in self.columns() {
            fields.push(
                Field::new(column.name(), DataType::Float64, true).with_metadata(HashMap::from(
                    [(FIELD_UNITS.to_string(), column.units().to_string())],
                )),
            );
        }
        Schema::new(fields)
    }

    /// Columnar copy of the dataset; missing values become nulls
    pub fn to_record_batch(&self) -> Result<RecordBatch, ExportError> {
        let schema = Arc::new(self.arrow_schema());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns().len() + 1);
        arrays.push(Arc::new(Float64Array::from(self.time().to_vec())));
        for column in self.columns() {
            arrays.push(Arc::new(Float64Array::from(column.values().to_vec())));
        }
        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    /// Footer metadata describing the shot, columns and processing history
    pub fn export_metadata(&self) -> Result<HashMap<String, String>, ExportError> {
        let columns: Vec<ColumnInfo<'_>> = self
            .columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name(),
                units: c.units(),
                channel: &c.provenance().channel,
                source: c
                    .provenance()
                    .source
                    .as_ref()
                    .and_then(|t| t.source())
                    .map(|p| p.display().to_string()),
                missing: c.missing_count(),
            })
            .collect();

        let mut metadata = HashMap::new();
        metadata.insert(
            KEY_FORMAT_VERSION.to_string(),
            EXPORT_FORMAT_VERSION.to_string(),
        );
        metadata.insert(KEY_SHOT.to_string(), self.shot().to_string());
        metadata.insert(KEY_ACQUIRED_AT.to_string(), self.acquired_at().to_rfc3339());
        metadata.insert(KEY_CHANNELS.to_string(), serde_json::to_string(&columns)?);
        metadata.insert(
            KEY_PROCESSING_HISTORY.to_string(),
            self.history().to_json()?,
        );
        metadata.insert(
            KEY_CONVERTER_INFO.to_string(),
            format!("p3data {}", env!("CARGO_PKG_VERSION")),
        );
        Ok(metadata)
    }

    /// Write the dataset as Parquet to any writer
    pub fn write_parquet_to<W: Write + Send>(
        &self,
        writer: W,
        config: &ExportConfig,
    ) -> Result<ExportStats, ExportError> {
        let batch = self.to_record_batch()?;
        let props = config.to_writer_properties(&self.export_metadata()?);
        let mut arrow_writer = ArrowWriter::try_new(writer, batch.schema(), Some(props))?;
        arrow_writer.write(&batch)?;
        let file_metadata = arrow_writer.close()?;

        Ok(ExportStats {
            rows_written: self.len(),
            channels_written: self.columns().len(),
            missing_values: self.columns().iter().map(|c| c.missing_count()).sum(),
            row_groups_written: file_metadata.row_groups.len(),
            file_size_bytes: file_metadata
                .row_groups
                .iter()
                .map(|rg| rg.total_byte_size as u64)
                .sum(),
        })
    }

    /// Write the dataset as a Parquet file.
    ///
    /// The file is written next to `path` under a temporary name and moved into
    /// place only once complete.
    pub fn write_parquet(&self, path: &Path, config: &ExportConfig) -> Result<ExportStats, ExportError> {
        let tmp = NamedTempFile::new_in(parent_dir(path))?;
        let mut stats = self.write_parquet_to(tmp.as_file().try_clone()?, config)?;
        let file = persist(tmp, path)?;
        stats.file_size_bytes = file.metadata()?.len();
        info!("Shot {}: {}", self.shot(), stats);
        Ok(stats)
    }

    /// Write the dataset as a CSV file, atomically like [`Self::write_parquet`]
    pub fn write_csv(&self, path: &Path) -> Result<ExportStats, ExportError> {
        let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
        self.to_table().write_csv(&mut tmp)?;
        let file = persist(tmp, path)?;

        let stats = ExportStats {
            rows_written: self.len(),
            channels_written: self.columns().len(),
            missing_values: self.columns().iter().map(|c| c.missing_count()).sum(),
            row_groups_written: 0,
            file_size_bytes: file.metadata()?.len(),
        };
        info!("Shot {}: {}", self.shot(), stats);
        Ok(stats)
    }

    /// Export by file extension (`.parquet` or `.csv`)
    pub fn export(&self, path: &Path, config: &ExportConfig) -> Result<ExportStats, ExportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            PARQUET_EXTENSION => self.write_parquet(path, config),
            CSV_EXTENSION => self.write_csv(path),
            _ => Err(ExportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<File, ExportError> {
    let file = tmp.persist(path)?;
    file.sync_all()?;
    Ok(file)
}
