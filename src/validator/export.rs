use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use arrow::array::{Array, Float64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::dataset::keys::{
    EXPORT_FORMAT_VERSION, KEY_ACQUIRED_AT, KEY_CHANNELS, KEY_FORMAT_VERSION,
    KEY_PROCESSING_HISTORY, KEY_SHOT,
};
use crate::dataset::{ProcessingHistory, TIME_COLUMN};

use super::{CheckFamily, ValidationError, ValidationReport};

/// Check footer metadata, schema and the time column of an exported dataset
pub(crate) fn check_export(path: &Path, report: &mut ValidationReport) -> Result<(), ValidationError> {
    if !path.is_file() {
        report.fail(
            CheckFamily::Export,
            "File exists",
            format!("Not a file: {}", path.display()),
        );
        return Err(ValidationError::StructureError(format!(
            "Export not found: {}",
            path.display()
        )));
    }
    report.pass(CheckFamily::Export, "File exists");

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    report.pass(CheckFamily::Export, "Readable as Parquet");

    let kv: HashMap<String, String> = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .map(|kv| {
            kv.iter()
                .filter_map(|e| e.value.as_ref().map(|v| (e.key.clone(), v.clone())))
                .collect()
        })
        .unwrap_or_default();
    check_footer(&kv, report);

    let schema = builder.schema().clone();
    let time_index = match schema.index_of(TIME_COLUMN) {
        Ok(0) => {
            report.pass(CheckFamily::Export, "Time column first");
            0
        }
        Ok(index) => {
            report.warn(
                CheckFamily::Export,
                "Time column first",
                format!("'{}' is column {}", TIME_COLUMN, index),
            );
            index
        }
        Err(_) => {
            report.fail(
                CheckFamily::Export,
                "Time column first",
                format!("No '{}' column", TIME_COLUMN),
            );
            return Ok(());
        }
    };

    let non_float: Vec<&str> = schema
        .fields()
        .iter()
        .filter(|f| f.data_type() != &DataType::Float64)
        .map(|f| f.name().as_str())
        .collect();
    if non_float.is_empty() {
        report.pass(CheckFamily::Export, format!(
            "Columns are Float64 ({})",
            schema.fields().len()
        ));
    } else {
        report.fail(
            CheckFamily::Export,
            "Columns are Float64",
            format!("Unexpected types in {}", non_float.join(", ")),
        );
    }

    let mut previous: Option<f64> = None;
    let mut rows = 0usize;
    let mut violation: Option<String> = None;
    for batch in builder.build()? {
        let batch = batch?;
        let Some(time) = batch.column(time_index).as_any().downcast_ref::<Float64Array>() else {
            break;
        };
        for i in 0..time.len() {
            let row = rows + i;
            if time.is_null(i) || !time.value(i).is_finite() {
                violation.get_or_insert_with(|| format!("row {} is not a finite time", row));
                continue;
            }
            let t = time.value(i);
            if previous.is_some_and(|p| t <= p) {
                violation.get_or_insert_with(|| format!("row {} does not increase", row));
            }
            previous = Some(t);
        }
        rows += batch.num_rows();
    }

    match violation {
        None => report.pass(CheckFamily::Export, format!(
            "Time strictly increasing ({} rows)",
            rows
        )),
        Some(detail) => report.fail(CheckFamily::Export, "Time strictly increasing", detail),
    }
    Ok(())
}

fn check_footer(kv: &HashMap<String, String>, report: &mut ValidationReport) {
    match kv.get(KEY_FORMAT_VERSION) {
        Some(version) if version == EXPORT_FORMAT_VERSION => {
            report.pass(CheckFamily::Export, format!(
                "Format version matches ({})",
                EXPORT_FORMAT_VERSION
            ));
        }
        Some(version) => report.warn(
            CheckFamily::Export,
            "Format version",
            format!("Expected {}, found {}", EXPORT_FORMAT_VERSION, version),
        ),
        None => report.warn(
            CheckFamily::Export,
            "Format version",
            "Format version not found in Parquet metadata",
        ),
    }

    match kv.get(KEY_SHOT).map(|s| s.parse::<u32>()) {
        Some(Ok(shot)) => report.pass(CheckFamily::Export, format!("Shot number ({})", shot)),
        Some(Err(_)) => report.fail(
            CheckFamily::Export,
            "Shot number",
            format!("'{}' is not a shot number", kv[KEY_SHOT]),
        ),
        None => report.warn(CheckFamily::Export, "Shot number", "Not recorded"),
    }

    let acquired = kv
        .get(KEY_ACQUIRED_AT)
        .map(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok());
    match acquired {
        Some(true) => report.pass(CheckFamily::Export, "Acquisition time"),
        Some(false) => report.fail(
            CheckFamily::Export,
            "Acquisition time",
            "Not an RFC 3339 timestamp",
        ),
        None => report.warn(CheckFamily::Export, "Acquisition time", "Not recorded"),
    }

    match kv.get(KEY_CHANNELS).map(|s| serde_json::from_str::<serde_json::Value>(s)) {
        Some(Ok(serde_json::Value::Array(_))) => {
            report.pass(CheckFamily::Export, "Channel descriptions")
        }
        Some(_) => report.fail(
            CheckFamily::Export,
            "Channel descriptions",
            "Not a JSON array",
        ),
        None => report.warn(CheckFamily::Export, "Channel descriptions", "Not recorded"),
    }

    match kv.get(KEY_PROCESSING_HISTORY).map(|s| ProcessingHistory::from_json(s)) {
        Some(Ok(history)) => report.pass(CheckFamily::Export, format!(
            "Processing history ({} steps)",
            history.len()
        )),
        Some(Err(e)) => report.fail(
            CheckFamily::Export,
            "Processing history",
            format!("Failed to deserialize: {}", e),
        ),
        None => report.warn(CheckFamily::Export, "Processing history", "Not recorded"),
    }
}
