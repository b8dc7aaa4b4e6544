use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use p3data::dataset::keys::PARQUET_EXTENSION;
use p3data::ibw::read_wave;

/// Display information about a wave or an exported dataset
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let is_parquet = file
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(PARQUET_EXTENSION));
    if is_parquet {
        parquet_info(&file)
    } else {
        wave_info(&file)
    }
}

fn wave_info(file: &Path) -> Result<()> {
    let wave = read_wave(file)?;
    let header = &wave.header;

    println!("Igor Binary Wave");
    println!("================");
    println!("File: {}", file.display());
    println!();
    println!("  Name:         {}", header.name);
    println!("  Version:      {:?}", header.version);
    println!("  Byte order:   {:?}", header.byte_order);
    println!("  Type:         {:?}", header.numeric_type);
    println!("  Points:       {}", header.points);
    println!("  x0:           {} {}", header.x0, header.x_units);
    println!("  dx:           {:e} {}", header.dx, header.x_units);
    println!("  Data units:   {}", header.data_units);
    println!("  Created:      {}", header.created_at().to_rfc3339());

    let finite: Vec<f64> = wave.values.iter().copied().filter(|v| v.is_finite()).collect();
    if let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) {
        println!("  Range:        {} .. {}", min, max);
    }
    let non_finite = wave.values.len() - finite.len();
    if non_finite > 0 {
        println!("  Non-finite:   {}", non_finite);
    }
    Ok(())
}

fn parquet_info(file: &Path) -> Result<()> {
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use std::fs::File;

    let file_handle = File::open(file).context("Failed to open file")?;
    let reader = SerializedFileReader::new(file_handle).context("Failed to read Parquet file")?;

    let metadata = reader.metadata();
    let file_metadata = metadata.file_metadata();

    println!("p3data Export Information");
    println!("=========================");
    println!("File: {}", file.display());
    println!();

    println!("File Statistics:");
    println!("  Row groups: {}", metadata.num_row_groups());
    println!("  Total rows: {}", file_metadata.num_rows());
    println!(
        "  Schema columns: {}",
        file_metadata.schema_descr().num_columns()
    );
    println!();

    if let Some(kv_metadata) = file_metadata.key_value_metadata() {
        println!("Metadata Keys:");
        for kv in kv_metadata {
            let value_preview = kv
                .value
                .as_ref()
                .map(|v| {
                    if v.chars().count() > 100 {
                        let head: String = v.chars().take(100).collect();
                        format!("{}... ({} bytes)", head, v.len())
                    } else {
                        v.clone()
                    }
                })
                .unwrap_or_else(|| "<null>".to_string());
            println!("  {}: {}", kv.key, value_preview);
        }
        println!();
    }

    println!("Columns:");
    for i in 0..file_metadata.schema_descr().num_columns() {
        let col = file_metadata.schema_descr().column(i);
        println!("  {:3}. {} ({})", i + 1, col.name(), col.physical_type());
    }

    Ok(())
}
