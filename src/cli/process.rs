use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use p3data::align::GridSpec;
use p3data::config::Config;
use p3data::dataset::{AlignedDataset, ExportConfig};
use p3data::processing::{process_shot, ShotAnalysis};
use p3data::shot::SignalGroup;

/// Process one shot and export or summarise it
pub fn run(
    mut config: Config,
    shot: u32,
    output: Option<PathBuf>,
    groups: Vec<SignalGroup>,
    rate: Option<f64>,
    strict_gaps: bool,
) -> Result<()> {
    if let Some(hz) = rate {
        config.alignment.grid = GridSpec::Rate(hz);
    }
    if strict_gaps {
        config.alignment.strict_gaps = true;
    }
    config
        .alignment
        .validate()
        .context("Invalid alignment settings")?;

    let ctx = config
        .into_context()
        .context("Failed to build processing context")?
        .with_groups(groups);
    let analysis = process_shot(&ctx, shot)?;
    print_summary(&analysis);

    if let Some(output) = output {
        let export_config = ExportConfig::default();
        let single = analysis.datasets.len() == 1;
        for (group, dataset) in &analysis.datasets {
            let path = if single {
                output.clone()
            } else {
                group_path(&output, *group)
            };
            let stats = dataset
                .export(&path, &export_config)
                .with_context(|| format!("Failed to export {}", path.display()))?;
            info!("{}: {}", path.display(), stats);
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// `out.parquet` becomes `out_BDots.parquet`
pub(crate) fn group_path(output: &Path, group: SignalGroup) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "shot".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{}_{}.{}", stem, group, ext.to_string_lossy()),
        None => format!("{}_{}", stem, group),
    };
    output.with_file_name(name)
}

fn print_summary(analysis: &ShotAnalysis) {
    println!("Shot {} ({})", analysis.shot, analysis.acquired_at.to_rfc3339());
    println!();
    for (group, dataset) in &analysis.datasets {
        print_dataset(*group, dataset);
    }
    if !analysis.missing.is_empty() {
        println!("Missing channels: {}", analysis.missing.len());
    }
}

fn print_dataset(group: SignalGroup, dataset: &AlignedDataset) {
    let time = dataset.time();
    println!(
        "{}: {} channels x {} points ({:.6} .. {:.6} s)",
        group,
        dataset.columns().len(),
        dataset.len(),
        time.first().copied().unwrap_or(f64::NAN),
        time.last().copied().unwrap_or(f64::NAN),
    );
    for step in dataset.history().steps() {
        println!("  {}", step);
    }
    for column in dataset.columns() {
        let missing = column.missing_count();
        if missing > 0 {
            println!("  {} [{}]: {} missing", column.name(), column.units(), missing);
        }
    }
    println!();
}
