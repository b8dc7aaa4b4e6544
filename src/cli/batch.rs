use anyhow::{Context, Result};
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

use p3data::config::Config;
use p3data::dataset::ExportConfig;
use p3data::processing::process_batch;
use p3data::shot::SignalGroup;

use super::FormatArg;

/// Process shots independently and export every successful one
pub fn run(
    config: Config,
    shots: &[u32],
    out_dir: PathBuf,
    format: FormatArg,
    groups: Vec<SignalGroup>,
) -> Result<()> {
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let ctx = config
        .into_context()
        .context("Failed to build processing context")?
        .with_groups(groups);
    let export_config = ExportConfig::default();

    let start = Instant::now();
    let results = process_batch(&ctx, shots);

    let mut failed = 0usize;
    let mut files = 0usize;
    for (shot, result) in results {
        let analysis = match result {
            Ok(analysis) => analysis,
            Err(e) => {
                error!("{}", e);
                eprintln!("Shot {}: FAILED at {} ({})", shot, e.step(), e);
                failed += 1;
                continue;
            }
        };
        for (group, dataset) in &analysis.datasets {
            let path = out_dir.join(format!("{}_{}.{}", shot, group, format.extension()));
            dataset
                .export(&path, &export_config)
                .with_context(|| format!("Failed to export {}", path.display()))?;
            files += 1;
        }
        println!("Shot {}: {} groups", shot, analysis.datasets.len());
    }

    info!("Batch finished in {:.2?}", start.elapsed());
    println!();
    println!(
        "{} shots processed, {} failed, {} files written to {}",
        shots.len() - failed,
        failed,
        files,
        out_dir.display()
    );

    if failed > 0 {
        anyhow::bail!("{} of {} shots failed", failed, shots.len());
    }
    Ok(())
}
