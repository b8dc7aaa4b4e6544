use anyhow::{Context, Result};
use log::info;

use p3data::config::Config;
use p3data::shot::SignalGroup;

/// Load a shot and print one line per channel
pub fn run(config: &Config, shot: u32, groups: Vec<SignalGroup>) -> Result<()> {
    let loader = config.loader();
    info!(
        "Loading shot {} from {}",
        shot,
        loader.archive().shot_folder(shot).display()
    );

    let loaded = loader
        .load_groups(shot, &groups)
        .with_context(|| format!("Failed to load shot {}", shot))?;

    println!("Shot {}", loaded.number());
    println!("=========");
    println!("Acquired: {}", loaded.acquired_at().to_rfc3339());
    if let Some(folder) = loaded.folder() {
        println!("Folder:   {}", folder.display());
    }
    println!();

    for group in &groups {
        let traces = loaded.subset(group.channels());
        println!("{} ({} of {} channels):", group, traces.len(), group.channels().len());
        for trace in traces {
            let (start, end) = trace.span().unwrap_or((f64::NAN, f64::NAN));
            let spacing = trace.nominal_spacing().unwrap_or(f64::NAN);
            println!(
                "  {:<16} {:>8} samples  {:>10.6} .. {:<10.6} s  dt {:.3e} s  [{}]",
                trace.name(),
                trace.len(),
                start,
                end,
                spacing,
                trace.units()
            );
        }
        println!();
    }

    if !loaded.missing().is_empty() {
        println!(
            "Missing ({}): {}",
            loaded.missing().len(),
            loaded.missing().join(", ")
        );
    }
    Ok(())
}
