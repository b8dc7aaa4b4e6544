use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use log::info;
use std::f64::consts::PI;
use std::path::PathBuf;

use p3data::calibration::{write_das_conf, DasChannel};
use p3data::ibw::{encode_wave, Wave};
use p3data::shot::channels::{BDOTS, CURRENTS, FLUX_LOOPS};
use p3data::shot::{channel_file, ShotArchive, DAS_CONF_FILE};

/// Slow digitizers (flux loops, currents)
const SLOW_DT: f64 = 2e-5;
const SLOW_POINTS: usize = 2_000;

/// Fast digitizers (B-dot probes)
const FAST_DT: f64 = 1e-5;
const FAST_POINTS: usize = 4_000;

const PULSE_START: f64 = 5e-3;
const PULSE_END: f64 = 30e-3;

/// Write a synthetic shot with every known channel and its DAS.conf
pub fn run(output: PathBuf, shot: u32) -> Result<()> {
    info!("p3data Demo - synthetic Pegasus III shot");
    info!("=========================================");

    let archive = ShotArchive::new(&output);
    let folder = archive.shot_folder(shot);
    std::fs::create_dir_all(&folder)
        .with_context(|| format!("Failed to create {}", folder.display()))?;

    let created = Utc
        .with_ymd_and_hms(2023, 8, 9, 14, 0, 0)
        .single()
        .context("Invalid demo timestamp")?;

    let mut das = Vec::new();
    let mut written = 0usize;
    for (channel, dt, points, units, scale) in demo_channels() {
        if das.iter().any(|d: &DasChannel| d.name == channel) {
            continue;
        }
        let values = synthetic_signal(written, dt, points);
        let wave = Wave::new(channel, 0.0, dt, values)
            .with_units("V")
            .with_created_at(created);
        let path = channel_file(&folder, channel);
        std::fs::write(&path, encode_wave(&wave))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        das.push(DasChannel {
            name: channel.to_string(),
            units: units.to_string(),
            scale,
        });
        written += 1;
    }

    let das_path = folder.join(DAS_CONF_FILE);
    std::fs::write(&das_path, write_das_conf(&das))
        .with_context(|| format!("Failed to write {}", das_path.display()))?;

    info!("Wrote {} channels to {}", written, folder.display());
    println!("Synthetic shot {} written to {}", shot, folder.display());
    println!(
        "Try: p3data --archive {} process {} -o shot.parquet",
        output.display(),
        shot
    );
    Ok(())
}

fn demo_channels() -> Vec<(&'static str, f64, usize, &'static str, f64)> {
    let mut channels = Vec::new();
    channels.extend(
        FLUX_LOOPS
            .iter()
            .map(|&c| (c, SLOW_DT, SLOW_POINTS, "Wb", 1.0e-3)),
    );
    channels.extend(BDOTS.iter().map(|&c| (c, FAST_DT, FAST_POINTS, "T/s", 1.0)));
    channels.extend(
        CURRENTS
            .iter()
            .map(|&c| (c, SLOW_DT, SLOW_POINTS, "A", 5.0e5)),
    );
    channels
}

/// Offset plus a half-sine pulse plus deterministic pseudo-noise
fn synthetic_signal(index: usize, dt: f64, points: usize) -> Vec<f64> {
    let offset = 0.01 * (index % 3) as f64;
    let amplitude = 0.1 * (1 + index % 5) as f64;
    (0..points)
        .map(|i| {
            let t = i as f64 * dt;
            let pulse = if t > PULSE_START && t < PULSE_END {
                (PI * (t - PULSE_START) / (PULSE_END - PULSE_START)).sin()
            } else {
                0.0
            };
            offset + amplitude * pulse + noise(index, i)
        })
        .collect()
}

fn noise(channel: usize, sample: usize) -> f64 {
    let h = (channel as u64 + 1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(sample as u64)
        .wrapping_mul(0xBF58_476D_1CE4_E5B9);
    ((h >> 40) as f64 / (1u64 << 24) as f64 - 0.5) * 1e-3
}
