use std::collections::BTreeSet;
use std::path::Path;

use log::debug;

use crate::calibration::read_das_conf;
use crate::ibw::{read_wave, ReaderError};
use crate::shot::{channel_file, ChannelTrace, SignalGroup, DAS_CONF_FILE};

use super::{CheckFamily, ValidationError, ValidationReport};

/// Creation times further apart than this suggest files from different shots
const MAX_CREATION_SPREAD_SECS: u32 = 3600;

const PREVIEW: usize = 5;

fn preview(names: &[String]) -> String {
    if names.len() <= PREVIEW {
        names.join(", ")
    } else {
        format!("{}, ... ({} more)", names[..PREVIEW].join(", "), names.len() - PREVIEW)
    }
}

/// Run every shot folder check
pub(crate) fn check_shot_folder(
    folder: &Path,
    report: &mut ValidationReport,
) -> Result<(), ValidationError> {
    if !folder.is_dir() {
        report.fail(
            CheckFamily::Archive,
            "Shot folder exists",
            format!("Not a directory: {}", folder.display()),
        );
        return Err(ValidationError::StructureError(format!(
            "Shot folder not found: {}",
            folder.display()
        )));
    }
    report.pass(CheckFamily::Archive, "Shot folder exists");

    let calibrated = check_das_conf(folder, report);
    let traces = check_waves(folder, report);
    if traces.is_empty() {
        return Ok(());
    }

    check_samples(&traces, report);
    if let Some(calibrated) = calibrated {
        check_calibration_coverage(&traces, &calibrated, report);
    }
    Ok(())
}

/// Channel names with a DAS.conf block, if the file is usable
fn check_das_conf(folder: &Path, report: &mut ValidationReport) -> Option<BTreeSet<String>> {
    let path = folder.join(DAS_CONF_FILE);
    if !path.is_file() {
        report.fail(
            CheckFamily::Archive,
            "DAS.conf exists",
            "Missing DAS.conf; default calibration is unavailable",
        );
        return None;
    }
    report.pass(CheckFamily::Archive, "DAS.conf exists");

    match read_das_conf(&path) {
        Ok(channels) => {
            report.pass(CheckFamily::Archive, format!(
                "DAS.conf parses ({} channel blocks)",
                channels.len()
            ));
            Some(channels.into_iter().map(|c| c.name).collect())
        }
        Err(e) => {
            report.fail(CheckFamily::Archive, "DAS.conf parses", e.to_string());
            None
        }
    }
}

struct LoadedTrace {
    trace: ChannelTrace,
    created: u32,
}

fn check_waves(folder: &Path, report: &mut ValidationReport) -> Vec<LoadedTrace> {
    let channels = SignalGroup::all_channels();
    let mut missing = Vec::new();
    let mut broken = Vec::new();
    let mut loaded = Vec::new();

    for channel in &channels {
        let path = channel_file(folder, channel);
        if !path.is_file() {
            missing.push(channel.to_string());
            continue;
        }
        let result = read_wave(&path).and_then(|wave| {
            let created = wave.header.creation_date;
            ChannelTrace::from_wave(*channel, wave, Some(&path))
                .map(|trace| LoadedTrace { trace, created })
                .map_err(|source| ReaderError::InvalidTrace {
                    channel: channel.to_string(),
                    source,
                })
        });
        match result {
            Ok(trace) => {
                debug!("{}: {} samples", channel, trace.trace.len());
                loaded.push(trace);
            }
            Err(e) => broken.push(format!("{} ({})", channel, e)),
        }
    }

    if loaded.is_empty() && broken.is_empty() {
        report.fail(
            CheckFamily::Waves,
            "Channel files present",
            "No known channel files in folder",
        );
        return loaded;
    }
    if missing.is_empty() {
        report.pass(CheckFamily::Waves, format!(
            "Channel files present ({})",
            channels.len()
        ));
    } else {
        report.warn(
            CheckFamily::Waves,
            "Channel files present",
            format!(
                "{} of {} channels missing: {}",
                missing.len(),
                channels.len(),
                preview(&missing)
            ),
        );
    }

    if broken.is_empty() {
        report.pass(CheckFamily::Waves, format!(
            "Waves decode ({} channels)",
            loaded.len()
        ));
    } else {
        report.fail(
            CheckFamily::Waves,
            "Waves decode",
            format!("{} unreadable: {}", broken.len(), preview(&broken)),
        );
    }
    loaded
}

fn check_samples(traces: &[LoadedTrace], report: &mut ValidationReport) {
    let non_finite: Vec<String> = traces
        .iter()
        .filter(|t| t.trace.values().iter().any(|v| !v.is_finite()))
        .map(|t| t.trace.name().to_string())
        .collect();
    if non_finite.is_empty() {
        report.pass(CheckFamily::Waves, "Sample values finite");
    } else {
        report.warn(
            CheckFamily::Waves,
            "Sample values finite",
            format!(
                "Non-finite samples (read as missing) in {}",
                preview(&non_finite)
            ),
        );
    }

    let spans: Vec<(f64, f64)> = traces.iter().filter_map(|t| t.trace.span()).collect();
    let start = spans.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
    let end = spans.iter().map(|s| s.1).fold(f64::INFINITY, f64::min);
    if start <= end {
        report.pass(CheckFamily::Waves, format!(
            "Time spans overlap ({:.6} s to {:.6} s)",
            start, end
        ));
    } else {
        report.warn(
            CheckFamily::Waves,
            "Time spans overlap",
            "No common time range; intersection alignment will fail",
        );
    }

    let first = traces.iter().map(|t| t.created).min().unwrap_or(0);
    let last = traces.iter().map(|t| t.created).max().unwrap_or(0);
    if last - first <= MAX_CREATION_SPREAD_SECS {
        report.pass(CheckFamily::Waves, "Creation times consistent");
    } else {
        report.warn(
            CheckFamily::Waves,
            "Creation times consistent",
            format!("Wave creation times span {} s", last - first),
        );
    }
}

fn check_calibration_coverage(
    traces: &[LoadedTrace],
    calibrated: &BTreeSet<String>,
    report: &mut ValidationReport,
) {
    let uncovered: Vec<String> = traces
        .iter()
        .map(|t| t.trace.name())
        .filter(|name| !calibrated.contains(*name))
        .map(str::to_string)
        .collect();
    if uncovered.is_empty() {
        report.pass(CheckFamily::Calibration, "Calibration coverage");
    } else {
        report.warn(
            CheckFamily::Calibration,
            "Calibration coverage",
            format!("No DAS.conf block for {}", preview(&uncovered)),
        );
    }
}
