use super::*;
use crate::calibration::{write_das_conf, CalibrationEntry, DasChannel};
use crate::ibw::{encode_wave, Wave};
use crate::pipeline::StageSpec;
use crate::shot::{channel_file, ShotArchive, ShotLoader};
use chrono::TimeZone;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const SHOT: u32 = 109756;

fn write_channel(folder: &Path, channel: &str, level: f64) {
    let created = Utc.with_ymd_and_hms(2023, 8, 9, 14, 0, 0).unwrap();
    let wave = Wave::new(channel, 0.0, 1e-4, vec![level; 100])
        .with_units("V")
        .with_created_at(created);
    fs::write(channel_file(folder, channel), encode_wave(&wave)).unwrap();
}

fn das_channel(name: &str, units: &str, scale: f64) -> DasChannel {
    DasChannel {
        name: name.to_string(),
        units: units.to_string(),
        scale,
    }
}

fn write_shot(root: &Path, shot: u32, channels: &[&str], das: Option<&[DasChannel]>) {
    let folder = ShotArchive::new(root).shot_folder(shot);
    fs::create_dir_all(&folder).unwrap();
    for channel in channels {
        write_channel(&folder, channel, 0.25);
    }
    if let Some(das) = das {
        fs::write(folder.join(DAS_CONF_FILE), write_das_conf(das)).unwrap();
    }
}

fn standard_das() -> Vec<DasChannel> {
    vec![
        das_channel("CFL01", "Wb", 2.0),
        das_channel("CFL02", "Wb", 2.0),
        das_channel("PDX01", "T", 0.5),
        das_channel("PlasmaRogB", "A", 1e6),
    ]
}

fn archive_with_standard_shot() -> TempDir {
    let dir = tempdir().unwrap();
    write_shot(
        dir.path(),
        SHOT,
        &["CFL01", "CFL02", "PDX01", "PlasmaRogB"],
        Some(&standard_das()),
    );
    dir
}

fn context(root: &Path) -> ProcessingContext {
    ProcessingContext::new(ShotLoader::new(ShotArchive::new(root)))
}

// ==================== Single Shot Tests ====================

#[test]
fn test_process_shot_with_presets() {
    let dir = archive_with_standard_shot();
    let analysis = process_shot(&context(dir.path()), SHOT).unwrap();

    assert_eq!(analysis.shot, SHOT);
    assert_eq!(analysis.datasets.len(), 3);
    assert!(analysis.missing.contains(&"CFL03".to_string()));

    let flux = analysis.dataset(SignalGroup::FluxLoops).unwrap();
    assert_eq!(flux.channel_names(), vec!["CFL01", "CFL02"]);
    assert_eq!(flux.column("CFL01").unwrap().units(), "Wb");
    assert_eq!(
        flux.history().stage_names(),
        vec!["baseline", "integrate", "detrend", "calibrate"]
    );

    let bdots = analysis.dataset(SignalGroup::BDots).unwrap();
    assert_eq!(bdots.channel_names(), vec!["PDX01"]);
    assert_eq!(bdots.history().len(), 5);

    let currents = analysis.dataset(SignalGroup::Currents).unwrap();
    assert_eq!(currents.channel_names(), vec!["Ip"]);
    assert_eq!(currents.column("Ip").unwrap().units(), "A");
    assert_eq!(currents.column("Ip").unwrap().provenance().channel, "PlasmaRogB");
    assert_eq!(
        currents.history().stage_names(),
        vec!["select", "baseline", "integrate", "detrend", "calibrate", "rename"]
    );

    assert_eq!(analysis.channel_count(), 4);
}

#[test]
fn test_constant_signal_cleans_to_zero() {
    let dir = archive_with_standard_shot();
    let analysis = process_shot(&context(dir.path()), SHOT).unwrap();
    let flux = analysis.dataset(SignalGroup::FluxLoops).unwrap();

    for value in flux.column("CFL01").unwrap().values().iter().flatten() {
        assert!(value.abs() < 1e-9, "value {} not removed", value);
    }
}

#[test]
fn test_group_without_channels_is_skipped() {
    let dir = tempdir().unwrap();
    write_shot(
        dir.path(),
        SHOT,
        &["CFL01"],
        Some(&[das_channel("CFL01", "Wb", 1.0)]),
    );

    let analysis = process_shot(&context(dir.path()), SHOT).unwrap();
    assert_eq!(
        analysis.datasets.keys().copied().collect::<Vec<_>>(),
        vec![SignalGroup::FluxLoops]
    );
}

#[test]
fn test_currents_without_plasma_rogowski_are_skipped() {
    let dir = tempdir().unwrap();
    write_shot(
        dir.path(),
        SHOT,
        &["PlasmaRogA"],
        Some(&[das_channel("PlasmaRogA", "A", 1.0)]),
    );

    let ctx = context(dir.path()).with_groups(vec![SignalGroup::Currents]);
    let analysis = process_shot(&ctx, SHOT).unwrap();
    assert!(analysis.datasets.is_empty());
}

#[test]
fn test_restricted_groups() {
    let dir = archive_with_standard_shot();
    let ctx = context(dir.path()).with_groups(vec![SignalGroup::BDots]);
    let analysis = process_shot(&ctx, SHOT).unwrap();

    assert_eq!(analysis.datasets.len(), 1);
    assert!(analysis.dataset(SignalGroup::BDots).is_some());
}

#[test]
fn test_custom_plan_without_calibration_needs_no_das_conf() {
    let dir = tempdir().unwrap();
    write_shot(dir.path(), SHOT, &["CFL01", "PDX01"], None);

    let plan = ProcessingPlan::Custom(vec![StageSpec::Scale {
        factor: 4.0,
        units: Some("mV".to_string()),
    }]);
    let ctx = context(dir.path()).with_plan(plan);
    let analysis = process_shot(&ctx, SHOT).unwrap();

    let flux = analysis.dataset(SignalGroup::FluxLoops).unwrap();
    assert_eq!(flux.column("CFL01").unwrap().units(), "mV");
    assert_eq!(flux.value_at("CFL01", 0.005), Some(1.0));
}

#[test]
fn test_shared_calibration_table() {
    let dir = tempdir().unwrap();
    write_shot(dir.path(), SHOT, &["CFL01"], None);

    let mut table = CalibrationTable::new();
    table
        .insert(CalibrationEntry::linear("CFL01", 3.0, "Wb"))
        .unwrap();
    let ctx = context(dir.path())
        .with_groups(vec![SignalGroup::FluxLoops])
        .with_calibration(CalibrationSource::Table(Arc::new(table)));

    let analysis = process_shot(&ctx, SHOT).unwrap();
    let flux = analysis.dataset(SignalGroup::FluxLoops).unwrap();
    assert_eq!(flux.column("CFL01").unwrap().units(), "Wb");
}

#[test]
fn test_process_loaded_in_memory_shot() {
    let trace = crate::shot::ChannelTrace::uniform("CFL01", "V", 0.0, 1e-4, vec![1.0; 40])
        .unwrap();
    let shot = Shot::new(7, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(), vec![trace])
        .unwrap();
    let mut table = CalibrationTable::new();
    table
        .insert(CalibrationEntry::linear("CFL01", 1.0, "Wb"))
        .unwrap();

    let ctx = ProcessingContext::default()
        .with_groups(vec![SignalGroup::FluxLoops])
        .with_calibration(CalibrationSource::Table(Arc::new(table)));
    let analysis = process_loaded(&ctx, &shot).unwrap();
    assert_eq!(analysis.shot, 7);
    assert_eq!(analysis.channel_count(), 1);
}

// ==================== Error Tests ====================

#[test]
fn test_missing_folder_is_read_error() {
    let dir = tempdir().unwrap();
    let err = process_shot(&context(dir.path()), SHOT).unwrap_err();

    assert_eq!(err.shot(), SHOT);
    assert_eq!(err.step(), "read");
    assert!(err.to_string().contains("109756"));
}

#[test]
fn test_missing_das_conf_is_calibration_error() {
    let dir = tempdir().unwrap();
    write_shot(dir.path(), SHOT, &["CFL01"], None);

    let err = process_shot(&context(dir.path()), SHOT).unwrap_err();
    assert_eq!(err.step(), "calibration");
    assert!(matches!(
        err,
        ProcessingError::Calibration {
            source: CalibrationError::Io { .. },
            ..
        }
    ));
}

#[test]
fn test_uncalibrated_channel_is_transform_error() {
    let dir = tempdir().unwrap();
    write_shot(
        dir.path(),
        SHOT,
        &["CFL01", "PDX01"],
        Some(&[das_channel("CFL01", "Wb", 1.0)]),
    );

    let err = process_shot(&context(dir.path()), SHOT).unwrap_err();
    match err {
        ProcessingError::Transform { group, source, .. } => {
            assert_eq!(group, SignalGroup::BDots);
            assert_eq!(source.stage, "calibrate");
            assert_eq!(source.stage_index, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ==================== Batch Tests ====================

#[test]
fn test_batch_isolates_failures_and_keeps_order() {
    let dir = archive_with_standard_shot();
    write_shot(
        dir.path(),
        SHOT + 1,
        &["CFL01"],
        Some(&[das_channel("CFL01", "Wb", 1.0)]),
    );

    let ctx = context(dir.path()).with_groups(vec![SignalGroup::FluxLoops]);
    let results = process_batch(&ctx, &[SHOT + 1, 42, SHOT]);

    let shots: Vec<u32> = results.iter().map(|(shot, _)| *shot).collect();
    assert_eq!(shots, vec![SHOT + 1, 42, SHOT]);
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].1.as_ref().unwrap_err().step(), "read");
    assert_eq!(
        results[2].1.as_ref().unwrap().dataset(SignalGroup::FluxLoops).unwrap().columns().len(),
        2
    );
}

#[test]
fn test_batch_empty() {
    let ctx = ProcessingContext::default();
    assert!(process_batch(&ctx, &[]).is_empty());
}
