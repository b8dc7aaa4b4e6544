//! Integration tests for p3data
//!
//! These tests run the full chain: shot files on disk, calibration, alignment,
//! processing, export and validation.

use chrono::{TimeZone, Utc};
use p3data::align::{align_shot, AlignConfig, GridSpec};
use p3data::calibration::{write_das_conf, CalibrationTable, DasChannel};
use p3data::dataset::keys::{KEY_PROCESSING_HISTORY, KEY_SHOT};
use p3data::dataset::{ExportConfig, ProcessingHistory};
use p3data::ibw::{encode_wave, read_wave, ByteOrderKind, IbwVersion, NumericType, Wave};
use p3data::pipeline::{build_pipeline, presets, StageSpec};
use p3data::processing::{process_batch, process_shot, ProcessingContext, ProcessingPlan};
use p3data::shot::{channel_file, ShotArchive, ShotLoader, SignalGroup, DAS_CONF_FILE};
use p3data::validator::{validate_export, validate_shot};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

const SHOT: u32 = 109756;
const DT: f64 = 1.0 / 8192.0;
const POINTS: usize = 256;

/// Pre-shot offset, then a constant voltage step from 10 ms
fn step_signal(offset: f64, step: f64) -> Vec<f64> {
    (0..POINTS)
        .map(|i| {
            let t = i as f64 * DT;
            if t < 0.010 {
                offset
            } else {
                offset + step
            }
        })
        .collect()
}

fn write_wave(folder: &Path, wave: Wave) {
    let name = wave.header.name.clone();
    fs::write(channel_file(folder, &name), encode_wave(&wave)).unwrap();
}

/// A small shot: two flux loops, one B-dot probe and the plasma Rogowski coil
fn write_test_shot(root: &Path, shot: u32) {
    let folder = ShotArchive::new(root).shot_folder(shot);
    fs::create_dir_all(&folder).unwrap();
    let created = Utc.with_ymd_and_hms(2023, 8, 9, 14, 0, 0).unwrap();

    write_wave(
        &folder,
        Wave::new("CFL01", 0.0, DT, step_signal(0.5, 0.25))
            .with_units("V")
            .with_created_at(created),
    );
    // Older big-endian version 2 file with double samples
    write_wave(
        &folder,
        Wave::new("CFL02", 0.0, DT, step_signal(-0.25, 0.5))
            .with_units("V")
            .with_numeric_type(NumericType::F64)
            .with_layout(IbwVersion::V2, ByteOrderKind::Big)
            .with_created_at(created),
    );
    // B-dot digitizer runs twice as fast
    let fast: Vec<f64> = (0..POINTS * 2).map(|i| if i < 164 { 0.0 } else { 1.0 }).collect();
    write_wave(
        &folder,
        Wave::new("PDX01", 0.0, DT / 2.0, fast)
            .with_units("V")
            .with_created_at(created),
    );
    write_wave(
        &folder,
        Wave::new("PlasmaRogB", 0.0, DT, step_signal(0.125, 1.0))
            .with_units("V")
            .with_created_at(created),
    );

    let das = vec![
        DasChannel {
            name: "CFL01".to_string(),
            units: "Wb".to_string(),
            scale: 2.0,
        },
        DasChannel {
            name: "CFL02".to_string(),
            units: "Wb".to_string(),
            scale: 2.0,
        },
        DasChannel {
            name: "PDX01".to_string(),
            units: "T".to_string(),
            scale: 1.0,
        },
        DasChannel {
            name: "PlasmaRogB".to_string(),
            units: "A".to_string(),
            scale: 1.0e6,
        },
    ];
    fs::write(folder.join(DAS_CONF_FILE), write_das_conf(&das)).unwrap();
}

fn context(root: &Path) -> ProcessingContext {
    ProcessingContext::new(ShotLoader::new(ShotArchive::new(root)))
}

#[test]
fn test_full_pipeline() {
    let dir = tempdir().unwrap();
    write_test_shot(dir.path(), SHOT);

    let analysis = process_shot(&context(dir.path()), SHOT).unwrap();
    assert_eq!(analysis.datasets.len(), 3);

    let flux = analysis.dataset(SignalGroup::FluxLoops).unwrap();
    assert_eq!(flux.len(), POINTS);
    assert_eq!(flux.time()[1], DT);

    // Offset removed and drift line subtracted: zero at both ends, dip at the step
    let cfl01 = flux.column("CFL01").unwrap().values();
    assert_eq!(cfl01[0], Some(0.0));
    assert!(cfl01[POINTS - 1].unwrap().abs() < 1e-12);
    assert!(flux.value_at("CFL01", 0.010).unwrap() < 0.0);

    let bdots = analysis.dataset(SignalGroup::BDots).unwrap();
    assert_eq!(bdots.len(), POINTS * 2);
    assert_eq!(bdots.history().len(), 5);

    let currents = analysis.dataset(SignalGroup::Currents).unwrap();
    assert_eq!(currents.channel_names(), vec!["Ip"]);
    assert_eq!(currents.column("Ip").unwrap().units(), "A");
}

#[test]
fn test_rereading_gives_identical_traces() {
    let dir = tempdir().unwrap();
    write_test_shot(dir.path(), SHOT);
    let path = ShotArchive::new(dir.path()).channel_path(SHOT, "CFL02");

    let first = read_wave(&path).unwrap();
    let second = read_wave(&path).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.header.version, IbwVersion::V2);
    assert_eq!(first.values, step_signal(-0.25, 0.5));
}

#[test]
fn test_mixed_rates_align_to_fast_grid() {
    let dir = tempdir().unwrap();
    write_test_shot(dir.path(), SHOT);
    let loader = ShotLoader::new(ShotArchive::new(dir.path()));
    let shot = loader.load(SHOT, &["CFL01", "PDX01"]).unwrap();

    let dataset = align_shot(&shot, &AlignConfig::default()).unwrap();
    assert_eq!(dataset.len(), POINTS * 2);
    // The slow channel is interpolated between its own samples
    let midpoint = dataset.value_at("CFL01", DT / 2.0).unwrap();
    assert_eq!(midpoint, 0.5);
    // The last fast sample lies beyond the slow channel's span
    assert_eq!(dataset.missing_count("CFL01"), 1);
    assert_eq!(dataset.missing_count("PDX01"), 0);

    let reference = align_shot(
        &shot,
        &AlignConfig::default().with_grid(GridSpec::Reference("CFL01".to_string())),
    )
    .unwrap();
    assert_eq!(reference.len(), POINTS);
}

#[test]
fn test_export_and_validate() {
    let dir = tempdir().unwrap();
    write_test_shot(dir.path(), SHOT);
    let analysis = process_shot(&context(dir.path()), SHOT).unwrap();
    let flux = analysis.dataset(SignalGroup::FluxLoops).unwrap();

    let path = dir.path().join("flux.parquet");
    let stats = flux.export(&path, &ExportConfig::default()).unwrap();
    assert_eq!(stats.rows_written, POINTS);
    assert_eq!(stats.channels_written, 2);

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
    assert_eq!(rows, POINTS);

    let file_reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
    let kv = file_reader
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .unwrap()
        .clone();
    let value = |key: &str| {
        kv.iter()
            .find(|e| e.key == key)
            .and_then(|e| e.value.clone())
            .unwrap()
    };
    assert_eq!(value(KEY_SHOT), SHOT.to_string());
    let history = ProcessingHistory::from_json(&value(KEY_PROCESSING_HISTORY)).unwrap();
    assert_eq!(
        history.stage_names(),
        vec!["baseline", "integrate", "detrend", "calibrate"]
    );

    let report = validate_export(&path).unwrap();
    assert!(!report.has_failures(), "{}", report);

    let csv_path = dir.path().join("flux.csv");
    flux.export(&csv_path, &ExportConfig::default()).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("time [s],CFL01 [Wb],CFL02 [Wb]"));
    assert_eq!(csv.lines().count(), POINTS + 1);
}

#[test]
fn test_shot_folder_validation() {
    let dir = tempdir().unwrap();
    write_test_shot(dir.path(), SHOT);

    let report = validate_shot(&ShotArchive::new(dir.path()), SHOT).unwrap();
    assert!(!report.has_failures(), "{}", report);
    // Only four of the known channels exist
    assert!(report.has_warnings());
}

#[test]
fn test_custom_plan_composes_like_presets() {
    let dir = tempdir().unwrap();
    write_test_shot(dir.path(), SHOT);
    let folder = ShotArchive::new(dir.path()).shot_folder(SHOT);
    let table = Arc::new(
        CalibrationTable::from_das_conf(&folder.join(DAS_CONF_FILE)).unwrap(),
    );

    let ctx = context(dir.path())
        .with_groups(vec![SignalGroup::FluxLoops])
        .with_plan(ProcessingPlan::Custom(presets::flux_loop_stages()));
    let custom = process_shot(&ctx, SHOT).unwrap();

    let loader = ShotLoader::new(ShotArchive::new(dir.path()));
    let shot = loader.load_groups(SHOT, &[SignalGroup::FluxLoops]).unwrap();
    let aligned = align_shot(&shot, &AlignConfig::default()).unwrap();
    let stages = presets::flux_loop_stages();
    let (head, tail) = stages.split_at(2);
    let manual = build_pipeline(head, &table)
        .then(build_pipeline(tail, &table))
        .run(&aligned)
        .unwrap();

    let from_plan = custom.dataset(SignalGroup::FluxLoops).unwrap();
    assert_eq!(from_plan.time(), manual.time());
    for name in ["CFL01", "CFL02"] {
        assert_eq!(
            from_plan.column(name).unwrap().values(),
            manual.column(name).unwrap().values()
        );
    }
    assert_eq!(from_plan.history(), manual.history());
    assert_eq!(stages.last(), Some(&StageSpec::Calibrate));
}

#[test]
fn test_batch_over_archive() {
    let dir = tempdir().unwrap();
    write_test_shot(dir.path(), SHOT);
    write_test_shot(dir.path(), SHOT + 1);

    let ctx = context(dir.path()).with_groups(vec![SignalGroup::Currents]);
    let results = process_batch(&ctx, &[SHOT, SHOT + 2, SHOT + 1]);

    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_ok());
    assert!(results[1].1.is_err());
    assert!(results[2].1.is_ok());

    let ip = |i: usize| {
        results[i]
            .1
            .as_ref()
            .unwrap()
            .dataset(SignalGroup::Currents)
            .unwrap()
            .column("Ip")
            .unwrap()
            .values()
            .to_vec()
    };
    // Identical inputs give identical outputs
    assert_eq!(ip(0), ip(2));
}
