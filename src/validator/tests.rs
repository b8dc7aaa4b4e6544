use super::*;
use crate::align::{align_traces, AlignConfig};
use crate::calibration::{write_das_conf, DasChannel};
use crate::dataset::ExportConfig;
use crate::ibw::{encode_wave, Wave};
use crate::shot::{channel_file, ChannelTrace, DAS_CONF_FILE};
use chrono::{Duration, TimeZone, Utc};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn status_of<'a>(report: &'a ValidationReport, prefix: &str) -> &'a CheckStatus {
    &report
        .checks()
        .iter()
        .find(|c| c.name.starts_with(prefix))
        .unwrap_or_else(|| panic!("no check named {prefix}"))
        .status
}

fn write_wave(folder: &Path, channel: &str, values: Vec<f64>, x0: f64, hours: i64) {
    let created = Utc.with_ymd_and_hms(2023, 8, 9, 14, 0, 0).unwrap() + Duration::hours(hours);
    let wave = Wave::new(channel, x0, 1e-4, values)
        .with_units("V")
        .with_created_at(created);
    fs::write(channel_file(folder, channel), encode_wave(&wave)).unwrap();
}

fn write_das(folder: &Path, names: &[&str]) {
    let channels: Vec<DasChannel> = names
        .iter()
        .map(|name| DasChannel {
            name: name.to_string(),
            units: "V".to_string(),
            scale: 1.0,
        })
        .collect();
    fs::write(folder.join(DAS_CONF_FILE), write_das_conf(&channels)).unwrap();
}

// ==================== Report Tests ====================

#[test]
fn test_report_groups_checks_by_family() {
    let folder = Path::new("/archive/100000/9700/T109756");
    let mut report = ValidationReport::new(Target::shot_folder(folder));
    report.pass(CheckFamily::Archive, "Shot folder exists");
    report.warn(CheckFamily::Waves, "Channel files present", "3 of 104 channels missing");
    report.fail(CheckFamily::Calibration, "Calibration coverage", "No block for PDX01");
    report.pass(CheckFamily::Waves, "Waves decode");

    assert!(matches!(report.target(), Target::ShotFolder { shot: Some(109756), .. }));
    assert_eq!(
        report.family_tally(CheckFamily::Waves),
        Tally {
            passed: 1,
            warnings: 1,
            failed: 0
        }
    );
    assert_eq!(report.family(CheckFamily::Export).count(), 0);
    assert!(report.has_failures());
    assert!(report.has_warnings());
    assert!(report.check("Waves decode").is_some());

    let output = report.to_string();
    assert!(output.starts_with("Shot 109756 (/archive/100000/9700/T109756)"));
    assert!(output.contains("Waves (1 passed, 1 warnings, 0 failed)"));
    assert!(output.contains("[FAIL] Calibration coverage: No block for PDX01"));
    assert!(!output.contains("Export ("));
    // Families print in a fixed order regardless of check order
    assert!(output.find("\nArchive").unwrap() < output.find("\nWaves").unwrap());
    assert!(output.find("\nWaves").unwrap() < output.find("\nCalibration").unwrap());
    assert!(output.trim_end().ends_with("FAILED: 2 passed, 1 warnings, 1 failed"));
}

#[test]
fn test_target_without_shot_number() {
    let target = Target::shot_folder(Path::new("/tmp/scratch"));
    assert_eq!(
        target,
        Target::ShotFolder {
            shot: None,
            path: "/tmp/scratch".into()
        }
    );
    assert_eq!(target.to_string(), "Shot folder /tmp/scratch");
    assert_eq!(
        Target::export(Path::new("ip.parquet")).to_string(),
        "Export ip.parquet"
    );
}

// ==================== Shot Folder Tests ====================

#[test]
fn test_healthy_shot_folder() {
    let dir = tempdir().unwrap();
    write_wave(dir.path(), "CFL01", vec![1.0; 20], 0.0, 0);
    write_wave(dir.path(), "PDX01", vec![2.0; 20], 0.0, 0);
    write_das(dir.path(), &["CFL01", "PDX01"]);

    let report = validate_shot_folder(dir.path()).unwrap();
    assert!(!report.has_failures(), "{}", report);
    assert_eq!(status_of(&report, "DAS.conf parses"), &CheckStatus::Passed);
    assert_eq!(status_of(&report, "Waves decode"), &CheckStatus::Passed);
    assert_eq!(status_of(&report, "Calibration coverage"), &CheckStatus::Passed);
    // Most known channels are absent from this folder
    assert!(matches!(
        status_of(&report, "Channel files present"),
        CheckStatus::Warning(msg) if msg.starts_with("102 of 104")
    ));
}

#[test]
fn test_missing_folder_is_error() {
    let dir = tempdir().unwrap();
    let err = validate_shot_folder(&dir.path().join("T000001")).unwrap_err();
    assert!(matches!(err, ValidationError::StructureError(_)));
}

#[test]
fn test_validate_shot_uses_archive_layout() {
    let dir = tempdir().unwrap();
    let archive = ShotArchive::new(dir.path());
    let folder = archive.shot_folder(9756);
    fs::create_dir_all(&folder).unwrap();
    write_wave(&folder, "CFL01", vec![1.0; 5], 0.0, 0);
    write_das(&folder, &["CFL01"]);

    let report = validate_shot(&archive, 9756).unwrap();
    assert!(report.target().path().ends_with("T009756"));
    assert!(matches!(report.target(), Target::ShotFolder { shot: Some(9756), .. }));
    assert!(!report.has_failures());
}

#[test]
fn test_missing_das_conf_fails() {
    let dir = tempdir().unwrap();
    write_wave(dir.path(), "CFL01", vec![1.0; 5], 0.0, 0);

    let report = validate_shot_folder(dir.path()).unwrap();
    assert!(report.has_failures());
    assert!(matches!(
        status_of(&report, "DAS.conf exists"),
        CheckStatus::Failed(_)
    ));
}

#[test]
fn test_corrupt_wave_fails() {
    let dir = tempdir().unwrap();
    write_wave(dir.path(), "CFL01", vec![1.0; 5], 0.0, 0);
    fs::write(channel_file(dir.path(), "PDX01"), b"not a wave").unwrap();
    write_das(dir.path(), &["CFL01", "PDX01"]);

    let report = validate_shot_folder(dir.path()).unwrap();
    match status_of(&report, "Waves decode") {
        CheckStatus::Failed(msg) => assert!(msg.contains("PDX01")),
        other => panic!("unexpected status {other:?}"),
    }
}

#[test]
fn test_empty_folder_fails() {
    let dir = tempdir().unwrap();
    write_das(dir.path(), &["CFL01"]);

    let report = validate_shot_folder(dir.path()).unwrap();
    assert!(matches!(
        status_of(&report, "Channel files present"),
        CheckStatus::Failed(_)
    ));
}

#[test]
fn test_sample_warnings() {
    let dir = tempdir().unwrap();
    write_wave(dir.path(), "CFL01", vec![1.0, f64::NAN, 1.0], 0.0, 0);
    write_wave(dir.path(), "CFL02", vec![1.0; 3], 5.0, 3);
    write_das(dir.path(), &["CFL01"]);

    let report = validate_shot_folder(dir.path()).unwrap();
    assert!(!report.has_failures());
    assert!(matches!(
        status_of(&report, "Sample values finite"),
        CheckStatus::Warning(msg) if msg.contains("CFL01")
    ));
    assert!(matches!(
        status_of(&report, "Time spans overlap"),
        CheckStatus::Warning(_)
    ));
    assert!(matches!(
        status_of(&report, "Creation times consistent"),
        CheckStatus::Warning(_)
    ));
    assert!(matches!(
        status_of(&report, "Calibration coverage"),
        CheckStatus::Warning(msg) if msg.contains("CFL02")
    ));
}

// ==================== Export Tests ====================

#[test]
fn test_valid_export() {
    let dir = tempdir().unwrap();
    let trace = ChannelTrace::uniform("CFL01", "V", 0.0, 1e-3, vec![1.0, 2.0, 3.0]).unwrap();
    let dataset = align_traces(
        109756,
        Utc.with_ymd_and_hms(2023, 8, 9, 14, 0, 0).unwrap(),
        &[Arc::new(trace)],
        &AlignConfig::default(),
    )
    .unwrap();
    let path = dir.path().join("shot.parquet");
    dataset
        .write_parquet(&path, &ExportConfig::default())
        .unwrap();

    let report = validate_export(&path).unwrap();
    assert!(!report.has_failures(), "{}", report);
    assert!(!report.has_warnings(), "{}", report);
    assert!(report.check("Shot number (109756)").is_some());
    assert!(report.check("Time strictly increasing (3 rows)").is_some());
    assert_eq!(report.family(CheckFamily::Export).count(), report.checks().len());
}

#[test]
fn test_non_parquet_export_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shot.parquet");
    fs::write(&path, b"time,CFL01\n0,1\n").unwrap();

    assert!(matches!(
        validate_export(&path),
        Err(ValidationError::ParquetError(_))
    ));
}
