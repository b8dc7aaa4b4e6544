use super::*;
use crate::ibw::{encode_wave, ReaderError, Wave};
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_channel(folder: &Path, channel: &str, values: Vec<f64>, created_hour: u32) {
    let created = Utc.with_ymd_and_hms(2023, 8, 9, created_hour, 0, 0).unwrap();
    let wave = Wave::new(channel, 0.0, 1e-5, values)
        .with_units("V")
        .with_created_at(created);
    fs::write(channel_file(folder, channel), encode_wave(&wave)).unwrap();
}

// ==================== Trace Tests ====================

#[test]
fn test_trace_rejects_decreasing_times() {
    let err = ChannelTrace::new("X", "V", vec![0.0, 2.0, 1.0], vec![0.0; 3]).unwrap_err();
    assert_eq!(err, TraceError::DecreasingTime { index: 2 });
}

#[test]
fn test_trace_allows_repeated_times() {
    let trace = ChannelTrace::new("X", "V", vec![0.0, 1.0, 1.0, 2.0], vec![0.0; 4]).unwrap();
    assert_eq!(trace.len(), 4);
    assert_eq!(trace.nominal_spacing(), Some(1.0));
}

#[test]
fn test_trace_rejects_non_finite_and_mismatch() {
    assert_eq!(
        ChannelTrace::new("X", "V", vec![0.0, f64::NAN], vec![0.0; 2]).unwrap_err(),
        TraceError::NonFiniteTime { index: 1 }
    );
    assert_eq!(
        ChannelTrace::new("X", "V", vec![0.0], vec![0.0; 2]).unwrap_err(),
        TraceError::LengthMismatch { times: 1, values: 2 }
    );
    assert!(matches!(
        ChannelTrace::uniform("X", "V", 0.0, -1.0, vec![1.0]),
        Err(TraceError::InvalidSpacing(_))
    ));
}

#[test]
fn test_nominal_spacing_is_median() {
    let trace =
        ChannelTrace::new("X", "V", vec![0.0, 1.0, 2.0, 3.0, 10.0], vec![0.0; 5]).unwrap();
    assert_eq!(trace.nominal_spacing(), Some(1.0));
    assert_eq!(trace.span(), Some((0.0, 10.0)));

    let single = ChannelTrace::new("X", "V", vec![5.0], vec![1.0]).unwrap();
    assert_eq!(single.nominal_spacing(), None);
}

// ==================== Archive Tests ====================

#[test]
fn test_shot_folder_layout() {
    let archive = ShotArchive::new("/data");
    assert_eq!(
        archive.shot_folder(109756),
        PathBuf::from("/data/100000/9700/T109756")
    );
    // Short shot numbers are zero padded
    assert_eq!(archive.shot_folder(9756), PathBuf::from("/data/000000/9700/T009756"));
    assert_eq!(archive.shot_folder(12345), PathBuf::from("/data/010000/2300/T012345"));
    assert_eq!(ShotArchive::folder_name(42), "T000042");
    assert_eq!(
        archive.channel_path(109756, "PDX01"),
        PathBuf::from("/data/100000/9700/T109756/PDX01.ibw")
    );
}

#[test]
fn test_signal_groups() {
    assert_eq!(SignalGroup::FluxLoops.channels().len(), 58);
    assert_eq!(SignalGroup::BDots.channels().len(), 46);
    assert!(SignalGroup::Currents.channels().contains(&"PlasmaRogB"));

    // CTor coils appear in both flux loops and B-dots but load once
    let all = SignalGroup::all_channels();
    assert_eq!(all.iter().filter(|c| **c == "CTor1").count(), 1);
    assert_eq!(all.len(), 58 + 46 + 6 - 6);

    assert_eq!("bdots".parse::<SignalGroup>().unwrap(), SignalGroup::BDots);
    assert_eq!("Flux-Loops".parse::<SignalGroup>().unwrap(), SignalGroup::FluxLoops);
    assert!("nope".parse::<SignalGroup>().is_err());
}

// ==================== Loader Tests ====================

#[test]
fn test_load_shot_from_archive() {
    let dir = tempdir().unwrap();
    let archive = ShotArchive::new(dir.path());
    let folder = archive.shot_folder(109756);
    fs::create_dir_all(&folder).unwrap();

    write_channel(&folder, "PDX01", vec![1.0, 2.0, 3.0], 15);
    write_channel(&folder, "PDX02", vec![4.0, 5.0], 14);

    let loader = ShotLoader::new(archive);
    let shot = loader.load(109756, &["PDX01", "PDX02", "PDX03"]).unwrap();

    assert_eq!(shot.number(), 109756);
    assert_eq!(shot.channel_names(), vec!["PDX01", "PDX02"]);
    assert_eq!(shot.missing(), &["PDX03".to_string()]);
    assert_eq!(
        shot.acquired_at(),
        Utc.with_ymd_and_hms(2023, 8, 9, 14, 0, 0).unwrap()
    );

    let trace = shot.trace("PDX01").unwrap();
    assert_eq!(trace.values(), &[1.0, 2.0, 3.0]);
    assert_eq!(trace.units(), "V");
    assert_eq!(trace.source(), Some(channel_file(&folder, "PDX01").as_path()));
}

#[test]
fn test_missing_channel_fail_policy() {
    let dir = tempdir().unwrap();
    write_channel(dir.path(), "PDX01", vec![1.0], 12);

    let err = load_folder(dir.path(), 1, &["PDX01", "PDX09"], MissingPolicy::Fail).unwrap_err();
    assert!(matches!(err, ReaderError::MissingChannel { ref channel, .. } if channel == "PDX09"));
}

#[test]
fn test_missing_folder() {
    let dir = tempdir().unwrap();
    let loader = ShotLoader::new(ShotArchive::new(dir.path()));
    assert!(matches!(loader.load_all(5), Err(ReaderError::Io { .. })));
}

#[test]
fn test_corrupt_channel_aborts_shot() {
    let dir = tempdir().unwrap();
    write_channel(dir.path(), "PDX01", vec![1.0, 2.0], 12);
    fs::write(channel_file(dir.path(), "PDX02"), b"garbage").unwrap();

    let err = load_folder(dir.path(), 7, &["PDX01", "PDX02"], MissingPolicy::Skip).unwrap_err();
    assert!(matches!(err, ReaderError::Format { .. }));
}

#[test]
fn test_duplicate_channels_rejected() {
    let a = ChannelTrace::new("A", "V", vec![0.0], vec![0.0]).unwrap();
    let err = Shot::new(1, Utc::now(), vec![a.clone(), a]).unwrap_err();
    assert!(matches!(err, ReaderError::DuplicateChannel(ref c) if c == "A"));
}

#[test]
fn test_subset_keeps_request_order() {
    let a = ChannelTrace::new("A", "V", vec![0.0], vec![0.0]).unwrap();
    let b = ChannelTrace::new("B", "V", vec![0.0], vec![0.0]).unwrap();
    let shot = Shot::new(1, Utc::now(), vec![a, b]).unwrap();
    let subset = shot.subset(&["B", "Z", "A"]);
    let names: Vec<&str> = subset.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["B", "A"]);
}
