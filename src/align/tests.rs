use super::*;
use chrono::Utc;

// Power-of-two spacings keep grid arithmetic exact
const SLOW_DT: f64 = 1.0 / 1024.0;
const FAST_DT: f64 = 1.0 / 2048.0;

fn trace(name: &str, times: Vec<f64>) -> Arc<ChannelTrace> {
    // value equals time in ticks of SLOW_DT so interpolation is easy to check
    let values = times.iter().map(|t| t / SLOW_DT).collect();
    Arc::new(ChannelTrace::new(name, "V", times, values).unwrap())
}

fn uniform(name: &str, dt: f64, n: usize) -> Arc<ChannelTrace> {
    trace(name, (0..n).map(|i| i as f64 * dt).collect())
}

fn align(traces: &[Arc<ChannelTrace>], config: &AlignConfig) -> Result<AlignedDataset, AlignmentError> {
    align_traces(7, Utc::now(), traces, config)
}

// ==================== Mixed-Rate Tests ====================

#[test]
fn test_slow_channel_on_fast_grid() {
    let fast = uniform("fast", FAST_DT, 21);
    // 1 kHz-ish channel with a hole between ticks 5 and 9
    let slow = trace(
        "slow",
        [0, 1, 2, 3, 4, 5, 9, 10].iter().map(|&i| i as f64 * SLOW_DT).collect(),
    );

    let ds = align(&[slow, fast], &AlignConfig::at_rate(2048.0)).unwrap();
    assert_eq!(ds.len(), 21);
    let values = ds.column("slow").unwrap().values();

    for (i, value) in values.iter().enumerate() {
        let ticks = i as f64 / 2.0;
        if ticks > 5.0 && ticks < 9.0 {
            assert_eq!(*value, None, "grid point {} lies in the gap", i);
        } else {
            let v = value.expect("interpolated inside span");
            assert!((v - ticks).abs() < 1e-12, "point {}: {} != {}", i, v, ticks);
        }
    }
    assert_eq!(ds.missing_count("slow"), 7);
    assert_eq!(ds.missing_count("fast"), 0);
}

#[test]
fn test_points_outside_channel_span_are_missing() {
    let long = uniform("long", FAST_DT, 9);
    let short = trace("short", vec![2.0 * FAST_DT, 3.0 * FAST_DT, 4.0 * FAST_DT]);

    let ds = align(&[long, short], &AlignConfig::default()).unwrap();
    let values = ds.column("short").unwrap().values();
    assert!(values[..2].iter().all(Option::is_none));
    assert!(values[2..5].iter().all(Option::is_some));
    assert!(values[5..].iter().all(Option::is_none));
}

// ==================== Grid Tests ====================

#[test]
fn test_finest_grid_uses_smallest_spacing() {
    let ds = align(
        &[uniform("slow", SLOW_DT, 5), uniform("fast", FAST_DT, 9)],
        &AlignConfig::default(),
    )
    .unwrap();
    assert_eq!(ds.len(), 9);
    assert_eq!(ds.time()[1], FAST_DT);
}

#[test]
fn test_grid_points_by_multiplication_end_clamped() {
    let a = trace("a", vec![0.0, 0.1, 0.2, 0.3]);
    let ds = align(&[a], &AlignConfig::at_rate(10.0)).unwrap();
    assert_eq!(ds.len(), 4);
    // 3 * 0.1 overshoots 0.3 by one ulp
    assert_eq!(ds.time()[3], 0.3);
}

#[test]
fn test_intersection_span() {
    let a = trace("a", (0..9).map(|i| i as f64 * FAST_DT).collect());
    let b = trace("b", (4..13).map(|i| i as f64 * FAST_DT).collect());

    let config = AlignConfig::default().with_span(SpanPolicy::Intersection);
    let ds = align(&[a, b], &config).unwrap();
    assert_eq!(ds.time().first(), Some(&(4.0 * FAST_DT)));
    assert_eq!(ds.time().last(), Some(&(8.0 * FAST_DT)));
    assert_eq!(ds.missing_count("a") + ds.missing_count("b"), 0);
}

#[test]
fn test_reference_grid() {
    let reference = trace("ref", vec![0.0, 0.25, 0.25, 0.75, 1.0]);
    let other = uniform("other", 0.125, 9);

    let config = AlignConfig::default().with_grid(GridSpec::Reference("ref".to_string()));
    let ds = align(&[reference, other], &config).unwrap();
    assert_eq!(ds.time(), &[0.0, 0.25, 0.75, 1.0]);
}

#[test]
fn test_grid_strictly_increasing_within_span() {
    let a = trace("a", vec![0.013, 0.0171, 0.02, 0.031]);
    let b = trace("b", vec![0.011, 0.014, 0.029]);
    for config in [
        AlignConfig::default(),
        AlignConfig::at_rate(997.0),
        AlignConfig::default().with_span(SpanPolicy::Intersection),
    ] {
        let ds = align(&[a.clone(), b.clone()], &config).unwrap();
        let t = ds.time();
        assert!(t.windows(2).all(|w| w[0] < w[1]));
        assert!(t[0] >= 0.011 && *t.last().unwrap() <= 0.031);
    }
}

// ==================== Interpolation Tests ====================

#[test]
fn test_nearest_interpolation() {
    let a = trace("a", vec![0.0, 1.0, 2.0]);
    let config = AlignConfig::at_rate(4.0).with_method(Interpolation::Nearest);
    let ds = align(&[a], &config).unwrap();
    let values: Vec<f64> = ds
        .column("a")
        .unwrap()
        .values()
        .iter()
        .map(|v| v.unwrap() * SLOW_DT)
        .collect();
    // Ties go to the earlier sample
    assert_eq!(values, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0]);
}

#[test]
fn test_non_finite_samples_are_missing() {
    let a = Arc::new(
        ChannelTrace::new("a", "V", vec![0.0, 1.0, 2.0, 3.0], vec![0.0, f64::NAN, 2.0, 3.0])
            .unwrap(),
    );
    let ds = align(&[a], &AlignConfig::at_rate(2.0)).unwrap();
    let values = ds.column("a").unwrap().values();
    assert_eq!(values[0], Some(0.0));
    assert_eq!(values[1], None);
    assert_eq!(values[2], None);
    assert_eq!(values[3], None);
    assert_eq!(values[4], Some(2.0));
    assert_eq!(values[5], Some(2.5));
}

#[test]
fn test_seconds_tolerance() {
    let a = trace("a", vec![0.0, 1.0, 3.0]);
    let loose = AlignConfig::at_rate(1.0).with_gap_tolerance(GapTolerance::Seconds(2.0));
    assert_eq!(align(&[a.clone()], &loose).unwrap().missing_count("a"), 0);

    let tight = AlignConfig::at_rate(1.0).with_gap_tolerance(GapTolerance::Seconds(1.0));
    assert_eq!(align(&[a], &tight).unwrap().missing_count("a"), 1);
}

#[test]
fn test_alignment_is_deterministic() {
    let traces = [uniform("slow", SLOW_DT, 11), uniform("fast", FAST_DT, 17)];
    let config = AlignConfig::default();
    assert_eq!(align(&traces, &config).unwrap(), align(&traces, &config).unwrap());
}

#[test]
fn test_provenance_and_history() {
    let fast = uniform("fast", FAST_DT, 4);
    let ds = align(&[fast.clone()], &AlignConfig::default()).unwrap();
    let prov = ds.column("fast").unwrap().provenance();
    assert_eq!(prov.shot, 7);
    assert!(Arc::ptr_eq(prov.source.as_ref().unwrap(), &fast));
    assert!(ds.history().is_empty());
}

// ==================== Error Tests ====================

#[test]
fn test_alignment_errors() {
    let config = AlignConfig::default();
    assert_eq!(align(&[], &config).unwrap_err(), AlignmentError::NoTraces);

    let empty = trace("empty", vec![]);
    assert_eq!(
        align(&[empty], &config).unwrap_err(),
        AlignmentError::EmptyTrace("empty".to_string())
    );

    let a = uniform("a", 1.0, 3);
    assert!(matches!(
        align(&[a.clone()], &AlignConfig::at_rate(0.0)),
        Err(AlignmentError::InvalidRate(_))
    ));
    assert!(matches!(
        align(&[a.clone()], &AlignConfig::at_rate(f64::NAN)),
        Err(AlignmentError::InvalidRate(_))
    ));
    assert_eq!(
        align(
            &[a.clone()],
            &config.clone().with_grid(GridSpec::Reference("b".to_string()))
        )
        .unwrap_err(),
        AlignmentError::UnknownReference("b".to_string())
    );

    let late = trace("late", vec![10.0, 11.0]);
    assert_eq!(
        align(
            &[a.clone(), late],
            &config.clone().with_span(SpanPolicy::Intersection)
        )
        .unwrap_err(),
        AlignmentError::EmptySpan
    );

    let mut huge = AlignConfig::at_rate(1e9);
    huge.max_grid_points = 1000;
    assert!(matches!(
        align(&[a], &huge),
        Err(AlignmentError::GridTooLarge { max: 1000, .. })
    ));

    let single = trace("single", vec![1.0]);
    let other = trace("other", vec![2.0]);
    assert_eq!(
        align(&[single.clone(), other], &config).unwrap_err(),
        AlignmentError::UndefinedSpacing
    );
    assert_eq!(align(&[single], &config).unwrap().time(), &[1.0]);
}

#[test]
fn test_strict_gaps() {
    let gappy = trace("gappy", vec![0.0, 1.0, 5.0, 6.0]);
    let config = AlignConfig::at_rate(1.0).with_strict_gaps(true);
    assert_eq!(
        align(&[gappy.clone()], &config).unwrap_err(),
        AlignmentError::Gap {
            channel: "gappy".to_string(),
            missing: 3
        }
    );

    // Missing points outside a channel's own span are not gaps
    let short = trace("short", vec![2.0, 3.0]);
    let full = uniform("full", 1.0, 6);
    assert!(align(&[short, full], &config).is_ok());
}

#[test]
fn test_align_shot_channels() {
    let shot = Shot::new(
        99,
        Utc::now(),
        vec![
            ChannelTrace::uniform("A", "V", 0.0, 1.0, vec![1.0, 2.0]).unwrap(),
            ChannelTrace::uniform("B", "V", 0.0, 1.0, vec![3.0, 4.0]).unwrap(),
        ],
    )
    .unwrap();
    let all = align_shot(&shot, &AlignConfig::default()).unwrap();
    assert_eq!(all.channel_names(), vec!["A", "B"]);
    assert_eq!(all.shot(), 99);

    let only_b = align_channels(&shot, &["B", "Z"], &AlignConfig::default()).unwrap();
    assert_eq!(only_b.channel_names(), vec!["B"]);
}
