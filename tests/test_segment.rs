mod common;
use common::{ramp, rem_scores};
use lfpseg::{mask_stimuli, segment, SegmenterConfig};

fn small_cfg() -> SegmenterConfig {
    SegmenterConfig {
        artifact_window: 3000,
        stage_repeat: 5000,
        ..SegmenterConfig::default()
    }
}

#[test]
fn single_onset_rem_example() {
    // 10 000 samples, one onset at 500 → [500, 3500) masked. One REM bucket
    // labels offsets [0, 5000); the rest are unassigned. The filtered REM
    // group keeps 5000 − 3000 = 2000 samples.
    let data = ramp(10_000);
    let groups = segment(&data, &rem_scores(1), &[500], &small_cfg());

    assert_eq!(groups.rem.count(), 5000);
    assert_eq!(groups.unassigned, 5000);

    let filtered = groups.rem.strip_artifacts();
    assert_eq!(filtered.len(), 2000);
    // Survivors are offsets [0,500) and [3500,5000), in ascending order.
    assert_eq!(filtered.values[0], 0.0);
    assert_eq!(filtered.values[499], 499.0);
    assert_eq!(filtered.values[500], 3500.0);
    assert_eq!(*filtered.values.last().unwrap(), 4999.0);
    // Group positions mirror the gap left by the artifact window.
    assert_eq!(filtered.indices[499], 499);
    assert_eq!(filtered.indices[500], 3500);
}

#[test]
fn masked_samples_lie_only_inside_valid_windows() {
    let data = ramp(10_000);
    // Last onset's window would overrun and must mask nothing.
    let onsets = [0, 2500, 2600, 9000];
    let window = 3000;
    let masked = mask_stimuli(&data, &onsets, window);

    for (i, v) in masked.iter().enumerate() {
        let in_valid_window = onsets
            .iter()
            .any(|&s| s + window <= data.len() && i >= s && i < s + window);
        assert_eq!(v.is_none(), in_valid_window, "offset {i}");
    }
}

#[test]
fn every_offset_lands_in_exactly_one_group_or_none() {
    // 12 buckets cycling through all codes plus an unrecognised one.
    let scores: Vec<f32> = [1.0, 2.0, 3.0, 4.0, 5.0, 7.0]
        .iter()
        .cycle()
        .take(12)
        .copied()
        .collect();
    let cfg = SegmenterConfig {
        stage_repeat: 10,
        artifact_window: 5,
        ..SegmenterConfig::default()
    };
    // 130 samples: 120 labeled, 10 past the label sequence.
    let data = ramp(130);
    let groups = segment(&data, &scores, &[40], &cfg);

    let labeled = groups.wakefulness.count()
        + groups.nrem.count()
        + groups.rem.count()
        + groups.unidentified.count();
    assert_eq!(labeled + groups.unassigned, data.len());
    assert_eq!(groups.wakefulness.count(), 40); // codes 1 and 2
    assert_eq!(groups.nrem.count(), 20);
    assert_eq!(groups.rem.count(), 20);
    assert_eq!(groups.unidentified.count(), 20);
    assert_eq!(groups.unassigned, 30); // code 7 buckets + 10 beyond labels
}

#[test]
fn artifact_counted_in_group_but_stripped_from_values() {
    let data = ramp(100);
    let cfg = SegmenterConfig {
        stage_repeat: 100,
        artifact_window: 10,
        ..SegmenterConfig::default()
    };
    let groups = segment(&data, &[4.0], &[20], &cfg);
    assert_eq!(groups.rem.count(), 100);
    let filtered = groups.rem.strip_artifacts();
    assert_eq!(filtered.len(), 90);
    assert!(!filtered.values.contains(&25.0));
}
