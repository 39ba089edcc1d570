use lfpseg::config::SegmenterConfig;
use lfpseg::io::{load_assignments, save_assignments};
use lfpseg::tetrode::{assign, label_quality, Quality};

fn channel_map(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

#[test]
fn lead_numbers_follow_map_position() {
    let map = channel_map(&["HPC TT1", "HPC TT1", "HPC TT1", "HPC TT1", "HPC TT2"]);
    let rows = assign(&map, &[0, 1, 2, 3, 4]);

    let leads: Vec<u8> = rows.iter().map(|a| a.lead).collect();
    assert_eq!(leads, vec![1, 2, 3, 4, 1]);
    let tetrodes: Vec<&str> = rows.iter().map(|a| a.tetrode.as_str()).collect();
    assert_eq!(tetrodes, vec!["TT1", "TT1", "TT1", "TT1", "TT2"]);
    assert!(rows.iter().all(|a| a.area == "HPC"));
}

#[test]
fn full_assignment_then_labeling_round_trip() {
    let map = channel_map(&[
        "PFC TT1", "PFC TT1", "PFC TT1", "PFC TT1",
        "BLA TT2", "BLA TT2", "BLA TT2", "BLA TT2",
    ]);
    // Position 5 has no data file.
    let present = [0, 1, 2, 3, 4, 6, 7];
    let mut rows = assign(&map, &present);
    assert_eq!(rows.len(), 7);

    label_quality(&mut rows, &[0, 4, 6]);
    let good: Vec<usize> = rows
        .iter()
        .filter(|a| a.quality == Some(Quality::Good))
        .filter_map(|a| a.file_index())
        .collect();
    assert_eq!(good, vec![0, 4, 6]);

    // Persist and reload through the JSON table.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("r14_habituation_assigned.json");
    save_assignments(&path, &rows).unwrap();
    let reloaded = load_assignments(&path).unwrap();
    assert_eq!(reloaded.len(), rows.len());
    for (a, b) in rows.iter().zip(&reloaded) {
        assert_eq!(a.file, b.file);
        assert_eq!(a.area, b.area);
        assert_eq!(a.tetrode, b.tetrode);
        assert_eq!(a.lead, b.lead);
        assert_eq!(a.quality, b.quality);
    }
}

#[test]
fn config_good_set_drives_quality_labels() {
    let cfg = SegmenterConfig {
        known_good_positions: vec![1],
        ..SegmenterConfig::default()
    };
    let map = channel_map(&["HPC TT1", "HPC TT1"]);
    let mut rows = assign(&map, &[0, 1]);
    label_quality(&mut rows, &cfg.known_good_positions);
    assert_eq!(rows[0].quality, Some(Quality::Bad));
    assert_eq!(rows[1].quality, Some(Quality::Good));
}

#[test]
fn relabeling_overwrites_previous_quality() {
    let map = channel_map(&["HPC TT1", "HPC TT1"]);
    let mut rows = assign(&map, &[0, 1]);
    label_quality(&mut rows, &[0]);
    assert_eq!(rows[0].quality, Some(Quality::Good));
    label_quality(&mut rows, &[1]);
    assert_eq!(rows[0].quality, Some(Quality::Bad));
    assert_eq!(rows[1].quality, Some(Quality::Good));
}
