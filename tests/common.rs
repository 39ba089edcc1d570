/// Shared helpers for building synthetic recordings.
use lfpseg::config::Session;
use std::path::Path;

#[allow(unused)]
/// Ramp signal 0, 1, 2, … — value equals sample offset, which makes it easy
/// to check which offsets survived masking.
pub fn ramp(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32).collect()
}

#[allow(unused)]
/// A score sequence of `n` buckets all scored REM.
pub fn rem_scores(n: usize) -> Vec<f32> {
    vec![4.0; n]
}

#[allow(unused)]
/// Lay a minimal session out on disk: channel tensors, scores and onsets in
/// the canonical directory structure under `base`.
pub fn write_session(
    base: &Path,
    channels: &[(usize, Vec<f32>)],
    scores: &[f32],
    onsets: &[usize],
) -> Session {
    let session = Session::new("r14", "habituation", base);
    for (position, data) in channels {
        lfpseg::io::write_samples(&session.channel_file(*position), data).unwrap();
    }
    lfpseg::io::write_scores(&session.scores_file(), scores).unwrap();
    lfpseg::io::write_onsets(&session.onsets_file(), onsets).unwrap();
    session
}
