//! Stimulus-artifact masking.
//!
//! Each stimulus onset contaminates a fixed window of samples immediately
//! after it. Masking replaces those samples with `None` so that every later
//! stage can tell artifact from signal without an in-band sentinel value.

/// Mask `[onset, onset + window)` for every stimulus onset.
///
/// Returns a sequence of the same length as `data` with artifact samples set
/// to `None`. Onsets whose window would run past the end of the recording
/// are skipped with a warning; overlapping windows simply re-mask the same
/// samples, so masking is idempotent in the onset list.
pub fn mask_stimuli(data: &[f32], onsets: &[usize], window: usize) -> Vec<Option<f32>> {
    let mut masked: Vec<Option<f32>> = data.iter().copied().map(Some).collect();

    for &onset in onsets {
        if onset + window <= masked.len() {
            for slot in &mut masked[onset..onset + window] {
                *slot = None;
            }
        } else {
            log::warn!(
                "not enough samples to mask at onset {onset} (window {window}, len {})",
                masked.len()
            );
        }
    }
    masked
}
