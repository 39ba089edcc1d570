//! # lfpseg — sleep-stage segmentation for tetrode LFP recordings
//!
//! `lfpseg` turns continuous local-field-potential recordings into
//! per-brain-state sample groups and fixed-length REM epochs, aligned across
//! channels, with stimulus-artifact windows masked out first.
//!
//! ## Pipeline overview
//!
//! ```text
//! {position}.safetensors           one LFP sequence per channel
//!   │
//!   ├─ tetrode::assign()           channel map → {file, area, tetrode, lead}
//!   ├─ tetrode::label_quality()    Good/Bad from the known-good set
//!   ├─ mask::mask_stimuli()        [onset, onset+3000) → artifact
//!   ├─ stage::expand_scores()      one score per 5000 samples → per-sample
//!   ├─ stage::bucket()             Wakefulness / NREM / REM / Unidentified
//!   ├─ StageGroup::strip_artifacts()   survivors + group positions
//!   ├─ epoch::extract_epochs()     240 000-sample contiguous REM runs
//!   └─ epoch::align_channels()     k-th epoch of every channel → [C, N]
//!        │
//!        └─→ {subject}_{condition}_matrix_{k}.safetensors
//! ```
//!
//! ## Quick start
//!
//! ```
//! use lfpseg::{segment, rem_epochs, SegmenterConfig};
//!
//! let cfg = SegmenterConfig {
//!     stage_repeat: 100,
//!     artifact_window: 30,
//!     epoch_len: 50,
//!     ..SegmenterConfig::default()
//! };
//!
//! let lfp: Vec<f32> = (0..400).map(|i| (i as f32 * 0.01).sin()).collect();
//! let scores = [4.0, 4.0, 3.0, 1.0];        // REM, REM, NREM, wake
//! let onsets = [120];                        // one stimulus
//!
//! let groups = segment(&lfp, &scores, &onsets, &cfg);
//! assert_eq!(groups.rem.count(), 200);
//! assert_eq!(groups.rem.strip_artifacts().len(), 170);
//!
//! let epochs = rem_epochs(&lfp, &scores, &onsets, &cfg);
//! // Two contiguous runs survive (120 and 50 samples) → 2 + 1 epochs of 50.
//! assert_eq!(epochs.len(), 3);
//! ```
//!
//! Channel/tetrode bookkeeping ([`tetrode`]), Welch spectra ([`psd`]) and the
//! on-disk container formats ([`io`], [`config::Session`]) are exposed as
//! standalone modules used by the `assign`, `segment`, `epochs` and `psd`
//! binaries.

pub mod config;
pub mod epoch;
pub mod io;
pub mod mask;
pub mod psd;
pub mod stage;
pub mod tetrode;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::{SegmenterConfig, Session};

// mask
pub use mask::mask_stimuli;

// stage
pub use stage::{bucket, expand_scores, FilteredGroup, Stage, StageGroup, StageGroups};

// epoch
pub use epoch::{align_channels, extract_epochs};

// tetrode
pub use tetrode::{assign, label_quality, Assignment, Quality};

// psd
pub use psd::welch;

// io — tensor container + JSON tables
pub use io::{load_samples, load_scores, load_onsets, write_matrix, TensorWriter};

/// Run the segmentation pipeline for one channel: expand the score sequence,
/// mask stimulus windows, then bucket samples by stage.
///
/// Artifacts are applied before bucketing, so every group still carries its
/// masked entries; call [`StageGroup::strip_artifacts`] on a group to obtain
/// the surviving values.
pub fn segment(
    data: &[f32],
    scores: &[f32],
    onsets: &[usize],
    cfg: &SegmenterConfig,
) -> StageGroups {
    let labels = stage::expand_scores(scores, cfg.stage_repeat);
    let masked = mask::mask_stimuli(data, onsets, cfg.artifact_window);
    stage::bucket(&masked, &labels)
}

/// Segment one channel and extract its REM epochs.
///
/// Convenience wrapper for the per-channel half of the epoch export; pair
/// the results of all channels with [`epoch::align_channels`].
pub fn rem_epochs(
    data: &[f32],
    scores: &[f32],
    onsets: &[usize],
    cfg: &SegmenterConfig,
) -> Vec<Vec<f32>> {
    let groups = segment(data, scores, onsets, cfg);
    let filtered = groups.rem.strip_artifacts();
    epoch::extract_epochs(&filtered, cfg.epoch_len)
}
