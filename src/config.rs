//! Segmenter configuration and session file layout.
//!
//! [`SegmenterConfig`] holds every tunable parameter of the segmentation
//! pipeline.  [`Session`] pins a recording session (subject + condition) to a
//! storage location and derives every input/output path from the
//! `{subject}_{condition}_{suffix}` naming convention, so no path is ever
//! hardcoded at a call site.

use std::path::PathBuf;

/// Configuration for one segmentation run.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use lfpseg::SegmenterConfig;
///
/// let cfg = SegmenterConfig {
///     epoch_len: 120_000,    // 2-minute epochs instead of 4
///     ..SegmenterConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Width of the artifact window in samples.
    ///
    /// Every stimulus onset masks `[onset, onset + artifact_window)`.
    /// Onsets whose window would run past the end of the recording are
    /// skipped with a warning.
    ///
    /// Default: `3000` (3 s at 1 kHz).
    pub artifact_window: usize,

    /// How many samples each sleep score covers.
    ///
    /// The per-bucket score sequence is expanded by repeating each score
    /// this many times to align it with the sample time axis.
    ///
    /// Default: `5000` (5 s at 1 kHz).
    pub stage_repeat: usize,

    /// Number of consecutive surviving samples per exported epoch.
    ///
    /// A run of exactly this many artifact-free, offset-contiguous REM
    /// samples is emitted as one epoch; shorter trailing runs are dropped.
    ///
    /// Default: `240_000` (4 min at 1 kHz).
    pub epoch_len: usize,

    /// Channel positions whose recordings passed manual quality screening.
    ///
    /// Used by [`crate::tetrode::label_quality`]: a channel is `Good` iff its
    /// file index is in this set.
    ///
    /// Default: `[]` (every channel labeled `Bad`).
    pub known_good_positions: Vec<usize>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            artifact_window: 3000,
            stage_repeat: 5000,
            epoch_len: 240_000,
            known_good_positions: vec![],
        }
    }
}

/// A recording session: one subject under one condition, stored under a
/// common base directory.
///
/// All path helpers follow the on-disk layout of the acquisition pipeline:
///
/// ```text
/// {base}/channel_maps/{subject}.json
/// {base}/dataset/{subject}/{condition}/{position}.safetensors
/// {base}/sleep_score/{subject}_{condition}_sleep.safetensors
/// {base}/audio_timestamps/{subject}_{condition}_sleep.safetensors
/// {base}/assigned_dataframe/{subject}_{condition}_assigned.json
/// {base}/saved_matrices/{area}/...
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    pub subject: String,
    pub condition: String,
    pub base_dir: PathBuf,
}

impl Session {
    pub fn new(subject: &str, condition: &str, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            subject: subject.to_string(),
            condition: condition.to_string(),
            base_dir: base_dir.into(),
        }
    }

    /// Channel map for this subject (ordered list of `"AREA TTn"` labels).
    pub fn channel_map_file(&self) -> PathBuf {
        self.base_dir
            .join("channel_maps")
            .join(format!("{}.json", self.subject))
    }

    /// Directory holding one tensor file per channel position.
    pub fn dataset_dir(&self) -> PathBuf {
        self.base_dir
            .join("dataset")
            .join(&self.subject)
            .join(&self.condition)
    }

    /// LFP tensor for one channel position.
    pub fn channel_file(&self, position: usize) -> PathBuf {
        self.dataset_dir().join(format!("{position}.safetensors"))
    }

    /// Per-bucket sleep score sequence for this session.
    pub fn scores_file(&self) -> PathBuf {
        self.base_dir
            .join("sleep_score")
            .join(format!("{}_{}_sleep.safetensors", self.subject, self.condition))
    }

    /// Stimulus onset offsets for this session.
    pub fn onsets_file(&self) -> PathBuf {
        self.base_dir
            .join("audio_timestamps")
            .join(format!("{}_{}_sleep.safetensors", self.subject, self.condition))
    }

    /// Channel/tetrode assignment table with quality labels.
    pub fn assigned_file(&self) -> PathBuf {
        self.base_dir
            .join("assigned_dataframe")
            .join(format!("{}_{}_assigned.json", self.subject, self.condition))
    }

    /// Output directory for exported matrices of one anatomical area.
    pub fn matrices_dir(&self, area: &str) -> PathBuf {
        self.base_dir.join("saved_matrices").join(area)
    }

    /// Output file for one stage-group matrix, e.g. `r14_habituation_nrem`.
    pub fn group_matrix_file(&self, area: &str, group: &str) -> PathBuf {
        self.matrices_dir(area).join(format!(
            "{}_{}_{}.safetensors",
            self.subject, self.condition, group
        ))
    }

    /// Output file for the k-th cross-channel epoch matrix.
    pub fn epoch_matrix_file(&self, area: &str, stage: &str, k: usize) -> PathBuf {
        self.matrices_dir(area).join(stage).join(format!(
            "{}_{}_matrix_{}.safetensors",
            self.subject, self.condition, k
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_acquisition_rates() {
        let cfg = SegmenterConfig::default();
        assert_eq!(cfg.artifact_window, 3000);
        assert_eq!(cfg.stage_repeat, 5000);
        assert_eq!(cfg.epoch_len, 240_000);
        assert!(cfg.known_good_positions.is_empty());
    }

    #[test]
    fn session_paths_follow_naming_convention() {
        let s = Session::new("r14", "habituation", "/data/rp1");
        assert!(s
            .scores_file()
            .ends_with("sleep_score/r14_habituation_sleep.safetensors"));
        assert!(s.channel_file(66).ends_with("dataset/r14/habituation/66.safetensors"));
        assert!(s
            .group_matrix_file("PFC", "nrem")
            .ends_with("saved_matrices/PFC/r14_habituation_nrem.safetensors"));
        assert!(s
            .epoch_matrix_file("BLA", "REM", 2)
            .ends_with("saved_matrices/BLA/REM/r14_habituation_matrix_2.safetensors"));
    }
}
