//! Sleep-stage bucketing and artifact removal.
//!
//! The scorer emits one score per fixed-width time bucket; expanding it by
//! the repeat factor aligns it with the sample time axis. Samples are then
//! grouped into the four brain-state groups, and artifact entries are
//! stripped while recording where each survivor sat inside its group.

/// The four recognised brain states.
///
/// Score codes: `1`/`2` → Wakefulness, `3` → NREM, `4` → REM,
/// `5` → Unidentified. Any other score (or a sample past the end of the
/// label sequence) is unassigned and belongs to no group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Wakefulness,
    Nrem,
    Rem,
    Unidentified,
}

impl Stage {
    /// Map a raw score to a stage; `None` for unrecognised codes.
    pub fn from_score(score: f32) -> Option<Stage> {
        if score == 1.0 || score == 2.0 {
            Some(Stage::Wakefulness)
        } else if score == 3.0 {
            Some(Stage::Nrem)
        } else if score == 4.0 {
            Some(Stage::Rem)
        } else if score == 5.0 {
            Some(Stage::Unidentified)
        } else {
            None
        }
    }

    /// Lowercase name used as the tensor name / file suffix on export.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Wakefulness => "wakefulness",
            Stage::Nrem => "nrem",
            Stage::Rem => "rem",
            Stage::Unidentified => "unidentified",
        }
    }
}

/// Expand a per-bucket score sequence to per-sample labels by repeating each
/// score `repeat` times.
pub fn expand_scores(scores: &[f32], repeat: usize) -> Vec<f32> {
    let mut labels = Vec::with_capacity(scores.len() * repeat);
    for &score in scores {
        labels.extend(std::iter::repeat(score).take(repeat));
    }
    labels
}

/// One brain-state group: the concatenation, in ascending sample-offset
/// order, of every masked sample whose label mapped to this stage.
/// Artifact entries (`None`) are still present at this point.
#[derive(Debug, Clone, Default)]
pub struct StageGroup {
    pub data: Vec<Option<f32>>,
}

impl StageGroup {
    /// Number of offsets that contributed to this group (artifacts included).
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Strip artifact entries, keeping the position each survivor held
    /// within this group's concatenation.
    ///
    /// The stored index is a position inside the group, not an absolute
    /// sample offset; it is only meaningful for contiguity detection during
    /// epoch extraction. Stripping an already-clean group is the identity on
    /// the values, so the operation is idempotent.
    pub fn strip_artifacts(&self) -> FilteredGroup {
        let mut values = Vec::with_capacity(self.data.len());
        let mut indices = Vec::with_capacity(self.data.len());
        for (pos, entry) in self.data.iter().enumerate() {
            if let Some(v) = entry {
                values.push(*v);
                indices.push(pos);
            }
        }
        FilteredGroup { values, indices }
    }
}

/// A group after artifact removal: surviving values and, in parallel, the
/// position each value held within the group concatenation.
#[derive(Debug, Clone, Default)]
pub struct FilteredGroup {
    pub values: Vec<f32>,
    pub indices: Vec<usize>,
}

impl FilteredGroup {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of bucketing one channel: the four stage groups plus the number of
/// samples that matched no recognised stage.
#[derive(Debug, Clone, Default)]
pub struct StageGroups {
    pub wakefulness: StageGroup,
    pub nrem: StageGroup,
    pub rem: StageGroup,
    pub unidentified: StageGroup,
    pub unassigned: usize,
}

impl StageGroups {
    pub fn group(&self, stage: Stage) -> &StageGroup {
        match stage {
            Stage::Wakefulness => &self.wakefulness,
            Stage::Nrem => &self.nrem,
            Stage::Rem => &self.rem,
            Stage::Unidentified => &self.unidentified,
        }
    }

    fn group_mut(&mut self, stage: Stage) -> &mut StageGroup {
        match stage {
            Stage::Wakefulness => &mut self.wakefulness,
            Stage::Nrem => &mut self.nrem,
            Stage::Rem => &mut self.rem,
            Stage::Unidentified => &mut self.unidentified,
        }
    }
}

/// Bucket a masked sample sequence by per-sample stage labels.
///
/// Offsets beyond the end of `labels` are unassigned; unassigned and
/// unrecognised samples are counted but placed in no group. Artifact entries
/// keep their `None` marker inside the group they land in.
pub fn bucket(masked: &[Option<f32>], labels: &[f32]) -> StageGroups {
    let mut groups = StageGroups::default();

    for (i, sample) in masked.iter().enumerate() {
        let stage = labels.get(i).copied().and_then(Stage::from_score);
        match stage {
            Some(stage) => groups.group_mut(stage).data.push(*sample),
            None => groups.unassigned += 1,
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_codes_map_per_scoring_manual() {
        assert_eq!(Stage::from_score(1.0), Some(Stage::Wakefulness));
        assert_eq!(Stage::from_score(2.0), Some(Stage::Wakefulness));
        assert_eq!(Stage::from_score(3.0), Some(Stage::Nrem));
        assert_eq!(Stage::from_score(4.0), Some(Stage::Rem));
        assert_eq!(Stage::from_score(5.0), Some(Stage::Unidentified));
        assert_eq!(Stage::from_score(0.0), None);
        assert_eq!(Stage::from_score(6.0), None);
        assert_eq!(Stage::from_score(f32::NAN), None);
    }

    #[test]
    fn expand_repeats_each_score() {
        let labels = expand_scores(&[3.0, 4.0], 3);
        assert_eq!(labels, vec![3.0, 3.0, 3.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn groups_are_disjoint_and_counts_add_up() {
        // 2 wake, 2 NREM, 2 REM, 2 unidentified, 2 unrecognised.
        let labels = expand_scores(&[1.0, 3.0, 4.0, 5.0, 9.0], 2);
        let masked: Vec<Option<f32>> = (0..10).map(|i| Some(i as f32)).collect();
        let groups = bucket(&masked, &labels);

        assert_eq!(groups.wakefulness.count(), 2);
        assert_eq!(groups.nrem.count(), 2);
        assert_eq!(groups.rem.count(), 2);
        assert_eq!(groups.unidentified.count(), 2);
        assert_eq!(groups.unassigned, 2);
        assert_eq!(
            groups.wakefulness.count()
                + groups.nrem.count()
                + groups.rem.count()
                + groups.unidentified.count()
                + groups.unassigned,
            masked.len()
        );
        // Ascending-offset order within each group.
        assert_eq!(groups.nrem.data, vec![Some(2.0), Some(3.0)]);
        assert_eq!(groups.rem.data, vec![Some(4.0), Some(5.0)]);
    }

    #[test]
    fn samples_past_label_sequence_are_unassigned() {
        let labels = expand_scores(&[4.0], 4);
        let masked: Vec<Option<f32>> = (0..10).map(|i| Some(i as f32)).collect();
        let groups = bucket(&masked, &labels);
        assert_eq!(groups.rem.count(), 4);
        assert_eq!(groups.unassigned, 6);
    }

    #[test]
    fn artifacts_are_carried_into_groups_then_stripped() {
        let labels = vec![4.0; 6];
        let masked = vec![Some(0.5), None, None, Some(1.5), Some(2.5), None];
        let groups = bucket(&masked, &labels);
        assert_eq!(groups.rem.count(), 6);

        let filtered = groups.rem.strip_artifacts();
        assert_eq!(filtered.values, vec![0.5, 1.5, 2.5]);
        assert_eq!(filtered.indices, vec![0, 3, 4]);
    }

    #[test]
    fn strip_is_idempotent() {
        let group = StageGroup {
            data: vec![Some(1.0), None, Some(2.0), None, Some(3.0)],
        };
        let once = group.strip_artifacts();

        // Re-wrap the survivors and strip again: same values, identity indices.
        let clean = StageGroup {
            data: once.values.iter().copied().map(Some).collect(),
        };
        let twice = clean.strip_artifacts();
        assert_eq!(twice.values, once.values);
        assert_eq!(twice.indices, vec![0, 1, 2]);
    }
}
