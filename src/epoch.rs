//! Fixed-length epoch extraction and cross-channel alignment.
//!
//! An epoch is a run of exactly `epoch_len` surviving samples whose stored
//! group positions are contiguous. A contiguity break (where artifact
//! removal cut samples out in between) resets the run without discarding
//! anything; accumulation simply restarts from the current entry. Runs
//! shorter than `epoch_len` at the end of a channel are dropped.

use anyhow::{bail, Result};
use ndarray::Array2;

use crate::stage::FilteredGroup;

/// Extract non-overlapping epochs of `epoch_len` consecutive surviving
/// samples from one channel's filtered group.
///
/// The run resets whenever `indices[i] != indices[i - 1] + 1`, and after
/// each emitted epoch (consecutive epochs never overlap).
pub fn extract_epochs(group: &FilteredGroup, epoch_len: usize) -> Vec<Vec<f32>> {
    let mut epochs = Vec::new();
    if epoch_len == 0 {
        return epochs;
    }

    let mut run = 0usize;
    for i in 0..group.len() {
        if i > 0 && group.indices[i] != group.indices[i - 1] + 1 {
            run = 0;
        }
        run += 1;
        if run == epoch_len {
            epochs.push(group.values[i + 1 - epoch_len..=i].to_vec());
            run = 0;
        }
    }
    epochs
}

/// Pair the k-th epoch of every channel into one `[C, epoch_len]` matrix.
///
/// Fails, producing no matrices at all, if any channel yielded a different
/// number of epochs than the first channel.
pub fn align_channels(per_channel: &[Vec<Vec<f32>>]) -> Result<Vec<Array2<f32>>> {
    let Some(first) = per_channel.first() else {
        return Ok(vec![]);
    };
    let n_epochs = first.len();
    for (ch, epochs) in per_channel.iter().enumerate() {
        if epochs.len() != n_epochs {
            bail!(
                "epoch count mismatch: channel {ch} produced {} epochs, channel 0 produced {n_epochs}",
                epochs.len()
            );
        }
    }

    let n_ch = per_channel.len();
    let mut matrices = Vec::with_capacity(n_epochs);
    for k in 0..n_epochs {
        let epoch_len = per_channel[0][k].len();
        let mut flat = Vec::with_capacity(n_ch * epoch_len);
        for epochs in per_channel {
            flat.extend_from_slice(&epochs[k]);
        }
        matrices.push(Array2::from_shape_vec((n_ch, epoch_len), flat)?);
    }
    Ok(matrices)
}
