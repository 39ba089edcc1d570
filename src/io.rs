//! Safetensors / JSON I/O for the segmentation pipeline.
//!
//! Tensors travel in the safetensors container (little-endian payload behind
//! a JSON header); tables (channel maps, assignment records) travel as JSON.
//! A missing file and a corrupted container are reported distinctly so the
//! caller can skip one channel without giving up the run.

use anyhow::{bail, Context, Result};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::Path;

use crate::config::Session;
use crate::tetrode::{Assignment, Quality};

// ── Low-level safetensors parser ──────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        bail!("container too small to hold a safetensors header");
    }
    let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    // Checked: a hostile length prefix must not overflow `8 + n`.
    if bytes.len().checked_sub(8).map_or(true, |rest| rest < n) {
        bail!("container truncated: header claims {n} bytes");
    }
    let header: HashMap<String, serde_json::Value> = serde_json::from_slice(&bytes[8..8 + n])
        .context("corrupted safetensors header")?;
    Ok((header, 8 + n))
}

fn tensor_bytes<'a>(
    bytes: &'a [u8],
    data_start: usize,
    entry: &serde_json::Value,
    dtype: &str,
) -> Result<&'a [u8]> {
    let found = entry["dtype"].as_str().unwrap_or("?");
    if found != dtype {
        bail!("tensor has dtype {found}, expected {dtype}");
    }
    let offsets = entry["data_offsets"]
        .as_array()
        .context("corrupted tensor entry: missing data_offsets")?;
    let s = offsets
        .first()
        .and_then(|v| v.as_u64())
        .context("bad data offset")? as usize;
    let e = offsets
        .get(1)
        .and_then(|v| v.as_u64())
        .context("bad data offset")? as usize;
    let lo = data_start
        .checked_add(s)
        .context("container truncated: tensor data out of range")?;
    let hi = data_start
        .checked_add(e)
        .context("container truncated: tensor data out of range")?;
    bytes
        .get(lo..hi)
        .context("container truncated: tensor data out of range")
}

fn read_f32_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<f32>> {
    let raw = tensor_bytes(bytes, data_start, entry, "F32")?;
    Ok(raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn read_i32_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<i32>> {
    let raw = tensor_bytes(bytes, data_start, entry, "I32")?;
    Ok(raw
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn shape_of(entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .context("corrupted tensor entry: missing shape")?
        .iter()
        .map(|v| v.as_u64().map(|n| n as usize).context("bad shape entry"))
        .collect()
}

fn load_entry<'h>(
    header: &'h HashMap<String, serde_json::Value>,
    name: &str,
) -> Result<&'h serde_json::Value> {
    header
        .get(name)
        .with_context(|| format!("missing '{name}' tensor"))
}

// ── Tensor loaders ────────────────────────────────────────────────────────────

/// Load one channel's LFP sample sequence (1-D `lfp` tensor).
pub fn load_samples(path: &Path) -> Result<Vec<f32>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading channel file {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)
        .with_context(|| format!("corrupted channel file {}", path.display()))?;
    read_f32_tensor(&bytes, data_start, load_entry(&header, "lfp")?)
        .with_context(|| format!("corrupted channel file {}", path.display()))
}

/// Load the per-bucket sleep score sequence (1-D `scores` tensor).
pub fn load_scores(path: &Path) -> Result<Vec<f32>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading score file {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)
        .with_context(|| format!("corrupted score file {}", path.display()))?;
    read_f32_tensor(&bytes, data_start, load_entry(&header, "scores")?)
        .with_context(|| format!("corrupted score file {}", path.display()))
}

/// Load stimulus onset offsets (1-D `onsets` tensor, I32).
pub fn load_onsets(path: &Path) -> Result<Vec<usize>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading onset file {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)
        .with_context(|| format!("corrupted onset file {}", path.display()))?;
    let raw = read_i32_tensor(&bytes, data_start, load_entry(&header, "onsets")?)
        .with_context(|| format!("corrupted onset file {}", path.display()))?;
    raw.into_iter()
        .map(|v| {
            usize::try_from(v).map_err(|_| anyhow::anyhow!("negative stimulus onset: {v}"))
        })
        .collect()
}

/// Load a 2-D matrix tensor written by [`write_matrix`].
pub fn load_matrix(path: &Path, name: &str) -> Result<Array2<f32>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading matrix file {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)
        .with_context(|| format!("corrupted matrix file {}", path.display()))?;
    let entry = load_entry(&header, name)?;
    let shape = shape_of(entry)?;
    if shape.len() != 2 {
        bail!("tensor '{name}' in {} is not 2-D", path.display());
    }
    let data = read_f32_tensor(&bytes, data_start, entry)?;
    Ok(Array2::from_shape_vec((shape[0], shape[1]), data)?)
}

// ── Tensor writer ─────────────────────────────────────────────────────────────

/// Minimal safetensors writer for F32 and I32 tensors.
pub struct TensorWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl TensorWriter {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f32_arr2(&mut self, name: &str, arr: &Array2<f32>) {
        let data: Vec<f32> = arr.iter().copied().collect();
        self.add_f32(name, &data, &[arr.nrows(), arr.ncols()]);
    }

    pub fn add_i32(&mut self, name: &str, data: &[i32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I32", shape.to_vec()));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

impl Default for TensorWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    Ok(())
}

/// Write one channel's LFP sample sequence.
pub fn write_samples(path: &Path, data: &[f32]) -> Result<()> {
    ensure_parent(path)?;
    let mut w = TensorWriter::new();
    w.add_f32("lfp", data, &[data.len()]);
    w.write(path)
}

/// Write a per-bucket sleep score sequence.
pub fn write_scores(path: &Path, scores: &[f32]) -> Result<()> {
    ensure_parent(path)?;
    let mut w = TensorWriter::new();
    w.add_f32("scores", scores, &[scores.len()]);
    w.write(path)
}

/// Write stimulus onset offsets.
pub fn write_onsets(path: &Path, onsets: &[usize]) -> Result<()> {
    ensure_parent(path)?;
    let data: Vec<i32> = onsets.iter().map(|&v| v as i32).collect();
    let mut w = TensorWriter::new();
    w.add_i32("onsets", &data, &[data.len()]);
    w.write(path)
}

/// Write one named `[C, L]` matrix (one variable per file).
pub fn write_matrix(path: &Path, name: &str, matrix: &Array2<f32>) -> Result<()> {
    ensure_parent(path)?;
    let mut w = TensorWriter::new();
    w.add_f32_arr2(name, matrix);
    w.write(path)
}

/// Stack one row per channel into a matrix and write it under `name`.
///
/// All channels of a session share the mask and label sequences, so their
/// group rows have equal length; a ragged set means mismatched inputs and
/// fails the write.
pub fn write_group_matrix(path: &Path, name: &str, rows: &[Vec<f32>]) -> Result<()> {
    let n_ch = rows.len();
    let len = rows.first().map(Vec::len).unwrap_or(0);
    let mut flat = Vec::with_capacity(n_ch * len);
    for (ch, row) in rows.iter().enumerate() {
        if row.len() != len {
            bail!("group '{name}': channel {ch} has {} samples, channel 0 has {len}", row.len());
        }
        flat.extend_from_slice(row);
    }
    let matrix = Array2::from_shape_vec((n_ch, len), flat)?;
    write_matrix(path, name, &matrix)
}

// ── JSON tables ───────────────────────────────────────────────────────────────

/// Load a subject's channel map: an ordered JSON array of `"AREA TTn"` labels.
pub fn load_channel_map(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading channel map {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("corrupted channel map {}", path.display()))
}

/// Persist the assignment table.
pub fn save_assignments(path: &Path, assignments: &[Assignment]) -> Result<()> {
    ensure_parent(path)?;
    let text = serde_json::to_string_pretty(assignments)?;
    std::fs::write(path, text)
        .with_context(|| format!("writing assignment table {}", path.display()))
}

/// Load the assignment table.
pub fn load_assignments(path: &Path) -> Result<Vec<Assignment>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading assignment table {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("corrupted assignment table {}", path.display()))
}

// ── Session helpers ───────────────────────────────────────────────────────────

/// List the channel positions that have a `{n}.safetensors` file in `dir`,
/// sorted numerically.
pub fn scan_positions(dir: &Path) -> Result<Vec<usize>> {
    let mut positions = Vec::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("listing dataset directory {}", dir.display()))?;
    for entry in entries {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(stem) = name.strip_suffix(".safetensors") {
            if let Ok(position) = stem.parse::<usize>() {
                positions.push(position);
            }
        }
    }
    positions.sort_unstable();
    Ok(positions)
}

/// Load every good channel of one area for a session.
///
/// Returns the LFP sequences and, in parallel, their channel positions.
/// A missing channel file is logged and skipped; a corrupted one is reported
/// distinctly and also skipped, so one bad file never sinks the whole run.
pub fn load_good_channels(
    session: &Session,
    assignments: &[Assignment],
    area: &str,
) -> Result<(Vec<Vec<f32>>, Vec<usize>)> {
    let mut data = Vec::new();
    let mut positions = Vec::new();

    for a in assignments {
        if a.quality != Some(Quality::Good) || a.area != area {
            continue;
        }
        let Some(position) = a.file_index() else {
            log::warn!("assignment record with unparseable file id: {}", a.file);
            continue;
        };
        let path = session.channel_file(position);
        if !path.exists() {
            log::warn!("file not found: {}", path.display());
            continue;
        }
        match load_samples(&path) {
            Ok(samples) => {
                data.push(samples);
                positions.push(position);
            }
            Err(err) => {
                log::error!("skipping channel {position}: {err:#}");
            }
        }
    }
    Ok((data, positions))
}

/// Load specific channel positions of a session, skipping missing files with
/// a logged message.
///
/// Returns the LFP sequences and, in parallel, the positions that were
/// actually found.
pub fn load_channels(
    session: &Session,
    positions: &[usize],
) -> Result<(Vec<Vec<f32>>, Vec<usize>)> {
    let mut data = Vec::new();
    let mut found = Vec::new();
    for &position in positions {
        let path = session.channel_file(position);
        if !path.exists() {
            log::warn!("file not found: {}", path.display());
            continue;
        }
        data.push(load_samples(&path)?);
        found.push(position);
    }
    Ok((data, found))
}

/// Rename `cleaned_lfp_channel_{n}.safetensors` files to
/// `cleaned_{n}.safetensors`. Returns how many files were renamed.
pub fn rename_channel_files(dir: &Path) -> Result<usize> {
    let mut renamed = 0;
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("listing directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(rest) = name.strip_prefix("cleaned_lfp_channel_") else { continue };
        let Some(number) = rest.strip_suffix(".safetensors") else { continue };
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let new_path = dir.join(format!("cleaned_{number}.safetensors"));
        std::fs::rename(entry.path(), &new_path)
            .with_context(|| format!("renaming {name}"))?;
        log::info!("renamed: {name} -> cleaned_{number}.safetensors");
        renamed += 1;
    }
    Ok(renamed)
}
