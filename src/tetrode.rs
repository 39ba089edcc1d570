//! Channel-to-tetrode assignment and quality labeling.
//!
//! The channel map lists one `"AREA TTn"` label per recording channel, in
//! file order. Channels are wired four leads to a tetrode, so the lead
//! number follows directly from the position (this layout is assumed, not
//! validated).

use serde::{Deserialize, Serialize};

/// Manual quality verdict for one channel's recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Good,
    Bad,
}

/// One row of the assignment table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Data file identifier, e.g. `"66.safetensors"`.
    pub file: String,
    /// Anatomical region, the label prefix before `"TT"`, e.g. `"HPC"`.
    pub area: String,
    /// Tetrode token, e.g. `"TT3"`.
    pub tetrode: String,
    /// Lead within the tetrode, 1–4.
    pub lead: u8,
    /// Set by [`label_quality`]; `None` until labeled.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quality: Option<Quality>,
}

/// Pull the `TT<digits>` token out of a channel label.
fn tetrode_token(label: &str) -> Option<String> {
    let at = label.find("TT")?;
    let digits: String = label[at + 2..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("TT{digits}"))
    }
}

/// Build the assignment table from a channel map and the set of positions
/// that actually have data on disk.
///
/// Positions without data are left out. `lead = (position % 4) + 1`, i.e.
/// channels are laid out in fixed groups of 4 leads per tetrode in file
/// order.
pub fn assign(channel_map: &[String], present: &[usize]) -> Vec<Assignment> {
    channel_map
        .iter()
        .enumerate()
        .filter(|(position, _)| present.contains(position))
        .map(|(position, label)| {
            let area = label.split("TT").next().unwrap_or("").trim().to_string();
            let tetrode = tetrode_token(label).unwrap_or_default();
            Assignment {
                file: format!("{position}.safetensors"),
                area,
                tetrode,
                lead: (position % 4) as u8 + 1,
                quality: None,
            }
        })
        .collect()
}

/// Label each assignment `Good` if its file's numeric index is in the
/// known-good set, `Bad` otherwise.
pub fn label_quality(assignments: &mut [Assignment], good_positions: &[usize]) {
    for a in assignments.iter_mut() {
        let good = a
            .file_index()
            .map(|idx| good_positions.contains(&idx))
            .unwrap_or(false);
        a.quality = Some(if good { Quality::Good } else { Quality::Bad });
    }
}

impl Assignment {
    /// Numeric channel position parsed from the file identifier.
    pub fn file_index(&self) -> Option<usize> {
        self.file.split('.').next()?.parse().ok()
    }
}
