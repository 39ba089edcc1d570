//! Welch power spectral density.
//!
//! Matches `scipy.signal.welch` defaults as used for tetrode screening:
//! Hamming-windowed segments with 50 % overlap, per-segment constant
//! detrend, one-sided density scaling `2 / (fs · Σw²)` (DC and Nyquist bins
//! not doubled).

use anyhow::{bail, Result};
use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

/// Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    assert!(n >= 2, "hamming window needs at least 2 points");
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Estimate the one-sided PSD of `x` at sampling rate `fs`.
///
/// Returns `(frequencies, psd)` of length `nperseg / 2 + 1` each, the PSD in
/// units of `x²/Hz`. When `x` is shorter than `nperseg` the segment length
/// shrinks to the signal length (scipy behaviour).
pub fn welch(x: &[f32], fs: f32, nperseg: usize) -> Result<(Vec<f32>, Vec<f32>)> {
    if x.is_empty() {
        bail!("cannot estimate a PSD from an empty signal");
    }
    if nperseg < 2 {
        bail!("nperseg must be at least 2, got {nperseg}");
    }
    let nperseg = nperseg.min(x.len());
    if nperseg < 2 {
        bail!("signal too short for a PSD estimate");
    }
    let step = nperseg - nperseg / 2; // 50 % overlap

    let win = hamming(nperseg);
    let win_sumsq: f64 = win.iter().map(|w| w * w).sum();
    let scale = 1.0 / (fs as f64 * win_sumsq);

    let n_bins = nperseg / 2 + 1;
    let mut acc = vec![0.0_f64; n_bins];
    let mut n_segments = 0usize;

    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let fft = planner.plan_fft_forward(nperseg);

    let mut start = 0;
    while start + nperseg <= x.len() {
        let seg = &x[start..start + nperseg];

        // Constant detrend (scipy's detrend='constant').
        let mean: f64 = seg.iter().map(|&v| v as f64).sum::<f64>() / nperseg as f64;
        let mut buf: Vec<Complex<f64>> = seg
            .iter()
            .zip(win.iter())
            .map(|(&v, &w)| Complex { re: (v as f64 - mean) * w, im: 0.0 })
            .collect();

        fft.process(&mut buf);

        for (k, slot) in acc.iter_mut().enumerate() {
            *slot += buf[k].norm_sqr() * scale;
        }
        n_segments += 1;
        start += step;
    }

    if n_segments == 0 {
        bail!("signal too short for a single {nperseg}-sample segment");
    }

    let mut psd: Vec<f32> = acc
        .iter()
        .map(|&p| (p / n_segments as f64) as f32)
        .collect();
    // One-sided: double everything except DC and (for even nperseg) Nyquist.
    let last = if nperseg % 2 == 0 { n_bins - 1 } else { n_bins };
    for p in &mut psd[1..last] {
        *p *= 2.0;
    }

    let freqs: Vec<f32> = (0..n_bins)
        .map(|k| k as f32 * fs / nperseg as f32)
        .collect();
    Ok((freqs, psd))
}
