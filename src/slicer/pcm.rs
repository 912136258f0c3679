//! PCM (Pulse Code Modulation; RZ and NRZ) slicer (spec §4.2).
//!
//! `short_width` is the nominal pulse width, `long_width` the nominal bit
//! period. Each pulse emits `round(pulse / short_width)` one-bits; each
//! gap emits a run of zero-bits sized from the residual after the pulse's
//! own width is subtracted from the bit period, clamped to `gap_limit /
//! long_width`. In RZ mode a pulse outside `short_width ± tolerance`
//! discards the row in progress rather than contributing bits — RZ bit
//! cells are supposed to look identical regardless of bit value, so any
//! width deviation means the slicer has lost the carrier's bit clock.
//!
//! Two preamble refit passes run before the main loop, per the open
//! question recorded in SPEC_FULL.md §12: an exact pass over the longest
//! run of consecutive pulses that already fit the nominal widths, and —
//! only when that run is too short and at least 8 pulses are present — a
//! looser pass over pulses that fit within double tolerance, wherever they
//! occur in the burst. Both refine `short`/`long` to the measured average;
//! neither runs if the burst is too small to trust a refit.

use crate::bitbuffer::BitBuffer;
use crate::decoder::Timing;
use crate::pulse::PulseData;
use crate::slicer::{within_tolerance, Slicer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmMode {
    /// Return-to-zero: each pulse must itself measure close to `short_width`.
    Rz,
    /// Non-return-to-zero: pulse width directly encodes a run of one-bits.
    Nrz,
}

pub struct PcmSlicer {
    pub mode: PcmMode,
}

impl PcmSlicer {
    pub fn new(mode: PcmMode) -> Self {
        Self { mode }
    }

    fn min_exact_preamble(&self) -> usize {
        match self.mode {
            PcmMode::Nrz => 12,
            PcmMode::Rz => 4,
        }
    }
}

/// Longest run of consecutive pulses whose pulse width is close to `short`
/// and whose pulse+gap period is close to `long`, returning the refit
/// `(short, long)` averaged over that run if it meets `min_exact`;
/// otherwise, if the burst has at least 8 pulses, a looser pass over
/// (not necessarily consecutive) pulses within double tolerance.
fn refit_preamble(pulses: &PulseData, timing: &Timing, min_exact: usize) -> Option<(u32, u32)> {
    let n = pulses.num_pulses();
    let tol = timing.tolerance_us;

    let mut best: Vec<usize> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for i in 0..n {
        let p = pulses.samples_to_us(pulses.pulse(i));
        let g = pulses.samples_to_us(pulses.gap(i));
        let period = p + g;
        if within_tolerance(p, timing.short_us, tol) && within_tolerance(period, timing.long_us, tol) {
            current.push(i);
        } else {
            if current.len() > best.len() {
                best = std::mem::take(&mut current);
            }
            current.clear();
        }
    }
    if current.len() > best.len() {
        best = current;
    }
    if best.len() >= min_exact {
        return Some(average_widths(pulses, &best));
    }

    if n >= 8 {
        let loose: Vec<usize> = (0..n)
            .filter(|&i| within_tolerance(pulses.samples_to_us(pulses.pulse(i)), timing.short_us, tol * 2))
            .collect();
        if loose.len() >= 8 {
            return Some(average_widths(pulses, &loose));
        }
    }
    None
}

fn average_widths(pulses: &PulseData, idxs: &[usize]) -> (u32, u32) {
    let n = idxs.len() as f64;
    let sum_pulse: f64 = idxs.iter().map(|&i| pulses.samples_to_us(pulses.pulse(i)) as f64).sum();
    let sum_period: f64 = idxs
        .iter()
        .map(|&i| (pulses.samples_to_us(pulses.pulse(i)) + pulses.samples_to_us(pulses.gap(i))) as f64)
        .sum();
    ((sum_pulse / n).round() as u32, (sum_period / n).round() as u32)
}

impl Slicer for PcmSlicer {
    fn slice(&self, pulses: &PulseData, timing: &Timing) -> BitBuffer {
        let mut out = BitBuffer::new();
        if pulses.is_empty() {
            return out;
        }

        let mut short = timing.short_us;
        let mut long = timing.long_us;
        if let Some((s, l)) = refit_preamble(pulses, timing, self.min_exact_preamble()) {
            short = s;
            long = l;
        }

        for i in 0..pulses.num_pulses() {
            let pulse_us = pulses.samples_to_us(pulses.pulse(i));
            let gap_us = pulses.samples_to_us(pulses.gap(i));

            if self.mode == PcmMode::Rz && !within_tolerance(pulse_us, short, timing.tolerance_us) {
                out.clear_current_row();
                continue;
            }

            let n_ones = ((pulse_us as f64) / (short.max(1) as f64)).round() as i64;
            for _ in 0..n_ones.max(0) {
                out.add_bit(true);
            }

            if gap_us >= timing.reset_us {
                out.add_row();
                continue;
            }
            if gap_us > timing.gap_us {
                out.add_row();
                continue;
            }

            let period_denom = long.max(1) as f64;
            let numer = gap_us as f64 - (long as f64 - short as f64);
            let mut n_zeros = (numer / period_denom).round();
            if n_zeros < 0.0 {
                n_zeros = 0.0;
            }
            let max_zeros = (timing.gap_us as f64 / period_denom).floor().max(0.0);
            n_zeros = n_zeros.min(max_zeros);
            for _ in 0..(n_zeros as i64) {
                out.add_bit(false);
            }
        }
        out
    }
}
