//! Captured pulse/gap bursts handed to the slicers.
//!
//! Mirrors the teacher's `LevelDuration` stream (`radio::demodulator`), but
//! generalized to rtl_433-style parallel pulse/gap arrays with per-burst
//! estimates, since a single slicer invocation needs to see the whole burst
//! up front (to run the PCM preamble refit) rather than one edge at a time.

/// Maximum pulses retained per burst. Mirrors `PD_MAX_PULSES` in spec.md §3.
pub const PD_MAX_PULSES: usize = 1 << 15; // ~32k

/// One captured RF burst: parallel pulse/gap arrays plus front-end estimates.
///
/// Immutable once built. `pulse[i]` is the "on" duration and `gap[i]` is the
/// "off" duration that follows it, both in integer sample counts at
/// `sample_rate`. Owned by whichever code called [`PulseData::push`]; slicers
/// only ever borrow it.
#[derive(Debug, Clone)]
pub struct PulseData {
    sample_rate: u32,
    pulse: Vec<u32>,
    gap: Vec<u32>,
    /// Envelope estimate for the OOK "mark" level, arbitrary front-end units.
    pub ook_high_estimate: i32,
    /// Envelope estimate for the OOK "space" level.
    pub ook_low_estimate: i32,
    /// FSK "mark" frequency estimate in Hz, if this burst came off an FM path.
    pub fsk_f1_est: i32,
    /// FSK "space" frequency estimate in Hz.
    pub fsk_f2_est: i32,
    /// Samples elapsed between the end of this burst and "now".
    pub start_ago: u64,
}

impl PulseData {
    /// Construct an empty burst sampled at `sample_rate` Hz.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            pulse: Vec::new(),
            gap: Vec::new(),
            ook_high_estimate: 0,
            ook_low_estimate: 0,
            fsk_f1_est: 0,
            fsk_f2_est: 0,
            start_ago: 0,
        }
    }

    /// Build directly from parallel pulse/gap sample-count arrays (test/replay helper).
    pub fn from_pulses(sample_rate: u32, pulse: Vec<u32>, gap: Vec<u32>) -> Self {
        let mut pd = Self::new(sample_rate);
        let n = pulse.len().min(gap.len());
        pd.pulse = pulse.into_iter().take(n).take(PD_MAX_PULSES).collect();
        pd.gap = gap.into_iter().take(n).take(PD_MAX_PULSES).collect();
        pd
    }

    /// Append one pulse/gap pair. Silently drops pairs past [`PD_MAX_PULSES`] —
    /// noise tolerance, matching the bit-buffer truncation contract in §4.1.
    pub fn push(&mut self, pulse_samples: u32, gap_samples: u32) {
        if self.pulse.len() >= PD_MAX_PULSES {
            return;
        }
        self.pulse.push(pulse_samples);
        self.gap.push(gap_samples);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_pulses(&self) -> usize {
        self.pulse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulse.is_empty()
    }

    pub fn pulse(&self, i: usize) -> u32 {
        self.pulse[i]
    }

    pub fn gap(&self, i: usize) -> u32 {
        self.gap[i]
    }

    /// Convert a duration in microseconds to a sample count at this burst's rate.
    pub fn us_to_samples(&self, us: u32) -> u32 {
        ((us as u64 * self.sample_rate as u64) / 1_000_000) as u32
    }

    /// Convert a sample count back to microseconds.
    pub fn samples_to_us(&self, samples: u32) -> u32 {
        ((samples as u64 * 1_000_000) / self.sample_rate.max(1) as u64) as u32
    }

    /// Scale every pulse/gap width and the sample rate by `factor`, in place.
    /// Used by the slicer-monotonicity property test (spec §8 item 5).
    pub fn scale(&self, factor: f64) -> PulseData {
        let sample_rate = ((self.sample_rate as f64) * factor).round() as u32;
        let pulse = self
            .pulse
            .iter()
            .map(|&p| (p as f64 * factor).round() as u32)
            .collect();
        let gap = self
            .gap
            .iter()
            .map(|&g| (g as f64 * factor).round() as u32)
            .collect();
        PulseData {
            sample_rate,
            pulse,
            gap,
            ook_high_estimate: self.ook_high_estimate,
            ook_low_estimate: self.ook_low_estimate,
            fsk_f1_est: self.fsk_f1_est,
            fsk_f2_est: self.fsk_f2_est,
            start_ago: self.start_ago,
        }
    }
}

/// The demodulator family a burst was produced by, per §6 input boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModulationFamily {
    /// AM/OOK envelope detection.
    Am,
    /// FM/2FSK phase discriminator.
    Fm,
}
