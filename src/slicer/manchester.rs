//! Manchester-zero-bit slicer (spec §4.2).
//!
//! Bi-phase decoding where the first rising edge is hard-coded as a `0`.
//! The slicer walks the pulse/gap stream as a single sequence of level
//! durations, accumulating elapsed time since the last emitted bit; once
//! that accumulation exceeds `short_width × 1.5` a data edge has occurred
//! and a bit is emitted — falling edge (end of a pulse) → `1`, rising edge
//! (end of a gap) → `0`. A duration alone exceeding three half-bit widths
//! without resolving into an edge means the clock has been lost, so the
//! decoder state resets (a new row starts) rather than emitting a
//! guessed bit.

use crate::bitbuffer::BitBuffer;
use crate::decoder::Timing;
use crate::pulse::PulseData;
use crate::slicer::Slicer;

pub struct ManchesterSlicer;

impl Slicer for ManchesterSlicer {
    fn slice(&self, pulses: &PulseData, timing: &Timing) -> BitBuffer {
        let mut out = BitBuffer::new();
        if pulses.is_empty() {
            return out;
        }
        out.add_bit(false);

        let threshold = (timing.short_us as f64) * 1.5;
        let anomalous = (timing.short_us as f64) * 3.0;
        let mut accumulated = 0.0f64;

        for i in 0..pulses.num_pulses() {
            let pulse_us = pulses.samples_to_us(pulses.pulse(i)) as f64;
            accumulated += pulse_us;
            if accumulated > anomalous {
                out.add_row();
                accumulated = 0.0;
            } else if accumulated > threshold {
                out.add_bit(true);
                accumulated = 0.0;
            }

            let gap_us = pulses.samples_to_us(pulses.gap(i));
            if gap_us >= timing.reset_us {
                out.add_row();
                accumulated = 0.0;
                continue;
            }

            accumulated += gap_us as f64;
            if accumulated > anomalous {
                out.add_row();
                accumulated = 0.0;
            } else if accumulated > threshold {
                out.add_bit(false);
                accumulated = 0.0;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> Timing {
        Timing {
            short_us: 200,
            long_us: 400,
            reset_us: 10_000,
            gap_us: 600,
            tolerance_us: 50,
            sync_us: 0,
        }
    }

    #[test]
    fn first_bit_is_hardcoded_zero() {
        let t = timing();
        let pd = PulseData::from_pulses(1_000_000, vec![200], vec![200]);
        let buf = ManchesterSlicer.slice(&pd, &t);
        assert!(buf.bits_per_row(0) >= 1);
        assert_eq!(buf.extract_bytes_vec(0, 0, 1)[0] & 0x80, 0);
    }

    #[test]
    fn long_pulse_without_resolution_resets_row() {
        let t = timing();
        let pd = PulseData::from_pulses(1_000_000, vec![200, 10_000], vec![200, 200]);
        let buf = ManchesterSlicer.slice(&pd, &t);
        assert!(buf.num_rows() >= 2);
    }
}
