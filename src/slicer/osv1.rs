//! OSv1 (Oregon Scientific v1) slicer (spec §4.2).
//!
//! Expects exactly 12 consistent half-bit pulses as a preamble, then a
//! sync pulse at least twice the widest preamble half-bit, then decodes
//! the remainder as Manchester pairs (every other half-period yields a
//! bit). Reuses [`BitBuffer::manchester_decode`] for that last step
//! rather than re-implementing edge detection, the way
//! [`crate::bitbuffer`] already exposes it as a primitive shared across
//! slicers (spec §4.1).

use crate::bitbuffer::BitBuffer;
use crate::decoder::Timing;
use crate::pulse::PulseData;
use crate::slicer::Slicer;

const PREAMBLE_LEN: usize = 12;

pub struct Osv1Slicer;

impl Slicer for Osv1Slicer {
    fn slice(&self, pulses: &PulseData, timing: &Timing) -> BitBuffer {
        let mut out = BitBuffer::new();
        let n = pulses.num_pulses();
        if n <= PREAMBLE_LEN {
            return out;
        }

        let preamble_widths: Vec<f64> = (0..PREAMBLE_LEN)
            .map(|i| pulses.samples_to_us(pulses.pulse(i)) as f64)
            .collect();
        let half_bit = preamble_widths.iter().sum::<f64>() / PREAMBLE_LEN as f64;
        let tol = timing.tolerance_us as f64;
        let consistent = preamble_widths.iter().all(|&w| (w - half_bit).abs() <= tol);
        if !consistent {
            return out;
        }

        let half_bit_max = preamble_widths.iter().cloned().fold(0.0f64, f64::max);
        let sync_width = pulses.samples_to_us(pulses.pulse(PREAMBLE_LEN)) as f64;
        if sync_width < 2.0 * half_bit_max {
            return out;
        }

        let mut scratch = BitBuffer::new();
        for i in (PREAMBLE_LEN + 1)..n {
            let w = pulses.samples_to_us(pulses.pulse(i)) as f64;
            let units = ((w / half_bit).round() as u32).max(1);
            for u in 0..units {
                scratch.add_bit(u % 2 == 0);
            }
            let gap_us = pulses.samples_to_us(pulses.gap(i));
            if gap_us >= timing.reset_us {
                break;
            }
        }
        scratch.manchester_decode(0, 0, &mut out, usize::MAX);
        out
    }
}
