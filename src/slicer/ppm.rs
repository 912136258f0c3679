//! PPM (Pulse Position Modulation) slicer (spec §4.2).
//!
//! Gaps carry the code: a short gap is a `0`, a long gap a `1`, and an
//! optional sync gap marks a row boundary. When `tolerance > 0` the
//! boundaries are hard windows around `short`/`long`/`sync`; a gap fitting
//! none of them is dropped silently (malformed symbol). With no
//! tolerance configured, classification instead falls back to the
//! `(short + long) / 2` midpoint, with ties resolved toward the longer
//! class per the uniform tie-break rule.

use crate::bitbuffer::BitBuffer;
use crate::decoder::Timing;
use crate::pulse::PulseData;
use crate::slicer::{within_tolerance, Slicer};

pub struct PpmSlicer;

impl Slicer for PpmSlicer {
    fn slice(&self, pulses: &PulseData, timing: &Timing) -> BitBuffer {
        let mut out = BitBuffer::new();
        let tol = timing.tolerance_us;
        let mid = (timing.short_us + timing.long_us) / 2;

        for i in 0..pulses.num_pulses() {
            let gap_us = pulses.samples_to_us(pulses.gap(i));

            if gap_us >= timing.reset_us {
                out.add_row();
                continue;
            }
            if timing.sync_us > 0 && within_tolerance(gap_us, timing.sync_us, tol) {
                out.add_sync();
                continue;
            }

            let bit = if tol > 0 {
                if within_tolerance(gap_us, timing.short_us, tol) {
                    Some(false)
                } else if within_tolerance(gap_us, timing.long_us, tol) {
                    Some(true)
                } else {
                    None
                }
            } else {
                Some(gap_us >= mid)
            };

            if let Some(b) = bit {
                out.add_bit(b);
            }
        }
        out
    }
}
