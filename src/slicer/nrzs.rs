//! NRZS (Non-Return-to-Zero Space) slicer (spec §4.2).
//!
//! A pulse longer than `short_width` emits `floor(pulse / short_width)`
//! one-bits followed by a terminating zero; a pulse at or below
//! `short_width` emits a single zero on its own. A reset-length gap ends
//! the message.

use crate::bitbuffer::BitBuffer;
use crate::decoder::Timing;
use crate::pulse::PulseData;
use crate::slicer::Slicer;

pub struct NrzsSlicer;

impl Slicer for NrzsSlicer {
    fn slice(&self, pulses: &PulseData, timing: &Timing) -> BitBuffer {
        let mut out = BitBuffer::new();
        for i in 0..pulses.num_pulses() {
            let pulse_us = pulses.samples_to_us(pulses.pulse(i));
            if pulse_us > timing.short_us {
                let n = pulse_us / timing.short_us.max(1);
                for _ in 0..n {
                    out.add_bit(true);
                }
                out.add_bit(false);
            } else {
                out.add_bit(false);
            }

            let gap_us = pulses.samples_to_us(pulses.gap(i));
            if gap_us >= timing.reset_us {
                out.add_row();
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
            reset_us: 5000,
            gap_us: 600,
            tolerance_us: 50,
            sync_us: 0,
        }
    }

    #[test]
    fn long_pulse_emits_ones_then_terminator() {
        let t = timing();
        let pd = PulseData::from_pulses(1_000_000, vec![600], vec![100]);
        let buf = NrzsSlicer.slice(&pd, &t);
        assert_eq!(buf.bits_per_row(0), 4);
        let bits = buf.extract_bytes_vec(0, 0, 4)[0];
        assert_eq!(bits & 0xF0, 0b1110_0000);
    }

    #[test]
    fn short_pulse_emits_single_zero() {
        let t = timing();
        let pd = PulseData::from_pulses(1_000_000, vec![100], vec![100]);
        let buf = NrzsSlicer.slice(&pd, &t);
        assert_eq!(buf.bits_per_row(0), 1);
        assert_eq!(buf.extract_bytes_vec(0, 0, 1)[0] & 0x80, 0);
    }

    #[test]
    fn reset_gap_ends_message() {
        let t = timing();
        let pd = PulseData::from_pulses(1_000_000, vec![100, 100], vec![100, 9000]);
        let buf = NrzsSlicer.slice(&pd, &t);
        assert_eq!(buf.num_rows(), 2);
    }
}
