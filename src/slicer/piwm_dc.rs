//! PIWM-DC (differential-coding variant of PIWM) slicer (spec §4.2).
//!
//! Unlike [`super::piwm_raw`], each width is classified individually
//! rather than run-length expanded: a pulse or gap close to
//! `short_width` is a `1`, one close to `long_width` is a `0`. A
//! reset-length width ends the message.

use crate::bitbuffer::BitBuffer;
use crate::decoder::Timing;
use crate::pulse::PulseData;
use crate::slicer::{within_tolerance, Slicer};

fn emit_bit(out: &mut BitBuffer, width_us: u32, timing: &Timing) {
    if width_us >= timing.reset_us {
        out.add_row();
        return;
    }
    if within_tolerance(width_us, timing.short_us, timing.tolerance_us) {
        out.add_bit(true);
    } else if within_tolerance(width_us, timing.long_us, timing.tolerance_us) {
        out.add_bit(false);
    }
}

pub struct PiwmDcSlicer;

impl Slicer for PiwmDcSlicer {
    fn slice(&self, pulses: &PulseData, timing: &Timing) -> BitBuffer {
        let mut out = BitBuffer::new();
        for i in 0..pulses.num_pulses() {
            let pulse_us = pulses.samples_to_us(pulses.pulse(i));
            let gap_us = pulses.samples_to_us(pulses.gap(i));
            emit_bit(&mut out, pulse_us, timing);
            emit_bit(&mut out, gap_us, timing);
        }
        out
    }
}
