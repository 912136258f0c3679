//! PIWM-raw (Pulse Interval and Width, raw) slicer (spec §4.2).
//!
//! Both the pulse and the gap of each pair carry data: each width divided
//! by `short_width` gives a run length `w`, and that many bits are
//! emitted with alternating polarity per position — `1` for pulse
//! positions, `0` for gap positions. A width exceeding `long_width`
//! starts a new row instead of emitting a run; a reset-length width ends
//! the message.

use crate::bitbuffer::BitBuffer;
use crate::decoder::Timing;
use crate::pulse::PulseData;
use crate::slicer::Slicer;

fn emit_run(out: &mut BitBuffer, width_us: u32, timing: &Timing, polarity: bool) {
    if width_us >= timing.reset_us {
        out.add_row();
        return;
    }
    if width_us > timing.long_us {
        out.add_row();
        return;
    }
    let n = ((width_us as f64) / (timing.short_us.max(1) as f64)).round() as u32;
    for _ in 0..n {
        out.add_bit(polarity);
    }
}

pub struct PiwmRawSlicer;

impl Slicer for PiwmRawSlicer {
    fn slice(&self, pulses: &PulseData, timing: &Timing) -> BitBuffer {
        let mut out = BitBuffer::new();
        for i in 0..pulses.num_pulses() {
            let pulse_us = pulses.samples_to_us(pulses.pulse(i));
            let gap_us = pulses.samples_to_us(pulses.gap(i));
            emit_run(&mut out, pulse_us, timing, true);
            emit_run(&mut out, gap_us, timing, false);
        }
        out
    }
}
