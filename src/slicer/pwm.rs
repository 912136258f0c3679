//! PWM (Pulse Width Modulation) slicer (spec §4.2).
//!
//! Pulses carry the code: short → `1`, long → `0`, and an optional sync
//! pulse marks a row boundary. The four sub-cases the spec enumerates —
//! no sync, sync below short, sync between short and long, sync above
//! long — all reduce to the same rule once `short`, `long`, and (if
//! present) `sync` are sorted ascending: classification boundaries are the
//! midpoints between adjacent sorted widths, with the lowest class
//! floored at half its own nominal width (anything shorter is spurious)
//! and the highest class ceilinged symmetrically above its own nominal
//! width (anything longer ends the row). `sync_width == 0` is read as "no
//! sync configured", folding case (i) into the same code path.

use crate::bitbuffer::BitBuffer;
use crate::decoder::Timing;
use crate::pulse::PulseData;
use crate::slicer::Slicer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Short,
    Long,
    Sync,
}

enum Classified {
    Spurious,
    EndRow,
    Class(Class),
}

struct Buckets(Vec<(Class, u32)>);

impl Buckets {
    fn new(short: u32, long: u32, sync: u32) -> Self {
        let mut v = vec![(Class::Short, short), (Class::Long, long)];
        if sync > 0 {
            v.push((Class::Sync, sync));
        }
        v.sort_by_key(|&(_, w)| w);
        Buckets(v)
    }

    fn classify(&self, width_us: u32) -> Classified {
        let n = self.0.len();
        let low_floor = self.0[0].1 / 2;
        if width_us < low_floor {
            return Classified::Spurious;
        }
        let mids: Vec<u32> = self.0.windows(2).map(|w| (w[0].1 + w[1].1) / 2).collect();
        let mut idx = 0;
        // Tie-break: the longer class wins at an exact midpoint.
        for (i, &m) in mids.iter().enumerate() {
            if width_us >= m {
                idx = i + 1;
            }
        }
        if idx == n - 1 {
            let high_ceiling = if n >= 2 {
                let last = self.0[n - 1].1;
                let prev = self.0[n - 2].1;
                last + (last - prev) / 2
            } else {
                self.0[n - 1].1 * 2
            };
            if width_us > high_ceiling {
                return Classified::EndRow;
            }
        }
        Classified::Class(self.0[idx].0)
    }
}

pub struct PwmSlicer;

impl Slicer for PwmSlicer {
    fn slice(&self, pulses: &PulseData, timing: &Timing) -> BitBuffer {
        let mut out = BitBuffer::new();
        let buckets = Buckets::new(timing.short_us, timing.long_us, timing.sync_us);

        for i in 0..pulses.num_pulses() {
            let pulse_us = pulses.samples_to_us(pulses.pulse(i));
            let gap_us = pulses.samples_to_us(pulses.gap(i));

            match buckets.classify(pulse_us) {
                Classified::Spurious => {}
                Classified::EndRow => out.add_row(),
                Classified::Class(Class::Short) => out.add_bit(true),
                Classified::Class(Class::Long) => out.add_bit(false),
                Classified::Class(Class::Sync) => out.add_sync(),
            }

            if gap_us >= timing.reset_us {
                out.add_row();
            } else if gap_us > timing.gap_us {
                out.add_row();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(sync_us: u32) -> Timing {
        Timing {
            short_us: 300,
            long_us: 900,
            reset_us: 10_000,
            gap_us: 1200,
            tolerance_us: 100,
            sync_us,
        }
    }

    #[test]
    fn no_sync_case_classifies_short_and_long() {
        let t = timing(0);
        let pd = PulseData::from_pulses(1_000_000, vec![300, 900], vec![300, 300]);
        let buf = PwmSlicer.slice(&pd, &t);
        assert_eq!(buf.bits_per_row(0), 2);
        let bits = buf.extract_bytes_vec(0, 0, 2)[0];
        assert_eq!(bits & 0xC0, 0b1000_0000);
    }

    #[test]
    fn sync_between_short_and_long_starts_row() {
        let t = timing(600);
        let pd = PulseData::from_pulses(1_000_000, vec![300, 600, 900], vec![100, 100, 100]);
        let buf = PwmSlicer.slice(&pd, &t);
        assert_eq!(buf.num_rows(), 2);
    }

    #[test]
    fn oversized_pulse_ends_row() {
        let t = timing(0);
        let pd = PulseData::from_pulses(1_000_000, vec![300, 5000], vec![100, 100]);
        let buf = PwmSlicer.slice(&pd, &t);
        assert_eq!(buf.num_rows(), 2);
        assert_eq!(buf.bits_per_row(0), 1);
    }
}
