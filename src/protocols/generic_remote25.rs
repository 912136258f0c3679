//! Generic 25-bit fixed-code remote (spec §8 scenario S3, component G).
//!
//! Catch-all decoder for PT2262/EV1527-style remotes that pack a 16-bit id
//! and 8-bit command into 24 data bits, followed by one guard bit that is
//! always `1` in a valid frame. The frame is transmitted inverted. Runs at
//! a low priority (behind every protocol-specific PWM decoder) since it
//! will happily accept any 25-bit burst — spec §4.4's "generic catch-all
//! decoder sits behind specific ones" dispatch rule.
//!
//! Each of the 24 data bits is also rendered as a tristate digit
//! (`'0'`/`'1'`) for parity with the legacy PT2262 "tristate" field; this
//! decoder works purely from already-sliced bits, so it can only ever
//! report the two digit-level states — `'Z'`/`'X'` are reserved for a
//! front end that decodes raw pulse pairs instead of individual bits.

use crate::bitbuffer::BitBuffer;
use crate::decoder::{DecodeFailure, DeviceDecoder, Timing};
use crate::event::Event;
use crate::pulse::ModulationFamily;
use crate::slicer::Modulation;

const FRAME_BITS: usize = 25;

pub struct GenericRemote25;

impl DeviceDecoder for GenericRemote25 {
    fn name(&self) -> &str {
        "Generic-Remote25"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn modulation(&self) -> Modulation {
        Modulation::Ppm
    }

    fn timing(&self) -> Timing {
        Timing {
            short_us: 350,
            long_us: 1050,
            reset_us: 9000,
            gap_us: 9000,
            tolerance_us: 150,
            sync_us: 0,
        }
    }

    fn modulation_family(&self) -> ModulationFamily {
        ModulationFamily::Am
    }

    fn decode(&self, rows: &BitBuffer, sink: &mut Vec<Event>) -> i32 {
        let mut working = rows.clone();
        working.invert();

        let mut emitted = 0i32;
        for row in 0..working.num_rows() {
            if working.bits_per_row(row) != FRAME_BITS {
                continue;
            }
            let data = working.extract_bytes_vec(row, 0, 24);
            let guard = working.extract_bytes_vec(row, 24, 1);
            if guard[0] & 0x80 == 0 {
                return DecodeFailure::FailSanity.code();
            }

            let id = ((data[0] as i64) << 8) | data[1] as i64;
            let cmd = data[2] as i64;
            let tristate: String = (0..24)
                .map(|i| if data[i / 8] & (0x80 >> (i % 8)) != 0 { '1' } else { '0' })
                .collect();

            let mut ev = Event::for_model("Generic-Remote25");
            ev.push("id", id).push("cmd", cmd).push("tristate", tristate);
            sink.push(ev);
            emitted += 1;
        }
        emitted
    }
}
