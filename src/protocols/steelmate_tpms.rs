//! Steelmate tire-pressure monitor (spec §8 scenario S6, component G).
//!
//! 72-bit Manchester frame, transmitted inverted: `id(16) pressure(8)
//! temperature(8) battery(8) reserved(24) checksum(8)`. Pressure is the raw
//! byte in 1/8-PSI-equivalent units scaled to kPa (`raw * 25 / 8`);
//! temperature is the raw byte minus a fixed 50 °C offset; battery voltage
//! is `raw * 10 mV + 1060 mV`. Checksum is a byte sum (mod 256) over the
//! first eight bytes, the same MIC primitive every built-in decoder shares
//! via `crc::checksum_sum`.

use crate::bitbuffer::BitBuffer;
use crate::crc::checksum_sum;
use crate::decoder::{DecodeFailure, DeviceDecoder, Timing};
use crate::event::Event;
use crate::pulse::ModulationFamily;
use crate::slicer::Modulation;

const FRAME_BITS: usize = 72;

pub struct SteelmateTpms;

impl DeviceDecoder for SteelmateTpms {
    fn name(&self) -> &str {
        "Steelmate-TPMS"
    }

    fn modulation(&self) -> Modulation {
        Modulation::ManchesterZerobit
    }

    fn timing(&self) -> Timing {
        Timing {
            short_us: 112,
            long_us: 224,
            reset_us: 6000,
            gap_us: 1500,
            tolerance_us: 40,
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
            let bytes = working.extract_bytes_vec(row, 0, FRAME_BITS);

            if checksum_sum(&bytes[0..8]) != bytes[8] {
                return DecodeFailure::FailMic.code();
            }

            let pressure_kpa = bytes[2] as f64 * 25.0 / 8.0;
            let temperature_c = bytes[3] as i64 - 50;
            let battery_mv = bytes[4] as i64 * 10 + 1060;

            let mut ev = Event::for_model("TPMS");
            ev.push("type", "TPMS")
                .push("id", format!("0x{:02x}{:02x}", bytes[0], bytes[1]))
                .push("pressure_kPa", pressure_kpa)
                .push("temperature_C", temperature_c)
                .push("battery_mV", battery_mv);
            sink.push(ev);
            emitted += 1;
        }
        emitted
    }
}
