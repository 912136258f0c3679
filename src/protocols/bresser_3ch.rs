//! Bresser 3CH temperature/humidity sensor (spec §8 scenario S1, component G).
//!
//! 48-bit frame, transmitted inverted: `id(8) status(8) temp_hi(8, high nibble
//! used) temp_lo(8, BCD) humidity(8) checksum(8)`. `status` bit 3 carries a
//! battery-low flag; bits 4..5 carry the channel number (1-based). Temperature
//! is BCD with a fixed 800-unit offset
//! baked into the raw scale, in tenths of a degree Fahrenheit minus 900 —
//! the same "raw minus a few hundred, divided by ten" shape as the teacher's
//! dual-unit helpers in `protocols::common`.

use crate::bitbuffer::BitBuffer;
use crate::crc::checksum_sum;
use crate::decoder::{DecodeFailure, DeviceDecoder, Timing};
use crate::event::Event;
use crate::pulse::ModulationFamily;
use crate::slicer::Modulation;

pub struct Bresser3ch;

fn bcd_to_decimal(byte: u8) -> u32 {
    ((byte >> 4) & 0xF) as u32 * 10 + (byte & 0xF) as u32
}

impl DeviceDecoder for Bresser3ch {
    fn name(&self) -> &str {
        "Bresser-3CH"
    }

    fn modulation(&self) -> Modulation {
        Modulation::Pwm
    }

    fn timing(&self) -> Timing {
        Timing {
            short_us: 250,
            long_us: 500,
            reset_us: 8000,
            gap_us: 2000,
            tolerance_us: 120,
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
            if working.bits_per_row(row) != 48 {
                continue;
            }
            let bytes = working.extract_bytes_vec(row, 0, 48);
            let (id, status, temp_hi, temp_lo, humidity, chk) =
                (bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]);

            if checksum_sum(&bytes[0..5]) != chk {
                return DecodeFailure::FailMic.code();
            }

            let channel = ((status >> 4) & 0x03) as i64 + 1;
            let battery_low = status & 0x08 != 0;
            let temp_raw = 800 + (((temp_hi >> 4) & 0xF) as u32) * 100 + bcd_to_decimal(temp_lo);
            let temperature_f = (temp_raw as f64 - 900.0) / 10.0;

            if !(-40.0..=140.0).contains(&temperature_f) {
                return DecodeFailure::FailSanity.code();
            }

            let mut ev = Event::for_model("Bresser-3CH");
            ev.push("id", id as i64)
                .push("channel", channel)
                .push("battery", !battery_low)
                .push("temperature_F", temperature_f)
                .push("humidity", humidity as i64);
            sink.push(ev);
            emitted += 1;
        }

        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_row(id: u8, status: u8, temp_hi: u8, temp_lo: u8, humidity: u8) -> BitBuffer {
        let chk = checksum_sum(&[id, status, temp_hi, temp_lo, humidity]);
        let bytes = [id, status, temp_hi, temp_lo, humidity, chk];
        let inverted: Vec<u8> = bytes.iter().map(|b| !b).collect();
        let hex: String = inverted.iter().map(|b| format!("{b:02X}")).collect();
        BitBuffer::parse(&format!("{{48}}0x{hex}")).unwrap()
    }

    #[test]
    fn decodes_scenario_s1() {
        let buf = build_row(0xA7, 0x62, 0x50, 0x23, 0x45);
        let mut sink = Vec::new();
        let n = Bresser3ch.decode(&buf, &mut sink);
        assert_eq!(n, 1);
        let ev = &sink[0];
        assert_eq!(ev.get("model"), Some(&"Bresser-3CH".into()));
        assert_eq!(ev.get("id"), Some(&167i64.into()));
        assert_eq!(ev.get("channel"), Some(&3i64.into()));
        assert_eq!(ev.get("battery"), Some(&"OK".into()));
        assert_eq!(ev.get("temperature_F"), Some(&42.3f64.into()));
        assert_eq!(ev.get("humidity"), Some(&69i64.into()));
    }

    #[test]
    fn bad_checksum_fails_mic() {
        let mut buf = build_row(0xA7, 0x62, 0x50, 0x23, 0x45);
        buf.invert(); // undo the stored inversion to get plain bytes
        let mut bytes = buf.extract_bytes_vec(0, 0, 48);
        bytes[5] ^= 0xFF; // corrupt the checksum byte
        let inverted: Vec<u8> = bytes.iter().map(|b| !b).collect();
        let hex: String = inverted.iter().map(|b| format!("{b:02X}")).collect();
        let bad = BitBuffer::parse(&format!("{{48}}0x{hex}")).unwrap();
        let mut sink = Vec::new();
        assert_eq!(Bresser3ch.decode(&bad, &mut sink), DecodeFailure::FailMic.code());
    }
}
