//! AmbientWeather WH31E temperature/humidity sensor (spec §8 scenario S2,
//! component G).
//!
//! Fine-Offset-style frame: preamble `0xAA…0x2D 0xD4`, then a 40-bit body
//! `type(8) id(8) flags_temp_hi(8) temp_lo(8) humidity(8) crc8(8)` where the
//! 10-bit temperature spans the low 2 bits of `flags_temp_hi` and all of
//! `temp_lo`. CRC is CRC-8 poly 0x31 init 0x00 over the five bytes preceding
//! it — the same polynomial design note 9 calls out for the Fine Offset
//! family and `crc.rs`'s own `crc8_poly_31_init_00_self_consistent` test.

use crate::bitbuffer::BitBuffer;
use crate::crc::crc8;
use crate::decoder::{DecodeFailure, DeviceDecoder, Timing};
use crate::event::Event;
use crate::pulse::ModulationFamily;
use crate::slicer::Modulation;

const SYNC_WORD: (usize, &[u8]) = (16, &[0x2D, 0xD4]);
const BODY_BITS: usize = 40;

pub struct AmbientWeatherWh31e;

impl DeviceDecoder for AmbientWeatherWh31e {
    fn name(&self) -> &str {
        "AmbientWeather-WH31E"
    }

    fn modulation(&self) -> Modulation {
        Modulation::PcmNrz
    }

    fn timing(&self) -> Timing {
        Timing {
            short_us: 58,
            long_us: 58,
            reset_us: 4000,
            gap_us: 1000,
            tolerance_us: 20,
            sync_us: 0,
        }
    }

    fn modulation_family(&self) -> ModulationFamily {
        ModulationFamily::Am
    }

    fn decode(&self, rows: &BitBuffer, sink: &mut Vec<Event>) -> i32 {
        let mut emitted = 0i32;
        for row in 0..rows.num_rows() {
            let len = rows.bits_per_row(row);
            let at = rows.search(row, 0, SYNC_WORD.1, SYNC_WORD.0);
            if at >= len {
                return DecodeFailure::AbortEarly.code();
            }
            let body_start = at + SYNC_WORD.0;
            if body_start + BODY_BITS > len {
                return DecodeFailure::AbortLength.code();
            }

            let bytes = rows.extract_bytes_vec(row, body_start, BODY_BITS);
            let (_kind, id, flags_temp_hi, temp_lo, humidity, crc) =
                (bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]);

            if crc8(&bytes[0..5], 0x31, 0x00) != crc {
                return DecodeFailure::FailMic.code();
            }

            let channel = (((flags_temp_hi >> 4) & 0x03) + 1) as i64;
            let battery_ok = flags_temp_hi & 0x80 != 0;
            let temp_raw = (((flags_temp_hi & 0x03) as u32) << 8) | temp_lo as u32;
            let temperature_c = temp_raw as f64 / 10.0 - 40.0;

            let mut ev = Event::for_model("AmbientWeather-WH31E");
            ev.push("id", id as i64)
                .push("channel", channel)
                .push("battery", battery_ok)
                .push("temperature_C", temperature_c)
                .push("humidity", humidity as i64);
            sink.push(ev);
            emitted += 1;
        }
        emitted
    }
}
