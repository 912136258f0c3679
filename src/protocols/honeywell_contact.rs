//! Honeywell-style door/window contact sensor (spec §8 scenario S4,
//! component G).
//!
//! 64-bit frame, transmitted inverted, entirely byte-aligned:
//! `preamble(8)=0xFF id(20, left-justified in 3 bytes, low nibble
//! reserved) channel(8) event(8) crc16(16)`. The CRC covers the five
//! `id‖reserved‖channel‖event` bytes, CRC-16 poly 0x8005 init 0x0000 — the
//! same parametric core `crc.rs` already carries published vectors for.
//! `event`'s top bit is the open/closed state, bit 6 is the periodic
//! heartbeat flag, and bit 5 is a battery-low flag (0 = OK).

use crate::bitbuffer::BitBuffer;
use crate::crc::crc16;
use crate::decoder::{DecodeFailure, DeviceDecoder, Timing};
use crate::event::Event;
use crate::pulse::ModulationFamily;
use crate::slicer::Modulation;

const PREAMBLE: (usize, &[u8]) = (8, &[0xFF]);
const PAYLOAD_BYTES: usize = 5; // id (3 bytes, 20 bits + 4 reserved) + channel + event
const FRAME_BITS: usize = PREAMBLE.0 + PAYLOAD_BYTES * 8 + 16;

pub struct HoneywellContact;

impl DeviceDecoder for HoneywellContact {
    fn name(&self) -> &str {
        "Honeywell-Contact"
    }

    fn modulation(&self) -> Modulation {
        Modulation::PcmNrz
    }

    fn timing(&self) -> Timing {
        Timing {
            short_us: 156,
            long_us: 156,
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
            let len = working.bits_per_row(row);
            if len < FRAME_BITS {
                return DecodeFailure::AbortLength.code();
            }
            let at = working.search(row, 0, PREAMBLE.1, PREAMBLE.0);
            if at != 0 {
                return DecodeFailure::AbortEarly.code();
            }

            let payload = working.extract_bytes_vec(row, PREAMBLE.0, PAYLOAD_BYTES * 8);
            let crc_bytes = working.extract_bytes_vec(row, PREAMBLE.0 + PAYLOAD_BYTES * 8, 16);
            let crc_received = ((crc_bytes[0] as u16) << 8) | crc_bytes[1] as u16;

            if crc16(&payload, 0x8005, 0x0000, 0x0000) != crc_received {
                return DecodeFailure::FailMic.code();
            }

            let id_value =
                ((payload[0] as u32) << 12) | ((payload[1] as u32) << 4) | ((payload[2] as u32) >> 4);
            let channel = payload[3] as i64;
            let event_byte = payload[4];
            let state = if event_byte & 0x80 != 0 { "open" } else { "closed" };
            let heartbeat = ((event_byte >> 6) & 1) as i64;
            let battery_ok = (event_byte >> 5) & 1 == 0;

            let mut ev = Event::for_model("Honeywell-Contact");
            ev.push("id", format!("{id_value:05X}"))
                .push("channel", channel)
                .push("state", state)
                .push("heartbeat", heartbeat)
                .push("battery_ok", battery_ok as i64);
            sink.push(ev);
            emitted += 1;
        }
        emitted
    }
}
