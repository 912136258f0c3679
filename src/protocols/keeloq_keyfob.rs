//! Generic KeeLoq rolling-code keyfob (component G), grounded on the
//! retained [`crate::protocols::keeloq_common`] cipher math.
//!
//! 66-bit frame: a 32-bit KeeLoq-encrypted hopping code, a 28-bit serial
//! number, a 4-bit button mask, and 2 status bits (low battery, repeat).
//! The hopping code decrypts to `0xBSSSCCCC` (4-bit discrimination nibble,
//! 10-bit serial-derived check value, 16-bit counter); a frame is only
//! accepted when that check value agrees with the low 10 bits of the
//! cleartext serial, matching the "normal learning" key-derivation scheme
//! `keeloq_common::keeloq_normal_learning` already implements.
//!
//! `MANUFACTURER_KEY` is a placeholder demo key (this decoder ships no real
//! manufacturer secrets); a deployment would substitute its own key store.

use crate::bitbuffer::BitBuffer;
use crate::decoder::{DecodeFailure, DeviceDecoder, Timing};
use crate::event::Event;
use crate::protocols::keeloq_common::keeloq_decrypt;
use crate::pulse::ModulationFamily;
use crate::slicer::Modulation;

const FRAME_BITS: usize = 66;
const MANUFACTURER_KEY: u64 = 0x5AA5_5AA5_5AA5_5AA5;

pub struct KeeloqKeyfob {
    key: u64,
}

impl KeeloqKeyfob {
    pub fn new(key: u64) -> Self {
        Self { key }
    }
}

impl Default for KeeloqKeyfob {
    fn default() -> Self {
        Self::new(MANUFACTURER_KEY)
    }
}

impl DeviceDecoder for KeeloqKeyfob {
    fn name(&self) -> &str {
        "KeeLoq-Keyfob"
    }

    fn modulation(&self) -> Modulation {
        Modulation::Pwm
    }

    fn timing(&self) -> Timing {
        Timing {
            short_us: 400,
            long_us: 800,
            reset_us: 12000,
            gap_us: 3000,
            tolerance_us: 150,
            sync_us: 0,
        }
    }

    fn modulation_family(&self) -> ModulationFamily {
        ModulationFamily::Am
    }

    fn decode(&self, rows: &BitBuffer, sink: &mut Vec<Event>) -> i32 {
        let mut emitted = 0i32;
        for row in 0..rows.num_rows() {
            if rows.bits_per_row(row) != FRAME_BITS {
                continue;
            }
            let hop_bytes = rows.extract_bytes_vec(row, 0, 32);
            let encrypted = u32::from_be_bytes([hop_bytes[0], hop_bytes[1], hop_bytes[2], hop_bytes[3]]);

            let serial_bytes = rows.extract_bytes_vec(row, 32, 28);
            let serial = ((serial_bytes[0] as u32) << 20)
                | ((serial_bytes[1] as u32) << 12)
                | ((serial_bytes[2] as u32) << 4)
                | ((serial_bytes[3] as u32) >> 4);
            let button = rows.extract_bytes_vec(row, 60, 4)[0] >> 4;
            let status = rows.extract_bytes_vec(row, 64, 2)[0];
            let battery_low = status & 0x80 != 0;
            let repeat = status & 0x40 != 0;

            let plaintext = keeloq_decrypt(encrypted, self.key);
            let counter = (plaintext & 0xFFFF) as u32;
            let disc = ((plaintext >> 16) & 0x3FF) as u32;

            if disc != serial & 0x3FF {
                return DecodeFailure::FailMic.code();
            }

            let mut ev = Event::for_model("KeeLoq-Keyfob");
            ev.push("serial", format!("{serial:07X}"))
                .push("button", button as i64)
                .push("counter", counter as i64)
                .push("battery_ok", !battery_low)
                .push("repeat", repeat as i64);
            sink.push(ev);
            emitted += 1;
        }
        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::keeloq_common::keeloq_encrypt;

    fn build_row(serial: u32, button: u8, counter: u16, battery_low: bool, repeat: bool, key: u64) -> BitBuffer {
        let serial = serial & 0x0FFF_FFFF;
        let disc = serial & 0x3FF;
        let plaintext = (disc << 16) | counter as u32;
        let encrypted = keeloq_encrypt(plaintext, key);

        let mut buf = BitBuffer::new();
        for byte in encrypted.to_be_bytes() {
            for i in 0..8 {
                buf.add_bit(byte & (0x80 >> i) != 0);
            }
        }
        for i in 0..28 {
            buf.add_bit(serial & (1 << (27 - i)) != 0);
        }
        for i in 0..4 {
            buf.add_bit(button & (0x08 >> i) != 0);
        }
        buf.add_bit(battery_low);
        buf.add_bit(repeat);
        buf
    }

    #[test]
    fn decodes_a_valid_hop_code() {
        let buf = build_row(0x0123456, 0xA, 42, false, false, MANUFACTURER_KEY);
        let mut sink = Vec::new();
        let n = KeeloqKeyfob::default().decode(&buf, &mut sink);
        assert_eq!(n, 1);
        let ev = &sink[0];
        assert_eq!(ev.get("counter"), Some(&42i64.into()));
        assert_eq!(ev.get("button"), Some(&0xAi64.into()));
        assert_eq!(ev.get("battery_ok"), Some(&"OK".into()));
        assert_eq!(ev.get("repeat"), Some(&0i64.into()));
    }

    #[test]
    fn wrong_key_fails_mic() {
        let buf = build_row(0x0123456, 0xA, 42, false, false, MANUFACTURER_KEY);
        let mut sink = Vec::new();
        let n = KeeloqKeyfob::new(0x1122_3344_5566_7788).decode(&buf, &mut sink);
        assert_eq!(n, DecodeFailure::FailMic.code());
    }
}
