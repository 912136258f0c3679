//! End-to-end scenario S1: Bresser 3CH, driven through the public crate API
//! rather than reaching into the decoder module directly.

use pulsecode::bitbuffer::BitBuffer;
use pulsecode::crc::checksum_sum;
use pulsecode::decoder::DecodeFailure;
use pulsecode::dispatch::Dispatcher;
use pulsecode::protocols::bresser_3ch::Bresser3ch;

fn inverted_row(id: u8, status: u8, temp_hi: u8, temp_lo: u8, humidity: u8) -> BitBuffer {
    let chk = checksum_sum(&[id, status, temp_hi, temp_lo, humidity]);
    let hex: String = [id, status, temp_hi, temp_lo, humidity, chk]
        .iter()
        .map(|b| format!("{:02X}", !b))
        .collect();
    BitBuffer::parse(&format!("{{48}}0x{hex}")).unwrap()
}

#[test]
fn scenario_s1_emits_expected_fields() {
    let buf = inverted_row(0xA7, 0x62, 0x50, 0x23, 0x45);
    let (raw, events) = Dispatcher::run_on_rows(&Bresser3ch, &buf);
    assert_eq!(raw, 1);
    assert_eq!(events.len(), 1);
    let ev = &events[0];
    assert_eq!(ev.get("model"), Some(&"Bresser-3CH".into()));
    assert_eq!(ev.get("id"), Some(&167i64.into()));
    assert_eq!(ev.get("channel"), Some(&3i64.into()));
    assert_eq!(ev.get("battery"), Some(&"OK".into()));
    assert_eq!(ev.get("temperature_F"), Some(&42.3f64.into()));
    assert_eq!(ev.get("humidity"), Some(&69i64.into()));
}

#[test]
fn corrupted_checksum_is_rejected() {
    let mut buf = inverted_row(0xA7, 0x62, 0x50, 0x23, 0x45);
    buf.invert();
    let mut bytes = buf.extract_bytes_vec(0, 0, 48);
    bytes[5] ^= 0xFF;
    let hex: String = bytes.iter().map(|b| format!("{:02X}", !b)).collect();
    let bad = BitBuffer::parse(&format!("{{48}}0x{hex}")).unwrap();
    let (raw, events) = Dispatcher::run_on_rows(&Bresser3ch, &bad);
    assert_eq!(raw, DecodeFailure::FailMic.code());
    assert!(events.is_empty());
}
