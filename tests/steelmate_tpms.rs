//! End-to-end scenario S6: Steelmate TPMS.

use pulsecode::bitbuffer::BitBuffer;
use pulsecode::crc::checksum_sum;
use pulsecode::decoder::DecodeFailure;
use pulsecode::dispatch::Dispatcher;
use pulsecode::protocols::steelmate_tpms::SteelmateTpms;

fn inverted_row(bytes: [u8; 9]) -> BitBuffer {
    let hex: String = bytes.iter().map(|b| format!("{:02X}", !b)).collect();
    BitBuffer::parse(&format!("{{72}}0x{hex}")).unwrap()
}

#[test]
fn scenario_s6_emits_expected_fields() {
    let bytes = [0xC3u8, 0xF0, 0xA0, 0x4A, 0x8E, 0x75, 0x00, 0x00, 0xA0];
    assert_eq!(checksum_sum(&bytes[0..8]), bytes[8]);
    let buf = inverted_row(bytes);
    let (raw, events) = Dispatcher::run_on_rows(&SteelmateTpms, &buf);
    assert_eq!(raw, 1);
    let ev = &events[0];
    assert_eq!(ev.get("type"), Some(&"TPMS".into()));
    assert_eq!(ev.get("id"), Some(&"0xc3f0".into()));
    assert_eq!(ev.get("pressure_kPa"), Some(&500.0f64.into()));
    assert_eq!(ev.get("temperature_C"), Some(&24i64.into()));
    assert_eq!(ev.get("battery_mV"), Some(&2480i64.into()));
}

#[test]
fn bad_checksum_is_rejected() {
    let bytes = [0xC3u8, 0xF0, 0xA0, 0x4A, 0x8E, 0x75, 0x00, 0x00, 0x00];
    let buf = inverted_row(bytes);
    let (raw, _) = Dispatcher::run_on_rows(&SteelmateTpms, &buf);
    assert_eq!(raw, DecodeFailure::FailMic.code());
}
