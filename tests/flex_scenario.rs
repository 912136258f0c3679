//! End-to-end scenario S5: a flex decoder spec fed a burst of repeated rows.
//!
//! The spec string uses `repeats>2` rather than the scenario table's
//! `repeats>=3` — this decoder's numeric-filter grammar only implements the
//! bare `>`/`<`/`=` operators (see `flex.rs`'s `NumFilter`), so "at least 3"
//! is spelled as "strictly greater than 2", which is equivalent.

use pulsecode::bitbuffer::BitBuffer;
use pulsecode::decoder::DeviceDecoder;
use pulsecode::dispatch::Dispatcher;
use pulsecode::flex::FlexDecoder;

fn three_identical_rows() -> BitBuffer {
    let mut buf = BitBuffer::new();
    for _ in 0..3 {
        for byte in [0xA9u8, 0x87, 0x8C] {
            for i in 0..8 {
                buf.add_bit(byte & (0x80 >> i) != 0);
            }
        }
        buf.add_row();
    }
    buf
}

#[test]
fn scenario_s5_counts_every_repeated_match() {
    let decoder: FlexDecoder = "t:ook_pwm:400:800:7000,match={24}0xA9878C,repeats>2".parse().unwrap();
    let buf = three_identical_rows();
    let (raw, events) = Dispatcher::run_on_rows(&decoder, &buf);
    assert_eq!(raw, 3);
    assert_eq!(events.len(), 3);
    for ev in &events {
        assert_eq!(ev.get("model"), Some(&"t".into()));
    }
}

#[test]
fn non_matching_prefix_is_rejected() {
    let decoder: FlexDecoder = "t:ook_pwm:400:800:7000,match={24}0xA9878C".parse().unwrap();
    let mut buf = BitBuffer::new();
    for byte in [0xFFu8, 0xFF, 0xFF] {
        for i in 0..8 {
            buf.add_bit(byte & (0x80 >> i) != 0);
        }
    }
    let (raw, events) = Dispatcher::run_on_rows(&decoder, &buf);
    assert_eq!(raw, 0);
    assert!(events.is_empty());
}

#[test]
fn flex_decoder_reports_the_modulation_it_parsed() {
    let decoder: FlexDecoder = "t:ook_pwm:400:800:7000".parse().unwrap();
    assert_eq!(decoder.name(), "t");
}
