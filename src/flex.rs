//! Flex decoder factory (spec §4.6, component H): parses a spec string
//! into a table-driven [`DeviceDecoder`] at runtime, with no code to
//! write.
//!
//! Grammar: `"name:mod:short:long:reset[:gap[:tol[:sync]]][,key=value…]"`.
//! Bit-literal options reuse [`crate::bitbuffer::parse_bitspec`] (the same
//! `{nbits}hex-or-binary` grammar `BitBuffer::parse` already understands)
//! rather than a second parser, per the "shared BitBuffer::parse reuse"
//! supplement in SPEC_FULL.md §11.

use std::str::FromStr;

use crate::bitbuffer::{parse_bitspec, BitBuffer};
use crate::decoder::{DeviceDecoder, Timing};
use crate::error::FlexSpecError;
use crate::event::Event;
use crate::pulse::ModulationFamily;
use crate::slicer::{Modulation, Slicer};

/// Parse one of the nine modulation names a flex spec's `mod` field may
/// carry into the same [`Modulation`] enum built-in decoders declare —
/// a flex decoder is otherwise an ordinary [`DeviceDecoder`], so it reuses
/// the shared modulation/slicer mapping instead of keeping a parallel one.
fn parse_modulation(s: &str) -> Result<Modulation, FlexSpecError> {
    match s.to_ascii_lowercase().as_str() {
        "pcm_rz" | "ook_pcm_rz" => Ok(Modulation::PcmRz),
        "pcm_nrz" | "ook_pcm_nrz" | "pcm" => Ok(Modulation::PcmNrz),
        "ppm" | "ook_ppm" => Ok(Modulation::Ppm),
        "pwm" | "ook_pwm" => Ok(Modulation::Pwm),
        "manchester_zerobit" | "manchester" => Ok(Modulation::ManchesterZerobit),
        "dmc" => Ok(Modulation::Dmc),
        "piwm_raw" => Ok(Modulation::PiwmRaw),
        "piwm_dc" => Ok(Modulation::PiwmDc),
        "nrzs" => Ok(Modulation::Nrzs),
        "osv1" => Ok(Modulation::Osv1),
        other => Err(FlexSpecError::UnknownModulation(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumOp {
    Eq,
    Gt,
    Lt,
}


#[derive(Debug, Clone, Copy)]
struct NumFilter {
    op: NumOp,
    value: usize,
}

impl NumFilter {
    fn matches(&self, n: usize) -> bool {
        match self.op {
            NumOp::Eq => n == self.value,
            NumOp::Gt => n > self.value,
            NumOp::Lt => n < self.value,
        }
    }

    fn parse(value: &str) -> Result<Self, FlexSpecError> {
        let (op, rest) = if let Some(r) = value.strip_prefix('>') {
            (NumOp::Gt, r)
        } else if let Some(r) = value.strip_prefix('<') {
            (NumOp::Lt, r)
        } else {
            (NumOp::Eq, value)
        };
        let value: usize = rest
            .parse()
            .map_err(|_| FlexSpecError::BadOption(format!("bad numeric filter '{value}'")))?;
        Ok(NumFilter { op, value })
    }
}

#[derive(Debug, Clone)]
struct Getter {
    bit_offset: usize,
    bit_count: usize,
    name: String,
    map: Vec<(i64, String)>,
}

/// A parsed flex spec, ready to slice and decode bursts against.
pub struct FlexDecoder {
    name: String,
    modulation: Modulation,
    timing: Timing,
    bits: Option<NumFilter>,
    rows: Option<NumFilter>,
    repeats: Option<NumFilter>,
    invert: bool,
    match_pattern: Option<(usize, Vec<u8>)>,
    preamble_pattern: Option<(usize, Vec<u8>)>,
    countonly: bool,
    getters: Vec<Getter>,
}

fn parse_duration(field: &str) -> Result<u32, FlexSpecError> {
    field.parse().map_err(|_| FlexSpecError::BadDuration(field.to_string()))
}

impl FlexDecoder {
    /// Build the slicer this spec's modulation field names. Exposed so a
    /// runtime can slice once per burst and dispatch to both built-ins and
    /// flex decoders sharing the same `BitBuffer`.
    pub fn slicer(&self) -> Box<dyn Slicer> {
        self.modulation.slicer()
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    fn passes_prefilters(&self, rows: &BitBuffer) -> bool {
        if let Some(f) = self.rows {
            if !f.matches(rows.num_rows()) {
                return false;
            }
        }
        true
    }
}

impl FromStr for FlexDecoder {
    type Err = FlexSpecError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut parts = spec.splitn(2, ',');
        let head = parts.next().unwrap_or("");
        let tail = parts.next();

        let fields: Vec<&str> = head.split(':').collect();
        if fields.len() < 5 {
            return Err(FlexSpecError::TooFewFields);
        }
        let name = fields[0].trim();
        if name.is_empty() {
            return Err(FlexSpecError::MissingName);
        }
        let modulation = parse_modulation(fields[1])?;
        let short_us = parse_duration(fields[2])?;
        let long_us = parse_duration(fields[3])?;
        let reset_us = parse_duration(fields[4])?;
        let gap_us = fields.get(5).map(|f| parse_duration(f)).transpose()?.unwrap_or(reset_us);
        let tolerance_us = fields.get(6).map(|f| parse_duration(f)).transpose()?.unwrap_or(0);
        let sync_us = fields.get(7).map(|f| parse_duration(f)).transpose()?.unwrap_or(0);

        let mut d = FlexDecoder {
            name: name.to_string(),
            modulation,
            timing: Timing {
                short_us,
                long_us,
                reset_us,
                gap_us,
                tolerance_us,
                sync_us,
            },
            bits: None,
            rows: None,
            repeats: None,
            invert: false,
            match_pattern: None,
            preamble_pattern: None,
            countonly: false,
            getters: Vec::new(),
        };

        if let Some(tail) = tail {
            for opt in tail.split(',') {
                let opt = opt.trim();
                if opt.is_empty() {
                    continue;
                }
                if opt == "invert" {
                    d.invert = true;
                    continue;
                }
                if opt == "countonly" {
                    d.countonly = true;
                    continue;
                }
                let (key, value) = split_key_value(opt)?;
                match key {
                    "bits" => d.bits = Some(NumFilter::parse(value)?),
                    "rows" => d.rows = Some(NumFilter::parse(value)?),
                    "repeats" => d.repeats = Some(NumFilter::parse(value)?),
                    "match" => d.match_pattern = Some(parse_bitspec(value).ok_or_else(|| FlexSpecError::BadBitLiteral(value.to_string()))?),
                    "preamble" => {
                        d.preamble_pattern =
                            Some(parse_bitspec(value).ok_or_else(|| FlexSpecError::BadBitLiteral(value.to_string()))?)
                    }
                    "get" => d.getters.push(parse_getter(value)?),
                    other => return Err(FlexSpecError::BadOption(other.to_string())),
                }
            }
        }

        Ok(d)
    }
}

fn split_key_value(opt: &str) -> Result<(&str, &str), FlexSpecError> {
    // bits/rows/repeats may use '>'/'<' in place of '=' (NumFilter::parse
    // handles the operator itself once it has the raw value text).
    for sep in ['=', '>', '<'] {
        if let Some(idx) = opt.find(sep) {
            let key = &opt[..idx];
            let value = if sep == '=' { &opt[idx + 1..] } else { &opt[idx..] };
            return Ok((key, value));
        }
    }
    Err(FlexSpecError::BadOption(opt.to_string()))
}

fn parse_getter(spec: &str) -> Result<Getter, FlexSpecError> {
    // @<offset>:{<bits>}:<name>[:VAL=LABEL]*
    let spec = spec.strip_prefix('@').ok_or_else(|| FlexSpecError::BadOption(spec.to_string()))?;
    let mut parts = spec.splitn(3, ':');
    let offset: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| FlexSpecError::BadOption(format!("get offset in '{spec}'")))?;
    let bits_field = parts.next().ok_or_else(|| FlexSpecError::BadOption(format!("get bit count in '{spec}'")))?;
    let close = bits_field.find('}').ok_or_else(|| FlexSpecError::BadOption(bits_field.to_string()))?;
    let bit_count: usize = bits_field[1..close]
        .parse()
        .map_err(|_| FlexSpecError::BadOption(bits_field.to_string()))?;
    let rest = parts.next().unwrap_or("");
    let mut rest_parts = rest.split(':');
    let name = rest_parts.next().unwrap_or("field").to_string();
    let mut map = Vec::new();
    for entry in rest_parts {
        if let Some((k, v)) = entry.split_once('=') {
            if let Ok(n) = k.parse::<i64>() {
                map.push((n, v.to_string()));
            }
        }
    }
    Ok(Getter {
        bit_offset: offset,
        bit_count,
        name,
        map,
    })
}

/// Count how many rows of `buf` (including `row` itself) share `row`'s first
/// `min_bits` bits — the "repetition count" spec §4.6's `countonly` emits,
/// as distinct from [`BitBuffer::syncs_before_row`]'s timing-landmark tally.
fn count_repeats(buf: &BitBuffer, row: usize, min_bits: usize) -> u32 {
    let Some(target) = (buf.bits_per_row(row) >= min_bits).then(|| buf.extract_bytes_vec(row, 0, min_bits)) else {
        return 0;
    };
    (0..buf.num_rows())
        .filter(|&r| buf.bits_per_row(r) >= min_bits && buf.extract_bytes_vec(r, 0, min_bits) == target)
        .count() as u32
}

fn bits_to_i64(bytes: &[u8], nbits: usize) -> i64 {
    let mut v: i64 = 0;
    for i in 0..nbits {
        let bit = (bytes[i / 8] & (0x80 >> (i % 8))) != 0;
        v = (v << 1) | (bit as i64);
    }
    v
}

impl DeviceDecoder for FlexDecoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn modulation_family(&self) -> ModulationFamily {
        self.modulation.family()
    }

    fn modulation(&self) -> Modulation {
        self.modulation
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    fn decode(&self, rows: &BitBuffer, sink: &mut Vec<Event>) -> i32 {
        if !self.passes_prefilters(rows) {
            return 0;
        }

        let mut working = rows.clone();
        if self.invert {
            working.invert();
        }

        let repeat_min_bits = self.bits.map(|b| b.value).unwrap_or(1).max(1);
        if let Some(f) = self.repeats {
            match working.find_repeated_row(f.value.max(1), repeat_min_bits) {
                Some(_) if f.op == NumOp::Eq || f.op == NumOp::Gt => {}
                None if f.op == NumOp::Lt => {}
                _ => return 0,
            }
        }

        let mut emitted = 0u32;
        for row in 0..working.num_rows() {
            let bit_len = working.bits_per_row(row);
            if let Some(f) = self.bits {
                if !f.matches(bit_len) {
                    continue;
                }
            }

            let mut offset = 0usize;
            if let Some((plen, pbytes)) = &self.preamble_pattern {
                let at = working.search(row, 0, pbytes, *plen);
                if at >= bit_len {
                    continue;
                }
                offset = at + plen;
            }

            if let Some((mlen, mbytes)) = &self.match_pattern {
                let at = working.search(row, offset, mbytes, *mlen);
                if at >= bit_len {
                    continue;
                }
            }

            let mut ev = Event::for_model(self.name.clone());
            if self.countonly {
                let min_bits = repeat_min_bits.min(bit_len).max(1);
                ev.push("count", count_repeats(&working, row, min_bits) as i64);
            } else {
                for g in &self.getters {
                    let bytes = working.extract_bytes_vec(row, offset + g.bit_offset, g.bit_count);
                    let value = bits_to_i64(&bytes, g.bit_count);
                    if let Some((_, label)) = g.map.iter().find(|(k, _)| *k == value) {
                        ev.push(g.name.clone(), label.clone());
                    } else {
                        ev.push(g.name.clone(), value);
                    }
                }
            }
            sink.push(ev);
            emitted += 1;
        }

        if emitted == 0 {
            0
        } else {
            emitted as i32
        }
    }
}
