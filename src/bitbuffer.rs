//! The bit buffer: the shared representation every slicer fills and every
//! device decoder reads (spec.md §3/§4.1, component B).
//!
//! Storage is `bitvec`'s `BitVec<u8, Msb0>` per row — the teacher already
//! depends on `bitvec` (`protocols::common`/keyfob bit accumulators use plain
//! `u64` shifts, but the wider pack's bit-level parsers lean on `bitvec` for
//! anything wider than 64 bits), and `Msb0` ordering matches the "MSB-first
//! within a byte" contract directly instead of hand-rolling bit indexing.

use bitvec::prelude::*;

/// Maximum rows per buffer. Configuration-visible per design note 9; the
/// default mirrors the spec's "typically 50".
pub const BITBUF_ROWS: usize = 50;

/// Maximum bytes per row (2400 bits). Configuration-visible per design note 9.
pub const BITBUF_COLS: usize = 300;

type Row = BitVec<u8, Msb0>;

#[derive(Debug, Clone, Default)]
struct BitRow {
    bits: Row,
    syncs_before: u32,
}

/// A growable 2-D bit container with row/column semantics.
///
/// Invariants (spec §3): unused trailing bits in the last byte of each row
/// are zero (guaranteed here because `bitvec` never stores partial bytes —
/// [`BitBuffer::extract_bytes`] zero-pads explicitly instead); `num_rows() >= 1`
/// once the first bit or sync has been added.
#[derive(Debug, Clone)]
pub struct BitBuffer {
    rows: Vec<BitRow>,
    max_rows: usize,
    max_bits_per_row: usize,
    /// Bits silently dropped because a row hit `max_bits_per_row`, or a new
    /// row was requested past `max_rows`. Design note 9's optional
    /// diagnostic counter for the "silent truncation" contract.
    pub truncated_count: u64,
}

impl Default for BitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl BitBuffer {
    /// A buffer with the default capacities (`BITBUF_ROWS` × `BITBUF_COLS`).
    pub fn new() -> Self {
        Self::with_capacity(BITBUF_ROWS, BITBUF_COLS)
    }

    /// A buffer with caller-chosen capacities (config-visible per design note 9).
    pub fn with_capacity(max_rows: usize, max_cols_bytes: usize) -> Self {
        Self {
            rows: Vec::new(),
            max_rows,
            max_bits_per_row: max_cols_bytes * 8,
            truncated_count: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of valid bits in `row`, or 0 if the row doesn't exist.
    pub fn bits_per_row(&self, row: usize) -> usize {
        self.rows.get(row).map(|r| r.bits.len()).unwrap_or(0)
    }

    pub fn syncs_before_row(&self, row: usize) -> u32 {
        self.rows.get(row).map(|r| r.syncs_before).unwrap_or(0)
    }

    fn ensure_row(&mut self) -> &mut BitRow {
        if self.rows.is_empty() {
            self.rows.push(BitRow::default());
        }
        self.rows.last_mut().unwrap()
    }

    fn current_row_full(&self) -> bool {
        match self.rows.last() {
            Some(r) => r.bits.len() >= self.max_bits_per_row,
            None => false,
        }
    }

    /// Append one bit to the current (last) row. Starts row 0 if no rows
    /// exist yet. Fails silently past per-row capacity — noise tolerance,
    /// per §4.1.
    pub fn add_bit(&mut self, bit: bool) {
        if self.current_row_full() {
            self.truncated_count += 1;
            return;
        }
        self.ensure_row().bits.push(bit);
    }

    fn start_new_row(&mut self) {
        if let Some(last) = self.rows.last() {
            if last.bits.is_empty() {
                return;
            }
        }
        if self.rows.len() >= self.max_rows {
            self.truncated_count += 1;
            return;
        }
        self.rows.push(BitRow::default());
    }

    /// Begin a new empty row. No-op if the current row is already empty.
    pub fn add_row(&mut self) {
        self.start_new_row();
    }

    /// Increment `syncs_before_row` for the next row and start a new row.
    pub fn add_sync(&mut self) {
        // The sync landmark belongs to whichever row is about to start.
        self.start_new_row();
        if let Some(last) = self.rows.last_mut() {
            last.syncs_before += 1;
        }
    }

    /// Clear the current (last) row's bits without dropping the row itself —
    /// used by slicers (e.g. PCM's out-of-tolerance pulse) to discard a
    /// partially accumulated row and keep filling it.
    pub fn clear_current_row(&mut self) {
        if let Some(last) = self.rows.last_mut() {
            last.bits.clear();
        }
    }

    /// Copy `nbits` bits starting at `bitpos` in `row` into `out`, MSB-first,
    /// left-aligned; the remaining bits of the last output byte are zero.
    pub fn extract_bytes(&self, row: usize, bitpos: usize, nbits: usize, out: &mut [u8]) {
        out.iter_mut().for_each(|b| *b = 0);
        let Some(r) = self.rows.get(row) else { return };
        let avail = r.bits.len().saturating_sub(bitpos);
        let n = nbits.min(avail);
        for i in 0..n {
            if r.bits[bitpos + i] {
                out[i / 8] |= 0x80 >> (i % 8);
            }
        }
    }

    /// Convenience: extract into a freshly allocated `Vec<u8>`.
    pub fn extract_bytes_vec(&self, row: usize, bitpos: usize, nbits: usize) -> Vec<u8> {
        let mut out = vec![0u8; nbits.div_ceil(8)];
        self.extract_bytes(row, bitpos, nbits, &mut out);
        out
    }

    /// Bit-aligned search for `pattern_bits` (MSB-first, `pattern_bitlen` bits
    /// long) starting at `start_bitpos` in `row`. Returns the bit position at
    /// which the pattern matches, or `bits_per_row(row)` if not found. An
    /// empty pattern matches immediately at `start_bitpos`.
    pub fn search(
        &self,
        row: usize,
        start_bitpos: usize,
        pattern_bits: &[u8],
        pattern_bitlen: usize,
    ) -> usize {
        let len = self.bits_per_row(row);
        if pattern_bitlen == 0 {
            return start_bitpos.min(len);
        }
        let Some(r) = self.rows.get(row) else { return len };
        if start_bitpos + pattern_bitlen > len {
            return len;
        }
        'pos: for pos in start_bitpos..=(len - pattern_bitlen) {
            for i in 0..pattern_bitlen {
                let want = (pattern_bits[i / 8] & (0x80 >> (i % 8))) != 0;
                if r.bits[pos + i] != want {
                    continue 'pos;
                }
            }
            return pos;
        }
        len
    }

    /// First row that is bit-identical (over its first `min_bits` bits) to at
    /// least `min_repeats - 1` other rows, or `None`.
    pub fn find_repeated_row(&self, min_repeats: usize, min_bits: usize) -> Option<usize> {
        for (i, ri) in self.rows.iter().enumerate() {
            if ri.bits.len() < min_bits {
                continue;
            }
            let mut count = 1;
            for (j, rj) in self.rows.iter().enumerate() {
                if i == j || rj.bits.len() < min_bits {
                    continue;
                }
                if ri.bits[..min_bits] == rj.bits[..min_bits] {
                    count += 1;
                }
            }
            if count >= min_repeats {
                return Some(i);
            }
        }
        None
    }

    /// Complement every bit of every row, up to `bits_per_row`.
    pub fn invert(&mut self) {
        for r in &mut self.rows {
            for mut b in r.bits.iter_mut() {
                *b = !*b;
            }
        }
    }

    /// Decode Manchester bit-pairs starting at `startpos` in `row` into
    /// `out`, up to `max_bits` output bits. Convention: rising edge (0→1) is
    /// a data `0`, falling edge (1→0) is a data `1` — matching
    /// `manchester_decode`'s documented convention in spec §4.1. Returns the
    /// bit position at which a non-Manchester transition was seen (i.e. two
    /// consecutive half-bits of the same polarity), or the end of input if
    /// `max_bits` was reached cleanly first.
    pub fn manchester_decode(
        &self,
        row: usize,
        startpos: usize,
        out: &mut BitBuffer,
        max_bits: usize,
    ) -> usize {
        let len = self.bits_per_row(row);
        let Some(r) = self.rows.get(row) else { return startpos };
        let mut pos = startpos;
        let mut bits_out = 0;
        while pos + 1 < len && bits_out < max_bits {
            let a = r.bits[pos];
            let b = r.bits[pos + 1];
            if a == b {
                // Not a valid Manchester half-bit pair.
                return pos;
            }
            // rising (0,1) -> 0 ; falling (1,0) -> 1
            out.add_bit(b);
            bits_out += 1;
            pos += 2;
        }
        pos
    }

    /// Initialise a fresh single-row buffer from a `{nbits}hex-or-binary`
    /// literal, with optional `/`-separated additional rows. `{24}0xA9878C`
    /// or `{8}10110010` or `{8}0xAB/{8}0xCD`.
    pub fn parse(spec: &str) -> Option<BitBuffer> {
        let mut buf = BitBuffer::new();
        for (i, part) in spec.split('/').enumerate() {
            if i > 0 {
                buf.add_row();
            }
            let (nbits, bits) = parse_bitspec(part)?;
            for i in 0..nbits {
                buf.add_bit(bits[i / 8] & (0x80 >> (i % 8)) != 0);
            }
        }
        Some(buf)
    }
}

/// Parse a `{<decimal>}<hex-or-binary>` bit literal (spec §6 grammar) into
/// `(bit_count, bytes)`, MSB-first, left-aligned, zero-padded on the right.
pub fn parse_bitspec(spec: &str) -> Option<(usize, Vec<u8>)> {
    let spec = spec.trim();
    let close = spec.find('}')?;
    if !spec.starts_with('{') {
        return None;
    }
    let nbits: usize = spec[1..close].parse().ok()?;
    let rest = &spec[close + 1..];
    let rest = rest.strip_prefix("0x").unwrap_or(rest);
    let is_hex = rest.chars().all(|c| c.is_ascii_hexdigit()) && rest.chars().any(|c| !matches!(c, '0' | '1'));
    let bytes = if is_hex || spec[close + 1..].starts_with("0x") {
        let mut out = Vec::with_capacity(rest.len().div_ceil(2));
        let mut chars = rest.chars().peekable();
        while chars.peek().is_some() {
            let hi = chars.next()?.to_digit(16)?;
            let lo = chars.next().and_then(|c| c.to_digit(16)).unwrap_or(0);
            out.push(((hi << 4) | lo) as u8);
        }
        out
    } else {
        // Binary digit run.
        let mut out = vec![0u8; rest.len().div_ceil(8)];
        for (i, c) in rest.chars().enumerate() {
            if c == '1' {
                out[i / 8] |= 0x80 >> (i % 8);
            }
        }
        out
    };
    let need = nbits.div_ceil(8);
    let mut bytes = bytes;
    bytes.resize(need.max(1), 0);
    Some((nbits, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_bit_starts_row_zero() {
        let mut b = BitBuffer::new();
        b.add_bit(true);
        assert_eq!(b.num_rows(), 1);
        assert_eq!(b.bits_per_row(0), 1);
    }

    #[test]
    fn add_row_noop_when_empty() {
        let mut b = BitBuffer::new();
        b.add_row();
        b.add_row();
        assert_eq!(b.num_rows(), 0);
        b.add_bit(true);
        b.add_row();
        b.add_row();
        assert_eq!(b.num_rows(), 1);
    }

    #[test]
    fn search_empty_pattern_returns_start() {
        let b = BitBuffer::parse("{8}0xAB").unwrap();
        assert_eq!(b.search(0, 3, &[], 0), 3);
    }

    #[test]
    fn search_finds_and_does_not_overlap() {
        // 0xAB = 10101011, pattern "1011" (4 bits) occurs at bit 4.
        let b = BitBuffer::parse("{8}0xAB").unwrap();
        let pat = [0b1011_0000u8];
        let at = b.search(0, 0, &pat, 4);
        assert_eq!(at, 4);
        let after = b.search(0, at + 1, &pat, 4);
        assert!(after >= at + 4);
    }

    #[test]
    fn truncation_past_row_capacity_is_silent() {
        let mut b = BitBuffer::with_capacity(2, 1); // 8 bits/row
        for _ in 0..10 {
            b.add_bit(true);
        }
        assert_eq!(b.bits_per_row(0), 8);
        assert!(b.truncated_count > 0);
    }

    #[test]
    fn invert_complements_all_rows() {
        let mut b = BitBuffer::parse("{8}0x00").unwrap();
        b.invert();
        assert_eq!(b.extract_bytes_vec(0, 0, 8), vec![0xFF]);
    }

    #[test]
    fn find_repeated_row_locates_match() {
        let mut b = BitBuffer::parse("{8}0xAB").unwrap();
        b.add_row();
        for i in 0..8 {
            b.add_bit((0xCDu8 & (0x80 >> i)) != 0);
        }
        b.add_row();
        for i in 0..8 {
            b.add_bit((0xABu8 & (0x80 >> i)) != 0);
        }
        assert_eq!(b.find_repeated_row(2, 8), Some(0));
    }

    proptest! {
        #[test]
        fn roundtrip_extract(bits in proptest::collection::vec(any::<bool>(), 0..2400)) {
            let mut b = BitBuffer::new();
            for &bit in &bits {
                b.add_bit(bit);
            }
            let out = b.extract_bytes_vec(0, 0, bits.len());
            for (i, &bit) in bits.iter().enumerate() {
                let got = out.get(i / 8).map(|byte| byte & (0x80 >> (i % 8)) != 0).unwrap_or(false);
                prop_assert_eq!(got, bit);
            }
        }

        #[test]
        fn search_locates_and_only_locates(
            prefix in proptest::collection::vec(any::<bool>(), 0..40),
            pattern in proptest::collection::vec(any::<bool>(), 8..16),
            suffix in proptest::collection::vec(any::<bool>(), 0..40),
        ) {
            let mut b = BitBuffer::new();
            for &bit in prefix.iter().chain(pattern.iter()).chain(suffix.iter()) {
                b.add_bit(bit);
            }
            let mut pat_bytes = vec![0u8; pattern.len().div_ceil(8)];
            for (i, &bit) in pattern.iter().enumerate() {
                if bit {
                    pat_bytes[i / 8] |= 0x80 >> (i % 8);
                }
            }
            let k = prefix.len();
            let found = b.search(0, 0, &pat_bytes, pattern.len());
            // The inserted copy is a valid match, so the first match is at or before k.
            prop_assert!(found <= k);
            // Whatever position is reported, it must really carry the pattern bits —
            // search never reports a false positive.
            let at_found = (0..pattern.len()).all(|i| {
                let got = b.extract_bytes_vec(0, found + i, 1);
                (got[0] & 0x80 != 0) == pattern[i]
            });
            prop_assert!(at_found);
        }
    }
}
