//! The `DeviceDecoder` contract and the registry that holds built-in and
//! flex decoders (spec §4.3, component D).
//!
//! Grounded on the teacher's `protocols::ProtocolDecoder` trait and
//! `ProtocolRegistry` (`src/protocols/mod.rs`): a small trait object per
//! protocol, held in a registry `Vec`, with priority-ordered iteration.
//! The teacher's registry loops decoders one burst at a time looking for
//! the first match; this generalizes it to the spec's run-every-decoder-
//! at-a-priority-level-then-short-circuit semantics, which the teacher's
//! linear "first match wins" dispatch is a degenerate case of (as if every
//! decoder had a distinct priority).

use crate::bitbuffer::BitBuffer;
use crate::event::Event;
use crate::pulse::ModulationFamily;
use crate::slicer::Modulation;

/// Negative return codes a [`DeviceDecoder::decode`] may report, matching
/// spec §4.3/§7's categorized-failure contract. The numeric values are
/// part of the contract (callers may log them) and are deliberately
/// distinct from any valid event count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailure {
    /// Row was shorter than this decoder's minimum frame length.
    AbortLength,
    /// Decoder gave up before reaching the end of the row (e.g. preamble
    /// search failed).
    AbortEarly,
    /// Frame length matched but the integrity check (CRC/checksum) failed.
    FailMic,
    /// Frame decoded but failed a field-level sanity check (e.g. an
    /// impossible enum value).
    FailSanity,
    /// Any other documented rejection reason.
    FailOther,
}

impl DecodeFailure {
    /// The contractual negative code for this failure kind.
    pub fn code(self) -> i32 {
        match self {
            DecodeFailure::AbortLength => -1,
            DecodeFailure::AbortEarly => -2,
            DecodeFailure::FailMic => -3,
            DecodeFailure::FailSanity => -4,
            DecodeFailure::FailOther => -5,
        }
    }
}

/// The outcome of one `DeviceDecoder::decode` call, typed rather than a
/// bare `i32`, so the dispatcher can match instead of re-deriving meaning
/// from a magic number. [`DecodeOutcome::into_raw`]/[`DecodeOutcome::from_raw`]
/// cross to and from the contractual `i32` at the trait boundary, since the
/// contract itself (spec §4.3) is defined in terms of the raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Emitted `n` events, `n >= 1`.
    Events(u32),
    /// Ran to completion but found nothing worth emitting.
    NoMatch,
    Failure(DecodeFailure),
}

impl DecodeOutcome {
    pub fn into_raw(self) -> i32 {
        match self {
            DecodeOutcome::Events(n) => n as i32,
            DecodeOutcome::NoMatch => 0,
            DecodeOutcome::Failure(f) => f.code(),
        }
    }

    /// Parse a raw decoder return value against the contract. `Err` carries
    /// the offending value for the dispatcher's [`crate::error::ContractViolation`].
    pub fn from_raw(value: i32) -> Result<DecodeOutcome, i32> {
        match value {
            n if n > 0 => Ok(DecodeOutcome::Events(n as u32)),
            0 => Ok(DecodeOutcome::NoMatch),
            -1 => Ok(DecodeOutcome::Failure(DecodeFailure::AbortLength)),
            -2 => Ok(DecodeOutcome::Failure(DecodeFailure::AbortEarly)),
            -3 => Ok(DecodeOutcome::Failure(DecodeFailure::FailMic)),
            -4 => Ok(DecodeOutcome::Failure(DecodeFailure::FailSanity)),
            -5 => Ok(DecodeOutcome::Failure(DecodeFailure::FailOther)),
            other => Err(other),
        }
    }
}

/// Per-decoder timing envelope, generalizing the teacher's
/// `ProtocolDecoder::timing()` (a single fixed `Duration` tolerance table)
/// to the spec's sample-rate-relative short/long/reset/gap/tolerance/sync
/// widths (component slicer inputs, spec §4.2).
#[derive(Debug, Clone, Copy, Default)]
pub struct Timing {
    pub short_us: u32,
    pub long_us: u32,
    pub reset_us: u32,
    pub gap_us: u32,
    pub tolerance_us: u32,
    pub sync_us: u32,
}

/// A registered device decoder: one protocol's pattern matcher.
///
/// Contract (spec §4.3/§7): `decode` returns a positive event count when it
/// emitted one or more events into `sink`, `0` when it ran to completion
/// without a match, or a negative [`DecodeFailure`] code. Any other
/// returned value is a programming error in the decoder and the dispatcher
/// treats it as fatal (see [`crate::dispatch::Dispatcher`]).
pub trait DeviceDecoder: Send + Sync {
    /// Stable decoder name, used in statistics and logging.
    fn name(&self) -> &str;

    /// Dispatch priority: lower runs first. Decoders sharing a priority at
    /// the same modulation family all run before the dispatcher considers
    /// short-circuiting to the next level (spec §4.3).
    fn priority(&self) -> i32 {
        0
    }

    /// Which modulation this decoder expects its input pulses sliced
    /// with. Determines both the slicer the dispatcher runs and (via
    /// [`Modulation::family`]) the AM/FM group this decoder is offered
    /// bursts from.
    fn modulation(&self) -> Modulation;

    /// This decoder's nominal timing envelope, scaled to the burst's
    /// sample rate by the dispatcher before slicing (spec §3's
    /// per-sample-rate scaled timings).
    fn timing(&self) -> Timing;

    fn modulation_family(&self) -> ModulationFamily {
        self.modulation().family()
    }

    /// Attempt to decode `rows`, pushing any events found into `sink`.
    /// Returns a raw contractual value; use [`DecodeOutcome::from_raw`] to
    /// interpret it.
    fn decode(&self, rows: &BitBuffer, sink: &mut Vec<Event>) -> i32;
}

/// Running per-decoder statistics (component of the ambient stack, spec
/// §11 "human-readable decoder statistics"). Grounded on the teacher's
/// `Capture::decoded_count`-style bookkeeping in `capture.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderStats {
    pub events: u64,
    pub no_match: u64,
    pub failures: u64,
}

/// Holds every decoder known to a runtime, in registration order, and the
/// per-decoder statistics accumulated as they run.
///
/// Grounded on `protocols::ProtocolRegistry`, generalized from its
/// single flat `Vec<Box<dyn ProtocolDecoder>>` to carry per-decoder
/// statistics and expose the priority groups the dispatcher needs.
pub struct Registry {
    decoders: Vec<Box<dyn DeviceDecoder>>,
    stats: Vec<DecoderStats>,
    /// Priority levels disabled wholesale (design note 9's "disabled
    /// decoder" knob, generalized to a level rather than one decoder at a
    /// time since that's how spec §4.3's protocol numbers are usually
    /// toggled in practice).
    disabled_levels: std::collections::HashSet<i32>,
    /// `(decoder index, sample rate)` pairs the dispatcher has already
    /// warned about for rounding a required timing to zero samples (spec
    /// §7's "warns once per (decoder, sample-rate) pair").
    pub(crate) zero_timing_warned: std::collections::HashSet<(usize, u32)>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
            zero_timing_warned: std::collections::HashSet::new(),
            stats: Vec::new(),
            disabled_levels: std::collections::HashSet::new(),
        }
    }

    pub fn register(&mut self, decoder: Box<dyn DeviceDecoder>) {
        self.decoders.push(decoder);
        self.stats.push(DecoderStats::default());
    }

    pub fn disable_priority(&mut self, priority: i32) {
        self.disabled_levels.insert(priority);
    }

    pub fn enable_priority(&mut self, priority: i32) {
        self.disabled_levels.remove(&priority);
    }

    pub fn is_priority_enabled(&self, priority: i32) -> bool {
        !self.disabled_levels.contains(&priority)
    }

    pub fn decoders(&self) -> &[Box<dyn DeviceDecoder>] {
        &self.decoders
    }

    pub fn stats(&self) -> &[DecoderStats] {
        &self.stats
    }

    pub fn stats_for(&self, name: &str) -> Option<&DecoderStats> {
        self.decoders
            .iter()
            .position(|d| d.name() == name)
            .map(|i| &self.stats[i])
    }

    pub(crate) fn record(&mut self, index: usize, outcome: DecodeOutcome) {
        let s = &mut self.stats[index];
        match outcome {
            DecodeOutcome::Events(n) => s.events += n as u64,
            DecodeOutcome::NoMatch => s.no_match += 1,
            DecodeOutcome::Failure(_) => s.failures += 1,
        }
    }

    /// Sorted list of distinct priorities present among enabled decoders for
    /// a given modulation family, ascending — the groups the dispatcher
    /// walks in order.
    pub(crate) fn priority_levels(&self, family: ModulationFamily) -> Vec<i32> {
        let mut levels: Vec<i32> = self
            .decoders
            .iter()
            .filter(|d| d.modulation_family() == family)
            .map(|d| d.priority())
            .filter(|p| self.is_priority_enabled(*p))
            .collect();
        levels.sort_unstable();
        levels.dedup();
        levels
    }

    pub(crate) fn indices_at(&self, family: ModulationFamily, priority: i32) -> Vec<usize> {
        self.decoders
            .iter()
            .enumerate()
            .filter(|(_, d)| d.modulation_family() == family && d.priority() == priority)
            .map(|(i, _)| i)
            .collect()
    }
}
