//! Pulse slicers: turn a [`PulseData`] burst into one or more rows of a
//! [`BitBuffer`] (spec §4.2, component C).
//!
//! Each modulation gets its own submodule, the way the teacher gives each
//! protocol its own state machine file under `protocols/` rather than one
//! shared decode loop. The shared `within_tolerance` helper below
//! generalizes the teacher's `duration_diff!` macro (`protocols/mod.rs`)
//! from a fixed two-value comparison to the "is this duration close enough
//! to an expected value, given a tolerance" test every slicer needs.

pub mod dmc;
pub mod manchester;
pub mod nrzs;
pub mod osv1;
pub mod pcm;
pub mod piwm_dc;
pub mod piwm_raw;
pub mod ppm;
pub mod pwm;

use crate::bitbuffer::BitBuffer;
use crate::decoder::Timing;
use crate::pulse::{ModulationFamily, PulseData};

/// `true` if `actual` is within `tolerance` of `expected` — generalizes the
/// teacher's `duration_diff!` macro into a predicate.
pub fn within_tolerance(actual: u32, expected: u32, tolerance: u32) -> bool {
    let diff = if actual > expected { actual - expected } else { expected - actual };
    diff <= tolerance
}

/// Every slicer implements this so the runtime can drive any modulation
/// through one call site (spec §4.2's dispatch boundary into component D).
pub trait Slicer {
    fn slice(&self, pulses: &PulseData, timing: &Timing) -> BitBuffer;
}

/// The modulation a [`crate::decoder::DeviceDecoder`] declares itself as
/// needing (spec §4.2's nine slicer kinds). The dispatcher uses this,
/// together with the decoder's own [`Timing`], to slice `PulseData` once
/// per decoder before invoking its callback (spec §4.4 step 3) — each
/// decoder may pick a different modulation even within the same AM/FM
/// family, so slicing is per-decoder rather than shared across a whole
/// priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    PcmRz,
    PcmNrz,
    Ppm,
    Pwm,
    ManchesterZerobit,
    Dmc,
    PiwmRaw,
    PiwmDc,
    Nrzs,
    Osv1,
}

impl Modulation {
    /// Every modulation in this set is demodulated from an OOK/AM envelope
    /// in this crate's built-in library; FSK-sourced decoders would
    /// declare a family override if one were added (none are, since none
    /// of the built-ins target 2FSK protocols — see DESIGN.md).
    pub fn family(&self) -> ModulationFamily {
        ModulationFamily::Am
    }

    pub fn slicer(&self) -> Box<dyn Slicer> {
        use crate::slicer::dmc::DmcSlicer;
        use crate::slicer::manchester::ManchesterSlicer;
        use crate::slicer::nrzs::NrzsSlicer;
        use crate::slicer::osv1::Osv1Slicer;
        use crate::slicer::pcm::{PcmMode, PcmSlicer};
        use crate::slicer::piwm_dc::PiwmDcSlicer;
        use crate::slicer::piwm_raw::PiwmRawSlicer;
        use crate::slicer::ppm::PpmSlicer;
        use crate::slicer::pwm::PwmSlicer;

        match self {
            Modulation::PcmRz => Box::new(PcmSlicer::new(PcmMode::Rz)),
            Modulation::PcmNrz => Box::new(PcmSlicer::new(PcmMode::Nrz)),
            Modulation::Ppm => Box::new(PpmSlicer),
            Modulation::Pwm => Box::new(PwmSlicer),
            Modulation::ManchesterZerobit => Box::new(ManchesterSlicer),
            Modulation::Dmc => Box::new(DmcSlicer),
            Modulation::PiwmRaw => Box::new(PiwmRawSlicer),
            Modulation::PiwmDc => Box::new(PiwmDcSlicer),
            Modulation::Nrzs => Box::new(NrzsSlicer),
            Modulation::Osv1 => Box::new(Osv1Slicer),
        }
    }
}
