//! The dispatcher: runs every decoder in a [`crate::decoder::Registry`]
//! against one captured burst, in priority order, with short-circuiting
//! (spec §4.3/§4.4/§7, component E).
//!
//! Grounded on `protocols::ProtocolRegistry::process_signal`, which loops
//! decoders linearly and stops at the first one to report a match; this
//! generalizes that to run every decoder sharing the lowest still-active
//! priority level before deciding whether to continue to the next level,
//! per spec §4.3's "all decoders at a priority level run; if any emits, the
//! dispatcher does not proceed to less-specific levels" rule. Slicing is
//! per-decoder rather than once per burst, since two decoders sharing a
//! priority and family may still declare different [`crate::slicer::Modulation`]
//! kinds (spec §4.2's nine-slicer set) — each gets its own scaled [`Timing`]
//! and its own [`BitBuffer`].

use tracing::{debug, trace, warn};

use crate::bitbuffer::BitBuffer;
use crate::decoder::{DecodeOutcome, Registry, Timing};
use crate::error::ContractViolation;
use crate::event::Event;
use crate::pulse::{ModulationFamily, PulseData};
use crate::slicer::Slicer as _;

/// Runs a [`Registry`] against captured bursts and collects events.
pub struct Dispatcher;

impl Dispatcher {
    /// `true` if any of `timing`'s required widths (short/long/reset) round
    /// to zero samples at `pulses`'s sample rate — the slicer would have
    /// nothing to work with. Gap and sync widths are optional in several
    /// slicers, so only the three always-required widths gate this.
    fn timing_rounds_to_zero(timing: &Timing, pulses: &PulseData) -> bool {
        pulses.us_to_samples(timing.short_us) == 0
            || pulses.us_to_samples(timing.long_us) == 0
            || pulses.us_to_samples(timing.reset_us) == 0
    }

    /// Run every enabled decoder for `family` against `pulses`, honoring
    /// priority order and the short-circuit rule. Each decoder slices
    /// `pulses` itself (per its own declared [`crate::slicer::Modulation`]
    /// and [`Timing`]) before its callback runs. Returns all events emitted
    /// across every decoder that ran.
    ///
    /// # Panics
    /// Panics if any decoder returns a value outside the documented
    /// contract (spec §7: this is a decoder programming error, not a
    /// recoverable runtime condition).
    pub fn run_burst(registry: &mut Registry, family: ModulationFamily, pulses: &PulseData) -> Vec<Event> {
        let mut events = Vec::new();
        for priority in registry.priority_levels(family) {
            let indices = registry.indices_at(family, priority);
            let mut matched_at_level = false;
            for idx in indices {
                let name = registry.decoders()[idx].name().to_string();
                let timing = registry.decoders()[idx].timing();

                if Self::timing_rounds_to_zero(&timing, pulses) {
                    if registry.zero_timing_warned.insert((idx, pulses.sample_rate())) {
                        warn!(
                            decoder = %name,
                            sample_rate = pulses.sample_rate(),
                            "decoder timings round to zero samples at this rate; skipping for this burst"
                        );
                    }
                    continue;
                }

                let rows = registry.decoders()[idx].modulation().slicer().slice(pulses, &timing);
                let raw = registry.decoders()[idx].decode(&rows, &mut events);
                let outcome = match DecodeOutcome::from_raw(raw) {
                    Ok(o) => o,
                    Err(value) => {
                        panic!("{}", ContractViolation { decoder: name, value });
                    }
                };
                registry.record(idx, outcome);
                match outcome {
                    DecodeOutcome::Events(n) => {
                        debug!(decoder = %name, count = n, "decoder matched");
                        matched_at_level = true;
                    }
                    DecodeOutcome::NoMatch => trace!(decoder = %name, "decoder found no match"),
                    DecodeOutcome::Failure(f) => {
                        trace!(decoder = %name, failure = ?f, "decoder rejected frame")
                    }
                }
            }
            if matched_at_level {
                debug!(priority, "short-circuiting lower-priority decoders after match");
                break;
            }
        }
        events
    }

    /// Run a single decoder's callback directly against an already-sliced
    /// [`BitBuffer`], bypassing slicing entirely. Useful for tests and for
    /// replaying literal bit fixtures (spec §8's end-to-end scenario table)
    /// where the input is given as bits, not pulse timings.
    pub fn run_on_rows(decoder: &dyn crate::decoder::DeviceDecoder, rows: &BitBuffer) -> (i32, Vec<Event>) {
        let mut events = Vec::new();
        let raw = decoder.decode(rows, &mut events);
        (raw, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DeviceDecoder;
    use crate::slicer::Modulation;

    struct Counter {
        name: &'static str,
        priority: i32,
        emits: bool,
        calls: std::sync::atomic::AtomicU32,
    }

    fn test_timing() -> Timing {
        Timing {
            short_us: 250,
            long_us: 500,
            reset_us: 5000,
            gap_us: 600,
            tolerance_us: 50,
            sync_us: 0,
        }
    }

    impl DeviceDecoder for Counter {
        fn name(&self) -> &str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn modulation(&self) -> Modulation {
            Modulation::PcmNrz
        }
        fn timing(&self) -> Timing {
            test_timing()
        }
        fn modulation_family(&self) -> ModulationFamily {
            ModulationFamily::Am
        }
        fn decode(&self, _rows: &BitBuffer, sink: &mut Vec<Event>) -> i32 {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.emits {
                sink.push(Event::for_model(self.name));
                1
            } else {
                0
            }
        }
    }

    fn sample_burst() -> PulseData {
        PulseData::from_pulses(1_000_000, vec![250, 250, 250, 250], vec![250, 250, 250, 6000])
    }

    #[test]
    fn short_circuits_lower_priority_on_match() {
        let mut reg = Registry::new();
        reg.register(Box::new(Counter {
            name: "high-priority",
            priority: 0,
            emits: true,
            calls: Default::default(),
        }));
        reg.register(Box::new(Counter {
            name: "low-priority",
            priority: 10,
            emits: true,
            calls: Default::default(),
        }));
        let pd = sample_burst();
        let events = Dispatcher::run_burst(&mut reg, ModulationFamily::Am, &pd);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get("model"), Some(&"high-priority".into()));
        assert_eq!(reg.stats()[1].events, 0);
        assert_eq!(reg.stats()[1].no_match, 0);
    }

    #[test]
    fn runs_next_level_when_no_match() {
        let mut reg = Registry::new();
        reg.register(Box::new(Counter {
            name: "high-priority",
            priority: 0,
            emits: false,
            calls: Default::default(),
        }));
        reg.register(Box::new(Counter {
            name: "low-priority",
            priority: 10,
            emits: true,
            calls: Default::default(),
        }));
        let pd = sample_burst();
        let events = Dispatcher::run_burst(&mut reg, ModulationFamily::Am, &pd);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get("model"), Some(&"low-priority".into()));
    }

    #[test]
    fn zero_timing_skips_decoder_and_warns_once() {
        struct ZeroTiming;
        impl DeviceDecoder for ZeroTiming {
            fn name(&self) -> &str {
                "zero-timing"
            }
            fn modulation(&self) -> Modulation {
                Modulation::PcmNrz
            }
            fn timing(&self) -> Timing {
                Timing::default() // all-zero widths round to zero samples
            }
            fn modulation_family(&self) -> ModulationFamily {
                ModulationFamily::Am
            }
            fn decode(&self, _rows: &BitBuffer, sink: &mut Vec<Event>) -> i32 {
                sink.push(Event::for_model("zero-timing"));
                1
            }
        }
        let mut reg = Registry::new();
        reg.register(Box::new(ZeroTiming));
        let pd = sample_burst();
        let events = Dispatcher::run_burst(&mut reg, ModulationFamily::Am, &pd);
        assert!(events.is_empty());
        assert_eq!(reg.stats()[0].events, 0);
        assert_eq!(reg.zero_timing_warned.len(), 1);
    }

    #[test]
    #[should_panic]
    fn out_of_contract_return_is_fatal() {
        struct Rogue;
        impl DeviceDecoder for Rogue {
            fn name(&self) -> &str {
                "rogue"
            }
            fn modulation(&self) -> Modulation {
                Modulation::PcmNrz
            }
            fn timing(&self) -> Timing {
                test_timing()
            }
            fn modulation_family(&self) -> ModulationFamily {
                ModulationFamily::Am
            }
            fn decode(&self, _rows: &BitBuffer, _sink: &mut Vec<Event>) -> i32 {
                -9
            }
        }
        let mut reg = Registry::new();
        reg.register(Box::new(Rogue));
        let pd = sample_burst();
        Dispatcher::run_burst(&mut reg, ModulationFamily::Am, &pd);
    }
}
