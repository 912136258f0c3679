//! `pulsecode`: a pulse-to-event decoder runtime for ISM-band sensor and
//! remote-control protocols.
//!
//! Grounded on the teacher's top-level module layout (`capture`,
//! `protocols`, `radio`, `storage` wired together from `main.rs`), carried
//! over here without the capture/radio front end, the TUI, or the transmit
//! path — this crate starts one stage later, at already-captured
//! [`pulse::PulseData`] bursts, and ends at typed [`event::Event`] records;
//! everything from raw samples to a burst, and from an event to a rendered
//! sink, is out of scope (see DESIGN.md).
//!
//! [`Runtime`] is the crate's single entry point: it owns a
//! [`decoder::Registry`] and runs it against a burst via
//! [`dispatch::Dispatcher`], replacing the teacher's process-wide
//! `ProtocolRegistry` global with an explicit value the caller owns (the
//! re-architect spec.md §"REDESIGN FLAGS" calls for).

pub mod bitbuffer;
pub mod config;
pub mod crc;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod flex;
pub mod protocols;
pub mod pulse;
pub mod slicer;

use crate::config::RuntimeConfig;
use crate::decoder::{DeviceDecoder, Registry};
use crate::dispatch::Dispatcher;
use crate::event::Event;
use crate::pulse::{ModulationFamily, PulseData};

/// Owns a decoder [`Registry`] and the configuration it was built from.
///
/// Construct with [`Runtime::new`] for an empty registry, or
/// [`Runtime::with_builtins`] to start from the full built-in decoder
/// library (component G). Flex decoders parsed from spec strings
/// ([`flex::FlexDecoder`]) register the same way any other
/// [`DeviceDecoder`] does, via [`Runtime::register`].
pub struct Runtime {
    registry: Registry,
    config: RuntimeConfig,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// An empty runtime with default configuration and no decoders
    /// registered.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// An empty runtime built from an explicit configuration, applying its
    /// `disabled_priorities` immediately so decoders registered afterwards
    /// are already subject to them.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let mut registry = Registry::new();
        for priority in config.disabled_priority_set() {
            registry.disable_priority(priority);
        }
        Self { registry, config }
    }

    /// A runtime preloaded with every built-in decoder
    /// ([`protocols::register_builtins`]).
    pub fn with_builtins() -> Self {
        let mut rt = Self::new();
        protocols::register_builtins(&mut rt.registry);
        rt
    }

    pub fn register(&mut self, decoder: Box<dyn DeviceDecoder>) {
        self.registry.register(decoder);
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run every enabled decoder for `family` against `pulses`, in priority
    /// order with short-circuiting, and collect the events emitted (spec
    /// §4.3/§4.4). This is the crate's single decode entry point; bursts
    /// for other families simply call this again with that family.
    pub fn run_burst(&mut self, family: ModulationFamily, pulses: &PulseData) -> Vec<Event> {
        Dispatcher::run_burst(&mut self.registry, family, pulses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_builtins_registers_the_library() {
        let rt = Runtime::with_builtins();
        assert_eq!(rt.registry().decoders().len(), 6);
    }

    #[test]
    fn with_config_disables_configured_priorities() {
        let mut config = RuntimeConfig::default();
        config.disabled_priorities = vec![100];
        let rt = Runtime::with_config(config);
        assert!(!rt.registry().is_priority_enabled(100));
        assert!(rt.registry().is_priority_enabled(0));
    }

    #[test]
    fn empty_runtime_emits_nothing() {
        let mut rt = Runtime::new();
        let pulses = PulseData::from_pulses(1_000_000, vec![250, 250], vec![250, 6000]);
        let events = rt.run_burst(ModulationFamily::Am, &pulses);
        assert!(events.is_empty());
    }
}
