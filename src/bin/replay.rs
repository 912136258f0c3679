//! Minimal replay CLI: feeds a JSON-lines pulse-train fixture through a
//! [`pulsecode::Runtime`] and prints whatever events come out.
//!
//! Stands in for the teacher's `main.rs` entry point, without the TUI, the
//! HackRF front end, or the transmit path — all out of scope here (see
//! DESIGN.md). Fixture format, one burst per line:
//!
//! ```json
//! {"sample_rate": 1000000, "family": "am", "pulse": [250, 250], "gap": [250, 6000]}
//! ```
//!
//! `family` is optional and defaults to `"am"` (the only family the
//! built-in decoder library targets).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use pulsecode::pulse::{ModulationFamily, PulseData};
use pulsecode::Runtime;

#[derive(Debug, Deserialize)]
struct BurstFixture {
    sample_rate: u32,
    #[serde(default)]
    family: Option<String>,
    pulse: Vec<u32>,
    gap: Vec<u32>,
}

fn parse_family(name: &str) -> Result<ModulationFamily> {
    match name.to_ascii_lowercase().as_str() {
        "am" => Ok(ModulationFamily::Am),
        "fm" => Ok(ModulationFamily::Fm),
        other => bail!("unknown modulation family '{other}' (expected 'am' or 'fm')"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "pulsecode=info".into()))
        .init();

    let path = std::env::args().nth(1).map(PathBuf::from).context(
        "usage: pulsecode-replay <fixture.jsonl>",
    )?;
    let file = File::open(&path).with_context(|| format!("opening fixture {}", path.display()))?;

    let mut runtime = Runtime::with_builtins();
    let mut bursts = 0u64;
    let mut total_events = 0u64;

    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading line {} of {}", lineno + 1, path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let fixture: BurstFixture = serde_json::from_str(&line)
            .with_context(|| format!("parsing fixture line {}", lineno + 1))?;
        let family = parse_family(fixture.family.as_deref().unwrap_or("am"))?;
        let pulses = PulseData::from_pulses(fixture.sample_rate, fixture.pulse, fixture.gap);

        bursts += 1;
        let events = runtime.run_burst(family, &pulses);
        for event in &events {
            let json = serde_json::to_string(event).context("serializing decoded event")?;
            println!("{json}");
        }
        total_events += events.len() as u64;
    }

    tracing::info!(bursts, total_events, "replay complete");
    Ok(())
}
