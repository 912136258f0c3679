//! Error types (component of the ambient stack, SPEC_FULL.md §10.2).
//!
//! `thiserror` derives the library-facing error enums, the way the teacher
//! reserves `anyhow` for its binary-level plumbing and keeps structured
//! errors closer to the domain logic it's reporting on (e.g.
//! `storage::Config` returns domain errors up through `anyhow::Context`
//! rather than a bespoke enum). Here the library boundary gets typed errors
//! since downstream callers may want to match on the failure kind; the
//! demo binary still layers `anyhow::Context` on top.

use thiserror::Error;

/// Errors from parsing a flex decoder spec string (component H).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlexSpecError {
    #[error("flex spec has no name field")]
    MissingName,
    #[error("flex spec modulation '{0}' is not recognized")]
    UnknownModulation(String),
    #[error("flex spec field '{0}' could not be parsed as a duration")]
    BadDuration(String),
    #[error("flex spec key=value option '{0}' is malformed")]
    BadOption(String),
    #[error("flex spec bit literal '{0}' is malformed")]
    BadBitLiteral(String),
    #[error("flex spec requires at least short, long and reset widths")]
    TooFewFields,
}

/// Errors from loading a [`crate::config::RuntimeConfig`] from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// A device decoder returned a value outside its documented contract
/// (positive event count, zero, or one of the negative failure codes in
/// [`crate::decoder::DecodeFailure`]). Per spec §4.3/§7 this is a
/// programming error in the decoder, not a runtime condition a caller can
/// recover from, so the dispatcher panics with this message rather than
/// returning an error — see [`crate::dispatch::Dispatcher::run_burst`].
#[derive(Debug, Error)]
#[error("decoder '{decoder}' returned out-of-contract value {value}")]
pub struct ContractViolation {
    pub decoder: String,
    pub value: i32,
}
