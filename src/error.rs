//! Closed error taxonomy for the engine. Mirrors the teacher's manual
//! `Display` idiom (no `thiserror`/`anyhow` anywhere in the retrieval pack).

use std::fmt;

/// Every way a dive plan, tank, or model can fail to make physical sense.
///
/// `EmptyTank` is non-fatal: it is recorded for reporting but never stops a
/// dive from being processed, matching `original_source/dive.py`'s treatment
/// of `EmptyTank` as a warning condition rather than an abort.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineError {
    /// A dive was asked to run with no segments at all.
    NothingToProcess,
    /// The executor reached an inconsistent internal state while walking
    /// segments.
    ProcessingError(String),
    /// Time-to-surface exceeded the hard ceiling (default 300000s) without
    /// converging — almost always a misconfigured gas list or gradient
    /// factors.
    InfiniteDeco,
    /// A gas composition does not sum to 1.0, or carries a negative/over-1
    /// fraction.
    InvalidGas(String),
    /// A tank's volume, pressure, or rule string is physically nonsensical.
    InvalidTank(String),
    /// A configured MOD falls outside what the gas composition allows.
    InvalidMod(String),
    /// A tank was used below/above a MOD that wasn't authorized for it.
    UnauthorizedMod(String),
    /// A tank was drawn down to or past zero remaining gas. Non-fatal.
    EmptyTank(String),
    /// The tissue model rejected an operation (e.g. negative depth).
    ModelError(String),
    /// The model's internal state was used inconsistently (e.g. `ceiling()`
    /// called on a model that was never recorded into).
    ModelStateError(String),
    /// Construction-time validation failure (bad config, bad tank list).
    InstantiationError(String),
    /// A numeric input fell outside this engine's supported domain (e.g.
    /// altitude or temperature bounds).
    OutOfRange(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToProcess => write!(f, "nothing to process: no segments given"),
            Self::ProcessingError(msg) => write!(f, "processing error: {msg}"),
            Self::InfiniteDeco => write!(f, "infinite decompression: time to surface did not converge"),
            Self::InvalidGas(msg) => write!(f, "invalid gas: {msg}"),
            Self::InvalidTank(msg) => write!(f, "invalid tank: {msg}"),
            Self::InvalidMod(msg) => write!(f, "invalid MOD: {msg}"),
            Self::UnauthorizedMod(msg) => write!(f, "unauthorized MOD: {msg}"),
            Self::EmptyTank(msg) => write!(f, "empty tank: {msg}"),
            Self::ModelError(msg) => write!(f, "model error: {msg}"),
            Self::ModelStateError(msg) => write!(f, "model state error: {msg}"),
            Self::InstantiationError(msg) => write!(f, "instantiation error: {msg}"),
            Self::OutOfRange(msg) => write!(f, "out of range: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
