use crate::config::ConfigError;
use stroop_core::{SinkError, StroopPhase};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StroopError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("deck of {requested} trials exceeds the condition pool of {pool}")]
    DeckTooLong { requested: usize, pool: usize },
    #[error("internal invariant violated in phase {phase}: {detail}")]
    Invariant { phase: StroopPhase, detail: String },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl StroopError {
    pub fn invariant(phase: StroopPhase, detail: impl Into<String>) -> Self {
        Self::Invariant {
            phase,
            detail: detail.into(),
        }
    }
}
