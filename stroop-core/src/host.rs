use crate::trial::TrialRecord;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink write failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write-only key/value store owned by the host (the survey's embedded data).
pub trait DataSink {
    fn set(&mut self, key: &str, value: &str) -> Result<(), SinkError>;
}

/// Presentation controls the host exposes to the task.
pub trait HostControls {
    fn exit_fullscreen(&mut self);
    fn reveal_continue(&mut self);
    fn shrink_surface(&mut self);
}

/// Side effects requested by one state machine step.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Trial { key: String, record: TrialRecord },
    Legibility { key: String, value: String },
    ExitFullscreen,
    RevealContinue,
    ShrinkSurface,
}

/// Sink that keeps everything in memory, in write order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub writes: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.writes
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Latest value per key.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.writes.iter().cloned().collect()
    }

    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.writes
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(move |k| k.starts_with(prefix))
    }
}

impl DataSink for MemorySink {
    fn set(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        self.writes.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

/// Host with nothing to toggle; headless runs and tests.
#[derive(Debug, Default, Clone)]
pub struct NoopHost {
    pub fullscreen_exits: usize,
    pub continue_revealed: bool,
    pub shrunk: bool,
}

impl HostControls for NoopHost {
    fn exit_fullscreen(&mut self) {
        self.fullscreen_exits += 1;
    }

    fn reveal_continue(&mut self) {
        self.continue_revealed = true;
    }

    fn shrink_surface(&mut self) {
        self.shrunk = true;
    }
}
