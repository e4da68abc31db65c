use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Distinct (word, color) pairs per repetition of the condition pool.
pub const PAIRS_PER_REPETITION: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("total_trials must be positive")]
    NoTrials,
    #[error("number_of_sub_blocks must be positive")]
    NoBlocks,
    #[error("total_trials ({total}) is not divisible by number_of_sub_blocks ({blocks})")]
    UnevenBlocks { total: usize, blocks: usize },
    #[error("{what} ({requested}) exceeds the condition pool of {pool} trials")]
    ExceedsPool {
        what: &'static str,
        requested: usize,
        pool: usize,
    },
    #[error("inter-trial interval range [{lo}, {hi}] is inverted")]
    InvertedInterval { lo: u64, hi: u64 },
    #[error("congruent_frequency {0} is outside [0, 1]")]
    Frequency(f64),
    #[error("practice_limit must be positive when the practice run is enabled")]
    NoPracticeAttempts,
    #[error("practice_ids has {have} entries but practice_limit allows {need} attempts")]
    PracticeIds { have: usize, need: usize },
    #[error("practice_pass ({pass}) exceeds practice_length ({length})")]
    UnreachablePass { pass: usize, length: usize },
}

/// Task options, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StroopConfig {
    pub total_trials: usize,
    pub number_of_sub_blocks: usize,
    pub block_break_time_ms: u64,
    pub stimulus_time_ms: u64,
    pub blank_time_ms: u64,
    pub iti_ms: (u64, u64),
    /// Declared for parity with published task settings; the pool layout
    /// fixes congruent pairs at one in four regardless of this value.
    pub congruent_frequency: f64,
    pub repetition_per_color: usize,
    pub practice_run: bool,
    pub practice_length: usize,
    pub practice_pass: usize,
    pub practice_limit: usize,
    pub practice_iti_ms: u64,
    pub practice_feedback_length_ms: u64,
    pub practice_deadline_ms: u64,
    pub run_id: String,
    pub practice_ids: Vec<String>,
}

impl Default for StroopConfig {
    fn default() -> Self {
        Self {
            total_trials: 128,
            number_of_sub_blocks: 2,
            block_break_time_ms: 10_000,
            stimulus_time_ms: 500,
            blank_time_ms: 2_000,
            iti_ms: (250, 700),
            congruent_frequency: 0.25,
            repetition_per_color: 16,
            practice_run: true,
            practice_length: 16,
            practice_pass: 10,
            practice_limit: 2,
            practice_iti_ms: 500,
            practice_feedback_length_ms: 3_000,
            practice_deadline_ms: 20_000,
            run_id: "A".to_string(),
            practice_ids: vec!["A".to_string(), "B".to_string()],
        }
    }
}

impl StroopConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn pool_size(&self) -> usize {
        self.repetition_per_color * PAIRS_PER_REPETITION
    }

    pub fn block_len(&self) -> usize {
        self.total_trials / self.number_of_sub_blocks.max(1)
    }

    /// Main-task response deadline: stimulus plus mask.
    pub fn response_deadline_ms(&self) -> u64 {
        self.stimulus_time_ms + self.blank_time_ms
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        if self.number_of_sub_blocks == 0 {
            return Err(ConfigError::NoBlocks);
        }
        if self.total_trials % self.number_of_sub_blocks != 0 {
            return Err(ConfigError::UnevenBlocks {
                total: self.total_trials,
                blocks: self.number_of_sub_blocks,
            });
        }
        let pool = self.pool_size();
        if self.total_trials > pool {
            return Err(ConfigError::ExceedsPool {
                what: "total_trials",
                requested: self.total_trials,
                pool,
            });
        }
        let (lo, hi) = self.iti_ms;
        if lo > hi {
            return Err(ConfigError::InvertedInterval { lo, hi });
        }
        if !(0.0..=1.0).contains(&self.congruent_frequency) {
            return Err(ConfigError::Frequency(self.congruent_frequency));
        }
        if self.practice_run {
            if self.practice_length > pool {
                return Err(ConfigError::ExceedsPool {
                    what: "practice_length",
                    requested: self.practice_length,
                    pool,
                });
            }
            if self.practice_limit == 0 {
                return Err(ConfigError::NoPracticeAttempts);
            }
            if self.practice_ids.len() < self.practice_limit {
                return Err(ConfigError::PracticeIds {
                    have: self.practice_ids.len(),
                    need: self.practice_limit,
                });
            }
            if self.practice_pass > self.practice_length {
                return Err(ConfigError::UnreachablePass {
                    pass: self.practice_pass,
                    length: self.practice_length,
                });
            }
        }
        Ok(())
    }
}
