use crate::stimulus::InkColor;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where a trial slide is in its display cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialState {
    #[default]
    Pending,
    Stimulus,
    Mask,
    Complete,
}

/// Recorded result per trial, in the shape the data sink stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Rounded reaction time in ms, -1 when no response arrived.
    pub rt: i64,
    pub word: InkColor,
    pub color: InkColor,
    #[serde(rename = "userAnswer")]
    pub user_answer: String,
    pub correct: bool,
}

impl TrialRecord {
    pub const NO_RESPONSE_RT: i64 = -1;

    pub fn new(
        word: InkColor,
        color: InkColor,
        answer: Option<InkColor>,
        reaction_time: Option<Duration>,
        correct: bool,
    ) -> Self {
        let rt = reaction_time
            .map(|d| (d.as_secs_f64() * 1000.0).round() as i64)
            .unwrap_or(Self::NO_RESPONSE_RT);
        Self {
            rt,
            word,
            color,
            user_answer: answer.map_or_else(|| "None".to_string(), |c| c.name().to_string()),
            correct,
        }
    }

    pub fn responded(&self) -> bool {
        self.rt != Self::NO_RESPONSE_RT
    }

    pub fn is_congruent(&self) -> bool {
        self.word == self.color
    }

    /// Structured-string value handed to the data sink.
    pub fn to_value(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
