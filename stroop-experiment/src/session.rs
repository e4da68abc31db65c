use stroop_core::{KeyBuffer, StroopPhase};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeCounters {
    pub attempts: usize,
    /// Correct answers in the current attempt.
    pub score: usize,
    /// Failed attempts so far; never reset.
    pub fails: usize,
}

/// Position within the deck being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Ready slide before the first trial.
    #[default]
    Ready,
    Trial(usize),
}

/// Mutable state of one running task, owned by its state machine.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub phase: StroopPhase,
    pub practice: PracticeCounters,
    pub keys: KeyBuffer,
    pub cursor: Cursor,
    /// Correct answers across all main-task blocks.
    pub task_correct: usize,
    pub block_index: usize,
    /// Order-index offset of the current block's first trial.
    pub trial_offset: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}
