use std::fmt;

/// Phases of a Stroop session.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum StroopPhase {
    #[default]
    LegibilityCheck,
    Instructions,
    Practice,
    PracticeEnd,
    TaskIntro,
    Task,
    BlockEnd,
    Completed,
    Exit,
    /// Cancel key observed.
    Aborted,
    /// Internal invariant violated; the machine stopped driving itself.
    Faulted,
}

impl StroopPhase {
    /// No further self-driving happens once a terminal phase is reached.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exit | Self::Aborted | Self::Faulted)
    }

    pub fn is_practice(&self) -> bool {
        matches!(self, Self::Practice | Self::PracticeEnd)
    }

    pub fn is_task(&self) -> bool {
        matches!(self, Self::Task | Self::BlockEnd)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LegibilityCheck => "legibility_check",
            Self::Instructions => "instructions",
            Self::Practice => "practice",
            Self::PracticeEnd => "practice_end",
            Self::TaskIntro => "task_intro",
            Self::Task => "task",
            Self::BlockEnd => "block_end",
            Self::Completed => "completed",
            Self::Exit => "exit",
            Self::Aborted => "aborted",
            Self::Faulted => "faulted",
        }
    }
}

impl fmt::Display for StroopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
