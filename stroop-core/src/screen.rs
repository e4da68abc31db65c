use crate::stimulus::InkColor;

/// Message shown on the practice feedback slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Wrong,
    TooSlow,
    Good,
}

impl Verdict {
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Wrong => "Wrong",
            Verdict::TooSlow => "Correct, but try to be faster...",
            Verdict::Good => "Good!",
        }
    }
}

/// What a single frame should show. Produced by the state machine,
/// painted by whatever owns the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Legibility,
    Instructions,
    TaskIntro,
    /// White "X" inside a circle: the ready slide and the post-stimulus mask.
    Fixation,
    Stimulus {
        word: InkColor,
        color: InkColor,
    },
    Blank,
    Feedback {
        verdict: Verdict,
        resume_in_secs: u64,
    },
    Break {
        practice: bool,
        seconds_left: u64,
    },
    Closing,
    ForcedStop,
    Fault {
        phase: String,
        detail: String,
    },
}
