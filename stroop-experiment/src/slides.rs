//! Connective slides shown between trials and blocks.
//!
//! Every slide shares one lifecycle: armed until first stepped, running while
//! its duration has not elapsed, finished afterwards until `reset` re-arms it.
//! Slides clear the key buffer on each frame they are displayed so a key
//! pressed during a pause never leaks into the next trial.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use stroop_core::{KeyBuffer, Screen, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideStatus {
    #[default]
    Armed,
    Running,
    Finished,
}

/// Outcome of one display frame of a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideStep {
    pub status: SlideStatus,
    pub screen: Screen,
}

impl SlideStep {
    pub fn running(screen: Screen) -> Self {
        Self {
            status: SlideStatus::Running,
            screen,
        }
    }

    pub fn finished(screen: Screen) -> Self {
        Self {
            status: SlideStatus::Finished,
            screen,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == SlideStatus::Finished
    }
}

pub trait Slide {
    fn step(&mut self, now_ns: u64, keys: &mut KeyBuffer) -> SlideStep;
    fn reset(&mut self);
    fn status(&self) -> SlideStatus;

    fn is_finished(&self) -> bool {
        self.status() == SlideStatus::Finished
    }
}

/// Elapsed-time gate shared by the timed slides.
#[derive(Debug, Clone)]
struct Countdown {
    duration_ms: u64,
    started_ns: Option<u64>,
    status: SlideStatus,
}

impl Countdown {
    fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            started_ns: None,
            status: SlideStatus::Armed,
        }
    }

    /// Elapsed time while still running, `None` once the duration has passed.
    fn tick(&mut self, now_ns: u64) -> Option<Duration> {
        if self.status == SlideStatus::Finished {
            return None;
        }
        let start = *self.started_ns.get_or_insert(now_ns);
        let elapsed = Duration::from_nanos(now_ns.saturating_sub(start));
        if elapsed < Duration::from_millis(self.duration_ms) {
            self.status = SlideStatus::Running;
            Some(elapsed)
        } else {
            self.status = SlideStatus::Finished;
            None
        }
    }

    fn reset(&mut self) {
        self.started_ns = None;
        self.status = SlideStatus::Armed;
    }
}

/// Fixation cross shown before the first trial of a block or practice round.
#[derive(Debug, Clone)]
pub struct ReadySlide {
    countdown: Countdown,
}

impl ReadySlide {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            countdown: Countdown::new(duration_ms),
        }
    }
}

impl Slide for ReadySlide {
    fn step(&mut self, now_ns: u64, keys: &mut KeyBuffer) -> SlideStep {
        keys.clear();
        match self.countdown.tick(now_ns) {
            Some(_) => SlideStep::running(Screen::Fixation),
            None => SlideStep::finished(Screen::Blank),
        }
    }

    fn reset(&mut self) {
        self.countdown.reset();
    }

    fn status(&self) -> SlideStatus {
        self.countdown.status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankTiming {
    Fixed(u64),
    /// Uniform integer in the inclusive range, drawn again on every reset.
    Range(u64, u64),
}

/// Empty screen between trials (the inter-trial interval).
#[derive(Debug, Clone)]
pub struct BlankSlide {
    timing: BlankTiming,
    rng: StdRng,
    countdown: Countdown,
}

impl BlankSlide {
    pub fn new<R: Rng>(timing: BlankTiming, rng: &mut R) -> Self {
        let mut rng = StdRng::from_rng(rng);
        let duration = Self::draw(timing, &mut rng);
        Self {
            timing,
            rng,
            countdown: Countdown::new(duration),
        }
    }

    pub fn main_task<R: Rng>(iti_ms: (u64, u64), rng: &mut R) -> Self {
        Self::new(BlankTiming::Range(iti_ms.0, iti_ms.1), rng)
    }

    pub fn practice<R: Rng>(iti_ms: u64, rng: &mut R) -> Self {
        Self::new(BlankTiming::Fixed(iti_ms), rng)
    }

    fn draw(timing: BlankTiming, rng: &mut StdRng) -> u64 {
        match timing {
            BlankTiming::Fixed(ms) => ms,
            BlankTiming::Range(lo, hi) => rng.random_range(lo..=hi),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.countdown.duration_ms
    }
}

impl Slide for BlankSlide {
    fn step(&mut self, now_ns: u64, keys: &mut KeyBuffer) -> SlideStep {
        keys.clear();
        match self.countdown.tick(now_ns) {
            Some(_) => SlideStep::running(Screen::Blank),
            None => SlideStep::finished(Screen::Blank),
        }
    }

    fn reset(&mut self) {
        self.countdown.reset();
        self.countdown.duration_ms = Self::draw(self.timing, &mut self.rng);
    }

    fn status(&self) -> SlideStatus {
        self.countdown.status
    }
}

/// Rest between main-task blocks, or between practice attempts.
#[derive(Debug, Clone)]
pub struct BreakSlide {
    countdown: Countdown,
    practice: bool,
}

impl BreakSlide {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            countdown: Countdown::new(duration_ms),
            practice: false,
        }
    }

    pub fn set_practice(&mut self, practice: bool) {
        self.practice = practice;
    }

    pub fn is_practice(&self) -> bool {
        self.practice
    }
}

impl Slide for BreakSlide {
    fn step(&mut self, now_ns: u64, keys: &mut KeyBuffer) -> SlideStep {
        keys.clear();
        match self.countdown.tick(now_ns) {
            Some(elapsed) => SlideStep::running(Screen::Break {
                practice: self.practice,
                seconds_left: (self.countdown.duration_ms / 1000).saturating_sub(elapsed.as_secs()),
            }),
            None => SlideStep::finished(Screen::Blank),
        }
    }

    /// Re-arms the slide and drops back to the main-task variant.
    fn reset(&mut self) {
        self.countdown.reset();
        self.practice = false;
    }

    fn status(&self) -> SlideStatus {
        self.countdown.status
    }
}

/// Practice-only verdict on the trial that just ended.
#[derive(Debug, Clone)]
pub struct FeedbackSlide {
    countdown: Countdown,
    slow_threshold: Duration,
    correct: bool,
    reaction_time: Option<Duration>,
}

impl FeedbackSlide {
    /// `slow_threshold_ms` is the main-task deadline; correct answers at or
    /// beyond it are flagged as too slow.
    pub fn new(duration_ms: u64, slow_threshold_ms: u64) -> Self {
        Self {
            countdown: Countdown::new(duration_ms),
            slow_threshold: Duration::from_millis(slow_threshold_ms),
            correct: false,
            reaction_time: None,
        }
    }

    pub fn set_outcome(&mut self, correct: bool, reaction_time: Option<Duration>) {
        self.correct = correct;
        self.reaction_time = reaction_time;
    }

    pub fn verdict(&self) -> Verdict {
        match (self.correct, self.reaction_time) {
            (false, _) | (true, None) => Verdict::Wrong,
            (true, Some(rt)) if rt >= self.slow_threshold => Verdict::TooSlow,
            (true, Some(_)) => Verdict::Good,
        }
    }
}

impl Slide for FeedbackSlide {
    fn step(&mut self, now_ns: u64, keys: &mut KeyBuffer) -> SlideStep {
        keys.clear();
        match self.countdown.tick(now_ns) {
            Some(_) => SlideStep::running(Screen::Feedback {
                verdict: self.verdict(),
                resume_in_secs: self.countdown.duration_ms / 1000,
            }),
            None => SlideStep::finished(Screen::Blank),
        }
    }

    fn reset(&mut self) {
        self.countdown.reset();
        self.correct = false;
        self.reaction_time = None;
    }

    fn status(&self) -> SlideStatus {
        self.countdown.status
    }
}
