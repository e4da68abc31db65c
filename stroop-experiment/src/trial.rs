use crate::config::StroopConfig;
use crate::slides::{Slide, SlideStatus, SlideStep};
use std::time::Duration;
use stroop_core::{InkColor, KeyBuffer, Screen, StroopStimulus, TrialRecord, TrialState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialDurations {
    pub stimulus_ms: u64,
    pub blank_ms: u64,
    pub practice_deadline_ms: u64,
}

impl TrialDurations {
    pub fn from_config(config: &StroopConfig) -> Self {
        Self {
            stimulus_ms: config.stimulus_time_ms,
            blank_ms: config.blank_time_ms,
            practice_deadline_ms: config.practice_deadline_ms,
        }
    }

    pub fn deadline(&self, practice: bool) -> Duration {
        if practice {
            Duration::from_millis(self.practice_deadline_ms)
        } else {
            Duration::from_millis(self.stimulus_ms + self.blank_ms)
        }
    }
}

/// One stimulus-response cycle.
///
/// The word is shown in its ink until `stimulus_ms` has elapsed (or the
/// participant answered), then the mask stays up until the deadline. The first
/// color key before the deadline is the answer; practice trials end on it,
/// main-task trials run to the deadline regardless. Response fields are frozen
/// once the trial is complete.
#[derive(Debug, Clone)]
pub struct TrialSlide {
    pub stimulus: StroopStimulus,
    pub durations: TrialDurations,
    is_practice: bool,
    order_index: Option<usize>,
    started_ns: Option<u64>,
    elapsed: Duration,
    answer: Option<InkColor>,
    reaction_time: Option<Duration>,
    correct: bool,
    state: TrialState,
    emitted: bool,
}

impl TrialSlide {
    pub fn new(stimulus: StroopStimulus, durations: TrialDurations) -> Self {
        Self {
            stimulus,
            durations,
            is_practice: false,
            order_index: None,
            started_ns: None,
            elapsed: Duration::ZERO,
            answer: None,
            reaction_time: None,
            correct: false,
            state: TrialState::Pending,
            emitted: false,
        }
    }

    pub fn practice(stimulus: StroopStimulus, durations: TrialDurations) -> Self {
        Self {
            is_practice: true,
            ..Self::new(stimulus, durations)
        }
    }

    pub fn word(&self) -> InkColor {
        self.stimulus.word
    }

    pub fn color(&self) -> InkColor {
        self.stimulus.color
    }

    pub fn is_practice(&self) -> bool {
        self.is_practice
    }

    pub fn is_complete(&self) -> bool {
        self.state == TrialState::Complete
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn order_index(&self) -> Option<usize> {
        self.order_index
    }

    /// Sets the run position the first time the trial is scheduled.
    pub fn assign_order_index(&mut self, index: usize) -> usize {
        *self.order_index.get_or_insert(index)
    }

    pub fn answer(&self) -> Option<InkColor> {
        self.answer
    }

    pub fn reaction_time(&self) -> Option<Duration> {
        self.reaction_time
    }

    pub fn is_correct(&self) -> bool {
        self.correct
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn record(&self) -> TrialRecord {
        TrialRecord::new(
            self.stimulus.word,
            self.stimulus.color,
            self.answer,
            self.reaction_time,
            self.correct,
        )
    }

    /// The record of a completed trial, handed out once.
    pub fn take_record(&mut self) -> Option<TrialRecord> {
        if !self.is_complete() || self.emitted {
            return None;
        }
        self.emitted = true;
        Some(self.record())
    }

    fn complete(&mut self, screen: Screen) -> SlideStep {
        self.state = TrialState::Complete;
        SlideStep::finished(screen)
    }
}

impl Slide for TrialSlide {
    fn step(&mut self, now_ns: u64, keys: &mut KeyBuffer) -> SlideStep {
        if self.is_complete() {
            return SlideStep::finished(Screen::Blank);
        }
        let start = *self.started_ns.get_or_insert(now_ns);
        self.elapsed = Duration::from_nanos(now_ns.saturating_sub(start));

        // deadline first: a key landing in the expiry frame is dropped
        if self.elapsed >= self.durations.deadline(self.is_practice) {
            return self.complete(Screen::Blank);
        }

        let screen = if self.elapsed < Duration::from_millis(self.durations.stimulus_ms)
            && self.answer.is_none()
        {
            self.state = TrialState::Stimulus;
            Screen::Stimulus {
                word: self.stimulus.word,
                color: self.stimulus.color,
            }
        } else {
            self.state = TrialState::Mask;
            Screen::Fixation
        };

        if self.answer.is_none() {
            if let Some(answer) = keys.take_response() {
                self.answer = Some(answer);
                self.reaction_time = Some(self.elapsed);
                self.correct = answer == self.stimulus.color;
                if self.is_practice {
                    return self.complete(screen);
                }
            }
        }
        SlideStep::running(screen)
    }

    /// Trials are consumed once; a reset puts the slide back in its
    /// never-displayed state and is only used when a deck is rebuilt.
    fn reset(&mut self) {
        *self = Self {
            is_practice: self.is_practice,
            ..Self::new(self.stimulus, self.durations)
        };
    }

    fn status(&self) -> SlideStatus {
        match self.state {
            TrialState::Pending => SlideStatus::Armed,
            TrialState::Stimulus | TrialState::Mask => SlideStatus::Running,
            TrialState::Complete => SlideStatus::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stroop_core::Key;

    const MS: u64 = 1_000_000;

    fn durations() -> TrialDurations {
        TrialDurations {
            stimulus_ms: 500,
            blank_ms: 2_000,
            practice_deadline_ms: 20_000,
        }
    }

    fn trial(word: InkColor, color: InkColor) -> TrialSlide {
        TrialSlide::new(StroopStimulus::new(word, color), durations())
    }

    /// Steps at 60Hz from `from_ms` until the trial completes, returning the
    /// elapsed ms at completion.
    fn run_to_completion(t: &mut TrialSlide, keys: &mut KeyBuffer, from_ms: u64) -> u64 {
        let mut now = from_ms * MS;
        loop {
            if t.step(now, keys).is_finished() {
                return now / MS - from_ms;
            }
            now += 16_667_000;
        }
    }

    #[test]
    fn no_response_times_out_at_deadline() {
        let mut keys = KeyBuffer::new();
        let mut t = trial(InkColor::Red, InkColor::Blue);
        assert!(!t.step(0, &mut keys).is_finished());
        assert!(!t.step(2_499 * MS, &mut keys).is_finished());
        assert!(t.step(2_500 * MS, &mut keys).is_finished());

        let rec = t.take_record().unwrap();
        assert_eq!(rec.rt, -1);
        assert!(!rec.correct);
        assert_eq!(rec.user_answer, "None");
    }

    #[test]
    fn stimulus_then_mask() {
        let mut keys = KeyBuffer::new();
        let mut t = trial(InkColor::Green, InkColor::Yellow);
        assert_eq!(
            t.step(100 * MS, &mut keys).screen,
            Screen::Stimulus {
                word: InkColor::Green,
                color: InkColor::Yellow
            }
        );
        assert_eq!(t.state(), TrialState::Stimulus);
        // the clock starts at the first step, so the word stays up until 600
        assert!(matches!(
            t.step(599 * MS, &mut keys).screen,
            Screen::Stimulus { .. }
        ));
        assert_eq!(t.step(600 * MS, &mut keys).screen, Screen::Fixation);
        assert_eq!(t.state(), TrialState::Mask);
    }

    #[test]
    fn answering_the_ink_is_correct() {
        let mut keys = KeyBuffer::new();
        let mut t = trial(InkColor::Green, InkColor::Red);
        t.step(0, &mut keys);
        keys.push(Key::R);
        let step = t.step(420 * MS, &mut keys);
        // main-task trials keep running after the answer
        assert!(!step.is_finished());
        assert!(t.is_correct());
        assert_eq!(t.reaction_time(), Some(Duration::from_millis(420)));
        // and the word is masked from the next frame on
        assert_eq!(t.step(437 * MS, &mut keys).screen, Screen::Fixation);

        let total = run_to_completion(&mut t, &mut keys, 440);
        assert!(total > 0);
        let rec = t.take_record().unwrap();
        assert!(rec.correct);
        assert_eq!(rec.rt, 420);
        assert!(rec.rt < 2_500);
    }

    #[test]
    fn answering_the_word_is_incorrect() {
        let mut keys = KeyBuffer::new();
        let mut t = trial(InkColor::Green, InkColor::Red);
        t.step(0, &mut keys);
        keys.push(Key::G);
        t.step(300 * MS, &mut keys);
        assert!(!t.is_correct());
        assert_eq!(t.answer(), Some(InkColor::Green));
    }

    #[test]
    fn first_answer_wins() {
        let mut keys = KeyBuffer::new();
        let mut t = trial(InkColor::Blue, InkColor::Blue);
        t.step(0, &mut keys);
        keys.push(Key::B);
        t.step(200 * MS, &mut keys);
        keys.push(Key::Y);
        t.step(300 * MS, &mut keys);
        assert_eq!(t.answer(), Some(InkColor::Blue));
        assert_eq!(t.reaction_time(), Some(Duration::from_millis(200)));
        // the later key was never consumed by the trial
        assert_eq!(keys.peek(), Some(Key::Y));
    }

    #[test]
    fn key_in_the_expiry_frame_is_dropped() {
        let mut keys = KeyBuffer::new();
        let mut t = trial(InkColor::Blue, InkColor::Red);
        t.step(0, &mut keys);
        keys.push(Key::R);
        assert!(t.step(2_500 * MS, &mut keys).is_finished());
        assert_eq!(t.answer(), None);
        assert_eq!(t.record().rt, -1);
    }

    #[test]
    fn practice_trial_ends_on_answer() {
        let mut keys = KeyBuffer::new();
        let mut t = TrialSlide::practice(
            StroopStimulus::new(InkColor::Red, InkColor::Yellow),
            durations(),
        );
        t.step(0, &mut keys);
        keys.push(Key::Y);
        // well past the main-task deadline, inside the practice one
        assert!(t.step(5_000 * MS, &mut keys).is_finished());
        assert!(t.is_correct());
        assert_eq!(t.record().rt, 5_000);
    }

    #[test]
    fn unanswered_practice_trial_waits_for_its_own_deadline() {
        use crate::slides::FeedbackSlide;
        use stroop_core::Verdict;

        let mut keys = KeyBuffer::new();
        let mut t = TrialSlide::practice(
            StroopStimulus::new(InkColor::Blue, InkColor::Green),
            durations(),
        );
        t.step(0, &mut keys);
        // stimulus plus blank has long passed
        assert!(!t.step(2_500 * MS, &mut keys).is_finished());
        assert!(!t.step(19_999 * MS, &mut keys).is_finished());
        assert!(t.step(20_000 * MS, &mut keys).is_finished());

        let rec = t.record();
        assert_eq!(rec.rt, -1);
        assert!(!rec.correct);

        let mut feedback = FeedbackSlide::new(3_000, 2_500);
        feedback.set_outcome(rec.correct, t.reaction_time());
        assert_eq!(feedback.verdict(), Verdict::Wrong);
    }

    #[test]
    fn record_is_taken_once_and_frozen() {
        let mut keys = KeyBuffer::new();
        let mut t = trial(InkColor::Red, InkColor::Red);
        t.step(0, &mut keys);
        t.step(2_600 * MS, &mut keys);
        assert!(t.take_record().is_some());
        assert!(t.take_record().is_none());

        keys.push(Key::R);
        t.step(2_700 * MS, &mut keys);
        assert_eq!(t.answer(), None);
    }

    #[test]
    fn order_index_is_assigned_once() {
        let mut t = trial(InkColor::Red, InkColor::Red);
        assert_eq!(t.assign_order_index(5), 5);
        assert_eq!(t.assign_order_index(9), 5);
    }
}
