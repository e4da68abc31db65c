use crate::config::StroopConfig;
use crate::deck::build_deck;
use crate::error::StroopError;
use crate::runner::{self, Advance, RunContext};
use crate::session::{Cursor, Session};
use crate::slides::{BlankSlide, BreakSlide, FeedbackSlide, ReadySlide, Slide};
use crate::trial::TrialSlide;
use rand::Rng;
use stroop_core::{Effect, Key, Screen, StroopPhase};
use stroop_timing::Timer;
use tracing::{debug, error, info, warn};

/// The congruent share the condition pool produces on its own.
const POOL_CONGRUENT_SHARE: f64 = 0.25;

/// Result of one `step()`: what to show and what the host should do.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub phase: StroopPhase,
    pub screen: Screen,
    pub effects: Vec<Effect>,
}

pub struct StroopStateMachine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub session: Session,
    pub timer: T,
    pub rng: R,
    pub config: StroopConfig,
    practice_deck: Vec<TrialSlide>,
    blocks: Vec<Vec<TrialSlide>>,
    ready: ReadySlide,
    feedback: FeedbackSlide,
    blank: BlankSlide,
    practice_blank: BlankSlide,
    break_slide: BreakSlide,
    fault: Option<(StroopPhase, String)>,
}

impl<T, R> StroopStateMachine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    /// Validates the configuration and builds every deck up front.
    pub fn new(config: StroopConfig, timer: T, mut rng: R) -> Result<Self, StroopError> {
        config.validate()?;
        if (config.congruent_frequency - POOL_CONGRUENT_SHARE).abs() > f64::EPSILON {
            warn!(
                congruent_frequency = config.congruent_frequency,
                "congruent_frequency is not enforced, decks keep one congruent trial in four"
            );
        }

        let practice_deck = if config.practice_run {
            build_deck(config.practice_length, true, &config, &mut rng)?
        } else {
            Vec::new()
        };
        let block_len = config.block_len();
        let mut deck = build_deck(config.total_trials, false, &config, &mut rng)?.into_iter();
        let blocks: Vec<Vec<TrialSlide>> = (0..config.number_of_sub_blocks)
            .map(|_| deck.by_ref().take(block_len).collect())
            .collect();

        let ready = ReadySlide::new(config.blank_time_ms);
        let feedback = FeedbackSlide::new(
            config.practice_feedback_length_ms,
            config.response_deadline_ms(),
        );
        let blank = BlankSlide::main_task(config.iti_ms, &mut rng);
        let practice_blank = BlankSlide::practice(config.practice_iti_ms, &mut rng);
        let break_slide = BreakSlide::new(config.block_break_time_ms);

        info!(
            run_id = %config.run_id,
            trials = config.total_trials,
            blocks = blocks.len(),
            practice = config.practice_run,
            "stroop task ready"
        );

        Ok(Self {
            session: Session::new(),
            timer,
            rng,
            config,
            practice_deck,
            blocks,
            ready,
            feedback,
            blank,
            practice_blank,
            break_slide,
            fault: None,
        })
    }

    pub fn phase(&self) -> StroopPhase {
        self.session.phase
    }

    pub fn is_running(&self) -> bool {
        !self.session.phase.is_terminal()
    }

    pub fn block_len(&self) -> usize {
        self.config.block_len()
    }

    pub fn practice_deck(&self) -> &[TrialSlide] {
        &self.practice_deck
    }

    pub fn blocks(&self) -> &[Vec<TrialSlide>] {
        &self.blocks
    }

    /// Phase and message of the error that halted the machine, if any.
    pub fn fault(&self) -> Option<(StroopPhase, &str)> {
        self.fault.as_ref().map(|(p, d)| (*p, d.as_str()))
    }

    pub fn press(&mut self, key: Key) {
        self.session.keys.push(key);
    }

    /// Buffers a raw key code; codes outside the task's key set are dropped.
    pub fn press_code(&mut self, code: &str) -> bool {
        self.session.keys.push_code(code)
    }

    /// Advances the task by one display frame.
    pub fn step(&mut self) -> Frame {
        let phase = self.session.phase;
        if phase.is_terminal() {
            return self.terminal_frame(Vec::new());
        }
        if self.session.keys.peek() == Some(Key::Escape) {
            info!(%phase, "task cancelled");
            self.enter(StroopPhase::Aborted);
            return self.terminal_frame(Vec::new());
        }

        let now = self.timer.now();
        let mut effects = Vec::new();
        match self.step_phase(now, &mut effects) {
            Ok(screen) => Frame {
                phase: self.session.phase,
                screen,
                effects,
            },
            Err(err) => {
                error!(%phase, error = %err, "task halted");
                self.fault = Some((phase, err.to_string()));
                self.enter(StroopPhase::Faulted);
                // records produced before the failure still go out
                self.terminal_frame(effects)
            }
        }
    }

    fn terminal_frame(&self, effects: Vec<Effect>) -> Frame {
        let screen = match (self.session.phase, &self.fault) {
            (StroopPhase::Aborted, _) => Screen::ForcedStop,
            (StroopPhase::Faulted, Some((phase, detail))) => Screen::Fault {
                phase: phase.to_string(),
                detail: detail.clone(),
            },
            (StroopPhase::Faulted, None) => Screen::Fault {
                phase: StroopPhase::Faulted.to_string(),
                detail: String::new(),
            },
            _ => Screen::Closing,
        };
        Frame {
            phase: self.session.phase,
            screen,
            effects,
        }
    }

    fn enter(&mut self, next: StroopPhase) {
        info!(from = %self.session.phase, to = %next, "phase change");
        self.session.phase = next;
        self.session.keys.clear();
    }

    fn restart_deck(&mut self) {
        self.ready.reset();
        self.session.cursor = Cursor::Ready;
    }

    fn step_phase(&mut self, now: u64, effects: &mut Vec<Effect>) -> Result<Screen, StroopError> {
        match self.session.phase {
            StroopPhase::LegibilityCheck => Ok(self.legibility_check(effects)),
            StroopPhase::Instructions => {
                if self.session.keys.take_if(Key::Space) {
                    if self.config.practice_run {
                        self.restart_deck();
                        self.enter(StroopPhase::Practice);
                    } else {
                        self.enter(StroopPhase::TaskIntro);
                    }
                }
                Ok(Screen::Instructions)
            }
            StroopPhase::Practice => self.practice(now, effects),
            StroopPhase::PracticeEnd => self.practice_end(now),
            StroopPhase::TaskIntro => {
                if self.session.keys.take_if(Key::Space) {
                    self.restart_deck();
                    self.enter(StroopPhase::Task);
                }
                Ok(Screen::TaskIntro)
            }
            StroopPhase::Task => self.task(now, effects),
            StroopPhase::BlockEnd => Ok(self.block_end(now)),
            StroopPhase::Completed => {
                effects.extend([
                    Effect::ExitFullscreen,
                    Effect::RevealContinue,
                    Effect::ShrinkSurface,
                ]);
                self.enter(StroopPhase::Exit);
                Ok(Screen::Closing)
            }
            phase @ (StroopPhase::Exit | StroopPhase::Aborted | StroopPhase::Faulted) => Err(
                StroopError::invariant(phase, "terminal phase reached the frame step"),
            ),
        }
    }

    fn legibility_check(&mut self, effects: &mut Vec<Effect>) -> Screen {
        let answer = if self.session.keys.take_if(Key::Y) {
            Some(("Yes", StroopPhase::Instructions))
        } else if self.session.keys.take_if(Key::N) {
            Some(("No", StroopPhase::Completed))
        } else {
            None
        };
        if let Some((value, next)) = answer {
            effects.push(Effect::Legibility {
                key: format!("couldReadWords{}", self.config.run_id),
                value: value.to_string(),
            });
            self.enter(next);
        }
        Screen::Legibility
    }

    fn practice(&mut self, now: u64, effects: &mut Vec<Effect>) -> Result<Screen, StroopError> {
        let Cursor::Trial(index) = self.session.cursor else {
            let step = self.ready.step(now, &mut self.session.keys);
            if step.is_finished() {
                self.session.cursor = Cursor::Trial(0);
            }
            return Ok(step.screen);
        };

        let attempt = self.session.practice.attempts;
        let prefix = self
            .config
            .practice_ids
            .get(attempt)
            .map(|id| format!("pracStroop{id}"))
            .ok_or_else(|| {
                StroopError::invariant(
                    StroopPhase::Practice,
                    format!("no practice id for attempt {}", attempt + 1),
                )
            })?;

        let mut ctx = RunContext {
            now_ns: now,
            keys: &mut self.session.keys,
            offset: 0,
            key_prefix: &prefix,
            score: &mut self.session.practice.score,
            effects,
        };
        let (advance, screen) = runner::advance(
            &mut self.practice_deck,
            index,
            &mut ctx,
            &mut self.feedback,
            &mut self.practice_blank,
            true,
        );
        match advance {
            Advance::Next(next) => self.session.cursor = Cursor::Trial(next),
            Advance::Complete => self.finish_practice_attempt(),
        }
        Ok(screen)
    }

    fn finish_practice_attempt(&mut self) {
        let pass = self.config.practice_pass;
        let counters = &mut self.session.practice;
        counters.attempts += 1;
        let passed = counters.score >= pass;
        if !passed {
            counters.fails += 1;
        }
        info!(
            attempt = counters.attempts,
            score = counters.score,
            pass,
            passed,
            "practice attempt finished"
        );
        self.practice_blank.reset();
        self.restart_deck();
        self.enter(StroopPhase::PracticeEnd);
    }

    fn practice_end(&mut self, now: u64) -> Result<Screen, StroopError> {
        let counters = self.session.practice.clone();
        if counters.fails >= self.config.practice_limit {
            info!(fails = counters.fails, "practice attempts exhausted");
            self.enter(StroopPhase::Completed);
            return Ok(Screen::Blank);
        }
        if counters.score >= self.config.practice_pass {
            self.break_slide.reset();
            self.enter(StroopPhase::TaskIntro);
            return Ok(Screen::Blank);
        }

        self.break_slide.set_practice(true);
        let step = self.break_slide.step(now, &mut self.session.keys);
        if step.is_finished() {
            self.practice_deck = build_deck(
                self.config.practice_length,
                true,
                &self.config,
                &mut self.rng,
            )?;
            self.session.practice.score = 0;
            self.break_slide.reset();
            self.restart_deck();
            debug!(attempt = counters.attempts + 1, "practice deck rebuilt");
            self.enter(StroopPhase::Practice);
        }
        Ok(step.screen)
    }

    fn task(&mut self, now: u64, effects: &mut Vec<Effect>) -> Result<Screen, StroopError> {
        let Cursor::Trial(index) = self.session.cursor else {
            let step = self.ready.step(now, &mut self.session.keys);
            if step.is_finished() {
                self.session.cursor = Cursor::Trial(0);
            }
            return Ok(step.screen);
        };

        let block_index = self.session.block_index;
        let block_count = self.blocks.len();
        let prefix = format!("stroop{}", self.config.run_id);
        let block = self.blocks.get_mut(block_index).ok_or_else(|| {
            StroopError::invariant(
                StroopPhase::Task,
                format!("block {} of {block_count} does not exist", block_index + 1),
            )
        })?;

        let mut ctx = RunContext {
            now_ns: now,
            keys: &mut self.session.keys,
            offset: self.session.trial_offset,
            key_prefix: &prefix,
            score: &mut self.session.task_correct,
            effects,
        };
        let (advance, screen) = runner::advance(
            block,
            index,
            &mut ctx,
            &mut self.feedback,
            &mut self.blank,
            false,
        );
        match advance {
            Advance::Next(next) => self.session.cursor = Cursor::Trial(next),
            Advance::Complete => {
                self.blank.reset();
                self.restart_deck();
                info!(
                    block = block_index + 1,
                    of = block_count,
                    correct = self.session.task_correct,
                    "block finished"
                );
                if block_index + 1 < block_count {
                    self.enter(StroopPhase::BlockEnd);
                } else {
                    self.enter(StroopPhase::Completed);
                }
            }
        }
        Ok(screen)
    }

    fn block_end(&mut self, now: u64) -> Screen {
        let step = self.break_slide.step(now, &mut self.session.keys);
        if step.is_finished() {
            self.session.block_index += 1;
            self.session.trial_offset = self.session.block_index * self.config.block_len();
            self.blank.reset();
            self.break_slide.reset();
            self.restart_deck();
            self.enter(StroopPhase::Task);
        }
        step.screen
    }
}
