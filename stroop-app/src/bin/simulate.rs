//! Runs the whole task against a simulated participant on a manual clock.
//!
//! Usage: `stroop-simulate [seed] [config.json] [data.jsonl]`

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::Duration;
use stroop_app::{JsonLinesSink, load_config};
use stroop_core::{DataSink, InkColor, Key, MemorySink, NoopHost, Screen, StroopPhase};
use stroop_experiment::{Responder, ResultSummary, StroopStateMachine, run_headless};
use stroop_timing::{ManualClock, Timer};
use tracing::info;

const FRAME: Duration = Duration::from_micros(16_667);
const MAX_FRAMES: usize = 1_000_000;
const ERROR_RATE: f64 = 0.05;
/// Extra latency on incongruent trials.
const INTERFERENCE_MS: u64 = 60;

/// Answers each stimulus once, after a drawn latency, occasionally with the
/// wrong color.
struct Participant {
    rng: StdRng,
    pending: Option<(u64, Key)>,
    on_stimulus: bool,
}

impl Participant {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            pending: None,
            on_stimulus: false,
        }
    }

    fn schedule(&mut self, word: InkColor, color: InkColor) {
        let mut latency_ms = self.rng.random_range(420..=760);
        if word != color {
            latency_ms += INTERFERENCE_MS;
        }
        let answer = if self.rng.random_bool(ERROR_RATE) {
            let others: Vec<InkColor> = InkColor::ALL.into_iter().filter(|c| *c != color).collect();
            others[self.rng.random_range(0..others.len())]
        } else {
            color
        };
        let frames = latency_ms * 1_000 / FRAME.as_micros() as u64;
        self.pending = Some((frames.max(1), Key::for_color(answer)));
    }
}

impl Responder for Participant {
    fn respond(&mut self, phase: StroopPhase, screen: &Screen) -> Option<Key> {
        let fresh_stimulus = matches!(screen, Screen::Stimulus { .. }) && !self.on_stimulus;
        self.on_stimulus = matches!(screen, Screen::Stimulus { .. });

        match (phase, screen) {
            (StroopPhase::LegibilityCheck, _) => return Some(Key::Y),
            (_, Screen::Instructions | Screen::TaskIntro) => return Some(Key::Space),
            (_, Screen::Stimulus { word, color }) if fresh_stimulus => {
                self.schedule(*word, *color);
            }
            _ => {}
        }

        let (frames, key) = self.pending.take()?;
        if frames <= 1 {
            return Some(key);
        }
        self.pending = Some((frames - 1, key));
        None
    }
}

fn simulate(
    machine: &mut StroopStateMachine<ManualClock, StdRng>,
    participant: &mut Participant,
    sink: &mut impl DataSink,
) -> Result<()> {
    let mut host = NoopHost::default();
    let run = run_headless(machine, participant, sink, &mut host, FRAME, MAX_FRAMES)?;

    info!(
        frames = run.frames,
        phase = %run.final_phase,
        practice_trials = run.practice_records.len(),
        simulated_secs = machine.timer.now_ms() / 1_000,
        "simulation finished"
    );
    let practice = ResultSummary::from_records(&run.practice_records);
    info!(correct = practice.correct, trials = practice.trials, "practice");
    ResultSummary::from_records(&run.records).log();

    let stats = machine.timer.calibration_stats();
    info!(fps = format_args!("{:.1}", stats.effective_fps), "frame timing");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("seed must be an integer, got {arg:?}"))?,
        None => 1,
    };
    let config_path = args.next().map(PathBuf::from);
    let data_path = args.next().map(PathBuf::from);

    let config = load_config(config_path.as_deref())?;
    let mut machine =
        StroopStateMachine::new(config, ManualClock::new(), StdRng::seed_from_u64(seed))?;
    let mut participant = Participant::new(seed.wrapping_add(1));
    info!(seed, "simulating participant");

    match data_path {
        Some(path) => {
            let mut sink = JsonLinesSink::open(&path)
                .with_context(|| format!("opening data file {}", path.display()))?;
            simulate(&mut machine, &mut participant, &mut sink)?;
            info!(path = %path.display(), "data written");
        }
        None => {
            let mut sink = MemorySink::new();
            simulate(&mut machine, &mut participant, &mut sink)?;
            info!(writes = sink.writes.len(), "data kept in memory");
        }
    }
    Ok(())
}
