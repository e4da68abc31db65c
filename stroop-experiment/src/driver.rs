//! Effect routing and a headless frame loop.

use crate::error::StroopError;
use crate::state::{Frame, StroopStateMachine};
use rand::Rng;
use std::time::Duration;
use stroop_core::{DataSink, Effect, HostControls, Key, Screen, StroopPhase, TrialRecord};
use stroop_timing::Timer;
use tracing::info;

const PRACTICE_KEY_PREFIX: &str = "pracStroop";

/// Routes one frame's effects to the sink and the host.
pub fn dispatch(
    effects: &[Effect],
    sink: &mut impl DataSink,
    host: &mut impl HostControls,
) -> Result<(), StroopError> {
    for effect in effects {
        match effect {
            Effect::Trial { key, record } => sink.set(key, &record.to_value())?,
            Effect::Legibility { key, value } => sink.set(key, value)?,
            Effect::ExitFullscreen => host.exit_fullscreen(),
            Effect::RevealContinue => host.reveal_continue(),
            Effect::ShrinkSurface => host.shrink_surface(),
        }
    }
    Ok(())
}

/// Stand-in participant: sees each frame, may press one key.
pub trait Responder {
    fn respond(&mut self, phase: StroopPhase, screen: &Screen) -> Option<Key>;
}

impl<F> Responder for F
where
    F: FnMut(StroopPhase, &Screen) -> Option<Key>,
{
    fn respond(&mut self, phase: StroopPhase, screen: &Screen) -> Option<Key> {
        self(phase, screen)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessRun {
    pub frames: usize,
    pub final_phase: StroopPhase,
    pub practice_records: Vec<TrialRecord>,
    pub records: Vec<TrialRecord>,
}

/// Drives `machine` frame by frame until it stops or `max_frames` pass.
/// Time moves through `Timer::sleep`, so with a `ManualClock` the whole task
/// runs instantly.
pub fn run_headless<T, R>(
    machine: &mut StroopStateMachine<T, R>,
    responder: &mut impl Responder,
    sink: &mut impl DataSink,
    host: &mut impl HostControls,
    frame_interval: Duration,
    max_frames: usize,
) -> Result<HeadlessRun, StroopError>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    let mut run = HeadlessRun::default();
    while machine.is_running() && run.frames < max_frames {
        let Frame {
            phase,
            screen,
            effects,
        } = machine.step();
        dispatch(&effects, sink, host)?;
        for effect in effects {
            if let Effect::Trial { key, record } = effect {
                if key.starts_with(PRACTICE_KEY_PREFIX) {
                    run.practice_records.push(record);
                } else {
                    run.records.push(record);
                }
            }
        }
        if let Some(key) = responder.respond(phase, &screen) {
            machine.press(key);
        }
        machine.timer.sleep(frame_interval);
        machine.timer.record_frame(frame_interval);
        run.frames += 1;
    }
    run.final_phase = machine.phase();
    info!(
        frames = run.frames,
        phase = %run.final_phase,
        trials = run.records.len(),
        practice_trials = run.practice_records.len(),
        "headless run stopped"
    );
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stroop_core::{InkColor, MemorySink, NoopHost};

    #[test]
    fn dispatch_routes_records_and_host_effects() {
        let mut sink = MemorySink::new();
        let mut host = NoopHost::default();
        let record = TrialRecord::new(InkColor::Red, InkColor::Blue, None, None, false);
        let effects = [
            Effect::Legibility {
                key: "couldReadWordsA".into(),
                value: "Yes".into(),
            },
            Effect::Trial {
                key: "stroopA1".into(),
                record: record.clone(),
            },
            Effect::ExitFullscreen,
            Effect::RevealContinue,
            Effect::ShrinkSurface,
        ];
        dispatch(&effects, &mut sink, &mut host).unwrap();

        assert_eq!(sink.get("couldReadWordsA"), Some("Yes"));
        assert_eq!(sink.get("stroopA1"), Some(record.to_value().as_str()));
        assert_eq!(host.fullscreen_exits, 1);
        assert!(host.continue_revealed);
        assert!(host.shrunk);
    }

    #[test]
    fn closures_are_responders() {
        let mut always_space = |_: StroopPhase, _: &Screen| Some(Key::Space);
        assert_eq!(
            always_space.respond(StroopPhase::Instructions, &Screen::Instructions),
            Some(Key::Space)
        );
    }
}
