use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use stroop_core::{Key, MemorySink, NoopHost, Screen, StroopPhase, TrialRecord};
use stroop_experiment::{ResultSummary, StroopConfig, StroopStateMachine, run_headless};
use stroop_timing::{ManualClock, Timer};

const FRAME: Duration = Duration::from_micros(16_667);
const MAX_FRAMES: usize = 200_000;

fn machine(config: StroopConfig, seed: u64) -> StroopStateMachine<ManualClock, StdRng> {
    StroopStateMachine::new(config, ManualClock::new(), StdRng::seed_from_u64(seed)).unwrap()
}

/// Reads every word, confirms every prompt and names every ink.
fn diligent(phase: StroopPhase, screen: &Screen) -> Option<Key> {
    match (phase, screen) {
        (StroopPhase::LegibilityCheck, _) => Some(Key::Y),
        (_, Screen::Instructions | Screen::TaskIntro) => Some(Key::Space),
        (_, Screen::Stimulus { color, .. }) => Some(Key::for_color(*color)),
        _ => None,
    }
}

#[test]
fn full_default_session_writes_every_record_once() {
    let mut m = machine(StroopConfig::default(), 2024);
    let mut sink = MemorySink::new();
    let mut host = NoopHost::default();

    let run = run_headless(
        &mut m,
        &mut diligent,
        &mut sink,
        &mut host,
        FRAME,
        MAX_FRAMES,
    )
    .unwrap();

    assert_eq!(run.final_phase, StroopPhase::Exit);
    assert_eq!(run.practice_records.len(), 16);
    assert_eq!(run.records.len(), 128);
    // one legibility write plus one per trial, no rewrites
    assert_eq!(sink.writes.len(), 1 + 16 + 128);
    assert_eq!(sink.get("couldReadWordsA"), Some("Yes"));

    for order in 1..=128 {
        let value = sink
            .get(&format!("stroopA{order}"))
            .unwrap_or_else(|| panic!("missing stroopA{order}"));
        let record: TrialRecord = serde_json::from_str(value).unwrap();
        assert!(record.correct);
        assert!(record.rt > 0 && record.rt < 2_500, "rt {}", record.rt);
    }
    assert_eq!(sink.keys_with_prefix("pracStroopA").count(), 16);
    assert_eq!(sink.keys_with_prefix("pracStroopB").count(), 0);

    assert_eq!(host.fullscreen_exits, 1);
    assert!(host.continue_revealed && host.shrunk);

    let summary = ResultSummary::from_records(&run.records);
    assert_eq!(summary.correct, 128);
    assert!((summary.accuracy - 100.0).abs() < f64::EPSILON);
    assert_eq!(run.records.iter().filter(|r| r.is_congruent()).count(), 32);

    let stats = m.timer.calibration_stats();
    assert!((stats.effective_fps - 60.0).abs() < 0.1);
}

#[test]
fn silent_participant_gets_sentinel_records() {
    let config = StroopConfig {
        practice_run: false,
        total_trials: 8,
        ..Default::default()
    };
    let mut m = machine(config, 7);
    let mut sink = MemorySink::new();
    let mut host = NoopHost::default();
    let mut prompts_only = |phase: StroopPhase, screen: &Screen| match screen {
        Screen::Stimulus { .. } => None,
        _ => diligent(phase, screen),
    };

    let run = run_headless(
        &mut m,
        &mut prompts_only,
        &mut sink,
        &mut host,
        FRAME,
        MAX_FRAMES,
    )
    .unwrap();

    assert_eq!(run.final_phase, StroopPhase::Exit);
    assert!(run.practice_records.is_empty());
    assert_eq!(run.records.len(), 8);
    assert!(run.records.iter().all(|r| r.rt == -1 && !r.correct));
    assert!(run.records.iter().all(|r| r.user_answer == "None"));
    assert_eq!(ResultSummary::from_records(&run.records).responded, 0);
    // block two continues the numbering
    assert!(sink.get("stroopA5").is_some() && sink.get("stroopA8").is_some());
}

#[test]
fn cancel_mid_task_stops_writing() {
    let config = StroopConfig {
        practice_run: false,
        total_trials: 8,
        ..Default::default()
    };
    let mut m = machine(config, 3);
    let mut sink = MemorySink::new();
    let mut host = NoopHost::default();
    let mut stimuli = 0;
    let mut quitter = |phase: StroopPhase, screen: &Screen| {
        if let Screen::Stimulus { .. } = screen {
            stimuli += 1;
            // 30 stimulus frames per unanswered trial at 60Hz
            if stimuli > 60 {
                return Some(Key::Escape);
            }
            return None;
        }
        diligent(phase, screen)
    };

    let run = run_headless(
        &mut m,
        &mut quitter,
        &mut sink,
        &mut host,
        FRAME,
        MAX_FRAMES,
    )
    .unwrap();

    assert_eq!(run.final_phase, StroopPhase::Aborted);
    assert_eq!(run.records.len(), 2);
    assert_eq!(m.step().screen, Screen::ForcedStop);
    assert_eq!(host.fullscreen_exits, 0);
}

#[test]
fn config_file_round_trips_through_the_loader() {
    let dir = std::env::temp_dir().join(format!("stroop-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("stroop.json");
    std::fs::write(&path, r#"{"total_trials": 32, "run_id": "Z", "iti_ms": [300, 300]}"#).unwrap();

    let config = StroopConfig::from_json_file(&path).unwrap();
    assert_eq!(config.total_trials, 32);
    assert_eq!(config.run_id, "Z");
    assert_eq!(config.iti_ms, (300, 300));
    assert_eq!(config.block_len(), 16);

    std::fs::remove_dir_all(&dir).unwrap();
}
