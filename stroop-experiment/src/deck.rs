//! Constrained shuffle of the trial deck.
//!
//! The pool covers every (word, color) pair, the working set is its prefix of
//! the requested length, shuffled, then ordered greedily so that no trial
//! repeats the color placed two positions before it. The greedy pass falls
//! back to the last remaining trial when nothing qualifies, which can leave a
//! same-color run at the end of the deck; `repair_tail` breaks runs within the
//! final five positions. Runs earlier in the deck are not checked.

use crate::config::{PAIRS_PER_REPETITION, StroopConfig};
use crate::error::StroopError;
use crate::trial::{TrialDurations, TrialSlide};
use rand::Rng;
use rand::seq::SliceRandom;
use stroop_core::{InkColor, StroopStimulus};
use tracing::{debug, warn};

const TAIL: usize = 5;
const MAX_REPAIR_SWAPS: usize = 4;

/// Builds an ordered deck of `length` trials.
pub fn build_deck<R: Rng + ?Sized>(
    length: usize,
    is_practice: bool,
    config: &StroopConfig,
    rng: &mut R,
) -> Result<Vec<TrialSlide>, StroopError> {
    let pool = config.repetition_per_color * PAIRS_PER_REPETITION;
    if length > pool {
        return Err(StroopError::DeckTooLong {
            requested: length,
            pool,
        });
    }

    let mut working: Vec<StroopStimulus> = condition_pool(config.repetition_per_color)
        .into_iter()
        .take(length)
        .collect();
    working.shuffle(rng);

    let mut ordered = order_by_two_back(working);
    if !repair_tail(&mut ordered) {
        warn!(
            length,
            "deck tail still holds a same-color run after repair"
        );
    }
    debug!(
        length,
        is_practice,
        congruent = ordered.iter().filter(|s| s.is_congruent()).count(),
        triples = count_triples(&ordered),
        "deck built"
    );

    let durations = TrialDurations::from_config(config);
    Ok(ordered
        .into_iter()
        .map(|s| {
            if is_practice {
                TrialSlide::practice(s, durations)
            } else {
                TrialSlide::new(s, durations)
            }
        })
        .collect())
}

/// Every word in every ink, `repetitions` times, grouped by ink.
pub fn condition_pool(repetitions: usize) -> Vec<StroopStimulus> {
    let mut pool = Vec::with_capacity(repetitions * PAIRS_PER_REPETITION);
    for _ in 0..repetitions {
        for color in InkColor::ALL {
            for word in InkColor::ALL {
                pool.push(StroopStimulus::new(word, color));
            }
        }
    }
    pool
}

/// Greedy ordering: take the first remaining trial whose color differs from
/// the color placed two positions earlier, else the last remaining trial.
pub fn order_by_two_back(mut pool: Vec<StroopStimulus>) -> Vec<StroopStimulus> {
    let mut ordered = Vec::with_capacity(pool.len());
    let mut history: [Option<InkColor>; 2] = [None, None];
    while !pool.is_empty() {
        let pick = pool
            .iter()
            .position(|s| Some(s.color) != history[0])
            .unwrap_or(pool.len() - 1);
        let chosen = pool.remove(pick);
        history = [history[1], Some(chosen.color)];
        ordered.push(chosen);
    }
    ordered
}

fn is_triple(deck: &[StroopStimulus], start: usize) -> bool {
    deck[start].color == deck[start + 1].color && deck[start + 1].color == deck[start + 2].color
}

/// Same-color runs of three starting anywhere in the deck.
pub fn count_triples(deck: &[StroopStimulus]) -> usize {
    (0..deck.len().saturating_sub(2))
        .filter(|&s| is_triple(deck, s))
        .count()
}

/// Same-color runs of three lying inside the final five positions.
pub fn tail_triples(deck: &[StroopStimulus]) -> usize {
    let n = deck.len();
    (n.saturating_sub(TAIL)..n.saturating_sub(2))
        .filter(|&s| is_triple(deck, s))
        .count()
}

/// Breaks same-color runs in the last five trials. All three windows of the
/// tail are checked (positions 1-3, 2-4 and 3-5), so a run opening the tail
/// is repaired too. First swaps the first and third trial of the
/// five-window; if a run survives, applies up to
/// `MAX_REPAIR_SWAPS` single swaps of a tail trial with any other trial, each
/// strictly lowering (tail runs, total runs). Returns whether the tail is
/// clean afterwards.
pub fn repair_tail(deck: &mut [StroopStimulus]) -> bool {
    let n = deck.len();
    if tail_triples(deck) == 0 {
        return true;
    }
    if n >= TAIL {
        deck.swap(n - TAIL, n - 3);
    }
    for _ in 0..MAX_REPAIR_SWAPS {
        let score = (tail_triples(deck), count_triples(deck));
        if score.0 == 0 {
            return true;
        }
        if !apply_improving_swap(deck, score) {
            break;
        }
    }
    tail_triples(deck) == 0
}

fn apply_improving_swap(deck: &mut [StroopStimulus], score: (usize, usize)) -> bool {
    let n = deck.len();
    for j in n.saturating_sub(TAIL)..n {
        for i in 0..n {
            if i == j {
                continue;
            }
            deck.swap(i, j);
            if (tail_triples(deck), count_triples(deck)) < score {
                return true;
            }
            deck.swap(i, j);
        }
    }
    false
}
