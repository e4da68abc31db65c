use crate::slides::{BlankSlide, FeedbackSlide, Slide};
use crate::trial::TrialSlide;
use stroop_core::{Effect, KeyBuffer, Screen};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Deck position to drive on the next frame.
    Next(usize),
    Complete,
}

/// Per-frame inputs and outputs of the runner.
pub struct RunContext<'a> {
    pub now_ns: u64,
    pub keys: &'a mut KeyBuffer,
    /// Added to the one-based deck position to form the order index.
    pub offset: usize,
    /// Record key stem, e.g. `stroopA` or `pracStroopB`.
    pub key_prefix: &'a str,
    /// Correct answers so far; counted when the trial's slides are done.
    pub score: &'a mut usize,
    pub effects: &'a mut Vec<Effect>,
}

/// Drives the trial at `index` for one frame.
///
/// While the trial runs it gets the frame. Once it completes, its record is
/// emitted exactly once, then the connective slides run: feedback followed by
/// the practice blank in practice, the inter-trial blank otherwise. The index
/// moves on only when the last connective slide has finished.
pub fn advance(
    deck: &mut [TrialSlide],
    index: usize,
    ctx: &mut RunContext<'_>,
    feedback: &mut FeedbackSlide,
    blank: &mut BlankSlide,
    practice: bool,
) -> (Advance, Screen) {
    let Some(trial) = deck.get_mut(index) else {
        return (Advance::Complete, Screen::Blank);
    };

    if !trial.is_complete() {
        trial.assign_order_index(index + 1 + ctx.offset);
        let step = trial.step(ctx.now_ns, ctx.keys);
        // a trial that just completed shows this frame; its record goes out next frame
        return (Advance::Next(index), step.screen);
    }

    if let Some(record) = trial.take_record() {
        let order = trial.assign_order_index(index + 1 + ctx.offset);
        let key = format!("{}{}", ctx.key_prefix, order);
        debug!(%key, rt = record.rt, correct = record.correct, "trial recorded");
        if practice {
            feedback.set_outcome(record.correct, trial.reaction_time());
        }
        ctx.effects.push(Effect::Trial { key, record });
    }

    if practice && !feedback.is_finished() {
        let step = feedback.step(ctx.now_ns, ctx.keys);
        if !step.is_finished() {
            return (Advance::Next(index), step.screen);
        }
    }

    let step = blank.step(ctx.now_ns, ctx.keys);
    if !step.is_finished() {
        return (Advance::Next(index), step.screen);
    }

    if practice {
        feedback.reset();
    }
    if trial.is_correct() {
        *ctx.score += 1;
    }
    blank.reset();
    ctx.keys.clear();
    (Advance::Next(index + 1), Screen::Blank)
}
