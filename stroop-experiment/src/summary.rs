use serde::Serialize;
use stroop_core::TrialRecord;
use tracing::info;

/// Aggregate view over a run's main-task records.
///
/// Reaction-time means only count correct answers; the Stroop effect is the
/// incongruent mean minus the congruent mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSummary {
    pub trials: usize,
    pub responded: usize,
    pub correct: usize,
    /// Percent of trials with any answer.
    pub response_rate: f64,
    /// Percent of trials answered with the ink color.
    pub accuracy: f64,
    pub mean_rt_ms: Option<f64>,
    pub min_rt_ms: Option<i64>,
    pub max_rt_ms: Option<i64>,
    pub congruent_rt_ms: Option<f64>,
    pub incongruent_rt_ms: Option<f64>,
    pub stroop_effect_ms: Option<f64>,
}

fn mean(values: impl Iterator<Item = i64>) -> Option<f64> {
    let (sum, n) = values.fold((0i64, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

impl ResultSummary {
    pub fn from_records(records: &[TrialRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let trials = records.len();
        let responded = records.iter().filter(|r| r.responded()).count();
        let correct: Vec<&TrialRecord> = records
            .iter()
            .filter(|r| r.correct && r.responded())
            .collect();

        let congruent_rt_ms = mean(correct.iter().filter(|r| r.is_congruent()).map(|r| r.rt));
        let incongruent_rt_ms = mean(correct.iter().filter(|r| !r.is_congruent()).map(|r| r.rt));
        let stroop_effect_ms = match (congruent_rt_ms, incongruent_rt_ms) {
            (Some(c), Some(i)) => Some(i - c),
            _ => None,
        };

        Self {
            trials,
            responded,
            correct: correct.len(),
            response_rate: responded as f64 / trials as f64 * 100.0,
            accuracy: correct.len() as f64 / trials as f64 * 100.0,
            mean_rt_ms: mean(correct.iter().map(|r| r.rt)),
            min_rt_ms: correct.iter().map(|r| r.rt).min(),
            max_rt_ms: correct.iter().map(|r| r.rt).max(),
            congruent_rt_ms,
            incongruent_rt_ms,
            stroop_effect_ms,
        }
    }

    pub fn log(&self) {
        info!(
            trials = self.trials,
            responded = self.responded,
            correct = self.correct,
            response_rate = format_args!("{:.1}%", self.response_rate),
            accuracy = format_args!("{:.1}%", self.accuracy),
            "results"
        );
        if let Some(effect) = self.stroop_effect_ms {
            info!(
                congruent_ms = self.congruent_rt_ms.unwrap_or_default(),
                incongruent_ms = self.incongruent_rt_ms.unwrap_or_default(),
                effect_ms = format_args!("{effect:.1}"),
                "stroop effect"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stroop_core::InkColor;
    use stroop_core::InkColor::*;

    fn rec(word: InkColor, color: InkColor, rt: Option<u64>, ok: bool) -> TrialRecord {
        let answer = if ok { Some(color) } else { rt.map(|_| word) };
        TrialRecord::new(word, color, answer, rt.map(Duration::from_millis), ok)
    }

    #[test]
    fn empty_run_is_all_zero() {
        assert_eq!(ResultSummary::from_records(&[]), ResultSummary::default());
    }

    #[test]
    fn stroop_effect_is_incongruent_minus_congruent() {
        let records = [
            rec(Red, Red, Some(400), true),
            rec(Blue, Blue, Some(500), true),
            rec(Red, Green, Some(600), true),
            rec(Yellow, Blue, Some(700), true),
            // errors and misses stay out of the means
            rec(Green, Red, Some(200), false),
            rec(Green, Yellow, None, false),
        ];
        let summary = ResultSummary::from_records(&records);
        assert_eq!(summary.trials, 6);
        assert_eq!(summary.responded, 5);
        assert_eq!(summary.correct, 4);
        assert_eq!(summary.congruent_rt_ms, Some(450.0));
        assert_eq!(summary.incongruent_rt_ms, Some(650.0));
        assert_eq!(summary.stroop_effect_ms, Some(200.0));
        assert_eq!(summary.min_rt_ms, Some(400));
        assert_eq!(summary.max_rt_ms, Some(700));
        assert!((summary.accuracy - 66.666).abs() < 0.01);
    }

    #[test]
    fn effect_needs_both_conditions() {
        let summary = ResultSummary::from_records(&[rec(Red, Red, Some(300), true)]);
        assert_eq!(summary.stroop_effect_ms, None);
        assert_eq!(summary.mean_rt_ms, Some(300.0));
    }
}
