// MotionCoach — Classification Scoring
//
// Used by the training loop to decide convergence: an example only counts
// as learned when its class wins, stands out from the other outputs, and beats
// the runner-up by a margin.

use std::fmt::Write as _;

use crate::config::*;

/// Summary statistics of one network output vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    /// Largest output strictly above [`CONFIDENCE_FLOOR`]; first index wins ties.
    pub predicted: Option<usize>,
    /// Value of the predicted output (0 when there is none).
    pub top: f32,
    /// Largest other output above the floor (0 when there is none).
    pub runner_up: f32,
    pub mean: f32,
    /// Deviation from the mean: `sqrt(Σ (o - mean)² / (N - 1))`.
    pub rms: f32,
    /// `(top - mean) / rms`, 0 when the outputs are flat.
    pub discriminability: f32,
    /// `top / runner_up`, infinite without a runner-up.
    pub margin: f32,
}

pub fn score(outputs: &[f32]) -> Scores {
    let mut top = 0.0f32;
    let mut predicted = None;
    for (i, &o) in outputs.iter().enumerate() {
        if o > top && o > CONFIDENCE_FLOOR {
            top = o;
            predicted = Some(i);
        }
    }

    let runner_up = outputs
        .iter()
        .enumerate()
        .filter(|&(i, &o)| Some(i) != predicted && o > CONFIDENCE_FLOOR)
        .fold(0.0f32, |acc, (_, &o)| acc.max(o));

    let n = outputs.len();
    let mean = if n == 0 { 0.0 } else { outputs.iter().sum::<f32>() / n as f32 };

    // The predicted unit is left out of the count but not of the sum.
    let count = if predicted.is_some() { n.saturating_sub(1) } else { n };
    let sum_sq: f32 = outputs.iter().map(|o| (o - mean).powi(2)).sum();
    let rms = if count == 0 { 0.0 } else { (sum_sq / count as f32).sqrt() };

    let discriminability = if rms != 0.0 { (top - mean) / rms } else { 0.0 };
    let margin = if runner_up > 0.0 { top / runner_up } else { f32::INFINITY };

    Scores {
        predicted,
        top,
        runner_up,
        mean,
        rms,
        discriminability,
        margin,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    /// Predicted class differs from the expected one (or nothing qualified).
    pub wrong_class: bool,
    /// Right class, discriminability below [`DISCRIMINABILITY_THRESHOLD`].
    pub low_discriminability: bool,
    /// Right class, `top / runner_up` below [`MARGIN_THRESHOLD`].
    pub low_margin: bool,
}

impl Faults {
    pub fn any(&self) -> bool {
        self.wrong_class || self.low_discriminability || self.low_margin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub expected: usize,
    pub scores: Scores,
    pub faults: Faults,
    pub outputs: Vec<f32>,
}

impl Evaluation {
    pub fn is_error(&self) -> bool {
        self.faults.any()
    }

    /// One console line: state, max, mean, z-score and outputs as integer
    /// percentages, followed by any fault labels.
    pub fn summary(&self) -> String {
        let s = &self.scores;
        let state = s.predicted.map_or(-1, |c| c as i64);
        let mut line = format!(
            "State {}\tMax {}\tMean {}\t\tZ-score {}\tOutputs",
            state,
            (100.0 * s.top) as i32,
            (100.0 * s.mean) as i32,
            (100.0 * s.discriminability) as i32
        );
        for o in &self.outputs {
            let _ = write!(line, "\t{}", (100.0 * o) as i32);
        }
        if self.faults.wrong_class {
            line.push_str("\t Classification Error");
        }
        if self.faults.low_discriminability || self.faults.low_margin {
            line.push_str("\t Classification Accuracy Limit");
        }
        line
    }
}

pub fn evaluate(outputs: &[f32], expected: usize) -> Evaluation {
    let scores = score(outputs);
    let wrong_class = scores.predicted != Some(expected);

    let faults = Faults {
        wrong_class,
        low_discriminability: !wrong_class && scores.discriminability < DISCRIMINABILITY_THRESHOLD,
        low_margin: !wrong_class && scores.margin < MARGIN_THRESHOLD,
    };

    Evaluation {
        expected,
        scores,
        faults,
        outputs: outputs.to_vec(),
    }
}
