use super::label_contains;
use crate::inference::response::ModelResponse;

/// Canonical score pair derived from either response shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedScores {
    pub fake_score: f64,
    pub real_score: f64,
}

/// Map a model response onto a fake/real score pair.
///
/// Ranked lists are scanned for the first label mentioning "fake" and the
/// first mentioning "real"; a missing match scores 0. A single prediction
/// contributes its score to whichever side its label names, with the other
/// side taking the complement. Pure and total.
pub fn normalize(response: &ModelResponse) -> NormalizedScores {
    match response {
        ModelResponse::Ranked(entries) => {
            let fake_score = entries
                .iter()
                .find(|entry| label_contains(&entry.label, "fake"))
                .map(|entry| entry.score)
                .unwrap_or(0.0);
            let real_score = entries
                .iter()
                .find(|entry| label_contains(&entry.label, "real"))
                .map(|entry| entry.score)
                .unwrap_or(0.0);
            NormalizedScores {
                fake_score,
                real_score,
            }
        }
        ModelResponse::Single(prediction) => {
            if label_contains(&prediction.label, "fake") {
                NormalizedScores {
                    fake_score: prediction.score,
                    real_score: 1.0 - prediction.score,
                }
            } else {
                NormalizedScores {
                    fake_score: 1.0 - prediction.score,
                    real_score: prediction.score,
                }
            }
        }
    }
}
