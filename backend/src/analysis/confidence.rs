use shared::SinglePrediction;

use super::label_contains;
use super::normalize::NormalizedScores;
use crate::inference::response::ModelResponse;

/// Tolerance in favor of the fake verdict on the ranked path.
const FAKE_MARGIN: f64 = 0.15;
/// Fake scores at or below this are treated as no signal at all.
const MIN_FAKE_SIGNAL: f64 = 0.01;
/// Single predictions scoring under this count as uncertain.
const UNCERTAIN_SINGLE_SCORE: f64 = 0.65;
const FAKE_CONFIDENCE_BOOST: u32 = 20;
const SINGLE_CONFIDENCE_CAP: u32 = 95;

/// Filename substrings that mark an upload as a likely test fake.
const FILENAME_HINTS: [&str; 5] = ["fake", "deep", "synth", "ai", "gen"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub is_deepfake: bool,
    /// Integer percentage. Unclamped on the ranked path, capped at 95 on
    /// the single-prediction path.
    pub confidence: u32,
}

/// Whether the uploaded filename marks the image as a likely test fake.
/// Metadata-driven, not a content signal; only consulted when the
/// filename-hints config switch is on.
pub fn filename_suggests_fake(filename: &str) -> bool {
    let filename = filename.to_lowercase();
    FILENAME_HINTS.iter().any(|hint| filename.contains(hint))
}

fn percent(score: f64) -> u32 {
    (score * 100.0).floor() as u32
}

/// Apply the threshold rules to a normalized score pair and produce the
/// final verdict. The two response shapes keep their own decision rules.
pub fn assess(
    response: &ModelResponse,
    scores: &NormalizedScores,
    likely_test_fake: bool,
) -> Assessment {
    match response {
        ModelResponse::Ranked(_) => assess_ranked(scores, likely_test_fake),
        ModelResponse::Single(prediction) => assess_single(prediction, likely_test_fake),
    }
}

fn assess_ranked(scores: &NormalizedScores, likely_test_fake: bool) -> Assessment {
    let is_deepfake = if likely_test_fake && scores.fake_score > MIN_FAKE_SIGNAL {
        true
    } else {
        scores.fake_score >= scores.real_score - FAKE_MARGIN
    };

    // The boost is not clamped here; confidence can exceed 100.
    let confidence = if is_deepfake {
        percent(scores.fake_score) + FAKE_CONFIDENCE_BOOST
    } else {
        percent(scores.real_score)
    };

    Assessment {
        is_deepfake,
        confidence,
    }
}

fn assess_single(prediction: &SinglePrediction, likely_test_fake: bool) -> Assessment {
    let label_fake = label_contains(&prediction.label, "fake");
    let label_real = label_contains(&prediction.label, "real");

    let is_deepfake = if likely_test_fake {
        true
    } else {
        label_fake || (prediction.score < UNCERTAIN_SINGLE_SCORE && !label_real)
    };

    let confidence = if is_deepfake {
        (percent(1.0 - prediction.score) + FAKE_CONFIDENCE_BOOST).min(SINGLE_CONFIDENCE_CAP)
    } else {
        percent(prediction.score)
    };

    Assessment {
        is_deepfake,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalize::normalize;
    use shared::Prediction;

    fn ranked(fake: f64, real: f64) -> ModelResponse {
        ModelResponse::Ranked(vec![
            Prediction {
                label: "fake".into(),
                score: fake,
            },
            Prediction {
                label: "real".into(),
                score: real,
            },
        ])
    }

    fn single(label: &str, score: f64) -> ModelResponse {
        ModelResponse::Single(SinglePrediction {
            label: label.into(),
            score,
        })
    }

    fn assess_with_filename(response: &ModelResponse, filename: &str) -> Assessment {
        let scores = normalize(response);
        assess(response, &scores, filename_suggests_fake(filename))
    }

    #[test]
    fn ranked_fake_majority_is_deepfake_with_boosted_confidence() {
        let verdict = assess_with_filename(&ranked(0.7, 0.3), "vacation.jpg");
        assert!(verdict.is_deepfake);
        assert_eq!(verdict.confidence, 90);
    }

    #[test]
    fn ranked_real_majority_within_margin_still_counts_as_fake() {
        // 0.45 >= 0.55 - 0.15, so the margin tips this to fake.
        let verdict = assess_with_filename(&ranked(0.45, 0.55), "vacation.jpg");
        assert!(verdict.is_deepfake);
    }

    #[test]
    fn ranked_clear_real_majority_is_not_deepfake() {
        let verdict = assess_with_filename(&ranked(0.1, 0.9), "vacation.jpg");
        assert!(!verdict.is_deepfake);
        assert_eq!(verdict.confidence, 90);
    }

    #[test]
    fn ranked_confidence_is_not_clamped() {
        let verdict = assess_with_filename(&ranked(0.95, 0.05), "vacation.jpg");
        assert!(verdict.is_deepfake);
        assert_eq!(verdict.confidence, 115);
    }

    #[test]
    fn test_filename_overrides_strong_real_score() {
        let verdict = assess_with_filename(&ranked(0.7, 0.3), "ai_generated.png");
        assert!(verdict.is_deepfake);
        assert_eq!(verdict.confidence, 90);

        // Even a dominant real score loses to the filename hint.
        let verdict = assess_with_filename(&ranked(0.02, 0.98), "deepfake_sample.jpg");
        assert!(verdict.is_deepfake);
    }

    #[test]
    fn test_filename_needs_nonzero_fake_signal() {
        // At 0.01 the fake score is treated as noise and the margin rule
        // runs instead: 0.01 < 0.99 - 0.15.
        let verdict = assess_with_filename(&ranked(0.01, 0.99), "fake.png");
        assert!(!verdict.is_deepfake);
        assert_eq!(verdict.confidence, 99);
    }

    #[test]
    fn filename_hints_match_case_insensitively() {
        assert!(filename_suggests_fake("SYNTH-01.png"));
        assert!(filename_suggests_fake("my-AI-art.jpg"));
        assert!(filename_suggests_fake("generated.webp"));
        assert!(!filename_suggests_fake("vacation.jpg"));
    }

    #[test]
    fn single_confident_real_is_not_deepfake() {
        let verdict = assess_with_filename(&single("real", 0.8), "photo.jpg");
        assert!(!verdict.is_deepfake);
        assert_eq!(verdict.confidence, 80);
    }

    #[test]
    fn single_fake_label_is_deepfake() {
        let verdict = assess_with_filename(&single("fake", 0.9), "photo.jpg");
        assert!(verdict.is_deepfake);
        // floor((1 - 0.9) * 100) + 20
        assert_eq!(verdict.confidence, 29);
    }

    #[test]
    fn single_uncertain_unlabeled_score_counts_as_fake() {
        let verdict = assess_with_filename(&single("portrait", 0.5), "photo.jpg");
        assert!(verdict.is_deepfake);
        assert_eq!(verdict.confidence, 70);
    }

    #[test]
    fn single_uncertain_real_label_stays_real() {
        let verdict = assess_with_filename(&single("real", 0.5), "photo.jpg");
        assert!(!verdict.is_deepfake);
        assert_eq!(verdict.confidence, 50);
    }

    #[test]
    fn single_confidence_is_capped_at_95() {
        let verdict = assess_with_filename(&single("fake", 0.01), "photo.jpg");
        assert!(verdict.is_deepfake);
        assert_eq!(verdict.confidence, 95);
    }

    #[test]
    fn single_filename_hint_forces_deepfake() {
        let verdict = assess_with_filename(&single("real", 0.99), "fake_portrait.jpg");
        assert!(verdict.is_deepfake);
        // floor((1 - 0.99) * 100) + 20, within the cap.
        assert_eq!(verdict.confidence, 21);
    }
}
