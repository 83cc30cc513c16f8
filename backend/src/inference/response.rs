use serde::Deserialize;
use shared::{Prediction, RawOutcome, SinglePrediction};

/// Response payload from the image-classification endpoint.
///
/// The hosted model normally answers with a ranked list of label/score
/// entries, but some deployments return a single prediction object instead,
/// possibly with fields missing. Anything else fails deserialization and is
/// reported as an unexpected format upstream.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ModelResponse {
    Ranked(Vec<Prediction>),
    Single(SinglePrediction),
}

impl From<ModelResponse> for RawOutcome {
    fn from(response: ModelResponse) -> Self {
        match response {
            ModelResponse::Ranked(entries) => RawOutcome::AllScores(entries),
            ModelResponse::Single(prediction) => RawOutcome::Prediction(prediction),
        }
    }
}
