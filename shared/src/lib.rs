use serde::{Deserialize, Serialize};

/// One label/score entry from the ranked classification output.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

fn default_single_score() -> f64 {
    0.5
}

/// Single-object classification output. Some deployments answer with a bare
/// object where either field may be absent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SinglePrediction {
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_single_score")]
    pub score: f64,
}

/// Raw model output echoed back in the verdict details, keyed by which
/// response shape the model produced.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum RawOutcome {
    #[serde(rename = "allScores")]
    AllScores(Vec<Prediction>),
    #[serde(rename = "prediction")]
    Prediction(SinglePrediction),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerdictDetails {
    pub fake_score: f64,
    pub real_score: f64,
    #[serde(flatten)]
    pub raw: RawOutcome,
}

/// Final classification result returned by the analyze endpoint.
///
/// `confidence` is an integer percentage, not a calibrated probability, and
/// can exceed 100 on the ranked-response path.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_deepfake: bool,
    pub confidence: u32,
    pub details: VerdictDetails,
}

/// Body of the health endpoint. Readiness is carried in `status`, not in the
/// HTTP status code alone.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verdict_serializes_with_camel_case_and_all_scores() {
        let verdict = Verdict {
            is_deepfake: true,
            confidence: 90,
            details: VerdictDetails {
                fake_score: 0.7,
                real_score: 0.3,
                raw: RawOutcome::AllScores(vec![
                    Prediction {
                        label: "fake".into(),
                        score: 0.7,
                    },
                    Prediction {
                        label: "real".into(),
                        score: 0.3,
                    },
                ]),
            },
        };

        let value = serde_json::to_value(&verdict).unwrap();
        assert_eq!(value["isDeepfake"], json!(true));
        assert_eq!(value["confidence"], json!(90));
        assert_eq!(value["details"]["fakeScore"], json!(0.7));
        assert_eq!(value["details"]["realScore"], json!(0.3));
        assert_eq!(value["details"]["allScores"][0]["label"], json!("fake"));
    }

    #[test]
    fn verdict_serializes_single_prediction_details() {
        let verdict = Verdict {
            is_deepfake: false,
            confidence: 80,
            details: VerdictDetails {
                fake_score: 0.2,
                real_score: 0.8,
                raw: RawOutcome::Prediction(SinglePrediction {
                    label: "real".into(),
                    score: 0.8,
                }),
            },
        };

        let value = serde_json::to_value(&verdict).unwrap();
        assert_eq!(value["details"]["prediction"]["label"], json!("real"));
        assert!(value["details"].get("allScores").is_none());
    }

    #[test]
    fn single_prediction_defaults_missing_fields() {
        let prediction: SinglePrediction = serde_json::from_str("{}").unwrap();
        assert_eq!(prediction.label, "");
        assert_eq!(prediction.score, 0.5);
    }

    #[test]
    fn health_response_round_trips() {
        let body: HealthResponse =
            serde_json::from_value(json!({"status": "error", "message": "no key"})).unwrap();
        assert_eq!(body.status, "error");
        assert_eq!(body.message.as_deref(), Some("no key"));

        let ok = HealthResponse {
            status: "ok".into(),
            message: None,
        };
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"status":"ok"}"#);
    }
}
