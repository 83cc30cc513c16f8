use std::env;
use url::Url;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/dima806/deepfake_vs_real_image_detection";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),
    #[error("Invalid INFERENCE_URL value: {0}")]
    InvalidInferenceUrl(String),
}

/// Process-wide configuration, read once at startup and treated as
/// read-only afterwards.
#[derive(Clone)]
pub struct AppConfig {
    /// Hugging Face API token. The server still boots without one, but
    /// health reports not-ready and analyze requests fail until it is set.
    pub api_token: Option<String>,
    /// Port the negotiator starts binding from.
    pub preferred_port: u16,
    pub inference_url: Url,
    /// Testing affordance: when enabled, filenames containing fake-ish
    /// keywords bias the verdict towards deepfake. Kept behind this switch
    /// so it cannot be mistaken for a content-derived signal.
    pub filename_hints: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = env::var("HUGGINGFACE_API_KEY")
            .ok()
            .filter(|token| !token.is_empty());

        let preferred_port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let inference_url = match env::var("INFERENCE_URL") {
            Ok(raw) => Url::parse(&raw).map_err(|_| ConfigError::InvalidInferenceUrl(raw))?,
            Err(_) => Url::parse(DEFAULT_INFERENCE_URL)
                .map_err(|_| ConfigError::InvalidInferenceUrl(DEFAULT_INFERENCE_URL.into()))?,
        };

        let filename_hints = env::var("FILENAME_HINTS")
            .map(|raw| raw != "0" && !raw.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Ok(Self {
            api_token,
            preferred_port,
            inference_url,
            filename_hints,
        })
    }
}
