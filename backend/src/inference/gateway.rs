use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, StatusCode};
use url::Url;

use super::response::ModelResponse;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Invalid Hugging Face API key")]
    Unauthorized,
    #[error("Model is currently loading. Please try again in a few minutes.")]
    ModelLoading,
    #[error(
        "Network error when connecting to Hugging Face API. Please check your internet connection."
    )]
    Network(#[source] reqwest::Error),
    #[error("Failed to analyze image with AI model: upstream returned status {0}")]
    UpstreamStatus(StatusCode),
    #[error("Unexpected response format from API")]
    UnexpectedFormat,
}

/// Thin wrapper around the external image-classification endpoint. One
/// attempt per request, no retries; the image is sent as-is and never
/// persisted here.
#[derive(Clone)]
pub struct InferenceGateway {
    http_client: HttpClient,
    endpoint: Url,
    api_token: String,
}

impl InferenceGateway {
    pub fn new(api_token: String, endpoint: Url) -> Self {
        Self {
            http_client: HttpClient::new(),
            endpoint,
            api_token,
        }
    }

    pub async fn classify(&self, image: &[u8]) -> Result<ModelResponse, GatewayError> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(GatewayError::Network)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(GatewayError::Unauthorized),
            StatusCode::SERVICE_UNAVAILABLE => return Err(GatewayError::ModelLoading),
            status if !status.is_success() => return Err(GatewayError::UpstreamStatus(status)),
            _ => {}
        }

        response.json::<ModelResponse>().await.map_err(|err| {
            if err.is_decode() {
                GatewayError::UnexpectedFormat
            } else {
                GatewayError::Network(err)
            }
        })
    }
}
