use shared::{ErrorResponse, Verdict};
use std::path::Path;
use std::time::Duration;

use crate::locator::{ServerLocation, ServerStatus};

/// Client-side pre-check, tighter than the server's 10 MiB cap.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
/// Inference can take a while on a cold model.
pub const ANALYZE_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Server is not running. Start the backend first.")]
    ServerNotRunning,
    #[error("File size too large. Please select an image under 5MB.")]
    FileTooLarge,
    #[error("Only image files are supported")]
    NotAnImage,
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{error}")]
    Api {
        error: String,
        details: Option<String>,
    },
}

fn mime_for_extension(path: &Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_lowercase()
        .as_str()
    {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Uploads images to the analyze endpoint of a located server.
pub struct AnalyzeClient {
    http_client: reqwest::Client,
    host: String,
}

impl Default for AnalyzeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzeClient {
    pub fn new() -> Self {
        Self::with_host("localhost")
    }

    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            host: host.into(),
        }
    }

    pub async fn analyze(
        &self,
        location: ServerLocation,
        path: &Path,
    ) -> Result<Verdict, ClientError> {
        if location.status != ServerStatus::Running {
            return Err(ClientError::ServerNotRunning);
        }

        let mime = mime_for_extension(path).ok_or(ClientError::NotAnImage)?;

        let data = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if data.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(ClientError::FileTooLarge);
        }

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        log::info!("Sending image for analysis: {}", filename);

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename)
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(format!(
                "http://{}:{}/api/analyze",
                self.host, location.port
            ))
            .multipart(form)
            .timeout(ANALYZE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.json::<ErrorResponse>().await {
                Ok(body) => body,
                Err(_) => ErrorResponse {
                    error: format!("Analysis failed with status {}", status),
                    details: None,
                },
            };
            return Err(ClientError::Api {
                error: body.error,
                details: body.details,
            });
        }

        Ok(response.json::<Verdict>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_image_extensions_map_to_mime_types() {
        assert_eq!(mime_for_extension(Path::new("a.jpg")), Some("image/jpeg"));
        assert_eq!(mime_for_extension(Path::new("a.JPEG")), Some("image/jpeg"));
        assert_eq!(mime_for_extension(Path::new("a.png")), Some("image/png"));
        assert_eq!(mime_for_extension(Path::new("a.webp")), Some("image/webp"));
    }

    #[test]
    fn non_image_paths_are_rejected() {
        assert_eq!(mime_for_extension(Path::new("notes.txt")), None);
        assert_eq!(mime_for_extension(Path::new("no_extension")), None);
    }

    #[tokio::test]
    async fn analyze_refuses_when_server_is_not_running() {
        let client = AnalyzeClient::new();
        let location = ServerLocation {
            port: 3000,
            status: ServerStatus::Error,
        };
        let result = client.analyze(location, Path::new("photo.jpg")).await;
        assert!(matches!(result, Err(ClientError::ServerNotRunning)));
    }
}
