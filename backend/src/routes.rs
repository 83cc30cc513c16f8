use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use serde_json::json;
use shared::{HealthResponse, Verdict, VerdictDetails};
use std::io::Write;

use crate::analysis::confidence::{assess, filename_suggests_fake};
use crate::analysis::normalize::normalize;
use crate::config::AppConfig;
use crate::inference::gateway::InferenceGateway;
use crate::uploads::{MAX_UPLOAD_BYTES, StoredUpload, UploadError, UploadStore};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/analyze").route(web::post().to(analyze)));
}

async fn health(config: web::Data<AppConfig>) -> HttpResponse {
    if config.api_token.is_none() {
        return HttpResponse::ServiceUnavailable().json(HealthResponse {
            status: "error".into(),
            message: Some("HUGGINGFACE_API_KEY not set".into()),
        });
    }

    HttpResponse::Ok().json(HealthResponse {
        status: "ok".into(),
        message: None,
    })
}

struct ReceivedUpload {
    file: StoredUpload,
    filename: String,
    mime: String,
    size: usize,
}

/// Pull the `file` field out of the multipart body and stash it on disk.
/// The returned guard keeps the temp file alive for the rest of the request.
async fn read_upload(
    payload: &mut Multipart,
    store: &UploadStore,
) -> Result<ReceivedUpload, UploadError> {
    while let Ok(Some(mut field)) = payload.try_next().await {
        let Some(disposition) = field.content_disposition() else {
            continue;
        };
        if disposition.get_name() != Some("file") {
            continue;
        }
        let filename = disposition.get_filename().unwrap_or("").to_string();

        let mime = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        if !mime.starts_with("image/") {
            return Err(UploadError::NotAnImage);
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|err| UploadError::Multipart(err.to_string()))?;
            if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(UploadError::TooLarge);
            }
            data.write_all(&chunk)?;
        }

        let size = data.len();
        let file = store.stash(&data)?;
        return Ok(ReceivedUpload {
            file,
            filename,
            mime,
            size,
        });
    }

    Err(UploadError::NoFile)
}

fn processing_failure(details: String) -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({
        "error": "Error analyzing file",
        "details": details,
    }))
}

async fn analyze(
    config: web::Data<AppConfig>,
    gateway: web::Data<InferenceGateway>,
    store: web::Data<UploadStore>,
    mut payload: Multipart,
) -> HttpResponse {
    info!("Received analyze request");

    let upload = match read_upload(&mut payload, &store).await {
        Ok(upload) => upload,
        Err(err) if err.is_client_error() => {
            error!("Rejected upload: {}", err);
            return HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
        }
        Err(err) => {
            error!("Upload intake failed: {}", err);
            return processing_failure(err.to_string());
        }
    };

    info!(
        "File received: {} {} {} bytes",
        upload.filename, upload.mime, upload.size
    );

    if config.api_token.is_none() {
        error!("API key missing");
        return processing_failure(
            "HUGGINGFACE_API_KEY not set. Please configure the API key.".into(),
        );
    }

    let image = match upload.file.read() {
        Ok(image) => image,
        Err(err) => {
            error!("Failed to read stored upload: {}", err);
            return processing_failure(err.to_string());
        }
    };

    let raw = match gateway.classify(&image).await {
        Ok(raw) => raw,
        Err(err) => {
            error!("Hugging Face API error for {}: {}", upload.filename, err);
            return processing_failure(err.to_string());
        }
    };

    let scores = normalize(&raw);
    let likely_test_fake = config.filename_hints && filename_suggests_fake(&upload.filename);
    let assessment = assess(&raw, &scores, likely_test_fake);

    info!(
        "Classified {}: deepfake={} confidence={} (fake={:.3}, real={:.3}, test hint={})",
        upload.filename,
        assessment.is_deepfake,
        assessment.confidence,
        scores.fake_score,
        scores.real_score,
        likely_test_fake
    );

    let verdict = Verdict {
        is_deepfake: assessment.is_deepfake,
        confidence: assessment.confidence,
        details: VerdictDetails {
            fake_score: scores.fake_score,
            real_score: scores.real_score,
            raw: raw.into(),
        },
    };

    // `upload.file` drops here, removing the temp file on every outcome.
    HttpResponse::Ok().json(verdict)
}
