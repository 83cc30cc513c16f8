mod analysis;
mod config;
mod inference;
mod negotiator;
mod routes;
mod uploads;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use inference::gateway::InferenceGateway;
use negotiator::MAX_BIND_ATTEMPTS;
use routes::configure_routes;
use uploads::UploadStore;

const FRONTEND_ORIGIN: &str = "http://localhost:5173";
const UPLOAD_DIR: &str = "uploads";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|err| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;

    if config.api_token.is_none() {
        log::warn!("HUGGINGFACE_API_KEY environment variable is not set!");
        log::warn!("Health will report not-ready and analyze requests will fail until it is configured.");
        log::warn!("Get a key from: https://huggingface.co/settings/tokens");
    }

    let gateway = InferenceGateway::new(
        config.api_token.clone().unwrap_or_default(),
        config.inference_url.clone(),
    );
    let store = UploadStore::new(UPLOAD_DIR)?;

    let preferred_port = config.preferred_port;
    let app_config = config.clone();
    let factory = move || {
        App::new()
            .wrap(
                Cors::default()
                    .allowed_origin(FRONTEND_ORIGIN)
                    .allowed_methods(vec!["GET", "POST"])
                    .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
                    .max_age(3600),
            )
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(store.clone()))
            .configure(configure_routes)
    };

    let (server, port) = negotiator::negotiate(preferred_port, MAX_BIND_ATTEMPTS, |port| {
        HttpServer::new(factory.clone()).bind(("0.0.0.0", port))
    })
    .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;

    log::info!("Server running on port {}", port);
    if port != preferred_port {
        log::info!(
            "Preferred port {} was taken; clients will discover port {} by probing",
            preferred_port,
            port
        );
    }

    server.run().await
}
