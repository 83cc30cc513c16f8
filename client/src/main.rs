use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::sync::watch;

use client::api::AnalyzeClient;
use client::locator::{CANDIDATE_PORTS, LocatorState, ServerLocation, ServerLocator, ServerStatus};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let locator = ServerLocator::new();
    match env::args().nth(1).map(PathBuf::from) {
        Some(path) => analyze_once(&locator, &path).await,
        None => watch_server(&locator).await,
    }
}

async fn analyze_once(locator: &ServerLocator, path: &Path) -> ExitCode {
    log::info!("Looking for the analysis server...");
    let LocatorState::Running { port } = locator.discover().await else {
        log::error!(
            "Server is not responding on ports {:?}. Start the backend first.",
            CANDIDATE_PORTS
        );
        return ExitCode::FAILURE;
    };
    log::info!("Connected to server on port {}", port);

    let location = ServerLocation {
        port,
        status: ServerStatus::Running,
    };
    match AnalyzeClient::new().analyze(location, path).await {
        Ok(verdict) => {
            if verdict.is_deepfake {
                log::warn!(
                    "Deepfake detected with confidence {}%",
                    verdict.confidence
                );
            } else {
                log::info!(
                    "Image appears authentic with confidence {}%",
                    verdict.confidence
                );
            }
            match serde_json::to_string_pretty(&verdict) {
                Ok(rendered) => println!("{}", rendered),
                Err(err) => {
                    log::error!("Failed to render verdict: {}", err);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Analysis failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// No image argument: keep polling the server location and log transitions.
async fn watch_server(locator: &ServerLocator) -> ExitCode {
    let (tx, mut rx) = watch::channel(ServerLocation::default());

    let log_updates = async {
        let mut last = *rx.borrow();
        log::info!("Server status: {} (port {})", last.status, last.port);
        while rx.changed().await.is_ok() {
            let location = *rx.borrow();
            if location != last {
                log::info!("Server status: {} (port {})", location.status, location.port);
                last = location;
            }
        }
    };

    tokio::join!(locator.run(tx), log_updates);
    ExitCode::SUCCESS
}
