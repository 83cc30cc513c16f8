use shared::HealthResponse;
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// Ports probed in order. The server starts at the first and falls forward
/// when a port is taken.
pub const CANDIDATE_PORTS: [u16; 3] = [3000, 3001, 3002];
/// Further attempts on the last candidate once the sweep comes up empty.
pub const MAX_RETRIES: u32 = 3;
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Full discovery re-runs on this interval regardless of current status.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorState {
    Idle,
    Probing { candidate: usize },
    Backoff { port: u16, attempt: u32 },
    Running { port: u16 },
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Checking,
    Running,
    Error,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ServerStatus::Checking => "checking",
            ServerStatus::Running => "running",
            ServerStatus::Error => "error",
        };
        f.write_str(text)
    }
}

/// Where the client currently believes the server lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerLocation {
    pub port: u16,
    pub status: ServerStatus,
}

impl Default for ServerLocation {
    fn default() -> Self {
        Self {
            port: CANDIDATE_PORTS[0],
            status: ServerStatus::Checking,
        }
    }
}

impl LocatorState {
    pub fn start() -> Self {
        LocatorState::Probing { candidate: 0 }
    }

    /// Port the next probe targets, or None once the sweep has settled.
    pub fn probe_port(&self) -> Option<u16> {
        match *self {
            LocatorState::Idle => Some(CANDIDATE_PORTS[0]),
            LocatorState::Probing { candidate } => CANDIDATE_PORTS.get(candidate).copied(),
            LocatorState::Backoff { port, .. } => Some(port),
            LocatorState::Running { .. } | LocatorState::Unreachable => None,
        }
    }
}

/// Delay before retry number `attempt + 1` on the final candidate:
/// 1s, 2s, 4s.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt)
}

/// Pure transition function of the discovery state machine. Returns the next
/// state and the delay to wait before the next probe, if any.
pub fn advance(state: LocatorState, outcome: ProbeOutcome) -> (LocatorState, Option<Duration>) {
    match state {
        LocatorState::Idle => (LocatorState::start(), None),
        LocatorState::Probing { candidate } => match outcome {
            ProbeOutcome::Healthy => (
                LocatorState::Running {
                    port: CANDIDATE_PORTS[candidate],
                },
                None,
            ),
            ProbeOutcome::Unhealthy => {
                if candidate + 1 < CANDIDATE_PORTS.len() {
                    (
                        LocatorState::Probing {
                            candidate: candidate + 1,
                        },
                        None,
                    )
                } else {
                    let port = CANDIDATE_PORTS[CANDIDATE_PORTS.len() - 1];
                    (
                        LocatorState::Backoff { port, attempt: 0 },
                        Some(backoff_delay(0)),
                    )
                }
            }
        },
        LocatorState::Backoff { port, attempt } => match outcome {
            ProbeOutcome::Healthy => (LocatorState::Running { port }, None),
            ProbeOutcome::Unhealthy => {
                let next = attempt + 1;
                if next < MAX_RETRIES {
                    (
                        LocatorState::Backoff {
                            port,
                            attempt: next,
                        },
                        Some(backoff_delay(next)),
                    )
                } else {
                    (LocatorState::Unreachable, None)
                }
            }
        },
        terminal => (terminal, None),
    }
}

/// Readiness is decided by the response body, not transport success alone;
/// a 200 carrying `status != "ok"` still counts as down.
pub fn classify_health(http_ok: bool, body: Option<HealthResponse>) -> ProbeOutcome {
    match body {
        Some(body) if http_ok && body.status == "ok" => ProbeOutcome::Healthy,
        _ => ProbeOutcome::Unhealthy,
    }
}

/// Finds the server by probing candidate ports and keeps the cached
/// location fresh on a fixed poll interval.
pub struct ServerLocator {
    http_client: reqwest::Client,
    host: String,
}

impl Default for ServerLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerLocator {
    pub fn new() -> Self {
        Self::with_host("localhost")
    }

    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            host: host.into(),
        }
    }

    pub async fn probe(&self, port: u16) -> ProbeOutcome {
        let url = format!("http://{}:{}/api/health", self.host, port);
        let response = match self
            .http_client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log::debug!("Health probe on port {} failed: {}", port, err);
                return ProbeOutcome::Unhealthy;
            }
        };

        let http_ok = response.status().is_success();
        let body = response.json::<HealthResponse>().await.ok();
        if let Some(HealthResponse {
            status,
            message: Some(message),
        }) = &body
        {
            if status != "ok" {
                log::debug!("Server on port {} reported: {}", port, message);
            }
        }
        classify_health(http_ok, body)
    }

    /// Run one full discovery sweep: each candidate port once, then the
    /// bounded backoff retries on the last one.
    pub async fn discover(&self) -> LocatorState {
        let mut state = LocatorState::start();
        while let Some(port) = state.probe_port() {
            let outcome = self.probe(port).await;
            let (next, delay) = advance(state, outcome);
            state = next;
            if let Some(delay) = delay {
                log::info!(
                    "Server not responding on port {}. Retrying in {}s...",
                    port,
                    delay.as_secs()
                );
                sleep(delay).await;
            }
        }
        state
    }

    /// Re-run discovery forever on the poll interval, publishing each result.
    /// Detects a server that comes up late or moves to another port.
    pub async fn run(&self, updates: watch::Sender<ServerLocation>) {
        loop {
            let state = self.discover().await;
            updates.send_modify(|location| match state {
                LocatorState::Running { port } => {
                    location.port = port;
                    location.status = ServerStatus::Running;
                }
                _ => {
                    location.status = ServerStatus::Error;
                }
            });
            sleep(POLL_INTERVAL).await;
        }
    }
}
