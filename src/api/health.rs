/// Liveness and runtime stats
///
/// GET /health always answers 200; a broken database shows up as
/// `database: "down"` rather than as a failing probe.

use super::envelope::Envelope;
use super::AppState;
use axum::extract::State;
use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthReport {
    #[schema(example = "ok")]
    pub status: String,
    /// Human readable, e.g. "1h 2m 3s"
    pub uptime: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub os: String,
    pub arch: String,
    pub cpu_cores: usize,
    pub tokio_workers: usize,
    pub alive_tasks: usize,
    /// Database driver name
    pub driver: String,
    /// "up" or "down"
    pub database: String,
}

pub async fn health(State(state): State<AppState>) -> Envelope<HealthReport> {
    let db = state.storage.database();
    let database = if db.ping().await { "up" } else { "down" };

    // Whole seconds keep the humantime rendering short
    let uptime = Duration::from_secs(state.started_at.elapsed().as_secs());
    let metrics = tokio::runtime::Handle::current().metrics();

    let report = HealthReport {
        status: "ok".to_string(),
        uptime: humantime::format_duration(uptime).to_string(),
        uptime_seconds: uptime.as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu_cores: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
        tokio_workers: metrics.num_workers(),
        alive_tasks: metrics.num_alive_tasks(),
        driver: db.driver().to_string(),
        database: database.to_string(),
    };

    Envelope::ok(report, "Service is healthy")
}
