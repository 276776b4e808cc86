//! Health checks
//!
//! `/health` and `/health/live` only report that the process answers.
//! `/health/ready` pings the database and looks at the upload directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use hr_db::Database;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }

    /// The worse of two statuses
    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unhealthy, _) | (_, Self::Unhealthy) => Self::Unhealthy,
            (Self::Degraded, _) | (_, Self::Degraded) => Self::Degraded,
            _ => Self::Healthy,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        if self.status.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Timeout for a single component check
    pub check_timeout: Duration,
    /// How long a report is reused
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
            cache_duration: Duration::from_secs(10),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    database: Option<Database>,
    upload_dir: Option<PathBuf>,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            database: None,
            upload_dir: None,
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_upload_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(path.into());
        self
    }

    /// Cached report, refreshed once it is older than `cache_duration`
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });

        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let mut components = Vec::new();

        if let Some(ref database) = self.database {
            components.push(self.check_database(database).await);
        }
        if let Some(ref dir) = self.upload_dir {
            components.push(check_upload_dir(dir).await);
        }

        let status = components
            .iter()
            .fold(HealthStatus::Healthy, |acc, c| acc.combine(c.status));

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_database(&self, database: &Database) -> ComponentHealth {
        let start = Instant::now();

        let (status, message) =
            match tokio::time::timeout(self.config.check_timeout, database.ping()).await {
                Ok(Ok(())) => (HealthStatus::Healthy, "Connected".to_string()),
                Ok(Err(e)) => {
                    warn!(error = %e, "Database health check failed");
                    (HealthStatus::Unhealthy, format!("Query failed: {}", e))
                }
                Err(_) => {
                    warn!("Database health check timed out");
                    (HealthStatus::Unhealthy, "Timed out".to_string())
                }
            };

        let stats = database.stats();
        ComponentHealth {
            name: "database".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
            details: Some(serde_json::json!({
                "type": "postgresql",
                "poolSize": stats.size,
                "idleConnections": stats.idle,
            })),
        }
    }
}

/// A missing upload directory degrades the service without taking it down
async fn check_upload_dir(dir: &Path) -> ComponentHealth {
    let start = Instant::now();

    let (status, message) = match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => (HealthStatus::Healthy, "Available".to_string()),
        Ok(_) => (HealthStatus::Degraded, "Not a directory".to_string()),
        Err(e) => (HealthStatus::Degraded, format!("Unavailable: {}", e)),
    };

    ComponentHealth {
        name: "storage".to_string(),
        status,
        message: Some(message),
        response_time_ms: start.elapsed().as_millis() as u64,
        details: Some(serde_json::json!({ "path": dir.display().to_string() })),
    }
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// GET /health/live
pub async fn liveness() -> &'static str {
    "OK"
}

/// GET /health/ready
pub async fn readiness(
    State(checker): State<Arc<HealthChecker>>,
) -> (StatusCode, Json<HealthReport>) {
    let report = checker.check().await;
    (report.http_status(), Json(report))
}
