//! HR portal server
//!
//! Loads configuration from the environment, connects to PostgreSQL, wires
//! the services and serves the HTTP API until Ctrl+C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Router};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hr_api::AppState;
use hr_attachments::LocalStorage;
use hr_auth::{JwtService, MemoryTwoFactorStore, TwoFactorStore};
use hr_core::config::{AppConfig, ServerConfig};
use hr_db::{
    Database, PgActionReportStore, PgAnnouncementStore, PgBudgetRequestStore, PgComplaintStore,
    PgEmployeeStore, PgMessageStore, PgSuggestionStore, PgUserStore,
};
use hr_integrations::{HttpFinanceGateway, HttpHrModules, ServiceClient, ServiceEndpoints};
use hr_services::{Collaborators, HrServices, Stores};

mod health;

use health::{HealthChecker, HealthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting HR portal"
    );

    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    hr_db::schema::ensure_schema(db.pool())
        .await
        .context("failed to prepare database schema")?;
    info!("Database schema ready");

    tokio::fs::create_dir_all(&config.storage.local_path)
        .await
        .with_context(|| format!("failed to create {}", config.storage.local_path))?;

    let jwt = Arc::new(JwtService::new(config.auth.jwt_secret.as_bytes()));
    let codes = Arc::new(MemoryTwoFactorStore::new(
        config.two_factor.code_ttl_seconds,
        config.two_factor.max_attempts,
    ));

    let services = HrServices::new(
        &config,
        postgres_stores(&db),
        collaborators(&config, jwt.clone(), codes.clone())?,
    );

    if let Some(ref admin) = config.auth.bootstrap_admin {
        let user = services
            .auth
            .ensure_admin(&admin.email, &admin.password)
            .await
            .context("failed to bootstrap admin account")?;
        info!(user_id = user.id, email = %user.email, "Admin account ready");
    }

    let purge = spawn_code_purge(
        codes,
        Duration::from_secs(config.two_factor.purge_interval_seconds.max(1)),
    );

    let health = Arc::new(
        HealthChecker::new(HealthConfig::default())
            .with_database(db.clone())
            .with_upload_dir(&config.storage.local_path),
    );

    let app = build_router(
        &config.server,
        body_limit(&config),
        AppState::new(services, jwt),
        health,
    );

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` filter, human-readable output unless `LOG_FORMAT=json`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,hr_server=debug,hr_api=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

fn postgres_stores(db: &Database) -> Stores {
    let pool = db.pool();
    Stores {
        users: Arc::new(PgUserStore::new(pool.clone())),
        complaints: Arc::new(PgComplaintStore::new(pool.clone())),
        suggestions: Arc::new(PgSuggestionStore::new(pool.clone())),
        budget_requests: Arc::new(PgBudgetRequestStore::new(pool.clone())),
        messages: Arc::new(PgMessageStore::new(pool.clone())),
        announcements: Arc::new(PgAnnouncementStore::new(pool.clone())),
        action_reports: Arc::new(PgActionReportStore::new(pool.clone())),
        employees: Arc::new(PgEmployeeStore::new(pool.clone())),
    }
}

fn collaborators(
    config: &AppConfig,
    jwt: Arc<JwtService>,
    codes: Arc<dyn TwoFactorStore>,
) -> anyhow::Result<Collaborators> {
    // Calls to sibling services are signed with their own secret
    let service_jwt = Arc::new(JwtService::new(config.auth.service_jwt_secret.as_bytes()));
    let client = ServiceClient::new(
        service_jwt,
        Duration::from_secs(config.integrations.timeout_seconds),
        config.auth.service_token_expiration_seconds,
    )?;
    let endpoints = ServiceEndpoints::from_config(&config.integrations)
        .context("invalid sibling service URL")?;

    Ok(Collaborators {
        jwt,
        codes,
        mailer: hr_notifications::sender_for(&config.email),
        storage: Arc::new(LocalStorage::new(
            &config.storage.local_path,
            config.storage.base_url.clone(),
        )),
        modules: Arc::new(HttpHrModules::new(client.clone(), endpoints.clone())),
        finance: Arc::new(HttpFinanceGateway::new(client, endpoints)),
    })
}

/// Large enough for JSON bodies and for a full-size upload with its framing
fn body_limit(config: &AppConfig) -> usize {
    config
        .server
        .max_body_size_bytes
        .max(config.storage.max_upload_bytes + hr_api::MULTIPART_OVERHEAD)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match config.cors_origin.as_deref() {
        None | Some("*") => layer.allow_origin(Any),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                warn!(origin, "Invalid CORS origin, allowing any origin");
                layer.allow_origin(Any)
            }
        },
    }
}

/// Build the application router
fn build_router(
    config: &ServerConfig,
    body_limit: usize,
    state: AppState,
    health: Arc<HealthChecker>,
) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    Router::new()
        .merge(health_routes)
        .merge(hr_api::router(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(config)),
        )
}

/// Drop expired and exhausted verification codes on a fixed interval
fn spawn_code_purge(codes: Arc<dyn TwoFactorStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = codes.purge_expired();
            if purged > 0 {
                debug!(purged, "Expired verification codes removed");
            }
        }
    })
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use hr_attachments::MemoryStorage;
    use hr_notifications::MemoryEmailSender;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = AppConfig::default();
        test_app_with_limit(body_limit(&config))
    }

    fn test_app_with_limit(limit: usize) -> Router {
        let config = AppConfig::default();
        let jwt = Arc::new(JwtService::new(config.auth.jwt_secret.as_bytes()));
        let client = ServiceClient::new(
            Arc::new(JwtService::new(config.auth.service_jwt_secret.as_bytes())),
            Duration::from_secs(1),
            60,
        )
        .unwrap();
        let endpoints = ServiceEndpoints::from_config(&config.integrations).unwrap();

        let services = HrServices::new(
            &config,
            Stores::memory(),
            Collaborators {
                jwt: jwt.clone(),
                codes: Arc::new(MemoryTwoFactorStore::new(300, 5)),
                mailer: Arc::new(MemoryEmailSender::new()),
                storage: Arc::new(MemoryStorage::new()),
                modules: Arc::new(HttpHrModules::new(client.clone(), endpoints.clone())),
                finance: Arc::new(HttpFinanceGateway::new(client, endpoints)),
            },
        );
        let health = Arc::new(
            HealthChecker::new(HealthConfig::default()).with_upload_dir(std::env::temp_dir()),
        );

        build_router(&config.server, limit, AppState::new(services, jwt), health)
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = get(test_app(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let response = get(test_app(), "/health/live").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_reports_components() {
        let response = get(test_app(), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let report: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["status"], "healthy");
        assert_eq!(report["components"][0]["name"], "storage");
    }

    #[tokio::test]
    async fn test_api_is_mounted() {
        let response = get(test_app(), "/api/auth/me").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/complaints")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let padding = "x".repeat(4096);
        let body = serde_json::json!({
            "employeeCode": "EMP-1",
            "firstName": padding,
            "lastName": "Lim",
            "email": "rosa@example.com",
            "password": "assembly-line-7",
        });
        let response = test_app_with_limit(1024)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_body_limit_covers_uploads() {
        let config = AppConfig::default();
        assert!(body_limit(&config) > config.storage.max_upload_bytes);
        assert!(body_limit(&config) >= config.server.max_body_size_bytes);
    }
}
