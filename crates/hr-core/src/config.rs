//! Configuration types and loading

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub two_factor: TwoFactorConfig,
    pub email: EmailConfig,
    pub storage: StorageConfig,
    pub integrations: IntegrationConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub pool_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size_bytes: usize,
    /// Allowed CORS origin for the SPA; `None` allows any origin
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret for user session tokens
    pub jwt_secret: String,
    /// User token lifetime in seconds
    pub token_expiration_seconds: u64,
    /// Secret shared with the sibling HR modules
    pub service_jwt_secret: String,
    /// Service token lifetime in seconds
    pub service_token_expiration_seconds: u64,
    pub password_min_length: usize,
    /// Admin account created at startup when missing
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwoFactorConfig {
    /// Require an emailed code for every login
    pub enabled: bool,
    pub code_ttl_seconds: u64,
    pub max_attempts: u32,
    /// Interval of the background purge of expired codes
    pub purge_interval_seconds: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmailDeliveryMethod {
    /// Write outgoing mail to the log
    #[default]
    Log,
    /// Keep outgoing mail in memory
    Test,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub delivery_method: EmailDeliveryMethod,
    pub from_address: String,
    pub from_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Local upload directory
    pub local_path: String,
    /// Public URL prefix for stored files
    pub base_url: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntegrationConfig {
    /// HR1 time tracking
    pub hr1_url: String,
    /// HR2 training
    pub hr2_url: String,
    /// HR3 violations
    pub hr3_url: String,
    pub finance_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ScoringConfig {
    pub attendance_weight: f64,
    pub training_weight: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgres://hr:hr@localhost/hr_portal".to_string(),
                pool_size: 10,
                pool_timeout_seconds: 5,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_body_size_bytes: 10 * 1024 * 1024,
                cors_origin: None,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                token_expiration_seconds: 86400,
                service_jwt_secret: "change-me-service-secret".to_string(),
                service_token_expiration_seconds: 300,
                password_min_length: 8,
                bootstrap_admin: None,
            },
            two_factor: TwoFactorConfig {
                enabled: false,
                code_ttl_seconds: 300,
                max_attempts: 5,
                purge_interval_seconds: 60,
            },
            email: EmailConfig {
                delivery_method: EmailDeliveryMethod::Log,
                from_address: "hr-portal@example.com".to_string(),
                from_name: "HR Portal".to_string(),
            },
            storage: StorageConfig {
                local_path: "./uploads".to_string(),
                base_url: "http://localhost:5000/uploads".to_string(),
                max_upload_bytes: 10 * 1024 * 1024,
            },
            integrations: IntegrationConfig {
                hr1_url: "http://localhost:5001".to_string(),
                hr2_url: "http://localhost:5002".to_string(),
                hr3_url: "http://localhost:5003".to_string(),
                finance_url: "http://localhost:5010".to_string(),
                timeout_seconds: 10,
            },
            scoring: ScoringConfig {
                attendance_weight: 0.6,
                training_weight: 0.4,
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

fn bool_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    lookup(key).map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay the defaults with whatever `lookup` returns per variable name
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Database
        if let Some(url) = lookup("DATABASE_URL") {
            config.database.url = url;
        }
        if let Some(size) = parse_var(&lookup, "DATABASE_POOL_SIZE")? {
            config.database.pool_size = size;
        }

        // Server
        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            config.server.port = port;
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            config.server.cors_origin = Some(origin);
        }

        // Auth
        if let Some(secret) = lookup("JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
        if let Some(expiration) = parse_var(&lookup, "JWT_EXPIRATION_SECONDS")? {
            config.auth.token_expiration_seconds = expiration;
        }
        if let Some(secret) = lookup("SERVICE_JWT_SECRET") {
            config.auth.service_jwt_secret = secret;
        }

        if let (Some(email), Some(password)) = (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD"))
        {
            config.auth.bootstrap_admin = Some(BootstrapAdmin { email, password });
        }

        // Two-factor
        if let Some(enabled) = bool_var(&lookup, "TWO_FACTOR_ENABLED") {
            config.two_factor.enabled = enabled;
        }
        if let Some(ttl) = parse_var(&lookup, "TWO_FACTOR_CODE_TTL_SECONDS")? {
            config.two_factor.code_ttl_seconds = ttl;
        }
        if let Some(attempts) = parse_var(&lookup, "TWO_FACTOR_MAX_ATTEMPTS")? {
            config.two_factor.max_attempts = attempts;
        }

        // Email
        if let Some(from) = lookup("SMTP_FROM") {
            config.email.from_address = from;
        }
        if let Some(method) = lookup("EMAIL_DELIVERY") {
            config.email.delivery_method = match method.to_lowercase().as_str() {
                "log" => EmailDeliveryMethod::Log,
                "test" => EmailDeliveryMethod::Test,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "EMAIL_DELIVERY".to_string(),
                        message: format!("unknown delivery method '{}'", other),
                    })
                }
            };
        }

        // Storage
        if let Some(path) = lookup("UPLOAD_PATH") {
            config.storage.local_path = path;
        }
        if let Some(base_url) = lookup("UPLOAD_BASE_URL") {
            config.storage.base_url = base_url;
        }
        if let Some(max) = parse_var(&lookup, "UPLOAD_MAX_BYTES")? {
            config.storage.max_upload_bytes = max;
        }

        // Sibling HR modules
        if let Some(url) = lookup("HR1_API_URL") {
            config.integrations.hr1_url = url;
        }
        if let Some(url) = lookup("HR2_API_URL") {
            config.integrations.hr2_url = url;
        }
        if let Some(url) = lookup("HR3_API_URL") {
            config.integrations.hr3_url = url;
        }
        if let Some(url) = lookup("FINANCE_API_URL") {
            config.integrations.finance_url = url;
        }
        if let Some(timeout) = parse_var(&lookup, "INTEGRATION_TIMEOUT_SECONDS")? {
            config.integrations.timeout_seconds = timeout;
        }

        // Scoring
        if let Some(weight) = parse_var(&lookup, "SCORE_ATTENDANCE_WEIGHT")? {
            config.scoring.attendance_weight = weight;
        }
        if let Some(weight) = parse_var(&lookup, "SCORE_TRAINING_WEIGHT")? {
            config.scoring.training_weight = weight;
        }

        if config.auth.jwt_secret == AppConfig::default().auth.jwt_secret {
            tracing::warn!("JWT_SECRET not set, using the development default");
        }

        Ok(config)
    }

    /// Get the server address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::SocketAddr;
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.pool_size, 10);
        assert!(!config.two_factor.enabled);
        assert_eq!(config.email.delivery_method, EmailDeliveryMethod::Log);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let scoring = AppConfig::default().scoring;
        assert!((scoring.attendance_weight + scoring.training_weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_server_addr() {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        let addr = config.server_addr();
        assert_eq!(addr.port(), 5000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_unparseable_host_falls_back() {
        let mut config = AppConfig::default();
        config.server.host = "not-an-ip".to_string();
        assert!(config.server_addr().ip().is_unspecified());
    }

    #[test]
    fn test_lookup_overlays_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgres://hr:secret@db/hr"),
            ("PORT", "8080"),
            ("TWO_FACTOR_ENABLED", "yes"),
            ("EMAIL_DELIVERY", "TEST"),
            ("SCORE_ATTENDANCE_WEIGHT", "0.5"),
            ("SCORE_TRAINING_WEIGHT", "0.5"),
        ])
        .unwrap();

        assert_eq!(config.database.url, "postgres://hr:secret@db/hr");
        assert_eq!(config.server.port, 8080);
        assert!(config.two_factor.enabled);
        assert_eq!(config.email.delivery_method, EmailDeliveryMethod::Test);
        assert_eq!(config.scoring.attendance_weight, 0.5);
        assert_eq!(config.scoring.training_weight, 0.5);
        // untouched values keep their defaults
        assert_eq!(config.database.pool_size, 10);
    }

    #[test]
    fn test_empty_lookup_matches_defaults() {
        let config = load(&[]).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.auth.jwt_secret, defaults.auth.jwt_secret);
        assert!(config.auth.bootstrap_admin.is_none());
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        match err {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, "PORT"),
        }

        let err = load(&[("UPLOAD_MAX_BYTES", "-1")]).unwrap_err();
        assert!(err.to_string().contains("UPLOAD_MAX_BYTES"));
    }

    #[test]
    fn test_unknown_delivery_method_rejected() {
        let err = load(&[("EMAIL_DELIVERY", "pigeon")]).unwrap_err();
        let ConfigError::InvalidValue { key, message } = err;
        assert_eq!(key, "EMAIL_DELIVERY");
        assert!(message.contains("pigeon"));
    }

    #[test]
    fn test_bootstrap_admin_needs_both_variables() {
        let config = load(&[("ADMIN_EMAIL", "root@example.com")]).unwrap();
        assert!(config.auth.bootstrap_admin.is_none());

        let config = load(&[("ADMIN_PASSWORD", "Sup3rSecret!")]).unwrap();
        assert!(config.auth.bootstrap_admin.is_none());

        let config = load(&[
            ("ADMIN_EMAIL", "root@example.com"),
            ("ADMIN_PASSWORD", "Sup3rSecret!"),
        ])
        .unwrap();
        let admin = config.auth.bootstrap_admin.unwrap();
        assert_eq!(admin.email, "root@example.com");
        assert_eq!(admin.password, "Sup3rSecret!");
    }
}
