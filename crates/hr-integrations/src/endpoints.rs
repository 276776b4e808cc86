//! Base URLs of the sibling services

use hr_core::config::IntegrationConfig;
use url::Url;

use crate::error::{IntegrationError, IntegrationResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub hr1: Url,
    pub hr2: Url,
    pub hr3: Url,
    pub finance: Url,
}

impl ServiceEndpoints {
    pub fn from_config(config: &IntegrationConfig) -> IntegrationResult<Self> {
        Ok(Self {
            hr1: parse_base("hr1", &config.hr1_url)?,
            hr2: parse_base("hr2", &config.hr2_url)?,
            hr3: parse_base("hr3", &config.hr3_url)?,
            finance: parse_base("finance", &config.finance_url)?,
        })
    }
}

/// Parse a base URL so that relative joins append to its path
fn parse_base(service: &'static str, raw: &str) -> IntegrationResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| IntegrationError::InvalidUrl {
        service,
        message: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(IntegrationError::InvalidUrl {
            service,
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve `path` below a base URL
pub fn join(service: &'static str, base: &Url, path: &str) -> IntegrationResult<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| IntegrationError::InvalidUrl {
            service,
            message: e.to_string(),
        })
}
