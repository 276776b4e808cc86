//! Shared HTTP plumbing for outbound calls

use std::sync::Arc;
use std::time::Duration;

use hr_auth::JwtService;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{IntegrationError, IntegrationResult};

/// Name this portal uses as the subject of its service tokens
pub const SERVICE_NAME: &str = "hr4-portal";

/// Error bodies are cut to this many characters in errors and logs
const MAX_ERROR_BODY: usize = 512;

/// reqwest client that signs every request with a service token
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    jwt: Arc<JwtService>,
    token_ttl_seconds: u64,
}

impl ServiceClient {
    pub fn new(
        jwt: Arc<JwtService>,
        timeout: Duration,
        token_ttl_seconds: u64,
    ) -> IntegrationResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hr-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IntegrationError::Transport {
                service: "http",
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            jwt,
            token_ttl_seconds,
        })
    }

    fn bearer(&self) -> IntegrationResult<String> {
        self.jwt
            .create_service_token(SERVICE_NAME, self.token_ttl_seconds)
            .map_err(|e| IntegrationError::Token(e.to_string()))
    }

    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: Url,
    ) -> IntegrationResult<T> {
        let request = self.http.get(url).bearer_auth(self.bearer()?);
        self.send(service, request).await
    }

    #[instrument(skip(self, url, body), fields(url = %url))]
    pub async fn post_json<B, T>(
        &self,
        service: &'static str,
        url: Url,
        body: &B,
    ) -> IntegrationResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.http.post(url).bearer_auth(self.bearer()?).json(body);
        self.send(service, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> IntegrationResult<T> {
        let response = request.send().await.map_err(|e| {
            warn!(service, error = %e, "Request failed");
            IntegrationError::Transport {
                service,
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            warn!(service, status = status.as_u16(), %body, "Unexpected status");
            return Err(IntegrationError::Status {
                service,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| IntegrationError::Transport {
            service,
            message: e.to_string(),
        })?;
        debug!(service, size = bytes.len(), "Response received");

        serde_json::from_slice(&bytes).map_err(|e| IntegrationError::Decode {
            service,
            message: e.to_string(),
        })
    }
}

/// List payloads arrive either bare or wrapped in `{"data": [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { data: items } => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_shapes() {
        let bare: Listing<u32> = serde_json::from_str("[1, 2]").unwrap();
        let wrapped: Listing<u32> = serde_json::from_str(r#"{"data": [3], "total": 1}"#).unwrap();
        assert_eq!(bare.into_vec(), vec![1, 2]);
        assert_eq!(wrapped.into_vec(), vec![3]);
        assert!(serde_json::from_str::<Listing<u32>>(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn test_service_token_is_signed() {
        let jwt = Arc::new(JwtService::new(b"service-secret-at-least-32-bytes!"));
        let client = ServiceClient::new(jwt.clone(), Duration::from_secs(5), 60).unwrap();

        let token = client.bearer().unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, SERVICE_NAME);
        assert_eq!(claims.kind, hr_auth::TokenKind::Service);
    }
}
