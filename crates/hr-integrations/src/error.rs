//! Integration errors

use hr_core::HrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("{service} is unreachable: {message}")]
    Transport { service: &'static str, message: String },

    #[error("{service} answered {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} sent an unreadable response: {message}")]
    Decode { service: &'static str, message: String },

    #[error("Invalid URL for {service}: {message}")]
    InvalidUrl { service: &'static str, message: String },

    #[error("Could not sign service token: {0}")]
    Token(String),
}

impl IntegrationError {
    pub fn service(&self) -> &'static str {
        match self {
            IntegrationError::Transport { service, .. }
            | IntegrationError::Status { service, .. }
            | IntegrationError::Decode { service, .. }
            | IntegrationError::InvalidUrl { service, .. } => service,
            IntegrationError::Token(_) => "auth",
        }
    }
}

impl From<IntegrationError> for HrError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::InvalidUrl { .. } => HrError::Config(err.to_string()),
            other => HrError::ExternalService {
                service: other.service().to_string(),
                message: other.to_string(),
            },
        }
    }
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;
