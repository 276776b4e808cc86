//! Email delivery

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::config::{EmailConfig, EmailDeliveryMethod};
use hr_core::HrError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Email errors
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

impl From<EmailError> for HrError {
    fn from(err: EmailError) -> Self {
        HrError::ExternalService {
            service: "email".to_string(),
            message: err.to_string(),
        }
    }
}

pub type EmailResult<T> = Result<T, EmailError>;

/// Email address with optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Format as RFC 5322
    pub fn to_rfc5322(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// Email message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: String,
    pub from: EmailAddress,
    pub to: Vec<EmailAddress>,
    pub subject: String,
    pub text_body: String,
    pub created_at: DateTime<Utc>,
}

impl EmailMessage {
    pub fn new(
        from: EmailAddress,
        to: Vec<EmailAddress>,
        subject: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from,
            to,
            subject: subject.into(),
            text_body: text_body.into(),
            created_at: Utc::now(),
        }
    }

    fn recipients(&self) -> String {
        self.to
            .iter()
            .map(EmailAddress::to_rfc5322)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Email sender trait
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email, returning the message id
    async fn send(&self, message: &EmailMessage) -> EmailResult<String>;
}

/// Writes outgoing mail to the log instead of delivering it
#[derive(Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<String> {
        if message.to.is_empty() {
            return Err(EmailError::InvalidRecipient("no recipients".to_string()));
        }

        tracing::info!(
            id = %message.id,
            from = %message.from.to_rfc5322(),
            to = %message.recipients(),
            subject = %message.subject,
            "Email delivered to log"
        );
        tracing::debug!(id = %message.id, body = %message.text_body, "Email body");

        Ok(message.id.clone())
    }
}

/// Keeps outgoing mail in memory
#[derive(Default)]
pub struct MemoryEmailSender {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl MemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, oldest first
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    pub fn last_to(&self, email: &str) -> Option<EmailMessage> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.to.iter().any(|a| a.email == email))
    }
}

#[async_trait]
impl EmailSender for MemoryEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<String> {
        if message.to.is_empty() {
            return Err(EmailError::InvalidRecipient("no recipients".to_string()));
        }
        self.outbox
            .lock()
            .map_err(|_| EmailError::SendFailed("outbox lock poisoned".to_string()))?
            .push(message.clone());
        Ok(message.id.clone())
    }
}

/// Sender matching the configured delivery method
pub fn sender_for(config: &EmailConfig) -> Arc<dyn EmailSender> {
    match config.delivery_method {
        EmailDeliveryMethod::Log => Arc::new(LogEmailSender::new()),
        EmailDeliveryMethod::Test => Arc::new(MemoryEmailSender::new()),
    }
}

/// Render the login verification mail
pub fn render_two_factor_code(
    config: &EmailConfig,
    recipient: EmailAddress,
    code: &str,
    expires_at: DateTime<Utc>,
) -> EmailMessage {
    let minutes = (expires_at - Utc::now()).num_minutes().max(1);
    let from = EmailAddress::new(&config.from_address).with_name(&config.from_name);

    let greeting = match &recipient.name {
        Some(name) => format!("Hello {},", name),
        None => "Hello,".to_string(),
    };
    let body = format!(
        "{greeting}\n\n\
         Your HR portal verification code is: {code}\n\n\
         The code expires in {minutes} minutes and can be used once.\n\
         If you did not try to sign in, you can ignore this email.\n"
    );

    EmailMessage::new(from, vec![recipient], "Your HR portal verification code", body)
}
