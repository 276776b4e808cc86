//! # hr-notifications
//!
//! Outgoing email for the HR portal. Messages are rendered here and
//! handed to an [`EmailSender`]; the server picks the sender from the
//! `email.delivery_method` setting.

pub mod email;

pub use email::{
    render_two_factor_code, sender_for, EmailAddress, EmailError, EmailMessage, EmailResult,
    EmailSender, LogEmailSender, MemoryEmailSender,
};
