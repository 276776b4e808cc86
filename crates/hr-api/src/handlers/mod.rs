//! API request handlers, one module per resource

pub mod action_reports;
pub mod announcements;
pub mod auth;
pub mod budget_requests;
pub mod complaints;
pub mod integration;
pub mod messages;
pub mod suggestions;
pub mod uploads;
