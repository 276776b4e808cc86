//! Suggestion box model
//!
//! Table: suggestions

use chrono::{DateTime, Utc};
use hr_core::traits::{Id, Identifiable, Owned, Timestamped};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Reviewed,
    Implemented,
    Rejected,
}

impl SuggestionStatus {
    pub const ALL: [SuggestionStatus; 4] = [
        SuggestionStatus::Pending,
        SuggestionStatus::Reviewed,
        SuggestionStatus::Implemented,
        SuggestionStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "Pending",
            SuggestionStatus::Reviewed => "Reviewed",
            SuggestionStatus::Implemented => "Implemented",
            SuggestionStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuggestionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SuggestionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("suggestion status", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: Id,
    pub employee_id: Id,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: SuggestionStatus,
    pub admin_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Suggestion {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Suggestion {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Owned for Suggestion {
    fn owner_id(&self) -> Id {
        self.employee_id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSuggestion {
    #[serde(skip)]
    pub employee_id: Id,
    pub title: String,
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "General".to_string()
}

/// Admin review of a suggestion
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionUpdate {
    pub status: SuggestionStatus,
    pub admin_feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_suggestion_defaults_category() {
        let input: NewSuggestion =
            serde_json::from_str(r#"{"title":"Longer breaks","description":"Two shifts"}"#).unwrap();
        assert_eq!(input.category, "General");
        assert_eq!(input.employee_id, 0);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Implemented".parse::<SuggestionStatus>().unwrap(), SuggestionStatus::Implemented);
        assert!("Done".parse::<SuggestionStatus>().is_err());
        assert_eq!(SuggestionStatus::default(), SuggestionStatus::Pending);
    }
}
