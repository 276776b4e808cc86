//! Time-tracking entries mirrored from HR1
//!
//! Table: employees, unique on (employee_id, time_in)

use chrono::{DateTime, Utc};
use hr_core::traits::{Id, Identifiable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Id,
    /// Employee number as known to HR1
    pub employee_id: String,
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub time_in: DateTime<Utc>,
    pub time_out: Option<DateTime<Utc>>,
    pub total_hours: Option<f64>,
    pub synced_at: DateTime<Utc>,
}

impl Identifiable for Employee {
    fn id(&self) -> Id {
        self.id
    }
}

/// One attendance entry as received from HR1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub employee_id: String,
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub time_in: DateTime<Utc>,
    pub time_out: Option<DateTime<Utc>>,
    pub total_hours: Option<f64>,
}

impl NewEmployee {
    /// Worked hours, derived from the punch times when HR1 omits them
    pub fn worked_hours(&self) -> Option<f64> {
        self.total_hours.or_else(|| {
            self.time_out
                .filter(|out| *out > self.time_in)
                .map(|out| (out - self.time_in).num_minutes() as f64 / 60.0)
        })
    }
}

/// Aggregated hours per employee, the attendance input of scoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeHours {
    pub employee_id: String,
    pub name: String,
    pub total_hours: f64,
    pub days_present: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(total_hours: Option<f64>, out_after_minutes: Option<i64>) -> NewEmployee {
        let time_in = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        NewEmployee {
            employee_id: "E-1".into(),
            name: "Kim".into(),
            department: None,
            position: None,
            time_in,
            time_out: out_after_minutes.map(|m| time_in + Duration::minutes(m)),
            total_hours,
        }
    }

    #[test]
    fn test_worked_hours_prefers_reported_total() {
        assert_eq!(entry(Some(7.5), Some(600)).worked_hours(), Some(7.5));
    }

    #[test]
    fn test_worked_hours_from_punches() {
        assert_eq!(entry(None, Some(510)).worked_hours(), Some(8.5));
        assert_eq!(entry(None, None).worked_hours(), None);
        assert_eq!(entry(None, Some(-30)).worked_hours(), None);
    }
}
