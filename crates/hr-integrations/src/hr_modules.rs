//! HR1 / HR2 / HR3 clients
//!
//! The sibling modules are separate apps with their own naming habits,
//! so the DTOs accept both snake_case and camelCase keys.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_models::NewEmployee;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{Listing, ServiceClient};
use crate::endpoints::{join, ServiceEndpoints};
use crate::error::IntegrationResult;

/// One punch record from HR1 time tracking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(alias = "employee_id")]
    pub employee_id: String,
    #[serde(alias = "employee_name")]
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(alias = "time_in")]
    pub time_in: DateTime<Utc>,
    #[serde(default, alias = "time_out")]
    pub time_out: Option<DateTime<Utc>>,
    #[serde(default, alias = "total_hours")]
    pub total_hours: Option<f64>,
}

impl From<AttendanceRecord> for NewEmployee {
    fn from(record: AttendanceRecord) -> Self {
        NewEmployee {
            employee_id: record.employee_id.trim().to_string(),
            name: record.name,
            department: record.department,
            position: record.position,
            time_in: record.time_in,
            time_out: record.time_out,
            total_hours: record.total_hours,
        }
    }
}

/// Course progress from HR2
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    #[serde(alias = "employee_id")]
    pub employee_id: String,
    #[serde(default, alias = "employee_name")]
    pub employee_name: Option<String>,
    #[serde(alias = "training_title", alias = "course")]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Percentage, 0 to 100
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, alias = "completed_at")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TrainingRecord {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
            || self
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("completed"))
    }
}

/// Disciplinary violation logged in HR3
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "employee_id")]
    pub employee_id: String,
    #[serde(default, alias = "employee_name")]
    pub employee_name: Option<String>,
    #[serde(alias = "violation_type", alias = "type")]
    pub violation_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, alias = "reported_at", alias = "date")]
    pub reported_at: Option<DateTime<Utc>>,
}

/// Read access to the sibling HR modules
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait HrModules: Send + Sync {
    /// Attendance punches from HR1
    async fn fetch_attendance(&self) -> IntegrationResult<Vec<NewEmployee>>;

    /// Training records from HR2
    async fn fetch_training_records(&self) -> IntegrationResult<Vec<TrainingRecord>>;

    /// Violations from HR3
    async fn fetch_violations(&self) -> IntegrationResult<Vec<Violation>>;
}

pub struct HttpHrModules {
    client: ServiceClient,
    endpoints: ServiceEndpoints,
}

impl HttpHrModules {
    pub fn new(client: ServiceClient, endpoints: ServiceEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl HrModules for HttpHrModules {
    async fn fetch_attendance(&self) -> IntegrationResult<Vec<NewEmployee>> {
        let url = join("hr1", &self.endpoints.hr1, "api/attendance")?;
        let records: Listing<AttendanceRecord> = self.client.get_json("hr1", url).await?;
        let records = records.into_vec();

        info!(count = records.len(), "Fetched attendance from HR1");
        Ok(records.into_iter().map(NewEmployee::from).collect())
    }

    async fn fetch_training_records(&self) -> IntegrationResult<Vec<TrainingRecord>> {
        let url = join("hr2", &self.endpoints.hr2, "api/training-records")?;
        let records: Listing<TrainingRecord> = self.client.get_json("hr2", url).await?;
        Ok(records.into_vec())
    }

    async fn fetch_violations(&self) -> IntegrationResult<Vec<Violation>> {
        let url = join("hr3", &self.endpoints.hr3, "api/violations")?;
        let violations: Listing<Violation> = self.client.get_json("hr3", url).await?;
        Ok(violations.into_vec())
    }
}
