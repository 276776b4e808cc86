//! Sibling-service data: attendance sync, training, violations and the
//! top-employee ranking built on top of them

use std::collections::HashMap;
use std::sync::Arc;

use hr_auth::CurrentUser;
use hr_core::pagination::{Page, PaginationParams};
use hr_core::HrResult;
use hr_db::EmployeeStore;
use hr_integrations::{HrModules, TrainingRecord, Violation};
use hr_models::Employee;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::scoring::{rank_employees, EmployeeMetrics, RankedEmployee, ScoreWeights};

pub const DEFAULT_TOP_LIMIT: usize = 10;
pub const MAX_TOP_LIMIT: usize = 100;

/// Counts returned by an attendance sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Entries without an employee id
    pub skipped: usize,
}

pub struct IntegrationService {
    modules: Arc<dyn HrModules>,
    employees: Arc<dyn EmployeeStore>,
    weights: ScoreWeights,
}

impl IntegrationService {
    pub fn new(
        modules: Arc<dyn HrModules>,
        employees: Arc<dyn EmployeeStore>,
        weights: ScoreWeights,
    ) -> Self {
        Self {
            modules,
            employees,
            weights,
        }
    }

    /// Pull HR1 attendance and upsert it into the local mirror
    #[instrument(skip(self), fields(admin_id = current.id))]
    pub async fn sync_attendance(&self, current: &CurrentUser) -> HrResult<SyncReport> {
        current.require_admin()?;

        let entries = self.modules.fetch_attendance().await?;
        let fetched = entries.len();
        let entries: Vec<_> = entries
            .into_iter()
            .filter(|e| !e.employee_id.trim().is_empty())
            .collect();
        let skipped = fetched - entries.len();

        let summary = self.employees.upsert_many(entries).await?;
        let report = SyncReport {
            fetched,
            inserted: summary.inserted,
            updated: summary.updated,
            skipped,
        };
        info!(
            fetched,
            inserted = report.inserted,
            updated = report.updated,
            skipped,
            "Attendance synced"
        );
        Ok(report)
    }

    pub async fn training_records(&self, current: &CurrentUser) -> HrResult<Vec<TrainingRecord>> {
        current.require_admin()?;
        Ok(self.modules.fetch_training_records().await?)
    }

    pub async fn violations(&self, current: &CurrentUser) -> HrResult<Vec<Violation>> {
        current.require_admin()?;
        Ok(self.modules.fetch_violations().await?)
    }

    pub async fn employees(&self, params: PaginationParams) -> HrResult<Page<Employee>> {
        Ok(self.employees.find_all(params.normalized()).await?)
    }

    /// Rank the attendance mirror by hours worked and completed trainings.
    ///
    /// HR2 being unreachable does not fail the ranking; every employee
    /// then scores on attendance alone.
    #[instrument(skip(self))]
    pub async fn top_employees(&self, limit: Option<usize>) -> HrResult<Vec<RankedEmployee>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT);

        let hours = self.employees.hours_by_employee().await?;
        if hours.is_empty() {
            return Ok(Vec::new());
        }

        let completed = match self.modules.fetch_training_records().await {
            Ok(records) => completed_trainings(&records),
            Err(e) => {
                warn!(error = %e, "Training records unavailable, ranking on attendance only");
                HashMap::new()
            }
        };

        let metrics = hours
            .into_iter()
            .map(|h| EmployeeMetrics {
                completed_trainings: completed.get(&h.employee_id).copied().unwrap_or(0),
                employee_id: h.employee_id,
                name: h.name,
                attendance_hours: h.total_hours,
            })
            .collect();

        let mut ranked = rank_employees(metrics, self.weights);
        ranked.truncate(limit);
        Ok(ranked)
    }
}

fn completed_trainings(records: &[TrainingRecord]) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for record in records.iter().filter(|r| r.is_completed()) {
        *counts.entry(record.employee_id.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use hr_db::MemoryEmployeeStore;
    use hr_integrations::{IntegrationError, MockHrModules};
    use hr_models::NewEmployee;

    fn punch(employee_id: &str, day: u32, hours: f64) -> NewEmployee {
        let time_in = Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap();
        NewEmployee {
            employee_id: employee_id.to_string(),
            name: format!("Worker {employee_id}"),
            department: Some("Assembly".to_string()),
            position: None,
            time_in,
            time_out: Some(time_in + Duration::minutes((hours * 60.0) as i64)),
            total_hours: Some(hours),
        }
    }

    fn training(employee_id: &str, status: &str) -> TrainingRecord {
        TrainingRecord {
            employee_id: employee_id.to_string(),
            employee_name: None,
            title: "Lockout/tagout".to_string(),
            status: Some(status.to_string()),
            score: None,
            completed_at: None,
        }
    }

    fn admin() -> CurrentUser {
        CurrentUser::admin(1, "admin@example.com")
    }

    #[tokio::test]
    async fn test_sync_attendance_counts() {
        let mut modules = MockHrModules::new();
        modules
            .expect_fetch_attendance()
            .times(2)
            .returning(|| Ok(vec![punch("E-1", 6, 8.0), punch("E-2", 6, 7.5), punch(" ", 6, 4.0)]));

        let service = IntegrationService::new(
            Arc::new(modules),
            Arc::new(MemoryEmployeeStore::new()),
            ScoreWeights::default(),
        );

        let first = service.sync_attendance(&admin()).await.unwrap();
        assert_eq!(
            first,
            SyncReport {
                fetched: 3,
                inserted: 2,
                updated: 0,
                skipped: 1
            }
        );

        let second = service.sync_attendance(&admin()).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);

        let mirror = service.employees(PaginationParams::default()).await.unwrap();
        assert_eq!(mirror.total, 2);
    }

    #[tokio::test]
    async fn test_admin_only_operations() {
        let service = IntegrationService::new(
            Arc::new(MockHrModules::new()),
            Arc::new(MemoryEmployeeStore::new()),
            ScoreWeights::default(),
        );
        let employee = CurrentUser::employee(5, "e5@example.com");

        assert_eq!(service.sync_attendance(&employee).await.unwrap_err().status_code(), 403);
        assert_eq!(service.training_records(&employee).await.unwrap_err().status_code(), 403);
        assert_eq!(service.violations(&employee).await.unwrap_err().status_code(), 403);
    }

    #[tokio::test]
    async fn test_top_employees_combines_hours_and_training() {
        let store = Arc::new(MemoryEmployeeStore::new());
        store
            .upsert_many(vec![
                punch("E-1", 6, 8.0),
                punch("E-1", 7, 8.0),
                punch("E-2", 6, 10.0),
                punch("E-3", 6, 4.0),
            ])
            .await
            .unwrap();

        let mut modules = MockHrModules::new();
        modules.expect_fetch_training_records().returning(|| {
            Ok(vec![
                training("E-2", "completed"),
                training("E-2", "Completed"),
                training("E-1", "in progress"),
            ])
        });
        let service = IntegrationService::new(Arc::new(modules), store, ScoreWeights::default());

        let ranked = service.top_employees(None).await.unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(order, ["E-2", "E-1", "E-3"]);
        assert_eq!(ranked[0].completed_trainings, 2);
        assert_eq!(ranked[1].completed_trainings, 0);

        let limited = service.top_employees(Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].rank, 1);
    }

    #[tokio::test]
    async fn test_top_employees_survives_training_outage() {
        let store = Arc::new(MemoryEmployeeStore::new());
        store
            .upsert_many(vec![punch("E-1", 6, 6.0), punch("E-2", 6, 9.0)])
            .await
            .unwrap();

        let mut modules = MockHrModules::new();
        modules.expect_fetch_training_records().returning(|| {
            Err(IntegrationError::Transport {
                service: "hr2",
                message: "connection refused".to_string(),
            })
        });
        let service = IntegrationService::new(Arc::new(modules), store, ScoreWeights::default());

        let ranked = service.top_employees(Some(0)).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].employee_id, "E-2");
    }

    #[tokio::test]
    async fn test_top_employees_empty_mirror() {
        let service = IntegrationService::new(
            Arc::new(MockHrModules::new()),
            Arc::new(MemoryEmployeeStore::new()),
            ScoreWeights::default(),
        );
        assert!(service.top_employees(Some(5)).await.unwrap().is_empty());
    }
}
