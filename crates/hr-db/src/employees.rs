//! Attendance mirror of HR1 time entries
//!
//! Table: employees. One row per `(employee_id, time_in)`; syncing the
//! same punch twice updates the row in place.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hr_core::pagination::{Page, PaginationParams};
use hr_models::{Employee, EmployeeHours, NewEmployee};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::collections::{BTreeMap, HashSet};

use crate::memory::MemoryTable;
use crate::repository::RepositoryResult;

const COLUMNS: &str =
    "id, employee_id, name, department, position, time_in, time_out, total_hours, synced_at";

#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub id: i64,
    pub employee_id: String,
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub time_in: DateTime<Utc>,
    pub time_out: Option<DateTime<Utc>>,
    pub total_hours: Option<f64>,
    pub synced_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            employee_id: row.employee_id,
            name: row.name,
            department: row.department,
            position: row.position,
            time_in: row.time_in,
            time_out: row.time_out,
            total_hours: row.total_hours,
            synced_at: row.synced_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct HoursRow {
    employee_id: String,
    name: String,
    total_hours: f64,
    days_present: i64,
}

/// Outcome of an attendance sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Newest punch first
    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Employee>>;

    /// Insert or refresh entries keyed on `(employee_id, time_in)`
    async fn upsert_many(&self, entries: Vec<NewEmployee>) -> RepositoryResult<UpsertSummary>;

    /// Worked hours and distinct days present per employee, ordered by employee id
    async fn hours_by_employee(&self) -> RepositoryResult<Vec<EmployeeHours>>;
}

/// PostgreSQL attendance store
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Employee>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM employees ORDER BY time_in DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;
        Ok(Page::new(rows, total, params).map(Employee::from))
    }

    async fn upsert_many(&self, entries: Vec<NewEmployee>) -> RepositoryResult<UpsertSummary> {
        let mut summary = UpsertSummary::default();

        for entry in entries {
            let hours = entry.worked_hours();
            // xmax is zero only for freshly inserted tuples
            let inserted = sqlx::query_scalar::<_, bool>(
                r#"
                INSERT INTO employees (employee_id, name, department, position,
                                       time_in, time_out, total_hours, synced_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
                ON CONFLICT (employee_id, time_in) DO UPDATE SET
                    name = EXCLUDED.name,
                    department = EXCLUDED.department,
                    position = EXCLUDED.position,
                    time_out = EXCLUDED.time_out,
                    total_hours = EXCLUDED.total_hours,
                    synced_at = NOW()
                RETURNING (xmax = 0)
                "#,
            )
            .bind(&entry.employee_id)
            .bind(&entry.name)
            .bind(&entry.department)
            .bind(&entry.position)
            .bind(entry.time_in)
            .bind(entry.time_out)
            .bind(hours)
            .fetch_one(&self.pool)
            .await?;

            if inserted {
                summary.inserted += 1;
            } else {
                summary.updated += 1;
            }
        }

        tracing::debug!(
            inserted = summary.inserted,
            updated = summary.updated,
            "Attendance entries upserted"
        );
        Ok(summary)
    }

    async fn hours_by_employee(&self) -> RepositoryResult<Vec<EmployeeHours>> {
        let rows = sqlx::query_as::<_, HoursRow>(
            r#"
            SELECT employee_id,
                   MAX(name) AS name,
                   COALESCE(SUM(total_hours), 0)::DOUBLE PRECISION AS total_hours,
                   COUNT(DISTINCT (time_in AT TIME ZONE 'UTC')::date) AS days_present
            FROM employees
            GROUP BY employee_id
            ORDER BY employee_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EmployeeHours {
                employee_id: row.employee_id,
                name: row.name,
                total_hours: row.total_hours,
                days_present: row.days_present,
            })
            .collect())
    }
}

/// In-memory attendance store
pub struct MemoryEmployeeStore {
    table: MemoryTable<Employee>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(),
        }
    }
}

impl Default for MemoryEmployeeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Employee>> {
        let mut rows = self.table.filter(|_| true).await;
        rows.sort_by(|a, b| b.time_in.cmp(&a.time_in).then(b.id.cmp(&a.id)));
        Ok(Page::slice(rows, params))
    }

    async fn upsert_many(&self, entries: Vec<NewEmployee>) -> RepositoryResult<UpsertSummary> {
        let mut summary = UpsertSummary::default();

        for entry in entries {
            let hours = entry.worked_hours();
            let existing = self
                .table
                .filter(|e| e.employee_id == entry.employee_id && e.time_in == entry.time_in)
                .await
                .into_iter()
                .next();

            let now = Utc::now();
            match existing {
                Some(row) => {
                    self.table
                        .update(row.id, |e| {
                            e.name = entry.name;
                            e.department = entry.department;
                            e.position = entry.position;
                            e.time_out = entry.time_out;
                            e.total_hours = hours;
                            e.synced_at = now;
                        })
                        .await;
                    summary.updated += 1;
                }
                None => {
                    let id = self.table.next_id();
                    let employee = Employee {
                        id,
                        employee_id: entry.employee_id,
                        name: entry.name,
                        department: entry.department,
                        position: entry.position,
                        time_in: entry.time_in,
                        time_out: entry.time_out,
                        total_hours: hours,
                        synced_at: now,
                    };
                    self.table.insert(id, employee).await;
                    summary.inserted += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn hours_by_employee(&self) -> RepositoryResult<Vec<EmployeeHours>> {
        let rows = self.table.filter(|_| true).await;

        let mut grouped: BTreeMap<String, (String, f64, HashSet<NaiveDate>)> = BTreeMap::new();
        for row in rows {
            let entry = grouped
                .entry(row.employee_id)
                .or_insert_with(|| (String::new(), 0.0, HashSet::new()));
            if row.name > entry.0 {
                entry.0 = row.name;
            }
            entry.1 += row.total_hours.unwrap_or(0.0);
            entry.2.insert(row.time_in.date_naive());
        }

        Ok(grouped
            .into_iter()
            .map(|(employee_id, (name, total_hours, days))| EmployeeHours {
                employee_id,
                name,
                total_hours,
                days_present: days.len() as i64,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn punch(employee_id: &str, day: u32, hours: i64) -> NewEmployee {
        let time_in = Utc.with_ymd_and_hms(2024, 5, day, 7, 0, 0).unwrap();
        NewEmployee {
            employee_id: employee_id.into(),
            name: format!("Worker {employee_id}"),
            department: Some("Assembly".into()),
            position: None,
            time_in,
            time_out: Some(time_in + Duration::hours(hours)),
            total_hours: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_keyed_on_employee_and_time_in() {
        let store = MemoryEmployeeStore::new();

        let first = store
            .upsert_many(vec![punch("E1", 1, 8), punch("E1", 2, 8), punch("E2", 1, 6)])
            .await
            .unwrap();
        assert_eq!(first, UpsertSummary { inserted: 3, updated: 0 });

        let second = store
            .upsert_many(vec![punch("E1", 1, 9), punch("E2", 2, 4)])
            .await
            .unwrap();
        assert_eq!(second, UpsertSummary { inserted: 1, updated: 1 });

        let page = store.find_all(PaginationParams::default()).await.unwrap();
        assert_eq!(page.total, 4);
    }

    #[tokio::test]
    async fn test_hours_by_employee() {
        let store = MemoryEmployeeStore::new();
        store
            .upsert_many(vec![punch("E2", 1, 6), punch("E1", 1, 8), punch("E1", 2, 7)])
            .await
            .unwrap();

        let hours = store.hours_by_employee().await.unwrap();
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].employee_id, "E1");
        assert_eq!(hours[0].total_hours, 15.0);
        assert_eq!(hours[0].days_present, 2);
        assert_eq!(hours[1].total_hours, 6.0);
        assert_eq!(hours[1].days_present, 1);
    }
}
