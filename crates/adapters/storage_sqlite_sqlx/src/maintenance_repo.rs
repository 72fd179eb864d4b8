//! `SQLite` implementation of [`MaintenanceRepository`].
//!
//! Dates are stored as `YYYY-MM-DD` and timestamps as fixed-width RFC 3339
//! so that text ordering matches chronological ordering.

use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use maintrack_app::ports::MaintenanceRepository;
use maintrack_domain::error::MaintrackError;
use maintrack_domain::id::{MachineId, MaintenanceLogId, PartId};
use maintrack_domain::maintenance::{MaintenanceLog, MaintenancePart};
use maintrack_domain::time::{Date, Timestamp};

use crate::error::StorageError;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn encode_date(date: Date) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn decode_date(value: &str) -> Result<Date, sqlx::Error> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| StorageError::decode("maintenance_date", value))
}

fn encode_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| StorageError::decode("recorded_at", value))
}

struct PartWrapper(MaintenancePart);

impl<'r> FromRow<'r, SqliteRow> for PartWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let id = PartId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        Ok(Self(MaintenancePart {
            id,
            name: row.try_get("name")?,
        }))
    }
}

/// Log row joined with its part.
struct LogWrapper(MaintenanceLog);

impl<'r> FromRow<'r, SqliteRow> for LogWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let machine_id: String = row.try_get("machine_id")?;
        let part_id: String = row.try_get("part_id")?;
        let maintenance_date: String = row.try_get("maintenance_date")?;
        let recorded_at: String = row.try_get("recorded_at")?;

        Ok(Self(MaintenanceLog {
            id: MaintenanceLogId::from_str(&id)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            machine_id: MachineId::from_str(&machine_id)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            maintenance_date: decode_date(&maintenance_date)?,
            part: MaintenancePart {
                id: PartId::from_str(&part_id)
                    .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
                name: row.try_get("part_name")?,
            },
            performed_by: row.try_get("performed_by")?,
            invoice_number: row.try_get("invoice_number")?,
            notes: row.try_get("notes")?,
            recorded_at: decode_timestamp(&recorded_at)?,
        }))
    }
}

const INSERT_PART: &str = "INSERT INTO maintenance_parts (id, name) VALUES (?, ?)";
const SELECT_PART_BY_ID: &str = "SELECT * FROM maintenance_parts WHERE id = ?";
const SELECT_ALL_PARTS: &str = "SELECT * FROM maintenance_parts ORDER BY name";
const INSERT_LOG: &str = "INSERT INTO maintenance_logs (id, machine_id, maintenance_date, part_id, performed_by, invoice_number, notes, recorded_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_LOGS_BY_MACHINE: &str = "SELECT l.*, p.name AS part_name FROM maintenance_logs l JOIN maintenance_parts p ON p.id = l.part_id WHERE l.machine_id = ? ORDER BY l.maintenance_date DESC, l.recorded_at DESC";
const SELECT_LAST_DATE: &str =
    "SELECT MAX(maintenance_date) FROM maintenance_logs WHERE machine_id = ?";

/// `SQLite`-backed repository for parts and maintenance logs.
pub struct SqliteMaintenanceRepository {
    pool: SqlitePool,
}

impl SqliteMaintenanceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl MaintenanceRepository for SqliteMaintenanceRepository {
    fn create_part(
        &self,
        part: MaintenancePart,
    ) -> impl Future<Output = Result<MaintenancePart, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT_PART)
                .bind(part.id.to_string())
                .bind(&part.name)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(part)
        }
    }

    fn get_part(
        &self,
        id: PartId,
    ) -> impl Future<Output = Result<Option<MaintenancePart>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<PartWrapper> = sqlx::query_as(SELECT_PART_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn list_parts(
        &self,
    ) -> impl Future<Output = Result<Vec<MaintenancePart>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<PartWrapper> = sqlx::query_as(SELECT_ALL_PARTS)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn record(
        &self,
        log: MaintenanceLog,
    ) -> impl Future<Output = Result<MaintenanceLog, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT_LOG)
                .bind(log.id.to_string())
                .bind(log.machine_id.to_string())
                .bind(encode_date(log.maintenance_date))
                .bind(log.part.id.to_string())
                .bind(&log.performed_by)
                .bind(log.invoice_number.as_deref())
                .bind(log.notes.as_deref())
                .bind(encode_timestamp(log.recorded_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(log)
        }
    }

    fn find_by_machine(
        &self,
        machine_id: MachineId,
    ) -> impl Future<Output = Result<Vec<MaintenanceLog>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<LogWrapper> = sqlx::query_as(SELECT_LOGS_BY_MACHINE)
                .bind(machine_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn last_maintenance(
        &self,
        machine_id: MachineId,
    ) -> impl Future<Output = Result<Option<Date>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (last,): (Option<String>,) = sqlx::query_as(SELECT_LAST_DATE)
                .bind(machine_id.to_string())
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            let date = last
                .map(|value| decode_date(&value))
                .transpose()
                .map_err(StorageError::from)?;
            Ok(date)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::machine_repo::SqliteMachineRepository;
    use crate::pool::Config;
    use crate::site_repo::SqliteSiteRepository;
    use maintrack_app::ports::{MachineRepository, SiteRepository};
    use maintrack_domain::machine::Machine;
    use maintrack_domain::site::Site;

    async fn setup() -> (SqliteMaintenanceRepository, MachineId) {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        let site = Site::builder().name("North Plant").build().unwrap();
        let machine = Machine::builder()
            .name("Press 1")
            .model("HX-200")
            .site_id(site.id)
            .build()
            .unwrap();
        let machine_id = machine.id;
        SqliteSiteRepository::new(db.pool().clone())
            .create(site)
            .await
            .unwrap();
        SqliteMachineRepository::new(db.pool().clone())
            .create(machine)
            .await
            .unwrap();
        (SqliteMaintenanceRepository::new(db.pool().clone()), machine_id)
    }

    fn date(y: i32, m: u32, d: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn log(machine_id: MachineId, part: &MaintenancePart, on: Date) -> MaintenanceLog {
        MaintenanceLog::builder()
            .machine_id(machine_id)
            .maintenance_date(on)
            .part(part.clone())
            .performed_by("Tech A")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_list_parts_by_name() {
        let (repo, _) = setup().await;
        repo.create_part(MaintenancePart::new("Oil filter").unwrap())
            .await
            .unwrap();
        repo.create_part(MaintenancePart::new("Belt").unwrap())
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list_parts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Belt", "Oil filter"]);
    }

    #[tokio::test]
    async fn should_return_logs_newest_first() {
        let (repo, machine_id) = setup().await;
        let part = repo
            .create_part(MaintenancePart::new("Belt").unwrap())
            .await
            .unwrap();
        let older = log(machine_id, &part, date(2024, 1, 10));
        let newer = log(machine_id, &part, date(2024, 3, 2));
        repo.record(older.clone()).await.unwrap();
        repo.record(newer.clone()).await.unwrap();

        let logs = repo.find_by_machine(machine_id).await.unwrap();
        assert_eq!(logs, vec![newer, older]);
    }

    #[tokio::test]
    async fn should_break_date_ties_by_recording_time() {
        let (repo, machine_id) = setup().await;
        let part = repo
            .create_part(MaintenancePart::new("Belt").unwrap())
            .await
            .unwrap();
        let first = log(machine_id, &part, date(2024, 5, 1));
        let mut second = log(machine_id, &part, date(2024, 5, 1));
        second.recorded_at = first.recorded_at + TimeDelta::seconds(5);
        repo.record(second.clone()).await.unwrap();
        repo.record(first.clone()).await.unwrap();

        let ids: Vec<MaintenanceLogId> = repo
            .find_by_machine(machine_id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn should_keep_optional_fields_empty() {
        let (repo, machine_id) = setup().await;
        let part = repo
            .create_part(MaintenancePart::new("Belt").unwrap())
            .await
            .unwrap();
        repo.record(log(machine_id, &part, date(2024, 1, 1)))
            .await
            .unwrap();

        let logs = repo.find_by_machine(machine_id).await.unwrap();
        assert!(logs[0].invoice_number.is_none());
        assert!(logs[0].notes.is_none());
        assert_eq!(logs[0].part.name, "Belt");
    }

    #[tokio::test]
    async fn should_report_last_maintenance_date() {
        let (repo, machine_id) = setup().await;
        assert_eq!(repo.last_maintenance(machine_id).await.unwrap(), None);

        let part = repo
            .create_part(MaintenancePart::new("Belt").unwrap())
            .await
            .unwrap();
        repo.record(log(machine_id, &part, date(2024, 2, 1)))
            .await
            .unwrap();
        repo.record(log(machine_id, &part, date(2023, 12, 1)))
            .await
            .unwrap();

        assert_eq!(
            repo.last_maintenance(machine_id).await.unwrap(),
            Some(date(2024, 2, 1))
        );
    }
}
