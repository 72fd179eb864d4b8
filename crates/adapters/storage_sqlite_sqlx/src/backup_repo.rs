//! `SQLite` implementation of [`BackupScheduleRepository`].

use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use maintrack_app::ports::BackupScheduleRepository;
use maintrack_domain::backup::{BackupSchedule, Frequency, Retention};
use maintrack_domain::error::MaintrackError;
use maintrack_domain::id::BackupScheduleId;

use crate::error::StorageError;

fn small_int<T: TryFrom<i64>>(column: &'static str, value: i64) -> Result<T, sqlx::Error> {
    T::try_from(value).map_err(|_| StorageError::decode(column, value.to_string()))
}

struct Wrapper(BackupSchedule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<BackupSchedule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let frequency: String = row.try_get("frequency")?;
        let day_of_week: Option<i64> = row.try_get("day_of_week")?;
        let day_of_month: Option<i64> = row.try_get("day_of_month")?;
        let hour: i64 = row.try_get("hour")?;
        let minute: i64 = row.try_get("minute")?;
        let retention_count: i64 = row.try_get("retention_count")?;
        let created_at: String = row.try_get("created_at")?;

        let id =
            BackupScheduleId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let frequency =
            Frequency::from_str(&frequency).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let retention = Retention::from_count(small_int("retention_count", retention_count)?)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| StorageError::decode("created_at", created_at.as_str()))?;

        Ok(Self(BackupSchedule {
            id,
            name: row.try_get("name")?,
            frequency,
            day_of_week: day_of_week
                .map(|v| small_int("day_of_week", v))
                .transpose()?,
            day_of_month: day_of_month
                .map(|v| small_int("day_of_month", v))
                .transpose()?,
            hour: small_int("hour", hour)?,
            minute: small_int("minute", minute)?,
            retention,
            include_users: row.try_get("include_users")?,
            enabled: row.try_get("enabled")?,
            created_at,
        }))
    }
}

const INSERT: &str = "INSERT INTO backup_schedules (id, name, frequency, day_of_week, day_of_month, hour, minute, retention_count, include_users, enabled, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM backup_schedules WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM backup_schedules ORDER BY created_at, name";
const UPDATE: &str = "UPDATE backup_schedules SET name = ?, frequency = ?, day_of_week = ?, day_of_month = ?, hour = ?, minute = ?, retention_count = ?, include_users = ?, enabled = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM backup_schedules WHERE id = ?";

/// `SQLite`-backed backup schedule repository.
pub struct SqliteBackupScheduleRepository {
    pool: SqlitePool,
}

impl SqliteBackupScheduleRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl BackupScheduleRepository for SqliteBackupScheduleRepository {
    fn create(
        &self,
        schedule: BackupSchedule,
    ) -> impl Future<Output = Result<BackupSchedule, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(schedule.id.to_string())
                .bind(&schedule.name)
                .bind(schedule.frequency.as_str())
                .bind(schedule.day_of_week.map(i64::from))
                .bind(schedule.day_of_month.map(i64::from))
                .bind(i64::from(schedule.hour))
                .bind(i64::from(schedule.minute))
                .bind(i64::from(schedule.retention.count()))
                .bind(schedule.include_users)
                .bind(schedule.enabled)
                .bind(
                    schedule
                        .created_at
                        .to_rfc3339_opts(SecondsFormat::Nanos, true),
                )
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(schedule)
        }
    }

    fn get_by_id(
        &self,
        id: BackupScheduleId,
    ) -> impl Future<Output = Result<Option<BackupSchedule>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(
        &self,
    ) -> impl Future<Output = Result<Vec<BackupSchedule>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        schedule: BackupSchedule,
    ) -> impl Future<Output = Result<BackupSchedule, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&schedule.name)
                .bind(schedule.frequency.as_str())
                .bind(schedule.day_of_week.map(i64::from))
                .bind(schedule.day_of_month.map(i64::from))
                .bind(i64::from(schedule.hour))
                .bind(i64::from(schedule.minute))
                .bind(i64::from(schedule.retention.count()))
                .bind(schedule.include_users)
                .bind(schedule.enabled)
                .bind(schedule.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(schedule)
        }
    }

    fn delete(
        &self,
        id: BackupScheduleId,
    ) -> impl Future<Output = Result<(), MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
