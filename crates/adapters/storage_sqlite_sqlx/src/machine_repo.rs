//! `SQLite` implementation of [`MachineRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use maintrack_app::ports::MachineRepository;
use maintrack_domain::error::MaintrackError;
use maintrack_domain::id::{MachineId, SiteId};
use maintrack_domain::machine::Machine;

use crate::error::StorageError;

struct Wrapper(Machine);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Machine> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let site_id: String = row.try_get("site_id")?;

        let id = MachineId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let site_id =
            SiteId::from_str(&site_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Machine {
            id,
            name: row.try_get("name")?,
            model: row.try_get("model")?,
            machine_number: row.try_get("machine_number")?,
            serial_number: row.try_get("serial_number")?,
            site_id,
        }))
    }
}

const INSERT: &str = "INSERT INTO machines (id, name, model, machine_number, serial_number, site_id) VALUES (?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM machines WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM machines ORDER BY name";
const SELECT_BY_SITE: &str = "SELECT * FROM machines WHERE site_id = ? ORDER BY name";
const UPDATE: &str = "UPDATE machines SET name = ?, model = ?, machine_number = ?, serial_number = ?, site_id = ? WHERE id = ?";

/// `SQLite`-backed machine repository.
pub struct SqliteMachineRepository {
    pool: SqlitePool,
}

impl SqliteMachineRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl MachineRepository for SqliteMachineRepository {
    fn create(
        &self,
        machine: Machine,
    ) -> impl Future<Output = Result<Machine, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(machine.id.to_string())
                .bind(&machine.name)
                .bind(&machine.model)
                .bind(machine.machine_number.as_deref())
                .bind(machine.serial_number.as_deref())
                .bind(machine.site_id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(machine)
        }
    }

    fn get_by_id(
        &self,
        id: MachineId,
    ) -> impl Future<Output = Result<Option<Machine>, MaintrackError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Machine>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn find_by_site(
        &self,
        site_id: SiteId,
    ) -> impl Future<Output = Result<Vec<Machine>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_SITE)
                .bind(site_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        machine: Machine,
    ) -> impl Future<Output = Result<Machine, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&machine.name)
                .bind(&machine.model)
                .bind(machine.machine_number.as_deref())
                .bind(machine.serial_number.as_deref())
                .bind(machine.site_id.to_string())
                .bind(machine.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(machine)
        }
    }
}
