//! `SQLite` implementation of [`UserRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use maintrack_app::ports::UserRepository;
use maintrack_domain::error::MaintrackError;
use maintrack_domain::id::UserId;
use maintrack_domain::user::User;

use crate::error::StorageError;

struct Wrapper(User);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<User> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let id = UserId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(User {
            id,
            username: row.try_get("username")?,
            full_name: row.try_get("full_name")?,
            password_hash: row.try_get("password_hash")?,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO users (id, username, full_name, password_hash) VALUES (?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM users WHERE id = ?";
const SELECT_BY_USERNAME: &str = "SELECT * FROM users WHERE username = ?";
const SELECT_ALL: &str = "SELECT * FROM users ORDER BY username";

/// `SQLite`-backed user repository.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    fn create(&self, user: User) -> impl Future<Output = Result<User, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(user.id.to_string())
                .bind(&user.username)
                .bind(user.full_name.as_deref())
                .bind(&user.password_hash)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(user)
        }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, MaintrackError>> + Send {
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

    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        let username = username.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_USERNAME)
                .bind(username)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<User>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
