//! `SQLite` implementation of [`SiteRepository`].
//!
//! Site memberships live in the `site_users` join table and are always
//! written together with the site row inside one transaction.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, Sqlite, SqlitePool, Transaction};

use maintrack_app::ports::SiteRepository;
use maintrack_domain::email::EmailAddress;
use maintrack_domain::error::MaintrackError;
use maintrack_domain::id::{SiteId, UserId};
use maintrack_domain::site::{Site, clamp_notification_threshold};

use crate::error::StorageError;

/// Site row without its members; those are attached afterwards.
struct Wrapper(Site);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let contact_email: Option<String> = row.try_get("contact_email")?;
        let threshold: i64 = row.try_get("notification_threshold")?;

        let id = SiteId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let contact_email = contact_email
            .filter(|value| !value.trim().is_empty())
            .map(|value| EmailAddress::parse(&value))
            .transpose()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Site {
            id,
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            contact_email,
            notification_threshold: clamp_notification_threshold(threshold),
            enable_notifications: row.try_get("enable_notifications")?,
            user_ids: BTreeSet::new(),
        }))
    }
}

struct Membership {
    site_id: SiteId,
    user_id: UserId,
}

impl<'r> FromRow<'r, SqliteRow> for Membership {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let site_id: String = row.try_get("site_id")?;
        let user_id: String = row.try_get("user_id")?;
        Ok(Self {
            site_id: SiteId::from_str(&site_id)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            user_id: UserId::from_str(&user_id)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
        })
    }
}

const INSERT: &str = "INSERT INTO sites (id, name, location, contact_email, notification_threshold, enable_notifications) VALUES (?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM sites WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM sites ORDER BY name";
const UPDATE: &str = "UPDATE sites SET name = ?, location = ?, contact_email = ?, notification_threshold = ?, enable_notifications = ? WHERE id = ?";
const SELECT_MEMBERS: &str = "SELECT site_id, user_id FROM site_users WHERE site_id = ?";
const SELECT_ALL_MEMBERS: &str = "SELECT site_id, user_id FROM site_users";
const INSERT_MEMBER: &str = "INSERT INTO site_users (site_id, user_id) VALUES (?, ?)";
const DELETE_MEMBERS: &str = "DELETE FROM site_users WHERE site_id = ?";

async fn insert_members(
    tx: &mut Transaction<'_, Sqlite>,
    site: &Site,
) -> Result<(), sqlx::Error> {
    for user_id in &site.user_ids {
        sqlx::query(INSERT_MEMBER)
            .bind(site.id.to_string())
            .bind(user_id.to_string())
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn insert_site(pool: &SqlitePool, site: &Site) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(INSERT)
        .bind(site.id.to_string())
        .bind(&site.name)
        .bind(&site.location)
        .bind(site.contact_email.as_ref().map(EmailAddress::as_str))
        .bind(i64::from(site.notification_threshold))
        .bind(site.enable_notifications)
        .execute(&mut *tx)
        .await?;
    insert_members(&mut tx, site).await?;
    tx.commit().await
}

async fn update_site(pool: &SqlitePool, site: &Site) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(UPDATE)
        .bind(&site.name)
        .bind(&site.location)
        .bind(site.contact_email.as_ref().map(EmailAddress::as_str))
        .bind(i64::from(site.notification_threshold))
        .bind(site.enable_notifications)
        .bind(site.id.to_string())
        .execute(&mut *tx)
        .await?;
    sqlx::query(DELETE_MEMBERS)
        .bind(site.id.to_string())
        .execute(&mut *tx)
        .await?;
    insert_members(&mut tx, site).await?;
    tx.commit().await
}

/// `SQLite`-backed site repository.
pub struct SqliteSiteRepository {
    pool: SqlitePool,
}

impl SqliteSiteRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SiteRepository for SqliteSiteRepository {
    fn create(&self, site: Site) -> impl Future<Output = Result<Site, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            insert_site(&pool, &site)
                .await
                .map_err(StorageError::from)?;
            Ok(site)
        }
    }

    fn get_by_id(
        &self,
        id: SiteId,
    ) -> impl Future<Output = Result<Option<Site>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;
            let Some(Wrapper(mut site)) = row else {
                return Ok(None);
            };

            let members: Vec<Membership> = sqlx::query_as(SELECT_MEMBERS)
                .bind(id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            site.user_ids = members.into_iter().map(|m| m.user_id).collect();

            Ok(Some(site))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Site>, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            let members: Vec<Membership> = sqlx::query_as(SELECT_ALL_MEMBERS)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let mut by_site: HashMap<SiteId, BTreeSet<UserId>> = HashMap::new();
            for member in members {
                by_site
                    .entry(member.site_id)
                    .or_default()
                    .insert(member.user_id);
            }

            Ok(rows
                .into_iter()
                .map(|Wrapper(mut site)| {
                    site.user_ids = by_site.remove(&site.id).unwrap_or_default();
                    site
                })
                .collect())
        }
    }

    fn update(&self, site: Site) -> impl Future<Output = Result<Site, MaintrackError>> + Send {
        let pool = self.pool.clone();
        async move {
            update_site(&pool, &site)
                .await
                .map_err(StorageError::from)?;
            Ok(site)
        }
    }
}
