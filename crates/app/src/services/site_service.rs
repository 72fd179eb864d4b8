//! Site service: use-cases for managing sites and their members.

use maintrack_domain::error::{MaintrackError, NotFoundError, ValidationError};
use maintrack_domain::id::SiteId;
use maintrack_domain::site::Site;

use crate::ports::{SiteRepository, UserRepository};

/// Application service for site CRUD operations.
pub struct SiteService<SR, UR> {
    repo: SR,
    users: UR,
}

impl<SR, UR> SiteService<SR, UR>
where
    SR: SiteRepository,
    UR: UserRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(repo: SR, users: UR) -> Self {
        Self { repo, users }
    }

    /// Create a new site after validating invariants and member users.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] if invariants fail or a member
    /// user does not exist, or a storage error from the repository.
    #[tracing::instrument(skip(self, site), fields(site_name = %site.name))]
    pub async fn create_site(&self, site: Site) -> Result<Site, MaintrackError> {
        site.validate()?;
        self.check_members(&site).await?;
        self.repo.create(site).await
    }

    /// Look up a site by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::NotFound`] when no site with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_site(&self, id: SiteId) -> Result<Site, MaintrackError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Site",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all sites, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_sites(&self) -> Result<Vec<Site>, MaintrackError> {
        self.repo.get_all().await
    }

    /// Replace an existing site, including its member set.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::NotFound`] if the site does not exist,
    /// [`MaintrackError::Validation`] if invariants fail or a member user is
    /// unknown, or a storage error from the repository.
    #[tracing::instrument(skip(self, site), fields(site_id = %site.id))]
    pub async fn update_site(&self, site: Site) -> Result<Site, MaintrackError> {
        site.validate()?;
        self.get_site(site.id).await?;
        self.check_members(&site).await?;
        self.repo.update(site).await
    }

    async fn check_members(&self, site: &Site) -> Result<(), MaintrackError> {
        for user_id in &site.user_ids {
            if self.users.get_by_id(*user_id).await?.is_none() {
                return Err(ValidationError::UnknownReference {
                    field: "user_ids",
                    entity: "User",
                    id: user_id.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
