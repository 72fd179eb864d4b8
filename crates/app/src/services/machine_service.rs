//! Machine service: use-cases for managing machines.

use maintrack_domain::error::{MaintrackError, NotFoundError, ValidationError};
use maintrack_domain::id::{MachineId, SiteId};
use maintrack_domain::machine::Machine;

use crate::ports::{MachineRepository, SiteRepository};

/// Application service for machine CRUD operations.
pub struct MachineService<MR, SR> {
    repo: MR,
    sites: SR,
}

impl<MR, SR> MachineService<MR, SR>
where
    MR: MachineRepository,
    SR: SiteRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(repo: MR, sites: SR) -> Self {
        Self { repo, sites }
    }

    /// Create a machine after checking invariants and that its site exists.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] if invariants fail or the site
    /// is unknown, or a storage error from the repository.
    #[tracing::instrument(skip(self, machine), fields(machine_name = %machine.name))]
    pub async fn create_machine(&self, machine: Machine) -> Result<Machine, MaintrackError> {
        machine.validate()?;
        self.check_site(machine.site_id).await?;
        self.repo.create(machine).await
    }

    /// Look up a machine by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::NotFound`] when no machine with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_machine(&self, id: MachineId) -> Result<Machine, MaintrackError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Machine",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all machines, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_machines(&self) -> Result<Vec<Machine>, MaintrackError> {
        self.repo.get_all().await
    }

    /// Update an existing machine.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::NotFound`] if the machine does not exist,
    /// [`MaintrackError::Validation`] if invariants fail or the site is
    /// unknown, or a storage error from the repository.
    #[tracing::instrument(skip(self, machine), fields(machine_id = %machine.id))]
    pub async fn update_machine(&self, machine: Machine) -> Result<Machine, MaintrackError> {
        machine.validate()?;
        self.get_machine(machine.id).await?;
        self.check_site(machine.site_id).await?;
        self.repo.update(machine).await
    }

    async fn check_site(&self, site_id: SiteId) -> Result<(), MaintrackError> {
        if self.sites.get_by_id(site_id).await?.is_none() {
            return Err(ValidationError::UnknownReference {
                field: "site_id",
                entity: "Site",
                id: site_id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
