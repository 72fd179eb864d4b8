//! Machine: a piece of equipment tracked for maintenance.

use serde::{Deserialize, Serialize};

use crate::error::{MaintrackError, ValidationError};
use crate::id::{MachineId, SiteId};

/// Equipment belonging to exactly one [`Site`](crate::site::Site).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    pub model: String,
    pub machine_number: Option<String>,
    pub serial_number: Option<String>,
    pub site_id: SiteId,
}

impl Machine {
    /// Create a builder for constructing a [`Machine`].
    #[must_use]
    pub fn builder() -> MachineBuilder {
        MachineBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// Whether `site_id` refers to an existing site is checked by the
    /// application layer, which has access to storage.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] when `name` or `model` is blank.
    pub fn validate(&self) -> Result<(), MaintrackError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required { field: "name" }.into());
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::Required { field: "model" }.into());
        }
        Ok(())
    }

    /// Short label combining the name and, when set, the machine number.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.machine_number {
            Some(number) => format!("{} (#{number})", self.name),
            None => self.name.clone(),
        }
    }
}

/// Step-by-step builder for [`Machine`].
#[derive(Debug, Default)]
pub struct MachineBuilder {
    id: Option<MachineId>,
    name: Option<String>,
    model: Option<String>,
    machine_number: Option<String>,
    serial_number: Option<String>,
    site_id: Option<SiteId>,
}

impl MachineBuilder {
    #[must_use]
    pub fn id(mut self, id: MachineId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn machine_number(mut self, number: impl Into<String>) -> Self {
        self.machine_number = Some(number.into());
        self
    }

    #[must_use]
    pub fn serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    #[must_use]
    pub fn site_id(mut self, site_id: SiteId) -> Self {
        self.site_id = Some(site_id);
        self
    }

    /// Consume the builder, validate, and return a [`Machine`].
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] if `site_id` is missing or
    /// invariants fail.
    pub fn build(self) -> Result<Machine, MaintrackError> {
        let site_id = self
            .site_id
            .ok_or(ValidationError::Required { field: "site_id" })?;
        let machine = Machine {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            machine_number: self.machine_number,
            serial_number: self.serial_number,
            site_id,
        };
        machine.validate()?;
        Ok(machine)
    }
}
