//! Maintenance parts and the immutable log of maintenance actions.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::error::{MaintrackError, ValidationError};
use crate::id::{MachineId, MaintenanceLogId, PartId};
use crate::time::{Date, Timestamp};

/// A part or component that maintenance can be performed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenancePart {
    pub id: PartId,
    pub name: String,
}

impl MaintenancePart {
    /// Create a part with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] when `name` is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, MaintrackError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::Required { field: "name" }.into());
        }
        Ok(Self {
            id: PartId::new(),
            name,
        })
    }
}

/// An audit record of maintenance performed on a machine.
///
/// Logs are append-only: once recorded they are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceLog {
    pub id: MaintenanceLogId,
    pub machine_id: MachineId,
    pub maintenance_date: Date,
    pub part: MaintenancePart,
    pub performed_by: String,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: Timestamp,
}

impl MaintenanceLog {
    /// Create a builder for constructing a [`MaintenanceLog`].
    #[must_use]
    pub fn builder() -> MaintenanceLogBuilder {
        MaintenanceLogBuilder::default()
    }
}

/// Order logs newest first: by maintenance date, then by recording time.
pub fn sort_newest_first(logs: &mut [MaintenanceLog]) {
    logs.sort_by_key(|log| Reverse((log.maintenance_date, log.recorded_at)));
}

/// Step-by-step builder for [`MaintenanceLog`].
#[derive(Debug, Default)]
pub struct MaintenanceLogBuilder {
    id: Option<MaintenanceLogId>,
    machine_id: Option<MachineId>,
    maintenance_date: Option<Date>,
    part: Option<MaintenancePart>,
    performed_by: Option<String>,
    invoice_number: Option<String>,
    notes: Option<String>,
    recorded_at: Option<Timestamp>,
}

impl MaintenanceLogBuilder {
    #[must_use]
    pub fn id(mut self, id: MaintenanceLogId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn machine_id(mut self, machine_id: MachineId) -> Self {
        self.machine_id = Some(machine_id);
        self
    }

    #[must_use]
    pub fn maintenance_date(mut self, date: Date) -> Self {
        self.maintenance_date = Some(date);
        self
    }

    #[must_use]
    pub fn part(mut self, part: MaintenancePart) -> Self {
        self.part = Some(part);
        self
    }

    #[must_use]
    pub fn performed_by(mut self, performed_by: impl Into<String>) -> Self {
        self.performed_by = Some(performed_by.into());
        self
    }

    #[must_use]
    pub fn invoice_number(mut self, invoice_number: Option<String>) -> Self {
        self.invoice_number = invoice_number;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    #[must_use]
    pub fn recorded_at(mut self, recorded_at: Timestamp) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }

    /// Consume the builder, validate, and return a [`MaintenanceLog`].
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] when the machine, date, part or
    /// `performed_by` is missing.
    pub fn build(self) -> Result<MaintenanceLog, MaintrackError> {
        let machine_id = self
            .machine_id
            .ok_or(ValidationError::Required { field: "machine_id" })?;
        let maintenance_date = self.maintenance_date.ok_or(ValidationError::Required {
            field: "maintenance_date",
        })?;
        let part = self
            .part
            .ok_or(ValidationError::Required { field: "part_id" })?;
        let performed_by = self.performed_by.unwrap_or_default();
        if performed_by.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "performed_by",
            }
            .into());
        }
        Ok(MaintenanceLog {
            id: self.id.unwrap_or_default(),
            machine_id,
            maintenance_date,
            part,
            performed_by,
            invoice_number: self.invoice_number,
            notes: self.notes,
            recorded_at: self.recorded_at.unwrap_or_else(crate::time::now),
        })
    }
}
