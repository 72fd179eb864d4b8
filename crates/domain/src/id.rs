//! Typed identifier newtypes backed by UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident, $entity:literal) => {
        $(#[doc = $doc])*
        ///
        /// Ordered by the underlying UUID so ids can key sorted sets.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }

            /// Parse a submitted reference to an existing record.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::UnknownReference`] naming `field`
            /// when `raw` is not a UUID.
            pub fn parse_reference(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
                let raw = raw.trim();
                uuid::Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| ValidationError::UnknownReference {
                        field,
                        entity: Self::ENTITY,
                        id: raw.to_string(),
                    })
            }
        }

        impl $name {
            /// Human name of the record kind this id points at.
            pub const ENTITY: &'static str = $entity;
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`Site`](crate::site::Site).
    SiteId, "Site"
);

define_id!(
    /// Unique identifier for a [`Machine`](crate::machine::Machine).
    MachineId, "Machine"
);

define_id!(
    /// Unique identifier for a [`User`](crate::user::User).
    UserId, "User"
);

define_id!(
    /// Unique identifier for a [`MaintenancePart`](crate::maintenance::MaintenancePart).
    PartId, "Part"
);

define_id!(
    /// Unique identifier for a [`MaintenanceLog`](crate::maintenance::MaintenanceLog).
    MaintenanceLogId, "Maintenance log"
);

define_id!(
    /// Unique identifier for a [`BackupSchedule`](crate::backup::BackupSchedule).
    BackupScheduleId, "Backup schedule"
);

define_id!(
    /// Opaque browser session identifier carried in the session cookie.
    SessionId, "Session"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = MachineId::new();
        let b = MachineId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = SiteId::new();
        let text = id.to_string();
        let parsed: SiteId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_return_error_when_parsing_invalid_uuid() {
        let result = SessionId::from_str("not-a-uuid");
        assert!(result.is_err());
    }

    #[test]
    fn should_order_ids_by_uuid_when_collected_into_set() {
        let low = UserId::from_uuid(uuid::Uuid::from_u128(1));
        let high = UserId::from_uuid(uuid::Uuid::from_u128(2));
        let set: std::collections::BTreeSet<UserId> = [high, low, high].into_iter().collect();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![low, high]);
    }

    #[test]
    fn should_parse_reference_ignoring_surrounding_whitespace() {
        let id = SiteId::new();
        let parsed = SiteId::parse_reference("site_id", &format!(" {id} ")).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_name_field_and_entity_when_reference_is_malformed() {
        let err = PartId::parse_reference("part_id", "bogus").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownReference {
                field: "part_id",
                entity: "Part",
                id: "bogus".to_string(),
            }
        );
    }

    #[test]
    fn should_wrap_existing_uuid_when_using_from_uuid() {
        let uuid = uuid::Uuid::new_v4();
        let id = BackupScheduleId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }
}
