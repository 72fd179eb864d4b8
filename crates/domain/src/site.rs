//! Site: a physical facility grouping machines and authorized users.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::email::EmailAddress;
use crate::error::{MaintrackError, ValidationError};
use crate::id::{SiteId, UserId};

/// Smallest accepted notification threshold, in days.
pub const MIN_NOTIFICATION_THRESHOLD: u16 = 1;
/// Largest accepted notification threshold, in days.
pub const MAX_NOTIFICATION_THRESHOLD: u16 = 365;
/// Threshold assigned to new sites.
pub const DEFAULT_NOTIFICATION_THRESHOLD: u16 = 30;

/// A facility that owns machines and grants access to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    pub location: String,
    pub contact_email: Option<EmailAddress>,
    /// Days between maintenance actions before a machine is reported as due.
    pub notification_threshold: u16,
    pub enable_notifications: bool,
    pub user_ids: BTreeSet<UserId>,
}

impl Site {
    /// Create a builder for constructing a [`Site`].
    #[must_use]
    pub fn builder() -> SiteBuilder {
        SiteBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] when `name` is blank or the
    /// notification threshold is outside `1..=365`.
    pub fn validate(&self) -> Result<(), MaintrackError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required { field: "name" }.into());
        }
        if !(MIN_NOTIFICATION_THRESHOLD..=MAX_NOTIFICATION_THRESHOLD)
            .contains(&self.notification_threshold)
        {
            return Err(ValidationError::OutOfRange {
                field: "notification_threshold",
                min: MIN_NOTIFICATION_THRESHOLD.into(),
                max: MAX_NOTIFICATION_THRESHOLD.into(),
                value: self.notification_threshold.into(),
            }
            .into());
        }
        Ok(())
    }

    /// Whether `user` is a member of this site.
    #[must_use]
    pub fn has_user(&self, user: UserId) -> bool {
        self.user_ids.contains(&user)
    }
}

/// Clamp a raw threshold (e.g. a stored value) into the accepted range.
#[must_use]
pub fn clamp_notification_threshold(raw: i64) -> u16 {
    let clamped = raw.clamp(
        MIN_NOTIFICATION_THRESHOLD.into(),
        MAX_NOTIFICATION_THRESHOLD.into(),
    );
    u16::try_from(clamped).unwrap_or(DEFAULT_NOTIFICATION_THRESHOLD)
}

/// Step-by-step builder for [`Site`].
#[derive(Debug, Default)]
pub struct SiteBuilder {
    id: Option<SiteId>,
    name: Option<String>,
    location: Option<String>,
    contact_email: Option<EmailAddress>,
    notification_threshold: Option<u16>,
    enable_notifications: bool,
    user_ids: BTreeSet<UserId>,
}

impl SiteBuilder {
    #[must_use]
    pub fn id(mut self, id: SiteId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn contact_email(mut self, contact_email: EmailAddress) -> Self {
        self.contact_email = Some(contact_email);
        self
    }

    #[must_use]
    pub fn notification_threshold(mut self, days: u16) -> Self {
        self.notification_threshold = Some(days);
        self
    }

    #[must_use]
    pub fn enable_notifications(mut self, enabled: bool) -> Self {
        self.enable_notifications = enabled;
        self
    }

    #[must_use]
    pub fn user(mut self, user: UserId) -> Self {
        self.user_ids.insert(user);
        self
    }

    #[must_use]
    pub fn users(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.user_ids.extend(users);
        self
    }

    /// Consume the builder, validate, and return a [`Site`].
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] if invariants fail.
    pub fn build(self) -> Result<Site, MaintrackError> {
        let site = Site {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            contact_email: self.contact_email,
            notification_threshold: self
                .notification_threshold
                .unwrap_or(DEFAULT_NOTIFICATION_THRESHOLD),
            enable_notifications: self.enable_notifications,
            user_ids: self.user_ids,
        };
        site.validate()?;
        Ok(site)
    }
}
