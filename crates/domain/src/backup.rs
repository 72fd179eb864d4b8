//! Backup schedule: when system backups run and how many are kept.
//!
//! Executing backups is outside this crate; the schedule only describes the
//! recurrence ([`Frequency`] plus day/hour/minute) and the [`Retention`]
//! policy the executor must honour.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{MaintrackError, ValidationError};
use crate::id::BackupScheduleId;
use crate::time::{Timestamp, days_in_month};

/// Retention counts offered by the schedule form.
pub const RETENTION_CHOICES: [u16; 6] = [3, 5, 7, 10, 30, 999];
/// Sentinel retention count meaning "keep every backup".
pub const UNLIMITED_RETENTION: u16 = 999;
/// Minute step accepted for the schedule time.
pub const MINUTE_STEP: u8 = 5;

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// How often a backup runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Which day selector applies for a given [`Frequency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayField {
    /// Daily schedules use neither day selector.
    None,
    DayOfWeek,
    DayOfMonth,
}

impl Frequency {
    pub const ALL: [Self; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    /// The day selector shown (and honoured) for this frequency.
    #[must_use]
    pub fn visible_day_field(self) -> DayField {
        match self {
            Self::Daily => DayField::None,
            Self::Weekly => DayField::DayOfWeek,
            Self::Monthly => DayField::DayOfMonth,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(ValidationError::NotAllowed {
                field: "frequency",
                allowed: "daily, weekly, monthly",
                value: other.to_string(),
            }),
        }
    }
}

/// How many backups are kept once a new one is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Retention {
    Keep(u16),
    Unlimited,
}

impl Retention {
    /// Interpret a retention count from the form or storage.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotAllowed`] unless `count` is one of
    /// [`RETENTION_CHOICES`].
    pub fn from_count(count: u16) -> Result<Self, ValidationError> {
        match count {
            UNLIMITED_RETENTION => Ok(Self::Unlimited),
            n if RETENTION_CHOICES.contains(&n) => Ok(Self::Keep(n)),
            n => Err(ValidationError::NotAllowed {
                field: "retention_count",
                allowed: "3, 5, 7, 10, 30, 999",
                value: n.to_string(),
            }),
        }
    }

    /// The count as submitted by the form (999 for unlimited).
    #[must_use]
    pub fn count(self) -> u16 {
        match self {
            Self::Keep(n) => n,
            Self::Unlimited => UNLIMITED_RETENTION,
        }
    }

    /// Given backups ordered newest first, return those that fall outside
    /// the policy and should be deleted.
    #[must_use]
    pub fn expired<T>(self, newest_first: &[T]) -> &[T] {
        match self {
            Self::Unlimited => &[],
            Self::Keep(n) => newest_first.get(usize::from(n)..).unwrap_or(&[]),
        }
    }

    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Unlimited => "Unlimited".to_string(),
            Self::Keep(n) => format!("Keep last {n}"),
        }
    }
}

impl Default for Retention {
    fn default() -> Self {
        Self::Keep(7)
    }
}

/// A recurring backup configuration created by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSchedule {
    pub id: BackupScheduleId,
    pub name: String,
    pub frequency: Frequency,
    /// 0 = Monday … 6 = Sunday. Set only for weekly schedules.
    pub day_of_week: Option<u8>,
    /// 1–31. Set only for monthly schedules.
    pub day_of_month: Option<u8>,
    pub hour: u8,
    pub minute: u8,
    pub retention: Retention,
    /// Whether user accounts are included in the backup archive.
    pub include_users: bool,
    pub enabled: bool,
    pub created_at: Timestamp,
}

impl BackupSchedule {
    /// Create a builder for constructing a [`BackupSchedule`].
    #[must_use]
    pub fn builder() -> BackupScheduleBuilder {
        BackupScheduleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] when the name is blank, the day
    /// field required by the frequency is missing or out of range, or the
    /// time is not a valid `hour:minute` on a five-minute step.
    pub fn validate(&self) -> Result<(), MaintrackError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required { field: "name" }.into());
        }
        match self.frequency.visible_day_field() {
            DayField::None => {}
            DayField::DayOfWeek => {
                let day = self
                    .day_of_week
                    .ok_or(ValidationError::Required { field: "day_of_week" })?;
                check_range("day_of_week", day, 0, 6)?;
            }
            DayField::DayOfMonth => {
                let day = self.day_of_month.ok_or(ValidationError::Required {
                    field: "day_of_month",
                })?;
                check_range("day_of_month", day, 1, 31)?;
            }
        }
        check_range("hour", self.hour, 0, 23)?;
        check_range("minute", self.minute, 0, 55)?;
        if self.minute % MINUTE_STEP != 0 {
            return Err(ValidationError::NotAllowed {
                field: "minute",
                allowed: "0, 5, 10, …, 55",
                value: self.minute.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Time of day at which the backup runs.
    #[must_use]
    pub fn time_of_day(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour.into(), self.minute.into(), 0).unwrap_or_default()
    }

    /// The configured day of month, clamped to the last day of the given
    /// month (e.g. 31 becomes 30 in April and 28/29 in February).
    #[must_use]
    pub fn effective_day_of_month(&self, year: i32, month: u32) -> u32 {
        let wanted = u32::from(self.day_of_month.unwrap_or(1)).max(1);
        wanted.min(days_in_month(year, month))
    }

    /// Next firing time strictly after `after`.
    #[must_use]
    pub fn next_run_after(&self, after: NaiveDateTime) -> NaiveDateTime {
        let time = self.time_of_day();
        let start = after.date();
        match self.frequency {
            Frequency::Daily => {
                let today = start.and_time(time);
                if today > after {
                    today
                } else {
                    add_days(start, 1).and_time(time)
                }
            }
            Frequency::Weekly => {
                let target = u32::from(self.day_of_week.unwrap_or(0));
                (0..=7)
                    .map(|offset| add_days(start, offset))
                    .filter(|day| day.weekday().num_days_from_monday() == target)
                    .map(|day| day.and_time(time))
                    .find(|candidate| *candidate > after)
                    .unwrap_or_else(|| add_days(start, 7).and_time(time))
            }
            Frequency::Monthly => {
                let first = start.with_day(1).unwrap_or(start);
                (0..=1)
                    .filter_map(|offset| first.checked_add_months(Months::new(offset)))
                    .filter_map(|month_start| {
                        let day =
                            self.effective_day_of_month(month_start.year(), month_start.month());
                        month_start.with_day(day)
                    })
                    .map(|day| day.and_time(time))
                    .find(|candidate| *candidate > after)
                    .unwrap_or(NaiveDateTime::MAX)
            }
        }
    }

    /// Human-readable recurrence, e.g. `Weekly on Monday at 02:00`.
    #[must_use]
    pub fn describe(&self) -> String {
        let time = format!("{:02}:{:02}", self.hour, self.minute);
        match self.frequency {
            Frequency::Daily => format!("Daily at {time}"),
            Frequency::Weekly => {
                let day = self
                    .day_of_week
                    .and_then(|d| WEEKDAY_NAMES.get(usize::from(d)))
                    .unwrap_or(&"?");
                format!("Weekly on {day} at {time}")
            }
            Frequency::Monthly => format!(
                "Monthly on day {} at {time}",
                self.day_of_month.unwrap_or(1)
            ),
        }
    }
}

/// Weekday label for a 0-based (Monday first) index.
#[must_use]
pub fn weekday_name(day_of_week: u8) -> Option<&'static str> {
    WEEKDAY_NAMES.get(usize::from(day_of_week)).copied()
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn check_range(field: &'static str, value: u8, min: u8, max: u8) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: min.into(),
            max: max.into(),
            value: value.into(),
        })
    }
}

/// Step-by-step builder for [`BackupSchedule`].
#[derive(Debug, Default)]
pub struct BackupScheduleBuilder {
    id: Option<BackupScheduleId>,
    name: Option<String>,
    frequency: Frequency,
    day_of_week: Option<u8>,
    day_of_month: Option<u8>,
    hour: u8,
    minute: u8,
    retention: Retention,
    include_users: bool,
    enabled: Option<bool>,
    created_at: Option<Timestamp>,
}

impl BackupScheduleBuilder {
    #[must_use]
    pub fn id(mut self, id: BackupScheduleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    #[must_use]
    pub fn day_of_week(mut self, day: Option<u8>) -> Self {
        self.day_of_week = day;
        self
    }

    #[must_use]
    pub fn day_of_month(mut self, day: Option<u8>) -> Self {
        self.day_of_month = day;
        self
    }

    #[must_use]
    pub fn time(mut self, hour: u8, minute: u8) -> Self {
        self.hour = hour;
        self.minute = minute;
        self
    }

    #[must_use]
    pub fn retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    #[must_use]
    pub fn include_users(mut self, include: bool) -> Self {
        self.include_users = include;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Consume the builder, drop the day field the frequency ignores,
    /// validate, and return a [`BackupSchedule`].
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] if invariants fail.
    pub fn build(self) -> Result<BackupSchedule, MaintrackError> {
        let (day_of_week, day_of_month) = match self.frequency.visible_day_field() {
            DayField::None => (None, None),
            DayField::DayOfWeek => (self.day_of_week, None),
            DayField::DayOfMonth => (None, self.day_of_month),
        };
        let schedule = BackupSchedule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            frequency: self.frequency,
            day_of_week,
            day_of_month,
            hour: self.hour,
            minute: self.minute,
            retention: self.retention,
            include_users: self.include_users,
            enabled: self.enabled.unwrap_or(true),
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        schedule.validate()?;
        Ok(schedule)
    }
}
