//! Project domain model.
//!
//! # Responsibility
//! - Define the top-level grouping record and its status lifecycle.
//! - Provide creation and partial-update helpers that keep timestamps honest.
//!
//! # Invariants
//! - `name` is non-blank and at most 200 characters.
//! - `description` is at most 1000 characters.
//! - `created_at` never changes after creation; `updated_at` strictly
//!   advances on every mutation.

use crate::clock::truncate_to_millis;
use crate::model::validation::{limit_text, require_text, ValidationError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

pub const PROJECT_NAME_MAX_CHARS: usize = 200;
pub const PROJECT_DESCRIPTION_MAX_CHARS: usize = 1000;

symbolic_enum! {
    /// Lifecycle state of a project.
    pub enum ProjectStatus as "project status" {
        Planning,
        InProgress,
        OnHold,
        Completed,
        Cancelled,
    }
}

/// Canonical project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Validates field-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, PROJECT_NAME_MAX_CHARS)?;
        limit_text(
            "description",
            &self.description,
            PROJECT_DESCRIPTION_MAX_CHARS,
        )
    }

    /// Records a mutation at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = advance_updated_at(self.updated_at, now);
    }
}

/// Creation input for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, status: ProjectStatus, start_date: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            status,
            start_date,
            end_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Materializes a record with a fresh id, stamped at `now`.
    pub fn into_project(self, now: DateTime<Utc>) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            status: self.status,
            start_date: truncate_to_millis(self.start_date),
            end_date: self.end_date.map(truncate_to_millis),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a project. Unset fields are left untouched.
///
/// `end_date: Some(None)` clears the end date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Applies present fields onto `project`. Does not touch timestamps.
    pub fn apply_to(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(start_date) = self.start_date {
            project.start_date = truncate_to_millis(start_date);
        }
        if let Some(end_date) = self.end_date {
            project.end_date = end_date.map(truncate_to_millis);
        }
    }
}

/// Next `updated_at` value: `now`, or one millisecond past the previous
/// value when the clock has not moved forward.
pub(crate) fn advance_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + TimeDelta::milliseconds(1);
    if now >= floor {
        now
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::{NewProject, ProjectPatch, ProjectStatus};
    use crate::model::validation::ValidationError;
    use chrono::{TimeZone, Utc};

    #[test]
    fn status_parses_exact_symbolic_names_only() {
        assert_eq!("OnHold".parse::<ProjectStatus>(), Ok(ProjectStatus::OnHold));
        let err = "onhold".parse::<ProjectStatus>().unwrap_err();
        assert!(matches!(err, ValidationError::UnknownValue { field: "project status", .. }));
    }

    #[test]
    fn touch_advances_even_when_clock_stands_still() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut project = NewProject::new("Roadmap", ProjectStatus::Planning, now).into_project(now);

        project.touch(now);
        assert!(project.updated_at > project.created_at);
        let first = project.updated_at;
        project.touch(now);
        assert!(project.updated_at > first);
    }

    #[test]
    fn patch_leaves_unset_fields_alone_and_can_clear_end_date() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut project = NewProject::new("Roadmap", ProjectStatus::Planning, now)
            .with_description("q3 plan")
            .with_end_date(now)
            .into_project(now);

        ProjectPatch {
            status: Some(ProjectStatus::InProgress),
            end_date: Some(None),
            ..ProjectPatch::default()
        }
        .apply_to(&mut project);

        assert_eq!(project.name, "Roadmap");
        assert_eq!(project.description, "q3 plan");
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.end_date, None);
    }

    #[test]
    fn validate_enforces_name_and_description_limits() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut project = NewProject::new("ok", ProjectStatus::Planning, now).into_project(now);
        assert!(project.validate().is_ok());

        project.name = "x".repeat(201);
        assert!(matches!(
            project.validate(),
            Err(ValidationError::TooLong { field: "name", .. })
        ));

        project.name = "ok".to_string();
        project.description = "d".repeat(1001);
        assert!(matches!(
            project.validate(),
            Err(ValidationError::TooLong { field: "description", .. })
        ));
    }
}
