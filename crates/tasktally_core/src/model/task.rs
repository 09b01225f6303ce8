//! Task domain model.
//!
//! # Invariants
//! - `title` is non-blank and at most 200 characters.
//! - `description` is at most 1000 characters.
//! - `project_id` must reference an existing project (checked by services).
//! - A task is overdue when it has a due date in the past and is not
//!   `Completed`. `Cancelled` does not exempt a task.

use crate::clock::truncate_to_millis;
use crate::model::project::{advance_updated_at, ProjectId};
use crate::model::validation::{limit_text, require_text, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

pub const TASK_TITLE_MAX_CHARS: usize = 200;
pub const TASK_DESCRIPTION_MAX_CHARS: usize = 1000;

symbolic_enum! {
    /// Workflow state of a task.
    pub enum TaskStatus as "task status" {
        ToDo,
        InProgress,
        InReview,
        Completed,
        Cancelled,
    }
}

symbolic_enum! {
    /// Relative importance of a task.
    pub enum TaskPriority as "task priority" {
        Low,
        Medium,
        High,
        Critical,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, TASK_TITLE_MAX_CHARS)?;
        limit_text("description", &self.description, TASK_DESCRIPTION_MAX_CHARS)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = advance_updated_at(self.updated_at, now);
    }

    /// Returns whether this task is overdue at `now`.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && self.status != TaskStatus::Completed,
            None => false,
        }
    }
}

/// Creation input for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(
        project_id: ProjectId,
        title: impl Into<String>,
        status: TaskStatus,
        priority: TaskPriority,
    ) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: String::new(),
            status,
            priority,
            due_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: self.project_id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            due_date: self.due_date.map(truncate_to_millis),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a task.
///
/// `project_id` moves the task (and its time entries) to another project.
/// `due_date: Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub project_id: Option<ProjectId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }

    pub fn apply_to(self, task: &mut Task) {
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date.map(truncate_to_millis);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NewTask, TaskPriority, TaskStatus};
    use chrono::{TimeDelta, TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn overdue_rule_excludes_completed_only() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
        let mut task = NewTask::new(Uuid::new_v4(), "ship", TaskStatus::InProgress, TaskPriority::High)
            .with_due_date(now - TimeDelta::days(1))
            .into_task(now);
        assert!(task.is_overdue_at(now));

        task.status = TaskStatus::Cancelled;
        assert!(task.is_overdue_at(now));

        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue_at(now));
    }

    #[test]
    fn due_exactly_now_is_not_overdue() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
        let task = NewTask::new(Uuid::new_v4(), "ship", TaskStatus::ToDo, TaskPriority::Low)
            .with_due_date(now)
            .into_task(now);
        assert!(!task.is_overdue_at(now));
    }

    #[test]
    fn priority_names_round_trip_through_display() {
        for priority in TaskPriority::ALL {
            assert_eq!(priority.to_string().parse::<TaskPriority>(), Ok(*priority));
        }
        assert!("high".parse::<TaskPriority>().is_err());
    }
}
