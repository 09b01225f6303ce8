//! Time totals per task and per project.
//!
//! # Invariants
//! - Only stopped entries count; a running entry contributes zero.
//! - Unknown task/project ids yield a zero total, not an error.
//! - A project total equals the sum of its task totals.

use crate::model::project::ProjectId;
use crate::model::task::TaskId;
use crate::repo::time_entry_repo::{TaskTimeTotal, TimeEntryRepository};
use crate::service::ServiceResult;
use chrono::TimeDelta;
use serde::Serialize;

/// Project total with its per-task breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTimeBreakdown {
    pub project_id: ProjectId,
    pub total_ms: i64,
    pub tasks: Vec<TaskTimeTotal>,
}

impl ProjectTimeBreakdown {
    pub fn total(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.total_ms)
    }
}

pub struct AggregationService<R: TimeEntryRepository> {
    repo: R,
}

impl<R: TimeEntryRepository> AggregationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn total_for_task(&self, task_id: TaskId) -> ServiceResult<TimeDelta> {
        Ok(self.repo.total_for_task(task_id)?)
    }

    pub fn total_for_project(&self, project_id: ProjectId) -> ServiceResult<TimeDelta> {
        Ok(self.repo.total_for_project(project_id)?)
    }

    pub fn project_breakdown(&self, project_id: ProjectId) -> ServiceResult<ProjectTimeBreakdown> {
        let tasks = self.repo.task_totals_for_project(project_id)?;
        let total_ms = tasks.iter().map(|task| task.total_ms).sum();
        Ok(ProjectTimeBreakdown {
            project_id,
            total_ms,
            tasks,
        })
    }
}
