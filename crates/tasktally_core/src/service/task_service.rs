//! Task use-case service.
//!
//! # Responsibility
//! - Validate the owning project above the repository layer.
//! - Provide CRUD plus project/status/priority/overdue filters.
//!
//! # Invariants
//! - A task always references an existing project; a missing one is a
//!   validation failure (`ParentNotFound`).
//! - Overdue means: due date set, due date before now, status not
//!   `Completed`. Cancelled tasks are not exempt.

use crate::clock::{Clock, SystemClock};
use crate::model::detail::TaskDetails;
use crate::model::project::ProjectId;
use crate::model::task::{NewTask, Task, TaskId, TaskPatch, TaskPriority, TaskStatus};
use crate::model::EntityKind;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::service::{ServiceError, ServiceResult};
use log::info;

pub struct TaskService<R: TaskRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: TaskRepository, C: Clock> TaskService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn create(&self, input: NewTask) -> ServiceResult<Task> {
        self.ensure_project_exists(input.project_id)?;
        let task = input.into_task(self.clock.now());
        self.repo.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} project_id={}",
            task.id, task.project_id
        );
        Ok(task)
    }

    pub fn get(&self, id: TaskId) -> ServiceResult<Option<Task>> {
        Ok(self.repo.get_task(id)?)
    }

    pub fn get_details(&self, id: TaskId) -> ServiceResult<Option<TaskDetails>> {
        Ok(self.repo.get_task_details(id)?)
    }

    pub fn list(&self) -> ServiceResult<Vec<TaskDetails>> {
        self.filter(TaskListQuery::default())
    }

    pub fn list_by_project(&self, project_id: ProjectId) -> ServiceResult<Vec<TaskDetails>> {
        self.filter(TaskListQuery {
            project_id: Some(project_id),
            ..TaskListQuery::default()
        })
    }

    pub fn list_by_status(&self, status: TaskStatus) -> ServiceResult<Vec<TaskDetails>> {
        self.filter(TaskListQuery {
            status: Some(status),
            ..TaskListQuery::default()
        })
    }

    pub fn list_by_priority(&self, priority: TaskPriority) -> ServiceResult<Vec<TaskDetails>> {
        self.filter(TaskListQuery {
            priority: Some(priority),
            ..TaskListQuery::default()
        })
    }

    /// Lists tasks overdue at the service clock's current instant.
    pub fn list_overdue(&self) -> ServiceResult<Vec<TaskDetails>> {
        self.filter(TaskListQuery {
            overdue_at: Some(self.clock.now()),
            ..TaskListQuery::default()
        })
    }

    /// Runs an arbitrary combination of filters.
    pub fn filter(&self, query: TaskListQuery) -> ServiceResult<Vec<TaskDetails>> {
        Ok(self.repo.list_task_details(&query)?)
    }

    /// Applies a partial update. Moving to another project requires that
    /// project to exist.
    pub fn update(&self, id: TaskId, patch: TaskPatch) -> ServiceResult<Task> {
        let mut task = self
            .repo
            .get_task(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Task, id))?;

        if let Some(project_id) = patch.project_id {
            self.ensure_project_exists(project_id)?;
        }

        patch.apply_to(&mut task);
        task.touch(self.clock.now());
        self.repo.update_task(&task)?;

        info!("event=task_update module=service status=ok task_id={id}");
        Ok(task)
    }

    /// Deletes a task with all of its time entries.
    pub fn delete(&self, id: TaskId) -> ServiceResult<bool> {
        let existed = self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok task_id={id} existed={existed}");
        Ok(existed)
    }

    fn ensure_project_exists(&self, project_id: ProjectId) -> ServiceResult<()> {
        if self.repo.project_exists(project_id)? {
            return Ok(());
        }
        Err(ServiceError::ParentNotFound {
            entity: EntityKind::Project,
            id: project_id,
        })
    }
}
