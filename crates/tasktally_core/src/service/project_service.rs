//! Project use-case service.
//!
//! # Invariants
//! - `updated_at` advances on every successful update; `created_at` is kept.
//! - `*_details` and filtered listings return projects with tasks and time
//!   entries loaded.

use crate::clock::{Clock, SystemClock};
use crate::model::detail::ProjectDetails;
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch, ProjectStatus};
use crate::model::EntityKind;
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository};
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Project service facade over repository implementations.
pub struct ProjectService<R: ProjectRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: ProjectRepository, C: Clock> ProjectService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn create(&self, input: NewProject) -> ServiceResult<Project> {
        let project = input.into_project(self.clock.now());
        self.repo.create_project(&project)?;
        info!(
            "event=project_create module=service status=ok project_id={}",
            project.id
        );
        Ok(project)
    }

    pub fn get(&self, id: ProjectId) -> ServiceResult<Option<Project>> {
        Ok(self.repo.get_project(id)?)
    }

    pub fn get_details(&self, id: ProjectId) -> ServiceResult<Option<ProjectDetails>> {
        Ok(self.repo.get_project_details(id)?)
    }

    pub fn list(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.repo.list_projects(&ProjectListQuery::default())?)
    }

    pub fn list_details(&self) -> ServiceResult<Vec<ProjectDetails>> {
        Ok(self
            .repo
            .list_project_details(&ProjectListQuery::default())?)
    }

    pub fn list_by_status(&self, status: ProjectStatus) -> ServiceResult<Vec<ProjectDetails>> {
        Ok(self.repo.list_project_details(&ProjectListQuery {
            status: Some(status),
        })?)
    }

    /// Applies a partial update.
    ///
    /// Returns `NotFound` when the project does not exist. An empty patch
    /// still counts as a mutation and advances `updated_at`.
    pub fn update(&self, id: ProjectId, patch: ProjectPatch) -> ServiceResult<Project> {
        let mut project = self
            .repo
            .get_project(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Project, id))?;

        patch.apply_to(&mut project);
        project.touch(self.clock.now());
        self.repo.update_project(&project)?;

        info!("event=project_update module=service status=ok project_id={id}");
        Ok(project)
    }

    /// Deletes a project with all of its tasks and time entries.
    pub fn delete(&self, id: ProjectId) -> ServiceResult<bool> {
        let existed = self.repo.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={id} existed={existed}");
        Ok(existed)
    }
}
